//! Per-column filters and their synchronization with compound queries.
//!
//! A table shows one filter box per column plus a compound filter bar. The
//! box holds a short fragment such as `> 5` or `is blank`; the bar holds a
//! full query such as `{age} > 5 && {name} is blank`. [`SingleColumnTree`]
//! completes a fragment into a query on its column, and
//! [`MultiColumnTree`] splits a compound query back into fragments.

pub(crate) mod lookup;
mod multi;
mod single;

use serde::{Deserialize, Serialize};

use crate::filter::{CaseFlag, ColumnNotFound, RelationalOperator};

pub use multi::{to_query_string, MultiColumnTree};
pub use single::SingleColumnTree;

/// Kind of data a column holds. Decides the operator a bare fragment gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Anything; bare fragments search with `contains`.
    #[default]
    Any,
    /// Free text; bare fragments search with `contains`.
    Text,
    /// Numbers; bare fragments compare with `=`.
    Numeric,
    /// Dates; bare fragments match with `datestartswith`.
    Datetime,
    /// A fixed set of values; bare fragments compare with `=`.
    Dropdown,
}

impl ColumnType {
    /// The operator injected in front of a bare fragment.
    pub fn default_operator(self) -> RelationalOperator {
        match self {
            ColumnType::Any | ColumnType::Text => RelationalOperator::Contains,
            ColumnType::Numeric | ColumnType::Dropdown => RelationalOperator::Equal,
            ColumnType::Datetime => RelationalOperator::DateStartsWith,
        }
    }

    /// Lowercase name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Any => "any",
            ColumnType::Text => "text",
            ColumnType::Numeric => "numeric",
            ColumnType::Datetime => "datetime",
            ColumnType::Dropdown => "dropdown",
        }
    }
}

impl std::str::FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(ColumnType::Any),
            "text" => Ok(ColumnType::Text),
            "numeric" => Ok(ColumnType::Numeric),
            "datetime" => Ok(ColumnType::Datetime),
            "dropdown" => Ok(ColumnType::Dropdown),
            other => Err(format!(
                "unknown column type '{other}' (expected any, text, numeric, datetime or dropdown)"
            )),
        }
    }
}

/// Case sensitivity of a column's default comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    /// Compare exactly.
    #[default]
    Sensitive,
    /// Fold case; the injected operator gets an `i` prefix.
    Insensitive,
}

impl CaseSensitivity {
    /// The flag injected in front of the default operator.
    pub fn flag(self) -> Option<CaseFlag> {
        match self {
            CaseSensitivity::Sensitive => None,
            CaseSensitivity::Insensitive => Some(CaseFlag::Insensitive),
        }
    }

    /// Lowercase name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            CaseSensitivity::Sensitive => "sensitive",
            CaseSensitivity::Insensitive => "insensitive",
        }
    }
}

impl std::str::FromStr for CaseSensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sensitive" | "s" => Ok(CaseSensitivity::Sensitive),
            "insensitive" | "i" => Ok(CaseSensitivity::Insensitive),
            other => Err(format!(
                "unknown case sensitivity '{other}' (expected sensitive or insensitive)"
            )),
        }
    }
}

/// Filter configuration of one column.
///
/// # Example
///
/// ```
/// use tabfilter_rs::column::{ColumnConfig, ColumnType};
///
/// let column: ColumnConfig = "age:numeric".parse().unwrap();
/// assert_eq!(column.id, "age");
/// assert_eq!(column.column_type, ColumnType::Numeric);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column id, the field name used in queries.
    pub id: String,
    /// Kind of data in the column.
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Case sensitivity of the default operator.
    #[serde(rename = "case", default)]
    pub case_sensitivity: CaseSensitivity,
}

impl ColumnConfig {
    /// Creates a case-sensitive column of the given type.
    pub fn new(id: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            column_type,
            case_sensitivity: CaseSensitivity::default(),
        }
    }

    /// Sets the case sensitivity.
    pub fn with_case(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    /// The flag the default operator is injected with.
    pub fn default_flag(&self) -> Option<CaseFlag> {
        self.case_sensitivity.flag()
    }
}

/// Parses `id[:type[:case]]`.
impl std::str::FromStr for ColumnConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let id = parts.next().unwrap_or_default().trim();
        if id.is_empty() {
            return Err(format!("invalid column '{s}': missing id"));
        }
        let column_type = parts.next().map(str::parse).transpose()?.unwrap_or_default();
        let case_sensitivity = parts.next().map(str::parse).transpose()?.unwrap_or_default();
        Ok(Self {
            id: id.to_string(),
            column_type,
            case_sensitivity,
        })
    }
}

/// Looks up the column with id `id`.
///
/// # Errors
///
/// Returns [`ColumnNotFound`] with the closest id as a suggestion when no
/// column matches.
pub fn find_column<'c>(
    columns: &'c [ColumnConfig],
    id: &str,
) -> Result<&'c ColumnConfig, ColumnNotFound> {
    columns
        .iter()
        .find(|column| column.id == id)
        .ok_or_else(|| ColumnNotFound {
            column: id.to_string(),
            suggestion: lookup::find_similar_name(id, columns.iter().map(|c| c.id.as_str())),
        })
}
