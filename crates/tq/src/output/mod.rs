//! Output formatting utilities for the tq CLI.
//!
//! This module provides functions for formatting results as tables or JSON.
//!
//! - [`check`] - Query diagnostics (tokens, canonical text, tree)
//! - [`columns`] - Split and join output
//! - [`helpers`] - Common formatting utilities (headers, status, indentation)

mod check;
mod columns;
pub mod helpers;

pub use check::{format_check_json, format_check_table, CheckReport};
pub use columns::{
    format_join_json, format_split_json, format_split_table, SkippedFragment,
};
