//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands that manage the CLI itself run without a configuration; query
//! commands get the loaded configuration and a shared [`QueryEngine`].

use std::path::Path;

use tabfilter_rs::{ColumnConfig, QueryEngine};

use crate::cli::{Cli, Combinator, Commands, ConfigCommands, Shell};
use crate::commands::check::{CheckMode, CheckOptions};
use crate::commands::config::Config;
use crate::commands::filter::FilterOptions;
use crate::commands::join::JoinOptions;
use crate::commands::split::SplitOptions;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that run without loading the configuration.
pub trait StandaloneCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that work on queries.
pub trait QueryCommand {
    /// Execute the command with the loaded configuration.
    fn execute(&self, ctx: &CommandContext, config: &Config, engine: &QueryEngine) -> Result<()>;
}

/// Commands that don't need the configuration.
pub enum StandaloneDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> StandaloneDispatch<'a> {
    /// Try to create a standalone dispatch from the CLI command.
    /// Returns None if the command works on queries.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl StandaloneCommand for StandaloneDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("tq - tabular filter queries");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Init { force }) => commands::config::execute_init(ctx, *force),
    }
}

/// Commands that work on queries.
pub enum QueryDispatch<'a> {
    Check {
        query: &'a str,
        column: Option<&'a ColumnConfig>,
        multi: Option<Combinator>,
    },
    Filter {
        query: &'a str,
        input: Option<&'a Path>,
        count: bool,
    },
    Split {
        query: &'a str,
        operator: Option<Combinator>,
        columns: &'a [ColumnConfig],
    },
    Join {
        fragments: &'a [(String, String)],
        operator: Option<Combinator>,
        columns: &'a [ColumnConfig],
    },
}

impl<'a> QueryDispatch<'a> {
    /// Create a query dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Check {
                query,
                column,
                multi,
            }) => Some(Self::Check {
                query,
                column: column.as_ref(),
                multi: *multi,
            }),
            Some(Commands::Filter {
                query,
                input,
                count,
            }) => Some(Self::Filter {
                query,
                input: input.as_deref(),
                count: *count,
            }),
            Some(Commands::Split {
                query,
                operator,
                columns,
            }) => Some(Self::Split {
                query,
                operator: *operator,
                columns,
            }),
            Some(Commands::Join {
                fragments,
                operator,
                columns,
            }) => Some(Self::Join {
                fragments,
                operator: *operator,
                columns,
            }),
            _ => None,
        }
    }
}

impl QueryCommand for QueryDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, config: &Config, engine: &QueryEngine) -> Result<()> {
        match self {
            Self::Check {
                query,
                column,
                multi,
            } => {
                let mode = match (column, multi) {
                    (Some(column), _) => CheckMode::Column(config.column_or(column)),
                    (None, Some(combinator)) => CheckMode::Multi((*combinator).into()),
                    (None, None) => CheckMode::Query,
                };
                let opts = CheckOptions { input: query, mode };
                commands::check::execute(ctx, engine, &opts)
            }
            Self::Filter {
                query,
                input,
                count,
            } => {
                let opts = FilterOptions {
                    query,
                    input: *input,
                    count: *count,
                };
                commands::filter::execute(ctx, engine, &opts)
            }
            Self::Split {
                query,
                operator,
                columns,
            } => {
                let opts = SplitOptions {
                    query,
                    operator: config.operator_or(*operator),
                    columns: config.columns_or(columns),
                };
                commands::split::execute(ctx, engine, &opts)
            }
            Self::Join {
                fragments,
                operator,
                columns,
            } => {
                let opts = JoinOptions {
                    fragments,
                    operator: config.operator_or(*operator),
                    columns: config.columns_or(columns),
                };
                commands::join::execute(ctx, engine, &opts)
            }
        }
    }
}
