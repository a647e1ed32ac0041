//! Subcommands of the command line and of the interactive session
pub mod aggregate;
pub mod columns;
pub mod run;
pub mod statistics;
mod table_view;
pub mod values;
