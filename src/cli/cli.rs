use clap::Parser;

use crate::application::data::LogLevel;

/// Interactive shell over an in-memory filesystem. Commands are read from
/// stdin, one per line; type `help` for the list.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Never color the output, even on a capable terminal
    #[clap(long)]
    pub no_color: bool,
}
