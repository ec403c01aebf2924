use std::io::IsTerminal;

use supports_color::Stream;

use crate::cli::Cli;

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Paint directory names and errors.
    pub color: bool,
    /// Print a prompt before reading each command.
    pub prompt: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            color: !cli.no_color && supports_color::on(Stream::Stdout).is_some(),
            prompt: std::io::stdin().is_terminal(),
        }
    }
}
