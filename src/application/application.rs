use std::io::{self, BufRead, Write};

use colored::Colorize;
use memfs::{Clock, EntryDetails, FileSystem, FsError, SystemClock};
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use super::command::HELP;
use crate::application::{Command, CommandParseError, RuntimeConfig};

const PROMPT_SUFFIX: &str = "$ ";

/// Read-eval-print loop over one filesystem.
pub struct Application<C: Clock = SystemClock> {
    fs: FileSystem<C>,
    config: RuntimeConfig,
}

impl Application {
    /// Serves stdin/stdout against a fresh filesystem until EOF or `exit`.
    pub fn run(config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let config: RuntimeConfig = config.into();
        debug!("Runtime config: {:?}", config);

        Application::new(FileSystem::new(), config).serve(io::stdin().lock(), io::stdout().lock())
    }
}

impl<C: Clock> Application<C> {
    pub fn new(fs: FileSystem<C>, config: RuntimeConfig) -> Self {
        Self { fs, config }
    }

    pub fn serve(
        &mut self,
        input: impl BufRead,
        mut output: impl Write,
    ) -> Result<(), ApplicationError> {
        self.prompt(&mut output)?;

        for line in input.lines() {
            let line = line.context(ReadInputSnafu)?;
            match Command::try_from(line.as_str()) {
                Ok(Command::Exit) => break,
                Ok(command) => {
                    debug!("Executing {:?}", command);
                    match self.execute(command) {
                        Ok(lines) => {
                            for line in lines {
                                writeln!(output, "{line}").context(WriteOutputSnafu)?;
                            }
                        }
                        Err(error) => self.report(&mut output, &error)?,
                    }
                }
                Err(CommandParseError::EmptyCommand) => {}
                Err(error) => self.report(&mut output, &error)?,
            }
            self.prompt(&mut output)?;
        }

        info!("Shell session finished");
        Ok(())
    }

    /// Runs one command and returns the lines it prints.
    fn execute(&mut self, command: Command) -> Result<Vec<String>, FsError> {
        let fs = &mut self.fs;
        let lines = match command {
            Command::Pwd => vec![fs.cwd()],
            Command::Ls {
                path,
                details: false,
            } => fs
                .ls_details(&path)?
                .iter()
                .map(|entry| self.config.paint_entry(entry))
                .collect(),
            Command::Ls {
                path,
                details: true,
            } => fs
                .ls_details(&path)?
                .iter()
                .map(ToString::to_string)
                .collect(),
            Command::Mkdir {
                path,
                parents: false,
            } => fs.mkdir(&path).map(|_| Vec::new())?,
            Command::Mkdir {
                path,
                parents: true,
            } => fs.mkdir_all(&path).map(|_| Vec::new())?,
            Command::Touch { path } => fs.touch(&path).map(|_| Vec::new())?,
            Command::Write { path, content } => fs.write_file(&path, content).map(|_| Vec::new())?,
            Command::Cat { path } => {
                let content = fs.read_file(&path)?;
                vec![String::from_utf8_lossy(&content).into_owned()]
            }
            Command::Cd { path } => fs.cd(&path).map(|_| Vec::new())?,
            Command::Rm { path, recursive } => fs.rm(&path, recursive).map(|_| Vec::new())?,
            Command::Mv { src, dst } => fs.mv(&src, &dst).map(|_| Vec::new())?,
            Command::Ln { src, dst } => fs.ln(&src, &dst).map(|_| Vec::new())?,
            Command::Find { name, path } => fs.find(&name, &path)?,
            Command::Stat { path } => {
                let details = fs.stat(&path)?;
                vec![format!("{} {}", details.kind, details)]
            }
            Command::Help => HELP.iter().map(|line| line.to_string()).collect(),
            Command::Exit => Vec::new(),
        };
        Ok(lines)
    }

    fn prompt(&self, output: &mut impl Write) -> Result<(), ApplicationError> {
        if self.config.prompt {
            write!(output, "{}{}", self.fs.cwd(), PROMPT_SUFFIX).context(WriteOutputSnafu)?;
            output.flush().context(WriteOutputSnafu)?;
        }
        Ok(())
    }

    fn report(
        &self,
        output: &mut impl Write,
        error: &dyn std::error::Error,
    ) -> Result<(), ApplicationError> {
        debug!("Command failed: {}", error);
        let message = format!("error: {error}");
        let message = if self.config.color {
            message.red().to_string()
        } else {
            message
        };
        writeln!(output, "{message}").context(WriteOutputSnafu)
    }
}

impl RuntimeConfig {
    fn paint_entry(&self, entry: &EntryDetails) -> String {
        if self.color && entry.is_directory() {
            entry.name.blue().bold().to_string()
        } else {
            entry.name.clone()
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to read command input"))]
    ReadInputError { source: io::Error },
    #[snafu(display("Failed to write command output"))]
    WriteOutputError { source: io::Error },
}
