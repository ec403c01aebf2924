use snafu::{OptionExt, Snafu, ensure};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pwd,
    Ls { path: String, details: bool },
    Mkdir { path: String, parents: bool },
    Touch { path: String },
    Write { path: String, content: String },
    Cat { path: String },
    Cd { path: String },
    Rm { path: String, recursive: bool },
    Mv { src: String, dst: String },
    Ln { src: String, dst: String },
    Find { name: String, path: String },
    Stat { path: String },
    Help,
    Exit,
}

pub const HELP: &[&str] = &[
    "pwd                     print the current directory",
    "ls [-l] [path]          list a directory, -l for details",
    "mkdir [-p] path         create a directory, -p for intermediates",
    "touch path              create an empty file",
    "write path text...      replace a file's content",
    "cat path                print a file",
    "cd [path]               change directory, / without a path",
    "rm [-r] path            remove an entry, -r for directory trees",
    "mv src dst              move or rename",
    "ln src dst              hard-link a file",
    "find name [path]        search below a directory",
    "stat path               show an entry's metadata",
    "exit                    leave the shell",
];

/// Splits off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

/// Positional arguments of a command, with its recognised flag removed.
struct Arguments<'a> {
    command: &'a str,
    words: Vec<&'a str>,
    flag: bool,
}

impl<'a> Arguments<'a> {
    fn new(command: &'a str, rest: &'a str, flag: Option<&str>) -> Self {
        let mut words = rest.split_whitespace().collect::<Vec<_>>();
        let position = flag.and_then(|flag| words.iter().position(|word| *word == flag));
        if let Some(position) = position {
            words.remove(position);
        }
        Self {
            command,
            words,
            flag: position.is_some(),
        }
    }

    fn required(&self, index: usize, argument: &str) -> Result<String, CommandParseError> {
        self.words
            .get(index)
            .map(|word| word.to_string())
            .context(MissingArgumentSnafu {
                command: self.command,
                argument,
            })
    }

    fn optional(&self, index: usize, default: &str) -> String {
        self.words.get(index).copied().unwrap_or(default).to_string()
    }

    /// Fails when more than `count` positional arguments were given.
    fn at_most(self, count: usize) -> Result<Self, CommandParseError> {
        if let Some(extra) = self.words.get(count) {
            return UnexpectedArgumentSnafu {
                command: self.command,
                argument: *extra,
            }
            .fail();
        }
        Ok(self)
    }
}

impl TryFrom<&str> for Command {
    type Error = CommandParseError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let (name, rest) = split_word(line);
        ensure!(!name.is_empty(), EmptyCommandSnafu);

        let command = match name {
            "pwd" => {
                Arguments::new(name, rest, None).at_most(0)?;
                Command::Pwd
            }
            "ls" => {
                let args = Arguments::new(name, rest, Some("-l")).at_most(1)?;
                Command::Ls {
                    path: args.optional(0, ""),
                    details: args.flag,
                }
            }
            "mkdir" => {
                let args = Arguments::new(name, rest, Some("-p")).at_most(1)?;
                Command::Mkdir {
                    path: args.required(0, "path")?,
                    parents: args.flag,
                }
            }
            "touch" => Command::Touch {
                path: Arguments::new(name, rest, None).at_most(1)?.required(0, "path")?,
            },
            "write" => {
                let (path, content) = split_word(rest);
                ensure!(
                    !path.is_empty(),
                    MissingArgumentSnafu {
                        command: name,
                        argument: "path",
                    }
                );
                Command::Write {
                    path: path.to_string(),
                    content: content.to_string(),
                }
            }
            "cat" => Command::Cat {
                path: Arguments::new(name, rest, None).at_most(1)?.required(0, "path")?,
            },
            "cd" => Command::Cd {
                path: Arguments::new(name, rest, None).at_most(1)?.optional(0, "/"),
            },
            "rm" => {
                let args = Arguments::new(name, rest, Some("-r")).at_most(1)?;
                Command::Rm {
                    path: args.required(0, "path")?,
                    recursive: args.flag,
                }
            }
            "mv" | "ln" => {
                let args = Arguments::new(name, rest, None).at_most(2)?;
                let src = args.required(0, "source")?;
                let dst = args.required(1, "destination")?;
                if name == "mv" {
                    Command::Mv { src, dst }
                } else {
                    Command::Ln { src, dst }
                }
            }
            "find" => {
                let args = Arguments::new(name, rest, None).at_most(2)?;
                Command::Find {
                    name: args.required(0, "name")?,
                    path: args.optional(1, ""),
                }
            }
            "stat" => Command::Stat {
                path: Arguments::new(name, rest, None).at_most(1)?.required(0, "path")?,
            },
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            _ => return UnknownCommandSnafu { name }.fail(),
        };

        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CommandParseError {
    #[snafu(display("Empty command"))]
    EmptyCommand,
    #[snafu(display("Unknown command '{}', try 'help'", name))]
    UnknownCommand { name: String },
    #[snafu(display("'{}' expects a {} argument", command, argument))]
    MissingArgument { command: String, argument: String },
    #[snafu(display("'{}' got an unexpected argument '{}'", command, argument))]
    UnexpectedArgument { command: String, argument: String },
}
