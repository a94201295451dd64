//! Interactive commands read from stdin

use std::str::FromStr;

use thiserror::Error;

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Record,
    Stop,
    Cancel,
    List,
    /// Toggle playback of the recording with this list number
    Play(usize),
    Delete(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("'{command}' needs a recording number, e.g. '{command} 1'")]
    MissingNumber { command: String },

    #[error("'{0}' is not a recording number")]
    InvalidNumber(String),
}

/// Help text listing every command
pub const HELP: &str = "\
Commands:
  record, r        start a new recording
  stop, s          stop and save the current recording
  cancel, c        discard the current recording
  list, ls         show stored recordings
  play, p <n>      play or pause recording #n
  delete, rm <n>   delete recording #n
  help, ?          show this help
  quit, q          exit";

impl FromStr for UserCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();

        let number = |command: &str, arg: Option<&str>| -> Result<usize, CommandParseError> {
            let arg = arg.ok_or_else(|| CommandParseError::MissingNumber {
                command: command.to_string(),
            })?;
            arg.trim_start_matches('#')
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CommandParseError::InvalidNumber(arg.to_string()))
        };

        match command.as_str() {
            "record" | "r" => Ok(Self::Record),
            "stop" | "s" => Ok(Self::Stop),
            "cancel" | "c" => Ok(Self::Cancel),
            "list" | "ls" | "l" => Ok(Self::List),
            "play" | "p" => number(&command, words.next()).map(Self::Play),
            "delete" | "d" | "rm" => number(&command, words.next()).map(Self::Delete),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(CommandParseError::Unknown(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("record".parse(), Ok(UserCommand::Record));
        assert_eq!(" R ".parse(), Ok(UserCommand::Record));
        assert_eq!("s".parse(), Ok(UserCommand::Stop));
        assert_eq!("ls".parse(), Ok(UserCommand::List));
        assert_eq!("?".parse(), Ok(UserCommand::Help));
        assert_eq!("exit".parse(), Ok(UserCommand::Quit));
    }

    #[test]
    fn parses_numbered_commands() {
        assert_eq!("play 2".parse(), Ok(UserCommand::Play(2)));
        assert_eq!("p #7".parse(), Ok(UserCommand::Play(7)));
        assert_eq!("rm 1".parse(), Ok(UserCommand::Delete(1)));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            "play".parse::<UserCommand>(),
            Err(CommandParseError::MissingNumber { .. })
        ));
        assert!(matches!(
            "delete zero".parse::<UserCommand>(),
            Err(CommandParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            "delete 0".parse::<UserCommand>(),
            Err(CommandParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!(
            "dance".parse::<UserCommand>(),
            Err(CommandParseError::Unknown("dance".to_string()))
        );
    }
}
