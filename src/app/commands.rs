//! Commands the entry point accepts from the command line.
//!
//! ```text
//! feeder [demo]
//! feeder feed [SECONDS] [SPEED]
//! feeder init-config [PATH]
//! ```

use core::fmt;
use std::path::PathBuf;

/// Commands that the binary dispatches.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Non-PWM run: start, wait, toggle direction, wait, stop.
    Demo,

    /// Dispenser feed.  `None` fields fall back to the config preset.
    Feed {
        secs: Option<u32>,
        speed: Option<f64>,
    },

    /// Write the default configuration as JSON.
    InitConfig(Option<PathBuf>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand(String),
    InvalidArgument(&'static str, String),
    UnexpectedArgument(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand(c) => write!(
                f,
                "unknown command '{}' (expected demo, feed or init-config)",
                c
            ),
            Self::InvalidArgument(name, v) => write!(f, "invalid {}: '{}'", name, v),
            Self::UnexpectedArgument(v) => write!(f, "unexpected argument '{}'", v),
        }
    }
}

impl std::error::Error for CommandError {}

impl AppCommand {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let command = match args.next().as_deref() {
            None | Some("demo") => Self::Demo,
            Some("feed") => {
                let secs = args
                    .next()
                    .map(|s| {
                        s.parse::<u32>()
                            .map_err(|_| CommandError::InvalidArgument("seconds", s))
                    })
                    .transpose()?;
                let speed = args
                    .next()
                    .map(|s| match s.parse::<f64>() {
                        Ok(v) if (0.0..=100.0).contains(&v) => Ok(v),
                        _ => Err(CommandError::InvalidArgument("speed", s)),
                    })
                    .transpose()?;
                Self::Feed { secs, speed }
            }
            Some("init-config") => Self::InitConfig(args.next().map(PathBuf::from)),
            Some(other) => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        match args.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra)),
            None => Ok(command),
        }
    }
}
