use crate::config::Toolchain;
use crate::error::PlaygroundError;
use crate::external::ProcessRunner;
use crate::playground::Playground;
use std::fmt;
use std::io::Write;

/// A session command, parsed from a single input token.
///
/// Tokens are matched exactly and case-sensitively; anything else is
/// [`Command::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Editor,
    Clear,
    Unknown(String),
}

impl Command {
    pub const RUN_TOKEN: &'static str = "r";
    pub const EDITOR_TOKEN: &'static str = "e";
    pub const CLEAR_TOKEN: &'static str = "clear";

    pub fn parse(token: &str) -> Self {
        match token {
            Self::RUN_TOKEN => Command::Run,
            Self::EDITOR_TOKEN => Command::Editor,
            Self::CLEAR_TOKEN => Command::Clear,
            other => Command::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Run => f.write_str(Self::RUN_TOKEN),
            Command::Editor => f.write_str(Self::EDITOR_TOKEN),
            Command::Clear => f.write_str(Self::CLEAR_TOKEN),
            Command::Unknown(token) => f.write_str(token),
        }
    }
}

/// Everything a handler may touch while it runs.
pub struct HandlerContext<'a> {
    pub playground: &'a Playground,
    pub toolchain: &'a Toolchain,
    pub runner: &'a dyn ProcessRunner,
    /// Session output, used for in-process effects such as clearing the screen.
    pub out: &'a mut dyn Write,
}

/// Strategy behind a recognised [`Command`].
pub trait CommandHandler {
    fn execute(&self, ctx: &mut HandlerContext<'_>) -> Result<(), PlaygroundError>;

    /// Whether an error from [`CommandHandler::execute`] ends the session.
    fn is_fatal_on_error(&self) -> bool {
        false
    }
}
