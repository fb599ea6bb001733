//! A scratch TypeScript playground for the terminal.
//!
//! The crate allocates an ephemeral directory holding a single script, opens an
//! external editor on it and, on request, compiles and runs the script with the
//! output streamed straight to the terminal. Everything is torn down again when
//! the session ends, whichever way it ends.
//!
//! The main entry point is [`driver::run`], which ties together a
//! [`PlaygroundFactory`], a [`Session`] and a [`ProcessRunner`]. The pieces are
//! public so they can be driven individually, for example with
//! [`ScriptedTokens`] instead of an interactive terminal.

pub mod command;
pub mod config;
pub mod driver;
pub mod env;
pub mod error;
pub mod external;
pub mod handlers;
pub mod input;
pub mod playground;
pub mod session;
#[cfg(test)]
mod testing;

pub use config::{PlaygroundConfig, Tool, Toolchain};
pub use driver::DriverOptions;
pub use env::Environment;
pub use error::{ExecError, InputError, PlaygroundError};
pub use external::{ProcessRunner, SystemRunner};
pub use input::{ReadlineTokens, ScriptedTokens, TokenSource};
pub use playground::{Playground, PlaygroundFactory, SetupFailure};
pub use session::{Session, SessionState};
