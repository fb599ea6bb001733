use crate::command::{Command, CommandHandler, HandlerContext};
use crate::config::PlaygroundConfig;
use crate::error::{InputError, PlaygroundError};
use crate::external::ProcessRunner;
use crate::handlers::{ClearScreen, OpenEditor, RunScript};
use crate::input::TokenSource;
use crate::playground::Playground;
use std::io::Write;
use tracing::{debug, info, warn};

/// Where the session loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    Dispatching,
    Terminated,
}

/// The interactive read-dispatch loop over one [`Playground`].
///
/// Run and clear failures are printed and the loop continues; editor
/// failures and input failures end it.
///
/// Example
/// ```no_run
/// use ts_playground::{Environment, PlaygroundConfig, PlaygroundFactory, ScriptedTokens, Session, SystemRunner};
///
/// let env = Environment::capture();
/// let config = PlaygroundConfig::from_env(&env);
/// let runner = SystemRunner::new(env.clone());
/// let playground = PlaygroundFactory::new(&config, &env, &runner).create().unwrap();
/// let mut out = std::io::stdout();
/// let mut session = Session::new(&playground, &config, &runner, &mut out);
/// let err = session.run(&mut ScriptedTokens::new(["r"])).unwrap_err();
/// assert_eq!(err.exit_code(), 0);
/// ```
pub struct Session<'a> {
    playground: &'a Playground,
    config: &'a PlaygroundConfig,
    runner: &'a dyn ProcessRunner,
    out: &'a mut dyn Write,
    state: SessionState,
}

impl<'a> Session<'a> {
    pub fn new(
        playground: &'a Playground,
        config: &'a PlaygroundConfig,
        runner: &'a dyn ProcessRunner,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            playground,
            config,
            runner,
            out,
            state: SessionState::AwaitingCommand,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the loop until input fails or a fatal handler error occurs.
    ///
    /// Always returns the error that ended the session.
    pub fn run(&mut self, input: &mut dyn TokenSource) -> Result<(), PlaygroundError> {
        loop {
            self.prompt();

            let token = match input.next_token() {
                Ok(token) if token.is_empty() => Err(InputError::Empty),
                other => other,
            };
            let token = match token {
                Ok(token) => token,
                Err(e) => {
                    self.state = SessionState::Terminated;
                    info!(reason = %e, "session input ended");
                    return Err(e.into());
                }
            };

            let command = Command::parse(&token);
            debug!(%command, "dispatching");
            self.dispatch(&command)?;

            let _ = writeln!(self.out);
        }
    }

    /// Execute the handler for a single command.
    ///
    /// Non-fatal handler errors are reported to the session output and
    /// swallowed; only fatal ones are returned.
    pub fn dispatch(&mut self, command: &Command) -> Result<(), PlaygroundError> {
        let run_script;
        let handler: &dyn CommandHandler = match command {
            Command::Run => {
                run_script = RunScript {
                    artifact_name: self.config.artifact_name.clone(),
                };
                &run_script
            }
            Command::Editor => &OpenEditor,
            Command::Clear => &ClearScreen,
            Command::Unknown(token) => {
                let _ = writeln!(self.out, "Unknown command {token}");
                return Ok(());
            }
        };

        self.state = SessionState::Dispatching;
        let mut ctx = HandlerContext {
            playground: self.playground,
            toolchain: &self.config.toolchain,
            runner: self.runner,
            out: &mut *self.out,
        };
        let result = handler.execute(&mut ctx);
        self.state = SessionState::AwaitingCommand;
        match result {
            Ok(()) => Ok(()),
            Err(e) if handler.is_fatal_on_error() => {
                self.state = SessionState::Terminated;
                Err(e)
            }
            Err(e) => {
                warn!(%command, error = %e, "command failed");
                let _ = writeln!(self.out, "error: {e}");
                Ok(())
            }
        }
    }

    fn prompt(&mut self) {
        let _ = writeln!(
            self.out,
            "Enter command ({} to run, {} for editor, {} to clear output, ctrl-c to exit)",
            Command::RUN_TOKEN,
            Command::EDITOR_TOKEN,
            Command::CLEAR_TOKEN,
        );
        let _ = self.out.flush();
    }
}
