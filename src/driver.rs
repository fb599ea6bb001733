use crate::command::{CommandHandler, HandlerContext};
use crate::config::PlaygroundConfig;
use crate::env::Environment;
use crate::error::PlaygroundError;
use crate::external::ProcessRunner;
use crate::handlers::OpenEditor;
use crate::input::TokenSource;
use crate::playground::{Playground, PlaygroundFactory, SetupFailure};
use crate::session::Session;
use std::io::Write;
use tracing::{error, info, warn};

/// Options that shape a whole run, beyond the playground configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Open the editor once before the first prompt.
    pub initial_edit: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self { initial_edit: true }
    }
}

/// Create a playground, run a session over it and tear it down again.
///
/// Returns the process exit status: `0` when the user left the session,
/// `1` on setup failure or a fatal session error. Teardown happens on every
/// path; its failure is reported to stderr but never changes the status.
pub fn run(
    config: &PlaygroundConfig,
    env: &Environment,
    runner: &dyn ProcessRunner,
    input: &mut dyn TokenSource,
    out: &mut dyn Write,
    options: DriverOptions,
) -> i32 {
    let (mut playground, result) = match PlaygroundFactory::new(config, env, runner).create() {
        Ok(playground) => {
            announce(&playground, out);
            let result = session(&playground, config, runner, input, out, options);
            (playground, result)
        }
        Err(SetupFailure { error, playground }) => (playground, Err(error)),
    };

    let status = match &result {
        Ok(()) => 0,
        Err(e) => {
            let status = e.exit_code();
            if status == 0 {
                info!(reason = %e, "session ended by user");
            } else {
                error!(error = %e, "playground failed");
                eprintln!("{e}");
            }
            status
        }
    };

    teardown(&mut playground);
    status
}

fn announce(playground: &Playground, out: &mut dyn Write) {
    if let Some(script) = playground.script_path() {
        let _ = writeln!(out, "Created temp file at {}", script.display());
    }
    let _ = writeln!(out, "Setup playground at {}", playground.dir_path().display());
    let _ = out.flush();
}

fn session(
    playground: &Playground,
    config: &PlaygroundConfig,
    runner: &dyn ProcessRunner,
    input: &mut dyn TokenSource,
    out: &mut dyn Write,
    options: DriverOptions,
) -> Result<(), PlaygroundError> {
    if options.initial_edit {
        let mut ctx = HandlerContext {
            playground,
            toolchain: &config.toolchain,
            runner,
            out: &mut *out,
        };
        OpenEditor.execute(&mut ctx)?;
    }
    Session::new(playground, config, runner, out).run(input)
}

fn teardown(playground: &mut Playground) {
    if let Err(e) = playground.destroy() {
        warn!(dir = %playground.dir_path().display(), error = %e, "cleanup failed");
        eprintln!(
            "Failed to cleanup at {}\n{}",
            playground.dir_path().display(),
            e
        );
    }
}
