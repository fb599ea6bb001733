use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single external program invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started at all (missing binary, permission denied, ...).
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and exited with a non-zero status.
    #[error("{program} exited with status code {code}")]
    NonZeroExit {
        program: String,
        code: i32,
        /// Whatever the program wrote to a captured stream, empty for inherited streams.
        diagnostics: String,
    },
}

impl ExecError {
    /// Captured diagnostic output, if the failing stream was captured.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            ExecError::NonZeroExit { diagnostics, .. } if !diagnostics.is_empty() => {
                Some(diagnostics)
            }
            _ => None,
        }
    }
}

/// Reasons the interactive read could not produce a command token.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("interrupted")]
    Interrupted,

    #[error("end of input")]
    Eof,

    #[error("empty command token")]
    Empty,

    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl InputError {
    /// Ctrl-C and Ctrl-D are how a user leaves the session.
    pub fn is_user_exit(&self) -> bool {
        matches!(self, InputError::Interrupted | InputError::Eof)
    }
}

/// Top-level error taxonomy of a playground session.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// A required OS facility is unavailable.
    #[error("failed to retrieve temporary directory")]
    Environment,

    /// Creating the directory or the script file failed.
    #[error("{message}: {source}")]
    Setup {
        message: String,
        #[source]
        source: io::Error,
    },

    /// The scaffolding tool failed or could not be launched.
    #[error("failed to setup playground project: {0}")]
    Scaffold(#[source] ExecError),

    /// The editor failed; always fatal for the session.
    #[error("failed to open editor in {}: {}", .script.display(), .source)]
    Editor {
        script: PathBuf,
        #[source]
        source: ExecError,
    },

    /// A build or execute step failed; reported inline, never fatal.
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("could not read input: {0}")]
    Input(#[from] InputError),
}

impl PlaygroundError {
    pub(crate) fn setup(message: impl Into<String>, source: io::Error) -> Self {
        PlaygroundError::Setup {
            message: message.into(),
            source,
        }
    }

    /// Process exit status this error maps to when it reaches the driver.
    pub fn exit_code(&self) -> i32 {
        match self {
            PlaygroundError::Input(input) if input.is_user_exit() => 0,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_names_program_and_code() {
        let err = ExecError::NonZeroExit {
            program: "tsc".to_string(),
            code: 2,
            diagnostics: String::new(),
        };
        assert_eq!(err.to_string(), "tsc exited with status code 2");
        assert!(err.diagnostics().is_none());
    }

    #[test]
    fn launch_failure_reads_differently_from_exit_failure() {
        let err = ExecError::Launch {
            program: "node".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let message = err.to_string();
        assert!(message.starts_with("failed to launch node"), "{message}");
        assert!(!message.contains("status code"));
    }

    #[test]
    fn editor_error_names_script() {
        let err = PlaygroundError::Editor {
            script: PathBuf::from("/tmp/ts-playground-x/playground.ts"),
            source: ExecError::NonZeroExit {
                program: "nvim".to_string(),
                code: 1,
                diagnostics: String::new(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("playground.ts"));
        assert!(message.contains("nvim exited with status code 1"));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(PlaygroundError::Input(InputError::Interrupted).exit_code(), 0);
        assert_eq!(PlaygroundError::Input(InputError::Eof).exit_code(), 0);
        assert_eq!(PlaygroundError::Input(InputError::Empty).exit_code(), 1);
        assert_eq!(PlaygroundError::Environment.exit_code(), 1);
        assert_eq!(
            PlaygroundError::setup("failed to create temporary file", io::ErrorKind::Other.into())
                .exit_code(),
            1
        );
    }
}
