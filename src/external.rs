use crate::config::Tool;
use crate::env::Environment;
use crate::error::ExecError;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tracing::debug;

/// How one standard stream of a child process is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Share the session's terminal stream.
    Inherit,
    /// Buffer the stream for later inspection.
    Capture,
    /// Connect to the null device.
    Null,
}

impl StreamMode {
    fn stdio(self) -> Stdio {
        match self {
            StreamMode::Inherit => Stdio::inherit(),
            StreamMode::Capture => Stdio::piped(),
            StreamMode::Null => Stdio::null(),
        }
    }
}

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name used in user-facing messages.
    pub label: String,
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub stdin: StreamMode,
    pub stdout: StreamMode,
    pub stderr: StreamMode,
}

impl Invocation {
    /// Start from a configured tool; all streams inherited.
    pub fn new(tool: &Tool, cwd: impl Into<PathBuf>) -> Self {
        Self {
            label: tool.label.clone(),
            program: tool.program.clone().into(),
            args: tool.args.iter().map(OsString::from).collect(),
            cwd: cwd.into(),
            stdin: StreamMode::Inherit,
            stdout: StreamMode::Inherit,
            stderr: StreamMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdin(mut self, mode: StreamMode) -> Self {
        self.stdin = mode;
        self
    }

    pub fn stdout(mut self, mode: StreamMode) -> Self {
        self.stdout = mode;
        self
    }

    pub fn stderr(mut self, mode: StreamMode) -> Self {
        self.stderr = mode;
        self
    }
}

/// Output kept from a successful run; empty for inherited streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

/// Classified outcome of an invocation.
#[derive(Debug)]
pub enum ExecResult {
    Success(Captured),
    NonZeroExit { code: i32, captured: Captured },
    LaunchFailure(io::Error),
}

impl ExecResult {
    /// Turn the outcome into a `Result`, naming the program by `label` on failure.
    ///
    /// Captured stderr is preferred as diagnostics; captured stdout is used when
    /// stderr is empty, since some tools report errors there.
    pub fn into_result(self, label: &str) -> Result<Captured, ExecError> {
        match self {
            ExecResult::Success(captured) => Ok(captured),
            ExecResult::NonZeroExit { code, captured } => {
                let diagnostics = if captured.stderr.trim().is_empty() {
                    captured.stdout
                } else {
                    captured.stderr
                };
                Err(ExecError::NonZeroExit {
                    program: label.to_string(),
                    code,
                    diagnostics,
                })
            }
            ExecResult::LaunchFailure(source) => Err(ExecError::Launch {
                program: label.to_string(),
                source,
            }),
        }
    }
}

/// Runs external programs to completion.
pub trait ProcessRunner {
    fn invoke(&self, invocation: &Invocation) -> ExecResult;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    env: Environment,
}

impl SystemRunner {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    fn resolve<'a>(&self, program: &'a OsStr, cwd: &Path) -> io::Result<Cow<'a, Path>> {
        // Without a PATH there is nothing to check against; let spawn decide.
        let Some(search_paths) = self.env.get_var("PATH") else {
            return Ok(Cow::Borrowed(Path::new(program)));
        };
        find_command_path(OsStr::new(search_paths), cwd, Path::new(program)).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in PATH", program.to_string_lossy()),
            )
        })
    }
}

impl ProcessRunner for SystemRunner {
    fn invoke(&self, invocation: &Invocation) -> ExecResult {
        debug!(
            program = %invocation.program.to_string_lossy(),
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "invoking external program"
        );
        let program = match self.resolve(&invocation.program, &invocation.cwd) {
            Ok(program) => program,
            Err(e) => return ExecResult::LaunchFailure(e),
        };
        let output = std::process::Command::new(program.as_ref())
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(invocation.stdin.stdio())
            .stdout(invocation.stdout.stdio())
            .stderr(invocation.stderr.stdio())
            .output();
        let output = match output {
            Ok(output) => output,
            Err(e) => return ExecResult::LaunchFailure(e),
        };
        let captured = Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        let code = match output.status.code() {
            Some(x) => x,
            None => terminated_by_signal(output.status),
        };
        debug!(code, "external program finished");
        if code == 0 {
            ExecResult::Success(captured)
        } else {
            ExecResult::NonZeroExit { code, captured }
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - `./foo` on Unix or any path on other platforms: returns it if it exists under `cwd`.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists under `cwd`.
/// - Empty path: returns `None`.
///
/// Relative results are joined onto `cwd`, because the child is spawned there.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    cwd: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_cwd = cfg!(not(unix)) || path.starts_with("./");
    if search_in_cwd {
        let candidate = cwd.join(path);
        if candidate.exists() {
            return Some(Cow::Owned(candidate));
        }
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => {
            let candidate = cwd.join(path);
            find_by_path(&candidate).map(|p| Cow::Owned(p.to_path_buf()))
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}
