//! Playground configuration: which programs to run and where files go.
//!
//! Values are layered: built-in defaults, then [`Environment`] overrides,
//! then whatever the caller (usually the command line) sets explicitly.

use crate::env::Environment;
use std::path::PathBuf;

/// Environment variable holding the editor command line, e.g. `code --wait`.
pub const EDITOR_VAR: &str = "TS_PLAYGROUND_EDITOR";
/// Environment variable holding the runtime command line, e.g. `bun`.
pub const RUNTIME_VAR: &str = "TS_PLAYGROUND_RUNTIME";

/// An external program plus the arguments that always precede per-call ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Name shown to the user in messages such as `tsc exited with status code 2`.
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Tool {
    pub fn new(label: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split a whitespace-separated command line; the program doubles as label.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Tool::new(program, program).with_args(words))
    }
}

/// The four external programs a session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub editor: Tool,
    /// One-time project seeding; `None` skips it.
    pub scaffold: Option<Tool>,
    pub compiler: Tool,
    pub runtime: Tool,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            editor: Tool::new("nvim", "nvim"),
            scaffold: Some(Tool::new("tsc", "npx").with_args(["-y", "tsc", "--init"])),
            compiler: Tool::new("tsc", "npx").with_args(["tsc"]),
            runtime: Tool::new("node", "node"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaygroundConfig {
    /// Directory the playground is created under; the OS temp root when `None`.
    pub temp_root: Option<PathBuf>,
    pub dir_prefix: String,
    pub script_name: String,
    pub artifact_name: String,
    pub toolchain: Toolchain,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            dir_prefix: "ts-playground-".to_string(),
            script_name: "playground.ts".to_string(),
            artifact_name: "playground.js".to_string(),
            toolchain: Toolchain::default(),
        }
    }
}

impl PlaygroundConfig {
    /// Defaults with the editor and runtime overridable from the environment.
    pub fn from_env(env: &Environment) -> Self {
        let mut config = Self::default();
        if let Some(editor) = env.get_var(EDITOR_VAR).and_then(Tool::from_command_line) {
            config.toolchain.editor = editor;
        }
        if let Some(runtime) = env.get_var(RUNTIME_VAR).and_then(Tool::from_command_line) {
            config.toolchain.runtime = runtime;
        }
        config
    }
}
