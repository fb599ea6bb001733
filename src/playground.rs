//! The ephemeral workspace: one temp directory holding one script file.
//!
//! [`PlaygroundFactory::create`] acquires it and [`Playground::destroy`] releases
//! it. `destroy` is idempotent and also runs from `Drop`, so the directory is
//! removed on every exit path, including unwinding.

use crate::config::PlaygroundConfig;
use crate::env::Environment;
use crate::error::PlaygroundError;
use crate::external::{Invocation, ProcessRunner, StreamMode};
use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Exclusively owned scratch directory plus the script inside it.
#[derive(Debug, Default)]
pub struct Playground {
    dir: Option<TempDir>,
    /// Kept after teardown so failures can still name the directory.
    dir_path: PathBuf,
    script: Option<(PathBuf, File)>,
}

impl Playground {
    /// A playground that never got a directory.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Absolute path of the playground directory; empty if none was created.
    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    pub fn script_path(&self) -> Option<&Path> {
        self.script.as_ref().map(|(path, _)| path.as_path())
    }

    /// File name of the script relative to [`Playground::dir_path`].
    pub fn relative_script_name(&self) -> Option<&OsStr> {
        self.script_path().and_then(Path::file_name)
    }

    /// Whether the directory is still owned by this playground.
    pub fn is_live(&self) -> bool {
        self.dir.is_some()
    }

    /// Close the script handle and recursively remove the directory.
    ///
    /// Safe to call on an empty playground and safe to call repeatedly; a
    /// directory that is already gone counts as removed.
    pub fn destroy(&mut self) -> io::Result<()> {
        // Close errors are ignored.
        drop(self.script.take());

        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        debug!(dir = %self.dir_path.display(), "removing playground");
        match dir.close() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

impl Drop for Playground {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            warn!(dir = %self.dir_path.display(), error = %e, "failed to cleanup playground");
        }
    }
}

/// Setup failed part-way; `playground` holds whatever was created and still
/// needs to be destroyed by the caller.
#[derive(Debug)]
pub struct SetupFailure {
    pub error: PlaygroundError,
    pub playground: Playground,
}

impl SetupFailure {
    fn new(error: PlaygroundError, playground: Playground) -> Self {
        Self { error, playground }
    }
}

/// Allocates playgrounds according to a [`PlaygroundConfig`].
pub struct PlaygroundFactory<'a> {
    config: &'a PlaygroundConfig,
    env: &'a Environment,
    runner: &'a dyn ProcessRunner,
}

impl<'a> PlaygroundFactory<'a> {
    pub fn new(
        config: &'a PlaygroundConfig,
        env: &'a Environment,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            config,
            env,
            runner,
        }
    }

    /// Create the directory and script, then run the scaffolding step.
    pub fn create(&self) -> Result<Playground, SetupFailure> {
        let playground = self
            .allocate()
            .map_err(|e| SetupFailure::new(e, Playground::empty()))?;
        if let Some(script) = playground.script_path() {
            info!(script = %script.display(), "created temp file");
        }

        if let Err(e) = self.scaffold(playground.dir_path()) {
            return Err(SetupFailure::new(e, playground));
        }
        info!(dir = %playground.dir_path().display(), "playground ready");

        Ok(playground)
    }

    fn allocate(&self) -> Result<Playground, PlaygroundError> {
        let root = match &self.config.temp_root {
            Some(root) => root.clone(),
            None => self.env.temp_root().ok_or(PlaygroundError::Environment)?,
        };

        let dir = tempfile::Builder::new()
            .prefix(&self.config.dir_prefix)
            .tempdir_in(&root)
            .map_err(|e| PlaygroundError::setup("failed to create temporary directory", e))?;

        let mut playground = Playground {
            dir_path: dir.path().to_path_buf(),
            dir: Some(dir),
            script: None,
        };

        // On the error paths below `playground` is dropped, which removes the directory.
        let script_path = playground.dir_path.join(&self.config.script_name);
        let file = File::create(&script_path)
            .map_err(|e| PlaygroundError::setup("failed to create temporary file", e))?;
        grant_permissions(&script_path).map_err(|e| {
            PlaygroundError::setup("failed to get allocated permission on playground file", e)
        })?;
        playground.script = Some((script_path, file));

        Ok(playground)
    }

    fn scaffold(&self, dir: &Path) -> Result<(), PlaygroundError> {
        let Some(tool) = &self.config.toolchain.scaffold else {
            debug!("scaffolding disabled");
            return Ok(());
        };
        let invocation = Invocation::new(tool, dir)
            .stdin(StreamMode::Null)
            .stdout(StreamMode::Capture)
            .stderr(StreamMode::Capture);

        match self.runner.invoke(&invocation).into_result(&tool.label) {
            Ok(captured) => {
                if !captured.stdout.trim().is_empty() {
                    debug!(output = %captured.stdout.trim_end(), "scaffolding output");
                }
                Ok(())
            }
            Err(e) => {
                if let Some(diagnostics) = e.diagnostics() {
                    eprintln!("{}", diagnostics.trim_end());
                }
                Err(PlaygroundError::Scaffold(e))
            }
        }
    }
}

#[cfg(unix)]
fn grant_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
}

#[cfg(not(unix))]
fn grant_permissions(path: &Path) -> io::Result<()> {
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_readonly(false);
    std::fs::set_permissions(path, permissions)
}
