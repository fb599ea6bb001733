//! The strategies behind `r`, `e` and `clear`.

use crate::command::{CommandHandler, HandlerContext};
use crate::error::PlaygroundError;
use crate::external::{Invocation, StreamMode};
use std::path::PathBuf;
use tracing::debug;

/// ANSI "erase entire display".
pub const CLEAR_SEQUENCE: &str = "\x1b[2J";

/// Compile the script, then run the compiled artifact.
///
/// The compiler writes straight to the terminal; the runtime gets all three
/// terminal streams so the script can read input. A failed build skips the run.
pub struct RunScript {
    pub artifact_name: String,
}

impl CommandHandler for RunScript {
    fn execute(&self, ctx: &mut HandlerContext<'_>) -> Result<(), PlaygroundError> {
        let dir = ctx.playground.dir_path();
        let Some(script) = ctx.playground.script_path() else {
            return Err(missing_script());
        };
        let artifact = dir.join(&self.artifact_name);

        let compiler = &ctx.toolchain.compiler;
        let build = Invocation::new(compiler, dir)
            .arg(script)
            .arg("--outFile")
            .arg(&artifact)
            .stdin(StreamMode::Null);
        ctx.runner.invoke(&build).into_result(&compiler.label)?;
        debug!(artifact = %artifact.display(), "build finished");

        let runtime = &ctx.toolchain.runtime;
        let run = Invocation::new(runtime, dir).arg(&artifact);
        ctx.runner.invoke(&run).into_result(&runtime.label)?;
        Ok(())
    }
}

/// Open the script in the editor; the session cannot continue without it.
pub struct OpenEditor;

impl CommandHandler for OpenEditor {
    fn execute(&self, ctx: &mut HandlerContext<'_>) -> Result<(), PlaygroundError> {
        let Some(name) = ctx.playground.relative_script_name() else {
            return Err(missing_script());
        };
        let editor = &ctx.toolchain.editor;
        let invocation = Invocation::new(editor, ctx.playground.dir_path()).arg(name);
        ctx.runner
            .invoke(&invocation)
            .into_result(&editor.label)
            .map_err(|source| PlaygroundError::Editor {
                script: ctx
                    .playground
                    .script_path()
                    .map(PathBuf::from)
                    .unwrap_or_default(),
                source,
            })?;
        Ok(())
    }

    fn is_fatal_on_error(&self) -> bool {
        true
    }
}

pub struct ClearScreen;

impl CommandHandler for ClearScreen {
    fn execute(&self, ctx: &mut HandlerContext<'_>) -> Result<(), PlaygroundError> {
        let _ = ctx.out.write_all(CLEAR_SEQUENCE.as_bytes());
        let _ = ctx.out.flush();
        Ok(())
    }
}

fn missing_script() -> PlaygroundError {
    PlaygroundError::setup(
        "playground has no script file",
        std::io::ErrorKind::NotFound.into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaygroundConfig;
    use crate::env::Environment;
    use crate::error::ExecError;
    use crate::playground::{Playground, PlaygroundFactory};
    use crate::testing::{FakeRunner, Outcome};
    use std::ffi::OsString;

    fn playground(root: &std::path::Path) -> (PlaygroundConfig, Playground) {
        let mut config = PlaygroundConfig {
            temp_root: Some(root.to_path_buf()),
            ..PlaygroundConfig::default()
        };
        config.toolchain.scaffold = None;
        let playground = PlaygroundFactory::new(&config, &Environment::default(), &FakeRunner::default())
            .create()
            .unwrap();
        (config, playground)
    }

    fn run(
        handler: &dyn CommandHandler,
        config: &PlaygroundConfig,
        playground: &Playground,
        runner: &FakeRunner,
        out: &mut Vec<u8>,
    ) -> Result<(), PlaygroundError> {
        let mut ctx = HandlerContext {
            playground,
            toolchain: &config.toolchain,
            runner,
            out,
        };
        handler.execute(&mut ctx)
    }

    fn run_script(config: &PlaygroundConfig) -> RunScript {
        RunScript {
            artifact_name: config.artifact_name.clone(),
        }
    }

    #[test]
    fn run_compiles_then_executes_artifact() {
        let root = tempfile::tempdir().unwrap();
        let (config, playground) = playground(root.path());
        let runner = FakeRunner::default();
        let mut out = Vec::new();

        run(&run_script(&config), &config, &playground, &runner, &mut out).unwrap();

        let calls = runner.calls();
        assert_eq!(runner.programs(), vec!["npx", "node"]);
        let script = playground.script_path().unwrap();
        let artifact = playground.dir_path().join("playground.js");
        assert_eq!(
            calls[0].args,
            vec![
                OsString::from("tsc"),
                script.into(),
                "--outFile".into(),
                artifact.clone().into(),
            ]
        );
        assert_eq!(calls[0].stdout, StreamMode::Inherit);
        assert_eq!(calls[0].stderr, StreamMode::Inherit);
        assert_eq!(calls[1].args, vec![OsString::from(artifact)]);
        assert_eq!(calls[1].stdin, StreamMode::Inherit);
        for call in &calls {
            assert_eq!(call.cwd, playground.dir_path());
        }
    }

    #[test]
    fn build_failure_skips_execution() {
        let root = tempfile::tempdir().unwrap();
        let (config, playground) = playground(root.path());
        let runner = FakeRunner::default().with_outcome(
            "npx",
            Outcome::Exit {
                code: 2,
                stderr: String::new(),
            },
        );

        let err = run(&run_script(&config), &config, &playground, &runner, &mut Vec::new())
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("tsc"), "{message}");
        assert!(message.contains('2'), "{message}");
        assert_eq!(runner.programs(), vec!["npx"]);
        assert!(!RunScript::is_fatal_on_error(&run_script(&config)));
    }

    #[test]
    fn runtime_launch_failure_is_reported_by_label() {
        let root = tempfile::tempdir().unwrap();
        let (config, playground) = playground(root.path());
        let runner = FakeRunner::default().with_outcome("node", Outcome::Missing);

        let err = run(&run_script(&config), &config, &playground, &runner, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, PlaygroundError::Exec(ExecError::Launch { .. })));
        assert!(err.to_string().starts_with("failed to launch node"));
    }

    #[test]
    fn editor_opens_relative_name_in_playground_dir() {
        let root = tempfile::tempdir().unwrap();
        let (config, playground) = playground(root.path());
        let runner = FakeRunner::default();

        run(&OpenEditor, &config, &playground, &runner, &mut Vec::new()).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "nvim");
        assert_eq!(calls[0].args, vec![OsString::from("playground.ts")]);
        assert_eq!(calls[0].cwd, playground.dir_path());
        assert_eq!(
            (calls[0].stdin, calls[0].stdout, calls[0].stderr),
            (StreamMode::Inherit, StreamMode::Inherit, StreamMode::Inherit)
        );
    }

    #[test]
    fn editor_failure_names_script_and_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let (config, playground) = playground(root.path());
        let runner = FakeRunner::default().with_outcome("nvim", Outcome::Missing);

        let err = run(&OpenEditor, &config, &playground, &runner, &mut Vec::new()).unwrap_err();

        let message = err.to_string();
        assert!(message.contains(&*playground.script_path().unwrap().to_string_lossy()));
        assert!(message.contains("failed to launch nvim"), "{message}");
        assert!(OpenEditor.is_fatal_on_error());
    }

    #[test]
    fn clear_writes_escape_sequence_without_processes() {
        let root = tempfile::tempdir().unwrap();
        let (config, playground) = playground(root.path());
        let runner = FakeRunner::default();
        let mut out = Vec::new();

        run(&ClearScreen, &config, &playground, &runner, &mut out).unwrap();

        assert_eq!(out, CLEAR_SEQUENCE.as_bytes());
        assert!(runner.calls().is_empty());
    }
}
