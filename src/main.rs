use anyhow::Context;
use argh::FromArgs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ts_playground::{DriverOptions, Environment, PlaygroundConfig, ReadlineTokens, SystemRunner, Tool};

#[derive(FromArgs)]
/// Scratch TypeScript playground: edit a script, then compile and run it on demand.
struct Args {
    #[argh(option)]
    /// editor command line used to open the script; defaults to $TS_PLAYGROUND_EDITOR or nvim.
    editor: Option<String>,

    #[argh(switch)]
    /// do not seed a tsconfig.json with `tsc --init`.
    no_scaffold: bool,

    #[argh(switch)]
    /// do not open the editor before the first prompt.
    no_initial_edit: bool,

    #[argh(switch, short = 'v')]
    /// log debug output to stderr.
    verbose: bool,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_tracing(args.verbose);

    match run(args) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<u8> {
    let env = Environment::capture();
    let mut config = PlaygroundConfig::from_env(&env);
    if let Some(editor) = args.editor.as_deref() {
        config.toolchain.editor =
            Tool::from_command_line(editor).context("--editor must not be empty")?;
    }
    if args.no_scaffold {
        config.toolchain.scaffold = None;
    }

    // A terminal Ctrl-C reaches the whole foreground group. The child still dies
    // from it (handlers reset on exec) while we stay alive to tear down.
    ctrlc::set_handler(|| {}).context("could not install interrupt handler")?;

    let mut input = ReadlineTokens::new("> ").context("could not open terminal for input")?;
    let runner = SystemRunner::new(env.clone());
    let options = DriverOptions {
        initial_edit: !args.no_initial_edit,
    };

    let status = ts_playground::driver::run(
        &config,
        &env,
        &runner,
        &mut input,
        &mut std::io::stdout(),
        options,
    );
    Ok(u8::try_from(status).unwrap_or(1))
}

/// Logs go to stderr so they never interleave with the session on stdout.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
