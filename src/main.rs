use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hidscript::engine::DEFAULT_MAX_IMPORT_DEPTH;
use hidscript::{
    BootAction, Engine, EngineConfig, HidGadgetSink, InjectionSink, PtySink, RunReport, Settings,
    TraceSink,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hidscript",
    about = "Run keyboard/mouse payload scripts through an emulated HID device",
    version
)]
struct Cli {
    /// Log every executed line and injected primitive
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a payload script
    Run {
        /// Path to the payload script
        payload: PathBuf,

        #[command(flatten)]
        sink: SinkArgs,
    },

    /// Apply the boot settings: run the selected payload if auto-execute is on
    Boot {
        /// Settings file with `selected_payload` and `auto_execute`
        #[arg(long, default_value = "/settings.json")]
        settings: PathBuf,

        /// Directory holding the payload scripts
        #[arg(long, default_value = "/payloads")]
        payload_dir: PathBuf,

        #[command(flatten)]
        sink: SinkArgs,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SinkKind {
    /// Log primitives instead of injecting them
    Trace,
    /// Write HID reports to USB gadget devices
    Hidg,
    /// Type into a program running in a pseudo-terminal
    Pty,
}

#[derive(Args, Debug)]
struct SinkArgs {
    /// Where injected input goes
    #[arg(long, value_enum, default_value = "trace")]
    sink: SinkKind,

    /// Skip real sleeps (trace sink only)
    #[arg(long)]
    dry_run: bool,

    /// Keyboard gadget device
    #[arg(long, default_value = "/dev/hidg0")]
    keyboard_device: PathBuf,

    /// Mouse gadget device
    #[arg(long, default_value = "/dev/hidg1")]
    mouse_device: PathBuf,

    /// Program to spawn for the pty sink
    #[arg(short, long, default_value = "sh")]
    command: String,

    /// Arguments to pass to the program
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,

    /// Maximum number of nested imports
    #[arg(long, default_value_t = DEFAULT_MAX_IMPORT_DEPTH)]
    max_depth: usize,

    /// Default delay in milliseconds before the script sets one
    #[arg(long, default_value_t = 0)]
    default_delay: u64,
}

impl SinkArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            max_import_depth: self.max_depth,
            initial_default_delay: Duration::from_millis(self.default_delay),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run { payload, sink } => run_with(&payload, &sink).await,
        Command::Boot {
            settings,
            payload_dir,
            sink,
        } => match Settings::load_or_default(&settings).boot_action(&payload_dir) {
            BootAction::AutoRun(payload) => run_with(&payload, &sink).await,
            BootAction::Menu => {
                info!("auto-execute disabled; waiting for menu selection");
                Ok(())
            }
        },
    }
}

async fn run_with(payload: &Path, args: &SinkArgs) -> Result<()> {
    let report = match args.sink {
        SinkKind::Trace => {
            let (report, sink) = execute(TraceSink::new(args.dry_run), payload, args).await;
            info!(primitives = sink.primitives(), "trace finished");
            report
        }
        SinkKind::Hidg => {
            let sink = HidGadgetSink::open(&args.keyboard_device, Some(&args.mouse_device))
                .with_context(|| {
                    format!(
                        "Failed to open HID gadget {}",
                        args.keyboard_device.display()
                    )
                })?;
            execute(sink, payload, args).await.0
        }
        SinkKind::Pty => {
            let mut sink = PtySink::spawn(&args.command, &args.args)
                .context("Failed to spawn program for pty sink")?;
            // Give the program time to start up before typing into it.
            tokio::time::sleep(Duration::from_millis(100)).await;
            sink.flush_output()?;
            let (report, mut sink) = execute(sink, payload, args).await;
            sink.flush_output()?;
            report
        }
    };

    for message in report.messages() {
        warn!("{message}");
    }
    if !report.completed {
        bail!("Payload did not complete: {}", payload.display());
    }
    Ok(())
}

async fn execute<S: InjectionSink>(sink: S, payload: &Path, args: &SinkArgs) -> (RunReport, S) {
    let mut engine = Engine::with_config(sink, args.config());

    let cancel = engine.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let report = engine.run(payload).await;
    (report, engine.into_sink())
}
