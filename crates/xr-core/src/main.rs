//! xrenice - renice the process that owns an X window
//!
//! The entry point handles:
//! - Argument parsing and logging setup
//! - Configuration loading
//! - Choosing a window system backend (live display or JSON snapshot)
//! - Reading the process id property and applying the priority
//! - Reporting the outcome as text or JSON

use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use xr_common::error::format_error_human;
use xr_common::{Error, OutputFormat, Result, WindowId};
use xr_config::{load_config, Config, HIGHEST_PRIORITY};
use xr_core::exit_codes::ExitCode;
use xr_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use xr_core::pipeline::PropertyPipeline;
use xr_core::priority::{PriorityAdapter, PriorityConfig};
use xr_core::registry::AtomRegistry;
use xr_core::report::{PriorityOutcome, Report};
use xr_core::window::{resolve_target, SnapshotSystem, TargetSelector, WindowSystem};

/// Change the scheduling priority of the process that owns a window
#[derive(Parser, Debug)]
#[command(name = "xrenice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Window id (hex 0x... or decimal); defaults to the active window
    #[arg(value_name = "WINDOW", conflicts_with = "root")]
    window: Option<WindowId>,

    /// Priority to set, -20 (highest) to 19 (lowest)
    #[arg(short, long, env = "XRENICEPRIO", allow_negative_numbers = true)]
    priority: Option<i32>,

    /// Only report the current priority
    #[arg(short, long)]
    get: bool,

    /// Target the root window
    #[arg(long)]
    root: bool,

    /// Property holding the process id
    #[arg(long, value_name = "NAME")]
    property: Option<String>,

    /// Upper bound on fetched property bytes and rendered text
    #[arg(long, value_name = "BYTES")]
    max_length: Option<NonZeroUsize>,

    /// Read windows and atoms from a JSON snapshot instead of a display
    #[arg(long, value_name = "FILE", env = "XRENICE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// X display to connect to
    #[arg(long, value_name = "NAME", env = "DISPLAY")]
    display: Option<String>,

    /// Path to config.json
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log output format on stderr
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn target(&self) -> TargetSelector {
        match (self.root, self.window) {
            (true, _) => TargetSelector::Root,
            (false, Some(window)) => TargetSelector::Id(window),
            (false, None) => TargetSelector::Active,
        }
    }

    fn priority_config(&self, config: &Config) -> PriorityConfig {
        PriorityConfig {
            priority: self
                .priority
                .or(config.priority)
                .unwrap_or(HIGHEST_PRIORITY),
            clamp_to_range: config.clamp_priority,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Clean,
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = LogLevel::from_verbosity(cli.verbose, cli.quiet);
    let log_config = LogConfig::from_env(cli_level, cli.log_format);
    init_logging(&log_config, cli_level.is_some());

    let run_id = generate_run_id();
    let span = tracing::info_span!("xrenice", run_id = %run_id);
    let exit_code = span.in_scope(|| run(&cli, &run_id));

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, run_id: &str) -> ExitCode {
    let loaded = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            let mut report = Report::new(run_id, "invalid");
            return finish(cli, &mut report, Err(Error::Config(e.to_string())));
        }
    };
    tracing::debug!(
        source = %loaded.source,
        path = ?loaded.path,
        config = loaded.snapshot.short_id(),
        mappings = loaded.config.mappings.len(),
        "loaded configuration"
    );

    let mut report = Report::new(run_id, loaded.snapshot.short_id());
    let result = match &cli.snapshot {
        Some(path) => SnapshotSystem::from_file(path)
            .and_then(|system| execute(&system, cli, &loaded.config, &mut report)),
        None => execute_live(cli, &loaded.config, &mut report),
    };
    finish(cli, &mut report, result)
}

#[cfg(feature = "x11")]
fn execute_live(cli: &Cli, config: &Config, report: &mut Report) -> Result<()> {
    let system = xr_core::window::X11System::connect(cli.display.as_deref())?;
    execute(&system, cli, config, report)
}

#[cfg(not(feature = "x11"))]
fn execute_live(cli: &Cli, _config: &Config, _report: &mut Report) -> Result<()> {
    tracing::debug!(display = ?cli.display, "no live backend compiled in");
    Err(Error::UnsupportedPlatform(
        "built without X11 support; use --snapshot".to_string(),
    ))
}

/// Resolve the window, read its process id and apply or query the priority.
///
/// Fills `report` as far as the run gets, so a failure still shows the
/// window and property that were reached.
fn execute<W: WindowSystem>(
    system: &W,
    cli: &Cli,
    config: &Config,
    report: &mut Report,
) -> Result<()> {
    let mut registry = AtomRegistry::with_builtins(system)?;
    let registered = registry.register_config(&config.mappings, system)?;
    tracing::debug!(registered, total = registry.len(), "atom registry ready");

    let window = resolve_target(system, cli.target())?;
    report.window = Some(window);

    let max_length = cli
        .max_length
        .map(NonZeroUsize::get)
        .unwrap_or_else(|| config.effective_max_length());
    let name = cli.property.as_deref().unwrap_or(config.property_name());

    let pipeline = PropertyPipeline::new(system, &registry, max_length);
    let property = pipeline.read(window, name)?;
    let pid = property.process_id();
    report.property = Some(property);
    let pid = pid?;
    report.pid = Some(pid);

    let adapter = PriorityAdapter::system(cli.priority_config(config));
    report.priority = Some(if cli.get {
        PriorityOutcome::Get {
            priority: adapter.read(pid)?,
        }
    } else {
        adapter.apply(pid)?.into()
    });
    Ok(())
}

/// Print the report and pick the exit code.
fn finish(cli: &Cli, report: &mut Report, result: Result<()>) -> ExitCode {
    let exit_code = match &result {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            report.fail(err);
            if err.is_recoverable() {
                tracing::warn!(code = err.code(), "{err}");
            } else {
                tracing::debug!(code = err.code(), "{err}");
            }
            ExitCode::for_error(err)
        }
    };

    match cli.format {
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to serialize report: {e}");
                return ExitCode::IoError;
            }
        },
        OutputFormat::Text => {
            print!("{}", report.render_text(cli.verbose > 0));
            if let Err(err) = &result {
                if !err.is_recoverable() {
                    eprintln!(
                        "{}",
                        format_error_human(err, std::io::stderr().is_terminal())
                    );
                }
            }
        }
    }

    exit_code
}
