// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `stunt`: check continuity text, animate shows and solve transitions.
//!
//! Results go to stdout; logs go to stderr and follow `RUST_LOG`.

mod report;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use stunt_app_core::config::ConfigService;
use stunt_app_core::config_port::ConfigPort;
use stunt_app_core::prefs::{StuntPrefs, PREFS_KEY};
use stunt_config_fs::FsConfigStore;
use stunt_core::{build_timeline_with, compile, compile_for_sheet, AnimationConfig, Show};
use stunt_geom::Beat;
use stunt_solver::{
    spawn_solver, validate_sheet_for_solver, AlgorithmIdentifier, MarcherInstruction,
    MovementPattern, ProgressDelegate, TransitionSolverResult, MAX_INSTRUCTIONS,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stunt", author, version, about = "Marching show tools: continuities, timelines, transitions")]
struct Args {
    /// Directory holding `prefs.json` (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile continuity text and print its canonical form
    Check {
        /// File holding continuity text
        file: PathBuf,
        /// Also check beat counts against a sheet of this many beats
        #[arg(long)]
        beats: Option<u32>,
    },
    /// Build a show's timeline and report problems and collisions
    Animate {
        /// Show file (JSON)
        show: PathBuf,
        /// Print every marcher on this global beat
        #[arg(long)]
        beat: Option<usize>,
    },
    /// Search for continuities moving every marcher between two sheets
    Solve {
        /// Show file (JSON)
        show: PathBuf,
        /// Index of the starting sheet
        #[arg(long)]
        from: usize,
        /// Index of the target sheet
        #[arg(long)]
        to: usize,
        /// Search strategy (defaults to the saved prefs)
        #[arg(long, value_parser = parse_algorithm)]
        algorithm: Option<AlgorithmIdentifier>,
        /// Instruction as PATTERN[:WAIT], e.g. `EWNS:2`; repeat for up to eight
        #[arg(long = "instruction", value_parser = parse_instruction)]
        instructions: Vec<MarcherInstruction>,
        /// Abort the search after this many seconds
        #[arg(long, value_parser = parse_seconds)]
        timeout: Option<Duration>,
    },
    /// Manage saved preferences
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write default preferences
    Init {
        /// Overwrite existing preferences
        #[arg(long)]
        force: bool,
    },
    /// Print the preferences in effect
    Show,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config_dir = args.config_dir.as_deref();
    match args.command {
        Commands::Check { file, beats } => check(&file, beats),
        Commands::Animate { show, beat } => animate(&show, beat, &load_prefs(config_dir)),
        Commands::Solve {
            show,
            from,
            to,
            algorithm,
            instructions,
            timeout,
        } => {
            let request = SolveRequest {
                from,
                to,
                algorithm,
                instructions,
                timeout,
            };
            solve(&show, &request, &load_prefs(config_dir))
        }
        Commands::Config { command } => config(config_dir, &command),
    }
}

fn parse_algorithm(name: &str) -> Result<AlgorithmIdentifier, String> {
    AlgorithmIdentifier::ALL
        .into_iter()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = AlgorithmIdentifier::ALL
                .into_iter()
                .map(AlgorithmIdentifier::name)
                .collect();
            format!("unknown algorithm '{name}' (expected one of {})", known.join(", "))
        })
}

fn parse_instruction(text: &str) -> Result<MarcherInstruction, String> {
    let (verb, wait) = text.split_once(':').unwrap_or((text, "0"));
    let pattern = MovementPattern::from_verb(verb.trim())
        .ok_or_else(|| format!("unknown movement pattern '{verb}' (expected EWNS, NSEW, DMHS or HSDM)"))?;
    let wait_beats = wait
        .trim()
        .parse()
        .map_err(|_| format!("wait beats must be a non-negative integer, got '{wait}'"))?;
    Ok(MarcherInstruction::new(pattern, wait_beats))
}

fn parse_seconds(text: &str) -> Result<Duration, String> {
    let seconds: f64 = text
        .parse()
        .map_err(|_| format!("expected a number of seconds, got '{text}'"))?;
    Duration::try_from_secs_f64(seconds).map_err(|err| format!("invalid timeout '{text}': {err}"))
}

fn open_config(dir: Option<&Path>) -> Result<ConfigService<FsConfigStore>> {
    let store = match dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    }
    .context("opening config directory")?;
    Ok(ConfigService::new(store))
}

/// Saved prefs, or defaults when there are none or they cannot be read.
fn load_prefs(dir: Option<&Path>) -> StuntPrefs {
    match open_config(dir) {
        Ok(service) => service.load_prefs().unwrap_or_else(|| {
            debug!("no saved prefs; using defaults");
            StuntPrefs::default()
        }),
        Err(err) => {
            warn!(error = %err, "config unavailable; using default prefs");
            StuntPrefs::default()
        }
    }
}

fn read_show(path: &Path) -> Result<Show> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing show {}", path.display()))
}

fn check(file: &Path, beats: Option<u32>) -> Result<ExitCode> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let compiled = match beats {
        Some(beats) => compile_for_sheet(&text, beats),
        None => compile(&text),
    };
    match compiled {
        Ok(list) => {
            let mut out = io::stdout().lock();
            if !list.is_empty() {
                writeln!(out, "{list}")?;
            }
            writeln!(out, "ok: {} procedure(s)", list.len())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(io::stderr(), "{}: {err}", file.display())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn animate(path: &Path, beat: Option<usize>, prefs: &StuntPrefs) -> Result<ExitCode> {
    let show = read_show(path)?;
    let config = AnimationConfig::from(prefs.animation);
    debug!(path = %path.display(), ?config, "animating show");
    let timeline = build_timeline_with(&show, &config);

    let mut out = io::stdout().lock();
    report::summary(&mut out, &show, &timeline)?;
    if let Some(index) = beat {
        let beat = Beat::new(index);
        let frame = timeline.frame_at(beat).ok_or_else(|| {
            anyhow!("beat {index} is past the end of the show ({} beats)", timeline.total_beats())
        })?;
        report::frame(&mut out, &timeline, beat, frame)?;
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug)]
struct SolveRequest {
    from: usize,
    to: usize,
    algorithm: Option<AlgorithmIdentifier>,
    instructions: Vec<MarcherInstruction>,
    timeout: Option<Duration>,
}

/// Logs solver events on the main thread and aborts after a deadline.
struct LogDelegate {
    deadline: Option<Instant>,
    reported: u32,
}

impl ProgressDelegate for LogDelegate {
    fn on_progress(&mut self, progress: f64) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tenth = (progress * 10.0).floor() as u32;
        if tenth > self.reported {
            self.reported = tenth;
            debug!(percent = tenth * 10, "solver progress");
        }
    }

    fn on_subtask_progress(&mut self, _progress: f64) {}

    fn on_new_best(&mut self, beats: u32) {
        info!(beats, "found a transition");
    }

    fn on_complete(&mut self, result: &TransitionSolverResult) {
        if result.aborted {
            warn!(evaluated = result.candidates_evaluated, "search stopped early");
        }
    }

    fn should_abort(&mut self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

fn solve(path: &Path, request: &SolveRequest, prefs: &StuntPrefs) -> Result<ExitCode> {
    let show = read_show(path)?;
    let sheet = |index: usize| {
        show.sheet(index)
            .cloned()
            .ok_or_else(|| anyhow!("show has no sheet {index} ({} sheets)", show.sheets().len()))
    };
    let start = sheet(request.from)?;
    let end = sheet(request.to)?;
    for (label, candidate) in [("start", &start), ("end", &end)] {
        for problem in validate_sheet_for_solver(candidate) {
            warn!(sheet = label, "{problem}");
        }
    }

    let mut solver = prefs.solver.clone();
    if let Some(algorithm) = request.algorithm {
        solver.algorithm = algorithm;
    }
    if !request.instructions.is_empty() {
        if request.instructions.len() > MAX_INSTRUCTIONS {
            bail!("at most {MAX_INSTRUCTIONS} instructions may be given");
        }
        solver.instructions.clone_from(&request.instructions);
    }
    let params = solver.params();
    info!(
        algorithm = %params.algorithm,
        from = request.from,
        to = request.to,
        "solving transition"
    );

    let handle = spawn_solver(start, end, params, solver.config())?;
    let mut delegate = LogDelegate {
        deadline: request.timeout.and_then(|t| Instant::now().checked_add(t)),
        reported: 0,
    };
    let result = match handle.drain_into(&mut delegate) {
        Some(result) => result,
        None => handle.join()?,
    };

    let mut out = io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn config(dir: Option<&Path>, command: &ConfigCommand) -> Result<ExitCode> {
    let service = open_config(dir)?;
    let mut out = io::stdout().lock();
    match command {
        ConfigCommand::Init { force } => {
            let path = service.store().path_for(PREFS_KEY);
            if path.exists() && !force {
                writeln!(out, "prefs already exist at {} (use --force to overwrite)", path.display())?;
                return Ok(ExitCode::SUCCESS);
            }
            service
                .save_prefs(&StuntPrefs::default())
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote default prefs");
            writeln!(out, "wrote {}", path.display())?;
        }
        ConfigCommand::Show => {
            let prefs = service.load_prefs().unwrap_or_default();
            writeln!(out, "{}", serde_json::to_string_pretty(&prefs)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
