use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use keelmark_config::KernelConfig;
use keelmark_core::Conductor;
use keelmark_events::EventLog;
use keelmark_state::DesignFile;
use keelmark_synthesis::HullSynthesizer;
use keelmark_types::{HullFamily, SessionState, SynthesisRequest};

#[derive(Parser, Debug)]
#[command(name = "keelmark", version)]
#[command(about = "Ship design kernel: phase orchestration over a path-addressed design state")]
struct Cli {
    /// Directory holding this design's state, session, and config files.
    #[arg(long, default_value = ".keelmark")]
    state_dir: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create and save a fresh design state.
    Init {
        design_id: String,
    },
    /// Write one path, wrapping begin/set/commit in one shot.
    Set {
        path: String,
        value: String,
        #[arg(long)]
        source: String,
    },
    /// Read one path.
    Get {
        path: String,
    },
    /// Run a single phase.
    RunPhase {
        name: String,
    },
    /// Run every phase in dependency order.
    RunAll {
        #[arg(long, default_value_t = true)]
        stop_on_failure: bool,
    },
    /// Run every phase up to and including `name`.
    RunTo {
        name: String,
    },
    /// Run every phase from `name` onward.
    RunFrom {
        name: String,
    },
    /// Manually approve a gate phase.
    ApproveGate {
        name: String,
    },
    /// Print the current session status summary.
    Status,
    /// Run hull synthesis standalone against the loaded state, independent
    /// of the conductor's phase pipeline.
    Synthesize {
        #[arg(long)]
        family: String,
        #[arg(long = "max-speed")]
        max_speed: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let design_path = cli.state_dir.join("design.json");
    let session_path = cli.state_dir.join("session.json");
    let config_path = cli.state_dir.join("keelmark.toml");
    let events_path = keelmark_events::events_path(&cli.state_dir);

    match cli.cmd {
        Commands::Init { design_id } => {
            let mut conductor = Conductor::new();
            conductor.create_session(&design_id);
            KernelConfig::default()
                .save(&config_path)
                .context("failed to write default config")?;
            save_all(&conductor, &design_path, &session_path, &events_path)?;
            println!("[info] initialized design '{design_id}' in {}", cli.state_dir.display());
        }
        Commands::Set { path, value, source } => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            let parsed = serde_json::from_str(&value).unwrap_or_else(|_| serde_json::json!(value));

            let txn_id = conductor.begin_transaction()?;
            let result = conductor.set(&path, parsed, &source);
            match result {
                Ok(old) => {
                    conductor.commit_transaction(&txn_id)?;
                    println!("[info] {path}: {old} -> {}", conductor.get(&path).unwrap());
                }
                Err(err) => {
                    conductor.rollback_transaction(&txn_id)?;
                    eprintln!("[error] {err}");
                    return Err(err.into());
                }
            }
            save_all(&conductor, &design_path, &session_path, &events_path)?;
        }
        Commands::Get { path } => {
            let conductor = load_conductor(&design_path, &session_path)?;
            match conductor.get(&path) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("[warn] {path} is not set");
                }
            }
        }
        Commands::RunPhase { name } => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            let result = conductor.run_phase(&name)?;
            print_phase_result(&result);
            save_all(&conductor, &design_path, &session_path, &events_path)?;
        }
        Commands::RunAll { stop_on_failure } => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            let results = conductor.run_all_phases(stop_on_failure)?;
            for result in &results {
                print_phase_result(result);
            }
            save_all(&conductor, &design_path, &session_path, &events_path)?;
        }
        Commands::RunTo { name } => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            let results = conductor.run_to_phase(&name)?;
            for result in &results {
                print_phase_result(result);
            }
            save_all(&conductor, &design_path, &session_path, &events_path)?;
        }
        Commands::RunFrom { name } => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            let results = conductor.run_from_phase(&name)?;
            for result in &results {
                print_phase_result(result);
            }
            save_all(&conductor, &design_path, &session_path, &events_path)?;
        }
        Commands::ApproveGate { name } => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            let gate = conductor.approve_gate(&name)?;
            println!("[info] gate '{}' approved (passed={})", gate.gate_name, gate.passed);
            save_all(&conductor, &design_path, &session_path, &events_path)?;
        }
        Commands::Status => {
            let mut conductor = load_conductor(&design_path, &session_path)?;
            print_status(&mut conductor);
        }
        Commands::Synthesize { family, max_speed } => {
            let design_file = DesignFile::new(&design_path);
            let mut state = design_file
                .load()
                .context("failed to load design state; run `init` first")?;

            let hull_family = HullFamily::from_str(&family)
                .with_context(|| format!("unknown hull family: {family}"))?;
            let request = SynthesisRequest::new(hull_family, max_speed);
            request.validate()?;

            let config = KernelConfig::load(&config_path)?;
            let synthesizer = HullSynthesizer::with_criteria(config.synthesis.convergence_criteria());
            let mut store = keelmark_state::StateStore::new(state.clone());
            let result = synthesizer.synthesize(&request, &mut store, |_store| {
                Default::default()
            });

            println!(
                "[info] synthesis terminated: {:?} (iterations={}, usable={})",
                result.termination, result.iterations_run, result.is_usable
            );
            if let Some(message) = &result.message {
                println!("[info] {message}");
            }

            state = store.state().clone();
            design_file.save(&state).context("failed to save synthesized design")?;
        }
    }

    Ok(())
}

fn load_conductor(design_path: &std::path::Path, session_path: &std::path::Path) -> Result<Conductor> {
    let design_file = DesignFile::new(design_path);
    let state = design_file
        .load()
        .context("failed to load design state; run `init` first")?;

    let mut conductor = Conductor::new();
    conductor.load_design(state);

    if session_path.exists() {
        let content = std::fs::read_to_string(session_path)
            .with_context(|| format!("failed to read session file {}", session_path.display()))?;
        let session: SessionState = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session file {}", session_path.display()))?;
        conductor.load_session(session);
    }

    Ok(conductor)
}

fn save_all(
    conductor: &Conductor,
    design_path: &std::path::Path,
    session_path: &std::path::Path,
    events_path: &std::path::Path,
) -> Result<()> {
    let design_file = DesignFile::new(design_path);
    design_file
        .save(conductor.design_state())
        .context("failed to save design state")?;

    save_session(conductor.session(), session_path)?;

    let existing = EventLog::read_from_file(events_path)
        .context("failed to read existing events file")?
        .len();
    let new_events = EventLog::from_new_history(&conductor.design_state().history, existing);
    new_events
        .write_to_file(events_path)
        .context("failed to append to events file")?;

    Ok(())
}

fn save_session(session: &SessionState, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create session dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, json)
        .with_context(|| format!("failed to write session file {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename session file to {}", path.display()))?;
    Ok(())
}

fn print_phase_result(result: &keelmark_types::PhaseResult) {
    println!(
        "[info] phase '{}': {:?} ({} / {} validators passed)",
        result.phase_name, result.status, result.validators_passed, result.validators_run
    );
    for warning in &result.warnings {
        eprintln!("[warn] {warning}");
    }
    for error in &result.errors {
        eprintln!("[error] {error}");
    }
}

fn print_status(conductor: &mut Conductor) {
    let summary = conductor.get_status_summary();
    println!("design_id: {}", summary.design_id);
    println!("session_id: {}", summary.session_id);
    println!("status: {:?}", summary.status);
    println!(
        "current_phase: {}",
        summary.current_phase.as_deref().unwrap_or("none")
    );
    println!(
        "completed_phases: {}/{}",
        summary.completed_phases.len(),
        summary.total_phases
    );
    println!("overall_pass_rate: {:.2}", summary.overall_pass_rate);
    println!("kernel_validation_complete: {}", summary.kernel_validation_complete);
    println!("design_version: {}", summary.design_version);
    for (name, gate) in &summary.gate_results {
        println!("gate '{name}': passed={}", gate.passed);
    }
}

