use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use fb_app::{
    AppError, AppResult, GateReport, GateRequest, RunEnd, RunMode, RunOptions, RunProgressEvent,
    RunStage, RunSummary, gate_service, project_service, run_service,
};
use fb_project::Project;

#[derive(Parser)]
#[command(name = "fb-cli")]
#[command(about = "Four-bar linkage with an oscillator-driven input and a dashpot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Print the default project
    Defaults {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Run the oscillator until it settles
    Simulate {
        /// Project file; the default mechanism is used when omitted
        project_path: Option<PathBuf>,
        /// Pace ticks with the wall clock
        #[arg(long)]
        realtime: bool,
        /// Override the tick limit
        #[arg(long, conflicts_with = "no_limit")]
        max_ticks: Option<u64>,
        /// Run until settled with no tick limit
        #[arg(long)]
        no_limit: bool,
        /// Report progress every N ticks (0 for none)
        #[arg(long, default_value_t = 100)]
        every: u64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Try a manual input move through the angle gate
    Gate {
        /// Project file; the default mechanism is used when omitted
        project_path: Option<PathBuf>,
        /// Input angle in degrees
        #[arg(long, required_unless_present = "at", conflicts_with = "at")]
        angle: Option<f64>,
        /// Scene position to drag toward, as X,Y
        #[arg(long, value_delimiter = ',', num_args = 2, allow_negative_numbers = true)]
        at: Option<Vec<f64>>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Defaults { json } => cmd_defaults(json),
        Commands::Simulate {
            project_path,
            realtime,
            max_ticks,
            no_limit,
            every,
            json,
        } => {
            let mut project = load_or_default(project_path.as_deref())?;
            if no_limit {
                project.run.max_ticks = None;
            } else if max_ticks.is_some() {
                project.run.max_ticks = max_ticks;
            }
            let mode = if realtime {
                RunMode::Realtime
            } else {
                RunMode::Batch
            };
            cmd_simulate(&project, mode, every, json)
        }
        Commands::Gate {
            project_path,
            angle,
            at,
            json,
        } => {
            let project = load_or_default(project_path.as_deref())?;
            let request = match (angle, at.as_deref()) {
                (Some(deg), _) => GateRequest::Angle(deg),
                (None, Some([x, y])) => GateRequest::Point([*x, *y]),
                _ => {
                    return Err(AppError::InvalidInput(
                        "expected --angle DEG or --at X,Y".to_string(),
                    ));
                }
            };
            cmd_gate(&project, request, json)
        }
    }
}

fn load_or_default(path: Option<&Path>) -> AppResult<Project> {
    match path {
        Some(path) => project_service::load_project(path),
        None => Ok(Project::new("Default four-bar")),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    fb_app::compile_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_defaults(json: bool) -> AppResult<()> {
    let project = Project::new("Default four-bar");
    let text = if json {
        serde_json::to_string_pretty(&project).map_err(|e| AppError::Project(e.to_string()))?
    } else {
        serde_yaml::to_string(&project).map_err(|e| AppError::Project(e.to_string()))?
    };
    println!("{}", text);
    Ok(())
}

fn cmd_simulate(project: &Project, mode: RunMode, every: u64, json: bool) -> AppResult<()> {
    if !json {
        println!("Simulating '{}' ({:?})", project.name, mode);
    }
    let options = RunOptions {
        mode,
        progress_every: if json { 0 } else { every },
    };

    let mut last_emit = Instant::now();
    let summary = run_service::run_project(
        project,
        &options,
        Some(&mut |event| {
            if event.stage != RunStage::Running || last_emit.elapsed().as_millis() >= 50 {
                render_cli_progress(&event);
                last_emit = Instant::now();
            }
        }),
    )?;
    if !json {
        clear_progress_line();
    }

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::Project(e.to_string()))?;
        println!("{}", text);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn cmd_gate(project: &Project, request: GateRequest, json: bool) -> AppResult<()> {
    let report = gate_service::apply_gate(project, request)?;
    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Project(e.to_string()))?;
        println!("{}", text);
    } else {
        print_gate_report(&report);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    match &summary.end {
        RunEnd::Settled => println!("✓ Settled after {} ticks", summary.ticks),
        RunEnd::TickLimit => println!("✗ Tick limit reached after {} ticks", summary.ticks),
        RunEnd::Stopped => println!("Stopped after {} ticks", summary.ticks),
        RunEnd::Halted { reason } => {
            println!("✗ Halted after {} ticks: {}", summary.ticks, reason)
        }
    }
    println!("  Simulated time:   {:.2} s", summary.sim_time_s);
    println!(
        "  Final θ / ω:      {:.4} rad / {:.4} rad/s",
        summary.final_theta, summary.final_omega
    );
    println!("  Dashpot length:   {:.3}", summary.final_dashpot_length);
    println!("  Peak |force|:     {:.3}", summary.peak_abs_force);
    println!("  Wall time:        {:.3} s", summary.wall_time_s);
}

fn print_gate_report(report: &GateReport) {
    if report.accepted {
        println!("✓ Accepted {:.2}°", report.angle_deg);
    } else {
        println!(
            "✗ Rejected {:.2}° (allowed {:.1}°..{:.1}°)",
            report.angle_deg, report.min_angle_deg, report.max_angle_deg
        );
    }
    println!(
        "  Input / coupler / output: {:.2}° / {:.2}° / {:.2}°",
        report.input_angle_deg, report.coupler_angle_deg, report.output_angle_deg
    );
    println!("  Dashpot length:           {:.3}", report.dashpot_length);
    println!("  Force:                    {:.3}", report.force);
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match event.stage {
        RunStage::Running => {
            print!(
                "\rtick={:>7}  θ={:>8.4}  force={:>10.3}  elapsed={:.1}s",
                event.ticks.unwrap_or(0),
                event.theta.unwrap_or(f64::NAN),
                event.force.unwrap_or(f64::NAN),
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        RunStage::Compiling | RunStage::Completed => {
            if let Some(message) = &event.message {
                tracing::debug!(stage = ?event.stage, "{}", message);
            }
        }
    }
}
