//! Headless run execution.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use fb_project::Project;
use fb_sim::{ChannelObserver, RunStatus, SimError, SimEvent, Simulation, TickFrame};
use serde::Serialize;

use crate::compile;
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};

/// How ticks are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Ticks back to back, as fast as possible.
    #[default]
    Batch,
    /// Ticks paced by the wall clock at the configured tick period.
    Realtime,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Emit a running progress event every this many ticks. 0 disables them.
    pub progress_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::Batch,
            progress_every: 100,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunEnd {
    Settled,
    TickLimit,
    Stopped,
    Halted { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    /// Integrated time (s)
    pub sim_time_s: f64,
    pub final_theta: f64,
    pub final_omega: f64,
    pub final_dashpot_length: f64,
    pub peak_abs_force: f64,
    pub end: RunEnd,
    pub wall_time_s: f64,
}

struct Tally {
    mode: RunMode,
    started: Instant,
    progress_every: u64,
    last_reported: u64,
    last: Option<TickFrame>,
    peak_abs_force: f64,
}

impl Tally {
    fn new(options: &RunOptions, started: Instant) -> Self {
        Self {
            mode: options.mode,
            started,
            progress_every: options.progress_every,
            last_reported: 0,
            last: None,
            peak_abs_force: 0.0,
        }
    }

    /// Fold queued tick frames into the tally and report progress.
    fn drain(
        &mut self,
        rx: &mpsc::Receiver<SimEvent>,
        progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    ) {
        for event in rx.try_iter() {
            let SimEvent::Tick(frame) = event else {
                continue;
            };
            self.peak_abs_force = self.peak_abs_force.max(frame.force.abs());
            self.last = Some(frame);
            if self.progress_every > 0 && frame.tick >= self.last_reported + self.progress_every {
                self.last_reported = frame.tick;
                emit_progress(
                    progress_cb,
                    RunProgressEvent {
                        ticks: Some(frame.tick),
                        theta: Some(frame.theta),
                        force: Some(frame.force),
                        ..RunProgressEvent::stage(
                            self.mode,
                            RunStage::Running,
                            self.started.elapsed().as_secs_f64(),
                            None,
                        )
                    },
                );
            }
        }
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    event: RunProgressEvent,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(event);
    }
}

fn run_end(status: &RunStatus) -> RunEnd {
    match status {
        RunStatus::Settled => RunEnd::Settled,
        RunStatus::Halted(SimError::TickLimit { .. }) => RunEnd::TickLimit,
        RunStatus::Halted(error) => RunEnd::Halted {
            reason: error.to_string(),
        },
        RunStatus::Idle | RunStatus::Running | RunStatus::Stopped => RunEnd::Stopped,
    }
}

/// Compile a project and run it until it settles, halts or hits its tick limit.
///
/// A halt is a normal end of run and is reported in the summary; only
/// problems building the run are returned as errors.
pub fn run_project(
    project: &Project,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunSummary> {
    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        RunProgressEvent::stage(
            options.mode,
            RunStage::Compiling,
            0.0,
            Some(format!("Compiling '{}'", project.name)),
        ),
    );

    let mut sim = compile::compile_project(project)?;
    let (tx, rx) = mpsc::channel();
    sim.subscribe(Box::new(ChannelObserver(tx)));
    sim.start_run()?;

    let mut tally = Tally::new(options, started);

    match options.mode {
        RunMode::Batch => {
            while sim.is_running() {
                // Failures end the run and are read back from the status
                let _ = sim.tick();
                tally.drain(&rx, &mut progress_cb);
            }
        }
        RunMode::Realtime => {
            let run_started = Instant::now();
            while sim.is_running() {
                let now = run_started.elapsed().as_secs_f64();
                let _ = sim.advance_to(now);
                tally.drain(&rx, &mut progress_cb);
                let wait = sim.clock().time_until_tick(run_started.elapsed().as_secs_f64());
                if sim.is_running() && wait > 0.0 {
                    let wait = Duration::try_from_secs_f64(wait).map_err(|e| {
                        AppError::InvalidInput(format!(
                            "tick period {} s cannot be paced in real time: {e}",
                            project.run.tick_period_s
                        ))
                    })?;
                    std::thread::sleep(wait);
                }
            }
        }
    }

    let summary = summarize(&sim, &tally, started);
    emit_progress(
        &mut progress_cb,
        RunProgressEvent {
            ticks: Some(summary.ticks),
            ..RunProgressEvent::stage(
                options.mode,
                RunStage::Completed,
                summary.wall_time_s,
                Some(format!("{:?}", summary.end)),
            )
        },
    );
    tracing::info!(
        ticks = summary.ticks,
        peak_force = summary.peak_abs_force,
        "run finished"
    );
    Ok(summary)
}

fn summarize(sim: &Simulation, tally: &Tally, started: Instant) -> RunSummary {
    let params = sim.params();
    let (final_theta, final_omega, final_dashpot_length) = match &tally.last {
        Some(frame) => (frame.theta, frame.omega, frame.dashpot_length),
        None => (params.initial_angle, 0.0, sim.linkage().dashpot_length()),
    };
    RunSummary {
        ticks: sim.ticks(),
        sim_time_s: sim.ticks() as f64 * params.dt,
        final_theta,
        final_omega,
        final_dashpot_length,
        peak_abs_force: tally.peak_abs_force,
        end: run_end(sim.status()),
        wall_time_s: started.elapsed().as_secs_f64(),
    }
}
