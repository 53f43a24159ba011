//! Events published by the simulation and the observers that receive them.

use std::sync::mpsc::Sender;

use fb_geometry::LinkageConfiguration;

use crate::error::SimError;
use crate::gate::AngleBounds;
use crate::oscillator::OscillatorParams;

/// Everything the view layer needs after one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickFrame {
    /// 1-based tick number within the run
    pub tick: u64,
    /// Integrated time (s), tick * integrator step
    pub time: f64,
    pub theta: f64,
    pub omega: f64,
    pub config: LinkageConfiguration,
    pub dashpot_length: f64,
    pub force: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    RunStarted {
        params: OscillatorParams,
    },
    Tick(TickFrame),
    /// Manual input move that passed the angle gate and was committed.
    AngleAccepted {
        angle_deg: f64,
        config: LinkageConfiguration,
        dashpot_length: f64,
        force: f64,
    },
    AngleRejected {
        angle_deg: f64,
        bounds: AngleBounds,
    },
    Settled {
        ticks: u64,
        theta: f64,
        omega: f64,
    },
    Stopped {
        ticks: u64,
    },
    Halted {
        ticks: u64,
        error: SimError,
    },
}

/// Receiver of simulation events.
///
/// Called synchronously from inside the tick; implementations must return
/// promptly and must not block.
pub trait SimObserver {
    fn notify(&mut self, event: &SimEvent);
}

impl<F> SimObserver for F
where
    F: FnMut(&SimEvent),
{
    fn notify(&mut self, event: &SimEvent) {
        self(event)
    }
}

/// Forwards events over a channel. A disconnected receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver(pub Sender<SimEvent>);

impl SimObserver for ChannelObserver {
    fn notify(&mut self, event: &SimEvent) {
        let _ = self.0.send(event.clone());
    }
}
