//! Background sensing worker.
//!
//! A full pass blocks for several seconds (three probes × a spaced-out
//! burst each).  Running it on its own task keeps the control loop free to
//! blink the indicator, expire manual windows and feed the watchdog.
//!
//! ```text
//! ┌──────────────┐  WorkerRequest  ┌──────────────┐
//! │ Control Loop │───────────────▶│ Sensing Task  │
//! │  (main)      │◀───────────────│ (core-pinned) │
//! └──────────────┘  PassReadings   └──────────────┘
//! ```
//!
//! Both channels have depth 1: at most one pass is ever in flight, and the
//! controller only consumes a result on the control loop, so level state is
//! never touched from two tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_hal::delay::DelayNs;
use futures_lite::future::block_on;
use log::{info, warn};

use crate::app::ports::ProbePort;
use crate::drivers::task_pin::{self, Core};
use crate::error::SensorError;
use crate::sensors::sampler::StableProbeSampler;
use crate::sensors::{sample_pass_cancellable, PassReadings};

// ── Cancellation ──────────────────────────────────────────────

/// Shared stop flag checked between raw probe reads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ── Channels ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRequest {
    Pass,
    Shutdown,
}

struct WorkerLink {
    requests: Channel<CriticalSectionRawMutex, WorkerRequest, 1>,
    results: Channel<CriticalSectionRawMutex, PassReadings, 1>,
}

// ── Worker handle ────────────────────────────────────────────

/// Readings of one pass, stamped with the time it was requested.  The
/// scheduler measures intervals between pass starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedPass {
    pub requested_ms: u64,
    pub readings: PassReadings,
}

const WORKER_PRIORITY: u8 = 4;
const WORKER_STACK_KB: usize = 4;

/// Control-loop side of the sensing task.
pub struct SensingWorker {
    link: Arc<WorkerLink>,
    cancel: CancelToken,
    /// Request time of the outstanding pass.
    in_flight: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl SensingWorker {
    /// Move the probe port and its delay onto a dedicated sensing task.
    pub fn spawn<P, D>(sampler: StableProbeSampler, probes: P, delay: D) -> std::io::Result<Self>
    where
        P: ProbePort + Send + 'static,
        D: DelayNs + Send + 'static,
    {
        let link = Arc::new(WorkerLink {
            requests: Channel::new(),
            results: Channel::new(),
        });
        let cancel = CancelToken::new();

        let task_link = Arc::clone(&link);
        let task_cancel = cancel.clone();
        let handle = task_pin::spawn_on_core(
            Core::App,
            WORKER_PRIORITY,
            WORKER_STACK_KB,
            "sensing\0",
            move || run(sampler, probes, delay, &task_link, &task_cancel),
        )?;

        Ok(Self {
            link,
            cancel,
            in_flight: None,
            handle: Some(handle),
        })
    }

    /// Ask for a new pass started at `now_ms`.  Returns `Ok(false)` if one
    /// is already running and `Err` once the sensing task has exited.
    pub fn request_pass(&mut self, now_ms: u64) -> Result<bool, SensorError> {
        self.ensure_alive()?;
        if self.in_flight.is_some() {
            return Ok(false);
        }
        match self.link.requests.try_send(WorkerRequest::Pass) {
            Ok(()) => {
                self.in_flight = Some(now_ms);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Non-blocking poll for the result of the outstanding pass.
    pub fn try_take(&mut self) -> Option<CompletedPass> {
        let readings = self.link.results.try_receive().ok()?;
        let requested_ms = self.in_flight.take()?;
        Some(CompletedPass { requested_ms, readings })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    fn ensure_alive(&mut self) -> Result<(), SensorError> {
        let finished = self.handle.as_ref().is_none_or(JoinHandle::is_finished);
        if finished {
            if self.in_flight.take().is_some() {
                warn!("SENSE | worker exited with a pass in flight");
            } else {
                warn!("SENSE | worker not running");
            }
            return Err(SensorError::WorkerStopped);
        }
        Ok(())
    }

    /// Cancel any pass in progress and join the task.  Readings of an
    /// abandoned pass are discarded.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        // Full only if a Pass is still queued; the worker will see the
        // cancel flag before its first read.
        let _ = self.link.requests.try_send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("SENSE | worker panicked");
            }
        }
    }
}

impl Drop for SensingWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<P: ProbePort, D: DelayNs>(
    sampler: StableProbeSampler,
    mut probes: P,
    mut delay: D,
    link: &WorkerLink,
    cancel: &CancelToken,
) {
    info!("SENSE | worker started");
    loop {
        match block_on(link.requests.receive()) {
            WorkerRequest::Pass => {
                match sample_pass_cancellable(&sampler, &mut probes, &mut delay, cancel) {
                    Ok(readings) => block_on(link.results.send(readings)),
                    Err(_) => break,
                }
            }
            WorkerRequest::Shutdown => break,
        }
    }
    info!("SENSE | worker stopped");
}
