//! Integration tests for the background sensing worker.
//!
//! The worker runs on a real host thread here; probes and delay are mocks,
//! so a pass completes in microseconds.

use std::time::{Duration, Instant};

use super::mock_hw::{MockDelay, MockProbes};

use levelpump::app::ports::ProbePort;
use levelpump::error::SensorError;
use levelpump::sensors::probe::ProbeId;
use levelpump::sensors::sampler::StableProbeSampler;
use levelpump::sensors::worker::{CompletedPass, SensingWorker};
use levelpump::sensors::PassReadings;

fn wait_for(worker: &mut SensingWorker) -> Option<CompletedPass> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(r) = worker.try_take() {
            return Some(r);
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    None
}

fn probes(low: bool, mid: bool, high: bool) -> MockProbes {
    let mut p = MockProbes::new();
    p.set(low, mid, high);
    p
}

#[test]
fn pass_round_trip() {
    let mut worker = SensingWorker::spawn(
        StableProbeSampler::default(),
        probes(true, true, false),
        MockDelay::default(),
    )
    .expect("spawn sensing worker");

    assert_eq!(worker.request_pass(3_000), Ok(true));
    assert!(worker.is_in_flight());

    let pass = wait_for(&mut worker).expect("pass should complete");
    assert_eq!(pass.readings, PassReadings { low: true, mid: true, high: false });
    assert_eq!(pass.requested_ms, 3_000, "stamped with the request time");
    assert!(!worker.is_in_flight());

    worker.shutdown();
}

#[test]
fn only_one_pass_in_flight() {
    let mut worker = SensingWorker::spawn(
        StableProbeSampler::default(),
        probes(false, false, true),
        MockDelay::default(),
    )
    .expect("spawn sensing worker");

    assert_eq!(worker.request_pass(0), Ok(true));
    assert_eq!(worker.request_pass(50), Ok(false), "second request must be refused");

    assert_eq!(wait_for(&mut worker).map(|p| p.requested_ms), Some(0));
    assert!(worker.try_take().is_none(), "exactly one result per request");

    assert_eq!(worker.request_pass(1_000), Ok(true), "free again after the result is taken");
    assert_eq!(
        wait_for(&mut worker),
        Some(CompletedPass {
            requested_ms: 1_000,
            readings: PassReadings { low: false, mid: false, high: true },
        })
    );
    worker.shutdown();
}

#[test]
fn try_take_without_request_is_empty() {
    let mut worker = SensingWorker::spawn(
        StableProbeSampler::default(),
        MockProbes::new(),
        MockDelay::default(),
    )
    .expect("spawn sensing worker");
    assert!(worker.try_take().is_none());
    assert!(!worker.is_in_flight());
}

#[test]
fn drop_joins_idle_worker() {
    let worker = SensingWorker::spawn(
        StableProbeSampler::default(),
        MockProbes::new(),
        MockDelay::default(),
    )
    .expect("spawn sensing worker");
    // Returning from this test without hanging is the assertion.
    drop(worker);
}

/// Probe port whose hardware access faults, taking the sensing task down.
struct FaultyProbes;

impl ProbePort for FaultyProbes {
    fn read_raw(&mut self, _probe: ProbeId) -> bool {
        panic!("probe bus fault");
    }
}

#[test]
fn dead_worker_is_reported_instead_of_stalling() {
    let mut worker = SensingWorker::spawn(
        StableProbeSampler::default(),
        FaultyProbes,
        MockDelay::default(),
    )
    .expect("spawn sensing worker");

    assert_eq!(worker.request_pass(0), Ok(true));

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut outcome = Ok(false);
    while Instant::now() < deadline {
        outcome = worker.request_pass(50);
        if outcome.is_err() {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(outcome, Err(SensorError::WorkerStopped));
    assert!(!worker.is_in_flight(), "the lost pass is no longer pending");
    assert!(worker.try_take().is_none());
}
