//! Worker loop lifecycle: start, cooperative exit, fatal errors.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ecfan::app::events::{AppEvent, DutySource};
use ecfan::error::{BulkReadError, Error};
use ecfan::shared::SharedState;
use ecfan::worker::Worker;

use crate::mock_hw::{FixedClock, MockFan, RecordingSink};

const TICK: Duration = Duration::from_millis(1);

fn wait_until(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

fn duty_events(events: &[AppEvent]) -> Vec<(u8, DutySource)> {
    events
        .iter()
        .filter_map(|e| match *e {
            AppEvent::DutyApplied { duty, source, .. } => Some((duty, source)),
            _ => None,
        })
        .collect()
}

#[test]
fn worker_stops_on_exit_flag() {
    let shared = Arc::new(SharedState::anonymous().unwrap());
    let sink = RecordingSink::default();
    let worker = Worker::new(
        MockFan::new(65, 50),
        sink.clone(),
        FixedClock(1),
        Arc::clone(&shared),
        TICK,
    );
    let handle = worker.spawn().unwrap();

    assert!(wait_until(|| shared.snapshot().samples >= 3));
    shared.request_exit();
    let cycles = handle.join().unwrap().unwrap();
    assert!(cycles >= 3);

    let events = sink.events();
    assert_eq!(events.first(), Some(&AppEvent::Started { bulk: false }));
    assert_eq!(events.last(), Some(&AppEvent::Stopped { cycles }));
    // One decision, written once.
    assert_eq!(duty_events(&events), vec![(80, DutySource::Auto)]);
}

#[test]
fn exit_before_start_runs_no_cycles() {
    let shared = Arc::new(SharedState::anonymous().unwrap());
    shared.request_exit();
    let sink = RecordingSink::default();
    let worker = Worker::new(
        MockFan::new(90, 50),
        sink.clone(),
        FixedClock(1),
        shared,
        TICK,
    );

    assert_eq!(worker.run(), Ok(0));
    assert!(duty_events(&sink.events()).is_empty());
}

#[test]
fn manual_request_from_peer_thread() {
    let shared = Arc::new(SharedState::anonymous().unwrap());
    let sink = RecordingSink::default();
    let worker = Worker::new(
        MockFan::new(40, 60),
        sink.clone(),
        FixedClock(1),
        Arc::clone(&shared),
        TICK,
    );
    let handle = worker.spawn().unwrap();

    let peer = Arc::clone(&shared);
    thread::spawn(move || peer.request_manual(75).unwrap())
        .join()
        .unwrap();
    assert!(wait_until(|| shared.manual_applied() == 75));

    shared.request_exit();
    handle.join().unwrap().unwrap();
    assert!(duty_events(&sink.events()).contains(&(75, DutySource::Manual)));
}

#[test]
fn fatal_error_raises_exit_flag() {
    let shared = Arc::new(SharedState::anonymous().unwrap());
    let mut fan = MockFan::new(50, 50);
    fan.sample_error = Some(Error::BulkRead(BulkReadError::Malformed { len: 3 }));
    let sink = RecordingSink::default();
    let worker = Worker::new(fan, sink.clone(), FixedClock(1), Arc::clone(&shared), TICK);

    assert_eq!(
        worker.run(),
        Err(Error::BulkRead(BulkReadError::Malformed { len: 3 }))
    );
    assert!(shared.exit_requested());
    assert!(
        !sink
            .events()
            .iter()
            .any(|e| matches!(e, AppEvent::Stopped { .. }))
    );
}

#[test]
fn unconfirmed_writes_keep_the_worker_running() {
    let shared = Arc::new(SharedState::anonymous().unwrap());
    let mut fan = MockFan::new(85, 50);
    fan.unconfirmed = true;
    let sink = RecordingSink::default();
    let worker = Worker::new(fan, sink.clone(), FixedClock(1), Arc::clone(&shared), TICK);
    let handle = worker.spawn().unwrap();

    assert!(wait_until(|| shared.snapshot().samples >= 3));
    shared.request_exit();
    assert!(handle.join().unwrap().is_ok());
    assert!(
        sink.events()
            .contains(&AppEvent::WriteUnconfirmed { duty: 100 })
    );
}
