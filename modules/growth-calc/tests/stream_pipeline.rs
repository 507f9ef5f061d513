//! End-to-end tests of the calculation engine against in-memory stores.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use growth_calc::domain::{
    CalculationRequest, CalculationStatus, DomainError, EventType, Service, ServiceConfig,
    StreamUpdate,
};
use growth_calc::test_support::{build_service, InMemoryCalculationStore, InMemoryEventJournal};

fn req(base: f64, exponent: i32) -> CalculationRequest {
    CalculationRequest { base, exponent }
}

async fn drain(mut rx: mpsc::Receiver<StreamUpdate>) -> Vec<StreamUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn streamed_run_emits_ordered_updates_and_persists() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal.clone());

    let (tx, rx) = mpsc::channel(16);
    service.run_streamed(req(2.0, 5), tx).await;
    let updates = drain(rx).await;

    // start + 5 steps + complete
    assert_eq!(updates.len(), 7);

    let calculation_id = match &updates[0] {
        StreamUpdate::Started {
            calculation_id,
            base,
            exponent,
        } => {
            assert_eq!(*base, 2.0);
            assert_eq!(*exponent, 5);
            *calculation_id
        }
        other => panic!("expected Started, got {other:?}"),
    };

    for (idx, expected_step) in (1..=5).enumerate() {
        match &updates[idx + 1] {
            StreamUpdate::Step(step) => {
                assert_eq!(step.step, expected_step);
                assert_eq!(step.linear_value, 2.0 * f64::from(expected_step));
                assert_eq!(step.exponential_value, 2.0_f64.powi(expected_step));
            }
            other => panic!("expected Step {expected_step}, got {other:?}"),
        }
    }

    match &updates[6] {
        StreamUpdate::Completed(summary) => {
            assert_eq!(summary.calculation_id, calculation_id);
            assert_eq!(summary.total_steps, 5);
            // Final totals are the recomputed last step, bit for bit.
            assert_eq!(summary.linear_result.to_bits(), (2.0 * 5.0_f64).to_bits());
            assert_eq!(
                summary.exponential_result.to_bits(),
                2.0_f64.powi(5).to_bits()
            );
        }
        other => panic!("expected Completed, got {other:?}"),
    }

    let record = store.find(calculation_id).unwrap();
    assert_eq!(record.status, CalculationStatus::Completed);
    assert_eq!(record.linear_result, Some(10.0));
    assert_eq!(record.exponential_result, Some(32.0));
    assert_eq!(record.total_steps, Some(5));
    assert!(record.completed_at.is_some());
}

#[tokio::test]
async fn streamed_run_journals_every_step() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal.clone());

    let (tx, rx) = mpsc::channel(16);
    service.run_streamed(req(3.0, 4), tx).await;
    drain(rx).await;

    let events = journal.events();
    // started + 4 * (linear + exponential) + completed
    assert_eq!(events.len(), 10);
    assert_eq!(events[0].event_type, EventType::CalculationStarted);
    assert_eq!(
        events.last().unwrap().event_type,
        EventType::CalculationCompleted
    );

    let linear: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::LinearStep)
        .collect();
    assert_eq!(linear.len(), 4);
    assert_eq!(linear[0].message, "Step 1: 3 × 1 = 3");
    assert_eq!(linear[3].message, "Step 4: 3 × 4 = 12");

    let exponential: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::ExponentialStep)
        .collect();
    assert_eq!(exponential.len(), 4);
    assert_eq!(exponential[3].message, "Step 4: 3^4 = 81");
}

#[tokio::test]
async fn invalid_request_fails_without_touching_storage() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal.clone());

    for request in [req(0.0, 5), req(-2.0, 5), req(2.0, 0), req(2.0, 101)] {
        let (tx, rx) = mpsc::channel(16);
        service.run_streamed(request, tx).await;
        let updates = drain(rx).await;

        assert_eq!(updates.len(), 1);
        assert!(matches!(updates[0], StreamUpdate::Failed { .. }));
    }

    assert!(store.records().is_empty());
    assert!(journal.events().is_empty());
}

#[tokio::test]
async fn journal_outage_does_not_disturb_the_stream() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    journal.set_fail_appends(true);
    let service = build_service(store.clone(), journal.clone());

    let (tx, rx) = mpsc::channel(16);
    service.run_streamed(req(2.0, 3), tx).await;
    let updates = drain(rx).await;

    assert_eq!(updates.len(), 5);
    assert!(matches!(updates.last(), Some(StreamUpdate::Completed(_))));
    assert!(journal.events().is_empty());

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, CalculationStatus::Completed);
}

#[tokio::test]
async fn record_insert_failure_aborts_before_any_step() {
    let store = InMemoryCalculationStore::new();
    store.set_fail_inserts(true);
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal.clone());

    let (tx, rx) = mpsc::channel(16);
    service.run_streamed(req(2.0, 3), tx).await;
    let updates = drain(rx).await;

    assert_eq!(updates.len(), 1);
    assert!(matches!(updates[0], StreamUpdate::Failed { .. }));
    assert!(journal.events().is_empty());
}

#[tokio::test]
async fn completion_failure_marks_record_error_and_journals_it() {
    let store = InMemoryCalculationStore::new();
    store.set_fail_completions(true);
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal.clone());

    let (tx, rx) = mpsc::channel(16);
    service.run_streamed(req(2.0, 2), tx).await;
    let updates = drain(rx).await;

    assert!(matches!(updates.last(), Some(StreamUpdate::Failed { .. })));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, CalculationStatus::Error);
    assert!(records[0].completed_at.is_some());

    let events = journal.events();
    assert_eq!(
        events.last().unwrap().event_type,
        EventType::CalculationError
    );
}

#[tokio::test]
async fn consumer_disconnect_abandons_the_run() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = std::sync::Arc::new(build_service(store.clone(), journal.clone()));

    let (tx, mut rx) = mpsc::channel(1);
    let handle = {
        let service = service.clone();
        tokio::spawn(async move { service.run_streamed(req(2.0, 50), tx).await })
    };

    // Consume the start event and the first step, then walk away.
    let first = rx.recv().await.unwrap();
    assert!(matches!(first, StreamUpdate::Started { .. }));
    let second = rx.recv().await.unwrap();
    assert!(matches!(second, StreamUpdate::Step(_)));
    drop(rx);

    handle.await.unwrap();

    // The run stopped early: far fewer journal entries than a full run,
    // and the record was never moved out of in_progress.
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, CalculationStatus::InProgress);

    let events = journal.events();
    assert!(events.len() < 20, "run kept going after disconnect");
    assert!(!events
        .iter()
        .any(|e| e.event_type == EventType::CalculationCompleted));
}

#[tokio::test]
async fn steps_are_spaced_by_the_configured_interval() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = Service::new(
        store,
        journal,
        ServiceConfig {
            step_interval: Duration::from_millis(30),
        },
    );

    let (tx, rx) = mpsc::channel(16);
    let started = Instant::now();
    service.run_streamed(req(2.0, 4), tx).await;
    let elapsed = started.elapsed();
    drain(rx).await;

    // Three gaps between four steps.
    assert!(elapsed >= Duration::from_millis(90), "ran in {elapsed:?}");
}

#[tokio::test]
async fn collected_run_returns_aggregate_without_pacing() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = Service::new(
        store.clone(),
        journal.clone(),
        // A streamed run at this interval would take ~100 minutes.
        ServiceConfig {
            step_interval: Duration::from_secs(60),
        },
    );

    let started = Instant::now();
    let finished = service.run_collected(req(2.0, 100)).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(finished.exponent, 100);
    assert_eq!(finished.steps.len(), 100);
    assert_eq!(finished.linear_result, 200.0);
    assert_eq!(
        finished.exponential_result.to_bits(),
        2.0_f64.powi(100).to_bits()
    );
    assert_eq!(finished.steps[99].exponential_value, finished.exponential_result);

    let record = store.find(finished.id).unwrap();
    assert_eq!(record.status, CalculationStatus::Completed);
}

#[tokio::test]
async fn collected_run_rejects_invalid_input() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal);

    let err = service.run_collected(req(-1.0, 3)).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidBase { .. }));

    let err = service.run_collected(req(2.0, 200)).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidExponent { .. }));

    assert!(store.records().is_empty());
}

#[tokio::test]
async fn overflow_to_infinity_still_completes() {
    let store = InMemoryCalculationStore::new();
    let journal = InMemoryEventJournal::new();
    let service = build_service(store.clone(), journal);

    let finished = service.run_collected(req(1e10, 100)).await.unwrap();
    assert!(finished.exponential_result.is_infinite());
    assert_eq!(finished.linear_result, 1e12);

    let record = store.find(finished.id).unwrap();
    assert_eq!(record.status, CalculationStatus::Completed);
    assert_eq!(record.exponential_result, Some(f64::INFINITY));
}
