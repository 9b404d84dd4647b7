//! Unit tests for the single-consumer executor.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::*;
use crate::model::memory::MemoryStore;

#[fixture]
fn context() -> MainContext {
    MainContext::new(MemoryStore::new())
}

#[rstest]
fn units_run_only_when_pumped(mut context: MainContext) {
    let queue = context.queue();
    let pending = queue.submit(|store| Ok(store.project_name()));
    assert_eq!(queue.pending(), 1);
    assert_eq!(context.pump(), 1);
    assert_eq!(pending.wait().expect("ran"), "Untitled");
    assert_eq!(queue.pending(), 0);
}

#[rstest]
fn units_from_one_submitter_run_in_order(mut context: MainContext) {
    let queue = context.queue();
    let log = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..5)
        .map(|index| {
            let log = Arc::clone(&log);
            queue.submit(move |_| {
                log.lock().expect("log").push(index);
                Ok(index)
            })
        })
        .collect();

    assert_eq!(context.pump(), 5);
    let results: Vec<i32> = handles
        .into_iter()
        .map(|pending| pending.wait().expect("ran"))
        .collect();
    assert_eq!(results, [0, 1, 2, 3, 4]);
    assert_eq!(*log.lock().expect("log"), [0, 1, 2, 3, 4]);
}

#[rstest]
fn a_panicking_unit_does_not_poison_later_units(mut context: MainContext) {
    let queue = context.queue();
    let failing = queue.submit(|_| -> Result<(), CommandError> { panic!("boom") });
    let healthy = queue.submit(|_| Ok(7));

    assert_eq!(context.pump(), 2);
    let error = failing.wait().expect_err("panicked");
    assert_eq!(error.kind(), "internal");
    assert!(error.to_string().contains("boom"));
    assert_eq!(healthy.wait().expect("ran"), 7);
}

#[rstest]
fn queued_units_fail_with_shutdown_when_the_context_stops(mut context: MainContext) {
    let queue = context.queue();
    let pending = queue.submit(|_| Ok(()));
    assert_eq!(context.shutdown(), 1);
    assert_eq!(pending.wait(), Err(CommandError::Shutdown));

    assert!(queue.is_closed());
    let late = queue.submit(|_| Ok(()));
    assert_eq!(late.wait(), Err(CommandError::Shutdown));
    assert_eq!(queue.submitted(), 1);
}

#[rstest]
fn dropping_the_context_releases_waiters(context: MainContext) {
    let queue = context.queue();
    let pending = queue.submit(|_| Ok(()));
    let waiter = thread::spawn(move || pending.wait());
    drop(context);
    let outcome = waiter.join().expect("waiter thread");
    assert_eq!(outcome, Err(CommandError::Shutdown));
}

#[rstest]
fn units_may_mutate_the_store(mut context: MainContext) {
    let queue = context.queue();
    let create = queue.submit(|store| {
        let root = store.create_root("Crate", None)?;
        Ok(store.node(root)?.name)
    });
    context.pump();
    assert_eq!(create.wait().expect("created"), "Crate");
}

#[rstest]
fn run_until_serves_submitters_on_other_threads(mut context: MainContext) {
    let queue = context.queue();
    let stop = Arc::new(AtomicBool::new(false));

    let workers: Vec<_> = (0..4)
        .map(|index| {
            let queue = queue.clone();
            thread::spawn(move || queue.submit(move |_| Ok(index * 2)).wait())
        })
        .collect();

    let stopper = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let outcomes: Vec<_> = workers
                .into_iter()
                .map(|worker| worker.join().expect("worker"))
                .collect();
            stop.store(true, Ordering::SeqCst);
            outcomes
        })
    };

    run_until(&mut context, Duration::from_millis(1), &stop);
    let mut outcomes: Vec<i32> = stopper
        .join()
        .expect("stopper")
        .into_iter()
        .map(|outcome| outcome.expect("ran"))
        .collect();
    outcomes.sort_unstable();
    assert_eq!(outcomes, [0, 2, 4, 6]);
    assert_eq!(queue.submitted(), 4);
}
