use super::fixtures::{Doubler, Picky, RecordingHandler};
use crate::core::config::DispatcherConfig;
use crate::dispatch::api::{
    AsyncDispatcher, Delivery, DispatchError, EventDispatcher, LoggingFailureHandler,
    ObserverFailure,
};
use crate::observers::api::{Event, EventType, SharedObserver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn config(name: &str) -> DispatcherConfig {
    DispatcherConfig {
        thread_name: name.to_string(),
    }
}

#[test]
fn test_events_delivered_in_trigger_order() {
    let (dispatcher, handle) =
        AsyncDispatcher::<u32, u32>::start(&config("async-order"), Arc::new(LoggingFailureHandler))
            .unwrap();
    assert_eq!(handle.name(), "async-order");
    let doubler = Arc::new(Doubler::new());
    let numbers = EventType::new("numbers");

    for n in 0..200 {
        let observers: Vec<SharedObserver<u32, u32>> = vec![doubler.clone()];
        let dispatched = dispatcher
            .dispatch(Arc::new(Event::new(&numbers, n)), observers, Delivery::FireAndForget)
            .unwrap();
        assert!(dispatched.is_empty());
    }

    // Shutdown drains the queue before joining
    dispatcher.shutdown(handle).unwrap();
    assert_eq!(doubler.seen(), (0..200).collect::<Vec<_>>());
}

#[test]
fn test_round_trip_reply_completed_by_worker() {
    let (dispatcher, handle) =
        AsyncDispatcher::<u32, u32>::start(&config("async-reply"), Arc::new(LoggingFailureHandler))
            .unwrap();
    let observers: Vec<SharedObserver<u32, u32>> = vec![Arc::new(Doubler::new())];

    let dispatched = dispatcher
        .dispatch(
            Arc::new(Event::new(&EventType::new("n"), 8)),
            observers,
            Delivery::RoundTrip,
        )
        .unwrap();

    assert_eq!(dispatched.wait_one(), Some(Ok(Some(16))));
    dispatcher.shutdown(handle).unwrap();
}

#[test]
fn test_failure_recorded_in_reply_and_handler() {
    let handler = Arc::new(RecordingHandler::default());
    let (dispatcher, handle) =
        AsyncDispatcher::<u32, u32>::start(&config("async-failure"), handler.clone()).unwrap();
    let numbers = EventType::new("numbers");

    let mut pending = Vec::new();
    for n in [0, 1, 2] {
        let observers: Vec<SharedObserver<u32, u32>> = vec![Arc::new(Picky)];
        pending.push(
            dispatcher
                .dispatch(Arc::new(Event::new(&numbers, n)), observers, Delivery::RoundTrip)
                .unwrap(),
        );
    }
    let results: Vec<_> = pending
        .into_iter()
        .filter_map(|dispatched| dispatched.wait_one())
        .collect();

    assert!(matches!(results[0], Err(ObserverFailure::Panicked { .. })));
    assert!(matches!(results[1], Err(ObserverFailure::Failed { .. })));
    assert_eq!(results[2], Ok(Some(2)));

    // The worker survived both failures
    dispatcher.shutdown(handle).unwrap();
    assert_eq!(handler.failures().len(), 2);
}

#[test]
fn test_dispatch_after_shutdown_rejected() {
    let (dispatcher, handle) =
        AsyncDispatcher::<u32, u32>::start(&config("async-closed"), Arc::new(LoggingFailureHandler))
            .unwrap();
    dispatcher.shutdown(handle).unwrap();
    assert!(dispatcher.is_closed());

    let observers: Vec<SharedObserver<u32, u32>> = vec![Arc::new(Doubler::new())];
    let result = dispatcher.dispatch(
        Arc::new(Event::new(&EventType::new("late"), 1)),
        observers,
        Delivery::RoundTrip,
    );
    assert!(matches!(result, Err(DispatchError::ShutDown)));
}

#[test]
fn test_close_is_idempotent() {
    let (dispatcher, handle) =
        AsyncDispatcher::<u32, u32>::start(&config("async-close"), Arc::new(LoggingFailureHandler))
            .unwrap();
    dispatcher.close();
    dispatcher.close();
    dispatcher.shutdown(handle).unwrap();
}

#[test]
fn test_dispatch_racing_close_is_all_or_nothing() {
    let (dispatcher, handle) =
        AsyncDispatcher::<u32, u32>::start(&config("async-race"), Arc::new(LoggingFailureHandler))
            .unwrap();
    let dispatcher = Arc::new(dispatcher);
    let doubler = Arc::new(Doubler::new());
    let accepted = Arc::new(AtomicUsize::new(0));
    let numbers = EventType::new("numbers");

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            let doubler = Arc::clone(&doubler);
            let accepted = Arc::clone(&accepted);
            let numbers = numbers.clone();
            thread::spawn(move || {
                for n in 0..200 {
                    let observers: Vec<SharedObserver<u32, u32>> =
                        (0..5).map(|_| doubler.clone() as SharedObserver<u32, u32>).collect();
                    match dispatcher.dispatch(
                        Arc::new(Event::new(&numbers, n)),
                        observers,
                        Delivery::RoundTrip,
                    ) {
                        Ok(dispatched) => {
                            assert_eq!(dispatched.len(), 5);
                            accepted.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => assert!(matches!(e, DispatchError::ShutDown)),
                    }
                }
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(5));
    dispatcher.close();
    for producer in producers {
        producer.join().unwrap();
    }
    dispatcher.shutdown(handle).unwrap();

    // Every accepted dispatch ran on all five observers, rejected ones on none
    assert_eq!(doubler.seen().len(), accepted.load(Ordering::SeqCst) * 5);
}
