use super::fixtures::{Adder, Broken, CountingHooks};
use crate::core::config::DispatcherConfig;
use crate::manager::api::{
    Delivery, DispatchMode, EventManager, ManagerError, ManagerState, ObserverFailure,
    ObserverMode,
};
use crate::observers::api::{
    Capability, Event, EventType, Observer, ObserverError, ResultSink,
};
use crossbeam_channel::unbounded;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

#[test]
fn test_events_observed_in_trigger_order() {
    let manager = EventManager::<u64, u64>::single_async().unwrap();
    let observer = Arc::new(Adder::new(0));
    manager.add_observer(&observer).unwrap();

    let tick = EventType::new("tick");
    for n in 0..500 {
        let dispatched = manager.trigger(Event::new(&tick, n)).unwrap();
        assert!(dispatched.is_empty());
    }
    manager.stop().unwrap();

    assert_eq!(observer.seen(), (0..500).collect::<Vec<_>>());
}

#[test]
fn test_round_trip_failure_marker_instead_of_hang() {
    let (failures_tx, failures_rx) = unbounded();
    let manager = EventManager::<u64, u64>::builder()
        .dispatch(DispatchMode::Asynchronous)
        .delivery(Delivery::RoundTrip)
        .failure_handler(Arc::new(move |_: &EventType, failure: &ObserverFailure| {
            failures_tx.send(failure.clone()).unwrap();
        }))
        .build()
        .unwrap();
    manager.add_observer(&Arc::new(Broken)).unwrap();

    let reply = manager
        .trigger(Event::new(&EventType::new("tick"), 1))
        .unwrap()
        .wait_one();

    let expected = ObserverFailure::Failed {
        observer: "broken".to_string(),
        message: "broken observer".to_string(),
    };
    assert_eq!(reply, Some(Err(expected.clone())));
    assert_eq!(failures_rx.recv_timeout(Duration::from_secs(5)), Ok(expected));
}

#[test]
fn test_multi_async_round_trip_collects_every_reply() {
    let hooks = Arc::new(CountingHooks::default());
    let manager = EventManager::<u64, u64>::builder()
        .observers(ObserverMode::Multi)
        .dispatch(DispatchMode::Asynchronous)
        .delivery(Delivery::RoundTrip)
        .hooks(hooks.clone())
        .config(&DispatcherConfig {
            thread_name: "manager-multi-async".to_string(),
        })
        .build()
        .unwrap();
    let observers: Vec<_> = (1..=3).map(|offset| Arc::new(Adder::new(offset * 10))).collect();
    for observer in &observers {
        assert!(manager.add_observer(observer).unwrap());
    }

    let results = manager
        .trigger(Event::new(&EventType::new("tick"), 1))
        .unwrap()
        .wait_all();

    assert_eq!(results, vec![Ok(Some(11)), Ok(Some(21)), Ok(Some(31))]);
    assert_eq!(hooks.counts(), (1, 1));
}

#[test]
fn test_stop_drains_pending_replies_then_rejects() {
    let manager = EventManager::<u64, u64>::single_async_round_trip().unwrap();
    manager.add_observer(&Arc::new(Adder::new(1))).unwrap();

    let tick = EventType::new("tick");
    let pending: Vec<_> = (0..50)
        .map(|n| manager.trigger(Event::new(&tick, n)).unwrap())
        .collect();
    manager.stop().unwrap();
    assert_eq!(manager.state(), ManagerState::Stopped);

    for (n, dispatched) in pending.into_iter().enumerate() {
        assert_eq!(dispatched.wait_one(), Some(Ok(Some(n as u64 + 1))));
    }
    assert!(matches!(
        manager.trigger(Event::new(&tick, 99)),
        Err(ManagerError::Stopped)
    ));
}

#[test]
fn test_drop_joins_dispatcher_thread() {
    let observer = Arc::new(Adder::new(0));
    {
        let manager = EventManager::<u64, u64>::single_async().unwrap();
        manager.add_observer(&observer).unwrap();
        let tick = EventType::new("tick");
        for n in 0..20 {
            manager.trigger(Event::new(&tick, n)).unwrap();
        }
    }
    // Drop stopped the manager, which drained the queue
    assert_eq!(observer.seen().len(), 20);
}

/// Stops the manager it observes from inside `on_event`
struct StopsManager {
    manager: Mutex<Weak<EventManager<u64, u64>>>,
}

impl Observer<u64, u64> for StopsManager {
    fn can_handle_event(&self, _event: &Event<u64>) -> Capability {
        Capability::HandleWithReturn
    }

    fn on_event(&self, event: &Event<u64>, sink: &mut ResultSink<u64>) -> Result<(), ObserverError> {
        if let Some(manager) = self.manager.lock().unwrap().upgrade() {
            manager.stop()?;
        }
        sink.put(*event.payload());
        Ok(())
    }
}

#[test]
fn test_stop_from_dispatcher_thread_does_not_self_join() {
    let manager = Arc::new(EventManager::<u64, u64>::single_async_round_trip().unwrap());
    let observer = Arc::new(StopsManager {
        manager: Mutex::new(Arc::downgrade(&manager)),
    });
    manager.add_observer(&observer).unwrap();

    let reply = manager
        .trigger(Event::new(&EventType::new("tick"), 3))
        .unwrap()
        .wait_one();

    assert_eq!(reply, Some(Ok(Some(3))));
    assert_eq!(manager.state(), ManagerState::Stopped);
    assert!(matches!(
        manager.trigger(Event::new(&EventType::new("tick"), 4)),
        Err(ManagerError::Stopped)
    ));
    // A second stop from this thread finds nothing left to join
    manager.stop().unwrap();
}
