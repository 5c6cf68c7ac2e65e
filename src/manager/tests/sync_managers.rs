use super::fixtures::{Adder, Broken, CountingHooks};
use crate::manager::api::{
    Delivery, DispatchMode, EventManager, ManagerError, ManagerState, ObserverFailure,
    ObserverMode,
};
use crate::observers::api::{
    Capability, Event, EventType, Observer, ObserverError, RegistryError, ResultSink,
};
use std::sync::{Arc, Mutex, Weak};

#[test]
fn test_empty_registry_trigger_is_noop() {
    let hooks = Arc::new(CountingHooks::default());
    let manager = EventManager::<u64, u64>::builder()
        .hooks(hooks.clone())
        .build()
        .unwrap();
    assert_eq!(manager.state(), ManagerState::Created);

    let dispatched = manager.trigger(Event::new(&EventType::new("tick"), 1)).unwrap();

    assert!(dispatched.is_empty());
    assert_eq!(hooks.counts(), (0, 0));
}

#[test]
fn test_round_trip_returns_sink_value_and_brackets_with_hooks() {
    let hooks = Arc::new(CountingHooks::default());
    let manager = EventManager::<u64, u64>::builder()
        .delivery(Delivery::RoundTrip)
        .hooks(hooks.clone())
        .build()
        .unwrap();
    manager.add_observer(&Arc::new(Adder::new(100))).unwrap();
    assert_eq!(manager.state(), ManagerState::Wired);

    let tick = EventType::new("tick");
    let first = manager.trigger(Event::new(&tick, 1)).unwrap().wait_one();
    assert_eq!(first, Some(Ok(Some(101))));
    assert_eq!(hooks.counts(), (1, 1));

    let second = manager.trigger(Event::new(&tick, 2)).unwrap().wait_one();
    assert_eq!(second, Some(Ok(Some(102))));
    assert_eq!(hooks.counts(), (2, 2));
}

#[test]
fn test_single_mode_rejects_second_observer() {
    let manager = EventManager::<u64, u64>::single_sync().unwrap();
    manager.add_observer(&Arc::new(Adder::new(0))).unwrap();

    let second = manager.add_observer(&Arc::new(Adder::new(1)));
    assert!(matches!(
        second,
        Err(ManagerError::Registry(RegistryError::SlotOccupied))
    ));
    assert!(matches!(
        manager.remove_observer(&Arc::new(Adder::new(1))),
        Err(ManagerError::Registry(RegistryError::RemovalUnsupported))
    ));
    assert_eq!(manager.observer_count(), 1);
}

#[test]
fn test_multi_dispatch_uses_one_snapshot() {
    // Registers a late observer while the event is in flight
    struct Recruiter {
        manager: Mutex<Weak<EventManager<u64, u64>>>,
        late: Arc<Adder>,
    }

    impl Observer<u64, u64> for Recruiter {
        fn can_handle_event(&self, _event: &Event<u64>) -> Capability {
            Capability::HandleNoReturn
        }

        fn on_event(&self, _event: &Event<u64>, _sink: &mut ResultSink<u64>) -> Result<(), ObserverError> {
            if let Some(manager) = self.manager.lock().unwrap().upgrade() {
                manager.add_observer(&self.late)?;
            }
            Ok(())
        }
    }

    let manager = Arc::new(EventManager::<u64, u64>::multi_sync_round_trip().unwrap());
    let late = Arc::new(Adder::new(0));
    let recruiter = Arc::new(Recruiter {
        manager: Mutex::new(Arc::downgrade(&manager)),
        late: late.clone(),
    });
    manager.add_observer(&recruiter).unwrap();

    let tick = EventType::new("tick");
    let first = manager.trigger(Event::new(&tick, 1)).unwrap();
    assert_eq!(first.len(), 1);
    assert!(late.seen().is_empty());

    let second = manager.trigger(Event::new(&tick, 2)).unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(late.seen(), vec![2]);
}

#[test]
fn test_dropped_multi_observer_is_tolerated() {
    let manager = EventManager::<u64, u64>::multi_sync_round_trip().unwrap();
    let kept = Arc::new(Adder::new(1));
    let dropped = Arc::new(Adder::new(2));
    manager.add_observer(&kept).unwrap();
    manager.add_observer(&dropped).unwrap();
    drop(dropped);

    let results = manager
        .trigger(Event::new(&EventType::new("tick"), 10))
        .unwrap()
        .wait_all();

    assert_eq!(results, vec![Ok(Some(11))]);
    assert_eq!(manager.observer_count(), 1);
}

#[test]
fn test_registration_guard_scopes_membership() {
    let manager = EventManager::<u64, u64>::multi_sync().unwrap();
    let observer = Arc::new(Adder::new(0));
    let tick = EventType::new("tick");

    {
        let _registration = manager.register(&observer).unwrap().unwrap();
        manager.trigger(Event::new(&tick, 1)).unwrap();
    }
    manager.trigger(Event::new(&tick, 2)).unwrap();

    assert_eq!(observer.seen(), vec![1]);
}

#[test]
fn test_reentrant_trigger_allowed() {
    struct Relay {
        manager: Mutex<Weak<EventManager<u64, u64>>>,
        follow_up: EventType,
        seen: Mutex<Vec<u64>>,
    }

    impl Observer<u64, u64> for Relay {
        fn can_handle_event(&self, _event: &Event<u64>) -> Capability {
            Capability::HandleNoReturn
        }

        fn on_event(&self, event: &Event<u64>, _sink: &mut ResultSink<u64>) -> Result<(), ObserverError> {
            self.seen.lock().unwrap().push(*event.payload());
            if !event.is_a(&self.follow_up) {
                if let Some(manager) = self.manager.lock().unwrap().upgrade() {
                    assert_eq!(manager.state(), ManagerState::Triggering);
                    manager.trigger(Event::new(&self.follow_up, event.payload() + 1))?;
                }
            }
            Ok(())
        }
    }

    let manager = Arc::new(
        EventManager::<u64, u64>::builder()
            .observers(ObserverMode::Single)
            .dispatch(DispatchMode::Synchronous)
            .build()
            .unwrap(),
    );
    let relay = Arc::new(Relay {
        manager: Mutex::new(Arc::downgrade(&manager)),
        follow_up: EventType::new("follow-up"),
        seen: Mutex::new(Vec::new()),
    });
    manager.add_observer(&relay).unwrap();

    manager.trigger(Event::new(&EventType::new("start"), 1)).unwrap();

    assert_eq!(*relay.seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(manager.state(), ManagerState::Wired);
}

#[test]
fn test_trigger_after_stop_rejected() {
    let manager = EventManager::<u64, u64>::single_sync().unwrap();
    manager.add_observer(&Arc::new(Adder::new(0))).unwrap();
    manager.stop().unwrap();
    manager.stop().unwrap();

    assert_eq!(manager.state(), ManagerState::Stopped);
    assert!(matches!(
        manager.trigger(Event::new(&EventType::new("late"), 1)),
        Err(ManagerError::Stopped)
    ));
}

#[test]
fn test_panicking_failure_handler_does_not_escape_trigger() {
    let hooks = Arc::new(CountingHooks::default());
    let manager = EventManager::<u64, u64>::builder()
        .observers(ObserverMode::Multi)
        .delivery(Delivery::RoundTrip)
        .failure_handler(Arc::new(|_: &EventType, _: &ObserverFailure| {
            panic!("handler panicked")
        }))
        .hooks(hooks.clone())
        .build()
        .unwrap();
    let broken = Arc::new(Broken);
    let adder = Arc::new(Adder::new(1));
    manager.add_observer(&broken).unwrap();
    manager.add_observer(&adder).unwrap();

    let replies = manager
        .trigger(Event::new(&EventType::new("tick"), 4))
        .unwrap()
        .wait_all();

    assert_eq!(replies.len(), 2);
    assert!(replies[0].is_err());
    assert_eq!(replies[1], Ok(Some(5)));
    assert_eq!(hooks.counts(), (1, 1));
}
