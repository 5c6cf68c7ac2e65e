use super::fixtures::Adder;
use crate::manager::api::{Delivery, DispatchMode, EventManager, ManagerResult, ObserverMode};
use crate::observers::api::{Event, EventType};
use std::sync::Arc;

type Constructor = fn() -> ManagerResult<EventManager<u64, u64>>;

fn combinations() -> [(Constructor, ObserverMode, DispatchMode, Delivery); 8] {
    [
        (EventManager::single_sync, ObserverMode::Single, DispatchMode::Synchronous, Delivery::FireAndForget),
        (EventManager::single_sync_round_trip, ObserverMode::Single, DispatchMode::Synchronous, Delivery::RoundTrip),
        (EventManager::single_async, ObserverMode::Single, DispatchMode::Asynchronous, Delivery::FireAndForget),
        (EventManager::single_async_round_trip, ObserverMode::Single, DispatchMode::Asynchronous, Delivery::RoundTrip),
        (EventManager::multi_sync, ObserverMode::Multi, DispatchMode::Synchronous, Delivery::FireAndForget),
        (EventManager::multi_sync_round_trip, ObserverMode::Multi, DispatchMode::Synchronous, Delivery::RoundTrip),
        (EventManager::multi_async, ObserverMode::Multi, DispatchMode::Asynchronous, Delivery::FireAndForget),
        (EventManager::multi_async_round_trip, ObserverMode::Multi, DispatchMode::Asynchronous, Delivery::RoundTrip),
    ]
}

#[test]
fn test_every_combination_delivers_and_stops() {
    let tick = EventType::new("tick");

    for (constructor, observers, dispatch, delivery) in combinations() {
        let manager = constructor().unwrap();
        assert_eq!(manager.observer_mode(), observers);
        assert_eq!(manager.dispatch_mode(), dispatch);
        assert_eq!(manager.delivery(), delivery);

        let observer = Arc::new(Adder::new(5));
        assert!(manager.add_observer(&observer).unwrap());

        let dispatched = manager.trigger(Event::new(&tick, 7)).unwrap();
        match delivery {
            Delivery::RoundTrip => assert_eq!(dispatched.wait_one(), Some(Ok(Some(12)))),
            Delivery::FireAndForget => assert!(dispatched.is_empty()),
        }

        manager.stop().unwrap();
        assert_eq!(
            observer.seen(),
            vec![7],
            "{observers:?}/{dispatch:?}/{delivery:?}"
        );
    }
}
