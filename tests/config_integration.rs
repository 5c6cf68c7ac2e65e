//! Building every component from a TOML configuration file

mod support;

use concord::collector::api::{BatchCollector, SingleCollector};
use concord::core::config::{ConcurrencyConfig, ConfigError};
use concord::deadlock::api::DeadlockMonitor;
use concord::manager::api::{Delivery, DispatchMode, EventManager};
use concord::observers::api::{
    Capability, Event, EventType, Observer, ObserverError, ResultSink,
};
use concord::pool::api::ResourcePool;
use std::io::Write;
use std::sync::Arc;
use support::{Recorder, SAMPLE_CONFIG};

fn load_sample() -> ConcurrencyConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_CONFIG.as_bytes()).unwrap();
    ConcurrencyConfig::load(file.path()).unwrap()
}

#[test]
fn test_components_built_from_loaded_config() {
    let config = load_sample();

    let pool = ResourcePool::with_config(&config.pool, || Some(String::from("conn"))).unwrap();
    assert_eq!(pool.capacity(), 2);

    let single = SingleCollector::<u8>::with_config(&config.collector).unwrap();
    assert_eq!(single.capacity(), 8);

    let batch = BatchCollector::<u8>::with_config(&config.collector).unwrap();
    assert_eq!(batch.max_batch(), 3);

    let monitor = Arc::new(DeadlockMonitor::new());
    let handle = monitor.spawn_with_config(&config.monitor).unwrap();
    handle.shutdown().unwrap();
}

#[test]
fn test_async_manager_uses_configured_thread_name() {
    let config = load_sample();
    let manager = EventManager::<String, usize>::builder()
        .dispatch(DispatchMode::Asynchronous)
        .delivery(Delivery::RoundTrip)
        .config(&config.dispatcher)
        .build()
        .unwrap();

    struct ThreadName;

    impl Observer<String, usize> for ThreadName {
        fn can_handle_event(&self, _event: &Event<String>) -> Capability {
            Capability::HandleNoReturn
        }

        fn on_event(&self, event: &Event<String>, _sink: &mut ResultSink<usize>) -> Result<(), ObserverError> {
            let name = std::thread::current().name().map(str::to_string);
            if name.as_deref() == Some(event.payload().as_str()) {
                Ok(())
            } else {
                Err(format!("ran on {name:?}").into())
            }
        }
    }

    manager.add_observer(&Arc::new(ThreadName)).unwrap();
    let reply = manager
        .trigger(Event::new(
            &EventType::new("where"),
            "integration-dispatch".to_string(),
        ))
        .unwrap()
        .wait_one();
    assert_eq!(reply, Some(Ok(None)));
    manager.stop().unwrap();
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[collector]\nmax_batch = 0\n").unwrap();

    let result = ConcurrencyConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_default_config_round_trip() {
    let config = ConcurrencyConfig::default();
    let recorder = Arc::new(Recorder::default());
    let manager = EventManager::<String, usize>::builder()
        .delivery(Delivery::RoundTrip)
        .config(&config.dispatcher)
        .build()
        .unwrap();
    manager.add_observer(&recorder).unwrap();

    let reply = manager
        .trigger(Event::new(&EventType::new("len"), "four".to_string()))
        .unwrap()
        .wait_one();
    assert_eq!(reply, Some(Ok(Some(4))));
    assert_eq!(recorder.seen(), vec!["four".to_string()]);
}
