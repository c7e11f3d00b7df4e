use std::sync::Arc;

use lectern_core::{
    AlertBackend, AlertDispatcher, Config, ConsoleBackend, EngineConfig, EventSink, LogSink,
    ReminderEngine, ReminderStore,
};

/// Assemble the engine from the persisted store and config, with the
/// console backend and a structured-log event sink.
pub fn open_engine() -> Result<ReminderEngine, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = ReminderStore::open()?;
    let sink: Arc<dyn EventSink> = Arc::new(LogSink);
    let backend: Arc<dyn AlertBackend> = Arc::new(ConsoleBackend::from_config(&config));
    let dispatcher = AlertDispatcher::new(backend, sink.clone());
    Ok(ReminderEngine::new(
        store,
        dispatcher,
        sink,
        EngineConfig::from(&config),
    ))
}
