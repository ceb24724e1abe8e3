//! Event sink capability the stream driver reports to

use crate::detection::{Timestamp, WhistleEvent};
use crate::error::Result;

/// Receives debounced whistle transitions from a detector
pub trait WhistleSink {
    /// Called exactly once per confirmed whistle
    fn whistle_detected(&mut self, event: &WhistleEvent) -> Result<()>;

    /// Called when a confirmed whistle stops
    fn whistle_ended(&mut self, _timestamp: Option<Timestamp>) -> Result<()> {
        Ok(())
    }
}

/// Callers can pass a closure as the sink
impl<F> WhistleSink for F
where
    F: FnMut(&WhistleEvent),
{
    fn whistle_detected(&mut self, event: &WhistleEvent) -> Result<()> {
        self(event);
        Ok(())
    }
}

/// Sink that keeps every event it receives
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<WhistleEvent>,
    pub ended: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> Option<&WhistleEvent> {
        self.events.first()
    }
}

impl WhistleSink for EventLog {
    fn whistle_detected(&mut self, event: &WhistleEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn whistle_ended(&mut self, _timestamp: Option<Timestamp>) -> Result<()> {
        self.ended += 1;
        Ok(())
    }
}

/// Sink that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WhistleSink for LogSink {
    fn whistle_detected(&mut self, event: &WhistleEvent) -> Result<()> {
        log::info!("Whistle heard: {}", event);
        Ok(())
    }

    fn whistle_ended(&mut self, timestamp: Option<Timestamp>) -> Result<()> {
        match timestamp {
            Some(ts) => log::info!("Whistle ended [{}]", ts),
            None => log::info!("Whistle ended"),
        }
        Ok(())
    }
}
