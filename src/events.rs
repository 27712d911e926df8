// src/events.rs

//! Injected event observer seam.
//!
//! The catalog core reports notable events through this interface instead of
//! calling any concrete analytics backend. Consumers plug in their own
//! implementation; the default is a no-op.

use std::sync::Arc;

/// An event the core reports to its observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A catalog snapshot finished loading
    CatalogLoaded { papers: usize, skipped: usize },

    /// A catalog load degraded to an empty snapshot
    CatalogError { message: String },

    /// A free-text search ran against a snapshot
    Search { term: String, results: usize },

    /// A category filter was applied
    Filter { category: String },

    /// A single paper was viewed
    PaperView { id: String, course_code: String },

    /// An upload was accepted or rejected
    Upload { filename: String, success: bool },

    /// A contact message was relayed
    ContactSent { subject: String },
}

/// Observer interface for application events.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Observer that discards every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_event(&self, _event: &Event) {}
}

/// Observer that writes events to the log at debug level.
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_event(&self, event: &Event) {
        log::debug!("event: {:?}", event);
    }
}

/// The default observer.
pub fn null_observer() -> Arc<dyn Observer> {
    Arc::new(NullObserver)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Test observer that records every event it sees.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<Event>>,
    }

    impl Observer for RecordingObserver {
        fn on_event(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}
