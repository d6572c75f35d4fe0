//! Deploy Event Port
//!
//! Progress of a deploy or undeploy run, for display and for tests that
//! need to see which steps ran.

/// Event emitted during deploy operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// A step began
    StepStarted { step: &'static str },

    /// A step had nothing to do
    StepSkipped { step: &'static str, reason: String },

    /// A dependency was not installed; the run continues
    DependencySkipped { dependency: String, reason: String },

    /// A template produced an output file
    TemplateRendered { path: String },

    /// The operator was asked for a value
    InputRequested { name: String },

    /// Run finished
    Completed { unresolved_count: usize },
}

/// Trait for receiving deploy events
pub trait DeployEventSink {
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}

/// Sink that forwards events to the log
pub struct TracingEventSink;

impl DeployEventSink for TracingEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::StepStarted { step } => tracing::info!("{}...", step),
            DeployEvent::StepSkipped { step, reason } => tracing::debug!("{}: {}", step, reason),
            DeployEvent::DependencySkipped { dependency, reason } => {
                tracing::warn!("Skipping dependency {}: {}", dependency, reason)
            }
            DeployEvent::TemplateRendered { path } => tracing::debug!("Rendered {}", path),
            DeployEvent::InputRequested { name } => tracing::debug!("Asked for {}", name),
            DeployEvent::Completed { unresolved_count } => {
                tracing::info!(unresolved_count, "Deployment finished")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Test event sink that records all events
    struct RecordingEventSink {
        events: RefCell<Vec<DeployEvent>>,
    }

    impl DeployEventSink for RecordingEventSink {
        fn on_event(&self, event: DeployEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingEventSink {
            events: RefCell::new(Vec::new()),
        };
        sink.on_event(DeployEvent::StepStarted { step: "checkout" });
        sink.on_event(DeployEvent::Completed { unresolved_count: 0 });
        assert_eq!(sink.events.borrow().len(), 2);
    }
}
