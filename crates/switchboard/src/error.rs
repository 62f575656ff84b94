//! Error types for the dispatch engine
//!
//! Binding never fails and the Receiver/Dispatcher subscription calls report
//! refusals as `false`. Everything that can go wrong on the type-erased
//! [`Broker`](crate::broker::Broker) path, plus configuration loading, is
//! reported through [`SwitchboardError`] so the caller can tell which channel
//! was misconfigured.
//!
//! # Examples
//!
//! ```ignore
//! match broker.dispatch::<bool, _>(&WindowClosing) {
//!     Ok(allowed) => println!("close allowed: {}", allowed),
//!     Err(SwitchboardError::ChannelNotRegistered { event }) => {
//!         eprintln!("no channel for {}", event)
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Errors that can occur in the dispatch engine
#[derive(Debug, Error)]
pub enum SwitchboardError {
    /// No broker channel exists for the event type
    ///
    /// Recovery: call `Broker::register` for the event type before `finalize`.
    #[error("No channel registered for event: {event}")]
    ChannelNotRegistered {
        /// Type name of the event
        event: String,
    },

    /// A broker channel for the event type already exists
    #[error("Channel already registered for event: {event}")]
    ChannelAlreadyRegistered {
        /// Type name of the event
        event: String,
    },

    /// The broker was finalized, no further channels can be registered
    #[error("Broker is finalized, cannot register channel for event: {event}")]
    BrokerFinalized {
        /// Type name of the event
        event: String,
    },

    /// The aggregate result type requested by `dispatch` differs from the
    /// one the channel was registered with
    #[error("Result type mismatch for {event}: expected {registered}, got {requested}")]
    ResultTypeMismatch {
        /// Type name of the event
        event: String,
        /// Aggregate type the channel was registered with
        registered: &'static str,
        /// Aggregate type the caller asked for
        requested: &'static str,
    },

    /// A receiver's per-invocation result type differs from the channel's
    #[error("Signature mismatch for {event}: expected {registered}, got {requested}")]
    SignatureMismatch {
        /// Type name of the event
        event: String,
        /// Per-invocation result type of the channel
        registered: &'static str,
        /// Per-invocation result type of the receiver
        requested: &'static str,
    },

    /// The subscription policy refused to move an already attached receiver
    #[error("Subscription rejected for event {event}: receiver is attached elsewhere")]
    SubscriptionRejected {
        /// Type name of the event
        event: String,
    },

    /// YAML (de)serialization failure while loading configuration
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    /// IO failure while reading configuration
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SwitchboardError {
    /// Returns the event type name the error is attributed to, if any.
    pub fn event(&self) -> Option<&str> {
        match self {
            SwitchboardError::ChannelNotRegistered { event }
            | SwitchboardError::ChannelAlreadyRegistered { event }
            | SwitchboardError::BrokerFinalized { event }
            | SwitchboardError::ResultTypeMismatch { event, .. }
            | SwitchboardError::SignatureMismatch { event, .. }
            | SwitchboardError::SubscriptionRejected { event } => Some(event.as_str()),
            SwitchboardError::SerializationError(_)
            | SwitchboardError::IoError(_) => None,
        }
    }
}

/// Result type for dispatch engine operations
pub type Result<T> = std::result::Result<T, SwitchboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_event() {
        let err = SwitchboardError::ResultTypeMismatch {
            event: "WindowClosing".to_string(),
            registered: "bool",
            requested: "i32",
        };
        assert_eq!(
            err.to_string(),
            "Result type mismatch for WindowClosing: expected bool, got i32"
        );
        assert_eq!(err.event(), Some("WindowClosing"));
    }

    #[test]
    fn test_io_errors_have_no_event() {
        let err = SwitchboardError::from(std::io::Error::new(std::io::ErrorKind::Other, "bad"));
        assert!(err.event().is_none());
    }
}
