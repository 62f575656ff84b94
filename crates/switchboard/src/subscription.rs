//! Subscription policy and insertion priority

use serde::{Deserialize, Serialize};

/// What to do when a receiver that is already attached somewhere is
/// subscribed to another dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPolicy {
    /// Detach from the current dispatcher first; always succeeds
    #[default]
    Replace,
    /// Refuse the new subscription and keep the current one
    Retain,
}

/// Position of a new subscription in the dispatcher's invocation order
///
/// Every `Front` insertion goes ahead of all existing entries, so of two
/// receivers inserted at the front the most recent one is invoked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPriority {
    /// Append after all current subscribers
    #[default]
    Back,
    /// Insert ahead of all current subscribers
    Front,
}
