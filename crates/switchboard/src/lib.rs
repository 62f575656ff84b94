//! Switchboard
//!
//! Single-threaded signal/slot dispatch for in-process events.
//!
//! # Overview
//!
//! A component announces something happened by dispatching an event; any
//! number of receivers react to it, and their individual results are folded
//! into one aggregate that decides whether the rest of the receivers still run.
//! Subscription lists may be changed from inside a running dispatch, including
//! by the receiver currently being invoked.
//!
//! # Architecture
//!
//! 1. **Delegate** (`delegate`): a nullable, rebindable reference to one callable
//! 2. **Collector** (`collector`): folds per-receiver results, decides short-circuit
//! 3. **Receiver** (`receiver`): a delegate attached to at most one dispatcher
//! 4. **Dispatcher** (`dispatcher`): ordered receivers plus a collector
//! 5. **Broker** (`broker`): one dispatcher per event type, looked up at runtime
//! 6. **Configuration** (`config`): dispatch and subscription defaults from YAML
//!
//! # Quick Start
//!
//! ```
//! use switchboard::{CollectWhileTrue, Dispatcher, Receiver};
//!
//! let closing: Dispatcher<str, CollectWhileTrue> = Dispatcher::new();
//!
//! let saved = Receiver::new();
//! saved.bind(|_: &str| true);
//! saved.subscribe_default(&closing);
//!
//! let unsaved = Receiver::new();
//! unsaved.bind(|name: &str| name != "draft.txt");
//! unsaved.subscribe_default(&closing);
//!
//! assert!(closing.dispatch("notes.txt"));
//! closing.reset_collector();
//! assert!(!closing.dispatch("draft.txt"));
//! ```
//!
//! # Configuration
//!
//! ```yaml
//! channel:
//!   reset_collector_before_dispatch: true
//!   trace_invocations: false
//!   default_policy: replace
//!   default_priority: back
//! ```
//!
//! # Error Handling
//!
//! Dispatchers and receivers are statically typed and never fail. The broker
//! works on type-erased channels and reports lookups with the wrong types
//! through `Result<T>`, an alias for `std::result::Result<T, SwitchboardError>`.
//!
//! # Thread Safety
//!
//! Nothing here is `Send` or `Sync`. All objects live on one thread.

pub mod broker;
pub mod collector;
pub mod config;
pub mod delegate;
pub mod dispatcher;
pub mod error;
pub mod receiver;
pub mod subscription;

// Re-export public types
pub use broker::Broker;
pub use collector::{CollectLast, CollectNothing, CollectWhileFalse, CollectWhileTrue, Collector};
pub use config::{BrokerConfig, ConfigLoader, DispatcherConfig};
pub use delegate::{BindingKind, Delegate};
pub use dispatcher::Dispatcher;
pub use error::{Result, SwitchboardError};
pub use receiver::Receiver;
pub use subscription::{InsertPriority, SubscriptionPolicy};
