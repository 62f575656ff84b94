//! Fan-out of one call signature to many receivers
//!
//! A [`Dispatcher`] keeps an ordered sequence of weak references to
//! [`Receiver`]s and a [`Collector`]. [`Dispatcher::dispatch`] walks the live
//! sequence by position:
//!
//! 1. Stop if the collector no longer allows invocations
//! 2. Skip entries whose receiver was unsubscribed during this pass
//! 3. Skip receivers without a live binding
//! 4. Invoke the receiver and feed the result to the collector
//!
//! Callables may subscribe and unsubscribe receivers (including themselves)
//! while the pass is running. Receivers appended during the pass are reached
//! by the same pass; receivers removed ahead of the cursor are not invoked.
//!
//! # Examples
//!
//! ```
//! use switchboard::{CollectWhileTrue, Dispatcher, Receiver};
//!
//! let can_close: Dispatcher<str, CollectWhileTrue> = Dispatcher::new();
//!
//! let editor = Receiver::new();
//! editor.bind(|reason: &str| reason != "unsaved");
//! editor.subscribe_default(&can_close);
//!
//! assert!(can_close.dispatch("idle"));
//! assert!(!can_close.dispatch("unsaved"));
//! ```

pub(crate) mod list;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::collector::{CollectNothing, Collector};
use crate::config::DispatcherConfig;
use crate::receiver::Receiver;
use crate::subscription::{InsertPriority, SubscriptionPolicy};

use list::SubscriberList;

/// Owner of a subscriber sequence and a collector
///
/// `A` is the argument type passed by reference to every receiver, `C` the
/// collector deciding the aggregate result and when to stop.
pub struct Dispatcher<A: ?Sized, C: Collector = CollectNothing> {
    subscribers: Rc<SubscriberList<A, C::Input>>,
    collector: RefCell<C>,
    config: DispatcherConfig,
}

impl<A, C> Dispatcher<A, C>
where
    A: ?Sized + 'static,
    C: Collector,
    C::Input: 'static,
{
    /// Create a dispatcher with a default collector
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::with_collector(C::default())
    }

    /// Create a dispatcher owning `collector`
    pub fn with_collector(collector: C) -> Self {
        Self::with_config(collector, DispatcherConfig::default())
    }

    /// Create a dispatcher owning `collector` with explicit settings
    pub fn with_config(collector: C, config: DispatcherConfig) -> Self {
        Self {
            subscribers: SubscriberList::new(),
            collector: RefCell::new(collector),
            config,
        }
    }

    /// Settings this dispatcher was created with
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Attach `receiver`; see [`Receiver::subscribe`]
    pub fn subscribe(
        &self,
        receiver: &Receiver<A, C::Input>,
        policy: SubscriptionPolicy,
        priority: InsertPriority,
    ) -> bool {
        self.subscribers.attach(receiver.inner(), policy, priority)
    }

    /// Attach `receiver` with the configured default policy and priority
    pub fn subscribe_default(&self, receiver: &Receiver<A, C::Input>) -> bool {
        self.subscribe(
            receiver,
            self.config.default_policy,
            self.config.default_priority,
        )
    }

    /// Detach `receiver` if it is attached to this dispatcher
    pub fn unsubscribe(&self, receiver: &Receiver<A, C::Input>) -> bool {
        if !self.contains(receiver) {
            return false;
        }
        SubscriberList::detach(receiver.inner())
    }

    /// Detach every receiver
    pub fn unsubscribe_all(&self) {
        self.subscribers.clear();
    }

    /// True if `receiver` is attached to this dispatcher
    pub fn contains(&self, receiver: &Receiver<A, C::Input>) -> bool {
        receiver.inner().is_attached_to(&self.subscribers)
    }

    /// Number of attached receivers
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True if no receiver is attached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Restore the collector's default aggregate
    pub fn reset_collector(&self) {
        self.collector.borrow_mut().reset();
    }

    /// Current aggregate without dispatching
    pub fn collector_result(&self) -> C::Output {
        self.collector.borrow().result()
    }

    pub(crate) fn subscriber_list(&self) -> &Rc<SubscriberList<A, C::Input>> {
        &self.subscribers
    }

    /// Invoke every attached, bound receiver with `args`
    ///
    /// The collector is not reset unless
    /// [`DispatcherConfig::reset_collector_before_dispatch`] is set; a
    /// collector that has already short-circuited allows no invocation until
    /// [`Dispatcher::reset_collector`] is called. With no receivers the
    /// current aggregate is returned untouched.
    pub fn dispatch(&self, args: &A) -> C::Output {
        if self.config.reset_collector_before_dispatch {
            self.collector.borrow_mut().reset();
        }

        let list = &*self.subscribers;
        let _pass = list.begin_pass();
        let mut cursor = 0;
        let mut front_seen = list.front_inserts();
        let mut invoked = 0usize;

        loop {
            if !self.collector.borrow().should_continue() {
                debug!(invoked, position = cursor, "Dispatch short-circuited by collector");
                break;
            }

            let front_now = list.front_inserts();
            cursor += front_now - front_seen;
            front_seen = front_now;

            let Some(slot) = list.slot(cursor) else {
                break;
            };
            cursor += 1;

            let Some(receiver) = slot.and_then(|weak| weak.upgrade()) else {
                continue;
            };
            if !receiver.is_attached_to(list) {
                continue;
            }

            match receiver.try_invoke(args) {
                Some(result) => {
                    invoked += 1;
                    if self.config.trace_invocations {
                        trace!(
                            receiver = ?Rc::as_ptr(&receiver),
                            position = cursor - 1,
                            "Receiver invoked"
                        );
                    }
                    self.collector.borrow_mut().consume_result(result);
                }
                None => {
                    if self.config.trace_invocations {
                        trace!(
                            receiver = ?Rc::as_ptr(&receiver),
                            position = cursor - 1,
                            "Skipping unbound receiver"
                        );
                    }
                }
            }
        }

        if self.config.trace_invocations {
            trace!(invoked, subscribers = list.len(), "Dispatch pass complete");
        }
        self.collector.borrow().result()
    }
}

impl<A, C> Default for Dispatcher<A, C>
where
    A: ?Sized + 'static,
    C: Collector + Default,
    C::Input: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, C> fmt::Debug for Dispatcher<A, C>
where
    A: ?Sized + 'static,
    C: Collector + fmt::Debug,
    C::Input: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.len())
            .field("collector", &*self.collector.borrow())
            .field("config", &self.config)
            .finish()
    }
}
