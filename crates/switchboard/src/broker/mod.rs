//! Type-erased hub of per-event-type channels
//!
//! The [`Broker`] maps an event type to a channel: a dispatcher taking that
//! event by reference plus the aggregate result type it was registered with.
//! Channels are registered during setup, the broker is then finalized, and
//! from that point on only subscriptions and dispatches happen.
//!
//! Every lookup checks the channel's type tags before calling into the
//! type-erased dispatcher. Asking for an unknown event type or the wrong result
//! type is reported as a [`SwitchboardError`], never a panic.
//!
//! # Examples
//!
//! ```
//! use switchboard::{Broker, CollectWhileTrue, Receiver};
//!
//! struct WindowClosing;
//!
//! let mut broker = Broker::new();
//! broker.register::<WindowClosing, _>(CollectWhileTrue::new())?;
//! broker.finalize();
//!
//! let editor: Receiver<WindowClosing, bool> = Receiver::new();
//! editor.bind(|_| false);
//! broker.subscribe_default(&editor)?;
//!
//! assert!(!broker.dispatch::<bool, _>(&WindowClosing)?);
//! assert!(broker.dispatch::<i32, _>(&WindowClosing).is_err());
//! # Ok::<(), switchboard::SwitchboardError>(())
//! ```

mod channel;

use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::collector::Collector;
use crate::config::BrokerConfig;
use crate::dispatcher::list::SubscriberList;
use crate::error::{Result, SwitchboardError};
use crate::receiver::Receiver;
use crate::subscription::{InsertPriority, SubscriptionPolicy};

use channel::Channel;

/// Registry of event-type channels
#[derive(Default)]
pub struct Broker {
    channels: HashMap<TypeId, Channel>,
    finalized: bool,
    config: BrokerConfig,
}

impl Broker {
    /// Create an empty, unfinalized broker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a broker whose channel dispatchers use `config.channel`
    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Settings this broker was created with
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Register a channel for event type `E` aggregated by `collector`
    ///
    /// # Errors
    ///
    /// Returns [`SwitchboardError::BrokerFinalized`] after [`Broker::finalize`],
    /// or [`SwitchboardError::ChannelAlreadyRegistered`] if `E` already has a
    /// channel. Existing channels are untouched in both cases.
    pub fn register<E, C>(&mut self, collector: C) -> Result<()>
    where
        E: 'static,
        C: Collector + 'static,
        C::Input: 'static,
        C::Output: 'static,
    {
        let event = any::type_name::<E>();
        if self.finalized {
            warn!(event, "Cannot register channel, broker is finalized");
            return Err(SwitchboardError::BrokerFinalized {
                event: event.to_string(),
            });
        }

        let type_id = TypeId::of::<E>();
        if self.channels.contains_key(&type_id) {
            warn!(event, "Channel already registered");
            return Err(SwitchboardError::ChannelAlreadyRegistered {
                event: event.to_string(),
            });
        }

        let channel = Channel::new::<E, C>(collector, self.config.channel);
        info!(event, result = channel.output_name, "Registered channel");
        self.channels.insert(type_id, channel);
        Ok(())
    }

    /// Register a channel for `E` with a default-constructed collector
    pub fn register_default<E, C>(&mut self) -> Result<()>
    where
        E: 'static,
        C: Collector + Default + 'static,
        C::Input: 'static,
        C::Output: 'static,
    {
        self.register::<E, C>(C::default())
    }

    /// Lock the channel set; later registrations fail
    pub fn finalize(&mut self) {
        if !self.finalized {
            self.finalized = true;
            info!(channels = self.channels.len(), "Broker finalized");
        }
    }

    /// True once [`Broker::finalize`] was called
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// True if `E` has a channel
    pub fn is_registered<E: 'static>(&self) -> bool {
        self.channels.contains_key(&TypeId::of::<E>())
    }

    /// Number of registered channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Attach `receiver` to the channel for `E`
    ///
    /// # Errors
    ///
    /// - [`SwitchboardError::ChannelNotRegistered`] if `E` has no channel
    /// - [`SwitchboardError::SignatureMismatch`] if the channel's receivers
    ///   return something other than `R`
    /// - [`SwitchboardError::SubscriptionRejected`] if `policy` is `Retain`
    ///   and the receiver is attached elsewhere
    pub fn subscribe<E, R>(
        &self,
        receiver: &Receiver<E, R>,
        policy: SubscriptionPolicy,
        priority: InsertPriority,
    ) -> Result<()>
    where
        E: 'static,
        R: 'static,
    {
        let channel = self.channel::<E>()?;
        let Some(list) = channel
            .dispatcher
            .subscribers_any()
            .downcast_ref::<Rc<SubscriberList<E, R>>>()
        else {
            warn!(
                event = channel.event,
                expected = channel.input_name,
                requested = any::type_name::<R>(),
                "Receiver signature does not match channel"
            );
            return Err(SwitchboardError::SignatureMismatch {
                event: channel.event.to_string(),
                registered: channel.input_name,
                requested: any::type_name::<R>(),
            });
        };

        if !list.attach(receiver.inner(), policy, priority) {
            warn!(event = channel.event, "Subscription rejected by policy");
            return Err(SwitchboardError::SubscriptionRejected {
                event: channel.event.to_string(),
            });
        }
        debug!(event = channel.event, "Receiver subscribed to channel");
        Ok(())
    }

    /// Attach `receiver` using the configured default policy and priority
    pub fn subscribe_default<E, R>(&self, receiver: &Receiver<E, R>) -> Result<()>
    where
        E: 'static,
        R: 'static,
    {
        self.subscribe(
            receiver,
            self.config.channel.default_policy,
            self.config.channel.default_priority,
        )
    }

    /// Dispatch `event` on its channel and return the aggregate as `R`
    ///
    /// # Errors
    ///
    /// [`SwitchboardError::ChannelNotRegistered`] if `E` has no channel,
    /// [`SwitchboardError::ResultTypeMismatch`] if the channel was registered
    /// with an aggregate type other than `R`.
    pub fn dispatch<R, E>(&self, event: &E) -> Result<R>
    where
        R: 'static,
        E: 'static,
    {
        self.dispatch_dyn(event)
    }

    /// Dispatch an event whose type is only known at runtime
    ///
    /// The channel is chosen by the concrete type behind `event`.
    pub fn dispatch_dyn<R: 'static>(&self, event: &dyn Any) -> Result<R> {
        let type_id = event.type_id();
        let Some(channel) = self.channels.get(&type_id) else {
            let event = format!("{:?}", type_id);
            warn!(%event, "Dispatch on unregistered event type");
            return Err(SwitchboardError::ChannelNotRegistered { event });
        };

        if channel.output_type != TypeId::of::<R>() {
            warn!(
                event = channel.event,
                registered = channel.output_name,
                requested = any::type_name::<R>(),
                "Dispatch result type does not match channel"
            );
            return Err(Self::result_mismatch::<R>(channel));
        }

        channel
            .dispatcher
            .dispatch_erased(event)
            .and_then(|result| result.downcast::<R>().ok())
            .map(|result| *result)
            .ok_or_else(|| Self::result_mismatch::<R>(channel))
    }

    /// Number of receivers attached to the channel for `E`
    pub fn subscriber_count<E: 'static>(&self) -> Result<usize> {
        Ok(self.channel::<E>()?.dispatcher.subscriber_count())
    }

    /// Reset the collector of the channel for `E`
    pub fn reset_collector<E: 'static>(&self) -> Result<()> {
        self.channel::<E>()?.dispatcher.reset_collector();
        Ok(())
    }

    fn channel<E: 'static>(&self) -> Result<&Channel> {
        self.channels.get(&TypeId::of::<E>()).ok_or_else(|| {
            let event = any::type_name::<E>();
            warn!(event, "No channel registered for event");
            SwitchboardError::ChannelNotRegistered {
                event: event.to_string(),
            }
        })
    }

    fn result_mismatch<R: 'static>(channel: &Channel) -> SwitchboardError {
        SwitchboardError::ResultTypeMismatch {
            event: channel.event.to_string(),
            registered: channel.output_name,
            requested: any::type_name::<R>(),
        }
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("channels", &self.channels.values().collect::<Vec<_>>())
            .field("finalized", &self.finalized)
            .finish()
    }
}
