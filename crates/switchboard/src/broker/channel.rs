//! Type-erased broker channel

use std::any::{self, Any, TypeId};
use std::fmt;

use crate::collector::Collector;
use crate::config::DispatcherConfig;
use crate::dispatcher::Dispatcher;

/// Object-safe view of a `Dispatcher<E, C>`
pub(crate) trait ErasedDispatcher {
    /// `None` if `event` is not the channel's event type
    fn dispatch_erased(&self, event: &dyn Any) -> Option<Box<dyn Any>>;

    /// The `Rc<SubscriberList<E, C::Input>>` behind the dispatcher
    fn subscribers_any(&self) -> &dyn Any;

    fn subscriber_count(&self) -> usize;

    fn reset_collector(&self);
}

impl<E, C> ErasedDispatcher for Dispatcher<E, C>
where
    E: 'static,
    C: Collector + 'static,
    C::Input: 'static,
    C::Output: 'static,
{
    fn dispatch_erased(&self, event: &dyn Any) -> Option<Box<dyn Any>> {
        let event = event.downcast_ref::<E>()?;
        Some(Box::new(self.dispatch(event)))
    }

    fn subscribers_any(&self) -> &dyn Any {
        self.subscriber_list()
    }

    fn subscriber_count(&self) -> usize {
        self.len()
    }

    fn reset_collector(&self) {
        Dispatcher::reset_collector(self);
    }
}

/// One registered event type: its dispatcher plus the type tags checked
/// before any type-erased call
pub(crate) struct Channel {
    pub(crate) event: &'static str,
    pub(crate) output_type: TypeId,
    pub(crate) output_name: &'static str,
    pub(crate) input_name: &'static str,
    pub(crate) dispatcher: Box<dyn ErasedDispatcher>,
}

impl Channel {
    pub(crate) fn new<E, C>(collector: C, config: DispatcherConfig) -> Self
    where
        E: 'static,
        C: Collector + 'static,
        C::Input: 'static,
        C::Output: 'static,
    {
        Self {
            event: any::type_name::<E>(),
            output_type: TypeId::of::<C::Output>(),
            output_name: any::type_name::<C::Output>(),
            input_name: any::type_name::<C::Input>(),
            dispatcher: Box::new(Dispatcher::<E, C>::with_config(collector, config)),
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("event", &self.event)
            .field("result", &self.output_name)
            .field("subscribers", &self.dispatcher.subscriber_count())
            .finish()
    }
}
