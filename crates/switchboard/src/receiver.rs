//! Receivers: a delegate plus its subscription
//!
//! A [`Receiver`] owns one [`Delegate`] and a weak link to at most one
//! [`Dispatcher`]. Neither side owns the other; dropping either one severs
//! the link.
//!
//! All methods take `&self`, so a callable may rebind or unsubscribe the very
//! receiver it is running in, or subscribe other receivers, while a dispatch
//! pass is in progress.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use switchboard::{Dispatcher, InsertPriority, Receiver, SubscriptionPolicy};
//!
//! let resized: Dispatcher<(u32, u32)> = Dispatcher::new();
//! let area = Rc::new(Cell::new(0));
//!
//! let receiver = Receiver::new();
//! let sink = Rc::clone(&area);
//! receiver.bind(move |(w, h): &(u32, u32)| sink.set(w * h));
//! assert!(receiver.subscribe(&resized, SubscriptionPolicy::Replace, InsertPriority::Back));
//!
//! resized.dispatch(&(4, 3));
//! assert_eq!(area.get(), 12);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::ptr;
use std::rc::{Rc, Weak};

use crate::collector::Collector;
use crate::delegate::Delegate;
use crate::dispatcher::list::SubscriberList;
use crate::dispatcher::Dispatcher;
use crate::subscription::{InsertPriority, SubscriptionPolicy};

/// Shared state behind a [`Receiver`]; dispatchers only hold weak references to it.
pub(crate) struct ReceiverInner<A: ?Sized, R> {
    pub(crate) delegate: RefCell<Delegate<A, R>>,
    pub(crate) attached: RefCell<Option<Weak<SubscriberList<A, R>>>>,
}

impl<A: ?Sized, R> ReceiverInner<A, R> {
    pub(crate) fn is_attached_to(&self, list: &SubscriberList<A, R>) -> bool {
        self.attached
            .borrow()
            .as_ref()
            .is_some_and(|weak| ptr::eq(weak.as_ptr(), list))
    }

    pub(crate) fn attached_list(&self) -> Option<Rc<SubscriberList<A, R>>> {
        self.attached.borrow().as_ref().and_then(Weak::upgrade)
    }
}

impl<A: ?Sized + 'static, R: 'static> ReceiverInner<A, R> {
    /// Clones the binding out of the cell before calling it, so the callable
    /// is free to rebind this receiver.
    pub(crate) fn try_invoke(&self, args: &A) -> Option<R> {
        let binding = self.delegate.borrow().binding();
        binding?.call(args)
    }
}

/// A delegate that can be attached to one dispatcher at a time
pub struct Receiver<A: ?Sized, R = ()> {
    inner: Rc<ReceiverInner<A, R>>,
}

impl<A: ?Sized + 'static, R: 'static> Receiver<A, R> {
    /// Create an unbound, unsubscribed receiver
    pub fn new() -> Self {
        Self::with_delegate(Delegate::new())
    }

    /// Create an unsubscribed receiver around an existing delegate
    pub fn with_delegate(delegate: Delegate<A, R>) -> Self {
        Self {
            inner: Rc::new(ReceiverInner {
                delegate: RefCell::new(delegate),
                attached: RefCell::new(None),
            }),
        }
    }

    /// Bind an owned closure. Subscription state is unaffected.
    pub fn bind<F>(&self, f: F)
    where
        F: Fn(&A) -> R + 'static,
    {
        self.inner.delegate.borrow_mut().bind(f);
    }

    /// Bind a plain function
    pub fn bind_fn(&self, f: fn(&A) -> R) {
        self.inner.delegate.borrow_mut().bind_fn(f);
    }

    /// Bind a method selector against `target`; see [`Delegate::bind_method`]
    pub fn bind_method<T>(&self, target: &Rc<T>, method: fn(&T, &A) -> R)
    where
        T: ?Sized + 'static,
    {
        self.inner.delegate.borrow_mut().bind_method(target, method);
    }

    /// Bind a caller-owned closure; see [`Delegate::bind_shared`]
    pub fn bind_shared<F>(&self, f: &Rc<F>)
    where
        F: Fn(&A) -> R + 'static,
    {
        self.inner.delegate.borrow_mut().bind_shared(f);
    }

    /// Replace the delegate wholesale
    pub fn set_delegate(&self, delegate: Delegate<A, R>) {
        *self.inner.delegate.borrow_mut() = delegate;
    }

    /// Clear the binding. A subscribed but unbound receiver is skipped by dispatch.
    pub fn unbind(&self) {
        self.inner.delegate.borrow_mut().unbind();
    }

    /// True if the delegate has a live binding
    pub fn is_bound(&self) -> bool {
        self.inner.delegate.borrow().is_bound()
    }

    /// Copy of the current delegate
    pub fn delegate(&self) -> Delegate<A, R> {
        self.inner.delegate.borrow().clone()
    }

    /// Invoke the delegate directly, `None` if unbound
    pub fn try_invoke(&self, args: &A) -> Option<R> {
        self.inner.try_invoke(args)
    }

    /// Attach to `dispatcher`
    ///
    /// Subscribing to the dispatcher this receiver is already attached to is a
    /// no-op returning `true`. If it is attached elsewhere, `Replace` moves it
    /// and `Retain` returns `false` without changing anything.
    pub fn subscribe<C>(
        &self,
        dispatcher: &Dispatcher<A, C>,
        policy: SubscriptionPolicy,
        priority: InsertPriority,
    ) -> bool
    where
        C: Collector<Input = R>,
    {
        dispatcher.subscribe(self, policy, priority)
    }

    /// Attach using the dispatcher's configured default policy and priority
    pub fn subscribe_default<C>(&self, dispatcher: &Dispatcher<A, C>) -> bool
    where
        C: Collector<Input = R>,
    {
        dispatcher.subscribe_default(self)
    }

    /// Detach from the current dispatcher; `false` if not subscribed
    pub fn unsubscribe(&self) -> bool {
        SubscriberList::detach(&self.inner)
    }

    /// True if attached to a live dispatcher
    pub fn is_subscribed(&self) -> bool {
        self.inner.attached_list().is_some()
    }

    /// True if attached to `dispatcher`
    pub fn is_subscribed_to<C>(&self, dispatcher: &Dispatcher<A, C>) -> bool
    where
        C: Collector<Input = R>,
    {
        dispatcher.contains(self)
    }

    pub(crate) fn inner(&self) -> &Rc<ReceiverInner<A, R>> {
        &self.inner
    }
}

impl<A: ?Sized + 'static, R: 'static> Default for Receiver<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, R> Drop for Receiver<A, R> {
    fn drop(&mut self) {
        SubscriberList::detach(&self.inner);
    }
}

impl<A: ?Sized + 'static, R: 'static> fmt::Debug for Receiver<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("delegate", &*self.inner.delegate.borrow())
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::collector::CollectLast;

    #[test]
    fn test_new_receiver_is_unbound_and_unsubscribed() {
        let receiver: Receiver<i32> = Receiver::new();
        assert!(!receiver.is_bound());
        assert!(!receiver.is_subscribed());
        assert!(!receiver.unsubscribe());
    }

    #[test]
    fn test_bind_does_not_change_subscription() {
        let dispatcher: Dispatcher<i32> = Dispatcher::new();
        let receiver = Receiver::new();
        receiver.subscribe_default(&dispatcher);

        receiver.bind(|_: &i32| {});
        assert!(receiver.is_bound());
        assert!(receiver.is_subscribed_to(&dispatcher));

        receiver.unbind();
        assert!(!receiver.is_bound());
        assert!(receiver.is_subscribed_to(&dispatcher));
    }

    #[test]
    fn test_replace_moves_between_dispatchers() {
        let first: Dispatcher<i32> = Dispatcher::new();
        let second: Dispatcher<i32> = Dispatcher::new();
        let receiver = Receiver::new();

        assert!(receiver.subscribe(&first, SubscriptionPolicy::Replace, InsertPriority::Back));
        assert!(receiver.subscribe(&second, SubscriptionPolicy::Replace, InsertPriority::Back));

        assert!(!first.contains(&receiver));
        assert!(second.contains(&receiver));
        assert_eq!(first.len(), 0);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_retain_refuses_when_attached_elsewhere() {
        let first: Dispatcher<i32> = Dispatcher::new();
        let second: Dispatcher<i32> = Dispatcher::new();
        let receiver = Receiver::new();

        receiver.subscribe(&first, SubscriptionPolicy::Retain, InsertPriority::Back);
        assert!(!receiver.subscribe(&second, SubscriptionPolicy::Retain, InsertPriority::Back));

        assert!(first.contains(&receiver));
        assert!(!second.contains(&receiver));
    }

    #[test]
    fn test_resubscribe_same_dispatcher_is_idempotent() {
        let dispatcher: Dispatcher<i32> = Dispatcher::new();
        let receiver = Receiver::new();

        assert!(receiver.subscribe(&dispatcher, SubscriptionPolicy::Retain, InsertPriority::Back));
        assert!(receiver.subscribe(&dispatcher, SubscriptionPolicy::Retain, InsertPriority::Front));
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let dispatcher: Dispatcher<i32> = Dispatcher::new();
        {
            let receiver = Receiver::new();
            receiver.bind(|_: &i32| {});
            receiver.subscribe_default(&dispatcher);
            assert_eq!(dispatcher.len(), 1);
        }
        assert!(dispatcher.is_empty());
        dispatcher.dispatch(&1);
    }

    #[test]
    fn test_dispatcher_drop_severs_link() {
        let receiver: Receiver<i32> = Receiver::new();
        {
            let dispatcher: Dispatcher<i32> = Dispatcher::new();
            receiver.subscribe_default(&dispatcher);
            assert!(receiver.is_subscribed());
        }
        assert!(!receiver.is_subscribed());
        assert!(!receiver.unsubscribe());
    }

    #[test]
    fn test_callable_can_rebind_its_own_receiver() {
        let dispatcher: Dispatcher<(), CollectLast<u32>> = Dispatcher::new();
        let receiver = Rc::new(Receiver::new());
        let weak = Rc::downgrade(&receiver);
        receiver.bind(move |_: &()| {
            if let Some(me) = weak.upgrade() {
                me.bind(|_: &()| 2);
            }
            1
        });
        receiver.subscribe_default(&dispatcher);

        assert_eq!(dispatcher.dispatch(&()), 1);
        assert_eq!(dispatcher.dispatch(&()), 2);
    }

    #[test]
    fn test_try_invoke_direct() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let receiver: Receiver<i32, i32> = Receiver::new();
        assert_eq!(receiver.try_invoke(&1), None);

        receiver.bind(move |x| {
            counter.set(counter.get() + 1);
            x + 1
        });
        assert_eq!(receiver.try_invoke(&1), Some(2));
        assert_eq!(calls.get(), 1);
        assert!(receiver.delegate().is_bound());
    }
}
