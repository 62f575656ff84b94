//! Live subscriber sequence
//!
//! Entries are weak references to receivers. The sequence may change while a
//! dispatch pass is walking it:
//!
//! - removal during a pass leaves a tombstone (`None`) so positions ahead of
//!   any cursor stay put; tombstones are compacted when the outermost pass ends
//! - back insertion appends, so a running pass reaches the new entry
//! - front insertion shifts every position by one; passes track
//!   `front_inserts` and move their cursor by the same amount

use std::cell::{Cell, RefCell};
use std::ptr;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::receiver::ReceiverInner;
use crate::subscription::{InsertPriority, SubscriptionPolicy};

type Entry<A, R> = Option<Weak<ReceiverInner<A, R>>>;

pub(crate) struct SubscriberList<A: ?Sized, R> {
    entries: RefCell<Vec<Entry<A, R>>>,
    front_inserts: Cell<usize>,
    depth: Cell<usize>,
    tombstones: Cell<usize>,
}

impl<A: ?Sized, R> SubscriberList<A, R> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
            front_inserts: Cell::new(0),
            depth: Cell::new(0),
            tombstones: Cell::new(0),
        })
    }

    /// Link `receiver` to this list according to `policy`.
    pub(crate) fn attach(
        self: &Rc<Self>,
        receiver: &Rc<ReceiverInner<A, R>>,
        policy: SubscriptionPolicy,
        priority: InsertPriority,
    ) -> bool {
        if receiver.is_attached_to(self) {
            return true;
        }

        if receiver.attached_list().is_some() {
            match policy {
                SubscriptionPolicy::Retain => {
                    debug!(
                        receiver = ?Rc::as_ptr(receiver),
                        "Subscription retained, receiver is attached elsewhere"
                    );
                    return false;
                }
                SubscriptionPolicy::Replace => {
                    Self::detach(receiver);
                }
            }
        }

        let entry = Some(Rc::downgrade(receiver));
        {
            let mut entries = self.entries.borrow_mut();
            match priority {
                InsertPriority::Back => entries.push(entry),
                InsertPriority::Front => {
                    entries.insert(0, entry);
                    self.front_inserts.set(self.front_inserts.get() + 1);
                }
            }
        }
        *receiver.attached.borrow_mut() = Some(Rc::downgrade(self));

        debug!(
            receiver = ?Rc::as_ptr(receiver),
            ?priority,
            subscribers = self.len(),
            "Receiver subscribed"
        );
        true
    }

    /// Unlink `receiver` from whatever list it is attached to.
    pub(crate) fn detach(receiver: &ReceiverInner<A, R>) -> bool {
        let previous = receiver.attached.borrow_mut().take();
        let Some(previous) = previous else {
            return false;
        };

        if let Some(list) = previous.upgrade() {
            list.remove_entry(receiver);
            debug!(
                receiver = ?(receiver as *const ReceiverInner<A, R>),
                subscribers = list.len(),
                "Receiver unsubscribed"
            );
        }
        true
    }

    /// Unlink every receiver.
    pub(crate) fn clear(&self) {
        let removed: Vec<Weak<ReceiverInner<A, R>>> = {
            let mut entries = self.entries.borrow_mut();
            if self.depth.get() > 0 {
                let removed: Vec<_> = entries.iter_mut().filter_map(Option::take).collect();
                self.tombstones.set(entries.len());
                removed
            } else {
                self.tombstones.set(0);
                entries.drain(..).flatten().collect()
            }
        };

        for weak in &removed {
            if let Some(receiver) = weak.upgrade() {
                if receiver.is_attached_to(self) {
                    *receiver.attached.borrow_mut() = None;
                }
            }
        }
        debug!(removed = removed.len(), "All receivers unsubscribed");
    }

    fn remove_entry(&self, receiver: &ReceiverInner<A, R>) {
        let target: *const ReceiverInner<A, R> = receiver;
        let mut entries = self.entries.borrow_mut();
        let position = entries.iter().position(|entry| {
            entry
                .as_ref()
                .is_some_and(|weak| ptr::eq(weak.as_ptr(), target))
        });
        let Some(index) = position else {
            return;
        };

        if self.depth.get() > 0 {
            entries[index] = None;
            self.tombstones.set(self.tombstones.get() + 1);
        } else {
            entries.remove(index);
        }
    }

    /// Number of live entries
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len() - self.tombstones.get()
    }

    pub(crate) fn front_inserts(&self) -> usize {
        self.front_inserts.get()
    }

    /// Entry at `index`; `None` once the cursor is past the end.
    pub(crate) fn slot(&self, index: usize) -> Option<Entry<A, R>> {
        self.entries.borrow().get(index).cloned()
    }

    pub(crate) fn begin_pass(&self) -> PassGuard<'_, A, R> {
        self.depth.set(self.depth.get() + 1);
        PassGuard { list: self }
    }

    fn compact(&self) {
        if self.tombstones.get() == 0 {
            return;
        }
        if let Ok(mut entries) = self.entries.try_borrow_mut() {
            entries.retain(Option::is_some);
            self.tombstones.set(0);
        }
    }
}

impl<A: ?Sized, R> Drop for SubscriberList<A, R> {
    fn drop(&mut self) {
        let this: *const Self = self;
        for weak in self.entries.get_mut().drain(..).flatten() {
            if let Some(receiver) = weak.upgrade() {
                let mut attached = receiver.attached.borrow_mut();
                if attached
                    .as_ref()
                    .is_some_and(|list| ptr::eq(list.as_ptr(), this))
                {
                    *attached = None;
                }
            }
        }
    }
}

/// Marks a dispatch pass in progress; compacts on exit, including unwind.
pub(crate) struct PassGuard<'a, A: ?Sized, R> {
    list: &'a SubscriberList<A, R>,
}

impl<A: ?Sized, R> Drop for PassGuard<'_, A, R> {
    fn drop(&mut self) {
        let depth = self.list.depth.get() - 1;
        self.list.depth.set(depth);
        if depth == 0 {
            self.list.compact();
        }
    }
}
