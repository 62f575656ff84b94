//! Result aggregation and short-circuit policies
//!
//! A dispatcher feeds every per-invocation result into its [`Collector`] and
//! stops the pass as soon as [`Collector::should_continue`] turns false.
//!
//! | Collector            | Input | Output | Continues while          | Default   |
//! |----------------------|-------|--------|--------------------------|-----------|
//! | [`CollectNothing`]   | `()`  | `()`   | always                   | `()`      |
//! | [`CollectLast<T>`]   | `T`   | `T`    | always                   | seed      |
//! | [`CollectWhileTrue`] | bool  | bool   | every result was `true`  | `true`    |
//! | [`CollectWhileFalse`]| bool  | bool   | every result was `false` | `false`   |

/// Accumulates per-invocation results of a dispatch pass
///
/// `consume_result` is the only transition; `should_continue` and `result`
/// are pure queries. `reset` restores the policy's default aggregate.
pub trait Collector {
    /// Result type of a single invocation
    type Input;
    /// Aggregate returned by a dispatch
    type Output;

    /// Feed one invocation result into the aggregate
    fn consume_result(&mut self, result: Self::Input);

    /// Whether another invocation may happen in the current pass
    fn should_continue(&self) -> bool;

    /// Current aggregate
    fn result(&self) -> Self::Output;

    /// Restore the default aggregate
    fn reset(&mut self);
}

/// Discards results; used for signatures without a return value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectNothing;

impl Collector for CollectNothing {
    type Input = ();
    type Output = ();

    fn consume_result(&mut self, _result: ()) {}

    fn should_continue(&self) -> bool {
        true
    }

    fn result(&self) {}

    fn reset(&mut self) {}
}

/// Keeps the most recent result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectLast<T> {
    seed: T,
    last: T,
}

impl<T: Clone> CollectLast<T> {
    /// Create a collector whose result is `seed` until something is consumed
    pub fn new(seed: T) -> Self {
        Self {
            last: seed.clone(),
            seed,
        }
    }
}

impl<T: Clone + Default> Default for CollectLast<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Collector for CollectLast<T> {
    type Input = T;
    type Output = T;

    fn consume_result(&mut self, result: T) {
        self.last = result;
    }

    fn should_continue(&self) -> bool {
        true
    }

    fn result(&self) -> T {
        self.last.clone()
    }

    fn reset(&mut self) {
        self.last = self.seed.clone();
    }
}

/// Continues while every result is `true`; a single `false` sticks until reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectWhileTrue {
    all_true: bool,
}

impl CollectWhileTrue {
    /// Create a collector with aggregate `true`
    pub fn new() -> Self {
        Self { all_true: true }
    }
}

impl Default for CollectWhileTrue {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for CollectWhileTrue {
    type Input = bool;
    type Output = bool;

    fn consume_result(&mut self, result: bool) {
        self.all_true &= result;
    }

    fn should_continue(&self) -> bool {
        self.all_true
    }

    fn result(&self) -> bool {
        self.all_true
    }

    fn reset(&mut self) {
        self.all_true = true;
    }
}

/// Continues while every result is `false`; a single `true` sticks until reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectWhileFalse {
    any_true: bool,
}

impl CollectWhileFalse {
    /// Create a collector with aggregate `false`
    pub fn new() -> Self {
        Self { any_true: false }
    }
}

impl Default for CollectWhileFalse {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for CollectWhileFalse {
    type Input = bool;
    type Output = bool;

    fn consume_result(&mut self, result: bool) {
        self.any_true |= result;
    }

    fn should_continue(&self) -> bool {
        !self.any_true
    }

    fn result(&self) -> bool {
        self.any_true
    }

    fn reset(&mut self) {
        self.any_true = false;
    }
}
