//! Single-slot callable binding
//!
//! A [`Delegate`] holds at most one callable with the shape `Fn(&A) -> R`.
//! Four kinds of binding are supported:
//!
//! 1. **Function**: a plain `fn(&A) -> R`
//! 2. **Method**: an object plus a method selector `fn(&T, &A) -> R`. `T` may be
//!    a trait object, in which case the selector performs a dynamic call and
//!    rebinding the same selector against another implementor picks up that
//!    implementor's behavior.
//! 3. **Closure**: an owned closure
//! 4. **Shared**: a closure the caller keeps ownership of (`Rc<F>`)
//!
//! Method and shared bindings hold a [`Weak`] reference. The delegate never
//! keeps external state alive; once the referent is dropped the delegate
//! reports itself as unbound and the dispatcher skips it.
//!
//! Arguments are passed by reference. Forwarding through a delegate never
//! copies the argument; only the bound callable can decide to.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//! use switchboard::Delegate;
//!
//! trait Shape {
//!     fn scaled_area(&self, factor: &f64) -> f64;
//! }
//!
//! struct Square(f64);
//! impl Shape for Square {
//!     fn scaled_area(&self, factor: &f64) -> f64 { self.0 * self.0 * factor }
//! }
//!
//! let square: Rc<dyn Shape> = Rc::new(Square(2.0));
//! let mut delegate: Delegate<f64, f64> = Delegate::new();
//! delegate.bind_method(&square, |shape, factor| shape.scaled_area(factor));
//! assert_eq!(delegate.invoke(&2.0), 8.0);
//! ```

use std::fmt;
use std::rc::{Rc, Weak};

/// Which kind of callable a delegate currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Nothing bound
    Unbound,
    /// Plain function pointer
    Function,
    /// Object plus method selector
    Method,
    /// Owned closure
    Closure,
    /// Caller-owned closure
    Shared,
}

/// Object + selector pair behind a fixed thunk
pub(crate) trait MethodThunk<A: ?Sized, R> {
    fn call(&self, args: &A) -> Option<R>;
    fn is_alive(&self) -> bool;
}

struct MethodBinding<T: ?Sized, A: ?Sized, R> {
    target: Weak<T>,
    method: fn(&T, &A) -> R,
}

impl<T: ?Sized, A: ?Sized, R> MethodThunk<A, R> for MethodBinding<T, A, R> {
    fn call(&self, args: &A) -> Option<R> {
        let target = self.target.upgrade()?;
        Some((self.method)(&*target, args))
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// Cloneable handle to whatever a delegate has bound
pub(crate) enum Binding<A: ?Sized, R> {
    Function(fn(&A) -> R),
    Method(Rc<dyn MethodThunk<A, R>>),
    Closure(Rc<dyn Fn(&A) -> R>),
    Shared(Weak<dyn Fn(&A) -> R>),
}

impl<A: ?Sized, R> Clone for Binding<A, R> {
    fn clone(&self) -> Self {
        match self {
            Binding::Function(f) => Binding::Function(*f),
            Binding::Method(m) => Binding::Method(Rc::clone(m)),
            Binding::Closure(c) => Binding::Closure(Rc::clone(c)),
            Binding::Shared(w) => Binding::Shared(Weak::clone(w)),
        }
    }
}

impl<A: ?Sized, R> Binding<A, R> {
    /// Calls the bound callable; `None` if its referent is gone.
    pub(crate) fn call(&self, args: &A) -> Option<R> {
        match self {
            Binding::Function(f) => Some(f(args)),
            Binding::Method(m) => m.call(args),
            Binding::Closure(c) => Some(c(args)),
            Binding::Shared(w) => w.upgrade().map(|c| c(args)),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            Binding::Function(_) | Binding::Closure(_) => true,
            Binding::Method(m) => m.is_alive(),
            Binding::Shared(w) => w.strong_count() > 0,
        }
    }

    fn kind(&self) -> BindingKind {
        match self {
            Binding::Function(_) => BindingKind::Function,
            Binding::Method(_) => BindingKind::Method,
            Binding::Closure(_) => BindingKind::Closure,
            Binding::Shared(_) => BindingKind::Shared,
        }
    }
}

/// Type-erased holder of at most one callable `Fn(&A) -> R`
pub struct Delegate<A: ?Sized, R = ()> {
    binding: Option<Binding<A, R>>,
}

impl<A: ?Sized + 'static, R: 'static> Delegate<A, R> {
    /// Create an unbound delegate
    pub fn new() -> Self {
        Self { binding: None }
    }

    /// Create a delegate bound to a plain function
    pub fn from_fn(f: fn(&A) -> R) -> Self {
        Self {
            binding: Some(Binding::Function(f)),
        }
    }

    /// Create a delegate owning a closure
    pub fn from_closure<F>(f: F) -> Self
    where
        F: Fn(&A) -> R + 'static,
    {
        Self {
            binding: Some(Binding::Closure(Rc::new(f))),
        }
    }

    /// Bind a plain function, replacing any previous binding
    pub fn bind_fn(&mut self, f: fn(&A) -> R) {
        self.binding = Some(Binding::Function(f));
    }

    /// Bind an owned closure, replacing any previous binding
    pub fn bind<F>(&mut self, f: F)
    where
        F: Fn(&A) -> R + 'static,
    {
        self.binding = Some(Binding::Closure(Rc::new(f)));
    }

    /// Bind a method selector against `target`
    ///
    /// The delegate keeps a weak reference to `target`. `method` is called with
    /// the live object on every invocation, so when `T` is a trait object the
    /// implementation of the object's concrete type is used.
    pub fn bind_method<T>(&mut self, target: &Rc<T>, method: fn(&T, &A) -> R)
    where
        T: ?Sized + 'static,
    {
        let thunk = MethodBinding {
            target: Rc::downgrade(target),
            method,
        };
        self.binding = Some(Binding::Method(Rc::new(thunk)));
    }

    /// Bind a closure the caller keeps ownership of
    ///
    /// Only a weak reference is stored; dropping the caller's `Rc` unbinds the
    /// delegate.
    pub fn bind_shared<F>(&mut self, f: &Rc<F>)
    where
        F: Fn(&A) -> R + 'static,
    {
        let weak: Weak<dyn Fn(&A) -> R> = Rc::downgrade(f) as Weak<F>;
        self.binding = Some(Binding::Shared(weak));
    }

    /// Clear the binding
    pub fn unbind(&mut self) {
        self.binding = None;
    }

    /// True if a callable is bound and its referent (if any) is still alive
    pub fn is_bound(&self) -> bool {
        self.binding.as_ref().is_some_and(Binding::is_live)
    }

    /// Kind of the current binding
    ///
    /// A method or shared binding whose referent was dropped reports
    /// [`BindingKind::Unbound`].
    pub fn kind(&self) -> BindingKind {
        match &self.binding {
            Some(binding) if binding.is_live() => binding.kind(),
            _ => BindingKind::Unbound,
        }
    }

    /// Invoke the bound callable, or return `None` if nothing callable is bound
    pub fn try_invoke(&self, args: &A) -> Option<R> {
        self.binding.as_ref()?.call(args)
    }

    /// Invoke the bound callable
    ///
    /// # Panics
    ///
    /// Panics if the delegate is unbound. Dispatchers never reach this path;
    /// use [`Delegate::try_invoke`] when the binding state is not known.
    pub fn invoke(&self, args: &A) -> R {
        match self.try_invoke(args) {
            Some(result) => result,
            None => panic!("invoked an unbound delegate"),
        }
    }

    pub(crate) fn binding(&self) -> Option<Binding<A, R>> {
        self.binding.clone()
    }
}

impl<A: ?Sized + 'static, R: 'static> Default for Delegate<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, R> Clone for Delegate<A, R> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<A: ?Sized + 'static, R: 'static> fmt::Debug for Delegate<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate").field("kind", &self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn double(x: &i32) -> i32 {
        x * 2
    }

    trait Greeter {
        fn greet(&self, name: &str) -> String;
    }

    struct English;
    struct French;

    impl Greeter for English {
        fn greet(&self, name: &str) -> String {
            format!("Hello, {}", name)
        }
    }

    impl Greeter for French {
        fn greet(&self, name: &str) -> String {
            format!("Bonjour, {}", name)
        }
    }

    #[test]
    fn test_new_delegate_is_unbound() {
        let delegate: Delegate<i32, i32> = Delegate::new();
        assert!(!delegate.is_bound());
        assert_eq!(delegate.kind(), BindingKind::Unbound);
        assert_eq!(delegate.try_invoke(&1), None);
    }

    #[test]
    fn test_bind_function() {
        let delegate = Delegate::from_fn(double);
        assert!(delegate.is_bound());
        assert_eq!(delegate.kind(), BindingKind::Function);
        assert_eq!(delegate.invoke(&21), 42);
    }

    #[test]
    fn test_bind_closure_with_state() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut delegate: Delegate<i32> = Delegate::new();
        delegate.bind(move |x| counter.set(counter.get() + *x));

        delegate.invoke(&3);
        delegate.invoke(&4);
        assert_eq!(calls.get(), 7);
        assert_eq!(delegate.kind(), BindingKind::Closure);
    }

    #[test]
    fn test_rebinding_replaces_previous_binding() {
        let mut delegate = Delegate::from_fn(double);
        delegate.bind(|x: &i32| x + 1);
        assert_eq!(delegate.invoke(&1), 2);

        delegate.unbind();
        assert!(!delegate.is_bound());
    }

    #[test]
    fn test_method_binding_uses_runtime_type() {
        let english: Rc<dyn Greeter> = Rc::new(English);
        let french: Rc<dyn Greeter> = Rc::new(French);
        let mut delegate: Delegate<str, String> = Delegate::new();

        delegate.bind_method(&english, |g, name| g.greet(name));
        assert_eq!(delegate.invoke("Ada"), "Hello, Ada");

        delegate.bind_method(&french, |g, name| g.greet(name));
        assert_eq!(delegate.invoke("Ada"), "Bonjour, Ada");
        assert_eq!(delegate.kind(), BindingKind::Method);
    }

    #[test]
    fn test_method_binding_does_not_keep_target_alive() {
        let english: Rc<dyn Greeter> = Rc::new(English);
        let mut delegate: Delegate<str, String> = Delegate::new();
        delegate.bind_method(&english, |g, name| g.greet(name));
        assert_eq!(Rc::strong_count(&english), 1);

        drop(english);
        assert!(!delegate.is_bound());
        assert_eq!(delegate.kind(), BindingKind::Unbound);
        assert_eq!(delegate.try_invoke("Ada"), None);
    }

    #[test]
    fn test_shared_closure_owned_by_caller() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let callback = Rc::new(move |_: &()| counter.set(counter.get() + 1));

        let mut delegate: Delegate<()> = Delegate::new();
        delegate.bind_shared(&callback);
        delegate.invoke(&());
        assert_eq!(hits.get(), 1);
        assert_eq!(delegate.kind(), BindingKind::Shared);

        drop(callback);
        assert!(!delegate.is_bound());
        assert_eq!(delegate.try_invoke(&()), None);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_clone_shares_binding() {
        let delegate = Delegate::from_closure(|x: &i32| x * 3);
        let copy = delegate.clone();
        assert_eq!(copy.invoke(&2), 6);
    }

    #[test]
    #[should_panic(expected = "invoked an unbound delegate")]
    fn test_invoke_unbound_panics() {
        let delegate: Delegate<i32, i32> = Delegate::new();
        delegate.invoke(&1);
    }
}
