//! Type-keyed execution context.
//!
//! A [`Context`] is threaded through command actions and cleanup hooks.
//! The dispatcher only passes it along; it never reads or reacts to the
//! contents, so callers can carry whatever per-invocation state they need.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Caller state flowing through one dispatch pass, keyed by type.
///
/// # Examples
///
/// ```
/// use flagline_core::Context;
///
/// #[derive(Debug, PartialEq)]
/// struct RequestId(u64);
///
/// let mut ctx = Context::new();
/// ctx.insert(RequestId(7));
/// assert_eq!(ctx.get::<RequestId>(), Some(&RequestId(7)));
/// ```
#[derive(Default)]
pub struct Context {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing any previous value of the same type.
    pub fn insert<T: Any>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }
}
