//! Per-agent key/value scratch memory shared by the nodes of one tree.
//!
//! Values are arbitrary `'static` types stored behind `dyn Any`. Access goes
//! through [`Key<T>`] constants so the value type is fixed at the key's
//! declaration and checked at compile time:
//!
//! ```
//! use civitas_behavior::{Blackboard, Key};
//!
//! const SPEED: Key<f64> = Key::new("speed");
//!
//! let mut bb = Blackboard::new();
//! bb.set(SPEED, 1.5);
//! assert_eq!(bb.get_copied(SPEED), Some(1.5));
//! ```
//!
//! A blackboard belongs to exactly one agent and is never shared.

use core::any::Any;
use core::marker::PhantomData;
use std::collections::BTreeMap;

/// A typed handle to a blackboard slot.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Declare a key with the given slot name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The slot name.
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> core::fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

/// Key/value store read and written by behavior tree nodes.
#[derive(Default)]
pub struct Blackboard {
    entries: BTreeMap<&'static str, Box<dyn Any + Send>>,
}

impl Blackboard {
    /// Create an empty blackboard.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Any + Send>(&mut self, key: Key<T>, value: T) {
        self.entries.insert(key.name, Box::new(value));
    }

    /// Borrow the value under `key`.
    ///
    /// Returns `None` if the slot is empty or holds a different type.
    pub fn get<T: Any>(&self, key: Key<T>) -> Option<&T> {
        self.entries.get(key.name)?.downcast_ref::<T>()
    }

    /// Mutably borrow the value under `key`.
    pub fn get_mut<T: Any>(&mut self, key: Key<T>) -> Option<&mut T> {
        self.entries.get_mut(key.name)?.downcast_mut::<T>()
    }

    /// Copy the value under `key` out of the blackboard.
    pub fn get_copied<T: Any + Copy>(&self, key: Key<T>) -> Option<T> {
        self.get(key).copied()
    }

    /// Copy the value under `key`, or return `default` if absent.
    pub fn get_or<T: Any + Copy>(&self, key: Key<T>, default: T) -> T {
        self.get_copied(key).unwrap_or(default)
    }

    /// Remove and return the value under `key`.
    ///
    /// A slot holding a different type is left untouched and `None` is
    /// returned.
    pub fn take<T: Any>(&mut self, key: Key<T>) -> Option<T> {
        let boxed = self.entries.remove(key.name)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.entries.insert(key.name, other);
                None
            }
        }
    }

    /// Mutate the value under `key` in place, inserting `T::default()` first
    /// if the slot is empty or holds another type.
    pub fn update<T, F>(&mut self, key: Key<T>, f: F)
    where
        T: Any + Send + Default,
        F: FnOnce(&mut T),
    {
        if self.get::<T>(key).is_none() {
            self.set(key, T::default());
        }
        if let Some(slot) = self.get_mut(key) {
            f(slot);
        }
    }

    /// Whether a slot with this name holds any value.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove the slot with this name. Returns `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Remove every slot.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all occupied slots, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl core::fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Blackboard")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
