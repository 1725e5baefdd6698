// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed registry of step actions and their enablement guards.
//!
//! An [`ActionRepository`] holds two independent tables: *execute* callbacks
//! and *can-execute* guards. Both are keyed by `K`. Registering under a key
//! that is already taken replaces the previous entry (with a warning), and
//! each registration hands back an [`ActionHandle`].
//!
//! Handles carry the token of the entries they created. Releasing a handle
//! removes an entry only if it still holds that token, so releasing a stale
//! handle after a newer registration replaced it is a no-op:
//!
//! ```rust
//! use understory_tour::{ActionName, ActionRepository};
//!
//! let mut repo: ActionRepository<ActionName> = ActionRepository::new();
//! let first = repo.add_execute("greet".into(), |_, _| {});
//! let _second = repo.add_execute("GREET".into(), |_, _| {});
//!
//! // Keys are case-insensitive, and the newer entry survives the stale release.
//! assert!(!repo.release(first));
//! assert!(repo.contains(&"Greet".into()));
//! ```
//!
//! Execute callbacks receive the step plus a caller-chosen context `C`; the
//! tour session passes its deferred command queue there.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::tour::Step;

/// Boxed execute callback.
pub type ExecuteFn<C> = Box<dyn FnMut(&Step, &mut C)>;

/// Boxed can-execute guard.
pub type GuardFn = Box<dyn Fn(&Step) -> bool>;

/// A case-insensitive action name.
///
/// Two names are equal when their lowercase forms match, and they hash
/// accordingly, so `"Hello"` and `"hello"` address the same entry while
/// `" hello"` does not.
#[derive(Clone, Debug)]
pub struct ActionName(String);

impl ActionName {
    /// Create a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as it was given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for ActionName {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl Eq for ActionName {}

impl Hash for ActionName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            c.hash(state);
        }
        // Terminator, so that concatenated names hash differently.
        state.write_u8(0xff);
    }
}

impl From<&str> for ActionName {
    fn from(name: &str) -> Self {
        Self(String::from(name))
    }
}

impl From<String> for ActionName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Release handle for a registration.
///
/// Pass it back to [`ActionRepository::release`] to remove what it registered.
/// Dropping it leaves the registration in place.
#[must_use = "dropping the handle keeps the action registered"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionHandle<K> {
    key: K,
    execute: u64,
    can_execute: Option<u64>,
}

impl<K> ActionHandle<K> {
    /// The key this handle registered under.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Whether this registration included a can-execute guard.
    pub fn has_guard(&self) -> bool {
        self.can_execute.is_some()
    }
}

struct Slot<T> {
    token: u64,
    value: T,
}

/// Registry of execute callbacks and can-execute guards keyed by `K`.
///
/// `C` is the extra context handed to execute callbacks.
pub struct ActionRepository<K, C = ()> {
    execute: HashMap<K, Slot<ExecuteFn<C>>>,
    can_execute: HashMap<K, Slot<GuardFn>>,
    next_token: u64,
}

impl<K: fmt::Debug, C> fmt::Debug for ActionRepository<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRepository")
            .field("execute", &self.execute.keys())
            .field("can_execute", &self.can_execute.keys())
            .finish_non_exhaustive()
    }
}

impl<K, C> Default for ActionRepository<K, C>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> ActionRepository<K, C>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            execute: HashMap::new(),
            can_execute: HashMap::new(),
            next_token: 1,
        }
    }

    fn token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    fn insert_execute(&mut self, key: K, action: ExecuteFn<C>) -> u64 {
        let token = self.token();
        if self.execute.contains_key(&key) {
            tracing::warn!(key = ?key, "action already registered; overwriting");
        }
        self.execute.insert(
            key,
            Slot {
                token,
                value: action,
            },
        );
        token
    }

    /// Register an execute callback under `key`.
    ///
    /// Replaces any execute callback already stored under `key`. A guard
    /// registered earlier under the same key is left alone.
    pub fn add_execute(
        &mut self,
        key: K,
        action: impl FnMut(&Step, &mut C) + 'static,
    ) -> ActionHandle<K> {
        let execute = self.insert_execute(key.clone(), Box::new(action));
        tracing::debug!(key = ?key, "action added");
        ActionHandle {
            key,
            execute,
            can_execute: None,
        }
    }

    /// Register an execute callback together with a can-execute guard.
    ///
    /// Releasing the returned handle removes each of the two entries only if
    /// it has not been replaced since.
    pub fn add_execute_with_guard(
        &mut self,
        key: K,
        action: impl FnMut(&Step, &mut C) + 'static,
        guard: impl Fn(&Step) -> bool + 'static,
    ) -> ActionHandle<K> {
        let execute = self.insert_execute(key.clone(), Box::new(action));
        let can_execute = self.token();
        self.can_execute.insert(
            key.clone(),
            Slot {
                token: can_execute,
                value: Box::new(guard),
            },
        );
        tracing::debug!(key = ?key, "action added (with guard)");
        ActionHandle {
            key,
            execute,
            can_execute: Some(can_execute),
        }
    }

    /// Remove the entries `handle` created, if they are still current.
    ///
    /// Returns `true` if anything was removed.
    pub fn release(&mut self, handle: ActionHandle<K>) -> bool {
        let mut removed = false;
        if self
            .execute
            .get(&handle.key)
            .is_some_and(|slot| slot.token == handle.execute)
        {
            self.execute.remove(&handle.key);
            removed = true;
        }
        if let Some(token) = handle.can_execute
            && self
                .can_execute
                .get(&handle.key)
                .is_some_and(|slot| slot.token == token)
        {
            self.can_execute.remove(&handle.key);
            removed = true;
        }
        removed
    }

    /// Whether an execute callback is registered under `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.execute.contains_key(key)
    }

    /// Whether a can-execute guard is registered under `key`.
    pub fn contains_guard(&self, key: &K) -> bool {
        self.can_execute.contains_key(key)
    }

    /// Run the execute callback for `key`, if any.
    pub fn execute(&mut self, key: &K, step: &Step, context: &mut C) {
        let Some(slot) = self.execute.get_mut(key) else {
            tracing::debug!(key = ?key, "action not available");
            return;
        };
        (slot.value)(step, context);
    }

    /// Evaluate the guard for `key`.
    ///
    /// Returns `false` when no guard is registered, even if an execute
    /// callback exists.
    pub fn can_execute(&self, key: &K, step: &Step) -> bool {
        self.can_execute
            .get(key)
            .is_some_and(|slot| (slot.value)(step))
    }

    /// Remove every entry from both tables.
    pub fn clear(&mut self) {
        self.execute.clear();
        self.can_execute.clear();
    }

    /// Number of execute callbacks.
    pub fn execute_len(&self) -> usize {
        self.execute.len()
    }

    /// Number of can-execute guards.
    pub fn can_execute_len(&self) -> usize {
        self.can_execute.len()
    }
}
