// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory anchor resolver.
//!
//! Hosts without their own widget lookup register anchors here as they appear.
//! Anchors that go away temporarily (content on a hidden tab, a collapsed
//! panel) are marked unloaded rather than removed, so that navigation checks
//! that ask for unloaded anchors still find them.

use alloc::vec::Vec;

use crate::host::AnchorResolver;
use crate::types::{AnchorDescriptor, AnchorId, WindowId};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    descriptor: AnchorDescriptor,
    loaded: bool,
}

/// Anchors known to the host, in registration order.
#[derive(Clone, Debug, Default)]
pub struct AnchorRegistry {
    entries: Vec<Entry>,
}

impl AnchorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.descriptor.id.as_str() == id)
    }

    fn insert(&mut self, descriptor: AnchorDescriptor, loaded: bool) {
        if let Some(i) = self.position(descriptor.id.as_str()) {
            self.entries.remove(i);
        }
        self.entries.push(Entry { descriptor, loaded });
    }

    /// Register a loaded anchor, replacing any anchor with the same id.
    pub fn register(&mut self, descriptor: AnchorDescriptor) {
        self.insert(descriptor, true);
    }

    /// Register an anchor whose content is not loaded yet.
    pub fn register_unloaded(&mut self, descriptor: AnchorDescriptor) {
        self.insert(descriptor, false);
    }

    /// Mark an anchor loaded or unloaded. Returns `false` if `id` is unknown.
    pub fn set_loaded(&mut self, id: &str, loaded: bool) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        self.entries[i].loaded = loaded;
        true
    }

    /// Change the descriptor of a registered anchor in place.
    ///
    /// Returns `false` if `id` is unknown.
    pub fn update(&mut self, id: &str, f: impl FnOnce(&mut AnchorDescriptor)) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        let entry = &mut self.entries[i];
        f(&mut entry.descriptor);
        // The id is the registry key; keep it stable.
        entry.descriptor.id = AnchorId::from(id);
        true
    }

    /// Forget an anchor. Returns `false` if `id` is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        self.entries.remove(i);
        true
    }

    /// Forget every anchor owned by `window`, returning how many were removed.
    pub fn remove_window(&mut self, window: WindowId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.descriptor.window != window);
        before - self.entries.len()
    }

    /// Whether `id` is registered and loaded.
    pub fn is_loaded(&self, id: &str) -> bool {
        self.position(id).is_some_and(|i| self.entries[i].loaded)
    }

    /// Number of registered anchors, loaded or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no anchors are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate registered anchors with their load state.
    pub fn iter(&self) -> impl Iterator<Item = (&AnchorDescriptor, bool)> + '_ {
        self.entries.iter().map(|e| (&e.descriptor, e.loaded))
    }
}

impl AnchorResolver for AnchorRegistry {
    fn resolve(&self, id: &AnchorId, include_unloaded: bool) -> Option<AnchorDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == *id && (e.loaded || include_unloaded))
            .map(|e| e.descriptor.clone())
    }

    fn resolve_all(&self, include_unloaded: bool) -> Vec<AnchorDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.loaded || include_unloaded)
            .map(|e| e.descriptor.clone())
            .collect()
    }

    fn window_removed(&mut self, window: WindowId) {
        let removed = self.remove_window(window);
        tracing::debug!(window = ?window, removed, "dropped anchors of removed window");
    }
}
