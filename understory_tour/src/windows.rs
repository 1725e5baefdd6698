// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory window coordinator.
//!
//! [`WindowTracker`] keeps windows in the order they were registered. A window
//! registered earlier is treated as the owner of every window registered after
//! it, which matches how dialogs are opened from the window that is already
//! on screen.

use alloc::vec;
use alloc::vec::Vec;

use crate::host::WindowCoordinator;
use crate::types::WindowId;

/// Registration-ordered set of windows plus the active one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowTracker {
    windows: Vec<WindowId>,
    active: WindowId,
    next_id: u64,
}

impl Default for WindowTracker {
    fn default() -> Self {
        Self {
            windows: vec![WindowId::MAIN],
            active: WindowId::MAIN,
            next_id: 1,
        }
    }
}

impl WindowTracker {
    /// Create a tracker holding only the active main window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate and register a fresh window id.
    pub fn open(&mut self) -> WindowId {
        let mut id = WindowId(self.next_id);
        while self.windows.contains(&id) {
            id.0 += 1;
        }
        self.next_id = id.0 + 1;
        self.windows.push(id);
        id
    }

    /// Register a host-allocated window id. Returns `false` if already known.
    pub fn register(&mut self, window: WindowId) -> bool {
        if self.windows.contains(&window) {
            return false;
        }
        self.windows.push(window);
        true
    }

    /// Make `window` the active one. Returns `false` if it is not registered.
    pub fn activate(&mut self, window: WindowId) -> bool {
        if !self.windows.contains(&window) {
            return false;
        }
        self.active = window;
        true
    }

    /// Forget `window`. If it was active, the main window becomes active.
    ///
    /// The main window cannot be removed.
    pub fn remove(&mut self, window: WindowId) -> bool {
        if window == WindowId::MAIN {
            return false;
        }
        let Some(i) = self.windows.iter().position(|w| *w == window) else {
            return false;
        };
        self.windows.remove(i);
        if self.active == window {
            self.active = WindowId::MAIN;
        }
        true
    }

    /// Whether `window` is registered.
    pub fn contains(&self, window: WindowId) -> bool {
        self.windows.contains(&window)
    }

    /// Registered windows, oldest first.
    pub fn windows(&self) -> &[WindowId] {
        &self.windows
    }
}

impl WindowCoordinator for WindowTracker {
    fn active_window(&self) -> WindowId {
        self.active
    }

    fn is_ancestor(&self, ancestor: WindowId, descendant: WindowId) -> bool {
        let index = |w| self.windows.iter().position(|x| *x == w);
        match (index(ancestor), index(descendant)) {
            (Some(a), Some(d)) => a < d,
            _ => false,
        }
    }
}
