// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits implemented by the host.
//!
//! The run never talks to a window system or a widget tree directly. It asks an
//! [`AnchorResolver`] where anchors live, a [`WindowCoordinator`] which window
//! is active, and tells an [`OverlayPresenter`] what to show. The crate ships
//! in-memory implementations of all three ([`AnchorRegistry`](crate::AnchorRegistry),
//! [`WindowTracker`](crate::WindowTracker), [`OverlayState`](crate::OverlayState)).

use alloc::vec::Vec;

use crate::types::{AnchorDescriptor, AnchorId, WindowId};

/// Locates UI anchors by id.
pub trait AnchorResolver {
    /// Describe the anchor `id`, or `None` if it is not currently available.
    ///
    /// Anchors whose content is registered but not loaded (for example on a
    /// hidden tab) are only reported when `include_unloaded` is set.
    fn resolve(&self, id: &AnchorId, include_unloaded: bool) -> Option<AnchorDescriptor>;

    /// Describe every known anchor.
    fn resolve_all(&self, include_unloaded: bool) -> Vec<AnchorDescriptor>;

    /// A window was closed; forget the anchors it owned.
    fn window_removed(&mut self, _window: WindowId) {}
}

/// Knows which window is active and how windows relate.
pub trait WindowCoordinator {
    /// The currently active window.
    fn active_window(&self) -> WindowId;

    /// Whether `ancestor` is an ancestor (owner) of `descendant`.
    fn is_ancestor(&self, ancestor: WindowId, descendant: WindowId) -> bool;
}

/// Displays the tour overlay.
pub trait OverlayPresenter {
    /// A run is starting.
    fn begin_tour(&mut self);

    /// Attach the overlay to `anchor`. The overlay stays hidden until
    /// [`show`](Self::show) is called.
    fn move_to(&mut self, anchor: &AnchorDescriptor);

    /// Make the overlay visible.
    fn show(&mut self);

    /// Hide the overlay without ending the run.
    fn hide(&mut self);

    /// The run has ended.
    fn end_tour(&mut self);

    /// The host window moved or resized; recompute the overlay position.
    fn reposition(&mut self);
}

/// Guard that moves the overlay on creation and shows it on drop.
///
/// The overlay ends up visible on every exit path of the scope, unwinding
/// included.
pub(crate) struct OverlayScope<'a, O: OverlayPresenter + ?Sized> {
    overlay: &'a mut O,
}

impl<'a, O: OverlayPresenter + ?Sized> OverlayScope<'a, O> {
    pub(crate) fn enter(overlay: &'a mut O, anchor: &AnchorDescriptor) -> Self {
        overlay.move_to(anchor);
        Self { overlay }
    }
}

impl<O: OverlayPresenter + ?Sized> Drop for OverlayScope<'_, O> {
    fn drop(&mut self) {
        self.overlay.show();
    }
}

impl<O: OverlayPresenter + ?Sized> core::fmt::Debug for OverlayScope<'_, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayScope").finish_non_exhaustive()
    }
}
