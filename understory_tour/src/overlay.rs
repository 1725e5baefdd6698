// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless overlay presenter.
//!
//! [`OverlayState`] records what the run asked the overlay to do. Immediate
//! mode hosts read it each frame and draw the overlay next to
//! [`OverlayState::target`] when [`OverlayState::is_visible`] holds.

use crate::host::OverlayPresenter;
use crate::types::AnchorDescriptor;

/// Overlay status as last requested by a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayState {
    active: bool,
    visible: bool,
    target: Option<AnchorDescriptor>,
    repositions: u32,
}

impl OverlayState {
    /// Create an idle overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the overlay should be drawn.
    ///
    /// Never true outside a run.
    pub fn is_visible(&self) -> bool {
        self.active && self.visible
    }

    /// The anchor the overlay is attached to.
    pub fn target(&self) -> Option<&AnchorDescriptor> {
        self.target.as_ref()
    }

    /// How many reposition requests arrived since the run began.
    pub fn reposition_count(&self) -> u32 {
        self.repositions
    }
}

impl OverlayPresenter for OverlayState {
    fn begin_tour(&mut self) {
        *self = Self {
            active: true,
            ..Self::default()
        };
    }

    fn move_to(&mut self, anchor: &AnchorDescriptor) {
        self.target = Some(anchor.clone());
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn end_tour(&mut self) {
        if !self.active {
            tracing::warn!("overlay ended without an active tour");
        }
        *self = Self::default();
    }

    fn reposition(&mut self) {
        self.repositions = self.repositions.saturating_add(1);
    }
}
