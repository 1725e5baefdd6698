// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers and anchor descriptions shared by the run and its collaborators.

use alloc::string::String;
use core::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(String::from(id))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a tour step.
    ///
    /// Step ids key the lifecycle hooks and doables. Equality is exact; two ids
    /// that differ only in case name different steps.
    StepId
);

string_id!(
    /// Identifier of a UI anchor a step points at.
    AnchorId
);

/// Identity of a host window.
///
/// The host decides how ids are allocated. [`WindowId::MAIN`] is reserved for
/// the application's main window, which is also what coordinators report when
/// the active window is not one they track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl WindowId {
    /// The main application window.
    pub const MAIN: Self = Self(0);
}

/// Where the overlay prefers to sit relative to its anchor.
///
/// The first word names the side of the anchor, the second the alignment along
/// that side. Interpretation belongs to the presenter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Above the anchor, aligned to its left edge.
    #[default]
    TopLeft,
    /// Above the anchor, centered.
    TopCenter,
    /// Above the anchor, aligned to its right edge.
    TopRight,
    /// Right of the anchor, aligned to its top edge.
    RightTop,
    /// Right of the anchor, centered.
    RightCenter,
    /// Right of the anchor, aligned to its bottom edge.
    RightBottom,
    /// Below the anchor, aligned to its right edge.
    BottomRight,
    /// Below the anchor, centered.
    BottomCenter,
    /// Below the anchor, aligned to its left edge.
    BottomLeft,
    /// Left of the anchor, aligned to its bottom edge.
    LeftBottom,
    /// Left of the anchor, centered.
    LeftCenter,
    /// Left of the anchor, aligned to its top edge.
    LeftTop,
    /// Centered over the anchor.
    Center,
}

/// What the run does with the overlay when focus moves to a window that does
/// not own the current step's anchor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowTransition {
    /// Leave the step and the overlay untouched.
    None,
    /// [`WindowTransition::NextHide`] when the previously active window is an
    /// ancestor of the newly active one (a dialog opened), otherwise
    /// [`WindowTransition::NextPreviousHide`].
    #[default]
    Automatic,
    /// Advance if the next step lives on the new window, otherwise hide.
    NextHide,
    /// Jump back to the nearest earlier step on the new window, otherwise hide.
    PreviousHide,
    /// Try [`WindowTransition::NextHide`], then [`WindowTransition::PreviousHide`].
    NextPreviousHide,
}

impl WindowTransition {
    /// Resolve [`WindowTransition::Automatic`] given whether the previously
    /// active window is an ancestor of the newly active one.
    ///
    /// Every other policy is returned unchanged.
    #[must_use]
    pub fn resolve(self, previous_is_ancestor: bool) -> Self {
        match self {
            Self::Automatic if previous_is_ancestor => Self::NextHide,
            Self::Automatic => Self::NextPreviousHide,
            other => other,
        }
    }

    /// Whether this policy may advance to the next step.
    pub fn tries_next(self) -> bool {
        matches!(self, Self::NextHide | Self::NextPreviousHide)
    }

    /// Whether this policy may walk back to an earlier step.
    pub fn tries_previous(self) -> bool {
        matches!(self, Self::PreviousHide | Self::NextPreviousHide)
    }
}

/// A resolved anchor: where it lives and how the overlay should treat it.
///
/// Resolvers hand out a fresh descriptor on every call. The run never keeps
/// one beyond a single transition, so a descriptor going stale is harmless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorDescriptor {
    /// The anchor this descriptor describes.
    pub id: AnchorId,
    /// The window that owns the anchor.
    pub window: WindowId,
    /// Preferred overlay placement.
    pub placement: Placement,
    /// Behavior on window activation changes.
    pub transition: WindowTransition,
}

impl AnchorDescriptor {
    /// Describe `id` on `window` with default placement and transition policy.
    pub fn new(id: impl Into<AnchorId>, window: WindowId) -> Self {
        Self {
            id: id.into(),
            window,
            placement: Placement::default(),
            transition: WindowTransition::default(),
        }
    }

    /// Set the preferred placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the window transition policy.
    #[must_use]
    pub fn with_transition(mut self, transition: WindowTransition) -> Self {
        self.transition = transition;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automatic_resolves_by_ancestry() {
        assert_eq!(
            WindowTransition::Automatic.resolve(true),
            WindowTransition::NextHide
        );
        assert_eq!(
            WindowTransition::Automatic.resolve(false),
            WindowTransition::NextPreviousHide
        );
        assert_eq!(
            WindowTransition::PreviousHide.resolve(true),
            WindowTransition::PreviousHide
        );
        assert_eq!(WindowTransition::None.resolve(false), WindowTransition::None);
    }

    #[test]
    fn policy_directions() {
        assert!(WindowTransition::NextHide.tries_next());
        assert!(!WindowTransition::NextHide.tries_previous());
        assert!(WindowTransition::PreviousHide.tries_previous());
        assert!(!WindowTransition::PreviousHide.tries_next());
        assert!(WindowTransition::NextPreviousHide.tries_next());
        assert!(WindowTransition::NextPreviousHide.tries_previous());
        assert!(!WindowTransition::None.tries_next());
        assert!(!WindowTransition::Automatic.tries_previous());
    }

    #[test]
    fn ids_compare_exactly() {
        let id = StepId::from("Intro");
        assert_eq!(id, "Intro");
        assert_ne!(id, StepId::from("intro"));
        assert!(StepId::default().is_empty());
        assert_eq!(AnchorId::new(String::from("button")).as_str(), "button");
    }
}
