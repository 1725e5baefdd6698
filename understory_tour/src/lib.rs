// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tour: a guided-tour state machine over named UI anchors.
//!
//! A **tour** ([`Tour`]) is an ordered list of **steps** ([`Step`]), each pointing at a UI
//! anchor by id. A [`TourSession`] walks one tour at a time: it decides which step is
//! current, whether moving forward or back is allowed, and what to do with the overlay
//! when the user switches windows and the current anchor is no longer on screen.
//!
//! The crate does no rendering and knows no window system. The host plugs in three
//! collaborators:
//! - an [`AnchorResolver`] that says where an anchor currently lives,
//! - a [`WindowCoordinator`] that reports the active window and window ancestry,
//! - an [`OverlayPresenter`] that shows, hides, and moves the tour popup.
//!
//! [`AnchorRegistry`], [`WindowTracker`], and [`OverlayState`] are in-memory
//! implementations that suit immediate-mode hosts and tests.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_tour::{
//!     AnchorDescriptor, AnchorRegistry, OverlayState, Step, Tour, TourSession, WindowId,
//!     WindowTracker,
//! };
//!
//! let mut anchors = AnchorRegistry::new();
//! anchors.register(AnchorDescriptor::new("open_button", WindowId::MAIN));
//! anchors.register(AnchorDescriptor::new("save_button", WindowId::MAIN));
//!
//! let mut session = TourSession::new(anchors, WindowTracker::new(), OverlayState::new());
//! let tour = Tour::new("basics")
//!     .with_step(Step::new("open", "open_button").with_header("Open a file"))
//!     .with_step(Step::new("save", "save_button").with_header("Save your work"));
//!
//! assert_eq!(session.start(tour), Ok(true));
//! assert!(session.overlay().is_visible());
//! assert_eq!(session.view_model().unwrap().steps, "Step 1/2");
//!
//! // The primary button moves next, and closes the tour on the last step.
//! assert!(session.advance());
//! assert_eq!(session.view_model().unwrap().button_text(), "Close");
//! assert!(session.advance());
//! assert!(!session.is_active());
//! ```
//!
//! ## Hooks and doables
//!
//! Hooks observe a run per step id: *entering* fires before the anchor is looked up (a
//! good place to bring it into view), *entered* once the overlay points at it, and *left*
//! when the run moves on or closes. *Closed* fires once per run. Hook order for a move is
//! always left → entering → entered; closing fires left → closed.
//!
//! A doable is the action behind a step's "do it" button, optionally guarded.
//!
//! Callbacks receive a [`TourCommands`] queue instead of the session. Navigation requested
//! there is applied once the current transition has finished:
//!
//! ```rust
//! use understory_tour::{
//!     AnchorDescriptor, AnchorRegistry, OverlayState, Step, Tour, TourSession, WindowId,
//!     WindowTracker,
//! };
//!
//! let mut anchors = AnchorRegistry::new();
//! anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
//! anchors.register(AnchorDescriptor::new("b", WindowId::MAIN));
//! let mut session = TourSession::new(anchors, WindowTracker::new(), OverlayState::new());
//!
//! // Skip straight past the intro step.
//! let hook = session.on_step_entered("intro", |_, commands| commands.next());
//! let tour = Tour::new("t")
//!     .with_step(Step::new("intro", "a"))
//!     .with_step(Step::new("details", "b"));
//! assert_eq!(session.start(tour), Ok(true));
//! assert_eq!(session.current_step().unwrap().id, "details");
//! assert!(session.release(hook));
//! ```
//!
//! ## Window transitions
//!
//! When a different window becomes active and the current anchor is not on it, the
//! anchor's [`WindowTransition`] policy decides: advance to the next step if its anchor is
//! on the new window, walk back to the nearest earlier step that is, or hide the overlay
//! until the user returns. See [`TourSession::window_activated`].
//!
//! ## Features
//!
//! - `std` (default): enables `std` support in `tracing` and `thiserror`.
//!
//! Diagnostics are emitted with `tracing`; installing a subscriber is up to the host.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod actions;
mod error;
mod hooks;
mod host;
mod overlay;
mod registry;
mod run;
mod session;
mod tour;
mod types;
mod view_model;
mod windows;

pub use actions::{ActionHandle, ActionName, ActionRepository, ExecuteFn, GuardFn};
pub use error::TourError;
pub use hooks::{HookHandle, HookKey, TourCommand, TourCommands};
pub use host::{AnchorResolver, OverlayPresenter, WindowCoordinator};
pub use overlay::OverlayState;
pub use registry::AnchorRegistry;
pub use run::{TourRun, TransitionOutcome};
pub use session::{MAX_DEFERRED_COMMANDS, TourNavigator, TourSession};
pub use tour::{Step, Tour};
pub use types::{AnchorDescriptor, AnchorId, Placement, StepId, WindowId, WindowTransition};
pub use view_model::{TourLabels, TourViewModel, ViewModel, ViewModelFactory};
pub use windows::WindowTracker;
