// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised when a tour cannot be started.

use alloc::string::String;

/// A malformed [`Tour`](crate::Tour).
///
/// These are reported once, when a run is constructed. Navigation itself never
/// fails with an error; it reports `false` and logs instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TourError {
    /// The tour has no steps.
    #[error("unable to start tour '{tour}' without steps")]
    NoSteps {
        /// Name of the offending tour.
        tour: String,
    },
    /// A step has an empty id.
    #[error("step {step_no} of tour '{tour}' has an empty id")]
    EmptyStepId {
        /// Name of the offending tour.
        tour: String,
        /// 1-based position of the step.
        step_no: usize,
    },
    /// A step has an empty anchor id.
    #[error("step {step_no} of tour '{tour}' has an empty anchor id")]
    EmptyAnchorId {
        /// Name of the offending tour.
        tour: String,
        /// 1-based position of the step.
        step_no: usize,
    },
}
