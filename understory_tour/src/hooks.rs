// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle hooks, per-step doables, and deferred navigation commands.
//!
//! Hooks observe a run: *entering* and *entered* fire around the anchor lookup
//! of a step, *left* fires when the run moves off a step or closes, and
//! *closed* fires once when the run ends. Doables are per-step actions behind
//! the "do it" button, each with an optional guard.
//!
//! Callbacks cannot reach the session that invokes them. Instead they get a
//! [`TourCommands`] queue and may request navigation there; the session applies
//! the requests in order once the current transition has completed.

use smallvec::SmallVec;

use crate::actions::{ActionHandle, ActionRepository};
use crate::tour::Step;
use crate::types::StepId;

/// Registry key of a lifecycle hook.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookKey {
    /// Before the anchor of the step is looked up.
    Entering(StepId),
    /// After the overlay has been moved to the step's anchor.
    Entered(StepId),
    /// When the run moves away from the step or closes on it.
    Left(StepId),
    /// When the run closes.
    Closed,
}

/// A navigation request made from inside a callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TourCommand {
    /// Move to the next step.
    Next,
    /// Move to the previous step.
    Previous,
    /// Close the run.
    Close,
}

/// Queue of navigation requests handed to hook and doable callbacks.
#[derive(Clone, Debug, Default)]
pub struct TourCommands {
    queue: SmallVec<[TourCommand; 4]>,
}

impl TourCommands {
    /// Request a move to the next step.
    pub fn next(&mut self) {
        self.queue.push(TourCommand::Next);
    }

    /// Request a move to the previous step.
    pub fn previous(&mut self) {
        self.queue.push(TourCommand::Previous);
    }

    /// Request that the run closes.
    pub fn close(&mut self) {
        self.queue.push(TourCommand::Close);
    }

    /// Requests queued so far, oldest first.
    pub fn pending(&self) -> &[TourCommand] {
        &self.queue
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn take(&mut self) -> SmallVec<[TourCommand; 4]> {
        core::mem::take(&mut self.queue)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum HandleInner {
    Inert,
    Hook(ActionHandle<HookKey>),
    Doable(ActionHandle<StepId>),
}

/// Release handle for a hook or doable registration.
///
/// Registering against an empty step id yields an inert handle, which
/// releases nothing.
#[must_use = "dropping the handle keeps the hook registered"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookHandle(HandleInner);

impl HookHandle {
    pub(crate) fn inert() -> Self {
        Self(HandleInner::Inert)
    }

    /// Whether this handle registered nothing.
    pub fn is_inert(&self) -> bool {
        matches!(self.0, HandleInner::Inert)
    }
}

/// The two registries a session dispatches through, plus the command queue
/// their callbacks write to.
#[derive(Debug, Default)]
pub(crate) struct Hooks {
    execution: ActionRepository<HookKey, TourCommands>,
    doables: ActionRepository<StepId, TourCommands>,
    pub(crate) commands: TourCommands,
}

impl Hooks {
    pub(crate) fn add(
        &mut self,
        key: HookKey,
        action: impl FnMut(&Step, &mut TourCommands) + 'static,
    ) -> HookHandle {
        match &key {
            HookKey::Entering(id) | HookKey::Entered(id) | HookKey::Left(id) if id.is_empty() => {
                return HookHandle::inert();
            }
            _ => {}
        }
        HookHandle(HandleInner::Hook(self.execution.add_execute(key, action)))
    }

    pub(crate) fn add_doable(
        &mut self,
        step: StepId,
        action: impl FnMut(&Step, &mut TourCommands) + 'static,
        guard: Option<impl Fn(&Step) -> bool + 'static>,
    ) -> HookHandle {
        if step.is_empty() {
            return HookHandle::inert();
        }
        let handle = match guard {
            Some(guard) => self.doables.add_execute_with_guard(step, action, guard),
            None => self.doables.add_execute(step, action),
        };
        HookHandle(HandleInner::Doable(handle))
    }

    pub(crate) fn release(&mut self, handle: HookHandle) -> bool {
        match handle.0 {
            HandleInner::Inert => false,
            HandleInner::Hook(h) => self.execution.release(h),
            HandleInner::Doable(h) => self.doables.release(h),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.execution.clear();
        self.doables.clear();
    }

    fn fire(&mut self, key: HookKey, step: &Step) {
        tracing::debug!(hook = ?key, "dispatching hook");
        self.execution.execute(&key, step, &mut self.commands);
    }

    pub(crate) fn entering(&mut self, step: &Step) {
        self.fire(HookKey::Entering(step.id.clone()), step);
    }

    pub(crate) fn entered(&mut self, step: &Step) {
        self.fire(HookKey::Entered(step.id.clone()), step);
    }

    pub(crate) fn left(&mut self, step: &Step) {
        self.fire(HookKey::Left(step.id.clone()), step);
    }

    pub(crate) fn closed(&mut self, step: &Step) {
        self.fire(HookKey::Closed, step);
    }

    pub(crate) fn has_entering(&self, step: &Step) -> bool {
        self.execution.contains(&HookKey::Entering(step.id.clone()))
    }

    pub(crate) fn has_doable(&self, step: &Step) -> bool {
        self.doables.contains(&step.id)
    }

    pub(crate) fn do_it(&mut self, step: &Step) {
        self.doables.execute(&step.id, step, &mut self.commands);
    }

    pub(crate) fn can_do_it(&self, step: &Step) -> bool {
        self.doables.can_execute(&step.id, step)
    }
}
