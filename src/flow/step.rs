use crate::action::ActionItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// How the interpreter invokes a step's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Await the action's completion before moving on.
    #[default]
    Wait,
    /// Detach the action and move on immediately; its outcome is not
    /// observed by the running flow.
    NotWait,
    /// Advance without invoking the action at all.
    Skip,
}

/// What the interpreter does after a `Wait` step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishType {
    /// Fall through to the next step in sequence.
    #[default]
    Continue,
    /// End the current run, reporting success.
    Stop,
    /// Block until the flow is externally resumed, then fall through.
    Pause,
    /// Tail-dispatch an independent run from the step's goto target.
    GoTo,
}

/// One entry in a flow: an action plus its run/finish policy.
///
/// `goto_target` is meaningful only when `finish_type` is [`FinishType::GoTo`];
/// it is a 0-based index into the owning flow and is range-checked at
/// dispatch time, not here. Re-targeting after a reorder is the authoring
/// layer's job.
pub struct Step {
    item: Arc<dyn ActionItem>,
    run_type: RunType,
    finish_type: FinishType,
    goto_target: usize,
    in_progress: AtomicBool,
}

impl Step {
    pub fn new(item: Arc<dyn ActionItem>) -> Self {
        Self {
            item,
            run_type: RunType::Wait,
            finish_type: FinishType::Continue,
            goto_target: 0,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn with_run_type(mut self, run_type: RunType) -> Self {
        self.run_type = run_type;
        self
    }

    pub fn with_finish(mut self, finish_type: FinishType) -> Self {
        self.finish_type = finish_type;
        self
    }

    pub fn with_goto(mut self, target: usize) -> Self {
        self.finish_type = FinishType::GoTo;
        self.goto_target = target;
        self
    }

    pub fn item(&self) -> &Arc<dyn ActionItem> {
        &self.item
    }

    pub fn run_type(&self) -> RunType {
        self.run_type
    }

    pub fn finish_type(&self) -> FinishType {
        self.finish_type
    }

    pub fn goto_target(&self) -> usize {
        self.goto_target
    }

    /// Whether the interpreter is currently inside this step's action.
    /// Observable state for external consumers; only `Wait` and `NotWait`
    /// dispatch ever set it.
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub(crate) fn set_in_progress(&self, state: bool) {
        self.in_progress.store(state, Ordering::SeqCst);
    }

    /// Derived display label: `"{index}: {name}"`, with a `*` marker while
    /// the step is in progress and a `SKIP` suffix for skipped steps.
    pub fn label(&self, index: usize) -> String {
        let marker = if self.is_in_progress() { "*" } else { "" };
        let mut label = format!("{}{}: {}", index, marker, self.item.display_name());
        if self.run_type == RunType::Skip {
            label.push_str("  SKIP");
        }
        label
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("item", &self.item.display_name())
            .field("run_type", &self.run_type)
            .field("finish_type", &self.finish_type)
            .field("goto_target", &self.goto_target)
            .finish()
    }
}
