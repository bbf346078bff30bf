//! The polymorphic unit of work a step invokes, plus the built-in action
//! kinds that need nothing beyond the engine itself.

use crate::flow::FlowContext;
use async_trait::async_trait;

pub mod branch;
pub mod catalog;
pub mod debug;
pub mod delay;
pub mod subflow;
pub mod variable;

pub use branch::{BranchAction, BranchPolicy, CompareOp, Comparator};
pub use catalog::{ActionCatalog, ActionMeta, BuildContext, CatalogEntry};
pub use debug::{CallbackAction, CommentAction, LogAction};
pub use delay::DelayAction;
pub use subflow::{FlowCommand, SubFlowAction};
pub use variable::{ValueSource, VariableAction, VariableCommand};

/// The capability contract every action kind implements.
///
/// The interpreter knows nothing about concrete kinds: it initializes them,
/// runs them, and probes for the optional [`FlowControl`] capability. `run`
/// reports completion as a plain `bool`; `false` from a `Wait` step is the
/// only failure the interpreter propagates.
#[async_trait]
pub trait ActionItem: Send + Sync {
    /// Called once, before the owning flow's first execution.
    fn initialize(&self, _ctx: &FlowContext) {}

    /// Executes the action. Cancellation is cooperative and happens between
    /// steps, never inside a running action.
    async fn run(&self, ctx: &FlowContext) -> bool;

    /// Called by [`Flow::shutdown`](crate::flow::Flow::shutdown), never by
    /// the run loop.
    fn cleanup(&self) {}

    fn display_name(&self) -> &str;

    /// The optional branching capability. An action that returns `Some`
    /// overrides its step's finish policy with the signal it computes.
    fn flow_control(&self) -> Option<&dyn FlowControl> {
        None
    }
}

/// Computed by a flow-control action after its step ran: where the
/// interpreter goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSignal {
    /// Fall through to the next step.
    Continue,
    /// End the current run, reporting success.
    Stop,
    /// Tail-dispatch an independent run from this index.
    Jump(usize),
}

impl FlowSignal {
    /// Decodes the signed sentinel form: `-1` continue, `-2` stop,
    /// non-negative values jump. Any other negative value fails closed to
    /// `Stop`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => FlowSignal::Continue,
            n if n >= 0 => FlowSignal::Jump(n as usize),
            _ => FlowSignal::Stop,
        }
    }

    /// The signed sentinel encoding of this signal.
    pub fn raw(&self) -> i32 {
        match self {
            FlowSignal::Continue => -1,
            FlowSignal::Stop => -2,
            FlowSignal::Jump(index) => *index as i32,
        }
    }
}

/// Optional capability: after a `Wait` step completes successfully, the
/// interpreter asks the action where to go next, bypassing the step's own
/// finish policy entirely.
pub trait FlowControl: Send + Sync {
    /// Re-evaluated on every execution of the owning step; implementations
    /// must not cache a result across runs.
    fn next_signal(&self, ctx: &FlowContext) -> FlowSignal;
}
