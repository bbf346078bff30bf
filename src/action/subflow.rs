use super::ActionItem;
use crate::flow::{Flow, FlowContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a sub-flow step drives its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowCommand {
    /// Await the target's full run and propagate its success.
    Run,
    /// Spawn the target detached and report success unconditionally.
    RunAsync,
    /// Set the target's stop flag.
    Stop,
    /// Clear the target's pause flag.
    Continue,
}

/// Drives another flow by reference.
///
/// The target is shared, never owned: this action does not create or
/// destroy the sub-flow's state, and `Stop`/`Continue` only flip its flags.
pub struct SubFlowAction {
    target: Arc<Flow>,
    command: FlowCommand,
}

impl SubFlowAction {
    pub fn new(target: Arc<Flow>, command: FlowCommand) -> Self {
        Self { target, command }
    }

    pub fn target(&self) -> &Arc<Flow> {
        &self.target
    }

    pub fn command(&self) -> FlowCommand {
        self.command
    }
}

#[async_trait]
impl ActionItem for SubFlowAction {
    async fn run(&self, _ctx: &FlowContext) -> bool {
        match self.command {
            FlowCommand::Run => Arc::clone(&self.target).run().await,
            FlowCommand::RunAsync => {
                tokio::spawn(Arc::clone(&self.target).run());
                true
            }
            FlowCommand::Stop => {
                self.target.stop();
                true
            }
            FlowCommand::Continue => {
                self.target.resume();
                true
            }
        }
    }

    fn display_name(&self) -> &str {
        match self.command {
            FlowCommand::Run => "Run Flow",
            FlowCommand::RunAsync => "Run Flow Async",
            FlowCommand::Stop => "Stop Flow",
            FlowCommand::Continue => "Continue Flow",
        }
    }
}

impl std::fmt::Debug for SubFlowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubFlowAction")
            .field("target", &self.target.name())
            .field("command", &self.command)
            .finish()
    }
}
