use super::ActionItem;
use crate::flow::FlowContext;
use crate::variable::Binding;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

fn enabled_default() -> bool {
    true
}

/// Emits its message through the log layer when enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogAction {
    pub message: Binding<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl LogAction {
    pub fn new(message: Binding<String>) -> Self {
        Self {
            message,
            enabled: true,
        }
    }
}

#[async_trait]
impl ActionItem for LogAction {
    async fn run(&self, ctx: &FlowContext) -> bool {
        if self.enabled {
            info!(flow = ctx.flow_name(), "{}", self.message.get(ctx));
        }
        true
    }

    fn display_name(&self) -> &str {
        "Debug Log"
    }
}

/// Inert step whose text doubles as its display label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommentAction {
    #[serde(default)]
    pub text: String,
}

impl CommentAction {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ActionItem for CommentAction {
    async fn run(&self, _ctx: &FlowContext) -> bool {
        true
    }

    fn display_name(&self) -> &str {
        if self.text.is_empty() {
            "Comment"
        } else {
            &self.text
        }
    }
}

/// Invokes a bound callback and reports a fixed result.
///
/// Built programmatically only; this is the hook for wiring engine events
/// into a flow, and the test suite's probe for observing execution.
#[derive(Clone)]
pub struct CallbackAction {
    name: String,
    callback: Arc<dyn Fn() + Send + Sync>,
    result: bool,
}

impl CallbackAction {
    pub fn new(name: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            callback: Arc::new(callback),
            result: true,
        }
    }

    /// Overrides the result `run` reports after invoking the callback.
    pub fn with_result(mut self, result: bool) -> Self {
        self.result = result;
        self
    }
}

#[async_trait]
impl ActionItem for CallbackAction {
    async fn run(&self, _ctx: &FlowContext) -> bool {
        (self.callback)();
        self.result
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for CallbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackAction")
            .field("name", &self.name)
            .field("result", &self.result)
            .finish()
    }
}
