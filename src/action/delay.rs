use super::ActionItem;
use crate::flow::FlowContext;
use crate::variable::Binding;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Waits for a number of seconds before reporting success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayAction {
    pub seconds: Binding<f64>,
}

impl DelayAction {
    pub fn new(seconds: Binding<f64>) -> Self {
        Self { seconds }
    }
}

#[async_trait]
impl ActionItem for DelayAction {
    async fn run(&self, ctx: &FlowContext) -> bool {
        let seconds = self.seconds.get(ctx);
        if seconds > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
        }
        true
    }

    fn display_name(&self) -> &str {
        "Delay"
    }
}
