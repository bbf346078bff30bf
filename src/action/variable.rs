use super::ActionItem;
use crate::flow::FlowContext;
use crate::variable::{Binding, Variant, VariableSlot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableCommand {
    Set,
    Get,
    Modify,
}

/// Typed value for a `set` command; the target variable takes on the
/// source's tag along with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ValueSource {
    Int(Binding<i64>),
    Float(Binding<f64>),
    Bool(Binding<bool>),
    Str(Binding<String>),
}

impl ValueSource {
    fn to_variant(&self, ctx: &FlowContext) -> Variant {
        match self {
            ValueSource::Int(binding) => Variant::Integer(binding.get(ctx)),
            ValueSource::Float(binding) => Variant::Float(binding.get(ctx)),
            ValueSource::Bool(binding) => Variant::Boolean(binding.get(ctx)),
            ValueSource::Str(binding) => Variant::String(binding.get(ctx)),
        }
    }
}

/// Reads, writes or arithmetically modifies one variable.
///
/// An unresolved target is not a failure; the action logs and reports
/// success, leaving recovery to the authoring layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAction {
    pub target: VariableSlot,
    pub command: VariableCommand,
    /// Value for `set`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueSource>,
    /// Expression for `modify`, e.g. `"+3"` or `"* 2 - 1"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl VariableAction {
    pub fn set(target: VariableSlot, value: ValueSource) -> Self {
        Self {
            target,
            command: VariableCommand::Set,
            value: Some(value),
            expression: None,
        }
    }

    pub fn get(target: VariableSlot) -> Self {
        Self {
            target,
            command: VariableCommand::Get,
            value: None,
            expression: None,
        }
    }

    pub fn modify(target: VariableSlot, expression: impl Into<String>) -> Self {
        Self {
            target,
            command: VariableCommand::Modify,
            value: None,
            expression: Some(expression.into()),
        }
    }

    fn apply_modify(&self, ctx: &FlowContext, current: Variant) {
        let Some(expression) = self.expression.as_deref() else {
            return;
        };
        let updated = match &current {
            Variant::Integer(v) => {
                apply_expression(*v as f64, expression).map(|r| Variant::Integer(r as i64))
            }
            Variant::Float(v) => apply_expression(*v, expression).map(Variant::Float),
            other => {
                debug!(tag = %other.tag(), "modify only applies to numeric variables");
                return;
            }
        };
        match updated {
            Some(value) => {
                self.target.assign(ctx, value);
            }
            None => warn!(expression, "malformed modify expression, variable untouched"),
        }
    }
}

#[async_trait]
impl ActionItem for VariableAction {
    async fn run(&self, ctx: &FlowContext) -> bool {
        let Some(variable) = self.target.resolve(ctx) else {
            debug!(
                flow = ctx.flow_name(),
                index = self.target.index,
                name = %self.target.name,
                "variable target did not resolve"
            );
            return true;
        };

        match self.command {
            VariableCommand::Get => {}
            VariableCommand::Set => {
                if let Some(source) = &self.value {
                    self.target.assign(ctx, source.to_variant(ctx));
                }
            }
            VariableCommand::Modify => self.apply_modify(ctx, variable.value.clone()),
        }

        if let Some(variable) = self.target.resolve(ctx) {
            info!(flow = ctx.flow_name(), "variable: {}", variable);
        }
        true
    }

    fn display_name(&self) -> &str {
        match self.command {
            VariableCommand::Set => "Variable Set",
            VariableCommand::Get => "Variable Get",
            VariableCommand::Modify => "Variable Modify",
        }
    }
}

/// Applies a tiny arithmetic expression to `current`: a sequence of
/// `<op> <number>` pairs folded left to right, no precedence. Anything the
/// scanner does not recognize, and division by zero, yields `None`.
fn apply_expression(current: f64, expression: &str) -> Option<f64> {
    let mut rest = expression.trim_start();
    if rest.is_empty() {
        return None;
    }
    let mut acc = current;
    while !rest.is_empty() {
        let op = rest.chars().next()?;
        rest = rest[op.len_utf8()..].trim_start();

        let number_len = rest
            .char_indices()
            .take_while(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map(|(i, c)| i + c.len_utf8())
            .last()?;
        let operand: f64 = rest[..number_len].parse().ok()?;
        rest = rest[number_len..].trim_start();

        acc = match op {
            '+' => acc + operand,
            '-' => acc - operand,
            '*' => acc * operand,
            '/' => {
                if operand == 0.0 {
                    return None;
                }
                acc / operand
            }
            _ => return None,
        };
    }
    Some(acc)
}
