use super::{ActionItem, FlowControl, FlowSignal};
use crate::error::BuildError;
use crate::flow::FlowContext;
use crate::variable::Binding;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative tolerance for float equality; comparisons are approximate,
/// never bitwise.
const APPROX_EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= APPROX_EPSILON * a.abs().max(b.abs()).max(1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Greater,
    Less,
    Equal,
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
}

impl CompareOp {
    fn is_equality(&self) -> bool {
        matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::LessOrEqual => "<=",
        };
        write!(f, "{}", symbol)
    }
}

/// A typed two-operand comparison. Each side is a binding, so operands can
/// be literals or live variable references in either store.
///
/// `Bool` and `Str` comparisons support only equality operators; the
/// builder rejects anything else through [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparator {
    Int {
        lhs: Binding<i64>,
        rhs: Binding<i64>,
        op: CompareOp,
    },
    Float {
        lhs: Binding<f64>,
        rhs: Binding<f64>,
        op: CompareOp,
    },
    Bool {
        lhs: Binding<bool>,
        rhs: Binding<bool>,
        op: CompareOp,
    },
    Str {
        lhs: Binding<String>,
        rhs: Binding<String>,
        op: CompareOp,
    },
}

impl Comparator {
    pub fn validate(&self) -> Result<(), BuildError> {
        let (operand, op) = match self {
            Comparator::Bool { op, .. } => ("boolean", op),
            Comparator::Str { op, .. } => ("string", op),
            _ => return Ok(()),
        };
        if op.is_equality() {
            Ok(())
        } else {
            Err(BuildError::UnsupportedOperator {
                operand,
                op: op.to_string(),
            })
        }
    }

    /// Evaluates the comparison against the current variable state.
    pub fn evaluate(&self, ctx: &FlowContext) -> bool {
        match self {
            Comparator::Int { lhs, rhs, op } => {
                let (a, b) = (int_operand(lhs, ctx), int_operand(rhs, ctx));
                match op {
                    CompareOp::Greater => a > b,
                    CompareOp::Less => a < b,
                    CompareOp::Equal => a == b,
                    CompareOp::NotEqual => a != b,
                    CompareOp::GreaterOrEqual => a >= b,
                    CompareOp::LessOrEqual => a <= b,
                }
            }
            Comparator::Float { lhs, rhs, op } => {
                let (a, b) = (float_operand(lhs, ctx), float_operand(rhs, ctx));
                match op {
                    CompareOp::Greater => a > b,
                    CompareOp::Less => a < b,
                    CompareOp::Equal => approx_eq(a, b),
                    CompareOp::NotEqual => !approx_eq(a, b),
                    CompareOp::GreaterOrEqual => a > b || approx_eq(a, b),
                    CompareOp::LessOrEqual => a < b || approx_eq(a, b),
                }
            }
            Comparator::Bool { lhs, rhs, op } => {
                let (a, b) = (lhs.get(ctx), rhs.get(ctx));
                match op {
                    CompareOp::Equal => a == b,
                    CompareOp::NotEqual => a != b,
                    // Ordering is rejected at build time; fail closed.
                    _ => false,
                }
            }
            Comparator::Str { lhs, rhs, op } => {
                let (a, b) = (lhs.get(ctx), rhs.get(ctx));
                match op {
                    CompareOp::Equal => a == b,
                    CompareOp::NotEqual => a != b,
                    _ => false,
                }
            }
        }
    }
}

/// Numeric operand resolution for the comparison kinds. Variable references
/// go through the variant's numeric view, so a string variable compares by
/// its length rather than by the binding coercion's zero value.
fn float_operand(binding: &Binding<f64>, ctx: &FlowContext) -> f64 {
    match binding {
        Binding::Literal(value) => *value,
        Binding::Variable(slot) => slot
            .resolve(ctx)
            .map(|var| var.value.as_number())
            .unwrap_or(0.0),
    }
}

fn int_operand(binding: &Binding<i64>, ctx: &FlowContext) -> i64 {
    match binding {
        Binding::Literal(value) => *value,
        Binding::Variable(slot) => slot
            .resolve(ctx)
            .map(|var| var.value.as_number() as i64)
            .unwrap_or(0),
    }
}

/// What a branch outcome does to the owning flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicy {
    #[default]
    Continue,
    Stop,
    GoTo(usize),
}

impl BranchPolicy {
    fn signal(&self) -> FlowSignal {
        match self {
            BranchPolicy::Continue => FlowSignal::Continue,
            BranchPolicy::Stop => FlowSignal::Stop,
            BranchPolicy::GoTo(target) => FlowSignal::Jump(*target),
        }
    }
}

/// If/else over a typed comparison, with an independent policy per branch.
///
/// `run` always succeeds; the decision happens in the flow-control probe,
/// which re-evaluates the comparison on every execution of the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchAction {
    pub comparator: Comparator,
    #[serde(default)]
    pub on_true: BranchPolicy,
    #[serde(default)]
    pub on_false: BranchPolicy,
}

impl BranchAction {
    pub fn new(comparator: Comparator, on_true: BranchPolicy, on_false: BranchPolicy) -> Self {
        Self {
            comparator,
            on_true,
            on_false,
        }
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        self.comparator.validate()
    }
}

#[async_trait]
impl ActionItem for BranchAction {
    async fn run(&self, _ctx: &FlowContext) -> bool {
        true
    }

    fn display_name(&self) -> &str {
        "If Else"
    }

    fn flow_control(&self) -> Option<&dyn FlowControl> {
        Some(self)
    }
}

impl FlowControl for BranchAction {
    fn next_signal(&self, ctx: &FlowContext) -> FlowSignal {
        let outcome = self.comparator.evaluate(ctx);
        let policy = if outcome { self.on_true } else { self.on_false };
        tracing::debug!(outcome, signal = ?policy, "branch evaluated");
        policy.signal()
    }
}
