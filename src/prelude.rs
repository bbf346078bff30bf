//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and traits from the rensa crate.
//! Import this module to get access to the core functionality without
//! having to import each type individually.

// Flow execution
pub use crate::flow::{FinishType, Flow, FlowContext, FlowState, RunType, Step};

// Actions
pub use crate::action::{
    ActionCatalog, ActionItem, ActionMeta, BranchAction, BranchPolicy, CallbackAction,
    CatalogEntry, CommentAction, CompareOp, Comparator, DelayAction, FlowCommand, FlowControl,
    FlowSignal, LogAction, SubFlowAction, ValueSource, VariableAction, VariableCommand,
};

// Variables and bindings
pub use crate::variable::{
    Binding, FromVariant, GlobalVariables, HandleBinding, StoreScope, Variable, VariableSlot,
    VariableStore, Variant, VariantType,
};

// Documents
pub use crate::document::{
    ActionDef, FlowBuilder, FlowDocument, GlobalsDocument, IntoFlowDocument, StepDef, VariableDef,
};

// Object handles
pub use crate::registry::{HandleKey, ObjectRegistry};

// Error types
pub use crate::error::{BuildError, DocumentError};
