//! The persisted representation of flows and the builder that turns it
//! into runnable state.
//!
//! A flow serializes as an ordered list of steps, each carrying its run and
//! finish policy plus a tagged action payload; a variable store serializes
//! as an ordered list of name/value pairs. The interpreter only requires
//! that indices stay stable between deserialization and execution within
//! one run; the wire encoding itself belongs to the authoring layer, which
//! can adapt any custom format through [`IntoFlowDocument`].

use crate::action::{ActionCatalog, BuildContext};
use crate::error::{BuildError, DocumentError};
use crate::flow::{FinishType, Flow, RunType, Step};
use crate::registry::ObjectRegistry;
use crate::variable::{GlobalVariables, Variable, VariableStore, Variant};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// One authored variable: name plus tagged start value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub value: Variant,
}

impl VariableDef {
    pub fn new(name: impl Into<String>, value: Variant) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Tagged action payload: the catalog kind plus kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub kind: String,
    #[serde(default)]
    pub params: JsonValue,
}

/// One authored step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    pub action: ActionDef,
    #[serde(default)]
    pub run_type: RunType,
    #[serde(default)]
    pub finish_type: FinishType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goto_target: Option<usize>,
}

/// The complete, canonical definition of one flow, ready for building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    pub name: String,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

/// An authored shared variable container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalsDocument {
    pub variables: Vec<VariableDef>,
}

impl GlobalsDocument {
    pub fn into_globals(self) -> GlobalVariables {
        GlobalVariables::new(
            self.variables
                .into_iter()
                .map(|def| Variable::new(def.name, def.value))
                .collect(),
        )
    }
}

/// Conversion from a custom authoring format into the canonical document.
///
/// Implement this on your own configuration structs to feed any external
/// encoding into the builder without the engine knowing about it.
pub trait IntoFlowDocument {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError>;
}

impl IntoFlowDocument for FlowDocument {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
        Ok(self)
    }
}

/// Builds a runnable [`Flow`] from a document.
///
/// The builder owns the action catalog (defaults pre-registered), the
/// optional shared globals, the object registry and the sub-flow references
/// a document may name. Goto targets are deliberately not range-checked
/// here: the interpreter validates them at dispatch time and fails closed,
/// so a document can jump into steps that a later authoring pass appends.
pub struct FlowBuilder {
    document: FlowDocument,
    catalog: ActionCatalog,
    globals: Option<Arc<GlobalVariables>>,
    registry: Option<Arc<ObjectRegistry>>,
    subflows: AHashMap<String, Arc<Flow>>,
}

impl FlowBuilder {
    pub fn new(document: FlowDocument) -> Self {
        Self {
            document,
            catalog: ActionCatalog::with_defaults(),
            globals: None,
            registry: None,
            subflows: AHashMap::new(),
        }
    }

    /// Replaces the default catalog, e.g. one extended with custom kinds.
    pub fn with_catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_globals(mut self, globals: Arc<GlobalVariables>) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn with_registry(mut self, registry: Arc<ObjectRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Makes `flow` addressable from `flow.subflow` steps under `name`.
    pub fn with_subflow(mut self, name: impl Into<String>, flow: Arc<Flow>) -> Self {
        self.subflows.insert(name.into(), flow);
        self
    }

    pub fn build(self) -> Result<Arc<Flow>, BuildError> {
        let build_ctx = BuildContext::new(&self.subflows);
        let mut steps = Vec::with_capacity(self.document.steps.len());

        for (index, def) in self.document.steps.iter().enumerate() {
            let entry = self
                .catalog
                .get(&def.action.kind)
                .ok_or_else(|| {
                    BuildError::UnknownActionKind {
                        kind: def.action.kind.clone(),
                    }
                    .at_step(index)
                })?;

            let item = entry
                .parse(&def.action.params, &build_ctx)
                .map_err(|err| err.at_step(index))?;

            let mut step = Step::new(item).with_run_type(def.run_type);
            step = match def.finish_type {
                FinishType::GoTo => {
                    let target = def
                        .goto_target
                        .ok_or_else(|| BuildError::MissingGotoTarget.at_step(index))?;
                    step.with_goto(target)
                }
                finish => step.with_finish(finish),
            };
            steps.push(step);
        }

        let locals: VariableStore = self
            .document
            .variables
            .iter()
            .map(|def| Variable::new(def.name.clone(), def.value.clone()))
            .collect();

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ObjectRegistry::new()));

        let flow = Flow::new(
            self.document.name.clone(),
            steps,
            locals,
            self.globals,
            registry,
        );
        flow.init();
        Ok(flow)
    }
}
