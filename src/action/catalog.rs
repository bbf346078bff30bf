use super::debug::{CommentAction, LogAction};
use super::subflow::{FlowCommand, SubFlowAction};
use super::{ActionItem, BranchAction, DelayAction, VariableAction};
use crate::error::BuildError;
use crate::flow::Flow;
use ahash::AHashMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Grouping and labeling metadata for an action kind, declared at
/// registration time. This is the menu table an authoring surface reads;
/// nothing here is discovered by runtime type scanning.
#[derive(Debug, Clone, Copy)]
pub struct ActionMeta {
    pub display_name: &'static str,
    pub menu_path: &'static str,
}

/// What the catalog knows about building an action kind out of its
/// document parameters.
pub type ActionParser =
    Box<dyn Fn(&JsonValue, &BuildContext) -> Result<Arc<dyn ActionItem>, BuildError> + Send + Sync>;

/// Everything a parser may need beyond its own parameters.
pub struct BuildContext<'a> {
    subflows: &'a AHashMap<String, Arc<Flow>>,
}

impl<'a> BuildContext<'a> {
    pub fn new(subflows: &'a AHashMap<String, Arc<Flow>>) -> Self {
        Self { subflows }
    }

    pub fn subflow(&self, name: &str) -> Option<Arc<Flow>> {
        self.subflows.get(name).cloned()
    }
}

pub struct CatalogEntry {
    pub meta: ActionMeta,
    parser: ActionParser,
}

impl CatalogEntry {
    pub fn new(meta: ActionMeta, parser: ActionParser) -> Self {
        Self { meta, parser }
    }

    pub fn parse(
        &self,
        params: &JsonValue,
        ctx: &BuildContext,
    ) -> Result<Arc<dyn ActionItem>, BuildError> {
        (self.parser)(params, ctx)
    }
}

/// Registration table from action kind tags to parsers and metadata.
///
/// New kinds register independently; the interpreter is never touched. The
/// default table carries every built-in kind that has a document form.
pub struct ActionCatalog {
    entries: AHashMap<String, CatalogEntry>,
}

impl ActionCatalog {
    pub fn empty() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut catalog = Self::empty();
        register_default_kinds(&mut catalog);
        catalog
    }

    pub fn register(&mut self, kind: impl Into<String>, entry: CatalogEntry) {
        self.entries.insert(kind.into(), entry);
    }

    pub fn get(&self, kind: &str) -> Option<&CatalogEntry> {
        self.entries.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Decodes a parameter object into a concrete action's fields. Omitted
/// parameters decode like an empty object.
fn decode<T: DeserializeOwned>(kind: &'static str, params: &JsonValue) -> Result<T, BuildError> {
    let params = match params {
        JsonValue::Null => JsonValue::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(params).map_err(|err| BuildError::InvalidParams {
        kind: kind.to_string(),
        message: err.to_string(),
    })
}

#[derive(Deserialize)]
struct SubFlowParams {
    flow: String,
    command: FlowCommand,
}

fn register_default_kinds(catalog: &mut ActionCatalog) {
    catalog.register(
        "flow.branch",
        CatalogEntry::new(
            ActionMeta {
                display_name: "If Else",
                menu_path: "Variable/If Else",
            },
            Box::new(|params, _ctx| {
                let action: BranchAction = decode("flow.branch", params)?;
                action.validate()?;
                Ok(Arc::new(action))
            }),
        ),
    );

    catalog.register(
        "flow.subflow",
        CatalogEntry::new(
            ActionMeta {
                display_name: "Sub Flow",
                menu_path: "Logic/Sub Flow",
            },
            Box::new(|params, ctx| {
                let params: SubFlowParams = decode("flow.subflow", params)?;
                let target =
                    ctx.subflow(&params.flow)
                        .ok_or_else(|| BuildError::UnknownSubFlow {
                            flow: params.flow.clone(),
                        })?;
                Ok(Arc::new(SubFlowAction::new(target, params.command)))
            }),
        ),
    );

    catalog.register(
        "variable",
        CatalogEntry::new(
            ActionMeta {
                display_name: "Variable Get Set",
                menu_path: "Variable/Get Set",
            },
            Box::new(|params, _ctx| {
                let action: VariableAction = decode("variable", params)?;
                Ok(Arc::new(action))
            }),
        ),
    );

    catalog.register(
        "time.delay",
        CatalogEntry::new(
            ActionMeta {
                display_name: "Delay",
                menu_path: "Time/Delay",
            },
            Box::new(|params, _ctx| {
                let action: DelayAction = decode("time.delay", params)?;
                Ok(Arc::new(action))
            }),
        ),
    );

    catalog.register(
        "debug.log",
        CatalogEntry::new(
            ActionMeta {
                display_name: "Debug Log",
                menu_path: "Debug/Debug Log",
            },
            Box::new(|params, _ctx| {
                let action: LogAction = decode("debug.log", params)?;
                Ok(Arc::new(action))
            }),
        ),
    );

    catalog.register(
        "debug.comment",
        CatalogEntry::new(
            ActionMeta {
                display_name: "Comment",
                menu_path: "Debug/Comment",
            },
            Box::new(|params, _ctx| {
                let action: CommentAction = decode("debug.comment", params)?;
                Ok(Arc::new(action))
            }),
        ),
    );
}
