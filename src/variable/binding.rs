use super::store::{Variable, VariableStore};
use super::value::Variant;
use crate::flow::FlowContext;
use crate::registry::HandleKey;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// Which variable store a slot points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreScope {
    #[default]
    Local,
    Global,
}

/// A by-reference handle on a variable: store choice, index, and the name
/// the variable carried when the reference was authored.
///
/// The slot holds no pointer into the store; it re-resolves on every read.
/// The index is authoritative while the variable there still carries the
/// recorded name; after a structural edit the name lookup takes over (see
/// [`VariableStore::position`]). Resolution is a pure read and never
/// rewrites the slot itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSlot {
    pub index: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scope: StoreScope,
}

impl VariableSlot {
    pub fn local(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            scope: StoreScope::Local,
        }
    }

    pub fn global(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            scope: StoreScope::Global,
        }
    }

    /// Copies the referenced variable out of its store, if it resolves.
    pub fn resolve(&self, ctx: &FlowContext) -> Option<Variable> {
        match self.scope {
            StoreScope::Local => self.lookup(&ctx.locals()),
            StoreScope::Global => ctx.globals().and_then(|g| self.lookup(&g.read())),
        }
    }

    /// Writes `value` into the referenced variable, replacing tag and
    /// payload together. Returns `false` when the slot does not resolve.
    pub fn assign(&self, ctx: &FlowContext, value: Variant) -> bool {
        match self.scope {
            StoreScope::Local => {
                let mut store = ctx.locals_mut();
                match store.position(self.index, &self.name) {
                    Some(pos) => store.set(pos, value),
                    None => false,
                }
            }
            StoreScope::Global => match ctx.globals() {
                Some(globals) => {
                    let mut store = globals.write();
                    match store.position(self.index, &self.name) {
                        Some(pos) => store.set(pos, value),
                        None => false,
                    }
                }
                None => false,
            },
        }
    }

    fn lookup(&self, store: &VariableStore) -> Option<Variable> {
        store
            .position(self.index, &self.name)
            .and_then(|pos| store.get(pos))
            .cloned()
    }

    fn scope_prefix(&self) -> &'static str {
        match self.scope {
            StoreScope::Local => "L",
            StoreScope::Global => "G",
        }
    }
}

/// Conversion out of a [`Variant`] into a concrete binding type.
///
/// The table is total: a tag with no sensible conversion yields the target
/// type's zero value rather than an error.
pub trait FromVariant: Sized {
    fn from_variant(value: &Variant) -> Self;
}

impl FromVariant for i64 {
    fn from_variant(value: &Variant) -> Self {
        match value {
            Variant::Integer(v) => *v,
            Variant::Float(v) => *v as i64,
            Variant::Boolean(v) => *v as i64,
            _ => 0,
        }
    }
}

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> Self {
        match value {
            Variant::Float(v) => *v,
            Variant::Integer(v) => *v as f64,
            Variant::Boolean(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

impl FromVariant for bool {
    fn from_variant(value: &Variant) -> Self {
        match value {
            Variant::Boolean(v) => *v,
            Variant::Integer(v) => *v != 0,
            Variant::Float(v) => *v != 0.0,
            _ => false,
        }
    }
}

impl FromVariant for String {
    fn from_variant(value: &Variant) -> Self {
        match value {
            Variant::String(v) => v.clone(),
            Variant::None => String::new(),
            other => other.to_string(),
        }
    }
}

/// A per-field indirection: either a literal value or a reference into a
/// variable store, chosen per binding.
///
/// Reading never fails. In literal mode the literal is authoritative; in
/// variable mode the slot is re-resolved on every read and every failure
/// path (absent global store, unresolved slot) yields `T::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding<T> {
    Variable(VariableSlot),
    Literal(T),
}

impl<T: Default> Default for Binding<T> {
    fn default() -> Self {
        Binding::Literal(T::default())
    }
}

impl<T> Binding<T>
where
    T: FromVariant + Default + Clone + std::fmt::Display,
{
    pub fn literal(value: T) -> Self {
        Binding::Literal(value)
    }

    pub fn variable(slot: VariableSlot) -> Self {
        Binding::Variable(slot)
    }

    pub fn get(&self, ctx: &FlowContext) -> T {
        match self {
            Binding::Literal(value) => value.clone(),
            Binding::Variable(slot) => slot
                .resolve(ctx)
                .map(|var| T::from_variant(&var.value))
                .unwrap_or_default(),
        }
    }

    /// Authoring-facing label: the literal itself, or `G[2 : name]` style
    /// for variable references.
    pub fn display_name(&self) -> String {
        match self {
            Binding::Literal(value) => value.to_string(),
            Binding::Variable(slot) => {
                format!("{}[{} : {}]", slot.scope_prefix(), slot.index, slot.name)
            }
        }
    }
}

/// Binding for engine-object handles (game objects, components).
///
/// The resolved value is a key into the object registry; `resolve` chases
/// it to the registered target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandleBinding {
    Variable(VariableSlot),
    Literal(HandleKey),
}

impl HandleBinding {
    pub fn key(&self, ctx: &FlowContext) -> Option<HandleKey> {
        match self {
            HandleBinding::Literal(key) => Some(key.clone()),
            HandleBinding::Variable(slot) => slot
                .resolve(ctx)
                .and_then(|var| var.value.as_handle().cloned()),
        }
    }

    pub fn resolve(&self, ctx: &FlowContext) -> Option<Arc<dyn Any + Send + Sync>> {
        let key = self.key(ctx)?;
        ctx.registry().resolve(&key)
    }

    pub fn resolve_as<T: Any + Send + Sync>(&self, ctx: &FlowContext) -> Option<Arc<T>> {
        let key = self.key(ctx)?;
        ctx.registry().resolve_as::<T>(&key)
    }
}
