use super::value::{Variant, VariantType};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, typed slot in a variable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: Variant,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: Variant) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn tag(&self) -> VariantType {
        self.value.tag()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({}) = {}", self.name, self.value.tag(), self.value)
    }
}

/// An ordered collection of variables.
///
/// The position is the primary key; names are not required to be unique and
/// name lookup returns the first match. A local store is owned exclusively
/// by one flow; the shared container is [`GlobalVariables`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStore {
    variables: Vec<Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    /// First variable with the given name, O(n).
    pub fn get_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.variables.get_mut(index)
    }

    /// Resolves a recorded `(index, name)` pair to a position.
    ///
    /// The index wins when the variable there still carries the recorded
    /// name; otherwise resolution falls back to a first-match name lookup,
    /// which recovers references across store reorders.
    pub fn position(&self, index: usize, name: &str) -> Option<usize> {
        match self.variables.get(index) {
            Some(v) if v.name == name => Some(index),
            _ => self.variables.iter().position(|v| v.name == name),
        }
    }

    /// Replaces the variant at `index` wholesale (tag and payload together).
    pub fn set(&mut self, index: usize, value: Variant) -> bool {
        match self.variables.get_mut(index) {
            Some(v) => {
                v.value = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }
}

impl FromIterator<Variable> for VariableStore {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().collect(),
        }
    }
}

/// The shared, long-lived variable container.
///
/// Many flows reference one `GlobalVariables` by `Arc`; it is never copied.
/// Locking is per-call, so a read-modify-write spanning two calls can race
/// with another writer; concurrent writers on the same index are
/// last-write-wins. Single-writer usage is the supported contract.
#[derive(Debug, Default)]
pub struct GlobalVariables {
    store: RwLock<VariableStore>,
    start_values: Vec<Variable>,
}

impl GlobalVariables {
    /// Creates the container, remembering the authored values so they can
    /// be restored with [`reset`](Self::reset).
    pub fn new(store: VariableStore) -> Self {
        let start_values = store.variables.clone();
        Self {
            store: RwLock::new(store),
            start_values,
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, VariableStore> {
        self.store.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, VariableStore> {
        self.store.write()
    }

    pub fn get(&self, index: usize) -> Option<Variable> {
        self.store.read().get(index).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Variable> {
        self.store.read().get_by_name(name).cloned()
    }

    pub fn set(&self, index: usize, value: Variant) -> bool {
        self.store.write().set(index, value)
    }

    /// Restores every variable to its authored start value.
    pub fn reset(&self) {
        let mut store = self.store.write();
        store.variables = self.start_values.clone();
    }

    /// Resolves a `"[Var:3]"` or `"[3]"` marker embedded in `text` to the
    /// variant stored at that index.
    pub fn variant_from_marker(&self, text: &str) -> Option<Variant> {
        let inner = text.split_once('[')?.1.split_once(']')?.0;
        let inner = inner.strip_prefix("Var:").unwrap_or(inner);
        let index: usize = inner.trim().parse().ok()?;
        self.get(index).map(|v| v.value)
    }

    pub fn float_from_marker(&self, text: &str) -> Option<f64> {
        match self.variant_from_marker(text)? {
            Variant::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn int_from_marker(&self, text: &str) -> Option<i64> {
        match self.variant_from_marker(text)? {
            Variant::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn string_from_marker(&self, text: &str) -> Option<String> {
        match self.variant_from_marker(text)? {
            Variant::String(v) => Some(v),
            _ => None,
        }
    }
}
