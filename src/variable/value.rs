use crate::registry::HandleKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The tag half of a [`Variant`], usable on its own wherever only the
/// type of a value matters (authoring metadata, error messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    #[default]
    None,
    Integer,
    Float,
    Boolean,
    String,
    GameObject,
    Component,
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantType::None => "None",
            VariantType::Integer => "Integer",
            VariantType::Float => "Float",
            VariantType::Boolean => "Boolean",
            VariantType::String => "String",
            VariantType::GameObject => "GameObject",
            VariantType::Component => "Component",
        };
        write!(f, "{}", name)
    }
}

/// Runtime value carried by a variable: one active tag, one payload.
///
/// Replacing a `Variant` rewrites tag and payload together, so a reader can
/// never observe a stale tag/payload combination. The engine-object tags
/// (`GameObject`, `Component`) do not hold the object itself; they hold a
/// [`HandleKey`] resolved through the object registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Variant {
    #[default]
    None,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    GameObject(HandleKey),
    Component(HandleKey),
}

impl Variant {
    pub fn tag(&self) -> VariantType {
        match self {
            Variant::None => VariantType::None,
            Variant::Integer(_) => VariantType::Integer,
            Variant::Float(_) => VariantType::Float,
            Variant::Boolean(_) => VariantType::Boolean,
            Variant::String(_) => VariantType::String,
            Variant::GameObject(_) => VariantType::GameObject,
            Variant::Component(_) => VariantType::Component,
        }
    }

    /// The payload if the tag is `Integer`, otherwise `0`.
    pub fn as_int(&self) -> i64 {
        match self {
            Variant::Integer(v) => *v,
            _ => 0,
        }
    }

    /// The payload if the tag is `Float`, otherwise `0.0`.
    pub fn as_float(&self) -> f64 {
        match self {
            Variant::Float(v) => *v,
            _ => 0.0,
        }
    }

    /// The payload if the tag is `Boolean`, otherwise `false`.
    pub fn as_bool(&self) -> bool {
        match self {
            Variant::Boolean(v) => *v,
            _ => false,
        }
    }

    /// The payload if the tag is `String`, otherwise `""`.
    pub fn as_str(&self) -> &str {
        match self {
            Variant::String(v) => v.as_str(),
            _ => "",
        }
    }

    /// The handle key for either engine-object tag.
    pub fn as_handle(&self) -> Option<&HandleKey> {
        match self {
            Variant::GameObject(key) | Variant::Component(key) => Some(key),
            _ => None,
        }
    }

    /// Numeric view used by comparisons: integers and floats compare by
    /// value, booleans as 0/1, strings by their length. Everything else is 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Variant::Integer(v) => *v as f64,
            Variant::Float(v) => *v,
            Variant::Boolean(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            Variant::String(v) => v.chars().count() as f64,
            _ => 0.0,
        }
    }

    /// Parses `text` into a variant of the requested tag. A text that does
    /// not parse yields the tag's zero value instead of an error.
    pub fn parse(text: &str, tag: VariantType) -> Variant {
        match tag {
            VariantType::Integer => Variant::Integer(text.trim().parse().unwrap_or(0)),
            VariantType::Float => Variant::Float(text.trim().parse().unwrap_or(0.0)),
            VariantType::Boolean => Variant::Boolean(text.trim().parse().unwrap_or(false)),
            VariantType::String => Variant::String(text.to_string()),
            VariantType::GameObject => Variant::GameObject(HandleKey::new(text)),
            VariantType::Component => Variant::Component(HandleKey::new(text)),
            VariantType::None => Variant::None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::None => write!(f, "none"),
            Variant::Integer(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{:.2}", v),
            Variant::Boolean(v) => write!(f, "{}", v),
            Variant::String(v) => write!(f, "{}", v),
            Variant::GameObject(key) | Variant::Component(key) => write!(f, "{}", key),
        }
    }
}
