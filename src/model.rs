use anyhow::{Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ────────────────────────────────────────────────────────────────────────────
// ParamKind
// ────────────────────────────────────────────────────────────────────────────

/// The `type` tag of a typed value leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Boolean,
    Enumeration,
    Integer,
    Reference,
}

impl ParamKind {
    /// Parse the tag exactly as written in the input (`BOOLEAN`, `ENUMERATION`,
    /// `INTEGER`, `ref`). Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BOOLEAN" => Some(Self::Boolean),
            "ENUMERATION" => Some(Self::Enumeration),
            "INTEGER" => Some(Self::Integer),
            "ref" => Some(Self::Reference),
            _ => None,
        }
    }

    /// Grouping element the value element is placed in.
    pub fn group(self) -> GroupKind {
        match self {
            Self::Reference => GroupKind::ReferenceValues,
            _ => GroupKind::ParameterValues,
        }
    }

    /// Element emitted for one leaf of this kind.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Boolean | Self::Integer => "ECUC-NUMERICAL-PARAM-VALUE",
            Self::Enumeration => "ECUC-TEXTUAL-PARAM-VALUE",
            Self::Reference => "ECUC-REFERENCE-VALUE",
        }
    }

    /// `DEST` attribute of the leaf's `DEFINITION-REF`.
    pub fn definition_dest(self) -> &'static str {
        match self {
            Self::Boolean => "ECUC-BOOLEAN-PARAM-DEF",
            Self::Enumeration => "ECUC-ENUMERATION-PARAM-DEF",
            Self::Integer => "ECUC-INTEGER-PARAM-DEF",
            Self::Reference => "ECUC-REFERENCE-DEF",
        }
    }
}

/// Grouping elements created lazily, at most once per parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    ParameterValues,
    ReferenceValues,
    SubContainers,
}

impl GroupKind {
    pub fn element_name(self) -> &'static str {
        match self {
            Self::ParameterValues => "PARAMETER-VALUES",
            Self::ReferenceValues => "REFERENCE-VALUES",
            Self::SubContainers => "SUB-CONTAINERS",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Input tree
// ────────────────────────────────────────────────────────────────────────────

/// A `{ "type": …, "value": … }` leaf with a supported tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub kind: ParamKind,
    pub value: String,
}

/// Why an input entry is left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The `type` tag is not one of the supported kinds.
    UnsupportedType { tag: String },
    /// The `value` of a typed leaf is an array, object or null.
    InvalidValue { value: String },
    /// The entry is a scalar or array where an object was expected.
    NotAnObject { value: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedType { tag } => write!(f, "unsupported type {tag}"),
            SkipReason::InvalidValue { value } => write!(f, "invalid value {value}"),
            SkipReason::NotAnObject { value } => write!(f, "not an object: {value}"),
        }
    }
}

/// One node of the input configuration tree.
///
/// Classification happens once, when the JSON is loaded. Entries that cannot
/// be converted are kept as [`InputNode::Malformed`] so the converter can
/// report them together with their position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputNode {
    Container(IndexMap<String, InputNode>),
    Value(TypedValue),
    Malformed(SkipReason),
}

impl InputNode {
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return InputNode::Malformed(SkipReason::NotAnObject {
                value: value.to_string(),
            });
        };
        match (map.get("type"), map.get("value")) {
            (Some(tag), Some(raw)) => classify_leaf(tag, raw),
            _ => InputNode::Container(
                map.iter()
                    .map(|(k, v)| (k.clone(), InputNode::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn classify_leaf(tag: &Value, raw: &Value) -> InputNode {
    let Some(kind) = tag.as_str().and_then(ParamKind::from_tag) else {
        let tag = match tag {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return InputNode::Malformed(SkipReason::UnsupportedType { tag });
    };
    let value = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return InputNode::Malformed(SkipReason::InvalidValue {
                value: other.to_string(),
            });
        }
    };
    InputNode::Value(TypedValue { kind, value })
}

/// The parsed top-level object of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputDocument {
    pub entries: IndexMap<String, InputNode>,
}

impl InputDocument {
    /// Classify a parsed JSON value. Fails if the top level is not an object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            bail!(
                "Top-level JSON value must be an object, found {}",
                json_kind(value)
            );
        };
        let entries = map
            .iter()
            .map(|(k, v)| (k.clone(), InputNode::from_json(v)))
            .collect();
        Ok(Self { entries })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ────────────────────────────────────────────────────────────────────────────

/// A skipped input entry. `path` is the slash-joined position of the parent
/// container (empty for the top level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: String,
    pub key: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}/{}: {}", self.path, self.key, self.reason)
    }
}
