//! Serializer-field descriptor types - the input side of schema inference.
//!
//! These mirror what a serializer framework exposes about its fields: a kind
//! tag, required/read-only flags, defaults, help text and attached
//! validators. Descriptors are plain data and deserialize directly from the
//! manifest format.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// One field in a serializer tree.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescriptor {
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub help_text: Option<String>,
    /// Carried for completeness; inference deliberately never turns labels
    /// into schema titles.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    /// Name of a default bound to per-request context (e.g. the current
    /// user). Such defaults are stringified into the document, never invoked.
    #[serde(default)]
    pub context_default: Option<String>,
    #[serde(default)]
    pub validators: Vec<FieldValidator>,
}

/// Field kinds, most specific listed first within each family. The inference
/// engine dispatches on these in a fixed priority order because several kinds
/// specialize others.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Homogeneous list of a child field.
    List { child: Box<FieldDescriptor> },
    /// Nested object with named child fields. `name` is the serializer type
    /// name the reference name is derived from; `ref_name` overrides it, and
    /// an empty override forces an inline, unnamed schema.
    Nested {
        name: String,
        #[serde(default)]
        ref_name: Option<String>,
        fields: IndexMap<String, FieldDescriptor>,
    },
    /// To-many relation; elements are the related field's type.
    ManyRelated { child: Box<FieldDescriptor> },
    /// To-one relation; represented as an opaque identifier.
    Related,
    MultipleChoice { choices: Vec<Value> },
    Choice { choices: Vec<Value> },
    Boolean,
    Decimal,
    Float,
    Integer,
    Email,
    Regex,
    Slug,
    Url,
    IpAddress {
        #[serde(default)]
        protocol: IpProtocol,
    },
    Char,
    Uuid,
    Date,
    DateTime,
    File {
        /// True when uploads are represented as URLs in responses.
        #[serde(default = "default_true")]
        use_url: bool,
    },
    /// Key-value mapping with a uniform value field.
    Dict { child: Box<FieldDescriptor> },
}

/// Declared protocol of an IP address field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    #[default]
    Both,
    Ipv4,
    Ipv6,
}

/// A validator attached to a field. Only the regex pattern is of interest to
/// schema inference; other validator kinds deserialize with `regex: None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldValidator {
    #[serde(default)]
    pub regex: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind) -> Self {
        FieldDescriptor {
            kind,
            required: false,
            read_only: false,
            help_text: None,
            label: None,
            default: None,
            context_default: None,
            validators: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn help_text(mut self, text: &str) -> Self {
        self.help_text = Some(text.to_string());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn context_default(mut self, name: &str) -> Self {
        self.context_default = Some(name.to_string());
        self
    }

    pub fn regex_validator(mut self, pattern: &str) -> Self {
        self.validators.push(FieldValidator {
            regex: Some(pattern.to_string()),
        });
        self
    }
}

/// Extract the pattern of the field's regex validator.
///
/// If more than one regex validator is attached there is no obvious way to
/// choose between them, so extraction is abandoned and the pattern omitted.
pub fn find_regex(field: &FieldDescriptor) -> Option<String> {
    let mut found = None;
    for validator in &field.validators {
        if let Some(pattern) = &validator.regex {
            if found.is_some() {
                return None;
            }
            found = Some(pattern.clone());
        }
    }
    found
}
