//! Swagger 2.0 document model.
//!
//! Every object is a plain struct whose serde field order matches the key
//! order mandated for the emitted document, so serializing the same document
//! twice always produces byte-identical output. Optional keys are skipped
//! when unset, and `x-` vendor extensions are carried in an insertion-ordered
//! map flattened into the parent object.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TYPE_OBJECT: &str = "object";
pub const TYPE_STRING: &str = "string";
pub const TYPE_NUMBER: &str = "number";
pub const TYPE_INTEGER: &str = "integer";
pub const TYPE_BOOLEAN: &str = "boolean";
pub const TYPE_ARRAY: &str = "array";
pub const TYPE_FILE: &str = "file";

pub const FORMAT_DATE: &str = "date";
pub const FORMAT_DATETIME: &str = "date-time";
pub const FORMAT_EMAIL: &str = "email";
pub const FORMAT_IPV4: &str = "ipv4";
pub const FORMAT_IPV6: &str = "ipv6";
pub const FORMAT_SLUG: &str = "slug";
pub const FORMAT_URI: &str = "uri";
pub const FORMAT_UUID: &str = "uuid";

/// Parameter locations recognized by Swagger 2.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum In {
    Query,
    Path,
    Header,
    FormData,
    Body,
}

impl std::fmt::Display for In {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            In::Query => "query",
            In::Path => "path",
            In::Header => "header",
            In::FormData => "formData",
            In::Body => "body",
        };
        f.write_str(s)
    }
}

/// A forward reference into the document's `definitions` table.
///
/// Never owns the schema it points to; the [`ReferenceResolver`] does.
///
/// [`ReferenceResolver`]: crate::resolver::ReferenceResolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub ref_uri: String,
}

impl SchemaRef {
    /// Build a reference to the named definition.
    pub fn new(ref_name: &str) -> Self {
        SchemaRef {
            ref_uri: format!("#/definitions/{}", ref_name),
        }
    }

    /// The symbolic name this reference points at.
    pub fn ref_name(&self) -> &str {
        self.ref_uri
            .rsplit('/')
            .next()
            .unwrap_or(self.ref_uri.as_str())
    }
}

/// Either an inline [`Schema`] or a [`SchemaRef`] pointing into `definitions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref(SchemaRef),
    Schema(Box<Schema>),
}

impl From<Schema> for SchemaOrRef {
    fn from(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }
}

impl From<SchemaRef> for SchemaOrRef {
    fn from(r: SchemaRef) -> Self {
        SchemaOrRef::Ref(r)
    }
}

/// Swagger Schema object describing a data shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Deliberately never populated from field labels; kept for manual
    /// overrides only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaOrRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<SchemaOrRef>>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty", default)]
    pub extensions: IndexMap<String, Value>,
}

impl Schema {
    /// Create a schema with only `type` set.
    pub fn of_type(schema_type: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Schema::default()
        }
    }

    /// Attach an `x-` vendor extension.
    pub fn add_extension(&mut self, key: &str, value: Value) -> Result<()> {
        insert_extension(&mut self.extensions, key, value)
    }
}

/// Swagger Items object - the element type of an array-typed Parameter or
/// Items. Unlike Schema it carries no `title`, `description` or `default`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Items {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Items>>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

impl Items {
    pub fn of_type(item_type: &str) -> Self {
        Items {
            item_type: Some(item_type.to_string()),
            ..Items::default()
        }
    }
}

/// Swagger Parameter object describing one request input.
///
/// A parameter's identity is its `(name, in)` pair; two parameters sharing
/// that pair in one operation are invalid. `body` parameters describe their
/// payload through `schema`, all other locations through the inline
/// `type`/`format`/`items` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: In,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Items>>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Default for Parameter {
    fn default() -> Self {
        Parameter {
            name: String::new(),
            location: In::Query,
            description: None,
            required: None,
            schema: None,
            param_type: None,
            format: None,
            enum_values: None,
            pattern: None,
            items: None,
            unique_items: None,
            default: None,
        }
    }
}

impl Parameter {
    pub fn new(name: &str, location: In) -> Self {
        Parameter {
            name: name.to_string(),
            location,
            ..Parameter::default()
        }
    }

    /// The `(name, in)` pair identifying this parameter within an operation.
    pub fn key(&self) -> (String, In) {
        (self.name.clone(), self.location)
    }
}

/// Swagger Response object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

impl Response {
    pub fn with_description(description: &str) -> Self {
        Response {
            description: description.to_string(),
            schema: None,
        }
    }

    pub fn with_schema(description: &str, schema: SchemaOrRef) -> Self {
        Response {
            description: description.to_string(),
            schema: Some(schema),
        }
    }
}

/// Swagger Operation object - one HTTP-method handler on one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty", default)]
    pub extensions: IndexMap<String, Value>,
}

impl Operation {
    pub fn add_extension(&mut self, key: &str, value: Value) -> Result<()> {
        insert_extension(&mut self.extensions, key, value)
    }
}

/// All operations registered under a single path, one optional slot per
/// HTTP method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

/// Swagger Info object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl Default for Info {
    fn default() -> Self {
        Info {
            title: "API".to_string(),
            description: None,
            version: "".to_string(),
            contact: None,
            license: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The root Swagger document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swagger {
    pub swagger: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<IndexMap<String, Schema>>,
    #[serde(
        rename = "securityDefinitions",
        skip_serializing_if = "Option::is_none"
    )]
    pub security_definitions: Option<IndexMap<String, Value>>,
    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty", default)]
    pub extensions: IndexMap<String, Value>,
}

impl Default for Swagger {
    fn default() -> Self {
        Swagger {
            swagger: "2.0".to_string(),
            info: Info::default(),
            host: None,
            base_path: None,
            schemes: None,
            consumes: None,
            produces: None,
            paths: IndexMap::new(),
            definitions: None,
            security_definitions: None,
            extensions: IndexMap::new(),
        }
    }
}

impl Swagger {
    pub fn add_extension(&mut self, key: &str, value: Value) -> Result<()> {
        insert_extension(&mut self.extensions, key, value)
    }
}

fn insert_extension(
    extensions: &mut IndexMap<String, Value>,
    key: &str,
    value: Value,
) -> Result<()> {
    if !key.starts_with("x-") {
        return Err(Error::generation(format!(
            "vendor extension keys must start with 'x-', got '{}'",
            key
        )));
    }
    extensions.insert(key.to_string(), value);
    Ok(())
}
