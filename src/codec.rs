//! Encoding and validation pipeline.
//!
//! Turns an assembled [`Swagger`] document into serialized bytes, running the
//! configured validators on the way out. Validators never see (or mutate) the
//! caller's document; each one gets its own deep copy of the JSON tree.

use crate::error::{Error, Result};
use crate::openapi::Swagger;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

/// Trimmed Swagger 2.0 meta-schema (JSON Schema draft 4), embedded at
/// compile time.
pub const SWAGGER_META_SCHEMA: &str = include_str!("../schemas/swagger-2.0.json");

/// Output formats supported by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Yaml => "application/yaml",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validators that can run against the document before it is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecValidator {
    /// Hand-rolled structural checks the meta-schema cannot express
    Structure,
    /// The embedded Swagger 2.0 meta-schema, evaluated as JSON Schema draft 4
    MetaSchema,
}

impl SpecValidator {
    fn name(&self) -> &'static str {
        match self {
            SpecValidator::Structure => "structure",
            SpecValidator::MetaSchema => "meta-schema",
        }
    }
}

/// Everything the encode call needs beyond the document itself. Passed
/// explicitly so two callers with different security setups never observe
/// each other's configuration.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Injected into the document's `securityDefinitions` before validation
    pub security_definitions: Option<IndexMap<String, Value>>,
    /// Validators to run, in order; empty means no validation
    pub validators: Vec<SpecValidator>,
}

/// Serialize the document in the requested format, after injecting security
/// definitions and running every configured validator.
///
/// The input document is not modified; repeated calls with equal inputs
/// produce byte-identical output.
pub fn encode(swagger: &Swagger, format: Format, config: &EncoderConfig) -> Result<Vec<u8>> {
    let mut document = swagger.clone();
    if let Some(definitions) = &config.security_definitions {
        document.security_definitions = Some(definitions.clone());
    }

    let value = serde_json::to_value(&document)?;
    for validator in &config.validators {
        debug!("running {} validator", validator.name());
        validate(*validator, &value)?;
    }

    dump(&value, format)
}

fn dump(value: &Value, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Json => Ok(serde_json::to_vec(value)?),
        // serde_yaml emits plain block style and never generates
        // anchors or aliases
        Format::Yaml => {
            let text = serde_yaml::to_string(value)?;
            Ok(indent_block_sequences(&text).into_bytes())
        }
    }
}

/// Re-indent block-sequence items two spaces under their parent key.
///
/// serde_yaml emits sequence items flush with the parent mapping key;
/// emitted documents nest them under the key instead, the way most Swagger
/// tooling prints YAML. The pass is purely textual and deterministic: each
/// line is shifted by two spaces per enclosing sequence, and block-scalar
/// content keeps its relative indentation.
fn indent_block_sequences(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    // original indent columns of the block sequences currently open
    let mut open_seqs: Vec<usize> = Vec::new();
    // (original indent of the key introducing the scalar, shift applied there)
    let mut block_scalar: Option<(usize, usize)> = None;

    for line in text.lines() {
        let indent = line.len() - line.trim_start().len();
        let content = &line[indent..];

        if let Some((scalar_indent, shift)) = block_scalar {
            if content.is_empty() || indent > scalar_indent {
                for _ in 0..shift {
                    out.push(' ');
                }
                out.push_str(line);
                out.push('\n');
                continue;
            }
            block_scalar = None;
        }

        if content.is_empty() {
            out.push('\n');
            continue;
        }

        while let Some(&top) = open_seqs.last() {
            if indent < top || (indent == top && !is_sequence_item(content)) {
                open_seqs.pop();
            } else {
                break;
            }
        }
        if is_sequence_item(content) && open_seqs.last() != Some(&indent) {
            open_seqs.push(indent);
        }

        let shift = 2 * open_seqs.len();
        for _ in 0..shift {
            out.push(' ');
        }
        out.push_str(line);
        out.push('\n');

        if starts_block_scalar(content) {
            block_scalar = Some((indent, shift));
        }
    }
    out
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

fn starts_block_scalar(content: &str) -> bool {
    let trimmed = content.trim_end();
    [": |", ": |-", ": |+", ": >", ": >-", ": >+"]
        .iter()
        .any(|suffix| trimmed.ends_with(suffix))
}

/// Serialize an error payload (`{"errors": [...]}`) in the given format.
pub fn encode_error(messages: &[String], format: Format) -> Result<Vec<u8>> {
    let payload = serde_json::json!({ "errors": messages });
    dump(&payload, format)
}

/// Run one validator against a document. The validator works on its own deep
/// copy, so a buggy validator can never corrupt the document being encoded.
pub fn validate(validator: SpecValidator, spec: &Value) -> Result<()> {
    let copy = spec.clone();
    let result = match validator {
        SpecValidator::Structure => check_structure(&copy),
        SpecValidator::MetaSchema => check_meta_schema(&copy),
    };
    result.map_err(|message| Error::Validation {
        validator: validator.name(),
        message,
        spec: copy,
    })
}

fn check_meta_schema(spec: &Value) -> std::result::Result<(), String> {
    let schema: Value = serde_json::from_str(SWAGGER_META_SCHEMA)
        .map_err(|e| format!("embedded meta-schema is not valid JSON: {}", e))?;
    jsonschema::draft4::validate(&schema, spec).map_err(|error| error.to_string())
}

const METHOD_KEYS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// Structural checks that a JSON-Schema validation cannot express.
fn check_structure(spec: &Value) -> std::result::Result<(), String> {
    let definitions = spec.get("definitions").and_then(Value::as_object);

    if let Some(paths) = spec.get("paths").and_then(Value::as_object) {
        for (path, path_item) in paths {
            for method in METHOD_KEYS {
                if let Some(operation) = path_item.get(method) {
                    check_operation(path, method, operation)?;
                }
            }
        }
    }

    check_refs(spec, definitions)
}

fn check_operation(
    path: &str,
    method: &str,
    operation: &Value,
) -> std::result::Result<(), String> {
    if let Some(parameters) = operation.get("parameters").and_then(Value::as_array) {
        let mut seen: Vec<(&str, &str)> = Vec::new();
        let mut body_count = 0;
        let mut has_form = false;
        for parameter in parameters {
            let name = parameter.get("name").and_then(Value::as_str).unwrap_or("");
            let location = parameter.get("in").and_then(Value::as_str).unwrap_or("");
            if seen.contains(&(name, location)) {
                return Err(format!(
                    "duplicate parameter ('{}', {}) in {} {}",
                    name, location, method, path
                ));
            }
            seen.push((name, location));
            match location {
                "body" => body_count += 1,
                "formData" => has_form = true,
                _ => {}
            }
        }
        if body_count > 1 {
            return Err(format!("multiple body parameters in {} {}", method, path));
        }
        if body_count > 0 && has_form {
            return Err(format!(
                "form and body parameters are mutually exclusive in {} {}",
                method, path
            ));
        }
    }

    if let Some(responses) = operation.get("responses").and_then(Value::as_object) {
        for status in responses.keys() {
            let is_status_code = status.len() == 3 && status.bytes().all(|b| b.is_ascii_digit());
            if !is_status_code && status != "default" {
                return Err(format!(
                    "response key '{}' in {} {} is neither a status code nor 'default'",
                    status, method, path
                ));
            }
        }
    }

    Ok(())
}

/// Every `$ref` in the tree must point at an existing entry in
/// `#/definitions/`.
fn check_refs(
    value: &Value,
    definitions: Option<&serde_json::Map<String, Value>>,
) -> std::result::Result<(), String> {
    match value {
        Value::Object(map) => {
            if let Some(target) = map.get("$ref").and_then(Value::as_str) {
                match target.strip_prefix("#/definitions/") {
                    Some(name) => {
                        let exists = definitions.map(|d| d.contains_key(name)).unwrap_or(false);
                        if !exists {
                            return Err(format!("$ref target '{}' does not exist", target));
                        }
                    }
                    None => {
                        return Err(format!(
                            "$ref '{}' does not point into #/definitions/",
                            target
                        ));
                    }
                }
            }
            for child in map.values() {
                check_refs(child, definitions)?;
            }
        }
        Value::Array(items) => {
            for child in items {
                check_refs(child, definitions)?;
            }
        }
        _ => {}
    }
    Ok(())
}
