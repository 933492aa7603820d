//! Field-to-schema inference engine.
//!
//! Converts a [`FieldDescriptor`] tree into a Swagger `Schema`, `Parameter`
//! or `Items`, recursing into children and routing named nested objects
//! through the [`ReferenceResolver`]. The tagged [`FieldKind`] enum keeps the
//! kinds disjoint; each entry point handles composite kinds first, then falls
//! through to the shared scalar table.

use crate::error::{Error, Result};
use crate::fields::{find_regex, FieldDescriptor, FieldKind, IpProtocol};
use crate::openapi::{
    In, Items, Parameter, Schema, SchemaOrRef, SchemaRef, FORMAT_DATE, FORMAT_DATETIME,
    FORMAT_EMAIL, FORMAT_IPV4, FORMAT_IPV6, FORMAT_SLUG, FORMAT_URI, FORMAT_UUID, TYPE_ARRAY,
    TYPE_BOOLEAN, TYPE_FILE, TYPE_INTEGER, TYPE_NUMBER, TYPE_OBJECT, TYPE_STRING,
};
use crate::resolver::ReferenceResolver;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

/// Scalar type information shared by every target shape.
struct BasicTypeInfo {
    swagger_type: &'static str,
    format: Option<String>,
    pattern: Option<String>,
    enum_values: Option<Vec<Value>>,
}

impl BasicTypeInfo {
    fn of(swagger_type: &'static str) -> Self {
        BasicTypeInfo {
            swagger_type,
            format: None,
            pattern: None,
            enum_values: None,
        }
    }

    fn with_format(swagger_type: &'static str, format: &str) -> Self {
        BasicTypeInfo {
            format: Some(format.to_string()),
            ..BasicTypeInfo::of(swagger_type)
        }
    }
}

/// Scalar kinds common to all three target shapes. Composite kinds (lists,
/// nested objects, files, mappings) return `None` and are handled per-target.
fn basic_type_info(field: &FieldDescriptor) -> Option<BasicTypeInfo> {
    let info = match &field.kind {
        FieldKind::Related => BasicTypeInfo::of(TYPE_STRING),
        FieldKind::Choice { choices } => BasicTypeInfo {
            enum_values: Some(choices.clone()),
            ..BasicTypeInfo::of(TYPE_STRING)
        },
        FieldKind::Boolean => BasicTypeInfo::of(TYPE_BOOLEAN),
        FieldKind::Decimal | FieldKind::Float => BasicTypeInfo::of(TYPE_NUMBER),
        FieldKind::Integer => BasicTypeInfo::of(TYPE_INTEGER),
        FieldKind::Email => BasicTypeInfo::with_format(TYPE_STRING, FORMAT_EMAIL),
        FieldKind::Regex => BasicTypeInfo {
            pattern: find_regex(field),
            ..BasicTypeInfo::of(TYPE_STRING)
        },
        FieldKind::Slug => BasicTypeInfo {
            pattern: find_regex(field),
            ..BasicTypeInfo::with_format(TYPE_STRING, FORMAT_SLUG)
        },
        FieldKind::Url => BasicTypeInfo::with_format(TYPE_STRING, FORMAT_URI),
        FieldKind::IpAddress { protocol } => {
            let format = match protocol {
                IpProtocol::Ipv4 => Some(FORMAT_IPV4.to_string()),
                IpProtocol::Ipv6 => Some(FORMAT_IPV6.to_string()),
                IpProtocol::Both => None,
            };
            BasicTypeInfo {
                format,
                ..BasicTypeInfo::of(TYPE_STRING)
            }
        }
        FieldKind::Char => BasicTypeInfo::of(TYPE_STRING),
        FieldKind::Uuid => BasicTypeInfo::with_format(TYPE_STRING, FORMAT_UUID),
        FieldKind::Date => BasicTypeInfo::with_format(TYPE_STRING, FORMAT_DATE),
        FieldKind::DateTime => BasicTypeInfo::with_format(TYPE_STRING, FORMAT_DATETIME),
        _ => return None,
    };
    Some(info)
}

/// The serialized default of a field, if any. Context-bound defaults are
/// stringified instead of being invoked.
fn field_default(field: &FieldDescriptor) -> Option<Value> {
    if let Some(context) = &field.context_default {
        return Some(Value::String(context.clone()));
    }
    field.default.clone()
}

/// Description, default and readOnly shared by every Schema produced from a
/// field. Titles are deliberately suppressed even when the field has a label.
fn apply_schema_attrs(field: &FieldDescriptor, schema: &mut Schema) {
    schema.description = field.help_text.clone();
    if schema.default.is_none() {
        schema.default = field_default(field);
    }
    if field.read_only {
        schema.read_only = Some(true);
    }
}

/// Derive the reference name for a nested object: the explicit override wins,
/// else the type name with a trailing `Serializer` stripped. An empty name
/// means the schema is inlined instead of registered.
fn nested_ref_name(name: &str, ref_name: &Option<String>) -> Option<String> {
    let resolved = match ref_name {
        Some(explicit) => explicit.clone(),
        None => name.strip_suffix("Serializer").unwrap_or(name).to_string(),
    };
    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}

fn build_nested_schema(
    field: &FieldDescriptor,
    fields: &IndexMap<String, FieldDescriptor>,
    resolver: &mut ReferenceResolver,
) -> Result<Schema> {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    for (child_name, child) in fields {
        properties.insert(child_name.clone(), field_to_schema(child, resolver)?);
        if child.required {
            required.push(child_name.clone());
        }
    }

    let mut schema = Schema::of_type(TYPE_OBJECT);
    schema.properties = Some(properties);
    if !required.is_empty() {
        schema.required = Some(required);
    }
    apply_schema_attrs(field, &mut schema);
    Ok(schema)
}

/// Convert a field descriptor into a response/definition `Schema`.
///
/// Named nested objects are registered with the resolver exactly once and
/// come back as a `$ref`; everything else is inlined.
pub fn field_to_schema(
    field: &FieldDescriptor,
    resolver: &mut ReferenceResolver,
) -> Result<SchemaOrRef> {
    match &field.kind {
        FieldKind::List { child } => {
            let child_schema = field_to_schema(child, resolver)?;
            let mut schema = Schema::of_type(TYPE_ARRAY);
            schema.items = Some(Box::new(child_schema));
            apply_schema_attrs(field, &mut schema);
            Ok(schema.into())
        }
        FieldKind::Nested {
            name,
            ref_name,
            fields,
        } => {
            match nested_ref_name(name, ref_name) {
                // anonymous serializer: inline, not memoized
                None => Ok(build_nested_schema(field, fields, resolver)?.into()),
                Some(resolved) => {
                    debug!("nested serializer '{}' -> definition '{}'", name, resolved);
                    let owned_field = field.clone();
                    let owned_fields = fields.clone();
                    resolver.setdefault(
                        &resolved,
                        Box::new(move |resolver| {
                            build_nested_schema(&owned_field, &owned_fields, resolver)
                        }),
                    );
                    Ok(SchemaRef::new(&resolved).into())
                }
            }
        }
        FieldKind::ManyRelated { child } => {
            let child_schema = field_to_schema(child, resolver)?;
            let mut schema = Schema::of_type(TYPE_ARRAY);
            schema.items = Some(Box::new(child_schema));
            schema.unique_items = Some(true);
            apply_schema_attrs(field, &mut schema);
            Ok(schema.into())
        }
        FieldKind::MultipleChoice { choices } => {
            let mut item = Schema::of_type(TYPE_STRING);
            item.enum_values = Some(choices.clone());
            let mut schema = Schema::of_type(TYPE_ARRAY);
            schema.items = Some(Box::new(item.into()));
            apply_schema_attrs(field, &mut schema);
            Ok(schema.into())
        }
        FieldKind::File { use_url } => {
            // Swagger 2.0 has no way to describe file payloads in a response
            // body; they surface as the URL or name of the stored file.
            let mut schema = Schema::of_type(TYPE_STRING);
            apply_schema_attrs(field, &mut schema);
            schema.read_only = Some(true);
            if *use_url {
                schema.format = Some(FORMAT_URI.to_string());
            }
            Ok(schema.into())
        }
        FieldKind::Dict { child } => {
            let child_schema = field_to_schema(child, resolver)?;
            let mut schema = Schema::of_type(TYPE_OBJECT);
            schema.additional_properties = Some(Box::new(child_schema));
            apply_schema_attrs(field, &mut schema);
            Ok(schema.into())
        }
        _ => match basic_type_info(field) {
            Some(info) => {
                let mut schema = Schema::of_type(info.swagger_type);
                schema.format = info.format;
                schema.pattern = info.pattern;
                schema.enum_values = info.enum_values;
                apply_schema_attrs(field, &mut schema);
                Ok(schema.into())
            }
            // covered above; kept so any future kind degrades to a bare
            // string instead of panicking
            None => {
                let mut schema = Schema::of_type(TYPE_STRING);
                apply_schema_attrs(field, &mut schema);
                Ok(schema.into())
            }
        },
    }
}

/// Convert a field descriptor into an `Items` object (the element type of an
/// array-typed Parameter or Items). Items carry no description or default.
pub fn field_to_items(field: &FieldDescriptor) -> Result<Items> {
    match &field.kind {
        FieldKind::List { child } => {
            let mut items = Items::of_type(TYPE_ARRAY);
            items.items = Some(Box::new(field_to_items(child)?));
            Ok(items)
        }
        FieldKind::Nested { .. } => Err(Error::generation(
            "cannot instantiate nested serializer as Items",
        )),
        FieldKind::ManyRelated { child } => {
            let mut items = Items::of_type(TYPE_ARRAY);
            items.items = Some(Box::new(field_to_items(child)?));
            items.unique_items = Some(true);
            Ok(items)
        }
        FieldKind::MultipleChoice { choices } => {
            let mut element = Items::of_type(TYPE_STRING);
            element.enum_values = Some(choices.clone());
            let mut items = Items::of_type(TYPE_ARRAY);
            items.items = Some(Box::new(element));
            Ok(items)
        }
        FieldKind::File { .. } => Err(Error::generation(
            "file fields are supported only in a formData Parameter or response Schema",
        )),
        FieldKind::Dict { .. } => Err(Error::generation(
            "cannot instantiate mapping field as Items",
        )),
        _ => match basic_type_info(field) {
            Some(info) => {
                let mut items = Items::of_type(info.swagger_type);
                items.format = info.format;
                items.pattern = info.pattern;
                items.enum_values = info.enum_values;
                Ok(items)
            }
            None => Ok(Items::of_type(TYPE_STRING)),
        },
    }
}

/// Convert a field descriptor into a request `Parameter` at the given
/// location. A resolver is required only for `body` parameters, whose payload
/// is described through a full `Schema`.
pub fn field_to_parameter(
    field: &FieldDescriptor,
    name: &str,
    location: In,
    resolver: Option<&mut ReferenceResolver>,
) -> Result<Parameter> {
    if location == In::Body {
        let resolver = resolver.ok_or_else(|| {
            Error::generation("a ReferenceResolver is required for body parameters")
        })?;
        let mut parameter = Parameter::new(name, location);
        parameter.description = field.help_text.clone();
        parameter.required = Some(field.required);
        parameter.schema = Some(field_to_schema(field, resolver)?);
        return Ok(parameter);
    }

    let mut parameter = Parameter::new(name, location);
    parameter.description = field.help_text.clone();
    parameter.required = Some(field.required);
    parameter.default = field_default(field);

    match &field.kind {
        FieldKind::List { child } => {
            parameter.param_type = Some(TYPE_ARRAY.to_string());
            parameter.items = Some(Box::new(field_to_items(child)?));
        }
        FieldKind::Nested { .. } => {
            return Err(Error::generation(
                "cannot instantiate nested serializer as Parameter",
            ))
        }
        FieldKind::ManyRelated { child } => {
            parameter.param_type = Some(TYPE_ARRAY.to_string());
            parameter.items = Some(Box::new(field_to_items(child)?));
            parameter.unique_items = Some(true);
        }
        FieldKind::MultipleChoice { choices } => {
            let mut element = Items::of_type(TYPE_STRING);
            element.enum_values = Some(choices.clone());
            parameter.param_type = Some(TYPE_ARRAY.to_string());
            parameter.items = Some(Box::new(element));
        }
        FieldKind::File { .. } => {
            if location != In::FormData {
                return Err(Error::generation(
                    "file fields are supported only in a formData Parameter or response Schema",
                ));
            }
            parameter.param_type = Some(TYPE_FILE.to_string());
            // a file upload can have no literal default
            parameter.default = None;
        }
        FieldKind::Dict { .. } => {
            return Err(Error::generation(
                "cannot instantiate mapping field as Parameter",
            ))
        }
        _ => match basic_type_info(field) {
            Some(info) => {
                parameter.param_type = Some(info.swagger_type.to_string());
                parameter.format = info.format;
                parameter.pattern = info.pattern;
                parameter.enum_values = info.enum_values;
            }
            None => {
                parameter.param_type = Some(TYPE_STRING.to_string());
            }
        },
    }
    Ok(parameter)
}

/// Expand a nested serializer's top-level fields into one parameter per
/// field, for `query` or `formData` parameter lists.
pub fn serializer_parameters(
    serializer: &FieldDescriptor,
    location: In,
) -> Result<Vec<Parameter>> {
    match &serializer.kind {
        FieldKind::Nested { fields, .. } => fields
            .iter()
            .map(|(name, child)| field_to_parameter(child, name, location, None))
            .collect(),
        _ => Err(Error::generation(
            "expected a nested serializer when expanding fields into parameters",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn nested(name: &str, fields: Vec<(&str, FieldDescriptor)>) -> FieldDescriptor {
        FieldDescriptor::new(FieldKind::Nested {
            name: name.to_string(),
            ref_name: None,
            fields: fields
                .into_iter()
                .map(|(n, f)| (n.to_string(), f))
                .collect(),
        })
    }

    fn unwrap_schema(result: SchemaOrRef) -> Schema {
        match result {
            SchemaOrRef::Schema(schema) => *schema,
            SchemaOrRef::Ref(r) => panic!("expected inline schema, got $ref {}", r.ref_uri),
        }
    }

    #[test]
    fn test_scalar_kinds() {
        let mut resolver = ReferenceResolver::new();
        let cases = vec![
            (FieldKind::Boolean, TYPE_BOOLEAN, None),
            (FieldKind::Decimal, TYPE_NUMBER, None),
            (FieldKind::Float, TYPE_NUMBER, None),
            (FieldKind::Integer, TYPE_INTEGER, None),
            (FieldKind::Email, TYPE_STRING, Some(FORMAT_EMAIL)),
            (FieldKind::Url, TYPE_STRING, Some(FORMAT_URI)),
            (FieldKind::Char, TYPE_STRING, None),
            (FieldKind::Uuid, TYPE_STRING, Some(FORMAT_UUID)),
            (FieldKind::Date, TYPE_STRING, Some(FORMAT_DATE)),
            (FieldKind::DateTime, TYPE_STRING, Some(FORMAT_DATETIME)),
            (FieldKind::Related, TYPE_STRING, None),
        ];
        for (kind, expected_type, expected_format) in cases {
            let schema =
                unwrap_schema(field_to_schema(&FieldDescriptor::new(kind), &mut resolver).unwrap());
            assert_eq!(schema.schema_type.as_deref(), Some(expected_type));
            assert_eq!(schema.format.as_deref(), expected_format);
        }
    }

    #[test]
    fn test_ip_address_formats() {
        let mut resolver = ReferenceResolver::new();
        for (protocol, expected) in [
            (IpProtocol::Ipv4, Some(FORMAT_IPV4)),
            (IpProtocol::Ipv6, Some(FORMAT_IPV6)),
            (IpProtocol::Both, None),
        ] {
            let field = FieldDescriptor::new(FieldKind::IpAddress { protocol });
            let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
            assert_eq!(schema.format.as_deref(), expected);
        }
    }

    #[test]
    fn test_slug_carries_format_and_pattern() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::Slug).regex_validator("^[a-z-]+$");
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.format.as_deref(), Some(FORMAT_SLUG));
        assert_eq!(schema.pattern.as_deref(), Some("^[a-z-]+$"));
    }

    #[test]
    fn test_ambiguous_regex_omits_pattern() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::Regex)
            .regex_validator("^a$")
            .regex_validator("^b$");
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_STRING));
        assert!(schema.pattern.is_none());
    }

    #[test]
    fn test_choice_preserves_order() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::Choice {
            choices: vec![json!("wide"), json!("tall"), json!("thumb")],
        });
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(
            schema.enum_values,
            Some(vec![json!("wide"), json!("tall"), json!("thumb")])
        );
    }

    #[test]
    fn test_multiple_choice_schema_shape() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::MultipleChoice {
            choices: vec![json!("a"), json!("b"), json!("c")],
        });
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_ARRAY));
        let items = unwrap_schema(*schema.items.unwrap());
        assert_eq!(items.schema_type.as_deref(), Some(TYPE_STRING));
        assert_eq!(
            items.enum_values,
            Some(vec![json!("a"), json!("b"), json!("c")])
        );
    }

    #[test]
    fn test_multiple_choice_parameter_shape() {
        let field = FieldDescriptor::new(FieldKind::MultipleChoice {
            choices: vec![json!("a"), json!("b"), json!("c")],
        });
        let parameter = field_to_parameter(&field, "styles", In::Query, None).unwrap();
        assert_eq!(parameter.param_type.as_deref(), Some(TYPE_ARRAY));
        let items = parameter.items.unwrap();
        assert_eq!(items.item_type.as_deref(), Some(TYPE_STRING));
        assert_eq!(
            items.enum_values,
            Some(vec![json!("a"), json!("b"), json!("c")])
        );
    }

    #[test]
    fn test_nested_schema_properties_and_required() {
        let mut resolver = ReferenceResolver::new();
        let field = nested(
            "UserSerializer",
            vec![
                ("email", FieldDescriptor::new(FieldKind::Email).required()),
                ("nickname", FieldDescriptor::new(FieldKind::Char)),
            ],
        );

        let result = field_to_schema(&field, &mut resolver).unwrap();
        match result {
            SchemaOrRef::Ref(r) => assert_eq!(r.ref_name(), "User"),
            other => panic!("expected $ref, got {:?}", other),
        }

        let schema = resolver.resolve("User").unwrap();
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_OBJECT));
        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(
            properties.keys().collect::<Vec<_>>(),
            vec!["email", "nickname"]
        );
        assert_eq!(schema.required, Some(vec!["email".to_string()]));
    }

    #[test]
    fn test_nested_ref_name_override() {
        let mut resolver = ReferenceResolver::new();
        let mut field = nested("ExampleProjectSerializer", vec![]);
        if let FieldKind::Nested { ref_name, .. } = &mut field.kind {
            *ref_name = Some("Project".to_string());
        }
        let result = field_to_schema(&field, &mut resolver).unwrap();
        match result {
            SchemaOrRef::Ref(r) => assert_eq!(r.ref_name(), "Project"),
            other => panic!("expected $ref, got {:?}", other),
        }
        assert!(resolver.contains("Project"));
    }

    #[test]
    fn test_nested_empty_ref_name_inlines() {
        let mut resolver = ReferenceResolver::new();
        let mut field = nested(
            "LanguageSerializer",
            vec![("name", FieldDescriptor::new(FieldKind::Char))],
        );
        if let FieldKind::Nested { ref_name, .. } = &mut field.kind {
            *ref_name = Some(String::new());
        }
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_OBJECT));
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_nested_as_parameter_or_items_is_an_error() {
        let field = nested("UserSerializer", vec![]);
        assert!(field_to_items(&field).is_err());
        assert!(field_to_parameter(&field, "user", In::Query, None).is_err());
    }

    #[test]
    fn test_list_of_nested_in_schema_context() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::List {
            child: Box::new(nested(
                "TagSerializer",
                vec![("slug", FieldDescriptor::new(FieldKind::Slug))],
            )),
        });
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_ARRAY));
        match *schema.items.unwrap() {
            SchemaOrRef::Ref(r) => assert_eq!(r.ref_name(), "Tag"),
            other => panic!("expected $ref items, got {:?}", other),
        }
    }

    #[test]
    fn test_list_parameter_recurses_into_items() {
        let field = FieldDescriptor::new(FieldKind::List {
            child: Box::new(FieldDescriptor::new(FieldKind::Integer)),
        });
        let parameter = field_to_parameter(&field, "lines", In::Query, None).unwrap();
        assert_eq!(parameter.param_type.as_deref(), Some(TYPE_ARRAY));
        assert_eq!(
            parameter.items.unwrap().item_type.as_deref(),
            Some(TYPE_INTEGER)
        );
    }

    #[test]
    fn test_many_related_is_unique_array_of_strings() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::ManyRelated {
            child: Box::new(FieldDescriptor::new(FieldKind::Related)),
        });
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_ARRAY));
        assert_eq!(schema.unique_items, Some(true));
        let items = unwrap_schema(*schema.items.unwrap());
        assert_eq!(items.schema_type.as_deref(), Some(TYPE_STRING));
    }

    #[test]
    fn test_dict_schema_and_forbidden_contexts() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::Dict {
            child: Box::new(FieldDescriptor::new(FieldKind::Url)),
        });
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_OBJECT));
        let additional = unwrap_schema(*schema.additional_properties.unwrap());
        assert_eq!(additional.format.as_deref(), Some(FORMAT_URI));

        assert!(field_to_items(&field).is_err());
        assert!(field_to_parameter(&field, "refs", In::Query, None).is_err());
    }

    #[test]
    fn test_file_schema_is_read_only_uri() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::File { use_url: true });
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.schema_type.as_deref(), Some(TYPE_STRING));
        assert_eq!(schema.read_only, Some(true));
        assert_eq!(schema.format.as_deref(), Some(FORMAT_URI));

        let plain = FieldDescriptor::new(FieldKind::File { use_url: false });
        let schema = unwrap_schema(field_to_schema(&plain, &mut resolver).unwrap());
        assert!(schema.format.is_none());
    }

    #[test]
    fn test_file_parameter_only_in_form_data() {
        let field = FieldDescriptor::new(FieldKind::File { use_url: true }).required();
        let parameter = field_to_parameter(&field, "upload", In::FormData, None).unwrap();
        assert_eq!(parameter.param_type.as_deref(), Some(TYPE_FILE));
        assert_eq!(parameter.required, Some(true));

        assert!(field_to_parameter(&field, "upload", In::Query, None).is_err());
        assert!(field_to_items(&field).is_err());
    }

    #[test]
    fn test_schema_common_attributes() {
        let mut resolver = ReferenceResolver::new();
        let field = FieldDescriptor::new(FieldKind::Integer)
            .read_only()
            .help_text("id serializer help text")
            .default_value(json!(0));
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(
            schema.description.as_deref(),
            Some("id serializer help text")
        );
        assert_eq!(schema.read_only, Some(true));
        assert_eq!(schema.default, Some(json!(0)));
        // labels never become titles
        assert!(schema.title.is_none());
    }

    #[test]
    fn test_context_default_is_stringified() {
        let mut resolver = ReferenceResolver::new();
        let field =
            FieldDescriptor::new(FieldKind::Related).context_default("CurrentUserDefault");
        let schema = unwrap_schema(field_to_schema(&field, &mut resolver).unwrap());
        assert_eq!(schema.default, Some(json!("CurrentUserDefault")));
    }

    #[test]
    fn test_items_have_no_description() {
        let field = FieldDescriptor::new(FieldKind::Integer).help_text("ignored");
        let items = field_to_items(&field).unwrap();
        assert_eq!(items.item_type.as_deref(), Some(TYPE_INTEGER));
        // Items has no description slot at all - nothing further to assert
    }

    #[test]
    fn test_body_parameter_wraps_schema() {
        let mut resolver = ReferenceResolver::new();
        let field = nested(
            "SnippetSerializer",
            vec![("title", FieldDescriptor::new(FieldKind::Char))],
        )
        .required();
        let parameter =
            field_to_parameter(&field, "data", In::Body, Some(&mut resolver)).unwrap();
        assert_eq!(parameter.location, In::Body);
        assert_eq!(parameter.required, Some(true));
        match parameter.schema.unwrap() {
            SchemaOrRef::Ref(r) => assert_eq!(r.ref_name(), "Snippet"),
            other => panic!("expected $ref, got {:?}", other),
        }
    }

    #[test]
    fn test_body_parameter_requires_resolver() {
        let field = FieldDescriptor::new(FieldKind::Char);
        assert!(field_to_parameter(&field, "data", In::Body, None).is_err());
    }

    #[test]
    fn test_serializer_parameters_expand_fields() {
        let serializer = nested(
            "FilterSerializer",
            vec![
                ("page", FieldDescriptor::new(FieldKind::Integer)),
                ("q", FieldDescriptor::new(FieldKind::Char).required()),
            ],
        );
        let parameters = serializer_parameters(&serializer, In::Query).unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "page");
        assert_eq!(parameters[0].location, In::Query);
        assert_eq!(parameters[1].required, Some(true));
    }

    #[test]
    fn test_same_serializer_registered_once() {
        let mut resolver = ReferenceResolver::new();
        let field = nested(
            "UserSerializer",
            vec![("id", FieldDescriptor::new(FieldKind::Integer))],
        );
        field_to_schema(&field, &mut resolver).unwrap();
        field_to_schema(&field, &mut resolver).unwrap();
        let definitions = resolver.into_definitions().unwrap();
        assert_eq!(definitions.len(), 1);
    }
}
