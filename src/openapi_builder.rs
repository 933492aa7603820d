//! Swagger document builder.
//!
//! Walks the supplied route table, infers one [`Operation`] per bound
//! (path, method) pair, merges registration-time overrides on top, and
//! assembles the root [`Swagger`] document together with the definitions
//! collected by the reference resolver.

use crate::error::{Error, Result};
use crate::openapi::{
    In, Info, Operation, Parameter, PathItem, Response, Schema, SchemaOrRef, Swagger, TYPE_ARRAY,
    TYPE_STRING,
};
use crate::resolver::ReferenceResolver;
use crate::routes::{
    is_list_view, BodyOverride, HttpMethod, OperationOverrides, ResponseOverride, RouteInfo,
};
use crate::schema_generator::{field_to_parameter, field_to_schema, serializer_parameters};
use indexmap::IndexMap;
use log::debug;

const FORM_MEDIA_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];
const JSON_MEDIA_TYPE: &str = "application/json";

/// Swagger document builder
pub struct SwaggerBuilder {
    info: Info,
    host: Option<String>,
    base_path: Option<String>,
    schemes: Option<Vec<String>>,
    paths: IndexMap<String, PathItem>,
    resolver: ReferenceResolver,
}

impl SwaggerBuilder {
    pub fn new(info: Info) -> Self {
        debug!("initializing SwaggerBuilder for '{}'", info.title);
        SwaggerBuilder {
            info,
            host: None,
            base_path: None,
            schemes: None,
            paths: IndexMap::new(),
            resolver: ReferenceResolver::new(),
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = Some(base_path.to_string());
        self
    }

    pub fn schemes(mut self, schemes: Vec<String>) -> Self {
        self.schemes = Some(schemes);
        self
    }

    /// Add one route, producing an operation for every bound method.
    pub fn add_route(&mut self, route: &RouteInfo) -> Result<()> {
        route.validate()?;
        for &method in &route.methods {
            debug!("assembling operation {} {}", method, route.path);
            let operation = self.build_operation(route, method)?;
            let path_item = self.paths.entry(route.path.clone()).or_default();
            let slot = match method {
                HttpMethod::Get => &mut path_item.get,
                HttpMethod::Post => &mut path_item.post,
                HttpMethod::Put => &mut path_item.put,
                HttpMethod::Patch => &mut path_item.patch,
                HttpMethod::Delete => &mut path_item.delete,
                HttpMethod::Options => &mut path_item.options,
                HttpMethod::Head => &mut path_item.head,
            };
            if slot.is_some() {
                return Err(Error::generation(format!(
                    "duplicate operation: {} {} is already registered",
                    method, route.path
                )));
            }
            *slot = Some(operation);
        }
        Ok(())
    }

    /// Assemble the final document. Forces every pending schema definition.
    pub fn build(self) -> Result<Swagger> {
        debug!("building final Swagger document");
        let definitions = self.resolver.into_definitions()?;
        Ok(Swagger {
            swagger: "2.0".to_string(),
            info: self.info,
            host: self.host,
            base_path: self.base_path,
            schemes: self.schemes,
            consumes: Some(vec![JSON_MEDIA_TYPE.to_string()]),
            produces: Some(vec![JSON_MEDIA_TYPE.to_string()]),
            paths: self.paths,
            definitions: if definitions.is_empty() {
                None
            } else {
                Some(definitions)
            },
            security_definitions: None,
            extensions: IndexMap::new(),
        })
    }

    fn build_operation(&mut self, route: &RouteInfo, method: HttpMethod) -> Result<Operation> {
        let empty = OperationOverrides::default();
        let overrides = route.overrides_for(method).unwrap_or(&empty);
        let list_view = is_list_view(&route.path, &route.view);

        let mut parameters = path_parameters(&route.path);
        if let Some(query) = &overrides.query_serializer {
            parameters.extend(serializer_parameters(query, In::Query)?);
        }
        parameters.extend(self.request_parameters(route, method, overrides)?);
        let parameters = merge_parameters(parameters, &overrides.manual_parameters)?;
        check_form_body_exclusive(&parameters, &route.path, route.view.consumes_form)?;

        let consumes = parameters
            .iter()
            .any(|p| p.location == In::FormData)
            .then(|| FORM_MEDIA_TYPES.iter().map(|s| s.to_string()).collect());

        let responses = self.build_responses(route, method, overrides, list_view)?;

        Ok(Operation {
            operation_id: Some(
                overrides
                    .operation_id
                    .clone()
                    .unwrap_or_else(|| derive_operation_id(route, method, list_view)),
            ),
            description: overrides
                .operation_description
                .clone()
                .or_else(|| route.view.description.clone()),
            parameters,
            consumes,
            produces: None,
            responses,
            tags: operation_tags(&route.path),
            extensions: IndexMap::new(),
        })
    }

    /// Parameters describing the request payload: a single `body` parameter,
    /// or one `formData` parameter per serializer field when the view
    /// consumes form data.
    fn request_parameters(
        &mut self,
        route: &RouteInfo,
        method: HttpMethod,
        overrides: &OperationOverrides,
    ) -> Result<Vec<Parameter>> {
        let serializer = match &overrides.request_body {
            Some(BodyOverride::NoBody) => return Ok(Vec::new()),
            Some(BodyOverride::Schema(schema)) => {
                if route.view.consumes_form {
                    return Err(Error::generation(format!(
                        "route '{}' consumes form data; a body schema cannot be used because \
                         form and body parameters are mutually exclusive",
                        route.path
                    )));
                }
                let mut parameter = Parameter::new("data", In::Body);
                parameter.required = Some(true);
                parameter.schema = Some(schema.clone());
                return Ok(vec![parameter]);
            }
            Some(BodyOverride::Serializer(serializer)) => Some(serializer),
            None => {
                if accepts_body(method) {
                    route.request.as_ref()
                } else {
                    None
                }
            }
        };

        match serializer {
            None => Ok(Vec::new()),
            Some(serializer) if route.view.consumes_form => {
                serializer_parameters(serializer, In::FormData)
            }
            Some(serializer) => Ok(vec![field_to_parameter(
                serializer,
                "data",
                In::Body,
                Some(&mut self.resolver),
            )?]),
        }
    }

    fn build_responses(
        &mut self,
        route: &RouteInfo,
        method: HttpMethod,
        overrides: &OperationOverrides,
        list_view: bool,
    ) -> Result<IndexMap<String, Response>> {
        let mut responses = IndexMap::new();
        if let Some(manual) = &overrides.responses {
            for (status, response) in manual {
                responses.insert(status.clone(), self.response_from_override(response)?);
            }
        }

        // any manual 2xx suppresses auto-generation entirely
        let has_success = responses.keys().any(|status| status.starts_with('2'));
        if !has_success {
            let (status, response) = self.default_response(route, method, list_view)?;
            responses.insert(status.to_string(), response);
        }
        Ok(responses)
    }

    fn response_from_override(&mut self, overridden: &ResponseOverride) -> Result<Response> {
        Ok(match overridden {
            ResponseOverride::Description(text) => Response::with_description(text),
            ResponseOverride::Schema(schema) => Response::with_schema("", schema.clone()),
            ResponseOverride::Serializer(serializer) => {
                Response::with_schema("", field_to_schema(serializer, &mut self.resolver)?)
            }
            ResponseOverride::Response(response) => response.clone(),
        })
    }

    /// Synthesize the success response for an operation with no manual `2xx`.
    fn default_response(
        &mut self,
        route: &RouteInfo,
        method: HttpMethod,
        list_view: bool,
    ) -> Result<(&'static str, Response)> {
        match method {
            HttpMethod::Post => {
                let serializer = route.response.as_ref().or(route.request.as_ref());
                let response = match serializer {
                    Some(serializer) => {
                        Response::with_schema("", field_to_schema(serializer, &mut self.resolver)?)
                    }
                    None => Response::with_description(""),
                };
                Ok(("201", response))
            }
            HttpMethod::Delete => Ok(("204", Response::with_description(""))),
            _ => {
                let response = match &route.response {
                    Some(serializer) => {
                        let schema = field_to_schema(serializer, &mut self.resolver)?;
                        let schema = if list_view {
                            let mut array = Schema::of_type(TYPE_ARRAY);
                            array.items = Some(Box::new(schema));
                            SchemaOrRef::from(array)
                        } else {
                            schema
                        };
                        Response::with_schema("", schema)
                    }
                    None => Response::with_description(""),
                };
                Ok(("200", response))
            }
        }
    }
}

fn accepts_body(method: HttpMethod) -> bool {
    matches!(
        method,
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch
    )
}

/// Required string parameters for every `{placeholder}` in the path template.
fn path_parameters(path: &str) -> Vec<Parameter> {
    path.split('/')
        .filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|segment| segment.strip_suffix('}'))
        })
        .map(|name| {
            let mut parameter = Parameter::new(name, In::Path);
            parameter.param_type = Some(TYPE_STRING.to_string());
            parameter.required = Some(true);
            parameter
        })
        .collect()
}

/// Merge manual parameters over inferred ones.
///
/// Parameters are keyed by `(name, in)`; a manual parameter replaces the
/// inferred one sharing its key (keeping its position), others are appended.
/// Duplicate keys within either list are invalid.
fn merge_parameters(inferred: Vec<Parameter>, manual: &[Parameter]) -> Result<Vec<Parameter>> {
    let mut merged: IndexMap<(String, In), Parameter> = IndexMap::new();
    for parameter in inferred {
        if merged.insert(parameter.key(), parameter).is_some() {
            return Err(Error::generation(
                "duplicate parameters found in inferred parameter list",
            ));
        }
    }
    let mut seen_manual = Vec::new();
    for parameter in manual {
        let key = parameter.key();
        if seen_manual.contains(&key) {
            return Err(Error::generation(format!(
                "duplicate manual parameter ('{}', {})",
                key.0, key.1
            )));
        }
        seen_manual.push(key.clone());
        merged.insert(key, parameter.clone());
    }
    Ok(merged.into_values().collect())
}

/// `body` and `form` parameters are mutually exclusive within one operation,
/// at most one `body` parameter may exist, and `formData` parameters are only
/// valid when the view actually consumes form data.
fn check_form_body_exclusive(
    parameters: &[Parameter],
    path: &str,
    consumes_form: bool,
) -> Result<()> {
    let body_count = parameters
        .iter()
        .filter(|p| p.location == In::Body)
        .count();
    let has_form = parameters.iter().any(|p| p.location == In::FormData);
    if body_count > 1 {
        return Err(Error::generation(format!(
            "operation on '{}' has more than one body parameter",
            path
        )));
    }
    if body_count > 0 && has_form {
        return Err(Error::generation(format!(
            "operation on '{}' mixes form and body parameters",
            path
        )));
    }
    if has_form && !consumes_form {
        return Err(Error::generation(format!(
            "operation on '{}' declares formData parameters but the view does not consume form data",
            path
        )));
    }
    Ok(())
}

/// Derive an operation id from the path and method, e.g.
/// `GET /snippets/{id}/` becomes `snippets_read`.
fn derive_operation_id(route: &RouteInfo, method: HttpMethod, list_view: bool) -> String {
    let prefix: Vec<&str> = route
        .path
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .collect();

    let suffix = match &route.view.action {
        Some(action) if !action.is_empty() => action.clone(),
        _ => match method {
            HttpMethod::Get if list_view => "list".to_string(),
            HttpMethod::Get => "read".to_string(),
            HttpMethod::Post => "create".to_string(),
            HttpMethod::Put => "update".to_string(),
            HttpMethod::Patch => "partial_update".to_string(),
            HttpMethod::Delete => "delete".to_string(),
            HttpMethod::Options => "options".to_string(),
            HttpMethod::Head => "head".to_string(),
        },
    };

    if prefix.is_empty() {
        suffix
    } else {
        format!("{}_{}", prefix.join("_"), suffix)
    }
}

fn operation_tags(path: &str) -> Option<Vec<String>> {
    path.split('/')
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .map(|segment| vec![segment.to_string()])
}
