//! Route-table collaborator types and the per-method override surface.
//!
//! A [`RouteInfo`] carries everything the assembler needs for one endpoint:
//! the path template, the bound HTTP methods, a view-capability descriptor
//! and optional serializer trees for the request and response bodies.
//! Operation overrides are attached at registration time and validated
//! eagerly, rather than being accumulated lazily and checked during
//! generation.

use crate::error::{Error, Result};
use crate::fields::FieldDescriptor;
use crate::openapi::{Parameter, Response, SchemaOrRef};
use indexmap::IndexMap;
use serde::Deserialize;

/// HTTP methods a route can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// The HTTP method as an uppercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability metadata the routing collaborator knows about a view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewDescriptor {
    /// Explicit action name ("list", "create", "retrieve", ...)
    #[serde(default)]
    pub action: Option<String>,
    /// Explicit detail flag on the bound route
    #[serde(default)]
    pub detail: Option<bool>,
    /// Naming-convention suffix ("List" / "Instance")
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub has_retrieve: bool,
    #[serde(default)]
    pub has_update: bool,
    #[serde(default)]
    pub has_destroy: bool,
    /// True when the view consumes form data instead of a JSON body
    #[serde(default)]
    pub consumes_form: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Decide whether a path/view pair represents a list view rather than a
/// detail/instance view.
///
/// The checks run in a fixed priority order since the signals overlap:
/// explicit action name, then the detail flag, then the naming-convention
/// suffix, then capability flags, and finally the shape of the last path
/// segment.
pub fn is_list_view(path: &str, view: &ViewDescriptor) -> bool {
    if let Some(action) = view.action.as_deref() {
        match action {
            "list" | "create" => return true,
            "retrieve" | "update" | "partial_update" | "destroy" => return false,
            _ => {}
        }
    }

    if let Some(detail) = view.detail {
        return !detail;
    }

    match view.suffix.as_deref() {
        Some("List") => return true,
        Some("Instance") => return false,
        _ => {}
    }

    // a view exposing detail capabilities is never a list view
    if view.has_retrieve || view.has_update || view.has_destroy {
        return false;
    }

    // if the last path component is parameterized it's probably not a list
    let last_segment = path.trim_matches('/').rsplit('/').next().unwrap_or("");
    if last_segment.contains('{') {
        return false;
    }

    true
}

/// Request-body override attached to an operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyOverride {
    /// Forcibly remove the inferred request body
    NoBody,
    /// Convert the serializer into a body parameter (or form parameters)
    Serializer(FieldDescriptor),
    /// Use this schema as the body parameter's schema. Invalid when the view
    /// consumes form data, since form and body parameters are mutually
    /// exclusive.
    Schema(SchemaOrRef),
}

/// Manual response attached to an operation, keyed on status code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOverride {
    /// A response with no body and this description
    Description(String),
    /// A response whose body is this schema, with an empty description
    Schema(SchemaOrRef),
    /// A response whose body is the serializer's inferred schema
    Serializer(FieldDescriptor),
    /// A fully spelled-out Response, used as-is
    Response(Response),
}

/// Declarative per-operation overrides. Caller-supplied values fully replace
/// the corresponding inferred value rather than being deep-merged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationOverrides {
    #[serde(default)]
    pub request_body: Option<BodyOverride>,
    /// Serializer whose top-level fields become `query` parameters
    #[serde(default)]
    pub query_serializer: Option<FieldDescriptor>,
    /// Parameters replacing inferred ones that share their `(name, in)` key
    #[serde(default)]
    pub manual_parameters: Vec<Parameter>,
    #[serde(default)]
    pub operation_description: Option<String>,
    #[serde(default)]
    pub operation_id: Option<String>,
    /// Manual responses; any `2xx` key suppresses response auto-generation
    #[serde(default)]
    pub responses: Option<IndexMap<String, ResponseOverride>>,
}

impl OperationOverrides {
    pub fn new() -> Self {
        OperationOverrides::default()
    }

    pub fn request_body(mut self, body: BodyOverride) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn query_serializer(mut self, serializer: FieldDescriptor) -> Self {
        self.query_serializer = Some(serializer);
        self
    }

    pub fn manual_parameter(mut self, parameter: Parameter) -> Self {
        self.manual_parameters.push(parameter);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.operation_description = Some(description.to_string());
        self
    }

    pub fn response(mut self, status: &str, response: ResponseOverride) -> Self {
        self.responses
            .get_or_insert_with(IndexMap::new)
            .insert(status.to_string(), response);
        self
    }
}

/// One endpoint supplied by the routing collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteInfo {
    /// URL path template, e.g. "/snippets/{id}/"
    pub path: String,
    pub methods: Vec<HttpMethod>,
    #[serde(default)]
    pub view: ViewDescriptor,
    /// Serializer tree describing the request body
    #[serde(default)]
    pub request: Option<FieldDescriptor>,
    /// Serializer tree describing successful response bodies
    #[serde(default)]
    pub response: Option<FieldDescriptor>,
    /// Overrides applying to the route's single bound method
    #[serde(default)]
    pub overrides: Option<OperationOverrides>,
    /// Per-method overrides for multi-method routes
    #[serde(default)]
    pub method_overrides: IndexMap<HttpMethod, OperationOverrides>,
}

impl RouteInfo {
    pub fn new(path: &str, methods: Vec<HttpMethod>) -> Self {
        RouteInfo {
            path: path.to_string(),
            methods,
            view: ViewDescriptor::default(),
            request: None,
            response: None,
            overrides: None,
            method_overrides: IndexMap::new(),
        }
    }

    pub fn view(mut self, view: ViewDescriptor) -> Self {
        self.view = view;
        self
    }

    pub fn request(mut self, serializer: FieldDescriptor) -> Self {
        self.request = Some(serializer);
        self
    }

    pub fn response(mut self, serializer: FieldDescriptor) -> Self {
        self.response = Some(serializer);
        self
    }

    /// Attach overrides to this route's single bound method. Fails eagerly
    /// on a multi-method route, which must disambiguate per method.
    pub fn with_overrides(mut self, overrides: OperationOverrides) -> Result<Self> {
        if self.methods.len() > 1 {
            return Err(Error::generation(format!(
                "route '{}' binds {} methods; specify overrides per method",
                self.path,
                self.methods.len()
            )));
        }
        self.overrides = Some(overrides);
        self.validate()?;
        Ok(self)
    }

    /// Attach overrides for one method of a multi-method route.
    pub fn with_method_overrides(
        mut self,
        method: HttpMethod,
        overrides: OperationOverrides,
    ) -> Result<Self> {
        if self.method_overrides.contains_key(&method) {
            return Err(Error::generation(format!(
                "overrides for {} declared twice on route '{}'",
                method, self.path
            )));
        }
        self.method_overrides.insert(method, overrides);
        self.validate()?;
        Ok(self)
    }

    /// Check the route's override configuration. Also re-run by the
    /// assembler for routes deserialized from a manifest.
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(Error::generation(format!(
                "route '{}' binds no HTTP methods",
                self.path
            )));
        }
        if self.overrides.is_some() && !self.method_overrides.is_empty() {
            return Err(Error::generation(format!(
                "route '{}' mixes route-level and per-method overrides",
                self.path
            )));
        }
        if self.overrides.is_some() && self.methods.len() > 1 {
            return Err(Error::generation(format!(
                "route '{}' binds multiple methods; overrides must name a method",
                self.path
            )));
        }
        if !self.method_overrides.is_empty() && self.methods.len() == 1 {
            return Err(Error::generation(format!(
                "route '{}' binds a single method; attach overrides directly",
                self.path
            )));
        }
        for method in self.method_overrides.keys() {
            if !self.methods.contains(method) {
                return Err(Error::generation(format!(
                    "overrides for {} on route '{}' but the method is not bound",
                    method, self.path
                )));
            }
        }
        Ok(())
    }

    /// The overrides that apply to one bound method, if any.
    pub fn overrides_for(&self, method: HttpMethod) -> Option<&OperationOverrides> {
        self.overrides
            .as_ref()
            .or_else(|| self.method_overrides.get(&method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_name_takes_precedence() {
        let view = ViewDescriptor {
            action: Some("list".to_string()),
            detail: Some(true),
            ..ViewDescriptor::default()
        };
        assert!(is_list_view("/snippets/{id}/", &view));

        let view = ViewDescriptor {
            action: Some("retrieve".to_string()),
            detail: Some(false),
            ..ViewDescriptor::default()
        };
        assert!(!is_list_view("/snippets/", &view));
    }

    #[test]
    fn test_create_action_is_a_list_route() {
        let view = ViewDescriptor {
            action: Some("create".to_string()),
            ..ViewDescriptor::default()
        };
        assert!(is_list_view("/snippets/", &view));
    }

    #[test]
    fn test_detail_flag_beats_suffix() {
        let view = ViewDescriptor {
            detail: Some(false),
            suffix: Some("Instance".to_string()),
            ..ViewDescriptor::default()
        };
        assert!(is_list_view("/snippets/{id}/", &view));
    }

    #[test]
    fn test_suffix_convention() {
        let list = ViewDescriptor {
            suffix: Some("List".to_string()),
            ..ViewDescriptor::default()
        };
        assert!(is_list_view("/snippets/{id}/", &list));

        let instance = ViewDescriptor {
            suffix: Some("Instance".to_string()),
            ..ViewDescriptor::default()
        };
        assert!(!is_list_view("/snippets/", &instance));
    }

    #[test]
    fn test_detail_capabilities_preclude_list() {
        let view = ViewDescriptor {
            has_retrieve: true,
            ..ViewDescriptor::default()
        };
        assert!(!is_list_view("/snippets/", &view));
    }

    #[test]
    fn test_parameterized_tail_is_not_a_list() {
        let view = ViewDescriptor::default();
        assert!(!is_list_view("/snippets/{id}/", &view));
        assert!(is_list_view("/snippets/", &view));
    }

    #[test]
    fn test_single_method_overrides() {
        let route = RouteInfo::new("/snippets/", vec![HttpMethod::Post])
            .with_overrides(OperationOverrides::new().description("create a snippet"))
            .unwrap();
        assert!(route.overrides_for(HttpMethod::Post).is_some());
    }

    #[test]
    fn test_multi_method_route_requires_disambiguation() {
        let result = RouteInfo::new("/snippets/{id}/", vec![HttpMethod::Get, HttpMethod::Put])
            .with_overrides(OperationOverrides::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_method_override_must_be_bound() {
        let result = RouteInfo::new("/snippets/{id}/", vec![HttpMethod::Get, HttpMethod::Put])
            .with_method_overrides(HttpMethod::Delete, OperationOverrides::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_method_override_on_single_method_route() {
        let result = RouteInfo::new("/snippets/", vec![HttpMethod::Post])
            .with_method_overrides(HttpMethod::Post, OperationOverrides::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_method_overrides_rejected() {
        let result = RouteInfo::new("/snippets/{id}/", vec![HttpMethod::Get, HttpMethod::Put])
            .with_method_overrides(HttpMethod::Get, OperationOverrides::new())
            .and_then(|route| {
                route.with_method_overrides(HttpMethod::Get, OperationOverrides::new())
            });
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_for_resolves_per_method() {
        let route = RouteInfo::new("/snippets/{id}/", vec![HttpMethod::Get, HttpMethod::Put])
            .with_method_overrides(
                HttpMethod::Put,
                OperationOverrides::new().description("update"),
            )
            .unwrap();
        assert!(route.overrides_for(HttpMethod::Put).is_some());
        assert!(route.overrides_for(HttpMethod::Get).is_none());
    }
}
