//! API manifest loading.
//!
//! A manifest is a YAML or JSON file declaring the document metadata and the
//! endpoint table: `info`, `host`, `basePath`, `securityDefinitions` and
//! `endpoints`. Each endpoint entry deserializes into a [`RouteInfo`],
//! including its view descriptor, request/response field trees and overrides.

use crate::error::{Error, Result};
use crate::openapi::{Info, Swagger};
use crate::openapi_builder::SwaggerBuilder;
use crate::routes::RouteInfo;
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub info: Info,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(rename = "basePath", default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub schemes: Option<Vec<String>>,
    #[serde(rename = "securityDefinitions", default)]
    pub security_definitions: Option<IndexMap<String, Value>>,
    pub endpoints: Vec<RouteInfo>,
}

impl Manifest {
    /// Load a manifest from disk. Files ending in `.json` are parsed as
    /// JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Manifest> {
        let text = fs::read_to_string(path).map_err(|e| Error::Manifest {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let manifest = Manifest::parse(&text, is_json).map_err(|e| Error::Manifest {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!(
            "loaded manifest '{}' with {} endpoints",
            path.display(),
            manifest.endpoints.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text. `is_json` selects the JSON parser; YAML otherwise.
    pub fn parse(text: &str, is_json: bool) -> Result<Manifest> {
        if is_json {
            Ok(serde_json::from_str(text)?)
        } else {
            Ok(serde_yaml::from_str(text)?)
        }
    }

    /// Assemble the full Swagger document from the manifest's endpoint table.
    pub fn build_swagger(&self) -> Result<Swagger> {
        let mut builder = SwaggerBuilder::new(self.info.clone());
        if let Some(host) = &self.host {
            builder = builder.host(host);
        }
        if let Some(base_path) = &self.base_path {
            builder = builder.base_path(base_path);
        }
        if let Some(schemes) = &self.schemes {
            builder = builder.schemes(schemes.clone());
        }
        for route in &self.endpoints {
            builder.add_route(route)?;
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::In;
    use crate::routes::HttpMethod;
    use pretty_assertions::assert_eq;

    const SAMPLE_YAML: &str = r#"
info:
  title: Snippets API
  version: v1
host: api.example.com
basePath: /v1
securityDefinitions:
  basic:
    type: basic
endpoints:
  - path: /snippets/
    methods: [get, post]
    view:
      action: list
    request:
      kind: nested
      name: SnippetSerializer
      fields:
        title:
          kind: char
          required: true
    response:
      kind: nested
      name: SnippetSerializer
      fields:
        title:
          kind: char
          required: true
  - path: /snippets/{id}/
    methods: [get]
    overrides:
      operation_description: Fetch one snippet
      manual_parameters:
        - name: verbose
          in: query
          type: boolean
"#;

    #[test]
    fn test_parse_yaml_manifest() {
        let manifest = Manifest::parse(SAMPLE_YAML, false).unwrap();
        assert_eq!(manifest.info.title, "Snippets API");
        assert_eq!(manifest.host.as_deref(), Some("api.example.com"));
        assert_eq!(manifest.base_path.as_deref(), Some("/v1"));
        assert_eq!(manifest.endpoints.len(), 2);

        let first = &manifest.endpoints[0];
        assert_eq!(first.path, "/snippets/");
        assert_eq!(first.methods, vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(first.view.action.as_deref(), Some("list"));

        let second = &manifest.endpoints[1];
        let overrides = second.overrides.as_ref().unwrap();
        assert_eq!(
            overrides.operation_description.as_deref(),
            Some("Fetch one snippet")
        );
        assert_eq!(overrides.manual_parameters[0].name, "verbose");
        assert_eq!(overrides.manual_parameters[0].location, In::Query);
    }

    #[test]
    fn test_parse_json_manifest() {
        let text = r#"{
            "info": {"title": "T", "version": "v2"},
            "endpoints": [
                {"path": "/things/", "methods": ["get"]}
            ]
        }"#;
        let manifest = Manifest::parse(text, true).unwrap();
        assert_eq!(manifest.info.version, "v2");
        assert_eq!(manifest.endpoints.len(), 1);
    }

    #[test]
    fn test_no_body_override_deserializes() {
        let text = r#"
info:
  title: T
  version: v1
endpoints:
  - path: /things/
    methods: [post]
    overrides:
      request_body: no_body
"#;
        let manifest = Manifest::parse(text, false).unwrap();
        let overrides = manifest.endpoints[0].overrides.as_ref().unwrap();
        assert!(matches!(
            overrides.request_body,
            Some(crate::routes::BodyOverride::NoBody)
        ));
    }

    #[test]
    fn test_build_swagger_from_manifest() {
        let manifest = Manifest::parse(SAMPLE_YAML, false).unwrap();
        let swagger = manifest.build_swagger().unwrap();
        assert_eq!(swagger.host.as_deref(), Some("api.example.com"));
        assert_eq!(swagger.base_path.as_deref(), Some("/v1"));
        assert!(swagger.paths.contains_key("/snippets/"));
        assert!(swagger.paths.contains_key("/snippets/{id}/"));
        assert!(swagger.definitions.unwrap().contains_key("Snippet"));
    }

    #[test]
    fn test_invalid_route_surfaces_at_build() {
        let text = r#"
info:
  title: T
  version: v1
endpoints:
  - path: /things/
    methods: [get, post]
    overrides:
      operation_description: ambiguous
"#;
        // route-level overrides on a multi-method route
        let manifest = Manifest::parse(text, false).unwrap();
        assert!(manifest.build_swagger().is_err());
    }

    #[test]
    fn test_missing_file_is_manifest_error() {
        let error = Manifest::load(Path::new("/nonexistent/manifest.yaml")).unwrap_err();
        assert!(matches!(error, Error::Manifest { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.endpoints.len(), 2);
    }
}
