//! Swagger 2.0 generator - automatic API documentation from declarative routes.
//!
//! This library turns a declarative description of an API - endpoints,
//! serializer field trees and per-operation overrides - into a complete,
//! validated Swagger 2.0 document. Field descriptors are inferred into
//! schemas and parameters, shared object types are collected into
//! `#/definitions/` and referenced by `$ref`, and the finished document is
//! emitted as deterministic JSON or YAML.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`fields`] - Declarative field descriptors for request/response shapes
//! 2. [`schema_generator`] - Converts field descriptors to schemas, items and parameters
//! 3. [`resolver`] - Collects named schema definitions and resolves `$ref`s
//! 4. [`routes`] - Route table entries, the list-view heuristic and operation overrides
//! 5. [`openapi_builder`] - Assembles operations and the root Swagger document
//! 6. [`codec`] - Validates and serializes the document to JSON or YAML
//! 7. [`cache`] - Process-wide cache for encoded documents
//! 8. [`manifest`] - Loads the YAML/JSON manifest describing an API
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_from_routes::{
//!     codec::{self, EncoderConfig, Format, SpecValidator},
//!     fields::{FieldDescriptor, FieldKind},
//!     openapi::Info,
//!     openapi_builder::SwaggerBuilder,
//!     routes::{HttpMethod, RouteInfo},
//! };
//!
//! let serializer = FieldDescriptor::new(FieldKind::Nested {
//!     name: "SnippetSerializer".to_string(),
//!     ref_name: None,
//!     fields: [
//!         ("title".to_string(), FieldDescriptor::new(FieldKind::Char).required()),
//!     ]
//!     .into_iter()
//!     .collect(),
//! });
//!
//! let mut builder = SwaggerBuilder::new(Info {
//!     title: "Snippets API".to_string(),
//!     version: "v1".to_string(),
//!     ..Info::default()
//! });
//! builder
//!     .add_route(
//!         &RouteInfo::new("/snippets/", vec![HttpMethod::Get, HttpMethod::Post])
//!             .request(serializer.clone())
//!             .response(serializer),
//!     )
//!     .unwrap();
//! let swagger = builder.build().unwrap();
//!
//! let config = EncoderConfig {
//!     security_definitions: None,
//!     validators: vec![SpecValidator::Structure, SpecValidator::MetaSchema],
//! };
//! let yaml = codec::encode(&swagger, Format::Yaml, &config).unwrap();
//! println!("{}", String::from_utf8(yaml).unwrap());
//! ```

pub mod cache;
pub mod cli;
pub mod codec;
pub mod error;
pub mod fields;
pub mod manifest;
pub mod openapi;
pub mod openapi_builder;
pub mod resolver;
pub mod routes;
pub mod schema_generator;

pub use error::{Error, Result};
