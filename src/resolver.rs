//! Reference resolver - the registry of named schema definitions.
//!
//! Named schemas are registered as lazy factories and built at most once.
//! Resolution is explicitly two-phase: registration stores a thunk, and
//! forcing it marks the entry in-progress so that a factory which re-requests
//! its own name mid-build is rejected instead of recursing forever. Recursive
//! object graphs stay legal as long as the inner occurrence registers itself
//! and returns a `$ref` rather than forcing the definition.

use crate::error::{Error, Result};
use crate::openapi::Schema;
use indexmap::IndexMap;
use log::{debug, warn};

/// Lazy builder for one named schema. Receives the resolver so that it can
/// register nested definitions while running.
pub type SchemaFactory = Box<dyn FnOnce(&mut ReferenceResolver) -> Result<Schema>>;

enum Definition {
    Pending(SchemaFactory),
    InProgress,
    Done(Schema),
}

/// Maps symbolic names to lazily-built schema definitions.
///
/// Created once per document-generation pass and consumed into the root
/// document's `definitions` table.
#[derive(Default)]
pub struct ReferenceResolver {
    definitions: IndexMap<String, Definition>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        ReferenceResolver {
            definitions: IndexMap::new(),
        }
    }

    /// Register a factory under `name` unless the name is already claimed.
    ///
    /// Re-registration is ignored. Two distinct object shapes deriving the
    /// same name would silently collide here, so the dropped registration is
    /// at least logged.
    pub fn setdefault(&mut self, name: &str, factory: SchemaFactory) {
        if self.definitions.contains_key(name) {
            warn!(
                "definition '{}' is already registered; ignoring re-registration",
                name
            );
            return;
        }
        debug!("registering schema definition '{}'", name);
        self.definitions.insert(name.to_string(), Definition::Pending(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Force the named definition, building it on first access.
    pub fn resolve(&mut self, name: &str) -> Result<&Schema> {
        match self.definitions.get_mut(name) {
            None => {
                return Err(Error::generation(format!(
                    "unknown schema definition '{}'",
                    name
                )))
            }
            Some(Definition::Done(_)) => {}
            Some(Definition::InProgress) => {
                return Err(Error::generation(format!(
                    "cyclic definition: '{}' requested while it was being built",
                    name
                )))
            }
            Some(entry @ Definition::Pending(_)) => {
                if let Definition::Pending(factory) =
                    std::mem::replace(entry, Definition::InProgress)
                {
                    debug!("building schema definition '{}'", name);
                    let schema = factory(self)?;
                    self.definitions
                        .insert(name.to_string(), Definition::Done(schema));
                }
            }
        }

        match self.definitions.get(name) {
            Some(Definition::Done(schema)) => Ok(schema),
            _ => Err(Error::generation(format!(
                "definition '{}' disappeared during resolution",
                name
            ))),
        }
    }

    /// Force every pending definition, including ones registered by factories
    /// that run during this call.
    pub fn force_all(&mut self) -> Result<()> {
        loop {
            let next = self.definitions.iter().find_map(|(name, def)| {
                matches!(def, Definition::Pending(_)).then(|| name.clone())
            });
            match next {
                Some(name) => {
                    self.resolve(&name)?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Force everything and hand the built definitions over, preserving
    /// registration order.
    pub fn into_definitions(mut self) -> Result<IndexMap<String, Schema>> {
        self.force_all()?;
        let mut built = IndexMap::new();
        for (name, def) in self.definitions {
            match def {
                Definition::Done(schema) => {
                    built.insert(name, schema);
                }
                _ => {
                    return Err(Error::generation(format!(
                        "definition '{}' was never built",
                        name
                    )))
                }
            }
        }
        Ok(built)
    }
}
