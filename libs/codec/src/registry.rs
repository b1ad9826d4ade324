//! Process-wide and tenant-scoped registry set
//!
//! One `TytxRegistry` holds the four shared mutable tables: scalar types,
//! struct schemas, validation rules and opaque schema documents. Envelopes
//! write to it (REGISTER phase) and hydration reads the snapshot in effect
//! at call time. Register/unregister are last-write-wins; the RwLock makes
//! that contract safe under threads without defining a winner beyond
//! "last write observed".
//!
//! The process default lives behind a `Lazy` so casual callers share one
//! registry, while tests and multi-tenant hosts construct isolated
//! instances and avoid global registration entirely.

use crate::scalar::{ScalarCodec, TypeDefinition};
use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::{debug, warn};
use tytx_types::{StructSchema, TytxValue, ValidationDef};

/// Shared registry handle; clones refer to the same tables
#[derive(Clone)]
pub struct TytxRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    scalars: RwLock<ScalarCodec>,
    structs: RwLock<HashMap<String, StructSchema>>,
    validations: RwLock<HashMap<String, ValidationDef>>,
    schemas: RwLock<HashMap<String, JsonValue>>,
}

static GLOBAL_REGISTRY: Lazy<TytxRegistry> = Lazy::new(TytxRegistry::new);

impl TytxRegistry {
    /// Fresh registry with the builtin scalar set and empty tables
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                scalars: RwLock::new(ScalarCodec::with_builtins()),
                structs: RwLock::new(HashMap::new()),
                validations: RwLock::new(HashMap::new()),
                schemas: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The process-wide default registry
    pub fn global() -> &'static TytxRegistry {
        &GLOBAL_REGISTRY
    }

    /// Read access to the scalar codec for the duration of a decode
    pub fn scalars(&self) -> RwLockReadGuard<'_, ScalarCodec> {
        self.inner.scalars.read().unwrap()
    }

    /// Register a scalar type definition (last write wins)
    pub fn register_scalar(&self, def: Arc<dyn TypeDefinition>) {
        self.inner.scalars.write().unwrap().register(def);
    }

    /// Register a struct schema under a name, overwriting any holder
    pub fn register_struct(&self, name: impl Into<String>, schema: StructSchema) {
        let name = name.into();
        let prior = self
            .inner
            .structs
            .write()
            .unwrap()
            .insert(name.clone(), schema);
        if prior.is_some() {
            warn!(name = %name, "overwriting struct schema registration");
        } else {
            debug!(name = %name, "registered struct schema");
        }
    }

    pub fn get_struct(&self, name: &str) -> Option<StructSchema> {
        self.inner.structs.read().unwrap().get(name).cloned()
    }

    pub fn unregister_struct(&self, name: &str) -> bool {
        self.inner.structs.write().unwrap().remove(name).is_some()
    }

    /// Register a validation rule under a name, overwriting any holder
    pub fn register_validation(&self, name: impl Into<String>, def: ValidationDef) {
        let name = name.into();
        if self
            .inner
            .validations
            .write()
            .unwrap()
            .insert(name.clone(), def)
            .is_some()
        {
            warn!(name = %name, "overwriting validation rule registration");
        }
    }

    pub fn get_validation(&self, name: &str) -> Option<ValidationDef> {
        self.inner.validations.read().unwrap().get(name).cloned()
    }

    pub fn unregister_validation(&self, name: &str) -> bool {
        self.inner
            .validations
            .write()
            .unwrap()
            .remove(name)
            .is_some()
    }

    /// Register an opaque schema document under a name
    pub fn register_schema(&self, name: impl Into<String>, doc: JsonValue) {
        let name = name.into();
        if self
            .inner
            .schemas
            .write()
            .unwrap()
            .insert(name.clone(), doc)
            .is_some()
        {
            warn!(name = %name, "overwriting schema document registration");
        }
    }

    pub fn get_schema(&self, name: &str) -> Option<JsonValue> {
        self.inner.schemas.read().unwrap().get(name).cloned()
    }

    pub fn unregister_schema(&self, name: &str) -> bool {
        self.inner.schemas.write().unwrap().remove(name).is_some()
    }

    /// Parse text under an explicit type code (strict)
    pub fn from_text(&self, text: &str, code: &str) -> tytx_types::ScalarResult<TytxValue> {
        self.scalars().from_text(text, code)
    }

    /// Serialize a value to typed text through the registered types
    pub fn as_typed_text(&self, value: &TytxValue) -> String {
        self.scalars().as_typed_text(value)
    }
}

impl Default for TytxRegistry {
    fn default() -> Self {
        Self::new()
    }
}
