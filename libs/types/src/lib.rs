//! # TYTX Type System - Typed-Text Value Model
//!
//! ## Purpose
//!
//! Pure data structures for the TYTX typed-text interchange protocol:
//! the closed value model, struct-schema shapes, validation definitions
//! and the XTYTX envelope document. This crate carries no protocol rules;
//! encoding/decoding logic lives in `tytx-codec`.
//!
//! ## Architecture Role
//!
//! ```text
//! tytx-types → [tytx-codec] → host adapters (JSON/XML/MessagePack)
//!     ↑             ↓                  ↓
//! Pure Data    Protocol Rules     Wire Formats
//! TytxValue    Suffix Grammar     typed-JSON text
//! StructSchema Hydration Engine   ext-42 bodies
//! ```
//!
//! Values are a closed tagged union constructed explicitly by producers;
//! there is no duck typing in the core. Boundary heuristics (for example
//! classifying a host datetime as date-only, time-only or full datetime)
//! are provided as explicit constructors so every adapter classifies the
//! same way.

pub mod envelope;
pub mod error;
pub mod schema;
pub mod validation;
pub mod value;

pub use envelope::XtytxEnvelope;
pub use error::{ScalarError, ScalarResult, SchemaError};
pub use schema::{DelimitedSchema, FieldDef, FieldRef, FieldValidate, StructSchema};
pub use validation::ValidationDef;
pub use value::TytxValue;
