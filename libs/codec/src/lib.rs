//! # TYTX Protocol Codec - Typed-Text Rules Layer
//!
//! ## Purpose
//!
//! This crate contains the "Rules" layer of the TYTX stack:
//! - Scalar type registry and codec (`value::CODE` markers)
//! - Suffix grammar for scalars, typed arrays and struct-qualified tokens
//! - Struct-schema hydration engine over the four schema shapes
//! - XTYTX envelope protocol (global registration, local overlays)
//! - Validation-expression engine (`!`/`&`/`|` over named rules)
//! - Boundary adapters: typed JSON, plain text, XML, MessagePack ext-42
//!
//! ## Architecture Role
//!
//! ```text
//! tytx-types → [tytx-codec] → host transports
//!     ↑             ↓               ↓
//! Pure Data    Protocol Rules   HTTP bodies, files,
//! Structures   Hydration        msgpack frames
//! ```
//!
//! ## Error Policy
//!
//! Three policies coexist, deliberately:
//! - **Forward-tolerant decode**: unknown type codes, unknown struct
//!   references and unrecognized suffixes degrade to the untyped literal
//!   so registry versions interoperate without crashing
//! - **Structural fatal errors**: malformed envelopes, bad metadata and
//!   unknown validation rules raise immediately; these are configuration
//!   bugs, not version skew
//! - **Documented numeric fallback**: decimal text outside
//!   `rust_decimal`'s range degrades to a float parse with a debug log
//!
//! ## Concurrency
//!
//! Everything is synchronous with no internal suspension points and no
//! I/O. The registry set is the only shared mutable state; its RwLock
//! makes last-write-wins registration safe under threads. Hydration
//! reads the snapshot in effect at call time.

pub mod config;
pub mod envelope;
pub mod error;
pub mod format;
pub mod hydrate;
pub mod metadata;
pub mod registry;
pub mod scalar;
pub mod suffix;
pub mod validation;

pub use config::CodecConfig;
pub use envelope::{
    DecodedEnvelope, EnvelopeBuilder, EnvelopeCodec, TYTX_PREFIX, XTYTX_PREFIX,
};
pub use error::{CodecError, CodecResult, MetadataError, ValidationError};
pub use hydrate::{dehydrate_struct, hydrate_struct, HydrateContext};
pub use metadata::{build_metadata, parse_metadata};
pub use registry::TytxRegistry;
pub use scalar::{ScalarCodec, TypeDefinition};
pub use suffix::{split_suffix, Suffix};
pub use validation::{check_def, validate, validate_expression, RuleTiers};

// Re-export the data model for downstream convenience
pub use tytx_types::{
    FieldDef, FieldRef, StructSchema, TytxValue, ValidationDef, XtytxEnvelope,
};
