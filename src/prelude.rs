//! # conv Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! of the conv library. Import it to get the entry points, the derive macro and the
//! option constructors in one line.
//!
//! ```rust
//! use conv::prelude::*;
//!
//! let n: i64 = convert(&"42".to_string(), &[]).unwrap();
//! assert_eq!(n, 42);
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The error type for all conv operations
pub use crate::Error;

/// The result type used throughout conv
pub use crate::Result;

// ================================================================================================
// Type Model
// ================================================================================================

/// The runtime type model and its derive macro
pub use crate::reflect::{Kind, TypeInfo};
pub use crate::{Dynamic, Reflect, Typed};

// ================================================================================================
// Entry Points
// ================================================================================================

/// One-shot, two-phase and prebuilt conversions
pub use crate::{
    convert, convert_to, new_converter, ostrich_convert, ostrich_two_phase_convert,
    two_phase_convert, two_phase_convert_to, Converter,
};

// ================================================================================================
// Options and Extension
// ================================================================================================

/// Per-call options
pub use crate::options::{self, ConvOption, MinUnixScene, NilValuePolicy};

/// Custom conversion rules
pub use crate::convert::custom::{CustomConverter, FnConverter, TypedConverter};
