// Copyright 2025 smgrushb
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # conv
//!
//! A type-directed value conversion engine. Given a source value and a destination
//! type, `conv` compiles a converter for the pair once, memoizes it per options
//! fingerprint, and reuses it on every later call from any thread.
//!
//! ## Features
//!
//! - **Structures** - fields pair up by name after tag resolution, with embedded
//!   members flattened, aliases, allow and ban lists, and accessor methods
//! - **Scalars** - every numeric, boolean, character and string pair, with the
//!   lenient string parsing rules of [`convert::coerce`]
//! - **Containers** - `Vec`, arrays, `HashMap`, `BTreeMap`, `Option` and `Box` at any
//!   nesting depth, including self-referential structures
//! - **Dynamic values** - [`Dynamic`] holds any reflected value, as source or
//!   destination
//! - **Time** - date-times to and from strings and Unix seconds, with per-scene floors
//! - **Extension** - [`convert::custom::CustomConverter`] rules per call or for the
//!   whole process, plus the prebuilt adapters of [`extend`]
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use conv::{convert, options, Dynamic, Reflect};
//!
//! #[derive(Reflect, Default, Clone)]
//! pub struct Order {
//!     #[tag(json = "order_id")]
//!     pub id: u64,
//!     pub amount: String,
//!     pub note: Option<String>,
//! }
//!
//! #[derive(Reflect, Default, Clone, Debug, PartialEq)]
//! pub struct OrderRow {
//!     pub order_id: i64,
//!     pub amount: f64,
//! }
//!
//! let order = Order { id: 7, amount: "12.5".into(), note: None };
//!
//! let row: OrderRow = convert(&order, &[]).unwrap();
//! assert_eq!(row, OrderRow { order_id: 7, amount: 12.5 });
//!
//! let fields: HashMap<String, Dynamic> = convert(&order, &[options::ignore_empty_fields()]).unwrap();
//! assert!(fields.contains_key("order_id"));
//! assert!(!fields.contains_key("note"));
//! ```
//!
//! ## Architecture
//!
//! - [`reflect`] - the runtime type model behind `#[derive(Reflect)]`
//! - [`options`] - per-call options and their fingerprint
//! - [`settings`] - process-wide defaults
//! - [`convert`] - resolution, the converter cache and the entry points
//! - [`extend`] - prebuilt custom converters
//!
//! ## Error Handling
//!
//! Conversion is best-effort and only fails when no converter can exist for a type
//! pair or a prebuilt [`Converter`] sees values of other types. See [`Error`].

extern crate self as conv;

#[macro_use]
pub(crate) mod macros;

mod error;

pub mod convert;
pub mod extend;
pub mod options;
pub mod prelude;
pub mod reflect;
pub mod settings;

/// `conv` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `conv` Error type
///
/// The single error type of every fallible operation in this crate.
pub use error::Error;

/// Derives [`reflect::Reflect`] and [`reflect::Typed`] for a structure.
pub use conv_derive::Reflect;

pub use reflect::{Dynamic, Reflect, Typed};

pub use convert::custom::CustomConverter;
pub use convert::{
    convert, convert_to, new_converter, ostrich_convert, ostrich_two_phase_convert,
    two_phase_convert, two_phase_convert_to, Converter,
};
pub use options::{ConvOption, MinUnixScene, NilValuePolicy};
