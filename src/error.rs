use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Conversion is best-effort: values that cannot be coerced are left untouched and
/// parse failures keep the prior destination value, none of which is reported. Errors
/// only surface where a caller asks for a converter that cannot exist or applies a
/// converter to values of the wrong types.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::Unsupported`] - No converter can be built for the requested type pair
/// - [`Error::BadType`] - A type cannot take part in conversion at all
///
/// ## Execution Errors
/// - [`Error::TypeMismatch`] - A prebuilt converter was applied to values of other types
///
/// # Examples
///
/// ```rust
/// use conv::{convert, Error};
///
/// match convert::<Vec<i32>, bool>(&true, &[]) {
///     Ok(_) => unreachable!(),
///     Err(Error::Unsupported { dst, src }) => {
///         assert_eq!(src, "bool");
///         assert!(dst.contains("Vec<i32>"));
///     }
///     Err(e) => panic!("unexpected error: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No conversion procedure exists between the two types.
    ///
    /// Resolution tried custom converters, the string capabilities, the primitive
    /// table, the dynamic destination, every composite shape and the time fallbacks
    /// without a match, or every member of a composite failed to resolve.
    ///
    /// # Fields
    ///
    /// * `dst` - Name of the dereferenced destination type
    /// * `src` - Name of the dereferenced source type
    #[error("can't convert source type {src} to destination type {dst}")]
    Unsupported {
        /// The destination type name
        dst: &'static str,
        /// The source type name
        src: &'static str,
    },

    /// A converter was applied to a value whose runtime type differs from the type
    /// the converter was built for.
    ///
    /// This happens with [`crate::Converter::convert_dyn`] and with [`crate::Dynamic`]
    /// sources whose held value changed type since the converter was built.
    ///
    /// # Fields
    ///
    /// * `role` - `"source"` or `"destination"`
    /// * `expected` - Name of the type the converter was built for
    /// * `actual` - Name of the type that was passed
    #[error("invalid {role} type. [expected:{expected}] [actual:{actual}]")]
    TypeMismatch {
        /// Which side of the conversion mismatched
        role: &'static str,
        /// The type the converter expects
        expected: &'static str,
        /// The type that was supplied
        actual: &'static str,
    },

    /// A type cannot take part in conversion.
    ///
    /// Raised for a [`crate::Dynamic`] source that holds no value when the runtime
    /// type is needed to build a converter.
    #[error("bad type: {0}")]
    BadType(String),
}
