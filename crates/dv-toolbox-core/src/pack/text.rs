//! Converts pack field values to and from the text fields used by CSV import/export tools.
//!
//! Each pack kind that has an addressable field schema implements [`TextFields`], which exposes
//! a stable list of field names plus per-field parse/format methods. [`parse_text_values`] and
//! [`to_text_values`] drive that trait over a whole row of named text values at once.
//!
//! `NoInfo`, `Unknown`, and `Invalid` packs have no field schema and do not implement this trait.

use std::collections::HashMap;

use snafu::prelude::*;

use super::PackData;

#[cfg(test)]
mod tests;

/// Error converting a pack field to or from its text representation.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum TextFieldError {
    #[snafu(display("{field_name:?} is not a text field of this pack type"))]
    UnknownField { field_name: String },

    #[snafu(display("invalid value {text:?} for text field {field_name:?}: {message}"))]
    InvalidValue { field_name: String, text: String, message: String },
}

/// Converts pack field values to and from the text fields used by CSV import/export tools.
///
/// Field names are declared by [`TextFields::field_names`] and are stable across releases: they
/// are suitable for use as CSV column name suffixes. [`parse_text_values`]/[`to_text_values`]
/// operate on a whole row of values at once; [`TextFields::parse_text_value`]/
/// [`TextFields::to_text_value`] operate on a single named field.
pub trait TextFields: PackData {
    /// Declared field names for this pack kind, in a stable, human-meaningful order.
    fn field_names() -> &'static [&'static str];

    /// A starting value with every field at some placeholder value.
    ///
    /// [`parse_text_values`] starts from this value and then overwrites every field named by
    /// [`TextFields::field_names`], so the placeholder values chosen here are never observable
    /// by a caller who provides a complete set of text fields.
    fn default_for_text() -> Self;

    /// Parses one named field from its text form into `self`, leaving other fields alone.
    fn parse_text_value(&mut self, field_name: &str, text: &str) -> Result<(), TextFieldError>;

    /// Converts one named field of `self` to its text form.
    fn to_text_value(&self, field_name: &str) -> Result<String, TextFieldError>;
}

/// Builds a pack value of type `T` by parsing a whole row of named text field values.
///
/// Any field named by [`TextFields::field_names`] that is missing from `text_field_values` is
/// assumed to hold the empty string.
pub fn parse_text_values<T: TextFields>(
    text_field_values: &HashMap<String, String>,
) -> Result<T, TextFieldError> {
    let mut result = T::default_for_text();
    for field_name in T::field_names() {
        let text = text_field_values.get(*field_name).map_or("", String::as_str);
        result.parse_text_value(field_name, text)?;
    }
    Ok(result)
}

/// Converts a whole pack value of type `T` to a row of named text field values.
pub fn to_text_values<T: TextFields>(value: &T) -> Result<HashMap<String, String>, TextFieldError> {
    let mut result = HashMap::new();
    for field_name in T::field_names() {
        result.insert((*field_name).to_string(), value.to_text_value(field_name)?);
    }
    Ok(result)
}

/// Formats an optional value as its text form, or the empty string if absent.
pub(crate) fn format_optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or(String::new(), ToString::to_string)
}

/// Parses an optional value from text: the empty string means [`None`].
pub(crate) fn parse_optional<T, E: std::fmt::Display>(
    text: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<Option<T>, String> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse(text).map(Some).map_err(|e| e.to_string())
    }
}

/// Builds a [`TextFieldError::InvalidValue`] for `field_name`/`text` with the given message.
pub(crate) fn invalid(field_name: &str, text: &str, message: impl Into<String>) -> TextFieldError {
    InvalidValueSnafu {
        field_name: field_name.to_string(),
        text: text.to_string(),
        message: message.into(),
    }
    .build()
}

/// Builds a [`TextFieldError::UnknownField`] for `field_name`.
pub(crate) fn unknown(field_name: &str) -> TextFieldError {
    UnknownFieldSnafu { field_name: field_name.to_string() }.build()
}
