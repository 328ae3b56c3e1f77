//! Document model.
//!
//! - [`document::Document`] - ordered list of named fields, plus a builder
//! - [`field::Field`] - a named value with a `stored` flag
//! - [`field::FieldValue`] - tagged value: stored-only, text, exact or numeric
//! - [`field::FieldKind`] - how a value participates in indexing

#[allow(clippy::module_inception)]
pub mod document;
pub mod field;
