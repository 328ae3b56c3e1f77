//! Document structure.
//!
//! A [`Document`] is an ordered list of [`Field`]s. Field names may repeat;
//! the order of fields is the order they were added, and stored fields come
//! back from the index in that same order.
//!
//! # Examples
//!
//! ```
//! use lucerna::document::document::Document;
//!
//! let doc = Document::builder()
//!     .add_numeric("id", 1)
//!     .add_text("title", "1我爱爪哇 Apple/苹果 iPhone")
//!     .add_stored("image", "http://example.com/1.jpg")
//!     .build();
//!
//! assert_eq!(doc.len(), 3);
//! assert_eq!(doc.get_str("image"), Some("http://example.com/1.jpg"));
//! ```

use serde::{Deserialize, Serialize};

use crate::document::field::{Field, FieldValue, Numeric};
use crate::error::Result;

/// A document: an ordered collection of named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document { fields: Vec::new() }
    }

    /// Create a document builder.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Append a field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First value of the named field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.value())
    }

    /// Every value of the named field, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name() == name)
            .map(|f| f.value())
    }

    /// First string value of the named field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    /// First numeric value of the named field.
    pub fn get_numeric(&self, name: &str) -> Option<Numeric> {
        self.get(name).and_then(|v| v.as_numeric())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    /// Distinct field names in first-seen order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for field in &self.fields {
            if !names.contains(&field.name()) {
                names.push(field.name());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate every field.
    pub fn validate(&self) -> Result<()> {
        self.fields.iter().try_for_each(|f| f.validate())
    }

    /// The document restricted to its stored fields.
    pub fn stored_fields(&self) -> Vec<Field> {
        self.fields
            .iter()
            .filter(|f| f.is_stored())
            .cloned()
            .collect()
    }
}

impl From<Vec<Field>> for Document {
    fn from(fields: Vec<Field>) -> Self {
        Document { fields }
    }
}

/// Builder for creating documents.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        DocumentBuilder {
            document: Document::new(),
        }
    }

    /// Add a stored, tokenized text field.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document.add_field(Field::text(name, value));
        self
    }

    /// Add a stored field indexed as one exact term.
    pub fn add_exact<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document.add_field(Field::exact(name, value));
        self
    }

    /// Add a stored numeric field.
    pub fn add_numeric<S: Into<String>, N: Into<Numeric>>(mut self, name: S, value: N) -> Self {
        self.document.add_field(Field::numeric(name, value));
        self
    }

    /// Add a field that is stored but not indexed.
    pub fn add_stored<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document.add_field(Field::stored_only(name, value));
        self
    }

    /// Add a preconfigured field.
    pub fn add_field(mut self, field: Field) -> Self {
        self.document.add_field(field);
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::field::FieldKind;

    #[test]
    fn test_builder_keeps_insertion_order() {
        let doc = Document::builder()
            .add_numeric("id", 7)
            .add_text("title", "apple")
            .add_exact("sku", "A-7")
            .add_stored("image", "7.jpg")
            .build();

        let kinds: Vec<FieldKind> = doc.fields().iter().map(|f| f.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Numeric,
                FieldKind::IndexedTokenized,
                FieldKind::IndexedExact,
                FieldKind::StoredOnly
            ]
        );
        assert_eq!(doc.field_names(), vec!["id", "title", "sku", "image"]);
        assert_eq!(doc.get_numeric("id"), Some(Numeric::Integer(7)));
    }

    #[test]
    fn test_repeated_fields() {
        let doc = Document::builder()
            .add_text("tag", "red")
            .add_text("tag", "blue")
            .build();

        assert_eq!(doc.get_str("tag"), Some("red"));
        assert_eq!(doc.get_all("tag").count(), 2);
        assert_eq!(doc.field_names(), vec!["tag"]);
    }

    #[test]
    fn test_stored_fields() {
        let doc = Document::builder()
            .add_field(Field::text("body", "secret").stored(false))
            .add_text("title", "visible")
            .build();

        let stored = doc.stored_fields();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name(), "title");
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let doc = Document::builder().add_text("", "x").build();
        assert!(doc.validate().is_err());

        let doc = Document::builder().add_numeric("price", f64::NAN).build();
        assert!(doc.validate().is_err());
    }
}
