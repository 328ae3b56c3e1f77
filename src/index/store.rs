//! Document store: doc id → stored fields.
//!
//! Every admitted document has an entry, even when none of its fields is
//! stored, so the store doubles as the set of live doc ids.

use std::collections::BTreeMap;

use crate::document::document::Document;
use crate::document::field::{Field, FieldValue, Numeric};
use crate::error::{LucernaError, Result};
use crate::index::DocId;
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

const TAG_STORED_ONLY: u8 = 0;
const TAG_TEXT: u8 = 1;
const TAG_EXACT: u8 = 2;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;

/// Stored fields of every document, ordered by doc id.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    docs: BTreeMap<DocId, Vec<Field>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        DocumentStore::default()
    }

    /// Store the given fields under `doc_id`, replacing any previous entry.
    pub fn insert(&mut self, doc_id: DocId, fields: Vec<Field>) {
        self.docs.insert(doc_id, fields);
    }

    /// The stored fields of a document, in insertion order.
    pub fn get(&self, doc_id: DocId) -> Option<Document> {
        self.docs
            .get(&doc_id)
            .map(|fields| Document::from(fields.clone()))
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.docs.contains_key(&doc_id)
    }

    /// All doc ids in ascending order.
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Largest doc id present.
    pub fn max_doc_id(&self) -> Option<DocId> {
        self.docs.keys().next_back().copied()
    }

    pub fn encode<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        let ids: Vec<DocId> = self.docs.keys().copied().collect();
        writer.write_delta_compressed_u64s(&ids)?;

        for fields in self.docs.values() {
            writer.write_varint(fields.len() as u64)?;
            for field in fields {
                writer.write_string(field.name())?;
                match field.value() {
                    FieldValue::StoredOnly(s) => {
                        writer.write_u8(TAG_STORED_ONLY)?;
                        writer.write_string(s)?;
                    }
                    FieldValue::Text(s) => {
                        writer.write_u8(TAG_TEXT)?;
                        writer.write_string(s)?;
                    }
                    FieldValue::Exact(s) => {
                        writer.write_u8(TAG_EXACT)?;
                        writer.write_string(s)?;
                    }
                    FieldValue::Numeric(Numeric::Integer(v)) => {
                        writer.write_u8(TAG_INTEGER)?;
                        writer.write_signed_varint(*v)?;
                    }
                    FieldValue::Numeric(Numeric::Float(v)) => {
                        writer.write_u8(TAG_FLOAT)?;
                        writer.write_f64(*v)?;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let ids = reader.read_delta_compressed_u64s()?;
        let mut docs = BTreeMap::new();

        for doc_id in ids {
            let count = reader.read_len()?;
            let mut fields = Vec::with_capacity(count);
            for _ in 0..count {
                let name = reader.read_string()?;
                let value = match reader.read_u8()? {
                    TAG_STORED_ONLY => FieldValue::StoredOnly(reader.read_string()?),
                    TAG_TEXT => FieldValue::Text(reader.read_string()?),
                    TAG_EXACT => FieldValue::Exact(reader.read_string()?),
                    TAG_INTEGER => FieldValue::Numeric(Numeric::Integer(reader.read_signed_varint()?)),
                    TAG_FLOAT => FieldValue::Numeric(Numeric::Float(reader.read_f64()?)),
                    tag => {
                        return Err(LucernaError::corrupt(format!(
                            "unknown stored field tag {tag}"
                        )));
                    }
                };
                fields.push(Field::new(name, value));
            }
            if docs.insert(doc_id, fields).is_some() {
                return Err(LucernaError::corrupt(format!("duplicate doc id {doc_id}")));
            }
        }

        Ok(DocumentStore { docs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_insert_and_get() {
        let mut store = DocumentStore::new();
        store.insert(
            1,
            vec![
                Field::numeric("id", 1),
                Field::text("title", "苹果"),
                Field::stored_only("image", "1.jpg"),
            ],
        );
        store.insert(2, Vec::new());

        let doc = store.get(1).unwrap();
        assert_eq!(doc.field_names(), vec!["id", "title", "image"]);
        assert!(store.get(2).unwrap().is_empty());
        assert!(store.get(3).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.max_doc_id(), Some(2));
    }

    #[test]
    fn test_encode_decode() {
        let mut store = DocumentStore::new();
        store.insert(
            3,
            vec![
                Field::numeric("id", -3),
                Field::numeric("price", 5.5),
                Field::exact("sku", "A-3"),
                Field::text("title", "iPhone"),
                Field::stored_only("image", "3.jpg"),
            ],
        );
        store.insert(10, Vec::new());

        let storage = MemoryStorage::default();
        let mut writer = StructWriter::new(storage.create_output("s.bin").unwrap());
        store.encode(&mut writer).unwrap();
        writer.close().unwrap();

        let mut reader = StructReader::new(storage.open_input("s.bin").unwrap()).unwrap();
        let decoded = DocumentStore::decode(&mut reader).unwrap();

        assert_eq!(decoded.get(3), store.get(3));
        assert_eq!(decoded.doc_ids().collect::<Vec<_>>(), vec![3, 10]);
    }
}
