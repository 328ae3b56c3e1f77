//! Numeric doc values used to evaluate range queries.
//!
//! Values are appended in doc id order while indexing, so each field's column
//! is sorted by doc id. A document may carry several values for one field and
//! matches a range if any of them falls inside it.

use std::cmp::Ordering;

use ahash::AHashMap;

use crate::document::field::Numeric;
use crate::error::{LucernaError, Result};
use crate::index::DocId;
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// Per-field columns of `(doc id, value)` pairs.
#[derive(Debug, Clone, Default)]
pub struct DocValues {
    fields: AHashMap<String, Vec<(DocId, Numeric)>>,
}

impl DocValues {
    pub fn new() -> Self {
        DocValues::default()
    }

    pub fn add(&mut self, field: &str, doc_id: DocId, value: Numeric) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push((doc_id, value));
    }

    pub fn values(&self, field: &str) -> &[(DocId, Numeric)] {
        self.fields
            .get(field)
            .map(|column| column.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Docs with at least one value satisfying `predicate`, ascending and unique.
    pub fn matching<F>(&self, field: &str, predicate: F) -> Vec<DocId>
    where
        F: Fn(&Numeric) -> bool,
    {
        let mut docs: Vec<DocId> = self
            .values(field)
            .iter()
            .filter(|(_, value)| predicate(value))
            .map(|(doc_id, _)| *doc_id)
            .collect();
        docs.dedup();
        docs
    }

    /// Docs whose value lies within the given bounds; `None` is unbounded.
    pub fn range(
        &self,
        field: &str,
        min: Option<&Numeric>,
        max: Option<&Numeric>,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> Vec<DocId> {
        self.matching(field, |value| {
            let above = min.is_none_or(|min| match value.compare(min) {
                Ordering::Greater => true,
                Ordering::Equal => min_inclusive,
                Ordering::Less => false,
            });
            let below = max.is_none_or(|max| match value.compare(max) {
                Ordering::Less => true,
                Ordering::Equal => max_inclusive,
                Ordering::Greater => false,
            });
            above && below
        })
    }

    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn encode<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        let names = self.field_names();
        writer.write_varint(names.len() as u64)?;

        for name in names {
            let column = &self.fields[name];
            writer.write_string(name)?;
            writer.write_varint(column.len() as u64)?;

            let mut prev_doc_id = 0;
            for (doc_id, value) in column {
                writer.write_varint(doc_id - prev_doc_id)?;
                prev_doc_id = *doc_id;
                match value {
                    Numeric::Integer(v) => {
                        writer.write_u8(0)?;
                        writer.write_signed_varint(*v)?;
                    }
                    Numeric::Float(v) => {
                        writer.write_u8(1)?;
                        writer.write_f64(*v)?;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let field_count = reader.read_len()?;
        let mut fields = AHashMap::with_capacity(field_count);

        for _ in 0..field_count {
            let name = reader.read_string()?;
            let count = reader.read_len()?;
            let mut column = Vec::with_capacity(count);

            let mut prev_doc_id: DocId = 0;
            for _ in 0..count {
                let doc_id = prev_doc_id
                    .checked_add(reader.read_varint()?)
                    .ok_or_else(|| LucernaError::corrupt("doc id overflow in doc values"))?;
                prev_doc_id = doc_id;
                let value = match reader.read_u8()? {
                    0 => Numeric::Integer(reader.read_signed_varint()?),
                    1 => Numeric::Float(reader.read_f64()?),
                    tag => {
                        return Err(LucernaError::corrupt(format!(
                            "unknown numeric tag {tag}"
                        )));
                    }
                };
                column.push((doc_id, value));
            }
            fields.insert(name, column);
        }

        Ok(DocValues { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    fn ids() -> DocValues {
        let mut values = DocValues::new();
        for i in 1..=100i64 {
            values.add("id", i as DocId, Numeric::Integer(i));
        }
        values
    }

    #[test]
    fn test_inclusive_and_exclusive_bounds() {
        let values = ids();
        let min = Some(&Numeric::Integer(20));
        let max = Some(&Numeric::Integer(40));

        assert_eq!(values.range("id", min, max, true, true).len(), 21);
        assert_eq!(values.range("id", min, max, false, false).len(), 19);
        assert_eq!(values.range("id", min, max, true, false).len(), 20);
        assert_eq!(values.range("id", min, min, true, true), vec![20]);
        assert!(values.range("id", min, min, false, true).is_empty());
        assert!(values.range("price", min, max, true, true).is_empty());
    }

    #[test]
    fn test_mixed_numeric_bounds() {
        let values = ids();
        let docs = values.range(
            "id",
            Some(&Numeric::Float(9.5)),
            Some(&Numeric::Integer(11)),
            true,
            true,
        );
        assert_eq!(docs, vec![10, 11]);

        let open = values.range("id", None, Some(&Numeric::Integer(3)), true, false);
        assert_eq!(open, vec![1, 2]);
    }

    #[test]
    fn test_large_integers_against_float_bounds() {
        let mut values = DocValues::new();
        values.add("n", 1, Numeric::Integer(9_007_199_254_740_992));
        values.add("n", 2, Numeric::Integer(9_007_199_254_740_993));

        let above = values.range("n", Some(&Numeric::Float(9_007_199_254_740_992.0)), None, false, true);
        assert_eq!(above, vec![2]);
    }

    #[test]
    fn test_multi_valued_doc_matches_once() {
        let mut values = DocValues::new();
        values.add("size", 1, Numeric::Integer(5));
        values.add("size", 1, Numeric::Integer(6));
        values.add("size", 2, Numeric::Integer(50));

        let docs = values.range(
            "size",
            Some(&Numeric::Integer(0)),
            Some(&Numeric::Integer(10)),
            true,
            true,
        );
        assert_eq!(docs, vec![1]);
    }

    #[test]
    fn test_encode_decode() {
        let mut values = ids();
        values.add("price", 3, Numeric::Float(-1.25));

        let storage = MemoryStorage::default();
        let mut writer = StructWriter::new(storage.create_output("dv.bin").unwrap());
        values.encode(&mut writer).unwrap();
        writer.close().unwrap();

        let mut reader = StructReader::new(storage.open_input("dv.bin").unwrap()).unwrap();
        let decoded = DocValues::decode(&mut reader).unwrap();

        assert_eq!(decoded.values("id"), values.values("id"));
        assert_eq!(decoded.values("price"), &[(3, Numeric::Float(-1.25))]);
    }
}
