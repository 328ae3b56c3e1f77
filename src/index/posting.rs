//! Postings and posting lists.
//!
//! A [`PostingList`] holds, for one term, the documents containing it with
//! their in-document frequency and (optionally) token positions. Postings are
//! kept sorted by doc id and each doc id appears at most once; adding a
//! posting for a doc that is already present merges the two.

use crate::error::{LucernaError, Result};
use crate::index::DocId;
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// A single occurrence record of a term in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
    pub positions: Option<Vec<u32>>,
}

impl Posting {
    pub fn new(doc_id: DocId) -> Self {
        Posting {
            doc_id,
            frequency: 1,
            positions: None,
        }
    }

    pub fn with_frequency(doc_id: DocId, frequency: u32) -> Self {
        Posting {
            doc_id,
            frequency,
            positions: None,
        }
    }

    /// Posting whose frequency is the number of positions.
    pub fn with_positions(doc_id: DocId, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            frequency: positions.len() as u32,
            positions: Some(positions),
        }
    }

    pub fn positions(&self) -> Option<&[u32]> {
        self.positions.as_deref()
    }
}

/// Postings of one term, sorted by doc id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingList {
    postings: Vec<Posting>,
    total_frequency: u64,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Add a posting, merging with an existing posting for the same doc.
    pub fn add_posting(&mut self, posting: Posting) {
        self.total_frequency += posting.frequency as u64;

        // Doc ids arrive in ascending order while indexing; check the tail first.
        let pos = match self.postings.last() {
            Some(last) if last.doc_id < posting.doc_id => Err(self.postings.len()),
            None => Err(0),
            _ => self
                .postings
                .binary_search_by_key(&posting.doc_id, |p| p.doc_id),
        };

        match pos {
            Ok(pos) => {
                let existing = &mut self.postings[pos];
                existing.frequency += posting.frequency;
                if let Some(new_positions) = posting.positions {
                    match &mut existing.positions {
                        Some(positions) => {
                            positions.extend(new_positions);
                            positions.sort_unstable();
                        }
                        None => existing.positions = Some(new_positions),
                    }
                }
            }
            Err(pos) => self.postings.insert(pos, posting),
        }
    }

    /// Number of documents containing the term.
    pub fn doc_frequency(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Sum of the term's frequencies over all documents.
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    pub fn get(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|i| &self.postings[i])
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Write the list with delta-compressed doc ids and positions.
    pub fn encode<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.postings.len() as u64)?;

        let mut prev_doc_id = 0;
        for posting in &self.postings {
            writer.write_varint(posting.doc_id - prev_doc_id)?;
            prev_doc_id = posting.doc_id;

            writer.write_varint(posting.frequency as u64)?;

            match &posting.positions {
                Some(positions) => {
                    writer.write_u8(1)?;
                    writer.write_delta_compressed_u32s(positions)?;
                }
                None => writer.write_u8(0)?,
            }
        }

        Ok(())
    }

    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let count = reader.read_len()?;
        let mut postings = Vec::with_capacity(count);
        let mut total_frequency = 0u64;

        let mut prev_doc_id: DocId = 0;
        for i in 0..count {
            let delta = reader.read_varint()?;
            if i > 0 && delta == 0 {
                return Err(LucernaError::corrupt("duplicate doc id in posting list"));
            }
            let doc_id = prev_doc_id
                .checked_add(delta)
                .ok_or_else(|| LucernaError::corrupt("doc id overflow in posting list"))?;
            prev_doc_id = doc_id;

            let frequency = u32::try_from(reader.read_varint()?)
                .map_err(|_| LucernaError::corrupt("term frequency overflows u32"))?;
            if frequency == 0 {
                return Err(LucernaError::corrupt("zero term frequency"));
            }
            total_frequency += frequency as u64;

            let positions = match reader.read_u8()? {
                0 => None,
                1 => Some(reader.read_delta_compressed_u32s()?),
                flag => {
                    return Err(LucernaError::corrupt(format!(
                        "invalid positions flag {flag}"
                    )));
                }
            };

            postings.push(Posting {
                doc_id,
                frequency,
                positions,
            });
        }

        Ok(PostingList {
            postings,
            total_frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_postings_stay_sorted_and_unique() {
        let mut list = PostingList::new();
        list.add_posting(Posting::with_frequency(5, 1));
        list.add_posting(Posting::with_frequency(2, 3));
        list.add_posting(Posting::with_frequency(9, 1));
        list.add_posting(Posting::with_frequency(5, 2));

        let ids: Vec<DocId> = list.iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert_eq!(list.doc_frequency(), 3);
        assert_eq!(list.total_frequency(), 7);
        assert_eq!(list.get(5).unwrap().frequency, 3);
        assert!(list.get(4).is_none());
    }

    #[test]
    fn test_merge_positions() {
        let mut list = PostingList::new();
        list.add_posting(Posting::with_positions(1, vec![4, 8]));
        list.add_posting(Posting::with_positions(1, vec![2]));

        let posting = list.get(1).unwrap();
        assert_eq!(posting.frequency, 3);
        assert_eq!(posting.positions(), Some(&[2, 4, 8][..]));
    }

    #[test]
    fn test_encode_decode() {
        let mut list = PostingList::new();
        list.add_posting(Posting::with_positions(1, vec![0, 7]));
        list.add_posting(Posting::with_frequency(300, 2));
        list.add_posting(Posting::new(100_000));

        let storage = MemoryStorage::default();
        let mut writer = StructWriter::new(storage.create_output("p.bin").unwrap());
        list.encode(&mut writer).unwrap();
        writer.close().unwrap();

        let mut reader = StructReader::new(storage.open_input("p.bin").unwrap()).unwrap();
        let decoded = PostingList::decode(&mut reader).unwrap();
        assert_eq!(decoded, list);
    }
}
