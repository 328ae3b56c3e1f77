//! The inverted index: field → term → posting list.
//!
//! Each field has its own vocabulary, kept in a `BTreeMap` so that wildcard
//! and fuzzy expansion walk terms in a stable (lexicographic) order.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::DocId;
use crate::index::posting::{Posting, PostingList};
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// A term: an indexed token within a specific field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

type Vocabulary = BTreeMap<String, PostingList>;

/// Term dictionary and postings for every indexed field.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    fields: AHashMap<String, Vocabulary>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Record that `text` occurs in `field` of `doc_id`.
    pub fn add(
        &mut self,
        field: &str,
        text: &str,
        doc_id: DocId,
        frequency: u32,
        positions: Option<Vec<u32>>,
    ) {
        let posting = match positions {
            Some(positions) => Posting::with_positions(doc_id, positions),
            None => Posting::with_frequency(doc_id, frequency),
        };

        let vocabulary = self.fields.entry(field.to_string()).or_default();

        match vocabulary.get_mut(text) {
            Some(list) => list.add_posting(posting),
            None => {
                let mut list = PostingList::new();
                list.add_posting(posting);
                vocabulary.insert(text.to_string(), list);
            }
        }
    }

    pub fn postings(&self, term: &Term) -> Option<&PostingList> {
        self.fields.get(&term.field)?.get(&term.text)
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self, term: &Term) -> u64 {
        self.postings(term).map_or(0, |list| list.doc_frequency())
    }

    /// The field's vocabulary in lexicographic order.
    pub fn terms<'a>(
        &'a self,
        field: &str,
    ) -> impl Iterator<Item = (&'a str, &'a PostingList)> + use<'a> {
        self.fields
            .get(field)
            .into_iter()
            .flat_map(|vocabulary| vocabulary.iter().map(|(t, l)| (t.as_str(), l)))
    }

    /// Terms of the field starting with `prefix`, in order.
    pub fn terms_with_prefix<'a>(
        &'a self,
        field: &str,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a PostingList)> + use<'a> {
        self.fields.get(field).into_iter().flat_map(move |vocabulary| {
            vocabulary
                .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(move |(t, _)| t.starts_with(prefix))
                .map(|(t, l)| (t.as_str(), l))
        })
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Indexed field names, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of distinct (field, term) pairs.
    pub fn term_count(&self) -> usize {
        self.fields.values().map(|v| v.len()).sum()
    }

    /// Number of postings across all terms.
    pub fn posting_count(&self) -> usize {
        self.fields
            .values()
            .flat_map(|v| v.values())
            .map(|list| list.len())
            .sum()
    }

    pub fn encode<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        let names = self.field_names();
        writer.write_varint(names.len() as u64)?;

        for name in names {
            writer.write_string(name)?;
            let vocabulary = &self.fields[name];
            writer.write_varint(vocabulary.len() as u64)?;
            for (text, list) in vocabulary {
                writer.write_string(text)?;
                list.encode(writer)?;
            }
        }

        Ok(())
    }

    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let field_count = reader.read_len()?;
        let mut fields = AHashMap::with_capacity(field_count);

        for _ in 0..field_count {
            let name = reader.read_string()?;
            let term_count = reader.read_len()?;
            let mut vocabulary = Vocabulary::new();
            for _ in 0..term_count {
                let text = reader.read_string()?;
                let list = PostingList::decode(reader)?;
                vocabulary.insert(text, list);
            }
            fields.insert(name, vocabulary);
        }

        Ok(InvertedIndex { fields })
    }
}
