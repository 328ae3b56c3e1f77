//! End-to-end search scenarios over a 100-document index.

use std::collections::BTreeSet;

use lucerna::prelude::*;
use lucerna::query::boolean::BooleanQuery;
use lucerna::query::fuzzy::FuzzyQuery;
use lucerna::query::match_all::MatchAllQuery;
use lucerna::query::range::NumericRangeQuery;
use lucerna::query::term::TermQuery;
use lucerna::query::wildcard::WildcardQuery;
use tempfile::TempDir;

/// Title of the `i`-th product; the token `"{i}G"` makes wildcards selective.
fn product_title(i: i64) -> String {
    format!("{i}我爱爪哇 Apple/苹果 iPhone {i} Plus 5.5屏 移动4G联通电信 2G {i}G 银白")
}

/// Build an index of 100 products with ids 1..=100 and titles for i in 0..100.
fn build_products(dir: &TempDir) -> Result<()> {
    let mut writer = open_writer(dir.path(), OpenMode::Create)?;
    let documents = (0..100i64)
        .map(|i| {
            Document::builder()
                .add_numeric("id", i + 1)
                .add_text("title", product_title(i))
                .add_stored("image", format!("http://img.example.com/{i}.jpg"))
                .add_numeric("status", i % 2)
                .build()
        })
        .collect();
    let ids = writer.add_documents(documents)?;
    assert_eq!(ids.first(), Some(&1));
    assert_eq!(ids.last(), Some(&100));
    writer.close()
}

fn doc_ids(reader: &IndexReader, query: impl Into<Query>) -> BTreeSet<DocId> {
    reader
        .search(&query.into(), 1000)
        .unwrap()
        .hits
        .iter()
        .map(|hit| hit.doc_id)
        .collect()
}

#[test]
fn test_wildcard_matches_tokens_starting_with_nine() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    // "9g" (i = 9, id 10) and "90g".."99g" (ids 91..=100)
    let ids = doc_ids(&reader, WildcardQuery::new("title", "9*g")?);
    let expected: BTreeSet<DocId> = std::iter::once(10).chain(91..=100).collect();
    assert_eq!(ids, expected);

    // Matching is case-insensitive by default
    assert_eq!(doc_ids(&reader, WildcardQuery::new("title", "9*G")?), expected);
    assert!(
        doc_ids(&reader, WildcardQuery::new("title", "9*G")?.case_sensitive(true)?).is_empty()
    );
    Ok(())
}

#[test]
fn test_numeric_range_bounds() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    let inclusive = NumericRangeQuery::new("id", 20, 40, true, true)?;
    let exclusive = NumericRangeQuery::new("id", 20, 40, false, false)?;
    assert_eq!(reader.count(&inclusive.into())?, 21);
    assert_eq!(reader.count(&exclusive.into())?, 19);

    let half_open = NumericRangeQuery::new("id", 95, 100, false, true)?;
    assert_eq!(doc_ids(&reader, half_open), (96..=100).collect::<BTreeSet<_>>());

    let even = NumericRangeQuery::new_inclusive("status", 0, 0)?;
    assert_eq!(reader.count(&even.into())?, 50);
    Ok(())
}

#[test]
fn test_boolean_difference_is_set_difference() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    let range = NumericRangeQuery::new_inclusive("id", 80, 100)?;
    let wildcard = WildcardQuery::new("title", "9*g")?;

    let left = doc_ids(&reader, range.clone());
    let right = doc_ids(&reader, wildcard.clone());
    let query = BooleanQuery::builder()
        .must(range)
        .must_not(wildcard)
        .build()?;

    let expected: BTreeSet<DocId> = left.difference(&right).copied().collect();
    assert_eq!(doc_ids(&reader, query), expected);
    assert_eq!(expected, (80..=90).collect::<BTreeSet<_>>());
    Ok(())
}

#[test]
fn test_boolean_should_and_must() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    let either = BooleanQuery::builder()
        .should(TermQuery::new("title", "5g")?)
        .should(TermQuery::new("title", "7g")?)
        .build()?;
    assert_eq!(doc_ids(&reader, either), BTreeSet::from([6, 8]));

    let both = BooleanQuery::builder()
        .must(TermQuery::new("title", "苹果")?)
        .must(TermQuery::new("title", "42g")?)
        .build()?;
    assert_eq!(doc_ids(&reader, both), BTreeSet::from([43]));

    let everything_but = BooleanQuery::builder()
        .must_not(NumericRangeQuery::new_inclusive("id", 2, 100)?)
        .build()?;
    assert_eq!(doc_ids(&reader, everything_but), BTreeSet::from([1]));
    Ok(())
}

#[test]
fn test_match_all_and_top_n() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    let results = reader.search(&MatchAllQuery::new().into(), 10)?;
    assert_eq!(results.total_hits, 100);
    assert_eq!(results.hits.len(), 10);
    // Equal scores fall back to ascending doc ids
    let ids: Vec<DocId> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());

    let counted = reader.search(&MatchAllQuery::new().into(), 0)?;
    assert_eq!(counted.total_hits, 100);
    assert!(counted.hits.is_empty());
    Ok(())
}

#[test]
fn test_results_are_ranked_by_score() -> Result<()> {
    let dir = TempDir::new()?;
    let mut writer = open_writer(dir.path(), OpenMode::Create)?;
    writer.add_document(Document::builder().add_text("body", "apple").build())?;
    writer.add_document(Document::builder().add_text("body", "apple apple apple").build())?;
    writer.add_document(Document::builder().add_text("body", "pear").build())?;
    writer.close()?;

    let reader = open_reader(dir.path())?;
    let results = reader.search(&TermQuery::new("body", "apple")?.into(), 10)?;
    assert_eq!(results.total_hits, 2);
    assert_eq!(results.hits[0].doc_id, 2);
    assert_eq!(results.hits[1].doc_id, 1);
    assert!(results.hits[0].score > results.hits[1].score);
    assert_eq!(results.max_score, results.hits[0].score);
    Ok(())
}

#[test]
fn test_fuzzy_matches_within_edit_distance() -> Result<()> {
    let dir = TempDir::new()?;
    let mut writer = open_writer(dir.path(), OpenMode::Create)?;
    writer.add_document(Document::builder().add_text("fruit", "apple").build())?;
    writer.add_document(Document::builder().add_text("fruit", "orange").build())?;
    writer.close()?;

    let reader = open_reader(dir.path())?;
    assert_eq!(doc_ids(&reader, FuzzyQuery::new("fruit", "eaple", 2)?), BTreeSet::from([1]));
    assert!(doc_ids(&reader, FuzzyQuery::new("fruit", "eaple", 1)?).is_empty());
    assert!(FuzzyQuery::new("fruit", "eaple", -1).is_err());
    Ok(())
}

#[test]
fn test_fetch_round_trips_stored_fields() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    let document = reader.fetch(43).expect("document 43 exists");
    assert_eq!(document.get_numeric("id"), Some(Numeric::Integer(43)));
    assert_eq!(document.get_str("title"), Some(product_title(42).as_str()));
    assert_eq!(document.get_str("image"), Some("http://img.example.com/42.jpg"));
    assert!(reader.fetch(0).is_none());
    assert!(reader.fetch(101).is_none());

    let results = reader.search_with_documents(&TermQuery::new("title", "42g")?.into(), 1)?;
    let hit = &results.hits[0];
    assert_eq!(hit.doc_id, 43);
    assert_eq!(hit.document.as_ref().and_then(|d| d.get_numeric("status")), Some(Numeric::Integer(0)));
    Ok(())
}

#[test]
fn test_repeated_searches_are_identical() -> Result<()> {
    let dir = TempDir::new()?;
    build_products(&dir)?;
    let reader = open_reader(dir.path())?;

    let query: Query = BooleanQuery::builder()
        .should(WildcardQuery::new("title", "9*g")?)
        .should(FuzzyQuery::new("title", "iphine", 1)?)
        .build()?
        .into();
    let first = reader.search(&query, 20)?;
    let second = reader.search(&query, 20)?;
    assert_eq!(first.total_hits, second.total_hits);
    let scores = |r: &SearchResults| -> Vec<(DocId, f32)> {
        r.hits.iter().map(|h| (h.doc_id, h.score)).collect()
    };
    assert_eq!(scores(&first), scores(&second));
    Ok(())
}

#[test]
fn test_fuzzy_keeps_every_term_within_distance() -> Result<()> {
    let dir = TempDir::new()?;
    let mut writer = open_writer(dir.path(), OpenMode::Create)?;
    for i in 0..100 {
        writer.add_document(Document::builder().add_exact("t", format!("{i}g")).build())?;
    }
    writer.close()?;

    let reader = open_reader(dir.path())?;
    let results = reader.search(&FuzzyQuery::new("t", "5g", 2)?.into(), 1000)?;
    assert_eq!(results.total_hits, 100);
    assert_eq!(results.hits[0].doc_id, 6);

    let capped = FuzzyQuery::new("t", "5g", 2)?.max_expansions(10)?;
    assert_eq!(reader.count(&capped.into())?, 10);
    Ok(())
}
