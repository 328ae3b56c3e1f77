//! Writer modes, commit visibility, locking and corruption detection.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use lucerna::prelude::*;
use lucerna::query::match_all::MatchAllQuery;
use lucerna::query::term::TermQuery;
use tempfile::TempDir;

fn doc(id: i64, title: &str) -> Document {
    Document::builder()
        .add_numeric("id", id)
        .add_text("title", title)
        .build()
}

fn index_titles(dir: &TempDir, mode: OpenMode, titles: &[&str]) -> Result<Vec<DocId>> {
    let mut writer = open_writer(dir.path(), mode)?;
    let mut ids = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        ids.push(writer.add_document(doc(i as i64, title))?);
    }
    writer.close()?;
    Ok(ids)
}

fn count_all(reader: &IndexReader) -> u64 {
    reader.count(&MatchAllQuery::new().into()).unwrap()
}

#[test]
fn test_append_continues_doc_ids() -> Result<()> {
    let dir = TempDir::new()?;
    assert_eq!(index_titles(&dir, OpenMode::Create, &["apple", "pear"])?, vec![1, 2]);
    assert_eq!(index_titles(&dir, OpenMode::Append, &["plum"])?, vec![3]);

    let reader = open_reader(dir.path())?;
    assert_eq!(reader.num_docs(), 3);
    assert_eq!(reader.max_doc(), 4);
    assert_eq!(reader.count(&TermQuery::new("title", "apple")?.into())?, 1);
    assert_eq!(reader.count(&TermQuery::new("title", "plum")?.into())?, 1);
    Ok(())
}

#[test]
fn test_create_replaces_index() -> Result<()> {
    let dir = TempDir::new()?;
    index_titles(&dir, OpenMode::Create, &["apple", "pear"])?;
    assert_eq!(index_titles(&dir, OpenMode::Create, &["plum"])?, vec![1]);

    let reader = open_reader(dir.path())?;
    assert_eq!(count_all(&reader), 1);
    assert_eq!(reader.count(&TermQuery::new("title", "apple")?.into())?, 0);
    Ok(())
}

#[test]
fn test_append_requires_existing_index() -> Result<()> {
    let dir = TempDir::new()?;
    let err = open_writer(dir.path(), OpenMode::Append).unwrap_err();
    assert!(matches!(err, LucernaError::IllegalState(_)));

    assert_eq!(index_titles(&dir, OpenMode::CreateOrAppend, &["apple"])?, vec![1]);
    assert_eq!(index_titles(&dir, OpenMode::CreateOrAppend, &["pear"])?, vec![2]);
    Ok(())
}

#[test]
fn test_reader_requires_commit() -> Result<()> {
    let dir = TempDir::new()?;
    let err = open_reader(dir.path()).unwrap_err();
    assert!(matches!(err, LucernaError::IllegalState(_)));

    let missing = dir.path().join("missing");
    let err = open_reader(&missing).unwrap_err();
    assert!(matches!(err, LucernaError::IllegalState(_)));
    assert!(!missing.exists());
    Ok(())
}

#[test]
fn test_readers_see_a_snapshot_until_reopened() -> Result<()> {
    let dir = TempDir::new()?;
    index_titles(&dir, OpenMode::Create, &["apple"])?;
    let reader = open_reader(dir.path())?;
    assert!(reader.reopen()?.is_none());

    let mut writer = open_writer(dir.path(), OpenMode::Append)?;
    writer.add_document(doc(2, "apple pie"))?;
    assert_eq!(count_all(&reader), 1);

    writer.commit()?;
    assert_eq!(count_all(&reader), 1);

    let reopened = reader.reopen()?.expect("a newer generation was committed");
    assert_eq!(count_all(&reopened), 2);
    assert_eq!(reopened.generation(), reader.generation() + 1);

    writer.close()?;
    Ok(())
}

#[test]
fn test_single_writer_lock() -> Result<()> {
    let dir = TempDir::new()?;
    let writer = open_writer(dir.path(), OpenMode::Create)?;

    let err = open_writer(dir.path(), OpenMode::CreateOrAppend).unwrap_err();
    assert!(matches!(err, LucernaError::IllegalState(_)));

    drop(writer);
    let mut writer = open_writer(dir.path(), OpenMode::CreateOrAppend)?;
    writer.close()?;
    Ok(())
}

#[test]
fn test_dropped_writer_publishes_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    index_titles(&dir, OpenMode::Create, &["apple"])?;

    {
        let mut writer = open_writer(dir.path(), OpenMode::Create)?;
        writer.add_document(doc(1, "pear"))?;
        writer.add_document(doc(2, "plum"))?;
    }

    let reader = open_reader(dir.path())?;
    assert_eq!(count_all(&reader), 1);
    assert_eq!(reader.count(&TermQuery::new("title", "apple")?.into())?, 1);
    Ok(())
}

#[test]
fn test_rollback_discards_pending_documents() -> Result<()> {
    let dir = TempDir::new()?;
    index_titles(&dir, OpenMode::Create, &["apple"])?;

    let mut writer = open_writer(dir.path(), OpenMode::Append)?;
    writer.add_document(doc(2, "pear"))?;
    writer.rollback()?;
    assert!(writer.add_document(doc(3, "plum")).is_err());

    let reader = open_reader(dir.path())?;
    assert_eq!(count_all(&reader), 1);
    assert_eq!(index_titles(&dir, OpenMode::Append, &["fig"])?, vec![2]);
    Ok(())
}

#[test]
fn test_old_generations_are_cleaned_up() -> Result<()> {
    let dir = TempDir::new()?;
    for title in ["apple", "pear", "plum", "fig"] {
        index_titles(&dir, OpenMode::CreateOrAppend, &[title])?;
    }

    let mut generations: Vec<String> = fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("gen_"))
        .collect();
    generations.sort();
    assert_eq!(generations, vec!["gen_000003.idx", "gen_000004.idx"]);
    assert_eq!(count_all(&open_reader(dir.path())?), 4);
    Ok(())
}

#[test]
fn test_corrupted_generation_is_detected() -> Result<()> {
    let dir = TempDir::new()?;
    index_titles(&dir, OpenMode::Create, &["apple", "pear"])?;

    let path = dir.path().join("gen_000001.idx");
    let mut bytes = fs::read(&path)?;
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xff;
    fs::write(&path, bytes)?;

    let err = open_reader(dir.path()).unwrap_err();
    assert!(matches!(err, LucernaError::Corrupt(_)), "unexpected error: {err}");
    Ok(())
}

#[test]
fn test_concurrent_readers_during_commits() -> Result<()> {
    let dir = TempDir::new()?;
    index_titles(&dir, OpenMode::Create, &["apple"])?;

    // Every commit adds one document, so a consistent snapshot holds exactly
    // as many documents as its generation number.
    let shared = open_reader(dir.path())?;
    let done = AtomicBool::new(false);

    thread::scope(|scope| -> Result<()> {
        let readers: Vec<_> = (0..8)
            .map(|_| {
                let (dir, shared, done) = (&dir, &shared, &done);
                scope.spawn(move || -> Result<usize> {
                    let mut searches = 0;
                    while !done.load(Ordering::Acquire) || searches < 20 {
                        let reader = open_reader(dir.path())?;
                        let hits = reader.count(&MatchAllQuery::new().into())?;
                        assert_eq!(hits, reader.generation());
                        assert_eq!(hits, reader.num_docs());
                        assert_eq!(reader.count(&TermQuery::new("title", "apple")?.into())?, 1);

                        assert_eq!(count_all(shared), 1);
                        searches += 1;
                    }
                    Ok(searches)
                })
            })
            .collect();

        let written = (|| -> Result<()> {
            let mut writer = open_writer(dir.path(), OpenMode::Append)?;
            for i in 0..50 {
                writer.add_document(doc(i + 2, "pear"))?;
                writer.commit()?;
            }
            writer.close()
        })();
        done.store(true, Ordering::Release);

        for handle in readers {
            let searches = handle.join().expect("reader thread panicked")?;
            assert!(searches >= 20);
        }
        written
    })?;

    let reader = open_reader(dir.path())?;
    assert_eq!(reader.generation(), 51);
    assert_eq!(count_all(&reader), 51);
    Ok(())
}
