//! Command implementations for the Lucerna CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashSet;
use anyhow::{Context, bail};
use log::{info, warn};
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::document::document::Document;
use crate::document::field::{Field, Numeric};
use crate::index::writer::{IndexWriter, IndexWriterConfig};
use crate::index::{DocId, IndexReader, open_reader};
use crate::query::parser::{Operator, QueryParser};
use crate::storage::file::FileStorage;

/// Execute a CLI command.
pub fn execute_command(args: LucernaArgs) -> anyhow::Result<()> {
    match &args.command {
        Command::Index(index_args) => index_documents(index_args, &args),
        Command::Search(search_args) => search_index(search_args, &args),
        Command::Get(get_args) => get_documents(get_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

/// How JSON values map to field kinds.
#[derive(Debug, Default, Clone)]
pub struct FieldKinds {
    exact: AHashSet<String>,
    stored_only: AHashSet<String>,
}

impl FieldKinds {
    pub fn new(exact: &[String], stored_only: &[String]) -> Self {
        FieldKinds {
            exact: exact.iter().cloned().collect(),
            stored_only: stored_only.iter().cloned().collect(),
        }
    }

    fn field(&self, name: &str, value: &Value) -> anyhow::Result<Option<Field>> {
        let field = match value {
            Value::Null => return Ok(None),
            _ if self.stored_only.contains(name) => Field::stored_only(name, scalar_text(value)?),
            Value::String(text) if self.exact.contains(name) => Field::exact(name, text.as_str()),
            Value::String(text) => Field::text(name, text.as_str()),
            Value::Bool(flag) => Field::exact(name, flag.to_string()),
            Value::Number(number) => match number.as_i64() {
                Some(v) => Field::numeric(name, v),
                None => match number.as_f64() {
                    Some(v) => Field::numeric(name, Numeric::Float(v)),
                    None => bail!("field '{name}' holds an unsupported number {number}"),
                },
            },
            Value::Array(_) | Value::Object(_) => {
                bail!("field '{name}' must hold a scalar value")
            }
        };
        Ok(Some(field))
    }
}

fn scalar_text(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
        _ => bail!("expected a scalar value, got {value}"),
    }
}

/// Build a document from one JSON object; arrays add one field per element.
pub fn json_to_document(value: &Value, kinds: &FieldKinds) -> anyhow::Result<Document> {
    let Value::Object(object) = value else {
        bail!("each line must be a JSON object");
    };

    let mut document = Document::new();
    for (name, value) in object {
        match value {
            Value::Array(values) => {
                for element in values {
                    if let Some(field) = kinds.field(name, element)? {
                        document.add_field(field);
                    }
                }
            }
            _ => {
                if let Some(field) = kinds.field(name, value)? {
                    document.add_field(field);
                }
            }
        }
    }
    Ok(document)
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Add JSON Lines documents to an index.
fn index_documents(args: &IndexArgs, cli_args: &LucernaArgs) -> anyhow::Result<()> {
    let index_path = &args.location.index_path;
    let start = Instant::now();

    let storage = FileStorage::open(index_path)
        .with_context(|| format!("failed to open index directory {}", index_path.display()))?;
    let config = IndexWriterConfig {
        open_mode: args.mode.into(),
        analyzer: args.analyzer.build(),
        ..IndexWriterConfig::default()
    };
    let mut writer = IndexWriter::open(Arc::new(storage), config)
        .with_context(|| format!("failed to open writer on {}", index_path.display()))?;

    let kinds = FieldKinds::new(&args.exact_fields, &args.stored_only_fields);
    let batch_size = args.batch_size.max(1);
    let mut batch: Vec<Document> = Vec::with_capacity(batch_size);
    let mut ids: Vec<DocId> = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in open_input(&args.document_file)?.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Value>(&line)
            .map_err(anyhow::Error::from)
            .and_then(|value| json_to_document(&value, &kinds));
        match parsed {
            Ok(document) => batch.push(document),
            Err(e) if args.skip_invalid => {
                warn!("skipping line {}: {e:#}", line_no + 1);
                skipped += 1;
            }
            Err(e) => return Err(e.context(format!("invalid document on line {}", line_no + 1))),
        }

        if batch.len() >= batch_size {
            ids.extend(writer.add_documents(std::mem::take(&mut batch))?);
            info!("added {} documents", ids.len());
        }
    }
    if !batch.is_empty() {
        ids.extend(writer.add_documents(batch)?);
    }

    writer.close().context("failed to commit the index")?;

    let elapsed = start.elapsed();
    let summary = IndexingSummary {
        path: index_path.display().to_string(),
        documents_added: ids.len(),
        skipped_lines: skipped,
        first_doc_id: ids.first().copied(),
        last_doc_id: ids.last().copied(),
        generation: writer.generation(),
        total_documents: writer.num_docs(),
        duration_ms: elapsed.as_millis() as u64,
        docs_per_second: ids.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    };
    output_result(&summary, cli_args)
}

fn open_index(path: &Path) -> anyhow::Result<IndexReader> {
    open_reader(path).with_context(|| format!("failed to open index {}", path.display()))
}

/// Search an index.
fn search_index(args: &SearchArgs, cli_args: &LucernaArgs) -> anyhow::Result<()> {
    let reader = open_index(&args.location.index_path)?;

    let operator = if args.and { Operator::And } else { Operator::Or };
    let parser = QueryParser::new(args.field.as_str(), args.analyzer.build())
        .with_default_operator(operator);
    let query = parser
        .parse(&args.query)
        .with_context(|| format!("failed to parse query '{}'", args.query))?;

    let start = Instant::now();
    let results = if args.show_documents {
        reader.search_with_documents(&query, args.limit)?
    } else {
        reader.search(&query, args.limit)?
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    let output = SearchOutput {
        query: query.to_string(),
        total_hits: results.total_hits,
        max_score: results.max_score,
        duration_ms,
        hits: results
            .hits
            .iter()
            .map(|hit| HitOutput {
                doc_id: hit.doc_id,
                score: hit.score,
                document: hit.document.as_ref().map(document_to_json),
            })
            .collect(),
    };
    output_result(&output, cli_args)
}

/// Print stored documents.
fn get_documents(args: &GetArgs, cli_args: &LucernaArgs) -> anyhow::Result<()> {
    let reader = open_index(&args.location.index_path)?;

    let mut output = DocumentsOutput {
        documents: Vec::new(),
        missing: Vec::new(),
    };
    for &doc_id in &args.doc_ids {
        match reader.fetch(doc_id) {
            Some(document) => output.documents.push(StoredDocument {
                doc_id,
                fields: document_to_json(&document),
            }),
            None => output.missing.push(doc_id),
        }
    }
    output_result(&output, cli_args)
}

/// Show index statistics.
fn show_stats(args: &StatsArgs, cli_args: &LucernaArgs) -> anyhow::Result<()> {
    let reader = open_index(&args.location.index_path)?;
    let storage = reader.storage();

    let mut index_size_bytes = 0;
    for name in storage.list_files()? {
        index_size_bytes += storage.file_size(&name)?;
    }

    let inverted = reader.segment().inverted();
    let stats = IndexStats {
        path: args.location.index_path.display().to_string(),
        generation: reader.generation(),
        total_documents: reader.num_docs(),
        next_doc_id: reader.max_doc(),
        unique_terms: inverted.term_count(),
        total_postings: inverted.posting_count(),
        fields: reader.field_names(),
        index_size_bytes,
    };
    output_result(&stats, cli_args)
}
