//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::args::{LucernaArgs, OutputFormat};
use crate::document::document::Document;
use crate::document::field::{FieldValue, Numeric};
use crate::index::DocId;

/// A command result that can be printed for people or as JSON.
pub trait Report: Serialize {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Summary of an `index` run.
#[derive(Debug, Serialize)]
pub struct IndexingSummary {
    pub path: String,
    pub documents_added: usize,
    pub skipped_lines: usize,
    pub first_doc_id: Option<DocId>,
    pub last_doc_id: Option<DocId>,
    pub generation: u64,
    pub total_documents: u64,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// One search hit.
#[derive(Debug, Serialize)]
pub struct HitOutput {
    pub doc_id: DocId,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}

/// Result of a `search` run.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub total_hits: u64,
    pub max_score: f32,
    pub duration_ms: u64,
    pub hits: Vec<HitOutput>,
}

/// Result of a `get` run.
#[derive(Debug, Serialize)]
pub struct DocumentsOutput {
    pub documents: Vec<StoredDocument>,
    pub missing: Vec<DocId>,
}

#[derive(Debug, Serialize)]
pub struct StoredDocument {
    pub doc_id: DocId,
    pub fields: Value,
}

/// Index statistics.
#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub path: String,
    pub generation: u64,
    pub total_documents: u64,
    pub next_doc_id: DocId,
    pub unique_terms: usize,
    pub total_postings: usize,
    pub fields: Vec<String>,
    pub index_size_bytes: u64,
}

impl Report for IndexingSummary {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Indexed {} documents into {}", self.documents_added, self.path)?;
        if let (Some(first), Some(last)) = (self.first_doc_id, self.last_doc_id) {
            writeln!(out, "Doc ids: {first}..={last}")?;
        }
        if self.skipped_lines > 0 {
            writeln!(out, "Skipped lines: {}", self.skipped_lines)?;
        }
        writeln!(out, "Generation: {}", self.generation)?;
        writeln!(out, "Total documents: {}", self.total_documents)?;
        writeln!(
            out,
            "Time: {}ms ({:.1} docs/s)",
            self.duration_ms, self.docs_per_second
        )
    }
}

impl Report for SearchOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Query: {}", self.query)?;
        writeln!(
            out,
            "Found {} hits in {}ms (max score {:.3})",
            self.total_hits, self.duration_ms, self.max_score
        )?;

        for (rank, hit) in self.hits.iter().enumerate() {
            writeln!(out)?;
            writeln!(
                out,
                "{}. doc {} (score {:.3})",
                rank + 1,
                hit.doc_id,
                hit.score
            )?;
            if let Some(Value::Object(fields)) = &hit.document {
                write_fields(out, fields)?;
            }
        }
        Ok(())
    }
}

impl Report for DocumentsOutput {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        for (i, doc) in self.documents.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "doc {}", doc.doc_id)?;
            if let Value::Object(fields) = &doc.fields {
                write_fields(out, fields)?;
            }
        }
        for doc_id in &self.missing {
            writeln!(out, "doc {doc_id}: not found")?;
        }
        Ok(())
    }
}

impl Report for IndexStats {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Index: {}", self.path)?;
        writeln!(out, "Generation: {}", self.generation)?;
        writeln!(out, "Documents: {}", self.total_documents)?;
        writeln!(out, "Next doc id: {}", self.next_doc_id)?;
        writeln!(out, "Unique terms: {}", self.unique_terms)?;
        writeln!(out, "Postings: {}", self.total_postings)?;
        writeln!(out, "Fields: {}", self.fields.join(", "))?;
        writeln!(out, "Size: {}", format_bytes(self.index_size_bytes))
    }
}

/// Print a result in the format selected on the command line.
pub fn output_result<T: Report>(result: &T, args: &LucernaArgs) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, args.output_format, args.pretty)?;
    out.flush()?;
    Ok(())
}

/// Write a result to `out`.
pub fn write_result<T: Report>(
    out: &mut dyn Write,
    result: &T,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human => result.write_human(out)?,
        OutputFormat::Json => {
            let json = if pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Stored fields as a JSON object; repeated fields become arrays.
pub fn document_to_json(document: &Document) -> Value {
    let mut fields = Map::new();
    for field in document.fields() {
        let value = field_value_to_json(field.value());
        match fields.get_mut(field.name()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(field.name().to_string(), value);
            }
        }
    }
    Value::Object(fields)
}

fn field_value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::StoredOnly(text) | FieldValue::Text(text) | FieldValue::Exact(text) => {
            Value::String(text.clone())
        }
        FieldValue::Numeric(Numeric::Integer(v)) => Value::from(*v),
        FieldValue::Numeric(Numeric::Float(v)) => Value::from(*v),
    }
}

fn write_fields(out: &mut dyn Write, fields: &Map<String, Value>) -> io::Result<()> {
    for (name, value) in fields {
        writeln!(out, "  {name}: {}", format_value(value))?;
    }
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(values) => values
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

/// Format bytes into human-readable format.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_document_to_json() {
        let document = Document::builder()
            .add_text("title", "苹果")
            .add_numeric("id", 7)
            .add_numeric("price", 5.5)
            .add_stored("image", "a.jpg")
            .add_stored("image", "b.jpg")
            .build();

        let json = document_to_json(&document);
        assert_eq!(
            json,
            serde_json::json!({
                "title": "苹果",
                "id": 7,
                "price": 5.5,
                "image": ["a.jpg", "b.jpg"],
            })
        );
    }

    #[test]
    fn test_human_search_output() {
        let output = SearchOutput {
            query: "title:苹果".to_string(),
            total_hits: 1,
            max_score: 1.5,
            duration_ms: 2,
            hits: vec![HitOutput {
                doc_id: 3,
                score: 1.5,
                document: Some(serde_json::json!({"title": "苹果"})),
            }],
        };

        let mut buf = Vec::new();
        write_result(&mut buf, &output, OutputFormat::Human, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Found 1 hits"));
        assert!(text.contains("1. doc 3 (score 1.500)"));
        assert!(text.contains("  title: 苹果"));
    }

    #[test]
    fn test_json_output() {
        let output = DocumentsOutput {
            documents: Vec::new(),
            missing: vec![9],
        };

        let mut buf = Vec::new();
        write_result(&mut buf, &output, OutputFormat::Json, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim(), r#"{"documents":[],"missing":[9]}"#);
    }
}
