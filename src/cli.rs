//! Command line interface for Lucerna.
//!
//! - `index` reads JSON Lines documents into an index directory
//! - `search` runs a query string against the committed generation
//! - `get` prints stored documents by id
//! - `stats` summarizes an index

pub mod args;
pub mod commands;
pub mod output;
