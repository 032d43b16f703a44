//! Where timestamps come from: arguments, a file, or stdin.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use time_grain_detector::TimestampLike;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// One timestamp per non-blank line.
    Lines,
    /// A JSON array of timestamp strings and epoch-millisecond integers.
    Json,
}

/// A point as read from the command line or a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Point {
    Text(String),
    Millis(i64),
}

impl Point {
    pub fn as_timestamp(&self) -> TimestampLike<'_> {
        match self {
            Point::Text(s) => TimestampLike::Text(s),
            Point::Millis(ms) => TimestampLike::EpochMillis(*ms),
        }
    }
}

/// Read the source document: `path` if given, stdin otherwise.
pub fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn parse_document(source: &str, format: InputFormat) -> Result<Vec<Point>> {
    match format {
        InputFormat::Lines => Ok(source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Point::Text(line.to_string()))
            .collect()),
        InputFormat::Json => serde_json::from_str(source)
            .context("expected a JSON array of timestamp strings or epoch milliseconds"),
    }
}
