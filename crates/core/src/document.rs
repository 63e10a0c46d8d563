//! Rows ingested into the vector collection.

use serde::Serialize;

/// One ingested table row: its joined text and the embedding of that text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub text: String,
    pub embedding: Vec<f32>,
}

impl DocumentRow {
    #[must_use]
    pub fn new(text: String, embedding: Vec<f32>) -> Self {
        Self { text, embedding }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// Join the string form of every column, space-separated.
///
/// Empty cells are kept as empty strings so column positions stay visible.
#[must_use]
pub fn row_text<S: AsRef<str>>(fields: &[S]) -> String {
    fields.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}
