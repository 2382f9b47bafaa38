//! Human-readable output of the demo, one block per step.

use std::io::{self, Write};
use bson::oid::ObjectId;

use crate::sample::{ExampleDocument, SOME_INTEGER, SOME_STRING, SOME_STRING_SLICE};

/// Writes demo results with fixed label text to any sink.
#[derive(Debug)]
pub struct Report<W: Write> {
    out: W,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn inserted_id(&mut self, id: &ObjectId) -> io::Result<()> {
        writeln!(self.out, "{id}")
    }

    pub fn inserted_ids(&mut self, ids: &[ObjectId]) -> io::Result<()> {
        let ids = ids
            .iter()
            .map(|id| id.to_hex())
            .collect::<Vec<_>>();

        writeln!(self.out, "[{}]", ids.join(" "))
    }

    pub fn document(&mut self, document: &ExampleDocument) -> io::Result<()> {
        let id = document
            .id
            .map(|id| id.to_hex())
            .unwrap_or_default();

        writeln!(self.out)?;
        writeln!(self.out, "Item with ID: {id} contains the following:")?;
        writeln!(self.out, "{SOME_STRING}: {}", document.some_string)?;
        writeln!(self.out, "{SOME_INTEGER}: {}", document.some_integer)?;
        writeln!(self.out, "{SOME_STRING_SLICE}: [{}]", document.some_string_slice.join(" "))
    }

    pub fn documents(&mut self, documents: &[ExampleDocument]) -> io::Result<()> {
        for document in documents {
            self.document(document)?;
        }

        Ok(())
    }

    pub fn updated(&mut self, modified: u64) -> io::Result<()> {
        writeln!(self.out, "Number of items updated: {modified}")
    }

    pub fn deleted(&mut self, deleted: u64) -> io::Result<()> {
        writeln!(self.out, "Number of items deleted: {deleted}")
    }
}
