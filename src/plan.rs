//! edit plans for rewriting an archive
//!
//! every mutation is expressed as an ordered list of operations over the
//! original bytes: copy a range, skip a range, or insert new bytes. building
//! the plan only looks at the parsed directory; executing it is the only step
//! that touches streams.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::Range;

use crate::error::{Error, Result};

/// one step of an edit plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOp {
    /// copy source bytes verbatim
    Copy(Range<u64>),
    /// drop source bytes
    Skip(Range<u64>),
    /// write new bytes
    Insert(Vec<u8>),
}

/// ordered edit operations covering a source exactly once
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditPlan {
    ops: Vec<EditOp>,
    source_len: u64,
}

impl EditPlan {
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// length of the source the plan was built against
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    /// number of bytes the plan writes
    pub fn output_len(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                EditOp::Copy(range) => range.end - range.start,
                EditOp::Skip(_) => 0,
                EditOp::Insert(bytes) => bytes.len() as u64,
            })
            .sum()
    }

    /// number of source bytes dropped
    pub fn skipped_len(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                EditOp::Skip(range) => range.end - range.start,
                _ => 0,
            })
            .sum()
    }

    /// execute the plan, reading `src` and writing `dst`
    pub fn apply<R: Read + Seek, W: Write>(&self, src: &mut R, dst: &mut W) -> io::Result<u64> {
        let mut written = 0;
        for op in &self.ops {
            match op {
                EditOp::Copy(range) => {
                    let len = range.end - range.start;
                    src.seek(SeekFrom::Start(range.start))?;
                    let copied = io::copy(&mut (&mut *src).take(len), dst)?;
                    if copied != len {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("source ended inside copy range {:?}", range),
                        ));
                    }
                    written += copied;
                }
                EditOp::Skip(_) => {}
                EditOp::Insert(bytes) => {
                    dst.write_all(bytes)?;
                    written += bytes.len() as u64;
                }
            }
        }
        dst.flush()?;
        Ok(written)
    }
}

/// builds an [`EditPlan`] front to back
#[derive(Debug)]
pub struct PlanBuilder {
    ops: Vec<EditOp>,
    cursor: u64,
    source_len: u64,
}

impl PlanBuilder {
    pub fn new(source_len: u64) -> Self {
        Self {
            ops: vec![],
            cursor: 0,
            source_len,
        }
    }

    /// current source offset
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// copy source bytes up to `end`
    pub fn copy_to(&mut self, end: u64) -> Result<()> {
        let range = self.advance(end)?;
        if !range.is_empty() {
            self.ops.push(EditOp::Copy(range));
        }
        Ok(())
    }

    /// drop source bytes up to `end`
    pub fn skip_to(&mut self, end: u64) -> Result<()> {
        let range = self.advance(end)?;
        if !range.is_empty() {
            self.ops.push(EditOp::Skip(range));
        }
        Ok(())
    }

    /// write new bytes at the current position
    pub fn insert(&mut self, bytes: impl Into<Vec<u8>>) {
        let bytes = bytes.into();
        if !bytes.is_empty() {
            self.ops.push(EditOp::Insert(bytes));
        }
    }

    /// copy whatever remains of the source and return the plan
    pub fn finish(mut self) -> EditPlan {
        let end = self.source_len;
        if self.cursor < end {
            self.ops.push(EditOp::Copy(self.cursor..end));
        }
        EditPlan {
            ops: self.ops,
            source_len: self.source_len,
        }
    }

    fn advance(&mut self, end: u64) -> Result<Range<u64>> {
        if end < self.cursor {
            return Err(Error::InvalidPlan {
                cursor: self.cursor,
                end,
            });
        }
        if end > self.source_len {
            return Err(Error::Truncated {
                what: format!("archive data up to offset {}", end),
            });
        }
        let range = self.cursor..end;
        self.cursor = end;
        Ok(range)
    }
}
