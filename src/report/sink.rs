// src/report/sink.rs

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::report::ReportLine;

/// Destination of the report stream.
pub trait ReportSink: Send {
    fn emit(&mut self, line: &ReportLine) -> Result<()>;

    fn emit_all(&mut self, lines: &[ReportLine]) -> Result<()> {
        for line in lines {
            self.emit(line)?;
        }
        Ok(())
    }
}

/// Writes one protocol line per event and flushes after each, so a
/// consumer reading a pipe sees events as they happen.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ReportSink for WriterSink<W> {
    fn emit(&mut self, line: &ReportLine) -> Result<()> {
        writeln!(self.out, "{line}").context("writing report line")?;
        self.out.flush().context("flushing report stream")
    }
}
