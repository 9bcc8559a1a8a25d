//! Ready-made presenters.
//!
//! - [`AutoPresenter`]: answers every choice with a closure (simulations, tests)
//! - [`TerminalPresenter`]: prints two cards and reads `1` or `2` from a reader

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::record::Record;

use super::decision::{ChoicePrompt, DecisionPresenter, PresentError};
use super::types::Side;

/// Presenter that resolves each choice immediately with `judge`.
pub struct AutoPresenter<F> {
    judge: F,
}

impl<F> AutoPresenter<F>
where
    F: Fn(&Record, &Record) -> Side + Send + Sync,
{
    pub fn new(judge: F) -> Self {
        Self { judge }
    }
}

#[async_trait::async_trait]
impl<F> DecisionPresenter for AutoPresenter<F>
where
    F: Fn(&Record, &Record) -> Side + Send + Sync,
{
    async fn present(&self, prompt: ChoicePrompt) -> Result<(), PresentError> {
        let side = (self.judge)(&prompt.left, &prompt.right);
        prompt.handle(side).trigger();
        Ok(())
    }
}

/// Interactive presenter for a line-oriented terminal.
///
/// Reads and writes happen on tokio's blocking pool, so a slow or idle
/// terminal never stalls the runtime.
pub struct TerminalPresenter<R, W> {
    io: Arc<Mutex<(R, W)>>,
}

impl<R, W> TerminalPresenter<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Arc::new(Mutex::new((reader, writer))),
        }
    }

    /// Give back the reader and writer. `None` while a prompt is still being read.
    pub fn into_inner(self) -> Option<(R, W)> {
        let io = Arc::try_unwrap(self.io).ok()?;
        Some(io.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Run `f` against the terminal on the blocking pool.
    async fn with_io<T, F>(&self, f: F) -> Result<T, PresentError>
    where
        T: Send + 'static,
        F: FnOnce(&mut R, &mut W) -> Result<T, PresentError> + Send + 'static,
    {
        let io = Arc::clone(&self.io);
        tokio::task::spawn_blocking(move || {
            let mut guard = io
                .lock()
                .map_err(|_| PresentError::Message("terminal presenter lock poisoned".into()))?;
            let (reader, writer) = &mut *guard;
            f(reader, writer)
        })
        .await
        .map_err(|e| PresentError::Message(format!("terminal task failed: {e}")))?
    }
}

/// Print one record as a card: subject first, then its amplifying attributes.
///
/// `key` labels the card when it is one side of a choice.
pub fn write_card(out: &mut impl Write, key: Option<char>, record: &Record) -> std::io::Result<()> {
    let subject = record.subject();
    match key {
        Some(key) => writeln!(out, "  [{key}] {}: {}", subject.name, subject.display_value())?,
        None => writeln!(out, "  {}: {}", subject.name, subject.display_value())?,
    }
    for attr in record.amplifying() {
        writeln!(out, "      {}: {}", attr.name, attr.display_value())?;
    }
    Ok(())
}

fn parse_choice(line: &str) -> Option<Side> {
    match line.trim() {
        "1" | "l" | "L" | "left" => Some(Side::Left),
        "2" | "r" | "R" | "right" => Some(Side::Right),
        _ => None,
    }
}

fn ask<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    heading: &str,
    left: &Record,
    right: &Record,
) -> Result<Side, PresentError> {
    writeln!(writer)?;
    writeln!(writer, "{heading}")?;
    write_card(writer, Some('1'), left)?;
    write_card(writer, Some('2'), right)?;

    loop {
        write!(writer, "Which ranks higher? [1/2]: ")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(PresentError::Message(
                "input closed before a choice was made".into(),
            ));
        }
        match parse_choice(&line) {
            Some(side) => return Ok(side),
            None => {
                warn!(input = %line.trim(), "unrecognised choice");
                writeln!(writer, "Please answer 1 or 2.")?;
            }
        }
    }
}

#[async_trait::async_trait]
impl<R, W> DecisionPresenter for TerminalPresenter<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    async fn present(&self, prompt: ChoicePrompt) -> Result<(), PresentError> {
        let heading = format!(
            "Decision {} of ~{:.0} ({}%)",
            prompt.decisions_made + 1,
            prompt.decisions_estimated,
            prompt.progress().percent()
        );
        let left = prompt.left.clone();
        let right = prompt.right.clone();
        let side = self
            .with_io(move |reader, writer| ask(reader, writer, &heading, &left, &right))
            .await?;

        prompt.handle(side).trigger();
        Ok(())
    }
}
