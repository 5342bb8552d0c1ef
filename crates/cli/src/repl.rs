//! Interactive question loop.

use crate::render;
use policy_core::Session;
use std::io::{BufRead, Write};
use tracing::error;

pub const PROMPT: &str = "Ask a question (or 'exit'): ";
pub const EXIT: &str = "exit";

/// Reads questions from `input` until `exit` or end of input. A failed
/// question is reported and the loop keeps going.
pub async fn run<R: BufRead, W: Write>(
    session: &Session,
    mut input: R,
    out: &mut W,
    json: bool,
) -> anyhow::Result<()> {
    let mut line = String::new();
    loop {
        if !json {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.eq_ignore_ascii_case(EXIT) {
            break;
        }
        match session.ask(question).await {
            Ok(outcome) => render::write_outcome(out, &outcome, json)?,
            Err(e) => {
                error!(error = %e, "question failed");
                writeln!(out, "Error: {}", e)?;
            }
        }
    }
    Ok(())
}
