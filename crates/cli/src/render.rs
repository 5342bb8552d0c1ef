use policy_core::guardrail::Outcome;
use policy_core::IngestReport;
use std::io::{self, Write};

pub const RESPONSE_HEADER: &str = "--- RESPONSE ---";
pub const SOURCES_HEADER: &str = "--- SOURCES ---";
pub const NO_SOURCES: &str = "No related clauses found for this query.";

pub fn write_outcome<W: Write>(out: &mut W, outcome: &Outcome, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, outcome)?;
        return writeln!(out);
    }
    let (body, sources, note): (&str, &[String], Option<&str>) = match outcome {
        Outcome::NotLoaded { message } => return writeln!(out, "{}", message),
        Outcome::Rejected(r) => (r.answer.as_str(), &r.sources[..], Some(r.note.as_str())),
        Outcome::Answered(a) => (a.answer.as_str(), &a.sources[..], None),
    };
    writeln!(out, "{}", RESPONSE_HEADER)?;
    writeln!(out, "{}", body)?;
    if let Some(note) = note {
        writeln!(out, "({})", note)?;
    }
    writeln!(out)?;
    if sources.is_empty() {
        writeln!(out, "{}", NO_SOURCES)?;
    } else {
        writeln!(out, "{}", SOURCES_HEADER)?;
        for source in sources {
            writeln!(out, "{}", source)?;
        }
    }
    writeln!(out)
}

pub fn write_report<W: Write>(out: &mut W, report: &IngestReport, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, report)?;
        return writeln!(out);
    }
    writeln!(
        out,
        "Indexed {} chunks from {} document(s).",
        report.chunks, report.documents
    )?;
    for failure in &report.failures {
        writeln!(out, "Skipped {}: {}", failure.path.display(), failure.reason)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_core::guardrail::{Rejection, REJECTION_MESSAGE};

    fn render(outcome: &Outcome, json: bool) -> String {
        let mut buf = Vec::new();
        write_outcome(&mut buf, outcome, json).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn rejection_prints_no_sources_notice() {
        let text = render(&Outcome::Rejected(Rejection::irrelevant(Some(1.7))), false);
        assert!(text.starts_with(RESPONSE_HEADER));
        assert!(text.contains(REJECTION_MESSAGE));
        assert!(text.contains(NO_SOURCES));
        assert!(!text.contains(SOURCES_HEADER));
    }

    #[test]
    fn not_loaded_is_a_single_line() {
        let text = render(&Outcome::not_loaded(), false);
        assert_eq!(text, "Please upload documents first.\n");
    }

    #[test]
    fn json_output_is_one_line() {
        let text = render(&Outcome::not_loaded(), true);
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "not_loaded");
    }

    #[test]
    fn report_lists_failures() {
        let report = IngestReport {
            documents: 1,
            chunks: 4,
            failures: vec![policy_core::session::IngestFailure {
                path: "broken.pdf".into(),
                reason: "cannot parse PDF broken.pdf: bad header".into(),
            }],
        };
        let mut buf = Vec::new();
        write_report(&mut buf, &report, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Indexed 4 chunks from 1 document(s)."));
        assert!(text.contains("Skipped broken.pdf: cannot parse PDF"));
    }
}
