//! Final report shape and the assembler that always produces one

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Summary used whenever the structured candidate is missing or unusable
pub const FALLBACK_SUMMARY: &str = "Research completed, but structured JSON parsing failed. Showing raw report text under 'strategy'.";

/// Strategy entry used when the fallback has no raw text to show
pub const NO_DATA: &str = "No data received.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub weakness: String,
}

/// Structured market research returned to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub summary: String,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub strategy: Vec<String>,
}

impl ResearchReport {
    /// Report carrying the raw research text as its only strategy entry
    pub fn fallback(raw_text: &str) -> Self {
        let strategy = if raw_text.is_empty() {
            NO_DATA.to_string()
        } else {
            raw_text.to_string()
        };

        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            competitors: Vec::new(),
            trends: Vec::new(),
            strategy: vec![strategy],
        }
    }
}

fn parse_candidate(candidate: &str) -> Result<ResearchReport, serde_json::Error> {
    match serde_json::from_str(candidate.trim()) {
        Ok(report) => Ok(report),
        Err(e) => match unfence(candidate) {
            Some(inner) => serde_json::from_str(inner),
            None => Err(e),
        },
    }
}

/// Body of a ```json (or bare ```) fenced block, if the text has one
fn unfence(content: &str) -> Option<&str> {
    let (start, skip) = match content.find("```json") {
        Some(start) => (start, 7),
        None => (content.find("```")?, 3),
    };
    let body = &content[start + skip..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Build the final report from the extraction candidate, falling back to the raw text.
///
/// Never fails: a missing candidate, invalid JSON or a payload without a string
/// `summary` all produce [`ResearchReport::fallback`].
pub fn assemble_report(candidate: Option<&str>, raw_text: &str) -> ResearchReport {
    let Some(candidate) = candidate else {
        debug!("No structured candidate, using fallback report");
        return ResearchReport::fallback(raw_text);
    };

    match parse_candidate(candidate) {
        Ok(report) => report,
        Err(e) => {
            let preview: String = candidate.chars().take(200).collect();
            error!(error = %e, candidate_preview = %preview, "JSON parse failed on extraction output");
            ResearchReport::fallback(raw_text)
        }
    }
}
