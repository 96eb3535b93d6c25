//! crates/tutor_core/src/analysis.rs
//!
//! Turns the free-text answer of a vision model into an [`AnalysisResult`].
//!
//! The vendor gives no structural guarantees, so every field is filled by a
//! best-effort heuristic. Parsing never fails: when nothing matches, each field
//! degrades to a fixed default.

use crate::domain::{AnalysisResult, Difficulty};
use once_cell::sync::Lazy;
use regex::Regex;

/// Substituted when the text contains no bullet or numbered lines.
pub const PLACEHOLDER_KEY_POINT: &str = "Key concepts will be explained in the video";

/// Upper bound on extracted key points.
pub const MAX_KEY_POINTS: usize = 5;

/// Subject used when no keyword set matches.
pub const DEFAULT_SUBJECT: &str = "General";

static DESCRIPTION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^.*description[:\-]\s*").expect("valid regex"));

static BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*]|\d+\.)\s*").expect("valid regex"));

const BEGINNER_KEYWORDS: &[&str] = &["basic", "simple", "introduction"];
const ADVANCED_KEYWORDS: &[&str] = &["complex", "advanced", "detailed"];

/// Checked in order; the first set with a hit names the subject.
const SUBJECT_KEYWORDS: &[(&str, &[&str])] = &[
    ("Anatomy", &["brain", "skull", "anatomy"]),
    ("Mathematics", &["math", "equation", "formula"]),
    ("Chemistry", &["chemistry", "molecule", "reaction"]),
    ("Physics", &["physics", "force", "energy"]),
];

/// Parses a vendor response into the fixed analysis shape.
pub fn parse_analysis(content: &str) -> AnalysisResult {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let lowered = content.to_lowercase();

    AnalysisResult {
        description: extract_description(&lines),
        explanation: content.to_string(),
        key_points: extract_key_points(&lines),
        difficulty: determine_difficulty(&lowered),
        subject: determine_subject(&lowered).to_string(),
    }
}

fn extract_description(lines: &[&str]) -> String {
    let line = lines
        .iter()
        .find(|l| l.to_lowercase().contains("description"))
        .or_else(|| lines.first())
        .copied()
        .unwrap_or_default();

    DESCRIPTION_LABEL.replace(line, "").into_owned()
}

fn extract_key_points(lines: &[&str]) -> Vec<String> {
    let points: Vec<String> = lines
        .iter()
        .map(|l| l.trim_start())
        .filter(|l| BULLET_MARKER.is_match(l))
        .map(|l| BULLET_MARKER.replace(l, "").trim_end().to_string())
        .filter(|p| !p.is_empty())
        .take(MAX_KEY_POINTS)
        .collect();

    if points.is_empty() {
        vec![PLACEHOLDER_KEY_POINT.to_string()]
    } else {
        points
    }
}

/// Beginner keywords win over advanced ones when both appear.
fn determine_difficulty(lowered: &str) -> Difficulty {
    if BEGINNER_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Difficulty::Beginner
    } else if ADVANCED_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Difficulty::Advanced
    } else {
        Difficulty::Intermediate
    }
}

fn determine_subject(lowered: &str) -> &'static str {
    SUBJECT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(subject, _)| *subject)
        .unwrap_or(DEFAULT_SUBJECT)
}
