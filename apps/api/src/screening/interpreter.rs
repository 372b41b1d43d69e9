//! Response Interpreter: turns a raw model reply into an `Evaluation`.
//!
//! Two strategies, one per `ResponseFormat`:
//! * JSON: decode one object and read the ten named keys with defaults.
//! * Text anchors: slice the text after each `"<Label>:"` marker up to the
//!   next marker and pull the first run of digits for numeric fields.
//!
//! Neither strategy fails. Anything that could not be read degrades to the
//! field default and is listed in `Interpretation::problems`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::llm_client::strip_json_fences;
use crate::models::candidate::{Evaluation, Verdict, NOT_AVAILABLE};
use crate::screening::prompts::{
    ResponseFormat, EXPERIENCE_YEARS, FIELD_LABELS, FINAL_VERDICT, FIT_JUSTIFICATION,
    ONE_LINE_RECOMMENDATION, RED_FLAGS, RESUME_SUMMARY, SCORE, SKILL_MATCH_PERCENTAGE,
    TOP_STRENGTHS, WHY_NOT_SELECTED,
};

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// A bare list number such as `3.` or `4)` left behind by the next item.
static LIST_ENUMERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}[.)]$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub evaluation: Evaluation,
    pub problems: Vec<String>,
}

pub fn interpret(format: ResponseFormat, reply: &str) -> Interpretation {
    match format {
        ResponseFormat::Json => interpret_json(reply),
        ResponseFormat::Markdown => interpret_anchors(reply),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JSON strategy
// ────────────────────────────────────────────────────────────────────────────

pub fn interpret_json(reply: &str) -> Interpretation {
    let object = match serde_json::from_str::<Value>(strip_json_fences(reply)) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            return Interpretation {
                evaluation: Evaluation::default(),
                problems: vec![format!("reply is JSON but not an object ({})", kind(&other))],
            }
        }
        Err(e) => {
            return Interpretation {
                evaluation: Evaluation::default(),
                problems: vec![format!("reply is not valid JSON: {e}")],
            }
        }
    };

    let mut problems: Vec<String> = FIELD_LABELS
        .iter()
        .filter(|label| !object.contains_key(**label))
        .map(|label| format!("missing field '{label}'"))
        .collect();

    let mut number = |label: &str| {
        let value = json_number(&object, label);
        if object.contains_key(label) && value.is_none() {
            problems.push(format!("field '{label}' is not a number"));
        }
        value
    };
    let score = number(SCORE);
    let skill_match_pct = number(SKILL_MATCH_PERCENTAGE);

    let evaluation = Evaluation {
        score,
        skill_match_pct,
        experience_years: json_text(&object, EXPERIENCE_YEARS),
        top_strengths: json_text(&object, TOP_STRENGTHS),
        red_flags: json_text(&object, RED_FLAGS),
        fit_justification: json_text(&object, FIT_JUSTIFICATION),
        why_not_selected: json_text(&object, WHY_NOT_SELECTED),
        final_verdict: Verdict::from_label(&json_text(&object, FINAL_VERDICT)),
        one_line_recommendation: json_text(&object, ONE_LINE_RECOMMENDATION),
        resume_summary: json_text(&object, RESUME_SUMMARY),
    };

    Interpretation {
        evaluation,
        problems,
    }
}

/// Missing key → 0. Numeric strings are accepted; anything else → `None`.
fn json_number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key) {
        None => Some(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().or_else(|| first_number(s)),
        Some(_) => None,
    }
}

/// Missing or null → "N/A". Non-string values are rendered as text.
fn json_text(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(value) => value_to_text(value),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text-anchor strategy
// ────────────────────────────────────────────────────────────────────────────

pub fn interpret_anchors(reply: &str) -> Interpretation {
    let mut problems = Vec::new();
    let mut field = |label: &str| {
        let slice = slice_after_anchor(reply, label);
        if slice.is_none() {
            problems.push(format!("anchor '{label}:' not found"));
        }
        slice
    };

    let score = field(SCORE).and_then(first_number);
    let skill_match_pct = field(SKILL_MATCH_PERCENTAGE).and_then(first_number);
    let experience_years = field(EXPERIENCE_YEARS).map(clean_value);
    let top_strengths = field(TOP_STRENGTHS).map(clean_value);
    let red_flags = field(RED_FLAGS).map(clean_value);
    let fit_justification = field(FIT_JUSTIFICATION).map(clean_value);
    let why_not_selected = field(WHY_NOT_SELECTED).map(clean_value);
    let final_verdict = field(FINAL_VERDICT)
        .map(clean_value)
        .map(|v| Verdict::from_label(v.lines().next().unwrap_or_default()))
        .unwrap_or_default();
    let one_line_recommendation = field(ONE_LINE_RECOMMENDATION).map(clean_value);
    let resume_summary = field(RESUME_SUMMARY).map(clean_value);

    let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Interpretation {
        evaluation: Evaluation {
            score,
            skill_match_pct,
            experience_years: or_na(experience_years),
            top_strengths: or_na(top_strengths),
            red_flags: or_na(red_flags),
            fit_justification: or_na(fit_justification),
            why_not_selected: or_na(why_not_selected),
            final_verdict,
            one_line_recommendation: or_na(one_line_recommendation),
            resume_summary: or_na(resume_summary),
        },
        problems,
    }
}

/// Text after the first `"<label>:"` up to the nearest following anchor of
/// any field, or the end of the reply.
fn slice_after_anchor<'a>(reply: &'a str, label: &str) -> Option<&'a str> {
    let anchor = format!("{label}:");
    let start = reply.find(&anchor)? + anchor.len();
    let rest = &reply[start..];
    let end = FIELD_LABELS
        .iter()
        .filter_map(|other| rest.find(&format!("{other}:")))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn first_number(text: &str) -> Option<f64> {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Strips whitespace, markdown emphasis and a dangling list number; empty
/// values become "N/A".
fn clean_value(raw: &str) -> String {
    let is_noise = |c: char| c.is_whitespace() || matches!(c, '*' | '_' | '#');
    let mut value = raw.trim_matches(is_noise);

    if let Some((head, last)) = value.rsplit_once('\n') {
        let last = last.trim_matches(is_noise);
        if last.is_empty() || LIST_ENUMERATOR.is_match(last) {
            value = head.trim_matches(is_noise);
        }
    }

    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}
