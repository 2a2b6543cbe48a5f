//! Parsing of raw provider output into synthesized attributes.
//!
//! Accepted shapes, tried in order:
//!
//! 1. A JSON object with `motivation` and `visual_signature` string fields,
//!    optionally wrapped in a ```` ```json ```` fence.
//! 2. Line-anchored `Motivation:` and `Visual signature:` labels
//!    (case-insensitive; `Visual:` and `Appearance:` also accepted for the
//!    second field).
//!
//! The `lacking_guidance` sentinel in either field (or as the whole reply)
//! means the provider declined. Missing or empty fields are unparseable.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Sentinel a provider returns when it cannot write a field.
pub const LACKING_GUIDANCE_SENTINEL: &str = "lacking_guidance";

/// Motivation and visual signature text for one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAttributes {
    pub motivation: String,
    pub visual_signature: String,
}

/// Outcome of parsing one provider reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    Attributes(SynthesizedAttributes),
    LackingGuidance,
    /// Carries a short reason for logs.
    Unparseable(String),
}

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fence pattern is valid")
});

static FIELD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*\**[ \t]*(motivation|visual[ _]signature|visual|appearance)\**[ \t]*:[ \t]*\**",
    )
    .expect("field marker pattern is valid")
});

#[derive(Debug, Deserialize)]
struct JsonReply {
    motivation: Option<String>,
    visual_signature: Option<String>,
}

/// Parse a raw provider reply.
pub fn parse_provider_output(raw: &str) -> ParsedResponse {
    let text = raw.trim();
    if text.is_empty() {
        return ParsedResponse::Unparseable("empty response".to_string());
    }
    if is_sentinel(text) {
        return ParsedResponse::LackingGuidance;
    }

    if let Some(reply) = parse_json(text) {
        return finish(reply.motivation, reply.visual_signature);
    }

    let (motivation, visual) = labelled_fields(text);
    if motivation.is_none() && visual.is_none() {
        return ParsedResponse::Unparseable("no recognizable fields".to_string());
    }
    finish(motivation, visual)
}

fn parse_json(text: &str) -> Option<JsonReply> {
    let body = match JSON_FENCE.captures(text) {
        Some(caps) => caps.get(1)?.as_str(),
        None if text.starts_with('{') => text,
        None => return None,
    };
    serde_json::from_str(body).ok()
}

/// Split labelled text into (motivation, visual signature).
///
/// Each field runs from its marker to the next marker or the end of the
/// text. Only the first occurrence of each field counts.
fn labelled_fields(text: &str) -> (Option<String>, Option<String>) {
    let markers: Vec<_> = FIELD_MARKER.captures_iter(text).collect();
    let mut motivation = None;
    let mut visual = None;

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let value = join_lines(&text[whole.end()..end]);

        let slot = if label.as_str().eq_ignore_ascii_case("motivation") {
            &mut motivation
        } else {
            &mut visual
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    (motivation, visual)
}

fn join_lines(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn finish(motivation: Option<String>, visual_signature: Option<String>) -> ParsedResponse {
    let motivation = motivation.map(clean).unwrap_or_default();
    let visual_signature = visual_signature.map(clean).unwrap_or_default();

    if is_sentinel(&motivation) || is_sentinel(&visual_signature) {
        return ParsedResponse::LackingGuidance;
    }
    if motivation.is_empty() {
        return ParsedResponse::Unparseable("missing motivation".to_string());
    }
    if visual_signature.is_empty() {
        return ParsedResponse::Unparseable("missing visual signature".to_string());
    }

    ParsedResponse::Attributes(SynthesizedAttributes {
        motivation,
        visual_signature,
    })
}

/// Strip surrounding whitespace and quotes.
fn clean(value: String) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

fn is_sentinel(value: &str) -> bool {
    value
        .trim()
        .trim_matches(|c: char| c == '"' || c == '.' || c == '`')
        .eq_ignore_ascii_case(LACKING_GUIDANCE_SENTINEL)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
