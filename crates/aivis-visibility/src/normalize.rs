//! Coerce loosely-typed scoring output into a [`ScoringBreakdown`].

use serde_json::{Map, Value};

use crate::types::ScoringBreakdown;

/// Normalize a raw breakdown-like value.
///
/// Each factor is coerced to a number (numeric strings count), then clamped
/// to `[0, 1]`; anything non-finite or non-numeric becomes 0. Keys may be
/// camelCase or snake_case. Normalizing an already-normalized breakdown is a
/// no-op.
///
/// `mentionCount` is a count, so a finite value is coerced to an integer:
/// negatives become 0, fractions round to nearest (`3.6` gives 4) and values
/// past `u32::MAX` saturate. It is never clamped to `[0, 1]`.
#[must_use]
pub fn normalize_breakdown(raw: &Value) -> ScoringBreakdown {
    let Value::Object(map) = raw else {
        return ScoringBreakdown::default();
    };

    let factor = |camel: &str, snake: &str| unit(field(map, camel, snake).and_then(as_number));

    ScoringBreakdown {
        mention_presence: factor("mentionPresence", "mention_presence"),
        mention_context: factor("mentionContext", "mention_context"),
        mention_position: factor("mentionPosition", "mention_position"),
        description_detail: factor("descriptionDetail", "description_detail"),
        answer_relevance: factor("answerRelevance", "answer_relevance"),
        service_match: factor("serviceMatch", "service_match"),
        mention_count: count(field(map, "mentionCount", "mention_count").and_then(as_number)),
        rationale: match field(map, "rationale", "rationale") {
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        },
    }
}

fn field<'a>(map: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    map.get(camel).or_else(|| map.get(snake))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn unit(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() => v.max(0.0).round().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}
