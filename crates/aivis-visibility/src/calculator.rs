//! Weighted visibility score.

use crate::types::{ScoringBreakdown, ScoringWeights};

/// Ceiling applied when the company is not mentioned at all.
pub const NOT_MENTIONED_CAP: f64 = 0.2;

/// Combine a breakdown into one score in `[0, 1]`.
///
/// `weights` default to [`ScoringWeights::default`] and are normalized to sum
/// to 1 before use. When `mention_presence` is 0 the result is capped at
/// [`NOT_MENTIONED_CAP`]. Non-finite inputs never leak: they count as 0.
#[must_use]
pub fn calculate(breakdown: &ScoringBreakdown, weights: Option<&ScoringWeights>) -> f64 {
    let w = weights.copied().unwrap_or_default().normalized();

    let presence = unit(breakdown.mention_presence);
    let base = w.mention_presence * presence
        + w.mention_context * unit(breakdown.mention_context)
        + w.mention_position * unit(breakdown.mention_position)
        + w.description_detail * unit(breakdown.description_detail)
        + w.answer_relevance * unit(breakdown.answer_relevance)
        + w.service_match * unit(breakdown.service_match);

    let score = if presence == 0.0 {
        base.min(NOT_MENTIONED_CAP)
    } else {
        base
    };

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(factors: [f64; 6]) -> ScoringBreakdown {
        let [p, c, pos, d, r, s] = factors;
        ScoringBreakdown {
            mention_presence: p,
            mention_context: c,
            mention_position: pos,
            description_detail: d,
            answer_relevance: r,
            service_match: s,
            mention_count: 0,
            rationale: String::new(),
        }
    }

    fn weights(values: [f64; 6]) -> ScoringWeights {
        let [p, c, pos, d, r, s] = values;
        ScoringWeights {
            mention_presence: p,
            mention_context: c,
            mention_position: pos,
            description_detail: d,
            answer_relevance: r,
            service_match: s,
        }
    }

    #[test]
    fn all_ones_scores_one() {
        let score = calculate(&breakdown([1.0; 6]), None);
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn not_mentioned_with_everything_else_perfect_is_exactly_the_cap() {
        let score = calculate(&breakdown([0.0, 1.0, 1.0, 1.0, 1.0, 1.0]), None);
        assert!((score - 0.2).abs() < f64::EPSILON, "got {score}");
    }

    #[test]
    fn not_mentioned_never_exceeds_cap() {
        let heavy_context = weights([0.0, 10.0, 0.0, 0.0, 0.0, 0.0]);
        let score = calculate(&breakdown([0.0, 1.0, 0.0, 0.0, 0.0, 0.0]), Some(&heavy_context));
        assert!(score <= NOT_MENTIONED_CAP);
    }

    #[test]
    fn zero_weights_match_defaults() {
        let b = breakdown([0.7, 0.3, 0.9, 0.1, 0.5, 0.6]);
        let zero = weights([0.0; 6]);
        assert!((calculate(&b, Some(&zero)) - calculate(&b, None)).abs() < 1e-12);
    }

    #[test]
    fn unnormalized_weights_are_rescaled() {
        let b = breakdown([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let w = weights([3.0, 3.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((calculate(&b, Some(&w)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_inputs_yield_bounded_score() {
        let b = breakdown([f64::NAN, f64::INFINITY, 1.0, 1.0, 1.0, 1.0]);
        let score = calculate(&b, None);
        assert!(score.is_finite());
        assert!((0.0..=NOT_MENTIONED_CAP).contains(&score));

        let w = weights([f64::INFINITY, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let score = calculate(&breakdown([1.0; 6]), Some(&w));
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn score_stays_in_unit_interval_across_grid() {
        let steps = [0.0, 0.25, 0.5, 1.0, 1.5, -0.5];
        for p in steps {
            for c in steps {
                for other in steps {
                    let score = calculate(&breakdown([p, c, other, other, other, other]), None);
                    assert!((0.0..=1.0).contains(&score), "{p} {c} {other} -> {score}");
                }
            }
        }
    }
}
