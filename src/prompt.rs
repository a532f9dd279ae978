//! Prompt parsing and reconciliation of raw detector output against the
//! user's phrase list.
//!
//! The detector reports each match as an index into the phrase list it was
//! queried with. Reconciliation joins those indices back to the phrases,
//! applies the score threshold, and attaches display colors. An index that
//! falls outside the phrase list resolves to the fallback label rather than
//! failing the whole run.

use std::collections::HashMap;

use crate::detection::{Detection, RawDetection};
use crate::palette::Color;

/// Label substituted when a detection's class index cannot be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Splits a free-text prompt on commas into trimmed, non-empty phrases,
/// preserving order. An empty result means the prompt had no usable
/// content; callers treat that as invalid input and skip detection.
pub fn parse_prompts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Assigns each phrase a color from the fixed palette, cycling by position.
///
/// Deterministic: the same phrase list always yields the same mapping. For
/// a phrase that appears more than once, the first occurrence's position
/// decides the color.
pub fn assign_colors(phrases: &[String]) -> HashMap<String, Color> {
    let mut colors = HashMap::with_capacity(phrases.len());
    for (i, phrase) in phrases.iter().enumerate() {
        colors
            .entry(phrase.clone())
            .or_insert_with(|| Color::from_index(i));
    }
    colors
}

/// Filters raw detections by score and resolves each survivor's label and
/// color from the phrase list.
///
/// The comparison is strictly greater-than: a score exactly equal to
/// `score_threshold` is dropped. Output order follows input order; no
/// re-sorting by score. An empty result is a valid outcome, not an error.
pub fn reconcile(
    raw: &[RawDetection],
    phrases: &[String],
    colors: &HashMap<String, Color>,
    score_threshold: f32,
) -> Vec<Detection> {
    let mut detections = Vec::new();

    for det in raw {
        if det.score <= score_threshold {
            continue;
        }

        let resolved = usize::try_from(det.class_index)
            .ok()
            .and_then(|i| phrases.get(i));

        let (label, color) = match resolved {
            Some(phrase) => (
                phrase.as_str(),
                colors.get(phrase).copied().unwrap_or(Color::FALLBACK),
            ),
            None => {
                tracing::debug!(
                    class_index = det.class_index,
                    phrases = phrases.len(),
                    "detector returned an out-of-range class index"
                );
                (UNKNOWN_LABEL, Color::FALLBACK)
            }
        };

        let [x0, y0, x1, y1] = det.bbox;
        detections.push(Detection::new(x0, y0, x1, y1, label, det.score, color));
    }

    detections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_trims_and_drops_empty_segments() {
        let parsed = parse_prompts(" a dog ,, cat,  ,bird ");
        assert_eq!(parsed, phrases(&["a dog", "cat", "bird"]));
    }

    #[test]
    fn parse_of_blank_prompt_is_empty() {
        assert!(parse_prompts("").is_empty());
        assert!(parse_prompts("   ").is_empty());
        assert!(parse_prompts(" , ,, ").is_empty());
    }

    #[test]
    fn colors_follow_palette_order_and_are_deterministic() {
        let ps = phrases(&[
            "a", "b", "c", "d", "e", "f", "g", "h", "i",
        ]);
        let first = assign_colors(&ps);
        let second = assign_colors(&ps);

        assert_eq!(first, second);
        assert_eq!(first["a"], Color::Red);
        assert_eq!(first["h"], Color::Yellow);
        // ninth phrase wraps around to the start of the palette
        assert_eq!(first["i"], Color::Red);
    }

    #[test]
    fn duplicate_phrase_keeps_first_seen_color() {
        let ps = phrases(&["dog", "dog"]);
        let colors = assign_colors(&ps);

        assert_eq!(colors.len(), 1);
        assert_eq!(colors["dog"], Color::Red);

        // both indices still resolve, to the same label and color
        let raw = vec![
            RawDetection::new(0.6, 0, [0.0, 0.0, 5.0, 5.0]),
            RawDetection::new(0.6, 1, [6.0, 6.0, 9.0, 9.0]),
        ];
        let dets = reconcile(&raw, &ps, &colors, 0.1);
        assert_eq!(dets.len(), 2);
        assert!(dets.iter().all(|d| d.label == "dog" && d.color == Color::Red));
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let ps = phrases(&["dog"]);
        let colors = assign_colors(&ps);
        let raw = vec![
            RawDetection::new(0.1, 0, [0.0, 0.0, 1.0, 1.0]),
            RawDetection::new(0.10001, 0, [0.0, 0.0, 1.0, 1.0]),
        ];

        let dets = reconcile(&raw, &ps, &colors, 0.1);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].score, 0.10001);
    }

    #[test]
    fn below_threshold_detection_is_dropped() {
        // prompt "dog, cat": one confident dog, one sub-threshold cat
        let ps = phrases(&["dog", "cat"]);
        let colors = assign_colors(&ps);
        let raw = vec![
            RawDetection::new(0.5, 0, [10.0, 10.0, 50.0, 50.0]),
            RawDetection::new(0.05, 1, [60.0, 60.0, 90.0, 90.0]),
        ];

        let dets = reconcile(&raw, &ps, &colors, 0.1);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "dog");
        assert_eq!(dets[0].corners(), [10.0, 10.0, 50.0, 50.0]);
    }

    #[test]
    fn out_of_range_index_degrades_to_unknown() {
        let ps = phrases(&["dog", "cat", "bird"]);
        let colors = assign_colors(&ps);
        let raw = vec![RawDetection::new(0.4, 5, [0.0, 0.0, 10.0, 10.0])];

        let dets = reconcile(&raw, &ps, &colors, 0.1);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, UNKNOWN_LABEL);
        assert_eq!(dets[0].color, Color::FALLBACK);
    }

    #[test]
    fn negative_index_degrades_to_unknown() {
        let ps = phrases(&["dog"]);
        let colors = assign_colors(&ps);
        let raw = vec![RawDetection::new(0.9, -1, [0.0, 0.0, 10.0, 10.0])];

        let dets = reconcile(&raw, &ps, &colors, 0.1);
        assert_eq!(dets[0].label, UNKNOWN_LABEL);
    }

    #[test]
    fn output_preserves_input_order_without_score_sorting() {
        let ps = phrases(&["dog", "cat"]);
        let colors = assign_colors(&ps);
        let raw = vec![
            RawDetection::new(0.3, 1, [0.0, 0.0, 1.0, 1.0]),
            RawDetection::new(0.9, 0, [2.0, 2.0, 3.0, 3.0]),
        ];

        let dets = reconcile(&raw, &ps, &colors, 0.1);
        assert_eq!(dets[0].label, "cat");
        assert_eq!(dets[1].label, "dog");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let ps = phrases(&["dog"]);
        let colors = assign_colors(&ps);
        assert!(reconcile(&[], &ps, &colors, 0.1).is_empty());
    }
}
