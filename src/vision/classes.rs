//! Classifier output handling

use serde::{Deserialize, Serialize};

use crate::tuning::OpenClassFallback;

/// One entry of a classifier prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub class_name: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(class_name: impl Into<String>, probability: f32) -> Self {
        Self {
            class_name: class_name.into(),
            probability,
        }
    }
}

/// Index of the first class whose name contains "open" (case-insensitive)
pub fn open_class_index(predictions: &[Prediction]) -> Option<usize> {
    predictions
        .iter()
        .position(|p| p.class_name.to_lowercase().contains("open"))
}

/// Resolve which class index to read, applying the fallback policy when no
/// class is labelled "open". `None` means the open probability is zero.
pub fn resolve_open_index(
    predictions: &[Prediction],
    fallback: OpenClassFallback,
) -> Option<usize> {
    match open_class_index(predictions) {
        Some(idx) => Some(idx),
        None => match fallback {
            OpenClassFallback::FirstClass if !predictions.is_empty() => Some(0),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(names: &[&str]) -> Vec<Prediction> {
        names.iter().map(|n| Prediction::new(*n, 0.5)).collect()
    }

    #[test]
    fn test_open_class_case_insensitive() {
        assert_eq!(open_class_index(&preds(&["Closed", "OPEN hand"])), Some(1));
        assert_eq!(open_class_index(&preds(&["open", "closed"])), Some(0));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            open_class_index(&preds(&["fist", "Open palm", "half open"])),
            Some(1)
        );
    }

    #[test]
    fn test_missing_open_class_is_none() {
        assert_eq!(open_class_index(&preds(&["fist", "background"])), None);
        assert_eq!(open_class_index(&[]), None);
    }

    #[test]
    fn test_found_at_zero_is_not_confused_with_missing() {
        let p = preds(&["Open", "Closed"]);
        assert_eq!(resolve_open_index(&p, OpenClassFallback::Disabled), Some(0));
    }

    #[test]
    fn test_fallback_policy() {
        let p = preds(&["fist", "background"]);
        assert_eq!(resolve_open_index(&p, OpenClassFallback::FirstClass), Some(0));
        assert_eq!(resolve_open_index(&p, OpenClassFallback::Disabled), None);
        assert_eq!(resolve_open_index(&[], OpenClassFallback::FirstClass), None);
    }

    #[test]
    fn test_prediction_deserializes_from_tm_json() {
        let json = r#"[{"className":"Open","probability":0.98},{"className":"Closed","probability":0.02}]"#;
        let p: Vec<Prediction> = serde_json::from_str(json).unwrap();
        assert_eq!(p[0].class_name, "Open");
        assert!((p[1].probability - 0.02).abs() < 1e-6);
    }
}
