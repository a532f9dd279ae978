//! End-to-end composition of one detection run: parse the prompt, invoke
//! the detector, reconcile its output, annotate the image and tabulate the
//! results. Synchronous, one pass per user action.

use image::{DynamicImage, RgbImage};

use crate::annotate::Annotator;
use crate::config::DetectionConfig;
use crate::detection::{self, Detection, DetectionRecord};
use crate::error::{Error, Result};
use crate::models::Detector;
use crate::prompt;

/// Everything one run produces: the retained detections, the annotated
/// image, and the row-oriented result table. `detections` being empty is a
/// valid "nothing found" outcome; `annotated` is then an untouched copy.
pub struct DetectionOutcome {
    pub detections: Vec<Detection>,
    pub annotated: RgbImage,
    pub records: Vec<DetectionRecord>,
}

/// Runs the full pipeline once.
///
/// Fails with [`Error::EmptyPrompt`] before ever touching the detector if
/// the prompt contains no usable phrases. Detector errors propagate
/// unchanged; there is no retry.
pub fn run_detection<D: Detector>(
    detector: &D,
    image: &DynamicImage,
    raw_prompt: &str,
    config: &DetectionConfig,
) -> Result<DetectionOutcome> {
    let phrases = prompt::parse_prompts(raw_prompt);
    if phrases.is_empty() {
        return Err(Error::EmptyPrompt);
    }

    let colors = prompt::assign_colors(&phrases);

    let raw = detector.detect(image, &phrases, config.score_threshold())?;
    let detections = prompt::reconcile(&raw, &phrases, &colors, config.score_threshold());

    tracing::debug!(
        raw = raw.len(),
        retained = detections.len(),
        "reconciled detector output"
    );

    let annotated = Annotator::new(config).annotate(image, &detections);
    let records = detection::to_records(&detections);

    Ok(DetectionOutcome {
        detections,
        annotated,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::RawDetection;
    use crate::palette::Color;
    use image::{ImageBuffer, Rgb};

    struct StubDetector {
        raw: Vec<RawDetection>,
    }

    impl Detector for StubDetector {
        fn detect(
            &self,
            _image: &DynamicImage,
            _phrases: &[String],
            _score_threshold: f32,
        ) -> Result<Vec<RawDetection>> {
            Ok(self.raw.clone())
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn detect(
            &self,
            _image: &DynamicImage,
            _phrases: &[String],
            _score_threshold: f32,
        ) -> Result<Vec<RawDetection>> {
            Err(Error::Tokenizer("backend unavailable".to_string()))
        }
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(96, 96, Rgb([127, 127, 127])))
    }

    #[test]
    fn empty_prompt_never_reaches_the_detector() {
        struct PanickingDetector;
        impl Detector for PanickingDetector {
            fn detect(
                &self,
                _: &DynamicImage,
                _: &[String],
                _: f32,
            ) -> Result<Vec<RawDetection>> {
                panic!("detector must not be invoked for an empty prompt");
            }
        }

        for raw in ["", "   ", " , ,"] {
            let result = run_detection(
                &PanickingDetector,
                &test_image(),
                raw,
                &DetectionConfig::default(),
            );
            assert!(matches!(result, Err(Error::EmptyPrompt)));
        }
    }

    #[test]
    fn no_detections_is_a_valid_outcome() {
        let outcome = run_detection(
            &StubDetector { raw: vec![] },
            &test_image(),
            "dog, cat",
            &DetectionConfig::default(),
        )
        .unwrap();

        assert!(outcome.detections.is_empty());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.annotated, test_image().to_rgb8());
    }

    #[test]
    fn sub_threshold_detections_are_filtered_out() {
        let detector = StubDetector {
            raw: vec![
                RawDetection::new(0.5, 0, [10.0, 10.0, 50.0, 50.0]),
                RawDetection::new(0.05, 1, [60.0, 60.0, 90.0, 90.0]),
            ],
        };

        let outcome = run_detection(
            &detector,
            &test_image(),
            "dog, cat",
            &DetectionConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].label, "dog");
        assert_eq!(outcome.records[0].score, "0.50");
        assert_eq!(outcome.records[0].bbox, [10.0, 10.0, 50.0, 50.0]);
        assert_eq!(outcome.records[0].color, "red");
    }

    #[test]
    fn unknown_index_is_retained_with_fallback_color() {
        let detector = StubDetector {
            raw: vec![RawDetection::new(0.4, 5, [0.0, 0.0, 10.0, 10.0])],
        };

        let outcome = run_detection(
            &detector,
            &test_image(),
            "dog, cat, bird",
            &DetectionConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].label, "Unknown");
        assert_eq!(outcome.detections[0].color, Color::FALLBACK);
    }

    #[test]
    fn detector_errors_propagate_unchanged() {
        let result = run_detection(
            &FailingDetector,
            &test_image(),
            "dog",
            &DetectionConfig::default(),
        );
        assert!(matches!(result, Err(Error::Tokenizer(_))));
    }
}
