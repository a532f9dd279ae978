use geo_types::{coord, Rect};

use crate::palette::Color;

/// One candidate object instance as emitted by the detector, before any
/// label resolution: a confidence score, the index of the phrase the
/// detector matched, and an `[x0, y0, x1, y1]` box in absolute pixel
/// coordinates of the original image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawDetection {
    pub score: f32,
    pub class_index: i64,
    pub bbox: [f32; 4],
}

impl RawDetection {
    pub fn new(score: f32, class_index: i64, bbox: [f32; 4]) -> Self {
        Self {
            score,
            class_index,
            bbox,
        }
    }
}

/// A detection that passed the score threshold, enriched with its resolved
/// display label and color.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    pub bbox: Rect<f32>,
    pub label: String,
    pub score: f32,
    pub color: Color,
}

impl Detection {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32, label: &str, score: f32, color: Color) -> Self {
        let bbox = Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 });

        Self {
            bbox,
            label: label.to_string(),
            score,
            color,
        }
    }

    /// Box corners as `[x0, y0, x1, y1]`.
    pub fn corners(&self) -> [f32; 4] {
        [
            self.bbox.min().x,
            self.bbox.min().y,
            self.bbox.max().x,
            self.bbox.max().y,
        ]
    }

    pub fn to_record(&self) -> DetectionRecord {
        DetectionRecord {
            label: self.label.clone(),
            score: format!("{:.2}", self.score),
            bbox: self.corners().map(|c| (c * 100.0).round() / 100.0),
            color: self.color.name().to_string(),
        }
    }
}

/// One row of the result table shown alongside the annotated image.
///
/// Scores are formatted and coordinates rounded to two decimal places, in
/// detection order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionRecord {
    pub label: String,
    pub score: String,
    pub bbox: [f32; 4],
    pub color: String,
}

pub fn to_records(detections: &[Detection]) -> Vec<DetectionRecord> {
    detections.iter().map(Detection::to_record).collect()
}

#[cfg(feature = "save")]
pub fn save_records(records: &[DetectionRecord], path: &str) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["label", "score", "x0", "y0", "x1", "y1", "color"])?;
    for r in records {
        writer.write_record(&[
            r.label.clone(),
            r.score.clone(),
            r.bbox[0].to_string(),
            r.bbox[1].to_string(),
            r.bbox[2].to_string(),
            r.bbox[3].to_string(),
            r.color.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_formats_score_and_rounds_coordinates() {
        let det = Detection::new(10.004, 10.0, 50.126, 50.5, "dog", 0.5012, Color::Green);
        let record = det.to_record();

        assert_eq!(record.label, "dog");
        assert_eq!(record.score, "0.50");
        assert_eq!(record.bbox, [10.0, 10.0, 50.13, 50.5]);
        assert_eq!(record.color, "green");
    }

    #[test]
    fn records_preserve_detection_order() {
        let dets = vec![
            Detection::new(0.0, 0.0, 1.0, 1.0, "cat", 0.9, Color::Blue),
            Detection::new(2.0, 2.0, 3.0, 3.0, "dog", 0.2, Color::Red),
        ];
        let records = to_records(&dets);
        assert_eq!(records[0].label, "cat");
        assert_eq!(records[1].label, "dog");
    }
}
