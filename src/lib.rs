//! # Overview
//!
//! Open-vocabulary object detection driven by free-text prompts: a
//! comma-separated prompt is parsed into phrases, the
//! [OWL-ViT](https://huggingface.co/google/owlvit-base-patch32) model (in
//! ONNX format, through onnxruntime via [ort](https://github.com/pykeio/ort))
//! reports matches as phrase indices, and the results are drawn back onto
//! the image as colored, labeled bounding boxes plus a result table.

mod annotate;
mod config;
mod detection;
mod error;
mod palette;
mod pipeline;
mod prompt;

pub use error::{Error, Result};

// re-exports
pub use geo_types;
pub use image;
pub use ort;

pub mod models;

pub use annotate::Annotator;
pub use config::DetectionConfig;
#[cfg(feature = "save")]
pub use detection::save_records;
pub use detection::{to_records, Detection, DetectionRecord, RawDetection};
pub use palette::{Color, PALETTE};
pub use pipeline::{run_detection, DetectionOutcome};
pub use prompt::{assign_colors, parse_prompts, reconcile, UNKNOWN_LABEL};
