//! The detector collaborator: an OWL-ViT model behind the [`Detector`]
//! trait, plus the process-wide cached handle.

mod owlvit;

pub use owlvit::{OwlVitModel, OwlVitPretrainedModels};

use image::DynamicImage;
use once_cell::sync::OnceCell;
use ort::{Session, SessionBuilder};

use crate::detection::RawDetection;
use crate::error::Result;

/// Boundary contract of the detection backend: given an image and the
/// ordered phrase list, report candidate objects as scores, phrase indices
/// and pixel-space boxes. Implementations apply their own confidence
/// threshold before returning.
pub trait Detector {
    fn detect(
        &self,
        image: &DynamicImage,
        phrases: &[String],
        score_threshold: f32,
    ) -> Result<Vec<RawDetection>>;
}

static SHARED_MODEL: OnceCell<OwlVitModel> = OnceCell::new();

/// Process-wide OWL-ViT handle: loaded at most once on first use, then
/// shared read-only across invocations. Never reloaded per request.
pub fn shared_model() -> Result<&'static OwlVitModel> {
    SHARED_MODEL.get_or_try_init(|| OwlVitModel::pretrained(OwlVitPretrainedModels::BasePatch32))
}

/// Session builder with execution providers registered in fixed preference
/// order: CUDA, then CoreML, then onnxruntime's CPU provider. The first
/// provider available at runtime wins; the rest are fallbacks.
pub fn session_builder() -> Result<SessionBuilder> {
    let builder = Session::builder()?;

    #[allow(unused_mut)]
    let mut providers: Vec<ort::ExecutionProviderDispatch> = Vec::new();
    #[cfg(feature = "cuda")]
    providers.push(ort::CUDAExecutionProvider::default().build());
    #[cfg(feature = "coreml")]
    providers.push(ort::CoreMLExecutionProvider::default().build());

    let builder = builder.with_execution_providers(providers)?;
    Ok(builder)
}
