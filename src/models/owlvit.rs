use image::imageops;
use ndarray::{Array, Array2, ArrayBase, Dim, OwnedRepr};
use ort::SessionBuilder;
use tokenizers::Tokenizer;

pub use crate::error::{Error, Result};
use crate::detection::RawDetection;
use crate::models::Detector;

/// An [OWL-ViT](https://huggingface.co/docs/transformers/model_doc/owlvit)
/// open-vocabulary detection model: detection targets are free-text
/// phrases rather than a fixed label set.
pub struct OwlVitModel {
    model_name: String,
    model: ort::Session,
    tokenizer: Tokenizer,
}

#[derive(PartialEq)]
/// Pretrained OWL-ViT ONNX exports from Hugging Face.
pub enum OwlVitPretrainedModels {
    BasePatch32,
    BasePatch32Quantized,
}

impl OwlVitPretrainedModels {
    /// Model name.
    pub fn name(&self) -> &str {
        match self {
            _ => self.hf_repo(),
        }
    }

    /// Hugging Face repository for this model.
    pub fn hf_repo(&self) -> &str {
        match self {
            _ => "Xenova/owlvit-base-patch32",
        }
    }

    /// Path for this model file in the Hugging Face repository.
    pub fn hf_filename(&self) -> &str {
        match self {
            OwlVitPretrainedModels::BasePatch32 => "onnx/model.onnx",
            OwlVitPretrainedModels::BasePatch32Quantized => "onnx/model_quantized.onnx",
        }
    }

    /// Path for the tokenizer definition in the Hugging Face repository.
    pub fn hf_tokenizer_filename(&self) -> &str {
        match self {
            _ => "tokenizer.json",
        }
    }
}

impl OwlVitModel {
    /// Required input image width.
    pub const REQUIRED_WIDTH: u32 = 768;
    /// Required input image height.
    pub const REQUIRED_HEIGHT: u32 = 768;
    /// Token budget per phrase, padding included.
    pub const MAX_TEXT_TOKENS: usize = 16;

    // CLIP normalization constants, per channel.
    const IMAGE_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
    const IMAGE_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_1];

    /// Construct an [`OwlVitModel`] with a pretrained model downloaded from
    /// Hugging Face.
    pub fn pretrained(p_model: OwlVitPretrainedModels) -> Result<Self> {
        let session_builder = crate::models::session_builder()?;
        Self::configure_pretrained(p_model, session_builder)
    }

    /// Construct a configured [`OwlVitModel`] with a pretrained model
    /// downloaded from Hugging Face.
    pub fn configure_pretrained(
        p_model: OwlVitPretrainedModels,
        session_builder: SessionBuilder,
    ) -> Result<Self> {
        let api = hf_hub::api::sync::Api::new()?;
        let repo = api.model(p_model.hf_repo().to_string());
        let model_file = repo.get(p_model.hf_filename())?;
        let tokenizer_file = repo.get(p_model.hf_tokenizer_filename())?;

        tracing::info!(model = p_model.name(), "loading OWL-ViT model");

        let model = session_builder.commit_from_file(model_file)?;
        let tokenizer = Tokenizer::from_file(tokenizer_file)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        Ok(Self {
            model_name: p_model.name().to_string(),
            model,
            tokenizer,
        })
    }

    /// Construct an [`OwlVitModel`] from local model and tokenizer files.
    pub fn new_from_file(
        model_path: &str,
        tokenizer_path: &str,
        model_name: &str,
        session_builder: SessionBuilder,
    ) -> Result<Self> {
        let model = session_builder.commit_from_file(model_path)?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        Ok(Self {
            model_name: model_name.to_string(),
            model,
            tokenizer,
        })
    }

    pub fn name(&self) -> &str {
        &self.model_name
    }

    /// Run detection for the given phrases and return every candidate with
    /// `score >= score_threshold`, boxes in pixel coordinates of `img`.
    pub fn predict(
        &self,
        img: &image::DynamicImage,
        phrases: &[String],
        score_threshold: f32,
    ) -> Result<Vec<RawDetection>> {
        let pixel_values = self.preprocess(img);
        let (input_ids, attention_mask) = self.tokenize(phrases)?;

        let outputs = self.model.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
            "pixel_values" => pixel_values,
        ]?)?;

        let logits = outputs["logits"].try_extract_tensor::<f32>()?;
        let boxes = outputs["pred_boxes"].try_extract_tensor::<f32>()?;

        let num_queries = logits.shape()[1];
        let num_texts = logits.shape()[2];
        let (img_width, img_height) = (img.width() as f32, img.height() as f32);

        let mut detections = vec![];

        for q in 0..num_queries {
            let mut best_text = 0;
            let mut best_logit = f32::NEG_INFINITY;
            for t in 0..num_texts {
                let logit = logits[[0, q, t]];
                if logit > best_logit {
                    best_logit = logit;
                    best_text = t;
                }
            }

            let score = sigmoid(best_logit);
            if score >= score_threshold {
                // boxes come out center-based and normalized to [0, 1]
                let (cx, cy) = (boxes[[0, q, 0]], boxes[[0, q, 1]]);
                let (w, h) = (boxes[[0, q, 2]], boxes[[0, q, 3]]);

                detections.push(RawDetection::new(
                    score,
                    best_text as i64,
                    [
                        (cx - w / 2.0) * img_width,
                        (cy - h / 2.0) * img_height,
                        (cx + w / 2.0) * img_width,
                        (cy + h / 2.0) * img_height,
                    ],
                ));
            }
        }

        tracing::debug!(
            candidates = detections.len(),
            phrases = phrases.len(),
            "OWL-ViT detection pass finished"
        );

        Ok(detections)
    }

    fn preprocess(
        &self,
        img: &image::DynamicImage,
    ) -> ArrayBase<OwnedRepr<f32>, Dim<[usize; 4]>> {
        let img = img.resize_exact(
            Self::REQUIRED_WIDTH,
            Self::REQUIRED_HEIGHT,
            imageops::FilterType::Triangle,
        );
        let img_rgb8 = img.into_rgba8();

        let mut input = Array::zeros((
            1,
            3,
            Self::REQUIRED_HEIGHT as usize,
            Self::REQUIRED_WIDTH as usize,
        ));

        for pixel in img_rgb8.enumerate_pixels() {
            let x = pixel.0 as usize;
            let y = pixel.1 as usize;
            let [r, g, b, _] = pixel.2 .0;
            input[[0, 0, y, x]] = (r as f32 / 255.0 - Self::IMAGE_MEAN[0]) / Self::IMAGE_STD[0];
            input[[0, 1, y, x]] = (g as f32 / 255.0 - Self::IMAGE_MEAN[1]) / Self::IMAGE_STD[1];
            input[[0, 2, y, x]] = (b as f32 / 255.0 - Self::IMAGE_MEAN[2]) / Self::IMAGE_STD[2];
        }

        input
    }

    // One row of token ids per phrase, truncated or zero-padded to the
    // fixed token budget, with a matching attention mask.
    fn tokenize(&self, phrases: &[String]) -> Result<(Array2<i64>, Array2<i64>)> {
        let mut input_ids = Array2::zeros((phrases.len(), Self::MAX_TEXT_TOKENS));
        let mut attention_mask = Array2::zeros((phrases.len(), Self::MAX_TEXT_TOKENS));

        for (row, phrase) in phrases.iter().enumerate() {
            let encoding = self
                .tokenizer
                .encode(phrase.as_str(), true)
                .map_err(|e| Error::Tokenizer(e.to_string()))?;

            for (col, id) in encoding
                .get_ids()
                .iter()
                .take(Self::MAX_TEXT_TOKENS)
                .enumerate()
            {
                input_ids[[row, col]] = *id as i64;
                attention_mask[[row, col]] = 1;
            }
        }

        Ok((input_ids, attention_mask))
    }
}

impl Detector for OwlVitModel {
    fn detect(
        &self,
        image: &image::DynamicImage,
        phrases: &[String],
        score_threshold: f32,
    ) -> Result<Vec<RawDetection>> {
        self.predict(image, phrases, score_threshold)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_maps_logits_into_unit_interval() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }
}
