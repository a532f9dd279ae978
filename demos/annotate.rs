use owlvit_ort::{models, DetectionConfig, Result};

fn main() -> Result<()> {
    let img = image::open("demos/data/dog-example.jpg").unwrap();

    // loaded once; further runs in the same process reuse the handle
    let model = models::shared_model()?;

    let config = DetectionConfig::default()
        .with_score_threshold(0.1)?
        .with_line_width(3)?
        .with_font_size(16)?;

    let outcome = owlvit_ort::run_detection(model, &img, "a dog, a cat", &config)?;

    outcome.annotated.save("annotated.png")?;
    println!("{} detections, wrote annotated.png", outcome.detections.len());

    Ok(())
}
