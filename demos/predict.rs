use owlvit_ort::{
    models::{OwlVitModel, OwlVitPretrainedModels},
    DetectionConfig, Result,
};

fn main() -> Result<()> {
    let img = image::open("demos/data/dog-example.jpg").unwrap();

    let model = OwlVitModel::pretrained(OwlVitPretrainedModels::BasePatch32)?;

    let outcome = owlvit_ort::run_detection(&model, &img, "a dog, a cat", &DetectionConfig::default())?;

    if outcome.records.is_empty() {
        println!("No objects detected for the given prompt.");
    }

    for record in &outcome.records {
        println!(
            "Label: {}, Score: {}, Box: {:?}, Color: {}",
            record.label, record.score, record.bbox, record.color
        );
    }

    Ok(())
}
