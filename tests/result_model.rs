mod common;

use common::*;
use mri_lense_lib::models::classify_types::{ClassificationResult, Label, WireClassification};

fn parse(body: &str) -> Result<ClassificationResult, String> {
    let wire: WireClassification = serde_json::from_str(body).map_err(|e| e.to_string())?;
    ClassificationResult::try_from(wire)
}

fn with_gradcam(maps: &[(&str, String)]) -> String {
    let entries: Vec<String> = maps
        .iter()
        .map(|(label, data)| format!("\"{}\": \"{}\"", label, data))
        .collect();
    format!(
        r#"{{
            "prediction": "meningioma",
            "probabilities": {{"glioma": 0.1, "meningioma": 0.7, "no_tumor": 0.1, "pituitary": 0.1}},
            "confidence": 0.7,
            "model_accuracy": 0.883,
            "risk_level": {{"level": "MODERATE RISK", "color": "amber"}},
            "gradcam_images": {{{}}}
        }}"#,
        entries.join(",")
    )
}

#[test]
fn valid_payload_is_accepted() {
    let result = parse(GLIOMA_BODY).unwrap();
    assert_eq!(result.predicted_class, Label::Glioma);
    assert!((result.class_probabilities.sum() - 1.0).abs() <= 1e-6);
    assert_eq!(
        result.confidence,
        result.class_probabilities.get(result.predicted_class)
    );
    assert_eq!(result.model_accuracy, 0.95);
    assert_eq!(result.risk_level.level, "HIGH RISK");
    assert_eq!(result.risk_level.color_tag, "red");
    assert!(result.activation_maps.is_none());
}

#[test]
fn probabilities_iterate_in_label_order() {
    let result = parse(GLIOMA_BODY).unwrap();
    let labels: Vec<Label> = result.class_probabilities.iter().map(|(l, _)| l).collect();
    assert_eq!(labels, Label::ALL.to_vec());
}

#[test]
fn sum_outside_tolerance_is_rejected() {
    let body = GLIOMA_BODY.replace("\"pituitary\": 0.03", "\"pituitary\": 0.0301");
    let err = parse(&body).unwrap_err();
    assert!(err.contains("sum"), "{}", err);
}

#[test]
fn confidence_must_match_predicted_probability() {
    let body = GLIOMA_BODY.replace("\"confidence\": 0.82", "\"confidence\": 0.9");
    let err = parse(&body).unwrap_err();
    assert!(err.contains("confidence"), "{}", err);
}

#[test]
fn missing_or_unknown_labels_are_rejected() {
    let missing = r#"{
        "prediction": "glioma",
        "probabilities": {"glioma": 0.9, "meningioma": 0.1},
        "confidence": 0.9,
        "model_accuracy": 0.9,
        "risk_level": {"level": "HIGH RISK", "color": "red"}
    }"#;
    assert!(parse(missing).unwrap_err().contains("missing"));

    let unknown = GLIOMA_BODY.replace("\"prediction\": \"glioma\"", "\"prediction\": \"astrocytoma\"");
    assert!(parse(&unknown).unwrap_err().contains("unknown label"));
}

#[test]
fn negative_probability_is_rejected() {
    let body = r#"{
        "prediction": "glioma",
        "probabilities": {"glioma": 1.05, "meningioma": -0.05, "no_tumor": 0.0, "pituitary": 0.0},
        "confidence": 1.05,
        "model_accuracy": 0.9,
        "risk_level": {"level": "HIGH RISK", "color": "red"}
    }"#;
    assert!(parse(body).unwrap_err().contains("out of range"));
}

#[test]
fn model_accuracy_outside_unit_interval_is_rejected() {
    let body = GLIOMA_BODY.replace("\"model_accuracy\": 0.95", "\"model_accuracy\": 88.3");
    assert!(parse(&body).unwrap_err().contains("accuracy"));
}

#[test]
fn activation_maps_must_cover_every_label() {
    let png = png_base64(4, 4);
    let full = with_gradcam(&[
        ("glioma", png.clone()),
        ("meningioma", png.clone()),
        ("no_tumor", png.clone()),
        ("pituitary", format!("data:image/png;base64,{}", png)),
    ]);
    let result = parse(&full).unwrap();
    let maps = result.activation_maps.unwrap();
    let labels: Vec<Label> = maps.iter().map(|(l, _)| l).collect();
    assert_eq!(labels, Label::ALL.to_vec());
    assert_eq!(maps.get(Label::Glioma), maps.get(Label::Pituitary));

    let partial = with_gradcam(&[("glioma", png.clone()), ("meningioma", png)]);
    assert!(parse(&partial).unwrap_err().contains("activation maps"));
}

#[test]
fn undecodable_activation_map_is_rejected() {
    let png = png_base64(2, 2);
    let body = with_gradcam(&[
        ("glioma", png.clone()),
        ("meningioma", png.clone()),
        ("no_tumor", png),
        ("pituitary", "!!not-base64!!".to_string()),
    ]);
    assert!(parse(&body).unwrap_err().contains("base64"));
}

#[test]
fn uploaded_image_echo_is_decoded() {
    let body = GLIOMA_BODY.replace(
        "\"model_accuracy\": 0.95,",
        &format!("\"model_accuracy\": 0.95, \"uploaded_image\": \"{}\",", png_base64(3, 3)),
    );
    let result = parse(&body).unwrap();
    let echo = result.uploaded_image.unwrap();
    assert_eq!(&echo[1..4], b"PNG");
}

#[test]
fn label_names() {
    assert_eq!(Label::NoTumor.as_str(), "no_tumor");
    assert_eq!(Label::NoTumor.display_name(), "no tumor");
    assert_eq!("pituitary".parse::<Label>(), Ok(Label::Pituitary));
    assert!("".parse::<Label>().is_err());
}

#[test]
fn per_class_rounding_drift_beyond_tolerance_is_rejected() {
    let body = r#"{
        "prediction": "glioma",
        "probabilities": {"glioma": 0.700001, "meningioma": 0.100001, "no_tumor": 0.1, "pituitary": 0.1},
        "confidence": 0.700001,
        "model_accuracy": 0.9,
        "risk_level": {"level": "HIGH RISK", "color": "red"}
    }"#;
    assert!(parse(body).unwrap_err().contains("sum"));

    let within = body
        .replace("0.100001", "0.1")
        .replace("0.700001", "0.7000005");
    assert!(parse(&within).is_ok());
}
