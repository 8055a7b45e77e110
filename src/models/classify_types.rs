use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Allowed drift for the probability sum and the confidence cross-check.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// The closed label set, in the order the service enumerates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Glioma,
    Meningioma,
    NoTumor,
    Pituitary,
}

impl Label {
    pub const ALL: [Label; 4] = [
        Label::Glioma,
        Label::Meningioma,
        Label::NoTumor,
        Label::Pituitary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Glioma => "glioma",
            Label::Meningioma => "meningioma",
            Label::NoTumor => "no_tumor",
            Label::Pituitary => "pituitary",
        }
    }

    /// Human form, e.g. `no tumor`.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn index(&self) -> usize {
        match self {
            Label::Glioma => 0,
            Label::Meningioma => 1,
            Label::NoTumor => 2,
            Label::Pituitary => 3,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown label '{}'", s))
    }
}

/// One probability per label, stored in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities {
    values: [f64; 4],
}

impl ClassProbabilities {
    pub fn get(&self, label: Label) -> f64 {
        self.values[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, f64)> + '_ {
        Label::ALL.iter().map(move |label| (*label, self.values[label.index()]))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    fn from_wire(raw: &BTreeMap<String, f64>) -> Result<Self, String> {
        let mut values = [f64::NAN; 4];
        for (key, value) in raw {
            let label: Label = key.parse()?;
            if !value.is_finite() || *value < 0.0 || *value > 1.0 {
                return Err(format!("probability for {} out of range: {}", key, value));
            }
            values[label.index()] = *value;
        }
        if let Some(missing) = Label::ALL.iter().find(|l| values[l.index()].is_nan()) {
            return Err(format!("probability for {} missing", missing));
        }

        let probabilities = Self { values };
        let sum = probabilities.sum();
        // The service rounds each probability to 6 decimals, so a real payload
        // can drift by up to 2e-6 and land here.
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            tracing::debug!(
                sum,
                drift = sum - 1.0,
                tolerance = PROBABILITY_TOLERANCE,
                "probability sum outside tolerance"
            );
            return Err(format!("probabilities sum to {}, expected 1", sum));
        }
        Ok(probabilities)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLevel {
    pub level: String,
    #[serde(rename = "color")]
    pub color_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Decoded activation-map images, keyed by exactly the label set.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationMaps {
    maps: BTreeMap<Label, Vec<u8>>,
}

impl ActivationMaps {
    pub fn get(&self, label: Label) -> Option<&[u8]> {
        self.maps.get(&label).map(Vec::as_slice)
    }

    /// Iterates in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, &[u8])> + '_ {
        self.maps.iter().map(|(label, bytes)| (*label, bytes.as_slice()))
    }

    fn from_wire(raw: &BTreeMap<String, String>) -> Result<Self, String> {
        let mut maps = BTreeMap::new();
        for (key, encoded) in raw {
            let label: Label = key.parse()?;
            let bytes = decode_image_payload(encoded)
                .map_err(|e| format!("activation map for {} is not valid base64: {}", key, e))?;
            maps.insert(label, bytes);
        }
        if maps.len() != Label::ALL.len() {
            return Err(format!(
                "expected {} activation maps, got {}",
                Label::ALL.len(),
                maps.len()
            ));
        }
        Ok(Self { maps })
    }
}

/// Body of a successful `POST /predict`, as the service sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireClassification {
    pub prediction: String,
    pub probabilities: BTreeMap<String, f64>,
    pub confidence: f64,
    pub model_accuracy: f64,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradcam_images: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_image: Option<String>,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// A validated classification outcome. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub predicted_class: Label,
    pub class_probabilities: ClassProbabilities,
    pub confidence: f64,
    pub model_accuracy: f64,
    pub risk_level: RiskLevel,
    pub activation_maps: Option<ActivationMaps>,
    pub uploaded_image: Option<Vec<u8>>,
}

impl TryFrom<WireClassification> for ClassificationResult {
    type Error = String;

    fn try_from(wire: WireClassification) -> Result<Self, Self::Error> {
        let predicted_class: Label = wire.prediction.parse()?;
        let class_probabilities = ClassProbabilities::from_wire(&wire.probabilities)?;

        let expected = class_probabilities.get(predicted_class);
        if !wire.confidence.is_finite() || (wire.confidence - expected).abs() > PROBABILITY_TOLERANCE
        {
            return Err(format!(
                "confidence {} does not match probability {} of {}",
                wire.confidence, expected, predicted_class
            ));
        }

        if !wire.model_accuracy.is_finite() || !(0.0..=1.0).contains(&wire.model_accuracy) {
            return Err(format!("model accuracy out of range: {}", wire.model_accuracy));
        }

        let activation_maps = wire
            .gradcam_images
            .as_ref()
            .map(ActivationMaps::from_wire)
            .transpose()?;

        let uploaded_image = wire
            .uploaded_image
            .as_deref()
            .map(|encoded| {
                decode_image_payload(encoded)
                    .map_err(|e| format!("uploaded image is not valid base64: {}", e))
            })
            .transpose()?;

        Ok(ClassificationResult {
            predicted_class,
            class_probabilities,
            confidence: wire.confidence,
            model_accuracy: wire.model_accuracy,
            risk_level: wire.risk_level,
            activation_maps,
            uploaded_image,
        })
    }
}

/// Accepts bare base64 or a `data:<mime>;base64,` URI.
fn decode_image_payload(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    base64::engine::general_purpose::STANDARD.decode(payload.trim())
}
