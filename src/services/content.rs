use crate::error::AppError;
use crate::models::classify_types::Label;
use crate::models::view_types::{KeyValue, NamedDescription};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const BUILTIN_CONTENT: &str = include_str!("../../assets/content.json");

static BUILTIN: OnceLock<ContentTables> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Narrative {
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportText {
    pub title: String,
    pub subtitle: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivationText {
    pub title: String,
    pub intro: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawKeyValue {
    label: String,
    value: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawNamed {
    name: String,
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawQuantum {
    specs: Vec<RawKeyValue>,
    circuit: Vec<String>,
    gates: Vec<RawNamed>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawFeatures {
    intro: String,
    steps: Vec<RawNamed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadingText {
    pub title: String,
    pub subtitle: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawContent {
    narratives: HashMap<String, Narrative>,
    fallback_narrative: String,
    report: ReportText,
    activation: ActivationText,
    quantum: RawQuantum,
    features: RawFeatures,
    loading: LoadingText,
}

/// Static per-label and per-tab text. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ContentTables {
    narratives: HashMap<String, Narrative>,
    fallback: Narrative,
    pub report: ReportText,
    pub activation: ActivationText,
    pub quantum_specs: Vec<KeyValue>,
    pub quantum_circuit: Vec<String>,
    pub quantum_gates: Vec<NamedDescription>,
    pub feature_intro: String,
    pub feature_steps: Vec<NamedDescription>,
    pub loading: LoadingText,
}

impl ContentTables {
    /// The tables embedded in the binary, parsed on first use.
    pub fn builtin() -> Result<&'static ContentTables, AppError> {
        if let Some(tables) = BUILTIN.get() {
            return Ok(tables);
        }
        let parsed = Self::from_json(BUILTIN_CONTENT)?;
        Ok(BUILTIN.get_or_init(|| parsed))
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let raw: RawContent = serde_json::from_str(raw).map_err(|e| AppError {
            message: format!("Failed to parse content tables: {}", e),
        })?;

        if let Some(missing) = Label::ALL
            .iter()
            .find(|label| !raw.narratives.contains_key(label.as_str()))
        {
            return Err(format!("Content tables missing narrative for {}", missing).into());
        }

        let fallback = raw
            .narratives
            .get(&raw.fallback_narrative)
            .cloned()
            .ok_or_else(|| AppError {
                message: format!(
                    "Fallback narrative '{}' is not in the narrative table",
                    raw.fallback_narrative
                ),
            })?;

        Ok(ContentTables {
            narratives: raw.narratives,
            fallback,
            report: raw.report,
            activation: raw.activation,
            quantum_specs: raw
                .quantum
                .specs
                .into_iter()
                .map(|kv| KeyValue {
                    label: kv.label,
                    value: kv.value,
                })
                .collect(),
            quantum_circuit: raw.quantum.circuit,
            quantum_gates: raw.quantum.gates.into_iter().map(named).collect(),
            feature_intro: raw.features.intro,
            feature_steps: raw.features.steps.into_iter().map(named).collect(),
            loading: raw.loading,
        })
    }

    /// Narrative for a label key; unknown keys get the fallback entry.
    pub fn narrative(&self, key: &str) -> &Narrative {
        self.narratives.get(key).unwrap_or(&self.fallback)
    }
}

fn named(raw: RawNamed) -> NamedDescription {
    NamedDescription {
        name: raw.name,
        description: raw.description,
    }
}
