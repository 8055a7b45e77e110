use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[serde(rename = "gradcam")]
    ActivationMaps,
    Quantum,
    Features,
    Confidence,
    Clinical,
}

impl Tab {
    /// Strip order; the first entry is the initial tab.
    pub const ALL: [Tab; 5] = [
        Tab::ActivationMaps,
        Tab::Quantum,
        Tab::Features,
        Tab::Confidence,
        Tab::Clinical,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::ActivationMaps => "gradcam",
            Tab::Quantum => "quantum",
            Tab::Features => "features",
            Tab::Confidence => "confidence",
            Tab::Clinical => "clinical",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::ActivationMaps => "Grad-CAM",
            Tab::Quantum => "Quantum Analysis",
            Tab::Features => "Feature Analysis",
            Tab::Confidence => "Confidence Analysis",
            Tab::Clinical => "Clinical Report",
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Tab::ALL[0]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tab::ALL
            .iter()
            .copied()
            .find(|tab| tab.id() == wanted)
            .ok_or_else(|| {
                let ids: Vec<&str> = Tab::ALL.iter().map(Tab::id).collect();
                format!("unknown tab '{}', expected one of: {}", s, ids.join(", "))
            })
    }
}

/// Which tab is showing. Only user selection moves it; a new result resets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabSelection {
    active: Tab,
}

impl TabSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn reset(&mut self) {
        self.active = Tab::default();
    }
}
