//! Fixed class sets emitted by the classifiers
//!
//! The declaration order of every enum is the output index of the network
//! trained for it, so reordering variants invalidates existing artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a label string is not part of a class set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {set} label: {label}")]
pub struct ParseLabelError {
    pub set: &'static str,
    pub label: String,
}

/// A closed, ordered set of labels a classifier may emit
pub trait ClassLabel:
    Copy + Eq + fmt::Debug + fmt::Display + Serialize + Send + Sync + 'static
{
    /// Human readable name of the set, used in logs and errors
    const SET_NAME: &'static str;

    /// Every label in network output order
    const ALL: &'static [Self];

    /// Display name of the label
    fn name(&self) -> &'static str;

    /// Label for a network output index
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Network output index of the label
    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|label| label == self)
            .unwrap_or_default()
    }

    /// Look a label up by its display name (case-insensitive)
    fn parse_name(name: &str) -> Result<Self, ParseLabelError> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLabelError {
                set: Self::SET_NAME,
                label: name.to_string(),
            })
    }

    /// Display names of the whole set, in output order
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|label| label.name()).collect()
    }
}

/// Crops recognised by the crop classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CropClass {
    Wheat,
    Rice,
    Maize,
    Sugarcane,
    Cotton,
    Potato,
    Tomato,
}

impl ClassLabel for CropClass {
    const SET_NAME: &'static str = "crop";

    const ALL: &'static [Self] = &[
        CropClass::Wheat,
        CropClass::Rice,
        CropClass::Maize,
        CropClass::Sugarcane,
        CropClass::Cotton,
        CropClass::Potato,
        CropClass::Tomato,
    ];

    fn name(&self) -> &'static str {
        match self {
            CropClass::Wheat => "Wheat",
            CropClass::Rice => "Rice",
            CropClass::Maize => "Maize",
            CropClass::Sugarcane => "Sugarcane",
            CropClass::Cotton => "Cotton",
            CropClass::Potato => "Potato",
            CropClass::Tomato => "Tomato",
        }
    }
}

impl fmt::Display for CropClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CropClass {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s)
    }
}

/// Plant conditions recognised by the disease classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiseaseClass {
    Healthy,
    #[serde(rename = "Leaf Blight")]
    LeafBlight,
    Rust,
    #[serde(rename = "Leaf Spot")]
    LeafSpot,
    #[serde(rename = "Mosaic Virus")]
    MosaicVirus,
    #[serde(rename = "Bacterial Wilt")]
    BacterialWilt,
}

impl DiseaseClass {
    /// Treatment advice shown next to the detected condition
    pub fn solution(&self) -> &'static str {
        match self {
            DiseaseClass::Healthy => {
                "Your plant looks healthy! Maintain watering & add compost every 15 days."
            }
            DiseaseClass::LeafBlight => "Spray Mancozeb or Chlorothalonil. Remove affected leaves.",
            DiseaseClass::Rust => "Use Sulfur spray. Avoid overhead irrigation.",
            DiseaseClass::LeafSpot => "Use Neem oil or Copper fungicide. Improve air flow.",
            DiseaseClass::MosaicVirus => "No cure. Remove infected plants + control insects.",
            DiseaseClass::BacterialWilt => {
                "Improve drainage. Apply bleaching powder in water channels."
            }
        }
    }
}

impl ClassLabel for DiseaseClass {
    const SET_NAME: &'static str = "disease";

    const ALL: &'static [Self] = &[
        DiseaseClass::Healthy,
        DiseaseClass::LeafBlight,
        DiseaseClass::Rust,
        DiseaseClass::LeafSpot,
        DiseaseClass::MosaicVirus,
        DiseaseClass::BacterialWilt,
    ];

    fn name(&self) -> &'static str {
        match self {
            DiseaseClass::Healthy => "Healthy",
            DiseaseClass::LeafBlight => "Leaf Blight",
            DiseaseClass::Rust => "Rust",
            DiseaseClass::LeafSpot => "Leaf Spot",
            DiseaseClass::MosaicVirus => "Mosaic Virus",
            DiseaseClass::BacterialWilt => "Bacterial Wilt",
        }
    }
}

impl fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiseaseClass {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, crop) in CropClass::ALL.iter().enumerate() {
            assert_eq!(crop.index(), i);
            assert_eq!(CropClass::from_index(i), Some(*crop));
        }
        assert_eq!(CropClass::from_index(CropClass::ALL.len()), None);
    }

    #[test]
    fn test_parse_disease_name() {
        assert_eq!(
            "leaf blight".parse::<DiseaseClass>().unwrap(),
            DiseaseClass::LeafBlight
        );
        let err = "Powdery Mildew".parse::<DiseaseClass>().unwrap_err();
        assert_eq!(err.set, "disease");
    }

    #[test]
    fn test_serialized_names_match_display() {
        for disease in DiseaseClass::ALL {
            let json = serde_json::to_string(disease).unwrap();
            assert_eq!(json, format!("\"{}\"", disease));
        }
    }
}
