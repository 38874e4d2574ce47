// ==========================================
// Fieldwork costing - domain type definitions
// ==========================================
// Enumerations shared by the project document, the catalogues
// and the pricing engine. Serialized labels match the project
// JSON document and the catalogue files.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Project type
// ==========================================
// Key of the rate-card catalogue and the cost hierarchy root
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    #[serde(rename = "F2F/D2D")]
    F2fD2d, // face-to-face / door-to-door
    #[serde(rename = "HUT")]
    Hut, // home-use test
    #[serde(rename = "CLT")]
    Clt, // central-location test
    #[serde(rename = "CATI")]
    Cati, // telephone interviewing
}

impl ProjectType {
    pub const ALL: [ProjectType; 4] = [
        ProjectType::F2fD2d,
        ProjectType::Hut,
        ProjectType::Clt,
        ProjectType::Cati,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::F2fD2d => "F2F/D2D",
            ProjectType::Hut => "HUT",
            ProjectType::Clt => "CLT",
            ProjectType::Cati => "CATI",
        }
    }

    /// Parse a catalogue/document label (case-insensitive)
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "F2F/D2D" | "F2F" | "D2D" => Some(ProjectType::F2fD2d),
            "HUT" => Some(ProjectType::Hut),
            "CLT" => Some(ProjectType::Clt),
            "CATI" => Some(ProjectType::Cati),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Sample type (fieldwork phase)
// ==========================================
// Declaration order is the emission order: Pilot < Main < Booster < Non
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SampleType {
    Pilot,
    Main,
    Booster,
    Non,
}

impl SampleType {
    pub const ALL: [SampleType; 4] = [
        SampleType::Pilot,
        SampleType::Main,
        SampleType::Booster,
        SampleType::Non,
    ];

    /// Position within a province's pricing rows
    pub fn emission_order(&self) -> u8 {
        match self {
            SampleType::Pilot => 0,
            SampleType::Main => 1,
            SampleType::Booster => 2,
            SampleType::Non => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::Pilot => "Pilot",
            SampleType::Main => "Main",
            SampleType::Booster => "Booster",
            SampleType::Non => "Non",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pilot" => Some(SampleType::Pilot),
            "main" => Some(SampleType::Main),
            "booster" => Some(SampleType::Booster),
            "non" | "none" => Some(SampleType::Non),
            _ => None,
        }
    }

    /// Pilot and Non are excluded from S*
    pub fn is_core(&self) -> bool {
        matches!(self, SampleType::Main | SampleType::Booster)
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Price entry facet
// ==========================================
// Main/Booster are split into recruit + location;
// pilot/non are single priced. `main`/`booster` appear in older documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Pilot,
    Non,
    Recruit,
    Location,
    Main,
    Booster,
}

impl PriceType {
    /// Label used in "Chi phí Phiếu PV - <label>"
    pub fn line_label(&self) -> &'static str {
        match self {
            PriceType::Pilot => "Pilot",
            PriceType::Main => "Main",
            PriceType::Booster => "Booster",
            PriceType::Non => "None",
            PriceType::Recruit => "Recruit",
            PriceType::Location => "In Location",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriceType::Pilot => "pilot",
            PriceType::Non => "non",
            PriceType::Recruit => "recruit",
            PriceType::Location => "location",
            PriceType::Main => "main",
            PriceType::Booster => "booster",
        };
        f.write_str(s)
    }
}

// ==========================================
// Audience attributes
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Complexity {
    Basic,
    #[default]
    Standard,
    Complex,
}

// ==========================================
// Data collection platform
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    #[serde(rename = "iField")]
    IField,
    Dimension,
}

// ==========================================
// Interviewing device
// ==========================================
// Selecting a device flips exactly one device-rental toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceChoice {
    #[default]
    #[serde(rename = "")]
    NoDevice,
    #[serde(rename = "Tablet < 9 inch")]
    TabletUnder9,
    #[serde(rename = "Tablet >= 9 inch")]
    TabletAtLeast9,
    #[serde(rename = "Laptop")]
    Laptop,
}

// ==========================================
// QC team
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QcTeam {
    FW,
    QC,
    DP,
}

// ==========================================
// Staff level (assignments / travel cost table)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StaffLevel {
    Junior,
    Senior,
    Manager,
    Director,
}

impl fmt::Display for StaffLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StaffLevel::Junior => "Junior",
            StaffLevel::Senior => "Senior",
            StaffLevel::Manager => "Manager",
            StaffLevel::Director => "Director",
        };
        f.write_str(s)
    }
}

// ==========================================
// Travel
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportationType {
    #[default]
    #[serde(rename = "tàu/xe")]
    Ground,
    #[serde(rename = "máy bay")]
    Air,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelRole {
    Supervisor,
    Interviewer,
    Qc,
}

impl TravelRole {
    pub fn line_label(&self) -> &'static str {
        match self {
            TravelRole::Supervisor => "Supervisor",
            TravelRole::Interviewer => "Interviewer",
            TravelRole::Qc => "QC",
        }
    }
}
