// ==========================================
// Fieldwork costing - travel plan model
// ==========================================
// province -> { fulltime: {...}, parttime: role -> slots }
// Fulltime travellers are referenced by assignment email.
// ==========================================

use crate::domain::types::{StaffLevel, TransportationType, TravelRole};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fulltime staff travelling to a province
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FulltimeTravel {
    pub travel_days: u32,
    pub travel_nights: u32,
    pub assigned_people: Vec<String>,
    pub transportation_type: TransportationType,
}

/// Parttime headcount per travel slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParttimeSlots {
    pub distant: u32,
    pub nearby: u32,
    pub recruit_distant: u32,
    pub recruit_nearby: u32,
    pub ngoi_ban_distant: u32,
    pub ngoi_ban_nearby: u32,
}

impl ParttimeSlots {
    pub fn distant_total(&self) -> u32 {
        self.distant + self.recruit_distant + self.ngoi_ban_distant
    }

    pub fn nearby_total(&self) -> u32 {
        self.nearby + self.recruit_nearby + self.ngoi_ban_nearby
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvinceTravel {
    pub fulltime: FulltimeTravel,
    pub parttime: BTreeMap<TravelRole, ParttimeSlots>,
}

impl ProvinceTravel {
    /// An entry that carries no travellers at all
    pub fn is_empty(&self) -> bool {
        self.fulltime.assigned_people.is_empty()
            && self.fulltime.travel_days == 0
            && self
                .parttime
                .values()
                .all(|slots| slots.distant_total() == 0 && slots.nearby_total() == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelPlan {
    pub provinces: BTreeMap<String, ProvinceTravel>,
}

impl TravelPlan {
    pub fn get(&self, province: &str) -> Option<&ProvinceTravel> {
        self.provinces.get(province)
    }

    /// The TRAVEL subtree is priced only when some province has an entry
    pub fn has_any_entry(&self) -> bool {
        self.provinces.values().any(|t| !t.is_empty())
    }
}

// ==========================================
// Travel cost per staff level
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelCost {
    pub allowance_per_day: Decimal,
    pub accommodation_per_night: Decimal,
    pub flight_ticket: Decimal,
}

pub type TravelCostTable = BTreeMap<StaffLevel, TravelCost>;
