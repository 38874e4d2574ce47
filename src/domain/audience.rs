// ==========================================
// Fieldwork costing - audience & sample plan model
// ==========================================
// Audience: one target group in one sample phase
// SamplesMap: province -> audience-key -> Audience
// ==========================================

use crate::domain::ordered::OrderedMap;
use crate::domain::types::{Complexity, Gender, PriceType, SampleType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// Structured comments
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKey {
    PriceGrowth,
    TargetForInterviewer,
    InterviewersPerSupervisor,
    DailyInterviewTarget,
    DailySupTarget,
}

impl fmt::Display for CommentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommentKey::PriceGrowth => "price_growth",
            CommentKey::TargetForInterviewer => "target_for_interviewer",
            CommentKey::InterviewersPerSupervisor => "interviewers_per_supervisor",
            CommentKey::DailyInterviewTarget => "daily_interview_target",
            CommentKey::DailySupTarget => "daily_sup_target",
        };
        f.write_str(s)
    }
}

pub type CommentMap = BTreeMap<CommentKey, String>;

/// Render a comment map as `key: text, key: text`
pub fn render_comments(comments: &CommentMap) -> String {
    comments
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(key, text)| format!("{}: {}", key, text.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ==========================================
// PriceEntry - one priced facet of an audience
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub price: Decimal,
    #[serde(default)]
    pub price_growth: Decimal, // percent; negative is a discount
    #[serde(rename = "type")]
    pub price_type: PriceType,
    #[serde(default)]
    pub comment: CommentMap,
}

impl PriceEntry {
    pub fn new(price: Decimal, price_type: PriceType) -> Self {
        Self {
            price,
            price_growth: Decimal::ZERO,
            price_type,
            comment: CommentMap::new(),
        }
    }

    /// price × (1 + growth/100)
    pub fn effective_price(&self) -> Decimal {
        self.price * (Decimal::ONE + self.price_growth / Decimal::ONE_HUNDRED)
    }
}

// ==========================================
// TargetSchedule - productivity targets from the rate card
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSchedule {
    pub daily_interview_target: Decimal,
    pub target_for_interviewer: Decimal,
    pub interviewers_per_supervisor: Decimal,
    pub daily_sup_target: Decimal,
    /// daily_sup_target was entered by the user and is not re-derived
    pub custom: bool,
}

impl TargetSchedule {
    /// round(sample_size / target_for_interviewer / interviewers_per_supervisor, 2)
    ///
    /// Zero when either divisor is not positive.
    pub fn derive_daily_sup_target(&self, sample_size: u32) -> Decimal {
        if self.target_for_interviewer <= Decimal::ZERO
            || self.interviewers_per_supervisor <= Decimal::ZERO
        {
            return Decimal::ZERO;
        }
        (Decimal::from(sample_size) / self.target_for_interviewer / self.interviewers_per_supervisor)
            .round_dp(2)
    }

    /// Re-derive daily_sup_target unless the user pinned it
    pub fn refresh(&mut self, sample_size: u32) {
        if !self.custom {
            self.daily_sup_target = self.derive_daily_sup_target(sample_size);
        }
    }
}

// ==========================================
// Audience
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audience {
    #[serde(default)]
    pub audience_id: String,
    pub sample_type: SampleType,
    #[serde(default)]
    pub industry: String,
    pub target_audience: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "default_age_group")]
    pub age_group: [u32; 2],
    #[serde(default)]
    pub household_income: [u64; 2],
    #[serde(default = "default_incident_rate")]
    pub incident_rate: Decimal,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sample_size: u32,
    #[serde(default)]
    pub extra_rate: Decimal,
    /// sample_size / extra_rate were edited for this province and
    /// survive plan rebuilds; otherwise the audience list wins
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub province_edited: bool,
    #[serde(default)]
    pub pricing: Vec<PriceEntry>,
    #[serde(default)]
    pub target: TargetSchedule,
    #[serde(default)]
    pub comment: CommentMap,
}

fn default_age_group() -> [u32; 2] {
    [18, 65]
}

fn default_incident_rate() -> Decimal {
    Decimal::ONE_HUNDRED
}

impl Audience {
    /// Minimal audience with document defaults
    pub fn new(sample_type: SampleType, target_audience: impl Into<String>, sample_size: u32) -> Self {
        Self {
            audience_id: String::new(),
            sample_type,
            industry: String::new(),
            target_audience: target_audience.into(),
            gender: Gender::default(),
            age_group: default_age_group(),
            household_income: [0, 0],
            incident_rate: default_incident_rate(),
            complexity: Complexity::default(),
            description: String::new(),
            sample_size,
            extra_rate: Decimal::ZERO,
            province_edited: false,
            pricing: Vec::new(),
            target: TargetSchedule::default(),
            comment: CommentMap::new(),
        }
    }

    /// "<sample-type> - <target-audience-name>"
    pub fn key(&self) -> String {
        audience_key(self.sample_type, &self.target_audience)
    }

    /// sample_size + ceil(sample_size × extra_rate / 100)
    pub fn effective_size(&self) -> Decimal {
        let size = Decimal::from(self.sample_size);
        size + (size * self.extra_rate / Decimal::ONE_HUNDRED).ceil()
    }

    pub fn price_entry(&self, price_type: PriceType) -> Option<&PriceEntry> {
        self.pricing.iter().find(|p| p.price_type == price_type)
    }
}

pub fn audience_key(sample_type: SampleType, target_audience: &str) -> String {
    format!("{} - {}", sample_type, target_audience)
}

// ==========================================
// SamplesMap - province -> audience-key -> Audience
// ==========================================
// Provinces and audiences keep insertion order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamplesMap {
    provinces: OrderedMap<OrderedMap<Audience>>,
}

impl SamplesMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    pub fn provinces(&self) -> impl Iterator<Item = &str> {
        self.provinces.keys()
    }

    pub fn contains_province(&self, province: &str) -> bool {
        self.provinces.contains_key(province)
    }

    /// Audiences of a province in insertion order (empty when unknown)
    pub fn audiences(&self, province: &str) -> impl Iterator<Item = &Audience> {
        self.provinces
            .get(province)
            .into_iter()
            .flat_map(|audiences| audiences.values())
    }

    pub fn audience(&self, province: &str, key: &str) -> Option<&Audience> {
        self.provinces.get(province)?.get(key)
    }

    pub fn audience_mut(&mut self, province: &str, key: &str) -> Option<&mut Audience> {
        self.provinces.get_mut(province)?.get_mut(key)
    }

    /// Insert an audience under its own key, creating the province if needed
    pub fn insert(&mut self, province: &str, audience: Audience) {
        let key = audience.key();
        match self.provinces.get_mut(province) {
            Some(audiences) => {
                audiences.insert(key, audience);
            }
            None => {
                let mut audiences = OrderedMap::new();
                audiences.insert(key, audience);
                self.provinces.insert(province, audiences);
            }
        }
    }

    /// Register a province with no audiences yet
    pub fn ensure_province(&mut self, province: &str) {
        if !self.provinces.contains_key(province) {
            self.provinces.insert(province, OrderedMap::new());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Audience)> {
        self.provinces
            .iter()
            .flat_map(|(province, audiences)| audiences.values().map(move |a| (province, a)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Audience> {
        self.provinces
            .values_mut()
            .flat_map(|audiences| audiences.values_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_effective_size_rounds_extra_up() {
        let mut audience = Audience::new(SampleType::Main, "Mothers", 100);
        audience.extra_rate = dec!(10);
        assert_eq!(audience.effective_size(), dec!(110));

        audience.sample_size = 33;
        // 33 × 10% = 3.3 -> 4
        assert_eq!(audience.effective_size(), dec!(37));
    }

    #[test]
    fn test_effective_price_with_growth_and_discount() {
        let mut entry = PriceEntry::new(dec!(100000), PriceType::Recruit);
        entry.price_growth = dec!(15);
        assert_eq!(entry.effective_price(), dec!(115000));

        entry.price_growth = dec!(-20);
        assert_eq!(entry.effective_price(), dec!(80000));
    }

    #[test]
    fn test_daily_sup_target_derivation() {
        let mut target = TargetSchedule {
            target_for_interviewer: dec!(3),
            interviewers_per_supervisor: dec!(10),
            ..Default::default()
        };
        target.refresh(100);
        assert_eq!(target.daily_sup_target, dec!(3.33));

        target.custom = true;
        target.daily_sup_target = dec!(7);
        target.refresh(500);
        assert_eq!(target.daily_sup_target, dec!(7));

        let zero = TargetSchedule::default();
        assert_eq!(zero.derive_daily_sup_target(100), Decimal::ZERO);
    }

    #[test]
    fn test_samples_map_json_shape() {
        let mut samples = SamplesMap::new();
        samples.insert("Hà Nội", Audience::new(SampleType::Main, "Mothers", 100));
        samples.insert("Hà Nội", Audience::new(SampleType::Pilot, "Mothers", 10));

        let value = serde_json::to_value(&samples).unwrap();
        assert!(value["Hà Nội"]["Main - Mothers"].is_object());
        assert_eq!(value["Hà Nội"]["Pilot - Mothers"]["sample_size"], 10);

        let back: SamplesMap = serde_json::from_value(value).unwrap();
        let keys: Vec<String> = back.audiences("Hà Nội").map(|a| a.key()).collect();
        assert_eq!(keys, vec!["Main - Mothers", "Pilot - Mothers"]);
    }
}
