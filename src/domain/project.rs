// ==========================================
// Fieldwork costing - project document
// ==========================================
// Root document edited by the UI, serialized to JSON on save.
// Top-level keys: general, sampling_methods, clt_settings,
// hut_settings, cost_toggles, settings, samples, qc_methods,
// travel, assignments, additional_costs, subcontracts
// ==========================================

use crate::config::catalogues;
use crate::domain::audience::{Audience, SamplesMap};
use crate::domain::travel::{TravelCostTable, TravelPlan};
use crate::domain::types::{DeviceChoice, Platform, ProjectType, QcTeam, SampleType, StaffLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Placeholder of an unselected combo box
pub const SELECT_SENTINEL: &str = "-- Select --";

/// True when a combo value is empty or still the sentinel
pub fn is_unselected(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == SELECT_SENTINEL
}

// ==========================================
// Printer plan (nine counters)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterCounters {
    pub bw_page_count: u32,
    pub showphoto_page_count: u32,
    pub showcard_page_count: u32,
    pub dropcard_page_count: u32,
    pub color_page_count: u32,
    pub decal_page_count: u32,
    pub laminated_page_count: u32,
    pub stimulus_material_production_count: u32,
    pub form_package_count: u32,
}

// ==========================================
// Data processing flags
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataProcessing {
    pub scripting: bool,
    pub data_processing: bool,
    pub coding: bool,
    pub data_entry: bool,
    pub methods: Vec<String>,
    pub open_ended_main_count: u32,
    pub open_ended_booster_count: u32,
}

// ==========================================
// General info
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralInfo {
    pub internal_job: String,
    pub symphony: String,
    pub project_name: String,
    pub project_type: Option<ProjectType>,
    pub clients: Vec<String>,
    pub objectives: String,
    pub platform: Platform,
    pub interview_methods: Vec<String>,
    pub recruit_methods: Vec<String>,
    pub sampling_method: String,
    pub type_of_quota_control: String,
    pub quota_description: Vec<String>,
    pub resp_classification: String,
    pub service_line: String,
    pub provinces: Vec<String>,
    pub industries: Vec<String>,
    pub target_audiences: Vec<Audience>,
    pub interview_length: u32,
    pub questionnaire_length: u32,
    pub device: DeviceChoice,
    pub tablet_usage_duration: String,
    pub printer: PrinterCounters,
    pub data_processing: DataProcessing,
}

impl Default for GeneralInfo {
    fn default() -> Self {
        Self {
            internal_job: String::new(),
            symphony: String::new(),
            project_name: String::new(),
            project_type: None,
            clients: Vec::new(),
            objectives: String::new(),
            platform: Platform::default(),
            interview_methods: Vec::new(),
            recruit_methods: Vec::new(),
            sampling_method: SELECT_SENTINEL.to_string(),
            type_of_quota_control: SELECT_SENTINEL.to_string(),
            quota_description: Vec::new(),
            resp_classification: SELECT_SENTINEL.to_string(),
            service_line: String::new(),
            provinces: Vec::new(),
            industries: Vec::new(),
            target_audiences: Vec::new(),
            interview_length: 0,
            questionnaire_length: 0,
            device: DeviceChoice::default(),
            tablet_usage_duration: String::new(),
            printer: PrinterCounters::default(),
            data_processing: DataProcessing::default(),
        }
    }
}

// ==========================================
// Sampling method entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingMethodEntry {
    pub sample_type: SampleType,
    pub sampling_method: String,
    #[serde(default)]
    pub description: String,
}

// ==========================================
// CLT / HUT settings
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CltSettings {
    pub test_products: Vec<String>,
    pub respondent_visits: u32,
    pub sample_usage: String,
    pub label_count: u32,
    pub label_methods: Vec<String>,
    pub preparation_steps: Vec<String>,
    pub supply_requirements: Vec<String>,
    pub delivery_method: String,
    pub return_unused_samples: bool,
    pub return_used_samples: bool,
    pub total_concepts: u32,
    pub concepts_per_respondent: u32,
    pub dan_mau_days: u32,
    pub sample_size_per_day: Decimal,
    /// province -> desk interviewers
    pub desk_interviewers: BTreeMap<String, u32>,
    pub assistant_setup_days: Decimal,
    pub failure_rate: Decimal,
    pub sample_recruit_idi: u32,
}

impl Default for CltSettings {
    fn default() -> Self {
        Self {
            test_products: Vec::new(),
            respondent_visits: 1,
            sample_usage: String::new(),
            label_count: 0,
            label_methods: Vec::new(),
            preparation_steps: Vec::new(),
            supply_requirements: Vec::new(),
            delivery_method: String::new(),
            return_unused_samples: false,
            return_used_samples: false,
            total_concepts: 0,
            concepts_per_respondent: 0,
            dan_mau_days: 0,
            sample_size_per_day: Decimal::ZERO,
            desk_interviewers: BTreeMap::new(),
            assistant_setup_days: Decimal::ONE,
            failure_rate: Decimal::ZERO,
            sample_recruit_idi: 0,
        }
    }
}

impl CltSettings {
    pub fn desk_interviewers_in(&self, province: &str) -> u32 {
        self.desk_interviewers.get(province).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HutSettings {
    pub test_products: Vec<String>,
    pub usage_duration_days: i32,
}

// ==========================================
// Cost toggles
// ==========================================
// group -> description -> enabled
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostToggles {
    pub groups: BTreeMap<String, BTreeMap<String, bool>>,
}

pub mod toggle_groups {
    pub const DEVICE_RENTAL: &str = "device_rental";
    pub const IDI: &str = "idi";
    pub const FAILURE_RATE: &str = "failure_rate";
    pub const QC_METHOD_COSTS: &str = "qc_method_costs";
    pub const QC_COMMUNICATION_COST: &str = "qc_communication_cost";
    pub const DP: &str = "dp";
    pub const INCENTIVE: &str = "incentive";
    pub const STATIONERY: &str = "stationery";
}

impl CostToggles {
    pub fn set(&mut self, group: &str, description: &str, enabled: bool) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(description.to_string(), enabled);
    }

    pub fn get(&self, group: &str, description: &str) -> Option<bool> {
        self.groups.get(group)?.get(description).copied()
    }

    /// Whether a cost description is enabled
    ///
    /// - group given: only that group is consulted
    /// - no group: every group is searched, any `false` disables
    /// - unknown descriptions are enabled
    pub fn is_enabled(&self, description: &str, group: Option<&str>) -> bool {
        match group.filter(|g| !g.is_empty()) {
            Some(group) => self.get(group, description).unwrap_or(true),
            None => self
                .groups
                .values()
                .filter_map(|flags| flags.get(description))
                .all(|enabled| *enabled),
        }
    }
}

// ==========================================
// QC / staffing / extras
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcMethodEntry {
    pub team: QcTeam,
    pub qc_method: String,
    #[serde(default)]
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub level: StaffLevel,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalCost {
    pub category: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub description: String,
    pub is_dp_coding: bool,
    pub provinces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subcontract {
    pub vendor: String,
    pub description: String,
    pub unit: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub provinces: Vec<String>,
}

// ==========================================
// Project settings
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub parking_fee: Decimal,
    pub travel_cost_by_level: TravelCostTable,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            parking_fee: catalogues::DEFAULT_PARKING_FEE,
            travel_cost_by_level: TravelCostTable::new(),
        }
    }
}

// ==========================================
// Project - root document
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub general: GeneralInfo,
    pub sampling_methods: Vec<SamplingMethodEntry>,
    pub clt_settings: CltSettings,
    pub hut_settings: HutSettings,
    pub cost_toggles: CostToggles,
    pub settings: ProjectSettings,
    pub samples: SamplesMap,
    pub qc_methods: Vec<QcMethodEntry>,
    pub travel: TravelPlan,
    pub assignments: Vec<Assignment>,
    pub additional_costs: Vec<AdditionalCost>,
    pub subcontracts: Vec<Subcontract>,
}

impl Project {
    /// Union of sample types across sampling-method entries
    pub fn active_sample_types(&self) -> BTreeSet<SampleType> {
        self.sampling_methods.iter().map(|m| m.sample_type).collect()
    }

    pub fn project_type(&self) -> Option<ProjectType> {
        self.general.project_type
    }

    pub fn assignment(&self, email: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Reserved save name: `<internal_job_without_dashes>_<project_name>.json`
    ///
    /// Path separators in the project name become `_` so the file stays
    /// in the target directory.
    pub fn reserved_filename(&self) -> String {
        let name: String = self
            .general
            .project_name
            .trim()
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}_{}.json", self.general.internal_job.replace('-', ""), name)
    }

    /// An additional cost flagged as DP coding replaces the automatic line
    pub fn has_manual_dp_coding(&self) -> bool {
        self.additional_costs.iter().any(|c| c.is_dp_coding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_filename() {
        let mut project = Project::default();
        project.general.internal_job = "2024-015".to_string();
        project.general.project_name = "Milk U&A".to_string();
        assert_eq!(project.reserved_filename(), "2024015_Milk U&A.json");
    }

    #[test]
    fn test_reserved_filename_strips_path_separators() {
        let mut project = Project::default();
        project.general.internal_job = "2024-015".to_string();
        project.general.project_name = "../Milk/U&A\\2024".to_string();
        let name = project.reserved_filename();
        assert_eq!(name, "2024015_.._Milk_U&A_2024.json");
        assert_eq!(std::path::Path::new(&name).components().count(), 1);
    }

    #[test]
    fn test_toggles_group_and_global_lookup() {
        let mut toggles = CostToggles::default();
        toggles.set(toggle_groups::QC_METHOD_COSTS, "Chi phí QC - In home", false);

        assert!(!toggles.is_enabled("Chi phí QC - In home", Some(toggle_groups::QC_METHOD_COSTS)));
        assert!(toggles.is_enabled("Chi phí QC - In home", Some(toggle_groups::DP)));
        assert!(!toggles.is_enabled("Chi phí QC - In home", None));
        assert!(toggles.is_enabled("Unknown line", None));
        assert!(toggles.is_enabled("Unknown line", Some("")));
    }

    #[test]
    fn test_document_defaults_from_empty_json() {
        let project: Project = serde_json::from_str("{}").unwrap();
        assert_eq!(project.general.sampling_method, SELECT_SENTINEL);
        assert_eq!(project.settings.parking_fee, Decimal::from(5000));
        assert_eq!(project.clt_settings.assistant_setup_days, Decimal::ONE);
        assert!(project.samples.is_empty());
    }
}
