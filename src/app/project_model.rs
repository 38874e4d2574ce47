// ==========================================
// Fieldwork costing - project model
// ==========================================
// Owns the Project document. Every editor intent:
//   1. builds the new state off to the side
//   2. fails without touching the document on error
//   3. swaps the new state in, re-derives toggles
//   4. notifies observers synchronously
// Provinces / audiences / sampling methods rebuild the sample plan.
// ==========================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::api::error::{ApiError, ApiResult};
use crate::catalogue::industries::IndustriesCatalogue;
use crate::catalogue::rate_card::RateCardCatalogue;
use crate::config::config_manager::EstimatorConfig;
use crate::domain::audience::{Audience, CommentKey, SamplesMap};
use crate::domain::project::{
    toggle_groups, AdditionalCost, Assignment, CltSettings, CostToggles, DataProcessing,
    GeneralInfo, HutSettings, PrinterCounters, Project, ProjectSettings, QcMethodEntry,
    SamplingMethodEntry, Subcontract,
};
use crate::domain::travel::TravelPlan;
use crate::domain::types::{DeviceChoice, PriceType};
use crate::engine::description::CostDescription;
use crate::engine::events::{ObserverList, ProjectChange, ProjectObserver, ProjectSection};
use crate::engine::sample_plan::SamplePlanBuilder;

pub struct ProjectModel {
    project: Project,
    observers: ObserverList,
    rate_cards: Arc<RateCardCatalogue>,
    industries: Arc<IndustriesCatalogue>,
    config: EstimatorConfig,
}

impl ProjectModel {
    /// New model holding a reset document
    pub fn new(
        rate_cards: Arc<RateCardCatalogue>,
        industries: Arc<IndustriesCatalogue>,
        config: EstimatorConfig,
    ) -> Self {
        let project = Project {
            settings: config.project_settings(),
            ..Default::default()
        };
        Self {
            project,
            observers: ObserverList::new(),
            rate_cards,
            industries,
            config,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn register_observer(&mut self, observer: Arc<dyn ProjectObserver>) {
        self.observers.register(observer);
    }

    fn notify(&self, source: &str, sections: Vec<ProjectSection>) {
        self.observers.notify(&ProjectChange::new(source, sections));
    }

    // ==========================================
    // Document lifecycle
    // ==========================================

    /// Back to defaults; settings re-seeded from config
    pub fn reset(&mut self) {
        self.project = Project {
            settings: self.config.project_settings(),
            ..Default::default()
        };
        tracing::info!("project reset");
        self.notify("reset", vec![ProjectSection::Document]);
    }

    pub fn to_json(&self) -> ApiResult<String> {
        serde_json::to_string_pretty(&self.project).map_err(|e| ApiError::Document {
            path: String::new(),
            message: e.to_string(),
        })
    }

    /// Replace the document from JSON
    ///
    /// An empty travel-cost table is seeded from config.
    pub fn from_json(&mut self, json: &str) -> ApiResult<()> {
        let mut project: Project = serde_json::from_str(json).map_err(|e| ApiError::Document {
            path: String::new(),
            message: e.to_string(),
        })?;
        if project.settings.travel_cost_by_level.is_empty() {
            project.settings.travel_cost_by_level = self.config.travel_costs.clone();
        }
        self.project = project;
        self.notify("load", vec![ProjectSection::Document]);
        Ok(())
    }

    /// Write `<dir>/<internal_job_without_dashes>_<project_name>.json`
    pub fn save_to_dir(&self, dir: &Path) -> ApiResult<PathBuf> {
        let path = dir.join(self.project.reserved_filename());
        let json = self.to_json()?;
        fs::write(&path, json).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "project save failed");
            ApiError::Document {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        tracing::info!(path = %path.display(), "project saved");
        Ok(path)
    }

    pub fn load_from_file(&mut self, path: &Path) -> ApiResult<()> {
        let raw = fs::read_to_string(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "project load failed");
            ApiError::Document {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        self.from_json(&raw).map_err(|e| match e {
            ApiError::Document { message, .. } => ApiError::Document {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    // ==========================================
    // General / sample plan
    // ==========================================

    pub fn set_general(&mut self, general: GeneralInfo) -> ApiResult<()> {
        let samples = self.build_samples(&general, &self.project.sampling_methods)?;
        let previous = std::mem::replace(&mut self.project.general, general);
        self.project.samples = samples;

        let mut sections = vec![ProjectSection::General, ProjectSection::Samples];
        let general = &self.project.general;
        let toggles = &mut self.project.cost_toggles;
        let mut toggled = false;
        if previous.device != general.device {
            derive_device_toggles(toggles, general.device);
            toggled = true;
        }
        if previous.printer != general.printer {
            derive_stationery_toggles(toggles, &general.printer);
            toggled = true;
        }
        if previous.data_processing != general.data_processing {
            derive_dp_toggles(toggles, &general.data_processing);
            toggled = true;
        }
        if toggled {
            sections.push(ProjectSection::CostToggles);
        }
        self.notify("set_general", sections);
        Ok(())
    }

    pub fn set_provinces(&mut self, provinces: Vec<String>) -> ApiResult<()> {
        let mut general = self.project.general.clone();
        general.provinces = provinces;
        self.replace_general_and_samples(general, "set_provinces")
    }

    pub fn set_audiences(&mut self, audiences: Vec<Audience>) -> ApiResult<()> {
        let mut general = self.project.general.clone();
        general.target_audiences = audiences;
        self.replace_general_and_samples(general, "set_audiences")
    }

    pub fn set_sampling_methods(&mut self, methods: Vec<SamplingMethodEntry>) -> ApiResult<()> {
        for (i, entry) in methods.iter().enumerate() {
            check_sampling_method(entry, &methods[..i])?;
        }
        let samples = self.build_samples(&self.project.general, &methods)?;
        self.project.sampling_methods = methods;
        self.project.samples = samples;
        self.notify(
            "set_sampling_methods",
            vec![ProjectSection::SamplingMethods, ProjectSection::Samples],
        );
        Ok(())
    }

    /// Append one entry
    ///
    /// # Errors
    /// - ValidationFailure on duplicate (sample type, method) or empty description
    pub fn add_sampling_method(&mut self, entry: SamplingMethodEntry) -> ApiResult<()> {
        check_sampling_method(&entry, &self.project.sampling_methods)?;
        let mut methods = self.project.sampling_methods.clone();
        methods.push(entry);
        self.set_sampling_methods(methods)
    }

    fn replace_general_and_samples(&mut self, general: GeneralInfo, source: &str) -> ApiResult<()> {
        let samples = self.build_samples(&general, &self.project.sampling_methods)?;
        self.project.general = general;
        self.project.samples = samples;
        self.notify(source, vec![ProjectSection::General, ProjectSection::Samples]);
        Ok(())
    }

    fn build_samples(&self, general: &GeneralInfo, methods: &[SamplingMethodEntry]) -> ApiResult<SamplesMap> {
        SamplePlanBuilder::new(&self.rate_cards, &self.industries)
            .build(general, methods, &self.project.samples)
            .map_err(|e| {
                tracing::warn!(error = %e, "sample plan not rebuilt");
                ApiError::from(e)
            })
    }

    /// Rebuild the sample plan from the current document
    pub fn refresh_samples(&mut self) -> ApiResult<()> {
        let samples = self.build_samples(&self.project.general, &self.project.sampling_methods)?;
        self.project.samples = samples;
        self.notify("refresh_samples", vec![ProjectSection::Samples]);
        Ok(())
    }

    // ==========================================
    // Per-province audience edits
    // ==========================================

    fn edit_audience<F>(&mut self, province: &str, key: &str, source: &str, edit: F) -> ApiResult<()>
    where
        F: FnOnce(&mut Audience) -> ApiResult<()>,
    {
        let audience = self
            .project
            .samples
            .audience_mut(province, key)
            .ok_or_else(|| ApiError::validation("samples", format!("no audience '{}' in {}", key, province)))?;
        edit(audience)?;
        self.notify(source, vec![ProjectSection::Samples]);
        Ok(())
    }

    pub fn set_sample_size(&mut self, province: &str, key: &str, sample_size: u32) -> ApiResult<()> {
        self.edit_audience(province, key, "set_sample_size", |a| {
            a.sample_size = sample_size;
            a.province_edited = true;
            a.target.refresh(sample_size);
            Ok(())
        })
    }

    pub fn set_extra_rate(&mut self, province: &str, key: &str, extra_rate: Decimal) -> ApiResult<()> {
        if extra_rate < Decimal::ZERO {
            return Err(ApiError::validation("extra_rate", "must not be negative"));
        }
        self.edit_audience(province, key, "set_extra_rate", |a| {
            a.extra_rate = extra_rate;
            a.province_edited = true;
            Ok(())
        })
    }

    /// Growth below -100% is accepted; totals go negative
    pub fn set_price_growth(
        &mut self,
        province: &str,
        key: &str,
        price_type: PriceType,
        growth: Decimal,
    ) -> ApiResult<()> {
        if growth < -Decimal::ONE_HUNDRED {
            tracing::warn!(province, key, %growth, "price growth below -100%, totals will be negative");
        }
        self.edit_audience(province, key, "set_price_growth", |a| {
            let entry = a
                .pricing
                .iter_mut()
                .find(|p| p.price_type == price_type)
                .ok_or_else(|| ApiError::validation("price_type", format!("no {} price entry", price_type)))?;
            entry.price_growth = growth;
            Ok(())
        })
    }

    /// Pin daily_sup_target; None returns to the derived value
    pub fn set_custom_daily_sup_target(
        &mut self,
        province: &str,
        key: &str,
        value: Option<Decimal>,
    ) -> ApiResult<()> {
        self.edit_audience(province, key, "set_custom_daily_sup_target", |a| {
            match value {
                Some(v) => {
                    a.target.custom = true;
                    a.target.daily_sup_target = v;
                }
                None => {
                    a.target.custom = false;
                    a.target.refresh(a.sample_size);
                }
            }
            Ok(())
        })
    }

    /// Comment on an audience; empty text removes it
    pub fn set_audience_comment(
        &mut self,
        province: &str,
        key: &str,
        comment_key: CommentKey,
        text: &str,
    ) -> ApiResult<()> {
        self.edit_audience(province, key, "set_audience_comment", |a| {
            if text.trim().is_empty() {
                a.comment.remove(&comment_key);
            } else {
                a.comment.insert(comment_key, text.trim().to_string());
            }
            Ok(())
        })
    }

    // ==========================================
    // Derived-toggle intents
    // ==========================================

    pub fn set_device(&mut self, device: DeviceChoice) {
        self.project.general.device = device;
        derive_device_toggles(&mut self.project.cost_toggles, device);
        self.notify("set_device", vec![ProjectSection::General, ProjectSection::CostToggles]);
    }

    pub fn set_printer_counters(&mut self, printer: PrinterCounters) {
        self.project.general.printer = printer;
        derive_stationery_toggles(&mut self.project.cost_toggles, &printer);
        self.notify(
            "set_printer_counters",
            vec![ProjectSection::General, ProjectSection::CostToggles],
        );
    }

    pub fn set_data_processing(&mut self, data_processing: DataProcessing) {
        derive_dp_toggles(&mut self.project.cost_toggles, &data_processing);
        self.project.general.data_processing = data_processing;
        self.notify(
            "set_data_processing",
            vec![ProjectSection::General, ProjectSection::CostToggles],
        );
    }

    pub fn set_clt_settings(&mut self, clt: CltSettings) {
        derive_clt_toggles(&mut self.project.cost_toggles, &clt);
        self.project.clt_settings = clt;
        self.notify(
            "set_clt_settings",
            vec![ProjectSection::CltSettings, ProjectSection::CostToggles],
        );
    }

    pub fn set_toggle(&mut self, group: &str, description: &str, enabled: bool) {
        self.project.cost_toggles.set(group, description, enabled);
        self.notify("set_toggle", vec![ProjectSection::CostToggles]);
    }

    // ==========================================
    // Plain section replacements
    // ==========================================

    pub fn set_hut_settings(&mut self, hut: HutSettings) -> ApiResult<()> {
        if hut.usage_duration_days < 0 {
            return Err(ApiError::validation("hut_usage_duration_days", "must not be negative"));
        }
        self.project.hut_settings = hut;
        self.notify("set_hut_settings", vec![ProjectSection::HutSettings]);
        Ok(())
    }

    pub fn set_qc_methods(&mut self, methods: Vec<QcMethodEntry>) {
        self.project.qc_methods = methods;
        self.notify("set_qc_methods", vec![ProjectSection::QcMethods]);
    }

    pub fn set_travel(&mut self, travel: TravelPlan) {
        self.project.travel = travel;
        self.notify("set_travel", vec![ProjectSection::Travel]);
    }

    /// # Errors
    /// - ValidationFailure on duplicate or empty email
    pub fn set_assignments(&mut self, assignments: Vec<Assignment>) -> ApiResult<()> {
        for (i, assignment) in assignments.iter().enumerate() {
            check_assignment(assignment, &assignments[..i])?;
        }
        self.project.assignments = assignments;
        self.notify("set_assignments", vec![ProjectSection::Assignments]);
        Ok(())
    }

    pub fn add_assignment(&mut self, assignment: Assignment) -> ApiResult<()> {
        check_assignment(&assignment, &self.project.assignments)?;
        self.project.assignments.push(assignment);
        self.notify("add_assignment", vec![ProjectSection::Assignments]);
        Ok(())
    }

    pub fn set_additional_costs(&mut self, costs: Vec<AdditionalCost>) {
        self.project.additional_costs = costs;
        self.notify("set_additional_costs", vec![ProjectSection::AdditionalCosts]);
    }

    pub fn set_subcontracts(&mut self, subcontracts: Vec<Subcontract>) {
        self.project.subcontracts = subcontracts;
        self.notify("set_subcontracts", vec![ProjectSection::Subcontracts]);
    }

    pub fn set_settings(&mut self, settings: ProjectSettings) {
        self.project.settings = settings;
        self.notify("set_settings", vec![ProjectSection::Settings]);
    }
}

// ==========================================
// Intent checks
// ==========================================

fn check_sampling_method(entry: &SamplingMethodEntry, existing: &[SamplingMethodEntry]) -> ApiResult<()> {
    if entry.description.trim().is_empty() {
        return Err(ApiError::validation("sampling_methods", "description is empty"));
    }
    let duplicate = existing.iter().any(|m| {
        m.sample_type == entry.sample_type && m.sampling_method.trim() == entry.sampling_method.trim()
    });
    if duplicate {
        return Err(ApiError::validation(
            "sampling_methods",
            format!("{} / {} already listed", entry.sample_type, entry.sampling_method),
        ));
    }
    Ok(())
}

fn check_assignment(assignment: &Assignment, existing: &[Assignment]) -> ApiResult<()> {
    let email = assignment.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("assignments", "email is empty"));
    }
    if existing.iter().any(|a| a.email.trim().eq_ignore_ascii_case(email)) {
        return Err(ApiError::validation("assignments", format!("{} already assigned", email)));
    }
    Ok(())
}

// ==========================================
// Derived toggles
// ==========================================

/// Exactly one device-rental line on; none for NoDevice
fn derive_device_toggles(toggles: &mut CostToggles, device: DeviceChoice) {
    let lines = [
        (DeviceChoice::TabletUnder9, CostDescription::TabletUnder9),
        (DeviceChoice::TabletAtLeast9, CostDescription::TabletAtLeast9),
        (DeviceChoice::Laptop, CostDescription::Laptop),
    ];
    for (choice, line) in lines {
        toggles.set(toggle_groups::DEVICE_RENTAL, &line.label(), device == choice);
    }
}

/// Each printer counter drives its stationery line
fn derive_stationery_toggles(toggles: &mut CostToggles, printer: &PrinterCounters) {
    let lines = [
        (printer.bw_page_count, CostDescription::BlackWhitePhoto),
        (printer.showphoto_page_count, CostDescription::ShowPhoto),
        (printer.showcard_page_count, CostDescription::ShowCard),
        (printer.dropcard_page_count, CostDescription::DropCard),
        (printer.color_page_count, CostDescription::ColorPrint),
        (printer.decal_page_count, CostDescription::Decal),
        (printer.laminated_page_count, CostDescription::Lamination),
        (printer.stimulus_material_production_count, CostDescription::Binding),
        (printer.form_package_count, CostDescription::FormPackage),
    ];
    for (count, line) in lines {
        toggles.set(toggle_groups::STATIONERY, &line.label(), count > 0);
    }
}

fn derive_dp_toggles(toggles: &mut CostToggles, dp: &DataProcessing) {
    let lines = [
        (dp.coding, CostDescription::DpCoding),
        (dp.data_entry, CostDescription::DpInput),
        (dp.data_processing, CostDescription::DpCleanData),
    ];
    for (on, line) in lines {
        toggles.set(toggle_groups::DP, &line.label(), on);
    }
}

/// Failure-rate line follows the rate; IDI lines follow the recruit count
fn derive_clt_toggles(toggles: &mut CostToggles, clt: &CltSettings) {
    toggles.set(
        toggle_groups::FAILURE_RATE,
        &CostDescription::FailureRate.label(),
        clt.failure_rate > Decimal::ZERO,
    );
    let idi = clt.sample_recruit_idi > 0;
    for line in [
        CostDescription::RecruitIdi,
        CostDescription::SupervisorIdi,
        CostDescription::QcIdi,
    ] {
        toggles.set(toggle_groups::IDI, &line.label(), idi);
    }
}
