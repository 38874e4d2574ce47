// ==========================================
// Fieldwork costing - project readiness validator
// ==========================================
// Checks run in a fixed order; the first failure short-circuits.
// Each check yields (field, ok, message).
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::catalogues::INTERLOCKED_QUOTA;
use crate::domain::project::{is_unselected, Project};
use crate::domain::types::{ProjectType, SampleType};

static INTERNAL_JOB_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{3}$").expect("valid regex"));
static SYMPHONY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6,8}$").expect("valid regex"));

/// Result of one readiness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub field: String,
    pub ok: bool,
    pub message: String,
}

impl ValidationOutcome {
    fn pass() -> Self {
        Self {
            field: String::new(),
            ok: true,
            message: String::new(),
        }
    }

    fn fail(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            ok: false,
            message: message.into(),
        }
    }
}

type Check = fn(&Project) -> Option<ValidationOutcome>;

// ==========================================
// ProjectValidator
// ==========================================
#[derive(Debug, Default)]
pub struct ProjectValidator {}

impl ProjectValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// Run every check in order, stopping at the first failure
    pub fn validate(&self, project: &Project) -> ValidationOutcome {
        const CHECKS: &[Check] = &[
            check_internal_job,
            check_symphony,
            check_project_name,
            check_selections,
            check_quota_description,
            check_open_ended,
            check_clt,
            check_hut,
        ];

        for check in CHECKS {
            if let Some(failure) = check(project) {
                tracing::info!(field = %failure.field, message = %failure.message, "project not ready");
                return failure;
            }
        }
        ValidationOutcome::pass()
    }

    /// Same as validate, as a Result
    ///
    /// # Errors
    /// - ValidationFailure naming the first failing field
    pub fn ensure_ready(&self, project: &Project) -> ApiResult<()> {
        let outcome = self.validate(project);
        if outcome.ok {
            Ok(())
        } else {
            Err(ApiError::validation(outcome.field, outcome.message))
        }
    }
}

// ==========================================
// Checks
// ==========================================

fn check_internal_job(project: &Project) -> Option<ValidationOutcome> {
    let value = project.general.internal_job.trim();
    (!INTERNAL_JOB_PATTERN.is_match(value)).then(|| {
        ValidationOutcome::fail("internal_job", format!("'{}' does not match NNNN-NNN", value))
    })
}

fn check_symphony(project: &Project) -> Option<ValidationOutcome> {
    let value = project.general.symphony.trim();
    (!SYMPHONY_PATTERN.is_match(value))
        .then(|| ValidationOutcome::fail("symphony", format!("'{}' must be 6 to 8 digits", value)))
}

fn check_project_name(project: &Project) -> Option<ValidationOutcome> {
    project
        .general
        .project_name
        .trim()
        .is_empty()
        .then(|| ValidationOutcome::fail("project_name", "project name is empty"))
}

fn check_selections(project: &Project) -> Option<ValidationOutcome> {
    let general = &project.general;
    if general.project_type.is_none() {
        return Some(ValidationOutcome::fail("project_type", "project type not selected"));
    }
    let combos = [
        ("sampling_method", &general.sampling_method),
        ("type_of_quota_control", &general.type_of_quota_control),
        ("resp_classification", &general.resp_classification),
    ];
    combos
        .into_iter()
        .find(|(_, value)| is_unselected(value))
        .map(|(field, _)| ValidationOutcome::fail(field, format!("{} not selected", field)))
}

fn check_quota_description(project: &Project) -> Option<ValidationOutcome> {
    let general = &project.general;
    let missing = general.type_of_quota_control.trim() == INTERLOCKED_QUOTA
        && general.quota_description.iter().all(|d| d.trim().is_empty());
    missing.then(|| ValidationOutcome::fail("quota_description", "interlocked quota needs a description"))
}

fn check_open_ended(project: &Project) -> Option<ValidationOutcome> {
    let dp = &project.general.data_processing;
    if !dp.coding {
        return None;
    }
    let active = project.active_sample_types();
    if active.contains(&SampleType::Main) && dp.open_ended_main_count == 0 {
        return Some(ValidationOutcome::fail(
            "open_ended_main_count",
            "coding is on but Main has no open-ended questions",
        ));
    }
    if active.contains(&SampleType::Booster) && dp.open_ended_booster_count == 0 {
        return Some(ValidationOutcome::fail(
            "open_ended_booster_count",
            "coding is on but Booster has no open-ended questions",
        ));
    }
    None
}

fn check_clt(project: &Project) -> Option<ValidationOutcome> {
    let clt = &project.clt_settings;
    if project.project_type() == Some(ProjectType::Clt) {
        if clt.sample_size_per_day <= rust_decimal::Decimal::ZERO {
            return Some(ValidationOutcome::fail("clt_sample_size_per_day", "must be greater than 0"));
        }
        if let Some(province) = project
            .general
            .provinces
            .iter()
            .find(|p| clt.desk_interviewers_in(p) == 0)
        {
            return Some(ValidationOutcome::fail(
                "clt_desk_interviewers_count",
                format!("no desk interviewers in {}", province),
            ));
        }
    }
    (clt.total_concepts > 0 && clt.concepts_per_respondent == 0).then(|| {
        ValidationOutcome::fail("clt_concepts_per_respondent", "must be greater than 0 when concepts are tested")
    })
}

fn check_hut(project: &Project) -> Option<ValidationOutcome> {
    (project.hut_settings.usage_duration_days < 0)
        .then(|| ValidationOutcome::fail("hut_usage_duration_days", "must not be negative"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::SamplingMethodEntry;
    use rust_decimal_macros::dec;

    fn ready() -> Project {
        let mut project = Project::default();
        let g = &mut project.general;
        g.internal_job = "2024-015".to_string();
        g.symphony = "1234567".to_string();
        g.project_name = "Milk U&A".to_string();
        g.project_type = Some(ProjectType::F2fD2d);
        g.sampling_method = "Random Sampling".to_string();
        g.type_of_quota_control = "Non-interlocked Quota".to_string();
        g.resp_classification = "B2C".to_string();
        project
    }

    #[test]
    fn test_ready_project_passes() {
        let outcome = ProjectValidator::new().validate(&ready());
        assert!(outcome.ok, "{:?}", outcome);
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let mut project = ready();
        project.general.internal_job = "2024015".to_string();
        project.general.symphony = "12".to_string();
        let outcome = ProjectValidator::new().validate(&project);
        assert!(!outcome.ok);
        assert_eq!(outcome.field, "internal_job");

        project.general.internal_job = "2024-015".to_string();
        let err = ProjectValidator::new().ensure_ready(&project).unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailure { ref field, .. } if field == "symphony"));
    }

    #[test]
    fn test_sentinel_and_interlocked_quota() {
        let mut project = ready();
        project.general.resp_classification = "-- Select --".to_string();
        assert_eq!(ProjectValidator::new().validate(&project).field, "resp_classification");

        let mut project = ready();
        project.general.type_of_quota_control = INTERLOCKED_QUOTA.to_string();
        assert_eq!(ProjectValidator::new().validate(&project).field, "quota_description");
        project.general.quota_description = vec!["Age × Gender".to_string()];
        assert!(ProjectValidator::new().validate(&project).ok);
    }

    #[test]
    fn test_coding_needs_open_ended_counts() {
        let mut project = ready();
        project.general.data_processing.coding = true;
        project.sampling_methods.push(SamplingMethodEntry {
            sample_type: SampleType::Booster,
            sampling_method: "Random Sampling".to_string(),
            description: "boost".to_string(),
        });
        assert_eq!(ProjectValidator::new().validate(&project).field, "open_ended_booster_count");
        project.general.data_processing.open_ended_booster_count = 2;
        assert!(ProjectValidator::new().validate(&project).ok);
    }

    #[test]
    fn test_clt_requirements() {
        let mut project = ready();
        project.general.project_type = Some(ProjectType::Clt);
        project.general.provinces = vec!["Hà Nội".to_string()];
        assert_eq!(ProjectValidator::new().validate(&project).field, "clt_sample_size_per_day");

        project.clt_settings.sample_size_per_day = dec!(40);
        assert_eq!(ProjectValidator::new().validate(&project).field, "clt_desk_interviewers_count");

        project.clt_settings.desk_interviewers.insert("Hà Nội".to_string(), 5);
        project.clt_settings.total_concepts = 3;
        assert_eq!(ProjectValidator::new().validate(&project).field, "clt_concepts_per_respondent");

        project.clt_settings.concepts_per_respondent = 1;
        project.hut_settings.usage_duration_days = -1;
        assert_eq!(ProjectValidator::new().validate(&project).field, "hut_usage_duration_days");
    }
}
