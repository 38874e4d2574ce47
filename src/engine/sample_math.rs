// ==========================================
// Fieldwork costing - sample-size arithmetic
// ==========================================
// S(v, excl) = Σ effective_size(a) over audiences a in province v
//              whose sample type is not in excl
// S*(v)      = S(v, {Pilot, Non})
// OE         = open_ended_main + open_ended_booster
// ==========================================

use crate::domain::project::Project;
use crate::domain::types::SampleType;
use rust_decimal::Decimal;

/// Sample types excluded from S*
pub const NON_CORE: [SampleType; 2] = [SampleType::Pilot, SampleType::Non];

/// S(province, excl)
pub fn sample_sum(project: &Project, province: &str, exclude: &[SampleType]) -> Decimal {
    project
        .samples
        .audiences(province)
        .filter(|a| !exclude.contains(&a.sample_type))
        .map(|a| a.effective_size())
        .sum()
}

/// S(province, ∅)
pub fn total_sample(project: &Project, province: &str) -> Decimal {
    sample_sum(project, province, &[])
}

/// S*(province)
pub fn core_sample(project: &Project, province: &str) -> Decimal {
    sample_sum(project, province, &NON_CORE)
}

/// Effective size of one sample type in a province
pub fn sample_type_total(project: &Project, province: &str, sample_type: SampleType) -> Decimal {
    project
        .samples
        .audiences(province)
        .filter(|a| a.sample_type == sample_type)
        .map(|a| a.effective_size())
        .sum()
}

/// Open-ended question count used by DP coding
pub fn open_ended_total(project: &Project) -> u32 {
    let dp = &project.general.data_processing;
    dp.open_ended_main_count + dp.open_ended_booster_count
}

// ==========================================
// Breadcrumbs - non-fatal anomalies of one row
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumbs {
    notes: Vec<String>,
}

impl Breadcrumbs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, note: impl Into<String>) {
        let note = note.into();
        tracing::warn!(breadcrumb = %note, "resolved to zero");
        self.notes.push(note);
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Join onto an existing comment with "; "
    pub fn append_to(&self, comment: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.notes.len() + 1);
        if !comment.trim().is_empty() {
            parts.push(comment.trim());
        }
        parts.extend(self.notes.iter().map(String::as_str));
        parts.join("; ")
    }
}

/// numerator / divisor, or zero plus a breadcrumb when divisor is zero
pub fn safe_div(numerator: Decimal, divisor: Decimal, what: &str, crumbs: &mut Breadcrumbs) -> Decimal {
    if divisor.is_zero() {
        crumbs.push(format!("{} is 0", what));
        return Decimal::ZERO;
    }
    numerator / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audience::Audience;
    use rust_decimal_macros::dec;

    fn project() -> Project {
        let mut project = Project::default();
        let mut main = Audience::new(SampleType::Main, "Mothers", 100);
        main.extra_rate = dec!(10);
        project.samples.insert("Hà Nội", Audience::new(SampleType::Pilot, "Mothers", 20));
        project.samples.insert("Hà Nội", main);
        project.samples.insert("Hà Nội", Audience::new(SampleType::Booster, "Mothers", 50));
        project.samples.insert("Hà Nội", Audience::new(SampleType::Non, "Mothers", 7));
        project
    }

    #[test]
    fn test_sums_by_exclusion() {
        let project = project();
        assert_eq!(total_sample(&project, "Hà Nội"), dec!(187));
        assert_eq!(core_sample(&project, "Hà Nội"), dec!(160));
        assert_eq!(sample_sum(&project, "Hà Nội", &[SampleType::Pilot]), dec!(167));
        assert_eq!(sample_type_total(&project, "Hà Nội", SampleType::Main), dec!(110));
        assert_eq!(total_sample(&project, "Cần Thơ"), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_breadcrumb() {
        let mut crumbs = Breadcrumbs::new();
        assert_eq!(safe_div(dec!(10), dec!(4), "x", &mut crumbs), dec!(2.5));
        assert!(crumbs.is_empty());

        assert_eq!(safe_div(dec!(10), Decimal::ZERO, "sample_size_per_day", &mut crumbs), Decimal::ZERO);
        assert_eq!(crumbs.append_to("note"), "note; sample_size_per_day is 0");
        assert_eq!(crumbs.append_to(""), "sample_size_per_day is 0");
    }
}
