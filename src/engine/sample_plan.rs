// ==========================================
// Fieldwork costing - Sample Plan Builder
// ==========================================
// general + audiences + provinces + sampling methods -> SamplesMap
//
// 1. active sample types = union over sampling-method entries
// 2. drop audiences whose sample type is no longer active
// 3. for each province × audience:
//    a. rate card -> pricing + target schedule
//    b. industries override replaces the pricing when present
//    c. carry user-entered values forward (growth per price type,
//       comments, custom sup target; size and extra rate only when
//       edited for that province)
//    d. daily_sup_target = size / target_for_interviewer
//                          / interviewers_per_supervisor
// 4. the caller swaps the returned map in atomically
// ==========================================

use crate::catalogue::error::CatalogueResult;
use crate::catalogue::industries::IndustriesCatalogue;
use crate::catalogue::rate_card::RateCardCatalogue;
use crate::domain::audience::{Audience, PriceEntry, SamplesMap};
use crate::domain::project::{GeneralInfo, SamplingMethodEntry};
use std::collections::BTreeSet;
use tracing::instrument;

pub struct SamplePlanBuilder<'a> {
    rate_cards: &'a RateCardCatalogue,
    industries: &'a IndustriesCatalogue,
}

impl<'a> SamplePlanBuilder<'a> {
    pub fn new(rate_cards: &'a RateCardCatalogue, industries: &'a IndustriesCatalogue) -> Self {
        Self {
            rate_cards,
            industries,
        }
    }

    /// Build the per-province sample plan
    ///
    /// # Errors
    /// - RateCardUnavailable when any (audience, province) has no rate-card row
    ///
    /// An unselected project type yields an empty plan.
    #[instrument(
        skip_all,
        fields(
            provinces = general.provinces.len(),
            audiences = general.target_audiences.len()
        )
    )]
    pub fn build(
        &self,
        general: &GeneralInfo,
        sampling_methods: &[SamplingMethodEntry],
        previous: &SamplesMap,
    ) -> CatalogueResult<SamplesMap> {
        let Some(project_type) = general.project_type else {
            tracing::debug!("project type not selected, empty sample plan");
            return Ok(SamplesMap::new());
        };

        let active: BTreeSet<_> = sampling_methods.iter().map(|m| m.sample_type).collect();
        let audiences: Vec<&Audience> = general
            .target_audiences
            .iter()
            .filter(|a| active.contains(&a.sample_type))
            .collect();

        let mut samples = SamplesMap::new();
        for province in &general.provinces {
            samples.ensure_province(province);

            for template in &audiences {
                let resolution = self.rate_cards.resolve(
                    project_type,
                    template.sample_type,
                    general.interview_length,
                    template.incident_rate,
                )?;

                let pricing = match self.industries.lookup(
                    &template.industry,
                    &template.target_audience,
                    template.sample_type,
                ) {
                    Some(overrides) => {
                        tracing::debug!(
                            industry = %template.industry,
                            audience = %template.key(),
                            "industry price override applied"
                        );
                        overrides
                    }
                    None => resolution.pricing,
                };

                let mut audience = (*template).clone();
                audience.pricing = pricing;
                audience.target = resolution.target;

                if let Some(prior) = previous.audience(province, &template.key()) {
                    carry_forward(&mut audience, prior);
                }
                audience.target.refresh(audience.sample_size);

                samples.insert(province, audience);
            }
        }

        tracing::info!(
            %project_type,
            active_sample_types = active.len(),
            "sample plan rebuilt"
        );
        Ok(samples)
    }
}

/// Keep per-province user edits from the previous plan
fn carry_forward(audience: &mut Audience, prior: &Audience) {
    if prior.province_edited {
        audience.sample_size = prior.sample_size;
        audience.extra_rate = prior.extra_rate;
        audience.province_edited = true;
    }
    if !prior.comment.is_empty() {
        audience.comment = prior.comment.clone();
    }

    for entry in &mut audience.pricing {
        if let Some(old) = prior.price_entry(entry.price_type) {
            carry_entry(entry, old);
        }
    }

    if prior.target.custom {
        audience.target.custom = true;
        audience.target.daily_sup_target = prior.target.daily_sup_target;
    }
}

fn carry_entry(entry: &mut PriceEntry, old: &PriceEntry) {
    entry.price_growth = old.price_growth;
    if !old.comment.is_empty() {
        entry.comment = old.comment.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::error::{CatalogueError, RateCardAxis};
    use crate::domain::types::{PriceType, ProjectType, SampleType};
    use rust_decimal_macros::dec;

    const RATE_CARDS: &str = r#"{
      "F2F/D2D": {
        "L1": [{"interview_length_range": [0, 60],
                "pricing": {"pilot": 80000, "non": 60000,
                            "main": {"recruit": 200000, "location": 50000, "booster": 300000}},
                "daily_interview_target": 5, "target_for_interviewer": 2,
                "interviewers_per_supervisor": 10}]
      }
    }"#;

    const INDUSTRIES: &str = r#"{
      "Dairy": {"1": {"target_audience": "Mothers 25–40", "pricing": {"main": {"booster": 500000}}}}
    }"#;

    fn general() -> GeneralInfo {
        let mut booster = Audience::new(SampleType::Booster, "Mothers 25–40", 50);
        booster.industry = "Dairy".to_string();
        let mut main = Audience::new(SampleType::Main, "Mothers 25–40", 100);
        main.industry = "Dairy".to_string();

        GeneralInfo {
            project_type: Some(ProjectType::F2fD2d),
            provinces: vec!["Hồ Chí Minh".to_string(), "Cần Thơ".to_string()],
            interview_length: 30,
            target_audiences: vec![
                main,
                booster,
                Audience::new(SampleType::Pilot, "Mothers 25–40", 20),
            ],
            ..Default::default()
        }
    }

    fn methods(types: &[SampleType]) -> Vec<SamplingMethodEntry> {
        types
            .iter()
            .map(|t| SamplingMethodEntry {
                sample_type: *t,
                sampling_method: "Random Sampling".to_string(),
                description: "door to door".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_industry_override_for_booster() {
        let cards = RateCardCatalogue::from_json_str(RATE_CARDS).unwrap();
        let industries = IndustriesCatalogue::from_json_str(INDUSTRIES).unwrap();
        let builder = SamplePlanBuilder::new(&cards, &industries);

        let samples = builder
            .build(&general(), &methods(&[SampleType::Main, SampleType::Booster]), &SamplesMap::new())
            .unwrap();

        let booster = samples.audience("Cần Thơ", "Booster - Mothers 25–40").unwrap();
        assert!(booster.pricing.iter().all(|p| p.price == dec!(500000)));

        // main has no complete override and keeps the rate card
        let main = samples.audience("Cần Thơ", "Main - Mothers 25–40").unwrap();
        assert_eq!(main.price_entry(PriceType::Recruit).unwrap().price, dec!(200000));
        assert_eq!(main.target.daily_sup_target, dec!(5));

        // pilot is not an active sample type
        assert!(samples.audience("Cần Thơ", "Pilot - Mothers 25–40").is_none());
    }

    #[test]
    fn test_carry_forward_keeps_province_edits() {
        let cards = RateCardCatalogue::from_json_str(RATE_CARDS).unwrap();
        let industries = IndustriesCatalogue::new();
        let builder = SamplePlanBuilder::new(&cards, &industries);
        let sampling = methods(&[SampleType::Main]);

        let mut first = builder.build(&general(), &sampling, &SamplesMap::new()).unwrap();
        {
            let main = first.audience_mut("Hồ Chí Minh", "Main - Mothers 25–40").unwrap();
            main.sample_size = 300;
            main.province_edited = true;
            main.pricing[0].price_growth = dec!(10);
        }

        let second = builder.build(&general(), &sampling, &first).unwrap();
        let hcm = second.audience("Hồ Chí Minh", "Main - Mothers 25–40").unwrap();
        assert_eq!(hcm.sample_size, 300);
        assert_eq!(hcm.pricing[0].price_growth, dec!(10));
        assert_eq!(hcm.target.daily_sup_target, dec!(15));

        let ct = second.audience("Cần Thơ", "Main - Mothers 25–40").unwrap();
        assert_eq!(ct.sample_size, 100);
    }

    #[test]
    fn test_audience_list_changes_reach_unedited_provinces() {
        let cards = RateCardCatalogue::from_json_str(RATE_CARDS).unwrap();
        let industries = IndustriesCatalogue::new();
        let builder = SamplePlanBuilder::new(&cards, &industries);
        let sampling = methods(&[SampleType::Main]);

        let mut first = builder.build(&general(), &sampling, &SamplesMap::new()).unwrap();
        {
            let main = first.audience_mut("Hồ Chí Minh", "Main - Mothers 25–40").unwrap();
            main.sample_size = 300;
            main.province_edited = true;
        }

        let mut resized = general();
        resized.target_audiences[0].sample_size = 250;
        resized.target_audiences[0].extra_rate = dec!(20);
        let second = builder.build(&resized, &sampling, &first).unwrap();

        let ct = second.audience("Cần Thơ", "Main - Mothers 25–40").unwrap();
        assert_eq!(ct.sample_size, 250);
        assert_eq!(ct.extra_rate, dec!(20));
        assert_eq!(ct.target.daily_sup_target, dec!(12.5));
        assert!(!ct.province_edited);

        let hcm = second.audience("Hồ Chí Minh", "Main - Mothers 25–40").unwrap();
        assert_eq!(hcm.sample_size, 300);
        assert_eq!(hcm.extra_rate, dec!(0));
    }

    #[test]
    fn test_missing_rate_card_surfaces() {
        let cards = RateCardCatalogue::from_json_str(RATE_CARDS).unwrap();
        let industries = IndustriesCatalogue::new();
        let builder = SamplePlanBuilder::new(&cards, &industries);

        let mut general = general();
        general.project_type = Some(ProjectType::Cati);
        let err = builder
            .build(&general, &methods(&[SampleType::Main]), &SamplesMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::RateCardUnavailable { axis: RateCardAxis::ProjectType, .. }
        ));

        general.project_type = None;
        let empty = builder
            .build(&general, &methods(&[SampleType::Main]), &SamplesMap::new())
            .unwrap();
        assert!(empty.is_empty());
    }
}
