use super::error::ConfigurationError;
use super::types::{HousingDuration, HousingPlan};

/// Which rule produced a resolved housing cost.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HousingResolution {
    /// A finite phase whose interval contains the elapsed year.
    Phase(usize),
    /// The walk reached an indefinite phase.
    Indefinite(usize),
    /// Every finite phase has elapsed; the last plan's cost carries on.
    LastPlanPersisted,
    NoPlans,
}

/// Maps elapsed years onto an ordered list of housing phases.
#[derive(Debug, Clone, Copy)]
pub struct HousingPhaseResolver<'a> {
    plans: &'a [HousingPlan],
}

impl<'a> HousingPhaseResolver<'a> {
    pub fn new(plans: &'a [HousingPlan]) -> Result<Self, ConfigurationError> {
        for (index, plan) in plans.iter().enumerate() {
            if let HousingDuration::Years(years) = plan.duration {
                if years <= 0 {
                    return Err(ConfigurationError::NonPositiveHousingDuration { index, years });
                }
            }
        }

        if let Some(first) = plans.iter().position(|p| p.duration.is_indefinite()) {
            if first + 1 < plans.len() {
                log::warn!(
                    "housing plans after indefinite plan #{first} are unreachable ({} ignored)",
                    plans.len() - first - 1
                );
            }
        }

        Ok(Self { plans })
    }

    /// Monthly cost in effect `years_elapsed` years from now.
    pub fn resolve(&self, years_elapsed: u32) -> (f64, HousingResolution) {
        let Some(last) = self.plans.last() else {
            return (0.0, HousingResolution::NoPlans);
        };

        let elapsed = i64::from(years_elapsed);
        let mut consumed: i64 = 0;
        for (index, plan) in self.plans.iter().enumerate() {
            match plan.duration {
                HousingDuration::Indefinite => {
                    return (plan.monthly_cost, HousingResolution::Indefinite(index));
                }
                HousingDuration::Years(years) => {
                    let end = consumed + i64::from(years);
                    if elapsed < end {
                        return (plan.monthly_cost, HousingResolution::Phase(index));
                    }
                    consumed = end;
                }
            }
        }

        (last.monthly_cost, HousingResolution::LastPlanPersisted)
    }
}

/// One-shot lookup: validates `plans` and resolves the cost for a single year.
pub fn resolve_housing_cost(
    plans: &[HousingPlan],
    years_elapsed: u32,
) -> Result<f64, ConfigurationError> {
    let resolver = HousingPhaseResolver::new(plans)?;
    Ok(resolver.resolve(years_elapsed).0)
}
