use super::education::EducationBandClassifier;
use super::error::ConfigurationError;
use super::housing::{HousingPhaseResolver, HousingResolution};
use super::types::{Child, Economics, HouseholdConfig, MAX_TERMINAL_AGE, YearRecord};

/// Last child age (inclusive) that still carries the childcare reduction.
const CHILDCARE_LAST_AGE: i32 = 22;

/// Projects the household balance from `current_age` through `terminal_age`
/// inclusive, one record per simulated year.
pub fn run(config: &HouseholdConfig) -> Result<Vec<YearRecord>, ConfigurationError> {
    validate(config)?;

    let plans = config.economics.housing_plans();
    let resolver = HousingPhaseResolver::new(&plans)?;
    let children: Vec<(&Child, EducationBandClassifier)> = config
        .children
        .iter()
        .map(|child| {
            let classifier =
                EducationBandClassifier::new(&config.education_costs, child.education_pattern);
            (child, classifier)
        })
        .collect();

    let horizon = config.terminal_age - config.current_age;
    log::debug!(
        "projecting {} years in {} mode from age {} with {} children and {} one-time events",
        horizon + 1,
        config.economics.mode_name(),
        config.current_age,
        config.children.len(),
        config.one_time_events.len()
    );

    let mut records = Vec::with_capacity(config.simulated_years() as usize);
    let mut balance = config.current_assets;
    let mut total_principal = config.current_assets;
    let mut total_investment_income = 0.0;
    let mut fallback_reported = false;

    for years_elapsed in 0..=horizon {
        let age = config.current_age + years_elapsed;

        let mut education_cost = 0.0;
        let mut children_in_care = 0u32;
        let mut birth = false;
        for (child, classifier) in &children {
            let child_age = child.age_at(years_elapsed);
            education_cost += classifier.classify(child_age);
            if in_childcare_window(child_age) {
                children_in_care += 1;
            }
            birth |= child_age == Some(0);
        }

        let (housing_cost, resolution) = resolver.resolve(years_elapsed);
        if !fallback_reported {
            fallback_reported = report_housing_fallback(resolution, age);
        }

        let annual_savings = config.economics.base_annual_savings(housing_cost)
            - config.childcare_monthly_reduction * 12.0 * f64::from(children_in_care);

        let mut events = Vec::new();
        let bonus = if age == config.retirement_age {
            events.push(format!("retirement bonus (+{})", config.retirement_bonus));
            config.retirement_bonus
        } else {
            0.0
        };
        if birth {
            events.push("birth".to_string());
        }
        let mut one_time_amount = 0.0;
        for event in config.one_time_events.iter().filter(|e| e.age == age) {
            one_time_amount += event.signed_amount();
            events.push(event.note());
        }

        let net_contribution = annual_savings - education_cost + bonus + one_time_amount;
        total_principal += net_contribution;

        let pre_interest = balance + net_contribution;
        let investment_income = pre_interest * config.annual_interest_rate;
        total_investment_income += investment_income;

        // The truncated balance is what compounds into the next year.
        let year_end_balance = truncate(pre_interest * (1.0 + config.annual_interest_rate));
        balance = year_end_balance as f64;

        records.push(YearRecord {
            age,
            years_elapsed,
            event_note: events.join(" "),
            monthly_housing_cost: housing_cost,
            annual_savings,
            annual_education_cost: education_cost,
            one_time_amount,
            year_end_balance,
            investment_income: truncate(investment_income),
            total_principal: truncate(total_principal),
            total_investment_income: truncate(total_investment_income),
        });
    }

    Ok(records)
}

fn validate(config: &HouseholdConfig) -> Result<(), ConfigurationError> {
    if config.current_age >= config.terminal_age {
        return Err(ConfigurationError::AgeOrder {
            current_age: config.current_age,
            terminal_age: config.terminal_age,
        });
    }
    if config.terminal_age > MAX_TERMINAL_AGE {
        return Err(ConfigurationError::TerminalAgeOutOfRange {
            terminal_age: config.terminal_age,
            min: config.current_age + 1,
            max: MAX_TERMINAL_AGE,
        });
    }

    require_finite("current_assets", config.current_assets)?;
    require_finite("annual_interest_rate", config.annual_interest_rate)?;
    require_finite(
        "childcare_monthly_reduction",
        config.childcare_monthly_reduction,
    )?;
    require_finite("retirement_bonus", config.retirement_bonus)?;

    match &config.economics {
        Economics::Breakdown {
            monthly_income,
            monthly_living_cost,
            housing_plans,
        } => {
            require_finite("monthly_income", *monthly_income)?;
            require_finite("monthly_living_cost", *monthly_living_cost)?;
            for plan in housing_plans {
                require_finite("housing_plan.monthly_cost", plan.monthly_cost)?;
            }
        }
        Economics::FlatSavings {
            monthly_savings,
            rent_increase,
            ..
        } => {
            require_finite("monthly_savings", *monthly_savings)?;
            require_finite("rent_increase", *rent_increase)?;
        }
    }

    for event in &config.one_time_events {
        require_finite("one_time_events.amount", event.amount)?;
    }

    let costs = &config.education_costs;
    for band in [costs.all_public, costs.all_private, costs.private_university_only] {
        for value in [band.primary, band.middle, band.high, band.university] {
            require_finite("education_costs", value)?;
        }
    }

    Ok(())
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonFinite { field })
    }
}

/// Logs housing fallbacks. Returns true once no later year can hit a new one.
fn report_housing_fallback(resolution: HousingResolution, age: u32) -> bool {
    match resolution {
        HousingResolution::LastPlanPersisted => {
            log::debug!("housing plans exhausted at age {age}; last plan's cost persists");
            true
        }
        HousingResolution::NoPlans => {
            log::debug!("no housing plans configured; housing cost is zero");
            true
        }
        HousingResolution::Indefinite(_) => true,
        HousingResolution::Phase(_) => false,
    }
}

fn in_childcare_window(child_age: Option<i32>) -> bool {
    child_age.is_some_and(|age| (0..=CHILDCARE_LAST_AGE).contains(&age))
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
