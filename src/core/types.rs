use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upper bound for a configurable terminal age.
pub const MAX_TERMINAL_AGE: u32 = 120;

/// Terminal age used when none is configured.
pub const DEFAULT_TERMINAL_AGE: u32 = 100;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EducationPattern {
    AllPublic,
    AllPrivate,
    PrivateUniversityOnly,
}

impl EducationPattern {
    /// Parses a pattern label. Unknown labels resolve to `AllPublic`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "all-public" | "allPublic" | "all_public" | "全公立" => EducationPattern::AllPublic,
            "all-private" | "allPrivate" | "all_private" | "全私立" => {
                EducationPattern::AllPrivate
            }
            "private-university-only"
            | "privateUniversityOnly"
            | "private_university_only"
            | "大学のみ私立" => EducationPattern::PrivateUniversityOnly,
            other => {
                log::warn!("unknown education pattern {other:?}; using all-public costs");
                EducationPattern::AllPublic
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EducationPattern::AllPublic => "all-public",
            EducationPattern::AllPrivate => "all-private",
            EducationPattern::PrivateUniversityOnly => "private-university-only",
        }
    }
}

impl fmt::Display for EducationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EducationPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EducationPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(EducationPattern::from_label(&label))
    }
}

/// Annual cost per education band.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandCosts {
    pub primary: f64,
    pub middle: f64,
    pub high: f64,
    pub university: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationCostTable {
    pub all_public: BandCosts,
    pub all_private: BandCosts,
    pub private_university_only: BandCosts,
}

impl EducationCostTable {
    pub fn costs_for(&self, pattern: EducationPattern) -> &BandCosts {
        match pattern {
            EducationPattern::AllPublic => &self.all_public,
            EducationPattern::AllPrivate => &self.all_private,
            EducationPattern::PrivateUniversityOnly => &self.private_university_only,
        }
    }
}

impl Default for EducationCostTable {
    fn default() -> Self {
        Self {
            all_public: BandCosts {
                primary: 40.0,
                middle: 40.0,
                high: 40.0,
                university: 100.0,
            },
            all_private: BandCosts {
                primary: 120.0,
                middle: 120.0,
                high: 120.0,
                university: 150.0,
            },
            private_university_only: BandCosts {
                primary: 40.0,
                middle: 40.0,
                high: 40.0,
                university: 150.0,
            },
        }
    }
}

/// How long a housing phase lasts. On the wire this is either a year count
/// or the string `"indefinite"`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDuration", into = "RawDuration")]
pub enum HousingDuration {
    Years(i32),
    Indefinite,
}

impl HousingDuration {
    pub fn is_indefinite(self) -> bool {
        matches!(self, HousingDuration::Indefinite)
    }
}

impl std::str::FromStr for HousingDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "indefinite" | "infinite" | "inf" | "永住" => Ok(HousingDuration::Indefinite),
            other => other
                .parse::<i32>()
                .map(HousingDuration::Years)
                .map_err(|_| format!("invalid housing duration {other:?}")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Years(i32),
    Label(String),
}

impl TryFrom<RawDuration> for HousingDuration {
    type Error = String;

    fn try_from(value: RawDuration) -> Result<Self, Self::Error> {
        match value {
            RawDuration::Years(years) => Ok(HousingDuration::Years(years)),
            RawDuration::Label(label) => label.parse(),
        }
    }
}

impl From<HousingDuration> for RawDuration {
    fn from(value: HousingDuration) -> Self {
        match value {
            HousingDuration::Years(years) => RawDuration::Years(years),
            HousingDuration::Indefinite => RawDuration::Label("indefinite".to_string()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingPlan {
    pub monthly_cost: f64,
    pub duration: HousingDuration,
}

impl HousingPlan {
    pub fn years(monthly_cost: f64, years: i32) -> Self {
        Self {
            monthly_cost,
            duration: HousingDuration::Years(years),
        }
    }

    pub fn indefinite(monthly_cost: f64) -> Self {
        Self {
            monthly_cost,
            duration: HousingDuration::Indefinite,
        }
    }
}

/// Income representation. Both variants resolve housing through a plan list;
/// flat-savings mode is the two-phase special case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Economics {
    #[serde(rename_all = "camelCase")]
    Breakdown {
        monthly_income: f64,
        monthly_living_cost: f64,
        housing_plans: Vec<HousingPlan>,
    },
    #[serde(rename_all = "camelCase")]
    FlatSavings {
        monthly_savings: f64,
        housing_remaining_years: u32,
        rent_increase: f64,
    },
}

impl Economics {
    pub fn housing_plans(&self) -> Cow<'_, [HousingPlan]> {
        match self {
            Economics::Breakdown { housing_plans, .. } => Cow::Borrowed(housing_plans.as_slice()),
            Economics::FlatSavings {
                housing_remaining_years,
                rent_increase,
                ..
            } => {
                let after = HousingPlan::indefinite(*rent_increase);
                if *housing_remaining_years == 0 {
                    return Cow::Owned(vec![after]);
                }
                let years = i32::try_from(*housing_remaining_years).unwrap_or(i32::MAX);
                Cow::Owned(vec![HousingPlan::years(0.0, years), after])
            }
        }
    }

    /// Savings before childcare, education and bonus adjustments.
    pub fn base_annual_savings(&self, monthly_housing_cost: f64) -> f64 {
        match self {
            Economics::Breakdown {
                monthly_income,
                monthly_living_cost,
                ..
            } => (monthly_income - monthly_living_cost - monthly_housing_cost) * 12.0,
            Economics::FlatSavings {
                monthly_savings, ..
            } => monthly_savings * 12.0 - monthly_housing_cost * 12.0,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Economics::Breakdown { .. } => "breakdown",
            Economics::FlatSavings { .. } => "flat-savings",
        }
    }
}

/// A child, born `birth_offset_years` from now. Negative offsets mean the
/// child is already that many years old.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    #[serde(alias = "birthYearOffset")]
    pub birth_offset_years: i32,
    #[serde(default = "default_education_pattern")]
    pub education_pattern: EducationPattern,
}

fn default_education_pattern() -> EducationPattern {
    EducationPattern::AllPublic
}

impl Child {
    pub fn new(birth_offset_years: i32, education_pattern: EducationPattern) -> Self {
        Self {
            birth_offset_years,
            education_pattern,
        }
    }

    /// Age in the given simulation year, or `None` before birth.
    pub fn age_at(&self, years_elapsed: u32) -> Option<i32> {
        let age = i64::from(years_elapsed) - i64::from(self.birth_offset_years);
        if age >= 0 { i32::try_from(age).ok() } else { None }
    }
}

/// `OFFSET[:PATTERN]`, e.g. `2:all-private` or `-3`.
impl std::str::FromStr for Child {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (offset, pattern) = match s.split_once(':') {
            Some((offset, pattern)) => (offset, EducationPattern::from_label(pattern)),
            None => (s, EducationPattern::AllPublic),
        };
        let offset = offset
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid child birth offset in {s:?}"))?;
        Ok(Child::new(offset, pattern))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[serde(alias = "収入")]
    Income,
    #[serde(alias = "支出")]
    Expense,
}

/// A lump sum added to or taken from the balance in the year `age` is reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeEvent {
    pub age: u32,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub name: String,
}

impl OneTimeEvent {
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EventKind::Income => self.amount,
            EventKind::Expense => -self.amount,
        }
    }

    pub fn note(&self) -> String {
        let label = if self.name.is_empty() {
            match self.kind {
                EventKind::Income => "income",
                EventKind::Expense => "expense",
            }
        } else {
            self.name.as_str()
        };
        match self.kind {
            EventKind::Income => format!("{label} (+{})", self.amount),
            EventKind::Expense => format!("{label} (-{})", self.amount),
        }
    }
}

/// `AGE:AMOUNT:income|expense[:NAME]`, e.g. `40:100:expense:trip`.
impl std::str::FromStr for OneTimeEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let (Some(age), Some(amount), Some(kind)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "invalid one-time event {s:?}, expected AGE:AMOUNT:income|expense[:NAME]"
            ));
        };
        let age = age
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid event age in {s:?}"))?;
        let amount = amount
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid event amount in {s:?}"))?;
        let kind = match kind.trim() {
            "income" | "収入" => EventKind::Income,
            "expense" | "支出" => EventKind::Expense,
            other => return Err(format!("invalid event type {other:?} in {s:?}")),
        };
        Ok(OneTimeEvent {
            age,
            amount,
            kind,
            name: parts.next().unwrap_or_default().trim().to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HouseholdConfig {
    pub current_age: u32,
    pub current_assets: f64,
    pub annual_interest_rate: f64,
    pub economics: Economics,
    pub children: Vec<Child>,
    pub childcare_monthly_reduction: f64,
    pub education_costs: EducationCostTable,
    pub one_time_events: Vec<OneTimeEvent>,
    pub retirement_age: u32,
    pub retirement_bonus: f64,
    pub terminal_age: u32,
}

impl HouseholdConfig {
    pub fn simulated_years(&self) -> u32 {
        self.terminal_age.saturating_sub(self.current_age) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub age: u32,
    pub years_elapsed: u32,
    pub event_note: String,
    pub monthly_housing_cost: f64,
    pub annual_savings: f64,
    pub annual_education_cost: f64,
    pub one_time_amount: f64,
    pub year_end_balance: i64,
    pub investment_income: i64,
    pub total_principal: i64,
    pub total_investment_income: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn education_pattern_accepts_known_labels() {
        assert_eq!(
            EducationPattern::from_label("all-private"),
            EducationPattern::AllPrivate
        );
        assert_eq!(
            EducationPattern::from_label("privateUniversityOnly"),
            EducationPattern::PrivateUniversityOnly
        );
        assert_eq!(
            EducationPattern::from_label("全私立"),
            EducationPattern::AllPrivate
        );
    }

    #[test]
    fn unknown_education_pattern_falls_back_to_all_public() {
        assert_eq!(
            EducationPattern::from_label("boarding-school"),
            EducationPattern::AllPublic
        );
        let parsed: EducationPattern = serde_json::from_str("\"homeschool\"").expect("string");
        assert_eq!(parsed, EducationPattern::AllPublic);
    }

    #[test]
    fn housing_duration_parses_numbers_and_sentinel() {
        let plans: Vec<HousingPlan> = serde_json::from_str(
            r#"[{"monthlyCost":8,"duration":9},{"monthlyCost":15,"duration":"infinite"}]"#,
        )
        .expect("valid plans");
        assert_eq!(plans[0], HousingPlan::years(8.0, 9));
        assert_eq!(plans[1], HousingPlan::indefinite(15.0));

        let json = serde_json::to_string(&plans[1]).expect("serialize");
        assert_eq!(json, r#"{"monthlyCost":15.0,"duration":"indefinite"}"#);
    }

    #[test]
    fn housing_duration_rejects_unknown_label() {
        let err = serde_json::from_str::<HousingDuration>("\"forever-ish\"");
        assert!(err.is_err());
        assert_eq!("-3".parse::<HousingDuration>(), Ok(HousingDuration::Years(-3)));
    }

    #[test]
    fn flat_savings_expands_to_two_phase_plan_list() {
        let economics = Economics::FlatSavings {
            monthly_savings: 20.0,
            housing_remaining_years: 4,
            rent_increase: 3.0,
        };
        assert_eq!(
            economics.housing_plans().as_ref(),
            &[HousingPlan::years(0.0, 4), HousingPlan::indefinite(3.0)]
        );

        let immediate = Economics::FlatSavings {
            monthly_savings: 20.0,
            housing_remaining_years: 0,
            rent_increase: 3.0,
        };
        assert_eq!(
            immediate.housing_plans().as_ref(),
            &[HousingPlan::indefinite(3.0)]
        );
    }

    #[test]
    fn economics_deserializes_by_mode_discriminant() {
        let economics: Economics = serde_json::from_str(
            r#"{"mode":"flat-savings","monthlySavings":20,"housingRemainingYears":5,"rentIncrease":2}"#,
        )
        .expect("valid economics");
        assert_eq!(economics.mode_name(), "flat-savings");
        assert_eq!(economics.base_annual_savings(2.0), 216.0);
    }

    #[test]
    fn child_parses_offset_and_pattern() {
        assert_eq!(
            "2:all-private".parse::<Child>(),
            Ok(Child::new(2, EducationPattern::AllPrivate))
        );
        assert_eq!(
            "-3".parse::<Child>(),
            Ok(Child::new(-3, EducationPattern::AllPublic))
        );
        assert!("soon:all-public".parse::<Child>().is_err());

        let child: Child =
            serde_json::from_str(r#"{"birthYearOffset":5,"educationPattern":"大学のみ私立"}"#)
                .expect("valid child");
        assert_eq!(child, Child::new(5, EducationPattern::PrivateUniversityOnly));
    }

    #[test]
    fn child_age_is_absent_before_birth() {
        let child = Child::new(2, EducationPattern::AllPublic);
        assert_eq!(child.age_at(1), None);
        assert_eq!(child.age_at(2), Some(0));
        assert_eq!(Child::new(-4, EducationPattern::AllPublic).age_at(0), Some(4));
    }

    #[test]
    fn one_time_event_parses_wire_and_flag_forms() {
        let event: OneTimeEvent =
            serde_json::from_str(r#"{"age":40,"amount":100,"type":"expense","name":"旅行"}"#)
                .expect("valid event");
        assert_eq!(event.kind, EventKind::Expense);
        assert_eq!(event.signed_amount(), -100.0);
        assert_eq!(event.note(), "旅行 (-100)");

        let parsed: OneTimeEvent = "45:250:income:inheritance".parse().expect("valid flag");
        assert_eq!(parsed.age, 45);
        assert_eq!(parsed.signed_amount(), 250.0);
        assert_eq!(parsed.note(), "inheritance (+250)");

        let unnamed: OneTimeEvent = "50:10:expense".parse().expect("name is optional");
        assert_eq!(unnamed.note(), "expense (-10)");

        assert!("50:10:gift".parse::<OneTimeEvent>().is_err());
        assert!("50:10".parse::<OneTimeEvent>().is_err());
    }
}
