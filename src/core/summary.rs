use serde::Serialize;

use super::types::YearRecord;

/// Milestones derived from a finished projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    /// First age whose year-end balance reaches the target; `None` if never.
    pub target_reached_age: Option<u32>,
    pub reference_age: u32,
    /// `None` when the reference age falls outside the simulated range.
    pub reference_balance: Option<i64>,
    pub peak_age: u32,
    pub peak_balance: i64,
    pub depletion_age: Option<u32>,
    pub final_age: u32,
    pub final_balance: i64,
}

pub fn summarize(
    records: &[YearRecord],
    target_amount: f64,
    reference_age: u32,
) -> Option<ProjectionSummary> {
    let last = records.last()?;

    let target_reached_age = records
        .iter()
        .find(|r| r.year_end_balance as f64 >= target_amount)
        .map(|r| r.age);
    let reference_balance = records
        .iter()
        .find(|r| r.age == reference_age)
        .map(|r| r.year_end_balance);
    let depletion_age = records
        .iter()
        .find(|r| r.year_end_balance < 0)
        .map(|r| r.age);

    let mut peak = &records[0];
    for record in &records[1..] {
        if record.year_end_balance > peak.year_end_balance {
            peak = record;
        }
    }

    Some(ProjectionSummary {
        target_reached_age,
        reference_age,
        reference_balance,
        peak_age: peak.age,
        peak_balance: peak.year_end_balance,
        depletion_age,
        final_age: last.age,
        final_balance: last.year_end_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: u32, balance: i64) -> YearRecord {
        YearRecord {
            age,
            years_elapsed: age - 40,
            event_note: String::new(),
            monthly_housing_cost: 0.0,
            annual_savings: 0.0,
            annual_education_cost: 0.0,
            one_time_amount: 0.0,
            year_end_balance: balance,
            investment_income: 0,
            total_principal: 0,
            total_investment_income: 0,
        }
    }

    fn trajectory() -> Vec<YearRecord> {
        vec![
            record(40, 3_000),
            record(41, 4_999),
            record(42, 5_000),
            record(43, 6_500),
            record(44, 6_500),
            record(45, -20),
            record(46, 100),
        ]
    }

    #[test]
    fn finds_milestones() {
        let summary = summarize(&trajectory(), 5_000.0, 43).expect("non-empty");
        assert_eq!(summary.target_reached_age, Some(42));
        assert_eq!(summary.reference_balance, Some(6_500));
        assert_eq!(summary.peak_age, 43);
        assert_eq!(summary.peak_balance, 6_500);
        assert_eq!(summary.depletion_age, Some(45));
        assert_eq!(summary.final_age, 46);
        assert_eq!(summary.final_balance, 100);
    }

    #[test]
    fn unreached_target_and_out_of_range_reference_are_distinct_outcomes() {
        let summary = summarize(&trajectory(), 10_000.0, 70).expect("non-empty");
        assert_eq!(summary.target_reached_age, None);
        assert_eq!(summary.reference_age, 70);
        assert_eq!(summary.reference_balance, None);
    }

    #[test]
    fn empty_projection_has_no_summary() {
        assert_eq!(summarize(&[], 5_000.0, 55), None);
    }
}
