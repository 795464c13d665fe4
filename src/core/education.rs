use super::types::{BandCosts, EducationCostTable, EducationPattern};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EducationBand {
    Primary,
    Middle,
    High,
    University,
}

impl EducationBand {
    /// Band for a child's age. Bounds are inclusive: 7-12, 13-15, 16-18, 19-22.
    pub fn for_age(child_age: i32) -> Option<Self> {
        match child_age {
            7..=12 => Some(EducationBand::Primary),
            13..=15 => Some(EducationBand::Middle),
            16..=18 => Some(EducationBand::High),
            19..=22 => Some(EducationBand::University),
            _ => None,
        }
    }

    fn cost(self, costs: &BandCosts) -> f64 {
        match self {
            EducationBand::Primary => costs.primary,
            EducationBand::Middle => costs.middle,
            EducationBand::High => costs.high,
            EducationBand::University => costs.university,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EducationBandClassifier {
    costs: BandCosts,
}

impl EducationBandClassifier {
    pub fn new(table: &EducationCostTable, pattern: EducationPattern) -> Self {
        Self {
            costs: *table.costs_for(pattern),
        }
    }

    /// Annual education cost for a child of `child_age`; `None` means not yet born.
    pub fn classify(&self, child_age: Option<i32>) -> f64 {
        child_age
            .and_then(EducationBand::for_age)
            .map_or(0.0, |band| band.cost(&self.costs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(pattern: EducationPattern) -> EducationBandClassifier {
        EducationBandClassifier::new(&EducationCostTable::default(), pattern)
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        assert_eq!(EducationBand::for_age(6), None);
        assert_eq!(EducationBand::for_age(7), Some(EducationBand::Primary));
        assert_eq!(EducationBand::for_age(12), Some(EducationBand::Primary));
        assert_eq!(EducationBand::for_age(13), Some(EducationBand::Middle));
        assert_eq!(EducationBand::for_age(15), Some(EducationBand::Middle));
        assert_eq!(EducationBand::for_age(16), Some(EducationBand::High));
        assert_eq!(EducationBand::for_age(18), Some(EducationBand::High));
        assert_eq!(EducationBand::for_age(19), Some(EducationBand::University));
        assert_eq!(EducationBand::for_age(22), Some(EducationBand::University));
        assert_eq!(EducationBand::for_age(23), None);
        assert_eq!(EducationBand::for_age(-1), None);
    }

    #[test]
    fn unborn_or_out_of_band_child_costs_nothing() {
        let public = classifier(EducationPattern::AllPublic);
        assert_eq!(public.classify(None), 0.0);
        assert_eq!(public.classify(Some(0)), 0.0);
        assert_eq!(public.classify(Some(4)), 0.0);
        assert_eq!(public.classify(Some(23)), 0.0);
    }

    #[test]
    fn costs_follow_selected_pattern() {
        let public = classifier(EducationPattern::AllPublic);
        let private = classifier(EducationPattern::AllPrivate);
        let uni_only = classifier(EducationPattern::PrivateUniversityOnly);

        assert_eq!(public.classify(Some(7)), 40.0);
        assert_eq!(public.classify(Some(20)), 100.0);
        assert_eq!(private.classify(Some(14)), 120.0);
        assert_eq!(private.classify(Some(22)), 150.0);
        assert_eq!(uni_only.classify(Some(17)), 40.0);
        assert_eq!(uni_only.classify(Some(19)), 150.0);
    }

    #[test]
    fn child_age_is_measured_from_birth_offset() {
        let public = classifier(EducationPattern::AllPublic);
        let birth_offset = 2;
        let age_at = |years_elapsed: i32| {
            (years_elapsed >= birth_offset).then_some(years_elapsed - birth_offset)
        };

        assert_eq!(public.classify(age_at(9)), 40.0);
        assert_eq!(public.classify(age_at(6)), 0.0);
        assert_eq!(public.classify(age_at(1)), 0.0);
    }

    #[test]
    fn custom_table_overrides_defaults() {
        let mut table = EducationCostTable::default();
        table.all_public.high = 55.0;
        let public = EducationBandClassifier::new(&table, EducationPattern::AllPublic);
        assert_eq!(public.classify(Some(16)), 55.0);
    }
}
