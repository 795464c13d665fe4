mod education;
mod engine;
mod error;
mod housing;
mod summary;
mod types;

pub use education::{EducationBand, EducationBandClassifier};
pub use engine::run;
pub use error::ConfigurationError;
pub use housing::{HousingPhaseResolver, HousingResolution, resolve_housing_cost};
pub use summary::{ProjectionSummary, summarize};
pub use types::{
    BandCosts, Child, DEFAULT_TERMINAL_AGE, Economics, EducationCostTable, EducationPattern,
    EventKind, HouseholdConfig, HousingDuration, HousingPlan, MAX_TERMINAL_AGE, OneTimeEvent,
    YearRecord,
};
