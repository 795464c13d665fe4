use thiserror::Error;

/// Invalid household configuration. Raised before any year is simulated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("housing plan #{index} must last at least one year (got {years})")]
    NonPositiveHousingDuration { index: usize, years: i32 },
    #[error("current age {current_age} must be below terminal age {terminal_age}")]
    AgeOrder { current_age: u32, terminal_age: u32 },
    #[error("terminal age must be between {min} and {max} (got {terminal_age})")]
    TerminalAgeOutOfRange { terminal_age: u32, min: u32, max: u32 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}
