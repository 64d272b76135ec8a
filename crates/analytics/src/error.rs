use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Arithmetic overflow while accumulating '{0}'")]
    Overflow(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
