use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Generative-model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Generative-model API returned an error: {0}")]
    ApiError(String),

    #[error("The model returned no usable answer: {0}")]
    EmptyResponse(String),

    #[error("Failed to parse the model's analysis: {0}")]
    Parse(String),

    #[error("Failed to serialize trade data: {0}")]
    Serialization(#[from] serde_json::Error),
}
