use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("inner_text, inner_html and children are mutually exclusive")]
    ExclusiveContent,

    #[error("element {0} not found")]
    ElementNotFound(String),

    #[error("element {0} has no data-text attribute")]
    MissingTextTemplate(String),

    #[error("unexpected http {0}")]
    UnexpectedStatus(u16),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
