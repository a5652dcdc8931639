use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter {name}: {detail}")]
    InvalidParameter {
        name: &'static str,
        detail: String,
    },
}

impl Error {
    pub fn invalid_parameter(name: &'static str, detail: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            detail: detail.into(),
        }
    }
}
