use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("{0}")]
    DynamoDb(#[from] aws_sdk_dynamodb::Error),
}

/// Each variant carries the message returned in the response body.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Método HTTP no soportado: {0}")]
    UnsupportedMethod(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub(crate) fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedMethod(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub(crate) fn missing_field(field: &str) -> Self {
        ApiError::BadRequest(format!("Falta el campo '{field}'."))
    }

    pub(crate) fn store(context: &str, err: StoreError) -> Self {
        ApiError::Internal(format!("{context}: {err}"))
    }
}
