use thiserror::Error;

/// Failures of the JSON store.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_convert_with_context() {
        let io: BotError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(io, BotError::Io(_)));
        assert_eq!(io.to_string(), "Storage error: read-only");

        let json: BotError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(json.to_string().starts_with("Serialization error:"));
    }
}
