use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown build mode: {0}")]
    UnknownBuildMode(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::UnknownBuildMode("weekly".to_string());
        assert!(error.to_string().contains("weekly"));
    }
}
