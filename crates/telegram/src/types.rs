use serde::Deserialize;

/// Bot API envelope. Payloads are not modeled; callers only need ok/description.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub description: Option<String>,
}

impl ApiResponse {
    pub fn error_description(&self) -> &str {
        self.description.as_deref().unwrap_or("no description")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parsing() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"description":"chat not found","error_code":400}"#)
                .unwrap();
        assert!(!response.ok);
        assert_eq!(response.error_description(), "chat not found");
    }
}
