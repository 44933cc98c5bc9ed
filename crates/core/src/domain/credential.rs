/// Opaque bearer credential, acquired once per run and discarded at exit.
///
/// Debug output never exposes the full token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix safe for logs.
    pub fn preview(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(30)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken({}...)", self.preview())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates() {
        let token = AccessToken::new("a".repeat(64));
        assert_eq!(token.preview().len(), 30);
    }

    #[test]
    fn test_debug_hides_full_token() {
        let token = AccessToken::new("secret-token-value-that-is-quite-long-indeed");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("indeed"));
    }
}
