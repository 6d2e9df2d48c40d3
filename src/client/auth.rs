use crate::error::RosterError;
use eyre::Result;

/// Environment variable holding an OAuth 2.0 access token for the Google APIs
pub const ACCESS_TOKEN_VAR: &str = "GOOGLE_ACCESS_TOKEN";

pub enum Auth {
    /// OAuth bearer token sent in the Authorization header
    Bearer(String),
    /// No credentials configured
    None,
}

impl Auth {
    pub fn new(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Bearer(token.trim().to_string()),
            _ => Self::None,
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Self {
        Self::new(std::env::var(ACCESS_TOKEN_VAR).ok())
    }

    /// Header value for the Authorization header
    ///
    /// # Errors
    /// Fails with [`RosterError::AuthenticationFailure`] when no credentials are configured.
    pub fn header_value(&self) -> Result<String> {
        match self {
            Self::Bearer(token) => Ok(format!("Bearer {}", token)),
            Self::None => Err(RosterError::AuthenticationFailure {
                reason: format!("{} is not set", ACCESS_TOKEN_VAR),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_none() {
        assert!(matches!(Auth::new(Some("  ".to_string())), Auth::None));
        assert!(matches!(Auth::new(None), Auth::None));
    }

    #[test]
    fn test_bearer_header() {
        let auth = Auth::new(Some("ya29.token\n".to_string()));
        assert_eq!(auth.header_value().unwrap(), "Bearer ya29.token");
        assert_eq!(auth.to_string(), "Bearer");
    }

    #[test]
    fn test_missing_credentials() {
        let err = Auth::None.header_value().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RosterError>(),
            Some(RosterError::AuthenticationFailure { .. })
        ));
    }
}
