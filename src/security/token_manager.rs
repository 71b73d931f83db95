//! Secure credential manager with memory-safe handling and masking capabilities
//!
//! Identity and credential values for the downstream repository are read from
//! environment variables once and held as `secrecy` strings, so they never show
//! up in `Debug` output. Command lines and stderr are passed through
//! [`SecureTokenManager::mask_tokens_in_string`] before they are logged.

use crate::core::error::{ReleaseError, ReleaseResult};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;

/// Account that owns the downstream repository and authors the commit
pub const GITHUB_USERNAME: &str = "GH_USERNAME";

/// Access token used to authenticate the clone and the push
pub const GITHUB_TOKEN: &str = "GH_TOKEN";

/// Commit author e-mail
pub const COMMIT_EMAIL: &str = "EMAIL";

/// Every variable the manager reads from the environment
const CREDENTIAL_VARIABLES: &[&str] = &[GITHUB_USERNAME, GITHUB_TOKEN, COMMIT_EMAIL];

/// Variables whose values must never appear in logs or errors
const MASKED_VARIABLES: &[&str] = &[GITHUB_TOKEN];

/// Secure credential manager for repository authentication
///
/// # Examples
///
/// ```
/// use addon_release::security::SecureTokenManager;
/// use std::collections::HashMap;
///
/// let manager = SecureTokenManager::from_values(HashMap::from([(
///     "GH_TOKEN".to_string(),
///     "ghp_0123456789abcdef".to_string(),
/// )]));
/// assert_eq!(
///     manager.mask_tokens_in_string("token ghp_0123456789abcdef"),
///     "token ghp...def"
/// );
/// ```
#[derive(Debug, Default)]
pub struct SecureTokenManager {
    values: HashMap<String, SecretString>,
}

impl SecureTokenManager {
    /// Reads the credential variables from the process environment.
    ///
    /// Unset and empty variables are treated the same.
    pub fn from_env() -> Self {
        let values = CREDENTIAL_VARIABLES
            .iter()
            .filter_map(|name| {
                let value = env::var(name).ok().filter(|v| !v.is_empty())?;
                Some((name.to_string(), SecretString::new(value.into())))
            })
            .collect();

        Self { values }
    }

    /// Builds a manager from explicit values
    pub fn from_values(values: HashMap<String, String>) -> Self {
        let values = values
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k, SecretString::new(v.into())))
            .collect();

        Self { values }
    }

    /// Retrieves a credential by variable name
    pub fn get_token(&self, variable: &str) -> Option<&SecretString> {
        self.values.get(variable)
    }

    /// Retrieves a credential, failing with `CredentialMissing` when unset
    pub fn require(&self, variable: &str) -> ReleaseResult<&SecretString> {
        self.get_token(variable)
            .ok_or_else(|| ReleaseError::CredentialMissing {
                variable: variable.to_string(),
            })
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    ///
    /// ```
    /// use addon_release::security::SecureTokenManager;
    ///
    /// let manager = SecureTokenManager::default();
    /// assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(manager.mask_token("short"), "****");
    /// ```
    pub fn mask_token(&self, token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() < 10 {
            return "****".to_string();
        }

        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }

    /// Masks every secret credential occurring in `text`
    pub fn mask_tokens_in_string(&self, text: &str) -> String {
        let mut masked = text.to_string();

        for variable in MASKED_VARIABLES {
            if let Some(token) = self.get_token(variable) {
                let token_str = token.expose_secret();
                masked = masked.replace(token_str, &self.mask_token(token_str));
            }
        }

        masked
    }

    /// Builds an HTTPS remote URL carrying the username and token.
    ///
    /// The result is itself a secret; render it through
    /// [`Self::mask_tokens_in_string`] before showing it anywhere.
    pub fn authenticated_url(
        &self,
        host: &str,
        owner: Option<&str>,
        repository: &str,
    ) -> ReleaseResult<SecretString> {
        let username = self.require(GITHUB_USERNAME)?.expose_secret();
        let token = self.require(GITHUB_TOKEN)?.expose_secret();
        let owner = owner.unwrap_or(username);

        let url = format!(
            "https://{}:{}@{}/{}/{}.git",
            username, token, host, owner, repository
        );
        Ok(SecretString::new(url.into()))
    }
}
