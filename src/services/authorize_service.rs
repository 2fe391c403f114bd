use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::OAuthClientConfig;
use crate::errors::{DigestError, DigestResult};

pub const DEFAULT_TOKEN_FILE: &str = "oauth_token.json";

/// What the authorize command writes to disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenFile {
    pub refresh_token: String,
    pub token: String,
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
}

impl TokenFile {
    /// Google omits the refresh token when consent was already granted
    /// without `prompt=consent`; that grant is useless for unattended runs.
    pub fn from_grant(grant: gmail::TokenGrant, client: &OAuthClientConfig) -> DigestResult<Self> {
        let refresh_token = grant.refresh_token.ok_or_else(|| {
            DigestError::Auth("token response did not include a refresh token".to_string())
        })?;

        let scopes = grant
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| vec![gmail::SEND_SCOPE.to_string()]);

        Ok(Self {
            refresh_token,
            token: grant.access_token,
            scopes,
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
        })
    }

    pub fn save(&self, path: &Path) -> DigestResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
