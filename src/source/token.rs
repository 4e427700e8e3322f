use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use super::SourceError;

const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";

const SCOPES: &str = "offline_access \
    https://graph.microsoft.com/Calendars.Read \
    https://graph.microsoft.com/Calendars.Read.Shared \
    https://graph.microsoft.com/Calendars.ReadBasic";

/// Tokens this close to their expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth2 application credentials used to refresh access tokens.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Contents of the token file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: i64,
}

impl Token {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() + EXPIRY_MARGIN_SECS < self.expires_at
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

impl RefreshResponse {
    fn into_token(self, previous: &Token, now: DateTime<Utc>) -> Token {
        Token {
            access_token: self.access_token,
            // The endpoint may keep the old refresh token valid without echoing it.
            refresh_token: self.refresh_token.or_else(|| previous.refresh_token.clone()),
            expires_at: now.timestamp() + self.expires_in,
        }
    }
}

/// Bearer tokens for Microsoft Graph, backed by a JSON file that is rewritten
/// whenever a token gets refreshed.
pub struct TokenStore {
    path: PathBuf,
    credentials: Credentials,
    token: Mutex<Option<Token>>,
}

impl TokenStore {
    pub fn new<P: Into<PathBuf>>(path: P, credentials: Credentials) -> Self {
        Self {
            path: path.into(),
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Reads the token file, failing if it is missing or unreadable.
    pub async fn load(&self) -> Result<(), SourceError> {
        let token = self.read().await?;
        *self.token.lock().await = Some(token);
        Ok(())
    }

    /// A currently valid access token, refreshing it first if needed.
    pub async fn access_token(&self, client: &Client) -> Result<String, SourceError> {
        let mut slot = self.token.lock().await;

        let mut token = match slot.take() {
            Some(token) => token,
            None => self.read().await?,
        };

        if !token.is_fresh(Utc::now()) {
            token = self.refresh(client, &token).await?;
            self.write(&token).await?;
        }

        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }

    async fn read(&self) -> Result<Token, SourceError> {
        debug!("Reading token file {}", self.path.display());
        let raw = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write(&self, token: &Token) -> Result<(), SourceError> {
        fs::write(&self.path, serde_json::to_vec_pretty(token)?).await?;
        Ok(())
    }

    async fn refresh(&self, client: &Client, token: &Token) -> Result<Token, SourceError> {
        let Some(refresh_token) = &token.refresh_token else {
            return Err(SourceError::Token(
                "access token expired and no refresh token is available".into(),
            ));
        };

        info!("Refreshing Microsoft Graph access token");

        let response = client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("scope", SCOPES),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Token(format!(
                "token endpoint answered with status {status}"
            )));
        }

        let refreshed = response.json::<RefreshResponse>().await?;
        Ok(refreshed.into_token(token, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 18, 12, 0, 0).unwrap()
    }

    fn token(expires_at: i64) -> Token {
        Token {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            expires_at,
        }
    }

    #[test]
    fn tokens_close_to_expiry_are_stale() {
        let now = noon().timestamp();

        assert!(token(now + 3600).is_fresh(noon()));
        assert!(token(now + 61).is_fresh(noon()));
        assert!(!token(now + 60).is_fresh(noon()));
        assert!(!token(now - 10).is_fresh(noon()));
    }

    #[test]
    fn parses_token_files() {
        let raw = r#"{"access_token": "abc", "refresh_token": "def", "expires_at": 1710763200}"#;
        let token = serde_json::from_str::<Token>(raw).unwrap();

        assert_eq!(token.access_token, "abc");
        assert_eq!(token.refresh_token.as_deref(), Some("def"));
        assert_eq!(token.expires_at, 1_710_763_200);

        let raw = r#"{"access_token": "abc", "expires_at": 0}"#;
        assert_eq!(serde_json::from_str::<Token>(raw).unwrap().refresh_token, None);
    }

    #[test]
    fn refreshed_tokens_keep_the_old_refresh_token_when_none_is_returned() {
        let response = RefreshResponse {
            access_token: "new".into(),
            refresh_token: None,
            expires_in: 3600,
        };

        let refreshed = response.into_token(&token(0), noon());

        assert_eq!(refreshed.access_token, "new");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(refreshed.expires_at, noon().timestamp() + 3600);
    }

    #[tokio::test]
    async fn loading_a_missing_file_fails() {
        let store = TokenStore::new(
            "/nonexistent/meeting-sign/token.json",
            Credentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
            },
        );

        assert!(matches!(store.load().await, Err(SourceError::Io(_))));
    }
}
