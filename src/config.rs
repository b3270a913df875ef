use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
pub const DEFAULT_USER_ID: &str = "me";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_TOKEN_CACHE_PATH: &str = "google_api_access_token.json";
pub const DEFAULT_REDIRECT_PORT: u16 = 18081;
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Runtime settings shared by the auth provider and the API client.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub user_id: String,
    /// OAuth client secret downloaded from the cloud console.
    pub credentials_path: PathBuf,
    /// Where access and refresh tokens are persisted between runs.
    pub token_cache_path: PathBuf,
    pub redirect_port: u16,
    pub scopes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            token_cache_path: PathBuf::from(DEFAULT_TOKEN_CACHE_PATH),
            redirect_port: DEFAULT_REDIRECT_PORT,
            scopes: vec![GMAIL_READONLY_SCOPE.to_string()],
        }
    }
}

impl Config {
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    pub fn with_token_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache_path = path.into();
        self
    }

    pub fn with_redirect_port(mut self, port: u16) -> Self {
        self.redirect_port = port;
        self
    }

    /// Base URL of the current user's resources, e.g. `.../users/me`.
    pub fn user_url(&self) -> String {
        format!("{}/users/{}", self.api_base, self.user_id)
    }
}
