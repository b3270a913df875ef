use crate::config::Config;
use crate::error::{MailError, Result};
use async_trait::async_trait;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

pub const KEYRING_SERVICE_NAME: &str = "mailpeek-gmail-credentials";
pub const KEYRING_USERNAME: &str = "default_user";

#[derive(Serialize, Deserialize, Clone)]
pub struct SecureCredentials {
    pub client_secret: Option<ApplicationSecret>,
}

impl SecureCredentials {
    pub fn new() -> Self {
        Self {
            client_secret: None,
        }
    }

    pub fn with_client_secret(mut self, secret: ApplicationSecret) -> Self {
        self.client_secret = Some(secret);
        self
    }
}

impl Default for SecureCredentials {
    fn default() -> Self {
        Self::new()
    }
}

// Define a trait for Keyring operations to allow mocking
#[cfg_attr(test, mockall::automock)]
pub trait KeyringEntry: Send + Sync {
    fn get_password(&self) -> std::result::Result<String, keyring::Error>;
    fn set_password(&self, password: &str) -> std::result::Result<(), keyring::Error>;
    fn delete_password(&self) -> std::result::Result<(), keyring::Error>;
}

// Implement the trait for the real keyring::Entry
impl KeyringEntry for Entry {
    fn get_password(&self) -> std::result::Result<String, keyring::Error> {
        self.get_password()
    }
    fn set_password(&self, password: &str) -> std::result::Result<(), keyring::Error> {
        self.set_password(password)
    }
    fn delete_password(&self) -> std::result::Result<(), keyring::Error> {
        self.delete_password()
    }
}

// Define a trait for OAuth flow operations to allow mocking
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    async fn perform_flow(&self, secret: ApplicationSecret, scopes: Vec<String>) -> Result<String>;
}

/// Installed-app flow with a local redirect. Tokens, including the refresh
/// token, are persisted to `token_cache_path` so later runs skip the browser.
pub struct RealOAuthFlow {
    token_cache_path: PathBuf,
    redirect_port: u16,
}

impl RealOAuthFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            token_cache_path: config.token_cache_path.clone(),
            redirect_port: config.redirect_port,
        }
    }
}

#[async_trait]
impl OAuthFlow for RealOAuthFlow {
    async fn perform_flow(&self, secret: ApplicationSecret, scopes: Vec<String>) -> Result<String> {
        let auth = InstalledFlowAuthenticator::builder(
            secret,
            InstalledFlowReturnMethod::HTTPPortRedirect(self.redirect_port),
        )
        .persist_tokens_to_disk(self.token_cache_path.clone())
        .build()
        .await
        .map_err(|e| MailError::Auth(format!("Failed to build authenticator: {}", e)))?;

        let scopes_refs: Vec<&str> = scopes.iter().map(|s| s.as_str()).collect();
        let token = auth
            .token(&scopes_refs)
            .await
            .map_err(|e| MailError::Auth(e.to_string()))?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| MailError::Auth("No access token returned".to_string()))
    }
}

// Helper function to load secure credentials from keyring
async fn load_secure_credentials<K: KeyringEntry>(
    credentials_keyring: &K,
) -> Result<SecureCredentials> {
    let credentials_json = credentials_keyring.get_password()?;
    let credentials: SecureCredentials = serde_json::from_str(&credentials_json)?;
    Ok(credentials)
}

// Helper function to save secure credentials to keyring
async fn save_secure_credentials<K: KeyringEntry>(
    credentials_keyring: &K,
    credentials: &SecureCredentials,
) -> Result<()> {
    let credentials_json = serde_json::to_string(credentials)?;
    credentials_keyring.set_password(&credentials_json)?;
    Ok(())
}

// Helper function to load the client secret, keyring first
async fn load_client_secret<K: KeyringEntry>(
    credentials_keyring: &K,
    credentials_path: &Path,
) -> Result<(ApplicationSecret, bool)> {
    if let Ok(credentials) = load_secure_credentials(credentials_keyring).await {
        if let Some(secret) = credentials.client_secret {
            return Ok((secret, false)); // From keyring, not from file
        }
    }

    match yup_oauth2::read_application_secret(credentials_path).await {
        Ok(secret) => {
            let credentials = SecureCredentials::new().with_client_secret(secret.clone());
            if let Err(e) = save_secure_credentials(credentials_keyring, &credentials).await {
                warn!("Failed to save client secret to keyring: {}", e);
            }
            Ok((secret, true)) // From file
        }
        Err(e) => Err(MailError::Auth(format!(
            "Failed to read {}: {}. Download the OAuth client secret and save it there.",
            credentials_path.display(),
            e
        ))),
    }
}

// Authentication result with additional info
#[derive(Debug)]
pub struct AuthResult {
    pub token: String,
    pub client_secret_loaded_from_file: bool,
}

// Main authentication function
pub async fn try_authenticate(config: &Config) -> Result<AuthResult> {
    let credentials_keyring = Entry::new(KEYRING_SERVICE_NAME, KEYRING_USERNAME)?;
    let oauth_flow_impl = RealOAuthFlow::new(config);

    try_authenticate_internal(
        &credentials_keyring,
        &oauth_flow_impl,
        &config.credentials_path,
        &config.scopes,
    )
    .await
}

async fn try_authenticate_internal<K: KeyringEntry, O: OAuthFlow>(
    credentials_keyring: &K,
    oauth_flow_impl: &O,
    credentials_path: &Path,
    scopes: &[String],
) -> Result<AuthResult> {
    let mut retry_count = 0;
    let mut client_secret_from_file = false;
    loop {
        let (secret, from_file) = load_client_secret(credentials_keyring, credentials_path).await?;
        if from_file {
            client_secret_from_file = true;
        }

        match oauth_flow_impl.perform_flow(secret, scopes.to_vec()).await {
            Ok(token) => {
                info!("Authenticated");
                return Ok(AuthResult {
                    token,
                    client_secret_loaded_from_file: client_secret_from_file,
                });
            }
            Err(e) => {
                warn!("Authentication failed: {}", e);
                if retry_count == 0 {
                    warn!("Clearing keyring and retrying with {}", credentials_path.display());
                    // Force the client secret to be re-read from file
                    let _ = credentials_keyring.delete_password();
                    retry_count += 1;
                    continue;
                } else {
                    return Err(MailError::Auth(format!(
                        "still failing after retry: {}",
                        e
                    )));
                }
            }
        }
    }
}

/// Removes the stored client secret. Returns false when nothing was stored.
pub fn clear_keyring() -> Result<bool> {
    let credentials_keyring = Entry::new(KEYRING_SERVICE_NAME, KEYRING_USERNAME)?;
    clear_keyring_entry(&credentials_keyring)
}

fn clear_keyring_entry<K: KeyringEntry>(credentials_keyring: &K) -> Result<bool> {
    match credentials_keyring.delete_password() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
