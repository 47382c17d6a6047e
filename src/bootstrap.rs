//! Assembling the application state at startup

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{hash_password, AuthError, TokenKeys};
use crate::config::{AppConfig, AuthSettings, LlmSettings};
use crate::llm::{create_provider, ChatRelay, LlmError, ProviderKind, Providers};
use crate::state::AppState;
use crate::store::{Store, StoreError};
use crate::uploads::{UploadDir, UploadError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database: {0}")]
    Store(#[from] StoreError),

    #[error("credentials: {0}")]
    Auth(#[from] AuthError),

    #[error("LLM provider: {0}")]
    Llm(#[from] LlmError),

    #[error("upload directory: {0}")]
    Upload(#[from] UploadError),
}

/// Build the chat relay from the configured providers
pub fn build_relay(llm: &LlmSettings) -> Result<ChatRelay, LlmError> {
    if llm.openai_api_key.is_none() {
        warn!(base_url = %llm.openai_base_url, "OPENAI_API_KEY is not set; requests are sent without a key");
    }
    let openai = create_provider(ProviderKind::OpenAiCompatible, llm.openai_endpoint())?;

    let anthropic = match llm.anthropic_endpoint() {
        Some(endpoint) => Some(create_provider(ProviderKind::Anthropic, endpoint)?),
        None => None,
    };

    info!(
        default_model = %llm.default_model,
        openai_base_url = %llm.openai_base_url,
        anthropic = anthropic.is_some(),
        "configured LLM providers"
    );

    Ok(ChatRelay::new(
        Providers::new(openai, anthropic),
        llm.default_model.clone(),
        llm.generation_config(),
    ))
}

/// Create the bootstrap administrator unless it already exists
pub async fn ensure_admin(store: &Store, auth: &AuthSettings) -> Result<(), BootstrapError> {
    if store.find_user_by_username(&auth.admin_username).await?.is_some() {
        return Ok(());
    }

    let hashed = hash_password(&auth.admin_password, auth.bcrypt_cost).await?;
    if store
        .insert_admin_if_missing(&auth.admin_username, &hashed)
        .await?
    {
        info!(username = %auth.admin_username, "created bootstrap administrator account");
    }
    Ok(())
}

/// Connect to the database, prepare it and assemble the shared state
pub async fn build_state(config: &AppConfig) -> Result<AppState, BootstrapError> {
    if config.auth.uses_dev_secret() {
        warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    let store = Store::connect(&config.database).await?;
    store.apply_schema().await?;
    ensure_admin(&store, &config.auth).await?;

    let uploads = UploadDir::new(&config.upload_dir, config.max_upload_bytes);
    uploads.ensure_exists().await?;

    Ok(AppState {
        store,
        relay: build_relay(&config.llm)?,
        tokens: TokenKeys::new(&config.auth.jwt_secret, config.auth.token_ttl),
        bcrypt_cost: config.auth.bcrypt_cost,
        uploads,
    })
}
