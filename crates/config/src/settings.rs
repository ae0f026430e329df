use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub paypal: PayPalSettings,
    pub email: EmailSettings,
    pub party: PartySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub public_url: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PayPalSettings {
    pub api_base: String,
    pub client_id: String,
    pub client_secret: String,
    pub currency: String,
}

impl PayPalSettings {
    /// Without credentials, order create/capture is skipped and payments
    /// are recorded directly.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailSettings {
    pub enabled: bool,
    pub api_base: String,
    pub api_key: String,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PartySettings {
    /// When true, the last outstanding participant payment moves the
    /// party from in_payment to completed without an organizer action.
    pub auto_complete: bool,
    /// Password-reset tokens expire after this many seconds.
    pub reset_token_ttl_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("SHOPSQUAD"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.public_url", "http://localhost:3000")?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "shopsquad")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.refresh_token_ttl_secs", 604800)?
            .set_default("jwt.issuer", "shopsquad")?
            .set_default("paypal.api_base", "https://api-m.sandbox.paypal.com")?
            .set_default("paypal.client_id", "")?
            .set_default("paypal.client_secret", "")?
            .set_default("paypal.currency", "EUR")?
            .set_default("email.enabled", false)?
            .set_default("email.api_base", "https://api.mailersend.com/v1")?
            .set_default("email.api_key", "")?
            .set_default("email.from_address", "noreply@shopsquad.app")?
            .set_default("email.from_name", "ShopSquad")?
            .set_default("party.auto_complete", false)?
            .set_default("party.reset_token_ttl_secs", 3600)?
            .build()?;

        config.try_deserialize()
    }
}
