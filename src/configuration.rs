use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

/// JWT authentication settings
///
/// Access and refresh tokens are signed with separate secrets so a leaked
/// access secret cannot be used to forge refresh tokens.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,  // seconds (900 = 15 minutes)
    pub refresh_token_expiry: i64, // seconds (604800 = 7 days)
    /// When true, each successful refresh revokes the presented refresh
    /// token and issues a new one. When false, the presented token stays
    /// valid and is returned unchanged.
    pub rotate_refresh: bool,
}

/// Load settings from an optional `configuration` file with `APP_*`
/// environment overrides (e.g. `APP_JWT__ACCESS_SECRET`).
///
/// Defaults allow the service to boot with no configuration present;
/// production deployments must override both secrets.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.port", 3000)?
        .set_default("jwt.access_secret", "access-secret")?
        .set_default("jwt.refresh_secret", "refresh-secret")?
        .set_default("jwt.access_token_expiry", 900)?
        .set_default("jwt.refresh_token_expiry", 604800)?
        .set_default("jwt.rotate_refresh", false)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}
