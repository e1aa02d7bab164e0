use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub db: Db,
    pub http: Http,
    pub jwt: Jwt,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    /// "dev" unlocks the admin reset endpoint.
    pub platform: String,
    /// Shared key the Polka webhook caller must present.
    pub polka_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Db {
    pub backend: String, // "memory" or "postgres"
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub asset_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct Jwt {
    pub secret: String,
    pub access_ttl_secs: i64,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
