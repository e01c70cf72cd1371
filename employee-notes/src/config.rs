use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Sqlite,
    Rest,
    Memory,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    // backend
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    #[serde(default = "default_topics_url")]
    pub topics_url: String,

    // notes feed
    #[serde(default = "default_true")]
    pub demo_notes: bool,
    #[serde(default)]
    pub random_missing_stats: bool,
    #[serde(default)]
    pub seed_fixtures: bool,

    #[serde(default)]
    pub log_json: bool,

    // build
    pub app_version: Option<String>,
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_port() -> u16 {
    4000
}

fn default_backend() -> BackendKind {
    BackendKind::Sqlite
}

fn default_database_url() -> String {
    "sqlite.db".into()
}

fn default_topics_url() -> String {
    "http://127.0.0.1:3000/api/topics".into()
}

fn default_true() -> bool {
    true
}

fn default_local() -> String {
    "local".into()
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>().unwrap_or_else(|err| panic!("invalid environment configuration: {err}"))
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[cfg(test)]
pub fn config_override<F>(override_config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| override_config(Config::from_env()))
}
