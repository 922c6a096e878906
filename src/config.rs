use crate::error::{Error, Result};
use crate::utils::option_id::OptionIdStrategy;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub documents_dir: PathBuf,
    pub storage_path: Option<PathBuf>,
    pub obfuscate_storage: bool,
    pub shuffle_options: bool,
    pub timer_tick_ms: u64,
    pub option_ids: OptionIdStrategy,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("quizzes"),
            storage_path: None,
            obfuscate_storage: true,
            shuffle_options: true,
            timer_tick_ms: 1000,
            option_ids: OptionIdStrategy::Positional,
            log_json: false,
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        let timer_tick_ms: u64 = get_env_parse_or("QUIZ_TIMER_TICK_MS", defaults.timer_tick_ms)?;
        if timer_tick_ms == 0 {
            return Err(Error::Config(
                "Invalid value for QUIZ_TIMER_TICK_MS: must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            documents_dir: env::var("QUIZ_DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.documents_dir),
            storage_path: env::var("QUIZ_STORAGE_PATH").ok().map(PathBuf::from),
            obfuscate_storage: get_env_parse_or("QUIZ_STORAGE_OBFUSCATE", defaults.obfuscate_storage)?,
            shuffle_options: get_env_parse_or("QUIZ_SHUFFLE_OPTIONS", defaults.shuffle_options)?,
            timer_tick_ms,
            option_ids: get_env_parse_or("QUIZ_OPTION_IDS", defaults.option_ids)?,
            log_json: get_env_parse_or("QUIZ_LOG_JSON", defaults.log_json)?,
        })
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
