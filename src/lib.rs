pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::models::quiz::Locale;
use crate::services::{
    cache_service::QuizCache,
    catalog_service::CatalogService,
    document_source::{DirectorySource, DocumentSource},
    loader_service::QuizLoader,
    locale_service::LocaleService,
    progress_service::ProgressService,
    storage_service::{FileStore, KeyValueStore, MemoryStore, StorageService},
    timer_service::SessionTimer,
    validation_service::ValidationService,
};
use crate::utils::time::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Session context: built once at startup and handed to every consumer.
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageService,
    pub locale_service: LocaleService,
    pub quiz_cache: Arc<QuizCache>,
    pub catalog_service: CatalogService,
    pub validation_service: ValidationService,
    pub progress_service: ProgressService,
    timer_tick: Duration,
}

impl AppState {
    pub fn new(config: &Config, source: Arc<dyn DocumentSource>, store: Arc<dyn KeyValueStore>) -> Self {
        let storage = StorageService::new(store, config.obfuscate_storage);
        let loader = QuizLoader::new(source, config.option_ids);
        let quiz_cache = Arc::new(QuizCache::new(loader, config.shuffle_options));
        Self::assemble(config, storage, quiz_cache)
    }

    /// Same as [`AppState::new`] but with a caller-built cache.
    pub fn with_cache(config: &Config, store: Arc<dyn KeyValueStore>, quiz_cache: Arc<QuizCache>) -> Self {
        let storage = StorageService::new(store, config.obfuscate_storage);
        Self::assemble(config, storage, quiz_cache)
    }

    /// Documents from `config.documents_dir`; storage in a file when
    /// `config.storage_path` is set, in memory otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Arc<dyn DocumentSource> = Arc::new(DirectorySource::new(&config.documents_dir));
        let store: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => {
                let store = FileStore::open(path)?;
                info!(path = %store.path().display(), "Using file-backed storage");
                Arc::new(store)
            }
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(config, source, store))
    }

    fn assemble(config: &Config, storage: StorageService, quiz_cache: Arc<QuizCache>) -> Self {
        let locale_service = LocaleService::new(storage.clone());
        Self {
            catalog_service: CatalogService::new(quiz_cache.clone(), locale_service.clone()),
            validation_service: ValidationService::new(quiz_cache.clone(), locale_service.clone()),
            progress_service: ProgressService::new(storage.clone()),
            locale_service,
            quiz_cache,
            storage,
            timer_tick: Duration::from_millis(config.timer_tick_ms),
        }
    }

    pub fn current_locale(&self) -> Locale {
        self.locale_service.current()
    }

    /// Persists the locale and drops the cached set when it actually changed.
    pub async fn set_locale(&self, locale: Locale) -> Result<()> {
        let previous = self.locale_service.current();
        self.locale_service.set(locale)?;
        if previous != locale {
            self.quiz_cache.invalidate_for_locale(locale).await;
        }
        Ok(())
    }

    /// A fresh, idle timer for one quiz. Nothing is read until
    /// `resume_if_persisted` is called on it.
    pub fn timer(&self, quiz_id: &str, time_limit_secs: u32) -> SessionTimer {
        SessionTimer::create_with(
            quiz_id,
            time_limit_secs,
            self.storage.clone(),
            Arc::new(SystemClock),
            self.timer_tick,
        )
    }
}
