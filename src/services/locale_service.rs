use crate::error::Result;
use crate::models::quiz::Locale;
use crate::services::storage_service::StorageService;
use tracing::warn;

pub const LOCALE_KEY: &str = "locale";

#[derive(Clone)]
pub struct LocaleService {
    storage: StorageService,
}

impl LocaleService {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Reads the active locale, initialising it to `en` the first time.
    pub fn current(&self) -> Locale {
        match self.storage.get(LOCALE_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Stored locale unsupported, using default");
                Locale::default()
            }),
            None => {
                let locale = Locale::default();
                if let Err(e) = self.storage.save(LOCALE_KEY, locale.as_str()) {
                    warn!(kind = e.kind(), error = %e, "Could not persist default locale");
                }
                locale
            }
        }
    }

    pub fn set(&self, locale: Locale) -> Result<()> {
        self.storage.save(LOCALE_KEY, locale.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_read_initialises_english() {
        let storage = StorageService::in_memory();
        let locales = LocaleService::new(storage.clone());

        assert_eq!(locales.current(), Locale::En);
        assert_eq!(storage.get(LOCALE_KEY).as_deref(), Some("en"));
    }

    #[test]
    fn set_then_read_back() {
        let locales = LocaleService::new(StorageService::in_memory());
        locales.set(Locale::Ar).unwrap();
        assert_eq!(locales.current(), Locale::Ar);
    }

    #[test]
    fn unsupported_stored_locale_reads_as_default() {
        let storage = StorageService::in_memory();
        storage.save(LOCALE_KEY, "fr").unwrap();
        assert_eq!(LocaleService::new(storage).current(), Locale::En);
    }
}
