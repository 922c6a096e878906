use crate::models::quiz::{Locale, Quiz};
use crate::services::loader_service::QuizLoader;
use crate::services::shuffle_service::shuffle_quiz;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, error};

struct CacheEntry {
    locale: Locale,
    quizzes: Arc<[Quiz]>,
}

/// Loaded-and-shuffled quiz set for one locale at a time.
///
/// Reads for the locale the set was built for return the same `Arc`; any
/// other locale triggers a rebuild. The lock is never held across a rebuild,
/// so concurrent rebuilds race and the last writer wins; a stale entry is
/// caught by the locale check on the next read.
pub struct QuizCache {
    loader: QuizLoader,
    shuffle: bool,
    seeded_rng: Option<Mutex<StdRng>>,
    entry: RwLock<Option<CacheEntry>>,
}

impl QuizCache {
    pub fn new(loader: QuizLoader, shuffle: bool) -> Self {
        Self {
            loader,
            shuffle,
            seeded_rng: None,
            entry: RwLock::new(None),
        }
    }

    /// Reproducible shuffles, for tests and replays.
    pub fn with_seed(loader: QuizLoader, seed: u64) -> Self {
        Self {
            loader,
            shuffle: true,
            seeded_rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
            entry: RwLock::new(None),
        }
    }

    pub async fn get(&self, locale: Locale) -> Arc<[Quiz]> {
        if let Some(entry) = self.entry.read().await.as_ref() {
            if entry.locale == locale {
                return entry.quizzes.clone();
            }
        }

        let quizzes = match self.loader.load_locale(locale).await {
            Ok(quizzes) => quizzes,
            Err(e) => {
                error!(%locale, error = ?e, "Error loading quizzes");
                return Arc::from(Vec::new());
            }
        };
        let quizzes: Arc<[Quiz]> = Arc::from(self.shuffle_all(quizzes));

        *self.entry.write().await = Some(CacheEntry {
            locale,
            quizzes: quizzes.clone(),
        });
        debug!(%locale, count = quizzes.len(), "Quiz cache filled");
        quizzes
    }

    /// Drops the cached set; the next read rebuilds.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
        debug!("Quiz cache cleared");
    }

    pub async fn invalidate_for_locale(&self, locale: Locale) {
        *self.entry.write().await = None;
        debug!(%locale, "Quiz cache cleared after locale change");
    }

    pub async fn cached_locale(&self) -> Option<Locale> {
        self.entry.read().await.as_ref().map(|e| e.locale)
    }

    fn shuffle_all(&self, quizzes: Vec<Quiz>) -> Vec<Quiz> {
        if !self.shuffle {
            return quizzes;
        }
        match &self.seeded_rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                quizzes.iter().map(|q| shuffle_quiz(q, &mut *rng)).collect()
            }
            None => {
                let mut rng = rand::thread_rng();
                quizzes.iter().map(|q| shuffle_quiz(q, &mut rng)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::document_source::StaticSource;
    use crate::utils::option_id::OptionIdStrategy;
    use serde_json::json;

    fn loader() -> QuizLoader {
        let doc = |id: &str, language: &str| {
            json!({
                "id": id,
                "language": language,
                "title": "Letters",
                "description": "Pick a letter",
                "questions": [{
                    "id": 1,
                    "question": "Which?",
                    "options": ["a", "b", "c", "d", "e", "f", "g", "h"],
                    "correctAnswers": [0]
                }]
            })
        };
        QuizLoader::new(
            Arc::new(StaticSource::from_json(vec![
                ("en.json", doc("en-quiz", "en")),
                ("ar.json", doc("ar-quiz", "ar")),
            ])),
            OptionIdStrategy::Positional,
        )
    }

    #[tokio::test]
    async fn consecutive_reads_share_the_same_set() {
        let cache = QuizCache::new(loader(), true);
        let first = cache.get(Locale::En).await;
        let second = cache.get(Locale::En).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.cached_locale().await, Some(Locale::En));
    }

    #[tokio::test]
    async fn locale_change_rebuilds() {
        let cache = QuizCache::new(loader(), true);
        let en = cache.get(Locale::En).await;
        let ar = cache.get(Locale::Ar).await;
        assert!(!Arc::ptr_eq(&en, &ar));
        assert_eq!(ar[0].id, "ar-quiz");

        let en_again = cache.get(Locale::En).await;
        assert!(!Arc::ptr_eq(&en, &en_again));
        assert_eq!(en_again[0].id, "en-quiz");
    }

    #[tokio::test]
    async fn invalidation_forces_a_rebuild() {
        let cache = QuizCache::new(loader(), true);
        let before = cache.get(Locale::En).await;
        cache.invalidate().await;
        assert_eq!(cache.cached_locale().await, None);
        let after = cache.get(Locale::En).await;
        assert!(!Arc::ptr_eq(&before, &after));

        cache.invalidate_for_locale(Locale::Ar).await;
        assert_eq!(cache.cached_locale().await, None);
    }

    #[tokio::test]
    async fn same_seed_same_presentation() {
        let a = QuizCache::with_seed(loader(), 11).get(Locale::En).await;
        let b = QuizCache::with_seed(loader(), 11).get(Locale::En).await;
        assert_eq!(a[0].questions[0].options, b[0].questions[0].options);
    }

    #[tokio::test]
    async fn shuffling_can_be_disabled() {
        let quizzes = QuizCache::new(loader(), false).get(Locale::En).await;
        let ids: Vec<_> = quizzes[0].questions[0]
            .options
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1-0", "1-1", "1-2", "1-3", "1-4", "1-5", "1-6", "1-7"]);
    }
}
