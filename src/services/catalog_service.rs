use crate::dto::catalog_dto::{CategoryCount, DifficultyCount, QuizStats};
use crate::models::quiz::{Quiz, QuizMetadata};
use crate::services::cache_service::QuizCache;
use crate::services::locale_service::LocaleService;
use std::sync::Arc;

/// Listing and lookup over the quizzes of the active locale.
#[derive(Clone)]
pub struct CatalogService {
    cache: Arc<QuizCache>,
    locale: LocaleService,
}

impl CatalogService {
    pub fn new(cache: Arc<QuizCache>, locale: LocaleService) -> Self {
        Self { cache, locale }
    }

    async fn quizzes(&self) -> Arc<[Quiz]> {
        self.cache.get(self.locale.current()).await
    }

    pub async fn metadata(&self) -> Vec<QuizMetadata> {
        self.quizzes().await.iter().map(QuizMetadata::from).collect()
    }

    pub async fn quiz_by_id(&self, quiz_id: &str) -> Option<Quiz> {
        self.quizzes()
            .await
            .iter()
            .find(|q| q.id == quiz_id)
            .cloned()
    }

    pub async fn by_category(&self, category: &str) -> Vec<QuizMetadata> {
        let wanted = category.to_lowercase();
        self.metadata()
            .await
            .into_iter()
            .filter(|q| q.categories.iter().any(|c| c.to_lowercase() == wanted))
            .collect()
    }

    pub async fn by_difficulty(&self, difficulty: &str) -> Vec<QuizMetadata> {
        let wanted = difficulty.to_lowercase();
        self.metadata()
            .await
            .into_iter()
            .filter(|q| q.difficulty.to_lowercase() == wanted)
            .collect()
    }

    /// Case-insensitive substring match over title, description and categories.
    pub async fn search(&self, query: &str) -> Vec<QuizMetadata> {
        let needle = query.to_lowercase();
        self.metadata()
            .await
            .into_iter()
            .filter(|q| {
                q.title.to_lowercase().contains(&needle)
                    || q.description.to_lowercase().contains(&needle)
                    || q.categories.iter().any(|c| c.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub async fn available_categories(&self) -> Vec<String> {
        let metadata = self.metadata().await;
        first_seen(metadata.iter().flat_map(|q| q.categories.iter().cloned()))
    }

    pub async fn available_difficulties(&self) -> Vec<String> {
        let metadata = self.metadata().await;
        first_seen(metadata.iter().map(|q| q.difficulty.clone()))
    }

    pub async fn stats(&self) -> QuizStats {
        let metadata = self.metadata().await;
        if metadata.is_empty() {
            return QuizStats::default();
        }

        let total_questions = metadata.iter().map(|q| q.question_count).sum();
        let minutes: u32 = metadata.iter().map(|q| q.estimated_time).sum();
        let average_time = (f64::from(minutes) / metadata.len() as f64).round() as u32;

        let categories = counted(metadata.iter().flat_map(|q| q.categories.iter().cloned()))
            .into_iter()
            .map(|(name, count)| CategoryCount { name, count })
            .collect();
        let difficulties = counted(metadata.iter().map(|q| q.difficulty.clone()))
            .into_iter()
            .map(|(level, count)| DifficultyCount { level, count })
            .collect();

        QuizStats {
            total_quizzes: metadata.len(),
            total_questions,
            average_time,
            categories,
            difficulties,
        }
    }
}

pub fn difficulty_color(difficulty: &str) -> &'static str {
    match difficulty.to_lowercase().as_str() {
        "beginner" => "success",
        "intermediate" => "warning",
        "advanced" => "error",
        _ => "primary",
    }
}

fn first_seen(values: impl Iterator<Item = String>) -> Vec<String> {
    counted(values).into_iter().map(|(value, _)| value).collect()
}

fn counted(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::document_source::StaticSource;
    use crate::services::loader_service::QuizLoader;
    use crate::services::storage_service::StorageService;
    use crate::utils::option_id::OptionIdStrategy;
    use serde_json::json;

    fn catalog(documents: Vec<(&str, serde_json::Value)>) -> CatalogService {
        let loader = QuizLoader::new(
            Arc::new(StaticSource::from_json(documents)),
            OptionIdStrategy::Positional,
        );
        CatalogService::new(
            Arc::new(QuizCache::new(loader, false)),
            LocaleService::new(StorageService::in_memory()),
        )
    }

    #[tokio::test]
    async fn filters_fold_case_beyond_ascii() {
        let service = catalog(vec![(
            "eco.json",
            json!({
                "id": "eco",
                "title": "Économie",
                "description": "Bases",
                "categories": ["Économie"],
                "difficulty": "Débutant",
                "questions": [{"question": "Q", "options": ["a"], "correctAnswers": [0]}]
            }),
        )]);

        assert_eq!(service.by_category("ÉCONOMIE").await.len(), 1);
        assert_eq!(service.by_difficulty("DÉBUTANT").await.len(), 1);
        assert_eq!(service.search("économie").await.len(), 1);
        assert!(service.by_category("economie").await.is_empty());
    }

    #[test]
    fn difficulty_colors() {
        assert_eq!(difficulty_color("Beginner"), "success");
        assert_eq!(difficulty_color("intermediate"), "warning");
        assert_eq!(difficulty_color("ADVANCED"), "error");
        assert_eq!(difficulty_color("general"), "primary");
    }

    #[test]
    fn counted_keeps_first_seen_order() {
        let values = ["b", "a", "b", "c", "a", "b"].iter().map(|s| s.to_string());
        assert_eq!(
            counted(values),
            vec![("b".to_string(), 3), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }
}
