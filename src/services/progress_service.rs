use crate::error::Result;
use crate::models::progress::QuizProgress;
use crate::services::storage_service::StorageService;
use crate::utils::time::now;
use tracing::warn;

pub const PROGRESS_KEY_PREFIX: &str = "quiz_progress_";

pub fn progress_key(quiz_id: &str) -> String {
    format!("{}{}", PROGRESS_KEY_PREFIX, quiz_id)
}

#[derive(Clone)]
pub struct ProgressService {
    storage: StorageService,
}

impl ProgressService {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Persists the snapshot under its own quiz id, stamping `saved_at`.
    pub fn save(&self, progress: &mut QuizProgress) -> Result<()> {
        progress.saved_at = now();
        self.storage
            .save_json(&progress_key(&progress.quiz_id), progress)
    }

    /// Snapshot for `quiz_id`. Corrupt or foreign snapshots read as absent.
    pub fn load(&self, quiz_id: &str) -> Option<QuizProgress> {
        let progress: QuizProgress = self.storage.load_json(&progress_key(quiz_id))?;
        if progress.quiz_id != quiz_id {
            warn!(
                quiz_id,
                stored_quiz_id = %progress.quiz_id,
                "Discarding progress snapshot that belongs to another quiz"
            );
            return None;
        }
        Some(progress)
    }

    pub fn has_progress(&self, quiz_id: &str) -> bool {
        self.load(quiz_id).is_some()
    }

    pub fn clear(&self, quiz_id: &str) -> Result<()> {
        self.storage.remove(&progress_key(quiz_id))
    }
}
