use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// One undecoded quiz document and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub name: String,
    pub contents: String,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Where quiz documents are discovered. Documents come back in discovery order.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn documents(&self) -> Result<Vec<RawDocument>>;
}

/// Walks a directory tree (locale partitions are sub-directories) for `*.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn documents(&self) -> Result<Vec<RawDocument>> {
        let mut pending = vec![self.root.clone()];
        let mut files = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let name = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => documents.push(RawDocument { name, contents }),
                Err(e) => {
                    warn!(document = %name, error = ?e, "Skipping unreadable quiz document");
                }
            }
        }
        Ok(documents)
    }
}

/// Documents bundled in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Vec<RawDocument>,
}

impl StaticSource {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self { documents }
    }

    pub fn from_json(documents: Vec<(&str, serde_json::Value)>) -> Self {
        Self::new(
            documents
                .into_iter()
                .map(|(name, value)| RawDocument::new(name, value.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn documents(&self) -> Result<Vec<RawDocument>> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_source_walks_locale_partitions_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::create_dir_all(dir.path().join("ar")).unwrap();
        std::fs::write(dir.path().join("en").join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("en").join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("ar").join("c.json"), "{}").unwrap();
        std::fs::write(dir.path().join("en").join("notes.txt"), "skip").unwrap();

        let docs = DirectorySource::new(dir.path()).documents().await.unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.replace('\\', "/")).collect();
        assert_eq!(names, vec!["ar/c.json", "en/a.json", "en/b.json"]);
    }

    #[tokio::test]
    async fn unreadable_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("en")).unwrap();
        std::fs::write(dir.path().join("en").join("a.json"), "{\"id\": \"ok\"}").unwrap();
        std::fs::write(dir.path().join("en").join("zz.json"), [0xff, 0xfe, 0x00]).unwrap();

        let docs = DirectorySource::new(dir.path()).documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name.replace('\\', "/"), "en/a.json");
        assert_eq!(docs[0].contents, "{\"id\": \"ok\"}");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let source = DirectorySource::new("/definitely/not/here");
        assert!(source.documents().await.is_err());
    }
}
