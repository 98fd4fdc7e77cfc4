//! Named prompt templates, loaded from disk once and cached for the life
//! of the process.
//!
//! Templates are plain text files (`<name>.md`) in a directory chosen at
//! startup. Substitution is literal marker replacement; each marker occurs
//! at most once per template, so no templating engine is involved.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::pipeline::profile::Profile;
use crate::pipeline::PipelineError;

/// Logical name of the CV extraction template.
pub const EXTRACTION_TEMPLATE: &str = "extraction";
/// Logical name of the radar scoring template.
pub const SCORING_TEMPLATE: &str = "scoring";

/// Marker replaced with the (truncated) CV text.
pub const CV_TEXT_MARKER: &str = "{{cv_text}}";
/// Marker replaced with the profile serialized as pretty JSON.
pub const PROFILE_JSON_MARKER: &str = "{{profile_json}}";

/// Prompt template store with a lazy, read-mostly cache.
///
/// Constructed once at startup and handed to the pipeline; never ambient
/// global state. Template content is immutable text, so a race between two
/// first loads of the same name is benign: the first writer wins and the
/// loser's read is discarded.
pub struct PromptStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Loads a template by logical name, reading `<dir>/<name>.md` on first
    /// use and serving cached text afterwards.
    pub async fn load(&self, name: &str) -> Result<Arc<str>, PipelineError> {
        if let Some(cached) = self.cache.read().await.get(name) {
            return Ok(Arc::clone(cached));
        }

        let path = self.dir.join(format!("{name}.md"));
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            error!("Failed to load prompt {}: {}", path.display(), e);
            PipelineError::TemplateLoad(name.to_string())
        })?;

        let mut cache = self.cache.write().await;
        let entry = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::from(content));
        Ok(Arc::clone(entry))
    }

    /// Renders the extraction template for a piece of CV text. The caller
    /// bounds the text length before substitution.
    pub async fn extraction_prompt(&self, cv_text: &str) -> Result<String, PipelineError> {
        let template = self.load(EXTRACTION_TEMPLATE).await?;
        Ok(template.replace(CV_TEXT_MARKER, cv_text))
    }

    /// Renders the scoring template for a profile, serialized as pretty
    /// JSON so the model sees one field per line.
    pub async fn scoring_prompt(&self, profile: &Profile) -> Result<String, PipelineError> {
        let template = self.load(SCORING_TEMPLATE).await?;
        let profile_json =
            serde_json::to_string_pretty(profile).map_err(PipelineError::ProfileSerialize)?;
        Ok(template.replace(PROFILE_JSON_MARKER, &profile_json))
    }

    /// Drops all cached templates so the next load re-reads from disk.
    /// Development convenience for editing templates in place.
    #[allow(dead_code)]
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        info!("Prompt cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_store(templates: &[(&str, &str)]) -> (TempDir, PromptStore) {
        let dir = TempDir::new().unwrap();
        for (name, content) in templates {
            fs::write(dir.path().join(format!("{name}.md")), content).unwrap();
        }
        let store = PromptStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_reads_template_from_disk() {
        let (_dir, store) = make_store(&[("extraction", "Extract from: {{cv_text}}")]);
        let template = store.load("extraction").await.unwrap();
        assert_eq!(&*template, "Extract from: {{cv_text}}");
    }

    #[tokio::test]
    async fn test_missing_template_fails_with_name() {
        let (_dir, store) = make_store(&[]);
        let err = store.load("extraction").await.unwrap_err();
        match err {
            PipelineError::TemplateLoad(name) => assert_eq!(name, "extraction"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cache_survives_file_deletion() {
        let (dir, store) = make_store(&[("scoring", "Score: {{profile_json}}")]);
        store.load("scoring").await.unwrap();

        fs::remove_file(dir.path().join("scoring.md")).unwrap();
        // Second load is served from the cache, not the filesystem
        let template = store.load("scoring").await.unwrap();
        assert_eq!(&*template, "Score: {{profile_json}}");
    }

    #[tokio::test]
    async fn test_clear_cache_forces_reload() {
        let (dir, store) = make_store(&[("extraction", "v1: {{cv_text}}")]);
        store.load("extraction").await.unwrap();

        fs::write(dir.path().join("extraction.md"), "v2: {{cv_text}}").unwrap();
        store.clear_cache().await;

        let template = store.load("extraction").await.unwrap();
        assert_eq!(&*template, "v2: {{cv_text}}");
    }

    #[tokio::test]
    async fn test_extraction_prompt_substitutes_cv_text() {
        let (_dir, store) =
            make_store(&[("extraction", "CV:\n{{cv_text}}\nReturn JSON.")]);
        let prompt = store
            .extraction_prompt("5 years experience, Python, AWS")
            .await
            .unwrap();
        assert_eq!(prompt, "CV:\n5 years experience, Python, AWS\nReturn JSON.");
    }

    #[tokio::test]
    async fn test_scoring_prompt_embeds_pretty_profile_json() {
        let (_dir, store) = make_store(&[("scoring", "Profile:\n{{profile_json}}")]);
        let profile = Profile::default();
        let prompt = store.scoring_prompt(&profile).await.unwrap();
        assert!(prompt.starts_with("Profile:\n{"));
        assert!(prompt.contains("\"yearsOfExperience\": 0"));
    }

    #[tokio::test]
    async fn test_cv_text_with_braces_substitutes_literally() {
        let (_dir, store) = make_store(&[("extraction", "{{cv_text}}")]);
        let prompt = store.extraction_prompt("code: {x: 1}").await.unwrap();
        assert_eq!(prompt, "code: {x: 1}");
    }
}
