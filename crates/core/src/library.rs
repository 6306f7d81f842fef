//! Prompt library: the record lifecycle
//!
//! Every mutation goes through one lock around the repository. Metadata
//! generation happens outside that lock: the record is flagged
//! `isGeneratingDetails`, title and tags are requested concurrently, and the
//! results land in a single state transition. Each generation gets a
//! per-record sequence number so that a result overtaken by a newer edit is
//! dropped instead of clobbering newer state.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::config::{Limits, PadConfig, ViewLabels};
use crate::db::record::{normalize_record, now_millis, PromptRecord};
use crate::db::{self, PromptRepository};
use crate::errors::{PadError, Result};
use crate::metadata::{generate_tags, generate_title, normalize_tags, MetadataGenerator, UNTITLED_PROMPT};
use crate::view::{self, SortConfig};

static LIBRARY: OnceLock<PromptLibrary> = OnceLock::new();

/// Install the process-wide library
///
/// The first call wins. Returns `false` if a library was already installed.
pub fn install(library: PromptLibrary) -> bool {
    LIBRARY.set(library).is_ok()
}

/// The process-wide library installed by `setup`
pub fn global() -> Result<&'static PromptLibrary> {
    LIBRARY.get().ok_or(PadError::NotInitialized)
}

/// Requested change to an existing prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptEdit {
    pub text:  String,
    /// `Some` when the user touched the title field
    pub title: Option<String>,
}

impl PromptEdit {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

struct LibraryState {
    repo:            Box<dyn PromptRepository>,
    /// Current generation sequence number per record id
    generations:     HashMap<String, u64>,
    next_generation: u64,
}

impl LibraryState {
    fn begin_generation(&mut self, id: &str) -> u64 {
        self.next_generation += 1;
        self.generations.insert(id.to_string(), self.next_generation);
        self.next_generation
    }

    /// True (and forgets the token) if `token` is still the newest for `id`
    fn finish_generation(&mut self, id: &str, token: u64) -> bool {
        match self.generations.get(id) {
            Some(&current) if current == token => {
                self.generations.remove(id);
                true
            },
            _ => false,
        }
    }

    fn require(&self, id: &str) -> Result<PromptRecord> {
        self.repo
            .get(id)?
            .ok_or_else(|| PadError::NotFound(id.to_string()))
    }
}

enum EditOutcome {
    Unchanged(PromptRecord),
    Saved(PromptRecord),
    Regenerate { text: String, token: u64 },
}

pub struct PromptLibrary {
    state:        Mutex<LibraryState>,
    generator:    Arc<dyn MetadataGenerator>,
    labels:       ViewLabels,
    limits:       Limits,
    default_sort: SortConfig,
}

impl PromptLibrary {
    pub fn new(
        repo: Box<dyn PromptRepository>,
        generator: Arc<dyn MetadataGenerator>,
        config: &PadConfig,
    ) -> Self {
        Self {
            state: Mutex::new(LibraryState {
                repo,
                generations: HashMap::new(),
                next_generation: 0,
            }),
            generator,
            labels: config.labels.clone(),
            limits: config.limits.clone(),
            default_sort: config.default_sort,
        }
    }

    /// Open the configured storage and build a library on top of it
    pub fn open(config: &PadConfig, generator: Arc<dyn MetadataGenerator>) -> Result<Self> {
        config.validate()?;
        let repo = db::open(&config.storage, config.limits.history_limit)?;
        Ok(Self::new(repo, generator, config))
    }

    pub fn labels(&self) -> &ViewLabels {
        &self.labels
    }

    pub fn default_sort(&self) -> SortConfig {
        self.default_sort
    }

    fn lock(&self) -> Result<MutexGuard<'_, LibraryState>> {
        self.state
            .lock()
            .map_err(|_| PadError::Other("prompt library lock poisoned".to_string()))
    }

    /// Trimmed text, or a validation error
    fn validate_text(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PadError::ValidationError("Cannot save an empty prompt.".to_string()));
        }
        if text.chars().count() > self.limits.max_text_length {
            return Err(PadError::ValidationError(format!(
                "Prompt text exceeds the maximum length of {} characters.",
                self.limits.max_text_length
            )));
        }
        Ok(text.to_string())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All records in storage order
    pub fn list(&self) -> Result<Vec<PromptRecord>> {
        self.lock()?.repo.list()
    }

    pub fn get(&self, id: &str) -> Result<PromptRecord> {
        self.lock()?.require(id)
    }

    /// Filtered and ordered records for display
    ///
    /// `sort` falls back to the configured default.
    pub fn view(&self, sort: Option<SortConfig>, filter: Option<&str>) -> Result<Vec<PromptRecord>> {
        let records = self.list()?;
        let arranged = view::arrange(
            &records,
            sort.unwrap_or(self.default_sort),
            filter,
            &self.labels.untitled,
            &self.labels.favorites,
        );
        Ok(arranged.into_iter().cloned().collect())
    }

    /// Sorted, de-duplicated tags across the collection
    pub fn all_tags(&self) -> Result<Vec<String>> {
        let records = self.list()?;
        let tags: BTreeSet<String> = records.into_iter().flat_map(|r| r.tags).collect();
        Ok(tags.into_iter().collect())
    }

    /// Tags starting with `prefix` (case-insensitive)
    pub fn tags_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim().to_lowercase();
        Ok(self
            .all_tags()?
            .into_iter()
            .filter(|tag| tag.starts_with(&prefix))
            .collect())
    }

    // ========================================================================
    // Generation-backed actions
    // ========================================================================

    /// Save a new prompt and fill in its title and tags
    pub async fn create(&self, text: &str) -> Result<PromptRecord> {
        let text = self.validate_text(text)?;

        let mut record = PromptRecord::new(text.clone(), "", now_millis());
        record.is_generating_details = true;
        let record = normalize_record(record, self.limits.history_limit);
        let id = record.id.clone();

        let token = {
            let mut state = self.lock()?;
            state.repo.upsert(record)?;
            state.begin_generation(&id)
        };
        tracing::info!(%id, "prompt created");

        self.generate_details(&id, &text, token).await
    }

    /// Apply an edit; changed text re-runs generation
    ///
    /// A title that differs from the current one pins it (`customTitle`).
    /// An edit that changes nothing returns the record untouched.
    pub async fn edit(&self, id: &str, edit: PromptEdit) -> Result<PromptRecord> {
        let text = self.validate_text(&edit.text)?;
        let title = match edit.title {
            Some(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(PadError::ValidationError(
                        "Prompt title cannot be empty.".to_string(),
                    ));
                }
                Some(title.to_string())
            },
            None => None,
        };

        let outcome = {
            let mut state = self.lock()?;
            let mut record = state.require(id)?;
            let mut changed = false;

            if let Some(title) = title {
                if title != record.title {
                    record.title = title;
                    record.custom_title = true;
                    changed = true;
                }
            }

            let text_changed = text != record.text;
            if text_changed {
                record.push_history(now_millis(), self.limits.history_limit);
                record.text = text.clone();
                record.is_generating_details = true;
                changed = true;
            }

            if !changed {
                EditOutcome::Unchanged(record)
            } else {
                state.repo.upsert(record.clone())?;
                if text_changed {
                    EditOutcome::Regenerate {
                        text,
                        token: state.begin_generation(id),
                    }
                } else {
                    EditOutcome::Saved(record)
                }
            }
        };

        match outcome {
            EditOutcome::Unchanged(record) => {
                tracing::debug!(%id, "edit changed nothing");
                Ok(record)
            },
            EditOutcome::Saved(record) => {
                tracing::info!(%id, "prompt title updated");
                Ok(record)
            },
            EditOutcome::Regenerate { text, token } => {
                tracing::info!(%id, "prompt text updated");
                self.generate_details(id, &text, token).await
            },
        }
    }

    /// Drop a pinned title and generate title and tags afresh
    pub async fn regenerate(&self, id: &str) -> Result<PromptRecord> {
        let (text, token) = {
            let mut state = self.lock()?;
            let mut record = state.require(id)?;
            record.custom_title = false;
            record.is_generating_details = true;
            let text = record.text.clone();
            state.repo.upsert(record)?;
            (text, state.begin_generation(id))
        };

        self.generate_details(id, &text, token).await
    }

    async fn generate_details(&self, id: &str, text: &str, token: u64) -> Result<PromptRecord> {
        let generator = self.generator.as_ref();
        let (title, tags) = tokio::join!(generate_title(generator, text), generate_tags(generator, text));

        let mut state = self.lock()?;
        if !state.finish_generation(id, token) {
            tracing::debug!(%id, token, "discarding stale generation result");
            return state.require(id);
        }

        let mut record = state.require(id)?;
        match title {
            Ok(title) if !record.custom_title => record.title = title,
            Ok(_) => {},
            Err(err) => {
                tracing::warn!(%id, error = %err, "title generation failed, keeping previous title");
                if record.title.is_empty() {
                    record.title = UNTITLED_PROMPT.to_string();
                }
            },
        }
        match tags {
            Ok(tags) => record.tags = tags,
            Err(err) => {
                tracing::warn!(%id, error = %err, "tag generation failed, clearing tags");
                record.tags = Vec::new();
            },
        }
        record.is_generating_details = false;

        state.repo.upsert(record.clone())?;
        tracing::debug!(%id, title = %record.title, tags = record.tags.len(), "details applied");
        Ok(record)
    }

    // ========================================================================
    // Plain mutations
    // ========================================================================

    fn update<F>(&self, id: &str, mutate: F) -> Result<PromptRecord>
    where
        F: FnOnce(&mut PromptRecord) -> Result<()>,
    {
        let mut state = self.lock()?;
        let mut record = state.require(id)?;
        mutate(&mut record)?;
        state.repo.upsert(record.clone())?;
        Ok(record)
    }

    pub fn toggle_favorite(&self, id: &str) -> Result<PromptRecord> {
        self.update(id, |record| {
            record.is_favorite = !record.is_favorite;
            Ok(())
        })
    }

    /// Count a copy of the prompt text
    pub fn record_use(&self, id: &str) -> Result<PromptRecord> {
        self.update(id, |record| {
            record.use_count = record.use_count.saturating_add(1);
            record.last_copied_at = Some(now_millis());
            Ok(())
        })
    }

    pub fn duplicate(&self, id: &str) -> Result<PromptRecord> {
        let mut state = self.lock()?;
        let copy = state.require(id)?.duplicate(now_millis());
        state.repo.upsert(copy.clone())?;
        tracing::info!(source = %id, id = %copy.id, "prompt duplicated");
        Ok(copy)
    }

    /// Remove a prompt, returning it
    pub fn delete(&self, id: &str) -> Result<PromptRecord> {
        let mut state = self.lock()?;
        let record = state.require(id)?;
        state.repo.remove(id)?;
        state.generations.remove(id);
        tracing::info!(%id, "prompt deleted");
        Ok(record)
    }

    pub fn remove_tag(&self, id: &str, tag: &str) -> Result<PromptRecord> {
        let tag = tag.trim().to_lowercase();
        self.update(id, |record| {
            record.tags.retain(|t| *t != tag);
            Ok(())
        })
    }

    /// Rename one tag on one prompt
    ///
    /// Renaming onto a tag the prompt already has just drops the old one.
    pub fn rename_tag(&self, id: &str, old: &str, new: &str) -> Result<PromptRecord> {
        let old = old.trim().to_lowercase();
        let new = new.trim().to_lowercase();
        if new.is_empty() {
            return Err(PadError::ValidationError("Tag name cannot be empty.".to_string()));
        }

        self.update(id, |record| {
            if new != old && record.has_tag(&new) {
                record.tags.retain(|t| *t != old);
            } else {
                let renamed = record
                    .tags
                    .iter()
                    .map(|t| if *t == old { new.as_str() } else { t.as_str() });
                record.tags = normalize_tags(renamed);
            }
            Ok(())
        })
    }
}
