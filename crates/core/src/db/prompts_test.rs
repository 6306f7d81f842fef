#[cfg(test)]
mod tests {
    use crate::config::StorageConfig;
    use crate::db::prompts::SqliteRepository;
    use crate::db::record::{PromptRecord, DEFAULT_HISTORY_LIMIT};
    use crate::db::{open, PromptRepository};
    use crate::errors::Result;
    use tempfile::tempdir;

    fn crud_operations(repo: &mut dyn PromptRepository) -> Result<()> {
        // 1. Create
        let mut prompt = PromptRecord::new("Test Content", "Test Title", 1_000);
        prompt.tags = vec!["tag1".into(), "tag2".into()];
        repo.upsert(prompt.clone())?;

        let loaded = repo.get(&prompt.id)?.expect("created prompt");
        assert_eq!(loaded.title, "Test Title");
        assert_eq!(loaded.tags, vec!["tag1", "tag2"]);
        assert_eq!(loaded.use_count, 0);

        // 2. List
        let prompts = repo.list()?;
        assert!(!prompts.is_empty());
        assert_eq!(prompts[0].id, prompt.id);

        // 3. Update
        let mut updated = loaded.clone();
        updated.title = "Updated Title".into();
        updated.push_history(2_000, DEFAULT_HISTORY_LIMIT);
        updated.text = "Updated Content".into();
        repo.upsert(updated)?;

        let prompts = repo.list()?;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].title, "Updated Title");
        assert_eq!(prompts[0].text, "Updated Content");
        assert_eq!(prompts[0].history[0].text, "Test Content");

        // 4. Usage
        let mut used = repo.get(&prompt.id)?.expect("updated prompt");
        used.use_count += 1;
        used.last_copied_at = Some(3_000);
        repo.upsert(used)?;
        let prompts = repo.list()?;
        assert_eq!(prompts[0].use_count, 1);
        assert_eq!(prompts[0].last_copied_at, Some(3_000));

        // 5. Delete
        assert!(repo.remove(&prompt.id)?);
        let prompts = repo.list()?;
        assert!(prompts.iter().all(|p| p.id != prompt.id));
        assert_eq!(repo.count()?, 0);

        Ok(())
    }

    #[test]
    fn test_crud_operations_sqlite() -> Result<()> {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test_prompts.db");

        let mut repo = SqliteRepository::open(&db_path, DEFAULT_HISTORY_LIMIT)?;
        crud_operations(&mut repo)
    }

    #[test]
    fn test_crud_operations_file() -> Result<()> {
        let dir = tempdir().unwrap();
        let storage = StorageConfig::File {
            dir: dir.path().join("store"),
        };

        let mut repo = open(&storage, DEFAULT_HISTORY_LIMIT)?;
        crud_operations(repo.as_mut())
    }

    #[test]
    fn test_crud_operations_memory() -> Result<()> {
        let mut repo = open(&StorageConfig::Memory, DEFAULT_HISTORY_LIMIT)?;
        crud_operations(repo.as_mut())
    }

    #[test]
    fn test_file_backend_survives_reopen() -> Result<()> {
        let dir = tempdir().unwrap();
        let storage = StorageConfig::File {
            dir: dir.path().to_path_buf(),
        };

        let record = PromptRecord::new("persist me", "Persisted", 10);
        {
            let mut repo = open(&storage, DEFAULT_HISTORY_LIMIT)?;
            repo.upsert(record.clone())?;
        }

        let repo = open(&storage, DEFAULT_HISTORY_LIMIT)?;
        assert_eq!(repo.get(&record.id)?, Some(record));
        Ok(())
    }

    #[test]
    fn test_sqlite_backend_survives_reopen() -> Result<()> {
        let dir = tempdir().unwrap();
        let storage = StorageConfig::Sqlite {
            path: dir.path().join("prompts.db"),
        };

        let mut record = PromptRecord::new("persist me", "Persisted", 10);
        record.tags = vec!["keep".into()];
        record.is_favorite = true;
        {
            let mut repo = open(&storage, DEFAULT_HISTORY_LIMIT)?;
            repo.upsert(record.clone())?;
        }

        let repo = open(&storage, DEFAULT_HISTORY_LIMIT)?;
        assert_eq!(repo.get(&record.id)?, Some(record));
        Ok(())
    }
}
