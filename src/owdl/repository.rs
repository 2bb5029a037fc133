//! Workflow instance persistence
//!
//! The repository is the single writer for an instance between driver
//! invocations; a restarted process resumes from what was last written.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::instance::OwdlWorkflowInstance;

/// Errors for instance persistence
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Workflow instance {0} not found")]
    NotFound(String),

    #[error("Workflow instance {0} already exists")]
    AlreadyExists(String),

    #[error("Invalid workflow instance id '{0}'")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CRUD over workflow instances keyed by instance id
pub trait OwdlInstanceRepository: Send + Sync {
    fn create(&self, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError>;

    fn read(&self, instance_id: &str) -> Result<OwdlWorkflowInstance, RepositoryError>;

    fn update(&self, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError>;

    fn delete(&self, instance_id: &str) -> Result<(), RepositoryError>;
}

/// Process-local repository
#[derive(Debug, Default)]
pub struct InMemoryInstanceRepository {
    instances: Mutex<BTreeMap<String, OwdlWorkflowInstance>>,
}

impl InMemoryInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OwdlInstanceRepository for InMemoryInstanceRepository {
    fn create(&self, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError> {
        let mut instances = self.instances.lock().unwrap();
        if instances.contains_key(&instance.instance_id) {
            return Err(RepositoryError::AlreadyExists(instance.instance_id.clone()));
        }
        instances.insert(instance.instance_id.clone(), instance.clone());
        Ok(())
    }

    fn read(&self, instance_id: &str) -> Result<OwdlWorkflowInstance, RepositoryError> {
        self.instances
            .lock()
            .unwrap()
            .get(instance_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(instance_id.to_string()))
    }

    fn update(&self, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError> {
        let mut instances = self.instances.lock().unwrap();
        match instances.get_mut(&instance.instance_id) {
            Some(stored) => {
                *stored = instance.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(instance.instance_id.clone())),
        }
    }

    fn delete(&self, instance_id: &str) -> Result<(), RepositoryError> {
        self.instances
            .lock()
            .unwrap()
            .remove(instance_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(instance_id.to_string()))
    }
}

/// One `<instance_id>.json` file per instance under a state directory
#[derive(Debug, Clone)]
pub struct LocalInstanceRepository {
    dir: PathBuf,
}

impl LocalInstanceRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, instance_id: &str) -> Result<PathBuf, RepositoryError> {
        let valid = !instance_id.is_empty()
            && !instance_id.starts_with('.')
            && instance_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(RepositoryError::InvalidId(instance_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", instance_id)))
    }

    /// Write atomically (write-then-rename)
    fn write(&self, path: &Path, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError> {
        fs::create_dir_all(&self.dir)?;
        let json = instance.to_json()?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl OwdlInstanceRepository for LocalInstanceRepository {
    fn create(&self, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError> {
        let path = self.path_for(&instance.instance_id)?;
        if path.exists() {
            return Err(RepositoryError::AlreadyExists(instance.instance_id.clone()));
        }
        self.write(&path, instance)
    }

    fn read(&self, instance_id: &str) -> Result<OwdlWorkflowInstance, RepositoryError> {
        let path = self.path_for(instance_id)?;
        let json = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RepositoryError::NotFound(instance_id.to_string()),
            _ => RepositoryError::Io(e),
        })?;
        Ok(OwdlWorkflowInstance::from_json(&json)?)
    }

    fn update(&self, instance: &OwdlWorkflowInstance) -> Result<(), RepositoryError> {
        let path = self.path_for(&instance.instance_id)?;
        if !path.exists() {
            return Err(RepositoryError::NotFound(instance.instance_id.clone()));
        }
        self.write(&path, instance)
    }

    fn delete(&self, instance_id: &str) -> Result<(), RepositoryError> {
        let path = self.path_for(instance_id)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RepositoryError::NotFound(instance_id.to_string()),
            _ => RepositoryError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owdl_model::OwdlWorkflow;

    fn workflow() -> OwdlWorkflow {
        OwdlWorkflow::from_json(
            r#"{
                "StartsAt": "Only",
                "States": {
                    "Only": {
                        "Type": "Task",
                        "ContainerDefinition": "worker:1#main",
                        "PackageName": "pkg",
                        "CmdArgsList": ["--a"],
                        "End": true
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_in_memory_crud() {
        let repo = InMemoryInstanceRepository::new();
        let mut instance = OwdlWorkflowInstance::new("run-1", "pce-1", workflow());

        repo.create(&instance).unwrap();
        assert!(matches!(
            repo.create(&instance),
            Err(RepositoryError::AlreadyExists(_))
        ));

        instance.pce_id = "pce-2".to_string();
        repo.update(&instance).unwrap();
        assert_eq!(repo.read("run-1").unwrap().pce_id, "pce-2");

        repo.delete("run-1").unwrap();
        assert!(repo.is_empty());
        assert!(matches!(repo.read("run-1"), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_local_crud() {
        let temp = tempfile::tempdir().unwrap();
        let repo = LocalInstanceRepository::new(temp.path().join("state"));
        let instance = OwdlWorkflowInstance::new("run-1", "pce-1", workflow());

        assert!(matches!(
            repo.update(&instance),
            Err(RepositoryError::NotFound(_))
        ));
        repo.create(&instance).unwrap();
        assert!(temp.path().join("state/run-1.json").exists());
        assert!(!temp.path().join("state/run-1.json.tmp").exists());

        assert_eq!(repo.read("run-1").unwrap(), instance);

        repo.delete("run-1").unwrap();
        assert!(matches!(repo.read("run-1"), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_local_rejects_path_ids() {
        let temp = tempfile::tempdir().unwrap();
        let repo = LocalInstanceRepository::new(temp.path());
        assert!(matches!(
            repo.read("../etc/passwd"),
            Err(RepositoryError::InvalidId(_))
        ));
        assert!(matches!(repo.read(""), Err(RepositoryError::InvalidId(_))));
    }
}
