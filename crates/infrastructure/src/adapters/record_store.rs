//! Process record persisted as a small text file

use std::io::ErrorKind;
use std::path::PathBuf;

use application::error::ApplicationError;
use application::ports::ProcessRecordStore;
use async_trait::async_trait;
use domain::ProcessRecord;
use tracing::debug;

/// Record store at a fixed path
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ProcessRecordStore for FileRecordStore {
    async fn load(&self) -> Result<Option<ProcessRecord>, ApplicationError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(ProcessRecord::parse(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::io(self.path.display(), &e)),
        }
    }

    async fn save(&self, record: &ProcessRecord) -> Result<(), ApplicationError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApplicationError::io(parent.display(), &e))?;
        }

        // Write then rename so readers never see a partial record
        let temp = self.temp_path();
        tokio::fs::write(&temp, record.to_file_contents())
            .await
            .map_err(|e| ApplicationError::io(temp.display(), &e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| ApplicationError::io(self.path.display(), &e))?;

        debug!(path = %self.path.display(), pid = %record.pid, "Process record written");
        Ok(())
    }

    async fn remove(&self) -> Result<bool, ApplicationError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ApplicationError::io(self.path.display(), &e)),
        }
    }
}
