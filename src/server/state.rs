//! Server state and configuration.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::{ConfigError, Settings, SettingsStore};
use crate::job::{CancelToken, ProgressEvent};
use crate::workbook::{ImageLocation, PipelineStage, PipelineSummary};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    pub listen_addr: String,
    /// Settings file shared with the CLI
    pub settings_path: PathBuf,
    /// Where jobs write their PNG files
    pub images: ImageLocation,
    /// Leave PNG files on disk after a job
    pub keep_images: bool,
}

/// Latest known state of one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub id: Uuid,
    pub input: PathBuf,
    pub output: PathBuf,
    pub stage: PipelineStage,
    pub done: u32,
    pub total: u32,
    pub inserted: u32,
    pub skipped: u32,
    /// Reason of the most recent skipped row.
    pub last_skip: Option<String>,
    pub finished: bool,
    pub summary: Option<PipelineSummary>,
    pub error: Option<String>,
}

impl JobStatus {
    pub fn new(id: Uuid, input: PathBuf, output: PathBuf) -> Self {
        Self {
            id,
            input,
            output,
            stage: PipelineStage::Idle,
            done: 0,
            total: 0,
            inserted: 0,
            skipped: 0,
            last_skip: None,
            finished: false,
            summary: None,
            error: None,
        }
    }

    /// Fold one progress event into the snapshot.
    pub fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Stage { stage } => self.stage = stage,
            ProgressEvent::Row { done, total } => {
                self.done = done;
                self.total = total;
            }
            ProgressEvent::Inserted { .. } => self.inserted += 1,
            ProgressEvent::Skipped { cell, reason } => {
                self.skipped += 1;
                self.last_skip = Some(format!("{}: {}", cell, reason));
            }
            ProgressEvent::Finished { summary } => {
                self.finished = true;
                self.summary = Some(summary);
            }
            ProgressEvent::Failed { error } => {
                self.finished = true;
                self.error = Some(error);
            }
        }
    }
}

/// Finished jobs kept for status queries; older ones are dropped.
pub const MAX_FINISHED_JOBS: usize = 32;

/// A job tracked by the server.
pub struct JobEntry {
    pub status: JobStatus,
    pub cancel: CancelToken,
    pub created: Instant,
}

impl JobEntry {
    pub fn new(status: JobStatus, cancel: CancelToken) -> Self {
        Self {
            status,
            cancel,
            created: Instant::now(),
        }
    }
}

/// Drop the oldest finished jobs until at most `keep` remain. Running jobs
/// are never dropped. Returns the number removed.
pub fn prune_finished(jobs: &mut HashMap<Uuid, JobEntry>, keep: usize) -> usize {
    let mut finished: Vec<(Instant, Uuid)> = jobs
        .iter()
        .filter(|(_, entry)| entry.status.finished)
        .map(|(id, entry)| (entry.created, *id))
        .collect();
    if finished.len() <= keep {
        return 0;
    }

    finished.sort();
    let excess = finished.len() - keep;
    for (_, id) in &finished[..excess] {
        jobs.remove(id);
    }
    excess
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub store: SettingsStore,
    pub settings: RwLock<Settings>,
    pub jobs: RwLock<HashMap<Uuid, JobEntry>>,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
}

impl AppState {
    /// Load the settings file and build the state.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let store = SettingsStore::new(config.settings_path.clone());
        let settings = store.load()?;
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Ok(Self {
            config,
            store,
            settings: RwLock::new(settings),
            jobs: RwLock::new(HashMap::new()),
            boot_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_folds_events() {
        let mut status = JobStatus::new(Uuid::new_v4(), "in.xlsx".into(), "out.xlsx".into());

        status.apply(ProgressEvent::Stage {
            stage: PipelineStage::Running,
        });
        status.apply(ProgressEvent::Row { done: 1, total: 2 });
        status.apply(ProgressEvent::Inserted {
            cell: "A1".into(),
            width: 100,
            height: 50,
        });
        status.apply(ProgressEvent::Row { done: 2, total: 2 });
        status.apply(ProgressEvent::Skipped {
            cell: "B2".into(),
            reason: "not an integer".into(),
        });

        assert_eq!(status.stage, PipelineStage::Running);
        assert_eq!((status.done, status.total), (2, 2));
        assert_eq!(status.inserted, 1);
        assert_eq!(status.skipped, 1);
        assert_eq!(status.last_skip.as_deref(), Some("B2: not an integer"));
        assert!(!status.finished);

        status.apply(ProgressEvent::Failed {
            error: "disk full".into(),
        });
        assert!(status.finished);
        assert_eq!(status.error.as_deref(), Some("disk full"));
    }

    fn entry(finished: bool) -> JobEntry {
        let mut status = JobStatus::new(Uuid::new_v4(), "in.xlsx".into(), "out.xlsx".into());
        status.finished = finished;
        JobEntry::new(status, CancelToken::new())
    }

    #[test]
    fn test_prune_keeps_running_and_newest_finished() {
        let mut jobs = HashMap::new();
        let running = entry(false);
        let running_id = running.status.id;
        jobs.insert(running_id, running);

        let mut finished_ids = Vec::new();
        for _ in 0..4 {
            let e = entry(true);
            finished_ids.push(e.status.id);
            jobs.insert(e.status.id, e);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        assert_eq!(prune_finished(&mut jobs, 2), 2);
        assert_eq!(jobs.len(), 3);
        assert!(jobs.contains_key(&running_id));
        assert!(!jobs.contains_key(&finished_ids[0]));
        assert!(!jobs.contains_key(&finished_ids[1]));
        assert!(jobs.contains_key(&finished_ids[3]));

        assert_eq!(prune_finished(&mut jobs, 2), 0);
    }
}
