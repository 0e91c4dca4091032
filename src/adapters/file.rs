use crate::adapters::memory::InMemoryStore;
use crate::config::roster::RosterConfig;
use crate::domain::model::{CommitOutcome, Draw, DrawId, Group, GroupId, Participant, ParticipantId};
use crate::domain::ports::{DrawRepository, GroupDirectory, ParticipantDirectory};
use crate::utils::error::{DrawError, Result};
use async_trait::async_trait;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const DRAWS_FILE: &str = "draws.json";
pub const LOCK_FILE: &str = "draws.lock";

#[derive(Debug, Default, Serialize, Deserialize)]
struct DrawLedger {
    draws: Vec<Draw>,
}

/// Roster-seeded store whose draws survive restarts in `<state_dir>/draws.json`.
///
/// Several stores (or processes) may share one state dir. Every commit holds
/// an exclusive lock on `draws.lock` and decides against the ledger on disk,
/// so a group is drawn at most once no matter which store gets there first.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: InMemoryStore,
    ledger_path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub async fn open(roster: &RosterConfig, state_dir: impl AsRef<Path>) -> Result<Self> {
        let state_dir = state_dir.as_ref();
        let inner = InMemoryStore::new();

        for participant in &roster.participants {
            inner.insert_participant(participant.clone()).await;
        }
        for group in roster.groups() {
            inner.insert_group(group).await?;
        }

        tokio::fs::create_dir_all(state_dir).await?;
        let store = Self {
            inner,
            ledger_path: state_dir.join(DRAWS_FILE),
            lock_path: state_dir.join(LOCK_FILE),
        };
        store.reload().await?;
        Ok(store)
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Pulls in draws other stores have written since this one was opened.
    pub async fn reload(&self) -> Result<()> {
        let path = self.ledger_path.clone();
        let ledger = blocking(move || read_ledger(&path)).await?;
        tracing::debug!(
            "Restoring {} draw(s) from {}",
            ledger.draws.len(),
            self.ledger_path.display()
        );
        for draw in ledger.draws {
            self.inner.restore_draw(draw).await;
        }
        Ok(())
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DrawError::StorageError {
            message: format!("ledger task failed: {}", e),
        })?
}

fn read_ledger(path: &Path) -> Result<DrawLedger> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DrawLedger::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_ledger(path: &Path, mut ledger: DrawLedger) -> Result<()> {
    ledger
        .draws
        .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    let json_data = serde_json::to_vec_pretty(&ledger)?;

    // Write then rename so readers never see a half-written ledger.
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json_data)?;
    fs::rename(&tmp_path, path)?;

    tracing::debug!("Wrote draw ledger ({} bytes) to {}", json_data.len(), path.display());
    Ok(())
}

/// Appends `draw` to the ledger unless its group already has one on disk.
fn commit_to_ledger(ledger_path: &Path, lock_path: &Path, draw: Draw) -> Result<CommitOutcome> {
    let lock_file: File = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    FileExt::lock_exclusive(&lock_file)?;

    let outcome = (|| -> Result<CommitOutcome> {
        let mut ledger = read_ledger(ledger_path)?;
        if ledger.draws.iter().any(|d| d.group_id == draw.group_id) {
            return Ok(CommitOutcome::Conflict);
        }
        ledger.draws.push(draw);
        write_ledger(ledger_path, ledger)?;
        Ok(CommitOutcome::Committed)
    })();

    FileExt::unlock(&lock_file)?;
    outcome
}

#[async_trait]
impl GroupDirectory for FileStore {
    async fn find_group(&self, id: GroupId) -> Result<Option<Group>> {
        self.inner.find_group(id).await
    }
}

#[async_trait]
impl ParticipantDirectory for FileStore {
    async fn find_participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        self.inner.find_participant(id).await
    }
}

#[async_trait]
impl DrawRepository for FileStore {
    async fn find_draw(&self, id: DrawId) -> Result<Option<Draw>> {
        self.inner.find_draw(id).await
    }

    async fn find_draw_by_group(&self, group_id: GroupId) -> Result<Option<Draw>> {
        self.inner.find_draw_by_group(group_id).await
    }

    async fn commit_draw(&self, draw: Draw) -> Result<CommitOutcome> {
        let ledger_path = self.ledger_path.clone();
        let lock_path = self.lock_path.clone();
        let on_disk = draw.clone();

        let outcome = self
            .inner
            .commit_with(draw, move || {
                blocking(move || commit_to_ledger(&ledger_path, &lock_path, on_disk))
            })
            .await?;

        if outcome == CommitOutcome::Conflict {
            // Another store drew this group first; catch up so reads see it.
            self.reload().await?;
        }
        Ok(outcome)
    }
}
