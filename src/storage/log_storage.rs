use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Component, Path, PathBuf},
};

use anyhow::{bail, Result};
use fs4::tokio::AsyncFileExt;
use futures::{stream, StreamExt, TryStreamExt};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::utils::time::record_name_to_date;

use super::entities::DailyLogEntity;

const LOG_EXTENSION: &str = "json";

/// Amount of documents read at the same time during a full scan.
const READ_CONCURRENCY: usize = 4;

/// Interface for abstracting storage of daily logs.
pub trait LogStorage {
    /// Writes the log for `entity.date`, replacing whatever was stored for that day.
    fn upsert_log(&self, user: &str, entity: &DailyLogEntity) -> impl Future<Output = Result<()>>;

    /// Retrieves the log of a single day.
    fn get_log(
        &self,
        user: &str,
        date: &str,
    ) -> impl Future<Output = Result<Option<DailyLogEntity>>>;

    /// Retrieves every log of a user. No particular order is guaranteed.
    fn get_all_logs(&self, user: &str) -> impl Future<Output = Result<Vec<DailyLogEntity>>>;
}

impl<T: Deref> LogStorage for T
where
    T::Target: LogStorage,
{
    fn upsert_log(&self, user: &str, entity: &DailyLogEntity) -> impl Future<Output = Result<()>> {
        self.deref().upsert_log(user, entity)
    }

    fn get_log(
        &self,
        user: &str,
        date: &str,
    ) -> impl Future<Output = Result<Option<DailyLogEntity>>> {
        self.deref().get_log(user, date)
    }

    fn get_all_logs(&self, user: &str) -> impl Future<Output = Result<Vec<DailyLogEntity>>> {
        self.deref().get_all_logs(user)
    }
}

/// The main realization of [LogStorage]. Layout on disk is
/// `<root>/users/<user>/daily_logs/<YYYY-MM-DD>.json`, one json document per day.
pub struct LogStorageImpl {
    root: PathBuf,
}

impl LogStorageImpl {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(root.join("users"))?;

        Ok(Self { root })
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf> {
        validate_user(user)?;
        Ok(self.root.join("users").join(user).join("daily_logs"))
    }

    fn log_path(&self, user: &str, date: &str) -> Result<PathBuf> {
        record_name_to_date(date)?;
        Ok(self.user_dir(user)?.join(format!("{date}.{LOG_EXTENSION}")))
    }
}

/// User ids become directory names, so anything that could escape the users directory is refused.
fn validate_user(user: &str) -> Result<()> {
    let mut components = Path::new(user).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == user => Ok(()),
        _ => bail!("Illegal user id {user:?}"),
    }
}

/// Reads a document under a shared lock. `None` if the file doesn't exist.
async fn read_log(path: &Path) -> Result<Option<DailyLogEntity>> {
    async fn extract(path: &Path) -> std::result::Result<Vec<u8>, std::io::Error> {
        debug!("Extracting {path:?}");
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = vec![];
        let read = file.read_to_end(&mut content).await;
        file.unlock_async().await?;
        read?;
        Ok(content)
    }

    let content = match extract(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => Err(e)?,
    };
    // Encoding problems surface as json errors this way, same as any other broken document.
    Ok(Some(serde_json::from_slice(&content)?))
}

/// The file name is the key of a document, so its `date` field has to agree with it.
fn matches_file_name(path: &Path, date: &str) -> bool {
    path.file_stem().is_some_and(|stem| stem == date)
}

impl LogStorage for LogStorageImpl {
    async fn upsert_log(&self, user: &str, entity: &DailyLogEntity) -> Result<()> {
        let path = self.log_path(user, &entity.date)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let buffer = serde_json::to_vec_pretty(entity)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&path)
            .await?;

        // The file is only truncated after the lock is taken so that readers never see a
        // half-written document.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;
        result?;

        debug!("Saved log {} for {user}", entity.date);
        Ok(())
    }

    async fn get_log(&self, user: &str, date: &str) -> Result<Option<DailyLogEntity>> {
        let path = self.log_path(user, date)?;
        read_log(&path).await
    }

    async fn get_all_logs(&self, user: &str) -> Result<Vec<DailyLogEntity>> {
        let dir = self.user_dir(user)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => Err(e)?,
        };

        let mut paths = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|v| v == LOG_EXTENSION) {
                paths.push(path);
            }
        }

        let logs = stream::iter(paths)
            .map(|path| async move {
                match read_log(&path).await {
                    Ok(Some(log)) if !matches_file_name(&path, &log.date) => {
                        warn!("Document {path:?} is stored under another day than {}", log.date);
                        Ok(None)
                    }
                    Ok(log) => Ok(log),
                    Err(e) if e.is::<serde_json::Error>() => {
                        // ignore illegal documents. Might happen after manual edits
                        warn!("During parsing in path {path:?} found illegal json: {e}");
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            })
            .buffered(READ_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        debug!("Loaded {} logs for {user}", logs.len());
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::{BlockValue, Blocks, DailyLogEntity},
            log_storage::{LogStorage, LogStorageImpl},
        },
        utils::logging::TEST_LOGGING,
    };

    fn log(date: &str, blocks: &[(&str, bool)]) -> DailyLogEntity {
        let blocks = blocks
            .iter()
            .map(|(k, v)| (k.to_string(), BlockValue::Leaf(*v)))
            .collect::<Blocks>();
        DailyLogEntity::new(
            date.into(),
            blocks,
            Utc.with_ymd_and_hms(2025, 3, 7, 18, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_log_storage_basic() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = LogStorageImpl::new(dir.path().to_owned())?;
        let entity = log("2025-03-07", &[("workout", true), ("reading", false)]);

        storage.upsert_log("alice", &entity).await?;

        assert_eq!(storage.get_log("alice", "2025-03-07").await?, Some(entity));
        assert_eq!(storage.get_log("alice", "2025-03-08").await?, None);
        assert_eq!(storage.get_log("bob", "2025-03-07").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_storage_upsert_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let storage = LogStorageImpl::new(dir.path().to_owned())?;
        let first = log(
            "2025-03-07",
            &[("workout", true), ("reading", true), ("journaling", true)],
        );
        let second = log("2025-03-07", &[("workout", false)]);

        storage.upsert_log("alice", &first).await?;
        storage.upsert_log("alice", &second).await?;

        let all = storage.get_all_logs("alice").await?;
        assert_eq!(all, vec![second]);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_storage_all_skips_corrupted() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(LogStorageImpl::new(dir.path().to_owned())?);
        storage
            .upsert_log("alice", &log("2025-03-06", &[("workout", true)]))
            .await?;
        storage
            .upsert_log("alice", &log("2025-03-07", &[("workout", false)]))
            .await?;
        std::fs::write(
            dir.path().join("users/alice/daily_logs/2025-03-08.json"),
            "{\"date\": \"2025-03-08\", \"blo",
        )?;

        std::fs::write(
            dir.path().join("users/alice/daily_logs/2025-03-09.json"),
            [0xff, 0xfe, b'{'],
        )?;

        let mut all = storage.get_all_logs("alice").await?;
        all.sort_by(|a, b| a.date.cmp(&b.date));
        let dates = all.iter().map(|v| v.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2025-03-06", "2025-03-07"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_storage_all_skips_misplaced_documents() -> Result<()> {
        let dir = tempdir()?;
        let storage = LogStorageImpl::new(dir.path().to_owned())?;
        storage
            .upsert_log("alice", &log("2025-03-06", &[("workout", true)]))
            .await?;
        std::fs::copy(
            dir.path().join("users/alice/daily_logs/2025-03-06.json"),
            dir.path().join("users/alice/daily_logs/2025-03-07.json"),
        )?;

        let all = storage.get_all_logs("alice").await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].date, "2025-03-06");
        Ok(())
    }

    #[tokio::test]
    async fn test_log_storage_unknown_user_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let storage = LogStorageImpl::new(dir.path().to_owned())?;
        assert!(storage.get_all_logs("nobody").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_log_storage_rejects_illegal_keys() -> Result<()> {
        let dir = tempdir()?;
        let storage = LogStorageImpl::new(dir.path().to_owned())?;
        let entity = log("2025-03-07", &[("workout", true)]);
        assert!(storage.upsert_log("../alice", &entity).await.is_err());
        assert!(storage.upsert_log("", &entity).await.is_err());
        assert!(storage.upsert_log("a/b", &entity).await.is_err());
        assert!(storage.get_log("alice", "../../x").await.is_err());
        Ok(())
    }
}
