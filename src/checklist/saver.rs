use anyhow::Result;
use chrono::{Timelike, Utc};
use tracing::{debug, info};

use crate::{
    storage::{entities::DailyLogEntity, log_storage::LogStorage},
    utils::{clock::Clock, time::date_to_record_name},
};

use super::{catalog::BlockCatalog, sheet::DaySheet};

/// Bridges a [DaySheet] and [LogStorage]. "Today" is decided by the clock, so the same sheet
/// saved after midnight lands in a new document.
pub struct DailyLogSaver<S: LogStorage> {
    storage: S,
    clock: Box<dyn Clock>,
}

impl<S: LogStorage> DailyLogSaver<S> {
    pub fn new(storage: S, clock: Box<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn today_key(&self) -> String {
        date_to_record_name(self.clock.time().date_naive())
    }

    /// Local hour, used for checking block time windows.
    pub fn hour(&self) -> u32 {
        self.clock.time().hour()
    }

    /// Sheet saved for today, or an empty one if nothing was saved yet.
    pub async fn load_today(&self, user: &str, catalog: &BlockCatalog) -> Result<DaySheet> {
        let date = self.today_key();
        match self.storage.get_log(user, &date).await? {
            Some(entity) => {
                debug!("Resuming log {date} for {user}");
                Ok(DaySheet::from_entity(catalog, &entity))
            }
            None => Ok(DaySheet::new(catalog)),
        }
    }

    /// Stores the sheet as today's log, replacing an earlier save of the same day.
    pub async fn save(&self, user: &str, sheet: &DaySheet) -> Result<DailyLogEntity> {
        let entity = DailyLogEntity::new(
            self.today_key(),
            sheet.to_blocks(),
            self.clock.time().with_timezone(&Utc),
        );
        self.storage.upsert_log(user, &entity).await?;
        info!(
            "Saved {} for {user}: {}/{} blocks, score {}%",
            entity.date, entity.completed_count, entity.total_blocks, entity.score
        );
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    use crate::{
        checklist::catalog::BlockCatalog,
        storage::log_storage::{LogStorage, LogStorageImpl},
        utils::{clock::MockClock, logging::TEST_LOGGING},
    };

    use super::DailyLogSaver;

    fn clock_at(day: u32, hour: u32) -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_time()
            .returning(move || Local.with_ymd_and_hms(2025, 3, day, hour, 30, 0).unwrap());
        clock
    }

    #[tokio::test]
    async fn test_saver_round_trip_same_day() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = Arc::new(LogStorageImpl::new(dir.path().to_owned())?);
        let catalog = BlockCatalog::default();
        let saver = DailyLogSaver::new(storage.clone(), Box::new(clock_at(7, 7)));

        let mut sheet = saver.load_today("alice", &catalog).await?;
        assert_eq!(sheet.completed(), 0);
        sheet.toggle("workout", saver.hour())?;
        let saved = saver.save("alice", &sheet).await?;
        assert_eq!(saved.date, "2025-03-07");
        assert_eq!(saved.completed_count, 1);
        assert_eq!(saved.total_blocks, 6);
        assert_eq!(saved.score, 17);

        let mut sheet = saver.load_today("alice", &catalog).await?;
        assert!(sheet.is_done("workout"));
        sheet.toggle("meditation", saver.hour())?;
        saver.save("alice", &sheet).await?;

        let all = storage.get_all_logs("alice").await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].completed_count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_saver_new_day_new_document() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(LogStorageImpl::new(dir.path().to_owned())?);
        let catalog = BlockCatalog::default();

        let saver = DailyLogSaver::new(storage.clone(), Box::new(clock_at(7, 21)));
        let mut sheet = saver.load_today("alice", &catalog).await?;
        sheet.toggle("journaling", saver.hour())?;
        saver.save("alice", &sheet).await?;

        let saver = DailyLogSaver::new(storage.clone(), Box::new(clock_at(8, 10)));
        let sheet = saver.load_today("alice", &catalog).await?;
        assert_eq!(sheet.completed(), 0);
        saver.save("alice", &sheet).await?;

        let mut dates = storage
            .get_all_logs("alice")
            .await?
            .into_iter()
            .map(|v| v.date)
            .collect::<Vec<_>>();
        dates.sort();
        assert_eq!(dates, vec!["2025-03-07", "2025-03-08"]);
        Ok(())
    }
}
