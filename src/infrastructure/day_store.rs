use crate::domain::models::Task;
use crate::infrastructure::error::InfraError;
use chrono::{NaiveDate, Utc};
use log::warn;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Task collections keyed by calendar date. Writes replace the whole day.
pub trait DayStore: Send + Sync {
    /// Missing or unreadable data for a date is an empty day, not an error.
    fn load(&self, date: NaiveDate) -> Result<Vec<Task>, InfraError>;
    fn save(&self, date: NaiveDate, tasks: &[Task]) -> Result<(), InfraError>;
}

pub fn initialize_database(path: &Path) -> Result<(), InfraError> {
    let connection = Connection::open(path)?;
    connection.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Records that decode but break task invariants are dropped one by one.
fn decode_day(date_key: &str, payload: &str) -> Vec<Task> {
    let tasks = match serde_json::from_str::<Vec<Task>>(payload) {
        Ok(tasks) => tasks,
        Err(error) => {
            warn!("event=day_load_failed date={date_key} reason=malformed_payload error={error}");
            return Vec::new();
        }
    };
    tasks
        .into_iter()
        .filter(|task| match task.validate() {
            Ok(()) => true,
            Err(reason) => {
                warn!(
                    "event=task_dropped date={date_key} task_id={} reason=invalid_task error={reason}",
                    task.id
                );
                false
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SqliteDayStore {
    db_path: PathBuf,
}

impl SqliteDayStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, InfraError> {
        Connection::open(&self.db_path).map_err(InfraError::from)
    }
}

impl DayStore for SqliteDayStore {
    fn load(&self, date: NaiveDate) -> Result<Vec<Task>, InfraError> {
        let key = date_key(date);
        let connection = self.connect()?;
        let payload: Option<String> = connection
            .query_row(
                "SELECT payload FROM day_tasks WHERE date = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload
            .map(|payload| decode_day(&key, &payload))
            .unwrap_or_default())
    }

    fn save(&self, date: NaiveDate, tasks: &[Task]) -> Result<(), InfraError> {
        let payload = serde_json::to_string(tasks)?;
        let connection = self.connect()?;
        connection.execute(
            "INSERT INTO day_tasks (date, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
               payload = excluded.payload,
               updated_at = excluded.updated_at",
            params![date_key(date), payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Keeps serialized payloads so load/save behave like the SQLite store.
#[derive(Debug, Default)]
pub struct InMemoryDayStore {
    days: Mutex<HashMap<String, String>>,
}

impl InMemoryDayStore {
    /// Stores a raw payload for a date, bypassing serialization.
    pub fn insert_raw(&self, date: NaiveDate, payload: &str) -> Result<(), InfraError> {
        let mut days = self
            .days
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("day store lock poisoned: {error}")))?;
        days.insert(date_key(date), payload.to_string());
        Ok(())
    }
}

impl DayStore for InMemoryDayStore {
    fn load(&self, date: NaiveDate) -> Result<Vec<Task>, InfraError> {
        let key = date_key(date);
        let days = self
            .days
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("day store lock poisoned: {error}")))?;
        Ok(days
            .get(&key)
            .map(|payload| decode_day(&key, payload))
            .unwrap_or_default())
    }

    fn save(&self, date: NaiveDate, tasks: &[Task]) -> Result<(), InfraError> {
        let payload = serde_json::to_string(tasks)?;
        self.insert_raw(date, &payload)
    }
}
