use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::utils::fs::{ensure_dir, replace_file};

use super::{KeyValueStore, StoreError, StoreResult};

const VALUE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%6f";
const DEFAULT_RETENTION: usize = 5;

/// File-per-key store: each key lives in `<root>/data/<key>.json`, and the
/// value it replaces is copied to `<root>/backups/<key>/` first.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>, retention: Option<usize>) -> StoreResult<Self> {
        let root = root.into();
        let data_dir = root.join("data");
        let backups_dir = root.join("backups");
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            data_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn value_path(&self, key: &str) -> StoreResult<PathBuf> {
        Ok(self
            .data_dir
            .join(format!("{}.{}", canonical_key(key)?, VALUE_EXTENSION)))
    }

    fn backup_dir(&self, key: &str) -> StoreResult<PathBuf> {
        Ok(self.backups_dir.join(canonical_key(key)?))
    }

    /// Backup file names for `key`, newest first.
    pub fn list_backups(&self, key: &str) -> StoreResult<Vec<String>> {
        let dir = self.backup_dir(key)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    /// Puts a backed-up value back in place and returns it.
    pub fn restore_backup(&self, key: &str, backup_name: &str) -> StoreResult<String> {
        let backup_path = self.backup_dir(key)?.join(backup_name);
        if !backup_path.is_file() {
            return Err(StoreError::BackupNotFound(backup_name.to_string()));
        }
        let data = fs::read_to_string(&backup_path)?;
        replace_file(&self.value_path(key)?, &data)?;
        Ok(data)
    }

    fn backup_existing_file(&self, key: &str, path: &Path) -> StoreResult<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key)?;
        ensure_dir(&dir)?;
        let stem = canonical_key(key)?;
        let mut stamp = Utc::now();
        let mut target = dir.join(backup_name(&stem, stamp));
        while target.exists() {
            stamp += Duration::microseconds(1);
            target = dir.join(backup_name(&stem, stamp));
        }
        fs::copy(path, target)?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &str) -> StoreResult<()> {
        let backups = self.list_backups(key)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        let dir = self.backup_dir(key)?;
        for name in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(dir.join(name));
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.value_path(key)?;
        self.backup_existing_file(key, &path)?;
        replace_file(&path, value)?;
        tracing::trace!(key, path = %path.display(), "value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn canonical_key(key: &str) -> StoreResult<String> {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        Err(StoreError::InvalidKey(key.to_string()))
    } else {
        Ok(sanitized)
    }
}

fn backup_name(stem: &str, stamp: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        stem,
        stamp.format(BACKUP_TIMESTAMP_FORMAT),
        VALUE_EXTENSION
    )
}

/// Reads `<key>_<YYYYmmdd>_<HHMMSS><micros>.json` back into a timestamp.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(".json")?;
    let mut parts = stem.rsplitn(3, '_');
    let time_part = parts.next()?;
    let date_part = parts.next()?;
    if !is_digits(date_part, 8) || !is_digits(time_part, 12) {
        return None;
    }
    let (clock, micros) = time_part.split_at(6);
    let raw = format!("{}{}", date_part, clock);
    let micros: i64 = micros.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S").ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc) + Duration::microseconds(micros))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
