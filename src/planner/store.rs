use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result, WrapErr};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::day_key::DayKey;
use super::task::Task;

pub type Days = BTreeMap<DayKey, Vec<Task>>;

/// Day-keyed task buckets backed by one JSON file.
///
/// Every mutation rewrites the whole file before returning. Buckets are never
/// left empty: the key goes away with its last task.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    days: Days,
}

impl TaskStore {
    /// Never fails: a missing, unreadable or malformed file yields an empty store.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let days = read_days(&path);
        info!(days = days.len(), "loaded task store");
        Self { path, days }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self, day: DayKey) -> &[Task] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = (DayKey, &[Task])> {
        self.days.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of days that have at least one task.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_hours(&self, day: DayKey) -> f64 {
        self.tasks(day).iter().map(|t| t.duration).sum()
    }

    /// Appends and saves. If the save fails the task is taken back out, so
    /// memory never holds what the file doesn't.
    #[tracing::instrument(skip(self, task), fields(name = %task.name))]
    pub fn add_task(&mut self, day: DayKey, task: Task) -> Result<()> {
        self.days.entry(day).or_default().push(task);
        if let Err(err) = self.save() {
            if let Some(bucket) = self.days.get_mut(&day) {
                bucket.pop();
                if bucket.is_empty() {
                    self.days.remove(&day);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Removes the task at `index`. Unknown day or out-of-range index is a
    /// no-op that returns `Ok(None)` and writes nothing. A failed save puts
    /// the task back where it was.
    #[tracing::instrument(skip(self))]
    pub fn delete_task(&mut self, day: DayKey, index: usize) -> Result<Option<Task>> {
        let Some(bucket) = self.days.get_mut(&day) else {
            debug!(index, "no tasks for day, nothing to delete");
            return Ok(None);
        };
        if index >= bucket.len() {
            debug!(index, len = bucket.len(), "delete index out of range");
            return Ok(None);
        }

        let removed = bucket.remove(index);
        if bucket.is_empty() {
            self.days.remove(&day);
        }
        if let Err(err) = self.save() {
            self.days.entry(day).or_default().insert(index, removed);
            return Err(err);
        }
        Ok(Some(removed))
    }

    fn save(&self) -> Result<()> {
        write_days_atomic(&self.path, &self.days)
            .wrap_err_with(|| format!("failed to save {}", self.path.display()))
    }
}

fn read_days(path: &Path) -> Days {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no task file yet, starting empty");
            return Days::new();
        }
        Err(err) => {
            warn!(error = %err, "could not read task file, starting empty");
            return Days::new();
        }
    };

    if content.trim().is_empty() {
        return Days::new();
    }

    match serde_json::from_str::<Days>(&content) {
        Ok(mut days) => {
            days.retain(|_, tasks| !tasks.is_empty());
            days
        }
        Err(err) => {
            let aside = corrupt_path(path);
            match fs::rename(path, &aside) {
                Ok(()) => warn!(
                    error = %err,
                    moved_to = %aside.display(),
                    "task file is not valid, starting empty"
                ),
                Err(rename_err) => warn!(
                    error = %err,
                    rename_error = %rename_err,
                    "task file is not valid and could not be moved aside, starting empty"
                ),
            }
            Days::new()
        }
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "tasks.json".into());
    name.push(".corrupt");
    path.with_file_name(name)
}

fn write_days_atomic(path: &Path, days: &Days) -> Result<()> {
    debug!(file = %path.display(), days = days.len(), "saving task store");

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;

    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, days)?;
    writeln!(temp)?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| eyre!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn key(s: &str) -> DayKey {
        s.parse().expect("day key")
    }

    fn task(name: &str, hours: f64) -> Task {
        Task {
            name: name.to_string(),
            subject: Some("Science".to_string()),
            color: "#f072c6".to_string(),
            description: String::new(),
            duration: hours,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = tempdir().expect("tempdir");
        let store = TaskStore::load(temp.path().join("tasks.json"));
        assert!(store.is_empty());
        assert!(store.tasks(key("2024-03-15")).is_empty());
    }

    #[test]
    fn additions_reload_grouped_and_ordered() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("tasks.json");
        let mut store = TaskStore::load(&path);

        store.add_task(key("2024-03-15"), task("a", 1.0)).expect("add");
        store.add_task(key("2024-03-16"), task("b", 2.0)).expect("add");
        store.add_task(key("2024-03-15"), task("c", 0.5)).expect("add");

        let reloaded = TaskStore::load(&path);
        let names: Vec<_> = reloaded
            .tasks(key("2024-03-15"))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(reloaded.tasks(key("2024-03-16")), store.tasks(key("2024-03-16")));
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.total_hours(key("2024-03-15")), 1.5);
    }

    #[test]
    fn deleting_last_task_drops_the_day() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        let mut store = TaskStore::load(&path);
        let day = key("2024-02-29");

        store.add_task(day, task("a", 1.0)).expect("add");
        store.add_task(day, task("b", 1.0)).expect("add");

        let removed = store.delete_task(day, 0).expect("delete");
        assert_eq!(removed.map(|t| t.name), Some("a".to_string()));
        assert!(store.tasks(day).iter().all(|t| t.name != "a"));

        store.delete_task(day, 0).expect("delete");
        assert!(store.is_empty());

        let raw = fs::read_to_string(&path).expect("read");
        assert!(!raw.contains("2024-02-29"));
    }

    #[test]
    fn out_of_range_delete_is_a_noop() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        let mut store = TaskStore::load(&path);
        let day = key("2024-01-01");

        assert_eq!(store.delete_task(day, 0).expect("no-op"), None);
        assert!(!path.exists());

        store.add_task(day, task("only", 1.0)).expect("add");
        assert_eq!(store.delete_task(day, 5).expect("no-op"), None);
        assert_eq!(store.tasks(day).len(), 1);
    }

    #[test]
    fn round_trip_is_deep_equal() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        let mut store = TaskStore::load(&path);
        let mut t = task("Lab report", 1.25);
        t.description = "sections 2-4".to_string();
        store.add_task(key("2024-12-31"), t).expect("add");
        let new_year = DayKey::new(NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"));
        store.add_task(new_year, task("x", 0.0)).expect("add");

        let fresh = TaskStore::load(&path);
        for (day, tasks) in store.days() {
            assert_eq!(fresh.tasks(day), tasks);
        }
        assert_eq!(fresh.len(), store.len());
    }

    #[test]
    fn malformed_file_loads_empty_and_is_kept_aside() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        fs::write(&path, "{not json").expect("write");

        let store = TaskStore::load(&path);
        assert!(store.is_empty());
        assert!(temp.path().join("tasks.json.corrupt").exists());
    }

    #[test]
    fn legacy_blob_with_missing_fields_loads() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        fs::write(
            &path,
            r##"{"2024-03-15":[{"name":"Essay","color":"#a283f8","duration":2}],"2024-03-16":[]}"##,
        )
        .expect("write");

        let store = TaskStore::load(&path);
        let tasks = store.tasks(key("2024-03-15"));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].duration, 2.0);
        assert_eq!(tasks[0].subject, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn null_duration_does_not_discard_the_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        fs::write(
            &path,
            r##"{"2024-03-15":[{"name":"Essay","color":"#a283f8","duration":2}],
                "2024-03-16":[{"name":"Quiz","color":"#FF6B6B","duration":null}]}"##,
        )
        .expect("write");

        let store = TaskStore::load(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.tasks(key("2024-03-16"))[0].duration, 0.0);
        assert!(!temp.path().join("tasks.json.corrupt").exists());
    }

    #[test]
    fn failed_save_leaves_memory_unchanged() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");
        let mut store = TaskStore::load(blocker.join("tasks.json"));
        let day = key("2024-03-15");

        assert!(store.add_task(day, task("Essay", 2.0)).is_err());
        assert!(store.add_task(day, task("Essay", 2.0)).is_err());
        assert!(store.tasks(day).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn failed_delete_puts_the_task_back() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("data");
        let path = dir.join("tasks.json");
        let mut store = TaskStore::load(&path);
        let day = key("2024-03-15");
        store.add_task(day, task("a", 1.0)).expect("add");
        store.add_task(day, task("b", 1.0)).expect("add");

        fs::remove_dir_all(&dir).expect("remove dir");
        fs::write(&dir, "not a directory").expect("write");

        assert!(store.delete_task(day, 0).is_err());
        let names: Vec<_> = store.tasks(day).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
