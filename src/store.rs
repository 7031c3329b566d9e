use include_dir::{include_dir, Dir};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;
use crate::training::Gesture;

static GESTURE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/gestures");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed gesture file `{path}`: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Gesture label is empty")]
    EmptyLabel,

    #[error("Gesture has no samples")]
    EmptyGesture,
}

/// Loads one of the compiled-in gesture sets. A malformed entry is logged
/// and skipped; the remaining entries still load.
pub fn load_bundled(set: &str) -> Vec<Gesture> {
    let Some(dir) = GESTURE_DIR.get_dir(set) else {
        tracing::warn!(set, "unknown bundled gesture set");
        return vec![];
    };

    dir.files()
        .sorted_by_key(|f| f.path().to_path_buf())
        .filter_map(|file| match serde_json::from_slice::<Gesture>(file.contents()) {
            Ok(gesture) => Some(gesture),
            Err(err) => {
                tracing::warn!(path = %file.path().display(), %err, "skipping bundled gesture");
                None
            }
        })
        .collect()
}

/// names of the compiled-in gesture sets
pub fn bundled_sets() -> Vec<&'static str> {
    GESTURE_DIR
        .dirs()
        .filter_map(|d| d.path().file_name().and_then(|n| n.to_str()))
        .sorted()
        .collect()
}

/// Reads a single persisted gesture file.
pub fn read_gesture(path: &Path) -> Result<Gesture, StoreError> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Directory of user-saved gestures, one JSON file per example.
#[derive(Debug, Clone)]
pub struct GestureStore {
    dir: PathBuf,
}

impl GestureStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::gestures_dir().unwrap_or_else(|| PathBuf::from("scrawl_gestures"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scans the store directory for saved gestures. A missing directory or a
    /// directory with zero valid files yields an empty result; malformed files
    /// are logged and skipped; a directory that cannot be read is an error.
    pub fn load_persisted(&self) -> Result<Vec<Gesture>, StoreError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut gestures = Vec::new();
        for path in paths {
            match read_gesture(&path) {
                Ok(gesture) => gestures.push(gesture),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping saved gesture");
                }
            }
        }
        Ok(gestures)
    }

    /// Serializes one gesture under a collision-resistant name
    /// (`<label>-<nanosecond timestamp>.json`). Empty labels and empty point
    /// sets are rejected before anything touches the disk.
    pub fn save(&self, gesture: &Gesture) -> Result<PathBuf, StoreError> {
        if gesture.label.trim().is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        if gesture.points.is_empty() {
            return Err(StoreError::EmptyGesture);
        }

        fs::create_dir_all(&self.dir)?;

        let base = sanitize_label(&gesture.label);
        let stamp = chrono::Local::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        let mut path = self.dir.join(format!("{base}-{stamp}.json"));
        let mut bump = 1u32;
        while path.exists() {
            path = self.dir.join(format!("{base}-{stamp}-{bump}.json"));
            bump += 1;
        }

        let data = serde_json::to_vec_pretty(gesture).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, data)?;
        Ok(path)
    }
}

fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_cloud::PointCloud;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn sample_gesture(label: &str) -> Gesture {
        let mut points = PointCloud::new();
        points.append(1.0, -2.0, 0);
        points.append(3.0, -4.0, 0);
        points.append(5.0, -6.0, 1);
        Gesture::new(label, points)
    }

    #[test]
    fn save_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path());
        let gesture = sample_gesture("5");

        let path = store.save(&gesture).unwrap();
        let loaded = read_gesture(&path).unwrap();

        assert_eq!(loaded, gesture);
    }

    #[test]
    fn save_rejects_empty_label_before_touching_disk() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path());
        let gesture = sample_gesture("   ");

        assert_matches!(store.save(&gesture), Err(StoreError::EmptyLabel));
        assert!(!dir.path().join("any").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_rejects_empty_point_set() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path());
        let gesture = Gesture::new("5", PointCloud::new());

        assert_matches!(store.save(&gesture), Err(StoreError::EmptyGesture));
    }

    #[test]
    fn repeated_saves_never_collide() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path());
        let gesture = sample_gesture("5");

        let first = store.save(&gesture).unwrap();
        let second = store.save(&gesture).unwrap();
        assert_ne!(first, second);

        assert_eq!(store.load_persisted().unwrap().len(), 2);
    }

    #[test]
    fn filenames_start_with_the_sanitized_label() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path());

        let path = store.save(&sample_gesture("a/b:c")).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("a_b_c-"), "got {name}");
    }

    #[test]
    fn missing_directory_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path().join("never_created"));
        assert!(store.load_persisted().unwrap().is_empty());
    }

    #[test]
    fn malformed_files_are_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let store = GestureStore::with_dir(dir.path());
        store.save(&sample_gesture("5")).unwrap();

        fs::write(dir.path().join("junk.json"), b"{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let loaded = store.load_persisted().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].label, "5");
    }

    #[test]
    fn read_gesture_reports_malformed_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"[[[").unwrap();

        assert_matches!(read_gesture(&path), Err(StoreError::Malformed { .. }));
    }

    #[test]
    fn bundled_numeric_set_is_complete() {
        let gestures = load_bundled("numeric");
        assert!(gestures.len() >= 20, "got {}", gestures.len());

        for digit in 0..10 {
            let label = digit.to_string();
            assert!(
                gestures.iter().any(|g| g.label == label),
                "missing digit {label}"
            );
        }
        assert!(
            gestures.iter().any(|g| g.points.stroke_count() > 1),
            "expected at least one multi-stroke example"
        );
        assert!(gestures.iter().all(|g| !g.points.is_empty()));
    }

    #[test]
    fn unknown_bundled_set_is_empty() {
        assert!(load_bundled("no_such_set").is_empty());
    }

    #[test]
    fn bundled_sets_lists_numeric() {
        assert!(bundled_sets().contains(&"numeric"));
    }
}
