use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub rules_path: PathBuf,
    pub meta_path: PathBuf,
}

impl StoragePaths {
    pub fn new(data_dir: impl Into<PathBuf>, rules_override: Option<PathBuf>) -> Self {
        let data_dir: PathBuf = data_dir.into();
        let rules_path = rules_override.unwrap_or_else(|| data_dir.join("cci_edits.parquet"));
        let meta_path = data_dir.join("meta.json");

        Self {
            data_dir,
            rules_path,
            meta_path,
        }
    }
}

pub fn file_present_nonempty(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(m) => m.is_file() && m.len() > 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_path_lives_in_data_dir() {
        let paths = StoragePaths::new("/tmp/cci", None);
        assert_eq!(paths.rules_path, PathBuf::from("/tmp/cci/cci_edits.parquet"));
        assert_eq!(paths.meta_path, PathBuf::from("/tmp/cci/meta.json"));
    }

    #[test]
    fn explicit_rules_path_wins() {
        let paths = StoragePaths::new("/tmp/cci", Some(PathBuf::from("/elsewhere/edits.csv")));
        assert_eq!(paths.rules_path, PathBuf::from("/elsewhere/edits.csv"));
        assert_eq!(paths.data_dir, PathBuf::from("/tmp/cci"));
    }

    #[test]
    fn missing_file_is_not_present() {
        assert!(!file_present_nonempty(Path::new(
            "/tmp/cci-edits-backend-does-not-exist.parquet"
        )));
    }
}
