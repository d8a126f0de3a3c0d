use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

/// Resolves which record database to read. An explicit path wins, then the
/// `TIMETAGGER_DB_PATH` environment variable, then the first user database found
/// under a conventional timetagger data directory.
pub fn resolve_database_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path);
    }

    if let Ok(path) = env::var("TIMETAGGER_DB_PATH") {
        return existing(PathBuf::from(path));
    }

    for base in candidate_data_dirs() {
        if let Some(found) = first_user_database(&base.join("_timetagger").join("users")) {
            return Ok(found);
        }
    }

    Err(anyhow!(
        "No record database found. Pass --db, set TIMETAGGER_DB_PATH, \
         or point TIMETAGGER_DATADIR at the timetagger data directory"
    ))
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(anyhow!("record database not found: {}", path.display()))
    }
}

fn candidate_data_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(dir) = env::var("TIMETAGGER_DATADIR") {
        dirs.push(PathBuf::from(dir));
    }
    #[cfg(windows)]
    if let Ok(appdata) = env::var("APPDATA") {
        dirs.push(PathBuf::from(appdata).join("timetagger"));
    }
    #[cfg(not(windows))]
    {
        if let Ok(data_home) = env::var("XDG_DATA_HOME") {
            dirs.push(PathBuf::from(data_home).join("timetagger"));
        }
        if let Ok(home) = env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/timetagger"));
        }
    }
    dirs
}

/// A timetagger instance keeps one database per user, named after the user. Any
/// of them is a valid default, take the first in name order to stay deterministic.
fn first_user_database(users_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(users_dir).ok()?;
    let mut databases = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|extension| extension == "db"))
        .collect::<Vec<_>>();
    databases.sort();
    databases.into_iter().next()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{first_user_database, resolve_database_path};

    #[test]
    fn explicit_path_must_exist() -> Result<()> {
        let dir = tempdir()?;
        let present = dir.path().join("user.db");
        fs::write(&present, b"")?;

        assert_eq!(resolve_database_path(Some(present.clone()))?, present);
        assert!(resolve_database_path(Some(dir.path().join("absent.db"))).is_err());
        Ok(())
    }

    #[test]
    fn picks_the_first_user_database_in_name_order() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.db"), b"")?;
        fs::write(dir.path().join("a.db"), b"")?;
        fs::write(dir.path().join("notes.txt"), b"")?;

        assert_eq!(
            first_user_database(dir.path()),
            Some(dir.path().join("a.db"))
        );
        Ok(())
    }

    #[test]
    fn missing_users_dir_yields_nothing() {
        let dir = tempdir().unwrap();
        assert_eq!(first_user_database(&dir.path().join("nope")), None);
    }
}
