//! Saved games: a flat list of coordinate moves, one per line.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Local, TimeZone};

use crate::chess::game::Game;

pub const EXTENSION: &str = "chess";

/// `game_YYYYMMDD_HHMMSS.chess` for the given moment.
pub fn file_name<Tz: TimeZone>(stamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("game_{}.{EXTENSION}", stamp.format("%Y%m%d_%H%M%S"))
}

/// Writes `log` into `dir` under a timestamped name, creating the directory
/// if needed. An empty log is not saved and gives `Ok(None)`.
pub fn save(dir: &Path, log: &[String]) -> anyhow::Result<Option<PathBuf>> {
    save_stamped(dir, log, &Local::now())
}

fn save_stamped<Tz: TimeZone>(
    dir: &Path,
    log: &[String],
    stamp: &DateTime<Tz>,
) -> anyhow::Result<Option<PathBuf>>
where
    Tz::Offset: std::fmt::Display,
{
    if log.is_empty() {
        tracing::info!("nothing to save");
        return Ok(None);
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create games directory {}", dir.display()))?;
    let path = dir.join(file_name(stamp));
    let mut text = log.join("\n");
    text.push('\n');
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), moves = log.len(), "saved game");
    Ok(Some(path))
}

/// Saved games in `dir`, sorted by name. A missing directory has none.
pub fn list(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry.with_context(|| format!("failed to read {}", dir.display()))?.path();
        let is_save = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
        if is_save && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads a saved game and replays it. Blank lines are ignored; the rest
/// follow the load policy of [`Game::load`].
pub fn load(path: &Path) -> anyhow::Result<Game> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    let game = Game::load(&lines);
    if game.history().len() < lines.len() {
        tracing::warn!(
            path = %path.display(),
            lines = lines.len(),
            played = game.history().len(),
            "saved game was only partly replayed"
        );
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arbiter-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn log(moves: &[&str]) -> Vec<String> {
        moves.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn file_names() {
        let stamp = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(file_name(&stamp), "game_20240309_070501.chess");
    }

    #[test]
    fn empty_log_is_not_saved() {
        let dir = scratch_dir("empty");
        assert_eq!(save(&dir, &[]).unwrap(), None);
        assert!(!dir.exists());
        assert!(list(&dir).unwrap().is_empty(), "missing directory lists as empty");
    }

    #[test]
    fn save_list_load() {
        let dir = scratch_dir("roundtrip");
        let first = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let second = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let moves = log(&["e2e4", "e7e5", "g1f3"]);
        let a = save_stamped(&dir, &moves, &first).unwrap().unwrap();
        let b = save_stamped(&dir, &moves[..1], &second).unwrap().unwrap();
        fs::write(dir.join("notes.txt"), "e2e4\n").unwrap();

        assert_eq!(fs::read_to_string(&a).unwrap(), "e2e4\ne7e5\ng1f3\n");
        assert_eq!(list(&dir).unwrap(), vec![b, a.clone()], "sorted by name, other files ignored");

        let game = load(&a).unwrap();
        assert_eq!(game.coordinate_log(), moves);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_keeps_the_valid_prefix() {
        let dir = scratch_dir("prefix");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("game_manual.chess");
        fs::write(&path, "e2e4\n\n  e7e5  \nxx\ne4e5\nd2d4\n").unwrap();
        let game = load(&path).unwrap();
        assert_eq!(game.coordinate_log(), log(&["e2e4", "e7e5"]), "e4e5 is blocked");
        assert!(load(&dir.join("absent.chess")).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
