use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: u32,
    pub name: String,
}

/// Flat-file top-N score table. One `<score>;<name>` entry per line, kept
/// sorted descending on disk. Single-process, single-writer: every save is
/// a full rewrite.
pub struct ScoreBoard {
    path: PathBuf,
    limit: usize,
}

impl ScoreBoard {
    pub fn new(path: PathBuf, limit: usize) -> Self {
        Self { path, limit }
    }

    /// Reads the table. A missing file is an empty table; malformed lines
    /// are skipped. The result is sorted descending by score.
    pub fn load(&self) -> io::Result<Vec<ScoreEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut entries: Vec<ScoreEntry> = text.lines().filter_map(parse_line).collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }

    /// Inserts one result and rewrites the file with the top entries only.
    pub fn save(&self, score: u32, name: &str) -> io::Result<()> {
        let mut entries = self.load()?;
        entries.push(ScoreEntry {
            score,
            name: name.to_string(),
        });
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(self.limit);

        let mut text = String::new();
        for e in &entries {
            text.push_str(&format!("{};{}\n", e.score, e.name));
        }
        fs::write(&self.path, text)
    }

    /// Highest stored score, shown as "best" on the game-over panel.
    pub fn best(&self) -> u32 {
        self.load()
            .ok()
            .and_then(|entries| entries.first().map(|e| e.score))
            .unwrap_or(0)
    }
}

fn parse_line(line: &str) -> Option<ScoreEntry> {
    let (score, name) = line.split_once(';')?;
    let score = score.trim().parse().ok()?;
    Some(ScoreEntry {
        score,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn board(dir: &tempfile::TempDir) -> ScoreBoard {
        ScoreBoard::new(dir.path().join("highscores.txt"), 10)
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(board(&dir).load().unwrap(), Vec::new());
        assert_eq!(board(&dir).best(), 0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let b = board(&dir);
        fs::write(dir.path().join("highscores.txt"), "10;Ann\n5;Bob\ninvalid_line\n").unwrap();
        let entries = b.load().unwrap();
        assert_eq!(
            entries,
            vec![
                ScoreEntry {
                    score: 10,
                    name: "Ann".into()
                },
                ScoreEntry {
                    score: 5,
                    name: "Bob".into()
                },
            ]
        );
    }

    #[test]
    fn load_sorts_descending() {
        let dir = tempdir().unwrap();
        let b = board(&dir);
        fs::write(dir.path().join("highscores.txt"), "3;C\n9;A\n5;B\n").unwrap();
        let scores: Vec<u32> = b.load().unwrap().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![9, 5, 3]);
    }

    #[test]
    fn save_round_trip() {
        let dir = tempdir().unwrap();
        let b = board(&dir);
        b.save(5, "A").unwrap();
        b.save(12, "B").unwrap();
        let entries = b.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].score, 12);
        assert_eq!(entries[0].name, "B");
        assert_eq!(entries[1].score, 5);
        assert_eq!(entries[1].name, "A");
        assert_eq!(b.best(), 12);
    }

    #[test]
    fn table_is_truncated_to_the_top_ten() {
        let dir = tempdir().unwrap();
        let b = board(&dir);
        for score in 1..=11 {
            b.save(score, "P").unwrap();
        }
        let entries = b.load().unwrap();
        assert_eq!(entries.len(), 10);
        let scores: Vec<u32> = entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, (2..=11).rev().collect::<Vec<u32>>());
        // Score 1 fell off the table and is gone from disk too.
        let text = fs::read_to_string(dir.path().join("highscores.txt")).unwrap();
        assert_eq!(text.lines().count(), 10);
        assert!(!text.lines().any(|l| l == "1;P"));
    }

    #[test]
    fn ties_keep_earlier_entries_first() {
        let dir = tempdir().unwrap();
        let b = board(&dir);
        b.save(7, "first").unwrap();
        b.save(7, "second").unwrap();
        let entries = b.load().unwrap();
        assert_eq!(entries[0].name, "first");
        assert_eq!(entries[1].name, "second");
    }
}
