//! Record sinks (CSV and JSON Lines) and game-list input.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::record::AnalysisRecord;
use crate::error::AppError;

/// A (match, player) pair waiting to be analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRef {
    #[serde(alias = "gameid")]
    pub match_id: String,
    pub player: String,
}

/// Destination for analysis records; also answers which matches it already holds.
pub trait RecordSink: Send + Sync {
    fn path(&self) -> &Path;

    fn append(&self, record: &AnalysisRecord) -> Result<(), AppError>;

    fn records(&self) -> Result<Vec<AnalysisRecord>, AppError>;

    fn seen_match_ids(&self) -> Result<HashSet<String>, AppError> {
        Ok(self
            .records()?
            .into_iter()
            .map(|record| record.match_id)
            .collect())
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// CSV for `.csv` paths, JSON Lines for anything else.
pub fn open_record_sink(path: impl Into<PathBuf>) -> Box<dyn RecordSink> {
    let path = path.into();
    if is_csv(&path) {
        Box::new(CsvRecords::new(path))
    } else {
        Box::new(JsonlFile::<AnalysisRecord>::new(path))
    }
}

/// Reads a game list: `gameid,player` CSV for `.csv` paths, JSON Lines otherwise.
pub fn read_game_list(path: &Path) -> Result<Vec<GameRef>, AppError> {
    if !is_csv(path) {
        return JsonlFile::<GameRef>::new(path).read_all();
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut games = Vec::new();
    for (idx, row) in reader.deserialize::<GameRef>().enumerate() {
        match row {
            Ok(game) => games.push(game),
            Err(e) => warn!("Failed to parse row {} in {:?}: {}", idx + 2, path, e),
        }
    }
    Ok(games)
}

fn ensure_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Line-per-entity JSON file.
pub struct JsonlFile<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonlFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlFile {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize> JsonlFile<T> {
    pub fn append(&self, entity: &T) -> Result<(), AppError> {
        ensure_parent(&self.path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }
}

impl<T: DeserializeOwned> JsonlFile<T> {
    /// Reads every parsable line; a missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entities = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        Ok(entities)
    }
}

impl RecordSink for JsonlFile<AnalysisRecord> {
    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        JsonlFile::append(self, record)
    }

    fn records(&self) -> Result<Vec<AnalysisRecord>, AppError> {
        self.read_all()
    }
}

/// Appendable CSV table with an `AnalysisRecord::COLUMNS` header.
/// Unavailable values are empty cells.
pub struct CsvRecords {
    path: PathBuf,
}

impl CsvRecords {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvRecords { path: path.into() }
    }
}

impl RecordSink for CsvRecords {
    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        ensure_parent(&self.path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(AnalysisRecord::COLUMNS)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        debug!("Appended row to {:?}", self.path);
        Ok(())
    }

    fn records(&self) -> Result<Vec<AnalysisRecord>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<AnalysisRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => warn!("Failed to parse row {} in {:?}: {}", idx + 2, self.path, e),
            }
        }
        Ok(records)
    }

    /// Only the `match_id` column is read, so rows from an older column
    /// layout still count as seen.
    fn seen_match_ids(&self) -> Result<HashSet<String>, AppError> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let Some(column) = reader.headers()?.iter().position(|h| h == "match_id") else {
            warn!("{:?} has no match_id column", self.path);
            return Ok(HashSet::new());
        };

        let mut seen = HashSet::new();
        for row in reader.records() {
            match row {
                Ok(row) => {
                    if let Some(id) = row.get(column).filter(|id| !id.is_empty()) {
                        seen.insert(id.to_string());
                    }
                }
                Err(e) => warn!("Skipping unreadable row in {:?}: {}", self.path, e),
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(match_id: &str) -> AnalysisRecord {
        AnalysisRecord {
            match_id: match_id.to_string(),
            player: "TLDaBaby".to_string(),
            champion: "Brand".to_string(),
            own_side_won: true,
            player_ranked_win_rate: None,
            player_incapacitation_ratio: Some(0.1),
            player_one_trick: false,
            player_off_mode_heavy: None,
            player_win_streak: Some(2),
            player_filtered_matches: 5,
            smurf_count_own: 0,
            smurf_count_opposing: 1,
            hot_streak_count_own: 0,
            hot_streak_count_opposing: 0,
            veteran_count_own: 0,
            veteran_count_opposing: 0,
            inter_count_own: 1,
            inter_count_opposing: 0,
            break_count_own: 0,
            break_count_opposing: 0,
            off_mode_count_own: 0,
            off_mode_count_opposing: 0,
            ranked_wr_median_own: None,
            ranked_wr_min_own: None,
            ranked_wr_max_own: None,
            ranked_wr_median_opposing: Some(0.5),
            ranked_wr_min_opposing: Some(0.4),
            ranked_wr_max_opposing: Some(0.6),
            highest_median_kda_own: Some(3.0),
            highest_median_kda_opposing: Some(5.0),
            skipped_match_fetches: 0,
            short_window_profiles: 1,
            standing_unavailable_profiles: 0,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlFile::<AnalysisRecord>::new(temp_dir.path().join("nested/records.jsonl"));

        sink.append(&record("NA1_1")).unwrap();
        sink.append(&record("NA1_2")).unwrap();

        let read = sink.read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0], record("NA1_1"));
    }

    #[test]
    fn test_unavailable_fields_are_null() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlFile::<AnalysisRecord>::new(temp_dir.path().join("records.jsonl"));
        sink.append(&record("NA1_1")).unwrap();

        let line = fs::read_to_string(sink.path()).unwrap();
        assert!(line.contains("\"player_ranked_win_rate\":null"));
        assert!(line.contains("\"ranked_wr_min_opposing\":0.4"));
    }

    #[test]
    fn test_seen_match_ids_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonlFile::<AnalysisRecord>::new(temp_dir.path().join("records.jsonl"));
        sink.append(&record("NA1_1")).unwrap();
        let mut file = OpenOptions::new().append(true).open(sink.path()).unwrap();
        writeln!(file, "not-valid-json").unwrap();
        sink.append(&record("NA1_2")).unwrap();

        let seen = sink.seen_match_ids().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("NA1_2"));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let games: JsonlFile<GameRef> = JsonlFile::new(temp_dir.path().join("games.jsonl"));
        assert!(games.read_all().unwrap().is_empty());

        let csv = CsvRecords::new(temp_dir.path().join("records.csv"));
        assert!(csv.records().unwrap().is_empty());
        assert!(csv.seen_match_ids().unwrap().is_empty());
    }

    #[test]
    fn test_csv_header_written_once_in_column_order() {
        let temp_dir = TempDir::new().unwrap();
        let sink = CsvRecords::new(temp_dir.path().join("out/records.csv"));

        sink.append(&record("NA1_1")).unwrap();
        sink.append(&record("NA1_2")).unwrap();

        let text = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], AnalysisRecord::COLUMNS.join(","));
        assert!(lines[1].starts_with("NA1_1,TLDaBaby,Brand,true,,0.1,false,,2,5,"));
    }

    #[test]
    fn test_csv_unavailable_values_are_empty_cells() {
        let temp_dir = TempDir::new().unwrap();
        let sink = CsvRecords::new(temp_dir.path().join("records.csv"));
        sink.append(&record("NA1_1")).unwrap();

        let mut reader = csv::Reader::from_path(sink.path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();
        let cell = |name: &str| {
            let idx = headers.iter().position(|h| h == name).unwrap();
            row.get(idx).unwrap().to_string()
        };

        assert_eq!(cell("player_ranked_win_rate"), "");
        assert_eq!(cell("ranked_wr_median_own"), "");
        assert_eq!(cell("ranked_wr_min_opposing"), "0.4");
        assert_eq!(cell("smurf_count_opposing"), "1");

        assert_eq!(sink.records().unwrap(), vec![record("NA1_1")]);
    }

    #[test]
    fn test_csv_seen_match_ids_only_needs_the_id_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.csv");
        fs::write(&path, "match_id,player\nNA1_1,a\nNA1_2,b,extra\n,c\n").unwrap();

        let seen = CsvRecords::new(&path).seen_match_ids().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("NA1_1"));
        assert!(seen.contains("NA1_2"));
    }

    #[test]
    fn test_sink_format_follows_extension() {
        let temp_dir = TempDir::new().unwrap();
        let csv = open_record_sink(temp_dir.path().join("records.CSV"));
        let jsonl = open_record_sink(temp_dir.path().join("records.jsonl"));

        csv.append(&record("NA1_1")).unwrap();
        jsonl.append(&record("NA1_1")).unwrap();

        assert!(fs::read_to_string(csv.path()).unwrap().starts_with("match_id,player,"));
        assert!(fs::read_to_string(jsonl.path()).unwrap().starts_with('{'));
    }

    #[test]
    fn test_read_csv_game_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("games.csv");
        fs::write(&path, "gameid,player\nNA1_1, TL DaBaby\nbroken\nNA1_2,E1\n").unwrap();

        let games = read_game_list(&path).unwrap();
        assert_eq!(
            games,
            vec![
                GameRef {
                    match_id: "NA1_1".to_string(),
                    player: "TL DaBaby".to_string(),
                },
                GameRef {
                    match_id: "NA1_2".to_string(),
                    player: "E1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_read_jsonl_game_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("games.jsonl");
        fs::write(&path, "{\"match_id\":\"NA1_1\",\"player\":\"E1\"}\n").unwrap();

        assert_eq!(read_game_list(&path).unwrap().len(), 1);
    }
}
