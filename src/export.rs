//! Lap history export.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use csv::WriterBuilder;
use log::info;

use crate::error::{ClockError, Result};
use crate::format::format_millis;
use crate::lap_timer::{FinishedSession, LapRecord};

const SESSION_NAME_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Everything an exporter needs about one finished session.
#[derive(Debug, Clone)]
pub struct SessionExport<'a> {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub records: &'a [LapRecord],
}

impl<'a> SessionExport<'a> {
    /// Timestamps are Unix milliseconds; an empty `name` takes the default.
    pub fn from_session(session: &'a FinishedSession, name: Option<&str>) -> Self {
        let started_at = utc_from_millis(session.started_at_ms);
        let ended_at = utc_from_millis(session.finished_at_ms);
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => default_session_name(&started_at.with_timezone(&Local)),
        };
        Self {
            name,
            started_at,
            ended_at,
            records: &session.records,
        }
    }

    pub fn total_ms(&self) -> u64 {
        (self.ended_at - self.started_at).num_milliseconds().max(0) as u64
    }
}

fn utc_from_millis(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or_default()
}

/// `YYYY-MM-DD_HH-MM` in the timestamp's own zone.
pub fn default_session_name<Tz: TimeZone>(start: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    start.format(SESSION_NAME_FORMAT).to_string()
}

pub trait SessionExporter {
    /// Write the session and return where it went.
    fn export(&self, session: &SessionExport<'_>) -> Result<PathBuf>;
}

/// Writes `<name>.csv` into a directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(name: &str) -> String {
        let safe: String = name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '_',
                c => c,
            })
            .collect();
        format!("{safe}.csv")
    }
}

impl SessionExporter for CsvExporter {
    fn export(&self, session: &SessionExport<'_>) -> Result<PathBuf> {
        if session.records.is_empty() {
            return Err(ClockError::NothingToExport);
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(&session.name));

        let started = session.started_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let ended = session.ended_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let total = format_millis(session.total_ms());

        let mut file = File::create(&path)?;
        {
            let mut meta = WriterBuilder::new().flexible(true).from_writer(&mut file);
            meta.write_record(["Session Name", session.name.as_str()])?;
            meta.write_record(["Session Start", started.as_str()])?;
            meta.write_record(["Session End", ended.as_str()])?;
            meta.write_record(["Total Duration", total.as_str()])?;
            meta.flush()?;
        }
        file.write_all(b"\n")?;

        let mut wtr = WriterBuilder::new().from_writer(&mut file);
        wtr.write_record(["Number", "Type", "Duration", "Milliseconds"])?;
        for (i, record) in session.records.iter().enumerate() {
            let number = record.sequence_number.unwrap_or(i as u32 + 1);
            wtr.write_record([
                number.to_string(),
                record.kind.to_string(),
                format_millis(record.elapsed_ms),
                record.elapsed_ms.to_string(),
            ])?;
        }
        wtr.flush()?;

        info!(
            "exported {} records to {}",
            session.records.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lap_timer::LapKind;
    use assert_matches::assert_matches;
    use chrono::FixedOffset;
    use tempfile::tempdir;

    // 2024-03-05T14:07:00Z
    const START_MS: u64 = 1_709_647_620_000;

    fn session() -> FinishedSession {
        FinishedSession {
            records: vec![
                LapRecord {
                    kind: LapKind::Lap,
                    elapsed_ms: 5_000,
                    sequence_number: Some(1),
                },
                LapRecord {
                    kind: LapKind::Rest,
                    elapsed_ms: 3_000,
                    sequence_number: None,
                },
                LapRecord {
                    kind: LapKind::Lap,
                    elapsed_ms: 61_400,
                    sequence_number: Some(2),
                },
            ],
            started_at_ms: START_MS,
            finished_at_ms: START_MS + 69_400,
        }
    }

    #[test]
    fn writes_metadata_and_rows() {
        let dir = tempdir().unwrap();
        let finished = session();
        let export = SessionExport::from_session(&finished, Some("morning"));
        let path = CsvExporter::new(dir.path()).export(&export).unwrap();
        assert_eq!(path, dir.path().join("morning.csv"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Session Name,morning",
                "Session Start,2024-03-05T14:07:00.000Z",
                "Session End,2024-03-05T14:08:09.400Z",
                "Total Duration,01:09.4",
                "",
                "Number,Type,Duration,Milliseconds",
                "1,lap,00:05.0,5000",
                "2,rest,00:03.0,3000",
                "2,lap,01:01.4,61400",
            ]
        );
    }

    #[test]
    fn empty_history_is_refused() {
        let dir = tempdir().unwrap();
        let finished = FinishedSession {
            records: Vec::new(),
            started_at_ms: START_MS,
            finished_at_ms: START_MS,
        };
        let export = SessionExport::from_session(&finished, None);
        assert_matches!(
            CsvExporter::new(dir.path()).export(&export),
            Err(ClockError::NothingToExport)
        );
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn blank_name_falls_back_to_start_time() {
        let finished = session();
        let export = SessionExport::from_session(&finished, Some("   "));
        let expected =
            default_session_name(&utc_from_millis(START_MS).with_timezone(&Local));
        assert_eq!(export.name, expected);
    }

    #[test]
    fn default_name_format() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = utc_from_millis(START_MS).with_timezone(&tz);
        assert_eq!(default_session_name(&start), "2024-03-05_16-07");
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(CsvExporter::file_name("a/b:c"), "a_b_c.csv");
    }
}
