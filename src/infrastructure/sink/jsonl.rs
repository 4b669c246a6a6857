//! JSON-lines results table sink
//!
//! Each table is one `.jsonl` file under the results directory. The raw table
//! is appended to; derived tables are written to a temporary file and renamed
//! over the old one, so readers never see a half-written table.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::application::ports::{ResultSink, SinkError};
use crate::domain::tables::{CallTranscript, SpeakerUtterance, TranscriptRecord};

pub const RAW_TABLE: &str = "raw_transcriptions";
pub const CALLS_TABLE: &str = "call_transcripts";
pub const UTTERANCES_TABLE: &str = "speaker_utterances";

/// Default results directory under the XDG data home
pub fn default_results_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("batch-scribe")
        .join("tables")
}

/// Results tables stored as JSON-lines files
pub struct JsonlTableSink {
    dir: PathBuf,
}

impl JsonlTableSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", table))
    }

    fn io_error(table: &str, error: std::io::Error) -> SinkError {
        SinkError::Io {
            table: table.to_string(),
            message: error.to_string(),
        }
    }

    fn encode<T: Serialize>(table: &str, rows: &[T]) -> Result<String, SinkError> {
        let mut out = String::new();
        for row in rows {
            let line = serde_json::to_string(row).map_err(|e| SinkError::Serialize {
                table: table.to_string(),
                message: e.to_string(),
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    async fn ensure_dir(&self, table: &str) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(table, e))
    }

    /// All rows of a table. A missing table has no rows.
    async fn read_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, SinkError> {
        let content = match fs::read_to_string(self.table_path(table)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(table, e)),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| SinkError::Corrupt {
                    table: table.to_string(),
                    line: index + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    async fn replace_table<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), SinkError> {
        let content = Self::encode(table, rows)?;
        self.ensure_dir(table).await?;

        let path = self.table_path(table);
        let tmp = path.with_extension("jsonl.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| Self::io_error(table, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| Self::io_error(table, e))?;

        debug!(table, rows = rows.len(), "table replaced");
        Ok(())
    }
}

#[async_trait]
impl ResultSink for JsonlTableSink {
    async fn processed_file_keys(&self) -> Result<HashSet<String>, SinkError> {
        let rows: Vec<TranscriptRecord> = self.read_table(RAW_TABLE).await?;
        Ok(rows.into_iter().filter_map(|r| r.file_key).collect())
    }

    async fn append_transcripts(&self, records: &[TranscriptRecord]) -> Result<(), SinkError> {
        let content = Self::encode(RAW_TABLE, records)?;
        self.ensure_dir(RAW_TABLE).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(RAW_TABLE))
            .await
            .map_err(|e| Self::io_error(RAW_TABLE, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Self::io_error(RAW_TABLE, e))?;
        file.flush()
            .await
            .map_err(|e| Self::io_error(RAW_TABLE, e))?;

        debug!(rows = records.len(), "appended raw transcripts");
        Ok(())
    }

    async fn load_transcripts(&self) -> Result<Vec<TranscriptRecord>, SinkError> {
        self.read_table(RAW_TABLE).await
    }

    async fn replace_call_transcripts(&self, rows: &[CallTranscript]) -> Result<(), SinkError> {
        self.replace_table(CALLS_TABLE, rows).await
    }

    async fn replace_speaker_utterances(
        &self,
        rows: &[SpeakerUtterance],
    ) -> Result<(), SinkError> {
        self.replace_table(UTTERANCES_TABLE, rows).await
    }

    async fn load_speaker_utterances(&self) -> Result<Vec<SpeakerUtterance>, SinkError> {
        self.read_table(UTTERANCES_TABLE).await
    }
}
