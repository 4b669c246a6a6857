//! List unprocessed media use case

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::media::MediaObject;

use super::ports::{ObjectStore, ResultSink, SinkError, StorageError};

/// Errors from the listing use case
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Object listing failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not read processed files: {0}")]
    Sink(#[from] SinkError),
}

/// Output from the listing use case
#[derive(Debug, Clone, Default)]
pub struct ListOutput {
    /// Audio objects not yet in the results table, in listing order
    pub unprocessed: Vec<MediaObject>,
    /// Objects returned by the store
    pub listed: usize,
    /// Listed objects that are not supported audio
    pub skipped_non_audio: usize,
    /// Audio objects already in the results table
    pub already_processed: usize,
}

/// Finds audio objects that still need transcription
pub struct ListMediaUseCase<'a, O, S>
where
    O: ObjectStore,
    S: ResultSink,
{
    store: &'a O,
    sink: &'a S,
}

impl<'a, O, S> ListMediaUseCase<'a, O, S>
where
    O: ObjectStore,
    S: ResultSink,
{
    pub fn new(store: &'a O, sink: &'a S) -> Self {
        Self { store, sink }
    }

    /// List audio under `bucket/prefix` minus the keys already processed
    pub async fn execute(&self, bucket: &str, prefix: &str) -> Result<ListOutput, ListError> {
        let objects = self.store.list_objects(bucket, prefix).await?;
        let listed = objects.len();

        let audio: Vec<MediaObject> = objects.into_iter().filter(MediaObject::is_audio).collect();
        let skipped_non_audio = listed - audio.len();

        let processed = self.sink.processed_file_keys().await?;
        let output = exclude_processed(audio, &processed);

        info!(
            bucket,
            prefix,
            listed,
            unprocessed = output.unprocessed.len(),
            already_processed = output.already_processed,
            "listed audio files"
        );

        Ok(ListOutput {
            listed,
            skipped_non_audio,
            ..output
        })
    }
}

/// Left-exclusion of already processed keys
fn exclude_processed(audio: Vec<MediaObject>, processed: &HashSet<String>) -> ListOutput {
    let total = audio.len();
    let unprocessed: Vec<MediaObject> = audio
        .into_iter()
        .filter(|object| {
            let done = processed.contains(object.key());
            if done {
                debug!(key = object.key(), "already processed");
            }
            !done
        })
        .collect();

    ListOutput {
        already_processed: total - unprocessed.len(),
        unprocessed,
        ..Default::default()
    }
}
