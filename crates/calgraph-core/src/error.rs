use thiserror::Error;

/// Failure taxonomy for loading calendar files.
///
/// Per-event problems (an event missing DTSTART/DTEND) never surface here;
/// those events are skipped during ingestion and the rest of the file is
/// aggregated normally. An empty filter result is not an error either, it
/// yields a zero-valued statistics snapshot.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("could not read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {reason}")]
    Parse { path: String, reason: String },
}
