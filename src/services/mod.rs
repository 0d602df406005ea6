pub mod ingest;
pub use ingest::{IngestOutcome, IngestService};

pub mod reconciler;
pub use reconciler::{Pass, PassSummary, Reconciler, RecordError};

pub mod note_service;
pub mod note_service_impl;
pub use note_service::{NoteError, NoteInput, NoteService};
pub use note_service_impl::SeaOrmNoteService;
