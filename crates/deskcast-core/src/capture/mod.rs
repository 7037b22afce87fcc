pub(crate) mod engine;
mod recording;
mod session;
pub(crate) mod source;
pub(crate) mod stream;

pub use {
    engine::{CaptureEngine, CaptureProfile},
    recording::Recording,
    session::{CaptureSession, SessionState},
    source::{Source, SourceKind, list_sources},
    stream::AcquiredStream,
};
