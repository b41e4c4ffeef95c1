//! Sink implementations
//!
//! Contains AlignedFileWriter, LogSink, and the window tensor exporter.

mod aligned;
mod file;
mod log;
mod tensor;

pub use self::aligned::{render_aligned, AlignedFileWriter, ALIGNED_COLUMNS};
pub use self::file::{write_file, WriteMode};
pub use self::log::LogSink;
pub use self::tensor::WindowTensor;
