//! Progress-callback trait for batch normalisation events.
//!
//! Pass an [`Arc<dyn BatchProgressCallback>`] to
//! [`crate::convert::normalize_batch`] to receive events as each file is
//! read and normalised. The CLI uses this to drive its progress bar.
//!
//! # Example
//!
//! ```rust
//! use mathdoc::BatchProgressCallback;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, file_num: usize, total_files: usize, segment_count: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("File {}/{} done ({} segments)", file_num, total_files, segment_count);
//!     }
//! }
//!
//! let counter: Arc<dyn BatchProgressCallback> = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//! counter.on_file_complete(1, 1, 3);
//! ```

use std::sync::Arc;

/// Called by [`crate::convert::normalize_batch`] as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// Files are processed concurrently, so `on_file_start`, `on_file_complete`
/// and `on_file_error` may be called from different tasks at the same time.
/// Protect shared mutable state with `Mutex` or atomics.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any file is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is read.
    ///
    /// # Arguments
    /// * `file_num`    — 1-indexed position of the file in the input list
    /// * `total_files` — number of files in the batch
    /// * `path`        — the path as given by the caller
    fn on_file_start(&self, file_num: usize, total_files: usize, path: &str) {
        let _ = (file_num, total_files, path);
    }

    /// Called when a file is normalised successfully.
    ///
    /// `segment_count` is the number of segments in the resulting document.
    fn on_file_complete(&self, file_num: usize, total_files: usize, segment_count: usize) {
        let _ = (file_num, total_files, segment_count);
    }

    /// Called when a file could not be processed.
    fn on_file_error(&self, file_num: usize, total_files: usize, error: &str) {
        let _ = (file_num, total_files, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the callback type accepted by the batch API.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
