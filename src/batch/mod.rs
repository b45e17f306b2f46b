//! # Batch Module
//!
//! Runs parse and fingerprint extraction over many files.
//!
//! Every file is independent: its bytes are read, decoded and reduced without
//! touching shared mutable state, so files are processed in parallel on a
//! bounded rayon pool (feature `parallel`). A failing file becomes a
//! [`FileOutcome::Failed`] and the batch moves on. Outcomes are returned in
//! input order.
//!
//! Cancellation is cooperative: once a [`CancelToken`] fires, files that have
//! not started yet are reported as [`FileOutcome::Cancelled`]; files already in
//! flight run to completion.

mod report;


use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::fingerprint::{Fingerprint, FingerprintConfig, FingerprintError, FingerprintExtractor};
use crate::spectrum::Spectrum;
use crate::wdf::BlockRegistry;

pub use report::{BatchReport, FileStatus, ReportEntry};

/// Per-file failure in a batch
#[derive(Error, Debug)]
pub enum BatchError {
    /// The file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The bytes did not decode to a spectrum
    #[error(transparent)]
    Decode(#[from] crate::Error),
}

impl BatchError {
    /// Decode error kind, if this is a decode failure
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            BatchError::Decode(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Category name used when tallying failures
    pub fn category(&self) -> &'static str {
        match self {
            BatchError::Io { .. } => "io",
            BatchError::Decode(e) => e.kind().name(),
        }
    }
}

/// Shared flag that stops a batch from starting further files
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop scheduling new files
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result for one input file
#[derive(Debug)]
pub enum FileOutcome {
    /// Decoded and fingerprinted
    Completed {
        /// Input path
        path: PathBuf,
        /// Decoded spectrum
        spectrum: Spectrum,
        /// Extracted fingerprint (possibly empty)
        fingerprint: Fingerprint,
    },
    /// Aborted by an error
    Failed {
        /// Input path
        path: PathBuf,
        /// What went wrong
        error: BatchError,
    },
    /// Not started because the batch was cancelled
    Cancelled {
        /// Input path
        path: PathBuf,
    },
}

impl FileOutcome {
    /// Input path
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Completed { path, .. }
            | FileOutcome::Failed { path, .. }
            | FileOutcome::Cancelled { path } => path,
        }
    }

    /// True for [`FileOutcome::Completed`]
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Completed { .. })
    }

    /// Spectrum of a completed file
    pub fn spectrum(&self) -> Option<&Spectrum> {
        match self {
            FileOutcome::Completed { spectrum, .. } => Some(spectrum),
            _ => None,
        }
    }

    /// Fingerprint of a completed file
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            FileOutcome::Completed { fingerprint, .. } => Some(fingerprint),
            _ => None,
        }
    }

    /// Error of a failed file
    pub fn error(&self) -> Option<&BatchError> {
        match self {
            FileOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Batch settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; `None` or zero uses one per core
    pub jobs: Option<usize>,
}

/// Processes files with a shared, validated configuration.
pub struct BatchDriver {
    extractor: FingerprintExtractor,
    registry: &'static BlockRegistry,
    options: BatchOptions,
    cancel: CancelToken,
}

impl BatchDriver {
    /// Validate `config` and build a driver using the standard block registry.
    pub fn new(config: FingerprintConfig, options: BatchOptions) -> Result<Self, FingerprintError> {
        Ok(Self {
            extractor: FingerprintExtractor::new(config)?,
            registry: BlockRegistry::standard(),
            options,
            cancel: CancelToken::new(),
        })
    }

    /// Use a custom block registry.
    pub fn with_registry(mut self, registry: &'static BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Share an existing cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this driver's batches
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Fingerprint configuration in use
    pub fn config(&self) -> &FingerprintConfig {
        self.extractor.config()
    }

    /// Decode and fingerprint an in-memory buffer.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<(Spectrum, Fingerprint), crate::Error> {
        let spectrum = crate::parse_with(bytes, self.registry)?;
        let fingerprint = self.extractor.extract(&spectrum);
        Ok((spectrum, fingerprint))
    }

    /// Read, decode and fingerprint one file.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let path_buf = path.to_path_buf();
        if self.cancel.is_cancelled() {
            return FileOutcome::Cancelled { path: path_buf };
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                return FileOutcome::Failed {
                    error: BatchError::Io {
                        path: path_buf.clone(),
                        source,
                    },
                    path: path_buf,
                }
            }
        };

        match self.process_bytes(&bytes) {
            Ok((spectrum, fingerprint)) => {
                debug!(
                    "{}: {} samples, {} bands",
                    path.display(),
                    spectrum.len(),
                    fingerprint.len()
                );
                FileOutcome::Completed {
                    path: path_buf,
                    spectrum,
                    fingerprint,
                }
            }
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                FileOutcome::Failed {
                    path: path_buf,
                    error: e.into(),
                }
            }
        }
    }

    /// Process every path, returning one outcome per input in input order.
    pub fn run<P>(&self, paths: &[P]) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
    {
        info!("Processing {} files", paths.len());
        let done = AtomicUsize::new(0);
        let total = paths.len();

        let process = |path: &P| {
            let outcome = self.process_file(path.as_ref());
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % 100 == 0 {
                info!("Processed {}/{} files", finished, total);
            }
            outcome
        };

        let outcomes = self.dispatch(paths, process);

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            "Batch finished: {} succeeded, {} failed or cancelled",
            succeeded,
            outcomes.len() - succeeded
        );
        outcomes
    }

    /// Process every path and summarize the outcomes.
    pub fn run_report<P>(&self, paths: &[P]) -> (Vec<FileOutcome>, BatchReport)
    where
        P: AsRef<Path> + Sync,
    {
        let outcomes = self.run(paths);
        let report = BatchReport::from_outcomes(&outcomes);
        (outcomes, report)
    }

    #[cfg(feature = "parallel")]
    fn dispatch<P, F>(&self, paths: &[P], process: F) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&P) -> FileOutcome + Sync + Send,
    {
        use rayon::prelude::*;

        let threads = self.options.jobs.unwrap_or(0);
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| paths.par_iter().map(&process).collect()),
            Err(e) => {
                warn!("Could not build worker pool ({}), processing sequentially", e);
                paths.iter().map(process).collect()
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn dispatch<P, F>(&self, paths: &[P], process: F) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&P) -> FileOutcome + Sync + Send,
    {
        if self.options.jobs.is_some_and(|jobs| jobs > 1) {
            warn!("Built without the `parallel` feature; processing sequentially");
        }
        paths.iter().map(process).collect()
    }
}
