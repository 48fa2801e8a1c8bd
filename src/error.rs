//! Error taxonomy shared by the scanner, table builder and interceptor.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::interceptor::FilterRejected;

/// Failures surfaced by the swapper core.
///
/// None of these abort application startup. Scan and table errors are turned into
/// [`crate::models::Diagnostic`] records and the affected entry is simply not swapped.
#[derive(Error, Debug)]
pub enum SwapperError {
  /// The configured root directory could not be opened.
  #[error("scan root {} is unreadable: {source}", .path.display())]
  ScanRootUnreadable {
    /// Root that failed to open.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
  /// A directory links back to one of its own ancestors.
  #[error("directory cycle detected at {}", .path.display())]
  CycleDetected {
    /// Directory whose identity was already on the descent path.
    path: PathBuf,
  },
  /// An entry below the root could not be read.
  #[error("failed to read {}: {source}", .path.display())]
  EntryUnreadable {
    /// Entry that failed.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
  /// A file maps to a pattern that an earlier entry already claimed.
  #[error("pattern {pattern} already mapped to {}", .existing.display())]
  PatternCollision {
    /// Pattern both files map to.
    pattern: String,
    /// File that keeps the mapping.
    existing: PathBuf,
    /// File that was dropped.
    rejected: PathBuf,
  },
  /// A path cannot be expressed as a request pattern.
  #[error("cannot build a pattern for {}: {reason}", .path.display())]
  MalformedPattern {
    /// Offending file.
    path: PathBuf,
    /// Why it was rejected.
    reason: String,
  },
  /// The browser engine refused the request filter.
  #[error(transparent)]
  FilterRegistrationRejected(#[from] FilterRejected),
  /// A `swapper:` locator could not be turned back into a file path.
  #[error("invalid locator {locator}: {reason}")]
  InvalidLocator {
    /// Locator as received from the engine.
    locator: String,
    /// Why it could not be resolved.
    reason: String,
  },
  /// Failed to read a configuration file.
  #[error("failed to read {}: {source}", .path.display())]
  ConfigIo {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: io::Error,
  },
  /// Failed to parse a configuration file.
  #[error("failed to parse {}: {source}", .path.display())]
  ConfigParse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SwapperError>;
