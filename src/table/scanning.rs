//! Depth-first directory scanning for swap roots.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use same_file::Handle;

use crate::error::{Result, SwapperError};
use crate::models::{ScanEntry, ScanOutcome, ScanRoot, SkippedPath};

/// Open `root` for a lazy, depth-first scan.
///
/// Fails with [`SwapperError::ScanRootUnreadable`] when the root itself cannot be read.
/// Problems below the root are yielded as `Err` items and the walk carries on.
pub fn scan(root: &Path) -> Result<DirectoryScanner> {
  DirectoryScanner::open(root)
}

/// Scan a configured root to completion, collecting entries and skipped paths.
pub fn scan_root(root: &ScanRoot) -> Result<ScanOutcome> {
  let absolute = std::path::absolute(&root.path).map_err(|source| {
    SwapperError::ScanRootUnreadable {
      path: root.path.clone(),
      source,
    }
  })?;

  let mut outcome = ScanOutcome::empty(ScanRoot {
    path: absolute.clone(),
    ..root.clone()
  });

  for item in scan(&absolute)? {
    match item {
      Ok(entry) => outcome.entries.push(entry),
      Err(error) => match SkippedPath::from_error(&error) {
        Some(skipped) => outcome.skipped.push(skipped),
        None => tracing::debug!(%error, "unexpected scan error"),
      },
    }
  }

  Ok(outcome)
}

/// Lazy depth-first walk over a directory tree.
///
/// Siblings are visited in file-name order and every sibling is visited, whatever its
/// type. Symlinked directories are followed; a directory that is already on the current
/// descent path is reported as [`SwapperError::CycleDetected`] instead of being entered.
pub struct DirectoryScanner {
  stack: Vec<Frame>,
  queued: VecDeque<SwapperError>,
}

struct Frame {
  dir: PathBuf,
  relative: PathBuf,
  identity: Handle,
  pending: std::vec::IntoIter<OsString>,
}

impl Frame {
  fn open(
    dir: &Path,
    relative: PathBuf,
    identity: Handle,
  ) -> std::io::Result<(Self, Vec<SwapperError>)> {
    let mut names = Vec::new();
    let mut errors = Vec::new();

    for entry in fs::read_dir(dir)? {
      match entry {
        Ok(entry) => names.push(entry.file_name()),
        Err(source) => errors.push(SwapperError::EntryUnreadable {
          path: dir.to_path_buf(),
          source,
        }),
      }
    }
    names.sort();

    let frame = Self {
      dir: dir.to_path_buf(),
      relative,
      identity,
      pending: names.into_iter(),
    };
    Ok((frame, errors))
  }
}

impl DirectoryScanner {
  fn open(root: &Path) -> Result<Self> {
    let unreadable = |source| SwapperError::ScanRootUnreadable {
      path: root.to_path_buf(),
      source,
    };

    let identity = Handle::from_path(root).map_err(unreadable)?;
    let (frame, errors) = Frame::open(root, PathBuf::new(), identity).map_err(unreadable)?;

    Ok(Self {
      stack: vec![frame],
      queued: errors.into(),
    })
  }

  fn descend(&mut self, dir: &Path, relative: &Path) -> Result<()> {
    let unreadable = |source| SwapperError::EntryUnreadable {
      path: dir.to_path_buf(),
      source,
    };

    let identity = Handle::from_path(dir).map_err(unreadable)?;
    if self.stack.iter().any(|frame| frame.identity == identity) {
      return Err(SwapperError::CycleDetected {
        path: dir.to_path_buf(),
      });
    }

    let (frame, errors) =
      Frame::open(dir, relative.to_path_buf(), identity).map_err(unreadable)?;
    self.stack.push(frame);
    self.queued.extend(errors);
    Ok(())
  }
}

impl Iterator for DirectoryScanner {
  type Item = Result<ScanEntry>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(error) = self.queued.pop_front() {
        return Some(Err(error));
      }

      let frame = self.stack.last_mut()?;
      let Some(name) = frame.pending.next() else {
        self.stack.pop();
        continue;
      };

      let path = frame.dir.join(&name);
      let relative_path = frame.relative.join(&name);

      let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(source) => return Some(Err(SwapperError::EntryUnreadable { path, source })),
      };

      if metadata.is_dir() {
        if let Err(error) = self.descend(&path, &relative_path) {
          return Some(Err(error));
        }
        return Some(Ok(ScanEntry {
          path,
          relative_path,
          is_directory: true,
        }));
      }

      if metadata.is_file() {
        return Some(Ok(ScanEntry {
          path,
          relative_path,
          is_directory: false,
        }));
      }
    }
  }
}
