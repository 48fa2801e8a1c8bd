use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Result, SwapperError};

const FILE_SCHEME: &str = "file:";

/// Convert an absolute file path into a locator served through `scheme`.
///
/// The locator is the path's `file:` URL with the scheme swapped, so it keeps the
/// percent-encoding and drive handling of [`Url::from_file_path`].
pub fn file_locator(path: &Path, scheme: &str) -> Result<String> {
  let url = Url::from_file_path(path).map_err(|_| SwapperError::MalformedPattern {
    path: path.to_path_buf(),
    reason: "path cannot be expressed as a file URL".to_string(),
  })?;

  let rest = url.as_str().strip_prefix(FILE_SCHEME).unwrap_or(url.as_str());
  Ok(format!("{scheme}:{rest}"))
}

/// Resolve a locator produced by [`file_locator`] back into the file path it names.
pub fn locator_to_path(locator: &str, scheme: &str) -> Result<PathBuf> {
  let invalid = |reason: &str| SwapperError::InvalidLocator {
    locator: locator.to_string(),
    reason: reason.to_string(),
  };

  let rest = locator
    .split_once(':')
    .filter(|(prefix, _)| prefix.eq_ignore_ascii_case(scheme))
    .map(|(_, rest)| rest)
    .ok_or_else(|| invalid("unexpected scheme"))?;

  let url = Url::parse(&format!("{FILE_SCHEME}{rest}"))
    .map_err(|err| invalid(&format!("not a valid URL: {err}")))?;
  url
    .to_file_path()
    .map_err(|_| invalid("does not name a local file"))
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  #[test]
  fn swaps_the_file_scheme() {
    let locator = file_locator(Path::new("/swap/models/gun.obj"), "swapper").unwrap();
    assert_eq!(locator, "swapper:///swap/models/gun.obj");
  }

  #[test]
  fn encodes_spaces_and_resolves_them_back() {
    let path = Path::new("/swap/sound/big gun.mp3");
    let locator = file_locator(path, "swapper").unwrap();
    assert_eq!(locator, "swapper:///swap/sound/big%20gun.mp3");
    assert_eq!(locator_to_path(&locator, "swapper").unwrap(), path);
  }

  #[test]
  fn relative_paths_have_no_locator() {
    let err = file_locator(Path::new("models/gun.obj"), "swapper").unwrap_err();
    assert!(matches!(err, SwapperError::MalformedPattern { .. }));
  }

  #[test]
  fn rejects_foreign_schemes() {
    let err = locator_to_path("https://example.io/a.png", "swapper").unwrap_err();
    assert!(matches!(err, SwapperError::InvalidLocator { .. }));
  }
}
