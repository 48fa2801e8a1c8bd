use std::path::{Component, Path};

use crate::error::{Result, SwapperError};

/// Characters that carry meaning inside request patterns or URLs.
const RESERVED: [char; 3] = ['*', '?', '#'];

/// Produce the URL path suffix for a file discovered below `root`.
///
/// The result always starts with `/` and uses forward slashes regardless of the native
/// separator. Paths outside the root, with parent components, non UTF-8 names or any of
/// the reserved pattern characters are rejected as [`SwapperError::MalformedPattern`].
/// Outside Windows a `\` is part of the file name, so it is rejected too rather than
/// read as a separator.
pub fn relative_url_path(root: &Path, file: &Path) -> Result<String> {
  let malformed = |reason: &str| SwapperError::MalformedPattern {
    path: file.to_path_buf(),
    reason: reason.to_string(),
  };

  let relative = file
    .strip_prefix(root)
    .map_err(|_| malformed("path is not below the scan root"))?;

  let mut url_path = String::new();
  for component in relative.components() {
    match component {
      Component::Normal(segment) => {
        let segment = segment
          .to_str()
          .ok_or_else(|| malformed("path is not valid UTF-8"))?;
        if cfg!(not(windows)) && segment.contains('\\') {
          return Err(malformed("file name contains a backslash"));
        }
        url_path.push('/');
        url_path.push_str(segment);
      }
      Component::CurDir => {}
      _ => return Err(malformed("path escapes the scan root")),
    }
  }

  if url_path.is_empty() {
    return Err(malformed("path is the scan root itself"));
  }

  if let Some(reserved) = url_path.chars().find(|c| RESERVED.contains(c)) {
    return Err(malformed(&format!(
      "contains reserved character `{reserved}`"
    )));
  }

  Ok(url_path)
}
