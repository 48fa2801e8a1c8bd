use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use url::{Position, Url};

use crate::error::{Result, SwapperError};
use crate::models::ScanRoot;
use crate::paths::{file_locator, relative_url_path};

/// Schemes a `*` scheme wildcard stands for, as in browser match patterns.
const WILDCARD_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

fn scheme_prefix() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("invalid scheme regex")
  })
}

/// Pattern, lookup key and locator derived for one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
  /// Wildcard pattern, e.g. `*://assets.example.io/models/gun.obj*`.
  pub pattern: String,
  /// Lookup key, e.g. `assets.example.io/models/gun.obj`.
  pub key: String,
  /// Privileged locator resolving to the file bytes.
  pub local_resource: String,
}

/// Derives request patterns for files below a [`ScanRoot`].
#[derive(Debug, Clone)]
pub struct PathNormalizer {
  remote_host: String,
  locator_scheme: String,
}

impl PathNormalizer {
  /// Normalizer for files mirrored onto `remote_host`, served through `locator_scheme`.
  pub fn new(remote_host: impl Into<String>, locator_scheme: impl Into<String>) -> Self {
    Self {
      remote_host: remote_host.into(),
      locator_scheme: locator_scheme.into(),
    }
  }

  /// Remote host patterns are generated for.
  pub fn remote_host(&self) -> &str {
    &self.remote_host
  }

  /// Compute the pattern, key and locator for `file`, discovered below `root`.
  pub fn normalize(&self, root: &ScanRoot, file: &Path) -> Result<NormalizedPath> {
    let relative = relative_url_path(&root.path, file)?;
    let host = format!("{}{}", root.effective_prefix(), self.remote_host);

    // Round-trip through a URL so the key carries the same percent-encoding the engine
    // reports for outgoing requests.
    let url = Url::parse(&format!("https://{host}{relative}")).map_err(|err| {
      SwapperError::MalformedPattern {
        path: file.to_path_buf(),
        reason: format!("`{host}{relative}` is not a valid URL: {err}"),
      }
    })?;
    let key = url[Position::BeforeHost..Position::AfterPath].to_string();

    Ok(NormalizedPath {
      pattern: format!("*://{key}*"),
      key,
      local_resource: file_locator(file, &self.locator_scheme)?,
    })
  }
}

/// Lookup key of a generated pattern: the pattern minus its `*://` prefix and `*` suffix.
pub fn pattern_key(pattern: &str) -> Option<&str> {
  pattern.strip_prefix("*://")?.strip_suffix('*')
}

/// Lookup key of a request URL: scheme, query string and fragment removed.
pub fn request_key(url: &str) -> &str {
  let without_scheme = match scheme_prefix().find(url) {
    Some(found) => &url[found.end()..],
    None => url,
  };
  let end = without_scheme
    .find(['?', '#'])
    .unwrap_or(without_scheme.len());
  &without_scheme[..end]
}

/// Browser-style URL match pattern where `*` matches any run of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
  raw: String,
}

impl UrlPattern {
  /// Wrap a pattern string.
  pub fn new(raw: impl Into<String>) -> Self {
    Self { raw: raw.into() }
  }

  /// Pattern as registered with the engine.
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// Returns `true` when `url` is selected by this pattern.
  ///
  /// A `*` in scheme position only stands for the web schemes, the rest of the pattern
  /// is a plain wildcard match.
  pub fn matches(&self, url: &str) -> bool {
    match (self.raw.split_once("://"), url.split_once("://")) {
      (Some(("*", pattern_rest)), Some((scheme, url_rest))) => {
        WILDCARD_SCHEMES
          .iter()
          .any(|candidate| candidate.eq_ignore_ascii_case(scheme))
          && wildcard_match(pattern_rest.as_bytes(), url_rest.as_bytes())
      }
      (Some(_), Some(_)) | (None, _) => wildcard_match(self.raw.as_bytes(), url.as_bytes()),
      (Some(_), None) => false,
    }
  }
}

fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
  let (mut p, mut t) = (0, 0);
  let mut backtrack: Option<(usize, usize)> = None;

  while t < text.len() {
    if p < pattern.len() && pattern[p] == b'*' {
      backtrack = Some((p, t));
      p += 1;
    } else if p < pattern.len() && pattern[p] == text[t] {
      p += 1;
      t += 1;
    } else if let Some((star, consumed)) = backtrack {
      p = star + 1;
      t = consumed + 1;
      backtrack = Some((star, consumed + 1));
    } else {
      return false;
    }
  }

  pattern[p..].iter().all(|&b| b == b'*')
}
