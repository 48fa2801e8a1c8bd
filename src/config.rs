//! Typed swapper settings and the scan roots derived from them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapperError};
use crate::messages::{MainMessage, RendererMessage};
use crate::models::ScanRoot;
use crate::paths::PathNormalizer;
use crate::protocol::{PrivilegedScheme, SWAPPER_SCHEME};

/// File name looked up by [`SwapperConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "swapper.config.json";

/// Swapper settings read once when a browser session starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwapperConfig {
  /// Serve files from [`SwapperConfig::swapper_root`] in place of remote assets.
  pub enable_swapper: bool,
  /// Serve the bundled theme overlay in place of remote images.
  pub enable_theme: bool,
  /// Directory mirrored onto the asset host.
  pub swapper_root: String,
  /// Theme overlay directory, relative to the application resources directory.
  pub theme_dir: String,
  /// Remote host both overlays are mirrored onto.
  pub remote_host: String,
  /// Host prefix of the asset server, prepended for the swapper root only.
  pub asset_namespace: String,
  /// Scheme local files are served through.
  pub locator_scheme: String,
}

impl Default for SwapperConfig {
  fn default() -> Self {
    Self {
      enable_swapper: false,
      enable_theme: false,
      swapper_root: String::new(),
      theme_dir: "img/theme".into(),
      remote_host: "krunker.io".into(),
      asset_namespace: "assets.".into(),
      locator_scheme: SWAPPER_SCHEME.into(),
    }
  }
}

impl SwapperConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unparsable file yields the defaults, which swap nothing.
  pub fn discover(config_dir: &Path) -> Self {
    let candidate = config_dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(SwapperError::ConfigIo { source, .. })
        if source.kind() == std::io::ErrorKind::NotFound =>
      {
        Self::default()
      }
      Err(error) => {
        tracing::warn!(%error, "falling back to default swapper settings");
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|source| SwapperError::ConfigIo {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| SwapperError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Write the configuration as pretty JSON.
  pub fn save(&self, path: &Path) -> Result<()> {
    let io_error = |source| SwapperError::ConfigIo {
      path: path.to_path_buf(),
      source,
    };
    let json = serde_json::to_string_pretty(self).map_err(|source| SwapperError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, json).map_err(io_error)
  }

  /// Scan roots in precedence order: the swapper root first, then the theme overlay.
  ///
  /// `resources_dir` anchors the theme overlay directory.
  pub fn scan_roots(&self, resources_dir: &Path) -> Vec<ScanRoot> {
    let mut roots = Vec::new();

    if self.enable_swapper {
      let folder = self.swapper_root.trim();
      if folder.is_empty() {
        tracing::debug!("resource swapper enabled without a folder");
      } else {
        roots.push(ScanRoot::namespaced(
          "assets",
          PathBuf::from(folder),
          &self.asset_namespace,
        ));
      }
    }

    if self.enable_theme {
      roots.push(ScanRoot::bare("theme", resources_dir.join(&self.theme_dir)));
    }

    roots
  }

  /// Normalizer matching these settings.
  pub fn normalizer(&self) -> PathNormalizer {
    PathNormalizer::new(self.remote_host.as_str(), self.locator_scheme.as_str())
  }

  /// Scheme to register before any window loads, the one [`Self::normalizer`] writes.
  pub fn privileged_scheme(&self) -> PrivilegedScheme {
    PrivilegedScheme::named(&self.locator_scheme)
  }

  /// Apply a settings change sent by the page.
  ///
  /// Live tables are never mutated, so any effective change answers with a restart notice.
  pub fn apply(&mut self, message: &RendererMessage) -> Option<MainMessage> {
    let changed = match message {
      RendererMessage::SetSwapperEnabled { enabled } => {
        std::mem::replace(&mut self.enable_swapper, *enabled) != *enabled
      }
      RendererMessage::SetThemeEnabled { enabled } => {
        std::mem::replace(&mut self.enable_theme, *enabled) != *enabled
      }
      RendererMessage::SetSwapperFolder { path } => {
        std::mem::replace(&mut self.swapper_root, path.clone()) != *path
      }
      RendererMessage::PickSwapperFolder
      | RendererMessage::RestartOptional
      | RendererMessage::Restart => false,
    };

    changed.then(MainMessage::swapper_restart_required)
  }
}
