//! Messages exchanged between the page's settings panel and the privileged shell.

use serde::{Deserialize, Serialize};

/// Sent by the page to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RendererMessage {
  /// Ask the shell to open a folder picker for the swapper root.
  PickSwapperFolder,
  /// Turn the resource swapper on or off.
  SetSwapperEnabled {
    /// New state.
    enabled: bool,
  },
  /// Turn the theme overlay on or off.
  SetThemeEnabled {
    /// New state.
    enabled: bool,
  },
  /// Use `path` as the swapper root.
  SetSwapperFolder {
    /// Folder chosen by the user.
    path: String,
  },
  /// Offer the user a restart.
  RestartOptional,
  /// Restart immediately.
  Restart,
}

/// Sent by the shell to the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MainMessage {
  /// The folder picker closed with a selection.
  SwapperFolderPicked {
    /// Selected folder.
    path: String,
  },
  /// A setting changed that only applies to new sessions.
  RestartRequired {
    /// Text shown to the user.
    reason: String,
  },
}

impl MainMessage {
  /// Notice sent after any swapper setting changes.
  pub fn swapper_restart_required() -> Self {
    Self::RestartRequired {
      reason: "A restart is required for changes to take effect.".into(),
    }
  }
}
