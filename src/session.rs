//! Per-window swapper lifecycle: build the table, install the hook, tear it down.

use std::path::Path;
use std::sync::Arc;

use crate::config::SwapperConfig;
use crate::interceptor::{InstallOutcome, RequestInterceptor, RequestSession};
use crate::models::Diagnostic;
use crate::table::{SwapTable, generate_swap_table};

/// Swapper state owned by one browser window session.
///
/// The table is built once in [`SwapperSession::start`] and never changes; settings
/// changes only apply to the next session.
pub struct SwapperSession<S: RequestSession> {
  session: S,
  table: Arc<SwapTable>,
  interceptor: RequestInterceptor,
  diagnostics: Vec<Diagnostic>,
}

impl<S: RequestSession> SwapperSession<S> {
  /// Scan the configured roots, build the table and hook it into `session`.
  ///
  /// Never fails: anything that cannot be swapped is logged and recorded in
  /// [`SwapperSession::diagnostics`].
  pub fn start(config: &SwapperConfig, resources_dir: &Path, mut session: S) -> Self {
    let roots = config.scan_roots(resources_dir);
    let build = generate_swap_table(&roots, &config.normalizer());
    let mut diagnostics = build.diagnostics;
    for diagnostic in &diagnostics {
      diagnostic.log();
    }

    let table = Arc::new(build.table);
    let mut interceptor = RequestInterceptor::new();
    match interceptor.install(Arc::clone(&table), &mut session) {
      InstallOutcome::Rejected(diagnostic) => diagnostics.push(diagnostic),
      InstallOutcome::Installed { .. } | InstallOutcome::Skipped => {}
    }

    tracing::info!(
      roots = roots.len(),
      entries = table.len(),
      diagnostics = diagnostics.len(),
      intercepting = interceptor.is_installed(),
      "resource swapper ready"
    );

    Self {
      session,
      table,
      interceptor,
      diagnostics,
    }
  }

  /// Table built for this session.
  pub fn table(&self) -> &SwapTable {
    &self.table
  }

  /// Everything that was not swapped, and why.
  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  /// Returns `true` while the request hook is registered.
  pub fn is_intercepting(&self) -> bool {
    self.interceptor.is_installed()
  }

  /// Browser session the hook is registered with.
  pub fn browser_session(&self) -> &S {
    &self.session
  }

  /// Remove the request hook. Safe to call repeatedly, and run again on drop.
  pub fn shutdown(&mut self) {
    self.interceptor.uninstall(&mut self.session);
  }
}

impl<S: RequestSession> Drop for SwapperSession<S> {
  fn drop(&mut self) {
    self.shutdown();
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::interceptor::RequestDecision;
  use crate::interceptor::testing::RecordingSession;
  use crate::models::DiagnosticKind;
  use std::fs;
  use tempfile::tempdir;

  fn write(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, relative).unwrap();
  }

  #[test]
  fn swaps_files_from_the_configured_root() {
    let dir = tempdir().unwrap();
    let swap = dir.path().join("swap");
    write(&swap, "models/gun.obj");
    write(&swap, "textures/ak.png");

    let config = SwapperConfig {
      enable_swapper: true,
      swapper_root: swap.to_string_lossy().into_owned(),
      ..SwapperConfig::default()
    };
    let session = SwapperSession::start(&config, dir.path(), RecordingSession::default());

    assert!(session.is_intercepting());
    assert_eq!(session.table().len(), 2);
    assert_eq!(session.browser_session().registrations.len(), 1);

    let decision = session
      .browser_session()
      .dispatch("https://assets.krunker.io/textures/ak.png?build=9");
    let expected = format!("swapper://{}", swap.join("textures/ak.png").display());
    assert_eq!(decision.redirect_url.as_deref(), Some(expected.as_str()));
    assert!(!decision.cancel);

    assert_eq!(
      session
        .browser_session()
        .dispatch("https://krunker.io/textures/ak.png"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn theme_overlay_loses_to_the_swapper_root() {
    let dir = tempdir().unwrap();
    let swap = dir.path().join("swap");
    let resources = dir.path().join("resources");
    write(&swap, "img/logo.png");
    write(&resources, "img/theme/img/logo.png");

    let config = SwapperConfig {
      enable_swapper: true,
      enable_theme: true,
      swapper_root: swap.to_string_lossy().into_owned(),
      asset_namespace: String::new(),
      ..SwapperConfig::default()
    };
    let session = SwapperSession::start(&config, &resources, RecordingSession::default());

    assert_eq!(session.table().len(), 1);
    assert_eq!(session.table().iter().next().unwrap().root, "assets");
    assert_eq!(session.diagnostics().len(), 1);
    assert_eq!(session.diagnostics()[0].kind, DiagnosticKind::PatternCollision);
  }

  #[test]
  fn disabled_swapper_registers_no_hook() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x.png");

    let config = SwapperConfig {
      enable_swapper: false,
      swapper_root: dir.path().to_string_lossy().into_owned(),
      ..SwapperConfig::default()
    };
    let session = SwapperSession::start(&config, dir.path(), RecordingSession::default());

    assert!(!session.is_intercepting());
    assert!(session.browser_session().registrations.is_empty());
    assert_eq!(
      session.browser_session().dispatch("https://assets.krunker.io/x.png"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn empty_root_registers_no_hook() {
    let dir = tempdir().unwrap();
    let config = SwapperConfig {
      enable_swapper: true,
      swapper_root: dir.path().to_string_lossy().into_owned(),
      ..SwapperConfig::default()
    };
    let session = SwapperSession::start(&config, dir.path(), RecordingSession::default());

    assert!(session.table().is_empty());
    assert!(session.browser_session().registrations.is_empty());
  }

  #[test]
  fn missing_root_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    let config = SwapperConfig {
      enable_swapper: true,
      swapper_root: dir.path().join("gone").to_string_lossy().into_owned(),
      ..SwapperConfig::default()
    };
    let session = SwapperSession::start(&config, dir.path(), RecordingSession::default());

    assert!(!session.is_intercepting());
    assert_eq!(session.diagnostics()[0].kind, DiagnosticKind::ScanRootUnreadable);
  }

  #[test]
  fn rejected_filter_is_recorded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x.png");

    let config = SwapperConfig {
      enable_swapper: true,
      swapper_root: dir.path().to_string_lossy().into_owned(),
      ..SwapperConfig::default()
    };
    let session =
      SwapperSession::start(&config, dir.path(), RecordingSession::rejecting("bad pattern"));

    assert!(!session.is_intercepting());
    assert_eq!(session.table().len(), 1);
    assert_eq!(
      session.diagnostics().last().map(|diagnostic| diagnostic.kind),
      Some(DiagnosticKind::FilterRegistrationRejected)
    );
  }

  #[test]
  fn shutdown_is_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x.png");

    let config = SwapperConfig {
      enable_swapper: true,
      swapper_root: dir.path().to_string_lossy().into_owned(),
      ..SwapperConfig::default()
    };
    let mut session = SwapperSession::start(&config, dir.path(), RecordingSession::default());

    session.shutdown();
    session.shutdown();

    assert!(!session.is_intercepting());
    assert_eq!(session.browser_session().clears, 1);
    assert!(session.browser_session().active.is_none());
  }
}
