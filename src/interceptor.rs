//! Request-pipeline hook that redirects matching requests to local resources.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{Diagnostic, DiagnosticKind};
use crate::paths::UrlPattern;
use crate::table::SwapTable;

/// What the engine should do with an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDecision {
  /// Whether the request is cancelled. The swapper never cancels.
  pub cancel: bool,
  /// Where the request is redirected, `None` to let it through untouched.
  pub redirect_url: Option<String>,
}

impl RequestDecision {
  /// Let the request through unmodified.
  pub fn pass_through() -> Self {
    Self::default()
  }

  /// Redirect the request without cancelling it.
  pub fn redirect(url: impl Into<String>) -> Self {
    Self {
      cancel: false,
      redirect_url: Some(url.into()),
    }
  }
}

/// Per-request callback run on the engine's request pipeline.
pub type RequestCallback = Arc<dyn Fn(&str) -> RequestDecision + Send + Sync>;

/// Pattern list plus callback registered with a browser session.
#[derive(Clone)]
pub struct RequestFilter {
  /// Patterns selecting which requests reach the callback.
  pub urls: Vec<String>,
  /// Decision callback for selected requests.
  pub callback: RequestCallback,
}

impl RequestFilter {
  /// Returns `true` when the engine should hand `url` to the callback.
  ///
  /// Engines that filter natively never need this; it backs adapters that only offer a
  /// catch-all hook.
  pub fn selects(&self, url: &str) -> bool {
    self
      .urls
      .iter()
      .any(|pattern| UrlPattern::new(pattern.as_str()).matches(url))
  }

  /// Run the filter the way the engine does: selected requests go to the callback,
  /// everything else passes through.
  pub fn decide(&self, url: &str) -> RequestDecision {
    if self.selects(url) {
      (self.callback)(url)
    } else {
      RequestDecision::pass_through()
    }
  }
}

impl fmt::Debug for RequestFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RequestFilter")
      .field("urls", &self.urls)
      .finish_non_exhaustive()
  }
}

/// The engine refused a request filter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request filter rejected: {0}")]
pub struct FilterRejected(pub String);

/// The one capability the swapper needs from a browser session.
pub trait RequestSession {
  /// Replace the session's request filter. `None` removes it.
  ///
  /// Registering a filter replaces any previously registered one; filters never stack.
  fn set_request_filter(&mut self, filter: Option<RequestFilter>) -> Result<(), FilterRejected>;
}

/// Decide what happens to `url` given the swap table.
pub fn resolve_request(table: &SwapTable, url: &str) -> RequestDecision {
  match table.lookup(url) {
    Some(entry) => RequestDecision::redirect(entry.local_resource.as_str()),
    None => RequestDecision::pass_through(),
  }
}

/// Result of [`RequestInterceptor::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
  /// A hook covering this many patterns is active.
  Installed {
    /// Number of patterns in the registered filter.
    patterns: usize,
  },
  /// The table was empty, so no hook is active.
  Skipped,
  /// The engine refused the filter; swapping is disabled for the session.
  Rejected(Diagnostic),
}

/// Owns the swapper's hook on one browser session.
#[derive(Debug, Default)]
pub struct RequestInterceptor {
  active: Option<Arc<SwapTable>>,
}

impl RequestInterceptor {
  /// Interceptor with nothing installed.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `true` when a hook is registered with the session.
  pub fn is_installed(&self) -> bool {
    self.active.is_some()
  }

  /// Table the active hook serves.
  pub fn active_table(&self) -> Option<&Arc<SwapTable>> {
    self.active.as_ref()
  }

  /// Register a hook for `table`, replacing whatever this interceptor installed before.
  ///
  /// An empty table registers nothing. A rejected filter leaves the session without a
  /// swapper hook and is reported through the returned diagnostic.
  pub fn install<S>(&mut self, table: Arc<SwapTable>, session: &mut S) -> InstallOutcome
  where
    S: RequestSession + ?Sized,
  {
    if table.is_empty() {
      self.uninstall(session);
      tracing::debug!("swap table is empty, request hook not installed");
      return InstallOutcome::Skipped;
    }

    let patterns = table.patterns();
    let count = patterns.len();
    let served = Arc::clone(&table);
    let filter = RequestFilter {
      urls: patterns,
      callback: Arc::new(move |url: &str| resolve_request(&served, url)),
    };

    match session.set_request_filter(Some(filter)) {
      Ok(()) => {
        self.active = Some(table);
        tracing::info!(patterns = count, "resource swapper hook installed");
        InstallOutcome::Installed { patterns: count }
      }
      Err(rejected) => {
        self.uninstall(session);
        let diagnostic = Diagnostic {
          kind: DiagnosticKind::FilterRegistrationRejected,
          pattern: None,
          path: None,
          reason: rejected.to_string(),
        };
        diagnostic.log();
        InstallOutcome::Rejected(diagnostic)
      }
    }
  }

  /// Remove the hook if one is installed. Safe to call any number of times.
  pub fn uninstall<S>(&mut self, session: &mut S)
  where
    S: RequestSession + ?Sized,
  {
    if self.active.take().is_none() {
      return;
    }

    if let Err(error) = session.set_request_filter(None) {
      tracing::warn!(%error, "failed to remove resource swapper hook");
    }
  }
}


#[cfg(test)]
mod tests {
  use super::testing::RecordingSession;
  use super::*;
  use crate::models::SwapEntry;
  use std::path::PathBuf;

  fn table(keys: &[&str]) -> Arc<SwapTable> {
    let mut table = SwapTable::default();
    for key in keys {
      table
        .insert(SwapEntry {
          pattern: format!("*://{key}*"),
          key: key.to_string(),
          local_resource: format!("swapper:///swap/{key}"),
          source: PathBuf::from(format!("/swap/{key}")),
          root: "assets".into(),
        })
        .unwrap();
    }
    Arc::new(table)
  }

  #[test]
  fn redirects_matching_requests_without_cancelling() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();

    let outcome = interceptor.install(table(&["host/x.png"]), &mut session);
    assert_eq!(outcome, InstallOutcome::Installed { patterns: 1 });

    let decision = session.dispatch("https://host/x.png?v=2");
    assert!(!decision.cancel);
    assert_eq!(decision.redirect_url.as_deref(), Some("swapper:///swap/host/x.png"));
  }

  #[test]
  fn passes_other_requests_through() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();
    interceptor.install(table(&["host/x.png"]), &mut session);

    assert_eq!(
      session.dispatch("https://host/y.png"),
      RequestDecision::pass_through()
    );
    assert_eq!(
      session.dispatch("https://other/x.png?v=2"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn callback_passes_through_requests_outside_the_table() {
    let table = table(&["host/x.png"]);
    assert_eq!(
      resolve_request(&table, "https://host/x.png.map"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn empty_table_registers_nothing() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();

    let outcome = interceptor.install(table(&[]), &mut session);

    assert_eq!(outcome, InstallOutcome::Skipped);
    assert!(session.registrations.is_empty());
    assert_eq!(session.clears, 0);
    assert!(!interceptor.is_installed());
    assert_eq!(
      session.dispatch("https://host/x.png"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn reinstall_replaces_the_previous_hook() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();

    interceptor.install(table(&["host/old.png"]), &mut session);
    interceptor.install(table(&["host/new.png", "host/extra.png"]), &mut session);

    assert_eq!(session.registrations.len(), 2);
    let active = session.active.as_ref().unwrap();
    assert_eq!(active.urls, vec![
      "*://host/new.png*".to_string(),
      "*://host/extra.png*".to_string()
    ]);
    assert_eq!(
      session.dispatch("https://host/old.png"),
      RequestDecision::pass_through()
    );
    assert!(session.dispatch("https://host/new.png").redirect_url.is_some());
  }

  #[test]
  fn installing_an_empty_table_clears_an_earlier_hook() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();

    interceptor.install(table(&["host/x.png"]), &mut session);
    interceptor.install(table(&[]), &mut session);

    assert_eq!(session.clears, 1);
    assert!(session.active.is_none());
    assert!(!interceptor.is_installed());
  }

  #[test]
  fn rejected_filter_degrades_to_no_swapping() {
    let mut session = RecordingSession::rejecting("too many patterns");
    let mut interceptor = RequestInterceptor::new();

    let outcome = interceptor.install(table(&["host/x.png"]), &mut session);

    let diagnostic = match outcome {
      InstallOutcome::Rejected(diagnostic) => diagnostic,
      other => panic!("expected rejection, got {other:?}"),
    };
    assert_eq!(diagnostic.kind, DiagnosticKind::FilterRegistrationRejected);
    assert!(diagnostic.reason.contains("too many patterns"));
    assert!(!interceptor.is_installed());
    assert_eq!(
      session.dispatch("https://host/x.png"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn rejected_reinstall_clears_the_earlier_hook() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();

    let first = interceptor.install(table(&["host/old.png"]), &mut session);
    assert_eq!(first, InstallOutcome::Installed { patterns: 1 });

    session.reject_with = Some("session closed".into());
    let second = interceptor.install(table(&["host/new.png"]), &mut session);

    assert!(matches!(second, InstallOutcome::Rejected(_)));
    assert_eq!(session.registrations.len(), 1);
    assert_eq!(session.clears, 1);
    assert!(session.active.is_none());
    assert!(!interceptor.is_installed());
    assert_eq!(
      session.dispatch("https://host/old.png"),
      RequestDecision::pass_through()
    );
  }

  #[test]
  fn uninstall_is_idempotent() {
    let mut session = RecordingSession::default();
    let mut interceptor = RequestInterceptor::new();

    interceptor.uninstall(&mut session);
    assert_eq!(session.clears, 0);

    interceptor.install(table(&["host/x.png"]), &mut session);
    interceptor.uninstall(&mut session);
    interceptor.uninstall(&mut session);

    assert_eq!(session.clears, 1);
    assert!(session.active.is_none());
  }
}
