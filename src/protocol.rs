//! Privileged locator scheme used to serve swapped files to the page.

use std::path::PathBuf;
use std::sync::OnceLock;

use thiserror::Error;

use crate::error::Result;
use crate::paths::locator_to_path;

/// Scheme of the locators written into the swap table.
pub const SWAPPER_SCHEME: &str = "swapper";

/// Privileges requested for a custom scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemePrivileges {
  /// Content served through the scheme is exempt from the page's content security policy.
  pub bypass_csp: bool,
  /// The scheme is treated like `https` for mixed-content purposes.
  pub secure: bool,
}

/// A scheme plus the privileges it must be registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegedScheme {
  /// Scheme name without the trailing `:`.
  pub scheme: String,
  /// Privileges the engine must grant.
  pub privileges: SchemePrivileges,
}

impl PrivilegedScheme {
  /// The scheme swapped files are served through.
  pub fn swapper() -> Self {
    Self::named(SWAPPER_SCHEME)
  }

  /// A locator scheme with the privileges swapped files need.
  pub fn named(scheme: &str) -> Self {
    Self {
      scheme: scheme.to_string(),
      privileges: SchemePrivileges {
        bypass_csp: true,
        secure: true,
      },
    }
  }

  /// Resolve a locator served through this scheme to the file it names.
  ///
  /// This is the body of the engine's file-protocol handler.
  pub fn resolve(&self, locator: &str) -> Result<PathBuf> {
    locator_to_path(locator, &self.scheme)
  }
}

/// The engine refused to register a scheme.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to register scheme {scheme}: {reason}")]
pub struct SchemeRejected {
  /// Scheme that was refused.
  pub scheme: String,
  /// Engine-supplied reason.
  pub reason: String,
}

/// Engine capability that registers privileged schemes before any window loads.
pub trait SchemeRegistrar {
  /// Register `scheme` with its privileges.
  fn register_privileged(
    &mut self,
    scheme: &PrivilegedScheme,
  ) -> std::result::Result<(), SchemeRejected>;
}

/// Makes sure registration reaches the engine at most once.
#[derive(Debug, Default)]
pub struct RegistrationGuard {
  result: OnceLock<std::result::Result<(), SchemeRejected>>,
}

impl RegistrationGuard {
  /// Guard that has not registered anything yet.
  pub const fn new() -> Self {
    Self {
      result: OnceLock::new(),
    }
  }

  /// Register `scheme` on the first call; later calls return the first result.
  pub fn register<R>(
    &self,
    registrar: &mut R,
    scheme: &PrivilegedScheme,
  ) -> std::result::Result<(), SchemeRejected>
  where
    R: SchemeRegistrar + ?Sized,
  {
    self
      .result
      .get_or_init(|| {
        let result = registrar.register_privileged(scheme);
        match &result {
          Ok(()) => tracing::debug!(scheme = %scheme.scheme, "registered privileged scheme"),
          Err(error) => tracing::error!(%error, "privileged scheme registration failed"),
        }
        result
      })
      .clone()
  }

  /// Returns `true` once the scheme has been registered successfully.
  pub fn is_registered(&self) -> bool {
    matches!(self.result.get(), Some(Ok(())))
  }
}

static PROCESS_REGISTRATION: RegistrationGuard = RegistrationGuard::new();

/// Register the locator scheme for this process. Only the first call reaches `registrar`.
///
/// Pass [`SwapperConfig::privileged_scheme`](crate::SwapperConfig::privileged_scheme) so the
/// registered scheme is the one locators are written with.
pub fn register_privileged_scheme<R>(
  registrar: &mut R,
  scheme: &PrivilegedScheme,
) -> std::result::Result<(), SchemeRejected>
where
  R: SchemeRegistrar + ?Sized,
{
  PROCESS_REGISTRATION.register(registrar, scheme)
}
