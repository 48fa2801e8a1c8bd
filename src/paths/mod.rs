//! Helpers for turning local file paths into request patterns and resource locators.
//!
//! The responsibilities are split so that separator normalisation, pattern construction
//! and locator conversion can be tested independently. The same helpers back the table
//! builder at startup and the request callback on the hot path.

mod locator;
mod normalize;
mod pattern;

pub use locator::{file_locator, locator_to_path};
pub use normalize::relative_url_path;
pub use pattern::{NormalizedPath, PathNormalizer, UrlPattern, pattern_key, request_key};
