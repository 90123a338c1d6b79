//! Shared fixtures for the multiverse test suites.
//!
//! The JSON produced here has the same shape as the responses of the
//! remote catalog, so it can be fed to `httpmock` servers or decoded directly.

pub mod fixtures;
pub mod proptest;
