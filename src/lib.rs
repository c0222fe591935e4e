//! yf-crumb — Library Root
//!
//! Acquires and caches the short-lived anti-forgery token ("crumb") the
//! Yahoo Finance API requires, driving the cookie-consent redirect flow
//! when the provider demands it. Re-exports all modules for integration
//! tests and consumers.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod usecases;

pub use errors::{CrumbError, CrumbResult};
pub use usecases::{CrumbService, CrumbServiceBuilder};
