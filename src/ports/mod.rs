//! Ports Layer - Capability Interfaces
//!
//! Defines the traits the crumb acquisition core requires from the outside
//! world. Adapters implement these traits; tests substitute mocks. The core
//! never reaches into a concrete HTTP client or cookie store.
//!
//! Port categories:
//! - `HttpFetch`: one raw HTTP exchange with manual redirect control
//! - `CookieJar`: URL-scoped cookie storage and retrieval

pub mod cookie_jar;
pub mod http_fetch;

pub use cookie_jar::{CookieJar, CookiePair};
pub use http_fetch::{FetchResponse, HttpFetch};
