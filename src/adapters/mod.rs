//! Adapters Layer - Concrete Collaborators
//!
//! Production implementations of the ports:
//! - `http`: `HttpFetch` over reqwest with manual redirect control
//! - `jar`: in-process `CookieJar` with domain/path scoping and expiry

pub mod http;
pub mod jar;

pub use http::ReqwestFetch;
pub use jar::MemoryJar;
