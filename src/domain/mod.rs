//! Domain Layer - Protocol Logic Without I/O
//!
//! Pure building blocks of the acquisition sequence:
//! - `options`: immutable per-request fetch options with overlay derivation
//! - `consent_form`: hidden-field scraping and form-body encoding
//! - `redirect`: consent-gateway vs same-origin redirect classification

pub mod consent_form;
pub mod options;
pub mod redirect;
