//! Glossa Server Library
//!
//! A PDF reading companion: upload a PDF, navigate and select text in the
//! browser viewer, then copy a translation-ready prompt or save an
//! annotation to Notion. The main server binary is in main.rs.
//!
//! # Modules
//!
//! - `session`: per-document reading state and prompt assembly
//! - `pdf`: MuPDF-backed page text extraction
//! - `notes`: annotation sink (Notion REST API)
//! - `storage`: on-disk store for uploaded PDFs
//! - `routes`: HTTP surface

pub mod config;
pub mod error;
pub mod notes;
pub mod pdf;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
