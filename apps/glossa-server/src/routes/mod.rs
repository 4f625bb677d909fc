//! Route modules for Glossa Server

pub mod annotate;
pub mod files;
pub mod session;
pub mod upload;
