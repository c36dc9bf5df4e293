//! ortho-directory: Patient directory REST client for ortho-gateway
//!
//! Wraps the clinic's intranet API: patient lookup/registration, available
//! appointments, contact phones, and persistence of studies and video
//! calls.

pub mod client;
pub mod error;

pub use client::DirectoryClient;
pub use error::{DirectoryError, Result};
