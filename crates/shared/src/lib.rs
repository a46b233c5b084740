//! Shared types, errors, and configuration for Budgetrack.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers (currency codes, lakh conversion) with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Bearer token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
