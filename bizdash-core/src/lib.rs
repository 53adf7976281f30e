//! Core types for the Business Dashboard backend
//!
//! This crate defines the shared data structures used across the dashboard,
//! including business profiles, marketing configuration and the common error type.

pub mod business;
pub mod error;

pub use business::{Address, BusinessContext, BusinessProfile, MarketingConfig};
pub use error::{DashboardError, DashboardResult};
