//! Shared test utilities for the mcp-git-read workspace.
//!
//! This crate provides git repository fixtures for the query engine and
//! server test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`git`] — git repository fixtures at increasing realism levels
//! - [`repo`] — [`repo::TestRepo`] builder for history-shaped scenarios

pub mod git;
pub mod repo;
