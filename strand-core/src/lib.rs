//! Strand Core
//!
//! Core types and abstractions for the Strand pipeline platform.
//!
//! This crate contains:
//! - Domain types: Core business entities (Run, Pipeline, Tool, etc.)
//! - DTOs: Data transfer objects for API communication

pub mod domain;
pub mod dto;
