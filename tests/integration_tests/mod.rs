//! Integration tests module
//!
//! This module provides end-to-end integration tests for the pokegraph
//! pipeline against mock wiki and triple store servers, including:
//! - Complete list → extract → assemble → publish flow
//! - Store read-back and shape validation
//! - Error handling and partial-success scenarios

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
