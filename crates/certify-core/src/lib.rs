//! Question model, selection, scoring, and test generation for certify.
//!
//! This crate defines the question data model, the scoring engine, and the
//! generation pipeline (LLM first, static bank as fallback) that the rest of
//! certify builds on.

pub mod bank;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod report;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod traits;
