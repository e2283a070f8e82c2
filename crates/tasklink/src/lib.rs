//! tasklink - task tracking with a dependency graph.
//!
//! Tasks may depend on other tasks. The [`graph::DependencyGraph`] engine
//! keeps that relation acyclic and free of dangling references, and computes
//! the full set of direct and indirect dependencies of a task grouped by
//! depth. Records live behind the [`store::TaskStore`] trait, with in-memory
//! and JSONL backends provided.

#![forbid(unsafe_code)]

pub mod cache;
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod store;

// CLI support (needed by the binary)
pub mod app;
pub mod cli;
pub mod commands;
pub mod output;
