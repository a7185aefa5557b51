//! Dotfiles manager.
//!
//! Treats the user's config directory as a version-controlled repository and
//! keeps four JSON registries next to it: dependencies, plugins, environment
//! variables and machines.
//!
//! The public API is organised into layers:
//!
//! - **[`registry`]**: load/save and add/modify/remove/list over the JSON documents
//! - **[`vcs`]**: the version-control collaborator (`git` binary or libgit2)
//! - **[`sync`]**: dirty/clean state, reconciliation and divergence
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod registry;
pub mod sync;
pub mod vcs;
