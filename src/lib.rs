//! # nginx-cache-purger
//!
//! Empties a filesystem-backed NGINX FastCGI/proxy cache whenever site
//! content changes, and gives operators an on-demand purge.
//!
//! - **Purge engine**: depth-first removal of everything under the cache
//!   directory, keeping the directory itself; per-path failures are collected,
//!   never fatal
//! - **Trigger registry**: a fixed table of content-lifecycle events, each
//!   bound to the whole-cache purge
//! - **Manual trigger**: purge, leave a one-shot notice, redirect back
//! - **Safety**: protected system paths, a batch-context guard and an
//!   optional per-directory lock
//!
//! ```no_run
//! use nginx_cache_purger::purge::PurgeEngine;
//! use nginx_cache_purger::triggers::{purge_action, TriggerEvent, TriggerRegistry};
//!
//! let engine = PurgeEngine::new("/var/run/nginx-cache/");
//! let registry = TriggerRegistry::with_default_events(purge_action(engine));
//! if let Some(result) = registry.dispatch(TriggerEvent::SavePost) {
//!     println!("{}", result.summary());
//! }
//! ```

pub mod cli;
pub mod common;
pub mod notice;
pub mod purge;
pub mod triggers;
