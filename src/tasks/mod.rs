//! Background Tasks Module
//!
//! Contains the background tasks spawned by the cache.
//!
//! # Tasks
//! - TTL Expiry: one watcher per TTL entry, removing it when the TTL elapses

mod expiry;

pub(crate) use expiry::spawn_expiry_watcher;
