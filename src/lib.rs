//! Journal Digest - a keyword-filtered digest of recent journal articles
//!
//! This crate collects article metadata from mirrored RSSHub feeds and the
//! Semantic Scholar search API, keeps the recent and relevant items, and
//! renders them as a single static HTML page.

pub mod backoff;
pub mod config;
pub mod fetcher;
pub mod filter;
pub mod mirror;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod scholar;
