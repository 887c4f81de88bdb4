//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (file I/O, HTTP). Each sub-module groups
//! adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `metrics`: Prometheus metrics export and health checks
//! - `persistence`: versioned JSON market snapshots and JSONL trade logs

pub mod metrics;
pub mod persistence;
