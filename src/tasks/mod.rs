//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes cached reads whose revalidate TTL has passed

mod cleanup;

pub use cleanup::spawn_cleanup_task;
