//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for notification and badge rows.
//! - Isolate SQLite query details from the store and client orchestration.
//!
//! # Invariants
//! - Multi-statement writes run inside one immediate transaction.
//! - Repository APIs return semantic errors (`NotExistId`, `InvalidParameter`)
//!   in addition to DB transport errors.

pub mod badge_repo;
pub mod noti_repo;
