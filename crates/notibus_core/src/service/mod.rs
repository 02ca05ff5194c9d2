//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the client and store façades decoupled from storage details.

pub mod noti_service;
