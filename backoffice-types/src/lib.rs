//! # Back-office Types
//!
//! Domain types and port traits for the tourism-agency back-office service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types and rules (payments, transactions, posts, staff)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Actor, Employee, EmployeeId, Money, Payment, PaymentId, PaymentMethod, PaymentMethodId,
    PaymentStatus, PaymentTransaction, Post, PostAction, PostId, PostStatus, PostType, PostTypeId,
    Role, TransactionId, TransactionKind, net_paid,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::BackofficeRepository;
