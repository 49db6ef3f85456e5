//! # Guild Service Library
//!
//! This crate provides a multi-tenant guild membership core service:
//! - One active guild per user, tracked as a single durable pointer
//! - Time- and use-limited invite codes with atomic redemption
//! - Billing-tier member limits enforced by admission control
//! - Creator-only kick and delete, guarded by stateless predicates
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Membership core services and DTOs
//! - **Infrastructure Layer**: PostgreSQL repository implementations
//! - **Presentation Layer**: Thin HTTP handlers over the service facade
//!
//! ## Module Structure
//!
//! ```text
//! guild_service/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities, value objects, and traits
//! +-- application/   Membership services and DTOs
//! +-- infrastructure/ Database and repository implementations
//! +-- presentation/  HTTP routes, handlers, and middleware
//! +-- shared/        Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Membership services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
