//! Application layer: services and DTOs.

pub mod dto;
pub mod services;
