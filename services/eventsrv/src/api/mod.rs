//! HTTP API handlers

pub mod admin_handlers;
pub mod dto;
pub mod event_handlers;
pub mod health_handlers;
