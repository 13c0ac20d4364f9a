pub mod auth;
pub mod material_service;
pub mod movimento_service;
pub mod notification_service;
pub mod reconciliation;
