pub mod auth;
pub mod material;
pub mod movimento;
pub mod notification;
