pub mod materials;
pub mod movimentos;
pub mod notifications;
