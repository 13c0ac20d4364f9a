pub mod user_repo;
pub use user_repo::UserRepository;
pub mod material_repo;
pub use material_repo::MaterialRepository;
pub mod movimento_repo;
pub use movimento_repo::MovimentoRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
