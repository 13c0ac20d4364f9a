// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{MaterialRepository, MovimentoRepository, NotificationRepository, UserRepository},
    services::{
        auth::AuthService, material_service::MaterialService,
        movimento_service::MovimentoService, notification_service::NotificationService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Configuração lida do ambiente (.env opcional)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {value}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections })
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub material_service: MaterialService,
    pub movimento_service: MovimentoService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = config.connect().await?;
        let i18n_store = I18nStore::embedded().context("Falha ao carregar as traduções")?;
        Ok(Self::build(db_pool, config.jwt_secret.clone(), i18n_store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(db_pool: PgPool, jwt_secret: String, i18n_store: I18nStore) -> Self {
        let material_repo = MaterialRepository::new();

        let auth_service = AuthService::new(UserRepository::new(db_pool.clone()), jwt_secret);
        let notification_service = NotificationService::new(NotificationRepository::new());
        let movimento_service = MovimentoService::new(
            MovimentoRepository::new(),
            material_repo.clone(),
            notification_service.clone(),
        );
        let material_service = MaterialService::new(
            material_repo,
            movimento_service.clone(),
            notification_service.clone(),
        );

        Self {
            db_pool,
            i18n_store: Arc::new(i18n_store),
            auth_service,
            material_service,
            movimento_service,
            notification_service,
        }
    }
}
