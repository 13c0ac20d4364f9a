// src/services/notification_service.rs

use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificationRepository,
    models::{
        material::Material,
        notification::{mensagem_abaixo_minimo, Notificacao},
    },
};

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    /// Avisa o criador de cada material que ficou abaixo do mínimo.
    /// Melhor esforço: falhas são registradas no log e ignoradas, sem
    /// comprometer a transação do chamador (cada tentativa roda num SAVEPOINT).
    pub async fn notify_below_minimum(&self, conn: &mut PgConnection, materiais: &[Material]) {
        for material in materiais.iter().filter(|m| m.abaixo_do_minimo()) {
            let Some(destinatario) = material.criado_por else {
                continue;
            };

            match self.try_notify(conn, destinatario, material).await {
                Ok(true) => tracing::info!(
                    "🔔 Material '{}' abaixo do mínimo ({} < {})",
                    material.nome, material.quantidade, material.minimo
                ),
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    material_id = %material.id,
                    "Falha ao criar notificação de estoque baixo: {:?}", e
                ),
            }
        }
    }

    async fn try_notify(
        &self,
        conn: &mut PgConnection,
        usuario_id: Uuid,
        material: &Material,
    ) -> Result<bool, AppError> {
        let mut savepoint = (&mut *conn).begin().await?;
        let criada = self
            .repo
            .insert_below_minimum(&mut *savepoint, usuario_id, material.id, &mensagem_abaixo_minimo(material))
            .await?;
        savepoint.commit().await?;
        Ok(criada)
    }

    pub async fn list_for_user<'e, E>(
        &self,
        executor: E,
        usuario_id: Uuid,
        apenas_nao_lidas: bool,
    ) -> Result<Vec<Notificacao>, AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        self.repo.list_for_user(executor, usuario_id, apenas_nao_lidas).await
    }

    pub async fn mark_read<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        usuario_id: Uuid,
    ) -> Result<Notificacao, AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        self.repo
            .mark_read(executor, id, usuario_id)
            .await?
            .ok_or(AppError::NotificacaoNotFound(id))
    }
}
