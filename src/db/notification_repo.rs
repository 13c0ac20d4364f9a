// src/db/notification_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::notification::{Notificacao, CATEGORIA_ABAIXO_MINIMO},
};

#[derive(Clone, Default)]
pub struct NotificationRepository;

impl NotificationRepository {
    pub fn new() -> Self {
        Self
    }

    /// Cria a notificação "abaixo do mínimo" se ainda não houver uma não lida
    /// para o mesmo (usuário, material). Retorna `true` quando criou.
    pub async fn insert_below_minimum<'e, E>(
        &self,
        executor: E,
        usuario_id: Uuid,
        material_id: Uuid,
        mensagem: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O índice parcial uq_notificacoes_abaixo_minimo_nao_lida garante a unicidade
        let result = sqlx::query(
            r#"
            INSERT INTO notificacoes (usuario_id, material_id, categoria, mensagem)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (usuario_id, material_id)
                WHERE NOT lida AND categoria = 'ABAIXO_MINIMO'
            DO NOTHING
            "#,
        )
            .bind(usuario_id)
            .bind(material_id)
            .bind(CATEGORIA_ABAIXO_MINIMO)
            .bind(mensagem)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn list_for_user<'e, E>(
        &self,
        executor: E,
        usuario_id: Uuid,
        apenas_nao_lidas: bool,
    ) -> Result<Vec<Notificacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notificacoes = sqlx::query_as::<_, Notificacao>(
            r#"
            SELECT * FROM notificacoes
            WHERE usuario_id = $1 AND (NOT $2 OR NOT lida)
            ORDER BY criado DESC
            "#,
        )
            .bind(usuario_id)
            .bind(apenas_nao_lidas)
            .fetch_all(executor)
            .await?;
        Ok(notificacoes)
    }

    pub async fn mark_read<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        usuario_id: Uuid,
    ) -> Result<Option<Notificacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notificacao = sqlx::query_as::<_, Notificacao>(
            r#"
            UPDATE notificacoes SET lida = TRUE
            WHERE id = $1 AND usuario_id = $2
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(usuario_id)
            .fetch_optional(executor)
            .await?;
        Ok(notificacao)
    }
}
