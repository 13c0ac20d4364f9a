// src/db/movimento_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::movimento::{Movimento, MovimentoComMaterial, NovoMovimento, TipoMovimento},
};

const SELECT_COM_MATERIAL: &str = r#"
    SELECT mv.*, m.nome AS material_nome
    FROM movimentos mv
    LEFT JOIN materiais m ON m.id = mv.material_id
"#;

#[derive(Clone, Default)]
pub struct MovimentoRepository;

impl MovimentoRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<MovimentoComMaterial>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{SELECT_COM_MATERIAL} WHERE mv.id = $1");
        let row = sqlx::query_as::<_, MovimentoComMaterial>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Carrega o movimento travando a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Movimento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movimento = sqlx::query_as::<_, Movimento>("SELECT * FROM movimentos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(movimento)
    }

    /// Histórico, do mais recente para o mais antigo.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        material_id: Option<Uuid>,
    ) -> Result<Vec<MovimentoComMaterial>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{SELECT_COM_MATERIAL} WHERE ($1::uuid IS NULL OR mv.material_id = $1) ORDER BY mv.criado DESC"
        );
        let rows = sqlx::query_as::<_, MovimentoComMaterial>(&sql)
            .bind(material_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Empréstimos, abertos e devolvidos, ordenados pelo prazo.
    pub async fn list_loans<'e, E>(&self, executor: E) -> Result<Vec<MovimentoComMaterial>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{SELECT_COM_MATERIAL} WHERE mv.tipo IN ($1, $2) ORDER BY mv.data_devolucao ASC NULLS LAST, mv.criado DESC"
        );
        let rows = sqlx::query_as::<_, MovimentoComMaterial>(&sql)
            .bind(TipoMovimento::Emprestimo)
            .bind(TipoMovimento::Devolvido)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn count<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movimentos")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    // ---
    // Escrita
    // ---

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        input: &NovoMovimento,
        usuario_id: Option<Uuid>,
    ) -> Result<Movimento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movimento = sqlx::query_as::<_, Movimento>(
            r#"
            INSERT INTO movimentos (material_id, tipo, quantidade, nota, data_devolucao, usuario_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(input.material_id)
            .bind(input.tipo)
            .bind(input.quantidade)
            .bind(&input.nota)
            .bind(input.data_devolucao)
            .bind(usuario_id)
            .fetch_one(executor)
            .await?;
        Ok(movimento)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &NovoMovimento,
    ) -> Result<Movimento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movimento = sqlx::query_as::<_, Movimento>(
            r#"
            UPDATE movimentos
            SET material_id = $2, tipo = $3, quantidade = $4, nota = $5, data_devolucao = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(input.material_id)
            .bind(input.tipo)
            .bind(input.quantidade)
            .bind(&input.nota)
            .bind(input.data_devolucao)
            .fetch_optional(executor)
            .await?;
        movimento.ok_or(AppError::MovimentoNotFound(id))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM movimentos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remoção em massa. Não passa pela reconciliação: as quantidades ficam como estão.
    pub async fn delete_all<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM movimentos")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove até `limit` movimentos (os mais antigos primeiro).
    pub async fn delete_chunk<'e, E>(&self, executor: E, limit: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM movimentos
            WHERE id IN (SELECT id FROM movimentos ORDER BY criado ASC LIMIT $1)
            "#,
        )
            .bind(limit)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
