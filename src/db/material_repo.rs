// src/db/material_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::material::{Material, MaterialResumo, NovoMaterial},
};

#[derive(Clone, Default)]
pub struct MaterialRepository;

impl MaterialRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materiais = sqlx::query_as::<_, Material>("SELECT * FROM materiais ORDER BY nome ASC")
            .fetch_all(executor)
            .await?;
        Ok(materiais)
    }

    pub async fn list_summaries<'e, E>(&self, executor: E) -> Result<Vec<MaterialResumo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resumos = sqlx::query_as::<_, MaterialResumo>(
            "SELECT id, nome, quantidade, imagem_url FROM materiais ORDER BY nome ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(resumos)
    }

    /// Materiais com quantidade abaixo do mínimo (tela de alertas).
    pub async fn list_below_minimum<'e, E>(&self, executor: E) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materiais = sqlx::query_as::<_, Material>(
            r#"
            SELECT * FROM materiais
            WHERE quantidade < minimo
            ORDER BY (minimo - quantidade) DESC, nome ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(materiais)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>("SELECT * FROM materiais WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>("SELECT * FROM materiais WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &NovoMaterial,
        criado_por: Option<Uuid>,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materiais (nome, descricao, imagem_url, quantidade, minimo, criado_por)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(&input.nome)
            .bind(&input.descricao)
            .bind(&input.imagem_url)
            .bind(input.quantidade)
            .bind(input.minimo)
            .bind(criado_por)
            .fetch_one(executor)
            .await?;
        Ok(material)
    }

    /// Grava os campos do formulário. O movimento da diferença de quantidade
    /// fica a cargo do serviço, com a linha já travada.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &NovoMaterial,
    ) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>(
            r#"
            UPDATE materiais
            SET nome = $2, descricao = $3, imagem_url = $4, quantidade = $5, minimo = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&input.nome)
            .bind(&input.descricao)
            .bind(&input.imagem_url)
            .bind(input.quantidade)
            .bind(input.minimo)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM materiais WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Soma `delta` à quantidade do material de forma atômica.
    /// `None` quando o material não existe mais.
    pub async fn adjust_quantity<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: i64,
    ) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Incremento no próprio UPDATE: a linha fica travada até o fim da transação.
        let material = sqlx::query_as::<_, Material>(
            r#"
            UPDATE materiais
            SET quantidade = quantidade + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(delta)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }
}
