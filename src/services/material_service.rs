// src/services/material_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MaterialRepository,
    models::{
        material::{Material, MaterialResumo, NovoMaterial},
        movimento::{NovoMovimento, TipoMovimento},
    },
    services::{movimento_service::MovimentoService, notification_service::NotificationService},
};

// Limite da coluna movimentos.nota
const NOTA_MAX_CHARS: usize = 200;

#[derive(Clone)]
pub struct MaterialService {
    material_repo: MaterialRepository,
    movimento_service: MovimentoService,
    notification_service: NotificationService,
}

impl MaterialService {
    pub fn new(
        material_repo: MaterialRepository,
        movimento_service: MovimentoService,
        notification_service: NotificationService,
    ) -> Self {
        Self { material_repo, movimento_service, notification_service }
    }

    // --- LEITURA ---

    pub async fn list_materials<'e, E>(&self, executor: E) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.material_repo.list_all(executor).await
    }

    pub async fn list_summaries<'e, E>(&self, executor: E) -> Result<Vec<MaterialResumo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.material_repo.list_summaries(executor).await
    }

    pub async fn list_alerts<'e, E>(&self, executor: E) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.material_repo.list_below_minimum(executor).await
    }

    pub async fn get_material<'e, E>(&self, executor: E, id: Uuid) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.material_repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))
    }

    // --- CREATE MATERIAL ---

    /// Cria o material. A quantidade inicial já vai na própria linha do material,
    /// então o movimento de ENTRADA correspondente é gravado sem ajustar.
    pub async fn create_material<'e, E>(
        &self,
        executor: E,
        input: &NovoMaterial,
        criado_por: Option<Uuid>,
    ) -> Result<Material, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let material = self.material_repo.create(&mut *tx, input, criado_por).await?;

        if material.quantidade > 0 {
            let estoque_inicial = NovoMovimento {
                material_id: Some(material.id),
                tipo: TipoMovimento::Entrada,
                quantidade: material.quantidade,
                nota: "Estoque inicial".to_string(),
                data_devolucao: None,
            };
            self.movimento_service
                .create_movimento(&mut *tx, &estoque_inicial, criado_por, false)
                .await?;
        }

        tx.commit().await?;
        tracing::info!("✅ Material '{}' criado com {} unidades", material.nome, material.quantidade);
        Ok(material)
    }

    // --- UPDATE MATERIAL ---

    /// Edita o material. Se a quantidade mudou, a diferença entra no histórico
    /// como ADICAO ou SAIDA, para que o material continue batendo com seus movimentos.
    pub async fn update_material<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &NovoMaterial,
        usuario_id: Option<Uuid>,
    ) -> Result<Material, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let atual = self
            .material_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        let material = self
            .material_repo
            .update(&mut *tx, id, input)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        if let Some(correcao) = correcao_de_estoque(&atual, material.quantidade)? {
            self.movimento_service
                .create_movimento(&mut *tx, &correcao, usuario_id, false)
                .await?;
            tracing::info!(
                "✏️ Estoque de '{}' corrigido: {} -> {}",
                material.nome, atual.quantidade, material.quantidade
            );
        }

        self.notification_service
            .notify_below_minimum(&mut tx, std::slice::from_ref(&material))
            .await;

        tx.commit().await?;
        Ok(material)
    }

    // --- DELETE MATERIAL ---

    /// Remove o material deixando um movimento DELETE no histórico.
    /// Os movimentos existentes ficam com material nulo.
    pub async fn delete_material<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        usuario_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let material = self
            .material_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        let registro = NovoMovimento {
            material_id: Some(material.id),
            tipo: TipoMovimento::Delete,
            quantidade: material.quantidade.max(0),
            nota: nota_remocao(&material.nome),
            data_devolucao: None,
        };
        self.movimento_service
            .create_movimento(&mut *tx, &registro, usuario_id, false)
            .await?;

        self.material_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;
        tracing::info!("🗑️ Material '{}' removido", material.nome);
        Ok(())
    }
}

/// Movimento que leva o histórico de `atual.quantidade` para `nova`.
/// `None` quando a quantidade não mudou.
fn correcao_de_estoque(atual: &Material, nova: i32) -> Result<Option<NovoMovimento>, AppError> {
    let delta = i64::from(nova) - i64::from(atual.quantidade);
    if delta == 0 {
        return Ok(None);
    }

    let tipo = if delta > 0 { TipoMovimento::Adicao } else { TipoMovimento::Saida };
    let quantidade =
        i32::try_from(delta.unsigned_abs()).map_err(|_| AppError::QuantidadeForaDoLimite(atual.id))?;

    Ok(Some(NovoMovimento {
        material_id: Some(atual.id),
        tipo,
        quantidade,
        nota: "Ajuste manual de estoque".to_string(),
        data_devolucao: None,
    }))
}

fn nota_remocao(nome: &str) -> String {
    let nota = format!("Material '{}' removido", nome);
    if nota.chars().count() <= NOTA_MAX_CHARS {
        return nota;
    }
    nota.chars().take(NOTA_MAX_CHARS - 1).chain(std::iter::once('…')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn material(quantidade: i32) -> Material {
        Material {
            id: Uuid::new_v4(),
            nome: "Caneta".into(),
            descricao: String::new(),
            imagem_url: None,
            quantidade,
            minimo: 0,
            criado_por: None,
            criado: Utc::now(),
        }
    }

    #[test]
    fn aumento_manual_vira_adicao() {
        let atual = material(10);
        let correcao = correcao_de_estoque(&atual, 14).unwrap().unwrap();
        assert_eq!(correcao.material_id, Some(atual.id));
        assert_eq!(correcao.tipo, TipoMovimento::Adicao);
        assert_eq!(correcao.quantidade, 4);
    }

    #[test]
    fn reducao_manual_vira_saida() {
        let correcao = correcao_de_estoque(&material(10), 3).unwrap().unwrap();
        assert_eq!(correcao.tipo, TipoMovimento::Saida);
        assert_eq!(correcao.quantidade, 7);
    }

    #[test]
    fn sem_mudanca_de_quantidade_nao_gera_movimento() {
        assert!(correcao_de_estoque(&material(10), 10).unwrap().is_none());
    }

    #[test]
    fn diferenca_maior_que_i32_e_recusada() {
        let atual = material(i32::MIN);
        assert!(matches!(
            correcao_de_estoque(&atual, i32::MAX),
            Err(AppError::QuantidadeForaDoLimite(id)) if id == atual.id
        ));
    }

    #[test]
    fn nota_de_remocao_cabe_na_coluna() {
        assert_eq!(nota_remocao("Caneta"), "Material 'Caneta' removido");

        let longo = "x".repeat(250);
        let nota = nota_remocao(&longo);
        assert_eq!(nota.chars().count(), NOTA_MAX_CHARS);
        assert!(nota.ends_with('…'));
    }
}
