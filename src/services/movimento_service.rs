// src/services/movimento_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MaterialRepository, MovimentoRepository},
    models::movimento::{Movimento, MovimentoDetalhe, NovoMovimento, TipoMovimento},
    services::{notification_service::NotificationService, reconciliation::PlanoAjuste},
};

// Tamanho do lote na limpeza "segura" do histórico
const CLEAR_CHUNK_SIZE: i64 = 1000;

#[derive(Clone)]
pub struct MovimentoService {
    movimento_repo: MovimentoRepository,
    material_repo: MaterialRepository,
    notification_service: NotificationService,
}

impl MovimentoService {
    pub fn new(
        movimento_repo: MovimentoRepository,
        material_repo: MaterialRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self { movimento_repo, material_repo, notification_service }
    }

    // --- LEITURA ---

    pub async fn list_movimentos<'e, E>(
        &self,
        executor: E,
        material_id: Option<Uuid>,
        hoje: NaiveDate,
    ) -> Result<Vec<MovimentoDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.movimento_repo.list(executor, material_id).await?;
        Ok(rows.into_iter().map(|row| MovimentoDetalhe::new(row, hoje)).collect())
    }

    pub async fn get_movimento<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        hoje: NaiveDate,
    ) -> Result<MovimentoDetalhe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = self
            .movimento_repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::MovimentoNotFound(id))?;
        Ok(MovimentoDetalhe::new(row, hoje))
    }

    pub async fn list_loans<'e, E>(&self, executor: E, hoje: NaiveDate) -> Result<Vec<MovimentoDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.movimento_repo.list_loans(executor).await?;
        Ok(rows.into_iter().map(|row| MovimentoDetalhe::new(row, hoje)).collect())
    }

    pub async fn count_movimentos<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.movimento_repo.count(executor).await
    }

    // --- CRIAÇÃO ---

    /// Registra o movimento e aplica seu efeito ao material, tudo numa transação.
    /// Com `ajustar_material = false` só o registro é gravado (estoque inicial,
    /// limpeza em massa).
    pub async fn create_movimento<'e, E>(
        &self,
        executor: E,
        input: &NovoMovimento,
        usuario_id: Option<Uuid>,
        ajustar_material: bool,
    ) -> Result<Movimento, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // Validação antes de qualquer escrita
        input.validar()?;

        let mut tx = executor.begin().await?;

        self.ensure_material_exists(&mut tx, input.material_id).await?;

        let movimento = self.movimento_repo.insert(&mut *tx, input, usuario_id).await?;

        if ajustar_material {
            let plano = PlanoAjuste::criacao(&movimento.estado());
            self.aplicar_plano(&mut tx, &plano).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "📦 Movimento {} registrado: {} x{} (material {:?})",
            movimento.id, movimento.tipo.label(), movimento.quantidade, movimento.material_id
        );
        Ok(movimento)
    }

    // --- EDIÇÃO ---

    /// Desfaz o efeito anterior e aplica o novo, com o movimento travado (FOR UPDATE).
    pub async fn update_movimento<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &NovoMovimento,
    ) -> Result<Movimento, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        input.validar()?;

        let mut tx = executor.begin().await?;

        let anterior = self
            .movimento_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MovimentoNotFound(id))?;

        // Registro de remoção de material não é editável
        if anterior.tipo == TipoMovimento::Delete {
            return Err(AppError::TipoReservado(anterior.tipo));
        }

        if input.material_id != anterior.material_id {
            self.ensure_material_exists(&mut tx, input.material_id).await?;
        }

        let atualizado = self.replace_locked(&mut tx, &anterior, input).await?;

        tx.commit().await?;
        Ok(atualizado)
    }

    /// Devolução: o EMPRESTIMO vira DEVOLVIDO pelo mesmo caminho da edição.
    pub async fn return_loan<'e, E>(&self, executor: E, id: Uuid) -> Result<Movimento, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let anterior = self
            .movimento_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MovimentoNotFound(id))?;

        if anterior.tipo != TipoMovimento::Emprestimo {
            return Err(AppError::NaoEhEmprestimo(id));
        }

        let devolvido = NovoMovimento {
            tipo: TipoMovimento::Devolvido,
            ..NovoMovimento::from(&anterior)
        };
        let atualizado = self.replace_locked(&mut tx, &anterior, &devolvido).await?;

        tx.commit().await?;
        tracing::info!("↩️ Empréstimo {} devolvido", id);
        Ok(atualizado)
    }

    // --- REMOÇÃO ---

    pub async fn delete_movimento<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        ajustar_material: bool,
    ) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let anterior = self
            .movimento_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MovimentoNotFound(id))?;

        self.movimento_repo.delete(&mut *tx, id).await?;

        if ajustar_material {
            let plano = PlanoAjuste::remocao(&anterior.estado());
            self.aplicar_plano(&mut tx, &plano).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove todo o histórico SEM alterar as quantidades dos materiais.
    /// `fast`: um único DELETE em massa; caso contrário, em lotes.
    pub async fn clear_movimentos<'e, E>(&self, executor: E, fast: bool) -> Result<u64, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.movimento_repo.count(&mut *tx).await? == 0 {
            return Ok(0);
        }

        let removidos = if fast {
            self.movimento_repo.delete_all(&mut *tx).await?
        } else {
            let mut total = 0;
            loop {
                let removidos = self.movimento_repo.delete_chunk(&mut *tx, CLEAR_CHUNK_SIZE).await?;
                if removidos == 0 {
                    break;
                }
                total += removidos;
            }
            total
        };

        tx.commit().await?;
        tracing::warn!("🧹 {} movimentos removidos (quantidades dos materiais mantidas)", removidos);
        Ok(removidos)
    }

    // --- INTERNOS ---

    async fn replace_locked(
        &self,
        conn: &mut PgConnection,
        anterior: &Movimento,
        input: &NovoMovimento,
    ) -> Result<Movimento, AppError> {
        let atualizado = self.movimento_repo.update(&mut *conn, anterior.id, input).await?;

        let plano = PlanoAjuste::atualizacao(&anterior.estado(), &atualizado.estado());
        self.aplicar_plano(conn, &plano).await?;
        Ok(atualizado)
    }

    async fn ensure_material_exists(
        &self,
        conn: &mut PgConnection,
        material_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(material_id) = material_id {
            self.material_repo
                .find_by_id(&mut *conn, material_id)
                .await?
                .ok_or(AppError::MaterialNotFound(material_id))?;
        }
        Ok(())
    }

    /// Aplica os ajustes do plano e dispara as notificações de estoque baixo.
    async fn aplicar_plano(&self, conn: &mut PgConnection, plano: &PlanoAjuste) -> Result<(), AppError> {
        if plano.is_empty() {
            return Ok(());
        }

        // Ajustes em ordem de id: a trava de cada material segue sempre a mesma ordem.
        let mut ajustados = Vec::with_capacity(plano.ajustes().len());
        for ajuste in plano.ajustes() {
            // Material removido entre a leitura e o ajuste: nada a fazer.
            let Some(atual) = self
                .material_repo
                .find_for_update(&mut *conn, ajuste.material_id)
                .await?
            else {
                continue;
            };

            if plano.quantidade_final(atual.id, atual.quantidade).is_none() {
                return Err(AppError::QuantidadeForaDoLimite(atual.id));
            }

            if let Some(material) = self
                .material_repo
                .adjust_quantity(&mut *conn, ajuste.material_id, ajuste.delta)
                .await?
            {
                ajustados.push(material);
            }
        }

        self.notification_service.notify_below_minimum(conn, &ajustados).await;
        Ok(())
    }
}
