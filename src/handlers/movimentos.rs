// src/handlers/movimentos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::movimento::{Movimento, MovimentoDetalhe, NovoMovimento, TipoMovimento},
};

// O status de empréstimo é relativo ao dia local do servidor
fn hoje() -> NaiveDate {
    Local::now().date_naive()
}

// ---
// Payload: Movimento
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovimentoPayload {
    #[validate(required(message = "O campo 'materialId' é obrigatório."))]
    pub material_id: Option<Uuid>,

    pub tipo: TipoMovimento,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantidade: i32,

    #[serde(default)]
    #[validate(length(max = 200, message = "A nota deve ter até 200 caracteres."))]
    pub nota: String,

    // Obrigatória para EMPRESTIMO. Formato YYYY-MM-DD
    pub data_devolucao: Option<NaiveDate>,
}

impl MovimentoPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        if self.tipo == TipoMovimento::Emprestimo && self.data_devolucao.is_none() {
            let mut err = ValidationError::new("required");
            err.message = Some("Empréstimos precisam de uma data de devolução.".into());
            return Err(err);
        }
        Ok(())
    }

    /// Validação completa do payload, antes de qualquer acesso ao banco.
    fn check(&self) -> Result<(), AppError> {
        self.validate()?;

        self.validate_consistency().map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("dataDevolucao", e);
            AppError::ValidationError(errors)
        })?;

        // DELETE só é gerado pelo sistema ao remover um material
        if self.tipo == TipoMovimento::Delete {
            return Err(AppError::TipoReservado(self.tipo));
        }
        Ok(())
    }
}

impl From<MovimentoPayload> for NovoMovimento {
    fn from(payload: MovimentoPayload) -> Self {
        Self {
            material_id: payload.material_id,
            tipo: payload.tipo,
            quantidade: payload.quantidade,
            nota: payload.nota.trim().to_string(),
            data_devolucao: payload.data_devolucao,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMovimentosQuery {
    /// Filtra pelo material
    pub material_id: Option<Uuid>,
}

// GET /api/movimentos
#[utoipa::path(
    get,
    path = "/api/movimentos",
    tag = "Movimentos",
    params(ListMovimentosQuery),
    responses(
        (status = 200, description = "Histórico de movimentos (mais recentes primeiro)", body = Vec<MovimentoDetalhe>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movimentos(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListMovimentosQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let movimentos = app_state
        .movimento_service
        .list_movimentos(&app_state.db_pool, query.material_id, hoje())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movimentos)))
}

// POST /api/movimentos
#[utoipa::path(
    post,
    path = "/api/movimentos",
    tag = "Movimentos",
    request_body = MovimentoPayload,
    responses(
        (status = 201, description = "Movimento registrado e quantidade ajustada", body = Movimento),
        (status = 400, description = "Dados inválidos (ex: empréstimo sem data)"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movimento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<MovimentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .check()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movimento = app_state
        .movimento_service
        .create_movimento(&app_state.db_pool, &payload.into(), Some(user.0.id), true)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movimento)))
}

// GET /api/movimentos/{id}
#[utoipa::path(
    get,
    path = "/api/movimentos/{id}",
    tag = "Movimentos",
    params(("id" = Uuid, Path, description = "ID do movimento")),
    responses(
        (status = 200, description = "Movimento", body = MovimentoDetalhe),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_movimento(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movimento = app_state
        .movimento_service
        .get_movimento(&app_state.db_pool, id, hoje())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movimento)))
}

// PUT /api/movimentos/{id}
#[utoipa::path(
    put,
    path = "/api/movimentos/{id}",
    tag = "Movimentos",
    params(("id" = Uuid, Path, description = "ID do movimento")),
    request_body = MovimentoPayload,
    responses(
        (status = 200, description = "Efeito anterior desfeito e novo aplicado", body = Movimento),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_movimento(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovimentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .check()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movimento = app_state
        .movimento_service
        .update_movimento(&app_state.db_pool, id, &payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movimento)))
}

// DELETE /api/movimentos/{id}
#[utoipa::path(
    delete,
    path = "/api/movimentos/{id}",
    tag = "Movimentos",
    params(("id" = Uuid, Path, description = "ID do movimento")),
    responses(
        (status = 204, description = "Movimento removido e efeito desfeito"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_movimento(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .movimento_service
        .delete_movimento(&app_state.db_pool, id, true)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/movimentos/{id}/devolver
#[utoipa::path(
    post,
    path = "/api/movimentos/{id}/devolver",
    tag = "Empréstimos",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Empréstimo marcado como devolvido", body = Movimento),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "O movimento não é um empréstimo em aberto")
    ),
    security(("api_jwt" = []))
)]
pub async fn return_loan(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movimento = app_state
        .movimento_service
        .return_loan(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movimento)))
}

// GET /api/emprestimos
#[utoipa::path(
    get,
    path = "/api/emprestimos",
    tag = "Empréstimos",
    responses(
        (status = 200, description = "Empréstimos com status derivado", body = Vec<MovimentoDetalhe>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_loans(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let emprestimos = app_state
        .movimento_service
        .list_loans(&app_state.db_pool, hoje())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(emprestimos)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tipo: TipoMovimento, data_devolucao: Option<NaiveDate>) -> MovimentoPayload {
        MovimentoPayload {
            material_id: Some(Uuid::new_v4()),
            tipo,
            quantidade: 2,
            nota: "  retirada  ".into(),
            data_devolucao,
        }
    }

    #[test]
    fn emprestimo_sem_data_aponta_o_campo() {
        let err = payload(TipoMovimento::Emprestimo, None).check().unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("esperava erro de validação");
        };
        assert!(errors.field_errors().contains_key("dataDevolucao"));
    }

    #[test]
    fn delete_e_reservado() {
        assert!(matches!(
            payload(TipoMovimento::Delete, None).check(),
            Err(AppError::TipoReservado(TipoMovimento::Delete))
        ));
    }

    #[test]
    fn quantidade_zero_e_invalida() {
        let mut p = payload(TipoMovimento::Entrada, None);
        p.quantidade = 0;
        assert!(matches!(p.check(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn material_e_obrigatorio() {
        let mut p = payload(TipoMovimento::Saida, None);
        p.material_id = None;
        assert!(matches!(p.check(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn payload_valido_vira_novo_movimento() {
        let p = payload(TipoMovimento::Saida, None);
        assert!(p.check().is_ok());
        let novo = NovoMovimento::from(p);
        assert_eq!(novo.nota, "retirada");
        assert_eq!(novo.tipo, TipoMovimento::Saida);
    }
}
