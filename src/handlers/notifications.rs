// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::notification::Notificacao,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListNotificacoesQuery {
    /// Só as não lidas
    #[serde(default)]
    pub apenas_nao_lidas: bool,
}

// GET /api/notificacoes
#[utoipa::path(
    get,
    path = "/api/notificacoes",
    tag = "Notificações",
    params(ListNotificacoesQuery),
    responses(
        (status = 200, description = "Notificações do usuário autenticado", body = Vec<Notificacao>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ListNotificacoesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let notificacoes = app_state
        .notification_service
        .list_for_user(&app_state.db_pool, user.0.id, query.apenas_nao_lidas)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(notificacoes)))
}

// POST /api/notificacoes/{id}/lida
#[utoipa::path(
    post,
    path = "/api/notificacoes/{id}/lida",
    tag = "Notificações",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 200, description = "Notificação marcada como lida", body = Notificacao),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notificacao = app_state
        .notification_service
        .mark_read(&app_state.db_pool, id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(notificacao)))
}
