// src/handlers/materials.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermMaterialDelete, RequirePermission},
    },
    models::material::{Material, MaterialResumo, NovoMaterial},
};

// ---
// Payload: Material (criação e edição)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório (até 200 caracteres)."))]
    #[schema(example = "Caneta azul")]
    pub nome: String,

    #[serde(default)]
    pub descricao: String,

    pub imagem_url: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantidade: i32,

    // Quantidade ideal
    #[serde(default)]
    #[validate(range(min = 0, message = "O mínimo não pode ser negativo."))]
    pub minimo: i32,
}

impl From<MaterialPayload> for NovoMaterial {
    fn from(payload: MaterialPayload) -> Self {
        Self {
            nome: payload.nome.trim().to_string(),
            descricao: payload.descricao,
            imagem_url: payload.imagem_url.filter(|url| !url.trim().is_empty()),
            quantidade: payload.quantidade,
            minimo: payload.minimo,
        }
    }
}

// GET /api/materials
#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Materiais",
    responses(
        (status = 200, description = "Listagem enxuta de materiais", body = Vec<MaterialResumo>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_material_summaries(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let resumos = app_state
        .material_service
        .list_summaries(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(resumos)))
}

// GET /api/materiais
#[utoipa::path(
    get,
    path = "/api/materiais",
    tag = "Materiais",
    responses(
        (status = 200, description = "Materiais ordenados por nome", body = Vec<Material>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let materiais = app_state
        .material_service
        .list_materials(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(materiais)))
}

// POST /api/materiais
#[utoipa::path(
    post,
    path = "/api/materiais",
    tag = "Materiais",
    request_body = MaterialPayload,
    responses(
        (status = 201, description = "Material criado", body = Material),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<MaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state
        .material_service
        .create_material(&app_state.db_pool, &payload.into(), Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(material)))
}

// GET /api/materiais/{id}
#[utoipa::path(
    get,
    path = "/api/materiais/{id}",
    tag = "Materiais",
    params(("id" = Uuid, Path, description = "ID do material")),
    responses(
        (status = 200, description = "Material", body = Material),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_material(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .material_service
        .get_material(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// PUT /api/materiais/{id}
#[utoipa::path(
    put,
    path = "/api/materiais/{id}",
    tag = "Materiais",
    params(("id" = Uuid, Path, description = "ID do material")),
    request_body = MaterialPayload,
    responses(
        (status = 200, description = "Material atualizado; mudança de quantidade vira movimento", body = Material),
        (status = 404, description = "Não encontrado"),
        (status = 422, description = "Quantidade fora do limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let material = app_state
        .material_service
        .update_material(&app_state.db_pool, id, &payload.into(), Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// DELETE /api/materiais/{id} (apenas staff)
#[utoipa::path(
    delete,
    path = "/api/materiais/{id}",
    tag = "Materiais",
    params(("id" = Uuid, Path, description = "ID do material")),
    responses(
        (status = 204, description = "Material removido; histórico preservado"),
        (status = 403, description = "Apenas staff"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermMaterialDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .material_service
        .delete_material(&app_state.db_pool, id, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/alertas
#[utoipa::path(
    get,
    path = "/api/alertas",
    tag = "Materiais",
    responses(
        (status = 200, description = "Materiais abaixo do mínimo", body = Vec<Material>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let alertas = app_state
        .material_service
        .list_alerts(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(alertas)))
}
