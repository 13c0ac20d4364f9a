// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::models::movimento::TipoMovimento;

// Erro de domínio. Vira `ApiError` (traduzido) na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Empréstimo sem data de devolução")]
    EmprestimoSemPrazo,

    #[error("Quantidade inválida: {0}")]
    QuantidadeInvalida(i32),

    #[error("Tipo de movimento reservado: {0:?}")]
    TipoReservado(TipoMovimento),

    #[error("Material {0} não encontrado")]
    MaterialNotFound(Uuid),

    #[error("Quantidade do material {0} fora do limite")]
    QuantidadeForaDoLimite(Uuid),

    #[error("Movimento {0} não encontrado")]
    MovimentoNotFound(Uuid),

    #[error("Movimento {0} não é um empréstimo em aberto")]
    NaoEhEmprestimo(Uuid),

    #[error("Notificação {0} não encontrada")]
    NotificacaoNotFound(Uuid),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Usuário '{0}' já existe")]
    UsernameAlreadyExists(String),

    #[error("Permissão '{0}' necessária")]
    PermissionRequired(&'static str),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Corpo de erro devolvido ao cliente.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::EmprestimoSemPrazo
            | AppError::QuantidadeInvalida(_)
            | AppError::TipoReservado(_) => StatusCode::BAD_REQUEST,
            AppError::MaterialNotFound(_)
            | AppError::MovimentoNotFound(_)
            | AppError::NotificacaoNotFound(_)
            | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::NaoEhEmprestimo(_) | AppError::UsernameAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::QuantidadeForaDoLimite(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::PermissionRequired(_) => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) | AppError::JwtError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte o erro na resposta HTTP, com a mensagem no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let (key, args): (&str, Vec<(&str, String)>) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status,
                    error: i18n.translate(lang, "validation.invalid", &[]),
                    details: Some(json!(details)),
                };
            }
            AppError::EmprestimoSemPrazo => ("loan.missing_due_date", vec![]),
            AppError::QuantidadeInvalida(q) => ("movement.invalid_quantity", vec![("quantidade", q.to_string())]),
            AppError::TipoReservado(tipo) => ("movement.reserved_type", vec![("tipo", tipo.label().to_string())]),
            AppError::MaterialNotFound(id) => ("material.not_found", vec![("id", id.to_string())]),
            AppError::QuantidadeForaDoLimite(id) => ("material.quantity_out_of_range", vec![("id", id.to_string())]),
            AppError::MovimentoNotFound(id) => ("movement.not_found", vec![("id", id.to_string())]),
            AppError::NaoEhEmprestimo(id) => ("movement.not_a_loan", vec![("id", id.to_string())]),
            AppError::NotificacaoNotFound(id) => ("notification.not_found", vec![("id", id.to_string())]),
            AppError::InvalidToken => ("auth.invalid_token", vec![]),
            AppError::UserNotFound => ("auth.user_not_found", vec![]),
            AppError::UsernameAlreadyExists(username) => ("auth.username_taken", vec![("username", username.clone())]),
            AppError::PermissionRequired(slug) => ("auth.permission_required", vec![("permission", slug.to_string())]),

            // Os detalhes ficam no log, nunca na resposta.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) | AppError::JwtError(_) => {
                tracing::error!(error = ?self, "Erro Interno do Servidor: {}", self);
                ("internal", vec![])
            }
        };

        ApiError {
            status,
            error: i18n.translate(lang, key, &args),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn pt() -> Locale {
        Locale("pt".into())
    }

    #[test]
    fn erros_de_dominio_tem_o_status_certo() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::EmprestimoSemPrazo.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MaterialNotFound(id).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NaoEhEmprestimo(id).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::PermissionRequired("materiais:delete").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::QuantidadeForaDoLimite(id).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validacao_lista_detalhes_por_campo() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("required");
        err.message = Some("O campo 'dataDevolucao' é obrigatório.".into());
        errors.add("dataDevolucao", err);

        let api = AppError::ValidationError(errors).to_api_error(&pt(), I18nStore::shared());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Um ou mais campos são inválidos.");
        let details = api.details.unwrap();
        assert_eq!(details["dataDevolucao"][0], "O campo 'dataDevolucao' é obrigatório.");
    }

    #[test]
    fn erro_interno_nao_vaza_detalhes() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&Locale("en".into()), I18nStore::shared());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }
}
