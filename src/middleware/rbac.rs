// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::User,
};

/// O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn allows(user: &User) -> bool;
}

/// O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Usuário não autenticado"))?;

        if !T::allows(&user.0) {
            tracing::warn!("⛔ {} sem a permissão '{}'", user.0.username, T::slug());
            return Err(AppError::PermissionRequired(T::slug())
                .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

// Remover materiais é restrito à equipe (staff)
pub struct PermMaterialDelete;
impl PermissionDef for PermMaterialDelete {
    fn slug() -> &'static str { "materiais:delete" }
    fn allows(user: &User) -> bool { user.is_staff }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(is_staff: bool) -> User {
        User { id: Uuid::new_v4(), username: "ana".into(), is_staff, criado: Utc::now() }
    }

    #[test]
    fn somente_staff_remove_materiais() {
        assert!(PermMaterialDelete::allows(&user(true)));
        assert!(!PermMaterialDelete::allows(&user(false)));
    }
}
