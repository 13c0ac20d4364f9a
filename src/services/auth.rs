// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    /// Cria o usuário (equipe ou não) e devolve o token de acesso.
    pub async fn create_user(&self, username: &str, is_staff: bool) -> Result<(User, String), AppError> {
        let user = self.user_repo.create_user(username, is_staff).await?;
        tracing::info!("👤 Usuário '{}' criado (staff: {})", user.username, user.is_staff);
        let token = self.create_token(user.id)?;
        Ok((user, token))
    }

    pub async fn issue_token(&self, username: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::UserNotFound)?;
        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // Pool preguiçoso: nenhum teste aqui toca o banco.
    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/estoque_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool), secret.to_string())
    }

    #[tokio::test]
    async fn token_emitido_e_decodificado_com_o_mesmo_segredo() {
        let auth = service("segredo");
        let user_id = Uuid::new_v4();
        let token = auth.create_token(user_id).unwrap();
        assert_eq!(auth.decode_token(&token).unwrap().sub, user_id);
    }

    #[tokio::test]
    async fn token_de_outro_segredo_e_invalido() {
        let token = service("um").create_token(Uuid::new_v4()).unwrap();
        assert!(matches!(service("outro").decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn lixo_nao_e_token() {
        assert!(matches!(service("s").validate_token("abc.def").await, Err(AppError::InvalidToken)));
    }
}
