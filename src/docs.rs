// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Materiais ---
        handlers::materials::list_material_summaries,
        handlers::materials::list_materials,
        handlers::materials::create_material,
        handlers::materials::get_material,
        handlers::materials::update_material,
        handlers::materials::delete_material,
        handlers::materials::list_alerts,

        // --- Movimentos ---
        handlers::movimentos::list_movimentos,
        handlers::movimentos::create_movimento,
        handlers::movimentos::get_movimento,
        handlers::movimentos::update_movimento,
        handlers::movimentos::delete_movimento,

        // --- Empréstimos ---
        handlers::movimentos::return_loan,
        handlers::movimentos::list_loans,

        // --- Notificações ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
    ),
    components(
        schemas(
            models::auth::User,
            models::material::Material,
            models::material::MaterialResumo,
            models::movimento::TipoMovimento,
            models::movimento::StatusEmprestimo,
            models::movimento::Movimento,
            models::movimento::MovimentoDetalhe,
            models::notification::Notificacao,

            // --- Payloads ---
            handlers::materials::MaterialPayload,
            handlers::movimentos::MovimentoPayload,
        )
    ),
    tags(
        (name = "Materiais", description = "Cadastro de materiais e alertas de estoque mínimo"),
        (name = "Movimentos", description = "Livro-razão de movimentos de estoque"),
        (name = "Empréstimos", description = "Controle de empréstimos e devoluções"),
        (name = "Notificações", description = "Avisos de estoque abaixo do mínimo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
