// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas protegidas pelo Bearer token
    let api_routes = Router::new()
        .route("/materials", get(handlers::materials::list_material_summaries))
        .route("/materiais"
               ,post(handlers::materials::create_material)
               .get(handlers::materials::list_materials)
        )
        .route("/materiais/{id}"
               ,get(handlers::materials::get_material)
               .put(handlers::materials::update_material)
               .delete(handlers::materials::delete_material)
        )
        .route("/alertas", get(handlers::materials::list_alerts))
        .route("/movimentos"
               ,post(handlers::movimentos::create_movimento)
               .get(handlers::movimentos::list_movimentos)
        )
        .route("/movimentos/{id}"
               ,get(handlers::movimentos::get_movimento)
               .put(handlers::movimentos::update_movimento)
               .delete(handlers::movimentos::delete_movimento)
        )
        .route("/movimentos/{id}/devolver", post(handlers::movimentos::return_loan))
        .route("/emprestimos", get(handlers::movimentos::list_loans))
        .route("/notificacoes", get(handlers::notifications::list_notifications))
        .route("/notificacoes/{id}/lida", post(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .with_state(app_state)
}
