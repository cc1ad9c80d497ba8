// src/router.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::identity_layer};

pub fn build_router(app_state: AppState) -> Router {
    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::crm::list_clients).post(handlers::crm::create_client),
        )
        .route("/quote", post(handlers::crm::quote_deal))
        .route(
            "/{id}",
            get(handlers::crm::get_client)
                .put(handlers::crm::update_client)
                .delete(handlers::crm::delete_client),
        )
        .route("/{id}/transfer", post(handlers::crm::transfer_client))
        .route("/{id}/deal-value", get(handlers::crm::get_deal_value))
        .route("/{id}/profitability", get(handlers::finance::get_profitability))
        .route(
            "/{id}/payments",
            get(handlers::finance::list_payments).post(handlers::finance::create_payment),
        )
        .route(
            "/{id}/expenses",
            get(handlers::finance::list_expenses).post(handlers::finance::create_expense),
        );

    let calendar_routes = Router::new()
        .route(
            "/events",
            get(handlers::calendar::list_events).post(handlers::calendar::create_event),
        )
        .route(
            "/events/{id}",
            put(handlers::calendar::update_event).delete(handlers::calendar::delete_event),
        );

    let api_routes = Router::new()
        .nest("/clients", client_routes)
        .nest("/calendar", calendar_routes)
        .route(
            "/task-groups",
            get(handlers::tasks::list_groups).post(handlers::tasks::create_group),
        )
        .route(
            "/task-groups/{id}",
            put(handlers::tasks::update_group).delete(handlers::tasks::delete_group),
        )
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            put(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        .route(
            "/journal",
            get(handlers::journal::list_entries).post(handlers::journal::create_entry),
        )
        .route(
            "/journal/{id}",
            put(handlers::journal::update_entry).delete(handlers::journal::delete_entry),
        )
        .route(
            "/chat/messages",
            get(handlers::chat::list_messages).post(handlers::chat::send_message),
        )
        .route("/chat/messages/{id}", axum::routing::delete(handlers::chat::delete_message))
        .route("/profiles", get(handlers::profiles::list_profiles))
        .route(
            "/profiles/me",
            get(handlers::profiles::get_me).put(handlers::profiles::update_me),
        )
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        // Todas as rotas de dados passam pela resolução do chamador
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            identity_layer,
        ))
        .route("/health", get(|| async { "OK" }));

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
