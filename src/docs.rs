// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::valuation;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Clients ---
        handlers::crm::list_clients,
        handlers::crm::get_client,
        handlers::crm::create_client,
        handlers::crm::update_client,
        handlers::crm::delete_client,
        handlers::crm::transfer_client,

        // --- Deal Valuation ---
        handlers::crm::get_deal_value,
        handlers::crm::quote_deal,
        handlers::finance::get_profitability,

        // --- Finance ---
        handlers::finance::list_payments,
        handlers::finance::create_payment,
        handlers::finance::list_expenses,
        handlers::finance::create_expense,

        // --- Calendar ---
        handlers::calendar::list_events,
        handlers::calendar::create_event,
        handlers::calendar::update_event,
        handlers::calendar::delete_event,

        // --- Tasks ---
        handlers::tasks::list_groups,
        handlers::tasks::create_group,
        handlers::tasks::update_group,
        handlers::tasks::delete_group,
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,

        // --- Journal ---
        handlers::journal::list_entries,
        handlers::journal::create_entry,
        handlers::journal::update_entry,
        handlers::journal::delete_entry,

        // --- Chat ---
        handlers::chat::list_messages,
        handlers::chat::send_message,
        handlers::chat::delete_message,

        // --- Profiles ---
        handlers::profiles::list_profiles,
        handlers::profiles::get_me,
        handlers::profiles::update_me,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- CRM ---
            models::crm::PipelineStage,
            models::crm::Client,
            models::crm::ClientView,
            models::crm::ClientPayload,
            models::crm::TransferClientPayload,
            models::crm::DealQuotePayload,

            // --- Valuation ---
            valuation::CommitmentLength,
            valuation::DealTerms,
            valuation::DealQuote,
            valuation::ProfitabilitySummary,

            // --- Finance ---
            models::finance::PaymentStatus,
            models::finance::ExpenseStatus,
            models::finance::Payment,
            models::finance::Expense,
            models::finance::PaymentPayload,
            models::finance::ExpensePayload,

            // --- Calendar ---
            models::calendar::CalendarEvent,
            models::calendar::EventPayload,

            // --- Tasks ---
            models::tasks::TaskStatus,
            models::tasks::TaskGroup,
            models::tasks::TaskGroupPayload,
            models::tasks::Task,
            models::tasks::TaskPayload,

            // --- Journal / Chat ---
            models::journal::JournalEntry,
            models::journal::JournalPayload,
            models::chat::ChatMessage,
            models::chat::ChatPayload,

            // --- Profiles ---
            models::profile::Role,
            models::profile::Profile,
            models::profile::ProfilePayload,

            // --- Settings ---
            models::settings::Currency,
            models::settings::TimeFormat,
            models::settings::UserSettings,
            models::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "Clients", description = "Pipeline de clientes"),
        (name = "Deal Valuation", description = "Valor do negócio e lucratividade"),
        (name = "Finance", description = "Pagamentos e despesas por cliente"),
        (name = "Calendar", description = "Agenda pessoal e eventos coletivos"),
        (name = "Tasks", description = "Tarefas e grupos da equipe"),
        (name = "Journal", description = "Diário pessoal"),
        (name = "Chat", description = "Chat da equipe"),
        (name = "Profiles", description = "Perfis dos membros"),
        (name = "Settings", description = "Preferências do usuário")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_area() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/clients",
            "/api/clients/{id}/deal-value",
            "/api/clients/{id}/profitability",
            "/api/calendar/events",
            "/api/tasks",
            "/api/journal",
            "/api/chat/messages",
            "/api/profiles/me",
            "/api/settings",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota ausente: {path}");
        }
    }
}
