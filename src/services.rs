pub mod calendar_service;
pub mod chat_service;
pub mod client_service;
pub mod finance_service;
pub mod identity;
pub mod journal_service;
pub mod profile_service;
pub mod settings_service;
pub mod task_service;
