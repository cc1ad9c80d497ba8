pub mod calendar_repo;
pub use calendar_repo::CalendarRepository;
pub mod chat_repo;
pub use chat_repo::ChatRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod journal_repo;
pub use journal_repo::JournalRepository;
pub mod policy_repo;
pub use policy_repo::PolicyRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod schema;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
