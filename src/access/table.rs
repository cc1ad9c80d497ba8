// src/access/table.rs

use serde::Serialize;
use uuid::Uuid;

// As tabelas governadas por políticas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Clients,
    CalendarEvents,
    TaskGroups,
    Tasks,
    JournalEntries,
    ChatMessages,
    Payments,
    Expenses,
    UserSettings,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Profiles,
        Table::Clients,
        Table::CalendarEvents,
        Table::TaskGroups,
        Table::Tasks,
        Table::JournalEntries,
        Table::ChatMessages,
        Table::Payments,
        Table::Expenses,
        Table::UserSettings,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Clients => "clients",
            Table::CalendarEvents => "calendar_events",
            Table::TaskGroups => "task_groups",
            Table::Tasks => "tasks",
            Table::JournalEntries => "journal_entries",
            Table::ChatMessages => "chat_messages",
            Table::Payments => "payments",
            Table::Expenses => "expenses",
            Table::UserSettings => "user_settings",
        }
    }

    /// Coluna canônica de dono. Existe no máximo uma por entidade.
    pub const fn owner_column(self) -> Option<&'static str> {
        match self {
            Table::Profiles => Some("id"),
            Table::Clients | Table::Tasks => Some("assigned_to"),
            Table::CalendarEvents | Table::JournalEntries | Table::UserSettings => Some("user_id"),
            Table::ChatMessages => Some("sender_id"),
            Table::TaskGroups | Table::Payments | Table::Expenses => None,
        }
    }

    /// Coluna booleana que torna a linha visível para toda a equipe.
    /// `tasks.is_shared` não entra aqui: tarefas já são da equipe e o campo é só exibição.
    pub const fn shared_flag_column(self) -> Option<&'static str> {
        match self {
            Table::CalendarEvents => Some("is_collective"),
            _ => None,
        }
    }
}

// Os únicos fatos de uma linha que as políticas enxergam
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFacts {
    pub owner: Option<Uuid>,
    pub shared: bool,
}

impl RowFacts {
    pub fn owned_by(owner: Option<Uuid>) -> Self {
        Self { owner, shared: false }
    }

    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }
}

/// Implementado pelos modelos persistidos em tabelas governadas.
pub trait GovernedRow {
    const TABLE: Table;

    fn facts(&self) -> RowFacts;
}
