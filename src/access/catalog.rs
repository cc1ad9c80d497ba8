// src/access/catalog.rs

use crate::access::policy::{Policy, PolicySet};
use crate::access::rule::Rule;
use crate::access::table::Table;

/// O catálogo de políticas do sistema: a divisão entre dados compartilhados e pessoais.
///
/// - Compartilhado (clientes, tarefas, grupos, pagamentos, despesas): qualquer
///   chamador autenticado lê e escreve.
/// - Pessoal (diário, preferências): só o dono.
/// - Agenda: o dono, mais todos os autenticados quando o evento é coletivo.
/// - Chat: todos leem, cada um só envia e apaga as próprias mensagens.
/// - Perfis: todos leem, cada um só escreve o próprio.
pub fn default_catalog() -> PolicySet {
    let mut policies = Vec::new();

    for table in [
        Table::Clients,
        Table::TaskGroups,
        Table::Tasks,
        Table::Payments,
        Table::Expenses,
    ] {
        policies.extend(team_table(table));
    }

    policies.extend(owner_table(Table::JournalEntries, true));
    policies.extend(owner_table(Table::UserSettings, false));

    // Agenda
    let events = Table::CalendarEvents;
    policies.push(Policy::select(name(events, "select", "own"), events, Rule::Owner));
    policies.push(Policy::select(name(events, "select", "collective"), events, Rule::SharedFlag));
    policies.push(Policy::insert(name(events, "insert", "own"), events, Rule::Owner));
    policies.push(Policy::update(name(events, "update", "own"), events, Rule::Owner, Some(Rule::Owner)));
    policies.push(Policy::delete(name(events, "delete", "own"), events, Rule::Owner));

    // Chat da equipe
    let chat = Table::ChatMessages;
    policies.push(Policy::select(name(chat, "select", "team"), chat, Rule::Authenticated));
    policies.push(Policy::insert(name(chat, "insert", "own"), chat, Rule::Owner));
    policies.push(Policy::delete(name(chat, "delete", "own"), chat, Rule::Owner));

    // Perfis
    let profiles = Table::Profiles;
    policies.push(Policy::select(name(profiles, "select", "team"), profiles, Rule::Authenticated));
    policies.push(Policy::insert(name(profiles, "insert", "own"), profiles, Rule::Owner));
    policies.push(Policy::update(name(profiles, "update", "own"), profiles, Rule::Owner, Some(Rule::Owner)));

    PolicySet::new(policies)
}

fn name(table: Table, verb: &str, scope: &str) -> String {
    format!("{}_{}_{}", table.name(), verb, scope)
}

fn team_table(table: Table) -> [Policy; 4] {
    [
        Policy::select(name(table, "select", "team"), table, Rule::Authenticated),
        Policy::insert(name(table, "insert", "team"), table, Rule::Authenticated),
        Policy::update(name(table, "update", "team"), table, Rule::Authenticated, Some(Rule::Authenticated)),
        Policy::delete(name(table, "delete", "team"), table, Rule::Authenticated),
    ]
}

fn owner_table(table: Table, deletable: bool) -> Vec<Policy> {
    let mut policies = vec![
        Policy::select(name(table, "select", "own"), table, Rule::Owner),
        Policy::insert(name(table, "insert", "own"), table, Rule::Owner),
        Policy::update(name(table, "update", "own"), table, Rule::Owner, Some(Rule::Owner)),
    ];
    if deletable {
        policies.push(Policy::delete(name(table, "delete", "own"), table, Rule::Owner));
    }
    policies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::policy::Verb;
    use crate::access::table::{GovernedRow, RowFacts};
    use crate::models::identity::Caller;
    use std::collections::HashSet;
    use uuid::Uuid;

    struct Event {
        owner: Uuid,
        collective: bool,
    }

    impl GovernedRow for Event {
        const TABLE: Table = Table::CalendarEvents;

        fn facts(&self) -> RowFacts {
            RowFacts::owned_by(Some(self.owner)).with_shared(self.collective)
        }
    }

    struct Entry {
        owner: Option<Uuid>,
    }

    impl GovernedRow for Entry {
        const TABLE: Table = Table::JournalEntries;

        fn facts(&self) -> RowFacts {
            RowFacts::owned_by(self.owner)
        }
    }

    #[test]
    fn policy_names_are_unique() {
        let catalog = default_catalog();
        let names: HashSet<&str> = catalog.policies().iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), catalog.policies().len());
    }

    #[test]
    fn every_table_has_a_read_policy() {
        let catalog = default_catalog();
        for table in Table::ALL {
            assert!(
                catalog.for_table(table).any(|p| p.verb() == Verb::Select),
                "sem política de leitura para {}",
                table.name()
            );
        }
    }

    #[test]
    fn personal_event_is_hidden_from_other_users() {
        let catalog = default_catalog();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let events = vec![
            Event { owner: alice, collective: false },
            Event { owner: alice, collective: true },
        ];

        let seen_by_alice = catalog.visible(&Caller::authenticated(alice), events);
        assert_eq!(seen_by_alice.len(), 2);

        let seen_by_bob = catalog.visible(&Caller::authenticated(bob), seen_by_alice);
        assert_eq!(seen_by_bob.len(), 1);
        assert!(seen_by_bob[0].collective);
    }

    #[test]
    fn anonymous_sees_no_personal_rows_even_when_owner_is_null() {
        let catalog = default_catalog();
        let entries = vec![
            Entry { owner: None },
            Entry { owner: Some(Uuid::new_v4()) },
        ];
        assert!(catalog.visible(&Caller::Anonymous, entries).is_empty());

        let events = vec![Event { owner: Uuid::new_v4(), collective: true }];
        assert!(catalog.visible(&Caller::Anonymous, events).is_empty());
    }

    #[test]
    fn anonymous_cannot_touch_team_tables() {
        let catalog = default_catalog();
        let row = RowFacts::default();
        for table in [Table::Clients, Table::Tasks, Table::Payments, Table::ChatMessages] {
            assert!(!catalog.permits(table, Verb::Select, &Caller::Anonymous, Some(&row), None));
            assert!(!catalog.permits(table, Verb::Insert, &Caller::Anonymous, None, Some(&row)));
        }
    }

    #[test]
    fn team_tables_ignore_ownership() {
        let catalog = default_catalog();
        let caller = Caller::authenticated(Uuid::new_v4());
        let someone_elses = RowFacts::owned_by(Some(Uuid::new_v4()));

        assert!(catalog.permits(Table::Clients, Verb::Select, &caller, Some(&someone_elses), None));
        assert!(catalog.permits(Table::Clients, Verb::Delete, &caller, Some(&someone_elses), None));
        assert!(catalog.permits(Table::Tasks, Verb::Update, &caller, Some(&someone_elses), Some(&someone_elses)));
    }

    #[test]
    fn collective_events_stay_read_only_for_non_owners() {
        let catalog = default_catalog();
        let bob = Caller::authenticated(Uuid::new_v4());
        let alices_collective = RowFacts::owned_by(Some(Uuid::new_v4())).with_shared(true);

        assert!(catalog.permits(Table::CalendarEvents, Verb::Select, &bob, Some(&alices_collective), None));
        assert!(!catalog.permits(
            Table::CalendarEvents,
            Verb::Update,
            &bob,
            Some(&alices_collective),
            Some(&alices_collective)
        ));
        assert!(!catalog.permits(Table::CalendarEvents, Verb::Delete, &bob, Some(&alices_collective), None));
    }

    #[test]
    fn chat_messages_cannot_be_sent_on_behalf_of_someone_else() {
        let catalog = default_catalog();
        let me = Uuid::new_v4();
        let caller = Caller::authenticated(me);

        assert!(catalog.permits(Table::ChatMessages, Verb::Insert, &caller, None, Some(&RowFacts::owned_by(Some(me)))));
        assert!(!catalog.permits(
            Table::ChatMessages,
            Verb::Insert,
            &caller,
            None,
            Some(&RowFacts::owned_by(Some(Uuid::new_v4())))
        ));
    }
}
