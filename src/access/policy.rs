// src/access/policy.rs

use crate::access::rule::Rule;
use crate::access::table::{GovernedRow, RowFacts, Table};
use crate::common::error::AppError;
use crate::models::identity::Caller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Select,
    Insert,
    Update,
    Delete,
}

impl Verb {
    pub const fn keyword(self) -> &'static str {
        match self {
            Verb::Select => "SELECT",
            Verb::Insert => "INSERT",
            Verb::Update => "UPDATE",
            Verb::Delete => "DELETE",
        }
    }
}

/// Uma política nomeada, restrita a uma tabela e a um verbo.
///
/// Os construtores garantem o formato que o Postgres aceita:
/// SELECT/DELETE só têm USING, INSERT só tem WITH CHECK e UPDATE tem os dois
/// (sem WITH CHECK, o USING vale também para a linha nova).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    name: String,
    table: Table,
    verb: Verb,
    using: Option<Rule>,
    check: Option<Rule>,
}

impl Policy {
    pub fn select(name: impl Into<String>, table: Table, using: Rule) -> Self {
        Self { name: name.into(), table, verb: Verb::Select, using: Some(using), check: None }
    }

    pub fn insert(name: impl Into<String>, table: Table, check: Rule) -> Self {
        Self { name: name.into(), table, verb: Verb::Insert, using: None, check: Some(check) }
    }

    pub fn update(name: impl Into<String>, table: Table, using: Rule, check: Option<Rule>) -> Self {
        Self { name: name.into(), table, verb: Verb::Update, using: Some(using), check }
    }

    pub fn delete(name: impl Into<String>, table: Table, using: Rule) -> Self {
        Self { name: name.into(), table, verb: Verb::Delete, using: Some(using), check: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn using(&self) -> Option<&Rule> {
        self.using.as_ref()
    }

    pub fn check(&self) -> Option<&Rule> {
        self.check.as_ref()
    }

    fn sees(&self, caller: &Caller, existing: Option<&RowFacts>) -> bool {
        clause_holds(self.using.as_ref(), caller, existing)
    }

    fn admits(&self, caller: &Caller, existing: Option<&RowFacts>, proposed: Option<&RowFacts>) -> bool {
        match self.verb {
            Verb::Select | Verb::Delete => self.sees(caller, existing),
            Verb::Insert => clause_holds(self.check.as_ref(), caller, proposed),
            Verb::Update => {
                self.sees(caller, existing)
                    && clause_holds(self.check.as_ref().or(self.using.as_ref()), caller, proposed)
            }
        }
    }
}

// Cláusula ausente ou linha ausente nunca autoriza nada
fn clause_holds(rule: Option<&Rule>, caller: &Caller, row: Option<&RowFacts>) -> bool {
    match (rule, row) {
        (Some(rule), Some(row)) => rule.holds(caller, row),
        _ => false,
    }
}

/// Resultado de uma escrita avaliada em processo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    Allowed,
    /// A linha existente não é visível para o chamador (equivale a "não existe").
    Invisible,
    /// A linha nova não passa no WITH CHECK (violação de restrição).
    Rejected,
}

impl WriteDecision {
    /// Converte a decisão no erro que o banco daria para a mesma escrita.
    pub fn ensure(self, table: Table) -> Result<(), AppError> {
        match self {
            WriteDecision::Allowed => Ok(()),
            WriteDecision::Invisible => Err(AppError::NotFound),
            WriteDecision::Rejected => Err(rls_violation(table)),
        }
    }
}

/// Mesmo erro que o Postgres daria (SQLSTATE 42501) para uma linha nova recusada.
pub fn rls_violation(table: Table) -> AppError {
    AppError::ConstraintViolation(format!(
        "a nova linha viola a política de segurança da tabela \"{}\"",
        table.name()
    ))
}

#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    policies: Vec<Policy>,
}

impl PolicySet {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn for_table(&self, table: Table) -> impl Iterator<Item = &Policy> {
        self.policies.iter().filter(move |p| p.table == table)
    }

    fn matching(&self, table: Table, verb: Verb) -> impl Iterator<Item = &Policy> {
        self.for_table(table).filter(move |p| p.verb == verb)
    }

    /// `(tabela, verbo, chamador, linha) -> bool`.
    /// `existing` é a linha atual (SELECT/UPDATE/DELETE), `proposed` a nova (INSERT/UPDATE).
    pub fn permits(
        &self,
        table: Table,
        verb: Verb,
        caller: &Caller,
        existing: Option<&RowFacts>,
        proposed: Option<&RowFacts>,
    ) -> bool {
        self.matching(table, verb)
            .any(|policy| policy.admits(caller, existing, proposed))
    }

    pub fn can_read<R: GovernedRow>(&self, caller: &Caller, row: &R) -> bool {
        self.permits(R::TABLE, Verb::Select, caller, Some(&row.facts()), None)
    }

    /// Filtro de leitura: devolve só as linhas que o chamador pode ver.
    pub fn visible<R: GovernedRow>(&self, caller: &Caller, rows: Vec<R>) -> Vec<R> {
        rows.into_iter()
            .filter(|row| self.can_read(caller, row))
            .collect()
    }

    pub fn authorize_insert(&self, table: Table, caller: &Caller, proposed: &RowFacts) -> WriteDecision {
        if self.permits(table, Verb::Insert, caller, None, Some(proposed)) {
            WriteDecision::Allowed
        } else {
            WriteDecision::Rejected
        }
    }

    pub fn authorize_update(
        &self,
        table: Table,
        caller: &Caller,
        existing: &RowFacts,
        proposed: &RowFacts,
    ) -> WriteDecision {
        let visible = self
            .matching(table, Verb::Update)
            .any(|policy| policy.sees(caller, Some(existing)));

        if !visible {
            WriteDecision::Invisible
        } else if self.permits(table, Verb::Update, caller, Some(existing), Some(proposed)) {
            WriteDecision::Allowed
        } else {
            WriteDecision::Rejected
        }
    }

    pub fn authorize_delete(&self, table: Table, caller: &Caller, existing: &RowFacts) -> WriteDecision {
        if self.permits(table, Verb::Delete, caller, Some(existing), None) {
            WriteDecision::Allowed
        } else {
            WriteDecision::Invisible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn owner_only(table: Table) -> PolicySet {
        PolicySet::new(vec![
            Policy::select("own_select", table, Rule::Owner),
            Policy::insert("own_insert", table, Rule::Owner),
            Policy::update("own_update", table, Rule::Owner, None),
            Policy::delete("own_delete", table, Rule::Owner),
        ])
    }

    #[test]
    fn no_matching_policy_means_deny() {
        let set = PolicySet::default();
        let caller = Caller::authenticated(Uuid::new_v4());
        let row = RowFacts::owned_by(caller.user_id());

        assert!(!set.permits(Table::Clients, Verb::Select, &caller, Some(&row), None));
    }

    #[test]
    fn policies_are_or_combined() {
        let me = Uuid::new_v4();
        let set = PolicySet::new(vec![
            Policy::select("own", Table::CalendarEvents, Rule::Owner),
            Policy::select("shared", Table::CalendarEvents, Rule::SharedFlag),
        ]);
        let caller = Caller::authenticated(me);
        let theirs_shared = RowFacts::owned_by(Some(Uuid::new_v4())).with_shared(true);

        assert!(set.permits(Table::CalendarEvents, Verb::Select, &caller, Some(&theirs_shared), None));
    }

    #[test]
    fn policies_of_other_verbs_do_not_leak() {
        let set = PolicySet::new(vec![Policy::select("all", Table::Tasks, Rule::Authenticated)]);
        let caller = Caller::authenticated(Uuid::new_v4());
        let row = RowFacts::default();

        assert!(set.permits(Table::Tasks, Verb::Select, &caller, Some(&row), None));
        assert!(!set.permits(Table::Tasks, Verb::Delete, &caller, Some(&row), None));
        assert!(!set.permits(Table::Clients, Verb::Select, &caller, Some(&row), None));
    }

    #[test]
    fn update_requires_using_and_check() {
        let me = Uuid::new_v4();
        let set = owner_only(Table::JournalEntries);
        let caller = Caller::authenticated(me);

        let mine = RowFacts::owned_by(Some(me));
        let handed_over = RowFacts::owned_by(Some(Uuid::new_v4()));

        assert_eq!(
            set.authorize_update(Table::JournalEntries, &caller, &mine, &mine),
            WriteDecision::Allowed
        );
        // Sem WITH CHECK explícito, o USING vale para a linha nova
        assert_eq!(
            set.authorize_update(Table::JournalEntries, &caller, &mine, &handed_over),
            WriteDecision::Rejected
        );
        assert_eq!(
            set.authorize_update(Table::JournalEntries, &caller, &handed_over, &mine),
            WriteDecision::Invisible
        );
    }

    #[test]
    fn explicit_check_overrides_using_for_new_row() {
        let me = Uuid::new_v4();
        let set = PolicySet::new(vec![Policy::update(
            "reassign",
            Table::Clients,
            Rule::Owner,
            Some(Rule::Authenticated),
        )]);
        let caller = Caller::authenticated(me);
        let mine = RowFacts::owned_by(Some(me));
        let handed_over = RowFacts::owned_by(Some(Uuid::new_v4()));

        assert_eq!(
            set.authorize_update(Table::Clients, &caller, &mine, &handed_over),
            WriteDecision::Allowed
        );
    }

    #[test]
    fn insert_and_delete_decisions() {
        let me = Uuid::new_v4();
        let set = owner_only(Table::JournalEntries);
        let caller = Caller::authenticated(me);

        let mine = RowFacts::owned_by(Some(me));
        let forged = RowFacts::owned_by(Some(Uuid::new_v4()));

        assert_eq!(set.authorize_insert(Table::JournalEntries, &caller, &mine), WriteDecision::Allowed);
        assert_eq!(set.authorize_insert(Table::JournalEntries, &caller, &forged), WriteDecision::Rejected);
        assert_eq!(set.authorize_delete(Table::JournalEntries, &caller, &mine), WriteDecision::Allowed);
        assert_eq!(set.authorize_delete(Table::JournalEntries, &caller, &forged), WriteDecision::Invisible);
    }

    #[test]
    fn decisions_map_to_silent_errors() {
        assert!(WriteDecision::Allowed.ensure(Table::Tasks).is_ok());
        assert!(matches!(WriteDecision::Invisible.ensure(Table::Tasks), Err(AppError::NotFound)));
        assert!(matches!(
            WriteDecision::Rejected.ensure(Table::Tasks),
            Err(AppError::ConstraintViolation(_))
        ));
    }
}
