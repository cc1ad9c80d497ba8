// src/access/sql.rs

// Renderização do catálogo como DDL do Postgres.
// A identidade vem de app_current_user_id() (ver a primeira migração), que devolve
// NULL para chamador anônimo ou valor malformado; "coluna = NULL" nunca é verdadeiro.

use std::collections::BTreeSet;

use crate::access::policy::{Policy, PolicySet, Verb};
use crate::access::rule::Rule;
use crate::access::table::Table;

pub const CALLER_ID_SQL: &str = "app_current_user_id()";

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn rule_sql(rule: &Rule, table: Table) -> String {
    match rule {
        Rule::Authenticated => format!("{CALLER_ID_SQL} IS NOT NULL"),
        Rule::Owner => match table.owner_column() {
            Some(column) => format!("{column} = {CALLER_ID_SQL}"),
            None => "false".to_string(),
        },
        Rule::SharedFlag => match table.shared_flag_column() {
            Some(column) => format!("({column} AND {CALLER_ID_SQL} IS NOT NULL)"),
            None => "false".to_string(),
        },
        Rule::AnyOf(rules) if rules.is_empty() => "false".to_string(),
        Rule::AnyOf(rules) => {
            let parts: Vec<String> = rules.iter().map(|r| rule_sql(r, table)).collect();
            format!("({})", parts.join(" OR "))
        }
    }
}

/// Bloco anônimo que remove todas as políticas de uma tabela, inclusive as antigas
/// que não estão mais no catálogo.
pub fn drop_all_policies_sql(table: &str) -> String {
    format!(
        r#"DO $$
DECLARE p record;
BEGIN
    FOR p IN SELECT policyname FROM pg_policies
             WHERE schemaname = current_schema() AND tablename = '{table}'
    LOOP
        EXECUTE format('DROP POLICY IF EXISTS %I ON %I', p.policyname, '{table}');
    END LOOP;
END $$"#,
        table = table.replace('\'', "''")
    )
}

impl Policy {
    pub fn create_sql(&self) -> String {
        let table = self.table();
        let mut sql = format!(
            "CREATE POLICY {} ON {} FOR {}",
            quote_ident(self.name()),
            table.name(),
            self.verb().keyword()
        );
        if let Some(using) = self.using() {
            sql.push_str(&format!(" USING ({})", rule_sql(using, table)));
        }
        if let Some(check) = self.check() {
            sql.push_str(&format!(" WITH CHECK ({})", rule_sql(check, table)));
        }
        sql
    }
}

impl PolicySet {
    pub fn managed_tables(&self) -> BTreeSet<Table> {
        self.policies().iter().map(|p| p.table()).collect()
    }

    /// DDL completo para (re)instalar o catálogo. Re-executável: liga e força RLS,
    /// remove as políticas existentes e cria as do catálogo.
    pub fn install_statements(&self) -> Vec<String> {
        let mut statements = Vec::new();
        for table in self.managed_tables() {
            statements.push(format!("ALTER TABLE {} ENABLE ROW LEVEL SECURITY", table.name()));
            statements.push(format!("ALTER TABLE {} FORCE ROW LEVEL SECURITY", table.name()));
            statements.push(drop_all_policies_sql(table.name()));
            statements.extend(self.for_table(table).map(Policy::create_sql));
        }
        statements
    }
}

// Usado só para exibir/registrar o catálogo
pub fn describe(policy: &Policy) -> String {
    let verb = match policy.verb() {
        Verb::Select => "leitura",
        Verb::Insert => "inserção",
        Verb::Update => "atualização",
        Verb::Delete => "remoção",
    };
    format!("{} ({} em {})", policy.name(), verb, policy.table().name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::catalog::default_catalog;

    #[test]
    fn owner_rule_compares_against_caller_function() {
        assert_eq!(
            rule_sql(&Rule::Owner, Table::JournalEntries),
            "user_id = app_current_user_id()"
        );
        assert_eq!(rule_sql(&Rule::Owner, Table::Clients), "assigned_to = app_current_user_id()");
        assert_eq!(rule_sql(&Rule::Owner, Table::Payments), "false");
    }

    #[test]
    fn shared_flag_renders_flag_and_identity() {
        assert_eq!(
            rule_sql(&Rule::SharedFlag, Table::CalendarEvents),
            "(is_collective AND app_current_user_id() IS NOT NULL)"
        );
        assert_eq!(rule_sql(&Rule::SharedFlag, Table::JournalEntries), "false");
    }

    #[test]
    fn task_policies_ignore_the_display_flag() {
        assert_eq!(rule_sql(&Rule::SharedFlag, Table::Tasks), "false");
        for policy in default_catalog().for_table(Table::Tasks) {
            assert!(!policy.create_sql().contains("is_shared"), "{}", policy.name());
        }
    }

    #[test]
    fn create_sql_for_each_verb() {
        let select = Policy::select("ev_sel", Table::CalendarEvents, Rule::Owner);
        assert_eq!(
            select.create_sql(),
            "CREATE POLICY \"ev_sel\" ON calendar_events FOR SELECT USING (user_id = app_current_user_id())"
        );

        let insert = Policy::insert("ev_ins", Table::CalendarEvents, Rule::Owner);
        assert_eq!(
            insert.create_sql(),
            "CREATE POLICY \"ev_ins\" ON calendar_events FOR INSERT WITH CHECK (user_id = app_current_user_id())"
        );

        let update = Policy::update("c_upd", Table::Clients, Rule::Authenticated, Some(Rule::Authenticated));
        assert_eq!(
            update.create_sql(),
            "CREATE POLICY \"c_upd\" ON clients FOR UPDATE USING (app_current_user_id() IS NOT NULL) \
             WITH CHECK (app_current_user_id() IS NOT NULL)"
        );
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn install_statements_force_rls_before_creating_policies() {
        let catalog = default_catalog();
        let statements = catalog.install_statements();

        for table in catalog.managed_tables() {
            let force = format!("ALTER TABLE {} FORCE ROW LEVEL SECURITY", table.name());
            let force_at = statements.iter().position(|s| *s == force).expect("force rls");
            let first_create = statements
                .iter()
                .position(|s| s.starts_with("CREATE POLICY") && s.contains(&format!(" ON {} FOR", table.name())))
                .expect("create policy");
            assert!(force_at < first_create);
        }

        let creates = statements.iter().filter(|s| s.starts_with("CREATE POLICY")).count();
        assert_eq!(creates, catalog.policies().len());
    }

    #[test]
    fn drop_all_policies_targets_the_table() {
        let sql = drop_all_policies_sql("clients");
        assert!(sql.contains("tablename = 'clients'"));
        assert!(sql.contains("DROP POLICY IF EXISTS"));
    }
}
