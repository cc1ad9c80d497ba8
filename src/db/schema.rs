// src/db/schema.rs

//! Reconciliação de colunas de dono.
//!
//! Cada entidade tem uma única coluna canônica de dono. Bancos antigos ainda podem
//! ter a coluna legada (`clients.user_id`, `calendar_events.created_by`); o plano
//! copia o dono para a canônica, remove as políticas da tabela e apaga a legada.
//! Onde o dono é obrigatório, linhas que ficaram sem dono vão para
//! `<tabela>_orphaned` (ainda com a coluna legada) e a canônica vira NOT NULL.
//! As políticas são reinstaladas depois, pelo `PolicyRepository`.
//!
//! O plano é calculado a partir de uma foto do catálogo; um esquema já
//! reconciliado produz um plano vazio.

use std::collections::{BTreeMap, BTreeSet};

use sqlx::{Executor, PgPool, Postgres};

use crate::access::{sql::drop_all_policies_sql, Table};

const UUID_PATTERN: &str = "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipReconciliation {
    pub table: Table,
    pub legacy_column: &'static str,
    /// Definição usada se a coluna canônica ainda não existir.
    pub canonical_definition: &'static str,
    /// Toda linha precisa de dono (a coluna canônica é NOT NULL).
    pub owner_required: bool,
}

impl OwnershipReconciliation {
    pub fn canonical_column(&self) -> &'static str {
        self.table.owner_column().unwrap_or("user_id")
    }
}

pub const OWNERSHIP_RECONCILIATIONS: [OwnershipReconciliation; 2] = [
    OwnershipReconciliation {
        table: Table::Clients,
        legacy_column: "user_id",
        canonical_definition: "UUID REFERENCES profiles(id) ON DELETE SET NULL",
        owner_required: false,
    },
    OwnershipReconciliation {
        table: Table::CalendarEvents,
        legacy_column: "created_by",
        canonical_definition: "UUID REFERENCES profiles(id) ON DELETE CASCADE",
        owner_required: true,
    },
];

/// Colunas existentes por tabela.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    columns: BTreeMap<String, BTreeSet<String>>,
}

impl CatalogSnapshot {
    pub fn from_columns<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut snapshot = Self::default();
        for (table, column) in pairs {
            snapshot.insert(table, column);
        }
        snapshot
    }

    fn insert(&mut self, table: &str, column: &str) {
        self.columns
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string());
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.columns.contains_key(table)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.columns
            .get(table)
            .is_some_and(|columns| columns.contains(column))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStep {
    AddColumn {
        table: Table,
        column: &'static str,
        definition: &'static str,
    },
    // Sem isso o dono da tabela também passa pelo RLS: sem identidade na inicialização,
    // o backfill não enxergaria nem a tabela reconciliada nem os perfis
    NoForceRowSecurity { table: Table },
    Backfill {
        table: Table,
        canonical: &'static str,
        legacy: &'static str,
    },
    QuarantineOrphans { table: Table, canonical: &'static str },
    SetNotNull { table: Table, column: &'static str },
    DropPolicies { table: Table },
    DropColumn { table: Table, column: &'static str },
}

impl SchemaStep {
    pub fn to_sql(&self) -> String {
        match self {
            SchemaStep::AddColumn { table, column, definition } => format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
                table.name(),
                column,
                definition
            ),
            SchemaStep::NoForceRowSecurity { table } => {
                format!("ALTER TABLE {} NO FORCE ROW LEVEL SECURITY", table.name())
            }
            // Valor legado malformado vira NULL; dono inexistente não é copiado
            SchemaStep::Backfill { table, canonical, legacy } => {
                let coerced = format!(
                    "CASE WHEN {legacy}::text ~* '{UUID_PATTERN}' THEN {legacy}::text::uuid END"
                );
                format!(
                    r#"UPDATE {table} SET {canonical} = {coerced}
WHERE {canonical} IS NULL
  AND {legacy} IS NOT NULL
  AND EXISTS (SELECT 1 FROM profiles p WHERE p.id = {coerced})"#,
                    table = table.name(),
                )
            }
            SchemaStep::QuarantineOrphans { table, canonical } => format!(
                r#"CREATE TABLE IF NOT EXISTS {orphaned} AS TABLE {table} WITH NO DATA;
INSERT INTO {orphaned} SELECT * FROM {table} WHERE {canonical} IS NULL;
DELETE FROM {table} WHERE {canonical} IS NULL"#,
                orphaned = orphan_table(*table),
                table = table.name(),
            ),
            SchemaStep::SetNotNull { table, column } => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
                table.name(),
                column
            ),
            SchemaStep::DropPolicies { table } => drop_all_policies_sql(table.name()),
            SchemaStep::DropColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN IF EXISTS {} CASCADE",
                table.name(),
                column
            ),
        }
    }

    /// Efeito do passo na foto do catálogo.
    pub fn apply(&self, snapshot: &mut CatalogSnapshot) {
        match self {
            SchemaStep::AddColumn { table, column, .. } => snapshot.insert(table.name(), column),
            SchemaStep::DropColumn { table, column } => {
                if let Some(columns) = snapshot.columns.get_mut(table.name()) {
                    columns.remove(*column);
                }
            }
            SchemaStep::NoForceRowSecurity { .. }
            | SchemaStep::Backfill { .. }
            | SchemaStep::QuarantineOrphans { .. }
            | SchemaStep::SetNotNull { .. }
            | SchemaStep::DropPolicies { .. } => {}
        }
    }
}

/// Tabela que recebe as linhas sem dono de `table`.
pub fn orphan_table(table: Table) -> String {
    format!("{}_orphaned", table.name())
}

pub fn plan(snapshot: &CatalogSnapshot) -> Vec<SchemaStep> {
    let mut steps = Vec::new();

    for reconciliation in OWNERSHIP_RECONCILIATIONS {
        let table = reconciliation.table;
        if !snapshot.has_table(table.name()) {
            continue;
        }

        let canonical = reconciliation.canonical_column();
        if !snapshot.has_column(table.name(), canonical) {
            steps.push(SchemaStep::AddColumn {
                table,
                column: canonical,
                definition: reconciliation.canonical_definition,
            });
        }

        if snapshot.has_column(table.name(), reconciliation.legacy_column) {
            // O backfill consulta profiles, que também pode estar com FORCE
            let profiles = SchemaStep::NoForceRowSecurity { table: Table::Profiles };
            if !steps.contains(&profiles) {
                steps.push(profiles);
            }
            steps.push(SchemaStep::NoForceRowSecurity { table });
            steps.push(SchemaStep::Backfill {
                table,
                canonical,
                legacy: reconciliation.legacy_column,
            });
            if reconciliation.owner_required {
                steps.push(SchemaStep::QuarantineOrphans { table, canonical });
                steps.push(SchemaStep::SetNotNull { table, column: canonical });
            }
            steps.push(SchemaStep::DropPolicies { table });
            steps.push(SchemaStep::DropColumn {
                table,
                column: reconciliation.legacy_column,
            });
        }
    }

    steps
}

pub async fn load_snapshot<'e, E>(executor: E) -> Result<CatalogSnapshot, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let tables: Vec<String> = OWNERSHIP_RECONCILIATIONS
        .iter()
        .map(|r| r.table.name().to_string())
        .collect();

    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT table_name::text, column_name::text
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = ANY($1)
        "#,
    )
    .bind(&tables)
    .fetch_all(executor)
    .await?;

    Ok(CatalogSnapshot::from_columns(
        rows.iter().map(|(table, column)| (table.as_str(), column.as_str())),
    ))
}

/// Executa o plano inteiro numa transação. Devolve quantos passos rodaram.
pub async fn reconcile_ownership(pool: &PgPool) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;

    let snapshot = load_snapshot(&mut *tx).await?;
    let steps = plan(&snapshot);

    if steps.is_empty() {
        tracing::info!("✅ Colunas de dono já reconciliadas");
        return Ok(0);
    }

    for step in &steps {
        let result = sqlx::raw_sql(&step.to_sql()).execute(&mut *tx).await?;
        tracing::info!(?step, linhas = result.rows_affected(), "Reconciliando dono");
    }

    tx.commit().await?;
    tracing::info!(passos = steps.len(), "✅ Reconciliação de donos concluída");
    Ok(steps.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_columns([
            ("clients", "id"),
            ("clients", "user_id"),
            ("clients", "assigned_to"),
            ("calendar_events", "id"),
            ("calendar_events", "created_by"),
        ])
    }

    fn reconciled_snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_columns([
            ("clients", "id"),
            ("clients", "assigned_to"),
            ("calendar_events", "id"),
            ("calendar_events", "user_id"),
        ])
    }

    #[test]
    fn reconciled_schema_yields_empty_plan() {
        assert!(plan(&reconciled_snapshot()).is_empty());
    }

    #[test]
    fn legacy_schema_backfills_before_dropping() {
        let steps = plan(&legacy_snapshot());

        let clients: Vec<_> = steps
            .iter()
            .filter(|s| s.to_sql().contains("clients"))
            .collect();
        assert_eq!(clients.len(), 4);
        assert!(matches!(clients[0], SchemaStep::NoForceRowSecurity { .. }));
        assert!(matches!(clients[1], SchemaStep::Backfill { canonical: "assigned_to", legacy: "user_id", .. }));
        assert!(matches!(clients[2], SchemaStep::DropPolicies { .. }));
        assert!(matches!(clients[3], SchemaStep::DropColumn { column: "user_id", .. }));

        // calendar_events ainda não tinha a coluna canônica
        assert!(steps.contains(&SchemaStep::AddColumn {
            table: Table::CalendarEvents,
            column: "user_id",
            definition: "UUID REFERENCES profiles(id) ON DELETE CASCADE",
        }));
    }

    #[test]
    fn profiles_lose_force_once_before_any_backfill() {
        let steps = plan(&legacy_snapshot());
        let profiles = SchemaStep::NoForceRowSecurity { table: Table::Profiles };

        assert_eq!(steps.iter().filter(|s| **s == profiles).count(), 1);
        let unforced_at = steps.iter().position(|s| *s == profiles).unwrap();
        let first_backfill = steps
            .iter()
            .position(|s| matches!(s, SchemaStep::Backfill { .. }))
            .unwrap();
        assert!(unforced_at < first_backfill);
    }

    #[test]
    fn required_owner_quarantines_orphans_before_dropping_legacy() {
        let steps = plan(&legacy_snapshot());
        let events: Vec<_> = steps
            .iter()
            .filter(|s| s.to_sql().contains("calendar_events"))
            .collect();

        let at = |wanted: fn(&SchemaStep) -> bool| events.iter().position(|s| wanted(*s)).unwrap();
        let backfill = at(|s| matches!(s, SchemaStep::Backfill { .. }));
        let quarantine = at(|s| matches!(s, SchemaStep::QuarantineOrphans { canonical: "user_id", .. }));
        let not_null = at(|s| matches!(s, SchemaStep::SetNotNull { column: "user_id", .. }));
        let drop_column = at(|s| matches!(s, SchemaStep::DropColumn { column: "created_by", .. }));

        assert!(backfill < quarantine);
        assert!(quarantine < not_null);
        assert!(not_null < drop_column);

        // Dono de cliente é opcional: nada é movido nem vira NOT NULL
        assert!(!steps.iter().any(|s| matches!(
            s,
            SchemaStep::QuarantineOrphans { table: Table::Clients, .. } | SchemaStep::SetNotNull { table: Table::Clients, .. }
        )));
    }

    #[test]
    fn quarantine_keeps_orphans_with_their_legacy_values() {
        let sql = SchemaStep::QuarantineOrphans {
            table: Table::CalendarEvents,
            canonical: "user_id",
        }
        .to_sql();

        assert!(sql.contains("CREATE TABLE IF NOT EXISTS calendar_events_orphaned AS TABLE calendar_events WITH NO DATA"));
        assert!(sql.contains("INSERT INTO calendar_events_orphaned SELECT * FROM calendar_events WHERE user_id IS NULL"));
        assert!(sql.ends_with("DELETE FROM calendar_events WHERE user_id IS NULL"));
    }

    #[test]
    fn applying_the_plan_converges() {
        let mut snapshot = legacy_snapshot();
        for step in plan(&snapshot) {
            step.apply(&mut snapshot);
        }
        assert!(plan(&snapshot).is_empty());
        assert!(snapshot.has_column("calendar_events", "user_id"));
        assert!(!snapshot.has_column("clients", "user_id"));
    }

    #[test]
    fn additive_step_applied_twice_is_a_no_op() {
        let step = SchemaStep::AddColumn {
            table: Table::Clients,
            column: "assigned_to",
            definition: "UUID",
        };
        assert!(step.to_sql().contains("ADD COLUMN IF NOT EXISTS"));

        let mut once = CatalogSnapshot::from_columns([("clients", "id")]);
        step.apply(&mut once);
        let mut twice = once.clone();
        step.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_tables_are_skipped() {
        assert!(plan(&CatalogSnapshot::default()).is_empty());
    }

    #[test]
    fn backfill_only_fills_empty_canonical_with_wellformed_owner() {
        let sql = SchemaStep::Backfill {
            table: Table::Clients,
            canonical: "assigned_to",
            legacy: "user_id",
        }
        .to_sql();

        assert!(sql.starts_with("UPDATE clients SET assigned_to = CASE WHEN user_id::text ~*"));
        assert!(sql.contains("assigned_to IS NULL"));
        assert!(sql.contains("{8}-[0-9a-f]{4}"));
        assert!(sql.contains("FROM profiles"));
    }
}
