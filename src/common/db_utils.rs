// src/common/db_utils.rs

use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::models::identity::Caller;

// ---
// Helper RLS: a "chave" para o banco de dados
// ---
/// Abre a transação da requisição e define a identidade do chamador.
///
/// `set_config(..., true)` vale só até o fim da transação, então a identidade
/// nunca vaza para a próxima requisição que pegar a mesma conexão da pool.
/// Anônimo grava string vazia, que `app_current_user_id()` lê como NULL.
pub(crate) async fn begin_rls_transaction(
    app_state: &AppState,
    caller: &Caller,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = app_state.db_pool.begin().await?;

    let user_id = caller.user_id().map(|id| id.to_string()).unwrap_or_default();
    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
