// tests/db_access.rs

//! Políticas instaladas contra um Postgres real (ver `common::db`).

mod common;

use anyhow::Result;
use chrono::{Duration, Utc};

use ops_crm::{
    common::error::AppError,
    db::{CalendarRepository, JournalRepository},
    models::{calendar::EventDraft, journal::JournalPayload},
};

use common::db::TestDb;

fn draft(title: &str, is_collective: bool) -> EventDraft {
    let start_time = Utc::now();
    EventDraft {
        title: title.to_string(),
        description: None,
        start_time,
        end_time: start_time + Duration::hours(1),
        is_collective,
    }
}

fn note(title: &str) -> JournalPayload {
    JournalPayload {
        title: title.to_string(),
        content: "privado".to_string(),
        entry_date: None,
    }
}

#[tokio::test]
async fn calendar_policies_split_personal_and_collective() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    db.migrate().await?;
    db.install_policies().await?;

    let alice = db.create_profile("alice@example.com").await?;
    let bob = db.create_profile("bob@example.com").await?;
    let calendar = CalendarRepository::new();

    let mut tx = db.begin_as(Some(alice)).await?;
    calendar.create(&mut *tx, alice, &draft("Dentista", false)).await?;
    calendar.create(&mut *tx, alice, &draft("Reunião geral", true)).await?;
    tx.commit().await?;

    let mut tx = db.begin_as(Some(alice)).await?;
    assert_eq!(calendar.list(&mut *tx, None, None).await?.len(), 2);
    tx.rollback().await?;

    let mut tx = db.begin_as(Some(bob)).await?;
    let seen: Vec<String> = calendar
        .list(&mut *tx, None, None)
        .await?
        .into_iter()
        .map(|event| event.title)
        .collect();
    assert_eq!(seen, ["Reunião geral"]);
    tx.rollback().await?;

    let mut tx = db.begin_as(None).await?;
    assert!(calendar.list(&mut *tx, None, None).await?.is_empty());
    tx.rollback().await?;

    db.cleanup().await
}

#[tokio::test]
async fn journal_is_visible_only_to_its_owner() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    db.migrate().await?;
    db.install_policies().await?;

    let alice = db.create_profile("alice@example.com").await?;
    let bob = db.create_profile("bob@example.com").await?;
    let journal = JournalRepository::new();

    let mut tx = db.begin_as(Some(alice)).await?;
    journal.create(&mut *tx, alice, &note("Semana")).await?;
    tx.commit().await?;

    let mut tx = db.begin_as(Some(alice)).await?;
    assert_eq!(journal.list(&mut *tx).await?.len(), 1);
    tx.rollback().await?;

    for caller in [Some(bob), None] {
        let mut tx = db.begin_as(caller).await?;
        assert!(journal.list(&mut *tx).await?.is_empty(), "{caller:?}");
        tx.rollback().await?;
    }

    db.cleanup().await
}

#[tokio::test]
async fn anonymous_and_foreign_writes_are_rejected_by_the_database() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    db.migrate().await?;
    db.install_policies().await?;

    let alice = db.create_profile("alice@example.com").await?;
    let bob = db.create_profile("bob@example.com").await?;
    let journal = JournalRepository::new();

    let mut tx = db.begin_as(None).await?;
    let anonymous = journal.create(&mut *tx, alice, &note("Anônimo")).await;
    assert!(matches!(anonymous, Err(AppError::ConstraintViolation(_))), "{anonymous:?}");
    tx.rollback().await?;

    // Bob não grava no diário de Alice
    let mut tx = db.begin_as(Some(bob)).await?;
    let foreign = journal.create(&mut *tx, alice, &note("Intruso")).await;
    assert!(matches!(foreign, Err(AppError::ConstraintViolation(_))), "{foreign:?}");
    tx.rollback().await?;

    db.cleanup().await
}
