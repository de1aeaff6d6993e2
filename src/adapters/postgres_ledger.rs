//! Postgres implementation of the transaction ledger.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{CommitJournalRow, TransactionRow};
use crate::domain::{
    CommitJournalEntry, Transaction, TransactionFilter, TransactionStatus,
};
use crate::ports::{LedgerError, TransactionLedger};

#[derive(Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionLedger for PostgresLedger {
    async fn create(&self, tx: &Transaction) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, kind, source_account, destination_account, amount, fee,
                status, cbs_reference, payment_id, note, owner, created_at, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(tx.id)
        .bind(tx.kind.as_str())
        .bind(&tx.source_account)
        .bind(&tx.destination_account)
        .bind(tx.amount)
        .bind(tx.fee)
        .bind(tx.status.as_str())
        .bind(&tx.cbs_reference)
        .bind(&tx.payment_id)
        .bind(&tx.note)
        .bind(&tx.owner)
        .bind(tx.created_at)
        .bind(tx.processed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Transaction, LedgerError> {
        let row = sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(LedgerError::NotFound)?.into_domain()
    }

    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE owner = $1
              AND ($2::text IS NULL OR kind = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&filter.owner)
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    async fn complete(&self, id: Uuid, reference: &str, fee: i64) -> Result<(), LedgerError> {
        // Single conditional write: only an `initiated` row may complete.
        // A zero match on an existing row means another processor won.
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2, cbs_reference = $3, fee = $4, processed_at = NOW()
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(id)
        .bind(TransactionStatus::Completed.as_str())
        .bind(reference)
        .bind(fee)
        .bind(TransactionStatus::Initiated.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transactions WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;

            return Err(if exists {
                LedgerError::Conflict
            } else {
                LedgerError::NotFound
            });
        }

        Ok(())
    }

    async fn journal_commit(&self, transaction_id: Uuid) -> Result<(), LedgerError> {
        sqlx::query("INSERT INTO commit_journal (id, transaction_id) VALUES ($1, $2)")
            .bind(Uuid::new_v4())
            .bind(transaction_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn resolve_commit(&self, transaction_id: Uuid) -> Result<(), LedgerError> {
        sqlx::query(
            "UPDATE commit_journal SET resolved_at = NOW() \
             WHERE transaction_id = $1 AND resolved_at IS NULL",
        )
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unresolved_commits(&self) -> Result<Vec<CommitJournalEntry>, LedgerError> {
        let rows = sqlx::query_as::<_, CommitJournalRow>(
            "SELECT * FROM commit_journal WHERE resolved_at IS NULL ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommitJournalRow::into_domain).collect())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
