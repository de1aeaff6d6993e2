pub mod postgres_ledger;

pub use postgres_ledger::PostgresLedger;
