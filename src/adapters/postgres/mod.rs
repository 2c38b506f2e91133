//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Uniqueness rules live in the schema (see `migrations/`); each adapter
//! translates the named constraint violations into `ConcurrencyConflict`
//! so handlers can converge on the winning row.

mod checkout_session_repository;
mod contact_store;
mod identity_store;
mod payment_ledger;
mod purchase_repository;
mod share_repository;
mod subscription_repository;

pub use checkout_session_repository::PostgresCheckoutSessionRepository;
pub use contact_store::PostgresContactStore;
pub use identity_store::PostgresIdentityStore;
pub use payment_ledger::PostgresPaymentLedger;
pub use purchase_repository::PostgresPurchaseRepository;
pub use share_repository::PostgresShareRepository;
pub use subscription_repository::PostgresSubscriptionRepository;

use std::str::FromStr;

use crate::domain::foundation::{Currency, DomainError, ErrorCode, Money};

/// Maps a sqlx error, turning a violation of one of `constraints` into a
/// conflict carrying `conflict_message`.
fn map_write_error(
    err: sqlx::Error,
    context: &str,
    constraints: &[&str],
    conflict_message: &str,
) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(name) = db_err.constraint() {
            if constraints.contains(&name) {
                return DomainError::new(ErrorCode::ConcurrencyConflict, conflict_message)
                    .with_detail("constraint", name);
            }
        }
    }
    DomainError::database(context, err)
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::database(context, e)
}

/// Parses a stored enum column.
fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, DomainError> {
    value.parse().map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value: {}", column, value),
        )
    })
}

fn money_from_row(minor: i64, currency: &str) -> Result<Money, DomainError> {
    let currency: Currency = parse_column("currency", currency)?;
    Money::from_minor(minor, currency).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored amount: {}", e))
    })
}
