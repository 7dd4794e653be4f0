//! Query layer for hh-api
//!
//! One module per table. Functions take a pool (or any executor when they
//! must also run inside a transaction) and return domain models from
//! [`hh_common::db`].

pub mod hobbies;
pub mod reminders;
pub mod user_hobbies;
pub mod users;

/// True when the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &hh_common::Error) -> bool {
    match err {
        hh_common::Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
