//! Test harness

mod session;

pub use db_manager::TestProgressDb;
pub use session::{SessionFixture, USER};
