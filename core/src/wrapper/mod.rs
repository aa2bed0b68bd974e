//! Connection/Statement wrappers and the CombinedResultSet adapter (spec
//! §4.8, component J).

mod combined_result_set;
mod connection;
mod statement;

pub use combined_result_set::CombinedResultSet;
pub use connection::Connection;
pub use statement::Statement;

use crate::error::Result;
use crate::result::ResultSet;

/// The one pre-rewrite/post-execute hook the outer database driver protocol
/// is specified through (spec §1: "we specify only the pre-rewrite and
/// post-execute hooks"); everything else about the real driver is out of
/// scope and left to whatever concrete driver a deployment wires in here.
pub trait InnerDriver: Send + Sync {
    fn execute(&self, sql: &str) -> Result<ResultSet>;
}
