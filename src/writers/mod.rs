//! Writing CVE records
//!
//! After the aggregation loop finishes, it's up to a writer to handle the
//! collected [`CveRecord`]s. It provides a common interface, allowing to
//! change the output format without affecting the execution of the
//! application.

pub mod json;

use crate::models::CveRecord;

/// A trait to have a common interface between writers.
/// A writer has the responsibility to persist the [`CveRecord`]s in a way,
/// be it in a file, on standard output, or sent to an API.
pub trait Writer {
    /// Write the records.
    /// Ownership of the collection ends here; nothing mutates the records
    /// after they have been written.
    fn write(&self, records: &[CveRecord]) -> Result<(), String>;
}
