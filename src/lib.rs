//! cvecollect collects CVE advisories published as markdown files in a
//! GitHub repository, extracts their structured fields, and exports them
//! as a consolidated JSON list.

pub mod application;
pub mod extractors;
pub mod models;
pub mod progress;
pub mod readers;
pub mod writers;
