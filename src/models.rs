//! In this module are declared the entities manipulated by this program

use serde::{Deserialize, Serialize};

/// Represents one CVE advisory extracted from a markdown file.
///
/// The serialized field names and their order are part of the output
/// contract, the JSON file is consumed by tools expecting exactly
/// these keys.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CveRecord {
    /// The year directory the advisory was listed in.
    pub year: String,
    /// The CVE identifier, taken from the filename minus its extension.
    /// Example: CVE-2024-0001
    #[serde(rename = "CVE_Name")]
    pub name: String,
    /// The normalized Description section.
    #[serde(rename = "CVE_description")]
    pub description: String,
    /// The normalized Github section.
    #[serde(rename = "CVE_github")]
    pub github: String,
    /// The normalized Reference section.
    #[serde(rename = "CVE_references")]
    pub references: String,
    /// The product named by the shield badges.
    /// Empty when the advisory carries no Product badge.
    #[serde(rename = "Product")]
    pub product: String,
    /// The affected version named by the shield badges.
    #[serde(rename = "Version")]
    pub version: String,
    /// The vulnerability class named by the shield badges.
    #[serde(rename = "Vulnerability")]
    pub vulnerability: String,
}
