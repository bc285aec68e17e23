//! Domain entities returned by `ResourceService`.
//!
//! # Design
//! Entities are plain owned values built fresh on every mapping pass. They
//! carry no back-references (a `Resource` does not know its `Subcategory`)
//! and compare structurally, so two calls against the same document yield
//! equal results. Serde derives exist so a cache collaborator can store the
//! mapped form keyed by request signature.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single catalogued database entry ("source" on the wire).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    pub internal_number: String,
    pub number: String,
    pub name: String,
    pub short_name: String,
    pub searchable: bool,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A subcategory of a `Category`. `bases` and `sequence` are the remote
/// start and end sequence identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subcategory {
    pub name: String,
    pub bases: String,
    pub sequence: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// A curated, named grouping of resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuickSet {
    pub name: String,
    pub sequence: String,
    pub description: String,
    pub bases: String,
}
