//! X-Server document to entity mapping.
//!
//! # Design
//! Each entity names the element it is built from (`FromNode::ELEMENT`) and
//! builds itself from one such node. `map_all` collects the top-most matching
//! nodes in document order, so the same code maps a flat resource list and
//! the resources nested under a subcategory.
//!
//! Mapping never fails. A missing field becomes `""` (or `false` for flags)
//! and is logged as a `MappingAnomaly`; unknown elements are ignored.

use tracing::{debug, warn};

use crate::document::XmlNode;
use crate::error::MappingAnomaly;
use crate::types::{Category, QuickSet, Resource, Subcategory};

/// An entity that can be built from one response element.
pub trait FromNode: Sized {
    /// Local name of the element this entity is built from.
    const ELEMENT: &'static str;

    fn from_node(node: &XmlNode) -> Self;
}

/// Map every top-most `E::ELEMENT` below `root`, in document order.
pub fn map_all<E: FromNode>(root: &XmlNode) -> Vec<E> {
    root.find_all(E::ELEMENT)
        .into_iter()
        .map(E::from_node)
        .collect()
}

impl FromNode for Resource {
    const ELEMENT: &'static str = "source_info";

    fn from_node(node: &XmlNode) -> Self {
        Resource {
            internal_number: text(node, Self::ELEMENT, "source_internal_number"),
            number: text(node, Self::ELEMENT, "source_number"),
            name: text(node, Self::ELEMENT, "source_full_name"),
            short_name: text(node, Self::ELEMENT, "source_short_name"),
            searchable: flag(node, Self::ELEMENT, "source_searchable"),
        }
    }
}

impl FromNode for Subcategory {
    const ELEMENT: &'static str = "subcategory_info";

    fn from_node(node: &XmlNode) -> Self {
        Subcategory {
            name: text(node, Self::ELEMENT, "subcategory_name"),
            bases: text(node, Self::ELEMENT, "bases"),
            sequence: text(node, Self::ELEMENT, "sequence"),
            resources: map_all(node),
        }
    }
}

impl FromNode for Category {
    const ELEMENT: &'static str = "category_info";

    fn from_node(node: &XmlNode) -> Self {
        Category {
            name: text(node, Self::ELEMENT, "category_name"),
            subcategories: map_all(node),
        }
    }
}

impl FromNode for QuickSet {
    const ELEMENT: &'static str = "quick_set_info";

    fn from_node(node: &XmlNode) -> Self {
        QuickSet {
            name: text(node, Self::ELEMENT, "quick_set_name"),
            sequence: text(node, Self::ELEMENT, "sequence"),
            description: text(node, Self::ELEMENT, "description"),
            bases: text(node, Self::ELEMENT, "bases"),
        }
    }
}

fn text(node: &XmlNode, element: &'static str, field: &'static str) -> String {
    match node.child_text(field) {
        Some(value) => value.to_string(),
        None => {
            let anomaly = MappingAnomaly::MissingField { element, field };
            debug!(%anomaly, "mapping anomaly");
            String::new()
        }
    }
}

fn flag(node: &XmlNode, element: &'static str, field: &'static str) -> bool {
    let Some(raw) = node.child_text(field) else {
        let anomaly = MappingAnomaly::MissingField { element, field };
        debug!(%anomaly, "mapping anomaly");
        return false;
    };
    match parse_flag(raw) {
        Some(value) => value,
        None => {
            let anomaly = MappingAnomaly::UnrecognizedFlag {
                element,
                field,
                value: raw.to_string(),
            };
            warn!(%anomaly, "mapping anomaly");
            false
        }
    }
}

/// X-Server flags are `Y`/`N`; a few deployments emit words or digits.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" | "TRUE" | "1" => Some(true),
        "N" | "NO" | "FALSE" | "0" | "" => Some(false),
        _ => None,
    }
}
