//! `ResourceService` against the XML fixtures in `fixtures/`.
//!
//! A scripted transport records every request and answers with a parsed
//! fixture, so each test checks both the outgoing request and the mapped
//! entities without a server.

use std::sync::Mutex;

use metalib_core::{
    Category, Params, QuickSet, Resource, ResourceService, Subcategory, Transport, TransportError,
    XmlNode,
};

const RESOURCES_01: &str = include_str!("../../fixtures/resources-01.xml");
const RESOURCES_02: &str = include_str!("../../fixtures/resources-02.xml");
const RESOURCES_03: &str = include_str!("../../fixtures/resources-03.xml");
const CATEGORIES_01: &str = include_str!("../../fixtures/categories-01.xml");
const CATEGORIES_02: &str = include_str!("../../fixtures/categories-02.xml");
const QUICKSETS_01: &str = include_str!("../../fixtures/quicksets-01.xml");
const EMPTY_01: &str = include_str!("../../fixtures/empty-01.xml");

#[derive(Debug, Clone, PartialEq)]
struct Sent {
    request_name: String,
    params: Params,
    use_defaults: bool,
}

/// Test double: answers every `send` with the same fixture (or error).
struct Scripted {
    sent: Mutex<Vec<Sent>>,
    answer: Result<XmlNode, TransportError>,
}

impl Scripted {
    fn fixture(xml: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            answer: Ok(XmlNode::parse(xml).unwrap()),
        }
    }

    fn failing(err: TransportError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            answer: Err(err),
        }
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for Scripted {
    fn send(
        &self,
        request_name: &str,
        params: &Params,
        use_defaults: bool,
    ) -> Result<XmlNode, TransportError> {
        self.sent.lock().unwrap().push(Sent {
            request_name: request_name.to_string(),
            params: params.clone(),
            use_defaults,
        });
        self.answer.clone()
    }
}

fn resource(internal: &str, number: &str, name: &str, short: &str, searchable: bool) -> Resource {
    Resource {
        internal_number: internal.to_string(),
        number: number.to_string(),
        name: name.to_string(),
        short_name: short.to_string(),
        searchable,
    }
}

fn subcategory(name: &str, bases: &str, sequence: &str) -> Subcategory {
    Subcategory {
        name: name.to_string(),
        bases: bases.to_string(),
        sequence: sequence.to_string(),
        resources: Vec::new(),
    }
}

fn quick_set(name: &str, sequence: &str, description: &str, bases: &str) -> QuickSet {
    QuickSet {
        name: name.to_string(),
        sequence: sequence.to_string(),
        description: description.to_string(),
        bases: bases.to_string(),
    }
}

fn only_request(transport: &Scripted) -> Sent {
    let sent = transport.sent();
    assert_eq!(sent.len(), 1, "expected exactly one request, got {sent:?}");
    sent.into_iter().next().unwrap()
}

// ---------------------------------------------------------------------------
// By category
// ---------------------------------------------------------------------------

#[test]
fn retrieve_by_category_sends_correct_parameters() {
    let service = ResourceService::new(Scripted::fixture(RESOURCES_01));
    service.retrieve_by_category("foo").unwrap();

    assert_eq!(
        only_request(service.transport()),
        Sent {
            request_name: "retrieve_resources_by_category_request".to_string(),
            params: Params::new().with("category_id", "foo"),
            use_defaults: true,
        }
    );
}

#[test]
fn retrieve_by_category_maps_resources_in_order() {
    let service = ResourceService::new(Scripted::fixture(RESOURCES_01));
    let expected = vec![
        resource("000003209", "BCL03643", "Database Number One", "Database One", false),
        resource("000007958", "BCL06327", "Database Number Two", "Database Two", true),
    ];
    assert_eq!(service.retrieve_by_category("foo").unwrap(), expected);
}

#[test]
fn default_params_are_appended_when_configured() {
    let service =
        ResourceService::new(Scripted::fixture(RESOURCES_01)).with_defaults("127.0.0.1", "bar");
    service.retrieve_by_category("foo").unwrap();

    let sent = only_request(service.transport());
    let pairs: Vec<_> = sent.params.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("category_id", "foo"),
            ("requester_ip", "127.0.0.1"),
            ("institute", "bar"),
        ]
    );
}

#[test]
fn every_operation_carries_defaults_when_configured() {
    let service =
        ResourceService::new(Scripted::fixture(EMPTY_01)).with_defaults("127.0.0.1", "bar");
    service.retrieve_by_category("foo").unwrap();
    service.retrieve_categories().unwrap();
    service.retrieve_quick_sets().unwrap();
    service.retrieve_by_quick_set("000037683").unwrap();

    let sent = service.transport().sent();
    assert_eq!(sent.len(), 4);
    for request in sent {
        assert_eq!(request.params.get("requester_ip"), Some("127.0.0.1"), "{request:?}");
        assert_eq!(request.params.get("institute"), Some("bar"), "{request:?}");
    }
}

#[test]
fn no_operation_carries_defaults_when_unconfigured() {
    let service = ResourceService::new(Scripted::fixture(EMPTY_01));
    service.retrieve_by_category("foo").unwrap();
    service.retrieve_categories().unwrap();
    service.retrieve_quick_sets().unwrap();
    service.retrieve_by_quick_set("000037683").unwrap();

    for request in service.transport().sent() {
        assert!(!request.params.contains_key("requester_ip"), "{request:?}");
        assert!(!request.params.contains_key("institute"), "{request:?}");
    }
}

#[test]
fn malformed_resource_nodes_still_map_with_defaults() {
    let service = ResourceService::new(Scripted::fixture(RESOURCES_03));
    let resources = service.retrieve_by_category("foo").unwrap();

    assert_eq!(
        resources,
        vec![
            resource("", "", "Arts & Humanities Index", "", false),
            Resource::default(),
            resource("000004410", "BCL04410", "Newspapers <Historical>", "Newspapers", true),
        ]
    );
}

#[test]
fn empty_response_yields_empty_vec() {
    let service = ResourceService::new(Scripted::fixture(EMPTY_01));
    assert!(service.retrieve_by_category("nothing").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[test]
fn retrieve_categories_sends_correct_parameters() {
    let service = ResourceService::new(Scripted::fixture(CATEGORIES_01));
    service.retrieve_categories().unwrap();

    assert_eq!(
        only_request(service.transport()),
        Sent {
            request_name: "retrieve_categories_request".to_string(),
            params: Params::new(),
            use_defaults: true,
        }
    );
}

#[test]
fn retrieve_categories_maps_nested_graph() {
    let service = ResourceService::new(Scripted::fixture(CATEGORIES_01));
    let expected = vec![
        Category {
            name: "Reference".to_string(),
            subcategories: vec![
                subcategory("ALL", "000000000", "000001313"),
                subcategory("Biography", "000000000", "000001315"),
            ],
        },
        Category {
            name: "Interdisciplinary".to_string(),
            subcategories: vec![subcategory("General", "000000003", "000000413")],
        },
    ];
    assert_eq!(service.retrieve_categories().unwrap(), expected);
}

#[test]
fn retrieve_categories_attaches_resources_to_subcategories() {
    let service = ResourceService::new(Scripted::fixture(CATEGORIES_02));
    let categories = service.retrieve_categories().unwrap();

    assert_eq!(categories.len(), 2);
    let chemistry = &categories[0].subcategories[0];
    assert_eq!(
        chemistry.resources,
        vec![
            resource("000005001", "BCL05001", "SciFinder Scholar", "SciFinder", true),
            resource("000005002", "BCL05002", "Reaxys", "Reaxys", false),
        ]
    );
    assert_eq!(categories[1].name, "Empty");
    assert!(categories[1].subcategories.is_empty());
}

#[test]
fn find_category_returns_exact_match() {
    let service = ResourceService::new(Scripted::fixture(CATEGORIES_01));
    let found = service.find_category("Interdisciplinary").unwrap().unwrap();
    assert_eq!(found.subcategories.len(), 1);
    assert!(service.find_category("interdisciplinary").unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Quick sets
// ---------------------------------------------------------------------------

#[test]
fn retrieve_quick_sets_sends_correct_parameters() {
    let service = ResourceService::new(Scripted::fixture(QUICKSETS_01));
    service.retrieve_quick_sets().unwrap();

    assert_eq!(
        only_request(service.transport()),
        Sent {
            request_name: "retrieve_quick_sets_request".to_string(),
            params: Params::new(),
            use_defaults: true,
        }
    );
}

#[test]
fn retrieve_quick_sets_keeps_empty_description() {
    let service = ResourceService::new(Scripted::fixture(QUICKSETS_01));
    let expected = vec![
        quick_set("Art/Architecture", "000037683", "This is a sample", "000000006"),
        quick_set("Boston Libraries", "000037682", "", "000000008"),
    ];
    assert_eq!(service.retrieve_quick_sets().unwrap(), expected);
}

#[test]
fn retrieve_by_quick_set_sends_correct_parameters() {
    let service = ResourceService::new(Scripted::fixture(RESOURCES_02));
    service.retrieve_by_quick_set("000037683").unwrap();

    assert_eq!(
        only_request(service.transport()),
        Sent {
            request_name: "retrieve_resources_by_quick_set_request".to_string(),
            params: Params::new().with("quick_sets_id", "000037683"),
            use_defaults: true,
        }
    );
}

#[test]
fn retrieve_by_quick_set_maps_resources() {
    let service = ResourceService::new(Scripted::fixture(RESOURCES_02));
    let expected = vec![
        resource("000001807", "BCL02374", "Database Number One", "Database One", false),
        resource("000001845", "BCL02363", "Database Number Two", "Database Two", true),
    ];
    assert_eq!(service.retrieve_by_quick_set("000037683").unwrap(), expected);
}

// ---------------------------------------------------------------------------
// Failures and idempotence
// ---------------------------------------------------------------------------

#[test]
fn transport_errors_propagate_unchanged() {
    let err = TransportError::Http {
        status: 502,
        body: "bad gateway".to_string(),
    };
    let service = ResourceService::new(Scripted::failing(err.clone()));

    assert_eq!(service.retrieve_by_category("foo").unwrap_err(), err);
    assert_eq!(service.retrieve_categories().unwrap_err(), err);
    assert_eq!(service.retrieve_quick_sets().unwrap_err(), err);
    assert_eq!(service.retrieve_by_quick_set("000037683").unwrap_err(), err);
    assert_eq!(service.find_category("Reference").unwrap_err(), err);
}

#[test]
fn repeated_calls_yield_equal_results() {
    let service = ResourceService::new(Scripted::fixture(CATEGORIES_02));
    let first = service.retrieve_categories().unwrap();
    let second = service.retrieve_categories().unwrap();
    assert_eq!(first, second);
    assert_eq!(service.transport().sent().len(), 2);
}
