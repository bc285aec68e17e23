//! Stand-in for the MetaLib X-Server.
//!
//! Serves a fixed catalog over `GET /X?op=...`, rendered as X-Server XML.
//! Types here are defined independently from `metalib-core`; the core's
//! integration tests catch any drift between the two.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use quick_xml::escape::escape;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone, Debug)]
pub struct Source {
    pub internal_number: String,
    pub number: String,
    pub full_name: String,
    pub short_name: String,
    pub searchable: bool,
}

#[derive(Clone, Debug)]
pub struct Subcategory {
    pub name: String,
    pub bases: String,
    pub sequence: String,
    pub sources: Vec<Source>,
}

#[derive(Clone, Debug)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Clone, Debug)]
pub struct QuickSet {
    pub name: String,
    pub sequence: String,
    pub description: String,
    pub bases: String,
    pub sources: Vec<Source>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub quick_sets: Vec<QuickSet>,
}

impl Catalog {
    /// The catalog served by `app()`.
    pub fn sample() -> Self {
        let one = source("000003209", "BCL03643", "Database Number One", "Database One", false);
        let two = source("000007958", "BCL06327", "Database Number Two", "Database Two", true);
        let aph = source("000001845", "BCL02363", "Academic Search Premier", "ASP", true);

        Catalog {
            categories: vec![
                Category {
                    name: "Reference".to_string(),
                    subcategories: vec![
                        subcategory(
                            "ALL",
                            "000000000",
                            "000001313",
                            vec![one.clone(), two],
                        ),
                        subcategory("Biography", "000000000", "000001315", Vec::new()),
                    ],
                },
                Category {
                    name: "Interdisciplinary".to_string(),
                    subcategories: vec![subcategory(
                        "General",
                        "000000003",
                        "000000413",
                        vec![aph.clone()],
                    )],
                },
            ],
            quick_sets: vec![
                QuickSet {
                    name: "Art/Architecture".to_string(),
                    sequence: "000037683".to_string(),
                    description: "This is a sample".to_string(),
                    bases: "000000006".to_string(),
                    sources: vec![one, aph],
                },
                QuickSet {
                    name: "Boston Libraries".to_string(),
                    sequence: "000037682".to_string(),
                    description: String::new(),
                    bases: "000000008".to_string(),
                    sources: Vec::new(),
                },
            ],
        }
    }

    fn subcategory(&self, sequence: &str) -> Option<&Subcategory> {
        self.categories
            .iter()
            .flat_map(|c| &c.subcategories)
            .find(|s| s.sequence == sequence)
    }

    fn quick_set(&self, sequence: &str) -> Option<&QuickSet> {
        self.quick_sets.iter().find(|q| q.sequence == sequence)
    }
}

fn source(internal: &str, number: &str, full: &str, short: &str, searchable: bool) -> Source {
    Source {
        internal_number: internal.to_string(),
        number: number.to_string(),
        full_name: full.to_string(),
        short_name: short.to_string(),
        searchable,
    }
}

fn subcategory(name: &str, bases: &str, sequence: &str, sources: Vec<Source>) -> Subcategory {
    Subcategory {
        name: name.to_string(),
        bases: bases.to_string(),
        sequence: sequence.to_string(),
        sources,
    }
}

/// Query string of an X-Server request. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct XRequest {
    pub op: Option<String>,
    pub category_id: Option<String>,
    pub quick_sets_id: Option<String>,
    pub requester_ip: Option<String>,
    pub institute: Option<String>,
}

pub fn app() -> Router {
    app_with(Catalog::sample())
}

pub fn app_with(catalog: Catalog) -> Router {
    Router::new()
        .route("/X", get(x_server))
        .with_state(Arc::new(catalog))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// `RUST_LOG=mock_server=debug` shows every request.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

async fn x_server(
    State(catalog): State<Arc<Catalog>>,
    Query(request): Query<XRequest>,
) -> impl IntoResponse {
    info!(
        op = request.op.as_deref().unwrap_or(""),
        requester_ip = request.requester_ip.as_deref().unwrap_or(""),
        institute = request.institute.as_deref().unwrap_or(""),
        "x-server request"
    );
    (
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        respond(&catalog, &request),
    )
}

/// Render the response document for one request.
///
/// Errors are reported inside the envelope with status 200, as the
/// X-Server does.
pub fn respond(catalog: &Catalog, request: &XRequest) -> String {
    let body = match request.op.as_deref() {
        Some("retrieve_categories_request") => {
            let mut out = String::new();
            for category in &catalog.categories {
                write_category(&mut out, category);
            }
            wrap("retrieve_categories_response", &out)
        }
        Some("retrieve_quick_sets_request") => {
            let mut out = String::new();
            for set in &catalog.quick_sets {
                write_quick_set(&mut out, set);
            }
            wrap("retrieve_quick_sets_response", &out)
        }
        Some("retrieve_resources_by_category_request") => {
            let sources = request
                .category_id
                .as_deref()
                .and_then(|id| catalog.subcategory(id))
                .map(|s| s.sources.as_slice())
                .unwrap_or_default();
            wrap("retrieve_resources_by_category_response", &sources_xml(sources))
        }
        Some("retrieve_resources_by_quick_set_request") => {
            let sources = request
                .quick_sets_id
                .as_deref()
                .and_then(|id| catalog.quick_set(id))
                .map(|q| q.sources.as_slice())
                .unwrap_or_default();
            wrap("retrieve_resources_by_quick_set_response", &sources_xml(sources))
        }
        Some(other) => global_error("0151", &format!("Unknown operation: {other}")),
        None => global_error("0150", "Missing op parameter"),
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <x_server_response metalib_version=\"4.00 (mock)\">{body}</x_server_response>\n"
    )
}

fn wrap(element: &str, inner: &str) -> String {
    format!("<{element}>{inner}</{element}>")
}

fn field(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("<{name}>{}</{name}>", escape(value)));
}

fn global_error(code: &str, text: &str) -> String {
    let mut out = String::new();
    field(&mut out, "error_code", code);
    field(&mut out, "error_text", text);
    wrap("global_error", &out)
}

fn sources_xml(sources: &[Source]) -> String {
    let mut out = String::new();
    for source in sources {
        write_source(&mut out, source);
    }
    out
}

fn write_source(out: &mut String, source: &Source) {
    out.push_str("<source_info>");
    field(out, "source_internal_number", &source.internal_number);
    field(out, "source_number", &source.number);
    field(out, "source_full_name", &source.full_name);
    field(out, "source_short_name", &source.short_name);
    field(out, "source_searchable", if source.searchable { "Y" } else { "N" });
    out.push_str("</source_info>");
}

fn write_category(out: &mut String, category: &Category) {
    out.push_str("<category_info>");
    field(out, "category_name", &category.name);
    for sub in &category.subcategories {
        out.push_str("<subcategory_info>");
        field(out, "subcategory_name", &sub.name);
        field(out, "sequence", &sub.sequence);
        field(out, "bases", &sub.bases);
        out.push_str("</subcategory_info>");
    }
    out.push_str("</category_info>");
}

fn write_quick_set(out: &mut String, set: &QuickSet) {
    out.push_str("<quick_set_info>");
    field(out, "quick_set_name", &set.name);
    field(out, "sequence", &set.sequence);
    field(out, "description", &set.description);
    field(out, "bases", &set.bases);
    out.push_str("</quick_set_info>");
}
