//! Domain-level retrieval over a `Transport`.
//!
//! # Design
//! Every operation is one stateless round trip: build params, merge the
//! configured defaults, consult the cache, send, map, store. The merge lives
//! in `merge_defaults` and the round trip in `ResourceService::retrieve`, so
//! the four remote operations cannot drift apart.
//!
//! `TransportError` is returned unchanged. The service adds no retries.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::form_urlencoded;

use crate::cache::{Cache, NullCache};
use crate::config::{ServiceConfig, DEFAULT_CACHE_TTL_SECS};
use crate::error::TransportError;
use crate::mapping::{map_all, FromNode};
use crate::params::Params;
use crate::transport::Transport;
use crate::types::{Category, QuickSet, Resource};

pub const RETRIEVE_RESOURCES_BY_CATEGORY: &str = "retrieve_resources_by_category_request";
pub const RETRIEVE_CATEGORIES: &str = "retrieve_categories_request";
pub const RETRIEVE_QUICK_SETS: &str = "retrieve_quick_sets_request";
pub const RETRIEVE_RESOURCES_BY_QUICK_SET: &str = "retrieve_resources_by_quick_set_request";

pub const CATEGORY_ID: &str = "category_id";
pub const QUICK_SETS_ID: &str = "quick_sets_id";
pub const REQUESTER_IP: &str = "requester_ip";
pub const INSTITUTE: &str = "institute";

/// Parameters added to every request when configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub requester_ip: String,
    pub institute: String,
}

impl Defaults {
    pub fn new(requester_ip: impl Into<String>, institute: impl Into<String>) -> Self {
        Self {
            requester_ip: requester_ip.into(),
            institute: institute.into(),
        }
    }
}

/// Append `requester_ip` then `institute` after the operation's own keys.
/// Without defaults the params are returned untouched.
pub fn merge_defaults(mut params: Params, defaults: Option<&Defaults>) -> Params {
    if let Some(defaults) = defaults {
        params.insert(REQUESTER_IP, defaults.requester_ip.as_str());
        params.insert(INSTITUTE, defaults.institute.as_str());
    }
    params
}

/// Cache key for a request: the request name plus its params, urlencoded.
pub fn request_signature(request_name: &str, params: &Params) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    params.encode_into(&mut query);
    format!("{request_name}?{}", query.finish())
}

/// Retrieves categories, quick sets and resources from the X-Server.
pub struct ResourceService<T> {
    transport: T,
    defaults: Option<Defaults>,
    cache: Box<dyn Cache>,
    cache_ttl_secs: u64,
}

impl<T: Transport> ResourceService<T> {
    /// A service without default parameters and without caching.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            defaults: None,
            cache: Box::new(NullCache),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    pub fn from_config(transport: T, config: &ServiceConfig) -> Self {
        let mut service = Self::new(transport);
        service.defaults = config.defaults();
        service.cache_ttl_secs = config.cache_ttl_secs;
        service
    }

    pub fn with_defaults(
        mut self,
        requester_ip: impl Into<String>,
        institute: impl Into<String>,
    ) -> Self {
        self.defaults = Some(Defaults::new(requester_ip, institute));
        self
    }

    pub fn with_cache(mut self, cache: impl Cache + 'static, ttl_secs: u64) -> Self {
        self.cache = Box::new(cache);
        self.cache_ttl_secs = ttl_secs;
        self
    }

    pub fn defaults(&self) -> Option<&Defaults> {
        self.defaults.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[instrument(skip(self))]
    pub fn retrieve_by_category(&self, category_id: &str) -> Result<Vec<Resource>, TransportError> {
        self.retrieve(
            RETRIEVE_RESOURCES_BY_CATEGORY,
            Params::new().with(CATEGORY_ID, category_id),
        )
    }

    #[instrument(skip(self))]
    pub fn retrieve_categories(&self) -> Result<Vec<Category>, TransportError> {
        self.retrieve(RETRIEVE_CATEGORIES, Params::new())
    }

    #[instrument(skip(self))]
    pub fn retrieve_quick_sets(&self) -> Result<Vec<QuickSet>, TransportError> {
        self.retrieve(RETRIEVE_QUICK_SETS, Params::new())
    }

    #[instrument(skip(self))]
    pub fn retrieve_by_quick_set(
        &self,
        quick_set_id: &str,
    ) -> Result<Vec<Resource>, TransportError> {
        self.retrieve(
            RETRIEVE_RESOURCES_BY_QUICK_SET,
            Params::new().with(QUICK_SETS_ID, quick_set_id),
        )
    }

    /// The first category named exactly `name`, from the full category list.
    #[instrument(skip(self))]
    pub fn find_category(&self, name: &str) -> Result<Option<Category>, TransportError> {
        Ok(self
            .retrieve_categories()?
            .into_iter()
            .find(|category| category.name == name))
    }

    fn retrieve<E>(&self, request_name: &str, params: Params) -> Result<Vec<E>, TransportError>
    where
        E: FromNode + Serialize + DeserializeOwned,
    {
        let params = merge_defaults(params, self.defaults.as_ref());
        let key = request_signature(request_name, &params);

        if let Some(entities) = self.cached(&key) {
            return Ok(entities);
        }

        let document = self.transport.send(request_name, &params, true)?;
        let entities: Vec<E> = map_all(&document);
        debug!(count = entities.len(), "mapped response");

        self.store(&key, &entities);
        Ok(entities)
    }

    fn cached<E: DeserializeOwned>(&self, key: &str) -> Option<Vec<E>> {
        let raw = self.cache.fetch(key)?;
        match serde_json::from_str(&raw) {
            Ok(entities) => {
                debug!(key, "cache hit");
                Some(entities)
            }
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                self.cache.delete(key);
                None
            }
        }
    }

    fn store<E: Serialize>(&self, key: &str, entities: &[E]) {
        match serde_json::to_string(entities) {
            Ok(raw) => {
                if !self.cache.save(key, raw, self.cache_ttl_secs) {
                    warn!(key, "cache refused entry");
                }
            }
            Err(e) => warn!(key, error = %e, "could not serialize entities for cache"),
        }
    }
}
