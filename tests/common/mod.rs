//! Shared test helpers: an in-memory connection injected through a
//! connector.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use active_resource::{
    ConfigError, Connection, ConnectionError, ConnectionSettings, Connector, HttpMethod,
    HttpRequest, HttpResponse, Registry, ResourceType,
};

/// Canned responses keyed by method and path, plus a log of every request.
#[derive(Debug, Default)]
pub struct FakeHttp {
    responses: Mutex<HashMap<(HttpMethod, String), HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    settings: Mutex<Vec<ConnectionSettings>>,
    connects: AtomicUsize,
}

impl FakeHttp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers `method path` with `response`. Unknown requests get a 404.
    pub fn respond_to(&self, method: HttpMethod, path: &str, response: HttpResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    pub fn get(&self, path: &str, code: u16, body: &str) {
        self.respond_to(HttpMethod::Get, path, HttpResponse::new(code, body));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> ConnectionSettings {
        self.settings
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("never connected")
    }
}

#[derive(Debug)]
pub struct FakeConnector(pub Arc<FakeHttp>);

impl Connector for FakeConnector {
    fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>, ConfigError> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        self.0.settings.lock().unwrap().push(settings.clone());
        Ok(Arc::new(FakeConnection(Arc::clone(&self.0))))
    }
}

#[derive(Debug)]
struct FakeConnection(Arc<FakeHttp>);

impl Connection for FakeConnection {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError> {
        self.0.requests.lock().unwrap().push(request.clone());
        let response = self
            .0
            .responses
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, ""));
        Ok(response)
    }
}

/// A registry whose base type talks to `http` and points at `site`.
pub fn registry_with(http: &Arc<FakeHttp>, site: &str) -> Registry {
    let registry = Registry::new();
    let base = registry.base();
    base.set_connector(Arc::new(FakeConnector(Arc::clone(http))));
    base.set_site(Some(site)).unwrap();
    registry
}

/// Defines `shop::Person` on a fresh fake-backed registry.
pub fn person(format: active_resource::Format) -> (Arc<FakeHttp>, Registry, ResourceType) {
    let http = FakeHttp::new();
    let registry = registry_with(&http, "http://localhost");
    let person = registry
        .define("shop", "Person")
        .format(format)
        .build()
        .unwrap();
    (http, registry, person)
}
