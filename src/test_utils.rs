// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock HTTP layer for `kube::Client` and an in-memory cluster
//! implementing the capability traits.

use http::{Request, Response};
use kube::api::{ApiResource, DynamicObject};
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

use crate::kubernetes::{Deleter, Getter, Lister, Patcher};
use crate::lifecycle::ObjectKey;
use crate::types::catalog::{CatalogSource, ImageSource};
use crate::types::extension::{CatalogFilter, ServiceAccountReference, SourceConfig};
use crate::types::{ClusterCatalog, ClusterCatalogSpec, ClusterExtension, ClusterExtensionSpec, Condition};

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for DELETE requests matching the path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Add a response for PATCH requests matching the path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Prefix match for collection paths
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("object", path.rsplit('/').next().unwrap_or_default())));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

pub fn catalog(name: &str) -> ClusterCatalog {
    ClusterCatalog::new(
        name,
        ClusterCatalogSpec {
            source: CatalogSource {
                source_type: "Image".to_string(),
                image: Some(ImageSource {
                    reference: format!("quay.io/example/{}:latest", name),
                    poll_interval_minutes: None,
                }),
            },
            priority: None,
            availability_mode: None,
        },
    )
}

pub fn extension(name: &str, namespace: &str) -> ClusterExtension {
    ClusterExtension::new(
        name,
        ClusterExtensionSpec {
            namespace: namespace.to_string(),
            service_account: ServiceAccountReference {
                name: "default".to_string(),
            },
            source: SourceConfig {
                source_type: "Catalog".to_string(),
                catalog: Some(CatalogFilter {
                    package_name: name.to_string(),
                    ..Default::default()
                }),
            },
            install: None,
        },
    )
}

fn key_for<K: Resource<DynamicType = ()>>(namespace: Option<&str>, name: &str) -> ObjectKey {
    ObjectKey::new(namespace, name, &K::kind(&()))
}

fn api_error(code: u16, reason: &str, key: &ObjectKey) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} {:?}: {}", key.lower_kind(), key.name, reason),
        reason: reason.to_string(),
        code,
    })
}

#[derive(Default)]
struct FakeState {
    objects: HashMap<ObjectKey, DynamicObject>,
    gets: HashMap<ObjectKey, usize>,
    deletes: HashMap<ObjectKey, usize>,
    applies: usize,
    resource_version: u64,
    get_failures: HashMap<ObjectKey, (u16, String)>,
    delete_failures: HashMap<ObjectKey, (u16, String)>,
    blocked: HashSet<ObjectKey>,
    linger: HashMap<ObjectKey, usize>,
    terminating: HashMap<ObjectKey, usize>,
    convergence: HashMap<ObjectKey, (usize, Vec<Condition>)>,
    apply_convergence: HashMap<String, (usize, Vec<Condition>)>,
    delete_delay: Option<Duration>,
    calls: Vec<String>,
}

impl FakeState {
    fn fetch(&mut self, key: &ObjectKey) -> Result<DynamicObject, kube::Error> {
        self.calls.push(format!("get {}/{}", key.kind, key));
        *self.gets.entry(key.clone()).or_default() += 1;

        if let Some((code, reason)) = self.get_failures.get(key) {
            return Err(api_error(*code, reason, key));
        }

        if let Some(remaining) = self.terminating.get_mut(key) {
            if *remaining == 0 {
                self.terminating.remove(key);
                self.objects.remove(key);
            } else {
                *remaining -= 1;
            }
        }

        let Some(object) = self.objects.get_mut(key) else {
            return Err(api_error(404, "NotFound", key));
        };

        if let Some((remaining, conditions)) = self.convergence.get_mut(key) {
            if *remaining == 0 {
                object.data["status"]["conditions"] =
                    serde_json::to_value(&*conditions).unwrap();
            } else {
                *remaining -= 1;
            }
        }

        Ok(object.clone())
    }

    fn remove(&mut self, key: &ObjectKey) -> Result<(), kube::Error> {
        if !self.objects.contains_key(key) {
            return Err(api_error(404, "NotFound", key));
        }
        if self.blocked.contains(key) {
            return Ok(());
        }
        match self.linger.get(key) {
            Some(&n) if n > 0 => {
                self.terminating.entry(key.clone()).or_insert(n);
            }
            _ => {
                self.objects.remove(key);
            }
        }
        Ok(())
    }

    fn delete(&mut self, key: &ObjectKey) -> Result<(), kube::Error> {
        self.calls.push(format!("delete {}/{}", key.kind, key));
        *self.deletes.entry(key.clone()).or_default() += 1;

        if let Some((code, reason)) = self.delete_failures.get(key) {
            return Err(api_error(*code, reason, key));
        }
        self.remove(key)
    }

    fn apply(&mut self, resource: &ApiResource, object: &DynamicObject) -> DynamicObject {
        self.applies += 1;
        self.resource_version += 1;

        let key = ObjectKey::of_dynamic(object, resource);
        self.calls.push(format!("apply {}/{}", key.kind, key));

        let mut stored = object.clone();
        if let Some(existing) = self.objects.get(&key) {
            if let Some(status) = existing.data.get("status") {
                stored.data["status"] = status.clone();
            }
        }
        stored.metadata.resource_version = Some(self.resource_version.to_string());

        if let Some(rule) = self.apply_convergence.get(&key.kind) {
            self.convergence.insert(key.clone(), rule.clone());
        }
        self.objects.insert(key, stored.clone());
        stored
    }
}

/// An in-memory API server for exercising the lifecycle primitives.
///
/// Every call is recorded. Objects can be made to fail gets or deletes, to stay
/// visible for a number of fetches after deletion, to never go away (as with a
/// blocking finalizer), or to report conditions after a number of fetches.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_object<K>(self, object: K) -> Self
    where
        K: Resource<DynamicType = ()> + serde::Serialize,
    {
        let resource = ApiResource::erase::<K>(&());
        let dynamic = crate::lifecycle::to_dynamic(&object).unwrap();
        let key = ObjectKey::of_dynamic(&dynamic, &resource);
        self.with_state(|s| {
            s.objects.insert(key, dynamic);
        })
    }

    pub fn fail_get<K: Resource<DynamicType = ()>>(self, name: &str, code: u16, reason: &str) -> Self {
        let key = key_for::<K>(None, name);
        self.with_state(|s| {
            s.get_failures.insert(key, (code, reason.to_string()));
        })
    }

    pub fn fail_delete<K: Resource<DynamicType = ()>>(self, name: &str, code: u16, reason: &str) -> Self {
        let key = key_for::<K>(None, name);
        self.with_state(|s| {
            s.delete_failures.insert(key, (code, reason.to_string()));
        })
    }

    /// Deletes are accepted but the object never disappears.
    pub fn block_deletion<K: Resource<DynamicType = ()>>(self, name: &str) -> Self {
        let key = key_for::<K>(None, name);
        self.with_state(|s| {
            s.blocked.insert(key);
        })
    }

    /// After deletion the object is still returned by the next `gets` fetches.
    pub fn linger_after_delete<K: Resource<DynamicType = ()>>(self, name: &str, gets: usize) -> Self {
        let key = key_for::<K>(None, name);
        self.with_state(|s| {
            s.linger.insert(key, gets);
        })
    }

    /// The object reports `conditions` from fetch number `after + 1` on.
    pub fn converge_after<K: Resource<DynamicType = ()>>(
        self,
        name: &str,
        after: usize,
        conditions: Vec<Condition>,
    ) -> Self {
        let key = key_for::<K>(None, name);
        self.with_state(|s| {
            s.convergence.insert(key, (after, conditions));
        })
    }

    /// Every applied object of kind `K` reports `conditions` from fetch `after + 1` on.
    pub fn converge_on_apply<K: Resource<DynamicType = ()>>(self, after: usize, conditions: Vec<Condition>) -> Self {
        let kind = K::kind(&()).into_owned();
        self.with_state(|s| {
            s.apply_convergence.insert(kind, (after, conditions));
        })
    }

    pub fn delay_deletes(self, delay: Duration) -> Self {
        self.with_state(|s| s.delete_delay = Some(delay))
    }

    /// Delete a cluster-scoped object as the server would, without counting a call.
    pub fn remove<K: Resource<DynamicType = ()>>(&self, name: &str) {
        let key = key_for::<K>(None, name);
        let _ = self.state.lock().unwrap().remove(&key);
    }

    pub fn contains<K: Resource<DynamicType = ()>>(&self, name: &str) -> bool {
        self.contains_in::<K>(None, name)
    }

    pub fn contains_in<K: Resource<DynamicType = ()>>(&self, namespace: Option<&str>, name: &str) -> bool {
        let key = key_for::<K>(namespace, name);
        self.state.lock().unwrap().objects.contains_key(&key)
    }

    /// The stored state of a cluster-scoped object
    pub fn typed<K>(&self, name: &str) -> Option<K>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        let key = key_for::<K>(None, name);
        let object = self.state.lock().unwrap().objects.get(&key).cloned()?;
        serde_json::from_value(serde_json::to_value(object).unwrap()).ok()
    }

    pub fn get_count<K: Resource<DynamicType = ()>>(&self, name: &str) -> usize {
        let key = key_for::<K>(None, name);
        self.state.lock().unwrap().gets.get(&key).copied().unwrap_or(0)
    }

    pub fn delete_count<K: Resource<DynamicType = ()>>(&self, name: &str) -> usize {
        let key = key_for::<K>(None, name);
        self.state.lock().unwrap().deletes.get(&key).copied().unwrap_or(0)
    }

    pub fn apply_count(&self) -> usize {
        self.state.lock().unwrap().applies
    }

    pub fn call_log(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl Getter for FakeCluster {
    fn get(
        &self,
        _resource: &ApiResource,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<DynamicObject, kube::Error>> + Send {
        let state = self.state.clone();
        let key = key.clone();
        async move { state.lock().unwrap().fetch(&key) }
    }
}

impl Lister for FakeCluster {
    fn list(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<DynamicObject>, kube::Error>> + Send {
        let state = self.state.clone();
        let kind = resource.kind.clone();
        let namespace = namespace.map(str::to_string);
        async move {
            let state = state.lock().unwrap();
            let mut items: Vec<(ObjectKey, DynamicObject)> = state
                .objects
                .iter()
                .filter(|(k, _)| k.kind == kind && (namespace.is_none() || k.namespace == namespace))
                .map(|(k, o)| (k.clone(), o.clone()))
                .collect();
            items.sort_by(|a, b| a.0.name.cmp(&b.0.name));
            Ok(items.into_iter().map(|(_, o)| o).collect())
        }
    }
}

impl Deleter for FakeCluster {
    fn delete(
        &self,
        _resource: &ApiResource,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<(), kube::Error>> + Send {
        let state = self.state.clone();
        let key = key.clone();
        async move {
            let delay = state.lock().unwrap().delete_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            state.lock().unwrap().delete(&key)
        }
    }
}

impl Patcher for FakeCluster {
    fn apply(
        &self,
        resource: &ApiResource,
        object: &DynamicObject,
        _field_manager: &str,
    ) -> impl Future<Output = Result<DynamicObject, kube::Error>> + Send {
        let state = self.state.clone();
        let resource = resource.clone();
        let object = object.clone();
        async move { Ok(state.lock().unwrap().apply(&resource, &object)) }
    }
}
