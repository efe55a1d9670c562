//! In-memory fakes of the ports, shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::Notify;

use parkhub_domain::error::ApiError;
use parkhub_domain::image::{Image, ImageKey, LocalFile};

use crate::ports::{ApiClient, FileStorage, Method, RequestBody};

#[derive(Debug, Clone)]
pub enum Reply {
    Data(Value),
    Status(u16, Value),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

/// Answers requests from a `(method, path)` routing table and records calls.
/// Unrouted requests fail with 404.
#[derive(Default)]
pub struct FakeApiClient {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), reply);
        self
    }

    pub fn ok(&self, method: Method, path: &str, data: Value) -> &Self {
        self.route(method, path, Reply::Data(data))
    }

    pub fn fail(&self, method: Method, path: &str, status: u16, payload: Value) -> &Self {
        self.route(method, path, Reply::Status(status, payload))
    }

    /// Hold every following request until the returned handle is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }
}

impl ApiClient for FakeApiClient {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body,
        });
        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(&(method, path.to_string()))
            .cloned();
        let gate = self.gate.lock().unwrap().clone();
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match reply {
                Some(Reply::Data(data)) => Ok(data),
                Some(Reply::Status(status, payload)) => Err(ApiError::Http {
                    status,
                    payload: serde_json::from_value(payload).unwrap_or_default(),
                }),
                None => Err(ApiError::status(404)),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Delete(String),
    Upload(String),
}

/// Records storage calls in order. Uploads return `stored-<name>` keys.
#[derive(Default)]
pub struct FakeStorage {
    calls: Mutex<Vec<StorageCall>>,
    failing: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the delete of `key` or the upload of file `name` fail with 500.
    pub fn fail_on(&self, key_or_name: &str) {
        self.failing.lock().unwrap().push(key_or_name.to_string());
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    fn fails(&self, target: &str) -> bool {
        self.failing.lock().unwrap().iter().any(|f| f == target)
    }
}

impl FileStorage for FakeStorage {
    fn upload(&self, file: &LocalFile) -> impl Future<Output = Result<Image, ApiError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push(StorageCall::Upload(file.name.clone()));
        let result = if self.fails(&file.name) {
            Err(ApiError::status(500))
        } else {
            Ok(Image::new(
                format!("stored-{}", file.name),
                format!("https://cdn.example.com/{}", file.name),
            ))
        };
        async move { result }
    }

    fn delete(&self, key: &ImageKey) -> impl Future<Output = Result<(), ApiError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push(StorageCall::Delete(key.to_string()));
        let result = if self.fails(key.as_str()) {
            Err(ApiError::status(500))
        } else {
            Ok(())
        };
        async move { result }
    }
}

pub fn png(name: &str) -> LocalFile {
    LocalFile::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

pub fn lot_json(id: &str, code: &str) -> Value {
    serde_json::json!({
        "id": id,
        "code": code,
        "name": format!("Lot {code}"),
        "address": "Calle 1",
        "latitude": 4.7,
        "longitude": -74.0,
        "status": "OPEN",
        "availability": "MORE_THAN_FIVE",
        "globalStatus": "ACTIVE",
        "images": []
    })
}
