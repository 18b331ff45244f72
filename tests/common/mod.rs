//! In-memory stand-in for the REST store, plugged in at the transport seam

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use ogamba::api::{ApiClient, HttpRequest, HttpResponse, Method, Transport, TransportError};
use ogamba::model::{DataItem, Message, Project};
use ogamba::session::StaticSession;

pub const BASE_URL: &str = "http://store.test";
pub const TOKEN: &str = "test-token";

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    items: Vec<DataItem>,
    requests: Vec<(Method, String)>,
    failures: HashMap<(Method, String), (u16, String)>,
    held: HashMap<String, Arc<Notify>>,
    offline: bool,
    hide_retired: bool,
}

pub struct FakeServer {
    inner: Mutex<Inner>,
}

impl FakeServer {
    /// Behaves like the production server: retired projects are filtered
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                hide_retired: true,
                ..Default::default()
            }),
        })
    }

    /// Returns retired projects in listings, flagged `deleted`
    pub fn without_retired_filter() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
        })
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(
            BASE_URL,
            self.clone(),
            Arc::new(StaticSession::new(Some(TOKEN.to_string()))),
        )
    }

    pub fn anonymous_client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(BASE_URL, self.clone(), Arc::new(StaticSession::new(None)))
    }

    pub fn seed_project(&self, name: &str) -> String {
        let project = new_project(name);
        let id = project.id.clone();
        self.inner.lock().unwrap().projects.push(project);
        id
    }

    pub fn seed_item(&self, project_id: &str, input: Vec<Message>, output: Vec<Message>) -> String {
        self.seed_raw_item(project_id, to_values(&input), to_values(&output))
    }

    /// Store message arrays exactly as given, including shapes the console
    /// would refuse to send
    pub fn seed_raw_item(&self, project_id: &str, input: Vec<Value>, output: Vec<Value>) -> String {
        let item = DataItem {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            input_message: input,
            output_message: output,
            deleted: false,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        let id = item.id.clone();
        self.inner.lock().unwrap().items.push(item);
        id
    }

    /// Every request received, as (method, path)
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests().iter().filter(|(m, _)| *m == method).count()
    }

    /// Answer the next `method path` with `status` and `body`
    pub fn fail_next(&self, method: Method, path: &str, status: u16, body: &str) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    /// The next GET of `path` computes its reply immediately but only
    /// delivers it once the returned handle is notified
    pub fn hold_next_get(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner
            .lock()
            .unwrap()
            .held
            .insert(path.to_string(), gate.clone());
        gate
    }

    fn handle(&self, method: &Method, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut inner = self.inner.lock().unwrap();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["projects"]) => {
                let hide = inner.hide_retired;
                let visible: Vec<&Project> =
                    inner.projects.iter().filter(|p| !(hide && p.deleted)).collect();
                (200, json!(visible))
            }
            ("POST", ["projects"]) => {
                let name = body
                    .as_ref()
                    .and_then(|b| b.get("name"))
                    .and_then(Value::as_str);
                match name {
                    Some(name) => {
                        let project = new_project(name);
                        inner.projects.push(project.clone());
                        (200, json!(project))
                    }
                    None => (422, json!({"detail": [{"msg": "Field required"}]})),
                }
            }
            ("PATCH", ["projects", id]) => {
                let Some(project) = inner.projects.iter_mut().find(|p| p.id == *id) else {
                    return (404, json!({"detail": "Project not found"}));
                };
                let body = body.unwrap_or_default();
                if let Some(name) = body.get("name").and_then(Value::as_str) {
                    project.name = name.to_string();
                }
                if let Some(deleted) = body.get("deleted").and_then(Value::as_bool) {
                    project.deleted = deleted;
                }
                project.updated_at = Some(Utc::now());
                (200, json!(project))
            }
            ("GET", ["projects", project_id, "data-items"]) => {
                let items: Vec<&DataItem> = inner
                    .items
                    .iter()
                    .filter(|i| i.project_id == *project_id && !i.deleted)
                    .collect();
                (200, json!(items))
            }
            ("POST", ["projects", project_id, "data-items"]) => {
                if !inner.projects.iter().any(|p| p.id == *project_id) {
                    return (404, json!({"detail": "Project not found"}));
                }
                let body = body.unwrap_or_default();
                let mut item: DataItem = match serde_json::from_value(json!({
                    "id": uuid::Uuid::new_v4().to_string(),
                    "project_id": project_id,
                    "input_message": body.get("input_message"),
                    "output_message": body.get("output_message"),
                })) {
                    Ok(item) => item,
                    Err(e) => return (422, json!({"detail": [{"msg": e.to_string()}]})),
                };
                item.created_at = Some(Utc::now());
                inner.items.push(item.clone());
                (200, json!(item))
            }
            ("PATCH", ["projects", project_id, "data-items", id]) => {
                let body = body.unwrap_or_default();
                let Some(item) = inner
                    .items
                    .iter_mut()
                    .find(|i| i.id == *id && i.project_id == *project_id)
                else {
                    return (404, json!({"detail": "Data item not found"}));
                };
                if let Some(Ok(input)) = body
                    .get("input_message")
                    .map(|v| serde_json::from_value(v.clone()))
                {
                    item.input_message = input;
                }
                if let Some(Ok(output)) = body
                    .get("output_message")
                    .map(|v| serde_json::from_value(v.clone()))
                {
                    item.output_message = output;
                }
                item.updated_at = Some(Utc::now());
                (200, json!(item))
            }
            ("DELETE", ["projects", project_id, "data-items", id]) => {
                let before = inner.items.len();
                inner
                    .items
                    .retain(|i| !(i.id == *id && i.project_id == *project_id));
                if inner.items.len() == before {
                    return (404, json!({"detail": "Data item not found"}));
                }
                (204, Value::Null)
            }
            _ => (404, json!({"detail": "Not Found"})),
        }
    }
}

fn to_values(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| serde_json::to_value(m).unwrap())
        .collect()
}

fn new_project(name: &str) -> Project {
    Project {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        deleted: false,
        owner_id: Some(1),
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .to_string();

        let (failure, gate) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.offline {
                return Err(TransportError("connection refused".to_string()));
            }
            inner.requests.push((request.method.clone(), path.clone()));
            let failure = inner
                .failures
                .remove(&(request.method.clone(), path.clone()));
            let gate = if request.method == Method::GET {
                inner.held.remove(&path)
            } else {
                None
            };
            (failure, gate)
        };

        let expected = format!("Bearer {}", TOKEN);
        if request.header("Authorization") != Some(expected.as_str()) {
            return Ok(reply(401, json!({"detail": "Not authenticated"})));
        }

        if let Some((status, body)) = failure {
            return Ok(HttpResponse {
                status,
                body: body.into_bytes(),
            });
        }

        let body = request
            .body
            .as_ref()
            .and_then(|b| serde_json::from_slice::<Value>(b).ok());
        let (status, value) = self.handle(&request.method, &path, body);

        if let Some(gate) = gate {
            gate.notified().await;
        }

        Ok(reply(status, value))
    }
}

fn reply(status: u16, value: Value) -> HttpResponse {
    let body = if value.is_null() {
        Vec::new()
    } else {
        serde_json::to_vec(&value).unwrap()
    };
    HttpResponse { status, body }
}
