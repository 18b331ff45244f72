use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::{lock, Confirmation, LoadTracker};
use crate::api::{segment, ApiClient};
use crate::error::{ConsoleError, Result};
use crate::form::{EntityForm, FormMode};
use crate::model::{DataItem, Project};
use crate::payload::ItemDraft;

/// Snapshot of what the project detail view renders
#[derive(Debug, Clone, Default)]
pub struct DataItemState {
    pub project: Option<Project>,
    pub items: Vec<DataItem>,
    pub loading: bool,
    pub error: Option<ConsoleError>,
}

/// Owns the data items of one project.
///
/// The project id is fixed at construction and is the only project id
/// that ever appears in request paths issued from here.
pub struct DataItemController {
    api: ApiClient,
    project_id: String,
    state: Mutex<DataItemState>,
    loads: LoadTracker,
}

impl DataItemController {
    pub fn new(api: ApiClient, project_id: impl Into<String>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            state: Mutex::new(DataItemState::default()),
            loads: LoadTracker::default(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn snapshot(&self) -> DataItemState {
        lock(&self.state).clone()
    }

    pub fn project(&self) -> Option<Project> {
        lock(&self.state).project.clone()
    }

    pub fn items(&self) -> Vec<DataItem> {
        lock(&self.state).items.clone()
    }

    pub fn find(&self, item_id: &str) -> Option<DataItem> {
        lock(&self.state)
            .items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
    }

    /// Stop applying load results; an in-flight load no longer counts as loading
    pub fn close(&self) {
        self.loads.close();
        lock(&self.state).loading = false;
    }

    fn items_path(&self) -> String {
        format!("/projects/{}/data-items/", segment(&self.project_id))
    }

    fn item_path(&self, item_id: &str) -> String {
        format!("{}{}", self.items_path(), segment(item_id))
    }

    /// Fetch the project record and its items.
    ///
    /// Both requests must succeed before anything is applied; otherwise
    /// the previous state stays and the error is recorded.
    pub async fn load_all(&self) -> Result<()> {
        if self.loads.is_closed() {
            return Ok(());
        }
        let request_id = self.loads.begin();
        lock(&self.state).loading = true;

        let result = self.fetch().await;

        if !self.loads.is_current(request_id) {
            debug!(request_id, project_id = %self.project_id, "discarding superseded item list");
            return result.map(|_| ());
        }

        let mut state = lock(&self.state);
        state.loading = false;
        match result {
            Ok((project, items)) => {
                state.project = Some(project);
                state.items = items;
                state.error = None;
                debug!(count = state.items.len(), project_id = %self.project_id, "data items loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, project_id = %self.project_id, "failed to load data items");
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<(Project, Vec<DataItem>)> {
        let projects: Vec<Project> = self.api.get("/projects/").await?;
        let project = projects
            .into_iter()
            .find(|p| p.id == self.project_id && !p.deleted)
            .ok_or_else(|| ConsoleError::NotFound("Project".to_string()))?;

        let items: Vec<DataItem> = self.api.get(&self.items_path()).await?;
        let items = items.into_iter().filter(|item| !item.deleted).collect();
        Ok((project, items))
    }

    /// Editable text for the item form: the item's messages, or the
    /// default one-turn template for a new item
    pub fn build_draft(&self, existing: Option<&DataItem>) -> ItemDraft {
        match existing {
            Some(item) => ItemDraft::from_item(item),
            None => ItemDraft::template(),
        }
    }

    /// Validate the draft and create (`existing` absent) or update the item.
    ///
    /// Invalid drafts fail with `Validation` before any request is sent;
    /// the draft is only borrowed, so the caller's text stays as typed.
    pub async fn save(&self, draft: &ItemDraft, existing: Option<&DataItem>) -> Result<DataItem> {
        let payload = draft.to_payload()?;

        let item: DataItem = match existing {
            Some(current) => {
                let item: DataItem = self.api.patch(&self.item_path(&current.id), &payload).await?;
                info!(id = %current.id, project_id = %self.project_id, "data item updated");
                item
            }
            None => {
                let item: DataItem = self.api.post(&self.items_path(), &payload).await?;
                info!(id = %item.id, project_id = %self.project_id, "data item created");
                item
            }
        };

        self.refresh().await;
        Ok(item)
    }

    pub async fn delete(&self, item_id: &str, _confirmed: Confirmation) -> Result<()> {
        self.api.delete(&self.item_path(item_id)).await?;
        info!(id = item_id, project_id = %self.project_id, "data item deleted");
        self.refresh().await;
        Ok(())
    }

    async fn refresh(&self) {
        if let Err(e) = self.load_all().await {
            warn!(error = %e, project_id = %self.project_id, "refresh after data item mutation failed");
        }
    }
}

#[async_trait]
impl EntityForm for DataItemController {
    type Draft = ItemDraft;

    fn blank_draft(&self) -> ItemDraft {
        self.build_draft(None)
    }

    fn draft_for(&self, id: &str) -> Result<ItemDraft> {
        self.find(id)
            .map(|item| self.build_draft(Some(&item)))
            .ok_or_else(|| ConsoleError::NotFound("Data item".to_string()))
    }

    fn check_draft(&self, draft: &ItemDraft) -> Result<()> {
        draft.check_required()
    }

    async fn persist(&self, mode: &FormMode, draft: &ItemDraft) -> Result<()> {
        match mode {
            FormMode::Create => self.save(draft, None).await.map(|_| ()),
            FormMode::Edit(id) => {
                let existing = self
                    .find(id)
                    .ok_or_else(|| ConsoleError::NotFound("Data item".to_string()))?;
                self.save(draft, Some(&existing)).await.map(|_| ())
            }
        }
    }
}
