use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::{lock, Confirmation, LoadTracker};
use crate::api::{segment, ApiClient};
use crate::error::{ConsoleError, Result};
use crate::form::{EntityForm, FormMode};
use crate::model::{NewProject, Project, ProjectPatch};

const PROJECTS_PATH: &str = "/projects/";

/// Snapshot of what the project list view renders
#[derive(Debug, Clone, Default)]
pub struct ProjectState {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub error: Option<ConsoleError>,
}

/// The project form edits a single field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
}

/// Owns the cached list of visible (non-retired) projects
pub struct ProjectController {
    api: ApiClient,
    state: Mutex<ProjectState>,
    loads: LoadTracker,
}

impl ProjectController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(ProjectState::default()),
            loads: LoadTracker::default(),
        }
    }

    pub fn snapshot(&self) -> ProjectState {
        lock(&self.state).clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        lock(&self.state).projects.clone()
    }

    pub fn find(&self, id: &str) -> Option<Project> {
        lock(&self.state)
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Stop applying responses; in-flight loads are dropped on arrival
    /// Stop applying load results; an in-flight load no longer counts as loading
    pub fn close(&self) {
        self.loads.close();
        lock(&self.state).loading = false;
    }

    /// Replace the cached list with the server's.
    ///
    /// On failure the previous list is kept and the error recorded.
    pub async fn load(&self) -> Result<()> {
        if self.loads.is_closed() {
            return Ok(());
        }
        let request_id = self.loads.begin();
        lock(&self.state).loading = true;

        let result = self.api.get::<Vec<Project>>(PROJECTS_PATH).await;

        if !self.loads.is_current(request_id) {
            debug!(request_id, "discarding superseded project list");
            return result.map(|_| ());
        }

        let mut state = lock(&self.state);
        state.loading = false;
        match result {
            Ok(projects) => {
                state.projects = projects.into_iter().filter(|p| !p.deleted).collect();
                state.error = None;
                debug!(count = state.projects.len(), "projects loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load projects");
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn create(&self, name: &str) -> Result<Project> {
        let name = validate_name(name)?;
        let project: Project = self.api.post(PROJECTS_PATH, &NewProject { name }).await?;
        info!(id = %project.id, name = %project.name, "project created");
        self.refresh().await;
        Ok(project)
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<Project> {
        let name = validate_name(name)?;
        let patch = ProjectPatch {
            name: Some(name),
            ..Default::default()
        };
        let project: Project = self.api.patch(&project_path(id), &patch).await?;
        info!(id, name = %project.name, "project renamed");
        self.refresh().await;
        Ok(project)
    }

    /// Soft-delete: the record stays on the server flagged `deleted`
    pub async fn retire(&self, id: &str, _confirmed: Confirmation) -> Result<Project> {
        let patch = ProjectPatch {
            deleted: Some(true),
            ..Default::default()
        };
        let project: Project = self.api.patch(&project_path(id), &patch).await?;
        info!(id, "project retired");
        self.refresh().await;
        Ok(project)
    }

    /// Reload after a mutation; a failure here is recorded in state by
    /// `load` and must not turn the already applied mutation into an error.
    async fn refresh(&self) {
        if let Err(e) = self.load().await {
            warn!(error = %e, "refresh after project mutation failed");
        }
    }
}

fn project_path(id: &str) -> String {
    format!("{}{}", PROJECTS_PATH, segment(id))
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConsoleError::Validation("Project name is required".to_string()));
    }
    Ok(name)
}

#[async_trait]
impl EntityForm for ProjectController {
    type Draft = ProjectDraft;

    fn blank_draft(&self) -> ProjectDraft {
        ProjectDraft::default()
    }

    fn draft_for(&self, id: &str) -> Result<ProjectDraft> {
        self.find(id)
            .map(|p| ProjectDraft { name: p.name })
            .ok_or_else(|| ConsoleError::NotFound("Project".to_string()))
    }

    fn check_draft(&self, draft: &ProjectDraft) -> Result<()> {
        validate_name(&draft.name).map(|_| ())
    }

    async fn persist(&self, mode: &FormMode, draft: &ProjectDraft) -> Result<()> {
        match mode {
            FormMode::Create => self.create(&draft.name).await.map(|_| ()),
            FormMode::Edit(id) => self.rename(id, &draft.name).await.map(|_| ()),
        }
    }
}
