use anyhow::{bail, Result};

use super::{confirm, fail, truncate};
use crate::api::ApiClient;
use crate::controller::{Confirmation, ProjectController, ProjectDraft};
use crate::error::ConsoleError;
use crate::form::{FormMachine, SubmitOutcome};

pub async fn list(api: &ApiClient) -> Result<()> {
    let projects = ProjectController::new(api.clone());
    projects.load().await.map_err(fail)?;

    let projects = projects.projects();
    if projects.is_empty() {
        println!("No projects found. Create one with 'ogamba project create <name>'.");
        return Ok(());
    }

    println!("{:<38} {:<30} {:<16}", "ID", "Name", "Created");
    println!("{}", "-".repeat(86));
    for p in projects {
        let created = p
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<38} {:<30} {:<16}", p.id, truncate(&p.name, 30), created);
    }
    Ok(())
}

pub async fn create(api: &ApiClient, name: String) -> Result<()> {
    let projects = ProjectController::new(api.clone());
    let mut form = FormMachine::new();
    form.open_for_create(&projects);
    form.update_draft(|draft| draft.name = name.clone());

    submit(&mut form, &projects).await?;

    let name = name.trim();
    match projects.projects().iter().rev().find(|p| p.name == name) {
        Some(p) => println!("Project '{}' created with ID: {}", p.name, p.id),
        None => println!("Project '{}' created", name),
    }
    Ok(())
}

pub async fn rename(api: &ApiClient, id: String, name: String) -> Result<()> {
    let projects = ProjectController::new(api.clone());
    projects.load().await.map_err(fail)?;

    let mut form = FormMachine::new();
    form.open_for_edit(&projects, &id).map_err(fail)?;
    form.update_draft(|draft| draft.name = name.clone());

    submit(&mut form, &projects).await?;
    println!("Project {} renamed to '{}'", id, name.trim());
    Ok(())
}

pub async fn retire(api: &ApiClient, id: String, assume_yes: bool) -> Result<()> {
    let projects = ProjectController::new(api.clone());
    projects.load().await.map_err(fail)?;

    let Some(project) = projects.find(&id) else {
        return Err(fail(ConsoleError::NotFound("Project".to_string())));
    };

    let prompt = format!("Are you sure you want to delete \"{}\"?", project.name);
    if !confirm(&prompt, assume_yes).await? {
        println!("Aborted.");
        return Ok(());
    }

    projects
        .retire(&id, Confirmation::confirmed())
        .await
        .map_err(fail)?;
    println!("Project '{}' retired", project.name);
    Ok(())
}

async fn submit(
    form: &mut FormMachine<ProjectDraft>,
    projects: &ProjectController,
) -> Result<()> {
    match form.submit(projects).await {
        SubmitOutcome::Saved => Ok(()),
        SubmitOutcome::Rejected(e) => Err(fail(e)),
        SubmitOutcome::Ignored => bail!("project form was not open"),
    }
}
