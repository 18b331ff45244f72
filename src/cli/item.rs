use anyhow::{bail, Context, Result};
use std::path::Path;

use super::{confirm, fail, truncate};
use crate::api::ApiClient;
use crate::controller::{Confirmation, DataItemController};
use crate::error::ConsoleError;
use crate::form::{FormMachine, SubmitOutcome};
use crate::payload::ItemDraft;

async fn open(api: &ApiClient, project_id: String) -> Result<DataItemController> {
    let items = DataItemController::new(api.clone(), project_id);
    items.load_all().await.map_err(fail)?;
    Ok(items)
}

async fn read_payload(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub async fn list(api: &ApiClient, project_id: String) -> Result<()> {
    let items = open(api, project_id).await?;
    let state = items.snapshot();

    if let Some(project) = &state.project {
        println!("{} ({})", project.name, project.id);
    }

    if state.items.is_empty() {
        println!("No data items yet. Start by adding one with 'ogamba item create'.");
        return Ok(());
    }

    println!("Data Items ({})", state.items.len());
    println!("{:<38} {:<30} {:<30}", "ID", "Input", "Output");
    println!("{}", "-".repeat(100));
    for item in &state.items {
        println!(
            "{:<38} {:<30} {:<30}",
            item.id,
            truncate(item.input_preview(), 30),
            truncate(item.output_preview(), 30),
        );
    }
    Ok(())
}

/// Print the default payloads for a new item
pub fn template() {
    let draft = ItemDraft::template();
    println!("# input_message\n{}\n", draft.input);
    println!("# output_message\n{}", draft.output);
}

pub async fn show(api: &ApiClient, project_id: String, item_id: String) -> Result<()> {
    let items = open(api, project_id).await?;
    let item = items
        .find(&item_id)
        .ok_or_else(|| fail(ConsoleError::NotFound("Data item".to_string())))?;

    let draft = items.build_draft(Some(&item));
    println!("Item: {}", item.id);
    if let Some(created) = item.created_at {
        println!("Created: {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("{}", "=".repeat(80));
    println!("# input_message\n{}\n", draft.input);
    println!("# output_message\n{}", draft.output);
    Ok(())
}

pub async fn create(
    api: &ApiClient,
    project_id: String,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let input = read_payload(input).await?;
    let output = read_payload(output).await?;
    let items = open(api, project_id).await?;

    let mut form = FormMachine::new();
    form.open_for_create(&items);
    form.update_draft(|draft| {
        draft.input = input;
        draft.output = output;
    });

    submit(&mut form, &items).await?;
    println!("Data item created ({} items in project)", items.items().len());
    Ok(())
}

pub async fn edit(
    api: &ApiClient,
    project_id: String,
    item_id: String,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    if input.is_none() && output.is_none() {
        bail!("Nothing to update: pass --input and/or --output");
    }

    let input = match input {
        Some(path) => Some(read_payload(path).await?),
        None => None,
    };
    let output = match output {
        Some(path) => Some(read_payload(path).await?),
        None => None,
    };

    let items = open(api, project_id).await?;
    let mut form = FormMachine::new();
    form.open_for_edit(&items, &item_id).map_err(fail)?;
    form.update_draft(|draft| {
        if let Some(input) = input {
            draft.input = input;
        }
        if let Some(output) = output {
            draft.output = output;
        }
    });

    submit(&mut form, &items).await?;
    println!("Data item {} updated", item_id);
    Ok(())
}

pub async fn delete(
    api: &ApiClient,
    project_id: String,
    item_id: String,
    assume_yes: bool,
) -> Result<()> {
    let items = open(api, project_id).await?;
    if items.find(&item_id).is_none() {
        return Err(fail(ConsoleError::NotFound("Data item".to_string())));
    }

    if !confirm("Are you sure you want to delete this item?", assume_yes).await? {
        println!("Aborted.");
        return Ok(());
    }

    items
        .delete(&item_id, Confirmation::confirmed())
        .await
        .map_err(fail)?;
    println!("Data item {} deleted", item_id);
    Ok(())
}

async fn submit(form: &mut FormMachine<ItemDraft>, items: &DataItemController) -> Result<()> {
    match form.submit(items).await {
        SubmitOutcome::Saved => Ok(()),
        SubmitOutcome::Rejected(e) => Err(fail(e)),
        SubmitOutcome::Ignored => bail!("data item form was not open"),
    }
}
