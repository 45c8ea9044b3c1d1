//! The `evalform list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use evalform_stores::config::load_config_from;
use evalform_stores::create_stores;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let stores = create_stores(&config)?;

    let evaluations = stores.evaluations.fetch_evaluations().await?;
    if evaluations.is_empty() {
        println!("No evaluations found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Questions"]);
    for evaluation in &evaluations {
        table.add_row(vec![
            Cell::new(evaluation.id),
            Cell::new(&evaluation.title),
            Cell::new(evaluation.questions.len()),
        ]);
    }
    println!("{table}");

    Ok(())
}
