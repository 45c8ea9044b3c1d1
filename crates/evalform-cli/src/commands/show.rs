//! The `evalform show` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use evalform_core::EvaluationForm;
use evalform_stores::config::load_config_from;
use evalform_stores::{create_stores, StaticIdentity};

pub async fn execute(id: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let stores = create_stores(&config)?;

    // Rendering never submits, so no identity is needed.
    let mut form = EvaluationForm::new(
        stores.evaluations,
        stores.answers,
        Arc::new(StaticIdentity::new("")),
    );
    form.load(&id).await;
    print!("{}", form.view());

    Ok(())
}
