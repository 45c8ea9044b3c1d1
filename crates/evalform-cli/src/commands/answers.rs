//! The `evalform answers` command.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;

use evalform_core::model::AnswerRecord;
use evalform_stores::config::load_config_from;
use evalform_stores::create_stores;

pub async fn execute(
    evaluation: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let stores = create_stores(&config)?;

    let mut records = stores.answers.fetch_answers().await?;
    if let Some(title) = &evaluation {
        records.retain(|r| AnswerRecord::evaluation_name_of(r) == Some(title.as_str()));
    }

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            if records.is_empty() {
                println!("No answers stored.");
                return Ok(());
            }
            for record in &records {
                let author = record.get("author").and_then(Value::as_str).unwrap_or("?");
                let name = AnswerRecord::evaluation_name_of(record).unwrap_or("?");
                println!("{name}: {author}");
                if let Some(answers) = record.get("answers").and_then(Value::as_object) {
                    for (label, value) in answers {
                        match value {
                            Value::String(s) => println!("  {label}: {s}"),
                            other => println!("  {label}: {other}"),
                        }
                    }
                }
            }
            println!("\n{} record(s).", records.len());
        }
    }

    Ok(())
}
