//! The `evalform fill` command.
//!
//! Applies `--answer` values, prompts on stdin for every question still
//! unanswered, then submits. Typing `:cancel` at any prompt clears all
//! responses and starts over.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use evalform_core::control::{Control, Field};
use evalform_core::error::FormError;
use evalform_core::traits::IdentityProvider;
use evalform_core::EvaluationForm;
use evalform_stores::config::load_config_from;
use evalform_stores::{create_stores, LocalState, LocalStateIdentity, StaticIdentity};

const CANCEL: &str = ":cancel";

pub async fn execute(
    id: String,
    answers: Vec<String>,
    author: Option<String>,
    state_file: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let stores = create_stores(&config)?;

    let identity: Arc<dyn IdentityProvider> = match author {
        Some(name) => Arc::new(StaticIdentity::new(name)),
        None => {
            let path = state_file.unwrap_or_else(|| config.state_file.clone());
            Arc::new(LocalStateIdentity::new(LocalState::new(path)))
        }
    };

    let mut form = EvaluationForm::new(stores.evaluations, stores.answers, identity);
    form.load(&id).await;
    let Some(evaluation) = form.evaluation() else {
        print!("{}", form.view());
        anyhow::bail!("evaluation '{id}' not found");
    };
    println!("{}\n", evaluation.title);

    for pair in &answers {
        let (question_id, value) = parse_answer(pair)?;
        tracing::debug!(question_id, "applying pre-filled answer");
        form.set_response(question_id, value)
            .with_context(|| format!("invalid --answer '{pair}'"))?;
    }

    let stdin = io::stdin();
    prompt_unanswered(&mut form, &mut stdin.lock())?;

    match form.submit().await {
        Ok(receipt) => {
            println!(
                "Saved answers to '{}' as {} ({} records stored).",
                receipt.record.evaluation_name, receipt.record.author, receipt.total_answers
            );
            Ok(())
        }
        Err(FormError::Incomplete { missing }) => {
            eprintln!("Please complete all fields.");
            anyhow::bail!("unanswered: {}", missing.join(", "))
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse `QUESTION_ID=VALUE`.
fn parse_answer(pair: &str) -> Result<(i64, String)> {
    let (id, value) = pair
        .split_once('=')
        .with_context(|| format!("expected QUESTION_ID=VALUE, got '{pair}'"))?;
    let id = id
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid question id in '{pair}'"))?;
    Ok((id, value.to_string()))
}

/// Prompt for every unanswered question until answered, cancelled, or EOF.
fn prompt_unanswered(form: &mut EvaluationForm, input: &mut impl BufRead) -> Result<()> {
    'fill: loop {
        for field in form.controls() {
            if form.responses().is_filled(field.question_id) {
                continue;
            }
            loop {
                print_prompt(&field)?;
                let Some(line) = read_line(input)? else {
                    // Out of input: submit what we have and let validation decide.
                    return Ok(());
                };
                if line.trim() == CANCEL {
                    form.cancel();
                    println!("Responses cleared.");
                    continue 'fill;
                }
                let Some(value) = input_value(&field.control, &line) else {
                    eprintln!("  This field is required.");
                    continue;
                };
                match form.set_response(field.question_id, value) {
                    Ok(()) => break,
                    Err(e) if e.is_user_input() => eprintln!("  {e}"),
                    Err(e) => return Err(e.into()),
                }
            }
        }
        return Ok(());
    }
}

fn print_prompt(field: &Field) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", field.label)?;
    write!(out, "{}", field.control)?;
    let hint = match &field.control {
        Control::TextInput { .. } => "answer".to_string(),
        Control::Slider { min, max, value } => format!("{min}-{max}, enter keeps {value}"),
        Control::Select { options, .. } => format!("1-{} or option text", options.len()),
    };
    write!(out, "[{hint}]: ")?;
    out.flush()?;
    Ok(())
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Turn a typed line into the value for `control`. `None` means nothing
/// usable was entered.
fn input_value(control: &Control, line: &str) -> Option<String> {
    let trimmed = line.trim();
    match control {
        Control::TextInput { .. } => (!trimmed.is_empty()).then(|| line.to_string()),
        Control::Slider { value, .. } if trimmed.is_empty() => Some(value.to_string()),
        Control::Slider { .. } => Some(trimmed.to_string()),
        Control::Select { .. } if trimmed.is_empty() => None,
        Control::Select { options, .. } => {
            let by_index = trimmed
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i));
            Some(by_index.map_or(trimmed, String::as_str).to_string())
        }
    }
}
