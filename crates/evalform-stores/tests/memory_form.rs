//! Form flow on the in-memory stores.
//!
//! Exercises `EvaluationForm` without a network: evaluation lookup, fetch
//! failures, and many concurrent submitters sharing one answer store.

use std::sync::Arc;

use evalform_core::form::{EvaluationForm, FormState};
use evalform_core::model::{Evaluation, Question, QuestionKind};
use evalform_stores::mock::{MemoryAnswerStore, MemoryEvaluationStore};
use evalform_stores::StaticIdentity;

fn evaluations() -> Vec<Evaluation> {
    vec![Evaluation {
        id: 12,
        title: "Retro".into(),
        questions: vec![
            Question {
                id: 1,
                label: "Went well".into(),
                kind: QuestionKind::Text,
            },
            Question {
                id: 2,
                label: "Energy".into(),
                kind: QuestionKind::Scale,
            },
        ],
    }]
}

#[tokio::test]
async fn memory_stores_back_a_full_submit() {
    let evaluation_store = Arc::new(MemoryEvaluationStore::new(evaluations()));
    let answer_store = Arc::new(MemoryAnswerStore::new(vec![serde_json::json!({
        "author": "Bo",
        "evaluationName": "Retro",
        "answers": {"Energy": 3}
    })]));

    let mut form = EvaluationForm::new(
        evaluation_store.clone(),
        answer_store.clone(),
        Arc::new(StaticIdentity::new("Ana")),
    );
    form.load("12abc").await;
    assert_eq!(evaluation_store.call_count(), 1);

    form.set_response(1, "pairing").unwrap();
    form.set_response(2, "11").unwrap();
    let receipt = form.submit().await.unwrap();

    assert_eq!(receipt.total_answers, 2);
    let stored = answer_store.answers();
    assert_eq!(stored[0]["answers"]["Energy"], 3);
    assert_eq!(
        stored[1],
        serde_json::json!({
            "author": "Ana",
            "evaluationName": "Retro",
            "answers": {"Went well": "pairing", "Energy": "10"}
        })
    );
}

#[tokio::test]
async fn id_without_digits_skips_the_fetch() {
    let evaluation_store = Arc::new(MemoryEvaluationStore::new(evaluations()));
    let mut form = EvaluationForm::new(
        evaluation_store.clone(),
        Arc::new(MemoryAnswerStore::default()),
        Arc::new(StaticIdentity::new("Ana")),
    );

    assert_eq!(form.load("retro").await, &FormState::NotFound);
    assert_eq!(evaluation_store.call_count(), 0);
}

#[tokio::test]
async fn failing_evaluation_store_leaves_form_not_found() {
    let evaluation_store = Arc::new(MemoryEvaluationStore::failing("offline"));
    let answer_store = Arc::new(MemoryAnswerStore::default());
    let mut form = EvaluationForm::new(
        evaluation_store.clone(),
        answer_store.clone(),
        Arc::new(StaticIdentity::new("Ana")),
    );

    assert_eq!(form.load("12").await, &FormState::NotFound);
    assert!(!form.is_loading());
    assert_eq!(evaluation_store.call_count(), 1);
    assert!(form.submit().await.is_err());
    assert_eq!(answer_store.save_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_form_submits_all_land() {
    let evaluation_store = Arc::new(MemoryEvaluationStore::new(evaluations()));
    let answer_store = Arc::new(MemoryAnswerStore::default());

    let mut handles = Vec::new();
    for i in 0..16 {
        let evaluation_store = evaluation_store.clone();
        let answer_store = answer_store.clone();
        handles.push(tokio::spawn(async move {
            let mut form = EvaluationForm::new(
                evaluation_store,
                answer_store,
                Arc::new(StaticIdentity::new(format!("user-{i}"))),
            );
            form.load("12").await;
            form.set_response(1, format!("note {i}")).unwrap();
            form.set_response(2, "5").unwrap();
            form.submit().await.map(|receipt| receipt.total_answers)
        }));
    }

    let mut totals = Vec::new();
    for handle in handles {
        totals.push(handle.await.unwrap().unwrap());
    }
    totals.sort_unstable();
    assert_eq!(totals, (1..=16).collect::<Vec<_>>());

    let stored = answer_store.answers();
    assert_eq!(stored.len(), 16);
    for i in 0..16 {
        let author = format!("user-{i}");
        assert!(stored.iter().any(|r| r["author"] == author.as_str()));
    }
    assert_eq!(evaluation_store.call_count(), 16);
}
