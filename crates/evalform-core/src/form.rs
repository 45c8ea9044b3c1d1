//! The evaluation detail form.
//!
//! Loads one evaluation by route id, collects a response per question,
//! validates completeness, and appends a labelled [`AnswerRecord`] to the
//! answer store on submit.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::instrument;

use crate::control::{Control, Field, FormView};
use crate::error::FormError;
use crate::model::{clamp_scale, AnswerRecord, Evaluation, QuestionKind, ResponseMap};
use crate::traits::{AnswerStore, EvaluationStore, IdentityProvider};

/// Lifecycle of one form mount: `Loading` then `Found` or `NotFound`.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Loading,
    Found(Evaluation),
    NotFound,
}

/// Result of an accepted submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// The record that was appended.
    pub record: AnswerRecord,
    /// Size of the answer collection after the append.
    pub total_answers: usize,
}

/// Form controller for a single evaluation.
pub struct EvaluationForm {
    evaluations: Arc<dyn EvaluationStore>,
    answers: Arc<dyn AnswerStore>,
    identity: Arc<dyn IdentityProvider>,
    state: FormState,
    responses: ResponseMap,
}

impl EvaluationForm {
    pub fn new(
        evaluations: Arc<dyn EvaluationStore>,
        answers: Arc<dyn AnswerStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            evaluations,
            answers,
            identity,
            state: FormState::Loading,
            responses: ResponseMap::new(),
        }
    }

    /// Load the evaluation whose id equals the leading integer of `route_id`.
    ///
    /// Never fails: an id with no leading integer, a missing evaluation, or a fetch error
    /// all end in [`FormState::NotFound`].
    #[instrument(skip(self))]
    pub async fn load(&mut self, route_id: &str) -> &FormState {
        self.state = FormState::Loading;
        self.responses.clear();

        let found = match parse_route_id(route_id) {
            Some(id) => match self.evaluations.fetch_evaluations().await {
                Ok(evaluations) => evaluations.into_iter().find(|e| e.id == id),
                Err(e) => {
                    tracing::error!(error = %e, "error fetching evaluations");
                    None
                }
            },
            None => {
                tracing::warn!("route id is not a number");
                None
            }
        };

        self.state = match found {
            Some(evaluation) => {
                tracing::info!(
                    evaluation = %evaluation.title,
                    questions = evaluation.questions.len(),
                    "evaluation loaded"
                );
                FormState::Found(evaluation)
            }
            None => FormState::NotFound,
        };
        &self.state
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FormState::Loading)
    }

    /// The loaded evaluation, if any.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match &self.state {
            FormState::Found(evaluation) => Some(evaluation),
            _ => None,
        }
    }

    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    /// Record the response for one question.
    ///
    /// Scale values are clamped into range; multiple-choice values must be
    /// one of the question's options (the empty string clears the choice).
    pub fn set_response(
        &mut self,
        question_id: i64,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let evaluation = self.evaluation().ok_or(FormError::NotLoaded)?;
        let question = evaluation
            .question(question_id)
            .ok_or(FormError::UnknownQuestion(question_id))?;
        let value = value.into();

        let value = match &question.kind {
            QuestionKind::Text => value,
            QuestionKind::Scale => clamp_scale(&value)
                .map(|v| v.to_string())
                .ok_or_else(|| FormError::InvalidScale {
                    value: value.clone(),
                })?,
            QuestionKind::MultipleChoice { options } => {
                if !value.is_empty() && !options.contains(&value) {
                    return Err(FormError::InvalidChoice { question_id, value });
                }
                value
            }
        };

        self.responses.set(question_id, value);
        Ok(())
    }

    /// One field per question, in evaluation order.
    pub fn controls(&self) -> Vec<Field> {
        let Some(evaluation) = self.evaluation() else {
            return Vec::new();
        };
        evaluation
            .questions
            .iter()
            .map(|q| Field {
                question_id: q.id,
                label: q.label.clone(),
                control: Control::for_question(q, self.responses.get(q.id)),
            })
            .collect()
    }

    pub fn view(&self) -> FormView {
        match &self.state {
            FormState::Loading => FormView::Loading,
            FormState::NotFound => FormView::NotFound,
            FormState::Found(evaluation) => FormView::Form {
                title: evaluation.title.clone(),
                fields: self.controls(),
            },
        }
    }

    /// Check that every question has a non-blank response.
    pub fn validate(&self) -> Result<(), FormError> {
        let evaluation = self.evaluation().ok_or(FormError::NotLoaded)?;
        let missing: Vec<String> = evaluation
            .questions
            .iter()
            .filter(|q| !self.responses.is_filled(q.id))
            .map(|q| q.label.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::Incomplete { missing })
        }
    }

    /// Map each question label to its response, skipping empty ones.
    pub fn build_record(&self, author: &str) -> Result<AnswerRecord, FormError> {
        let evaluation = self.evaluation().ok_or(FormError::NotLoaded)?;
        let answers: BTreeMap<String, String> = evaluation
            .questions
            .iter()
            .filter_map(|q| {
                self.responses
                    .get(q.id)
                    .filter(|value| !value.is_empty())
                    .map(|value| (q.label.clone(), value.to_string()))
            })
            .collect();

        Ok(AnswerRecord {
            author: author.to_string(),
            evaluation_name: evaluation.title.clone(),
            answers,
        })
    }

    /// Validate, build the record for the current user, and append it.
    ///
    /// On any error nothing is written and the form keeps its state and
    /// responses.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<SubmitReceipt, FormError> {
        if let Err(e) = self.validate() {
            if let FormError::Incomplete { missing } = &e {
                tracing::warn!(?missing, "submit rejected, unanswered questions");
            }
            return Err(e);
        }

        let user = self.identity.current_user().await?;
        let record = self.build_record(&user.name)?;
        let total_answers = self.answers.append_answer(record.clone()).await?;

        tracing::info!(
            author = %record.author,
            evaluation = %record.evaluation_name,
            total_answers,
            "answers saved"
        );
        Ok(SubmitReceipt {
            record,
            total_answers,
        })
    }

    /// Drop every captured response. The loaded evaluation stays.
    pub fn cancel(&mut self) {
        self.responses.clear();
    }
}

/// Read the leading integer of a route segment: optional whitespace, an
/// optional sign, then digits. Trailing text is ignored, so `"12abc"` and
/// `"12.5"` are both 12. Returns `None` when no digits lead the input or the
/// value does not fit in an `i64`.
pub fn parse_route_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let sign_len = trimmed.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{IdentityError, StoreError};
    use crate::model::{AnswerCollection, Question, UserProfile};

    struct FakeEvaluations {
        evaluations: Vec<Evaluation>,
        fail: bool,
    }

    #[async_trait]
    impl EvaluationStore for FakeEvaluations {
        async fn fetch_evaluations(&self) -> Result<Vec<Evaluation>, StoreError> {
            if self.fail {
                return Err(StoreError::Network("connection refused".into()));
            }
            Ok(self.evaluations.clone())
        }
    }

    #[derive(Default)]
    struct FakeAnswers {
        stored: Mutex<AnswerCollection>,
        saves: AtomicU32,
        fail_save: bool,
    }

    #[async_trait]
    impl AnswerStore for FakeAnswers {
        async fn fetch_answers(&self) -> Result<AnswerCollection, StoreError> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save_answers(&self, answers: &[serde_json::Value]) -> Result<(), StoreError> {
            if self.fail_save {
                return Err(StoreError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            self.saves.fetch_add(1, Ordering::Relaxed);
            *self.stored.lock().unwrap() = answers.to_vec();
            Ok(())
        }
    }

    struct FakeIdentity(Option<&'static str>);

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn current_user(&self) -> Result<UserProfile, IdentityError> {
            self.0.map(UserProfile::new).ok_or(IdentityError::Missing {
                key: "user".into(),
            })
        }
    }

    fn sample_evaluations() -> Vec<Evaluation> {
        vec![
            Evaluation {
                id: 1,
                title: "Onboarding".into(),
                questions: vec![Question {
                    id: 1,
                    label: "Q1".into(),
                    kind: QuestionKind::Text,
                }],
            },
            Evaluation {
                id: 2,
                title: "Quarterly".into(),
                questions: vec![
                    Question {
                        id: 10,
                        label: "Comments".into(),
                        kind: QuestionKind::Text,
                    },
                    Question {
                        id: 11,
                        label: "Score".into(),
                        kind: QuestionKind::Scale,
                    },
                    Question {
                        id: 12,
                        label: "Level".into(),
                        kind: QuestionKind::MultipleChoice {
                            options: vec!["Low".into(), "High".into()],
                        },
                    },
                ],
            },
        ]
    }

    fn make_form(
        fail_fetch: bool,
        user: Option<&'static str>,
    ) -> (EvaluationForm, Arc<FakeAnswers>) {
        let answers = Arc::new(FakeAnswers::default());
        let form = EvaluationForm::new(
            Arc::new(FakeEvaluations {
                evaluations: sample_evaluations(),
                fail: fail_fetch,
            }),
            answers.clone(),
            Arc::new(FakeIdentity(user)),
        );
        (form, answers)
    }

    #[tokio::test]
    async fn load_finds_matching_evaluation() {
        let (mut form, _) = make_form(false, Some("Ana"));
        assert!(form.is_loading());
        form.load("2").await;
        assert_eq!(form.evaluation().unwrap().title, "Quarterly");
        assert_eq!(form.controls().len(), 3);
    }

    #[tokio::test]
    async fn unknown_or_unparsable_id_is_not_found() {
        let (mut form, _) = make_form(false, Some("Ana"));
        for id in ["99", "-1", "abc", "", "99abc", "x2", "."] {
            assert_eq!(form.load(id).await, &FormState::NotFound, "id {id:?}");
            assert_eq!(form.view(), FormView::NotFound);
        }
    }

    #[tokio::test]
    async fn leading_integer_of_route_id_selects_evaluation() {
        let (mut form, _) = make_form(false, Some("Ana"));
        for id in ["2abc", "2.5", " 2", "+2", "02"] {
            form.load(id).await;
            assert_eq!(
                form.evaluation().map(|e| e.title.as_str()),
                Some("Quarterly"),
                "id {id:?}"
            );
        }
    }

    #[test]
    fn parse_route_id_reads_leading_integer() {
        assert_eq!(parse_route_id("12abc"), Some(12));
        assert_eq!(parse_route_id("12.5"), Some(12));
        assert_eq!(parse_route_id("  -3x"), Some(-3));
        assert_eq!(parse_route_id("abc12"), None);
        assert_eq!(parse_route_id("-"), None);
        assert_eq!(parse_route_id("--4"), None);
        assert_eq!(parse_route_id(""), None);
        assert_eq!(parse_route_id("99999999999999999999"), None);
    }

    #[tokio::test]
    async fn fetch_failure_clears_loading() {
        let (mut form, _) = make_form(true, Some("Ana"));
        assert_eq!(form.load("1").await, &FormState::NotFound);
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn submit_appends_labelled_record() {
        let (mut form, answers) = make_form(false, Some("Ana"));
        let older = serde_json::json!({
            "author": "Bo",
            "evaluationName": "Older",
            "answers": {"Mood": 7},
            "submittedAt": "2024-01-01"
        });
        answers.stored.lock().unwrap().push(older.clone());

        form.load("1").await;
        form.set_response(1, "hello").unwrap();
        let receipt = form.submit().await.unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("Q1".to_string(), "hello".to_string());
        assert_eq!(
            receipt.record,
            AnswerRecord {
                author: "Ana".into(),
                evaluation_name: "Onboarding".into(),
                answers: expected,
            }
        );
        assert_eq!(receipt.total_answers, 2);

        let stored = answers.stored.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], older);
        assert_eq!(stored[1], receipt.record.to_value().unwrap());
    }

    #[tokio::test]
    async fn incomplete_submit_never_writes() {
        let (mut form, answers) = make_form(false, Some("Ana"));
        form.load("2").await;
        form.set_response(10, "   ").unwrap();
        form.set_response(11, "4").unwrap();

        let err = form.submit().await.unwrap_err();
        match err {
            FormError::Incomplete { missing } => {
                assert_eq!(missing, vec!["Comments".to_string(), "Level".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(answers.saves.load(Ordering::Relaxed), 0);
        assert_eq!(form.responses().get(11), Some("4"));
        assert!(form.evaluation().is_some());
    }

    #[tokio::test]
    async fn scale_values_are_clamped() {
        let (mut form, _) = make_form(false, Some("Ana"));
        form.load("2").await;
        form.set_response(11, "15").unwrap();
        assert_eq!(form.responses().get(11), Some("10"));
        form.set_response(11, "0").unwrap();
        assert_eq!(form.responses().get(11), Some("1"));
        assert!(matches!(
            form.set_response(11, "lots"),
            Err(FormError::InvalidScale { .. })
        ));
    }

    #[tokio::test]
    async fn choice_must_be_an_option() {
        let (mut form, _) = make_form(false, Some("Ana"));
        form.load("2").await;
        assert!(matches!(
            form.set_response(12, "Medium"),
            Err(FormError::InvalidChoice { question_id: 12, .. })
        ));
        form.set_response(12, "High").unwrap();
        assert_eq!(form.responses().get(12), Some("High"));
        assert!(matches!(
            form.set_response(99, "x"),
            Err(FormError::UnknownQuestion(99))
        ));
    }

    #[tokio::test]
    async fn cancel_keeps_evaluation() {
        let (mut form, _) = make_form(false, Some("Ana"));
        form.load("2").await;
        form.set_response(10, "fine").unwrap();
        form.set_response(12, "Low").unwrap();
        form.cancel();

        assert!(form.responses().is_empty());
        assert_eq!(form.evaluation().unwrap().questions.len(), 3);
        assert!(matches!(form.view(), FormView::Form { .. }));
    }

    #[tokio::test]
    async fn identity_failure_is_surfaced_without_writing() {
        let (mut form, answers) = make_form(false, None);
        form.load("1").await;
        form.set_response(1, "hello").unwrap();
        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, FormError::Identity(IdentityError::Missing { .. })));
        assert_eq!(answers.saves.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn save_failure_is_surfaced_and_state_kept() {
        let answers = Arc::new(FakeAnswers {
            fail_save: true,
            ..Default::default()
        });
        let mut form = EvaluationForm::new(
            Arc::new(FakeEvaluations {
                evaluations: sample_evaluations(),
                fail: false,
            }),
            answers,
            Arc::new(FakeIdentity(Some("Ana"))),
        );
        form.load("1").await;
        form.set_response(1, "hello").unwrap();

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, FormError::Store(StoreError::Api { status: 500, .. })));
        assert!(matches!(form.state(), FormState::Found(_)));
        assert_eq!(form.responses().get(1), Some("hello"));
    }

    #[tokio::test]
    async fn set_response_before_load_fails() {
        let (mut form, _) = make_form(false, Some("Ana"));
        assert!(matches!(
            form.set_response(1, "x"),
            Err(FormError::NotLoaded)
        ));
        assert_eq!(form.view(), FormView::Loading);
    }
}
