//! Input controls and the renderable view of a form.
//!
//! Each question maps to one [`Control`] chosen by its type. Views are plain
//! data with a text rendering, so any front end can draw them.

use std::fmt;

use crate::model::{clamp_scale, Question, QuestionKind, SCALE_DEFAULT, SCALE_MAX, SCALE_MIN};

/// Hint shown in an empty text field.
pub const TEXT_PLACEHOLDER: &str = "Enter your answer";
/// Disabled prompt shown above the options of a closed-choice selector.
pub const SELECT_PLACEHOLDER: &str = "Select an option";

/// The input rendered for one question. Every control is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Free-text field.
    TextInput { value: String },
    /// Bounded numeric slider.
    Slider { min: u8, max: u8, value: u8 },
    /// Closed-choice selector. `options` is exactly the question's option
    /// list; the placeholder is not one of them.
    Select {
        options: Vec<String>,
        selected: Option<String>,
    },
}

impl Control {
    /// Build the control for `question` showing the current `response`.
    pub fn for_question(question: &Question, response: Option<&str>) -> Self {
        match &question.kind {
            QuestionKind::Text => Control::TextInput {
                value: response.unwrap_or_default().to_string(),
            },
            QuestionKind::Scale => Control::Slider {
                min: SCALE_MIN,
                max: SCALE_MAX,
                value: response.and_then(clamp_scale).unwrap_or(SCALE_DEFAULT),
            },
            QuestionKind::MultipleChoice { options } => Control::Select {
                options: options.clone(),
                selected: response
                    .filter(|value| options.iter().any(|o| o == value))
                    .map(str::to_string),
            },
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::TextInput { value } if value.is_empty() => {
                writeln!(f, "  > ({TEXT_PLACEHOLDER})")
            }
            Control::TextInput { value } => writeln!(f, "  > {value}"),
            Control::Slider { min, max, value } => {
                writeln!(f, "  [{min}..{max}] {value}")
            }
            Control::Select { options, selected } => {
                if selected.is_none() {
                    writeln!(f, "  -- {SELECT_PLACEHOLDER} --")?;
                }
                for (index, option) in options.iter().enumerate() {
                    let mark = if selected.as_deref() == Some(option.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    writeln!(f, "  ({mark}) {}. {option}", index + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// One labelled question with its control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub question_id: i64,
    pub label: String,
    pub control: Control,
}

/// What the form shows for its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormView {
    Loading,
    NotFound,
    Form { title: String, fields: Vec<Field> },
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormView::Loading => writeln!(f, "Loading..."),
            FormView::NotFound => writeln!(f, "No current evaluation."),
            FormView::Form { title, fields } => {
                writeln!(f, "{title}")?;
                writeln!(f, "{}", "=".repeat(title.chars().count()))?;
                for field in fields {
                    writeln!(f)?;
                    writeln!(f, "{}", field.label)?;
                    write!(f, "{}", field.control)?;
                }
                Ok(())
            }
        }
    }
}
