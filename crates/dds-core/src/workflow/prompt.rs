//! Typed suspension points for interactive commands.
//!
//! A workflow asks its questions through a [`Prompter`] and gets back either a value or
//! [`Cancelled`]. Hosts implement the trait on top of their pickers and input boxes;
//! [`ScriptedPrompter`] answers from a prepared list.

use std::collections::VecDeque;
use std::fmt;

/// The user dismissed a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cancelled")]
pub struct Cancelled;

/// The result of one prompt.
pub type Answer<T> = Result<T, Cancelled>;

/// One choice in a pick list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    /// Text shown and matched against.
    pub label: String,
    /// Secondary text.
    pub detail: Option<String>,
}

impl PickItem {
    /// A choice without detail text.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    /// A choice with detail text.
    pub fn with_detail(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: Some(detail.into()),
        }
    }
}

/// A pick-one or pick-many request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    /// Title of the list.
    pub title: String,
    /// Choices, in display order.
    pub items: Vec<PickItem>,
}

impl PickRequest {
    /// Create a request.
    pub fn new(title: impl Into<String>, items: Vec<PickItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }

    /// Index of the item whose label equals `label`, ignoring case.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.label.eq_ignore_ascii_case(label.trim()))
    }
}

type Validator<'a> = Box<dyn Fn(&str) -> Result<(), String> + 'a>;

/// A free-text request with an optional validator.
pub struct InputRequest<'a> {
    /// Prompt text.
    pub prompt: String,
    /// Initial value.
    pub value: String,
    /// Message from the previous invalid answer, shown when re-asking.
    pub error: Option<String>,
    validator: Option<Validator<'a>>,
}

impl<'a> InputRequest<'a> {
    /// Create a request with an empty initial value.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            value: String::new(),
            error: None,
            validator: None,
        }
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Attach a validator returning an error message for unacceptable answers.
    pub fn validate(mut self, validator: impl Fn(&str) -> Result<(), String> + 'a) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Run the validator.
    pub fn check(&self, answer: &str) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator(answer),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for InputRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRequest")
            .field("prompt", &self.prompt)
            .field("value", &self.value)
            .field("error", &self.error)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Host side of the interactive workflows.
pub trait Prompter {
    /// Pick one item; returns its index.
    fn pick(&mut self, request: &PickRequest) -> Answer<usize>;

    /// Pick any number of items; returns their indices.
    fn pick_many(&mut self, request: &PickRequest) -> Answer<Vec<usize>>;

    /// Ask for text. Validation happens in [`ask`], which re-asks on invalid answers.
    fn input(&mut self, request: &InputRequest<'_>) -> Answer<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> Answer<bool>;
}

/// Ask until the answer passes the request's validator. The answer is trimmed.
pub fn ask(prompter: &mut dyn Prompter, mut request: InputRequest<'_>) -> Answer<String> {
    loop {
        let answer = prompter.input(&request)?;
        let answer = answer.trim().to_string();
        match request.check(&answer) {
            Ok(()) => return Ok(answer),
            Err(message) => {
                tracing::debug!(prompt = %request.prompt, %message, "re-asking");
                request.value = answer;
                request.error = Some(message);
            }
        }
    }
}

/// A prompter that answers from a queue of strings; an exhausted queue cancels.
///
/// Picks accept either an item label or a 1-based index; pick-many answers are comma
/// separated; confirmations accept `y`/`yes`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter that will give `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Titles and prompts seen so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, question: &str) -> Answer<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front().ok_or(Cancelled)
    }

    fn resolve(request: &PickRequest, answer: &str) -> Answer<usize> {
        if let Some(index) = request.position(answer) {
            return Ok(index);
        }
        match answer.trim().parse::<usize>() {
            Ok(number) if (1..=request.items.len()).contains(&number) => Ok(number - 1),
            _ => Err(Cancelled),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn pick(&mut self, request: &PickRequest) -> Answer<usize> {
        let answer = self.next(&request.title)?;
        Self::resolve(request, &answer)
    }

    fn pick_many(&mut self, request: &PickRequest) -> Answer<Vec<usize>> {
        let answer = self.next(&request.title)?;
        answer
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| Self::resolve(request, part))
            .collect()
    }

    fn input(&mut self, request: &InputRequest<'_>) -> Answer<String> {
        self.next(&request.prompt)
    }

    fn confirm(&mut self, message: &str) -> Answer<bool> {
        let answer = self.next(message)?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_reasks_until_valid() {
        let mut prompter = ScriptedPrompter::new(["", "abc", " 42 "]);
        let request = InputRequest::new("Length").validate(|answer| {
            answer
                .parse::<u32>()
                .map(|_| ())
                .map_err(|_| "enter a number".to_string())
        });
        assert_eq!(ask(&mut prompter, request), Ok("42".to_string()));
        assert_eq!(prompter.asked().len(), 3);
    }

    #[test]
    fn test_exhausted_script_cancels() {
        let mut prompter = ScriptedPrompter::new(["x"]);
        let request = InputRequest::new("Number").validate(|_| Err("never".to_string()));
        assert_eq!(ask(&mut prompter, request), Err(Cancelled));
    }

    #[test]
    fn test_pick_by_label_or_index() {
        let request = PickRequest::new(
            "Usage",
            vec![PickItem::new("Input"), PickItem::new("Output")],
        );
        let mut prompter = ScriptedPrompter::new(["output", "1", "3"]);
        assert_eq!(prompter.pick(&request), Ok(1));
        assert_eq!(prompter.pick(&request), Ok(0));
        assert_eq!(prompter.pick(&request), Err(Cancelled));
    }

    #[test]
    fn test_pick_many() {
        let request = PickRequest::new(
            "Keywords",
            vec![PickItem::new("COLOR(BLU)"), PickItem::new("DSPATR(HI)")],
        );
        let mut prompter = ScriptedPrompter::new(["1, DSPATR(HI)"]);
        assert_eq!(prompter.pick_many(&request), Ok(vec![0, 1]));
    }
}
