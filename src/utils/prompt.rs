//! Interactive prompts behind a trait so resolver logic can be driven in
//! tests without a terminal.
//!
//! Any prompt error, including the operator cancelling, maps to
//! `PromptAborted`.

use dialoguer::{Confirm, Input, Password, Select};

use crate::error::{Result, SetupError};

/// Abstraction over the interactive boundary
pub trait Prompter {
    /// Present a closed menu and return the index of the chosen item
    fn select(&self, label: &str, items: &[String]) -> Result<usize>;

    /// Read a line of text; with a default, empty input yields the default
    fn input(&self, label: &str, default: Option<&str>) -> Result<String>;

    /// Read a secret without echoing it
    fn password(&self, label: &str) -> Result<String>;

    /// Ask a yes/no question
    fn confirm(&self, label: &str, default: bool) -> Result<bool>;
}

/// Real prompter rendering to the terminal
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, label: &str, items: &[String]) -> Result<usize> {
        let selection = Select::new()
            .with_prompt(label)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|_| SetupError::PromptAborted)?;

        selection.ok_or(SetupError::PromptAborted)
    }

    fn input(&self, label: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = Input::<String>::new().with_prompt(label);
        if let Some(value) = default {
            prompt = prompt
                .default(value.to_string())
                .show_default(!value.is_empty())
                .allow_empty(value.is_empty());
        }
        prompt.interact_text().map_err(|_| SetupError::PromptAborted)
    }

    fn password(&self, label: &str) -> Result<String> {
        Password::new()
            .with_prompt(label)
            .interact()
            .map_err(|_| SetupError::PromptAborted)
    }

    fn confirm(&self, label: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(label)
            .default(default)
            .interact()
            .map_err(|_| SetupError::PromptAborted)
    }
}

/// A prompter that replays a fixed script of answers. Available to
/// integration tests as well.
#[allow(dead_code)]
pub mod scripted {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One scripted answer
    #[derive(Debug, Clone)]
    pub enum Answer {
        Select(usize),
        Input(String),
        Password(String),
        Confirm(bool),
        /// Simulate the operator cancelling the prompt
        Abort,
    }

    pub struct ScriptedPrompter {
        answers: Mutex<VecDeque<Answer>>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
            }
        }

        /// A prompter whose first answer aborts
        pub fn aborting() -> Self {
            Self::new(vec![Answer::Abort])
        }

        fn next(&self) -> Result<Answer> {
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(SetupError::PromptAborted)
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(&self, label: &str, items: &[String]) -> Result<usize> {
            match self.next()? {
                Answer::Select(i) => {
                    assert!(i < items.len(), "scripted selection {i} out of range for '{label}'");
                    Ok(i)
                }
                Answer::Abort => Err(SetupError::PromptAborted),
                other => panic!("expected Select answer for '{label}', got {other:?}"),
            }
        }

        fn input(&self, label: &str, default: Option<&str>) -> Result<String> {
            match self.next()? {
                Answer::Input(s) => {
                    if s.is_empty() {
                        if let Some(value) = default {
                            return Ok(value.to_string());
                        }
                    }
                    Ok(s)
                }
                Answer::Abort => Err(SetupError::PromptAborted),
                other => panic!("expected Input answer for '{label}', got {other:?}"),
            }
        }

        fn password(&self, label: &str) -> Result<String> {
            match self.next()? {
                Answer::Password(s) => Ok(s),
                Answer::Abort => Err(SetupError::PromptAborted),
                other => panic!("expected Password answer for '{label}', got {other:?}"),
            }
        }

        fn confirm(&self, label: &str, _default: bool) -> Result<bool> {
            match self.next()? {
                Answer::Confirm(b) => Ok(b),
                Answer::Abort => Err(SetupError::PromptAborted),
                other => panic!("expected Confirm answer for '{label}', got {other:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::*;
    use super::*;

    #[test]
    fn test_scripted_prompter_replays_answers() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Select(2),
            Answer::Input("hello".into()),
            Answer::Confirm(true),
        ]);

        let items: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(prompter.select("pick", &items).unwrap(), 2);
        assert_eq!(prompter.input("say", None).unwrap(), "hello");
        assert!(prompter.confirm("sure?", false).unwrap());
    }

    #[test]
    fn test_scripted_prompter_abort() {
        let prompter = ScriptedPrompter::aborting();
        let items: Vec<String> = vec!["a".into()];
        assert!(matches!(
            prompter.select("pick", &items).unwrap_err(),
            SetupError::PromptAborted
        ));
    }

    #[test]
    fn test_scripted_prompter_empty_input_uses_default() {
        let prompter = ScriptedPrompter::new(vec![Answer::Input(String::new())]);
        let value = prompter.input("endpoint", Some("s3.amazonaws.com")).unwrap();
        assert_eq!(value, "s3.amazonaws.com");
    }

    #[test]
    fn test_exhausted_script_aborts() {
        let prompter = ScriptedPrompter::new(vec![]);
        assert!(matches!(
            prompter.input("anything", None).unwrap_err(),
            SetupError::PromptAborted
        ));
    }
}
