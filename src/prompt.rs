//! Prompt construction for the two actions the window offers.

use thiserror::Error;

/// What the user asked the model to do with the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Action {
    FindErrors,
    FixCode,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("no code to send")]
    EmptyInput,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::FindErrors => "find-errors",
            Action::FixCode => "fix-code",
        }
    }

    /// Status text while the request is running
    pub fn busy_label(&self) -> &'static str {
        match self {
            Action::FindErrors => "Finding Errors...",
            Action::FixCode => "Generating Fixes...",
        }
    }

    /// Status text once the request is over
    pub fn done_label(&self) -> &'static str {
        match self {
            Action::FindErrors => "Errors Found",
            Action::FixCode => "Fixes Generated",
        }
    }

    /// Warning shown when the input box is empty
    pub fn empty_warning(&self) -> &'static str {
        match self {
            Action::FindErrors => "Please enter some code to analyze!",
            Action::FixCode => "Please enter some code to fix!",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Action::FindErrors => "Analyze this code for potential errors:",
            Action::FixCode => "Fix this code by addressing any errors:",
        }
    }

    fn expectation(&self) -> &'static str {
        match self {
            Action::FindErrors => {
                "List any syntax errors, logical errors, or potential runtime issues with explanations. Do not suggest fixes yet."
            }
            Action::FixCode => "Provide the corrected code and explain the changes made.",
        }
    }
}

/// Build the prompt sent to the model. The code is trimmed and embedded in a
/// fenced block tagged with `language`.
pub fn build_prompt(code: &str, action: Action, language: &str) -> Result<String, PromptError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(PromptError::EmptyInput);
    }

    let mut prompt = String::new();
    prompt.push_str(action.instruction());
    prompt.push_str("\n\n```");
    prompt.push_str(language);
    prompt.push('\n');
    prompt.push_str(code);
    prompt.push_str("\n```\n\n");
    prompt.push_str(action.expectation());

    Ok(prompt)
}
