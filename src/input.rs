use crate::error::InputError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;

/// Source of whitespace-delimited command tokens.
pub trait TokenSource {
    /// Block until the next token is available.
    fn next_token(&mut self) -> Result<String, InputError>;
}

/// Interactive tokens from the terminal, read a line at a time.
///
/// A line may hold several tokens; they are handed out one per call before
/// the next line is read. Blank lines are skipped.
pub struct ReadlineTokens {
    editor: DefaultEditor,
    prompt: String,
    pending: VecDeque<String>,
}

impl ReadlineTokens {
    pub fn new(prompt: impl Into<String>) -> Result<Self, InputError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            prompt: prompt.into(),
            pending: VecDeque::new(),
        })
    }
}

impl TokenSource for ReadlineTokens {
    fn next_token(&mut self) -> Result<String, InputError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    // History is a convenience; a failure to record it is not an input error.
                    let _ = self.editor.add_history_entry(line.as_str());
                    self.pending = tokenize(&line);
                }
                Err(ReadlineError::Interrupted) => return Err(InputError::Interrupted),
                Err(ReadlineError::Eof) => return Err(InputError::Eof),
                Err(err) => return Err(InputError::Readline(err)),
            }
        }
    }
}

/// Pre-recorded tokens, for embedding and tests. Exhaustion reads as end of input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTokens {
    tokens: VecDeque<String>,
}

impl ScriptedTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}

impl TokenSource for ScriptedTokens {
    fn next_token(&mut self) -> Result<String, InputError> {
        self.tokens.pop_front().ok_or(InputError::Eof)
    }
}

fn tokenize(line: &str) -> VecDeque<String> {
    line.split_whitespace().map(str::to_string).collect()
}
