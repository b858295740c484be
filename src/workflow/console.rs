//! Terminal interaction behind a trait so the workflow can be scripted.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented user interaction.
pub trait Console: Send {
    /// Shows one or more lines of output.
    fn say(&mut self, text: &str);

    /// Shows `prompt` and reads one line without its line ending.
    ///
    /// Returns `Ok(None)` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// [`Console`] over the process's stdin and stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn say(&mut self, text: &str) {
        println!("{text}");
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\n', '\r']).to_string()))
    }
}

/// [`Console`] that answers from a fixed list of inputs and records
/// everything shown.
///
/// Runs out of input like a closed stdin.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    /// Creates a console that will answer prompts with `inputs`, in order.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Everything said and asked so far, one entry per call.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// The transcript joined with newlines.
    pub fn output(&self) -> String {
        self.transcript.join("\n")
    }

    /// Inputs not consumed yet.
    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.transcript.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }
}
