//! Test doubles for [`AiClient`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use super::{AiClient, AiClientMetadata};

/// One request as seen by [`ScriptedAiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentPrompt {
    pub(crate) system: String,
    pub(crate) user: String,
}

/// Answers requests from a script and logs every prompt it receives.
///
/// An exhausted script fails the request.
pub(crate) struct ScriptedAiClient {
    script: Mutex<VecDeque<Result<String>>>,
    sent: Arc<Mutex<Vec<SentPrompt>>>,
}

impl ScriptedAiClient {
    pub(crate) fn new(script: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            sent: Arc::default(),
        }
    }

    /// Client that answers every request in `replies` successfully.
    pub(crate) fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok((*r).to_string())).collect())
    }

    /// Shared log of sent prompts, still readable after the client is boxed.
    pub(crate) fn sent_log(&self) -> Arc<Mutex<Vec<SentPrompt>>> {
        Arc::clone(&self.sent)
    }
}

impl AiClient for ScriptedAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        self.sent.lock().unwrap().push(SentPrompt {
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
        });
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")));
        Box::pin(async move { reply })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Scripted".to_string(),
            model: "scripted-model".to_string(),
            max_response_length: 1_024,
        }
    }
}
