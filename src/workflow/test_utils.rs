//! Recording mocks for workflow tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use anyhow::Result;

use crate::ai::{ContentGenerator, GeneratedContent, GenerationRequest};
use crate::editor::{EditorBridge, EditorError};
use crate::provider::{ExistingRequest, ProviderError, ProviderFuture, RepoProvider, RequestRecord};

/// A provider call as seen by [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProviderCall {
    Find,
    Create { title: String, description: String },
    Update { id: u64, title: String, description: String },
}

/// Provider with a canned lookup result that records every call.
pub(crate) struct MockProvider {
    existing: Option<ExistingRequest>,
    lookup_fails: bool,
    save_error: Option<String>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockProvider {
    pub(crate) fn new(existing: Option<ExistingRequest>) -> Self {
        Self {
            existing,
            lookup_fails: false,
            save_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Lookup returns a transport error.
    pub(crate) fn failing_lookup() -> Self {
        Self {
            lookup_fails: true,
            ..Self::new(None)
        }
    }

    /// Create and update return an API error with `body`.
    pub(crate) fn with_save_error(mut self, body: &str) -> Self {
        self.save_error = Some(body.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Create and update calls only.
    pub(crate) fn mutations(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != ProviderCall::Find)
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn saved(&self, id: u64) -> Result<RequestRecord, ProviderError> {
        match &self.save_error {
            Some(body) => Err(ProviderError::Api {
                status: 422,
                body: body.clone(),
            }),
            None => Ok(RequestRecord {
                id,
                url: format!("https://example.test/pr/{id}"),
                state: "open".to_string(),
            }),
        }
    }
}

impl RepoProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn request_noun(&self) -> &'static str {
        "pull request"
    }

    fn request_ref(&self, id: u64) -> String {
        format!("#{id}")
    }

    fn find_existing_request<'a>(
        &'a self,
        _repository: &'a str,
        _source_branch: &'a str,
        _target_branch: &'a str,
    ) -> ProviderFuture<'a, Option<ExistingRequest>> {
        self.record(ProviderCall::Find);
        let result = if self.lookup_fails {
            Err(ProviderError::Network("connection refused".to_string()))
        } else {
            Ok(self.existing.clone())
        };
        Box::pin(async move { result })
    }

    fn create_request<'a>(
        &'a self,
        _repository: &'a str,
        _source_branch: &'a str,
        _target_branch: &'a str,
        title: &'a str,
        description: &'a str,
    ) -> ProviderFuture<'a, RequestRecord> {
        self.record(ProviderCall::Create {
            title: title.to_string(),
            description: description.to_string(),
        });
        let result = self.saved(7);
        Box::pin(async move { result })
    }

    fn update_request<'a>(
        &'a self,
        _repository: &'a str,
        request_id: u64,
        title: &'a str,
        description: &'a str,
    ) -> ProviderFuture<'a, RequestRecord> {
        self.record(ProviderCall::Update {
            id: request_id,
            title: title.to_string(),
            description: description.to_string(),
        });
        let result = self.saved(request_id);
        Box::pin(async move { result })
    }
}

/// Generator answering from a queue and recording requests.
pub(crate) struct MockGenerator {
    responses: Mutex<VecDeque<Result<GeneratedContent>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub(crate) fn new(responses: Vec<Result<GeneratedContent>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ContentGenerator for MockGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedContent>> + Send + 'a>> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")));
        Box::pin(async move { response })
    }
}

/// Successful generator output.
pub(crate) fn content(title: &str, description: &str) -> Result<GeneratedContent> {
    Ok(GeneratedContent {
        title: title.to_string(),
        description: description.to_string(),
        model: "mock-model".to_string(),
    })
}

/// Editor answering from a queue and recording the buffers it was given.
pub(crate) struct MockEditor {
    configured: bool,
    responses: Mutex<VecDeque<Result<String, EditorError>>>,
    buffers: Mutex<Vec<(String, String)>>,
}

impl MockEditor {
    pub(crate) fn new(responses: Vec<Result<String, EditorError>>) -> Self {
        Self {
            configured: true,
            responses: Mutex::new(VecDeque::from(responses)),
            buffers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    /// `(initial_text, extension_hint)` of every session.
    pub(crate) fn buffers(&self) -> Vec<(String, String)> {
        self.buffers.lock().unwrap().clone()
    }
}

impl EditorBridge for MockEditor {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn edit_buffer(&self, initial_text: &str, extension_hint: &str) -> Result<String, EditorError> {
        if !self.configured {
            return Err(EditorError::NotConfigured);
        }
        self.buffers
            .lock()
            .unwrap()
            .push((initial_text.to_string(), extension_hint.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(EditorError::ExitStatus {
                editor: "mock".to_string(),
                code: Some(1),
            }))
    }
}

/// Editor failure as returned by a crashing editor.
pub(crate) fn editor_failure() -> Result<String, EditorError> {
    Err(EditorError::ExitStatus {
        editor: "mock".to_string(),
        code: Some(1),
    })
}
