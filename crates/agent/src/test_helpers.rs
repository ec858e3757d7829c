//! Shared test doubles for the collaborator traits.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use trustlens_core::error::ProviderError;
use trustlens_core::message::Message;
use trustlens_core::provider::{Provider, ProviderRequest, ProviderResponse};
use trustlens_core::{AssistantClient, AssistantQuery, NarrativeGenerator, NarrativeRequest, Roster};

enum Script {
    Echo,
    FailAfter(usize),
    Hang,
}

/// A narrative generator that answers `"comment for <chart type>"`.
pub struct ScriptedGenerator {
    script: Script,
    call_count: Mutex<usize>,
    chart_types: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn with(script: Script) -> Self {
        Self {
            script,
            call_count: Mutex::new(0),
            chart_types: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::with(Script::Echo)
    }

    /// Succeeds `n` times, then fails every call.
    pub fn failing_after(n: usize) -> Self {
        Self::with(Script::FailAfter(n))
    }

    pub fn hanging() -> Self {
        Self::with(Script::Hang)
    }

    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn chart_types(&self) -> Vec<String> {
        self.chart_types.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedGenerator {
    async fn generate(&self, request: NarrativeRequest) -> Result<String, ProviderError> {
        let call = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.chart_types.lock().unwrap().push(request.chart_type.clone());

        match self.script {
            Script::Echo => Ok(format!("comment for {}", request.chart_type)),
            Script::FailAfter(n) if call <= n => Ok(format!("comment for {}", request.chart_type)),
            Script::FailAfter(_) => Err(ProviderError::Network("connection reset".into())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::EmptyResponse)
            }
        }
    }
}

/// An assistant that replies `"reply to <message>"` or fails, recording
/// every query it receives.
pub struct ScriptedAssistant {
    fail: bool,
    hang: bool,
    queries: Mutex<Vec<AssistantQuery>>,
}

impl ScriptedAssistant {
    pub fn replying() -> Self {
        Self {
            fail: false,
            hang: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::replying()
        }
    }

    pub fn queries(&self) -> Vec<AssistantQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantClient for ScriptedAssistant {
    async fn query(&self, query: AssistantQuery) -> Result<String, ProviderError> {
        let message = query.message.clone();
        self.queries.lock().unwrap().push(query);
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "upstream error".into(),
            });
        }
        Ok(format!("reply to {message}"))
    }
}

/// A provider returning a fixed completion and recording requests.
pub struct RecordingProvider {
    reply: Result<String, ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl RecordingProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let text = self.reply.clone()?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model,
        })
    }
}

/// Two records: distinct plans and payment methods, both "Active".
pub fn sample_roster() -> Roster {
    serde_json::from_value(serde_json::json!([
        {
            "Cert Number": 1001,
            "Plan Name": "Test Plan 1",
            "Status": "Active",
            "Payment Method": "Cash",
            "New IC": "901212012345",
            "Outst Cont": 1000,
            "Cont Installment": 500
        },
        {
            "Cert Number": 1002,
            "Plan Name": "Test Plan 2",
            "Status": "Active",
            "Payment Method": "Bank Transfer",
            "New IC": "920415023456",
            "Outst Cont": 1500,
            "Cont Installment": 750
        }
    ]))
    .unwrap()
}
