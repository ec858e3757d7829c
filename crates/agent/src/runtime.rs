//! The assembled runtime shared by the gateway and the CLI.
//!
//! Built once from [`AppConfig`]: one store, one provider chain, and the
//! components that read and write through them.

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use trustlens_analytics::ingest::{self, IngestError, UploadOutcome};
use trustlens_analytics::{AggregateOptions, DashboardAggregate, find_by_cert};
use trustlens_config::AppConfig;
use trustlens_core::error::{ProviderError, StoreError};
use trustlens_core::{AssistantClient, KeyValueStore, NarrativeGenerator};
use trustlens_store::RosterRepository;

use crate::context::{
    ClientDetailsFacts, ClientsFacts, DashboardFacts, PageContext, PageContextComposer, PageFacts,
};
use crate::conversation::ConversationLog;
use crate::llm::{LlmAssistant, LlmNarrativeGenerator, ModelSettings};
use crate::narrative::{NarrativeCache, RequestStrategy};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("No client with certificate number {0}")]
    ClientNotFound(String),
}

/// Which page the assistant is being asked about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum PageRequest {
    #[default]
    Dashboard,
    Clients {
        #[serde(default)]
        query: String,
        #[serde(default = "first_page")]
        page: usize,
    },
    ClientDetails {
        cert: String,
    },
}

fn first_page() -> usize {
    1
}

pub struct Runtime {
    config: AppConfig,
    roster: RosterRepository,
    narratives: NarrativeCache,
    pages: PageContextComposer,
    conversation: ConversationLog,
    generator: Arc<dyn NarrativeGenerator>,
    assistant: Arc<dyn AssistantClient>,
}

impl Runtime {
    /// Open the configured store and build the LLM collaborators over the
    /// configured provider chain.
    pub fn from_config(config: AppConfig) -> Result<Self, RuntimeError> {
        let store = trustlens_store::open(&config.store.backend, config.store.resolved_path());
        let provider = trustlens_providers::build_from_config(&config)
            .primary()
            .ok_or_else(|| ProviderError::NotConfigured(config.default_provider.clone()))?;

        let settings = |max_tokens| ModelSettings {
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            max_tokens,
        };
        let generator = Arc::new(LlmNarrativeGenerator::new(
            provider.clone(),
            settings(config.narrative.max_tokens),
        ));
        let assistant = Arc::new(LlmAssistant::new(provider, settings(config.assistant.max_tokens)));

        Ok(Self::with_collaborators(config, store, generator, assistant))
    }

    /// Build over explicit collaborators.
    pub fn with_collaborators(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn NarrativeGenerator>,
        assistant: Arc<dyn AssistantClient>,
    ) -> Self {
        let strategy = RequestStrategy::from_name(&config.narrative.strategy).unwrap_or_default();
        let narratives = NarrativeCache::new(store.clone(), generator.clone())
            .with_timeout(Duration::from_secs(config.narrative.timeout_secs))
            .with_strategy(strategy);
        let conversation = ConversationLog::new(store.clone(), assistant.clone())
            .with_timeout(Duration::from_secs(config.assistant.timeout_secs));

        tracing::debug!(
            store = store.name(),
            strategy = ?strategy,
            "Runtime assembled"
        );
        Self {
            roster: RosterRepository::new(store.clone()),
            pages: PageContextComposer::new(store),
            narratives,
            conversation,
            generator,
            assistant,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn roster(&self) -> &RosterRepository {
        &self.roster
    }

    pub fn narratives(&self) -> &NarrativeCache {
        &self.narratives
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn generator(&self) -> &Arc<dyn NarrativeGenerator> {
        &self.generator
    }

    pub fn assistant(&self) -> &Arc<dyn AssistantClient> {
        &self.assistant
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions::new(self.today())
            .with_century_cutoff(self.config.analytics.century_cutoff)
            .with_plan_name_prefixes(self.config.analytics.plan_name_prefixes.clone())
    }

    /// Aggregate the current roster.
    pub fn dashboard(&self) -> DashboardAggregate {
        DashboardAggregate::compute(&self.roster.snapshot(), &self.aggregate_options())
    }

    /// Interpret an upload response and, when it carries rows, normalize
    /// them and replace the stored roster.
    pub fn ingest(&self, body: serde_json::Value) -> Result<UploadOutcome, RuntimeError> {
        let outcome = ingest::parse_upload(body)?;
        let UploadOutcome::Rows(rows) = outcome else {
            tracing::info!("Upload requires a password");
            return Ok(outcome);
        };
        let roster = ingest::normalize(rows, self.today())?;
        self.roster.replace(&roster)?;
        Ok(UploadOutcome::Rows(roster))
    }

    /// Drop the roster, its narratives, and nothing else.
    pub fn clear_roster(&self) -> Result<(), RuntimeError> {
        self.roster.clear()?;
        Ok(())
    }

    /// Build the facts for `request` from the current roster.
    pub fn page_facts(&self, request: &PageRequest) -> Result<PageFacts, RuntimeError> {
        let roster = self.roster.snapshot();
        let facts = match request {
            PageRequest::Dashboard => {
                PageFacts::Dashboard(DashboardFacts::from_roster(&roster, self.today()))
            }
            PageRequest::Clients { query, page } => PageFacts::Clients(ClientsFacts::from_roster(
                &roster,
                query,
                *page,
                self.config.analytics.page_size,
            )),
            PageRequest::ClientDetails { cert } => {
                let client = find_by_cert(&roster, cert)
                    .ok_or_else(|| RuntimeError::ClientNotFound(cert.clone()))?;
                PageFacts::ClientDetails(ClientDetailsFacts::for_client(client))
            }
        };
        Ok(facts)
    }

    /// Facts for `request` plus a fresh read of the roster.
    pub fn page_context(&self, request: &PageRequest) -> Result<PageContext, RuntimeError> {
        Ok(self.pages.compose(self.page_facts(request)?))
    }
}
