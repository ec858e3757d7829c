//! Narrative cache: one short generated comment per dashboard chart.
//!
//! Comments are keyed by the fingerprint of the whole [`DashboardAggregate`].
//! A change anywhere in the aggregate invalidates all five comments
//! together.
//!
//! Resolution order:
//!
//! 1. **Reused**: stored fingerprint matches and comments exist. No request.
//! 2. **Fresh**: every category request succeeded. Persisted.
//! 3. **Fallback / Previous**: a request failed; the stored comments are
//!    returned as they are.
//! 4. **Fallback / Static**: a request failed and nothing was stored; fixed
//!    sentences are returned and persisted under the current fingerprint so
//!    the next render does not retry.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use trustlens_analytics::DashboardAggregate;
use trustlens_analytics::distribution;
use trustlens_analytics::financial::IN_FORCE;
use trustlens_analytics::signups;
use trustlens_core::error::ProviderError;
use trustlens_core::store::{read_json, write_json};
use trustlens_core::{KeyValueStore, NarrativeGenerator, NarrativeRequest, StoreKey};

/// Comments keyed by [`Category::key`].
pub type Comments = BTreeMap<String, String>;

/// The five chart categories, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Plan,
    Status,
    Payment,
    Age,
    Signups,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Plan,
        Category::Status,
        Category::Payment,
        Category::Age,
        Category::Signups,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Plan => "plan",
            Category::Status => "status",
            Category::Payment => "payment",
            Category::Age => "age",
            Category::Signups => "signups",
        }
    }

    /// Chart title sent to the generator.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Plan => "Plan Distribution",
            Category::Status => "Status Distribution",
            Category::Payment => "Payment Method Distribution",
            Category::Age => "Age Distribution",
            Category::Signups => "Monthly Signups",
        }
    }

    pub fn fallback_text(&self) -> &'static str {
        match self {
            Category::Plan => "Analysis of plan distribution.",
            Category::Status => "Overview of client status distribution.",
            Category::Payment => "Summary of payment method preferences.",
            Category::Age => "Analysis of client age demographics.",
            Category::Signups => "Monthly signup trend analysis.",
        }
    }

    /// The request for this category's chart.
    pub fn request(&self, aggregate: &DashboardAggregate) -> NarrativeRequest {
        let (data, metrics) = match self {
            Category::Plan => {
                let dist = &aggregate.plan_distribution;
                (
                    json!(dist),
                    json!({
                        "totalClients": distribution::total(dist),
                        "topPlan": distribution::largest(dist),
                    }),
                )
            }
            Category::Status => {
                let dist = &aggregate.status_distribution;
                (
                    json!(dist),
                    json!({
                        "inForceClients": distribution::count_of(dist, IN_FORCE),
                        "totalClients": distribution::total(dist),
                    }),
                )
            }
            Category::Payment => {
                let dist = &aggregate.payment_distribution;
                (
                    json!(dist),
                    json!({
                        "totalClients": distribution::total(dist),
                        "methods": dist,
                    }),
                )
            }
            Category::Age => {
                let dist = &aggregate.age_distribution;
                (
                    json!(dist),
                    json!({
                        "totalClients": distribution::total(dist),
                        "dominantGroup": distribution::largest(dist),
                    }),
                )
            }
            Category::Signups => {
                let series = &aggregate.monthly_signups;
                let recent = &series[series.len().saturating_sub(3)..];
                (json!(recent), json!({ "trend": signups::trend(recent) }))
            }
        };

        NarrativeRequest {
            chart_type: self.title().to_string(),
            data,
            metrics,
        }
    }
}

/// The static comment set.
pub fn fallback_comments() -> Comments {
    Category::ALL
        .iter()
        .map(|c| (c.key().to_string(), c.fallback_text().to_string()))
        .collect()
}

/// The persisted cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeCacheEntry {
    pub fingerprint: String,
    pub comments_by_category: Comments,
}

/// Where a fallback comment set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackOrigin {
    Previous,
    Static,
}

/// Comments plus which resolution tier produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum Narratives {
    Fresh { comments: Comments },
    Reused { comments: Comments },
    Fallback { origin: FallbackOrigin, comments: Comments },
}

impl Narratives {
    pub fn comments(&self) -> &Comments {
        match self {
            Narratives::Fresh { comments }
            | Narratives::Reused { comments }
            | Narratives::Fallback { comments, .. } => comments,
        }
    }

    pub fn comment(&self, category: Category) -> Option<&str> {
        self.comments().get(category.key()).map(String::as_str)
    }

    pub fn tier_name(&self) -> &'static str {
        match self {
            Narratives::Fresh { .. } => "fresh",
            Narratives::Reused { .. } => "reused",
            Narratives::Fallback { .. } => "fallback",
        }
    }
}

/// How the five category requests are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStrategy {
    /// One at a time, each awaited before the next starts.
    #[default]
    Sequential,
    /// All in flight at once; the first failure cancels the rest.
    Concurrent,
}

impl RequestStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sequential" => Some(Self::Sequential),
            "concurrent" => Some(Self::Concurrent),
            _ => None,
        }
    }
}

pub struct NarrativeCache {
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn NarrativeGenerator>,
    timeout: Duration,
    strategy: RequestStrategy,
}

impl NarrativeCache {
    pub fn new(store: Arc<dyn KeyValueStore>, generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self {
            store,
            generator,
            timeout: Duration::from_secs(30),
            strategy: RequestStrategy::default(),
        }
    }

    /// Bound on each category request. Expiry counts as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strategy(mut self, strategy: RequestStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resolve the comments for `aggregate`. Never fails.
    pub async fn narratives(&self, aggregate: &DashboardAggregate) -> Narratives {
        let fingerprint = aggregate.fingerprint();
        let stored = self.load_entry();

        if let Some(entry) = &stored
            && entry.fingerprint == fingerprint
            && !entry.comments_by_category.is_empty()
        {
            debug!(fingerprint = %fingerprint, "Narrative cache hit");
            return Narratives::Reused {
                comments: entry.comments_by_category.clone(),
            };
        }

        info!(
            fingerprint = %fingerprint,
            strategy = ?self.strategy,
            "Narrative cache miss, generating comments"
        );

        match self.generate_all(aggregate).await {
            Ok(comments) => {
                self.save_entry(&fingerprint, &comments);
                Narratives::Fresh { comments }
            }
            Err(e) => {
                warn!(error = %e, "Narrative generation failed, falling back");
                match stored {
                    Some(entry) if !entry.comments_by_category.is_empty() => Narratives::Fallback {
                        origin: FallbackOrigin::Previous,
                        comments: entry.comments_by_category,
                    },
                    _ => {
                        let comments = fallback_comments();
                        self.save_entry(&fingerprint, &comments);
                        Narratives::Fallback {
                            origin: FallbackOrigin::Static,
                            comments,
                        }
                    }
                }
            }
        }
    }

    /// Issue every category request under the configured strategy.
    ///
    /// The request plan is an ordered list folded into one accumulator, so
    /// either every category lands in the result or none does.
    async fn generate_all(&self, aggregate: &DashboardAggregate) -> Result<Comments, ProviderError> {
        let plan: Vec<(Category, NarrativeRequest)> = Category::ALL
            .iter()
            .map(|c| (*c, c.request(aggregate)))
            .collect();

        let collect = |mut acc: Comments, (category, text): (Category, String)| async move {
            acc.insert(category.key().to_string(), text);
            Ok::<_, ProviderError>(acc)
        };

        match self.strategy {
            RequestStrategy::Sequential => {
                stream::iter(plan)
                    .then(|(category, request)| self.request_one(category, request))
                    .try_fold(Comments::new(), collect)
                    .await
            }
            RequestStrategy::Concurrent => {
                stream::iter(plan)
                    .map(|(category, request)| self.request_one(category, request))
                    .buffer_unordered(Category::ALL.len())
                    .try_fold(Comments::new(), collect)
                    .await
            }
        }
    }

    async fn request_one(
        &self,
        category: Category,
        request: NarrativeRequest,
    ) -> Result<(Category, String), ProviderError> {
        debug!(category = category.key(), "Requesting narrative");
        match tokio::time::timeout(self.timeout, self.generator.generate(request)).await {
            Ok(Ok(text)) => Ok((category, text)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(format!(
                "narrative for '{}' timed out after {}s",
                category.key(),
                self.timeout.as_secs()
            ))),
        }
    }

    fn load_entry(&self) -> Option<NarrativeCacheEntry> {
        match read_json(self.store.as_ref(), StoreKey::NarrativeCache) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Unreadable narrative cache entry, treating as a miss");
                None
            }
        }
    }

    fn save_entry(&self, fingerprint: &str, comments: &Comments) {
        let entry = NarrativeCacheEntry {
            fingerprint: fingerprint.to_string(),
            comments_by_category: comments.clone(),
        };
        if let Err(e) = write_json(self.store.as_ref(), StoreKey::NarrativeCache, &entry) {
            warn!(error = %e, "Failed to persist narrative cache entry");
        }
    }
}
