//! Capability-aware batching and pacing of removal calls.
//!
//! Issuance and completion are separate phases. Each chunk's call is issued
//! without waiting for it; the loop then sleeps for the batch delay while
//! the calls already in flight keep running. Everything issued is joined
//! once at the end.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use sweep_types::DataCategory;
use tracing::{debug, warn};

use crate::api::{ApiError, RemovalApi, RemovalOptions};
use crate::registry::CategoryRegistry;
use crate::{ClearError, Result};

/// Origins a scoped removal is restricted to.
///
/// `None` means unscoped: the domain is missing, empty, or a wildcard
/// pattern the removal API cannot express.
pub fn origin_variants(domain: Option<&str>) -> Option<Vec<String>> {
    let domain = domain?;
    if domain.is_empty() || domain.contains('*') {
        return None;
    }
    Some(vec![format!("https://{domain}"), format!("http://{domain}")])
}

/// Turns categories into paced removal calls.
pub struct BatchDispatcher<R> {
    removal: R,
    registry: Arc<CategoryRegistry>,
}

impl<R: RemovalApi> BatchDispatcher<R> {
    pub fn new(removal: R, registry: Arc<CategoryRegistry>) -> Self {
        Self { removal, registry }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Issue removal calls for `categories` and wait for all of them.
    ///
    /// Origin-scoped categories go first, then global ones. Within each
    /// partition chunks of `batch_size` are issued in order with
    /// `batch_delay` between issuances. Fails with
    /// [`ClearError::RemovalFailed`] carrying the first rejection's message.
    pub async fn dispatch(
        &self,
        categories: &[DataCategory],
        domain: Option<&str>,
        since_ms: u64,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Result<()> {
        if batch_size == 0 {
            return Err(ClearError::InvalidRequest(
                "batch size must be greater than zero".into(),
            ));
        }

        let (scoped, global) = self.registry.partition(categories)?;
        let mut issuer = PacedIssuer::new();

        for (partition, origins) in [(scoped, origin_variants(domain)), (global, None)] {
            // Chunks left with nothing to send take no part in pacing.
            let mut calls = Vec::new();
            for chunk in partition.chunks(batch_size) {
                let flags = self.registry.removal_flags(chunk)?;
                if flags.is_empty() {
                    debug!(?chunk, "no removable categories in chunk, skipping");
                } else {
                    calls.push(flags);
                }
            }

            let call_count = calls.len();
            for (index, flags) in calls.into_iter().enumerate() {
                debug!(
                    ?flags,
                    scoped = origins.is_some(),
                    chunk = index,
                    "issuing removal call"
                );
                let options = RemovalOptions {
                    since: since_ms,
                    origins: origins.clone(),
                };
                issuer.issue(self.removal.remove(options, flags));

                if index + 1 < call_count {
                    issuer.pause(batch_delay).await;
                }
            }
        }

        issuer.join().await
    }
}

/// In-flight removal calls of one dispatch.
struct PacedIssuer<F> {
    inflight: FuturesUnordered<F>,
    first_error: Option<ApiError>,
    issued: usize,
}

impl<F> PacedIssuer<F>
where
    F: Future<Output = std::result::Result<(), ApiError>>,
{
    fn new() -> Self {
        Self {
            inflight: FuturesUnordered::new(),
            first_error: None,
            issued: 0,
        }
    }

    fn issue(&mut self, call: F) {
        self.inflight.push(call);
        self.issued += 1;
    }

    /// Sleep for `delay`, driving in-flight calls meanwhile.
    async fn pause(&mut self, delay: Duration) {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                biased;
                () = &mut sleep => break,
                Some(outcome) = self.inflight.next(), if !self.inflight.is_empty() => {
                    self.settle(outcome);
                }
            }
        }
    }

    /// Wait for every issued call.
    async fn join(mut self) -> Result<()> {
        while let Some(outcome) = self.inflight.next().await {
            self.settle(outcome);
        }
        match self.first_error {
            Some(e) => {
                warn!(issued = self.issued, error = %e, "removal call rejected");
                Err(ClearError::RemovalFailed(e.message))
            }
            None => {
                debug!(issued = self.issued, "all removal calls completed");
                Ok(())
            }
        }
    }

    fn settle(&mut self, outcome: std::result::Result<(), ApiError>) {
        if let Err(e) = outcome {
            self.first_error.get_or_insert(e);
        }
    }
}
