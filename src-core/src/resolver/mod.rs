//! Ordered provider fallback resolution.
//!
//! Both provider families in this service (market data sources and LLM
//! backends) are partially configured: some entries in the priority list have
//! credentials, some do not. A resolution walks the list once, skips anything
//! without credentials, returns the first successful payload together with the
//! name of the provider that produced it, and otherwise surfaces one
//! aggregated error carrying every attempted provider and its failure reason.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use log::{debug, info, warn};

/// Uniform view of a ranked provider: a stable identifier plus whether its
/// credential is present. Ordering is fixed by the list the provider sits in,
/// never derived at runtime.
pub trait ProviderHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Providers without a credential are skipped silently (no attempt, no
    /// entry in the failure log).
    fn is_configured(&self) -> bool {
        true
    }
}

/// Successful resolution: the operation payload and the name of the provider
/// that served it.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub payload: T,
    pub provider: String,
}

/// One failed provider attempt, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub provider: String,
    pub reason: String,
}

/// Terminal resolution failure. An empty attempt list means no provider in
/// the list was configured at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExhaustedError {
    pub attempts: Vec<FailedAttempt>,
}

impl fmt::Display for ExhaustedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return write!(f, "no providers are configured");
        }
        write!(f, "all {} provider(s) failed: ", self.attempts.len())?;
        for (idx, attempt) in self.attempts.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", attempt.provider, attempt.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExhaustedError {}

/// Try `attempt` against each configured provider in list order and return
/// the first success. Each provider gets exactly one attempt; a failure is
/// recorded and the next provider is tried immediately.
pub async fn resolve<'a, P, T, E, F>(
    providers: &'a [Arc<P>],
    mut attempt: F,
) -> Result<Resolved<T>, ExhaustedError>
where
    P: ProviderHandle + ?Sized,
    E: fmt::Display,
    F: FnMut(&'a Arc<P>) -> BoxFuture<'a, Result<T, E>>,
{
    let mut attempts: Vec<FailedAttempt> = Vec::new();

    for provider in providers {
        if !provider.is_configured() {
            debug!("Provider '{}' has no credentials, skipping.", provider.name());
            continue;
        }

        debug!("Trying provider '{}'.", provider.name());
        match attempt(provider).await {
            Ok(payload) => {
                info!("Provider '{}' succeeded.", provider.name());
                return Ok(Resolved {
                    payload,
                    provider: provider.name().to_string(),
                });
            }
            Err(e) => {
                warn!(
                    "Provider '{}' failed: {}. Trying next provider.",
                    provider.name(),
                    e
                );
                attempts.push(FailedAttempt {
                    provider: provider.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(ExhaustedError { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        name: &'static str,
        configured: bool,
        outcome: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(
            name: &'static str,
            configured: bool,
            outcome: Result<&'static str, &'static str>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProviderHandle for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    async fn run(
        providers: &[Arc<StubProvider>],
    ) -> Result<Resolved<String>, ExhaustedError> {
        resolve(providers, |p| {
            p.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = p.outcome.map(String::from).map_err(String::from);
            async move { outcome }.boxed()
        })
        .await
    }

    #[tokio::test]
    async fn first_configured_success_short_circuits() {
        let providers = vec![
            StubProvider::new("A", true, Ok("payload-a")),
            StubProvider::new("B", true, Ok("payload-b")),
        ];

        let resolved = run(&providers).await.unwrap();
        assert_eq!(resolved.payload, "payload-a");
        assert_eq!(resolved.provider, "A");
        assert_eq!(providers[0].calls(), 1);
        assert_eq!(providers[1].calls(), 0);
    }

    #[tokio::test]
    async fn failure_falls_through_to_next_configured() {
        let providers = vec![
            StubProvider::new("A", true, Err("boom")),
            StubProvider::new("B", true, Ok("payload-b")),
        ];

        let resolved = run(&providers).await.unwrap();
        assert_eq!(resolved.payload, "payload-b");
        assert_eq!(resolved.provider, "B");
        assert_eq!(providers[0].calls(), 1);
        assert_eq!(providers[1].calls(), 1);
    }

    #[tokio::test]
    async fn unconfigured_providers_are_skipped_silently() {
        // The worked example: Gemini unconfigured, OpenAI times out,
        // Anthropic succeeds. The failure log holds exactly the OpenAI entry.
        let gemini = StubProvider::new("GEMINI", false, Ok("unused"));
        let openai = StubProvider::new("OPENAI", true, Err("timeout"));
        let anthropic = StubProvider::new("ANTHROPIC", true, Ok("claude says buy"));
        let providers = vec![gemini, openai, anthropic];

        let resolved = run(&providers).await.unwrap();
        assert_eq!(resolved.payload, "claude says buy");
        assert_eq!(resolved.provider, "ANTHROPIC");
        assert_eq!(providers[0].calls(), 0);
    }

    #[tokio::test]
    async fn no_configured_providers_yields_empty_exhaustion() {
        let providers = vec![
            StubProvider::new("A", false, Ok("unused")),
            StubProvider::new("B", false, Ok("unused")),
        ];

        let err = run(&providers).await.unwrap_err();
        assert!(err.attempts.is_empty());
        assert_eq!(err.to_string(), "no providers are configured");
        assert_eq!(providers[0].calls(), 0);
        assert_eq!(providers[1].calls(), 0);
    }

    #[tokio::test]
    async fn all_failures_are_aggregated_in_attempt_order() {
        let providers = vec![
            StubProvider::new("A", true, Err("rate limited")),
            StubProvider::new("B", false, Ok("unused")),
            StubProvider::new("C", true, Err("bad gateway")),
        ];

        let err = run(&providers).await.unwrap_err();
        assert_eq!(
            err.attempts,
            vec![
                FailedAttempt {
                    provider: "A".to_string(),
                    reason: "rate limited".to_string()
                },
                FailedAttempt {
                    provider: "C".to_string(),
                    reason: "bad gateway".to_string()
                },
            ]
        );
        let rendered = err.to_string();
        assert!(rendered.contains("A: rate limited"));
        assert!(rendered.contains("C: bad gateway"));
    }

    #[tokio::test]
    async fn empty_provider_list_is_exhausted_immediately() {
        let providers: Vec<Arc<StubProvider>> = Vec::new();
        let err = run(&providers).await.unwrap_err();
        assert!(err.attempts.is_empty());
    }
}
