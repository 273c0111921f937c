//! Retry policy and error classification around every backend call.
//!
//! This is the only place that decides whether a failure is transient. The
//! decision is a pure function of the error's structure (status code, kind
//! tag); message text is consulted only for opaque errors that carry nothing
//! else.
//!
//! | Failure                               | Transient | Kind            |
//! |---------------------------------------|-----------|-----------------|
//! | 429 / rate limited                    | yes       | service busy    |
//! | 5xx, timeout, connection failure      | yes       | service failure |
//! | structured answer fails its schema    | yes       | unclassified    |
//! | other 4xx, blocked prompt, bad body   | no        | unclassified    |
//! | unbuildable request, bad redirect     | no        | unclassified    |
//! | missing credential                    | no        | (configuration) |

use std::fmt;
use std::future::Future;
use std::time::Duration;

use dwell_config::RetrySettings;
use dwell_genai::{ErrorKind, GenAiError};

use crate::error::PipelineError;

/// The operation a backend call belongs to; names it in user-facing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationContext {
    FloorplanAnalysis,
    DesignGeneration,
    DesignRefinement,
    MaterialListGeneration,
}

impl OperationContext {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FloorplanAnalysis => "floorplan analysis",
            Self::DesignGeneration => "design generation",
            Self::DesignRefinement => "design refinement",
            Self::MaterialListGeneration => "material list generation",
        }
    }

    /// Wrap a service error in this operation's pipeline error variant.
    #[must_use]
    pub fn wrap(self, error: ServiceError) -> PipelineError {
        match self {
            Self::FloorplanAnalysis => PipelineError::Analysis(error),
            Self::DesignGeneration => PipelineError::Generation(error),
            Self::DesignRefinement => PipelineError::Refinement(error),
            Self::MaterialListGeneration => PipelineError::Extraction(error),
        }
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What went wrong, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The service is overloaded; waiting helps.
    ServiceBusy,
    /// The service faulted; retrying later or simplifying the input helps.
    ServiceFailure,
    Unclassified,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ServiceBusy => "service_busy",
            Self::ServiceFailure => "service_failure",
            Self::Unclassified => "unclassified",
        })
    }
}

/// Result of classifying one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub transient: bool,
    pub kind: FailureKind,
}

impl Classification {
    const BUSY: Self = Self {
        transient: true,
        kind: FailureKind::ServiceBusy,
    };
    const FAILURE: Self = Self {
        transient: true,
        kind: FailureKind::ServiceFailure,
    };
    const RETRY_UNCLASSIFIED: Self = Self {
        transient: true,
        kind: FailureKind::Unclassified,
    };
    const TERMINAL: Self = Self {
        transient: false,
        kind: FailureKind::Unclassified,
    };
}

/// Classify a backend error.
#[must_use]
pub fn classify(error: &GenAiError) -> Classification {
    match error.kind() {
        ErrorKind::RateLimited => Classification::BUSY,
        ErrorKind::Server | ErrorKind::Transport => Classification::FAILURE,
        ErrorKind::SchemaViolation => Classification::RETRY_UNCLASSIFIED,
        ErrorKind::Opaque => classify_message(&error.to_string()),
        ErrorKind::Configuration
        | ErrorKind::Request
        | ErrorKind::Rejected
        | ErrorKind::Decode
        | ErrorKind::Blocked => Classification::TERMINAL,
    }
}

/// Text fallback for errors that cross an untyped boundary.
#[must_use]
pub fn classify_message(message: &str) -> Classification {
    let msg = message.to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        Classification::BUSY
    } else if msg.contains("500") || msg.contains("rpc failed") {
        Classification::FAILURE
    } else {
        Classification::TERMINAL
    }
}

/// A backend failure after the retry policy gave up, with a message that
/// tells the user what to do about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub context: OperationContext,
    pub kind: FailureKind,
    pub message: String,
    /// Attempts made before giving up (1 for terminal failures).
    pub attempts: u32,
}

impl ServiceError {
    /// Build the user-facing error for a backend failure.
    #[must_use]
    pub fn from_backend(context: OperationContext, error: &GenAiError, attempts: u32) -> Self {
        let kind = classify(error).kind;
        let message = match kind {
            FailureKind::ServiceBusy => format!(
                "The service is currently busy due to high demand. Please wait a moment and try again. (Context: {context})"
            ),
            FailureKind::ServiceFailure if context == OperationContext::FloorplanAnalysis => {
                "A server error occurred during analysis. This often happens with very large or \
                 complex floorplan images, even after resizing. Please try a simpler floorplan \
                 or a smaller image file and try again."
                    .to_string()
            }
            FailureKind::ServiceFailure => format!(
                "A server error occurred during {context}. This can be due to temporary service \
                 issues. Please try again in a few moments."
            ),
            FailureKind::Unclassified => unclassified_message(context, error),
        };
        Self {
            context,
            kind,
            message,
            attempts,
        }
    }

    /// A failure found after a successful round trip (bad model, bad list).
    #[must_use]
    pub fn invalid_result(context: OperationContext, message: impl Into<String>) -> Self {
        Self {
            context,
            kind: FailureKind::Unclassified,
            message: message.into(),
            attempts: 1,
        }
    }
}

fn unclassified_message(context: OperationContext, error: &GenAiError) -> String {
    match error {
        GenAiError::SchemaViolation { .. } => format!(
            "The service returned a malformed result during {context}. Please try again; \
             if it keeps failing, try a clearer image."
        ),
        GenAiError::Blocked { reason } => format!(
            "The request was declined by the service during {context} ({reason}). \
             Please rephrase your request or use a different image."
        ),
        GenAiError::Api { status, message } => format!(
            "The service rejected the request during {context} (HTTP {status}): {message}. \
             Please check the image and instructions and try again."
        ),
        GenAiError::Http(error) if !error.is_decode() => format!(
            "The request for {context} could not be sent ({error}). Please check the \
             genai.base_url setting."
        ),
        GenAiError::Decode(_) | GenAiError::Http(_) => format!(
            "The service returned an unreadable response during {context}. Please try again."
        ),
        other => {
            let text = other.to_string();
            if text.trim().is_empty() {
                format!("An unknown error occurred during {context}.")
            } else {
                text
            }
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Bounded retry with doubling backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Delay before the first retry; doubled after each.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(retry.saturating_sub(1)))
    }

    /// Run `call` until it succeeds, fails terminally, or attempts run out.
    ///
    /// A missing credential surfaces as [`PipelineError::Configuration`];
    /// every other failure is wrapped in `context`'s pipeline error.
    ///
    /// # Errors
    ///
    /// See above.
    pub async fn run<T, F, Fut>(
        &self,
        context: OperationContext,
        mut call: F,
    ) -> Result<T, PipelineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenAiError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(GenAiError::Configuration(message)) => {
                    tracing::error!(%context, %message, "generative backend not configured");
                    return Err(PipelineError::Configuration(message));
                }
                Err(error) => error,
            };

            let classification = classify(&error);
            if classification.transient && attempt < self.max_attempts {
                let delay = self.delay_before(attempt);
                tracing::warn!(
                    %context,
                    attempt,
                    max_attempts = self.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    kind = %classification.kind,
                    %error,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let service = ServiceError::from_backend(context, &error, attempt);
            tracing::error!(
                %context,
                attempts = attempt,
                kind = %service.kind,
                %error,
                "operation failed"
            );
            return Err(context.wrap(service));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tokio::time::Instant;

    use super::*;

    fn api(status: u16) -> GenAiError {
        GenAiError::Api {
            status,
            message: format!("status {status}"),
        }
    }

    #[rstest]
    #[case(GenAiError::RateLimited { retry_after_secs: 60 }, true, FailureKind::ServiceBusy)]
    #[case(api(429), true, FailureKind::ServiceBusy)]
    #[case(api(500), true, FailureKind::ServiceFailure)]
    #[case(api(503), true, FailureKind::ServiceFailure)]
    #[case(api(400), false, FailureKind::Unclassified)]
    #[case(api(403), false, FailureKind::Unclassified)]
    #[case(GenAiError::schema("missing rooms"), true, FailureKind::Unclassified)]
    #[case(GenAiError::Blocked { reason: "SAFETY".into() }, false, FailureKind::Unclassified)]
    #[case(GenAiError::Decode("eof".into()), false, FailureKind::Unclassified)]
    #[case(GenAiError::Configuration("no key".into()), false, FailureKind::Unclassified)]
    #[case(GenAiError::Other("Rate limit exceeded".into()), true, FailureKind::ServiceBusy)]
    #[case(GenAiError::Other("got status 429".into()), true, FailureKind::ServiceBusy)]
    #[case(GenAiError::Other("RPC failed; transport closed".into()), true, FailureKind::ServiceFailure)]
    #[case(GenAiError::Other("HTTP 500".into()), true, FailureKind::ServiceFailure)]
    #[case(GenAiError::Other("invalid argument".into()), false, FailureKind::Unclassified)]
    fn classification_table(
        #[case] error: GenAiError,
        #[case] transient: bool,
        #[case] kind: FailureKind,
    ) {
        assert_eq!(classify(&error), Classification { transient, kind });
    }

    #[test]
    fn classification_is_idempotent() {
        for message in ["429 Too Many Requests", "Internal error 500", "bad input", ""] {
            let first = classify_message(message);
            for _ in 0..5 {
                assert_eq!(classify_message(message), first, "message {message:?}");
            }
            let error = GenAiError::Other(message.to_string());
            assert_eq!(classify(&error), classify(&error));
        }
    }

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_before(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_before(3), Duration::from_millis(4000));
    }

    #[test]
    fn zero_attempts_setting_still_tries_once() {
        let policy = RetryPolicy::from(&RetrySettings {
            max_attempts: 0,
            base_delay_ms: 10,
        });
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn three_transient_failures_make_three_attempts() {
        let policy = RetryPolicy::default();
        let stamps = Mutex::new(Vec::new());
        let result: Result<(), _> = policy
            .run(OperationContext::DesignGeneration, || {
                stamps.lock().unwrap().push(Instant::now());
                async { Err(api(500)) }
            })
            .await;

        let stamps = stamps.into_inner().unwrap();
        assert_eq!(stamps.len(), 3);
        assert_eq!(stamps[1] - stamps[0], Duration::from_millis(1000));
        assert_eq!(stamps[2] - stamps[1], Duration::from_millis(2000));

        let Err(PipelineError::Generation(service)) = result else {
            panic!("expected a generation error");
        };
        assert_eq!(service.kind, FailureKind::ServiceFailure);
        assert_eq!(service.attempts, 3);
        assert!(service.message.contains("design generation"));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_makes_one_attempt() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result: Result<(), _> = policy
            .run(OperationContext::MaterialListGeneration, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(api(400)) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(matches!(result, Err(PipelineError::Extraction(ref s)) if s.attempts == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let value = policy
            .run(OperationContext::FloorplanAnalysis, || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(GenAiError::RateLimited {
                            retry_after_secs: 60,
                        })
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn configuration_error_is_never_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy
            .run(OperationContext::DesignRefinement, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenAiError::Configuration("no key".into())) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_base_url_fails_once_without_server_hint() {
        use dwell_config::GenAiConfig;
        use dwell_genai::{GeminiClient, GenerativeBackend, StructuredRequest};

        let client = GeminiClient::new(&GenAiConfig {
            api_key: "secret".into(),
            base_url: "not a url".into(),
            ..GenAiConfig::default()
        })
        .unwrap();
        let request = StructuredRequest {
            model: "gemini-3-flash-preview".into(),
            prompt: "analyze".into(),
            image: None,
            schema: serde_json::json!({ "type": "object" }),
            temperature: Some(0.1),
        };

        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result = RetryPolicy::default()
            .run(OperationContext::FloorplanAnalysis, || {
                calls.fetch_add(1, Ordering::SeqCst);
                client.generate_structured(&request)
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        let Err(PipelineError::Analysis(service)) = result else {
            panic!("expected an analysis error");
        };
        assert_eq!(service.kind, FailureKind::Unclassified);
        assert_eq!(service.attempts, 1);
        assert!(service.message.contains("genai.base_url"));
        assert!(!service.message.contains("floorplan images"));
    }

    #[test]
    fn messages_suggest_a_remedy() {
        let busy = ServiceError::from_backend(
            OperationContext::DesignRefinement,
            &GenAiError::RateLimited {
                retry_after_secs: 1,
            },
            3,
        );
        assert_eq!(
            busy.message,
            "The service is currently busy due to high demand. Please wait a moment and try again. (Context: design refinement)"
        );

        let analysis =
            ServiceError::from_backend(OperationContext::FloorplanAnalysis, &api(500), 3);
        assert!(analysis.message.contains("smaller image file"));

        let render = ServiceError::from_backend(OperationContext::DesignGeneration, &api(500), 3);
        assert!(render.message.contains("try again in a few moments"));
        assert!(!render.message.contains("floorplan"));

        let blocked = ServiceError::from_backend(
            OperationContext::DesignRefinement,
            &GenAiError::Blocked {
                reason: "SAFETY".into(),
            },
            1,
        );
        assert!(blocked.message.contains("rephrase"));

        let unknown = ServiceError::from_backend(
            OperationContext::DesignGeneration,
            &GenAiError::Other(String::new()),
            1,
        );
        assert_eq!(
            unknown.message,
            "An unknown error occurred during design generation."
        );
    }
}
