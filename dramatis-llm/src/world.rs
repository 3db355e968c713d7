//! Cast generation — ask the generator for an opening cast and parse it.

use dramatis_core::Character;
use dramatis_core::config::LlmConfig;
use tracing::{info, warn};

use crate::client::TextGenerator;
use crate::error::LlmError;
use crate::parser::CharacterParser;
use crate::prompt;

/// Generate and parse an opening cast for a story about `topic`.
///
/// Makes up to `max_retries` attempts (at least one). An attempt is retried
/// when the request fails or when the reply parses to nothing but the
/// placeholder character. The outcome of the final attempt decides the
/// result: a placeholder-only batch is returned as-is, a failed request
/// becomes [`LlmError::RetriesExhausted`].
///
/// Requests use the default `[llm]` sampling settings; see
/// [`generate_cast_with`].
///
/// # Errors
/// Returns `LlmError::RetriesExhausted` if the final attempt's request failed.
pub async fn generate_cast<G>(
    generator: &G,
    parser: &CharacterParser,
    topic: &str,
    max_retries: u32,
) -> Result<Vec<Character>, LlmError>
where
    G: TextGenerator + ?Sized,
{
    generate_cast_with(generator, parser, topic, max_retries, &LlmConfig::default()).await
}

/// [`generate_cast`] with temperature, token limit and timeout taken from
/// `config`.
///
/// # Errors
/// Returns `LlmError::RetriesExhausted` if the final attempt's request failed.
pub async fn generate_cast_with<G>(
    generator: &G,
    parser: &CharacterParser,
    topic: &str,
    max_retries: u32,
    config: &LlmConfig,
) -> Result<Vec<Character>, LlmError>
where
    G: TextGenerator + ?Sized,
{
    let attempts = max_retries.max(1);
    let request = prompt::cast_creation_request(topic, config);
    let mut fallback: Option<Vec<Character>> = None;

    for attempt in 1..=attempts {
        match generator.generate(&request).await {
            Ok(response) => {
                let report = parser.parse_report(&response.text);
                if !report.placeholder {
                    info!(
                        attempt,
                        characters = report.characters.len(),
                        strategy = report.strategy.unwrap_or("none"),
                        skipped = report.skipped,
                        "Cast generated"
                    );
                    return Ok(report.characters);
                }
                warn!(attempt, attempts, "Reply held no usable characters");
                fallback = Some(report.characters);
            }
            Err(err) => {
                warn!(attempt, attempts, %err, "Cast generation request failed");
                if attempt == attempts {
                    return Err(LlmError::RetriesExhausted {
                        attempts,
                        last_error: err.to_string(),
                    });
                }
            }
        }
    }

    Ok(fallback.unwrap_or_else(|| vec![parser.placeholder()]))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{LlmRequest, LlmResponse};

    /// Replays canned replies in order and records the prompts it saw.
    struct Scripted {
        replies: Mutex<Vec<Result<String, String>>>,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, &str>>) -> Self {
            let mut replies: Vec<_> = replies
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().expect("lock").len()
        }
    }

    impl TextGenerator for Scripted {
        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.seen.lock().expect("lock").push(request.clone());
            let next = self.replies.lock().expect("lock").pop();
            match next {
                Some(Ok(text)) => Ok(LlmResponse::from_text(text)),
                Some(Err(reason)) => Err(LlmError::RequestFailed(reason)),
                None => Err(LlmError::Unavailable("script exhausted".into())),
            }
        }
    }

    const ONE: &str = r#"{"characters": [{"name": "Aria", "tribe": "River Folk", "personality_traits": ["curious"]}]}"#;

    #[tokio::test]
    async fn first_good_reply_wins() {
        let generator = Scripted::new(vec![Ok(ONE)]);
        let cast = generate_cast(&generator, &CharacterParser::new(), "rivers", 3)
            .await
            .expect("cast");
        assert_eq!(cast.len(), 1);
        assert_eq!(cast[0].name(), "Aria");
        assert_eq!(generator.calls(), 1);
        assert!(generator.seen.lock().expect("lock")[0].user.contains("rivers"));
    }

    #[tokio::test]
    async fn placeholder_and_errors_are_retried() {
        let generator = Scripted::new(vec![Ok("the weather was nice"), Err("boom"), Ok(ONE)]);
        let cast = generate_cast(&generator, &CharacterParser::new(), "rivers", 3)
            .await
            .expect("cast");
        assert_eq!(cast[0].name(), "Aria");
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn final_placeholder_is_returned() {
        let generator = Scripted::new(vec![Ok("nothing"), Ok("still nothing")]);
        let cast = generate_cast(&generator, &CharacterParser::new(), "rivers", 2)
            .await
            .expect("placeholder batch");
        assert_eq!(cast.len(), 1);
        assert_eq!(cast[0].name(), "Default Character");
    }

    #[tokio::test]
    async fn final_error_exhausts_retries() {
        let generator = Scripted::new(vec![Ok("nothing"), Err("down")]);
        let err = generate_cast(&generator, &CharacterParser::new(), "rivers", 2)
            .await
            .expect_err("last attempt failed");
        match err {
            LlmError::RetriesExhausted { attempts, last_error } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("down"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn requests_carry_configured_sampling() {
        let config = LlmConfig {
            temperature: 0.25,
            max_tokens: 512,
            timeout_ms: 8_000,
            ..LlmConfig::default()
        };
        let generator = Scripted::new(vec![Ok("nothing"), Ok(ONE)]);
        generate_cast_with(&generator, &CharacterParser::new(), "rivers", 2, &config)
            .await
            .expect("cast");

        let seen = generator.seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        for request in seen.iter() {
            assert_eq!(request.max_tokens, 512);
            assert_eq!(request.timeout_ms, 8_000);
            assert!((request.temperature - 0.25).abs() < f32::EPSILON);
        }
    }

    #[tokio::test]
    async fn zero_retries_still_makes_one_attempt() {
        let generator = Scripted::new(vec![Ok(ONE)]);
        let cast = generate_cast(&generator, &CharacterParser::new(), "rivers", 0)
            .await
            .expect("cast");
        assert_eq!(cast.len(), 1);
    }
}
