//! Chat stream relay
//!
//! Turns a role/content message list into a stream of text tokens for an HTTP
//! client. The relay never fails: problems opening the upstream stream or
//! errors reported halfway through it become a final in-band token, so the
//! client always receives a complete response body.

use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use tracing::{debug, warn};

use super::core::{
    config::GenerationConfig,
    error::LlmError,
    provider::Providers,
    types::{ContentDelta, GenerateRequest, Message, MessageRole, Model, StreamEvent},
};

/// Token emitted when nothing survives normalization
pub const NO_VALID_MESSAGES: &str = "Error: No valid messages to send to LLM.";

/// Prefix of the token emitted when the provider fails
pub const ERROR_PREFIX: &str = "Error generating response: ";

/// Stream of text tokens as produced by the model
pub type TokenStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Normalize a message list for provider compatibility.
///
/// 1. messages with blank content are dropped, the rest are trimmed
/// 2. a lone system message is sent as a user message
/// 3. otherwise two leading system messages are merged into one
pub fn normalize(messages: Vec<Message>) -> Vec<Message> {
    let mut valid: Vec<Message> = messages
        .into_iter()
        .filter_map(|m| {
            let content = m.content.trim();
            (!content.is_empty()).then(|| Message {
                role: m.role,
                content: content.to_string(),
            })
        })
        .collect();

    if valid.len() == 1 && valid[0].role == MessageRole::System {
        valid[0].role = MessageRole::User;
    } else if valid.len() > 1
        && valid[0].role == MessageRole::System
        && valid[1].role == MessageRole::System
    {
        let first = valid.remove(0);
        valid[0].content = format!("{}\n\n{}", first.content, valid[0].content);
    }

    valid
}

fn error_token(err: &LlmError) -> String {
    format!("{}{}", ERROR_PREFIX, err)
}

/// Routes chat requests to the right provider and relays the output
#[derive(Clone)]
pub struct ChatRelay {
    providers: Providers,
    default_model: String,
    config: GenerationConfig,
}

impl ChatRelay {
    pub fn new(providers: Providers, default_model: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            providers,
            default_model: default_model.into(),
            config,
        }
    }

    /// The model a request naming `requested` will use
    pub fn resolve_model(&self, requested: Option<&str>) -> Model {
        Model::resolve(
            requested,
            &self.default_model,
            self.providers.anthropic_enabled(),
        )
    }

    /// Stream the model's answer to `messages` as text tokens
    pub fn stream(&self, messages: Vec<Message>, requested_model: Option<&str>) -> TokenStream {
        let messages = normalize(messages);
        let model = self.resolve_model(requested_model);
        let provider = self.providers.for_model(&model);
        let shape: Vec<(&'static str, usize)> = messages
            .iter()
            .map(|m| (m.role.as_str(), m.content.len()))
            .collect();
        let request = GenerateRequest::new(model.name.clone(), messages, self.config.clone());

        let tokens = async_stream::stream! {
            if request.messages.is_empty() {
                yield NO_VALID_MESSAGES.to_string();
                return;
            }

            debug!(model = %model.name, ?shape, "starting chat stream");

            let mut events = match provider.stream_generate(request).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(model = %model.name, error = %e, "failed to open chat stream");
                    yield error_token(&e);
                    return;
                }
            };

            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::ContentDelta { delta: ContentDelta::TextDelta { text }, .. }) => {
                        if !text.is_empty() {
                            yield text;
                        }
                    }
                    Ok(StreamEvent::MessageEnd { finish_reason, usage }) => {
                        debug!(model = %model.name, ?finish_reason, ?usage, "chat stream finished");
                    }
                    Ok(StreamEvent::Error { error }) => {
                        warn!(model = %model.name, %error, "provider reported an error mid-stream");
                        yield format!("{}{}", ERROR_PREFIX, error);
                        return;
                    }
                    Ok(StreamEvent::MessageStart { .. }) => {}
                    Err(e) => {
                        warn!(model = %model.name, error = %e, "chat stream failed");
                        yield error_token(&e);
                        return;
                    }
                }
            }
        };

        Box::pin(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_and_trims() {
        let out = normalize(vec![
            Message::system("  rules  "),
            Message::user(""),
            Message::assistant("   "),
            Message::user("\nquestion\n"),
        ]);
        assert_eq!(out, vec![Message::system("rules"), Message::user("question")]);
    }

    #[test]
    fn test_normalize_lone_system_becomes_user() {
        let out = normalize(vec![Message::system("Refine this document")]);
        assert_eq!(out, vec![Message::user("Refine this document")]);
    }

    #[test]
    fn test_normalize_lone_system_after_filtering() {
        let out = normalize(vec![Message::system("only"), Message::user("  ")]);
        assert_eq!(out, vec![Message::user("only")]);
    }

    #[test]
    fn test_normalize_merges_two_leading_systems() {
        let out = normalize(vec![
            Message::system("first"),
            Message::system("second"),
            Message::user("go"),
        ]);
        assert_eq!(
            out,
            vec![Message::system("first\n\nsecond"), Message::user("go")]
        );
    }

    #[test]
    fn test_normalize_merges_only_first_pair() {
        let out = normalize(vec![
            Message::system("a"),
            Message::system("b"),
            Message::system("c"),
        ]);
        assert_eq!(out, vec![Message::system("a\n\nb"), Message::system("c")]);
    }

    #[test]
    fn test_normalize_leaves_regular_conversation() {
        let input = vec![Message::system("s"), Message::user("u")];
        assert_eq!(normalize(input.clone()), input);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(vec![Message::user(" ")]).is_empty());
    }
}
