//! Mapping between abstraction types and Claude-specific types

use crate::llm::core::types::{
    ContentDelta, FinishReason, GenerateRequest, Message, MessageRole, StreamEvent, UsageMetadata,
};

use super::types::{ClaudeContentDelta, ClaudeMessage, ClaudeStreamEvent, MessagesRequest};

/// Opening turn used when the conversation would otherwise start with the assistant
const PLACEHOLDER_USER_TURN: &str = "Please continue.";

/// Convert our abstraction request to Claude's request format.
///
/// The Messages API only accepts `user`/`assistant` turns that alternate and
/// start with `user`, with instructions in a top-level `system` field:
/// * leading system messages become `system`; later ones are sent as user turns
/// * consecutive turns of the same role are merged
/// * a conversation consisting only of instructions sends them as the user turn
pub fn to_claude_request(request: GenerateRequest) -> MessagesRequest {
    let mut messages = request.messages.into_iter().peekable();

    let mut system_parts = Vec::new();
    while let Some(msg) = messages.next_if(|m| m.role == MessageRole::System) {
        system_parts.push(msg.content);
    }
    let mut system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));

    let mut turns: Vec<ClaudeMessage> = Vec::new();
    for message in messages {
        push_turn(&mut turns, message);
    }

    if turns.is_empty() {
        if let Some(instructions) = system.take() {
            turns.push(ClaudeMessage {
                role: "user".to_string(),
                content: instructions,
            });
        }
    } else if turns[0].role != "user" {
        turns.insert(
            0,
            ClaudeMessage {
                role: "user".to_string(),
                content: PLACEHOLDER_USER_TURN.to_string(),
            },
        );
    }

    MessagesRequest {
        model: request.model,
        max_tokens: request.config.max_tokens,
        messages: turns,
        system,
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        stream: true,
    }
}

fn push_turn(turns: &mut Vec<ClaudeMessage>, message: Message) {
    let role = match message.role {
        MessageRole::Assistant => "assistant",
        MessageRole::User | MessageRole::System => "user",
    };

    match turns.last_mut() {
        Some(last) if last.role == role => {
            last.content.push_str("\n\n");
            last.content.push_str(&message.content);
        }
        _ => turns.push(ClaudeMessage {
            role: role.to_string(),
            content: message.content,
        }),
    }
}

/// Convert Claude's stream event to our abstraction's StreamEvent.
///
/// Keep-alives and block boundaries carry nothing the relay needs and map to
/// `None`.
pub fn from_claude_event(
    event: ClaudeStreamEvent,
    accumulated_usage: &mut UsageMetadata,
) -> Option<StreamEvent> {
    match event {
        ClaudeStreamEvent::MessageStart { message } => {
            *accumulated_usage =
                UsageMetadata::new(message.usage.input_tokens, message.usage.output_tokens);
            Some(StreamEvent::MessageStart { id: message.id })
        }
        ClaudeStreamEvent::ContentBlockDelta { index, delta } => match delta {
            ClaudeContentDelta::TextDelta { text } => Some(StreamEvent::ContentDelta {
                index,
                delta: ContentDelta::TextDelta { text },
            }),
            ClaudeContentDelta::Other => None,
        },
        ClaudeStreamEvent::MessageDelta { delta, usage } => {
            if let Some(usage) = usage {
                *accumulated_usage =
                    UsageMetadata::new(accumulated_usage.input_tokens, usage.output_tokens);
            }

            delta.stop_reason.map(|stop_reason| StreamEvent::MessageEnd {
                finish_reason: FinishReason::from_provider(&stop_reason),
                usage: Some(*accumulated_usage),
            })
        }
        ClaudeStreamEvent::Error { error } => Some(StreamEvent::Error {
            error: format!("{}: {}", error.error_type, error.message),
        }),
        ClaudeStreamEvent::ContentBlockStart { .. }
        | ClaudeStreamEvent::ContentBlockStop { .. }
        | ClaudeStreamEvent::MessageStop
        | ClaudeStreamEvent::Ping => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::config::GenerationConfig;

    fn request(messages: Vec<Message>) -> GenerateRequest {
        GenerateRequest::new("claude-sonnet-4-5", messages, GenerationConfig::new(1024))
    }

    #[test]
    fn test_leading_system_becomes_system_field() {
        let claude = to_claude_request(request(vec![
            Message::system("Be terse."),
            Message::user("Hello"),
        ]));
        assert_eq!(claude.system.as_deref(), Some("Be terse."));
        assert_eq!(claude.messages.len(), 1);
        assert_eq!(claude.messages[0].role, "user");
        assert_eq!(claude.model, "claude-sonnet-4-5");
        assert!(claude.stream);
    }

    #[test]
    fn test_system_only_sent_as_user_turn() {
        let claude = to_claude_request(request(vec![Message::system("Rewrite this doc.")]));
        assert!(claude.system.is_none());
        assert_eq!(
            claude.messages,
            vec![ClaudeMessage {
                role: "user".to_string(),
                content: "Rewrite this doc.".to_string(),
            }]
        );
    }

    #[test]
    fn test_consecutive_roles_merged() {
        let claude = to_claude_request(request(vec![
            Message::user("a"),
            Message::system("b"),
            Message::assistant("c"),
            Message::assistant("d"),
        ]));
        assert_eq!(claude.messages.len(), 2);
        assert_eq!(claude.messages[0].content, "a\n\nb");
        assert_eq!(claude.messages[1].content, "c\n\nd");
    }

    #[test]
    fn test_assistant_first_gets_placeholder_user_turn() {
        let claude = to_claude_request(request(vec![Message::assistant("Earlier answer")]));
        assert_eq!(claude.messages[0].role, "user");
        assert_eq!(claude.messages[0].content, PLACEHOLDER_USER_TURN);
        assert_eq!(claude.messages[1].role, "assistant");
    }

    #[test]
    fn test_from_claude_text_delta() {
        let mut usage = UsageMetadata::default();
        let event = ClaudeStreamEvent::ContentBlockDelta {
            index: 0,
            delta: ClaudeContentDelta::TextDelta {
                text: "Hi".to_string(),
            },
        };
        match from_claude_event(event, &mut usage) {
            Some(StreamEvent::ContentDelta {
                delta: ContentDelta::TextDelta { text },
                ..
            }) => assert_eq!(text, "Hi"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_from_claude_usage_and_end() {
        let mut usage = UsageMetadata::default();
        let start: ClaudeStreamEvent = serde_json::from_str(
            r#"{"type":"message_start","message":{"id":"m1","role":"assistant","model":"x","usage":{"input_tokens":12,"output_tokens":1}}}"#,
        )
        .unwrap();
        assert!(matches!(
            from_claude_event(start, &mut usage),
            Some(StreamEvent::MessageStart { .. })
        ));

        let delta: ClaudeStreamEvent = serde_json::from_str(
            r#"{"type":"message_delta","delta":{"stop_reason":"max_tokens"},"usage":{"output_tokens":30}}"#,
        )
        .unwrap();
        match from_claude_event(delta, &mut usage) {
            Some(StreamEvent::MessageEnd {
                finish_reason,
                usage: Some(u),
            }) => {
                assert_eq!(finish_reason, FinishReason::MaxTokens);
                assert_eq!(u, UsageMetadata::new(12, 30));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ping_maps_to_nothing() {
        let mut usage = UsageMetadata::default();
        assert!(from_claude_event(ClaudeStreamEvent::Ping, &mut usage).is_none());
    }
}
