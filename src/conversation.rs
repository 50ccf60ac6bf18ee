use crate::api::{ApiError, ChatReply, Citation};

pub const GREETING: &str = "Hello! I am DocuMind. Ask me anything about your enterprise documents.";
pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error connecting to the AI core.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    citations: Vec<Citation>,
}

impl Message {
    fn user(content: String) -> Self {
        Message {
            role: Role::User,
            content,
            citations: Vec::new(),
        }
    }

    fn assistant(content: String, citations: Vec<Citation>) -> Self {
        Message {
            role: Role::Assistant,
            content,
            citations,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Empty for user turns and for assistant turns without sources.
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Awaiting,
}

/// Chat history for one session. Messages are only ever appended, and at
/// most one exchange with the backend is outstanding at a time.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    input: String,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Conversation {
            messages: vec![Message::assistant(GREETING.to_string(), Vec::new())],
            input: String::new(),
            pending: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn state(&self) -> ChatState {
        if self.pending {
            ChatState::Awaiting
        } else {
            ChatState::Idle
        }
    }

    /// Whether `submit` would be accepted right now.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && !self.input.trim().is_empty()
    }

    pub fn set_input(&mut self, value: String) {
        self.input = value;
    }

    /// Appends the user's turn right away and returns the text to send.
    /// Returns `None`, changing nothing, while a reply is outstanding or the
    /// input is blank.
    pub fn submit(&mut self) -> Option<String> {
        if self.pending {
            tracing::debug!("chat submit ignored: reply still pending");
            return None;
        }
        if self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(Message::user(text.clone()));
        self.pending = true;
        tracing::info!(turns = self.messages.len(), "chat message submitted");
        Some(text)
    }

    /// Turns the backend outcome into the assistant's turn. Failures become
    /// an apology message, never an error.
    pub fn resolve(&mut self, outcome: Result<ChatReply, ApiError>) {
        if !self.pending {
            tracing::warn!("chat reply arrived with nothing pending; dropped");
            return;
        }

        let message = match outcome {
            Ok(reply) => {
                tracing::info!(
                    intent = ?reply.intent,
                    citations = reply.citations.len(),
                    "chat reply received"
                );
                Message::assistant(reply.answer, reply.citations)
            }
            Err(e) => {
                tracing::warn!("chat request failed: {e}");
                Message::assistant(CHAT_APOLOGY.to_string(), Vec::new())
            }
        };

        self.messages.push(message);
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, Intent};
    use crate::citations;
    use std::time::Duration;

    fn reply(answer: &str, citations: Vec<Citation>) -> ChatReply {
        ChatReply {
            answer: answer.to_string(),
            intent: if citations.is_empty() { Intent::General } else { Intent::Search },
            citations,
        }
    }

    fn failure() -> ApiError {
        ApiError::Server {
            status: 500,
            detail: "Chat request failed".to_string(),
        }
    }

    #[test]
    fn test_seeded_with_greeting() {
        let conv = Conversation::new();
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role(), Role::Assistant);
        assert_eq!(conv.messages()[0].content(), GREETING);
        assert_eq!(conv.state(), ChatState::Idle);
    }

    #[test]
    fn test_submit_appends_optimistically() {
        let mut conv = Conversation::new();
        conv.set_input("What is the refund policy?".to_string());

        let sent = conv.submit();
        assert_eq!(sent.as_deref(), Some("What is the refund policy?"));
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[1].role(), Role::User);
        assert_eq!(conv.messages()[1].content(), "What is the refund policy?");
        assert_eq!(conv.input(), "");
        assert!(conv.is_pending());
        assert_eq!(conv.state(), ChatState::Awaiting);
    }

    #[test]
    fn test_whitespace_submit_is_noop() {
        let mut conv = Conversation::new();
        for blank in ["", "   ", "\n\t "] {
            conv.set_input(blank.to_string());
            assert!(!conv.can_submit());
            assert_eq!(conv.submit(), None);
            assert_eq!(conv.messages().len(), 1);
            assert!(!conv.is_pending());
        }
    }

    #[test]
    fn test_submit_while_pending_is_noop() {
        let mut conv = Conversation::new();
        conv.set_input("first".to_string());
        assert!(conv.submit().is_some());

        conv.set_input("second".to_string());
        assert!(!conv.can_submit());
        assert_eq!(conv.submit(), None);
        assert_eq!(conv.messages().len(), 2);
        // The rejected text stays in the input buffer.
        assert_eq!(conv.input(), "second");
    }

    #[test]
    fn test_refund_policy_round_trip() {
        let mut conv = Conversation::new();
        conv.set_input("What is the refund policy?".to_string());
        conv.submit();

        conv.resolve(Ok(reply(
            "Refunds are processed within 30 days.",
            vec![Citation {
                filename: "policy.pdf".to_string(),
                page: 3,
                text_snippet: "Refunds within 30 days of purchase.".to_string(),
                score: 0.91,
            }],
        )));

        assert!(!conv.is_pending());
        let last = conv.messages().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "Refunds are processed within 30 days.");

        let group = citations::present(last.citations(), 120).unwrap();
        assert_eq!(group.cards.len(), 1);
        assert_eq!(group.cards[0].filename, "policy.pdf");
        assert_eq!(group.cards[0].page_label, "p. 3");
    }

    #[tokio::test]
    async fn test_unreachable_backend_becomes_apology() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ApiClient::new(format!("http://{addr}/api/v1"), Duration::from_secs(2)).unwrap();

        let mut conv = Conversation::new();
        conv.set_input("hello?".to_string());
        let text = conv.submit().unwrap();

        let outcome = client.submit_message(&text).await;
        assert!(matches!(outcome, Err(ApiError::Network(_))));
        conv.resolve(outcome);

        assert!(!conv.is_pending());
        let last = conv.messages().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), CHAT_APOLOGY);
        assert!(last.citations().is_empty());
    }

    #[test]
    fn test_alternating_outcomes_keep_strict_alternation() {
        let mut conv = Conversation::new();
        let n = 7;
        for i in 0..n {
            conv.set_input(format!("question {i}"));
            assert!(conv.submit().is_some());
            if i % 2 == 0 {
                conv.resolve(Ok(reply("answer", Vec::new())));
            } else {
                conv.resolve(Err(failure()));
            }
        }

        assert_eq!(conv.messages().len(), 1 + 2 * n);
        for (i, message) in conv.messages().iter().enumerate().skip(1) {
            let expected = if i % 2 == 1 { Role::User } else { Role::Assistant };
            assert_eq!(message.role(), expected, "message {i}");
        }
    }

    #[test]
    fn test_stray_resolve_is_dropped() {
        let mut conv = Conversation::new();
        conv.resolve(Ok(reply("unsolicited", Vec::new())));
        assert_eq!(conv.messages().len(), 1);
        assert!(!conv.is_pending());
    }

    #[test]
    fn test_user_text_kept_verbatim() {
        let mut conv = Conversation::new();
        conv.set_input("  padded question  ".to_string());
        assert_eq!(conv.submit().as_deref(), Some("  padded question  "));
        assert_eq!(conv.messages()[1].content(), "  padded question  ");
    }
}
