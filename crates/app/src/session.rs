//! The per-session chat controller state.
//!
//! `SessionContext` owns the conversation, the usage counters and the
//! two-phase submit cycle. All transitions happen on the UI thread in
//! response to user actions or a finished gateway call, so there is no
//! locking anywhere in here.

use shared::chat::{ChatMessage, Conversation, GREETING};
use shared::usage::{UsageLimits, UsageStats};

/// Appended in place of an answer when the gateway call fails.
pub const FALLBACK_APOLOGY: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

/// Which quota ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResult {
    /// User message appended; the caller should start a gateway call.
    Accepted,
    /// Empty input, or a response is already pending. Nothing changed.
    Ignored,
    /// The relevant quota is exhausted. Nothing was appended.
    LimitReached(LimitKind),
}

pub struct SessionContext {
    conversation: Conversation,
    usage: UsageStats,
    limits: UsageLimits,
    phase: Phase,
}

impl SessionContext {
    pub fn new(limits: UsageLimits) -> Self {
        let mut conversation = Conversation::new();
        conversation.append(ChatMessage::model(GREETING));
        Self {
            conversation,
            usage: UsageStats::default(),
            limits,
            phase: Phase::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn usage(&self) -> UsageStats {
        self.usage
    }

    pub fn limits(&self) -> UsageLimits {
        self.limits
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    /// Try to start an exchange. An image submission draws on the image
    /// allowance only; a text-only submission draws on the text allowance.
    pub fn submit(&mut self, text: &str, image: Option<String>) -> SubmitResult {
        if (text.trim().is_empty() && image.is_none()) || self.phase == Phase::AwaitingResponse {
            return SubmitResult::Ignored;
        }

        if image.is_some() {
            if !self.usage.can_send_image(&self.limits) {
                return SubmitResult::LimitReached(LimitKind::Image);
            }
        } else if !self.usage.can_send_text(&self.limits) {
            return SubmitResult::LimitReached(LimitKind::Text);
        }

        self.usage.record_send(image.is_some());
        self.conversation.append(ChatMessage::user(text, image));
        self.phase = Phase::AwaitingResponse;
        SubmitResult::Accepted
    }

    /// Resolve the pending exchange with the gateway's answer or failure.
    /// A failure becomes the fixed apology message; it never propagates.
    pub fn complete(&mut self, outcome: Result<String, String>) {
        if self.phase != Phase::AwaitingResponse {
            return;
        }
        let text = match outcome {
            Ok(text) => text,
            Err(_) => FALLBACK_APOLOGY.to_string(),
        };
        self.conversation.append(ChatMessage::model(text));
        self.phase = Phase::Idle;
    }

    /// Demo action: both counters back to zero.
    pub fn reset_usage(&mut self) {
        self.usage.reset();
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(UsageLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::chat::Role;

    fn image() -> Option<String> {
        Some("data:image/png;base64,AAAA".to_string())
    }

    #[test]
    fn test_fresh_session_starts_with_greeting() {
        let session = SessionContext::default();
        assert_eq!(session.conversation().len(), 1);
        let first = &session.conversation().messages()[0];
        assert_eq!(first.role, Role::Model);
        assert_eq!(first.text, GREETING);
        assert!(!session.is_awaiting_response());
    }

    #[test]
    fn test_empty_submit_is_a_no_op() {
        let mut session = SessionContext::default();
        assert_eq!(session.submit("", None), SubmitResult::Ignored);
        assert_eq!(session.submit("   \n", None), SubmitResult::Ignored);
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.usage().text_count, 0);
    }

    #[test]
    fn test_submit_while_awaiting_is_a_no_op() {
        let mut session = SessionContext::default();
        assert_eq!(session.submit("first", None), SubmitResult::Accepted);
        let len = session.conversation().len();
        assert_eq!(session.submit("second", None), SubmitResult::Ignored);
        assert_eq!(session.conversation().len(), len);
        assert_eq!(session.usage().text_count, 1);
    }

    #[test]
    fn test_text_limit_rejects_sixth_submission() {
        let limits = UsageLimits {
            max_text: 5,
            max_images: 3,
        };
        let mut session = SessionContext::new(limits);
        for i in 0..5 {
            assert_eq!(
                session.submit(&format!("question {}", i), None),
                SubmitResult::Accepted
            );
            session.complete(Ok("answer".to_string()));
        }
        assert_eq!(session.usage().text_count, 5);

        let len = session.conversation().len();
        assert_eq!(
            session.submit("one too many", None),
            SubmitResult::LimitReached(LimitKind::Text)
        );
        assert_eq!(session.conversation().len(), len);
        assert_eq!(session.usage().text_count, 5);
    }

    #[test]
    fn test_image_only_submission_spends_image_quota_only() {
        let mut session = SessionContext::default();
        let len = session.conversation().len();

        assert_eq!(session.submit("", image()), SubmitResult::Accepted);
        assert_eq!(session.conversation().len(), len + 1);

        let last = session.conversation().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.image.is_some());

        assert_eq!(session.usage().image_count, 1);
        assert_eq!(session.usage().text_count, 0);
    }

    #[test]
    fn test_image_limit_rejects_submission() {
        let limits = UsageLimits {
            max_text: 5,
            max_images: 1,
        };
        let mut session = SessionContext::new(limits);
        assert_eq!(session.submit("look", image()), SubmitResult::Accepted);
        session.complete(Ok("I see".to_string()));

        assert_eq!(
            session.submit("again", image()),
            SubmitResult::LimitReached(LimitKind::Image)
        );
        // A text-only send is still fine.
        assert_eq!(session.submit("again", None), SubmitResult::Accepted);
    }

    #[test]
    fn test_gateway_failure_appends_apology_and_returns_to_idle() {
        let mut session = SessionContext::default();
        session.submit("hello", None);
        let len = session.conversation().len();

        session.complete(Err("gemini error: 503".to_string()));

        assert_eq!(session.conversation().len(), len + 1);
        let last = session.conversation().last().unwrap();
        assert_eq!(last.role, Role::Model);
        assert_eq!(last.text, FALLBACK_APOLOGY);
        assert!(!session.is_awaiting_response());
    }

    #[test]
    fn test_success_appends_model_answer() {
        let mut session = SessionContext::default();
        session.submit("what is 2+2?", None);
        session.complete(Ok("2 + 2 = **4**".to_string()));

        let last = session.conversation().last().unwrap();
        assert_eq!(last.role, Role::Model);
        assert_eq!(last.text, "2 + 2 = **4**");
        assert!(!session.is_awaiting_response());
    }

    #[test]
    fn test_complete_without_pending_exchange_is_a_no_op() {
        let mut session = SessionContext::default();
        let len = session.conversation().len();
        session.complete(Ok("stray".to_string()));
        assert_eq!(session.conversation().len(), len);
    }

    #[test]
    fn test_reset_restores_both_allowances() {
        let limits = UsageLimits {
            max_text: 1,
            max_images: 1,
        };
        let mut session = SessionContext::new(limits);
        session.submit("a", None);
        session.complete(Ok("b".to_string()));
        session.submit("c", image());
        session.complete(Ok("d".to_string()));
        assert_eq!(session.submit("e", None), SubmitResult::LimitReached(LimitKind::Text));

        session.reset_usage();
        assert_eq!(session.usage().text_count, 0);
        assert_eq!(session.usage().image_count, 0);
        assert_eq!(session.submit("e", None), SubmitResult::Accepted);
    }

    #[test]
    fn test_counters_never_exceed_limits() {
        let mut session = SessionContext::default();
        for i in 0..30 {
            let img = if i % 2 == 0 { image() } else { None };
            if session.submit(&format!("q{}", i), img) == SubmitResult::Accepted {
                session.complete(Ok("a".to_string()));
            }
            let usage = session.usage();
            let limits = session.limits();
            assert!(usage.text_count <= limits.max_text);
            assert!(usage.image_count <= limits.max_images);
        }
    }
}
