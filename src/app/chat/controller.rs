use super::tools;
use crate::agents::{ChatSession, FunctionCall, ModelReply};
use crate::app::{ChatMessage, UserProfile};
use crate::prompt;
use color_eyre::Result;
use std::collections::VecDeque;

/// Fixed apology appended when any step of a round fails
pub const CHAT_CONNECTION_DISRUPTED: &str = "抱歉，星象連結受到干擾，請稍後再試。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingModelReply,
    ResolvingTools,
    AwaitingFollowupReply,
}

/// Transcript, lifecycle tag and pending tool calls for one chat screen visit
#[derive(Debug, Clone)]
pub struct ChatController {
    state: ChatState,
    transcript: Vec<ChatMessage>,
    pending: VecDeque<FunctionCall>,
    profile: UserProfile,
}

/// Result of a transition: the next controller plus the text to send, if any
#[derive(Debug)]
pub struct Transition {
    pub controller: ChatController,
    pub outbound: Option<String>,
}

impl Transition {
    fn stay(controller: ChatController) -> Self {
        Self {
            controller,
            outbound: None,
        }
    }

    fn send(controller: ChatController, message: String) -> Self {
        Self {
            controller,
            outbound: Some(message),
        }
    }
}

impl ChatController {
    /// Starts a visit with the locally written greeting
    #[must_use]
    pub fn open(profile: UserProfile) -> Self {
        let greeting = ChatMessage::model(prompt::chat_greeting(&profile));
        Self {
            state: ChatState::Idle,
            transcript: vec![greeting],
            pending: VecDeque::new(),
            profile,
        }
    }

    #[must_use]
    pub fn state(&self) -> ChatState {
        self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == ChatState::Idle
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Profile the session was opened for
    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Empty text or a busy controller leaves everything untouched.
    /// Accepted text is recorded and sent exactly as typed.
    #[must_use]
    pub fn submit(mut self, text: &str) -> Transition {
        if text.trim().is_empty() || !self.is_idle() {
            return Transition::stay(self);
        }
        self.transcript.push(ChatMessage::user(text));
        self.state = ChatState::AwaitingModelReply;
        Transition::send(self, text.to_string())
    }

    /// Feeds the outcome of the last outbound send back into the machine
    #[must_use]
    pub fn receive(mut self, result: Result<ModelReply>) -> Transition {
        if self.is_idle() {
            tracing::debug!("reply arrived while idle, ignoring");
            return Transition::stay(self);
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(state = ?self.state, error = %error, "chat round failed");
                self.pending.clear();
                self.transcript.push(ChatMessage::model(CHAT_CONNECTION_DISRUPTED));
                self.state = ChatState::Idle;
                return Transition::stay(self);
            }
        };

        match self.state {
            ChatState::AwaitingModelReply if reply.has_function_calls() => {
                tracing::info!(count = reply.function_calls.len(), "model requested tools");
                self.pending.extend(reply.function_calls);
                self.state = ChatState::ResolvingTools;
                self.resolve_next()
            }
            ChatState::AwaitingModelReply => {
                self.transcript.push(ChatMessage::model(reply.text));
                self.state = ChatState::Idle;
                Transition::stay(self)
            }
            ChatState::AwaitingFollowupReply => {
                if reply.has_function_calls() {
                    tracing::warn!(
                        count = reply.function_calls.len(),
                        "follow-up reply requested more tools, not chasing"
                    );
                }
                self.transcript.push(ChatMessage::model(reply.text));
                self.state = ChatState::ResolvingTools;
                self.resolve_next()
            }
            ChatState::ResolvingTools | ChatState::Idle => Transition::stay(self),
        }
    }

    /// Resolves the head of the queue and sends its result, or settles to Idle
    fn resolve_next(mut self) -> Transition {
        match self.pending.pop_front() {
            Some(call) => {
                let result = tools::resolve(&call);
                self.state = ChatState::AwaitingFollowupReply;
                let message = prompt::tool_result_message(&result);
                Transition::send(self, message)
            }
            None => {
                self.state = ChatState::Idle;
                Transition::stay(self)
            }
        }
    }

    /// Drives a whole round synchronously against `session`
    #[must_use]
    pub fn run_round(self, text: &str, session: &mut dyn ChatSession) -> Self {
        let mut transition = self.submit(text);
        while let Some(message) = transition.outbound.take() {
            let result = session.send(&message);
            transition = transition.controller.receive(result);
        }
        transition.controller
    }
}
