pub mod controller;
pub mod tools;

use crate::agents::{ChatSession, ModelReply};
use crate::app::App;
use color_eyre::Result;
use controller::{ChatController, Transition};

impl App {
    /// Opens a fresh consultation for the current profile
    pub fn open_chat(&mut self) {
        let Some(profile) = self.profile.clone() else {
            return;
        };
        self.chat_session = Some(Box::new(self.gateway.start_chat_session(&profile)));
        self.chat = Some(ChatController::open(profile));
        self.chat_input.clear();
        self.reset_chat_scroll();
    }

    /// Drops the transcript and the session; an in-flight reply is ignored when it lands
    pub fn close_chat(&mut self) {
        self.chat = None;
        self.chat_session = None;
        self.chat_input.clear();
    }

    pub fn send_chat_message(&mut self) {
        let Some(controller) = self.chat.take() else {
            return;
        };
        let text = self.chat_input.content().to_string();
        let transition = controller.submit(&text);
        if transition.outbound.is_some() {
            self.chat_input.clear();
            self.reset_chat_scroll();
        }
        self.apply_chat_transition(transition);
    }

    fn apply_chat_transition(&mut self, transition: Transition) {
        let Transition {
            controller,
            outbound,
        } = transition;
        let Some(message) = outbound else {
            self.chat = Some(controller);
            return;
        };

        match self.chat_session.take() {
            Some(session) => {
                self.chat = Some(controller);
                self.spawn_chat_send(session, message);
            }
            None => {
                tracing::error!("chat session missing while a send was pending");
                let failed =
                    controller.receive(Err(color_eyre::eyre::eyre!("chat session unavailable")));
                self.chat = Some(failed.controller);
            }
        }
    }

    fn spawn_chat_send(&self, mut session: Box<dyn ChatSession>, message: String) {
        let event_tx = self.event_tx.clone();
        let visit = self.visit;
        std::thread::spawn(move || {
            let result = session.send(&message);
            let _ = event_tx.send(super::AppEvent::ChatReply {
                visit,
                session,
                result,
            });
        });
    }

    pub(super) fn handle_chat_reply(
        &mut self,
        visit: u64,
        session: Box<dyn ChatSession>,
        result: Result<ModelReply>,
    ) {
        if !self.is_current_visit(visit) {
            return;
        }
        self.chat_session = Some(session);
        if let Some(controller) = self.chat.take() {
            let transition = controller.receive(result);
            self.apply_chat_transition(transition);
        }
        if self.chat_auto_scroll {
            self.chat_scroll_offset = 0;
        }
    }

    pub fn add_chat_input_char(&mut self, character: char) {
        self.chat_input.add_char(character);
    }

    pub fn remove_chat_input_char(&mut self) {
        self.chat_input.remove_char();
    }
}
