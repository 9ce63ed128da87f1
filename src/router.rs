//! Message dispatch.
//!
//! Interprets parsed messages against the bot's identity and channel, drives
//! display notifications, and hands follow-up work back to the connection
//! supervisor as [`Action`] values so that all socket I/O and state
//! transitions stay in one place.

use tracing::debug;

use ircboard_proto::ParsedMessage;

use crate::display::{Panel, WrapMode};

/// Topic directive selecting preformatted rendering. The character after the
/// directive is a caller-chosen delimiter that is replaced with line breaks.
const PRE_DIRECTIVE: &str = "!pre ";

/// Numeric reply for a nickname collision.
const ERR_NICKNAMEINUSE: &str = "433";

/// Numeric reply carrying the channel topic on join.
const RPL_TOPIC: &str = "332";

/// Follow-up action the supervisor executes after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing further to do.
    None,
    /// Answer a liveness probe, echoing its token.
    Pong(String),
    /// Our nickname was rejected; re-register after the registration backoff.
    RetryRegistration,
    /// The requested channel join was confirmed; we are registered.
    ConfirmRegistration,
}

/// Dispatch table for incoming messages.
pub struct Router {
    nick: String,
    chan: String,
}

impl Router {
    /// Create a router for the given identity and channel.
    pub fn new(nick: impl Into<String>, chan: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            chan: chan.into(),
        }
    }

    /// Interpret one message, notifying the panel as needed, and return the
    /// action for the supervisor. Unrecognized commands are ignored.
    pub fn dispatch(&self, msg: &ParsedMessage, panel: &mut dyn Panel) -> Action {
        match msg.command.as_str() {
            "PING" => Action::Pong(msg.params.clone()),
            ERR_NICKNAMEINUSE => {
                panel.set_status("IRC: nick in use");
                Action::RetryRegistration
            }
            "JOIN" => self.on_join(msg, panel),
            RPL_TOPIC => {
                // Typical params: `tftbot #sensors :!pre /...`
                let target = format!("{} {} :", self.nick, self.chan);
                if let Some(text) = msg.params.strip_prefix(&target) {
                    self.show_topic(text, panel);
                }
                Action::None
            }
            "TOPIC" => {
                // Typical params: `#sensors :!pre /...`
                let target = format!("{} :", self.chan);
                if let Some(text) = msg.params.strip_prefix(&target) {
                    self.show_topic(text, panel);
                }
                Action::None
            }
            "PRIVMSG" => {
                if let Some(text) = msg.trailing() {
                    panel.render(text, WrapMode::Word);
                }
                Action::None
            }
            other => {
                debug!(command = %other, "ignoring command");
                Action::None
            }
        }
    }

    /// A JOIN confirmation counts only when it is ours: the prefix must name
    /// our own identity. Other users' joins are ignored.
    fn on_join(&self, msg: &ParsedMessage, panel: &mut dyn Panel) -> Action {
        let me = format!(":{}!", self.nick);
        match &msg.prefix {
            Some(prefix) if prefix.starts_with(&me) => {
                let chan = msg.params.strip_prefix(':').unwrap_or(&msg.params);
                panel.set_status(&format!("joined {chan}"));
                Action::ConfirmRegistration
            }
            _ => Action::None,
        }
    }

    /// Render topic text. A `!pre ` directive makes the next character a
    /// caller-chosen delimiter replaced with line breaks; otherwise the text
    /// is hard-wrapped.
    fn show_topic(&self, text: &str, panel: &mut dyn Panel) {
        if let Some(rest) = text.strip_prefix(PRE_DIRECTIVE) {
            let mut chars = rest.chars();
            if let Some(delim) = chars.next() {
                let body = chars.as_str().replace(delim, "\n");
                panel.render(&body, WrapMode::Pre);
            }
        } else {
            panel.render(text, WrapMode::Hard);
        }
    }
}
