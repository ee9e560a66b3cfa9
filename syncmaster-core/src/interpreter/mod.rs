//! Message interpreter
//!
//! Maps a completed message to the actions the device should take. One
//! interpreter covers both historical protocols:
//!
//! - Command table: the parsed value selects an entry, which may fire a
//!   fixed pulse and/or send a reply. Unknown values do nothing.
//! - Scaled numeric mode: the parsed value times the step size is fired as
//!   a pulse when it lies in `1..=max_ms`.
//! - Text literals: when the raw text equals a literal, its reply is sent,
//!   independently of the numeric branch.
//!
//! Actions are ordered: command entry pulse, command entry reply, scaled
//! pulse, literal reply.

mod action;

pub use action::{Action, Actions, MAX_ACTIONS};

use syncmaster_protocol::Message;

use crate::config::{InterpreterConfig, NumericMode};

/// Configured message interpreter
#[derive(Debug, Clone)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    /// Create an interpreter from its configuration
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    /// Decide what to do with a completed message
    pub fn interpret(&self, message: Message<'_>) -> Actions<'_> {
        let value = message.to_int();
        let mut actions = Actions::new(value);

        if let Some(entry) = self.config.find_command(value) {
            if let Some(width_ms) = entry.pulse_ms {
                actions.push(Action::Pulse { width_ms });
            }
            if let Some(reply) = &entry.reply {
                actions.push(Action::Reply(reply.as_str()));
            }
        }

        if let NumericMode::Scaled { step_ms, max_ms } = self.config.numeric {
            if let Some(width_ms) = scaled_width(value, step_ms, max_ms) {
                actions.push(Action::Pulse { width_ms });
            }
        }

        if let Some(literal) = self
            .config
            .literals
            .iter()
            .find(|l| message.text_eq(l.text.as_str()))
        {
            actions.push(Action::Reply(literal.reply.as_str()));
        }

        actions
    }
}

/// Pulse width for a scaled value, if it is in `1..=max_ms`
///
/// Zero and negative widths are not pulses; this also keeps non-numeric
/// text (which parses to 0) from firing.
fn scaled_width(value: i32, step_ms: u32, max_ms: u32) -> Option<u32> {
    let width = i64::from(value) * i64::from(step_ms);
    if width > 0 && width <= i64::from(max_ms) {
        Some(width as u32)
    } else {
        None
    }
}
