//! Actions produced by the interpreter

use heapless::Vec;

/// Maximum actions a single message can produce
///
/// One command entry (pulse and reply), one scaled pulse, one literal reply.
pub const MAX_ACTIONS: usize = 4;

/// A side effect requested by a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action<'a> {
    /// Drive the output active for `width_ms`
    Pulse { width_ms: u32 },
    /// Send a line of text to the host
    Reply(&'a str),
}

/// Ordered actions for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actions<'a> {
    value: i32,
    list: Vec<Action<'a>, MAX_ACTIONS>,
}

impl<'a> Actions<'a> {
    pub(crate) fn new(value: i32) -> Self {
        Self {
            value,
            list: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, action: Action<'a>) {
        // Capacity covers every combination the interpreter can produce
        let _ = self.list.push(action);
    }

    /// Integer value the message parsed to
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Actions in execution order
    pub fn iter(&self) -> impl Iterator<Item = &Action<'a>> {
        self.list.iter()
    }

    /// Actions as a slice
    pub fn as_slice(&self) -> &[Action<'a>] {
        &self.list
    }

    /// Number of actions
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if the message was ignored
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Total pulse time requested
    pub fn pulse_ms(&self) -> u32 {
        self.list
            .iter()
            .map(|a| match a {
                Action::Pulse { width_ms } => *width_ms,
                Action::Reply(_) => 0,
            })
            .fold(0u32, |acc, w| acc.saturating_add(w))
    }
}
