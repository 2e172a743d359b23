//! Send-on-change gate for commands.
//!
//! The classifier runs at camera frame rate while gestures change far less
//! often. The debouncer lets a command through only when it differs from the
//! last one actually transmitted, so serial traffic is one byte per gesture
//! transition.

use gesture_proto::Command;

/// Remembers the last transmitted command.
///
/// Starts unset, so the very first command always passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandDebouncer {
    last_sent: Option<Command>,
}

impl CommandDebouncer {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_sent: None }
    }

    /// Whether `command` must be transmitted.
    #[inline]
    #[must_use]
    pub fn should_send(&self, command: Command) -> bool {
        self.last_sent != Some(command)
    }

    /// Record that `command` reached the link.
    #[inline]
    pub fn mark_sent(&mut self, command: Command) {
        self.last_sent = Some(command);
    }

    /// Last transmitted command, `None` before the first one.
    #[inline]
    #[must_use]
    pub const fn last_sent(&self) -> Option<Command> {
        self.last_sent
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    fn cmd(value: u8) -> Command {
        Command::new(value).unwrap()
    }

    /// Gate a command and record it as sent when it passes.
    fn gate(debouncer: &mut CommandDebouncer, command: Command) -> Option<Command> {
        if !debouncer.should_send(command) {
            return None;
        }
        debouncer.mark_sent(command);
        Some(command)
    }

    #[test]
    fn test_first_command_always_sent() {
        let mut debouncer = CommandDebouncer::new();
        assert_eq!(debouncer.last_sent(), None);
        assert_eq!(gate(&mut debouncer, Command::OFF), Some(Command::OFF));
        assert_eq!(debouncer.last_sent(), Some(Command::OFF));
    }

    #[test]
    fn test_repeats_suppressed() {
        let mut debouncer = CommandDebouncer::new();
        let sent: Vec<u8> = [0, 0, 1, 1, 1, 2, 0]
            .into_iter()
            .filter_map(|v| gate(&mut debouncer, cmd(v)))
            .map(Command::as_byte)
            .collect();
        assert_eq!(sent, b"0120");
    }

    #[test]
    fn test_should_send_does_not_record() {
        let mut debouncer = CommandDebouncer::new();
        assert!(debouncer.should_send(cmd(3)));
        assert!(debouncer.should_send(cmd(3)));
        debouncer.mark_sent(cmd(3));
        assert!(!debouncer.should_send(cmd(3)));
        assert!(debouncer.should_send(cmd(4)));
    }
}
