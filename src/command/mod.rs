//! Command interpreter shared by the client and the server console.
//!
//! A line starting with `#` is a directive; anything else is chat. Each
//! role supplies its own [`DirectiveTable`]; matching, arity checking and
//! the "Invalid Command" fallback live in [`Interpreter::interpret`] and are
//! written once.

mod parser;
mod table;

pub use parser::{parse_line, Line, DIRECTIVE_PREFIX};
pub use table::{Arity, Directive, DirectiveTable, Handler};

use tracing::debug;

/// Notice shown for unknown directives and wrong arity.
pub const INVALID_COMMAND: &str = "Invalid Command";

/// Directive that binds a login id, shared by both ends of the protocol.
pub const LOGIN_DIRECTIVE: &str = "#login";

/// What the owning loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading input.
    Continue,
    /// The endpoint has shut down; the owning loop must exit.
    Terminate,
}

impl Flow {
    pub fn is_terminate(&self) -> bool {
        matches!(self, Flow::Terminate)
    }
}

/// A role-specific endpoint driven by console lines.
pub trait Interpreter: Sized {
    /// Role name, used in diagnostics.
    const ROLE: &'static str;

    /// Directives this role understands.
    fn directives() -> DirectiveTable<Self>;

    /// Handle a non-directive line.
    fn chat(&mut self, text: &str) -> Flow;

    /// Show a notice to the local user.
    fn notify(&self, text: &str);

    /// Interpret one line of raw input.
    fn interpret(&mut self, line: &str) -> Flow {
        match parse_line(line) {
            Line::Chat(text) => self.chat(text),
            Line::Directive { name, argument } => {
                match Self::directives().resolve(name, argument) {
                    Some(handler) => handler(self, argument),
                    None => {
                        debug!(role = Self::ROLE, directive = name, "invalid directive");
                        self.notify(INVALID_COMMAND);
                        Flow::Continue
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal endpoint recording what the interpreter did.
    #[derive(Default)]
    struct Probe {
        log: Vec<String>,
        notices: std::cell::RefCell<Vec<String>>,
    }

    impl Probe {
        fn ping(&mut self, _argument: Option<&str>) -> Flow {
            self.log.push("ping".into());
            Flow::Continue
        }

        fn echo(&mut self, argument: Option<&str>) -> Flow {
            self.log.push(format!("echo {}", argument.unwrap_or_default()));
            Flow::Continue
        }

        fn stop(&mut self, _argument: Option<&str>) -> Flow {
            Flow::Terminate
        }
    }

    impl Interpreter for Probe {
        const ROLE: &'static str = "probe";

        fn directives() -> DirectiveTable<Self> {
            DirectiveTable::new(vec![
                Directive::new("#ping", Arity::None, Self::ping),
                Directive::new("#echo", Arity::Required, Self::echo),
                Directive::new("#stop", Arity::None, Self::stop),
            ])
        }

        fn chat(&mut self, text: &str) -> Flow {
            self.log.push(format!("chat [{}]", text));
            Flow::Continue
        }

        fn notify(&self, text: &str) {
            self.notices.borrow_mut().push(text.to_string());
        }
    }

    #[test]
    fn test_chat_passes_verbatim() {
        let mut probe = Probe::default();
        probe.interpret("  hello  ");
        probe.interpret("");
        assert_eq!(probe.log, vec!["chat [  hello  ]", "chat []"]);
    }

    #[test]
    fn test_directive_dispatch() {
        let mut probe = Probe::default();
        assert_eq!(probe.interpret("#ping"), Flow::Continue);
        assert_eq!(probe.interpret("#echo some words"), Flow::Continue);
        assert_eq!(probe.log, vec!["ping", "echo some words"]);
        assert!(probe.notices.borrow().is_empty());
    }

    #[test]
    fn test_terminate_flows_out() {
        let mut probe = Probe::default();
        assert!(probe.interpret("#stop").is_terminate());
    }

    #[test]
    fn test_unknown_directive() {
        let mut probe = Probe::default();
        assert_eq!(probe.interpret("#pong"), Flow::Continue);
        assert!(probe.log.is_empty());
        assert_eq!(*probe.notices.borrow(), vec![INVALID_COMMAND]);
    }

    #[test]
    fn test_case_sensitive_and_no_abbreviation() {
        let mut probe = Probe::default();
        probe.interpret("#PING");
        probe.interpret("#pin");
        assert!(probe.log.is_empty());
        assert_eq!(probe.notices.borrow().len(), 2);
    }

    #[test]
    fn test_wrong_arity_is_invalid() {
        let mut probe = Probe::default();
        probe.interpret("#ping now");
        probe.interpret("#echo");
        assert!(probe.log.is_empty());
        assert_eq!(
            *probe.notices.borrow(),
            vec![INVALID_COMMAND, INVALID_COMMAND]
        );
    }
}
