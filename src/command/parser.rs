//! Splitting a raw input line into chat or directive.

/// Marker that turns a line into a directive.
pub const DIRECTIVE_PREFIX: char = '#';

/// One classified line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Ordinary chat text, untouched.
    Chat(&'a str),
    /// A `#`-prefixed directive.
    Directive {
        /// Directive name including the leading `#`.
        name: &'a str,
        /// Everything after the first whitespace run, if non-empty.
        argument: Option<&'a str>,
    },
}

/// Classify a line of input.
///
/// Directives are split on the first whitespace run; the argument keeps any
/// inner whitespace (`#sethost my host` has argument `my host`). Chat text
/// is returned verbatim, including an empty line.
pub fn parse_line(line: &str) -> Line<'_> {
    if !line.starts_with(DIRECTIVE_PREFIX) {
        return Line::Chat(line);
    }

    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => {
            let rest = rest.trim_start();
            Line::Directive {
                name,
                argument: (!rest.is_empty()).then_some(rest),
            }
        }
        None => Line::Directive {
            name: line,
            argument: None,
        },
    }
}
