//! Per-role directive tables.

/// Handler invoked for a matched directive, with its argument.
pub type Handler<T> = fn(&mut T, Option<&str>) -> super::Flow;

/// Whether a directive takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// The directive must appear alone.
    None,
    /// The directive needs a non-empty argument.
    Required,
}

impl Arity {
    /// Check an optional argument against this arity.
    pub fn accepts(&self, argument: Option<&str>) -> bool {
        match self {
            Arity::None => argument.is_none(),
            Arity::Required => argument.is_some(),
        }
    }
}

/// One entry of a directive table.
pub struct Directive<T> {
    /// Exact, case-sensitive name including the leading `#`.
    pub name: &'static str,
    pub arity: Arity,
    pub handler: Handler<T>,
}

impl<T> Directive<T> {
    pub fn new(name: &'static str, arity: Arity, handler: Handler<T>) -> Self {
        Self {
            name,
            arity,
            handler,
        }
    }
}

impl<T> Clone for Directive<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Directive<T> {}

impl<T> std::fmt::Debug for Directive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directive")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// The fixed set of directives one role understands.
#[derive(Debug)]
pub struct DirectiveTable<T> {
    entries: Vec<Directive<T>>,
}

impl<T> DirectiveTable<T> {
    pub fn new(entries: Vec<Directive<T>>) -> Self {
        Self { entries }
    }

    /// Find a directive by exact name.
    pub fn get(&self, name: &str) -> Option<&Directive<T>> {
        self.entries.iter().find(|d| d.name == name)
    }

    /// Find the handler for a name whose arity accepts the argument.
    pub fn resolve(&self, name: &str, argument: Option<&str>) -> Option<Handler<T>> {
        self.get(name)
            .filter(|d| d.arity.accepts(argument))
            .map(|d| d.handler)
    }
}
