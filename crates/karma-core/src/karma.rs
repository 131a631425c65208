//! Hierarchical message node.
//!
//! A [`Karma`] carries a message, an optional nested [`Reason`] and a
//! [`ContextList`]. Nodes are immutable values; every "modifying" method
//! returns a new node and leaves shared context untouched.

use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;

use crate::context::ContextList;
use crate::reason::Reason;
use crate::render;

/// Hierarchical message, linked with its nested reason and context.
#[derive(Clone, Debug, Default)]
pub struct Karma {
    pub(crate) message: String,
    pub(crate) reason: Option<Reason>,
    pub(crate) context: ContextList,
}

/// Build a [`Karma`] with a `format!`-style message.
///
/// ```ignore
/// let leaf = karma!("integer: {}", 9);
/// let wrapped = karma!(io_error => "unable to read {}", path.display());
/// ```
#[macro_export]
macro_rules! karma {
    ($reason:expr => $($arg:tt)+) => {
        $crate::Karma::format($reason, ::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::Karma::new(::std::format!($($arg)+))
    };
}

impl Karma {
    /// Create a leaf message with no reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_parts(message.into(), None, ContextList::new())
    }

    /// Create a message wrapping `reason` as its cause.
    pub fn format(reason: impl Into<Reason>, message: impl Into<String>) -> Self {
        Self::from_parts(message.into(), Some(reason.into()), ContextList::new())
    }

    /// A `null` value reason is stored as no reason at all.
    pub(crate) fn from_parts(
        message: String,
        reason: Option<Reason>,
        context: ContextList,
    ) -> Self {
        Self {
            message,
            reason: reason.filter(|reason| !matches!(reason, Reason::Value(Value::Null))),
            context,
        }
    }

    /// The node's own message. Empty for nodes that only carry context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Effective top-level message: the message, or the reason's text when
    /// the message is empty.
    pub fn headline(&self) -> String {
        match (&self.reason, self.message.is_empty()) {
            (Some(reason), true) => reason.to_string(),
            _ => self.message.clone(),
        }
    }

    /// The raw reason slot.
    pub const fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    /// Nested reasons as a sequence: empty when absent, the siblings of a
    /// [`Reason::Many`], or the single reason otherwise.
    pub fn reasons(&self) -> &[Reason] {
        match &self.reason {
            None => &[],
            Some(Reason::Many(reasons)) => reasons,
            Some(reason) => std::slice::from_ref(reason),
        }
    }

    /// Context attached directly to this node.
    pub const fn context(&self) -> &ContextList {
        &self.context
    }

    /// Whether the node has no message of its own.
    pub fn is_trivial(&self) -> bool {
        self.message.is_empty()
    }

    /// Whether the node exists only to carry a reason (and maybe context).
    ///
    /// Transparent nodes do not add a level when rendered as a branch: their
    /// reasons and context are spliced into the parent's sibling list.
    pub fn is_transparent(&self) -> bool {
        self.message.is_empty() && self.reason.is_some()
    }

    /// Return a copy with `(key, value)` appended to this node's context.
    #[must_use]
    pub fn describe(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            context: self.context.append(key, value),
            ..self.clone()
        }
    }

    /// Return a copy with `reason` added as the last sibling reason.
    #[must_use]
    pub fn push(self, reason: impl Into<Reason>) -> Self {
        let reason = match (self.reason, reason.into()) {
            (None, added) => Reason::Many(vec![added]),
            (Some(Reason::Many(mut reasons)), added) => {
                reasons.push(added);
                Reason::Many(reasons)
            }
            (Some(existing), added) => Reason::Many(vec![existing, added]),
        };
        Self {
            reason: Some(reason),
            ..self
        }
    }

    /// Visit every nested reason depth-first, in rendering order.
    ///
    /// Hierarchical reasons are reported before their own descendants;
    /// terminal reasons are reported too. Sibling sequences and transparent
    /// nodes add no level when rendered, so they are not reported
    /// themselves: their reasons are visited in their place. A trivial root
    /// is not entered, its reason is already its headline.
    pub fn descend<'a>(&'a self, mut callback: impl FnMut(&'a Reason)) {
        if self.is_trivial() {
            return;
        }
        self.walk(&mut |step| {
            if let Step::Reason(reason) = step {
                callback(reason);
            }
        });
    }

    /// Depth-first walk over the levels a render would draw. The context of
    /// a spliced transparent node is reported after its reasons.
    pub(crate) fn walk<'a>(&'a self, visitor: &mut impl FnMut(Step<'a>)) {
        for reason in self.reasons() {
            walk_reason(reason, visitor);
        }
    }

    /// Render with an explicit configuration.
    pub fn render_with(&self, config: &render::RenderConfig) -> String {
        render::render_karma(self, config)
    }

    /// Whether `branch` appears among the terminal reasons of this chain,
    /// compared by text.
    pub fn contains(&self, branch: &Reason) -> bool {
        let wanted = branch.to_string();
        self.any_terminal(&mut |reason| reason.to_string() == wanted)
    }

    fn any_terminal(&self, predicate: &mut impl FnMut(&Reason) -> bool) -> bool {
        self.reasons().iter().any(|reason| match reason {
            Reason::Karma(nested) => nested.any_terminal(predicate),
            Reason::Many(siblings) => siblings.iter().any(|sibling| match sibling {
                Reason::Karma(nested) => nested.any_terminal(predicate),
                other => predicate(other),
            }),
            other => predicate(other),
        })
    }

    /// First native error of type `E` in the chain, depth-first.
    pub fn find<E: StdError + 'static>(&self) -> Option<&E> {
        self.find_map(&mut |reason| match reason {
            Reason::Error(error) => error.downcast_ref::<E>(),
            _ => None,
        })
    }

    /// First value produced by `matcher` over the chain's reasons,
    /// depth-first. Hierarchical reasons are offered to `matcher` before
    /// their descendants.
    pub fn find_map<'a, T>(&'a self, matcher: &mut impl FnMut(&'a Reason) -> Option<T>) -> Option<T> {
        self.reasons().iter().find_map(|reason| find_in(reason, matcher))
    }
}

/// One item of [`Karma::walk`].
pub(crate) enum Step<'a> {
    /// A reason drawn as its own branch.
    Reason(&'a Reason),
    /// Context of a transparent node, drawn among its parent's branches.
    Context(&'a ContextList),
}

fn walk_reason<'a>(reason: &'a Reason, visitor: &mut impl FnMut(Step<'a>)) {
    match reason {
        Reason::Karma(nested) if nested.is_transparent() => {
            nested.walk(visitor);
            visitor(Step::Context(nested.context()));
        }
        Reason::Karma(nested) => {
            visitor(Step::Reason(reason));
            nested.walk(visitor);
        }
        Reason::Many(siblings) => {
            for sibling in siblings {
                walk_reason(sibling, visitor);
            }
        }
        Reason::Error(_) | Reason::Text(_) | Reason::Bytes(_) | Reason::Value(_) => {
            visitor(Step::Reason(reason));
        }
    }
}

fn find_in<'a, T>(reason: &'a Reason, matcher: &mut impl FnMut(&'a Reason) -> Option<T>) -> Option<T> {
    if let Some(found) = matcher(reason) {
        return Some(found);
    }
    match reason {
        Reason::Karma(nested) => nested.find_map(matcher),
        Reason::Many(siblings) => siblings.iter().find_map(|sibling| find_in(sibling, matcher)),
        Reason::Error(_) | Reason::Text(_) | Reason::Bytes(_) | Reason::Value(_) => None,
    }
}

/// Whether `branch` is found in `chain`.
///
/// Hierarchical chains are searched through their terminal reasons; any
/// other chain is compared with `branch` by text.
pub fn contains(chain: &Reason, branch: &Reason) -> bool {
    match chain {
        Reason::Karma(karma) => karma.contains(branch),
        other => other.to_string() == branch.to_string(),
    }
}

/// First native error of type `E` in `chain`, or `chain` itself.
pub fn find<E: StdError + 'static>(chain: &Reason) -> Option<&E> {
    match chain {
        Reason::Karma(karma) => karma.find::<E>(),
        Reason::Error(error) => error.downcast_ref::<E>(),
        Reason::Many(siblings) => siblings.iter().find_map(find::<E>),
        Reason::Text(_) | Reason::Bytes(_) | Reason::Value(_) => None,
    }
}

/// Hierarchical tree text, rendered with the effective configuration.
impl fmt::Display for Karma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::render_karma(self, &render::config()))
    }
}

impl StdError for Karma {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.reason {
            Some(Reason::Karma(nested)) => Some(&**nested),
            Some(Reason::Error(error)) => Some(&**error),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
