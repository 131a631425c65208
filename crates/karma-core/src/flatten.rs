//! Single-line form of a hierarchical message.
//!
//! Flattening joins the headline of every level with `": "` and collects
//! every context pair of the tree into one trailing `key=value` list:
//!
//! ```text
//! twix: bar: foo: eof or something: EOF | barval=42 wox=84
//! ```

use crate::context::value_text;
use crate::karma::{Karma, Step};
use crate::reason::Reason;

impl Karma {
    /// Collapse the tree into one line.
    ///
    /// Levels are visited in rendering order; sibling sequences and
    /// transparent nodes contribute their reasons and context without a
    /// message of their own. The root's own context comes first in the pair
    /// list, followed by the context of each visited node.
    pub fn flatten(&self) -> String {
        let mut messages = Vec::new();
        let mut pairs: Vec<String> = self.context().iter().map(pair_text).collect();

        if !self.is_transparent() {
            messages.push(self.message().to_owned());
        }
        self.walk(&mut |step| match step {
            Step::Reason(Reason::Karma(nested)) => {
                messages.push(nested.message().to_owned());
                pairs.extend(nested.context().iter().map(pair_text));
            }
            Step::Reason(other) => messages.push(other.to_string()),
            Step::Context(context) => pairs.extend(context.iter().map(pair_text)),
        });

        let mut line = messages.join(": ");
        if !pairs.is_empty() {
            line.push_str(" | ");
            line.push_str(&pairs.join(" "));
        }
        line
    }
}

/// Flatten hierarchical reasons into a single-line text reason. Anything
/// else is returned unchanged.
pub fn flatten(reason: Reason) -> Reason {
    match reason {
        Reason::Karma(karma) => Reason::Text(karma.flatten()),
        other => other,
    }
}

fn pair_text((key, value): (&str, &serde_json::Value)) -> String {
    format!("{key}={}", value_text(value))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
