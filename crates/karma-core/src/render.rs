//! Tree rendering for hierarchical messages.
//!
//! A node renders as its message followed by one branch per sibling:
//!
//! ```text
//! unable to resolve
//! ├─ system error
//! ├─ host: example.com
//! └─ operation: resolv
//! ```
//!
//! Branches are the node's nested reasons followed by its context pairs.
//! Nodes with an empty message that only carry a reason are spliced into the
//! parent's branch list instead of opening a level of their own.
//!
//! Glyphs and indent width come from a [`RenderConfig`]. [`render_karma`]
//! takes one explicitly; `Display` reads the effective configuration: the
//! calling thread's [`with_config`] override if any, else the process-wide
//! one set by [`set_config`].

use std::cell::RefCell;
use std::sync::LazyLock;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::context::value_text;
use crate::karma::Karma;
use crate::reason::Reason;

/// ASCII delimiter for the last branch.
pub const BRANCH_DELIMITER_ASCII: &str = "\\_ ";
/// Box-drawing delimiter for the last branch.
pub const BRANCH_DELIMITER_BOX: &str = "└─ ";
/// ASCII chainer continuing a non-last branch.
pub const BRANCH_CHAINER_ASCII: &str = "| ";
/// Box-drawing chainer continuing a non-last branch.
pub const BRANCH_CHAINER_BOX: &str = "│ ";
/// ASCII splitter for non-last branches.
pub const BRANCH_SPLITTER_ASCII: &str = "+ ";
/// Box-drawing splitter for non-last branches.
pub const BRANCH_SPLITTER_BOX: &str = "├─ ";
/// Default indent width of nested levels.
pub const BRANCH_INDENT: usize = 3;

/// Rendered in place of an empty string context value.
const EMPTY_VALUE: &str = "<empty>";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Glyphs and indentation used to draw the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Prefix of the last branch.
    pub delimiter: String,
    /// Continuation prefix under a non-last branch.
    pub chainer: String,
    /// Prefix of every non-last branch.
    pub splitter: String,
    /// Width nested lines are indented by.
    pub indent: usize,
}

impl RenderConfig {
    /// Box-drawing glyphs (the default).
    pub fn box_drawing() -> Self {
        Self {
            delimiter: BRANCH_DELIMITER_BOX.to_owned(),
            chainer: BRANCH_CHAINER_BOX.to_owned(),
            splitter: BRANCH_SPLITTER_BOX.to_owned(),
            indent: BRANCH_INDENT,
        }
    }

    /// Plain ASCII glyphs.
    pub fn ascii() -> Self {
        Self {
            delimiter: BRANCH_DELIMITER_ASCII.to_owned(),
            chainer: BRANCH_CHAINER_ASCII.to_owned(),
            splitter: BRANCH_SPLITTER_ASCII.to_owned(),
            indent: BRANCH_INDENT,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::box_drawing()
    }
}

static GLOBAL: LazyLock<RwLock<RenderConfig>> =
    LazyLock::new(|| RwLock::new(RenderConfig::default()));

thread_local! {
    static SCOPED: RefCell<Option<RenderConfig>> = const { RefCell::new(None) };
}

/// The configuration `Display` currently renders with.
pub fn config() -> RenderConfig {
    SCOPED
        .with_borrow(Clone::clone)
        .unwrap_or_else(|| GLOBAL.read().clone())
}

/// Replace the process-wide configuration, returning the previous one.
///
/// Renders running concurrently on other threads may observe either value.
pub fn set_config(config: RenderConfig) -> RenderConfig {
    debug!(
        delimiter = %config.delimiter,
        chainer = %config.chainer,
        splitter = %config.splitter,
        indent = config.indent,
        "render config replaced"
    );
    std::mem::replace(&mut *GLOBAL.write(), config)
}

/// Run `f` with `config` as the effective configuration of the calling
/// thread. The previous override is restored afterwards, even on panic.
pub fn with_config<T>(config: RenderConfig, f: impl FnOnce() -> T) -> T {
    struct Restore(Option<RenderConfig>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            SCOPED.with_borrow_mut(|scoped| *scoped = previous);
        }
    }

    let _restore = Restore(SCOPED.with_borrow_mut(|scoped| scoped.replace(config)));
    f()
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// One line-group under a node: a nested reason or a context pair.
enum Branch<'a> {
    Reason(&'a Reason),
    Pair(&'a str, &'a Value),
}

impl Branch<'_> {
    fn is_hierarchical(&self) -> bool {
        match self {
            Self::Reason(reason) => reason.is_hierarchical(),
            Self::Pair(..) => false,
        }
    }

    fn render(&self, config: &RenderConfig) -> String {
        match self {
            Self::Reason(reason) => render_reason(reason, config),
            Self::Pair(key, value) => format!("{key}: {}", context_value(value)),
        }
    }
}

/// Render a node as tree text.
pub fn render_karma(karma: &Karma, config: &RenderConfig) -> String {
    if let Some(reason) = karma.reason() {
        let chained = !matches!(reason, Reason::Many(_))
            && !reason.as_karma().is_some_and(Karma::is_transparent);
        if chained && !karma.is_trivial() && karma.context().is_empty() {
            let nested = render_reason(reason, config);
            return format!(
                "{}\n{}{}",
                karma.message(),
                config.delimiter,
                indent_lines(&nested, &" ".repeat(config.indent))
            );
        }
    }

    let mut branches = Vec::new();
    collect_branches(karma, &mut branches);
    render_branches(karma.message(), &branches, config)
}

/// Render any reason as text: nodes as trees, terminal values by their
/// natural string form.
pub fn render_reason(reason: &Reason, config: &RenderConfig) -> String {
    match reason {
        Reason::Karma(karma) => render_karma(karma, config),
        Reason::Many(reasons) => {
            let mut branches = Vec::new();
            for reason in reasons {
                splice(reason, &mut branches);
            }
            render_branches("", &branches, config)
        }
        Reason::Error(error) => error.to_string(),
        Reason::Text(text) => text.clone(),
        Reason::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Reason::Value(value) => value_text(value).into_owned(),
    }
}

/// Text of a context value inside the tree.
pub fn context_value(value: &Value) -> String {
    match value {
        Value::String(text) if text.is_empty() => EMPTY_VALUE.to_owned(),
        other => value_text(other).into_owned(),
    }
}

fn collect_branches<'a>(karma: &'a Karma, branches: &mut Vec<Branch<'a>>) {
    for reason in karma.reasons() {
        splice(reason, branches);
    }
    branches.extend(karma.context().iter().map(|(key, value)| Branch::Pair(key, value)));
}

fn splice<'a>(reason: &'a Reason, branches: &mut Vec<Branch<'a>>) {
    match reason {
        Reason::Karma(karma) if karma.is_transparent() => collect_branches(karma, branches),
        Reason::Many(reasons) => {
            for reason in reasons {
                splice(reason, branches);
            }
        }
        other => branches.push(Branch::Reason(other)),
    }
}

fn render_branches(message: &str, branches: &[Branch<'_>], config: &RenderConfig) -> String {
    let Some((_, init)) = branches.split_last() else {
        return message.to_owned();
    };

    // A multi-level sibling gets a spacer line below it so the next sibling
    // does not read as part of its subtree.
    let prolongate = init.iter().any(Branch::is_hierarchical);

    let chainer_width = config.chainer.chars().count();
    let mut inner_indent = config.chainer.clone();
    inner_indent.push_str(&" ".repeat(config.indent.saturating_sub(chainer_width)));
    let last_indent = " ".repeat(chainer_width.max(config.indent));
    let spacer = config.chainer.trim_end();

    let mut out = String::from(message);
    for (index, branch) in branches.iter().enumerate() {
        let is_last = index + 1 == branches.len();
        let (glyph, indentation) = if is_last {
            (&config.delimiter, &last_indent)
        } else {
            (&config.splitter, &inner_indent)
        };

        // A trivial root has no line of its own: its first branch takes it.
        if !out.is_empty() {
            out.push('\n');
            out.push_str(glyph);
        }
        out.push_str(&indent_lines(&branch.render(config), indentation));

        if prolongate && !is_last {
            out.push('\n');
            out.push_str(spacer);
        }
    }
    out
}

fn indent_lines(text: &str, indentation: &str) -> String {
    text.replace('\n', &format!("\n{indentation}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::describe;

    fn output(lines: &[&str]) -> String {
        lines.join("\n")
    }

    fn render(karma: &Karma) -> String {
        render_karma(karma, &RenderConfig::default())
    }

    #[derive(Debug)]
    struct Plain(&'static str);

    impl std::fmt::Display for Plain {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Plain {}

    // -- leaves and chains --

    #[test]
    fn empty_message() {
        assert_eq!(render(&Karma::new("")), "");
    }

    #[test]
    fn simple_message() {
        assert_eq!(render(&Karma::new("simple error")), "simple error");
    }

    #[test]
    fn simple_reason() {
        assert_eq!(
            render(&Karma::format(Reason::error(Plain("reason")), "everything has a reason")),
            output(&["everything has a reason", "└─ reason"])
        );
    }

    #[test]
    fn hierarchical_reason() {
        let chain = Karma::format(Karma::format(Reason::error(Plain("reason")), "cause"), "karma");
        assert_eq!(render(&chain), output(&["karma", "└─ cause", "   └─ reason"]));
    }

    #[test]
    fn bytes_render_as_text() {
        assert_eq!(
            render(&Karma::format(b"self".to_vec(), "no")),
            output(&["no", "└─ self"])
        );
    }

    #[test]
    fn value_reason_renders_default_form() {
        assert_eq!(
            render(&Karma::format(serde_json::json!([1, 2]), "values")),
            output(&["values", "└─ [1,2]"])
        );
    }

    #[test]
    fn trivial_node_renders_its_reason() {
        assert_eq!(render(&Karma::format("zen", "")), "zen");
    }

    // -- context --

    #[test]
    fn context_pairs_trail_reason() {
        let node = describe("host", "example.com")
            .describe("operation", "resolv")
            .format("system error", "unable to resolve");
        assert_eq!(
            render(&node),
            output(&[
                "unable to resolve",
                "├─ system error",
                "├─ host: example.com",
                "└─ operation: resolv",
            ])
        );
    }

    #[test]
    fn context_without_reason() {
        let node = describe("code", 88).message("unable to run external command");
        assert_eq!(
            render(&node),
            output(&["unable to run external command", "└─ code: 88"])
        );
    }

    #[test]
    fn empty_string_value() {
        let node = describe("path", "").message("missing");
        assert_eq!(render(&node), output(&["missing", "└─ path: <empty>"]));
    }

    #[test]
    fn context_without_hierarchy() {
        let node = describe("host", "example.com")
            .reason(describe("operation", "resolv").reason("system error"));
        assert_eq!(
            render(&node),
            output(&["system error", "├─ operation: resolv", "└─ host: example.com"])
        );
    }

    #[test]
    fn wrapped_reason_context_is_spliced() {
        let node = describe("host", "example.com")
            .format(describe("os", "linux").reason("system error"), "unable to resolve");
        assert_eq!(
            render(&node),
            output(&[
                "unable to resolve",
                "├─ system error",
                "├─ os: linux",
                "└─ host: example.com",
            ])
        );
    }

    #[test]
    fn spliced_single_reason_without_outer_context() {
        let node = Karma::format(describe("os", "linux").reason("system error"), "unable");
        assert_eq!(
            render(&node),
            output(&["unable", "├─ system error", "└─ os: linux"])
        );
    }

    #[test]
    fn multiline_values_keep_indentation() {
        let node = describe("host", "unable to connect\ntemporary unavailable").format(
            describe("context", "a\nb").reason("system error"),
            "unable to resolve",
        );
        assert_eq!(
            render(&node),
            output(&[
                "unable to resolve",
                "├─ system error",
                "├─ context: a",
                "│  b",
                "└─ host: unable to connect",
                "   temporary unavailable",
            ])
        );
    }

    #[test]
    fn single_line_siblings_are_not_prolongated() {
        let node = describe("resolver", "local")
            .describe("host", "example.com")
            .format(describe("os", "linux").reason("system error"), "unable to resolve");
        assert_eq!(
            render(&node),
            output(&[
                "unable to resolve",
                "├─ system error",
                "├─ os: linux",
                "├─ resolver: local",
                "└─ host: example.com",
            ])
        );
    }

    #[test]
    fn context_only_sibling_is_not_prolongated() {
        let node = describe("host", "example.com")
            .format(describe("free", "512Kb").message("tcp: out of memory"), "unable to connect");
        assert_eq!(
            render(&node),
            output(&[
                "unable to connect",
                "├─ tcp: out of memory",
                "│  └─ free: 512Kb",
                "└─ host: example.com",
            ])
        );
    }

    #[test]
    fn multi_level_sibling_is_prolongated() {
        let node = Karma::format(
            vec![
                Reason::from(Karma::format("inner", "first")),
                Reason::from("second"),
            ],
            "top",
        );
        assert_eq!(
            render(&node),
            output(&["top", "├─ first", "│  └─ inner", "│", "└─ second"])
        );
    }

    #[test]
    fn multi_level_last_sibling_is_not_prolongated() {
        let node = Karma::format(
            vec![
                Reason::from("first"),
                Reason::from(Karma::format("inner", "second")),
            ],
            "top",
        );
        assert_eq!(
            render(&node),
            output(&["top", "├─ first", "└─ second", "   └─ inner"])
        );
    }

    #[test]
    fn nested_call_chain() {
        let eof = Karma::format(Reason::error(Plain("EOF")), "eof or something");
        let foo = describe("wox", 84).format(eof, "foo");
        let bar = describe("barval", 42).format(foo, "bar");
        let twix = Karma::format(bar, "twix");

        insta::assert_snapshot!(render(&twix), @r"
        twix
        └─ bar
           ├─ foo
           │  ├─ eof or something
           │  │  └─ EOF
           │  │
           │  └─ wox: 84
           │
           └─ barval: 42
        ");
    }

    #[test]
    fn unsorted_fields() {
        let node = describe("start_time", 0)
            .describe("end_time", 1)
            .describe("precision", 2)
            .describe("offset", 3)
            .message("fields are not sorted");
        assert_eq!(
            render(&node),
            output(&[
                "fields are not sorted",
                "├─ start_time: 0",
                "├─ end_time: 1",
                "├─ precision: 2",
                "└─ offset: 3",
            ])
        );
    }

    // -- configuration --

    #[test]
    fn custom_delimiter_changes_only_delimiter_lines() {
        let config = RenderConfig {
            delimiter: "* ".to_owned(),
            ..RenderConfig::default()
        };
        let chain = Karma::format(Karma::format("first", "second"), "third");
        assert_eq!(
            render_karma(&chain, &config),
            output(&["third", "* second", "   * first"])
        );

        let node = describe("a", 1).format("cause", "top");
        assert_eq!(
            render_karma(&node, &config),
            output(&["top", "├─ cause", "* a: 1"])
        );
    }

    #[test]
    fn zero_indent_collapses_continuation() {
        let config = RenderConfig {
            indent: 0,
            ..RenderConfig::default()
        };
        let chain = Karma::format(Karma::format("first", "second"), "third");
        assert_eq!(
            render_karma(&chain, &config),
            output(&["third", "└─ second", "└─ first"])
        );
    }

    #[test]
    fn zero_indent_keeps_bare_chainer_between_branches() {
        let config = RenderConfig {
            indent: 0,
            ..RenderConfig::default()
        };
        let node = describe("k", "v").format(Karma::format("deep", "mid"), "top");
        assert_eq!(
            render_karma(&node, &config),
            output(&["top", "├─ mid", "│ └─ deep", "│", "└─ k: v"])
        );
    }

    #[test]
    fn nested_sequence_is_spliced_into_siblings() {
        let node = Karma::format(
            vec![Reason::from("a"), Reason::from(vec![Reason::from("b"), Reason::from("c")])],
            "top",
        );
        assert_eq!(render(&node), output(&["top", "├─ a", "├─ b", "└─ c"]));
    }

    #[test]
    fn ascii_preset() {
        let node = describe("host", "example.com").format(Karma::format("inner", "cause"), "top");
        assert_eq!(
            render_karma(&node, &RenderConfig::ascii()),
            output(&["top", "+ cause", "|  \\_ inner", "|", "\\_ host: example.com"])
        );
    }

    #[test]
    fn scoped_config_applies_to_display() {
        let chain = Karma::format(Karma::format("first", "second"), "third");
        let ascii = with_config(RenderConfig::ascii(), || chain.to_string());
        assert_eq!(ascii, output(&["third", "\\_ second", "   \\_ first"]));
    }

    #[test]
    fn scoped_config_is_restored() {
        let outer = RenderConfig {
            indent: 5,
            ..RenderConfig::default()
        };
        with_config(outer.clone(), || {
            with_config(RenderConfig::ascii(), || {
                assert_eq!(config(), RenderConfig::ascii());
            });
            assert_eq!(config(), outer);
        });
    }

    #[test]
    fn config_serde_uses_camel_case_and_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{"delimiter": "* "}"#).unwrap();
        assert_eq!(config.delimiter, "* ");
        assert_eq!(config.chainer, BRANCH_CHAINER_BOX);
        assert_eq!(config.indent, BRANCH_INDENT);
    }
}
