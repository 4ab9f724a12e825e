// trust-forge-core/src/core/expr.rs
// ============================================================================
// Module: Trust Expression Tree
// Description: AND/OR algebra over claim clauses with CEL rendering.
// Purpose: Build trust conditions structurally and render them deterministically.
// Dependencies: serde, smallvec
// ============================================================================

//! ## Overview
//! A [`TrustExpr`] is a small Boolean tree: `All` and `Any` groups over
//! [`Clause`] leaves. Clause builders produce trees, never strings, so
//! quoting and precedence are handled in one place by [`TrustExpr::render`].
//!
//! Rendering rules:
//! - `All` joins with ` && `; `Any` joins with ` || `.
//! - An `Any` nested inside an `All` is parenthesised, and vice versa.
//! - Single-element groups render as their only child.
//! - String literals are single-quoted with `\` and `'` escaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// SECTION: Claim Path
// ============================================================================

/// Root object a clause reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimRoot {
    /// Raw token claims (`assertion`).
    Assertion,
    /// Mapped attributes (`attribute`).
    Attribute,
}

impl ClaimRoot {
    /// Returns the CEL identifier for the root.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Assertion => "assertion",
            Self::Attribute => "attribute",
        }
    }
}

/// A claim reference such as `assertion.repository`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimPath {
    /// Root object.
    pub root: ClaimRoot,
    /// Claim or attribute name.
    pub name: String,
}

impl ClaimPath {
    /// References a raw token claim.
    #[must_use]
    pub fn assertion(name: impl Into<String>) -> Self {
        Self {
            root: ClaimRoot::Assertion,
            name: name.into(),
        }
    }

    /// References a mapped attribute.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            root: ClaimRoot::Attribute,
            name: name.into(),
        }
    }
}

impl fmt::Display for ClaimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_identifier(&self.name) {
            write!(f, "{}.{}", self.root.as_str(), self.name)
        } else {
            write!(f, "{}[{}]", self.root.as_str(), quote(&self.name))
        }
    }
}

// ============================================================================
// SECTION: Clauses
// ============================================================================

/// Comparison applied by a clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum ClauseOp {
    /// `claim == 'value'`
    Equals(String),
    /// `claim in ['a', 'b']`
    In(Vec<String>),
    /// `claim.startsWith('prefix')`
    StartsWith(String),
}

/// Atomic comparison against one claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    /// Claim being compared.
    pub claim: ClaimPath,
    /// Comparison.
    pub op: ClauseOp,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            ClauseOp::Equals(value) => write!(f, "{} == {}", self.claim, quote(value)),
            ClauseOp::In(values) => {
                write!(f, "{} in [", self.claim)?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&quote(value))?;
                }
                f.write_str("]")
            }
            ClauseOp::StartsWith(prefix) => {
                write!(f, "{}.startsWith({})", self.claim, quote(prefix))
            }
        }
    }
}

// ============================================================================
// SECTION: Expression Tree
// ============================================================================

/// Boolean trust expression over claim clauses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustExpr {
    /// Every child must hold.
    All(SmallVec<[Box<Self>; 4]>),
    /// At least one child must hold.
    Any(SmallVec<[Box<Self>; 4]>),
    /// Leaf comparison.
    Clause(Clause),
    /// Caller-supplied expression, rendered verbatim.
    Raw(String),
}

impl TrustExpr {
    /// Creates an AND group.
    #[must_use]
    pub fn all(children: Vec<Self>) -> Self {
        Self::All(children.into_iter().map(Box::new).collect())
    }

    /// Creates an OR group.
    #[must_use]
    pub fn any(children: Vec<Self>) -> Self {
        Self::Any(children.into_iter().map(Box::new).collect())
    }

    /// `claim == value`
    #[must_use]
    pub fn equals(claim: ClaimPath, value: impl Into<String>) -> Self {
        Self::Clause(Clause {
            claim,
            op: ClauseOp::Equals(value.into()),
        })
    }

    /// `claim in [values]`
    #[must_use]
    pub fn one_of(claim: ClaimPath, values: Vec<String>) -> Self {
        Self::Clause(Clause {
            claim,
            op: ClauseOp::In(values),
        })
    }

    /// `claim.startsWith(prefix)`
    #[must_use]
    pub fn starts_with(claim: ClaimPath, prefix: impl Into<String>) -> Self {
        Self::Clause(Clause {
            claim,
            op: ClauseOp::StartsWith(prefix.into()),
        })
    }

    /// Wraps a caller-supplied expression.
    #[must_use]
    pub fn raw(expression: impl Into<String>) -> Self {
        Self::Raw(expression.into())
    }

    /// Renders the expression as a CEL string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, Context::Top);
        out
    }

    /// Appends this expression to `out`, parenthesising as `ctx` requires.
    fn render_into(&self, out: &mut String, ctx: Context) {
        match self {
            Self::Clause(clause) => out.push_str(&clause.to_string()),
            Self::Raw(expression) => {
                if ctx == Context::Top {
                    out.push_str(expression.trim());
                } else {
                    out.push('(');
                    out.push_str(expression.trim());
                    out.push(')');
                }
            }
            Self::All(children) => render_group(out, children, " && ", Context::InAll, ctx),
            Self::Any(children) => render_group(out, children, " || ", Context::InAny, ctx),
        }
    }
}

impl fmt::Display for TrustExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Where an expression is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Outermost position.
    Top,
    /// Child of an AND group.
    InAll,
    /// Child of an OR group.
    InAny,
}

/// Renders a group, wrapping it in parentheses when nested in a different group.
fn render_group(
    out: &mut String,
    children: &[Box<TrustExpr>],
    separator: &str,
    own: Context,
    ctx: Context,
) {
    if let [only] = children {
        only.render_into(out, ctx);
        return;
    }
    let wrap = ctx != Context::Top && ctx != own;
    if wrap {
        out.push('(');
    }
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        child.render_into(out, own);
    }
    if wrap {
        out.push(')');
    }
}

// ============================================================================
// SECTION: Literal Helpers
// ============================================================================

/// Quotes a string literal, escaping backslashes and single quotes.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Returns true when `name` can be used with dot access.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

// ============================================================================
// SECTION: Tests
// ============================================================================
