//! CQL (Confluence Query Language) builder.
//!
//! [`Query`] is an immutable expression tree. Every primitive and combinator
//! returns a new value, and [`Query::to_cql`] renders the final string. User
//! values are always emitted as quoted string literals with `\` and `"`
//! escaped, so a search term cannot close its literal and inject clauses.
//!
//! ```
//! use chrono::NaiveDate;
//! use pagekit_confluence::query::{ContentType, DateOp, Direction, OrderField, Query};
//!
//! let since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let query = Query::space("OPS")
//!     .and(Query::content_type(ContentType::Page))
//!     .and(Query::text("incident").or(Query::label("postmortem")))
//!     .and(Query::created(since, DateOp::OnOrAfter))
//!     .order_by(OrderField::LastModified, Direction::Desc);
//!
//! assert_eq!(
//!     query.to_cql(),
//!     r#"space = "OPS" AND type = page AND (text ~ "incident" OR label = "postmortem") AND created >= "2024-01-01" order by lastmodified desc"#
//! );
//! ```

use std::fmt;

use chrono::NaiveDate;

/// Content type filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Regular page.
    Page,
    /// Blog post.
    BlogPost,
    /// Comment.
    Comment,
    /// Attachment.
    Attachment,
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::BlogPost => "blogpost",
            Self::Comment => "comment",
            Self::Attachment => "attachment",
        }
    }
}

/// Comparison operator for date fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOp {
    /// `=`
    On,
    /// `!=`
    NotOn,
    /// `<`
    Before,
    /// `<=`
    OnOrBefore,
    /// `>`
    After,
    /// `>=`
    OnOrAfter,
}

impl DateOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::On => "=",
            Self::NotOn => "!=",
            Self::Before => "<",
            Self::OnOrBefore => "<=",
            Self::After => ">",
            Self::OnOrAfter => ">=",
        }
    }
}

/// Fields usable in `order by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    /// Creation date.
    Created,
    /// Last modification date.
    LastModified,
    /// Title.
    Title,
}

impl OrderField {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::LastModified => "lastmodified",
            Self::Title => "title",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    /// Free text, always quoted.
    Text(String),
    /// Date, rendered quoted as `yyyy-mm-dd`.
    Date(NaiveDate),
    /// Fixed keyword from a closed set, rendered bare.
    Keyword(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Clause {
        field: &'static str,
        op: &'static str,
        value: Value,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// `left NOT right`: matches `left` excluding anything matching `right`.
    Exclude(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn is_compound(&self) -> bool {
        !matches!(self, Self::Clause { .. })
    }

    fn write(&self, out: &mut String) {
        match self {
            Self::Clause { field, op, value } => {
                out.push_str(field);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                match value {
                    Value::Text(text) => push_quoted(out, text),
                    Value::Date(date) => {
                        out.push('"');
                        out.push_str(&date.format("%Y-%m-%d").to_string());
                        out.push('"');
                    }
                    Value::Keyword(keyword) => out.push_str(keyword),
                }
            }
            Self::And(children) => write_joined(out, children, " AND ", |e| {
                matches!(e, Self::Or(_) | Self::Exclude(..))
            }),
            Self::Or(children) => write_joined(out, children, " OR ", Self::is_compound),
            Self::Exclude(left, right) => {
                left.write_grouped(out, left.is_compound());
                out.push_str(" NOT ");
                right.write_grouped(out, right.is_compound());
            }
        }
    }

    fn write_grouped(&self, out: &mut String, group: bool) {
        if group {
            out.push('(');
            self.write(out);
            out.push(')');
        } else {
            self.write(out);
        }
    }
}

fn write_joined(out: &mut String, children: &[Expr], sep: &str, group: impl Fn(&Expr) -> bool) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        child.write_grouped(out, group(child));
    }
}

/// Append `value` as a double-quoted CQL string literal.
///
/// Newlines and tabs become escape sequences; other control characters are
/// dropped.
fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Immutable CQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    expr: Expr,
    order: Vec<(OrderField, Direction)>,
}

impl Query {
    fn clause(field: &'static str, op: &'static str, value: Value) -> Self {
        Self {
            expr: Expr::Clause { field, op, value },
            order: Vec::new(),
        }
    }

    /// Full-text search: `text ~ "term"`.
    #[must_use]
    pub fn text(term: impl Into<String>) -> Self {
        Self::clause("text", "~", Value::Text(term.into()))
    }

    /// Title contains: `title ~ "term"`.
    #[must_use]
    pub fn title(term: impl Into<String>) -> Self {
        Self::clause("title", "~", Value::Text(term.into()))
    }

    /// Exact title: `title = "value"`.
    #[must_use]
    pub fn title_is(title: impl Into<String>) -> Self {
        Self::clause("title", "=", Value::Text(title.into()))
    }

    /// Space key: `space = "KEY"`.
    #[must_use]
    pub fn space(key: impl Into<String>) -> Self {
        Self::clause("space", "=", Value::Text(key.into()))
    }

    /// Content type: `type = page`.
    #[must_use]
    pub fn content_type(kind: ContentType) -> Self {
        Self::clause("type", "=", Value::Keyword(kind.as_str()))
    }

    /// Label: `label = "name"`.
    #[must_use]
    pub fn label(name: impl Into<String>) -> Self {
        Self::clause("label", "=", Value::Text(name.into()))
    }

    /// Creator username: `creator = "user"`.
    #[must_use]
    pub fn creator(username: impl Into<String>) -> Self {
        Self::clause("creator", "=", Value::Text(username.into()))
    }

    /// Descendants of a page: `ancestor = "id"`.
    #[must_use]
    pub fn ancestor(page_id: impl Into<String>) -> Self {
        Self::clause("ancestor", "=", Value::Text(page_id.into()))
    }

    /// Creation date comparison: `created >= "2024-01-01"`.
    #[must_use]
    pub fn created(date: NaiveDate, op: DateOp) -> Self {
        Self::clause("created", op.as_str(), Value::Date(date))
    }

    /// Last-modified date comparison: `lastmodified < "2024-01-01"`.
    #[must_use]
    pub fn last_modified(date: NaiveDate, op: DateOp) -> Self {
        Self::clause("lastmodified", op.as_str(), Value::Date(date))
    }

    /// Both `self` and `other` must match.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut children = Vec::new();
        for expr in [self.expr, other.expr] {
            match expr {
                Expr::And(inner) => children.extend(inner),
                e => children.push(e),
            }
        }
        Self {
            expr: Expr::And(children),
            order: merge_order(self.order, other.order),
        }
    }

    /// Either `self` or `other` must match.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut children = Vec::new();
        for expr in [self.expr, other.expr] {
            match expr {
                Expr::Or(inner) => children.extend(inner),
                e => children.push(e),
            }
        }
        Self {
            expr: Expr::Or(children),
            order: merge_order(self.order, other.order),
        }
    }

    /// Match `self` but not `other`.
    #[must_use]
    pub fn exclude(self, other: Self) -> Self {
        Self {
            expr: Expr::Exclude(Box::new(self.expr), Box::new(other.expr)),
            order: merge_order(self.order, other.order),
        }
    }

    /// Append a sort key. Earlier keys take precedence.
    #[must_use]
    pub fn order_by(mut self, field: OrderField, direction: Direction) -> Self {
        self.order.push((field, direction));
        self
    }

    /// Render the query as a CQL string.
    #[must_use]
    pub fn to_cql(&self) -> String {
        let mut out = String::new();
        self.expr.write(&mut out);
        for (i, (field, direction)) in self.order.iter().enumerate() {
            out.push_str(if i == 0 { " order by " } else { ", " });
            out.push_str(field.as_str());
            out.push(' ');
            out.push_str(direction.as_str());
        }
        out
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cql())
    }
}

fn merge_order(
    mut first: Vec<(OrderField, Direction)>,
    second: Vec<(OrderField, Direction)>,
) -> Vec<(OrderField, Direction)> {
    for key in second {
        if !first.iter().any(|(field, _)| *field == key.0) {
            first.push(key);
        }
    }
    first
}
