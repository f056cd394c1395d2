//! Filter-clause expressions for WSAPI queries.
//!
//! Expressions are immutable once built and compose textually:
//! `a.and(&b)` produces the clause `"(a AND b)"`. Only the single-level
//! `(attribute operator value)` form can be parsed back; compound clauses
//! are write-only.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Comparison operators accepted by the query grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equals,
    DoesNotEqual,
    Contains,
    DoesNotContain,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
}

impl QueryOperator {
    /// The fixed wire literal for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::Equals => "=",
            QueryOperator::DoesNotEqual => "!=",
            QueryOperator::Contains => "contains",
            QueryOperator::DoesNotContain => "!contains",
            QueryOperator::LessThan => "<",
            QueryOperator::LessThanOrEqualTo => "<=",
            QueryOperator::GreaterThan => ">",
            QueryOperator::GreaterThanOrEqualTo => ">=",
        }
    }

    /// Parse a wire literal back into an operator.
    pub fn from_str(literal: &str) -> Option<Self> {
        match literal {
            "=" => Some(QueryOperator::Equals),
            "!=" => Some(QueryOperator::DoesNotEqual),
            "contains" => Some(QueryOperator::Contains),
            "!contains" => Some(QueryOperator::DoesNotContain),
            "<" => Some(QueryOperator::LessThan),
            "<=" => Some(QueryOperator::LessThanOrEqualTo),
            ">" => Some(QueryOperator::GreaterThan),
            ">=" => Some(QueryOperator::GreaterThanOrEqualTo),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Single-level clause only; compound clauses contain nested parentheses
// and never match.
static SIMPLE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\(([^()\s]+) (=|!=|contains|!contains|<=|>=|<|>) (null|"[^"]*")\)$"#).unwrap()
});

/// An immutable filter clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExpression {
    clause: String,
}

impl QueryExpression {
    /// Build `(attribute operator "value")`.
    ///
    /// Values are double-quoted verbatim; the grammar has no escaping.
    pub fn new(attribute: &str, operator: QueryOperator, value: &str) -> Self {
        Self {
            clause: format!("({attribute} {operator} \"{value}\")"),
        }
    }

    /// Build `(attribute operator null)` — the null literal is unquoted.
    pub fn new_null(attribute: &str, operator: QueryOperator) -> Self {
        Self {
            clause: format!("({attribute} {operator} null)"),
        }
    }

    /// Wrap a pre-built clause string.
    pub fn raw(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
        }
    }

    /// Compose `(self AND other)`.
    pub fn and(&self, other: &QueryExpression) -> QueryExpression {
        QueryExpression {
            clause: format!("({} AND {})", self.clause, other.clause),
        }
    }

    /// Compose `(self OR other)`.
    pub fn or(&self, other: &QueryExpression) -> QueryExpression {
        QueryExpression {
            clause: format!("({} OR {})", self.clause, other.clause),
        }
    }

    /// Left-to-right AND over any number of expressions.
    pub fn and_all<'a>(expressions: impl IntoIterator<Item = &'a QueryExpression>) -> Option<QueryExpression> {
        let mut iter = expressions.into_iter();
        let first = iter.next()?.clone();
        Some(iter.fold(first, |acc, next| acc.and(next)))
    }

    /// Left-to-right OR over any number of expressions.
    pub fn or_all<'a>(expressions: impl IntoIterator<Item = &'a QueryExpression>) -> Option<QueryExpression> {
        let mut iter = expressions.into_iter();
        let first = iter.next()?.clone();
        Some(iter.fold(first, |acc, next| acc.or(next)))
    }

    /// Parse a single-level `(attribute operator value)` clause.
    ///
    /// Compound AND/OR clauses do not round-trip and return `None`.
    pub fn parse(clause: &str) -> Option<QueryExpression> {
        let captures = SIMPLE_CLAUSE.captures(clause)?;
        let attribute = captures.get(1)?.as_str();
        let operator = QueryOperator::from_str(captures.get(2)?.as_str())?;
        let value = captures.get(3)?.as_str();

        if value == "null" {
            Some(QueryExpression::new_null(attribute, operator))
        } else {
            Some(QueryExpression::new(
                attribute,
                operator,
                value.trim_matches('"'),
            ))
        }
    }
}

impl std::fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.clause)
    }
}
