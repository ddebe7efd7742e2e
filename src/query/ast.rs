//! Query AST
//!
//! Typed form of the JSON query language:
//!
//! ```text
//! { "WHERE": Filter, "OPTIONS": { "COLUMNS": [...], "ORDER"?: ... },
//!   "TRANSFORMATIONS"?: { "GROUP": [...], "APPLY": [...] } }
//! ```
//!
//! Keys are kept exactly as written; qualification and schema legality are
//! checked by the validator, not here.

use super::pattern::WildcardPattern;

/// A dataset key of the form `<datasetId>_<field>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedKey<'a> {
    /// Dataset id before the first underscore
    pub dataset_id: &'a str,
    /// Field name after the first underscore
    pub field: &'a str,
}

impl<'a> QualifiedKey<'a> {
    /// Splits a key at its first underscore. Returns None if the key is not
    /// qualified or either side is empty.
    pub fn parse(key: &'a str) -> Option<Self> {
        let (dataset_id, field) = key.split_once('_')?;
        if dataset_id.is_empty() || field.is_empty() {
            return None;
        }
        Some(Self { dataset_id, field })
    }

    /// Returns true if the key contains an underscore
    pub fn is_qualified(key: &str) -> bool {
        key.contains('_')
    }
}

/// Numeric comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// LT
    Lt,
    /// GT
    Gt,
    /// EQ
    Eq,
}

impl Comparator {
    /// Returns the query tag
    pub fn tag(&self) -> &'static str {
        match self {
            Comparator::Lt => "LT",
            Comparator::Gt => "GT",
            Comparator::Eq => "EQ",
        }
    }
}

/// Recursive boolean filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Empty object: matches every row
    All,
    /// Every child matches
    And(Vec<Filter>),
    /// At least one child matches
    Or(Vec<Filter>),
    /// Negation of the child
    Not(Box<Filter>),
    /// Numeric comparison against a numeric field
    Compare {
        comparator: Comparator,
        key: String,
        value: f64,
    },
    /// String match against a string field
    Is {
        key: String,
        pattern: WildcardPattern,
    },
}

impl Filter {
    /// Create an LT filter
    pub fn lt(key: impl Into<String>, value: f64) -> Self {
        Filter::Compare {
            comparator: Comparator::Lt,
            key: key.into(),
            value,
        }
    }

    /// Create a GT filter
    pub fn gt(key: impl Into<String>, value: f64) -> Self {
        Filter::Compare {
            comparator: Comparator::Gt,
            key: key.into(),
            value,
        }
    }

    /// Create an EQ filter
    pub fn eq(key: impl Into<String>, value: f64) -> Self {
        Filter::Compare {
            comparator: Comparator::Eq,
            key: key.into(),
            value,
        }
    }

    /// Create an IS filter. Returns None if the pattern has an internal wildcard.
    pub fn is(key: impl Into<String>, pattern: &str) -> Option<Self> {
        Some(Filter::Is {
            key: key.into(),
            pattern: WildcardPattern::parse(pattern)?,
        })
    }

    /// Create a NOT filter
    pub fn not(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }

    /// Returns the query tag of this node
    pub fn tag(&self) -> &'static str {
        match self {
            Filter::All => "{}",
            Filter::And(_) => "AND",
            Filter::Or(_) => "OR",
            Filter::Not(_) => "NOT",
            Filter::Compare { comparator, .. } => comparator.tag(),
            Filter::Is { .. } => "IS",
        }
    }
}

/// Aggregation operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOp {
    Max,
    Min,
    Avg,
    Count,
    Sum,
}

impl ApplyOp {
    /// Parses an operator token
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "MAX" => Some(ApplyOp::Max),
            "MIN" => Some(ApplyOp::Min),
            "AVG" => Some(ApplyOp::Avg),
            "COUNT" => Some(ApplyOp::Count),
            "SUM" => Some(ApplyOp::Sum),
            _ => None,
        }
    }

    /// Returns the operator token
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyOp::Max => "MAX",
            ApplyOp::Min => "MIN",
            ApplyOp::Avg => "AVG",
            ApplyOp::Count => "COUNT",
            ApplyOp::Sum => "SUM",
        }
    }

    /// COUNT accepts any field; every other operator needs a numeric one
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, ApplyOp::Count)
    }
}

/// One APPLY entry: `{ output: { OP: source } }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRule {
    /// Unqualified output key
    pub output: String,
    /// Aggregation operator
    pub op: ApplyOp,
    /// Qualified source key
    pub source: String,
}

impl ApplyRule {
    pub fn new(output: impl Into<String>, op: ApplyOp, source: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            op,
            source: source.into(),
        }
    }
}

/// TRANSFORMATIONS block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformations {
    /// Qualified group keys, in order
    pub group: Vec<String>,
    /// Aggregations, in order
    pub apply: Vec<ApplyRule>,
}

impl Transformations {
    /// Returns the apply output keys in order
    pub fn output_keys(&self) -> impl Iterator<Item = &str> {
        self.apply.iter().map(|rule| rule.output.as_str())
    }

    /// Returns true if the key is a group key or an apply output key
    pub fn provides(&self, key: &str) -> bool {
        self.group.iter().any(|g| g == key) || self.output_keys().any(|o| o == key)
    }
}

/// Direction of a compound order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Up,
    Down,
}

impl SortDirection {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "UP" => Some(SortDirection::Up),
            "DOWN" => Some(SortDirection::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Up => "UP",
            SortDirection::Down => "DOWN",
        }
    }
}

/// ORDER clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// Single key, ascending
    Key(String),
    /// Lexicographic over `keys` in the given direction
    Compound {
        dir: SortDirection,
        keys: Vec<String>,
    },
}

impl Order {
    /// Keys referenced by the order, in comparison order
    pub fn keys(&self) -> &[String] {
        match self {
            Order::Key(key) => std::slice::from_ref(key),
            Order::Compound { keys, .. } => keys,
        }
    }
}

/// OPTIONS block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Output columns, in order
    pub columns: Vec<String>,
    /// Optional ordering
    pub order: Option<Order>,
}

/// A parsed query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// WHERE clause
    pub filter: Filter,
    /// OPTIONS clause
    pub options: Options,
    /// Optional TRANSFORMATIONS clause
    pub transformations: Option<Transformations>,
}

impl Query {
    /// Creates a query with the given filter and columns
    pub fn new(filter: Filter, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            filter,
            options: Options {
                columns: columns.into_iter().map(Into::into).collect(),
                order: None,
            },
            transformations: None,
        }
    }

    /// Sets the order
    pub fn with_order(mut self, order: Order) -> Self {
        self.options.order = Some(order);
        self
    }

    /// Sets the transformations
    pub fn with_transformations(mut self, transformations: Transformations) -> Self {
        self.transformations = Some(transformations);
        self
    }
}
