//! FEEL expression tree.
//!
//! Trees are produced by an external parser and handed over either as Rust
//! values or as JSON (each node carries a `"type"` tag). The evaluator never
//! mutates a tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Literal constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Number(Decimal),
    String(String),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "**")]
    Pow,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = "=", alias = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }
}

/// Whether an interval endpoint is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalBound {
    Open,
    Closed,
}

/// Arguments of a function invocation, in call order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionalParameters {
    pub params: Vec<Node>,
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Literal {
        value: Literal,
    },

    /// A single name such as `age` or `date and time`.
    Name {
        name: String,
    },

    /// A dotted path such as `applicant.address.city`.
    QualifiedName {
        names: Vec<String>,
    },

    /// Binary arithmetic; a missing `left` is unary minus.
    ArithmeticExpression {
        operator: ArithmeticOp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Box<Node>>,
        right: Box<Node>,
    },

    ComparisonExpression {
        operator: ComparisonOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `value between low and high`.
    Between {
        value: Box<Node>,
        low: Box<Node>,
        high: Box<Node>,
    },

    /// `value in (test, test, ...)`.
    In {
        value: Box<Node>,
        tests: Vec<Node>,
    },

    Interval {
        start_bound: IntervalBound,
        start: Box<Node>,
        end: Box<Node>,
        end_bound: IntervalBound,
    },

    /// One cell-level test: `< 10`, `"A"`, `starts with(name, "x")`.
    SimplePositiveUnaryTest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<ComparisonOp>,
        operand: Box<Node>,
    },

    /// Comma-separated tests, optionally wrapped in `not(...)`. No tests at
    /// all is the `-` wildcard.
    SimpleUnaryTests {
        #[serde(default)]
        tests: Vec<Node>,
        #[serde(default)]
        negated: bool,
    },

    SimpleExpressions {
        expressions: Vec<Node>,
    },

    /// `date("2018-01-04")`, `time(...)`, `duration(...)` and friends.
    DateTimeLiteral {
        symbol: String,
        params: Vec<Node>,
    },

    FunctionInvocation {
        function: Box<Node>,
        #[serde(default)]
        params: PositionalParameters,
    },

    List {
        items: Vec<Node>,
    },

    /// `function(a, b) body`.
    FunctionDefinition {
        params: Vec<String>,
        body: Box<Node>,
    },
}

// ──────────────────────────────────────────────
// Construction helpers
// ──────────────────────────────────────────────

impl Node {
    pub fn null() -> Node {
        Node::Literal {
            value: Literal::Null,
        }
    }

    pub fn bool(b: bool) -> Node {
        Node::Literal {
            value: Literal::Bool(b),
        }
    }

    pub fn number(n: impl Into<Decimal>) -> Node {
        Node::Literal {
            value: Literal::Number(n.into()),
        }
    }

    pub fn string(s: impl Into<String>) -> Node {
        Node::Literal {
            value: Literal::String(s.into()),
        }
    }

    pub fn name(name: impl Into<String>) -> Node {
        Node::Name { name: name.into() }
    }

    /// `"a.b.c"` becomes a qualified name with three segments.
    pub fn path(path: &str) -> Node {
        Node::QualifiedName {
            names: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn arith(operator: ArithmeticOp, left: Node, right: Node) -> Node {
        Node::ArithmeticExpression {
            operator,
            left: Some(Box::new(left)),
            right: Box::new(right),
        }
    }

    pub fn neg(operand: Node) -> Node {
        Node::ArithmeticExpression {
            operator: ArithmeticOp::Sub,
            left: None,
            right: Box::new(operand),
        }
    }

    pub fn compare(operator: ComparisonOp, left: Node, right: Node) -> Node {
        Node::ComparisonExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(function: &str, params: Vec<Node>) -> Node {
        Node::FunctionInvocation {
            function: Box::new(Node::name(function)),
            params: PositionalParameters { params },
        }
    }

    pub fn literal_call(symbol: &str, params: Vec<Node>) -> Node {
        Node::DateTimeLiteral {
            symbol: symbol.to_string(),
            params,
        }
    }

    pub fn list(items: Vec<Node>) -> Node {
        Node::List { items }
    }

    pub fn interval(start_bound: IntervalBound, start: Node, end: Node, end_bound: IntervalBound) -> Node {
        Node::Interval {
            start_bound,
            start: Box::new(start),
            end: Box::new(end),
            end_bound,
        }
    }

    /// An input-entry test; `None` means equality.
    pub fn test(operator: Option<ComparisonOp>, operand: Node) -> Node {
        Node::SimplePositiveUnaryTest {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn tests(tests: Vec<Node>) -> Node {
        Node::SimpleUnaryTests {
            tests,
            negated: false,
        }
    }

    pub fn not_tests(tests: Vec<Node>) -> Node {
        Node::SimpleUnaryTests {
            tests,
            negated: true,
        }
    }

    /// The `-` wildcard.
    pub fn any() -> Node {
        Node::SimpleUnaryTests {
            tests: Vec::new(),
            negated: false,
        }
    }

    pub fn expressions(expressions: Vec<Node>) -> Node {
        Node::SimpleExpressions { expressions }
    }

    /// Dotted text of a bare name or qualified name.
    pub fn qualified_text(&self) -> Option<String> {
        match self {
            Node::Name { name } => Some(name.clone()),
            Node::QualifiedName { names } => Some(names.join(".")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nodes_deserialize_from_tagged_json() {
        let node: Node = serde_json::from_value(json!({
            "type": "ArithmeticExpression",
            "operator": "+",
            "left": {"type": "QualifiedName", "names": ["applicant", "age"]},
            "right": {"type": "Literal", "value": {"kind": "number", "value": "1.5"}}
        }))
        .unwrap();
        assert_eq!(
            node,
            Node::arith(
                ArithmeticOp::Add,
                Node::path("applicant.age"),
                Node::number(Decimal::new(15, 1))
            )
        );
    }

    #[test]
    fn unary_minus_omits_left() {
        let node: Node = serde_json::from_value(json!({
            "type": "ArithmeticExpression",
            "operator": "-",
            "right": {"type": "Name", "name": "x"}
        }))
        .unwrap();
        assert_eq!(node, Node::neg(Node::name("x")));
    }

    #[test]
    fn wildcard_has_no_tests() {
        let node: Node = serde_json::from_value(json!({"type": "SimpleUnaryTests"})).unwrap();
        assert_eq!(node, Node::any());
    }

    #[test]
    fn qualified_text_joins_segments() {
        assert_eq!(Node::path("a.b").qualified_text().as_deref(), Some("a.b"));
        assert_eq!(Node::number(1).qualified_text(), None);
    }
}
