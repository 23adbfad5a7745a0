//! The pipeline expression grammar.
//!
//! A deliberately small boolean/arithmetic language shared by `filter`,
//! `pick`, `select`, `calc`, `map` and `produce` arguments.  Tokens are
//! attribute names (dotted names allowed, e.g. `confidence.pose`), numeric
//! and string literals, comparison and arithmetic operators, `and`/`or`/
//! `not` (symbol forms `&&`, `||`, `!` work too) and the aggregate calls
//! `count`/`sum`/`avg`/`min`/`max`.  Each stage parses its argument text
//! once into an [`Expr`] tree; evaluation then runs against a [`Scope`]
//! that resolves names to [`AttrValue`]s.
//!
//! Unresolved names are not errors: in a boolean position they evaluate to
//! "no match", so a filter referencing an attribute an object lacks simply
//! drops that object.
//!
//! # Example
//!
//! ```
//! use spacia_pipeline::expression::{Expr, MapScope};
//! use spacia_types::AttrValue;
//! use std::collections::BTreeMap;
//!
//! let expr = Expr::parse("volume < 1.0 and not immobile").unwrap();
//! let mut attrs = BTreeMap::new();
//! attrs.insert("volume".to_string(), AttrValue::Number(0.4));
//! attrs.insert("immobile".to_string(), AttrValue::Bool(false));
//! assert!(expr.truthy(&MapScope(&attrs)));
//! ```

use spacia_types::{AttrValue, SpatialError};
use std::collections::BTreeMap;

// ────────────────────────────────────────────────────────────────────────────
// AST
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Aggregate functions folding an inner expression over the whole fact base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

/// A parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f32),
    Text(String),
    Bool(bool),
    /// Attribute (or relation keyword) reference, resolved by the scope.
    Attr(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Aggregate(Aggregate, Box<Expr>),
}

// ────────────────────────────────────────────────────────────────────────────
// Scope
// ────────────────────────────────────────────────────────────────────────────

/// Name resolution for expression evaluation.
pub trait Scope {
    fn attribute(&self, name: &str) -> Option<AttrValue>;

    /// Fold `expr` over the fact base.  Scopes without a fact base (plain
    /// attribute maps) leave aggregates unresolved.
    fn aggregate(&self, func: Aggregate, expr: &Expr) -> Option<AttrValue> {
        let _ = (func, expr);
        None
    }
}

/// A scope over a plain attribute map.
pub struct MapScope<'a>(pub &'a BTreeMap<String, AttrValue>);

impl Scope for MapScope<'_> {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.0.get(name).cloned()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

impl Expr {
    /// Evaluate to a value; `None` means an unresolved name somewhere in a
    /// position that needed it.
    pub fn eval(&self, scope: &dyn Scope) -> Option<AttrValue> {
        match self {
            Expr::Number(n) => Some(AttrValue::Number(*n)),
            Expr::Text(t) => Some(AttrValue::Text(t.clone())),
            Expr::Bool(b) => Some(AttrValue::Bool(*b)),
            Expr::Attr(name) => scope.attribute(name),
            Expr::Unary(UnaryOp::Not, inner) => {
                let value = inner.eval(scope).map(|v| v.truthy()).unwrap_or(false);
                Some(AttrValue::Bool(!value))
            }
            Expr::Unary(UnaryOp::Neg, inner) => {
                Some(AttrValue::Number(-inner.eval(scope)?.as_number()?))
            }
            Expr::Binary(op, lhs, rhs) => match op {
                BinOp::Or => {
                    let l = lhs.eval(scope).map(|v| v.truthy()).unwrap_or(false);
                    let r = rhs.eval(scope).map(|v| v.truthy()).unwrap_or(false);
                    Some(AttrValue::Bool(l || r))
                }
                BinOp::And => {
                    let l = lhs.eval(scope).map(|v| v.truthy()).unwrap_or(false);
                    let r = rhs.eval(scope).map(|v| v.truthy()).unwrap_or(false);
                    Some(AttrValue::Bool(l && r))
                }
                BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                    let ordering = lhs.eval(scope)?.compare(&rhs.eval(scope)?)?;
                    let result = match op {
                        BinOp::Eq => ordering.is_eq(),
                        BinOp::Ne => !ordering.is_eq(),
                        BinOp::Lt => ordering.is_lt(),
                        BinOp::Le => ordering.is_le(),
                        BinOp::Gt => ordering.is_gt(),
                        _ => ordering.is_ge(),
                    };
                    Some(AttrValue::Bool(result))
                }
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                    let l = lhs.eval(scope)?.as_number()?;
                    let r = rhs.eval(scope)?.as_number()?;
                    let result = match op {
                        BinOp::Add => l + r,
                        BinOp::Sub => l - r,
                        BinOp::Mul => l * r,
                        BinOp::Div => l / r,
                        _ => l % r,
                    };
                    Some(AttrValue::Number(result))
                }
            },
            Expr::Aggregate(func, inner) => scope.aggregate(*func, inner),
        }
    }

    /// Boolean view: a bare attribute behaves as `attr == true`, an
    /// unresolved name as "no match".
    pub fn truthy(&self, scope: &dyn Scope) -> bool {
        self.eval(scope).map(|v| v.truthy()).unwrap_or(false)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f32),
    Text(String),
    Ident(String),
    Op(&'static str),
}

fn tokenize(text: &str) -> Result<Vec<Token>, SpatialError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
        {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            let number = literal.parse::<f32>().map_err(|_| {
                SpatialError::Expression(format!("bad numeric literal '{literal}'"))
            })?;
            tokens.push(Token::Number(number));
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            match word.to_ascii_lowercase().as_str() {
                "and" => tokens.push(Token::Op("and")),
                "or" => tokens.push(Token::Op("or")),
                "not" => tokens.push(Token::Op("not")),
                "true" => tokens.push(Token::Ident("true".into())),
                "false" => tokens.push(Token::Ident("false".into())),
                _ => tokens.push(Token::Ident(word)),
            }
            continue;
        }
        if c == '\'' || c == '"' {
            let quote = c;
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != quote {
                i += 1;
            }
            if i >= chars.len() {
                return Err(SpatialError::Expression("unterminated string".into()));
            }
            tokens.push(Token::Text(chars[start..i].iter().collect()));
            i += 1;
            continue;
        }
        let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
        let op = match two.as_str() {
            "==" => Some(("==", 2)),
            "!=" => Some(("!=", 2)),
            "<=" => Some(("<=", 2)),
            ">=" => Some((">=", 2)),
            "&&" => Some(("and", 2)),
            "||" => Some(("or", 2)),
            _ => match c {
                '<' => Some(("<", 1)),
                '>' => Some((">", 1)),
                '=' => Some(("==", 1)),
                '!' => Some(("not", 1)),
                '&' => Some(("and", 1)),
                '+' => Some(("+", 1)),
                '-' => Some(("-", 1)),
                '*' => Some(("*", 1)),
                '/' => Some(("/", 1)),
                '%' => Some(("%", 1)),
                '(' => Some(("(", 1)),
                ')' => Some((")", 1)),
                _ => None,
            },
        };
        match op {
            Some((symbol, width)) => {
                tokens.push(Token::Op(symbol));
                i += width;
            }
            None => {
                return Err(SpatialError::Expression(format!(
                    "unexpected character '{c}'"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat_op(&mut self, symbol: &str) -> bool {
        if matches!(self.peek(), Some(Token::Op(op)) if *op == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<Expr, SpatialError> {
        let mut lhs = self.and()?;
        while self.eat_op("or") {
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, SpatialError> {
        let mut lhs = self.not()?;
        while self.eat_op("and") {
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(self.not()?));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr, SpatialError> {
        if self.eat_op("not") {
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.not()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, SpatialError> {
        let lhs = self.additive()?;
        for (symbol, op) in [
            ("==", BinOp::Eq),
            ("!=", BinOp::Ne),
            ("<=", BinOp::Le),
            (">=", BinOp::Ge),
            ("<", BinOp::Lt),
            (">", BinOp::Gt),
        ] {
            if self.eat_op(symbol) {
                let rhs = self.additive()?;
                return Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)));
            }
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, SpatialError> {
        let mut lhs = self.multiplicative()?;
        loop {
            if self.eat_op("+") {
                lhs = Expr::Binary(BinOp::Add, Box::new(lhs), Box::new(self.multiplicative()?));
            } else if self.eat_op("-") {
                lhs = Expr::Binary(BinOp::Sub, Box::new(lhs), Box::new(self.multiplicative()?));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, SpatialError> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat_op("*") {
                lhs = Expr::Binary(BinOp::Mul, Box::new(lhs), Box::new(self.unary()?));
            } else if self.eat_op("/") {
                lhs = Expr::Binary(BinOp::Div, Box::new(lhs), Box::new(self.unary()?));
            } else if self.eat_op("%") {
                lhs = Expr::Binary(BinOp::Mod, Box::new(lhs), Box::new(self.unary()?));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, SpatialError> {
        if self.eat_op("-") {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, SpatialError> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::Text(t)) => {
                self.pos += 1;
                Ok(Expr::Text(t))
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                match name.as_str() {
                    "true" => return Ok(Expr::Bool(true)),
                    "false" => return Ok(Expr::Bool(false)),
                    _ => {}
                }
                if let Some(func) = Aggregate::parse(&name) {
                    if self.eat_op("(") {
                        // `count()` counts the whole fact base
                        let inner = if matches!(self.peek(), Some(Token::Op(")"))) {
                            Expr::Bool(true)
                        } else {
                            self.or()?
                        };
                        if !self.eat_op(")") {
                            return Err(SpatialError::Expression(format!(
                                "missing ')' after {name}(...)"
                            )));
                        }
                        return Ok(Expr::Aggregate(func, Box::new(inner)));
                    }
                }
                Ok(Expr::Attr(name))
            }
            Some(Token::Op("(")) => {
                self.pos += 1;
                let inner = self.or()?;
                if !self.eat_op(")") {
                    return Err(SpatialError::Expression("missing ')'".into()));
                }
                Ok(inner)
            }
            other => Err(SpatialError::Expression(format!(
                "unexpected token {other:?}"
            ))),
        }
    }
}

impl Expr {
    /// Parse an expression; reports the first syntax problem found.
    pub fn parse(text: &str) -> Result<Expr, SpatialError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(SpatialError::Expression("empty expression".into()));
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or()?;
        if parser.pos != parser.tokens.len() {
            return Err(SpatialError::Expression(format!(
                "trailing tokens after expression in '{text}'"
            )));
        }
        Ok(expr)
    }
}

/// Split an assignment list (`name = expr; name = expr`) into parsed pairs.
/// `==` never starts an assignment, so comparison expressions inside the
/// right-hand side stay intact.
pub fn parse_assignments(text: &str) -> Result<Vec<(String, Expr)>, SpatialError> {
    let mut out = Vec::new();
    for part in text.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let eq = part
            .char_indices()
            .find(|(i, c)| {
                *c == '='
                    && part[..*i]
                        .chars()
                        .next_back()
                        .is_none_or(|p| !"<>!=".contains(p))
                    && part[i + 1..].chars().next().is_none_or(|n| n != '=')
            })
            .map(|(i, _)| i);
        let Some(eq) = eq else {
            return Err(SpatialError::Expression(format!(
                "expected 'name = expression' in '{part}'"
            )));
        };
        let name = part[..eq].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            return Err(SpatialError::Expression(format!(
                "bad assignment target '{name}'"
            )));
        }
        out.push((name.to_string(), Expr::parse(&part[eq + 1..])?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(pairs: &[(&str, AttrValue)]) -> BTreeMap<String, AttrValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // ── parsing ─────────────────────────────────────────────────────────────

    #[test]
    fn parse_comparison() {
        let expr = Expr::parse("volume < 1.0").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinOp::Lt,
                Box::new(Expr::Attr("volume".into())),
                Box::new(Expr::Number(1.0)),
            )
        );
    }

    #[test]
    fn precedence_and_over_or() {
        let expr = Expr::parse("a or b and c").unwrap();
        assert!(matches!(expr, Expr::Binary(BinOp::Or, _, _)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Expr::parse("").is_err());
        assert!(Expr::parse("width <").is_err());
        assert!(Expr::parse("(a or b").is_err());
        assert!(Expr::parse("a ## b").is_err());
    }

    // ── evaluation ──────────────────────────────────────────────────────────

    #[test]
    fn numeric_and_boolean_logic() {
        let attrs = scope(&[
            ("width", AttrValue::Number(0.5)),
            ("visible", AttrValue::Bool(true)),
        ]);
        let s = MapScope(&attrs);
        assert!(Expr::parse("width <= 0.5 and visible").unwrap().truthy(&s));
        assert!(Expr::parse("width > 0.4 or width > 9").unwrap().truthy(&s));
        assert!(!Expr::parse("not visible").unwrap().truthy(&s));
    }

    #[test]
    fn bare_boolean_attribute() {
        let attrs = scope(&[("focused", AttrValue::Bool(true))]);
        assert!(Expr::parse("focused").unwrap().truthy(&MapScope(&attrs)));
    }

    #[test]
    fn unresolved_name_is_no_match() {
        let attrs = scope(&[]);
        let s = MapScope(&attrs);
        assert!(!Expr::parse("ghost == 1").unwrap().truthy(&s));
        assert!(!Expr::parse("ghost").unwrap().truthy(&s));
        // negation of an unresolved name matches
        assert!(Expr::parse("not ghost").unwrap().truthy(&s));
    }

    #[test]
    fn string_comparison() {
        let attrs = scope(&[("label", AttrValue::Text("chair".into()))]);
        let s = MapScope(&attrs);
        assert!(Expr::parse("label == 'chair'").unwrap().truthy(&s));
        assert!(Expr::parse("label != \"table\"").unwrap().truthy(&s));
    }

    #[test]
    fn arithmetic() {
        let attrs = scope(&[("width", AttrValue::Number(2.0))]);
        let s = MapScope(&attrs);
        let value = Expr::parse("width * 3 + 1").unwrap().eval(&s).unwrap();
        assert_eq!(value.as_number(), Some(7.0));
        let value = Expr::parse("-width / 4").unwrap().eval(&s).unwrap();
        assert_eq!(value.as_number(), Some(-0.5));
    }

    #[test]
    fn numeric_text_compares_numerically() {
        let attrs = scope(&[("angle", AttrValue::Text("1.5".into()))]);
        assert!(Expr::parse("angle > 1").unwrap().truthy(&MapScope(&attrs)));
    }

    // ── assignments ─────────────────────────────────────────────────────────

    #[test]
    fn assignment_list_splits_on_semicolons() {
        let assigns = parse_assignments("a = 1; b = width * 2").unwrap();
        assert_eq!(assigns.len(), 2);
        assert_eq!(assigns[0].0, "a");
        assert_eq!(assigns[1].0, "b");
    }

    #[test]
    fn assignment_rhs_may_compare() {
        let assigns = parse_assignments("big = volume >= 1.0").unwrap();
        assert_eq!(assigns.len(), 1);
        assert!(matches!(assigns[0].1, Expr::Binary(BinOp::Ge, _, _)));
    }

    #[test]
    fn assignment_without_equals_is_an_error() {
        assert!(parse_assignments("just words").is_err());
    }
}
