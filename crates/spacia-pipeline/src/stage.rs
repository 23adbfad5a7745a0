//! Pipeline operations and the stage record.
//!
//! Each token of a pipeline (`name(arguments)`) parses exactly once into a
//! [`PipelineOp`] variant; the reasoner then matches the variant
//! exhaustively instead of re-inspecting the text.  A [`Stage`] records the
//! token, the parsed operation, the index sets it consumed and produced,
//! and its success/error state, forming the auditable inference chain.

use crate::expression::{parse_assignments, Expr};
use spacia_types::SpatialError;

// ────────────────────────────────────────────────────────────────────────────
// PipelineOp
// ────────────────────────────────────────────────────────────────────────────

/// Quantifier of a `select` over the matched-relation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    #[default]
    Any,
    All,
    None,
}

/// Sort key: either a direct attribute, or the delta/angle of a relation
/// observed against the input of an earlier manipulating stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    /// Relation name when sorting by an observed relation value.
    pub predicate: Option<String>,
    /// Attribute name; for relation sorts `delta` or `angle`.
    pub attribute: String,
    /// Backtrace distance for relation sorts (1 = previous manipulating
    /// stage).
    pub steps: usize,
    pub ascending: bool,
}

/// A parsed pipeline operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOp {
    Filter(Expr),
    Isa(Vec<String>),
    Pick(Expr),
    Select {
        quantifier: Quantifier,
        relations: Expr,
        condition: Option<Expr>,
    },
    Sort(SortKey),
    Slice {
        lower: i64,
        upper: Option<i64>,
    },
    Produce {
        rule: String,
        assignments: Vec<(String, Expr)>,
    },
    Calc(Vec<(String, Expr)>),
    Map(Vec<(String, Expr)>),
    Backtrace(usize),
    Reload,
    Log(String),
    Adjust(String),
    Deduce(String),
}

impl PipelineOp {
    /// Parse one pipeline token.  The surface form is always
    /// `name(arguments)`; bare `reload` and `log` are accepted without
    /// parentheses.
    pub fn parse(token: &str) -> Result<Self, SpatialError> {
        let token = token.trim();
        let (name, args) = match token.find('(') {
            Some(open) => {
                let close = token.rfind(')').ok_or_else(|| parse_error(token, "", "missing ')'"))?;
                if close < open {
                    return Err(parse_error(token, "", "missing ')'"));
                }
                (token[..open].trim(), token[open + 1..close].trim())
            }
            None => (token, ""),
        };
        match name {
            "filter" => Ok(Self::Filter(Expr::parse(args)?)),
            "isa" => {
                let alternatives: Vec<String> = args
                    .split('|')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                if alternatives.is_empty() {
                    return Err(parse_error(name, args, "expected at least one type"));
                }
                Ok(Self::Isa(alternatives))
            }
            "pick" => Ok(Self::Pick(Expr::parse(args)?)),
            "select" => Self::parse_select(args),
            "sort" => Self::parse_sort(args),
            "slice" => Self::parse_slice(args),
            "produce" => Self::parse_produce(args),
            "calc" => Ok(Self::Calc(parse_assignments(args)?)),
            "map" => Ok(Self::Map(parse_assignments(args)?)),
            "backtrace" => {
                let steps = if args.is_empty() {
                    1
                } else {
                    args.parse::<usize>()
                        .map_err(|_| parse_error(name, args, "expected a step count"))?
                };
                if steps == 0 {
                    return Err(parse_error(name, args, "step count starts at 1"));
                }
                Ok(Self::Backtrace(steps))
            }
            "reload" => Ok(Self::Reload),
            "log" => Ok(Self::Log(args.to_string())),
            "adjust" => Ok(Self::Adjust(args.to_string())),
            "deduce" => Ok(Self::Deduce(args.to_string())),
            _ => Err(parse_error(name, args, "unknown operation")),
        }
    }

    fn parse_select(args: &str) -> Result<Self, SpatialError> {
        let (relation_text, condition_text) = match args.split_once('?') {
            Some((r, c)) => (r.trim(), Some(c.trim())),
            None => (args, None),
        };
        let mut words = relation_text.splitn(2, char::is_whitespace);
        let head = words.next().unwrap_or("");
        let (quantifier, rest) = match head {
            "any" => (Quantifier::Any, words.next().unwrap_or("")),
            "all" => (Quantifier::All, words.next().unwrap_or("")),
            "none" | "no" => (Quantifier::None, words.next().unwrap_or("")),
            _ => (Quantifier::Any, relation_text),
        };
        if rest.trim().is_empty() {
            return Err(parse_error("select", args, "expected a relation expression"));
        }
        let condition = condition_text.map(Expr::parse).transpose()?;
        Ok(Self::Select {
            quantifier,
            relations: Expr::parse(rest)?,
            condition,
        })
    }

    fn parse_sort(args: &str) -> Result<Self, SpatialError> {
        let mut ascending = false;
        let mut steps = 1usize;
        let mut key: Option<&str> = None;
        for word in args.split_whitespace() {
            match word {
                "<" => ascending = true,
                ">" => ascending = false,
                _ if word.chars().all(|c| c.is_ascii_digit()) => {
                    steps = word
                        .parse()
                        .map_err(|_| parse_error("sort", args, "bad step count"))?;
                }
                _ if key.is_none() => key = Some(word),
                _ => return Err(parse_error("sort", args, "too many sort keys")),
            }
        }
        let Some(key) = key else {
            return Err(parse_error("sort", args, "expected a sort key"));
        };
        // `predicate.attribute` sorts by an observed relation value
        let sort_key = match key.split_once('.') {
            Some((pred, attr))
                if matches!(attr, "delta" | "angle")
                    && spacia_inference::Predicate::parse(pred)
                        != spacia_inference::Predicate::Undefined =>
            {
                SortKey {
                    predicate: Some(pred.to_string()),
                    attribute: attr.to_string(),
                    steps,
                    ascending,
                }
            }
            _ => SortKey {
                predicate: None,
                attribute: key.to_string(),
                steps,
                ascending,
            },
        };
        Ok(Self::Sort(sort_key))
    }

    fn parse_slice(args: &str) -> Result<Self, SpatialError> {
        let parse_bound = |text: &str| -> Result<i64, SpatialError> {
            text.trim()
                .parse::<i64>()
                .map_err(|_| parse_error("slice", args, "expected an integer bound"))
        };
        match args.split_once("..") {
            Some((lower, upper)) => Ok(Self::Slice {
                lower: parse_bound(lower)?,
                upper: Some(parse_bound(upper)?),
            }),
            None => Ok(Self::Slice {
                lower: parse_bound(args)?,
                upper: None,
            }),
        }
    }

    fn parse_produce(args: &str) -> Result<Self, SpatialError> {
        let (rule, assignment_text) = match args.split_once(':') {
            Some((r, a)) => (r.trim(), a.trim()),
            None => (args, ""),
        };
        if rule.is_empty() {
            return Err(parse_error("produce", args, "expected a rule name"));
        }
        let assignments = if assignment_text.is_empty() {
            Vec::new()
        } else {
            parse_assignments(assignment_text)?
        };
        Ok(Self::Produce {
            rule: rule.to_string(),
            assignments,
        })
    }

    /// Manipulating operations transform the index set; an empty output
    /// from one of these reads as "no match" and fails the stage.
    pub fn is_manipulating(&self) -> bool {
        matches!(
            self,
            Self::Filter(_)
                | Self::Isa(_)
                | Self::Pick(_)
                | Self::Select { .. }
                | Self::Produce { .. }
                | Self::Slice { .. }
                | Self::Reload
                | Self::Sort(_)
        )
    }
}

fn parse_error(op: &str, args: &str, details: &str) -> SpatialError {
    SpatialError::Parse {
        op: op.to_string(),
        args: args.to_string(),
        details: details.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage
// ────────────────────────────────────────────────────────────────────────────

/// One executed pipeline operation, as recorded on the inference chain.
/// A token that failed to parse is recorded too, with no parsed `op`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// The original pipeline token.
    pub operation: String,
    pub op: Option<PipelineOp>,
    pub input: Vec<usize>,
    pub output: Vec<usize>,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl Stage {
    pub fn new(operation: impl Into<String>, op: PipelineOp) -> Self {
        Self {
            operation: operation.into(),
            op: Some(op),
            input: Vec::new(),
            output: Vec::new(),
            succeeded: true,
            error: None,
        }
    }

    /// A stage for a token that could not be parsed.
    pub fn invalid(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            op: None,
            input: Vec::new(),
            output: Vec::new(),
            succeeded: false,
            error: Some(error.into()),
        }
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.succeeded = false;
        self.error = Some(error.into());
    }
}
