//! # Protocol Constant Resolver
//!
//! Protocol constant tables are commonly written as expressions over other
//! constants (`TNS_DATA_TYPE_LONG_RAW = TNS_DATA_TYPE_RAW + 1`, `FLAG_A | FLAG_B`).
//! [`ConstantResolver`] collects `name -> expression` definitions in any order
//! and evaluates them in repeated passes until nothing new resolves. Names
//! still pending at that point (unknown references or cycles) are reported
//! together as `WireError::UnresolvedConstants`.
//!
//! ## Grammar
//! ```text
//! expr    := or
//! or      := and ('|' and)*
//! and     := shift ('&' shift)*
//! shift   := sum (('<<' | '>>') sum)*
//! sum     := product (('+' | '-') product)*
//! product := unary ('*' unary)*
//! unary   := '-' unary | atom
//! atom    := integer | name | '(' expr ')'
//! integer := decimal | '0x' hex
//! ```

use std::collections::{BTreeMap, BTreeSet};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, hex_digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, recognize},
    multi::{fold_many0, many0_count},
    sequence::{delimited, pair, preceded},
    IResult,
};
use tracing::{debug, warn};

use crate::error::{Result, WireError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Int(i64),
    Name(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluate against `env`; `Ok(None)` while a referenced name is unresolved
    fn eval(&self, env: &BTreeMap<String, i64>) -> Result<Option<i64>> {
        let value = match self {
            Expr::Int(v) => Some(*v),
            Expr::Name(name) => env.get(name).copied(),
            Expr::Neg(inner) => match inner.eval(env)? {
                Some(v) => Some(v.checked_neg().ok_or_else(overflow)?),
                None => None,
            },
            Expr::Binary(op, lhs, rhs) => match (lhs.eval(env)?, rhs.eval(env)?) {
                (Some(a), Some(b)) => Some(apply(*op, a, b)?),
                _ => None,
            },
        };
        Ok(value)
    }

    fn collect_names<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Int(_) => {}
            Expr::Name(name) => {
                out.insert(name.as_str());
            }
            Expr::Neg(inner) => inner.collect_names(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_names(out);
                rhs.collect_names(out);
            }
        }
    }
}

fn overflow() -> WireError {
    WireError::InvalidExpression("arithmetic overflow".to_string())
}

fn apply(op: BinOp, a: i64, b: i64) -> Result<i64> {
    let shift_by =
        || u32::try_from(b).map_err(|_| WireError::InvalidExpression(format!("bad shift: {b}")));
    let value = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Shl => a.checked_shl(shift_by()?),
        BinOp::Shr => a.checked_shr(shift_by()?),
        BinOp::And => Some(a & b),
        BinOp::Or => Some(a | b),
    };
    value.ok_or_else(overflow)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn integer(input: &str) -> IResult<&str, Expr> {
    alt((
        map_res(preceded(alt((tag("0x"), tag("0X"))), hex_digit1), |h: &str| {
            i64::from_str_radix(h, 16).map(Expr::Int)
        }),
        map_res(digit1, |d: &str| d.parse::<i64>().map(Expr::Int)),
    ))(input)
}

fn name(input: &str) -> IResult<&str, Expr> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        |n: &str| Expr::Name(n.to_string()),
    )(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    ws(alt((integer, name, delimited(char('('), expr, char(')')))))(input)
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |e| Expr::Neg(Box::new(e))),
        atom,
    ))(input)
}

fn product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    fold_many0(
        preceded(ws(char('*')), unary),
        move || first.clone(),
        |acc, rhs| Expr::binary(BinOp::Mul, acc, rhs),
    )(input)
}

fn sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = product(input)?;
    fold_many0(
        pair(ws(one_of("+-")), product),
        move || first.clone(),
        |acc, (op, rhs)| {
            let op = if op == '+' { BinOp::Add } else { BinOp::Sub };
            Expr::binary(op, acc, rhs)
        },
    )(input)
}

fn shift(input: &str) -> IResult<&str, Expr> {
    let (input, first) = sum(input)?;
    fold_many0(
        pair(ws(alt((tag("<<"), tag(">>")))), sum),
        move || first.clone(),
        |acc, (op, rhs)| {
            let op = if op == "<<" { BinOp::Shl } else { BinOp::Shr };
            Expr::binary(op, acc, rhs)
        },
    )(input)
}

fn bit_and(input: &str) -> IResult<&str, Expr> {
    let (input, first) = shift(input)?;
    fold_many0(
        preceded(ws(char('&')), shift),
        move || first.clone(),
        |acc, rhs| Expr::binary(BinOp::And, acc, rhs),
    )(input)
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = bit_and(input)?;
    fold_many0(
        preceded(ws(char('|')), bit_and),
        move || first.clone(),
        |acc, rhs| Expr::binary(BinOp::Or, acc, rhs),
    )(input)
}

fn parse_expression(text: &str) -> Result<Expr> {
    all_consuming(expr)(text)
        .map(|(_, parsed)| parsed)
        .map_err(|e| WireError::InvalidExpression(format!("{text:?}: {e}")))
}

/// Evaluate a standalone expression that references no names
pub fn evaluate(text: &str) -> Result<i64> {
    let parsed = parse_expression(text)?;
    let env = BTreeMap::new();
    parsed
        .eval(&env)?
        .ok_or_else(|| unresolved_names(&parsed, &env))
}

/// Names referenced by `expr` that `env` does not define
fn unresolved_names(expr: &Expr, env: &BTreeMap<String, i64>) -> WireError {
    let mut names = BTreeSet::new();
    expr.collect_names(&mut names);
    WireError::UnresolvedConstants(
        names
            .into_iter()
            .filter(|name| !env.contains_key(*name))
            .map(str::to_string)
            .collect(),
    )
}

/// Fixed-point resolver for named constant expressions
#[derive(Debug, Clone, Default)]
pub struct ConstantResolver {
    definitions: BTreeMap<String, Expr>,
}

impl ConstantResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition
    ///
    /// # Errors
    /// Returns `WireError::InvalidExpression` if `expression` does not parse
    pub fn define(&mut self, name: impl Into<String>, expression: &str) -> Result<()> {
        let name = name.into();
        let parsed = parse_expression(expression)?;
        if self.definitions.insert(name.clone(), parsed).is_some() {
            warn!(constant = %name, "constant redefined");
        }
        Ok(())
    }

    /// Add many definitions at once
    pub fn define_all<'a, I>(&mut self, definitions: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, expression) in definitions {
            self.define(name, expression)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve every definition
    ///
    /// # Errors
    /// `WireError::UnresolvedConstants` lists the names that never resolved,
    /// sorted. Arithmetic overflow surfaces as `InvalidExpression`.
    pub fn resolve(&self) -> Result<BTreeMap<String, i64>> {
        let mut resolved = BTreeMap::new();
        let mut pending: Vec<(&String, &Expr)> = self.definitions.iter().collect();
        let mut passes = 0usize;

        while !pending.is_empty() {
            passes += 1;
            let before = pending.len();
            let mut still_pending = Vec::with_capacity(before);
            for (name, definition) in pending {
                match definition.eval(&resolved)? {
                    Some(value) => {
                        resolved.insert(name.clone(), value);
                    }
                    None => still_pending.push((name, definition)),
                }
            }
            pending = still_pending;
            if pending.len() == before {
                let names = pending.iter().map(|(name, _)| (*name).clone()).collect();
                return Err(WireError::UnresolvedConstants(names));
            }
        }

        debug!(constants = resolved.len(), passes, "resolved constant table");
        Ok(resolved)
    }

    /// Resolve the definitions, then evaluate each cell of `rows`
    ///
    /// Used for tables such as data-type rows of
    /// `[type, conversion type, representation]`.
    pub fn resolve_rows(&self, rows: &[Vec<&str>]) -> Result<Vec<Vec<i64>>> {
        let env = self.resolve()?;
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        let parsed = parse_expression(cell)?;
                        parsed
                            .eval(&env)?
                            .ok_or_else(|| unresolved_names(&parsed, &env))
                    })
                    .collect::<Result<Vec<i64>>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_literals_and_precedence() {
        assert_eq!(evaluate("42").unwrap(), 42);
        assert_eq!(evaluate("0x1F").unwrap(), 31);
        assert_eq!(evaluate("1 + 2 * 3").unwrap(), 7);
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), 9);
        assert_eq!(evaluate("1 << 4 | 1").unwrap(), 17);
        assert_eq!(evaluate("0xFF & 0x0F << 4").unwrap(), 0xF0);
        assert_eq!(evaluate("10 - 3 - 2").unwrap(), 5);
        assert_eq!(evaluate("-5 + 1").unwrap(), -4);
        assert_eq!(evaluate(" 256 >> 2 ").unwrap(), 64);
    }

    #[test]
    fn test_malformed_expressions() {
        for text in ["", "1 +", "(1", "1 2", "0x", "a $ b"] {
            assert!(
                matches!(evaluate(text), Err(WireError::InvalidExpression(_))),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(
            evaluate("9223372036854775807 + 1"),
            Err(WireError::InvalidExpression(_))
        ));
        assert!(evaluate("1 << 64").is_err());
    }

    #[test]
    fn test_forward_references_resolve() {
        let mut resolver = ConstantResolver::new();
        resolver
            .define_all([
                ("TNS_DATA_TYPE_LONG_RAW", "TNS_DATA_TYPE_RAW + 1"),
                ("TNS_DATA_TYPE_RAW", "23"),
                ("FLAGS", "FLAG_A | FLAG_B"),
                ("FLAG_A", "1 << 0"),
                ("FLAG_B", "1 << 3"),
            ])
            .unwrap();
        let table = resolver.resolve().unwrap();
        assert_eq!(table["TNS_DATA_TYPE_RAW"], 23);
        assert_eq!(table["TNS_DATA_TYPE_LONG_RAW"], 24);
        assert_eq!(table["FLAGS"], 9);
    }

    #[test]
    fn test_unresolved_names_are_listed() {
        let mut resolver = ConstantResolver::new();
        resolver.define("OK", "1").unwrap();
        resolver.define("B", "MISSING + 1").unwrap();
        resolver.define("CYCLE_A", "CYCLE_B").unwrap();
        resolver.define("CYCLE_B", "CYCLE_A").unwrap();
        match resolver.resolve() {
            Err(WireError::UnresolvedConstants(names)) => {
                assert_eq!(names, ["B", "CYCLE_A", "CYCLE_B"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_rows() {
        let mut resolver = ConstantResolver::new();
        resolver
            .define_all([("TNS_DATA_TYPE_VARCHAR", "1"), ("TNS_CS_IMPLICIT", "1")])
            .unwrap();
        let rows = resolver
            .resolve_rows(&[
                vec!["TNS_DATA_TYPE_VARCHAR", "TNS_DATA_TYPE_VARCHAR", "TNS_CS_IMPLICIT"],
                vec!["2", "TNS_DATA_TYPE_VARCHAR + 1", "0"],
            ])
            .unwrap();
        assert_eq!(rows, vec![vec![1, 1, 1], vec![2, 2, 0]]);

        match resolver.resolve_rows(&[vec!["UNKNOWN_TYPE"]]) {
            Err(WireError::UnresolvedConstants(names)) => assert_eq!(names, ["UNKNOWN_TYPE"]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
