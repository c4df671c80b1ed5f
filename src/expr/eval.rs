//! eval evaluates a compiled expression over a binding environment.
//!
//! The language has no operator precedence (`spec.md` §4.3: "operator
//! precedence is the caller's responsibility"): a compiled expression is a
//! flat left-to-right sequence of primaries and binary operators, all at
//! one precedence level, folded strictly in order. `isnumeric` and
//! `startswith` are prefix built-ins that consume the value(s) produced by
//! the primary/primaries immediately following them, rather than popping
//! an already-materialized stack — this is the reading that makes the
//! worked constraint examples (`isnumeric $1 and $1 = 0`) evaluate to the
//! documented result, and is recorded as a resolved ambiguity in
//! `DESIGN.md`.

use crate::config::EVAL_STACK_DEPTH;
use crate::error::Error;
use crate::expr::compiler::CompiledExpr;
use crate::interner::{InternedStr, Interner};
use crate::pattern::Bindings;
use crate::token::{BinOp, Token};
use crate::value::{str_is_numeric, Value};

#[derive(Clone, Debug)]
enum Pending {
    None,
    IsNumeric,
    StartsWithFirst,
    StartsWithSecond(Value),
}

/// Evaluator folds a [`CompiledExpr`] into a single `i32` result, reusing a
/// fixed-depth operand buffer across calls (`spec.md` §5: "a single operand
/// stack ... reused across evaluations").
pub struct Evaluator {
    history: Vec<Value>,
}

impl Evaluator {
    /// new constructs an evaluator with the spec-mandated minimum stack depth.
    pub fn new() -> Evaluator {
        Evaluator {
            history: Vec::with_capacity(EVAL_STACK_DEPTH),
        }
    }

    /// eval runs `expr` over `bindings`, returning its single integer result.
    pub fn eval(
        &mut self,
        expr: &CompiledExpr,
        bindings: &Bindings,
        line: Option<usize>,
    ) -> Result<i32, Error> {
        self.history.clear();

        let mut acc: Option<Value> = None;
        let mut pending_op: Option<BinOp> = None;
        let mut pending_unary = Pending::None;

        for token in expr.tokens() {
            match token {
                Token::LParen | Token::RParen => {}
                Token::Op(op) => {
                    if acc.is_none() {
                        return Err(Error::InvalidExpression(
                            line,
                            "operator with no left operand".to_string(),
                        ));
                    }
                    if pending_op.is_some() {
                        return Err(Error::InvalidExpression(
                            line,
                            "two operators in a row".to_string(),
                        ));
                    }
                    pending_op = Some(*op);
                }
                Token::IsNumeric => {
                    pending_unary = Pending::IsNumeric;
                }
                Token::StartsWith => {
                    pending_unary = Pending::StartsWithFirst;
                }
                Token::Number(_) | Token::Variable(_) | Token::Literal(_) => {
                    let value = resolve_atom(token, bindings, line)?;
                    self.push_atom(value, &mut pending_unary, &mut acc, &mut pending_op, line)?;
                }
            }
        }

        if !matches!(pending_unary, Pending::None) {
            return Err(Error::InvalidExpression(
                line,
                "built-in is missing its argument(s)".to_string(),
            ));
        }
        if pending_op.is_some() {
            return Err(Error::InvalidExpression(
                line,
                "operator is missing its right operand".to_string(),
            ));
        }

        match acc {
            Some(Value::Int(i)) => Ok(i),
            _ => Err(Error::InvalidExpression(
                line,
                "expression did not reduce to an integer".to_string(),
            )),
        }
    }

    fn push_atom(
        &mut self,
        value: Value,
        pending_unary: &mut Pending,
        acc: &mut Option<Value>,
        pending_op: &mut Option<BinOp>,
        line: Option<usize>,
    ) -> Result<(), Error> {
        match std::mem::replace(pending_unary, Pending::None) {
            Pending::None => self.combine(value, acc, pending_op, line),
            Pending::IsNumeric => {
                let result = Value::Int(value.is_numeric() as i32);
                self.combine(result, acc, pending_op, line)
            }
            Pending::StartsWithFirst => {
                *pending_unary = Pending::StartsWithSecond(value);
                Ok(())
            }
            Pending::StartsWithSecond(s) => {
                let result = Value::Int(eval_startswith(&s, &value) as i32);
                self.combine(result, acc, pending_op, line)
            }
        }
    }

    fn combine(
        &mut self,
        value: Value,
        acc: &mut Option<Value>,
        pending_op: &mut Option<BinOp>,
        line: Option<usize>,
    ) -> Result<(), Error> {
        self.history.push(value.clone());

        match (acc.take(), pending_op.take()) {
            (None, None) => {
                *acc = Some(value);
                Ok(())
            }
            (Some(left), Some(op)) => {
                let result = apply_binop(op, left, value, line)?;
                *acc = Some(result);
                Ok(())
            }
            (Some(_), None) => Err(Error::InvalidExpression(
                line,
                "two operands in a row with no operator".to_string(),
            )),
            (None, Some(_)) => unreachable!("an Op token always requires acc to be Some already"),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

fn resolve_atom(token: &Token, bindings: &Bindings, line: Option<usize>) -> Result<Value, Error> {
    match token {
        Token::Number(n) => Ok(Value::Int(*n)),
        Token::Literal(s) => Ok(Value::Str(s.clone())),
        Token::Variable(slot) => {
            let bound = bindings
                .get(*slot)
                .ok_or_else(|| Error::InvalidBinding(line, *slot))?;
            Ok(resolve_binding(bound))
        }
        _ => unreachable!("resolve_atom is only called for Number/Variable/Literal tokens"),
    }
}

/// resolve_binding classifies a bound string the way the evaluator's
/// "variable resolution" rule requires: numeric strings become `Int`,
/// everything else stays `Str`.
fn resolve_binding(bound: &InternedStr) -> Value {
    if str_is_numeric(bound.as_str()) {
        Value::Int(bound.as_str().parse().unwrap_or(0))
    } else {
        Value::Str(bound.clone())
    }
}

fn eval_startswith(s: &Value, prefix: &Value) -> bool {
    match (s, prefix) {
        (Value::Str(s), Value::Str(prefix)) => s.as_str().starts_with(prefix.as_str()),
        _ => false,
    }
}

fn apply_binop(op: BinOp, x: Value, y: Value, line: Option<usize>) -> Result<Value, Error> {
    use BinOp::*;

    if matches!(op, And | Or | Xor) {
        let (a, b) = (x.truthy(), y.truthy());
        let r = match op {
            And => a && b,
            Or => a || b,
            Xor => a ^ b,
            _ => unreachable!(),
        };
        return Ok(Value::Int(r as i32));
    }

    match (&x, &y) {
        (Value::Int(a), Value::Int(b)) => apply_int_binop(op, *a, *b, line),
        (Value::Str(a), Value::Str(b)) => {
            let r = a.as_str().cmp(b.as_str());
            compare_result(op, r, line)
        }
        (Value::Int(_), Value::Str(_)) | (Value::Str(_), Value::Int(_)) => {
            let ls = to_comparable_string(&x);
            let rs = to_comparable_string(&y);
            compare_result(op, ls.cmp(&rs), line)
        }
    }
}

fn to_comparable_string(v: &Value) -> String {
    match v {
        Value::Int(i) => i.to_string(),
        Value::Str(s) => s.as_str().to_string(),
    }
}

fn compare_result(op: BinOp, ordering: std::cmp::Ordering, line: Option<usize>) -> Result<Value, Error> {
    use std::cmp::Ordering::*;
    use BinOp::*;

    let r = match op {
        Lt => ordering == Less,
        Gt => ordering == Greater,
        Le => ordering != Greater,
        Ge => ordering != Less,
        Eq => ordering == Equal,
        Ne => ordering != Equal,
        _ => {
            return Err(Error::InvalidExpression(
                line,
                "arithmetic operator applied to incompatible operand types".to_string(),
            ))
        }
    };
    Ok(Value::Int(r as i32))
}

fn apply_int_binop(op: BinOp, a: i32, b: i32, line: Option<usize>) -> Result<Value, Error> {
    use BinOp::*;

    let result = match op {
        Add => Value::Int(a.wrapping_add(b)),
        Sub => Value::Int(a.wrapping_sub(b)),
        Mul => Value::Int(a.wrapping_mul(b)),
        Div => {
            if b == 0 {
                return Err(Error::InvalidExpression(line, "division by zero".to_string()));
            }
            Value::Int(a.wrapping_div(b))
        }
        Mod => {
            if b == 0 {
                return Err(Error::InvalidExpression(line, "modulo by zero".to_string()));
            }
            Value::Int(a.wrapping_rem(b))
        }
        Lt | Gt | Le | Ge | Eq | Ne => return compare_result(op, a.cmp(&b), line),
        And | Or | Xor => unreachable!("handled before reaching apply_int_binop"),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::compiler::compile;

    fn eval_str(expr_src: &str, bindings: &Bindings) -> i32 {
        let mut interner = Interner::new();
        let expr = compile(expr_src, None, &mut interner).unwrap();
        let mut evaluator = Evaluator::new();
        evaluator.eval(&expr, bindings, None).unwrap()
    }

    #[test]
    fn isnumeric_and_equality_example() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(1, interner.intern("0"));
        assert_eq!(eval_str("isnumeric $1 and $1 = 0", &bindings), 1);
    }

    #[test]
    fn isnumeric_and_equality_counterexample() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(1, interner.intern("5"));
        assert_eq!(eval_str("isnumeric $1 and $1 = 0", &bindings), 0);
    }

    #[test]
    fn eval_plus_one() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(1, interner.intern("3"));
        assert_eq!(eval_str("$1 + 1", &bindings), 4);
    }

    #[test]
    fn mixed_type_comparison() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(0, interner.intern("hl"));
        assert_eq!(eval_str("$0 = \"hl\"", &bindings), 1);
    }

    #[test]
    fn unbound_variable_errors() {
        let mut interner = Interner::new();
        let expr = compile("$2 + 1", None, &mut interner).unwrap();
        let bindings = Bindings::new();
        let mut evaluator = Evaluator::new();
        assert!(evaluator.eval(&expr, &bindings, None).is_err());
    }

    #[test]
    fn startswith_prefix() {
        let mut interner = Interner::new();
        let mut bindings = Bindings::new();
        bindings.bind(0, interner.intern("hl2"));
        assert_eq!(eval_str("startswith $0 \"hl\"", &bindings), 1);
    }
}
