//! Expression evaluation
//!
//! Pure functions from an expression and the variable table to a `Value`.
//! Undefined variables read as 0. Arithmetic and comparison need numbers on
//! both sides; the only Text operation is `+` between two strings.

use crate::error::{BasicError, Result};
use crate::parser::{parse_expression, BinaryOperator, Expression, UnaryOperator};
use crate::tokenizer::Token;
use crate::variables::{Value, VariableStore};

/// BASIC truth values
const TRUE: f64 = -1.0;
const FALSE: f64 = 0.0;

/// Parse and evaluate a token slice
pub fn evaluate(tokens: &[Token], variables: &VariableStore) -> Result<Value> {
    let expr = parse_expression(tokens)?;
    eval(&expr, variables)
}

/// Evaluate a parsed expression
pub fn eval(expr: &Expression, variables: &VariableStore) -> Result<Value> {
    match expr {
        Expression::Number(n) => Ok(Value::Number(*n)),
        Expression::String(s) => Ok(Value::Text(s.clone())),
        Expression::Variable(name) => Ok(variables.get(name)),
        Expression::UnaryOp { op, operand } => {
            let value = eval(operand, variables)?.as_number("unary sign")?;
            match op {
                UnaryOperator::Minus => Ok(Value::Number(-value)),
                UnaryOperator::Plus => Ok(Value::Number(value)),
            }
        }
        Expression::BinaryOp { left, op, right } => {
            let left_val = eval(left, variables)?;
            let right_val = eval(right, variables)?;
            apply_binary(*op, left_val, right_val)
        }
    }
}

/// Evaluate to a number, failing on Text
pub fn eval_number(expr: &Expression, variables: &VariableStore, context: &str) -> Result<f64> {
    eval(expr, variables)?.as_number(context)
}

fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value> {
    let (left_val, right_val) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        (Value::Text(l), Value::Text(r)) if op == BinaryOperator::Add => {
            return Ok(Value::Text(l + &r));
        }
        _ => {
            return Err(BasicError::type_mismatch(format!(
                "{} needs two numbers",
                symbol(op)
            )))
        }
    };

    let result = match op {
        BinaryOperator::Add => left_val + right_val,
        BinaryOperator::Subtract => left_val - right_val,
        BinaryOperator::Multiply => left_val * right_val,
        BinaryOperator::Divide => {
            if right_val == 0.0 {
                return Err(BasicError::Arithmetic("division by zero".to_string()));
            }
            left_val / right_val
        }
        BinaryOperator::Equal => truth(left_val == right_val),
        BinaryOperator::NotEqual => truth(left_val != right_val),
        BinaryOperator::LessThan => truth(left_val < right_val),
        BinaryOperator::LessThanOrEqual => truth(left_val <= right_val),
        BinaryOperator::GreaterThan => truth(left_val > right_val),
        BinaryOperator::GreaterThanOrEqual => truth(left_val >= right_val),
    };

    Ok(Value::Number(result))
}

fn truth(condition: bool) -> f64 {
    if condition {
        TRUE
    } else {
        FALSE
    }
}

fn symbol(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Equal => "=",
        BinaryOperator::NotEqual => "<>",
        BinaryOperator::LessThan => "<",
        BinaryOperator::LessThanOrEqual => "<=",
        BinaryOperator::GreaterThan => ">",
        BinaryOperator::GreaterThanOrEqual => ">=",
    }
}
