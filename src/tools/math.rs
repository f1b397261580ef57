//! Arithmetic for the `math` tool
//!
//! Integer operands stay integers for add/subtract/multiply; division always
//! produces a float, rendered with a decimal point (`4 / 2` is `2.0`).

use serde_json::{Number, Value};

use crate::error::{GatewayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Values accepted in the `operation` argument
    pub const NAMES: [&'static str; 4] = ["add", "subtract", "multiply", "divide"];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "subtract" => Some(Self::Subtract),
            "multiply" => Some(Self::Multiply),
            "divide" => Some(Self::Divide),
            _ => None,
        }
    }
}

/// Parse the `operation` argument
pub fn parse_operation(value: &Value) -> Result<Operation> {
    match value {
        Value::String(s) => {
            Operation::from_str(s).ok_or_else(|| GatewayError::UnknownOperation(s.clone()))
        }
        other => Err(GatewayError::UnknownOperation(other.to_string())),
    }
}

/// Numeric operand, keeping integers exact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
}

impl Operand {
    /// Read the argument `name` as a JSON number
    pub fn from_value(name: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(Self::from_number(n)),
            other => Err(GatewayError::invalid_argument(
                name,
                format!("expected a number, got {}", other),
            )),
        }
    }

    fn from_number(n: &Number) -> Self {
        match n.as_i64() {
            Some(i) => Self::Int(i),
            None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Self::Int(i) => i == 0,
            Self::Float(f) => f == 0.0,
        }
    }

    /// Text form returned to the caller
    pub fn render(self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => render_float(f),
        }
    }
}

/// Shortest round-trip form, with exponents signed and at least two digits
/// (`1e+16`, `1e-07`)
fn render_float(value: f64) -> String {
    let text = format!("{:?}", value);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// Apply `operation` to `a` and `b`
pub fn evaluate(a: Operand, b: Operand, operation: Operation) -> Result<Operand> {
    if operation == Operation::Divide {
        if b.is_zero() {
            return Err(GatewayError::DivisionByZero);
        }
        return Ok(Operand::Float(a.as_f64() / b.as_f64()));
    }

    if let (Operand::Int(x), Operand::Int(y)) = (a, b) {
        let exact = match operation {
            Operation::Add => x.checked_add(y),
            Operation::Subtract => x.checked_sub(y),
            Operation::Multiply => x.checked_mul(y),
            Operation::Divide => None,
        };
        if let Some(value) = exact {
            return Ok(Operand::Int(value));
        }
    }

    let (x, y) = (a.as_f64(), b.as_f64());
    let value = match operation {
        Operation::Add => x + y,
        Operation::Subtract => x - y,
        Operation::Multiply => x * y,
        Operation::Divide => x / y,
    };
    Ok(Operand::Float(value))
}
