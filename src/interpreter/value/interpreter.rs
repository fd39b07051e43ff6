use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::{
    ast::MathOperation,
    interpreter::value::core::Value,
    util::num::f64_to_i64_checked,
};

/// A number extracted from a dynamic value, keeping its integer or decimal
/// shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// An integral number.
    Long(i64),
    /// A decimal number.
    Double(f64),
}

impl Number {
    /// Returns the number as an `f64`, for ordering and equality.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Long(n) => n as f64,
            Self::Double(d) => d,
        }
    }
}

/// Defines coercion, equality, ordering and arithmetic over dynamic values.
///
/// The interpreter core delegates every value-level decision to this
/// trait, so hosts can swap in their own rules. Implementations must be
/// pure: the same inputs always produce the same outputs.
pub trait ValueInterpreter {
    /// Interprets the value as a boolean.
    fn as_boolean(&self, value: &Value) -> bool;

    /// Interprets the value as a 64-bit integer.
    fn as_long(&self, value: &Value) -> i64;

    /// Interprets the value as a double.
    fn as_double(&self, value: &Value) -> f64;

    /// Interprets the value as a string.
    fn as_string(&self, value: &Value) -> String;

    /// Returns whether the value carries a decimal point, which decides
    /// between the integer and decimal paths of sign flips and arithmetic.
    fn has_decimal_point(&self, value: &Value) -> bool;

    /// Tries to extract a number from the value, preserving its shape.
    fn try_parse_number(&self, value: &Value) -> Option<Number>;

    /// Tests two values for equality. Strict mode disables cross-type
    /// coercion.
    fn are_equal(&self, a: &Value, b: &Value, strict: bool) -> bool;

    /// Compares two values; the sign of the result indicates the ordering
    /// and zero means equal.
    fn compare(&self, a: &Value, b: &Value) -> i32;

    /// Performs an arithmetic operation on two values.
    fn perform_math(&self, a: &Value, b: &Value, operation: MathOperation) -> Value;
}

/// The default value interpretation rules.
///
/// Numbers keep their integer shape as long as both operands are integral
/// and the operation stays within the 64-bit range; everything else is
/// carried out in `f64`. Comparisons parse both sides as numbers, treating
/// non-numeric values as zero, and order them totally.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValueInterpreter;

impl StandardValueInterpreter {
    fn parse_str_number(text: &str) -> Option<Number> {
        if let Ok(long) = text.trim().parse::<i64>() {
            return Some(Number::Long(long));
        }
        text.trim().parse::<f64>().ok().map(Number::Double)
    }

    fn are_equal_loose(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Bool(_), _) | (_, Value::Bool(_)) => self.as_boolean(a) == self.as_boolean(b),
            (Value::Array(x), Value::Array(y)) => {
                x.len() == y.len()
                && x.iter().zip(y.iter()).all(|(u, v)| self.are_equal(u, v, false))
            },
            (Value::Map(x), Value::Map(y)) => {
                x.len() == y.len()
                && x.iter().zip(y.iter()).all(|((ka, va), (kb, vb))| {
                                             ka == kb && self.are_equal(va, vb, false)
                                         })
            },
            _ => {
                if let (Some(x), Some(y)) = (self.try_parse_number(a), self.try_parse_number(b)) {
                    return OrderedFloat(x.as_f64()) == OrderedFloat(y.as_f64());
                }
                self.as_string(a).eq_ignore_ascii_case(&self.as_string(b))
            },
        }
    }

    fn are_equal_strict(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Double(x), Value::Double(y)) => OrderedFloat(*x) == OrderedFloat(*y),
            (Value::Array(x), Value::Array(y)) => {
                x.len() == y.len()
                && x.iter().zip(y.iter()).all(|(u, v)| self.are_equal(u, v, true))
            },
            (Value::Map(x), Value::Map(y)) => {
                x.len() == y.len()
                && x.iter().zip(y.iter()).all(|((ka, va), (kb, vb))| {
                                             ka == kb && self.are_equal(va, vb, true)
                                         })
            },
            // Remaining variants either compare structurally or by identity
            _ => a == b,
        }
    }
}

impl ValueInterpreter for StandardValueInterpreter {
    fn as_boolean(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Long(n) => *n != 0,
            Value::Double(d) => *d != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Function(_) | Value::Object(_) => true,
        }
    }

    fn as_long(&self, value: &Value) -> i64 {
        match value {
            Value::Bool(b) => i64::from(*b),
            Value::Long(n) => *n,
            Value::Double(d) => f64_to_i64_checked(d.trunc()).unwrap_or(0),
            Value::Str(s) => match Self::parse_str_number(s) {
                Some(Number::Long(n)) => n,
                Some(Number::Double(d)) => f64_to_i64_checked(d.trunc()).unwrap_or(0),
                None => 0,
            },
            _ => 0,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_double(&self, value: &Value) -> f64 {
        match value {
            Value::Bool(b) => f64::from(*b),
            Value::Long(n) => *n as f64,
            Value::Double(d) => *d,
            Value::Str(s) => Self::parse_str_number(s).map_or(0.0, Number::as_f64),
            _ => 0.0,
        }
    }

    fn as_string(&self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn has_decimal_point(&self, value: &Value) -> bool {
        match value {
            Value::Double(_) => true,
            Value::Str(s) => s.contains('.') && matches!(Self::parse_str_number(s), Some(Number::Double(_))),
            _ => false,
        }
    }

    fn try_parse_number(&self, value: &Value) -> Option<Number> {
        match value {
            Value::Bool(b) => Some(Number::Long(i64::from(*b))),
            Value::Long(n) => Some(Number::Long(*n)),
            Value::Double(d) => Some(Number::Double(*d)),
            Value::Str(s) => Self::parse_str_number(s),
            _ => None,
        }
    }

    fn are_equal(&self, a: &Value, b: &Value, strict: bool) -> bool {
        if strict {
            self.are_equal_strict(a, b)
        } else {
            self.are_equal_loose(a, b)
        }
    }

    fn compare(&self, a: &Value, b: &Value) -> i32 {
        // Absent numbers count as zero
        let a = self.try_parse_number(a).map_or(0.0, Number::as_f64);
        let b = self.try_parse_number(b).map_or(0.0, Number::as_f64);

        match OrderedFloat(a).cmp(&OrderedFloat(b)) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    fn perform_math(&self, a: &Value, b: &Value, operation: MathOperation) -> Value {
        // Integer path while both operands are integral and the result fits
        if !self.has_decimal_point(a) && !self.has_decimal_point(b) {
            let x = self.as_long(a);
            let y = self.as_long(b);

            let result = match operation {
                MathOperation::Add => x.checked_add(y),
                MathOperation::Sub => x.checked_sub(y),
                MathOperation::Mul => x.checked_mul(y),
                MathOperation::Div => x.checked_div(y),
                MathOperation::Mod => x.checked_rem(y),
                MathOperation::Pow => u32::try_from(y).ok().and_then(|e| x.checked_pow(e)),
            };

            if let Some(result) = result {
                return Value::Long(result);
            }
        }

        let x = self.as_double(a);
        let y = self.as_double(b);

        let result = match operation {
            MathOperation::Add => x + y,
            MathOperation::Sub => x - y,
            MathOperation::Mul => x * y,
            MathOperation::Div => x / y,
            MathOperation::Mod => x % y,
            MathOperation::Pow => x.powf(y),
        };

        Value::Double(result)
    }
}
