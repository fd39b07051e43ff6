use std::{collections::BTreeMap, rc::Rc};

use crate::interpreter::function::ExpressionFunction;

/// Field access over host-provided objects.
///
/// The interpreter never reflects over host types; values that want to be
/// usable on the left side of a member access implement this trait instead.
/// Lookups are case-insensitive: implementations receive the field name as
/// written in the source and are expected to match it without regard to
/// case.
pub trait ObjectView {
    /// Returns the field's value, or `None` when the object carries no
    /// field of that name.
    fn get_field(&self, name: &str) -> Option<Value>;
}

/// Represents a runtime value of the expression language.
///
/// Collection variants share their backing storage through `Rc`, so values
/// are cheap to clone and safe to hand out of evaluations. Callables and
/// object views compare by identity.
#[derive(Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit integer value.
    Long(i64),
    /// A double-precision floating-point value.
    Double(f64),
    /// A string value.
    Str(String),
    /// An ordered sequence of values.
    Array(Rc<Vec<Value>>),
    /// A mapping from string keys to values.
    Map(Rc<BTreeMap<String, Value>>),
    /// A callable value: a callback defined in an expression, or a function
    /// supplied by the host.
    Function(Rc<dyn ExpressionFunction>),
    /// A host object accessible through member syntax.
    Object(Rc<dyn ObjectView>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(v))
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(v: BTreeMap<String, Self>) -> Self {
        Self::Map(Rc::new(v))
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`](Self::Null).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is callable.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function(..))
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Self::Double(d) => f.debug_tuple("Double").field(d).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Array(a) => f.debug_tuple("Array").field(a).finish(),
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Self::Function(_) => write!(f, "Function(..)"),
            Self::Object(_) => write!(f, "Object(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Array(a) => {
                write!(f, "[")?;

                for (index, value) in a.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }

                write!(f, "]")
            },
            Self::Map(m) => {
                write!(f, "{{")?;

                for (index, (key, value)) in m.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }

                write!(f, "}}")
            },
            Self::Function(_) => write!(f, "<function>"),
            Self::Object(_) => write!(f, "<object>"),
        }
    }
}
