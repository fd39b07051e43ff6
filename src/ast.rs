/// A zero-based source location, as tracked by the tokenizer cursor.
///
/// Rows and columns start at zero internally; the `Display` implementation
/// renders them one-based, which is what error messages show to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Zero-based row within the source text.
    pub row: usize,
    /// Zero-based column within the row.
    pub col: usize,
}

impl Position {
    /// Creates a position from a zero-based row and column.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the one-based line number.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.row + 1
    }

    /// Returns the one-based column number.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.col + 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line(), self.column())
    }
}

/// The source range covered by an expression, from the position of its first
/// token to the position of its last one. Carried by every AST node so that
/// runtime errors can point back into the raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Position of the first token of the expression.
    pub head: Position,
    /// Position of the last token of the expression.
    pub tail: Position,
}

impl Span {
    /// Creates a span from a head and a tail position.
    #[must_use]
    pub const fn new(head: Position, tail: Position) -> Self {
        Self { head, tail }
    }

    /// Creates a span covering a single position.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self { head: position,
               tail: position, }
    }

    /// Creates the span from one expression's head to another's tail.
    #[must_use]
    pub const fn across(head: Self, tail: Self) -> Self {
        Self { head: head.head,
               tail: tail.tail, }
    }
}

/// Represents an arithmetic operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MathOperation {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Exponentiation (`^`)
    Pow,
}

impl std::fmt::Display for MathOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
        };
        write!(f, "{operator}")
    }
}

/// Represents an ordering comparison.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ComparisonOperation {
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessThanOrEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterThanOrEqual,
}

impl std::fmt::Display for ComparisonOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        };
        write!(f, "{operator}")
    }
}

/// Represents an equality test. The exact variants disable cross-type
/// coercion inside the value interpreter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EqualityOperation {
    /// Coercing equality (`==`)
    Equal,
    /// Coercing inequality (`!=`)
    NotEqual,
    /// Exact equality (`===`)
    EqualExact,
    /// Exact inequality (`!==`)
    NotEqualExact,
}

impl std::fmt::Display for EqualityOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::EqualExact => "===",
            Self::NotEqualExact => "!==",
        };
        write!(f, "{operator}")
    }
}

/// A keyword literal: `true`, `false` or `null`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    /// The `true` literal.
    True,
    /// The `false` literal.
    False,
    /// The `null` literal.
    Null,
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let literal = match self {
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        };
        write!(f, "{literal}")
    }
}

/// A single argument of a function invocation, positional or named.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationArgument {
    /// The argument value expression.
    pub value: Expr,
    /// The declared argument this value binds to, if the argument was named.
    pub name:  Option<String>,
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// `Expr` covers every construct of the expression language, from literals
/// and identifiers to binary operators, optional member access and indexing,
/// function invocations with named arguments, callbacks, and conditionals.
/// The tree is immutable after parsing and can be evaluated any number of
/// times, concurrently if each evaluation brings its own environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A whole parsed program: one or more expressions evaluated in order.
    Program {
        /// The expressions, in source order. Never empty.
        lines: Vec<Expr>,
        /// Source range of the node.
        span:  Span,
    },
    /// A 64-bit integer literal, such as `42` or `3e2`.
    Long {
        /// The literal value.
        value: i64,
        /// Source range of the node.
        span:  Span,
    },
    /// A double-precision literal, such as `3.14` or `.5`.
    Double {
        /// The literal value.
        value: f64,
        /// Source range of the node.
        span:  Span,
    },
    /// A string literal.
    Str {
        /// The literal value, with escapes already resolved.
        value: String,
        /// Source range of the node.
        span:  Span,
    },
    /// A keyword literal: `true`, `false` or `null`.
    Literal {
        /// Which literal was written.
        value: LiteralValue,
        /// Source range of the node.
        span:  Span,
    },
    /// Reference to a variable by name. Resolution is case-insensitive, but
    /// the lexeme is preserved verbatim.
    Identifier {
        /// Name of the variable as written.
        name: String,
        /// Source range of the node.
        span: Span,
    },
    /// An arithmetic operation.
    Math {
        /// Left operand.
        lhs:       Box<Expr>,
        /// Right operand.
        rhs:       Box<Expr>,
        /// The operation to perform.
        operation: MathOperation,
        /// Source range of the node.
        span:      Span,
    },
    /// An ordering comparison.
    Comparison {
        /// Left operand.
        lhs:       Box<Expr>,
        /// Right operand.
        rhs:       Box<Expr>,
        /// The comparison to perform.
        operation: ComparisonOperation,
        /// Source range of the node.
        span:      Span,
    },
    /// An equality test.
    Equality {
        /// Left operand.
        lhs:       Box<Expr>,
        /// Right operand.
        rhs:       Box<Expr>,
        /// The equality variant to apply.
        operation: EqualityOperation,
        /// Source range of the node.
        span:      Span,
    },
    /// Boolean conjunction (`&&`). Both sides are always evaluated.
    Conjunction {
        /// Left operand.
        lhs:  Box<Expr>,
        /// Right operand.
        rhs:  Box<Expr>,
        /// Source range of the node.
        span: Span,
    },
    /// Boolean disjunction (`||`). Both sides are always evaluated.
    Disjunction {
        /// Left operand.
        lhs:  Box<Expr>,
        /// Right operand.
        rhs:  Box<Expr>,
        /// Source range of the node.
        span: Span,
    },
    /// String concatenation (`&`).
    Concatenation {
        /// Left operand.
        lhs:  Box<Expr>,
        /// Right operand.
        rhs:  Box<Expr>,
        /// Source range of the node.
        span: Span,
    },
    /// Null coalescing (`??`). The right side is only evaluated when the
    /// left side is null.
    NullCoalesce {
        /// The value to try first.
        lhs:  Box<Expr>,
        /// The fallback value.
        rhs:  Box<Expr>,
        /// Source range of the node.
        span: Span,
    },
    /// Binds a value to a new name within the current evaluation
    /// (`name = value`). The target must be a bare identifier.
    Assignment {
        /// The identifier being bound.
        name:  String,
        /// The value expression.
        value: Box<Expr>,
        /// Source range of the node.
        span:  Span,
    },
    /// Member access (`lhs.field` or `lhs?.field`).
    MemberAccess {
        /// The container expression.
        lhs:      Box<Expr>,
        /// The member selector; an identifier contributes its symbol, any
        /// other expression is evaluated and coerced to a string.
        rhs:      Box<Expr>,
        /// Whether a missing member yields null instead of an error.
        optional: bool,
        /// Source range of the node.
        span:     Span,
    },
    /// Indexing (`lhs[rhs]` or `lhs?[rhs]`).
    Index {
        /// The indexed expression.
        lhs:      Box<Expr>,
        /// The index or key expression.
        rhs:      Box<Expr>,
        /// Whether a missing element yields null instead of an error.
        optional: bool,
        /// Source range of the node.
        span:     Span,
    },
    /// Logical negation (`!input`).
    Invert {
        /// The operand expression.
        input: Box<Expr>,
        /// Source range of the node.
        span:  Span,
    },
    /// Numeric sign flip (`-input`).
    FlipSign {
        /// The operand expression.
        input: Box<Expr>,
        /// Source range of the node.
        span:  Span,
    },
    /// A function invocation (`callee(args)` or `callee?(args)`).
    FunctionInvocation {
        /// The expression being invoked; usually an identifier, but any
        /// callable-producing expression (such as a parenthesized callback)
        /// is accepted.
        callee:    Box<Expr>,
        /// The arguments, in source order.
        arguments: Vec<InvocationArgument>,
        /// Whether an unresolved callee yields null instead of an error.
        optional:  bool,
        /// Source range of the node.
        span:      Span,
    },
    /// A callback definition (`(a, b) -> body`), evaluating to a callable
    /// value that captures the defining environment.
    Callback {
        /// The parameter names, in order.
        signature: Vec<String>,
        /// The body expression.
        body:      Box<Expr>,
        /// Source range of the node.
        span:      Span,
    },
    /// A conditional (`if condition then positive else negative`). Only the
    /// selected branch is evaluated.
    IfThenElse {
        /// The condition expression, coerced to a boolean.
        condition: Box<Expr>,
        /// The branch taken when the condition holds.
        positive:  Box<Expr>,
        /// The branch taken otherwise.
        negative:  Box<Expr>,
        /// Source range of the node.
        span:      Span,
    },
}

impl Expr {
    /// Gets the source span from `self`.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Program { span, .. }
            | Self::Long { span, .. }
            | Self::Double { span, .. }
            | Self::Str { span, .. }
            | Self::Literal { span, .. }
            | Self::Identifier { span, .. }
            | Self::Math { span, .. }
            | Self::Comparison { span, .. }
            | Self::Equality { span, .. }
            | Self::Conjunction { span, .. }
            | Self::Disjunction { span, .. }
            | Self::Concatenation { span, .. }
            | Self::NullCoalesce { span, .. }
            | Self::Assignment { span, .. }
            | Self::MemberAccess { span, .. }
            | Self::Index { span, .. }
            | Self::Invert { span, .. }
            | Self::FlipSign { span, .. }
            | Self::FunctionInvocation { span, .. }
            | Self::Callback { span, .. }
            | Self::IfThenElse { span, .. } => *span,
        }
    }

    /// Renders the expression back into parseable source text.
    ///
    /// Binary operations are fully parenthesized, so the output may differ
    /// textually from the original source, but re-parsing it yields an
    /// equivalent tree.
    ///
    /// # Example
    /// ```
    /// let program = exprima::parse("1 + 2 * 3").unwrap();
    /// assert_eq!(program.expressionify(), "(1 + (2 * 3))");
    /// ```
    #[must_use]
    pub fn expressionify(&self) -> String {
        match self {
            Self::Program { lines, .. } => lines.iter()
                                                .map(Self::expressionify)
                                                .collect::<Vec<_>>()
                                                .join("\n"),
            Self::Long { value, .. } => value.to_string(),
            Self::Double { value, .. } => format!("{value:?}"),
            Self::Str { value, .. } => format!("\"{}\"", value.replace('"', "\\\"")),
            Self::Literal { value, .. } => value.to_string(),
            Self::Identifier { name, .. } => name.clone(),
            Self::Math { lhs, rhs, operation, .. } => {
                format!("({} {} {})", lhs.expressionify(), operation, rhs.expressionify())
            },
            Self::Comparison { lhs, rhs, operation, .. } => {
                format!("({} {} {})", lhs.expressionify(), operation, rhs.expressionify())
            },
            Self::Equality { lhs, rhs, operation, .. } => {
                format!("({} {} {})", lhs.expressionify(), operation, rhs.expressionify())
            },
            Self::Conjunction { lhs, rhs, .. } => {
                format!("({} && {})", lhs.expressionify(), rhs.expressionify())
            },
            Self::Disjunction { lhs, rhs, .. } => {
                format!("({} || {})", lhs.expressionify(), rhs.expressionify())
            },
            Self::Concatenation { lhs, rhs, .. } => {
                format!("({} & {})", lhs.expressionify(), rhs.expressionify())
            },
            Self::NullCoalesce { lhs, rhs, .. } => {
                format!("({} ?? {})", lhs.expressionify(), rhs.expressionify())
            },
            Self::Assignment { name, value, .. } => {
                format!("({} = {})", name, value.expressionify())
            },
            Self::MemberAccess { lhs, rhs, optional, .. } => {
                let operator = if *optional { "?." } else { "." };
                format!("{}{}{}", lhs.expressionify(), operator, rhs.expressionify())
            },
            Self::Index { lhs, rhs, optional, .. } => {
                let operator = if *optional { "?[" } else { "[" };
                format!("{}{}{}]", lhs.expressionify(), operator, rhs.expressionify())
            },
            Self::Invert { input, .. } => format!("!({})", input.expressionify()),
            Self::FlipSign { input, .. } => format!("-({})", input.expressionify()),
            Self::FunctionInvocation { callee,
                                       arguments,
                                       optional,
                                       .. } => {
                let rendered = arguments.iter()
                                        .map(|argument| match &argument.name {
                                            Some(name) => {
                                                format!("{} = {}",
                                                        name,
                                                        argument.value.expressionify())
                                            },
                                            None => argument.value.expressionify(),
                                        })
                                        .collect::<Vec<_>>()
                                        .join(", ");
                let operator = if *optional { "?(" } else { "(" };
                let callee_text = match callee.as_ref() {
                    Self::Identifier { .. } => callee.expressionify(),
                    other => format!("({})", other.expressionify()),
                };
                format!("{callee_text}{operator}{rendered})")
            },
            Self::Callback { signature, body, .. } => {
                format!("({}) -> {}", signature.join(", "), body.expressionify())
            },
            Self::IfThenElse { condition,
                               positive,
                               negative,
                               .. } => {
                format!("if {} then {} else {}",
                        condition.expressionify(),
                        positive.expressionify(),
                        negative.expressionify())
            },
        }
    }
}
