//! Kind tags for AST nodes and operators
//!
//! Every kind enum carries an explicit name table generated by
//! [`named_kinds!`], so names never depend on runtime introspection.

/// Declares a fieldless kind enum together with its name table
///
/// Each variant maps to its display name and, optionally, to the source
/// symbol of the operator it stands for.
#[macro_export]
macro_rules! named_kinds {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in declaration order
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub const fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($label:literal, $symbol:literal) ),+ $(,)?
        }
    ) => {
        $crate::named_kinds! {
            $(#[$meta])*
            $vis enum $name {
                $( $(#[$vmeta])* $variant => $label ),+
            }
        }

        impl $name {
            /// The operator as written in CEL source
            pub const fn symbol(self) -> &'static str {
                match self {
                    $( $name::$variant => $symbol ),+
                }
            }
        }
    };
}

named_kinds! {
    /// Tag identifying the variant of a [`crate::ast::Node`]
    pub enum NodeKind {
        Clause => "CLAUSE",
        Assertion => "ASSERTION",
        Throw => "THROW",
        Imply => "IMPLY",
        ConditionalOp => "CONDITIONAL_OP",
        LogicalOp => "LOGICAL_OP",
        BitwiseOp => "BITWISE_OP",
        EqualityOp => "EQUALITY_OP",
        RelationalOp => "RELATIONAL_OP",
        ShiftOp => "SHIFT_OP",
        ArithmeticOp => "ARITHMETIC_OP",
        UnaryOp => "UNARY_OP",
        IdReference => "ID_REFERENCE",
        MethodCall => "METHOD_CALL",
        ArrayAccess => "ARRAY_ACCESS",
        Literal => "LITERAL",
        Blank => "BLANK",
        IfExpression => "IF_EXPRESSION",
    }
}

named_kinds! {
    pub enum LogicalKind {
        Or => ("OR", "||"),
        And => ("AND", "&&"),
    }
}

named_kinds! {
    pub enum BitwiseKind {
        Or => ("OR", "|"),
        Xor => ("XOR", "^"),
        And => ("AND", "&"),
    }
}

named_kinds! {
    pub enum EqualityKind {
        Equal => ("EQUAL", "=="),
        NotEqual => ("NOT_EQUAL", "!="),
    }
}

named_kinds! {
    pub enum RelationalKind {
        Gt => ("GT", ">"),
        Ge => ("GE", ">="),
        Lt => ("LT", "<"),
        Le => ("LE", "<="),
    }
}

named_kinds! {
    pub enum ShiftKind {
        Left => ("LEFT", "<<"),
        Right => ("RIGHT", ">>"),
        UnsignedRight => ("UNSIGNED_RIGHT", ">>>"),
    }
}

named_kinds! {
    pub enum ArithmeticKind {
        Add => ("ADD", "+"),
        Sub => ("SUB", "-"),
        Mul => ("MUL", "*"),
        Div => ("DIV", "/"),
        Mod => ("MOD", "%"),
    }
}

named_kinds! {
    pub enum UnaryKind {
        Pos => ("POS", "+"),
        Neg => ("NEG", "-"),
        BitwiseNot => ("BITWISE_NOT", "~"),
        LogicalNot => ("LOGICAL_NOT", "!"),
    }
}

named_kinds! {
    /// Type of a literal value
    pub enum LiteralKind {
        Int => "INT",
        Long => "LONG",
        Float => "FLOAT",
        Double => "DOUBLE",
        Boolean => "BOOLEAN",
        String => "STRING",
        Char => "CHAR",
        Null => "NULL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_tables_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.name()), Some(*kind));
        }
        for kind in LiteralKind::ALL {
            assert_eq!(LiteralKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(RelationalKind::from_name("GE"), Some(RelationalKind::Ge));
        assert_eq!(RelationalKind::from_name("ge"), None);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(ShiftKind::UnsignedRight.symbol(), ">>>");
        assert_eq!(UnaryKind::LogicalNot.symbol(), "!");
        assert_eq!(LogicalKind::And.to_string(), "AND");

        let symbols: Vec<_> = ArithmeticKind::ALL.iter().map(|k| k.symbol()).collect();
        assert_eq!(symbols, vec!["+", "-", "*", "/", "%"]);
    }
}
