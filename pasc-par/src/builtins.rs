//! The fixed table of predeclared identifiers (spec.md §3.1 "Builtin").
//!
//! These never appear as declarations in source; the parser consults
//! this table only after a name lookup through the user's block chain
//! has failed, so a user declaration of the same name always shadows it.

use pasc_util::Symbol;

use crate::types::{Type, TypeKind};

pub struct BuiltinType {
    pub name: &'static str,
    pub ty: Type,
}

pub fn builtin_types() -> Vec<BuiltinType> {
    vec![
        BuiltinType { name: "integer", ty: Type::integer() },
        BuiltinType { name: "real", ty: Type::real() },
        BuiltinType { name: "boolean", ty: Type::boolean() },
        BuiltinType { name: "char", ty: Type::char() },
        BuiltinType { name: "string", ty: Type::string() },
        BuiltinType { name: "text", ty: Type::text() },
    ]
}

/// `false` and `true`, the two values of the builtin boolean enumeration
/// (spec.md §3.1); consulted by `find_enum_value` once user scopes miss.
pub fn builtin_enum_value(name: Symbol) -> Option<(&'static str, usize)> {
    match name.as_str() {
        "false" => Some(("boolean", 0)),
        "true" => Some(("boolean", 1)),
        _ => None,
    }
}

pub struct BuiltinConstant {
    pub name: &'static str,
    pub ty: Type,
}

pub fn builtin_constants() -> Vec<BuiltinConstant> {
    vec![
        BuiltinConstant { name: "maxint", ty: Type::integer() },
        BuiltinConstant { name: "nil", ty: Type::nil_pointer() },
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinProc {
    Read,
    Readln,
    Write,
    Writeln,
    New,
    Dispose,
    Pack,
    Unpack,
    Get,
    Put,
    Reset,
    Rewrite,
    Inc,
    Dec,
}

/// Builtin procedures take a variadic or context-sensitive actual list
/// (e.g. `write`'s formatted arguments, `read`'s var-parameter list), so
/// unlike user routines they are validated by bespoke parser logic rather
/// than a fixed `Vec<FormalParameter>` (spec.md §4.2 "Procedure statement").
pub fn builtin_procedure(name: Symbol) -> Option<BuiltinProc> {
    use BuiltinProc::*;
    Some(match name.as_str() {
        "read" => Read,
        "readln" => Readln,
        "write" => Write,
        "writeln" => Writeln,
        "new" => New,
        "dispose" => Dispose,
        "pack" => Pack,
        "unpack" => Unpack,
        "get" => Get,
        "put" => Put,
        "reset" => Reset,
        "rewrite" => Rewrite,
        "inc" => Inc,
        "dec" => Dec,
        _ => return None,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinFunc {
    Abs,
    Arctan,
    Cos,
    Exp,
    Frac,
    Int,
    Ln,
    Pi,
    Sin,
    Sqr,
    Sqrt,
    Trunc,
    Round,
    Chr,
    Ord,
    Odd,
    Succ,
    Pred,
    Length,
    Eof,
    Eoln,
}

pub fn builtin_function(name: Symbol) -> Option<BuiltinFunc> {
    use BuiltinFunc::*;
    Some(match name.as_str() {
        "abs" => Abs,
        "arctan" => Arctan,
        "cos" => Cos,
        "exp" => Exp,
        "frac" => Frac,
        "int" => Int,
        "ln" => Ln,
        "pi" => Pi,
        "sin" => Sin,
        "sqr" => Sqr,
        "sqrt" => Sqrt,
        "trunc" => Trunc,
        "round" => Round,
        "chr" => Chr,
        "ord" => Ord,
        "odd" => Odd,
        "succ" => Succ,
        "pred" => Pred,
        "length" => Length,
        "eof" => Eof,
        "eoln" => Eoln,
        _ => return None,
    })
}

impl BuiltinFunc {
    /// One required-argument arity for every builtin function; none of
    /// them is variadic (spec.md §3.1).
    pub fn arity(self) -> usize {
        use BuiltinFunc::*;
        match self {
            Pi | Eof | Eoln => 0,
            _ => 1,
        }
    }

    /// The result type given the single argument's type, or an error
    /// phrase if the argument's type doesn't fit this function (spec.md
    /// §4.2 error phrases).
    pub fn result_type(self, arg: Option<&Type>) -> Result<Type, String> {
        use BuiltinFunc::*;
        match self {
            Pi => Ok(Type::real()),
            Eof | Eoln => Ok(Type::boolean()),
            Abs | Sqr => {
                let arg = arg.expect("checked by caller against arity()");
                if matches!(*arg.kind, TypeKind::Real) {
                    Ok(Type::real())
                } else if arg.is_integer_like() {
                    Ok(Type::integer())
                } else {
                    Err(format!("{} expects a numeric argument, got {} instead", self.name(), arg.type_string()))
                }
            }
            Arctan | Cos | Exp | Ln | Sin | Sqrt | Frac => {
                let arg = arg.expect("checked by caller against arity()");
                if matches!(*arg.kind, TypeKind::Real) || arg.is_integer_like() {
                    Ok(Type::real())
                } else {
                    Err(format!("{} expects a numeric argument, got {} instead", self.name(), arg.type_string()))
                }
            }
            Int | Trunc | Round => {
                let arg = arg.expect("checked by caller against arity()");
                if matches!(*arg.kind, TypeKind::Real) || arg.is_integer_like() {
                    Ok(if self == Int { Type::real() } else { Type::integer() })
                } else {
                    Err(format!("{} expects a numeric argument, got {} instead", self.name(), arg.type_string()))
                }
            }
            Chr => {
                let arg = arg.expect("checked by caller against arity()");
                if arg.is_integer_like() {
                    Ok(Type::char())
                } else {
                    Err(format!("chr expects an integer argument, got {} instead", arg.type_string()))
                }
            }
            Ord => {
                let arg = arg.expect("checked by caller against arity()");
                if arg.is_ordinal() {
                    Ok(Type::integer())
                } else {
                    Err(format!("ord expects an ordinal argument, got {} instead", arg.type_string()))
                }
            }
            Odd => {
                let arg = arg.expect("checked by caller against arity()");
                if arg.is_integer_like() {
                    Ok(Type::boolean())
                } else {
                    Err(format!("odd expects an integer argument, got {} instead", arg.type_string()))
                }
            }
            Succ | Pred => {
                let arg = arg.expect("checked by caller against arity()");
                if arg.is_ordinal() {
                    Ok(arg.clone())
                } else {
                    Err(format!("{} expects an ordinal argument, got {} instead", self.name(), arg.type_string()))
                }
            }
            Length => {
                let arg = arg.expect("checked by caller against arity()");
                if matches!(*arg.kind, TypeKind::String) {
                    Ok(Type::integer())
                } else {
                    Err(format!("length expects a string argument, got {} instead", arg.type_string()))
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        use BuiltinFunc::*;
        match self {
            Abs => "abs",
            Arctan => "arctan",
            Cos => "cos",
            Exp => "exp",
            Frac => "frac",
            Int => "int",
            Ln => "ln",
            Pi => "pi",
            Sin => "sin",
            Sqr => "sqr",
            Sqrt => "sqrt",
            Trunc => "trunc",
            Round => "round",
            Chr => "chr",
            Ord => "ord",
            Odd => "odd",
            Succ => "succ",
            Pred => "pred",
            Length => "length",
            Eof => "eof",
            Eoln => "eoln",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_matches_argument_count_expectations() {
        assert_eq!(BuiltinFunc::Pi.arity(), 0);
        assert_eq!(BuiltinFunc::Abs.arity(), 1);
    }

    #[test]
    fn abs_of_real_is_real_of_integer_is_integer() {
        assert!(BuiltinFunc::Abs.result_type(Some(&Type::real())).unwrap().equals(&Type::real()));
        assert!(BuiltinFunc::Abs.result_type(Some(&Type::integer())).unwrap().equals(&Type::integer()));
    }

    #[test]
    fn ord_rejects_non_ordinal() {
        assert!(BuiltinFunc::Ord.result_type(Some(&Type::real())).is_err());
    }

    #[test]
    fn builtin_procedure_lookup_is_case_sensitive_to_folded_symbols() {
        assert_eq!(builtin_procedure(Symbol::intern("writeln")), Some(BuiltinProc::Writeln));
        assert_eq!(builtin_procedure(Symbol::intern("nonsense")), None);
    }
}
