//! The type model (spec.md §3.3, §4.3).
//!
//! `Type` is a cheaply cloneable handle (`Rc<TypeKind>` plus an optional
//! name). The two spots spec.md documents as mutable after construction —
//! a pointer's forward-referenced target, and an empty-set literal's
//! element type — are modeled as `Rc<RefCell<Option<Type>>>` cells that
//! are filled in exactly once (spec.md §5, "write-once").

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pasc_util::Symbol;

/// A write-once forward-reference cell.
pub type Cell = Rc<RefCell<Option<Type>>>;

pub fn empty_cell() -> Cell {
    Rc::new(RefCell::new(None))
}

pub fn filled_cell(ty: Type) -> Cell {
    Rc::new(RefCell::new(Some(ty)))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormalParameter {
    pub name: Symbol,
    pub ty: Type,
    /// `var` parameter: the actual must be a variable expression.
    pub by_reference: bool,
}

#[derive(Clone, Debug)]
pub struct VariantArm {
    pub labels: Vec<crate::expr::ConstantValue>,
    pub fields: Box<TypeKind>, // always TypeKind::Record
}

#[derive(Clone, Debug)]
pub struct VariantPart {
    pub tag_field: Option<Symbol>,
    pub tag_type: Type,
    pub arms: Vec<VariantArm>,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Text,
    Subrange { lower: i64, upper: i64, base: Box<Type> },
    Enum { identifiers: Vec<Symbol> },
    Pointer { target_name: Option<Symbol>, target: Cell },
    Array { index_types: Vec<Type>, element: Box<Type>, packed: bool },
    Record { fixed_fields: Vec<(Symbol, Type)>, variant: Option<VariantPart>, packed: bool },
    Set { element: Cell, packed: bool },
    File { element: Box<Type>, packed: bool },
    Procedure { formals: Vec<FormalParameter> },
    Function { formals: Vec<FormalParameter>, ret: Box<Type> },
}

/// A type value: a structural payload (`kind`) plus an optional declared
/// alias (`name`), per spec.md §3.3. `name` is ignored by [`Type::equals`]
/// but used when printing, to avoid infinite recursion on recursive types.
#[derive(Clone, Debug)]
pub struct Type {
    pub kind: Rc<TypeKind>,
    pub name: Option<Symbol>,
}

// Structural, name-ignoring equality: delegates to `equals` so that
// `FormalParameter`'s derived `PartialEq` (needed for signature matching
// in scope lookups) compares types the same way the rest of the analyzer
// does.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Type {}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind: Rc::new(kind), name: None }
    }

    pub fn integer() -> Self {
        Self::new(TypeKind::Integer)
    }
    pub fn real() -> Self {
        Self::new(TypeKind::Real)
    }
    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }
    pub fn char() -> Self {
        Self::new(TypeKind::Char)
    }
    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }
    pub fn text() -> Self {
        Self::new(TypeKind::Text)
    }

    /// A pointer value with no declared target and no name: the "nil"
    /// literal's type, compatible with every pointer type (spec.md §3.3).
    pub fn nil_pointer() -> Self {
        Self::new(TypeKind::Pointer { target_name: None, target: empty_cell() })
    }

    /// Returns a copy of `self` with `name` attached.
    pub fn named(&self, name: Symbol) -> Self {
        Self { kind: self.kind.clone(), name: Some(name) }
    }

    pub fn type_name(&self) -> Option<Symbol> {
        self.name
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(
            *self.kind,
            TypeKind::Integer | TypeKind::Boolean | TypeKind::Char | TypeKind::Subrange { .. } | TypeKind::Enum { .. }
        )
    }

    pub fn is_integer_like(&self) -> bool {
        matches!(*self.kind, TypeKind::Integer) || matches!(&*self.kind, TypeKind::Subrange { base, .. } if base.is_integer_like())
    }

    pub fn is_set(&self) -> bool {
        matches!(*self.kind, TypeKind::Set { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(*self.kind, TypeKind::Pointer { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(*self.kind, TypeKind::Array { .. })
    }

    pub fn is_record(&self) -> bool {
        matches!(*self.kind, TypeKind::Record { .. })
    }

    /// Structural equality, ignoring declared names (spec.md §3.3).
    pub fn equals(&self, other: &Type) -> bool {
        Self::kinds_equal(&self.kind, &other.kind)
    }

    fn kinds_equal(a: &TypeKind, b: &TypeKind) -> bool {
        use TypeKind::*;
        match (a, b) {
            (Integer, Integer)
            | (Real, Real)
            | (Boolean, Boolean)
            | (Char, Char)
            | (String, String)
            | (Text, Text) => true,
            (Subrange { lower: l1, upper: u1, base: b1 }, Subrange { lower: l2, upper: u2, base: b2 }) => {
                l1 == l2 && u1 == u2 && b1.equals(b2)
            }
            (Enum { identifiers: i1 }, Enum { identifiers: i2 }) => i1 == i2,
            (
                Pointer { target_name: n1, target: t1 },
                Pointer { target_name: n2, target: t2 },
            ) => {
                if n1.is_none() && n2.is_none() {
                    return true; // both "nil" pointers
                }
                n1 == n2
                    || match (t1.borrow().as_ref(), t2.borrow().as_ref()) {
                        (Some(x), Some(y)) => x.equals(y),
                        _ => false,
                    }
            }
            (
                Array { index_types: i1, element: e1, packed: p1 },
                Array { index_types: i2, element: e2, packed: p2 },
            ) => {
                p1 == p2
                    && i1.len() == i2.len()
                    && i1.iter().zip(i2).all(|(x, y)| x.equals(y))
                    && e1.equals(e2)
            }
            (
                Record { fixed_fields: f1, variant: v1, packed: p1 },
                Record { fixed_fields: f2, variant: v2, packed: p2 },
            ) => {
                p1 == p2
                    && f1.len() == f2.len()
                    && f1.iter().zip(f2).all(|((n1, t1), (n2, t2))| n1 == n2 && t1.equals(t2))
                    && match (v1, v2) {
                        (None, None) => true,
                        (Some(a), Some(b)) => {
                            a.tag_field == b.tag_field
                                && a.tag_type.equals(&b.tag_type)
                                && a.arms.len() == b.arms.len()
                                && a.arms.iter().zip(&b.arms).all(|(x, y)| Self::kinds_equal(&x.fields, &y.fields))
                        }
                        _ => false,
                    }
            }
            (Set { element: e1, packed: p1 }, Set { element: e2, packed: p2 }) => {
                p1 == p2
                    && match (e1.borrow().as_ref(), e2.borrow().as_ref()) {
                        (Some(x), Some(y)) => x.equals(y),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (File { element: e1, packed: p1 }, File { element: e2, packed: p2 }) => p1 == p2 && e1.equals(e2),
            (Procedure { formals: f1 }, Procedure { formals: f2 }) => formals_equal(f1, f2),
            (Function { formals: f1, ret: r1 }, Function { formals: f2, ret: r2 }) => {
                formals_equal(f1, f2) && r1.equals(r2)
            }
            _ => false,
        }
    }

    /// Broader-than-equality assignment compatibility (spec.md §3.3).
    /// Does not perform the two context-sensitive narrowings (empty-set
    /// element fixing; char <- length-1 string literal) — those are
    /// applied by the caller before/after this check since they require
    /// knowledge of whether the right side is a literal.
    pub fn assignable_from(&self, other: &Type) -> bool {
        if self.equals(other) {
            return true;
        }
        use TypeKind::*;
        match (&*self.kind, &*other.kind) {
            (Integer, Integer) => true,
            (Real, Integer) | (Real, Real) => true,
            (Integer, Subrange { base, .. }) | (Subrange { base, .. }, Integer) => base.is_integer_like(),
            (Subrange { base: b1, .. }, Subrange { base: b2, .. }) => b1.is_integer_like() && b2.is_integer_like(),
            (Set { element: e1, .. }, Set { element: e2, .. }) => match (e1.borrow().as_ref(), e2.borrow().as_ref()) {
                (Some(x), Some(y)) => x.equals(y),
                (Some(_), None) => true, // empty-set literal; caller fixes e2
                _ => false,
            },
            (Pointer { .. }, Pointer { target_name, .. }) if target_name.is_none() => true, // other is nil
            // A packed array of char is never assignable from a bare `String`
            // type here: the only string that may ever fit is a literal of
            // exactly matching length, which `assignment_compatible` checks
            // itself (it has the literal in hand; this method only has types).
            (Array { .. }, String) => false,
            _ => false,
        }
    }

    /// Whether this is a pointer with an unresolved, unnamed target —
    /// i.e. the synthetic type of the `nil` literal.
    pub fn is_nil(&self) -> bool {
        matches!(&*self.kind, TypeKind::Pointer { target_name: None, target } if target.borrow().is_none())
    }

    pub fn type_string(&self) -> String {
        if let Some(name) = self.name {
            return name.as_str().to_string();
        }
        self.kind_string(&mut std::collections::HashSet::new())
    }

    fn kind_string(&self, seen: &mut std::collections::HashSet<usize>) -> String {
        use TypeKind::*;
        match &*self.kind {
            Integer => "integer".into(),
            Real => "real".into(),
            Boolean => "boolean".into(),
            Char => "char".into(),
            String => "string".into(),
            Text => "text".into(),
            Subrange { lower, upper, .. } => format!("{lower}..{upper}"),
            Enum { identifiers } => {
                format!("({})", identifiers.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", "))
            }
            Pointer { target_name, target } => {
                if let Some(n) = target_name {
                    format!("^{}", n.as_str())
                } else if let Some(t) = target.borrow().as_ref() {
                    format!("^{}", t.type_string())
                } else {
                    "nil".into()
                }
            }
            Array { element, packed, .. } => {
                format!("{}array of {}", if *packed { "packed " } else { "" }, element.type_string())
            }
            Record { fixed_fields, variant, packed } => {
                let key = Rc::as_ptr(&self.kind) as usize;
                if !seen.insert(key) {
                    return "record ...".into();
                }
                let mut fields: Vec<String> =
                    fixed_fields.iter().map(|(n, t)| format!("{}: {}", n.as_str(), t.kind_string(seen))).collect();
                if let Some(v) = variant {
                    for arm in &v.arms {
                        if let Record { fixed_fields, .. } = &*arm.fields {
                            fields.extend(
                                fixed_fields.iter().map(|(n, t)| format!("{}: {}", n.as_str(), t.kind_string(seen))),
                            );
                        }
                    }
                }
                seen.remove(&key);
                format!("{}record {} end", if *packed { "packed " } else { "" }, fields.join("; "))
            }
            Set { element, packed } => {
                let e = element.borrow();
                let e_str = e.as_ref().map(|t| t.type_string()).unwrap_or_else(|| "?".into());
                format!("{}set of {}", if *packed { "packed " } else { "" }, e_str)
            }
            File { element, packed } => format!("{}file of {}", if *packed { "packed " } else { "" }, element.type_string()),
            Procedure { .. } => "procedure".into(),
            Function { ret, .. } => format!("function: {}", ret.type_string()),
        }
    }
}

fn formals_equal(a: &[FormalParameter], b: &[FormalParameter]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| x.by_reference == y.by_reference && x.ty.equals(&y.ty))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_string())
    }
}

/// Binary operator families (spec.md §3.3 "Operator compatibility").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOp {
    Add,
    Sub,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MulOp {
    Mul,
    Div,
    IntDiv,
    Mod,
    And,
}

/// Result type of a relational expression, or an error message naming
/// the incompatible operand types (spec.md §4.2 error phrases).
pub fn relational_result(op: RelOp, lhs: &Type, rhs: &Type) -> Result<Type, String> {
    if op == RelOp::In {
        return match &*rhs.kind {
            TypeKind::Set { element, .. } => match element.borrow().as_ref() {
                Some(elem) if elem.equals(lhs) || lhs.assignable_from(elem) => Ok(Type::boolean()),
                Some(elem) => Err(format!("type {} does not match set type {}", lhs.type_string(), elem.type_string())),
                None => Ok(Type::boolean()),
            },
            _ => Err(format!("in: expected set type, got {} instead", rhs.type_string())),
        };
    }
    if lhs.assignable_from(rhs) || rhs.assignable_from(lhs) || lhs.equals(rhs) {
        Ok(Type::boolean())
    } else {
        Err(format!(
            "in simple expression involving operator {}, types {} and {} are incompatible",
            rel_op_str(op),
            lhs.type_string(),
            rhs.type_string()
        ))
    }
}

pub fn additive_result(op: AddOp, lhs: &Type, rhs: &Type) -> Result<Type, String> {
    if op == AddOp::Or {
        return if matches!(*lhs.kind, TypeKind::Boolean) && matches!(*rhs.kind, TypeKind::Boolean) {
            Ok(Type::boolean())
        } else {
            Err(format!("can't use or with {}", if matches!(*lhs.kind, TypeKind::Boolean) { rhs.type_string() } else { lhs.type_string() }))
        };
    }
    if lhs.is_set() && rhs.is_set() {
        return Ok(lhs.clone());
    }
    numeric_result(lhs, rhs, "+/-")
}

pub fn multiplicative_result(op: MulOp, lhs: &Type, rhs: &Type) -> Result<Type, String> {
    match op {
        MulOp::And => {
            if matches!(*lhs.kind, TypeKind::Boolean) && matches!(*rhs.kind, TypeKind::Boolean) {
                Ok(Type::boolean())
            } else {
                Err(format!("can't use and with {}", if matches!(*lhs.kind, TypeKind::Boolean) { rhs.type_string() } else { lhs.type_string() }))
            }
        }
        MulOp::IntDiv | MulOp::Mod => {
            if lhs.is_integer_like() && rhs.is_integer_like() {
                Ok(Type::integer())
            } else {
                Err(format!(
                    "in simple expression involving operator {}, types {} and {} are incompatible",
                    if op == MulOp::IntDiv { "div" } else { "mod" },
                    lhs.type_string(),
                    rhs.type_string()
                ))
            }
        }
        MulOp::Div => {
            if (matches!(*lhs.kind, TypeKind::Real) || lhs.is_integer_like())
                && (matches!(*rhs.kind, TypeKind::Real) || rhs.is_integer_like())
            {
                Ok(Type::real())
            } else {
                Err(format!("in simple expression involving operator /, types {} and {} are incompatible", lhs.type_string(), rhs.type_string()))
            }
        }
        MulOp::Mul => {
            if lhs.is_set() && rhs.is_set() {
                Ok(lhs.clone())
            } else {
                numeric_result(lhs, rhs, "*")
            }
        }
    }
}

fn numeric_result(lhs: &Type, rhs: &Type, op_str: &str) -> Result<Type, String> {
    let lhs_num = matches!(*lhs.kind, TypeKind::Integer | TypeKind::Real) || lhs.is_integer_like();
    let rhs_num = matches!(*rhs.kind, TypeKind::Integer | TypeKind::Real) || rhs.is_integer_like();
    if !lhs_num || !rhs_num {
        return Err(format!(
            "in simple expression involving operator {}, types {} and {} are incompatible",
            op_str,
            lhs.type_string(),
            rhs.type_string()
        ));
    }
    if matches!(*lhs.kind, TypeKind::Real) || matches!(*rhs.kind, TypeKind::Real) {
        Ok(Type::real())
    } else {
        Ok(Type::integer())
    }
}

fn rel_op_str(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "=",
        RelOp::Ne => "<>",
        RelOp::Lt => "<",
        RelOp::Le => "<=",
        RelOp::Gt => ">",
        RelOp::Ge => ">=",
        RelOp::In => "in",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_ignores_names() {
        let a = Type::integer().named(Symbol::intern("myint"));
        let b = Type::integer();
        assert!(a.equals(&b));
    }

    #[test]
    fn subrange_equals_requires_same_bounds() {
        let a = Type::new(TypeKind::Subrange { lower: 1, upper: 10, base: Box::new(Type::integer()) });
        let b = Type::new(TypeKind::Subrange { lower: 1, upper: 10, base: Box::new(Type::integer()) });
        let c = Type::new(TypeKind::Subrange { lower: 1, upper: 9, base: Box::new(Type::integer()) });
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn real_assignable_from_integer_but_not_reverse() {
        assert!(Type::real().assignable_from(&Type::integer()));
        assert!(!Type::integer().assignable_from(&Type::real()));
    }

    #[test]
    fn nil_pointer_assignable_to_any_pointer() {
        let target = Type::record_stub();
        let p = Type::new(TypeKind::Pointer { target_name: Some(Symbol::intern("t")), target: filled_cell(target) });
        assert!(p.assignable_from(&Type::nil_pointer()));
    }

    impl Type {
        fn record_stub() -> Type {
            Type::new(TypeKind::Record { fixed_fields: vec![], variant: None, packed: false })
        }
    }
}
