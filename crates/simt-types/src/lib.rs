//! Type representations for GPU kernel intrinsic typing.
//!
//! This crate defines the closed set of semantic types the intrinsic
//! resolver reasons over, and [`Signature`], the unit of overload
//! resolution. Types are immutable values: resolvers build them ad hoc and
//! compare them structurally.

use std::fmt;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Fully qualified identity of an intrinsic typing rule (e.g. `cuda.atomic.add`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntrinsicId(pub String);

impl IntrinsicId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntrinsicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified identity of a pseudo-namespace (e.g. `cuda.shared`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub String);

impl NamespaceId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity of a namespace nested under this one.
    pub fn child(&self, name: &str) -> NamespaceId {
        NamespaceId(format!("{}.{name}", self.0))
    }

    /// Identity of an intrinsic declared as a member of this namespace.
    pub fn member(&self, name: &str) -> IntrinsicId {
        IntrinsicId(format!("{}.{name}", self.0))
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Scalar widths
// ---------------------------------------------------------------------------

/// Bit-width for integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::I8 => 8,
            IntWidth::I16 => 16,
            IntWidth::I32 => 32,
            IntWidth::I64 => 64,
        }
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(IntWidth::I8),
            16 => Some(IntWidth::I16),
            32 => Some(IntWidth::I32),
            64 => Some(IntWidth::I64),
            _ => None,
        }
    }
}

/// Signedness marker for integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Bit-width for floating-point types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatWidth {
    F16,
    F32,
    F64,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::F16 => 16,
            FloatWidth::F32 => 32,
            FloatWidth::F64 => 64,
        }
    }
}

/// Memory layout tag carried by array types.
///
/// Every array type the engine produces is C-contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    #[default]
    Contiguous,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Contiguous => write!(f, "C"),
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A compile-time constant materialized inside a literal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(value) => write!(f, "{value}"),
            LiteralValue::Bool(value) => write!(f, "{value}"),
            LiteralValue::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// A type that also carries its compile-time value.
///
/// The base type is what the literal behaves as anywhere a plain type is
/// expected; `value` is what resolvers may additionally inspect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiteralType {
    pub base: Box<Type>,
    pub value: LiteralValue,
}

/// An n-dimensional array type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub dtype: Box<Type>,
    pub ndim: u32,
    pub layout: Layout,
}

/// A semantic type seen by the intrinsic resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    // -- Scalars --
    /// Fixed-width integer (e.g. `int32`, `uint8`).
    IntN(IntWidth, Signedness),
    /// Fixed-width float (e.g. `float32`).
    FloatN(FloatWidth),
    Bool,
    /// Base type of string literals.
    Str,
    /// The `none` result of intrinsics evaluated only for effect.
    Unit,

    // -- Compound --
    Tuple(Vec<Type>),
    Array(ArrayType),
    Literal(LiteralType),

    // -- Compile-time only --
    /// A scalar type name used as a value (the `float32` in `array(10, float32)`).
    NumberClass(Box<Type>),
    /// Reference to a pseudo-namespace such as `cuda.atomic`.
    Namespace(NamespaceId),
    /// Reference to an intrinsic; calling it dispatches to its typing rule.
    Function(IntrinsicId),
}

impl Type {
    pub const INT8: Type = Type::IntN(IntWidth::I8, Signedness::Signed);
    pub const INT16: Type = Type::IntN(IntWidth::I16, Signedness::Signed);
    pub const INT32: Type = Type::IntN(IntWidth::I32, Signedness::Signed);
    pub const INT64: Type = Type::IntN(IntWidth::I64, Signedness::Signed);
    pub const UINT8: Type = Type::IntN(IntWidth::I8, Signedness::Unsigned);
    pub const UINT16: Type = Type::IntN(IntWidth::I16, Signedness::Unsigned);
    pub const UINT32: Type = Type::IntN(IntWidth::I32, Signedness::Unsigned);
    pub const UINT64: Type = Type::IntN(IntWidth::I64, Signedness::Unsigned);
    pub const FLOAT16: Type = Type::FloatN(FloatWidth::F16);
    pub const FLOAT32: Type = Type::FloatN(FloatWidth::F32);
    pub const FLOAT64: Type = Type::FloatN(FloatWidth::F64);

    /// Signed integer as wide as a pointer on the target.
    pub fn intp(pointer_width: IntWidth) -> Type {
        Type::IntN(pointer_width, Signedness::Signed)
    }

    /// Unsigned integer as wide as a pointer on the target.
    pub fn uintp(pointer_width: IntWidth) -> Type {
        Type::IntN(pointer_width, Signedness::Unsigned)
    }

    /// Integer literal. The base type is `int64`, whatever the value.
    ///
    /// Fixed-signature tables match exactly after unwrapping, so such a
    /// literal only satisfies an `int64` parameter: `syncwarp(<literal>)`
    /// stays unresolved until the host types the mask as `int32`.
    pub fn int_literal(value: i64) -> Type {
        Type::Literal(LiteralType {
            base: Box::new(Type::INT64),
            value: LiteralValue::Int(value),
        })
    }

    pub fn bool_literal(value: bool) -> Type {
        Type::Literal(LiteralType {
            base: Box::new(Type::Bool),
            value: LiteralValue::Bool(value),
        })
    }

    pub fn str_literal(value: impl Into<String>) -> Type {
        Type::Literal(LiteralType {
            base: Box::new(Type::Str),
            value: LiteralValue::Str(value.into()),
        })
    }

    /// C-contiguous array of `dtype` with `ndim` dimensions.
    pub fn array(dtype: Type, ndim: u32) -> Type {
        Type::Array(ArrayType {
            dtype: Box::new(dtype),
            ndim,
            layout: Layout::Contiguous,
        })
    }

    /// Homogeneous tuple of `count` copies of `elem`.
    pub fn uni_tuple(elem: Type, count: usize) -> Type {
        Type::Tuple(vec![elem; count])
    }

    pub fn namespace(id: impl Into<String>) -> Type {
        Type::Namespace(NamespaceId::new(id))
    }

    pub fn function(id: impl Into<String>) -> Type {
        Type::Function(IntrinsicId::new(id))
    }

    /// Strip a literal wrapper, yielding the type the literal behaves as.
    pub fn unliteral(&self) -> &Type {
        match self {
            Type::Literal(lit) => lit.base.unliteral(),
            other => other,
        }
    }

    pub fn literal_value(&self) -> Option<&LiteralValue> {
        match self {
            Type::Literal(lit) => Some(&lit.value),
            _ => None,
        }
    }

    /// The constant of an integer literal, if this is one.
    pub fn literal_int(&self) -> Option<i64> {
        match self.literal_value() {
            Some(LiteralValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns true for integer scalar types, literal or not.
    pub fn is_integer(&self) -> bool {
        matches!(self.unliteral(), Type::IntN(_, _))
    }

    /// Look up a scalar type by its canonical display name (`int32`, `float64`, ...).
    pub fn scalar_from_name(name: &str) -> Option<Type> {
        let ty = match name {
            "int8" => Type::INT8,
            "int16" => Type::INT16,
            "int32" => Type::INT32,
            "int64" => Type::INT64,
            "uint8" => Type::UINT8,
            "uint16" => Type::UINT16,
            "uint32" => Type::UINT32,
            "uint64" => Type::UINT64,
            "float16" => Type::FLOAT16,
            "float32" => Type::FLOAT32,
            "float64" => Type::FLOAT64,
            "bool" | "bool_" => Type::Bool,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::IntN(width, Signedness::Signed) => write!(f, "int{}", width.bits()),
            Type::IntN(width, Signedness::Unsigned) => write!(f, "uint{}", width.bits()),
            Type::FloatN(width) => write!(f, "float{}", width.bits()),
            Type::Bool => write!(f, "bool"),
            Type::Str => write!(f, "str"),
            Type::Unit => write!(f, "none"),

            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                if elems.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Type::Array(array) => {
                write!(f, "array({}, {}d, {})", array.dtype, array.ndim, array.layout)
            }
            Type::Literal(lit) => write!(f, "Literal[{}]({})", lit.base, lit.value),

            Type::NumberClass(inner) => write!(f, "class({inner})"),
            Type::Namespace(id) => write!(f, "Module({id})"),
            Type::Function(id) => write!(f, "Function({id})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Validated parameter types plus the return type of one resolved call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Signature {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self { params, ret }
    }

    /// A signature taking no arguments.
    pub fn nullary(ret: Type) -> Self {
        Self {
            params: Vec::new(),
            ret,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// Render an argument list the way diagnostics and traces show it: `(int32, float64)`.
pub fn display_arg_types(args: &[Type]) -> String {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("({})", rendered.join(", "))
}
