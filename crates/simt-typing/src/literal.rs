//! Literal and shape analysis.
//!
//! Array-allocation intrinsics produce a compile-time-sized array type, so
//! their `shape` argument must be fully known: a literal integer or a tuple
//! of literal integers. The `dtype` argument is either a scalar class
//! (`float32`) or a string literal naming one (`"float32"`, `"f4"`).
//!
//! Shape and dtype parsing sit behind [`ArraySpecParser`] so the host can
//! substitute its own collaborators.

use simt_types::{LiteralValue, Type};

/// External shape and dtype parsers consumed by array-allocation rules.
pub trait ArraySpecParser: Send + Sync {
    /// Rank of `shape`, only if every dimension is a compile-time integer.
    fn parse_shape(&self, shape: &Type) -> Option<u32>;
    /// Canonical element type named by `dtype`, if recognized.
    fn parse_dtype(&self, dtype: &Type) -> Option<Type>;
}

/// Parser accepting scalar classes and numpy-style dtype strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultArraySpecParser;

impl ArraySpecParser for DefaultArraySpecParser {
    fn parse_shape(&self, shape: &Type) -> Option<u32> {
        let extents = static_extents(shape)?;
        u32::try_from(extents.len()).ok()
    }

    fn parse_dtype(&self, dtype: &Type) -> Option<Type> {
        match dtype {
            Type::NumberClass(scalar) => Some(scalar.as_ref().clone()),
            Type::Literal(lit) => match &lit.value {
                LiteralValue::Str(code) => dtype_from_str(code),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Whether `shape` is a literal integer or a tuple of literal integers.
pub fn is_static_shape(shape: &Type) -> bool {
    static_extents(shape).is_some()
}

/// Constant extents of a static shape, outermost first.
pub fn static_extents(shape: &Type) -> Option<Vec<i64>> {
    match shape {
        Type::Tuple(dims) => dims.iter().map(int_literal_value).collect(),
        other => int_literal_value(other).map(|extent| vec![extent]),
    }
}

fn int_literal_value(ty: &Type) -> Option<i64> {
    if !ty.is_integer() {
        return None;
    }
    ty.literal_int()
}

/// Scalar type named by a dtype string: canonical names or numpy codes.
pub fn dtype_from_str(code: &str) -> Option<Type> {
    if let Some(scalar) = Type::scalar_from_name(code) {
        return Some(scalar);
    }
    let ty = match code {
        "i1" => Type::INT8,
        "i2" => Type::INT16,
        "i4" => Type::INT32,
        "i8" => Type::INT64,
        "u1" => Type::UINT8,
        "u2" => Type::UINT16,
        "u4" => Type::UINT32,
        "u8" => Type::UINT64,
        "f2" => Type::FLOAT16,
        "f4" => Type::FLOAT32,
        "f8" => Type::FLOAT64,
        "b1" | "?" => Type::Bool,
        _ => return None,
    };
    Some(ty)
}
