//! Resolvers for intrinsics whose typing depends on argument structure.
//!
//! Each function here is the body of a predicate or closure-factory rule.
//! They return `Ok(None)` when the argument types are outside the
//! intrinsic's domain, and `Err` only when a literal's value is.

use std::sync::Arc;

use simt_types::{ArrayType, LiteralValue, Signature, Type};

use crate::literal::{ArraySpecParser, is_static_shape};
use crate::rule::{LiteralDomainError, ResolverResult, TypeResolver};

/// Operand types `selp` can select between.
pub const SELECT_TYPES: [Type; 8] = [
    Type::FLOAT64,
    Type::FLOAT32,
    Type::INT16,
    Type::UINT16,
    Type::INT32,
    Type::UINT32,
    Type::INT64,
    Type::UINT64,
];

/// Element types supported by atomic max and min.
pub const ATOMIC_MAXMIN_TYPES: [Type; 6] = [
    Type::FLOAT64,
    Type::FLOAT32,
    Type::INT32,
    Type::UINT32,
    Type::INT64,
    Type::UINT64,
];

// ---------------------------------------------------------------------------
// Grid queries
// ---------------------------------------------------------------------------

/// Typer for `grid(ndim)` and `gridsize(ndim)`.
///
/// `ndim` must be an integer literal: 1 yields `int32`, 2 or 3 yield a tuple
/// of that many `int32`. Any other value is an error.
pub fn grid_dims(args: &[Type]) -> ResolverResult {
    let [ndim] = args else {
        return Ok(None);
    };
    let Some(value) = ndim.literal_int() else {
        return Ok(None);
    };
    let ret = match value {
        1 => Type::INT32,
        2 | 3 => Type::uni_tuple(Type::INT32, value as usize),
        _ => {
            return Err(LiteralDomainError {
                value: LiteralValue::Int(value),
                domain: "1, 2, or 3".to_string(),
            });
        }
    };
    Ok(Some(Signature::new(vec![Type::INT32], ret)))
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Typer for `selp(test, a, b)`: `a` and `b` must be the same supported type.
pub fn select(args: &[Type]) -> ResolverResult {
    let [test, a, b] = args else {
        return Ok(None);
    };
    if a != b || !SELECT_TYPES.contains(a) {
        return Ok(None);
    }
    Ok(Some(Signature::new(
        vec![test.clone(), a.clone(), a.clone()],
        a.clone(),
    )))
}

// ---------------------------------------------------------------------------
// Atomics
// ---------------------------------------------------------------------------

/// Shared shape rule of read-modify-write atomics on `ary[idx]`.
///
/// 1-D arrays are indexed by `intp`; higher ranks keep the supplied index
/// type (a tuple). 0-D arrays are not indexable.
fn atomic_update(array_ty: &Type, array: &ArrayType, idx: &Type, intp: &Type) -> Option<Signature> {
    let dtype = array.dtype.as_ref().clone();
    let index = match array.ndim {
        0 => return None,
        1 => intp.clone(),
        _ => idx.clone(),
    };
    Some(Signature::new(vec![array_ty.clone(), index, dtype.clone()], dtype))
}

/// Typer for `atomic.add(ary, idx, val)`.
pub fn atomic_add(intp: Type) -> impl Fn(&[Type]) -> ResolverResult + Send + Sync + 'static {
    move |args: &[Type]| -> ResolverResult {
        let [ary, idx, _val] = args else {
            return Ok(None);
        };
        let Some(array) = ary.as_array() else {
            return Ok(None);
        };
        Ok(atomic_update(ary, array, idx, &intp))
    }
}

/// Typer for `atomic.max` and `atomic.min`: as add, restricted to
/// [`ATOMIC_MAXMIN_TYPES`].
pub fn atomic_maxmin(intp: Type) -> impl Fn(&[Type]) -> ResolverResult + Send + Sync + 'static {
    move |args: &[Type]| -> ResolverResult {
        let [ary, idx, _val] = args else {
            return Ok(None);
        };
        let Some(array) = ary.as_array() else {
            return Ok(None);
        };
        if !ATOMIC_MAXMIN_TYPES.contains(array.dtype.as_ref()) {
            return Ok(None);
        }
        Ok(atomic_update(ary, array, idx, &intp))
    }
}

/// Typer for `atomic.compare_and_swap(ary, old, val)`: 1-D `int32` arrays only.
pub fn compare_and_swap(args: &[Type]) -> ResolverResult {
    let [ary, _old, _val] = args else {
        return Ok(None);
    };
    let Some(array) = ary.as_array() else {
        return Ok(None);
    };
    if *array.dtype != Type::INT32 || array.ndim != 1 {
        return Ok(None);
    }
    let dtype = Type::INT32;
    Ok(Some(Signature::new(
        vec![ary.clone(), dtype.clone(), dtype.clone()],
        dtype,
    )))
}

// ---------------------------------------------------------------------------
// Array construction
// ---------------------------------------------------------------------------

/// Resolver factory for `shared.array(shape, dtype)` and `local.array(shape, dtype)`.
///
/// The shape must be fully static. Either the shape or the dtype failing
/// to parse leaves the call unresolved.
pub fn array_decl(parser: Arc<dyn ArraySpecParser>) -> impl Fn() -> TypeResolver + Send + Sync + 'static {
    move || -> TypeResolver {
        let parser = Arc::clone(&parser);
        Arc::new(move |args: &[Type]| -> ResolverResult {
            let [shape, dtype] = args else {
                return Ok(None);
            };
            if !is_static_shape(shape) {
                return Ok(None);
            }
            let (Some(ndim), Some(element)) = (parser.parse_shape(shape), parser.parse_dtype(dtype))
            else {
                return Ok(None);
            };
            Ok(Some(Signature::new(
                vec![shape.clone(), dtype.clone()],
                Type::array(element, ndim),
            )))
        })
    }
}

/// Resolver factory for `const.array_like(ary)`: returns the array type unchanged.
pub fn array_like() -> TypeResolver {
    Arc::new(|args: &[Type]| -> ResolverResult {
        let [ary] = args else {
            return Ok(None);
        };
        if ary.as_array().is_none() {
            return Ok(None);
        }
        Ok(Some(Signature::new(vec![ary.clone()], ary.clone())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::DefaultArraySpecParser;

    fn float32_class() -> Type {
        Type::NumberClass(Box::new(Type::FLOAT32))
    }

    #[test]
    fn grid_dims_shapes_result_by_literal() {
        assert_eq!(
            grid_dims(&[Type::int_literal(1)]),
            Ok(Some(Signature::new(vec![Type::INT32], Type::INT32)))
        );
        assert_eq!(
            grid_dims(&[Type::int_literal(3)]).unwrap().unwrap().ret,
            Type::Tuple(vec![Type::INT32, Type::INT32, Type::INT32])
        );
    }

    #[test]
    fn grid_dims_rejects_out_of_domain_literal() {
        for bad in [0, 4, -1] {
            let err = grid_dims(&[Type::int_literal(bad)]).unwrap_err();
            assert_eq!(err.value, LiteralValue::Int(bad));
            assert_eq!(err.domain, "1, 2, or 3");
        }
    }

    #[test]
    fn grid_dims_needs_one_literal() {
        assert_eq!(grid_dims(&[Type::INT32]), Ok(None));
        assert_eq!(grid_dims(&[]), Ok(None));
        assert_eq!(grid_dims(&[Type::int_literal(1), Type::int_literal(1)]), Ok(None));
    }

    #[test]
    fn select_requires_identical_supported_operands() {
        let sig = select(&[Type::Bool, Type::UINT16, Type::UINT16]).unwrap().unwrap();
        assert_eq!(sig.params, vec![Type::Bool, Type::UINT16, Type::UINT16]);
        assert_eq!(sig.ret, Type::UINT16);
        assert_eq!(select(&[Type::Bool, Type::INT8, Type::INT8]), Ok(None));
        assert_eq!(select(&[Type::Bool, Type::INT32, Type::INT64]), Ok(None));
        assert_eq!(select(&[Type::INT32, Type::INT32]), Ok(None));
    }

    #[test]
    fn atomic_add_uses_intp_for_1d() {
        let ary = Type::array(Type::FLOAT32, 1);
        let typer = atomic_add(Type::INT32);
        let sig = typer(&[ary.clone(), Type::INT64, Type::FLOAT32]).unwrap().unwrap();
        assert_eq!(sig.params, vec![ary, Type::INT32, Type::FLOAT32]);
        assert_eq!(sig.ret, Type::FLOAT32);
    }

    #[test]
    fn atomic_add_rejects_scalars_and_0d() {
        let typer = atomic_add(Type::INT64);
        assert_eq!(typer(&[Type::INT32, Type::INT64, Type::INT32]), Ok(None));
        assert_eq!(
            typer(&[Type::array(Type::INT32, 0), Type::INT64, Type::INT32]),
            Ok(None)
        );
    }

    #[test]
    fn compare_and_swap_only_int32_vectors() {
        let ok = compare_and_swap(&[Type::array(Type::INT32, 1), Type::INT32, Type::INT32]);
        assert_eq!(ok.unwrap().unwrap().ret, Type::INT32);
        let two_d = compare_and_swap(&[Type::array(Type::INT32, 2), Type::INT32, Type::INT32]);
        assert_eq!(two_d, Ok(None));
        let uint = compare_and_swap(&[Type::array(Type::UINT32, 1), Type::UINT32, Type::UINT32]);
        assert_eq!(uint, Ok(None));
    }

    #[test]
    fn array_decl_builds_contiguous_array() {
        let make = array_decl(Arc::new(DefaultArraySpecParser));
        let resolver = make();
        let shape = Type::Tuple(vec![Type::int_literal(16), Type::int_literal(16)]);
        let sig = resolver(&[shape.clone(), float32_class()]).unwrap().unwrap();
        assert_eq!(sig.ret, Type::array(Type::FLOAT32, 2));
        assert_eq!(sig.params, vec![shape, float32_class()]);
    }

    #[test]
    fn array_decl_rejects_runtime_shape_or_unknown_dtype() {
        let resolver = array_decl(Arc::new(DefaultArraySpecParser))();
        assert_eq!(resolver(&[Type::INT64, float32_class()]), Ok(None));
        assert_eq!(
            resolver(&[Type::int_literal(8), Type::str_literal("complex128")]),
            Ok(None)
        );
        assert_eq!(resolver(&[Type::int_literal(8)]), Ok(None));
    }

    struct AnyShapeParser;

    impl ArraySpecParser for AnyShapeParser {
        fn parse_shape(&self, _shape: &Type) -> Option<u32> {
            Some(1)
        }

        fn parse_dtype(&self, _dtype: &Type) -> Option<Type> {
            Some(Type::FLOAT64)
        }
    }

    #[test]
    fn array_decl_requires_static_shape_whatever_the_parser() {
        let resolver = array_decl(Arc::new(AnyShapeParser))();
        assert_eq!(resolver(&[Type::INT64, Type::Unit]), Ok(None));
        assert_eq!(
            resolver(&[Type::int_literal(4), Type::Unit]).unwrap().unwrap().ret,
            Type::array(Type::FLOAT64, 1)
        );
    }

    #[test]
    fn array_like_is_identity_on_arrays() {
        let resolver = array_like();
        let ary = Type::array(Type::UINT8, 3);
        assert_eq!(
            resolver(&[ary.clone()]),
            Ok(Some(Signature::new(vec![ary.clone()], ary)))
        );
        assert_eq!(resolver(&[Type::UINT8]), Ok(None));
    }
}
