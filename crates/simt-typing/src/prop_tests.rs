//! Property tests for rule dispatch using proptest.
//!
//! Key properties:
//!
//! 1. Fixed tables pick the first matching candidate in declaration order
//! 2. Wrapping an argument in a literal never changes a fixed-table outcome
//! 3. The grid typer is total over integer literals: a signature or a hard error
//! 4. A static shape of N literal extents allocates an N-dimensional array
//! 5. Branch selection resolves exactly for equal whitelisted operands
//! 6. Atomic add returns the array dtype for every indexable rank

use std::collections::BTreeMap;

use proptest::prelude::*;
use simt_types::{LiteralType, LiteralValue, Signature, Type};

use crate::intrinsics::{intrinsic, root_namespace};
use crate::resolve::{candidate_matches, match_fixed_table};
use crate::typers::SELECT_TYPES;
use crate::{EngineConfig, build_registry};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_scalar() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::INT8),
        Just(Type::INT16),
        Just(Type::INT32),
        Just(Type::INT64),
        Just(Type::UINT8),
        Just(Type::UINT16),
        Just(Type::UINT32),
        Just(Type::UINT64),
        Just(Type::FLOAT16),
        Just(Type::FLOAT32),
        Just(Type::FLOAT64),
        Just(Type::Bool),
    ]
}

/// A scalar, possibly wrapped in an integer literal over that scalar.
fn arb_arg() -> impl Strategy<Value = Type> {
    (arb_scalar(), any::<bool>(), -8i64..8).prop_map(|(base, wrap, value)| {
        if wrap && base.is_integer() {
            Type::Literal(LiteralType {
                base: Box::new(base),
                value: LiteralValue::Int(value),
            })
        } else {
            base
        }
    })
}

fn arb_signature() -> impl Strategy<Value = Signature> {
    (prop::collection::vec(arb_scalar(), 0..3), arb_scalar())
        .prop_map(|(params, ret)| Signature::new(params, ret))
}

fn no_named() -> BTreeMap<String, Type> {
    BTreeMap::new()
}

proptest! {
    /// The matched candidate is the first one, in declaration order, that
    /// accepts the unwrapped arguments.
    #[test]
    fn fixed_table_picks_first_match(
        cases in prop::collection::vec(arb_signature(), 0..6),
        args in prop::collection::vec(arb_arg(), 0..3),
    ) {
        let expected = cases.iter().position(|case| {
            case.params.len() == args.len()
                && case.params.iter().zip(&args).all(|(p, a)| a.unliteral() == p)
        });
        let matched = match_fixed_table(&cases, &args);
        prop_assert_eq!(matched.map(|m| m as *const Signature), expected.map(|i| &cases[i] as *const Signature));
        if let Some(sig) = matched {
            prop_assert!(candidate_matches(sig, &args));
            prop_assert_eq!(sig.arity(), args.len());
        }
    }
}

proptest! {
    /// An integer literal resolves through a fixed table exactly like its base type.
    #[test]
    fn literal_wrapping_preserves_fixed_table_outcome(value in any::<i64>()) {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        for name in ["popc", "clz", "ffs", "brev"] {
            let id = intrinsic(name);
            let literal = registry.resolve_call(&id, &[Type::int_literal(value)], &no_named());
            let plain = registry.resolve_call(&id, &[Type::INT64], &no_named());
            prop_assert_eq!(literal, plain);
        }
    }
}

proptest! {
    /// Grid queries never come back merely unresolved for an integer literal.
    #[test]
    fn grid_typer_is_total_over_literals(value in -16i64..16) {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        let result = registry.resolve_call(&intrinsic("grid"), &[Type::int_literal(value)], &no_named());
        if (1..=3).contains(&value) {
            let sig = result.unwrap().unwrap();
            let expected_ret = if value == 1 {
                Type::INT32
            } else {
                Type::uni_tuple(Type::INT32, value as usize)
            };
            prop_assert_eq!(sig.ret, expected_ret);
        } else {
            prop_assert!(result.is_err());
        }
    }
}

proptest! {
    /// Static shapes allocate arrays whose rank is the number of extents.
    #[test]
    fn static_shape_rank_matches_extent_count(
        extents in prop::collection::vec(1i64..1024, 0..5),
        dtype in arb_scalar(),
    ) {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        let shape = Type::Tuple(extents.iter().copied().map(Type::int_literal).collect());
        let class = Type::NumberClass(Box::new(dtype.clone()));
        for ns in ["shared", "local"] {
            let id = root_namespace().child(ns).member("array");
            let sig = registry
                .resolve_call(&id, &[shape.clone(), class.clone()], &no_named())
                .unwrap()
                .unwrap();
            prop_assert_eq!(sig.ret, Type::array(dtype.clone(), extents.len() as u32));
        }
    }
}

proptest! {
    #[test]
    fn select_resolves_only_equal_whitelisted_operands(a in arb_scalar(), b in arb_scalar()) {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        let result = registry
            .resolve_call(&intrinsic("selp"), &[Type::Bool, a.clone(), b.clone()], &no_named())
            .unwrap();
        let supported = a == b && SELECT_TYPES.contains(&a);
        prop_assert_eq!(result.is_some(), supported);
        if let Some(sig) = result {
            prop_assert_eq!(sig.ret, a);
        }
    }
}

proptest! {
    #[test]
    fn atomic_add_returns_dtype_for_every_rank(ndim in 1u32..5, dtype in arb_scalar()) {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        let ary = Type::array(dtype.clone(), ndim);
        let index = if ndim == 1 {
            Type::INT64
        } else {
            Type::uni_tuple(Type::INT64, ndim as usize)
        };
        let id = root_namespace().child("atomic").member("add");
        let sig = registry
            .resolve_call(&id, &[ary.clone(), index.clone(), dtype.clone()], &no_named())
            .unwrap()
            .unwrap();
        prop_assert_eq!(&sig.ret, &dtype);
        prop_assert_eq!(&sig.params[1], &index);
        prop_assert_eq!(&sig.params[0], &ary);
    }
}
