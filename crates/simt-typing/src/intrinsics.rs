//! Declarations of the built-in `cuda` intrinsic surface.
//!
//! Everything reachable from the global `cuda` namespace is declared here:
//! synchronization and fence intrinsics, warp-level primitives, bit
//! manipulation, grid queries, array allocation, and atomics.

use std::sync::Arc;

use simt_types::{IntrinsicId, NamespaceId, Signature, Type};

use crate::config::EngineConfig;
use crate::error::RegistryError;
use crate::literal::{ArraySpecParser, DefaultArraySpecParser};
use crate::registry::{Registry, RegistryBuilder};
use crate::rule::{AttributeMap, TypeResolver, TypingRule};
use crate::typers;

/// Root namespace of the intrinsic surface.
pub const ROOT: &str = "cuda";

/// Integer types accepted by bit-manipulation intrinsics, in overload order.
const BIT_INT_TYPES: [Type; 8] = [
    Type::INT8,
    Type::INT16,
    Type::INT32,
    Type::INT64,
    Type::UINT8,
    Type::UINT16,
    Type::UINT32,
    Type::UINT64,
];

/// Value types warp shuffles and matches can carry, in overload order.
const WARP_VALUE_TYPES: [Type; 4] = [Type::INT32, Type::INT64, Type::FLOAT32, Type::FLOAT64];

pub fn root_namespace() -> NamespaceId {
    NamespaceId::new(ROOT)
}

/// Namespace of the `(x, y, z)` triples behind `threadIdx`, `blockIdx`,
/// `blockDim`, and `gridDim`.
pub fn dim3_namespace() -> NamespaceId {
    root_namespace().child("dim3")
}

/// Build the registry for `config` with the default shape and dtype parsers.
pub fn build_registry(config: &EngineConfig) -> Result<Registry, RegistryError> {
    build_registry_with_parser(config, Arc::new(DefaultArraySpecParser))
}

/// Build the registry for `config`, parsing array shapes and dtypes with `parser`.
pub fn build_registry_with_parser(
    config: &EngineConfig,
    parser: Arc<dyn ArraySpecParser>,
) -> Result<Registry, RegistryError> {
    let mut builder = Registry::builder();
    declare_gpu_intrinsics(&mut builder, config, parser)?;
    builder.build()
}

/// Register every rule, namespace, and global of the `cuda` surface.
pub fn declare_gpu_intrinsics(
    builder: &mut RegistryBuilder,
    config: &EngineConfig,
    parser: Arc<dyn ArraySpecParser>,
) -> Result<(), RegistryError> {
    let cuda = root_namespace();
    let shared = cuda.child("shared");
    let local = cuda.child("local");
    let constant = cuda.child("const");
    let atomic = cuda.child("atomic");

    // -- Fixed tables --

    let mut root_attrs = AttributeMap::new();
    for (name, rule) in fixed_table_rules() {
        let id = cuda.member(name);
        builder.register_rule(id.clone(), rule)?;
        root_attrs = root_attrs.with_function(name, id);
    }

    // -- Grid queries --

    for name in ["grid", "gridsize"] {
        let id = cuda.member(name);
        builder.register_rule(id.clone(), TypingRule::closure_factory(grid_dims_resolver))?;
        root_attrs = root_attrs.with_function(name, id);
    }

    // -- Selection --

    let selp = cuda.member("selp");
    builder.register_rule(selp.clone(), TypingRule::predicate(typers::select))?;
    root_attrs = root_attrs.with_function("selp", selp);

    // -- Array allocation --

    let shared_array = shared.member("array");
    builder.register_rule(
        shared_array.clone(),
        TypingRule::closure_factory(typers::array_decl(Arc::clone(&parser))),
    )?;
    builder.register_attributes(
        shared.clone(),
        AttributeMap::new().with_function("array", shared_array),
    )?;

    let local_array = local.member("array");
    builder.register_rule(
        local_array.clone(),
        TypingRule::closure_factory(typers::array_decl(parser)),
    )?;
    builder.register_attributes(
        local.clone(),
        AttributeMap::new().with_function("array", local_array),
    )?;

    let array_like = constant.member("array_like");
    builder.register_rule(array_like.clone(), TypingRule::closure_factory(typers::array_like))?;
    builder.register_attributes(
        constant.clone(),
        AttributeMap::new().with_function("array_like", array_like),
    )?;

    // -- Atomics --

    let intp = config.intp();
    let atomic_rules = [
        ("add", TypingRule::predicate(typers::atomic_add(intp.clone()))),
        ("max", TypingRule::predicate(typers::atomic_maxmin(intp.clone()))),
        ("min", TypingRule::predicate(typers::atomic_maxmin(intp))),
        ("compare_and_swap", TypingRule::predicate(typers::compare_and_swap)),
    ];
    let mut atomic_attrs = AttributeMap::new();
    for (name, rule) in atomic_rules {
        let id = atomic.member(name);
        builder.register_rule(id.clone(), rule)?;
        atomic_attrs = atomic_attrs.with_function(name, id);
    }
    builder.register_attributes(atomic.clone(), atomic_attrs)?;

    // -- Thread geometry --

    let dim3 = dim3_namespace();
    builder.register_attributes(
        dim3.clone(),
        AttributeMap::new()
            .with_type("x", Type::INT32)
            .with_type("y", Type::INT32)
            .with_type("z", Type::INT32),
    )?;

    let root_attrs = ["threadIdx", "blockIdx", "blockDim", "gridDim"]
        .into_iter()
        .fold(root_attrs, |attrs, name| attrs.with_namespace(name, dim3.clone()))
        .with_type("warpsize", Type::INT32)
        .with_type("laneid", Type::INT32)
        .with_namespace("shared", shared)
        .with_namespace("local", local)
        .with_namespace("const", constant)
        .with_namespace("atomic", atomic);
    builder.register_attributes(cuda.clone(), root_attrs)?;

    // -- Globals --

    builder.register_global(ROOT, Type::Namespace(cuda))?;
    declare_number_classes(builder, config)?;
    Ok(())
}

fn grid_dims_resolver() -> TypeResolver {
    Arc::new(typers::grid_dims)
}

/// Scalar type names usable as dtype arguments.
fn declare_number_classes(builder: &mut RegistryBuilder, config: &EngineConfig) -> Result<(), RegistryError> {
    let scalars = [
        "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "float16",
        "float32", "float64", "bool_",
    ];
    for name in scalars {
        if let Some(scalar) = Type::scalar_from_name(name) {
            builder.register_global(name, Type::NumberClass(Box::new(scalar)))?;
        }
    }
    builder.register_global("intp", Type::NumberClass(Box::new(config.intp())))?;
    builder.register_global(
        "uintp",
        Type::NumberClass(Box::new(Type::uintp(config.pointer_width))),
    )?;
    Ok(())
}

/// Fixed-signature intrinsics of the root namespace, by member name.
fn fixed_table_rules() -> Vec<(&'static str, TypingRule)> {
    let void = || TypingRule::fixed([Signature::nullary(Type::Unit)]);
    let i32_to_i32 = || TypingRule::fixed([Signature::new(vec![Type::INT32], Type::INT32)]);
    let same_int = || {
        TypingRule::fixed(
            BIT_INT_TYPES
                .into_iter()
                .map(|ty| Signature::new(vec![ty.clone()], ty)),
        )
    };
    let value_and_pred = |ty: Type| Type::Tuple(vec![ty, Type::Bool]);

    vec![
        ("syncthreads", void()),
        ("syncthreads_count", i32_to_i32()),
        ("syncthreads_and", i32_to_i32()),
        ("syncthreads_or", i32_to_i32()),
        ("threadfence", void()),
        ("threadfence_block", void()),
        ("threadfence_system", void()),
        (
            "syncwarp",
            TypingRule::fixed([Signature::new(vec![Type::INT32], Type::Unit)]),
        ),
        (
            "shfl_sync_intrinsic",
            TypingRule::fixed(WARP_VALUE_TYPES.into_iter().map(|ty| {
                Signature::new(
                    vec![Type::INT32, Type::INT32, ty.clone(), Type::INT32, Type::INT32],
                    value_and_pred(ty),
                )
            })),
        ),
        (
            "vote_sync_intrinsic",
            TypingRule::fixed([Signature::new(
                vec![Type::INT32, Type::INT32, Type::Bool],
                value_and_pred(Type::INT32),
            )]),
        ),
        (
            "match_any_sync",
            TypingRule::fixed(
                WARP_VALUE_TYPES
                    .into_iter()
                    .map(|ty| Signature::new(vec![Type::INT32, ty], Type::INT32)),
            ),
        ),
        (
            "match_all_sync",
            TypingRule::fixed(WARP_VALUE_TYPES.into_iter().map(|ty| {
                Signature::new(vec![Type::INT32, ty], value_and_pred(Type::INT32))
            })),
        ),
        ("popc", same_int()),
        ("clz", same_int()),
        ("ffs", same_int()),
        (
            "brev",
            TypingRule::fixed([
                Signature::new(vec![Type::UINT32], Type::UINT32),
                Signature::new(vec![Type::UINT64], Type::UINT64),
            ]),
        ),
        (
            "fma",
            TypingRule::fixed([Type::FLOAT32, Type::FLOAT64].into_iter().map(|ty| {
                Signature::new(vec![ty.clone(), ty.clone(), ty.clone()], ty)
            })),
        ),
    ]
}

/// Identity of a root-namespace intrinsic, e.g. `intrinsic("popc")`.
pub fn intrinsic(name: &str) -> IntrinsicId {
    root_namespace().member(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_builds() {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        assert!(registry.rule(&intrinsic("popc")).is_some());
        assert!(registry.rule(&root_namespace().child("atomic").member("add")).is_some());
        assert_eq!(registry.global(ROOT), Some(&Type::Namespace(root_namespace())));
    }

    #[test]
    fn every_root_function_member_has_a_rule() {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        for (_, attrs) in registry.namespaces() {
            for (_, entry) in attrs.iter() {
                if let Type::Function(id) = entry.to_type() {
                    assert!(registry.rule(&id).is_some(), "{id} has no rule");
                }
            }
        }
    }

    #[test]
    fn fixed_tables_keep_declaration_order() {
        let registry = build_registry(&EngineConfig::default()).unwrap();
        let cases = registry
            .rule(&intrinsic("popc"))
            .and_then(TypingRule::cases)
            .unwrap();
        let order: Vec<String> = cases.iter().map(|c| c.params[0].to_string()).collect();
        assert_eq!(
            order,
            ["int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64"]
        );
    }

    #[test]
    fn pointer_width_flows_into_number_classes() {
        let config = EngineConfig::with_pointer_bits(32).unwrap();
        let registry = build_registry(&config).unwrap();
        assert_eq!(
            registry.global("intp"),
            Some(&Type::NumberClass(Box::new(Type::INT32)))
        );
        assert_eq!(
            registry.global("uintp"),
            Some(&Type::NumberClass(Box::new(Type::UINT32)))
        );
    }

    #[test]
    fn declaring_twice_is_a_duplicate() {
        let mut builder = Registry::builder();
        let config = EngineConfig::default();
        declare_gpu_intrinsics(&mut builder, &config, Arc::new(DefaultArraySpecParser)).unwrap();
        let err = declare_gpu_intrinsics(&mut builder, &config, Arc::new(DefaultArraySpecParser))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRule { .. }));
    }
}
