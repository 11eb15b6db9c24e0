//! Call mixes for resolver benchmarks.

use simt_types::{IntrinsicId, Type};
use simt_typing::intrinsics::{intrinsic, root_namespace};

/// One resolution request: the intrinsic and its positional argument types.
pub struct CallCase {
    pub id: IntrinsicId,
    pub args: Vec<Type>,
}

impl CallCase {
    fn new(id: IntrinsicId, args: Vec<Type>) -> Self {
        Self { id, args }
    }
}

/// Bit-manipulation calls cycling through every integer width; the last
/// overload in each table is the slowest to reach.
pub fn fixed_table_calls(count: usize) -> Vec<CallCase> {
    let widths = [
        Type::INT8,
        Type::INT16,
        Type::INT32,
        Type::INT64,
        Type::UINT8,
        Type::UINT16,
        Type::UINT32,
        Type::UINT64,
    ];
    let names = ["popc", "clz", "ffs"];
    (0..count)
        .map(|i| {
            let ty = widths[i % widths.len()].clone();
            CallCase::new(intrinsic(names[i % names.len()]), vec![ty])
        })
        .collect()
}

/// Grid queries and array allocations whose result depends on literal values.
pub fn literal_calls(count: usize) -> Vec<CallCase> {
    let shared_array = root_namespace().child("shared").member("array");
    let float32 = Type::NumberClass(Box::new(Type::FLOAT32));
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                let ndim = (i % 3) as i64 + 1;
                CallCase::new(intrinsic("grid"), vec![Type::int_literal(ndim)])
            } else {
                let dims = (i % 3) + 1;
                let shape = Type::Tuple((0..dims).map(|_| Type::int_literal(32)).collect());
                CallCase::new(shared_array.clone(), vec![shape, float32.clone()])
            }
        })
        .collect()
}

/// Atomic updates over arrays of increasing rank, including rejected dtypes.
pub fn atomic_calls(count: usize) -> Vec<CallCase> {
    let atomic = root_namespace().child("atomic");
    let ops = ["add", "max", "min"];
    let dtypes = [Type::INT32, Type::FLOAT64, Type::INT8];
    (0..count)
        .map(|i| {
            let ndim = (i % 3) as u32 + 1;
            let dtype = dtypes[i % dtypes.len()].clone();
            let index = if ndim == 1 {
                Type::INT64
            } else {
                Type::uni_tuple(Type::INT64, ndim as usize)
            };
            CallCase::new(
                atomic.member(ops[i % ops.len()]),
                vec![Type::array(dtype.clone(), ndim), index, dtype],
            )
        })
        .collect()
}

/// Dotted attribute paths as they appear in kernel source.
pub fn attribute_paths() -> Vec<Vec<&'static str>> {
    vec![
        vec!["cuda", "threadIdx", "x"],
        vec!["cuda", "blockDim", "y"],
        vec!["cuda", "atomic", "compare_and_swap"],
        vec!["cuda", "shared", "array"],
        vec!["cuda", "laneid"],
        vec!["cuda", "missing"],
    ]
}
