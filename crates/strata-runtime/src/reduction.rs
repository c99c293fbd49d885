use core::marker::PhantomData;
use half::f16;
use hashbrown::HashMap;
use num_traits::{Bounded, One, Zero};
use strata_common::{ReductionOp, TypeCode, TypeError};

use crate::element::Element;

/// A reduction operator over one element type.
///
/// Tasks contribute partial values with [apply](Reduction::apply) through a
/// [ReduceAccessor](crate::store::ReduceAccessor). The runtime then merges the accumulators of
/// every point task with [fold](Reduction::fold), starting from [identity](Reduction::identity).
pub trait Reduction: Send + Sync + 'static {
    /// Element type reduced by the operator.
    type Value: Element;
    /// Kind of the operator.
    const OP: ReductionOp;

    /// Value leaving any other value unchanged when folded with it.
    fn identity() -> Self::Value;

    /// Merge a partial value into an accumulator.
    fn apply(lhs: &mut Self::Value, rhs: Self::Value);

    /// Merge two accumulators.
    fn fold(lhs: &mut Self::Value, rhs: Self::Value) {
        Self::apply(lhs, rhs)
    }

    /// Reduction operator id of this reduction.
    fn redop_id() -> Result<u32, TypeError> {
        <Self::Value as Element>::CODE.reduction_op_id(Self::OP)
    }
}

/// Sum reduction.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumReduction<T>(PhantomData<T>);

/// Product reduction.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProdReduction<T>(PhantomData<T>);

/// Maximum reduction.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxReduction<T>(PhantomData<T>);

/// Minimum reduction.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinReduction<T>(PhantomData<T>);

impl<T: Element + Zero> Reduction for SumReduction<T> {
    type Value = T;
    const OP: ReductionOp = ReductionOp::Add;

    fn identity() -> T {
        T::zero()
    }

    fn apply(lhs: &mut T, rhs: T) {
        *lhs = *lhs + rhs;
    }
}

impl<T: Element + One> Reduction for ProdReduction<T> {
    type Value = T;
    const OP: ReductionOp = ReductionOp::Mul;

    fn identity() -> T {
        T::one()
    }

    fn apply(lhs: &mut T, rhs: T) {
        *lhs = *lhs * rhs;
    }
}

impl<T: Element + Bounded> Reduction for MaxReduction<T> {
    type Value = T;
    const OP: ReductionOp = ReductionOp::Max;

    fn identity() -> T {
        T::min_value()
    }

    fn apply(lhs: &mut T, rhs: T) {
        if rhs > *lhs {
            *lhs = rhs;
        }
    }
}

impl<T: Element + Bounded> Reduction for MinReduction<T> {
    type Value = T;
    const OP: ReductionOp = ReductionOp::Min;

    fn identity() -> T {
        T::max_value()
    }

    fn apply(lhs: &mut T, rhs: T) {
        if rhs < *lhs {
            *lhs = rhs;
        }
    }
}

/// Type-erased implementation of a registered reduction.
#[derive(Clone, Copy, Debug)]
pub struct ReductionImpl {
    /// Reduction operator id.
    pub id: u32,
    /// Kind of the operator.
    pub op: ReductionOp,
    /// Element type reduced.
    pub code: TypeCode,
    fill_identity: fn(&mut [u8]),
    fold: fn(&mut [u8], &[u8]),
}

impl ReductionImpl {
    fn new<R: Reduction>(id: u32) -> Self {
        Self {
            id,
            op: R::OP,
            code: <R::Value as Element>::CODE,
            fill_identity: fill_identity::<R>,
            fold: fold_bytes::<R>,
        }
    }

    /// Write the identity in every element of `bytes`.
    pub fn fill_identity(&self, bytes: &mut [u8]) {
        (self.fill_identity)(bytes)
    }

    /// Fold every element of `rhs` into the matching element of `lhs`.
    pub fn fold(&self, lhs: &mut [u8], rhs: &[u8]) {
        (self.fold)(lhs, rhs)
    }
}

fn fill_identity<R: Reduction>(bytes: &mut [u8]) {
    let identity = R::identity();
    let identity = bytemuck::bytes_of(&identity);
    for slot in bytes.chunks_exact_mut(identity.len()) {
        slot.copy_from_slice(identity);
    }
}

fn fold_bytes<R: Reduction>(lhs: &mut [u8], rhs: &[u8]) {
    let size = core::mem::size_of::<R::Value>();
    for (lhs, rhs) in lhs.chunks_exact_mut(size).zip(rhs.chunks_exact(size)) {
        let mut acc: R::Value = bytemuck::pod_read_unaligned(lhs);
        R::fold(&mut acc, bytemuck::pod_read_unaligned(rhs));
        lhs.copy_from_slice(bytemuck::bytes_of(&acc));
    }
}

/// Reductions known to the runtime, keyed by reduction operator id.
#[derive(Debug, Default)]
pub struct ReductionTable {
    reductions: HashMap<u32, ReductionImpl>,
}

macro_rules! register_builtins {
    ($table:expr, $($ty:ty),*) => {
        $(
            $table.register_builtin::<SumReduction<$ty>>();
            $table.register_builtin::<ProdReduction<$ty>>();
            $table.register_builtin::<MaxReduction<$ty>>();
            $table.register_builtin::<MinReduction<$ty>>();
        )*
    };
}

impl ReductionTable {
    /// Create a table holding the sum, product, max and min reductions of every numeric element.
    pub fn with_builtins() -> Self {
        let mut table = Self::default();
        register_builtins!(table, i8, i16, i32, i64, u8, u16, u32, u64, f16, f32, f64);
        table
    }

    // Only called with sum, product, max and min over numeric core types, which every core
    // type code accepts.
    fn register_builtin<R: Reduction>(&mut self) {
        let id = R::redop_id().expect("Builtin reductions should be supported by their type");
        self.insert(ReductionImpl::new::<R>(id));
    }

    fn insert(&mut self, reduction: ReductionImpl) {
        self.reductions.insert(reduction.id, reduction);
    }

    /// Register a custom reduction, returning its reduction operator id.
    pub fn register<R: Reduction>(&mut self) -> Result<u32, TypeError> {
        let id = R::redop_id()?;
        if self.reductions.contains_key(&id) {
            return Err(TypeError::DuplicateReduction {
                op: R::OP,
                ty: <R::Value as Element>::CODE.to_string(),
            });
        }
        self.insert(ReductionImpl::new::<R>(id));
        Ok(id)
    }

    /// Look up the reduction of `op` over `code`.
    pub fn get(&self, op: ReductionOp, code: TypeCode) -> Result<&ReductionImpl, TypeError> {
        let id = code.reduction_op_id(op)?;
        self.reductions
            .get(&id)
            .ok_or_else(|| TypeError::UnsupportedReduction {
                op,
                ty: code.to_string(),
            })
    }

    /// Number of registered reductions.
    pub fn len(&self) -> usize {
        self.reductions.len()
    }

    /// Whether no reduction is registered.
    pub fn is_empty(&self) -> bool {
        self.reductions.is_empty()
    }
}
