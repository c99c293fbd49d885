use alloc::{format, sync::Arc, vec, vec::Vec};
use core::marker::PhantomData;
use spin::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use strata_common::{Coord, Domain, Rect, TypeCode, tile};

use crate::{element::Element, error::RuntimeError, reduction::Reduction};

/// A typed, row-major buffer owned by the runtime.
///
/// Cloning a store, or partitioning it, creates a new view sharing the same buffer. Views keep
/// the global indices of their parent: accessors are always indexed with global coordinates.
#[derive(Clone)]
pub struct Store {
    code: TypeCode,
    elem_size: usize,
    domain: Domain,
    root: Domain,
    data: Arc<RwLock<Vec<u8>>>,
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store")
            .field("code", &self.code)
            .field("domain", &self.domain)
            .field("root", &self.root)
            .finish()
    }
}

impl Store {
    /// Create a zero-filled store.
    pub(crate) fn zeros(code: TypeCode, domain: Domain) -> Result<Self, RuntimeError> {
        let elem_size = code.size().ok_or_else(|| RuntimeError::InvalidInput {
            reason: format!("Can't create a store of variable sized type {code}"),
        })?;
        let data = vec![0u8; domain.volume() * elem_size];

        Ok(Self {
            code,
            elem_size,
            root: domain.clone(),
            domain,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Create a one dimensional store over `[0, values.len() - 1]`.
    pub(crate) fn from_slice<T: Element>(values: &[T]) -> Self {
        let domain = Domain::from(Rect::with_len(values.len()));
        let data = bytemuck::cast_slice::<T, u8>(values).to_vec();

        Self {
            code: T::CODE,
            elem_size: core::mem::size_of::<T>(),
            root: domain.clone(),
            domain,
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Create a store where every element is `value`.
    pub(crate) fn filled<T: Element>(domain: Domain, value: T) -> Self {
        let values = vec![value; domain.volume()];
        let mut store = Self::from_slice(&values);
        store.root = domain.clone();
        store.domain = domain;
        store
    }

    /// Type code of the elements.
    pub fn code(&self) -> TypeCode {
        self.code
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.domain.dim()
    }

    /// Global bounds of this view.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Global bounds of this one dimensional view.
    ///
    /// # Panics
    ///
    /// If the store isn't one dimensional.
    pub fn shape(&self) -> Rect {
        self.domain.rect()
    }

    /// Number of elements in this view.
    pub fn volume(&self) -> usize {
        self.domain.volume()
    }

    /// Whether both stores are views of the same buffer.
    pub fn shares_buffer(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Read-only access to the elements of this one dimensional view.
    ///
    /// # Panics
    ///
    /// If `T` doesn't match the store type or if the store isn't one dimensional.
    pub fn read_accessor<T: Element>(&self) -> ReadAccessor<'_, T> {
        assert_eq!(self.code, T::CODE, "Read accessor type mismatch");
        let shape = self.shape();

        ReadAccessor {
            data: self.data.read(),
            shape,
            origin: self.root.rect().lo,
            _element: PhantomData,
        }
    }

    /// Exclusive reduction access to the elements of this one dimensional view.
    ///
    /// # Panics
    ///
    /// If the reduction value type doesn't match the store type or if the store isn't one
    /// dimensional.
    pub fn reduce_accessor<R: Reduction>(&mut self) -> ReduceAccessor<'_, R> {
        assert_eq!(
            self.code,
            <R::Value as Element>::CODE,
            "Reduce accessor type mismatch"
        );
        let shape = self.shape();

        ReduceAccessor {
            data: self.data.write(),
            shape,
            origin: self.root.rect().lo,
            _reduction: PhantomData,
        }
    }

    /// Split this one dimensional view into `tiles` contiguous views.
    ///
    /// # Panics
    ///
    /// If the store isn't one dimensional or `tiles` is zero.
    pub fn partition(&self, tiles: usize) -> Vec<Store> {
        tile(self.shape(), tiles)
            .into_iter()
            .map(|rect| Store {
                domain: Domain::from(rect),
                ..self.clone()
            })
            .collect()
    }

    /// Copy the elements of this view.
    ///
    /// # Panics
    ///
    /// If `T` doesn't match the store type.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        assert_eq!(self.code, T::CODE, "Store type mismatch");
        self.with_bytes(|bytes| {
            bytes
                .chunks_exact(self.elem_size)
                .map(bytemuck::pod_read_unaligned)
                .collect()
        })
    }

    pub(crate) fn with_bytes<O>(&self, func: impl FnOnce(&[u8]) -> O) -> O {
        let data = self.data.read();
        func(&data[self.byte_range()])
    }

    pub(crate) fn with_bytes_mut<O>(&self, func: impl FnOnce(&mut [u8]) -> O) -> O {
        let range = self.byte_range();
        let mut data = self.data.write();
        func(&mut data[range])
    }

    fn byte_range(&self) -> core::ops::Range<usize> {
        if self.domain == self.root {
            return 0..self.root.volume() * self.elem_size;
        }

        // Only one dimensional stores are partitioned into views.
        let rect = self.domain.rect();
        let start = (rect.lo - self.root.rect().lo) as usize * self.elem_size;
        start..start + rect.volume() * self.elem_size
    }
}

/// Read-only accessor over a one dimensional store, indexed with global coordinates.
pub struct ReadAccessor<'a, T: Element> {
    data: RwLockReadGuard<'a, Vec<u8>>,
    shape: Rect,
    origin: Coord,
    _element: PhantomData<T>,
}

impl<T: Element> ReadAccessor<'_, T> {
    /// Global bounds readable through this accessor.
    pub fn shape(&self) -> Rect {
        self.shape
    }

    /// Read the element at global `index`.
    ///
    /// # Panics
    ///
    /// If `index` is outside of the accessor shape.
    pub fn get(&self, index: Coord) -> T {
        assert!(
            self.shape.contains(index),
            "Index {index} out of bounds {}",
            self.shape
        );
        let size = core::mem::size_of::<T>();
        let offset = (index - self.origin) as usize * size;
        bytemuck::pod_read_unaligned(&self.data[offset..offset + size])
    }
}

/// Exclusive reduction accessor over a one dimensional store, indexed with global coordinates.
///
/// This is the only way a task contributes to a reduction: every call to [reduce](Self::reduce)
/// merges a partial value into the slot with [Reduction::apply].
pub struct ReduceAccessor<'a, R: Reduction> {
    data: RwLockWriteGuard<'a, Vec<u8>>,
    shape: Rect,
    origin: Coord,
    _reduction: PhantomData<R>,
}

impl<R: Reduction> ReduceAccessor<'_, R> {
    /// Global bounds reducible through this accessor.
    pub fn shape(&self) -> Rect {
        self.shape
    }

    /// Merge `value` into the slot at global `index`.
    ///
    /// # Panics
    ///
    /// If `index` is outside of the accessor shape.
    pub fn reduce(&mut self, index: Coord, value: R::Value) {
        assert!(
            self.shape.contains(index),
            "Index {index} out of bounds {}",
            self.shape
        );
        let size = core::mem::size_of::<R::Value>();
        let offset = (index - self.origin) as usize * size;
        let slot = &mut self.data[offset..offset + size];

        let mut current: R::Value = bytemuck::pod_read_unaligned(slot);
        R::apply(&mut current, value);
        slot.copy_from_slice(bytemuck::bytes_of(&current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::{MaxReduction, SumReduction};

    #[test]
    fn read_accessor_uses_global_indices() {
        let store = Store::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0]);
        let parts = store.partition(2);

        let second = parts[1].read_accessor::<f32>();
        assert_eq!(second.shape(), Rect::new(3, 4));
        assert_eq!(second.get(3), 4.0);
        assert_eq!(second.get(4), 5.0);
    }

    #[test]
    #[should_panic]
    fn read_accessor_rejects_out_of_bounds() {
        let store = Store::from_slice(&[1.0f32, 2.0, 3.0, 4.0]);
        let parts = store.partition(2);

        parts[1].read_accessor::<f32>().get(1);
    }

    #[test]
    #[should_panic(expected = "type mismatch")]
    fn read_accessor_checks_type() {
        Store::from_slice(&[1i32, 2]).read_accessor::<f32>();
    }

    #[test]
    fn reduce_accessor_applies_reduction() {
        let mut store = Store::filled(Domain::from(Rect::new(0, 1)), 1.5f32);
        {
            let mut sum = store.reduce_accessor::<SumReduction<f32>>();
            sum.reduce(0, 2.0);
            sum.reduce(0, 0.5);
            sum.reduce(1, -1.5);
        }

        assert_eq!(store.to_vec::<f32>(), vec![4.0, 0.0]);
    }

    #[test]
    fn reduce_accessor_on_view_touches_only_its_slots() {
        let store = Store::from_slice(&[1i64, 5, 3, 9]);
        let mut parts = store.partition(2);
        {
            let mut max = parts[1].reduce_accessor::<MaxReduction<i64>>();
            max.reduce(2, 7);
            max.reduce(3, 7);
        }

        assert_eq!(store.to_vec::<i64>(), vec![1, 5, 7, 9]);
        assert_eq!(parts[0].to_vec::<i64>(), vec![1, 5]);
    }

    #[test]
    fn zeros_rejects_variable_sized_types() {
        let err = Store::zeros(TypeCode::String, Domain::from_extents(&[3])).unwrap_err();

        assert!(matches!(err, RuntimeError::InvalidInput { .. }));
    }

    #[test]
    fn multi_dimensional_store_keeps_domain() {
        let store = Store::zeros(TypeCode::Float64, Domain::from_extents(&[2, 3])).unwrap();

        assert_eq!(store.dim(), 2);
        assert_eq!(store.volume(), 6);
        assert_eq!(store.to_vec::<f64>(), vec![0.0; 6]);
    }

    #[test]
    fn partition_shares_buffer() {
        let store = Store::from_slice(&[0u8; 8]);

        for part in store.partition(3) {
            assert!(part.shares_buffer(&store));
        }
    }
}
