use half::f16;
use strata_common::TypeCode;

/// A scalar that can be stored in a [Store](crate::store::Store).
pub trait Element: bytemuck::Pod + core::fmt::Debug + PartialOrd + Send + Sync + 'static {
    /// The type code of stores holding this element.
    const CODE: TypeCode;
}

macro_rules! impl_element {
    ($($ty:ty => $code:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const CODE: TypeCode = TypeCode::$code;
            }
        )*
    };
}

impl_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f16 => Float16,
    f32 => Float32,
    f64 => Float64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_sizes_match_type_codes() {
        fn check<E: Element>() {
            assert_eq!(E::CODE.size(), Some(core::mem::size_of::<E>()), "{}", E::CODE);
        }

        check::<i8>();
        check::<i64>();
        check::<u16>();
        check::<f16>();
        check::<f32>();
        check::<f64>();
    }
}
