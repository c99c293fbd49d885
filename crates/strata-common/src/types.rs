use alloc::string::{String, ToString};
use derive_more::Display;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First reduction operator id handed out to core reductions.
pub const REDOP_BASE: u32 = 1 << 20;

/// Number of core type codes.
pub const TYPE_TOTAL: u32 = 15;

/// Type code of the elements held by a store.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum TypeCode {
    /// Boolean.
    #[display("bool")]
    Bool = 0,
    /// 8-bit signed integer.
    #[display("int8")]
    Int8 = 1,
    /// 16-bit signed integer.
    #[display("int16")]
    Int16 = 2,
    /// 32-bit signed integer.
    #[display("int32")]
    Int32 = 3,
    /// 64-bit signed integer.
    #[display("int64")]
    Int64 = 4,
    /// 8-bit unsigned integer.
    #[display("uint8")]
    UInt8 = 5,
    /// 16-bit unsigned integer.
    #[display("uint16")]
    UInt16 = 6,
    /// 32-bit unsigned integer.
    #[display("uint32")]
    UInt32 = 7,
    /// 64-bit unsigned integer.
    #[display("uint64")]
    UInt64 = 8,
    /// Half precision float.
    #[display("float16")]
    Float16 = 9,
    /// Single precision float.
    #[display("float32")]
    Float32 = 10,
    /// Double precision float.
    #[display("float64")]
    Float64 = 11,
    /// Complex number of two single precision floats.
    #[display("complex64")]
    Complex64 = 12,
    /// Complex number of two double precision floats.
    #[display("complex128")]
    Complex128 = 13,
    /// Variable sized UTF-8 string.
    #[display("string")]
    String = 14,
}

impl TypeCode {
    /// Every core type code, in code order.
    pub const ALL: [TypeCode; TYPE_TOTAL as usize] = [
        TypeCode::Bool,
        TypeCode::Int8,
        TypeCode::Int16,
        TypeCode::Int32,
        TypeCode::Int64,
        TypeCode::UInt8,
        TypeCode::UInt16,
        TypeCode::UInt32,
        TypeCode::UInt64,
        TypeCode::Float16,
        TypeCode::Float32,
        TypeCode::Float64,
        TypeCode::Complex64,
        TypeCode::Complex128,
        TypeCode::String,
    ];

    /// Numeric value of the code.
    pub const fn code(&self) -> u32 {
        *self as u32
    }

    /// Size of one element in bytes, `None` for variable sized types.
    pub const fn size(&self) -> Option<usize> {
        match self {
            TypeCode::Bool | TypeCode::Int8 | TypeCode::UInt8 => Some(1),
            TypeCode::Int16 | TypeCode::UInt16 | TypeCode::Float16 => Some(2),
            TypeCode::Int32 | TypeCode::UInt32 | TypeCode::Float32 => Some(4),
            TypeCode::Int64 | TypeCode::UInt64 | TypeCode::Float64 | TypeCode::Complex64 => {
                Some(8)
            }
            TypeCode::Complex128 => Some(16),
            TypeCode::String => None,
        }
    }

    /// Whether elements don't have a fixed size.
    pub const fn variable_size(&self) -> bool {
        self.size().is_none()
    }

    /// Reduction operators defined on this type.
    pub fn supported_reductions(&self) -> &'static [ReductionOp] {
        match self {
            TypeCode::Bool
            | TypeCode::Int8
            | TypeCode::Int16
            | TypeCode::Int32
            | TypeCode::Int64
            | TypeCode::UInt8
            | TypeCode::UInt16
            | TypeCode::UInt32
            | TypeCode::UInt64 => &ReductionOp::ALL,
            TypeCode::Float16 | TypeCode::Float32 | TypeCode::Float64 => &FLOAT_REDUCTIONS,
            TypeCode::Complex64 | TypeCode::Complex128 => &COMPLEX_REDUCTIONS,
            TypeCode::String => &[],
        }
    }

    /// The reduction operator id of `op` over this type.
    pub fn reduction_op_id(&self, op: ReductionOp) -> Result<u32, TypeError> {
        if !self.supported_reductions().contains(&op) {
            return Err(TypeError::UnsupportedReduction {
                op,
                ty: self.to_string(),
            });
        }

        Ok(REDOP_BASE + op.kind() * TYPE_TOTAL + self.code())
    }
}

/// Kind of reduction applied when combining values.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum ReductionOp {
    /// Sum (+).
    Add = 0,
    /// Difference (-).
    Sub = 1,
    /// Product (*).
    Mul = 2,
    /// Quotient (/).
    Div = 3,
    /// Maximum.
    Max = 4,
    /// Minimum.
    Min = 5,
    /// Bitwise or.
    Or = 6,
    /// Bitwise and.
    And = 7,
    /// Bitwise xor.
    Xor = 8,
}

const FLOAT_REDUCTIONS: [ReductionOp; 6] = [
    ReductionOp::Add,
    ReductionOp::Sub,
    ReductionOp::Mul,
    ReductionOp::Div,
    ReductionOp::Min,
    ReductionOp::Max,
];

const COMPLEX_REDUCTIONS: [ReductionOp; 4] = [
    ReductionOp::Add,
    ReductionOp::Sub,
    ReductionOp::Mul,
    ReductionOp::Div,
];

impl ReductionOp {
    /// Every reduction operator, in kind order.
    pub const ALL: [ReductionOp; 9] = [
        ReductionOp::Add,
        ReductionOp::Sub,
        ReductionOp::Mul,
        ReductionOp::Div,
        ReductionOp::Max,
        ReductionOp::Min,
        ReductionOp::Or,
        ReductionOp::And,
        ReductionOp::Xor,
    ];

    /// Numeric kind of the operator.
    pub const fn kind(&self) -> u32 {
        *self as u32
    }
}

/// Errors raised by type lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The type isn't part of the type system.
    #[error("{0} is not a valid type in this type system")]
    UnknownType(String),

    /// The type name is already taken.
    #[error("{0} is already in this type system")]
    DuplicateType(String),

    /// The reduction isn't defined on the type.
    #[error("{op} is not a valid reduction op for type {ty}")]
    UnsupportedReduction {
        /// Requested operator.
        op: ReductionOp,
        /// Type the operator was requested on.
        ty: String,
    },

    /// The reduction is already registered for the type.
    #[error("reduction op {op} is already registered to type {ty}")]
    DuplicateReduction {
        /// Registered operator.
        op: ReductionOp,
        /// Type the operator is registered on.
        ty: String,
    },
}

/// A named data type with its size, code and reduction operator ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataType {
    name: String,
    size: Option<usize>,
    code: u32,
    redop_ids: HashMap<ReductionOp, u32>,
}

impl DataType {
    /// Create a type without any reduction.
    pub fn new(name: impl Into<String>, size: Option<usize>, code: u32) -> Self {
        Self {
            name: name.into(),
            size,
            code,
            redop_ids: HashMap::new(),
        }
    }

    fn core(ty: TypeCode) -> Self {
        let mut dtype = Self::new(ty.to_string(), ty.size(), ty.code());
        for op in ty.supported_reductions() {
            // Core codes always accept their own supported reductions.
            if let Ok(id) = ty.reduction_op_id(*op) {
                dtype.redop_ids.insert(*op, id);
            }
        }
        dtype
    }

    /// Name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of one element in bytes, `None` for variable sized types.
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    /// Numeric code of the type.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Whether elements don't have a fixed size.
    pub fn variable_size(&self) -> bool {
        self.size.is_none()
    }

    /// The reduction operator id registered for `op`.
    pub fn reduction_op_id(&self, op: ReductionOp) -> Result<u32, TypeError> {
        self.redop_ids
            .get(&op)
            .copied()
            .ok_or_else(|| TypeError::UnsupportedReduction {
                op,
                ty: self.name.clone(),
            })
    }

    /// Register `redop_id` as the implementation of `op` over this type.
    pub fn register_reduction_op(
        &mut self,
        op: ReductionOp,
        redop_id: u32,
    ) -> Result<(), TypeError> {
        if self.redop_ids.contains_key(&op) {
            return Err(TypeError::DuplicateReduction {
                op,
                ty: self.name.clone(),
            });
        }
        self.redop_ids.insert(op, redop_id);
        Ok(())
    }

    fn copy_all_reduction_ops(&self, other: &mut DataType) -> Result<(), TypeError> {
        for (op, id) in self.redop_ids.iter() {
            other.register_reduction_op(*op, *id)?;
        }
        Ok(())
    }
}

/// A registry of named data types.
#[derive(Clone, Debug)]
pub struct TypeSystem {
    types: HashMap<String, DataType>,
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TypeSystem {
    /// Create a type system, optionally seeded with the core types.
    pub fn new(inherit_core_types: bool) -> Self {
        let mut types = HashMap::new();
        if inherit_core_types {
            for ty in TypeCode::ALL {
                let dtype = DataType::core(ty);
                types.insert(dtype.name.clone(), dtype);
            }
        }
        Self { types }
    }

    /// Whether a type with that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Look a type up by name.
    pub fn get(&self, name: &str) -> Result<&DataType, TypeError> {
        self.types
            .get(name)
            .ok_or_else(|| TypeError::UnknownType(name.to_string()))
    }

    /// Add a new type.
    pub fn add_type(
        &mut self,
        name: &str,
        size: Option<usize>,
        code: u32,
    ) -> Result<&DataType, TypeError> {
        if self.types.contains_key(name) {
            return Err(TypeError::DuplicateType(name.to_string()));
        }
        let dtype = DataType::new(name, size, code);
        Ok(&*self.types.entry(name.to_string()).or_insert(dtype))
    }

    /// Make `alias` refer to a copy of `src`, keeping its size and code.
    pub fn make_alias(
        &mut self,
        alias: &str,
        src: &str,
        copy_reduction_ops: bool,
    ) -> Result<&DataType, TypeError> {
        let dtype = self.get(src)?;
        let mut copy = DataType::new(alias, dtype.size, dtype.code);
        if copy_reduction_ops {
            dtype.copy_all_reduction_ops(&mut copy)?;
        }
        self.types.insert(alias.to_string(), copy);
        self.get(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_sizes_match_codes() {
        assert_eq!(TypeCode::Float32.size(), Some(4));
        assert_eq!(TypeCode::Complex128.size(), Some(16));
        assert!(TypeCode::String.variable_size());
        for (index, ty) in TypeCode::ALL.iter().enumerate() {
            assert_eq!(ty.code(), index as u32);
        }
    }

    #[test]
    fn reduction_op_id_follows_kind_and_code() {
        let id = TypeCode::Float32.reduction_op_id(ReductionOp::Add).unwrap();
        assert_eq!(id, REDOP_BASE + 10);

        let id = TypeCode::Int32.reduction_op_id(ReductionOp::Xor).unwrap();
        assert_eq!(id, REDOP_BASE + 8 * TYPE_TOTAL + 3);
    }

    #[test]
    fn float_types_reject_bitwise_reductions() {
        let err = TypeCode::Float64
            .reduction_op_id(ReductionOp::Or)
            .unwrap_err();

        assert!(matches!(err, TypeError::UnsupportedReduction { .. }));
        assert!(TypeCode::Complex64.reduction_op_id(ReductionOp::Max).is_err());
        assert!(TypeCode::Complex64.reduction_op_id(ReductionOp::Div).is_ok());
        assert!(TypeCode::String.supported_reductions().is_empty());
    }

    #[test]
    fn type_system_rejects_duplicates() {
        let mut types = TypeSystem::default();

        assert!(types.contains("float32"));
        assert_eq!(
            types.add_type("float32", Some(4), 10).unwrap_err(),
            TypeError::DuplicateType("float32".to_string())
        );
        assert!(types.add_type("point3", Some(24), 100).is_ok());
        assert!(matches!(types.get("nope"), Err(TypeError::UnknownType(_))));
    }

    #[test]
    fn alias_copies_reduction_ops_on_request() {
        let mut types = TypeSystem::default();

        let alias = types.make_alias("real", "float32", true).unwrap();
        assert_eq!(alias.code(), TypeCode::Float32.code());
        assert_eq!(
            alias.reduction_op_id(ReductionOp::Add),
            TypeCode::Float32.reduction_op_id(ReductionOp::Add)
        );

        let bare = types.make_alias("raw", "float32", false).unwrap();
        assert!(bare.reduction_op_id(ReductionOp::Add).is_err());
    }

    #[test]
    fn empty_type_system_has_no_core_types() {
        assert!(!TypeSystem::new(false).contains("int8"));
    }
}
