use db_core::DbType;

/// A raw `MYSQL_TYPE_*` wire type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeId(pub u8);

impl TypeId {
    pub const DECIMAL: TypeId = TypeId(0);
    pub const TINY: TypeId = TypeId(1);
    pub const SHORT: TypeId = TypeId(2);
    pub const LONG: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);
    pub const NULL: TypeId = TypeId(6);
    pub const TIMESTAMP: TypeId = TypeId(7);
    pub const LONGLONG: TypeId = TypeId(8);
    pub const INT24: TypeId = TypeId(9);
    pub const DATE: TypeId = TypeId(10);
    pub const TIME: TypeId = TypeId(11);
    pub const DATETIME: TypeId = TypeId(12);
    pub const YEAR: TypeId = TypeId(13);
    pub const NEWDATE: TypeId = TypeId(14);
    pub const VARCHAR: TypeId = TypeId(15);
    pub const BIT: TypeId = TypeId(16);
    pub const NEWDECIMAL: TypeId = TypeId(246);
    pub const ENUM: TypeId = TypeId(247);
    pub const SET: TypeId = TypeId(248);
    pub const TINY_BLOB: TypeId = TypeId(249);
    pub const MEDIUM_BLOB: TypeId = TypeId(250);
    pub const LONG_BLOB: TypeId = TypeId(251);
    pub const BLOB: TypeId = TypeId(252);
    pub const VAR_STRING: TypeId = TypeId(253);
    pub const STRING: TypeId = TypeId(254);
    pub const GEOMETRY: TypeId = TypeId(255);

    /// Maps a wire type code to the engine-agnostic [`DbType`] per the
    /// connection-agnostic type detection table: everything not explicitly
    /// named (blobs, enum, set, bit, decimal, geometry, ...) is reported as
    /// `Binary`.
    pub fn detect(self) -> DbType {
        match self {
            TypeId::TINY => DbType::Byte,
            TypeId::SHORT | TypeId::YEAR => DbType::Short,
            TypeId::LONG | TypeId::INT24 => DbType::Int,
            TypeId::LONGLONG => DbType::Int64,
            TypeId::FLOAT => DbType::Float,
            TypeId::DOUBLE => DbType::Double,
            TypeId::DATE | TypeId::NEWDATE => DbType::Date,
            TypeId::TIME => DbType::Time,
            TypeId::DATETIME => DbType::DateTime,
            TypeId::TIMESTAMP => DbType::Timestamp,
            TypeId::VARCHAR | TypeId::VAR_STRING | TypeId::STRING => DbType::String,
            _ => DbType::Binary,
        }
    }

    /// Maps an engine-agnostic [`DbType`] back to the wire type code used
    /// when describing a bound parameter in a `COM_STMT_EXECUTE` type block.
    pub fn for_bind(ty: DbType) -> TypeId {
        match ty {
            DbType::Bool | DbType::Byte => TypeId::TINY,
            DbType::Short => TypeId::SHORT,
            DbType::Int => TypeId::LONG,
            DbType::Int64 => TypeId::LONGLONG,
            DbType::Float => TypeId::FLOAT,
            DbType::Double => TypeId::DOUBLE,
            DbType::Time => TypeId::TIME,
            DbType::Date => TypeId::DATE,
            DbType::DateTime => TypeId::DATETIME,
            DbType::Timestamp => TypeId::TIMESTAMP,
            DbType::String => TypeId::VAR_STRING,
            DbType::Binary => TypeId::BLOB,
        }
    }
}
