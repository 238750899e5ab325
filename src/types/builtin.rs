//! Built-in descriptor pairs.
//!
//! Owning descriptors sit at odd registry indices; the no-copy sibling of the
//! descriptor at index `n` is at `n + 1`.

use super::descriptor::{compare_values, Ownership, TypeDescriptor};
use super::value::{Value, ValueKind};

macro_rules! builtin_descriptors {
    ($($owned:ident, $shared:ident, $name:literal, $kind:ident, $index:literal;)*) => {
        $(
            #[doc = concat!("Owning descriptor for `", $name, "` values.")]
            pub static $owned: TypeDescriptor = TypeDescriptor::new(
                $name,
                ValueKind::$kind,
                Ownership::Owned,
                $index,
                compare_values,
                None,
            );

            #[doc = concat!("No-copy descriptor for `", $name, "` values.")]
            pub static $shared: TypeDescriptor = TypeDescriptor::new(
                concat!($name, "_no_copy"),
                ValueKind::$kind,
                Ownership::Shared,
                $index + 1,
                compare_values,
                None,
            );
        )*

        pub(crate) static BUILTINS: &[&TypeDescriptor] = &[$(&$owned, &$shared,)*];

        /// Owning built-in descriptor for a kind.
        pub fn descriptor_for_kind(kind: ValueKind) -> &'static TypeDescriptor {
            match kind {
                $(ValueKind::$kind => &$owned,)*
            }
        }
    };
}

builtin_descriptors! {
    TYPE_NULL, TYPE_NULL_NO_COPY, "null", Null, 1;
    TYPE_BOOL, TYPE_BOOL_NO_COPY, "bool", Bool, 3;
    TYPE_I8, TYPE_I8_NO_COPY, "i8", I8, 5;
    TYPE_I16, TYPE_I16_NO_COPY, "i16", I16, 7;
    TYPE_I32, TYPE_I32_NO_COPY, "i32", I32, 9;
    TYPE_I64, TYPE_I64_NO_COPY, "i64", I64, 11;
    TYPE_U8, TYPE_U8_NO_COPY, "u8", U8, 13;
    TYPE_U16, TYPE_U16_NO_COPY, "u16", U16, 15;
    TYPE_U32, TYPE_U32_NO_COPY, "u32", U32, 17;
    TYPE_U64, TYPE_U64_NO_COPY, "u64", U64, 19;
    TYPE_F32, TYPE_F32_NO_COPY, "f32", F32, 21;
    TYPE_F64, TYPE_F64_NO_COPY, "f64", F64, 23;
    TYPE_STRING, TYPE_STRING_NO_COPY, "string", Str, 25;
    TYPE_BYTES, TYPE_BYTES_NO_COPY, "bytes", Bytes, 27;
    TYPE_VECTOR, TYPE_VECTOR_NO_COPY, "vector", Vector, 29;
    TYPE_HASH_TABLE, TYPE_HASH_TABLE_NO_COPY, "hash_table", HashTable, 31;
}

/// Owning built-in descriptor matching a value's representation.
pub fn descriptor_for_value(value: &Value<'_>) -> &'static TypeDescriptor {
    descriptor_for_kind(value.kind())
}
