//! Size and alignment of target types, LP64 layout.

use crate::registry::TypeRegistry;
use crate::target::{Scalar, StructType, TargetType};

/// Width of a machine pointer in bytes.
pub const POINTER_SIZE: u64 = std::mem::size_of::<*const ()>() as u64;

fn scalar_size(scalar: Scalar) -> u64 {
    match scalar {
        Scalar::Bool | Scalar::Char | Scalar::Uint8 => 1,
        Scalar::Int16 | Scalar::Uint16 => 2,
        Scalar::Int32 | Scalar::Int | Scalar::Uint | Scalar::Float => 4,
        Scalar::Long
        | Scalar::Ulong
        | Scalar::LongLong
        | Scalar::UlongLong
        | Scalar::Double
        | Scalar::Complex64 => 8,
        Scalar::Complex128 => 16,
    }
}

fn scalar_align(scalar: Scalar) -> u64 {
    match scalar {
        Scalar::Complex64 => 4,
        Scalar::Complex128 => 8,
        other => scalar_size(other),
    }
}

/// Size of `ty` in bytes. Named types are measured through the registry;
/// unknown names count as one pointer.
pub fn size_of(ty: &TargetType, types: &TypeRegistry) -> u64 {
    match ty {
        TargetType::Invalid => 0,
        TargetType::Scalar(s) => scalar_size(*s),
        TargetType::OpaquePointer | TargetType::Pointer(_) | TargetType::Func(_) => POINTER_SIZE,
        TargetType::Array { elem, len } => size_of(elem, types).saturating_mul(*len),
        TargetType::Named(name) => match types.get(name) {
            Some(named) => size_of(&named.underlying, types),
            None => POINTER_SIZE,
        },
        TargetType::Struct(st) => struct_layout(st, types).0,
        // slice header: data, len, cap
        TargetType::VarArgs => 3 * POINTER_SIZE,
    }
}

pub fn align_of(ty: &TargetType, types: &TypeRegistry) -> u64 {
    match ty {
        TargetType::Invalid => 1,
        TargetType::Scalar(s) => scalar_align(*s),
        TargetType::OpaquePointer
        | TargetType::Pointer(_)
        | TargetType::Func(_)
        | TargetType::VarArgs => POINTER_SIZE,
        TargetType::Array { elem, .. } => align_of(elem, types),
        TargetType::Named(name) => match types.get(name) {
            Some(named) => align_of(&named.underlying, types),
            None => POINTER_SIZE,
        },
        TargetType::Struct(st) => struct_layout(st, types).1,
    }
}

/// (size, align) with every field at its natural alignment.
fn struct_layout(st: &StructType, types: &TypeRegistry) -> (u64, u64) {
    let mut offset = 0u64;
    let mut max_align = 1u64;
    for field in &st.fields {
        let align = align_of(&field.ty, types);
        max_align = max_align.max(align);
        offset = align_up(offset, align) + size_of(&field.ty, types);
    }
    (align_up(offset, max_align), max_align)
}

fn align_up(offset: u64, align: u64) -> u64 {
    if align <= 1 {
        offset
    } else {
        offset.div_ceil(align) * align
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NamedKind, NamedType};
    use crate::target::Param;

    #[test]
    fn test_size_scalars() {
        let types = TypeRegistry::new();
        assert_eq!(size_of(&Scalar::Char.into(), &types), 1);
        assert_eq!(size_of(&Scalar::Int.into(), &types), 4);
        assert_eq!(size_of(&Scalar::Long.into(), &types), 8);
        assert_eq!(size_of(&Scalar::Double.into(), &types), 8);
        assert_eq!(size_of(&TargetType::OpaquePointer, &types), POINTER_SIZE);
    }

    #[test]
    fn test_size_struct_padding() {
        let types = TypeRegistry::new();
        let st = TargetType::Struct(StructType {
            fields: vec![
                Param::new(Some("c".into()), Scalar::Char.into()),
                Param::new(Some("d".into()), Scalar::Double.into()),
                Param::new(Some("i".into()), Scalar::Int.into()),
            ],
        });
        assert_eq!(size_of(&st, &types), 24);
        assert_eq!(align_of(&st, &types), 8);
    }

    #[test]
    fn test_size_named_and_array() {
        let mut types = TypeRegistry::new();
        types.register(NamedType {
            name: "Vec3".into(),
            kind: NamedKind::Struct,
            underlying: TargetType::Struct(StructType {
                fields: vec![Param::new(
                    Some("v".into()),
                    TargetType::array(Scalar::Float.into(), 3),
                )],
            }),
        });
        assert_eq!(size_of(&TargetType::named("Vec3"), &types), 12);
        assert_eq!(
            size_of(&TargetType::array(TargetType::named("Vec3"), 2), &types),
            24
        );
    }
}
