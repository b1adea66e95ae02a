//! [`Field`] impls for std, glam and crate types.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use super::{Field, FieldMut, FieldRef, Optional, ScalarMut, ScalarRef, Sequence, Tuple};
use crate::util::{Buffer, ScalarSlice, ScalarSliceMut};

impl Field for bool {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Scalar(ScalarRef::Bool(*self))
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Scalar(ScalarMut::Bool(self))
    }
}

impl Field for String {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Scalar(ScalarRef::Str(self))
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Scalar(ScalarMut::Str(self))
    }
}

impl Field for Buffer {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Buffer(self)
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Buffer(self)
    }
}

// === Sequences ===

impl<T: Field + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn resize(&mut self, len: usize) {
        self.resize_with(len, T::default);
    }

    fn element(&self, index: usize) -> &dyn Field {
        &self[index]
    }

    fn element_mut(&mut self, index: usize) -> &mut dyn Field {
        &mut self[index]
    }

    fn scalars(&self) -> Option<ScalarSlice<'_>> {
        T::scalar_slice(self)
    }

    fn scalars_mut(&mut self) -> Option<ScalarSliceMut<'_>> {
        T::scalar_slice_mut(self)
    }
}

impl<T: Field + Default> Field for Vec<T> {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Sequence(self)
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Sequence(self)
    }
}

// === Optional and proxies ===

impl<T: Field + Default> Optional for Option<T> {
    fn get(&self) -> Option<&dyn Field> {
        self.as_ref().map(|v| v as &dyn Field)
    }

    fn get_mut(&mut self) -> Option<&mut dyn Field> {
        self.as_mut().map(|v| v as &mut dyn Field)
    }

    fn insert_default(&mut self) -> &mut dyn Field {
        self.insert(T::default())
    }

    fn clear(&mut self) {
        *self = None;
    }
}

impl<T: Field + Default> Field for Option<T> {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Optional(self)
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Optional(self)
    }
}

/// Boxes are transparent: they encode as the pointee.
impl<T: Field> Field for Box<T> {
    fn view(&self) -> FieldRef<'_> {
        (**self).view()
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        (**self).view_mut()
    }
}

// === Tuples ===

impl<T: Field, const N: usize> Tuple for [T; N] {
    fn arity(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> &dyn Field {
        &self[index]
    }

    fn element_mut(&mut self, index: usize) -> &mut dyn Field {
        &mut self[index]
    }
}

impl<T: Field, const N: usize> Field for [T; N] {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Tuple(self)
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Tuple(self)
    }
}

macro_rules! impl_tuple {
    ($arity:literal: $($name:ident $idx:tt),*) => {
        impl<$($name: Field),*> Tuple for ($($name,)*) {
            fn arity(&self) -> usize {
                $arity
            }

            fn element(&self, index: usize) -> &dyn Field {
                match index {
                    $($idx => &self.$idx,)*
                    _ => panic!("tuple index {} out of range for arity {}", index, $arity),
                }
            }

            fn element_mut(&mut self, index: usize) -> &mut dyn Field {
                match index {
                    $($idx => &mut self.$idx,)*
                    _ => panic!("tuple index {} out of range for arity {}", index, $arity),
                }
            }
        }

        impl<$($name: Field),*> Field for ($($name,)*) {
            fn view(&self) -> FieldRef<'_> {
                FieldRef::Tuple(self)
            }

            fn view_mut(&mut self) -> FieldMut<'_> {
                FieldMut::Tuple(self)
            }
        }
    };
}

impl_tuple!(2: A 0, B 1);
impl_tuple!(3: A 0, B 1, C 2);
impl_tuple!(4: A 0, B 1, C 2, D 3);

// === glam ===

macro_rules! impl_glam_vector {
    ($ty:ty, $arity:literal: $($idx:literal => $comp:ident),*) => {
        impl Tuple for $ty {
            fn arity(&self) -> usize {
                $arity
            }

            fn element(&self, index: usize) -> &dyn Field {
                match index {
                    $($idx => &self.$comp,)*
                    _ => panic!("{} has no component {}", stringify!($ty), index),
                }
            }

            fn element_mut(&mut self, index: usize) -> &mut dyn Field {
                match index {
                    $($idx => &mut self.$comp,)*
                    _ => panic!("{} has no component {}", stringify!($ty), index),
                }
            }
        }

        impl Field for $ty {
            fn view(&self) -> FieldRef<'_> {
                FieldRef::Tuple(self)
            }

            fn view_mut(&mut self) -> FieldMut<'_> {
                FieldMut::Tuple(self)
            }
        }
    };
}

impl_glam_vector!(Vec2, 2: 0 => x, 1 => y);
impl_glam_vector!(Vec3, 3: 0 => x, 1 => y, 2 => z);
impl_glam_vector!(Vec4, 4: 0 => x, 1 => y, 2 => z, 3 => w);
impl_glam_vector!(Quat, 4: 0 => x, 1 => y, 2 => z, 3 => w);

/// Column-major, 16 floats, matching the wire layout.
impl Tuple for Mat4 {
    fn arity(&self) -> usize {
        16
    }

    fn element(&self, index: usize) -> &dyn Field {
        let col = match index / 4 {
            0 => &self.x_axis,
            1 => &self.y_axis,
            2 => &self.z_axis,
            3 => &self.w_axis,
            _ => panic!("Mat4 has no element {}", index),
        };
        col.element(index % 4)
    }

    fn element_mut(&mut self, index: usize) -> &mut dyn Field {
        let col = match index / 4 {
            0 => &mut self.x_axis,
            1 => &mut self.y_axis,
            2 => &mut self.z_axis,
            3 => &mut self.w_axis,
            _ => panic!("Mat4 has no element {}", index),
        };
        col.element_mut(index % 4)
    }
}

impl Field for Mat4 {
    fn view(&self) -> FieldRef<'_> {
        FieldRef::Tuple(self)
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Tuple(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_advertises_bulk_storage() {
        let mut v = vec![1.0f32, 2.0];
        assert!(matches!(v.scalars(), Some(ScalarSlice::Float32(_))));
        assert!(v.scalars_mut().is_some());

        let strings = vec![String::from("a")];
        assert!(strings.scalars().is_none());
    }

    #[test]
    fn test_sequence_resize() {
        let mut v: Vec<String> = Vec::new();
        Sequence::resize(&mut v, 3);
        assert_eq!(v, ["", "", ""]);
    }

    #[test]
    fn test_mat4_element_order() {
        let m = Mat4::from_cols_array(&std::array::from_fn(|i| i as f32));
        for i in 0..16 {
            assert!(matches!(m.element(i).view(), FieldRef::Scalar(ScalarRef::Float32(v)) if v == i as f32));
        }
    }

    #[test]
    fn test_option_insert_default() {
        let mut o: Option<u8> = None;
        assert!(Optional::get(&o).is_none());
        o.insert_default();
        assert_eq!(o, Some(0));
        Optional::clear(&mut o);
        assert_eq!(o, None);
    }

    #[test]
    fn test_box_is_transparent() {
        let b = Box::new(7u16);
        assert!(matches!(b.view(), FieldRef::Scalar(ScalarRef::Uint16(7))));
    }
}
