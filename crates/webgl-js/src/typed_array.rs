//! Typed-array views over shared byte storage.
//!
//! A [`TypedArray`] is a window onto an [`ArrayBuffer`]. Several views may
//! share one buffer; writes through one view (for example `readPixels`
//! filling a `Uint8Array`) are visible through every other view.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bytemuck::Pod;

use crate::{to_int32, to_uint32};

/// Element type of a typed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedArrayKind {
    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 => 8,
        }
    }

    /// Script-visible constructor name.
    pub fn name(self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
        }
    }

    /// Look a kind up by constructor name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Int8Array" => TypedArrayKind::Int8,
            // Clamped arrays share the byte layout; clamping only matters on store.
            "Uint8Array" | "Uint8ClampedArray" => TypedArrayKind::Uint8,
            "Int16Array" => TypedArrayKind::Int16,
            "Uint16Array" => TypedArrayKind::Uint16,
            "Int32Array" => TypedArrayKind::Int32,
            "Uint32Array" => TypedArrayKind::Uint32,
            "Float32Array" => TypedArrayKind::Float32,
            "Float64Array" => TypedArrayKind::Float64,
            _ => return None,
        })
    }
}

/// Rust element types that can back a typed array.
pub trait TypedElement: Pod {
    const KIND: TypedArrayKind;

    /// Widen to a script number.
    fn to_number(self) -> f64;
}

macro_rules! typed_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl TypedElement for $ty {
                const KIND: TypedArrayKind = TypedArrayKind::$kind;

                fn to_number(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

typed_element! {
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    f32 => Float32,
    f64 => Float64,
}

/// Shared, resizable-at-creation byte storage.
#[derive(Clone, Default)]
pub struct ArrayBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl ArrayBuffer {
    /// Allocate a zero-filled buffer.
    pub fn new(byte_length: usize) -> Self {
        Self::from_bytes(vec![0; byte_length])
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Rc::new(RefCell::new(bytes)),
        }
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.borrow().len()
    }

    /// Copy of the whole buffer contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ArrayBuffer) -> bool {
        Rc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for ArrayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayBuffer")
            .field("byte_length", &self.byte_length())
            .finish()
    }
}

/// A typed view onto an [`ArrayBuffer`].
#[derive(Clone)]
pub struct TypedArray {
    kind: TypedArrayKind,
    buffer: ArrayBuffer,
    byte_offset: usize,
    length: usize,
}

impl TypedArray {
    /// Create a zero-filled array of `length` elements.
    pub fn new(kind: TypedArrayKind, length: usize) -> Self {
        Self {
            kind,
            buffer: ArrayBuffer::new(length * kind.element_size()),
            byte_offset: 0,
            length,
        }
    }

    /// Create an array holding a copy of `values`.
    pub fn from_slice<T: TypedElement>(values: &[T]) -> Self {
        let bytes = bytemuck::cast_slice::<T, u8>(values).to_vec();
        Self {
            kind: T::KIND,
            buffer: ArrayBuffer::from_bytes(bytes),
            byte_offset: 0,
            length: values.len(),
        }
    }

    /// Create an array from script numbers, applying the element type's
    /// store conversion (ToInt32, ToUint8, ...).
    pub fn from_numbers(kind: TypedArrayKind, values: &[f64]) -> Self {
        match kind {
            TypedArrayKind::Int8 => {
                Self::from_slice(&values.iter().map(|v| to_int32(*v) as i8).collect::<Vec<_>>())
            }
            TypedArrayKind::Uint8 => {
                Self::from_slice(&values.iter().map(|v| to_uint32(*v) as u8).collect::<Vec<_>>())
            }
            TypedArrayKind::Int16 => {
                Self::from_slice(&values.iter().map(|v| to_int32(*v) as i16).collect::<Vec<_>>())
            }
            TypedArrayKind::Uint16 => {
                Self::from_slice(&values.iter().map(|v| to_uint32(*v) as u16).collect::<Vec<_>>())
            }
            TypedArrayKind::Int32 => {
                Self::from_slice(&values.iter().map(|v| to_int32(*v)).collect::<Vec<_>>())
            }
            TypedArrayKind::Uint32 => {
                Self::from_slice(&values.iter().map(|v| to_uint32(*v)).collect::<Vec<_>>())
            }
            TypedArrayKind::Float32 => {
                Self::from_slice(&values.iter().map(|v| *v as f32).collect::<Vec<_>>())
            }
            TypedArrayKind::Float64 => Self::from_slice(values),
        }
    }

    /// Create a view onto an existing buffer. Returns `None` when the
    /// offset is misaligned for the element type or the view runs past
    /// the end of the buffer.
    pub fn view(
        kind: TypedArrayKind,
        buffer: ArrayBuffer,
        byte_offset: usize,
        length: usize,
    ) -> Option<Self> {
        if byte_offset % kind.element_size() != 0 {
            return None;
        }
        let end = byte_offset.checked_add(length.checked_mul(kind.element_size())?)?;
        if end > buffer.byte_length() {
            return None;
        }
        Some(Self {
            kind,
            buffer,
            byte_offset,
            length,
        })
    }

    pub fn kind(&self) -> TypedArrayKind {
        self.kind
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.length * self.kind.element_size()
    }

    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// Run `f` over the raw bytes of this view.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let bytes = self.buffer.bytes.borrow();
        f(&bytes[self.byte_offset..self.byte_offset + self.byte_length()])
    }

    /// Run `f` over the raw bytes of this view, mutably.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut bytes = self.buffer.bytes.borrow_mut();
        let end = self.byte_offset + self.byte_length();
        f(&mut bytes[self.byte_offset..end])
    }

    /// Run `f` over the elements of this view. Returns `None` when the
    /// element type does not match. The backing bytes are borrowed in
    /// place when their alignment allows; otherwise they are copied once.
    pub fn with_elements<T: TypedElement, R>(&self, f: impl FnOnce(&[T]) -> R) -> Option<R> {
        if self.kind != T::KIND {
            return None;
        }
        Some(self.with_bytes(|bytes| match bytemuck::try_cast_slice::<u8, T>(bytes) {
            Ok(elements) => f(elements),
            Err(_) => {
                let copied: Vec<T> = bytes
                    .chunks_exact(std::mem::size_of::<T>())
                    .map(bytemuck::pod_read_unaligned)
                    .collect();
                f(&copied)
            }
        }))
    }

    /// Copy the elements out, if the element type matches.
    pub fn to_vec<T: TypedElement>(&self) -> Option<Vec<T>> {
        self.with_elements(|elements: &[T]| elements.to_vec())
    }

    /// Read one element as a script number.
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.length {
            return None;
        }
        let size = self.kind.element_size();
        self.with_bytes(|bytes| {
            let raw = &bytes[index * size..(index + 1) * size];
            Some(match self.kind {
                TypedArrayKind::Int8 => raw[0] as i8 as f64,
                TypedArrayKind::Uint8 => raw[0] as f64,
                TypedArrayKind::Int16 => bytemuck::pod_read_unaligned::<i16>(raw).to_number(),
                TypedArrayKind::Uint16 => bytemuck::pod_read_unaligned::<u16>(raw).to_number(),
                TypedArrayKind::Int32 => bytemuck::pod_read_unaligned::<i32>(raw).to_number(),
                TypedArrayKind::Uint32 => bytemuck::pod_read_unaligned::<u32>(raw).to_number(),
                TypedArrayKind::Float32 => bytemuck::pod_read_unaligned::<f32>(raw).to_number(),
                TypedArrayKind::Float64 => bytemuck::pod_read_unaligned::<f64>(raw),
            })
        })
    }
}

impl PartialEq for TypedArray {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.length == other.length
            && self.with_bytes(|a| other.with_bytes(|b| a == b))
    }
}

impl fmt::Debug for TypedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<f64> = (0..self.length).filter_map(|i| self.get(i)).collect();
        write!(f, "{}({:?})", self.kind.name(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_lengths() {
        let array = TypedArray::from_slice(&[1.0_f32, 2.0, 3.0, 4.0]);
        assert_eq!(array.kind(), TypedArrayKind::Float32);
        assert_eq!(array.len(), 4);
        assert_eq!(array.byte_length(), 16);
    }

    #[test]
    fn test_with_elements_checks_kind() {
        let array = TypedArray::from_slice(&[1_i32, -2, 3]);
        assert_eq!(array.to_vec::<i32>(), Some(vec![1, -2, 3]));
        assert_eq!(array.to_vec::<f32>(), None);
    }

    #[test]
    fn test_unaligned_view_is_rejected() {
        let buffer = ArrayBuffer::new(16);
        assert!(TypedArray::view(TypedArrayKind::Float32, buffer.clone(), 2, 1).is_none());
        assert!(TypedArray::view(TypedArrayKind::Float32, buffer.clone(), 4, 4).is_none());
        assert!(TypedArray::view(TypedArrayKind::Float32, buffer, 4, 3).is_some());
    }

    #[test]
    fn test_views_share_storage() {
        let buffer = ArrayBuffer::new(8);
        let bytes = TypedArray::view(TypedArrayKind::Uint8, buffer.clone(), 0, 8).unwrap();
        let words = TypedArray::view(TypedArrayKind::Uint32, buffer, 4, 1).unwrap();

        bytes.with_bytes_mut(|b| b[4..8].copy_from_slice(&7_u32.to_ne_bytes()));
        assert_eq!(words.to_vec::<u32>(), Some(vec![7]));
    }

    #[test]
    fn test_from_numbers_wraps_like_script() {
        let bytes = TypedArray::from_numbers(TypedArrayKind::Uint8, &[256.0, -1.0, 3.7]);
        assert_eq!(bytes.to_vec::<u8>(), Some(vec![0, 255, 3]));

        let ints = TypedArray::from_numbers(TypedArrayKind::Int32, &[f64::NAN, 2147483648.0]);
        assert_eq!(ints.to_vec::<i32>(), Some(vec![0, -2147483648]));
    }

    #[test]
    fn test_get_reads_elements() {
        let array = TypedArray::from_slice(&[0.5_f32, 1.5]);
        assert_eq!(array.get(1), Some(1.5));
        assert_eq!(array.get(2), None);
    }
}
