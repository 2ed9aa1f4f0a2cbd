//! Conversion between host values and graphics-API scalars.
//!
//! Scalars follow the host's coercions (ToNumber, ToInt32, ToUint32,
//! ToString). Objects, arrays and functions never coerce to scalars.

use std::rc::Rc;

use webgl_js::{to_int32, to_uint32, JsValue, TypedArray, TypedElement};

use crate::objects::{ObjectKind, WebGLObject};
use crate::TypeError;

// ==================== Scalars ====================

pub fn decode_bool(value: &JsValue) -> bool {
    value.is_truthy()
}

pub fn decode_f64(value: &JsValue) -> Result<f64, TypeError> {
    value
        .to_number()
        .ok_or_else(|| TypeError::new("number", value.type_name()))
}

pub fn decode_f32(value: &JsValue) -> Result<f32, TypeError> {
    decode_f64(value).map(|n| n as f32)
}

pub fn decode_i32(value: &JsValue) -> Result<i32, TypeError> {
    decode_f64(value).map(to_int32)
}

pub fn decode_u32(value: &JsValue) -> Result<u32, TypeError> {
    decode_f64(value).map(to_uint32)
}

/// Pointer-sized signed integer (buffer offsets and sizes).
pub fn decode_isize(value: &JsValue) -> Result<isize, TypeError> {
    decode_f64(value).map(|n| if n.is_finite() { n.trunc() as isize } else { 0 })
}

pub fn decode_string(value: &JsValue) -> Result<String, TypeError> {
    value
        .to_js_string()
        .ok_or_else(|| TypeError::new("string", value.type_name()))
}

/// Plain sequence whose elements all decode to `T`.
pub fn decode_sequence<T>(
    value: &JsValue,
    decode: impl Fn(&JsValue) -> Result<T, TypeError>,
) -> Result<Vec<T>, TypeError> {
    match value {
        JsValue::Array(items) => items.iter().map(decode).collect(),
        other => Err(TypeError::new("sequence", other.type_name())),
    }
}

/// A wrapper of the given kind, or `None` for `null`/`undefined`.
pub fn decode_object(
    value: &JsValue,
    kind: ObjectKind,
) -> Result<Option<Rc<WebGLObject>>, TypeError> {
    if value.is_nullish() {
        return Ok(None);
    }
    match WebGLObject::from_js(value) {
        Some(object) if object.kind() == kind => Ok(Some(object)),
        _ => Err(TypeError::new(kind.name(), value.type_name())),
    }
}

// ==================== Arrays ====================

/// Element types accepted by array-taking methods.
pub trait ArrayElement: TypedElement {
    fn decode(value: &JsValue) -> Result<Self, TypeError>;
}

impl ArrayElement for f32 {
    fn decode(value: &JsValue) -> Result<Self, TypeError> {
        decode_f32(value)
    }
}

impl ArrayElement for i32 {
    fn decode(value: &JsValue) -> Result<Self, TypeError> {
        decode_i32(value)
    }
}

/// Elements of a typed-array-or-sequence argument.
#[derive(Debug, Clone)]
pub enum ArrayData<T> {
    /// A matching typed array, read in place.
    View(TypedArray),
    /// A plain sequence decoded into temporary storage.
    Owned(Vec<T>),
}

impl<T: ArrayElement> ArrayData<T> {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::View(array) => array.len(),
            ArrayData::Owned(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` over the elements. `None` only if a view's element type no
    /// longer matches, which decoding rules out.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> Option<R> {
        match self {
            ArrayData::View(array) => array.with_elements(f),
            ArrayData::Owned(values) => Some(f(values)),
        }
    }
}

/// Outcome of decoding a typed-array-or-sequence argument.
#[derive(Debug, Clone)]
pub enum ArrayArg<T> {
    Data(ArrayData<T>),
    /// `null` or `undefined`: the caller posts INVALID_VALUE.
    Missing,
}

/// Typed array of element type `T` first, then plain sequence, then null.
pub fn decode_array<T: ArrayElement>(value: &JsValue) -> Result<ArrayArg<T>, TypeError> {
    match value {
        JsValue::TypedArray(array) if array.kind() == T::KIND => {
            Ok(ArrayArg::Data(ArrayData::View(array.clone())))
        }
        JsValue::Array(_) => decode_sequence(value, T::decode).map(|v| ArrayArg::Data(ArrayData::Owned(v))),
        JsValue::Undefined | JsValue::Null => Ok(ArrayArg::Missing),
        other => Err(TypeError::new(T::KIND.name(), other.type_name())),
    }
}

// ==================== Arguments ====================

/// Positional arguments of one call. Missing arguments read as `undefined`.
#[derive(Debug)]
pub struct Arguments<'a> {
    values: &'a [JsValue],
    undefined: JsValue,
}

impl<'a> Arguments<'a> {
    pub fn new(values: &'a [JsValue]) -> Self {
        Self {
            values,
            undefined: JsValue::Undefined,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> &JsValue {
        self.values.get(index).unwrap_or(&self.undefined)
    }

    pub fn bool(&self, index: usize) -> bool {
        decode_bool(self.get(index))
    }

    pub fn i32(&self, index: usize) -> Result<i32, TypeError> {
        decode_i32(self.get(index)).map_err(|e| e.at(index))
    }

    pub fn u32(&self, index: usize) -> Result<u32, TypeError> {
        decode_u32(self.get(index)).map_err(|e| e.at(index))
    }

    pub fn f32(&self, index: usize) -> Result<f32, TypeError> {
        decode_f32(self.get(index)).map_err(|e| e.at(index))
    }

    pub fn isize(&self, index: usize) -> Result<isize, TypeError> {
        decode_isize(self.get(index)).map_err(|e| e.at(index))
    }

    pub fn string(&self, index: usize) -> Result<String, TypeError> {
        decode_string(self.get(index)).map_err(|e| e.at(index))
    }

    pub fn object(
        &self,
        index: usize,
        kind: ObjectKind,
    ) -> Result<Option<Rc<WebGLObject>>, TypeError> {
        decode_object(self.get(index), kind).map_err(|e| e.at(index))
    }

    pub fn array<T: ArrayElement>(&self, index: usize) -> Result<ArrayArg<T>, TypeError> {
        decode_array(self.get(index)).map_err(|e| e.at(index))
    }

    /// A typed array of any element type, or `None` for null/undefined.
    pub fn typed_array(&self, index: usize) -> Result<Option<TypedArray>, TypeError> {
        match self.get(index) {
            JsValue::TypedArray(array) => Ok(Some(array.clone())),
            JsValue::Undefined | JsValue::Null => Ok(None),
            other => Err(TypeError::new("ArrayBufferView", other.type_name()).at(index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ContextId;
    use webgl_js::JsObject;

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode_i32(&JsValue::Number(-3.7)), Ok(-3));
        assert_eq!(decode_i32(&JsValue::Number(4294967296.0 + 5.0)), Ok(5));
        assert_eq!(decode_u32(&JsValue::Number(-1.0)), Ok(u32::MAX));
        assert_eq!(decode_i32(&JsValue::Boolean(true)), Ok(1));
        assert_eq!(decode_i32(&JsValue::Null), Ok(0));
        assert_eq!(decode_i32(&JsValue::Undefined), Ok(0));
        assert_eq!(decode_f32(&JsValue::from("2.5")), Ok(2.5));
    }

    #[test]
    fn test_decode_rejects_objects() {
        let err = decode_i32(&JsValue::Array(vec![])).unwrap_err();
        assert_eq!(err.expected, "number");
        assert_eq!(err.found, "array");
        assert!(decode_f32(&JsValue::Object(JsObject::plain())).is_err());
        assert!(decode_f32(&JsValue::Function).is_err());
    }

    #[test]
    fn test_decode_string() {
        assert_eq!(decode_string(&JsValue::from("abc")).unwrap(), "abc");
        assert_eq!(decode_string(&JsValue::Number(12.0)).unwrap(), "12");
        assert_eq!(decode_string(&JsValue::Null).unwrap(), "null");
        assert!(decode_string(&JsValue::Object(JsObject::plain())).is_err());
    }

    #[test]
    fn test_decode_sequence_fails_on_any_element() {
        let good = JsValue::Array(vec![JsValue::Number(1.0), JsValue::from("2")]);
        assert_eq!(decode_sequence(&good, decode_i32).unwrap(), vec![1, 2]);

        let bad = JsValue::Array(vec![JsValue::Number(1.0), JsValue::Function]);
        assert!(decode_sequence(&bad, decode_i32).is_err());
    }

    #[test]
    fn test_decode_object_kinds() {
        let buffer = Rc::new(WebGLObject::named(ObjectKind::Buffer, 1, ContextId::new()));
        let value = buffer.to_js();

        assert!(decode_object(&value, ObjectKind::Buffer).unwrap().is_some());
        assert!(decode_object(&JsValue::Null, ObjectKind::Buffer).unwrap().is_none());
        let err = decode_object(&value, ObjectKind::Texture).unwrap_err();
        assert_eq!(err.expected, "WebGLTexture");
        assert!(decode_object(&JsValue::Number(1.0), ObjectKind::Buffer).is_err());
    }

    #[test]
    fn test_decode_array_prefers_matching_view() {
        let view = JsValue::TypedArray(TypedArray::from_slice(&[1.0_f32, 2.0]));
        match decode_array::<f32>(&view).unwrap() {
            ArrayArg::Data(data @ ArrayData::View(_)) => assert_eq!(data.len(), 2),
            other => panic!("unexpected {:?}", other),
        }

        let plain = JsValue::Array(vec![JsValue::Number(1.0), JsValue::Number(2.0)]);
        match decode_array::<f32>(&plain).unwrap() {
            ArrayArg::Data(ArrayData::Owned(values)) => assert_eq!(values, vec![1.0, 2.0]),
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(decode_array::<f32>(&JsValue::Null).unwrap(), ArrayArg::Missing));
    }

    #[test]
    fn test_decode_array_rejects_mismatched_view() {
        let ints = JsValue::TypedArray(TypedArray::from_slice(&[1_i32]));
        let err = decode_array::<f32>(&ints).unwrap_err();
        assert_eq!(err.expected, "Float32Array");
        assert_eq!(err.found, "Int32Array");
        assert!(decode_array::<f32>(&JsValue::Number(1.0)).is_err());
    }

    #[test]
    fn test_arguments_pad_with_undefined() {
        let values = [JsValue::Number(3.0)];
        let args = Arguments::new(&values);
        assert_eq!(args.i32(0), Ok(3));
        assert!(args.get(4).is_undefined());
        assert!(!args.bool(4));
        assert_eq!(args.string(5).unwrap(), "undefined");
    }

    #[test]
    fn test_arguments_report_index() {
        let values = [JsValue::Number(3.0), JsValue::Function];
        let args = Arguments::new(&values);
        assert_eq!(args.u32(1).unwrap_err().index, 1);
    }
}
