//! # WebGL JS
//!
//! Script host value layer for the WebGL bindings.
//!
//! ## Design Goals
//!
//! 1. **Engine abstraction**: bindings see [`JsValue`], never engine types
//! 2. **Typed arrays**: contiguous views readable in place
//! 3. **Native objects**: wrappers handed to scripts as [`JsObject`]s and
//!    recovered by downcasting
//! 4. **Script coercions**: ToNumber, ToInt32, ToUint32, ToString as the
//!    host performs them

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[cfg(feature = "boa")]
pub mod runtime;
pub mod typed_array;

#[cfg(feature = "boa")]
pub use runtime::{JsRuntime, JsRuntimeConfig};
pub use typed_array::{ArrayBuffer, TypedArray, TypedArrayKind, TypedElement};

/// Errors that can occur in JS operations.
#[derive(Error, Debug)]
pub enum JsError {
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Engine not initialized")]
    NotInitialized,
}

/// Marker for script objects that carry no native backing.
#[derive(Debug)]
struct PlainObject;

/// A script-visible object.
///
/// Native wrappers are stored type-erased and recovered with
/// [`JsObject::downcast`]. Identity is pointer identity.
#[derive(Clone)]
pub struct JsObject {
    inner: Rc<dyn Any>,
}

impl JsObject {
    /// Wrap a native value.
    pub fn new<T: Any>(value: Rc<T>) -> Self {
        Self { inner: value }
    }

    /// A script object with no native backing (`{}` and friends).
    pub fn plain() -> Self {
        Self {
            inner: Rc::new(PlainObject),
        }
    }

    /// Recover the native value, if this object wraps a `T`.
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.inner).downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_ref().is::<T>()
    }

    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is::<PlainObject>() {
            f.write_str("JsObject(plain)")
        } else {
            f.write_str("JsObject(native)")
        }
    }
}

/// A JavaScript value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<JsValue>),
    TypedArray(TypedArray),
    Object(JsObject),
    Function,
}

impl JsValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsValue::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    /// Script ToNumber for primitives. Objects, arrays and functions
    /// yield `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            JsValue::Undefined => Some(f64::NAN),
            JsValue::Null => Some(0.0),
            JsValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            JsValue::Number(n) => Some(*n),
            JsValue::String(s) => Some(string_to_number(s)),
            _ => None,
        }
    }

    /// Script ToString for primitives.
    pub fn to_js_string(&self) -> Option<String> {
        match self {
            JsValue::Undefined => Some("undefined".to_string()),
            JsValue::Null => Some("null".to_string()),
            JsValue::Boolean(b) => Some(b.to_string()),
            JsValue::Number(n) => Some(number_to_string(*n)),
            JsValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsValue]> {
        match self {
            JsValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_typed_array(&self) -> Option<&TypedArray> {
        match self {
            JsValue::TypedArray(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "null",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Array(_) => "array",
            JsValue::TypedArray(array) => array.kind().name(),
            JsValue::Object(_) => "object",
            JsValue::Function => "function",
        }
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        JsValue::Boolean(value)
    }
}

impl From<i32> for JsValue {
    fn from(value: i32) -> Self {
        JsValue::Number(value as f64)
    }
}

impl From<u32> for JsValue {
    fn from(value: u32) -> Self {
        JsValue::Number(value as f64)
    }
}

impl From<f32> for JsValue {
    fn from(value: f32) -> Self {
        JsValue::Number(value as f64)
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        JsValue::Number(value)
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        JsValue::String(value)
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        JsValue::String(value.to_string())
    }
}

impl From<TypedArray> for JsValue {
    fn from(value: TypedArray) -> Self {
        JsValue::TypedArray(value)
    }
}

impl From<JsObject> for JsValue {
    fn from(value: JsObject) -> Self {
        JsValue::Object(value)
    }
}

impl From<Vec<JsValue>> for JsValue {
    fn from(value: Vec<JsValue>) -> Self {
        JsValue::Array(value)
    }
}

impl<T: Into<JsValue>> From<Option<T>> for JsValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(JsValue::Null, Into::into)
    }
}

/// Script ToInt32.
pub fn to_int32(number: f64) -> i32 {
    to_uint32(number) as i32
}

/// Script ToUint32.
pub fn to_uint32(number: f64) -> u32 {
    if !number.is_finite() {
        return 0;
    }
    number.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64);
    }
    // Rust accepts "inf" and "nan" spellings that scripts do not.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
