//! Script evaluation into host values.
//!
//! The runtime evaluates source text with Boa and converts the result into
//! a [`JsValue`], reading arrays element by element and recognising typed
//! arrays by constructor name so they arrive as [`TypedArray`]s.

use tracing::{debug, trace};

use crate::{JsError, JsObject, JsValue, TypedArray, TypedArrayKind};

/// Configuration for the JS runtime.
#[derive(Debug, Clone)]
pub struct JsRuntimeConfig {
    /// Evaluate every script in strict mode.
    pub strict_mode: bool,
    /// Arrays nested deeper than this convert to plain objects.
    pub max_array_depth: usize,
}

impl Default for JsRuntimeConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_array_depth: 8,
        }
    }
}

/// JavaScript runtime.
pub struct JsRuntime {
    #[cfg(feature = "boa")]
    context: boa_engine::Context,
    config: JsRuntimeConfig,
}

impl JsRuntime {
    /// Create a new JS runtime.
    pub fn new() -> Result<Self, JsError> {
        Self::with_config(JsRuntimeConfig::default())
    }

    /// Create a JS runtime with custom config.
    pub fn with_config(config: JsRuntimeConfig) -> Result<Self, JsError> {
        #[cfg(feature = "boa")]
        let context = boa_engine::Context::default();

        debug!(strict = config.strict_mode, "JS runtime initialized");

        Ok(Self {
            #[cfg(feature = "boa")]
            context,
            config,
        })
    }

    pub fn config(&self) -> &JsRuntimeConfig {
        &self.config
    }

    /// Evaluate JavaScript code.
    pub fn evaluate_script(&mut self, source: &str) -> Result<JsValue, JsError> {
        trace!(len = source.len(), "Evaluating script");

        #[cfg(feature = "boa")]
        {
            use boa_engine::Source;

            let text = if self.config.strict_mode {
                format!("'use strict';\n{}", source)
            } else {
                source.to_string()
            };

            let value = self
                .context
                .eval(Source::from_bytes(&text))
                .map_err(|err| JsError::ExecutionError(err.to_string()))?;
            convert_boa_value(&value, &mut self.context, self.config.max_array_depth)
        }

        #[cfg(not(feature = "boa"))]
        {
            Err(JsError::NotInitialized)
        }
    }

    /// Set a global variable. Only primitives can be injected.
    pub fn set_global(&mut self, name: &str, value: &JsValue) -> Result<(), JsError> {
        let literal = match value {
            JsValue::Undefined => "undefined".to_string(),
            JsValue::Null => "null".to_string(),
            JsValue::Boolean(b) => b.to_string(),
            JsValue::Number(n) if n.is_nan() => "NaN".to_string(),
            JsValue::Number(n) if n.is_infinite() => {
                if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
            }
            JsValue::Number(n) => format!("{:?}", n),
            JsValue::String(s) => format!("{:?}", s),
            other => {
                return Err(JsError::TypeError(format!(
                    "cannot inject {} as a global",
                    other.type_name()
                )))
            }
        };
        self.evaluate_script(&format!("var {} = {};", name, literal))?;
        Ok(())
    }

    /// Get a global variable.
    pub fn get_global(&mut self, name: &str) -> Result<JsValue, JsError> {
        self.evaluate_script(name)
    }
}

impl std::fmt::Debug for JsRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsRuntime")
            .field("config", &self.config)
            .finish()
    }
}

/// Convert a Boa value into a host value.
#[cfg(feature = "boa")]
fn convert_boa_value(
    value: &boa_engine::JsValue,
    context: &mut boa_engine::Context,
    depth: usize,
) -> Result<JsValue, JsError> {
    use boa_engine::JsValue as BoaValue;

    Ok(match value {
        BoaValue::Undefined => JsValue::Undefined,
        BoaValue::Null => JsValue::Null,
        BoaValue::Boolean(b) => JsValue::Boolean(*b),
        BoaValue::Integer(n) => JsValue::Number(*n as f64),
        BoaValue::Rational(n) => JsValue::Number(*n),
        BoaValue::String(s) => JsValue::String(s.to_std_string_escaped()),
        BoaValue::Object(obj) => {
            if obj.is_callable() {
                JsValue::Function
            } else if obj.is_array() && depth > 0 {
                let length = read_length(obj, context)?;
                let mut items = Vec::with_capacity(length);
                for index in 0..length {
                    let item = obj
                        .get(index as u32, context)
                        .map_err(|err| JsError::ExecutionError(err.to_string()))?;
                    items.push(convert_boa_value(&item, context, depth - 1)?);
                }
                JsValue::Array(items)
            } else if let Some(kind) = typed_array_kind(obj, context)? {
                let length = read_length(obj, context)?;
                let mut numbers = Vec::with_capacity(length);
                for index in 0..length {
                    let number = obj
                        .get(index as u32, context)
                        .and_then(|item| item.to_number(context))
                        .map_err(|err| JsError::ExecutionError(err.to_string()))?;
                    numbers.push(number);
                }
                let array = TypedArray::from_numbers(kind, &numbers);
                trace!(kind = kind.name(), length, "Converted typed array");
                JsValue::TypedArray(array)
            } else {
                JsValue::Object(JsObject::plain())
            }
        }
        _ => JsValue::Undefined,
    })
}

#[cfg(feature = "boa")]
fn read_length(
    obj: &boa_engine::JsObject,
    context: &mut boa_engine::Context,
) -> Result<usize, JsError> {
    obj.get(boa_engine::js_string!("length"), context)
        .and_then(|len| len.to_length(context))
        .map(|len| len as usize)
        .map_err(|err| JsError::ExecutionError(err.to_string()))
}

#[cfg(feature = "boa")]
fn constructor_name(
    obj: &boa_engine::JsObject,
    context: &mut boa_engine::Context,
) -> Result<Option<String>, JsError> {
    let constructor = obj
        .get(boa_engine::js_string!("constructor"), context)
        .map_err(|err| JsError::ExecutionError(err.to_string()))?;
    let Some(constructor) = constructor.as_object() else {
        return Ok(None);
    };
    let name = constructor
        .get(boa_engine::js_string!("name"), context)
        .map_err(|err| JsError::ExecutionError(err.to_string()))?;
    Ok(name.as_string().map(|s| s.to_std_string_escaped()))
}

#[cfg(feature = "boa")]
fn typed_array_kind(
    obj: &boa_engine::JsObject,
    context: &mut boa_engine::Context,
) -> Result<Option<TypedArrayKind>, JsError> {
    Ok(constructor_name(obj, context)?
        .as_deref()
        .and_then(TypedArrayKind::from_name))
}
