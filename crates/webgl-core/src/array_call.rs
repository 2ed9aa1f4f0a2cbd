//! Shared path for the array-taking uniform and vertex-attribute setters.
//!
//! `uniform{1,2,3,4}{f,i}v`, `uniformMatrix{2,3,4}fv` and
//! `vertexAttrib{1,2,3,4}fv` differ only in their leading arguments, the
//! element type, the length rule and the driver entry point. Each family
//! is an [`ArrayCall`] strategy; [`process_array_call`] runs the common
//! decode, length check and invocation.

use std::rc::Rc;

use tracing::debug;

use crate::constants::*;
use crate::context::RenderingContext;
use crate::driver::GlDriver;
use crate::marshal::{ArrayArg, ArrayElement, Arguments};
use crate::objects::{ObjectKind, WebGLObject};
use crate::{JsValue, TypeError};

pub(crate) trait ArrayCall {
    type Element: ArrayElement;
    /// Decoded leading arguments.
    type Lead;
    /// What the driver call needs from the leading arguments.
    type Target: Copy;

    fn name(&self) -> &'static str;

    /// Position of the array argument.
    fn array_index(&self) -> usize;

    fn decode_lead(&self, args: &Arguments<'_>) -> Result<Self::Lead, TypeError>;

    /// Validate the leading arguments. `None` ends the call; any error has
    /// already been posted.
    fn prepare(&self, ctx: &RenderingContext, lead: Self::Lead) -> Option<Self::Target>;

    /// Element count to pass to the driver, or `None` for a bad length.
    fn count(&self, len: usize) -> Option<i32>;

    fn invoke(
        &self,
        driver: &dyn GlDriver,
        target: Self::Target,
        count: i32,
        values: &[Self::Element],
    );
}

pub(crate) fn process_array_call<C: ArrayCall>(
    ctx: &mut RenderingContext,
    args: &Arguments<'_>,
    call: C,
) -> Result<JsValue, TypeError> {
    let lead = call.decode_lead(args)?;
    let array = args.array::<C::Element>(call.array_index())?;

    let Some(target) = call.prepare(ctx, lead) else {
        return Ok(JsValue::Undefined);
    };
    let data = match array {
        ArrayArg::Data(data) => data,
        ArrayArg::Missing => {
            debug!(caller = call.name(), "Array argument is null");
            ctx.set_error(INVALID_VALUE);
            return Ok(JsValue::Undefined);
        }
    };
    let Some(count) = call.count(data.len()) else {
        debug!(caller = call.name(), len = data.len(), "Bad array length");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Undefined);
    };

    let driver = ctx.driver();
    data.with_slice(|values| call.invoke(driver, target, count, values));
    Ok(JsValue::Undefined)
}

/// Resolve a uniform location argument for a setter.
///
/// `null` is a silent no-op. Locations from another context, or queried
/// from a program other than the current one, are INVALID_OPERATION.
pub(crate) fn uniform_target(
    ctx: &RenderingContext,
    caller: &str,
    location: Option<Rc<WebGLObject>>,
) -> Option<i32> {
    let location = location?;
    let validator = ctx.validator();
    if !validator.validate_object(caller, Some(&location))
        || !validator.location_program(caller, &location, ctx.current_program)
    {
        return None;
    }
    location.uniform_location_parts().map(|(_, native)| native)
}

fn vector_count(len: usize, min: usize) -> Option<i32> {
    (len >= min && len % min == 0).then(|| (len / min) as i32)
}

// ==================== Strategies ====================

pub(crate) type UniformVectorFn<T> = fn(&dyn GlDriver, i32, i32, &[T]);
pub(crate) type UniformMatrixFn = fn(&dyn GlDriver, i32, i32, bool, &[f32]);
pub(crate) type VertexAttribFn = fn(&dyn GlDriver, u32, &[f32]);

/// `uniform{N}{f,i}v(location, values)`.
pub(crate) struct UniformVector<T> {
    name: &'static str,
    min: usize,
    call: UniformVectorFn<T>,
}

impl<T> UniformVector<T> {
    pub fn new(name: &'static str, min: usize, call: UniformVectorFn<T>) -> Self {
        Self { name, min, call }
    }
}

impl<T: ArrayElement> ArrayCall for UniformVector<T> {
    type Element = T;
    type Lead = Option<Rc<WebGLObject>>;
    type Target = i32;

    fn name(&self) -> &'static str {
        self.name
    }

    fn array_index(&self) -> usize {
        1
    }

    fn decode_lead(&self, args: &Arguments<'_>) -> Result<Self::Lead, TypeError> {
        args.object(0, ObjectKind::UniformLocation)
    }

    fn prepare(&self, ctx: &RenderingContext, lead: Self::Lead) -> Option<i32> {
        uniform_target(ctx, self.name, lead)
    }

    fn count(&self, len: usize) -> Option<i32> {
        vector_count(len, self.min)
    }

    fn invoke(&self, driver: &dyn GlDriver, location: i32, count: i32, values: &[T]) {
        (self.call)(driver, location, count, values)
    }
}

/// `uniformMatrix{N}fv(location, transpose, values)`.
pub(crate) struct UniformMatrix {
    name: &'static str,
    min: usize,
    call: UniformMatrixFn,
}

impl UniformMatrix {
    pub fn new(name: &'static str, min: usize, call: UniformMatrixFn) -> Self {
        Self { name, min, call }
    }
}

impl ArrayCall for UniformMatrix {
    type Element = f32;
    type Lead = (Option<Rc<WebGLObject>>, bool);
    type Target = i32;

    fn name(&self) -> &'static str {
        self.name
    }

    fn array_index(&self) -> usize {
        2
    }

    fn decode_lead(&self, args: &Arguments<'_>) -> Result<Self::Lead, TypeError> {
        Ok((args.object(0, ObjectKind::UniformLocation)?, args.bool(1)))
    }

    fn prepare(&self, ctx: &RenderingContext, (location, transpose): Self::Lead) -> Option<i32> {
        let location = uniform_target(ctx, self.name, location)?;
        if transpose {
            ctx.set_error(INVALID_VALUE);
            return None;
        }
        Some(location)
    }

    fn count(&self, len: usize) -> Option<i32> {
        vector_count(len, self.min)
    }

    fn invoke(&self, driver: &dyn GlDriver, location: i32, count: i32, values: &[f32]) {
        (self.call)(driver, location, count, false, values)
    }
}

/// `vertexAttrib{N}fv(index, values)`: exactly `len` elements.
pub(crate) struct VertexAttribVector {
    name: &'static str,
    len: usize,
    call: VertexAttribFn,
}

impl VertexAttribVector {
    pub fn new(name: &'static str, len: usize, call: VertexAttribFn) -> Self {
        Self { name, len, call }
    }
}

impl ArrayCall for VertexAttribVector {
    type Element = f32;
    type Lead = u32;
    type Target = u32;

    fn name(&self) -> &'static str {
        self.name
    }

    fn array_index(&self) -> usize {
        1
    }

    fn decode_lead(&self, args: &Arguments<'_>) -> Result<u32, TypeError> {
        args.u32(0)
    }

    fn prepare(&self, ctx: &RenderingContext, index: u32) -> Option<u32> {
        crate::api::vertex::check_attrib_index(ctx, self.name, index).then_some(index)
    }

    fn count(&self, len: usize) -> Option<i32> {
        (len == self.len).then_some(1)
    }

    fn invoke(&self, driver: &dyn GlDriver, index: u32, _count: i32, values: &[f32]) {
        (self.call)(driver, index, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_count() {
        assert_eq!(vector_count(8, 4), Some(2));
        assert_eq!(vector_count(3, 4), None);
        assert_eq!(vector_count(6, 4), None);
        assert_eq!(vector_count(0, 1), None);
        assert_eq!(vector_count(16, 16), Some(1));
    }
}
