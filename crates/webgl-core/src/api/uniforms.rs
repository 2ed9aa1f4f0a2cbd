//! Uniform setters.

use super::HandlerResult;
use crate::array_call::{process_array_call, uniform_target, UniformMatrix, UniformVector};
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::ObjectKind;
use crate::JsValue;

/// `uniform{N}f` / `uniform{N}i`: location then N scalars.
macro_rules! uniform_scalars {
    ($($handler:ident, $method:literal, $decode:ident, $driver:ident, [$($arg:ident = $i:literal),+];)*) => {$(
        pub(crate) fn $handler(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
            let location = args.object(0, ObjectKind::UniformLocation)?;
            $(let $arg = args.$decode($i)?;)+
            if let Some(location) = uniform_target(ctx, $method, location) {
                ctx.driver().$driver(location, $($arg),+);
            }
            Ok(JsValue::Undefined)
        }
    )*};
}

/// `uniform{N}{f,i}v`: location then a sequence of N-element groups.
macro_rules! uniform_vectors {
    ($($handler:ident, $method:literal, $element:ty, $min:literal, $driver:ident;)*) => {$(
        pub(crate) fn $handler(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
            process_array_call(
                ctx,
                args,
                UniformVector::<$element>::new($method, $min, |driver, location, count, values| {
                    driver.$driver(location, count, values)
                }),
            )
        }
    )*};
}

/// `uniformMatrix{N}fv`: location, transpose, then N×N-element groups.
macro_rules! uniform_matrices {
    ($($handler:ident, $method:literal, $min:literal, $driver:ident;)*) => {$(
        pub(crate) fn $handler(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
            process_array_call(
                ctx,
                args,
                UniformMatrix::new($method, $min, |driver, location, count, transpose, values| {
                    driver.$driver(location, count, transpose, values)
                }),
            )
        }
    )*};
}

uniform_scalars! {
    uniform_1f, "uniform1f", f32, uniform_1f, [x = 1];
    uniform_2f, "uniform2f", f32, uniform_2f, [x = 1, y = 2];
    uniform_3f, "uniform3f", f32, uniform_3f, [x = 1, y = 2, z = 3];
    uniform_4f, "uniform4f", f32, uniform_4f, [x = 1, y = 2, z = 3, w = 4];
    uniform_1i, "uniform1i", i32, uniform_1i, [x = 1];
    uniform_2i, "uniform2i", i32, uniform_2i, [x = 1, y = 2];
    uniform_3i, "uniform3i", i32, uniform_3i, [x = 1, y = 2, z = 3];
    uniform_4i, "uniform4i", i32, uniform_4i, [x = 1, y = 2, z = 3, w = 4];
}

uniform_vectors! {
    uniform_1fv, "uniform1fv", f32, 1, uniform_1fv;
    uniform_2fv, "uniform2fv", f32, 2, uniform_2fv;
    uniform_3fv, "uniform3fv", f32, 3, uniform_3fv;
    uniform_4fv, "uniform4fv", f32, 4, uniform_4fv;
    uniform_1iv, "uniform1iv", i32, 1, uniform_1iv;
    uniform_2iv, "uniform2iv", i32, 2, uniform_2iv;
    uniform_3iv, "uniform3iv", i32, 3, uniform_3iv;
    uniform_4iv, "uniform4iv", i32, 4, uniform_4iv;
}

uniform_matrices! {
    uniform_matrix_2fv, "uniformMatrix2fv", 4, uniform_matrix_2fv;
    uniform_matrix_3fv, "uniformMatrix3fv", 9, uniform_matrix_3fv;
    uniform_matrix_4fv, "uniformMatrix4fv", 16, uniform_matrix_4fv;
}
