//! Programs, shaders and program introspection.

use std::rc::Rc;

use tracing::debug;

use super::{create_object, delete_object, id_of, is_object, required_object, HandlerResult};
use crate::constants::*;
use crate::context::RenderingContext;
use crate::marshal::Arguments;
use crate::objects::{ActiveInfo, ObjectKind, WebGLObject};
use crate::{JsValue, TypedArray};

// ==================== Programs ====================

pub(crate) fn create_program(ctx: &mut RenderingContext, _: &Arguments<'_>) -> HandlerResult {
    create_object(ctx, ObjectKind::Program)
}

pub(crate) fn delete_program(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    delete_object(ctx, args, ObjectKind::Program, "deleteProgram")
}

pub(crate) fn is_program(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    is_object(ctx, args, ObjectKind::Program)
}

pub(crate) fn attach_shader(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    program_shader_call(ctx, args, "attachShader", |driver, program, shader| {
        driver.attach_shader(program, shader)
    })
}

pub(crate) fn detach_shader(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    program_shader_call(ctx, args, "detachShader", |driver, program, shader| {
        driver.detach_shader(program, shader)
    })
}

fn program_shader_call(
    ctx: &mut RenderingContext,
    args: &Arguments<'_>,
    caller: &str,
    call: fn(&dyn crate::GlDriver, u32, u32),
) -> HandlerResult {
    let program = args.object(0, ObjectKind::Program)?;
    let shader = args.object(1, ObjectKind::Shader)?;
    let validator = ctx.validator();
    if validator.require_valid_object(caller, program.as_ref())
        && validator.require_valid_object(caller, shader.as_ref())
    {
        call(ctx.driver(), id_of(program.as_ref()), id_of(shader.as_ref()));
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn bind_attrib_location(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let (index, name) = (args.u32(1)?, args.string(2)?);
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "bindAttribLocation")?
    else {
        return Ok(JsValue::Undefined);
    };
    ctx.driver()
        .bind_attrib_location(program.webgl_id(), index, &name);
    Ok(JsValue::Undefined)
}

pub(crate) fn link_program(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    if let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "linkProgram")? {
        ctx.driver().link_program(program.webgl_id());
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn validate_program(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    if let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "validateProgram")? {
        ctx.driver().validate_program(program.webgl_id());
    }
    Ok(JsValue::Undefined)
}

/// `useProgram(null)` unbinds.
pub(crate) fn use_program(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let program = args.object(0, ObjectKind::Program)?;
    if !ctx
        .validator()
        .validate_object("useProgram", program.as_ref())
    {
        return Ok(JsValue::Undefined);
    }
    let id = id_of(program.as_ref());
    ctx.driver().use_program(id);
    ctx.current_program = id;
    ctx.retired_program = None;
    Ok(JsValue::Undefined)
}

pub(crate) fn get_program_parameter(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let pname = args.u32(1)?;
    let caller = "getProgramParameter";
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, caller)? else {
        return Ok(JsValue::Null);
    };
    let value = || ctx.driver().get_program_iv(program.webgl_id(), pname);
    Ok(match pname {
        DELETE_STATUS | LINK_STATUS | VALIDATE_STATUS => (value() != 0).into(),
        ATTACHED_SHADERS | ACTIVE_ATTRIBUTES | ACTIVE_UNIFORMS => value().into(),
        _ => {
            debug!(pname, "getProgramParameter: invalid parameter");
            ctx.set_error(INVALID_ENUM);
            JsValue::Null
        }
    })
}

pub(crate) fn get_program_info_log(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "getProgramInfoLog")?
    else {
        return Ok(JsValue::Null);
    };
    Ok(ctx.driver().get_program_info_log(program.webgl_id()).into())
}

pub(crate) fn get_attached_shaders(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "getAttachedShaders")?
    else {
        return Ok(JsValue::Null);
    };
    let shaders = ctx
        .driver()
        .get_attached_shaders(program.webgl_id())
        .into_iter()
        .filter_map(|id| ctx.registry().lookup(ObjectKind::Shader, id))
        .map(|shader| shader.to_js())
        .collect();
    Ok(JsValue::Array(shaders))
}

// ==================== Introspection ====================

fn active_info_js(ctx: &RenderingContext, info: ActiveInfo) -> JsValue {
    Rc::new(WebGLObject::active_info(info, ctx.id())).to_js()
}

pub(crate) fn get_active_attrib(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let index = args.u32(1)?;
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "getActiveAttrib")?
    else {
        return Ok(JsValue::Null);
    };
    match ctx.driver().get_active_attrib(program.webgl_id(), index) {
        Some(info) => Ok(active_info_js(ctx, info)),
        None => {
            ctx.set_error(INVALID_VALUE);
            Ok(JsValue::Null)
        }
    }
}

/// Array uniforms are reported with a `[0]` suffix even when the driver
/// leaves it off.
pub(crate) fn get_active_uniform(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let index = args.u32(1)?;
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "getActiveUniform")?
    else {
        return Ok(JsValue::Null);
    };
    match ctx.driver().get_active_uniform(program.webgl_id(), index) {
        Some(mut info) => {
            if info.size > 1 && !info.name.ends_with("[0]") {
                info.name.push_str("[0]");
            }
            Ok(active_info_js(ctx, info))
        }
        None => {
            ctx.set_error(INVALID_VALUE);
            Ok(JsValue::Null)
        }
    }
}

pub(crate) fn get_attrib_location(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let name = args.string(1)?;
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "getAttribLocation")?
    else {
        return Ok((-1).into());
    };
    Ok(ctx
        .driver()
        .get_attrib_location(program.webgl_id(), &name)
        .into())
}

pub(crate) fn get_uniform_location(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let name = args.string(1)?;
    let Some(program) = required_object(ctx, args, 0, ObjectKind::Program, "getUniformLocation")?
    else {
        return Ok(JsValue::Null);
    };
    let program = program.webgl_id();
    let location = ctx.driver().get_uniform_location(program, &name);
    if location < 0 {
        return Ok(JsValue::Null);
    }
    Ok(Rc::new(WebGLObject::uniform_location(program, location, ctx.id())).to_js())
}

/// Scalar kind of a uniform, as read back by `getUniform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniformBase {
    Bool,
    Int,
    Float,
}

/// Base type and component count of a GLSL uniform type.
fn uniform_shape(type_: u32) -> Option<(UniformBase, usize)> {
    Some(match type_ {
        BOOL => (UniformBase::Bool, 1),
        BOOL_VEC2 => (UniformBase::Bool, 2),
        BOOL_VEC3 => (UniformBase::Bool, 3),
        BOOL_VEC4 => (UniformBase::Bool, 4),
        INT | SAMPLER_2D | SAMPLER_CUBE => (UniformBase::Int, 1),
        INT_VEC2 => (UniformBase::Int, 2),
        INT_VEC3 => (UniformBase::Int, 3),
        INT_VEC4 => (UniformBase::Int, 4),
        FLOAT => (UniformBase::Float, 1),
        FLOAT_VEC2 => (UniformBase::Float, 2),
        FLOAT_VEC3 => (UniformBase::Float, 3),
        FLOAT_VEC4 => (UniformBase::Float, 4),
        FLOAT_MAT2 => (UniformBase::Float, 4),
        FLOAT_MAT3 => (UniformBase::Float, 9),
        FLOAT_MAT4 => (UniformBase::Float, 16),
        _ => return None,
    })
}

/// Type of the active uniform (or array element) living at `location`.
fn uniform_type_at(ctx: &RenderingContext, program: u32, location: i32) -> Option<u32> {
    let driver = ctx.driver();
    let count = driver.get_program_iv(program, ACTIVE_UNIFORMS).max(0) as u32;
    for index in 0..count {
        let Some(info) = driver.get_active_uniform(program, index) else {
            continue;
        };
        let base = info.name.strip_suffix("[0]").unwrap_or(&info.name);
        for element in 0..info.size.max(1) {
            let name = if info.size > 1 {
                format!("{}[{}]", base, element)
            } else {
                base.to_string()
            };
            if driver.get_uniform_location(program, &name) == location {
                return Some(info.type_);
            }
        }
    }
    None
}

pub(crate) fn get_uniform(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let program = args.object(0, ObjectKind::Program)?;
    let location = args.object(1, ObjectKind::UniformLocation)?;
    let caller = "getUniform";
    let validator = ctx.validator();
    if !validator.require_valid_object(caller, program.as_ref())
        || !validator.require_valid_object(caller, location.as_ref())
    {
        return Ok(JsValue::Null);
    }
    let (Some(program), Some(location)) = (program, location) else {
        return Ok(JsValue::Null);
    };
    let program = program.webgl_id();
    if !validator.location_program(caller, &location, program) {
        return Ok(JsValue::Null);
    }
    let Some((_, native)) = location.uniform_location_parts() else {
        return Ok(JsValue::Null);
    };

    let Some((base, count)) = uniform_type_at(ctx, program, native).and_then(uniform_shape) else {
        debug!(program, location = native, "getUniform: no active uniform at location");
        ctx.set_error(INVALID_VALUE);
        return Ok(JsValue::Null);
    };

    let driver = ctx.driver();
    Ok(match base {
        UniformBase::Float => {
            let mut values = vec![0.0_f32; count];
            driver.get_uniform_fv(program, native, &mut values);
            if count == 1 {
                values[0].into()
            } else {
                TypedArray::from_slice(&values).into()
            }
        }
        UniformBase::Int => {
            let mut values = vec![0_i32; count];
            driver.get_uniform_iv(program, native, &mut values);
            if count == 1 {
                values[0].into()
            } else {
                TypedArray::from_slice(&values).into()
            }
        }
        UniformBase::Bool => {
            let mut values = vec![0_i32; count];
            driver.get_uniform_iv(program, native, &mut values);
            if count == 1 {
                (values[0] != 0).into()
            } else {
                JsValue::Array(values.iter().map(|v| JsValue::from(*v != 0)).collect())
            }
        }
    })
}

// ==================== Shaders ====================

pub(crate) fn create_shader(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let shader_type = args.u32(0)?;
    if !ctx.validator().enum_in(
        "createShader",
        shader_type,
        &[VERTEX_SHADER, FRAGMENT_SHADER],
        "invalid shader type",
    ) {
        return Ok(JsValue::Null);
    }
    let id = ctx.driver().create_shader(shader_type);
    if id == 0 {
        return Ok(JsValue::Null);
    }
    Ok(ctx.registry_mut().create_shader(id, shader_type).to_js())
}

pub(crate) fn delete_shader(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    delete_object(ctx, args, ObjectKind::Shader, "deleteShader")
}

pub(crate) fn is_shader(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    is_object(ctx, args, ObjectKind::Shader)
}

/// Stores the source; the driver sees it only after translation.
pub(crate) fn shader_source(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let source = args.string(1)?;
    if let Some(shader) = required_object(ctx, args, 0, ObjectKind::Shader, "shaderSource")? {
        shader.update_shader(|state| state.source = source);
    }
    Ok(JsValue::Undefined)
}

/// Translate, cache the outcome on the shader, and forward only sources the
/// translator accepts.
pub(crate) fn compile_shader(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let Some(shader) = required_object(ctx, args, 0, ObjectKind::Shader, "compileShader")? else {
        return Ok(JsValue::Undefined);
    };
    let (source, shader_type) = match shader.shader_state() {
        Some(state) => (state.source.clone(), state.shader_type),
        None => return Ok(JsValue::Undefined),
    };

    let translation = ctx.translator().translate(&source, shader_type);
    debug!(
        shader = shader.webgl_id(),
        valid = translation.valid,
        "Shader translated"
    );
    shader.update_shader(|state| {
        state.valid = translation.valid;
        state.log = translation.log.clone();
    });

    if translation.valid {
        let driver = ctx.driver();
        driver.shader_source(shader.webgl_id(), &translation.source);
        driver.compile_shader(shader.webgl_id());
    }
    Ok(JsValue::Undefined)
}

pub(crate) fn get_shader_parameter(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let pname = args.u32(1)?;
    let Some(shader) = required_object(ctx, args, 0, ObjectKind::Shader, "getShaderParameter")?
    else {
        return Ok(JsValue::Null);
    };
    Ok(match pname {
        COMPILE_STATUS => shader.shader_state().is_some_and(|state| state.valid).into(),
        SHADER_TYPE => shader
            .shader_state()
            .map_or(0, |state| state.shader_type)
            .into(),
        DELETE_STATUS => (ctx.driver().get_shader_iv(shader.webgl_id(), pname) != 0).into(),
        _ => {
            debug!(pname, "getShaderParameter: invalid parameter");
            ctx.set_error(INVALID_ENUM);
            JsValue::Null
        }
    })
}

pub(crate) fn get_shader_info_log(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let Some(shader) = required_object(ctx, args, 0, ObjectKind::Shader, "getShaderInfoLog")? else {
        return Ok(JsValue::Null);
    };
    // Rejected sources report the translator log, compiled ones the driver's.
    match shader.shader_state() {
        Some(state) if !state.valid => return Ok(state.log.clone().into()),
        Some(_) => {}
        None => return Ok(JsValue::Null),
    }
    Ok(ctx.driver().get_shader_info_log(shader.webgl_id()).into())
}

pub(crate) fn get_shader_source(ctx: &mut RenderingContext, args: &Arguments<'_>) -> HandlerResult {
    let Some(shader) = required_object(ctx, args, 0, ObjectKind::Shader, "getShaderSource")? else {
        return Ok(JsValue::Null);
    };
    Ok(shader
        .shader_state()
        .map_or(JsValue::Null, |state| state.source.clone().into()))
}
