//! WebGL binding layer benchmarks
//!
//! Run with: cargo bench -p webgl-core

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use webgl_core::constants::*;
use webgl_core::{JsValue, RecordingDriver, RenderingContext, TypedArray, TypedArrayKind, WebGLObject};

fn context() -> RenderingContext {
    RenderingContext::with_driver(RecordingDriver::new())
}

fn dispatch_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    let mut ctx = context();
    let args: [JsValue; 4] = [0.into(), 0.5.into(), 1.into(), 1.into()];
    group.bench_function("clearColor", |b| {
        b.iter(|| ctx.call("clearColor", &args))
    });

    // Validation failure path: no driver call, error posted then read.
    let mut ctx = context();
    let args = [JsValue::from(0x1234_u32)];
    group.bench_function("enable_invalid", |b| {
        b.iter(|| {
            let _ = ctx.call("enable", &args);
            ctx.call("getError", &[])
        })
    });

    group.finish();
}

fn uniform_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("uniforms");

    let driver = RecordingDriver::new();
    let mut ctx = RenderingContext::with_driver(driver.clone());
    let program = ctx.call("createProgram", &[]).unwrap();
    let id = WebGLObject::from_js(&program).map_or(0, |p| p.webgl_id());
    driver.add_uniform(id, "lights", FLOAT_VEC4, 64);
    ctx.call("useProgram", &[program.clone()]).unwrap();
    let location = ctx
        .call("getUniformLocation", &[program, "lights".into()])
        .unwrap();

    for count in [1usize, 16, 64] {
        let values: Vec<f32> = (0..count * 4).map(|v| v as f32).collect();
        let view: JsValue = TypedArray::from_slice(&values).into();
        let sequence = JsValue::Array(values.iter().map(|v| JsValue::from(*v)).collect());

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("uniform4fv_view", count), &view, |b, view| {
            b.iter(|| {
                ctx.call("uniform4fv", &[location.clone(), view.clone()])
                    .unwrap();
                driver.clear_calls();
            })
        });
        group.bench_with_input(
            BenchmarkId::new("uniform4fv_sequence", count),
            &sequence,
            |b, sequence| {
                b.iter(|| {
                    ctx.call("uniform4fv", &[location.clone(), sequence.clone()])
                        .unwrap();
                    driver.clear_calls();
                })
            },
        );
    }

    group.finish();
}

fn buffer_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffers");

    let driver = RecordingDriver::new();
    let mut ctx = RenderingContext::with_driver(driver.clone());
    let buffer = ctx.call("createBuffer", &[]).unwrap();
    ctx.call("bindBuffer", &[ARRAY_BUFFER.into(), buffer]).unwrap();

    for size in [1024usize, 64 * 1024] {
        let data: JsValue = TypedArray::new(TypedArrayKind::Uint8, size).into();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("bufferData", size), &data, |b, data| {
            b.iter(|| {
                ctx.call(
                    "bufferData",
                    &[ARRAY_BUFFER.into(), data.clone(), STATIC_DRAW.into()],
                )
                .unwrap();
                driver.clear_calls();
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    dispatch_benchmarks,
    uniform_benchmarks,
    buffer_benchmarks
);
criterion_main!(benches);
