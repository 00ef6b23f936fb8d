//! Backend tests for inpaint-compute.

use inpaint_compute::{
    Backend, ComputeError, DeviceLimits, DualProjection, GRADIENT_NORM, KernelPrimitives,
    Processor, ProcessorBuilder, SerialPrimitives, describe_backends, detect_backends,
    select_best_backend,
};
use inpaint_core::prelude::*;

#[test]
fn test_cpu_backend_available() {
    assert!(Backend::Cpu.is_available());
    assert!(Backend::Serial.is_available());
}

#[test]
fn test_auto_backend() {
    let processor = Processor::auto().unwrap();
    println!("Auto-selected backend: {}", processor.backend_name());
    assert_eq!(processor.backend(), select_best_backend());
}

#[test]
fn test_describe_backends() {
    let desc = describe_backends();
    println!("{}", desc);
    assert!(desc.contains("CPU"));
    assert!(desc.contains("Serial"));
}

#[test]
fn test_detect_sorted_by_priority() {
    let backends = detect_backends();
    assert_eq!(backends.len(), 2);
    assert!(backends[0].priority >= backends[1].priority);
}

#[test]
fn test_builder_dedicated_pool() {
    let processor = ProcessorBuilder::new()
        .backend(Backend::Cpu)
        .threads(2)
        .build()
        .unwrap();
    assert_eq!(processor.backend(), Backend::Cpu);
    assert_eq!(processor.config().threads, 2);
}

#[test]
fn test_limits_reject_large_field() {
    let prims = SerialPrimitives::new().with_limits(DeviceLimits::with_memory(4096, 512));
    assert!(prims.allocate::<f32>(8, 16).is_ok());
    let err = prims.allocate::<f32>(16, 16).unwrap_err();
    assert!(matches!(err, ComputeError::BufferTooLarge { requested: 1024, limit: 512 }));

    let prims = SerialPrimitives::new().with_limits(DeviceLimits::with_memory(256, u64::MAX));
    assert!(matches!(prims.allocate::<Float2>(8, 8), Err(ComputeError::Field(_))));
}

#[test]
fn test_allocate_size_overflow_is_error() {
    let prims = SerialPrimitives::new();
    let err = prims.allocate::<f32>(u32::MAX, u32::MAX).unwrap_err();
    assert!(matches!(err, ComputeError::BufferTooLarge { requested: u64::MAX, .. }));

    let processor = Processor::new(Backend::Cpu).unwrap();
    assert!(processor.allocate::<Float2>(u32::MAX, u32::MAX).is_err());
}

#[test]
fn test_max_abs_diff_keeps_nan() {
    for backend in [Backend::Cpu, Backend::Serial] {
        let processor = Processor::new(backend).unwrap();
        let mut values = vec![0.0f32; 64];
        values[17] = f32::NAN;
        let host = Field::<f32, Host>::from_data(8, 8, values).unwrap();
        let mut a = processor.allocate(8, 8).unwrap();
        processor.upload(&host, &mut a).unwrap();
        let mut b = processor.allocate(8, 8).unwrap();
        processor.fill(&mut b, 0.25f32).unwrap();

        let d = processor.max_abs_diff(&a, &b).unwrap();
        assert!(d.is_nan(), "{backend:?}: {d}");
        assert_eq!(processor.max_abs_diff(&b, &b).unwrap(), 0.0);
    }
}

/// Runs `iterations` primal-dual steps on a ramp with a masked hole.
fn run_iterations(processor: &Processor, iterations: usize) -> (Vec<f32>, Vec<f32>) {
    let (w, h) = (23u32, 19u32);
    let data = (0..w * h).map(|i| ((i % w) as f32 / w as f32) * 0.8 + 0.1).collect();
    let host = Field::<f32, Host>::from_data(w, h, data).unwrap();

    let mut g = processor.allocate(w, h).unwrap();
    processor.upload(&host, &mut g).unwrap();
    let mut u = processor.allocate(w, h).unwrap();
    processor.copy(&mut u, &g).unwrap();
    let mut p = processor.allocate::<Float2>(w, h).unwrap();
    let mut divp = processor.allocate(w, h).unwrap();
    let mut lambda = processor.allocate(w, h).unwrap();
    processor.fill(&mut lambda, 1.0f32).unwrap();
    processor.paint_disk(&mut lambda, 0.0, 11.0, 9.0, 4.0).unwrap();

    let step = 1.0 / GRADIENT_NORM;
    for _ in 0..iterations {
        processor.dual_ascent(&mut p, &u, step, 0.002, DualProjection::None).unwrap();
        processor.divergence(&mut divp, &p).unwrap();
        processor.primal_descent(&mut u, &divp, &g, &lambda, step, 1.2).unwrap();
    }

    let u_host = processor.download_new(&u).unwrap();
    let d_host = processor.download_new(&divp).unwrap();
    (u_host.into_data(), d_host.into_data())
}

#[test]
fn test_serial_matches_cpu() {
    let cpu = ProcessorBuilder::new().backend(Backend::Cpu).threads(4).build().unwrap();
    let serial = Processor::new(Backend::Serial).unwrap();

    let (u_cpu, d_cpu) = run_iterations(&cpu, 25);
    let (u_ser, d_ser) = run_iterations(&serial, 25);

    // Row kernels are identical, so results match bit for bit
    assert_eq!(u_cpu, u_ser);
    assert_eq!(d_cpu, d_ser);
    assert!(u_cpu.iter().all(|v| v.is_finite()));
}

#[test]
fn test_download_shape_checked() {
    let processor = Processor::new(Backend::Cpu).unwrap();
    let dev = processor.allocate::<f32>(4, 4).unwrap();
    let mut host = Field::<f32, Host>::new(4, 3);
    assert!(processor.download(&dev, &mut host).is_err());
}
