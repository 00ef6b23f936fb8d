//! Kernel contract tests for inpaint-compute.

use approx::assert_relative_eq;
use inpaint_compute::{Backend, DualProjection, Processor};
use inpaint_core::prelude::*;

/// Deterministic pseudo-random values in [-0.5, 0.5).
fn noise(i: usize, seed: usize) -> f32 {
    let h = (i.wrapping_mul(2654435761) ^ seed.wrapping_mul(40503)) % 1009;
    h as f32 / 1009.0 - 0.5
}

fn scalar_field(proc: &Processor, w: u32, h: u32, seed: usize) -> Field<f32, Device> {
    let data = (0..(w * h) as usize).map(|i| noise(i, seed)).collect();
    let host = Field::<f32, Host>::from_data(w, h, data).unwrap();
    let mut dev = proc.allocate(w, h).unwrap();
    proc.upload(&host, &mut dev).unwrap();
    dev
}

#[test]
fn test_normalize_frame() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let host = Field::<u8, Host>::filled(4, 4, 128);
    let mut raw = proc.allocate(4, 4).unwrap();
    proc.upload(&host, &mut raw).unwrap();

    let mut g = proc.allocate(4, 4).unwrap();
    proc.normalize(&mut g, &raw, 1.0 / 255.0, 0.0).unwrap();
    for v in g.data() {
        assert_relative_eq!(*v, 128.0 / 255.0, epsilon = 1e-6);
    }
}

#[test]
fn test_adjoint_identity() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let (w, h) = (17u32, 11u32);
    let u = scalar_field(&proc, w, h, 1);

    // p with no flux through the high sides
    let mut p_host = Field::<Float2, Host>::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            let px = if x + 1 < w { noise(i, 2) } else { 0.0 };
            let py = if y + 1 < h { noise(i, 3) } else { 0.0 };
            p_host.set(x, y, Float2::new(px, py));
        }
    }
    let mut p = proc.allocate(w, h).unwrap();
    proc.upload(&p_host, &mut p).unwrap();

    let mut grad = proc.allocate(w, h).unwrap();
    let mut div = proc.allocate(w, h).unwrap();
    proc.gradient(&mut grad, &u).unwrap();
    proc.divergence(&mut div, &p).unwrap();

    let lhs: f64 = grad.data().iter().zip(p.data()).map(|(a, b)| a.dot(*b) as f64).sum();
    let rhs: f64 = u.data().iter().zip(div.data()).map(|(a, b)| (a * b) as f64).sum();
    assert_relative_eq!(lhs, -rhs, epsilon = 1e-4);
}

#[test]
fn test_divergence_finite_on_border() {
    let proc = Processor::new(Backend::Serial).unwrap();
    for (w, h) in [(1u32, 1u32), (1, 5), (5, 1), (3, 3)] {
        let p_host = Field::<Float2, Host>::filled(w, h, Float2::new(1e3, -1e3));
        let mut p = proc.allocate(w, h).unwrap();
        proc.upload(&p_host, &mut p).unwrap();
        let mut div = proc.allocate(w, h).unwrap();
        proc.divergence(&mut div, &p).unwrap();
        assert!(div.data().iter().all(|v| v.is_finite()), "{w}x{h}");
    }
}

#[test]
fn test_gradient_of_constant_is_zero() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let mut u = proc.allocate(6, 4).unwrap();
    proc.fill(&mut u, 0.7f32).unwrap();
    let mut grad = proc.allocate(6, 4).unwrap();
    proc.gradient(&mut grad, &u).unwrap();
    assert!(grad.data().iter().all(|g| *g == Float2::ZERO));
}

#[test]
fn test_paint_disk_scenario() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let mut lambda = proc.allocate(10, 10).unwrap();
    proc.fill(&mut lambda, 1.0f32).unwrap();
    proc.paint_disk(&mut lambda, 0.0, 5.0, 5.0, 2.0).unwrap();

    let mut painted = 0;
    for y in 0..10u32 {
        for x in 0..10u32 {
            let d2 = (x as f32 - 5.0).powi(2) + (y as f32 - 5.0).powi(2);
            let expected = if d2 <= 4.0 { 0.0 } else { 1.0 };
            assert_eq!(lambda.at(x, y), expected, "pixel ({x}, {y})");
            if expected == 0.0 {
                painted += 1;
            }
        }
    }
    assert_eq!(painted, 13);
}

#[test]
fn test_paint_disk_idempotent() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let mut once = proc.allocate(12, 9).unwrap();
    proc.fill(&mut once, 1.0f32).unwrap();
    proc.paint_disk(&mut once, 0.0, 4.3, 3.7, 2.5).unwrap();

    let mut twice = once.clone();
    proc.paint_disk(&mut twice, 0.0, 4.3, 3.7, 2.5).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_paint_disk_last_write_wins() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let mut lambda = proc.allocate(10, 10).unwrap();
    proc.fill(&mut lambda, 1.0f32).unwrap();
    proc.paint_disk(&mut lambda, 0.0, 4.0, 4.0, 2.0).unwrap();
    proc.paint_disk(&mut lambda, 0.5, 5.0, 4.0, 1.0).unwrap();

    assert_eq!(lambda.at(2, 4), 0.0);
    assert_eq!(lambda.at(4, 4), 0.5);
    assert_eq!(lambda.at(6, 4), 0.5);
    assert_eq!(lambda.at(9, 9), 1.0);
}

#[test]
fn test_paint_disk_clipped_outside() {
    let proc = Processor::new(Backend::Serial).unwrap();
    let mut lambda = proc.allocate(8, 8).unwrap();
    proc.fill(&mut lambda, 1.0f32).unwrap();
    proc.paint_disk(&mut lambda, 0.0, -1.0, -1.0, 2.0).unwrap();
    assert_eq!(lambda.at(0, 0), 0.0);
    assert_eq!(lambda.at(1, 1), 1.0);

    proc.paint_disk(&mut lambda, 0.0, 100.0, 100.0, 3.0).unwrap();
    assert_eq!(lambda.data().iter().filter(|v| **v == 0.0).count(), 1);
}

#[test]
fn test_primal_descent_fixed_point() {
    // u = g with zero divergence is a fixed point for any weight
    let proc = Processor::new(Backend::Cpu).unwrap();
    let g = scalar_field(&proc, 5, 5, 4);
    let mut u = g.clone();
    let divp = proc.allocate(5, 5).unwrap();
    let mut lambda = proc.allocate(5, 5).unwrap();
    proc.fill(&mut lambda, 1.0f32).unwrap();
    proc.primal_descent(&mut u, &divp, &g, &lambda, 0.35, 1.2).unwrap();
    assert!(proc.max_abs_diff(&u, &g).unwrap() < 1e-6);
}

#[test]
fn test_dual_ascent_shrinks_without_gradient() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let mut u = proc.allocate(4, 4).unwrap();
    proc.fill(&mut u, 0.3f32).unwrap();
    let mut p = proc.allocate(4, 4).unwrap();
    proc.fill(&mut p, Float2::new(1.0, 1.0)).unwrap();
    proc.dual_ascent(&mut p, &u, 0.5, 2.0, DualProjection::None).unwrap();
    for v in p.data() {
        assert_relative_eq!(v.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(v.y, 0.5, epsilon = 1e-6);
    }
}

#[test]
fn test_shape_mismatch_rejected() {
    let proc = Processor::new(Backend::Cpu).unwrap();
    let u = proc.allocate::<f32>(4, 4).unwrap();
    let mut grad = proc.allocate::<Float2>(4, 5).unwrap();
    let err = proc.gradient(&mut grad, &u).unwrap_err();
    assert!(err.is_dimension_mismatch());

    let mut dst = proc.allocate::<f32>(3, 4).unwrap();
    assert!(proc.copy(&mut dst, &u).is_err());
    assert!(proc.max_abs_diff(&dst, &u).is_err());
}

#[test]
fn test_allocate_rejects_empty() {
    let proc = Processor::new(Backend::Serial).unwrap();
    assert!(proc.allocate::<f32>(0, 4).is_err());
    assert!(proc.allocate::<f32>(4, 0).is_err());
}
