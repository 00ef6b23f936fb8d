//! Run command
//!
//! Drives a session on a synthetic source. Pointer strokes and commands are
//! scripted per tick so a run is reproducible.

use crate::RunArgs;
use anyhow::{Context, Result, bail};
use inpaint_compute::Backend;
use inpaint_solver::{Command, Pattern, PointerState, Session, SyntheticSource};
use std::collections::BTreeMap;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: RunArgs, verbose: u8) -> Result<()> {
    trace!(pattern = %args.pattern, size = %args.size, ticks = args.ticks, "run::run");

    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(name) = &args.backend {
        config.backend = name.parse::<Backend>()?;
    }
    if let Some(n) = args.iterations {
        config.inner_iterations = n;
    }
    if let Some(tol) = args.tolerance {
        config.tolerance = Some(tol);
    }
    if let Some(r) = args.radius {
        config.brush.radius = r;
    }
    if args.paused {
        config.start_running = false;
    }
    super::warn_if_unstable(&config);

    let (width, height) = parse_size(&args.size)?;
    let pattern = parse_pattern(&args.pattern)?;
    let strokes = args
        .paint
        .iter()
        .map(String::as_str)
        .map(parse_point)
        .collect::<Result<Vec<_>>>()?;
    let mut script: BTreeMap<u64, Vec<Command>> = BTreeMap::new();
    for entry in &args.commands {
        let (tick, cmd) = parse_command(entry)?;
        script.entry(tick).or_default().push(cmd);
    }

    let source = SyntheticSource::new(pattern, width, height)?.with_drift(args.drift);
    let mut session = Session::new(source, config).context("Failed to start session")?;
    info!(
        width,
        height,
        backend = session.processor().backend_name(),
        "Running {} ticks",
        args.ticks
    );

    let mut captured = 0u64;
    let mut iterations = 0usize;
    for tick in 0..args.ticks {
        if let Some(cmds) = script.remove(&tick) {
            session.commands_mut().extend(cmds);
        }
        let pointer = match strokes.get(tick as usize) {
            Some(&(x, y)) => PointerState::pressed(x, y),
            None => PointerState::released(),
        };
        session.set_pointer(pointer);

        let report = session.tick()?;
        captured += report.captured as u64;
        iterations += report.iterations;

        if verbose > 0 {
            println!(
                "tick {:>4}  {:<8} {} iters {:>3}{}",
                report.frame,
                report.state.to_string(),
                if report.captured { "capture" } else { "       " },
                report.iterations,
                report
                    .residual
                    .map(|r| format!("  residual {r:.3e}"))
                    .unwrap_or_default()
            );
        }
    }

    let u = session.download_reconstruction()?;
    let lambda = session.download_trust_mask()?;
    let energy = session.energy()?;
    let (lo, hi) = u.min_max().unwrap_or((0.0, 0.0));
    let masked = lambda.data().iter().filter(|v| **v == 0.0).count();

    println!("Session {}x{} on {}", width, height, session.processor().backend_name());
    println!("  Ticks:      {} ({} captures, {} iterations)", args.ticks, captured, iterations);
    println!("  State:      {}", session.state());
    println!("  Masked px:  {}", masked);
    println!("  u range:    [{:.4}, {:.4}]", lo, hi);
    println!(
        "  Energy:     {:.6} (tv {:.6}, data {:.6})",
        energy.total(),
        energy.regularizer,
        energy.data
    );
    Ok(())
}

/// Parses `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<(u32, u32)> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("Invalid size '{}', expected WIDTHxHEIGHT", s);
    };
    let w: u32 = w.trim().parse().with_context(|| format!("Invalid width in '{s}'"))?;
    let h: u32 = h.trim().parse().with_context(|| format!("Invalid height in '{s}'"))?;
    if w == 0 || h == 0 {
        bail!("Size must be non-zero: {}", s);
    }
    Ok((w, h))
}

/// Parses `X,Y` in pixels.
fn parse_point(s: &str) -> Result<(f32, f32)> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("Invalid point '{}', expected X,Y", s);
    };
    let x: f32 = x.trim().parse().with_context(|| format!("Invalid x in '{s}'"))?;
    let y: f32 = y.trim().parse().with_context(|| format!("Invalid y in '{s}'"))?;
    Ok((x, y))
}

/// Parses `TICK:toggle` / `TICK:step`.
fn parse_command(s: &str) -> Result<(u64, Command)> {
    let Some((tick, cmd)) = s.split_once(':') else {
        bail!("Invalid command '{}', expected TICK:toggle or TICK:step", s);
    };
    let tick: u64 = tick.trim().parse().with_context(|| format!("Invalid tick in '{s}'"))?;
    let cmd = match cmd.trim().to_lowercase().as_str() {
        "toggle" | "run" => Command::ToggleRun,
        "step" => Command::Step,
        other => bail!("Unknown command '{}', expected toggle or step", other),
    };
    Ok((tick, cmd))
}

/// Parses `disc`, `ramp`, `checker[:CELL]`, `constant[:LEVEL]`.
fn parse_pattern(s: &str) -> Result<Pattern> {
    let (name, arg) = match s.split_once(':') {
        Some((n, a)) => (n, Some(a)),
        None => (s, None),
    };
    let pattern = match name.trim().to_lowercase().as_str() {
        "disc" | "disk" => Pattern::Disc,
        "ramp" => Pattern::HorizontalRamp,
        "checker" => {
            let cell: Option<u32> = arg.map(str::parse).transpose().context("Invalid checker cell")?;
            Pattern::Checker(cell.unwrap_or(8))
        }
        "constant" => {
            let level: Option<u8> = arg.map(str::parse).transpose().context("Invalid constant level")?;
            Pattern::Constant(level.unwrap_or(128))
        }
        other => bail!("Unknown pattern '{}', expected disc, ramp, checker or constant", other),
    };
    Ok(pattern)
}
