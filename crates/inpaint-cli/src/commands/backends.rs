//! Backends command: lists compute backends and the auto-selected one.

use anyhow::Result;
use inpaint_compute::{describe_backends, Processor};

pub fn run(verbose: u8) -> Result<()> {
    print!("{}", describe_backends());

    let processor = Processor::auto()?;
    println!("Auto-selected: {}", processor.backend_name());
    if verbose > 0 {
        let limits = processor.limits();
        println!(
            "  Memory: {} MB available / {} MB total{}",
            limits.available_memory / (1024 * 1024),
            limits.total_memory / (1024 * 1024),
            if limits.detected { "" } else { " (estimated)" }
        );
        println!("  Threads: {}", rayon::current_num_threads());
    }
    Ok(())
}
