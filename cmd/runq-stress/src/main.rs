//! Stress test - run queue churn
//!
//! Drives one run queue through a randomized scheduler-like workload:
//! threads become runnable, get chosen, run, and either requeue at a
//! drifted priority, get preempted back to the head, or block.
//!
//! Usage: `stress [OPS] [ENTITIES]`, plus `RUNQ_*` variables for the
//! queue configuration (`RUNQ_FUZZ`, `RUNQ_SEED`, ...).

use runq::{AddFlags, EntityId, RunQueue, RunqConfig, MAX_PRIO};
use runq_core::{kinfo, kerror, FuzzRng};
use std::process::ExitCode;
use std::time::Instant;

/// Verify invariants every N operations
const CHECK_INTERVAL: u64 = 10_000;

#[derive(Default)]
struct Stats {
    adds: u64,
    preempts: u64,
    blocks: u64,
    chosen: u64,
    idle: u64,
}

fn main() -> ExitCode {
    println!("=== Run Queue Stress Test ===\n");

    let mut args = std::env::args().skip(1);
    let ops: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1_000_000);
    let entities: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(4096);

    if entities == 0 {
        kerror!("need at least one entity");
        return ExitCode::FAILURE;
    }

    let config = RunqConfig::from_env().max_entities(entities);
    println!("Operations: {}", ops);
    println!("Entities:   {}", config.max_entities);
    println!("Fuzz:       {}", config.fuzz);
    println!("Seed:       {:#x}\n", config.seed);

    let mut rq: RunQueue = match RunQueue::with_config(&config) {
        Ok(rq) => rq,
        Err(e) => {
            kerror!("cannot build run queue: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut rng = FuzzRng::new(config.seed ^ 0x5DEE_CE66);
    let mut prio = vec![0usize; entities];
    let mut stats = Stats::default();
    let start = Instant::now();

    for op in 0..ops {
        let id = EntityId::new(rng.below(entities) as u32);

        match rng.below(8) {
            // Wakeup: runnable at a fresh priority
            0..=2 => {
                if !rq.is_linked(id) {
                    prio[id.as_usize()] = rng.below(MAX_PRIO + 1);
                    rq.add(id, prio[id.as_usize()], AddFlags::empty());
                    stats.adds += 1;
                }
            }
            // Block: no longer runnable
            3 => {
                if rq.remove(id) {
                    stats.blocks += 1;
                }
            }
            // Context switch: pick, run, requeue
            _ => match rq.choose_fuzz(config.fuzz) {
                Some(td) => {
                    stats.chosen += 1;
                    let p = &mut prio[td.as_usize()];
                    if rng.below(4) == 0 {
                        rq.add(td, *p, AddFlags::PREEMPTED);
                        stats.preempts += 1;
                    } else {
                        *p = (*p + 1).min(MAX_PRIO);
                        rq.add(td, *p, AddFlags::empty());
                    }
                }
                None => stats.idle += 1,
            },
        }

        if op % CHECK_INTERVAL == 0 {
            if let Err(e) = rq.check_invariants() {
                kerror!("invariant check failed after {} ops: {}", op, e);
                return ExitCode::FAILURE;
            }
            kinfo!("{} ops, {} linked, {} queues busy", op, rq.len(), rq.bitmap().count());
        }
    }

    let elapsed = start.elapsed();
    if let Err(e) = rq.check_invariants() {
        kerror!("final invariant check failed: {}", e);
        return ExitCode::FAILURE;
    }

    println!("=== Results ===");
    println!("Adds:        {}", stats.adds);
    println!("Preempts:    {}", stats.preempts);
    println!("Blocks:      {}", stats.blocks);
    println!("Chosen:      {}", stats.chosen);
    println!("Idle picks:  {}", stats.idle);
    println!("Linked:      {}", rq.len());
    println!("Elapsed:     {:?}", elapsed);
    println!("Throughput:  {:.0} ops/sec", ops as f64 / elapsed.as_secs_f64());

    println!("\n=== Stress Test Complete ===");
    ExitCode::SUCCESS
}
