//! bank — a two-teller bank with a manager's desk.
//!
//! Customers arrive as a Poisson process and queue for one of two tellers.
//! About one in ten is a VIP: VIPs carry priority 0, so they overtake the
//! regular queue, and after the teller they also see the manager.
//!
//! Set `RUST_LOG=debug` to follow every entity through the run.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qs_core::{Attributes, EntityId, SimConfig, SimRng, SimTime, QUEUE_JUMP_PRIORITY};
use qs_entity::{Entity, Resource, Resources};
use qs_resource::ServiceTime;
use qs_sim::{NewEntity, Route, SimBuilder, SimObserver, Source};
use qs_stats::RunStats;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:              u64 = 42;
const CUSTOMERS:         u64 = 200;
const MEAN_INTERARRIVAL: f64 = 1.5; // minutes
const MEAN_TELLER_TIME:  f64 = 2.5;
const MEAN_MANAGER_TIME: f64 = 4.0;
const VIP_SHARE:         f64 = 0.1;
const SAMPLE_FREQUENCY:  f64 = 1.0;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    arrived: u32,
    served:  u32,
}

impl SimObserver for Progress {
    fn on_entity_created(&mut self, _id: EntityId, entity: &Entity) {
        self.arrived += 1;
        tracing::debug!("{entity}");
    }

    fn on_entity_disposed(&mut self, _id: EntityId, _entity: &Entity) {
        self.served += 1;
    }

    fn on_run_end(&mut self, now: SimTime, stats: &RunStats) {
        info!(time = now.0, arrived = self.arrived, served = self.served, registered = stats.entity_count(), "bank closed");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== bank — rust_qs priority queueing ===");
    println!("Customers: {CUSTOMERS}  |  VIP share: {VIP_SHARE}  |  Seed: {SEED}");
    println!();

    let mut root = SimRng::new(SEED);

    // 1. Resources.
    let mut teller_rng = root.child(1);
    let mut manager_rng = root.child(2);
    let mut resources = Resources::new();
    let teller = resources.add(
        Resource::builder("Teller", 2)
            .service_time(ServiceTime::per_entity(move |c: &Entity| {
                // VIP business is pre-arranged and quicker at the counter.
                let mean = if c.priority() == QUEUE_JUMP_PRIORITY { 0.5 } else { 1.0 };
                teller_rng.exponential(mean * MEAN_TELLER_TIME)
            }))
            .build()?,
    )?;
    let manager = resources.add(
        Resource::builder("Manager", 1)
            .service_time(ServiceTime::fixed(move || manager_rng.exponential(MEAN_MANAGER_TIME)))
            .build()?,
    )?;

    // 2. Customers.
    let mut vip_rng = root.child(3);
    let customers = Source::builder("Customer")
        .exponential(MEAN_INTERARRIVAL, root.child(4))
        .first_delay(0.0)
        .max_entities(CUSTOMERS)
        .entities(move || {
            if vip_rng.gen_bool(VIP_SHARE) {
                let attrs = Attributes::new()
                    .with("priority", QUEUE_JUMP_PRIORITY)
                    .with("vip", true);
                NewEntity::new(Entity::with_attributes("Customer", attrs), Route::new([teller, manager]))
            } else {
                let attrs = Attributes::new().with("vip", false);
                NewEntity::new(Entity::with_attributes("Customer", attrs), Route::new([teller]))
            }
        })
        .build()?;

    // 3. Run.
    let mut sim = SimBuilder::new(SimConfig::new(SEED), resources)
        .source(customers)
        .build()?;
    let mut progress = Progress::default();
    sim.run(&mut progress)?;

    // 4. Report.
    let stats = sim.stats();
    let vip = Attributes::new().with("vip", true);
    let regular = Attributes::new().with("vip", false);
    println!("All customers  : {}", stats.summary(None)?);
    println!("VIP customers  : {}", stats.summary(Some(&vip))?);
    println!("Regular        : {}", stats.summary(Some(&regular))?);
    println!();

    for name in ["Teller", "Manager"] {
        if !stats.is_registered(name) {
            println!("{name:<8}: never visited");
            continue;
        }
        let queue = sim.queue_size_over_time(name, SAMPLE_FREQUENCY)?;
        let util = sim.utilization_over_time(name, SAMPLE_FREQUENCY)?;
        let waits = stats.get_waiting_times(Some(name), None)?;
        let max_queue = queue.iter().copied().max().unwrap_or(0);
        let mean_util = qs_stats::mean(&util).unwrap_or(0.0);
        let mean_wait = qs_stats::mean(&waits).unwrap_or(0.0);
        println!(
            "{name:<8}: mean wait {mean_wait:>6.2}  |  max queue {max_queue:>3}  |  mean utilization {mean_util:.2}"
        );
    }
    println!();
    println!("Closed at t = {:.2}", sim.now().0);
    Ok(())
}
