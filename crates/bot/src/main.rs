//! Grinding bot entry point: runs the GOAP core against a simulated world
//! until the gear breaks, the time budget runs out, or Ctrl-C.
mod config;
mod goals;
mod logging;
mod summary;
mod world;

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use goap_runtime::{Event, LifecycleEvent, Runtime, SharedFacts, Topic};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::summary::RunSummary;
use crate::world::World;

const ATTACK_COOLDOWN: Duration = Duration::from_millis(150);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = BotConfig::from_env();
    let started_at = Utc::now();
    let session_id = config
        .session_id
        .clone()
        .unwrap_or_else(|| started_at.format("session_%Y%m%d_%H%M%S").to_string());
    let session = logging::setup(&session_id, config.log_dir.as_deref())?;

    let world = World::new(config.seed, config.durability);
    let facts = SharedFacts::new();
    world.publish(&facts)?;

    let runtime = Runtime::builder()
        .config(config.runtime.clone())
        .boxed_goals(goals::registry(ATTACK_COOLDOWN)?)
        .objective(goals::objective())
        .facts(facts.clone())
        .actuator(world.actuator(facts))
        .fact_source(world.sensor())
        .build()
        .await?;
    let handle = runtime.handle();

    info!(
        seed = config.seed,
        durability = config.durability,
        run_for = ?config.run_for,
        "bot started"
    );

    let mut lifecycle = runtime.subscribe(Topic::Lifecycle);
    let deadline = tokio::time::sleep(config.run_for);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ctrl_c);

    let reason = loop {
        tokio::select! {
            _ = &mut deadline => break "deadline",
            _ = &mut ctrl_c => break "interrupted",
            event = lifecycle.recv() => match event {
                Ok(Event::Lifecycle(LifecycleEvent::Stopped)) => break "aborted",
                Ok(Event::Lifecycle(LifecycleEvent::Fault { goal, phase, error })) => {
                    warn!(goal = %goal, %phase, error = %error, "goal faulted");
                }
                Ok(Event::Lifecycle(LifecycleEvent::NoRoute)) => warn!("no route to objective"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "lifecycle subscriber lagged");
                }
                Err(RecvError::Closed) => break "aborted",
            },
        }
    };

    info!(reason, "stopping bot");
    let agent = runtime.shutdown().await?;

    let summary = RunSummary::new(
        &session.id,
        started_at,
        reason,
        handle.metrics(),
        agent.snapshot(None),
    );
    let path = summary.write_to(&session.dir)?;

    info!(
        kills = summary.kills,
        world_kills = world.kills()?,
        ticks = summary.metrics.ticks,
        faults = summary.metrics.faults,
        "Summary written to {}",
        path.display()
    );

    Ok(())
}
