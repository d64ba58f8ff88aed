//! Session layer: one creature and its environment behind a single lock, driven by
//! a tick loop, with saves pushed off the tick path onto the blocking pool.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::config::Config;
use crate::logutil::{escape_log, vitals_line};
use crate::sim::creature::{Creature, TickReport};
use crate::sim::environment::{Environment, EnvironmentReport, EnvironmentSettings};
use crate::sim::errors::SimError;
use crate::sim::rng;
use crate::sim::types::{CareAction, FoodItem};
use crate::sim::ChangeListener;
use crate::storage::autosave::{AutosaveScheduler, AutosaveStatus};
use crate::storage::{LoadOutcome, LoadSource, SaveReceipt, SaveSnapshot, SaveStore};

/// The two engines, always locked together.
pub struct World {
    pub creature: Creature,
    pub environment: Environment,
}

/// Combined result of one session tick.
#[derive(Debug, Clone, Default)]
pub struct SessionTick {
    pub creature: TickReport,
    pub environment: EnvironmentReport,
}

pub struct Session {
    world: Arc<Mutex<World>>,
    store: Arc<Mutex<SaveStore>>,
    autosave: Mutex<AutosaveScheduler>,
    speed: f64,
    tick_interval: std::time::Duration,
    load_source: LoadSource,
}

impl Session {
    /// Open the configured save, falling back to a backup or a fresh creature.
    pub fn open(config: &Config, now: DateTime<Utc>) -> Result<(Self, LoadOutcome), SimError> {
        let store = SaveStore::new(
            &config.storage.data_dir,
            &config.storage.save_file,
            config.storage.min_save_interval(),
        )?;
        let outcome = store.load();
        let settings = config.environment.settings();
        let seed = config.simulation.seed;

        let world = match &outcome.snapshot {
            Some(snapshot) => restore_world(snapshot, settings, seed, now)?,
            None => fresh_world(&config.simulation.default_name, settings, seed, now)?,
        };
        info!(
            "Session opened for '{}' ({:?})",
            escape_log(world.creature.name()),
            outcome.source
        );

        let session = Self {
            world: Arc::new(Mutex::new(world)),
            store: Arc::new(Mutex::new(store)),
            autosave: Mutex::new(AutosaveScheduler::new(config.autosave, Instant::now())),
            speed: config.simulation.speed(),
            tick_interval: config.simulation.tick_interval(),
            load_source: outcome.source,
        };
        Ok((session, outcome))
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    fn world(&self) -> Result<MutexGuard<'_, World>, SimError> {
        self.world
            .lock()
            .map_err(|_| SimError::Internal("world lock poisoned".to_string()))
    }

    /// Run `f` with shared access to both engines.
    pub fn inspect<R>(&self, f: impl FnOnce(&World) -> R) -> Result<R, SimError> {
        let guard = self.world()?;
        Ok(f(&guard))
    }

    pub fn add_listener(&self, listener: impl ChangeListener + 'static) -> Result<(), SimError> {
        self.world()?.creature.add_listener(listener);
        Ok(())
    }

    /// Advance both engines to `now`. The creature sees the environment's readings.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<SessionTick, SimError> {
        let mut world = self.world()?;
        let environment = world.environment.update(now);
        let exposure = world.environment.exposure();
        let creature = world.creature.update_with(now, self.speed, Some(exposure));
        if !creature.changes.is_empty() {
            debug!("{}", vitals_line(&world.creature));
        }
        Ok(SessionTick {
            creature,
            environment,
        })
    }

    pub fn act(&self, action: CareAction, now: DateTime<Utc>) -> Result<bool, SimError> {
        let mut world = self.world()?;
        let applied = world.creature.perform(action, now);
        if applied {
            info!("{} -> {}", action, vitals_line(&world.creature));
        }
        Ok(applied)
    }

    pub fn feed(&self, item: FoodItem, now: DateTime<Utc>) -> Result<bool, SimError> {
        let mut world = self.world()?;
        Ok(world.creature.feed(item, now))
    }

    pub fn buy(&self, item: FoodItem, quantity: u32) -> Result<(), SimError> {
        self.world()?.creature.buy_food(item, quantity)
    }

    pub fn claim_daily_reward(&self, now: DateTime<Utc>) -> Result<Option<u64>, SimError> {
        Ok(self.world()?.creature.claim_daily_reward(now))
    }

    pub fn rename(&self, name: &str) -> Result<(), SimError> {
        let mut world = self.world()?;
        world.creature.rename(name)?;
        info!("Renamed to '{}'", escape_log(world.creature.name()));
        Ok(())
    }

    /// Record a shop unlock. `Ok(false)` when the item was already unlocked.
    pub fn unlock(&self, item_id: &str) -> Result<bool, SimError> {
        let unlocked = self.world()?.creature.unlock_shop_item(item_id)?;
        if unlocked {
            info!("Unlocked shop item '{}'", escape_log(item_id.trim()));
        }
        Ok(unlocked)
    }

    /// Care actions that would be applied if performed at `now`.
    pub fn available_actions(&self, now: DateTime<Utc>) -> Result<Vec<CareAction>, SimError> {
        let world = self.world()?;
        Ok(CareAction::ALL
            .iter()
            .copied()
            .filter(|action| world.creature.can_perform(*action, now))
            .collect())
    }

    /// Run `minutes` one-minute ticks starting at `now`, then re-anchor both engines
    /// back to `now` so the next real tick does not see the synthetic time.
    pub fn fast_forward(&self, minutes: u32, now: DateTime<Utc>) -> Result<Vec<SessionTick>, SimError> {
        let mut ticks = Vec::with_capacity(minutes as usize + 1);
        ticks.push(self.tick(now)?);
        let mut at = now;
        for _ in 0..minutes {
            at += ChronoDuration::minutes(1);
            ticks.push(self.tick(at)?);
        }
        let mut world = self.world()?;
        world.creature.rebase(at, now);
        world.environment.rebase(at, now);
        Ok(ticks)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Result<SaveSnapshot, SimError> {
        let world = self.world()?;
        Ok(SaveSnapshot::capture(
            &world.creature,
            Some(&world.environment),
            now,
        ))
    }

    /// Snapshot under the lock, write on the blocking pool.
    pub async fn save(&self, now: DateTime<Utc>) -> Result<SaveReceipt, SimError> {
        let snapshot = self.snapshot(now)?;
        let store = Arc::clone(&self.store);
        let receipt = tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|_| SimError::Internal("store lock poisoned".to_string()))?;
            store.save(&snapshot)
        })
        .await
        .map_err(|e| SimError::Internal(format!("save task failed: {}", e)))??;

        if let Ok(mut autosave) = self.autosave.lock() {
            autosave.mark_saved(Instant::now());
        }
        Ok(receipt)
    }

    /// Save, waiting out a rate limit once.
    pub async fn save_now(&self, now: DateTime<Utc>) -> Result<SaveReceipt, SimError> {
        match self.save(now).await {
            Err(SimError::RateLimited { retry_after_ms }) => {
                tokio::time::sleep(std::time::Duration::from_millis(retry_after_ms)).await;
                self.save(Utc::now()).await
            }
            other => other,
        }
    }

    /// Override the configured autosave settings for this session.
    pub fn configure_autosave(
        &self,
        enabled: bool,
        interval_minutes: Option<u64>,
    ) -> Result<(), SimError> {
        let mut autosave = self
            .autosave
            .lock()
            .map_err(|_| SimError::Internal("autosave lock poisoned".to_string()))?;
        if let Some(minutes) = interval_minutes {
            autosave.set_interval_minutes(minutes);
        }
        if enabled {
            autosave.enable();
        } else {
            autosave.disable();
        }
        Ok(())
    }

    pub fn autosave_status(&self) -> Option<AutosaveStatus> {
        self.autosave
            .lock()
            .ok()
            .map(|autosave| autosave.status(Instant::now()))
    }

    fn autosave_due(&self) -> bool {
        self.autosave
            .lock()
            .map(|autosave| autosave.is_due(Instant::now()))
            .unwrap_or(false)
    }

    /// Tick on the configured interval until `shutdown` resolves, then save once more.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), SimError>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    let now = Utc::now();
                    match self.tick(now) {
                        Ok(report) => log_notices(&report),
                        Err(e) => error!("Tick failed: {}", e),
                    }
                    if self.autosave_due() {
                        match self.save(now).await {
                            Ok(receipt) => debug!("Autosaved {} bytes", receipt.bytes),
                            Err(SimError::RateLimited { .. }) => debug!("Autosave deferred by rate limit"),
                            Err(e) => error!("Autosave failed: {}", e),
                        }
                    }
                }
            }
        }

        match self.save_now(Utc::now()).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Final save failed: {}", e);
                Err(e)
            }
        }
    }
}

fn log_notices(report: &SessionTick) {
    for notice in &report.environment.notices {
        debug!("environment: {:?}", notice);
    }
    for step in report
        .creature
        .skipped_steps
        .iter()
        .chain(report.environment.skipped_steps.iter())
    {
        warn!("tick step skipped: {}", step);
    }
}

fn fresh_world(
    name: &str,
    settings: EnvironmentSettings,
    seed: Option<u64>,
    now: DateTime<Utc>,
) -> Result<World, SimError> {
    Ok(World {
        creature: Creature::new(name, now, rng::from_config(seed))?,
        environment: Environment::new(settings, now, rng::from_config(seed.map(|s| s.wrapping_add(1)))),
    })
}

fn restore_world(
    snapshot: &SaveSnapshot,
    settings: EnvironmentSettings,
    seed: Option<u64>,
    now: DateTime<Utc>,
) -> Result<World, SimError> {
    let creature = snapshot.restore_creature(rng::from_config(seed))?;
    let environment = snapshot.restore_environment(
        settings,
        now,
        rng::from_config(seed.map(|s| s.wrapping_add(1))),
    );
    Ok(World {
        creature,
        environment,
    })
}
