use bonsaigotchi::config::Config;
use bonsaigotchi::session::Session;
use bonsaigotchi::sim::{CareAction, Change, FoodItem};
use bonsaigotchi::storage::LoadSource;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 15, 18, 30, 0).unwrap()
}

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = dir.path().to_string_lossy().into_owned();
    config.storage.min_save_interval_ms = 0;
    config.simulation.seed = Some(11);
    config.simulation.tick_interval_ms = 10;
    config.simulation.default_name = "Hinoki".to_string();
    config
}

#[tokio::test]
async fn fresh_session_saves_and_reopens_from_primary() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let (session, outcome) = Session::open(&config, t0()).unwrap();
    assert_eq!(outcome.source, LoadSource::Fresh);
    assert!(outcome.problems.is_empty());
    assert!(session.act(CareAction::Water, t0()).unwrap());
    assert!(session.feed(FoodItem::Vegetables, t0()).unwrap());
    let water = session.inspect(|w| w.creature.water()).unwrap();
    let receipt = session.save(t0()).await.unwrap();
    assert!(receipt.path.exists());
    drop(session);

    let (reopened, outcome) = Session::open(&config, t0()).unwrap();
    assert_eq!(outcome.source, LoadSource::Primary);
    assert_eq!(reopened.load_source(), LoadSource::Primary);
    let (name, restored_water) = reopened
        .inspect(|w| (w.creature.name().to_string(), w.creature.water()))
        .unwrap();
    assert_eq!(name, "Hinoki");
    assert_eq!(restored_water, water);
}

#[tokio::test]
async fn fast_forward_reanchors_to_wall_clock() {
    let dir = TempDir::new().unwrap();
    let (session, _) = Session::open(&test_config(&dir), t0()).unwrap();

    let ticks = session.fast_forward(30, t0()).unwrap();
    assert_eq!(ticks.len(), 31);
    let simulated: f64 = ticks.iter().map(|t| t.creature.minutes_simulated).sum();
    assert!((simulated - 30.0).abs() < 1e-6);

    let (creature_anchor, env_anchor) = session
        .inspect(|w| (w.creature.last_update_time(), w.environment.last_update_time()))
        .unwrap();
    assert_eq!(creature_anchor, t0());
    assert_eq!(env_anchor, t0());

    let report = session.tick(t0()).unwrap();
    assert!(report.creature.changes.is_empty());
    assert_eq!(report.environment.game_minutes_advanced, 0.0);
}

#[tokio::test]
async fn listeners_registered_on_the_session_hear_actions() {
    let dir = TempDir::new().unwrap();
    let (session, _) = Session::open(&test_config(&dir), t0()).unwrap();
    let heard = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&heard);
    session
        .add_listener(move |_: &Change| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert!(session.act(CareAction::Water, t0()).unwrap());
    assert!(heard.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn run_until_saves_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let (session, _) = Session::open(&config, Utc::now()).unwrap();

    session
        .run_until(tokio::time::sleep(Duration::from_millis(60)))
        .await
        .unwrap();

    assert!(dir.path().join("bonsai.json").exists());
    assert!(dir.path().join("bonsai.json.sha256").exists());
    let status = session.autosave_status().unwrap();
    assert!(status.enabled);
}

#[tokio::test]
async fn corrupted_save_reopens_from_backup() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let (session, _) = Session::open(&config, t0()).unwrap();
    session.save(t0()).await.unwrap();
    session.act(CareAction::Water, t0()).unwrap();
    session.save(t0()).await.unwrap();
    drop(session);

    std::fs::write(dir.path().join("bonsai.json"), b"not json at all").unwrap();
    let (reopened, outcome) = Session::open(&config, t0()).unwrap();
    assert_eq!(outcome.source, LoadSource::Backup);
    assert_eq!(outcome.problems.len(), 1);
    // the backup predates the watering
    let water = reopened.inspect(|w| w.creature.water()).unwrap();
    assert_eq!(water, 50);
}

#[tokio::test]
async fn wallet_commands_go_through_the_session() {
    let dir = TempDir::new().unwrap();
    let (session, _) = Session::open(&test_config(&dir), t0()).unwrap();
    let claimed = session.claim_daily_reward(t0()).unwrap();
    assert!(claimed.is_some());
    assert!(session.claim_daily_reward(t0()).unwrap().is_none());

    session.buy(FoodItem::Burger, 2).unwrap();
    let burgers = session
        .inspect(|w| w.creature.inventory().quantity(FoodItem::Burger.id()))
        .unwrap();
    assert_eq!(burgers, 4);
}

#[tokio::test]
async fn watering_cooldown_holds_across_a_reopen() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let (session, _) = Session::open(&config, t0()).unwrap();
    assert!(session.act(CareAction::Water, t0()).unwrap());
    session.save(t0()).await.unwrap();
    drop(session);

    let later = t0() + chrono::Duration::seconds(30);
    let (reopened, _) = Session::open(&config, later).unwrap();
    reopened.tick(later).unwrap();
    assert!(!reopened.available_actions(later).unwrap().contains(&CareAction::Water));
    assert!(!reopened.act(CareAction::Water, later).unwrap());
}

#[tokio::test]
async fn rename_and_unlock_are_saved() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let (session, _) = Session::open(&config, t0()).unwrap();
    assert!(session.rename("  ").is_err());
    session.rename(" Sakura ").unwrap();
    assert!(session.unlock("moss_pot").unwrap());
    assert!(!session.unlock("moss_pot").unwrap());
    assert!(session.unlock("").is_err());
    session.save(t0()).await.unwrap();
    drop(session);

    let (reopened, _) = Session::open(&config, t0()).unwrap();
    let (name, unlocked) = reopened
        .inspect(|w| {
            (
                w.creature.name().to_string(),
                w.creature.unlocked_shop_items().contains("moss_pot"),
            )
        })
        .unwrap();
    assert_eq!(name, "Sakura");
    assert!(unlocked);
}

#[tokio::test]
async fn autosave_can_be_reconfigured_per_session() {
    let dir = TempDir::new().unwrap();
    let (session, _) = Session::open(&test_config(&dir), t0()).unwrap();

    session.configure_autosave(true, Some(0)).unwrap();
    let status = session.autosave_status().unwrap();
    assert!(status.enabled);
    assert_eq!(status.interval_minutes, 1);

    session.configure_autosave(false, None).unwrap();
    let status = session.autosave_status().unwrap();
    assert!(!status.enabled);
    assert_eq!(status.next_due_in, None);
}
