//! # Bonsaigotchi - a bonsai virtual pet simulation
//!
//! A headless simulation of a bonsai creature and the world it grows in.
//!
//! ## Features
//!
//! - **Creature engine**: bounded vitals that decay over scaled real time, nine care
//!   actions with cooldowns, five foods, health conditions, deferred effects, XP and
//!   levels with mood and streak multipliers, and a day-boundary care evaluation.
//! - **Environment engine**: seasons, weighted weather tables per climate zone, a
//!   day/night cycle, random events with intensity, forecasts and derived readings.
//! - **Persistence**: versioned JSON snapshots with SHA-256 sidecars, atomic locked
//!   writes, a rolling backup, rate limiting and field-by-field validation on load.
//! - **Session layer**: both engines behind one lock, a Tokio tick loop and autosave.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bonsaigotchi::config::Config;
//! use bonsaigotchi::session::Session;
//! use bonsaigotchi::sim::CareAction;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default("bonsai.toml").await?;
//!     let now = chrono::Utc::now();
//!     let (session, _outcome) = Session::open(&config, now)?;
//!     session.tick(now)?;
//!     session.act(CareAction::Water, now)?;
//!     session.save(now).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`sim`] - both engines and their value types; no I/O
//! - [`storage`] - save store, snapshot model and autosave scheduler
//! - [`validation`] - name and snapshot validation
//! - [`config`] - TOML configuration
//! - [`session`] - the integration layer driving ticks and saves
//! - [`logutil`] - single-line log helpers

pub mod config;
pub mod logutil;
pub mod session;
pub mod sim;
pub mod storage;
pub mod validation;
