//! Post text and plots from notebooks into Slack, one thread per channel.
//!
//! ```rust,ignore
//! use chartsworth::{Chartsworth, ChartsworthConfig};
//!
//! let config = ChartsworthConfig::from_env().with_default_channel("general");
//! let chartsworth = Chartsworth::new(&config)?;
//! chartsworth.post_text("training started", None).await?;   // opens the thread
//! chartsworth.post_text("epoch 1 done", None).await?;       // replies in it
//! chartsworth.post_monster(None).await?;
//! ```

pub mod args;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod logging;
pub mod monster;
pub mod notebook;
pub mod slack;
pub mod threads;

pub use client::{Chartsworth, Post, UploadOutcome};
pub use config::ChartsworthConfig;
pub use encode::{Figure, ImageSource, ImageUpload};
pub use error::{Error, Result};
pub use monster::MonsterPlot;
pub use notebook::NotebookContext;
pub use slack::{SlackApi, SlackWebClient};
pub use threads::ThreadRegistry;
