//! Scenewright - from story idea to illustrated screenplay
//!
//! Scenewright decomposes a short story idea into a scene-by-scene screenplay,
//! derives a keyframe prompt and a transition for every scene, and generates
//! keyframe images that keep characters recognisable across scenes by reusing
//! locked reference images.
//!
//! # Quick Start
//!
//! ```no_run
//! use scenewright::{
//!     GeminiClient, GenerationGateway, Pipeline, ScenewrightConfig, SceneId,
//! };
//!
//! # async fn run() -> scenewright::ScenewrightResult<()> {
//! let config = ScenewrightConfig::load()?;
//! let client = GeminiClient::from_settings(config.gemini(), config.models().script().clone())?;
//! let gateway = GenerationGateway::new(client, config.models().clone());
//! let pipeline = Pipeline::new(gateway, config.pipeline().clone());
//!
//! pipeline
//!     .submit_idea("A lighthouse keeper finds a message in a bottle.")
//!     .await?;
//! pipeline.request_keyframe(SceneId(1), None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `scenewright_error` - Error types
//! - `scenewright_core` - Screenplay data model and provider-neutral requests
//! - `scenewright_interface` - The `GenerativeDriver` trait
//! - `scenewright_models` - Gemini client, rate limiting and retry
//! - `scenewright_pipeline` - Prompt templates, gateway, registry and orchestrator
//! - `scenewright_export` - Script, transitions and keyframe archive exports
//!
//! This crate re-exports everything for convenience and adds configuration
//! loading and logging setup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observability;
mod settings;

pub use observability::{LoggingConfig, init_logging};
pub use settings::ScenewrightConfig;

pub use scenewright_core::*;
pub use scenewright_error::*;
pub use scenewright_export::*;
pub use scenewright_interface::*;
pub use scenewright_models::*;
pub use scenewright_pipeline::*;
