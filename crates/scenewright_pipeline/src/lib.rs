//! Screenplay generation pipeline for Scenewright.
//!
//! This crate turns a story idea into an illustrated screenplay. It owns the
//! sequencing of the generation stages and the character consistency protocol:
//!
//! - [`templates`] render scenes into instructions for each generation stage
//! - [`GenerationGateway`] is the only component that talks to a
//!   [`GenerativeDriver`](scenewright_interface::GenerativeDriver)
//! - [`CharacterRegistry`] keeps the ordered, deduplicated reference images
//! - [`Pipeline`] drives script → visuals → on-demand images and exposes
//!   read-only [`SessionSnapshot`]s
//!
//! # Example
//!
//! ```no_run
//! use scenewright_pipeline::{GatewayModels, GenerationGateway, Pipeline, PipelineSettings};
//! # use scenewright_interface::GenerativeDriver;
//! # async fn run<D: GenerativeDriver + 'static>(driver: D) -> scenewright_error::ScenewrightResult<()> {
//! let gateway = GenerationGateway::new(driver, GatewayModels::default());
//! let pipeline = Pipeline::new(gateway, PipelineSettings::default());
//!
//! pipeline
//!     .submit_idea("A lighthouse keeper finds a message in a bottle.")
//!     .await?;
//! let snapshot = pipeline.snapshot().await;
//! println!("{} scenes", snapshot.screenplay.map(|s| s.scenes().len()).unwrap_or(0));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod gateway;
mod pipeline;
mod registry;
mod session;
mod settings;
pub mod templates;

pub use extraction::{extract_json, parse_screenplay};
pub use gateway::{GenerationGateway, KeyframeRequest, SceneVisuals, is_quota_message};
pub use pipeline::Pipeline;
pub use registry::CharacterRegistry;
pub use session::{ErrorReport, ErrorScope, LoadingFlags, SessionSnapshot, Stage};
pub use settings::{GatewayModels, PipelineSettings};
