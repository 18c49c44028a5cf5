//! Trait definitions for Scenewright generative backends.
//!
//! The pipeline depends only on [`GenerativeDriver`], never on a concrete provider.

mod traits;

pub use traits::GenerativeDriver;
