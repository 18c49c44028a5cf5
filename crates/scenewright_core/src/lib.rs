//! Core data types for the Scenewright screenplay generation pipeline.
//!
//! This crate provides the screenplay data model shared by every stage of the
//! pipeline, plus the provider-neutral request and response types used to talk to
//! a generative backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aspect;
mod image;
mod input;
mod message;
mod output;
mod request;
mod role;
mod screenplay;

pub use aspect::AspectRatio;
pub use image::{CharacterReference, ImageData};
pub use input::Input;
pub use message::{Message, MessageBuilder};
pub use output::Output;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateResponse, ResponseFormat, ResponseModality,
};
pub use role::Role;
pub use screenplay::{RawScene, RawScreenplay, Scene, SceneId, Screenplay, StoryIdea};
