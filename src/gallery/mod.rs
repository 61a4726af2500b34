//! # Gallery
//!
//! The circular art gallery itself: what is in the room, where it goes and
//! how it moves.
//!
//! - [`factory`] - Composite props (frames, desks, chandeliers, particle fields)
//! - [`assembler`] - The static room layout
//! - [`space`] - Planets, star clusters and nebulae outside the glass
//! - [`artwork`] / [`loader`] - Artwork metadata, placement and image loading
//! - [`interaction`] - Quarter-turn rotations, hover picking and the overlay
//! - [`effects`] - Shooting stars and other short-lived scene objects
//! - [`animation`] - The per-frame tick
//!
//! Background threads never touch the scene. They send a [`SceneCommand`]
//! through the [`CommandQueue`], which the tick drains before anything moves.

pub mod animation;
pub mod artwork;
pub mod assembler;
pub mod commands;
pub mod context;
pub mod effects;
pub mod factory;
pub mod interaction;
pub mod loader;
pub mod space;
pub mod tween;

pub use artwork::{ArtworkRecord, ArtworkRegistry, ArtworkSource, HarvardArtSource};
pub use commands::{CommandQueue, SceneCommand};
pub use context::GalleryContext;
pub use interaction::{InteractionController, TransitionState};
pub use loader::{ImageFetcher, TextureSource};
