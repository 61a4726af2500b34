//! Background loading of artwork metadata and images
//!
//! Every load runs on its own thread and reports back through the command
//! queue. A failed image drops its artwork; nothing is retried.

use std::{io::Read, path::Path, sync::Arc, thread, time::Duration};

use log::{debug, info, warn};

use crate::{
    config::GalleryConfig,
    error::{GalleryError, Result},
    gfx::{resources::TextureImage, scene::NodeId},
};

use super::{
    artwork::{fetch_artworks, placements, ArtworkRecord, ArtworkSource, Placement},
    commands::{CommandSender, SceneCommand},
};

/// Upper bound on a downloaded image
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Resolves an image location into decoded pixels
pub trait TextureSource: Send + Sync {
    fn load(&self, location: &str) -> Result<TextureImage>;
}

/// Loads `http(s)://` locations over the network and anything else from disk
pub struct ImageFetcher {
    agent: ureq::Agent,
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(10))
                .build(),
        }
    }
}

impl TextureSource for ImageFetcher {
    fn load(&self, location: &str) -> Result<TextureImage> {
        if location.is_empty() {
            return Err(GalleryError::http(location, "no image url"));
        }

        let bytes = if location.starts_with("http://") || location.starts_with("https://") {
            let response = self
                .agent
                .get(location)
                .call()
                .map_err(|e| GalleryError::http(location, e))?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .take(MAX_IMAGE_BYTES)
                .read_to_end(&mut bytes)?;
            bytes
        } else {
            std::fs::read(Path::new(location))?
        };

        TextureImage::decode(&bytes)
    }
}

/// Loads one artwork image and queues the entity for creation
///
/// Returns whether the image loaded.
pub fn load_single_artwork(
    textures: &dyn TextureSource,
    record: ArtworkRecord,
    placement: Placement,
    sender: &CommandSender,
) -> bool {
    match textures.load(&record.image_url) {
        Ok(image) => {
            debug!("Loaded artwork image '{}'", record.title);
            sender
                .unbounded_send(SceneCommand::ArtworkLoaded {
                    record,
                    placement,
                    image,
                })
                .is_ok()
        }
        Err(e) => {
            warn!("Failed to load artwork '{}': {}", record.title, e);
            false
        }
    }
}

/// Fetches the listing, then loads each placed artwork on its own thread
pub fn spawn_artwork_loader(
    config: &GalleryConfig,
    source: Box<dyn ArtworkSource + Send>,
    textures: Arc<dyn TextureSource>,
    sender: CommandSender,
) -> std::io::Result<thread::JoinHandle<()>> {
    let max = config.max_artworks;
    let radius = config.artwork_radius;
    let height = config.artwork_height;

    thread::Builder::new()
        .name("artwork-loader".to_string())
        .spawn(move || {
            let records = fetch_artworks(source.as_ref());
            let slots = placements(records.len(), max, radius, height);
            info!("Placing {} of {} artworks", slots.len(), records.len());

            for (record, placement) in records.into_iter().zip(slots) {
                let textures = textures.clone();
                let sender = sender.clone();
                let spawned = thread::Builder::new()
                    .name(format!("artwork-{}", placement.index))
                    .spawn(move || {
                        load_single_artwork(textures.as_ref(), record, placement, &sender);
                    });
                if let Err(e) = spawned {
                    warn!("Could not start artwork load: {}", e);
                }
            }
        })
}

/// Loads a texture for `target`; failures keep the node's base colour
pub fn spawn_texture_load(
    textures: Arc<dyn TextureSource>,
    location: String,
    target: NodeId,
    sender: CommandSender,
) {
    let spawned = thread::Builder::new()
        .name("texture-loader".to_string())
        .spawn(move || match textures.load(&location) {
            Ok(image) => {
                let _ = sender.unbounded_send(SceneCommand::TextureLoaded { target, image });
            }
            Err(e) => debug!("Texture '{}' unavailable: {}", location, e),
        });
    if let Err(e) = spawned {
        debug!("Could not start texture load: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gallery::{artwork::default_artworks, commands::CommandQueue};

    /// Serves a 2x2 image for every location except those containing "missing"
    pub(crate) struct FakeTextures;

    impl TextureSource for FakeTextures {
        fn load(&self, location: &str) -> Result<TextureImage> {
            if location.contains("missing") {
                Err(GalleryError::http(location, "404"))
            } else {
                Ok(TextureImage::solid(2, 2, [200, 180, 90, 255]))
            }
        }
    }

    struct Listing(Vec<ArtworkRecord>);

    impl ArtworkSource for Listing {
        fn fetch(&self) -> Result<Vec<ArtworkRecord>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_failed_image_sends_nothing() {
        let mut queue = CommandQueue::new();
        let mut record = default_artworks().remove(0);
        record.image_url = "images/missing.jpg".to_string();
        let slot = placements(1, 8, 9.0, 2.0)[0];

        assert!(!load_single_artwork(&FakeTextures, record, slot, &queue.sender()));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_loader_places_at_most_eight() {
        let mut queue = CommandQueue::new();
        let mut records = default_artworks();
        records.extend(default_artworks());
        records[3].image_url = "missing".to_string();

        let config = GalleryConfig::default();
        spawn_artwork_loader(
            &config,
            Box::new(Listing(records)),
            Arc::new(FakeTextures),
            queue.sender(),
        )
        .unwrap()
        .join()
        .unwrap();

        let mut loaded = Vec::new();
        for _ in 0..500 {
            for command in queue.drain() {
                if let SceneCommand::ArtworkLoaded { placement, .. } = command {
                    loaded.push(placement.index);
                }
            }
            if loaded.len() == 7 {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        loaded.sort_unstable();
        assert_eq!(loaded, vec![0, 1, 2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_empty_location_is_an_error() {
        assert!(ImageFetcher::default().load("").is_err());
        assert!(ImageFetcher::default().load("does/not/exist.png").is_err());
    }
}
