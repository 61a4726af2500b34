//! Artwork metadata, the ring placement rule and the registry of placed
//! artworks

use std::{f32::consts::PI, time::Duration};

use cgmath::Vector3;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    config::GalleryConfig,
    error::{GalleryError, Result},
    gfx::scene::NodeId,
};

/// Artist name used when a record lists no people
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Immutable description of one artwork
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkRecord {
    pub title: String,
    pub artist: String,
    pub image_url: String,
    pub date: String,
    pub medium: String,
    pub description: Option<String>,
    pub culture: Option<String>,
}

impl ArtworkRecord {
    fn fallback(title: &str, artist: &str, image: usize, date: &str, medium: &str) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            image_url: format!("images/artwork{}.jpg", image),
            date: date.to_string(),
            medium: medium.to_string(),
            description: None,
            culture: None,
        }
    }
}

#[derive(Deserialize)]
struct ObjectListing {
    records: Vec<ObjectRecord>,
}

#[derive(Deserialize)]
struct ObjectRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    people: Option<Vec<Person>>,
    #[serde(default)]
    primaryimageurl: Option<String>,
    #[serde(default)]
    dated: Option<String>,
    #[serde(default)]
    medium: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    culture: Option<String>,
}

#[derive(Deserialize)]
struct Person {
    #[serde(default)]
    name: Option<String>,
}

impl From<ObjectRecord> for ArtworkRecord {
    fn from(record: ObjectRecord) -> Self {
        let artist = record
            .people
            .and_then(|people| people.into_iter().next())
            .and_then(|person| person.name)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        Self {
            title: record.title.unwrap_or_default(),
            artist,
            image_url: record.primaryimageurl.unwrap_or_default(),
            date: record.dated.unwrap_or_default(),
            medium: record.medium.unwrap_or_default(),
            description: record.description,
            culture: record.culture,
        }
    }
}

/// Parses an object listing body into records
///
/// A body without a `records` array is an error; an empty array is not.
pub fn parse_listing(body: &str) -> Result<Vec<ArtworkRecord>> {
    let listing: ObjectListing = serde_json::from_str(body)?;
    Ok(listing.records.into_iter().map(ArtworkRecord::from).collect())
}

/// Where artwork metadata comes from
pub trait ArtworkSource {
    fn fetch(&self) -> Result<Vec<ArtworkRecord>>;
}

/// Object listing of the Harvard Art Museums API
pub struct HarvardArtSource {
    url: String,
    agent: ureq::Agent,
}

impl HarvardArtSource {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            url: config.artwork_request_url(),
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(10))
                .build(),
        }
    }
}

impl ArtworkSource for HarvardArtSource {
    fn fetch(&self) -> Result<Vec<ArtworkRecord>> {
        debug!("Requesting artwork listing");
        let response = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|e| GalleryError::http(&self.url, e))?;
        let body = response.into_string()?;
        parse_listing(&body)
    }
}

/// Fetches artwork metadata, substituting [`default_artworks`] on any failure
pub fn fetch_artworks(source: &dyn ArtworkSource) -> Vec<ArtworkRecord> {
    match source.fetch() {
        Ok(records) => {
            info!("Fetched {} artworks", records.len());
            records
        }
        Err(e) => {
            warn!("Error fetching artworks: {}", e);
            default_artworks()
        }
    }
}

/// Built-in artworks shown when the API is unreachable
pub fn default_artworks() -> Vec<ArtworkRecord> {
    vec![
        ArtworkRecord::fallback("Ethereal Dreams", "Maria Santos", 1, "2024", "Oil on Canvas"),
        ArtworkRecord::fallback("Golden Hour", "James Whitfield", 2, "2023", "Acrylic on Canvas"),
        ArtworkRecord::fallback("Silent Orbit", "Aiko Tanaka", 3, "2022", "Mixed Media"),
        ArtworkRecord::fallback("Nebula Garden", "Lucas Moreau", 4, "2024", "Oil on Linen"),
        ArtworkRecord::fallback("Glass Horizon", "Elena Petrova", 5, "2021", "Watercolor"),
        ArtworkRecord::fallback("Quiet Meridian", "Samuel Okafor", 6, "2023", "Oil on Canvas"),
        ArtworkRecord::fallback("Amber Tide", "Clara Lindqvist", 7, "2020", "Gouache on Paper"),
        ArtworkRecord::fallback("Starlit Atrium", "Diego Alvarez", 8, "2024", "Digital Print"),
    ]
}

/// Slot on the artwork ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub angle: f32,
    pub position: Vector3<f32>,
}

impl Placement {
    /// Y rotation turning the artwork towards the centre
    pub fn facing(&self) -> f32 {
        self.angle + PI / 2.0
    }

    /// Position of the image plane, pushed `offset` along the facing normal
    pub fn plane_position(&self, offset: f32) -> Vector3<f32> {
        let facing = self.facing();
        self.position + Vector3::new(facing.sin() * offset, 0.0, facing.cos() * offset)
    }
}

/// Slots for `count` artworks; at most `max` are placed
pub fn placements(count: usize, max: usize, radius: f32, height: f32) -> Vec<Placement> {
    let n = count.min(max);
    (0..n)
        .map(|index| {
            let angle = index as f32 / n as f32 * PI * 2.0;
            Placement {
                index,
                angle,
                position: Vector3::new(angle.sin() * radius, height, angle.cos() * radius),
            }
        })
        .collect()
}

/// A placed artwork whose image finished loading
#[derive(Debug, Clone)]
pub struct ArtworkEntity {
    pub frame: NodeId,
    pub plane: NodeId,
    pub placement: Placement,
    pub info: ArtworkRecord,
}

/// Placed artworks in load-completion order
#[derive(Debug, Default)]
pub struct ArtworkRegistry {
    entities: Vec<ArtworkEntity>,
}

impl ArtworkRegistry {
    /// Index the next registered entity will receive
    pub fn next_index(&self) -> usize {
        self.entities.len()
    }

    pub fn register(&mut self, entity: ArtworkEntity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&ArtworkEntity> {
        self.entities.get(index)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtworkEntity> {
        self.entities.iter()
    }
}
