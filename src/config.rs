//! Gallery configuration
//!
//! [`GalleryConfig`] carries every tunable constant of the gallery layout and
//! its animations. Defaults reproduce the reference gallery; a handful of
//! values can be overridden from the environment via [`GalleryConfig::from_env`].

use std::time::Duration;

use log::warn;

use crate::error::GalleryError;

/// Default endpoint of the Harvard Art Museums object API
pub const DEFAULT_API_URL: &str = "https://api.harvardartmuseums.org/object";

/// Configuration for the gallery scene, loaders and animations
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    // Artwork source
    pub api_url: String,
    pub api_key: String,
    pub fetch_size: usize,
    pub classification: String,

    // Artwork ring
    pub max_artworks: usize,
    pub artwork_radius: f32,
    pub artwork_height: f32,

    // Camera
    pub camera_start: [f32; 3],
    pub rotation_radius: f32,
    pub rotation_duration: Duration,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    // Room layout
    pub desk_count: usize,
    pub desk_radius: f32,
    pub floor_light_count: usize,
    pub floor_light_radius: f32,
    pub crystal_count: usize,
    pub decorations: bool,

    // Space backdrop
    pub seed: u64,
    pub star_count: usize,
    pub cluster_count: usize,
    pub cluster_particles: usize,
    pub nebula_particles: usize,
    pub dust_particles: usize,

    // Atmosphere
    pub fog_color: u32,
    pub fog_density: f32,
    pub skybox_size: f32,

    // Shooting stars
    pub shooting_star_interval: Duration,
    pub shooting_star_lifetime: Duration,
    pub shooting_star_trail: usize,
    pub shooting_star_travel: f32,

    // Loading screen
    pub loading_delay: Duration,
    pub loading_fade: Duration,

    // Asset locations
    pub floor_texture: String,
    pub planet_textures: [String; 3],
    /// Skybox faces in +x, -x, +y, -y, +z, -z order
    pub skybox_textures: [String; 6],
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: "YOUR_API_KEY".to_string(),
            fetch_size: 20,
            classification: "Paintings".to_string(),

            max_artworks: 8,
            artwork_radius: 9.0,
            artwork_height: 2.0,

            camera_start: [0.0, 1.7, 5.0],
            rotation_radius: 5.0,
            rotation_duration: Duration::from_secs(2),
            damping_factor: 0.05,
            rotate_speed: 0.5,
            min_distance: 3.0,
            max_distance: 10.0,

            desk_count: 8,
            desk_radius: 12.0,
            floor_light_count: 16,
            floor_light_radius: 19.0,
            crystal_count: 20,
            decorations: false,

            seed: 0x47A1_1E5E_ED00,
            star_count: 10_000,
            cluster_count: 5,
            cluster_particles: 2000,
            nebula_particles: 1000,
            dust_particles: 1000,

            fog_color: 0x1a1a1a,
            fog_density: 0.035,
            skybox_size: 800.0,

            shooting_star_interval: Duration::from_secs(3),
            shooting_star_lifetime: Duration::from_secs(2),
            shooting_star_trail: 20,
            shooting_star_travel: 1000.0,

            loading_delay: Duration::from_secs(2),
            loading_fade: Duration::from_secs(1),

            floor_texture: "textures/marble-floor.jpg".to_string(),
            planet_textures: [
                "textures/planets/planet1.jpg".to_string(),
                "textures/planets/planet2.jpg".to_string(),
                "textures/planets/planet3.jpg".to_string(),
            ],
            skybox_textures: ["px", "nx", "py", "ny", "pz", "nz"]
                .map(|face| format!("textures/space/{}.jpg", face)),
        }
    }
}

impl GalleryConfig {
    /// Default configuration with environment overrides applied
    ///
    /// Recognised variables: `GALLERY_API_KEY`, `GALLERY_API_URL`,
    /// `GALLERY_SEED` and `GALLERY_DECORATIONS`. Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Applies overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GALLERY_API_KEY") {
            self.api_key = key;
        }
        if let Some(url) = lookup("GALLERY_API_URL") {
            self.api_url = url;
        }
        if let Some(seed) = lookup("GALLERY_SEED") {
            match parse_seed(&seed) {
                Ok(seed) => self.seed = seed,
                Err(e) => warn!("Ignoring override: {}", e),
            }
        }
        if let Some(flag) = lookup("GALLERY_DECORATIONS") {
            match parse_flag("GALLERY_DECORATIONS", &flag) {
                Ok(flag) => self.decorations = flag,
                Err(e) => warn!("Ignoring override: {}", e),
            }
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = key.to_string();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_decorations(mut self, enabled: bool) -> Self {
        self.decorations = enabled;
        self
    }

    /// Builds the full request URL for the artwork listing
    pub fn artwork_request_url(&self) -> String {
        format!(
            "{}?apikey={}&size={}&hasimage=1&classification={}",
            self.api_url, self.api_key, self.fetch_size, self.classification
        )
    }
}

fn parse_seed(value: &str) -> Result<u64, GalleryError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => trimmed.parse().ok(),
    };
    parsed.ok_or_else(|| GalleryError::Config {
        key: "GALLERY_SEED".to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, GalleryError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GalleryError::Config {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
