//! Zone catalog
//!
//! Read-only, ordered list of the zones a run goes through. The built-in
//! catalog has ten zones; an alternative one can be loaded from JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Zone identifier (1-based, also keys the zone's soundtrack)
pub type ZoneId = u32;

/// Vertical placement class of an obstacle template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightClass {
    /// Sits on the ground line
    #[default]
    Ground,
    /// Floats in a band above the ground
    Medium,
    /// Floats; scattered over a wider band in safe zones
    Any,
}

impl HeightClass {
    #[inline]
    pub fn floats(&self) -> bool {
        matches!(self, HeightClass::Medium | HeightClass::Any)
    }
}

/// Blueprint for spawned obstacles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    pub kind: String,
    #[serde(default)]
    pub height: HeightClass,
    /// Collectible even outside a safe zone
    #[serde(default)]
    pub collectible: bool,
    #[serde(default)]
    pub gives_life: bool,
    /// Score value when collected (defaults to `DEFAULT_COLLECT_POINTS`)
    #[serde(default)]
    pub points: Option<u64>,
}

impl ObstacleTemplate {
    fn hazard(kind: &str, height: HeightClass) -> Self {
        Self {
            kind: kind.to_string(),
            height,
            collectible: false,
            gives_life: false,
            points: None,
        }
    }

    fn item(kind: &str, height: HeightClass, points: u64) -> Self {
        Self {
            collectible: true,
            points: Some(points),
            ..Self::hazard(kind, height)
        }
    }

    fn life(kind: &str, height: HeightClass, points: u64) -> Self {
        Self {
            gives_life: true,
            ..Self::item(kind, height, points)
        }
    }
}

/// Colors of a zone (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneTheme {
    pub sky_top: u32,
    pub sky_bottom: u32,
    pub ground: u32,
    pub ground_accent: u32,
}

impl Default for ZoneTheme {
    fn default() -> Self {
        Self {
            sky_top: 0x87CEEB,
            sky_bottom: 0xE0F6FF,
            ground: 0x8B5A2B,
            ground_accent: 0x5C3A1A,
        }
    }
}

/// One level segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDescriptor {
    pub id: ZoneId,
    pub name: String,
    /// Soundtrack file name, resolved by the track loader
    pub audio: String,
    pub obstacles: Vec<ObstacleTemplate>,
    /// Every obstacle is a collectible here
    #[serde(default)]
    pub is_safe_zone: bool,
    /// Scroll-speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Seconds between spawns
    pub obstacle_interval: f32,
    #[serde(default)]
    pub theme: ZoneTheme,
}

fn default_speed() -> f32 {
    1.0
}

/// Ordered, non-empty list of zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ZoneDescriptor>", into = "Vec<ZoneDescriptor>")]
pub struct ZoneCatalog {
    zones: Vec<ZoneDescriptor>,
}

impl TryFrom<Vec<ZoneDescriptor>> for ZoneCatalog {
    type Error = CatalogError;

    fn try_from(zones: Vec<ZoneDescriptor>) -> Result<Self, Self::Error> {
        Self::new(zones)
    }
}

impl From<ZoneCatalog> for Vec<ZoneDescriptor> {
    fn from(catalog: ZoneCatalog) -> Self {
        catalog.zones
    }
}

impl ZoneCatalog {
    /// Validate and wrap a zone list
    pub fn new(zones: Vec<ZoneDescriptor>) -> Result<Self, CatalogError> {
        if zones.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(zone.id) {
                return Err(CatalogError::DuplicateId(zone.id));
            }
            if zone.obstacles.is_empty() {
                return Err(CatalogError::NoTemplates(zone.id));
            }
            if !(zone.speed > 0.0) {
                return Err(CatalogError::NonPositive { id: zone.id, field: "speed" });
            }
            if !(zone.obstacle_interval > 0.0) {
                return Err(CatalogError::NonPositive {
                    id: zone.id,
                    field: "obstacle_interval",
                });
            }
        }
        Ok(Self { zones })
    }

    /// Parse a JSON array of zone descriptors
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let zones: Vec<ZoneDescriptor> = serde_json::from_str(json)?;
        Self::new(zones)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.zones)?)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Always false: catalogs are validated non-empty
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone at `index`, falling back to the first zone when out of range
    pub fn get(&self, index: usize) -> &ZoneDescriptor {
        self.zones.get(index).unwrap_or(&self.zones[0])
    }

    /// Zone at `index` without fallback
    pub fn try_get(&self, index: usize) -> Option<&ZoneDescriptor> {
        self.zones.get(index)
    }

    /// Clamp an index into range, falling back to 0
    pub fn clamp_index(&self, index: usize) -> usize {
        if index < self.zones.len() { index } else { 0 }
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.zones.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneDescriptor> {
        self.zones.iter()
    }

    pub fn zones(&self) -> &[ZoneDescriptor] {
        &self.zones
    }

    /// The ten built-in zones
    pub fn builtin() -> Self {
        use HeightClass::*;
        use ObstacleTemplate as T;

        let zone = |id: ZoneId,
                    name: &str,
                    obstacles: Vec<ObstacleTemplate>,
                    is_safe_zone: bool,
                    speed: f32,
                    obstacle_interval: f32,
                    theme: [u32; 4]| ZoneDescriptor {
            id,
            name: name.to_string(),
            audio: format!("zone{:02}.wav", id),
            obstacles,
            is_safe_zone,
            speed,
            obstacle_interval,
            theme: ZoneTheme {
                sky_top: theme[0],
                sky_bottom: theme[1],
                ground: theme[2],
                ground_accent: theme[3],
            },
        };

        let zones = vec![
            zone(
                1,
                "Pop Party",
                vec![
                    T::hazard("microphone", Ground),
                    T::hazard("lollipop", Ground),
                    T::item("star", Medium, 15),
                    T::hazard("fanPoster", Ground),
                    T::life("heartBalloon", Medium, 20),
                ],
                false,
                1.0,
                1.8,
                [0xFF9EC7, 0xFFE4F0, 0xFF69B4, 0xFFFFFF],
            ),
            zone(
                2,
                "Cartoon Brass",
                vec![
                    T::hazard("bone", Ground),
                    T::hazard("ball", Ground),
                    T::hazard("acmeBox", Ground),
                    T::hazard("trumpet", Medium),
                    T::item("musicNote", Medium, 15),
                ],
                false,
                1.05,
                1.7,
                [0x6EC6FF, 0xD6F0FF, 0x4CAF50, 0x2E7D32],
            ),
            zone(
                3,
                "Mediterranean Rock",
                vec![
                    T::hazard("darbuka", Ground),
                    T::hazard("tambourine", Medium),
                    T::hazard("stringLights", Medium),
                    T::item("zaatar", Ground, 15),
                    T::hazard("hookah", Ground),
                ],
                false,
                1.1,
                1.6,
                [0xFF8C42, 0xFFD59E, 0xC2A878, 0x8D6E4A],
            ),
            zone(
                4,
                "Heavy Rock",
                vec![
                    T::hazard("electricGuitar", Ground),
                    T::hazard("amplifier", Ground),
                    T::hazard("drumSet", Ground),
                    T::hazard("micStand", Ground),
                    T::hazard("pyroBurst", Medium),
                ],
                false,
                1.2,
                1.4,
                [0x1A0A2E, 0x4A1A5E, 0x2B2B2B, 0xFF3D00],
            ),
            zone(
                5,
                "Love Song",
                vec![
                    T::item("floatingHeart", Any, 10),
                    T::item("rose", Ground, 10),
                    T::item("loveNote", Any, 15),
                    T::item("giftBox", Ground, 20),
                    T::life("cupidArrow", Any, 25),
                ],
                true,
                1.0,
                1.2,
                [0xFFB3C6, 0xFFF0F5, 0xE75480, 0xFFC0CB],
            ),
            zone(
                6,
                "Hawaiian Wave",
                vec![
                    T::item("pineapple", Ground, 15),
                    T::hazard("lei", Medium),
                    T::hazard("surfboard", Ground),
                    T::hazard("coconut", Medium),
                    T::hazard("tikiTorch", Ground),
                ],
                false,
                1.25,
                1.35,
                [0x00B4D8, 0xCAF0F8, 0xF4D35E, 0xEE964B],
            ),
            zone(
                7,
                "Reggae Beach",
                vec![
                    T::hazard("bongoDrums", Ground),
                    T::item("peaceSign", Medium, 15),
                    T::hazard("beachChair", Ground),
                    T::hazard("tropicalDrink", Ground),
                    T::hazard("rastaHat", Medium),
                ],
                false,
                1.3,
                1.3,
                [0x2E8B57, 0xFFE066, 0xD4A017, 0xC1121F],
            ),
            zone(
                8,
                "Acoustic Shore",
                vec![
                    T::hazard("ukulele", Ground),
                    T::item("seashell", Ground, 15),
                    T::hazard("flipFlops", Ground),
                    T::hazard("beachTorch", Ground),
                    T::life("starfish", Medium, 20),
                ],
                false,
                1.35,
                1.2,
                [0xFF7F50, 0xFFDAB9, 0xEED9A6, 0xC9A66B],
            ),
            zone(
                9,
                "Eastern Nights",
                vec![
                    T::hazard("nargila", Ground),
                    T::hazard("teaGlass", Ground),
                    T::hazard("moroccanLamp", Medium),
                    T::hazard("cushion", Ground),
                    T::hazard("plate", Medium),
                ],
                false,
                1.4,
                1.1,
                [0x1B1B3A, 0x693668, 0x7B3F00, 0xD4AF37],
            ),
            zone(
                10,
                "Grand Finale",
                vec![
                    T::life("goldenHeart", Any, 30),
                    T::item("bouquet", Ground, 20),
                    T::item("goldenStar", Any, 25),
                    T::item("loveLetter", Any, 20),
                    T::item("trophy", Ground, 50),
                ],
                true,
                1.1,
                1.0,
                [0xFFD700, 0xFFF8DC, 0xDAA520, 0xFFFFFF],
            ),
        ];

        // Built-in data is known-good
        Self { zones }
    }
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
