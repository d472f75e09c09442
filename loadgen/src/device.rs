use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

pub const PLATFORMS: [Platform; 3] = [Platform::Ios, Platform::Android, Platform::Web];

/// Session/device identity fabricated fresh for every batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_id: u32,
    pub device_id: Platform,
    pub version: String,
    pub session_id: String,
}

impl DeviceInfo {
    pub fn generate(rng: &mut impl Rng) -> DeviceInfo {
        DeviceInfo {
            user_id: rng.gen_range(1..=999_999),
            device_id: *PLATFORMS.choose(rng).unwrap_or(&Platform::Web),
            // Two independent tokens of the same shape, not one shared id
            version: session_token(rng),
            session_id: session_token(rng),
        }
    }
}

/// `<13-digit decimal>-<8 hex chars>` token.
fn session_token(rng: &mut impl Rng) -> String {
    let numeric = rng.gen_range(1_000_000_000_000u64..=9_999_999_999_999);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", numeric, &suffix[..8])
}
