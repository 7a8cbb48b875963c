use super::get_json;
use crate::errors::ClientError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStat {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creature {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub stats: Vec<BaseStat>,
    pub artwork_url: Option<String>,
}

#[derive(Deserialize)]
struct RawCreature {
    id: u32,
    name: String,
    #[serde(default)]
    types: Vec<RawTypeSlot>,
    #[serde(default)]
    stats: Vec<RawStat>,
    #[serde(default)]
    sprites: RawSprites,
}

#[derive(Deserialize)]
struct RawTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Deserialize)]
struct RawStat {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Default, Deserialize)]
struct RawSprites {
    #[serde(default)]
    front_default: Option<String>,
    #[serde(default)]
    other: Option<RawOtherSprites>,
}

#[derive(Deserialize)]
struct RawOtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<RawArtwork>,
}

#[derive(Deserialize)]
struct RawArtwork {
    #[serde(default)]
    front_default: Option<String>,
}

impl From<RawCreature> for Creature {
    fn from(raw: RawCreature) -> Self {
        let artwork_url = raw
            .sprites
            .other
            .and_then(|other| other.official_artwork)
            .and_then(|art| art.front_default)
            .or(raw.sprites.front_default);
        Self {
            id: raw.id,
            name: raw.name,
            types: raw.types.into_iter().map(|slot| slot.kind.name).collect(),
            stats: raw
                .stats
                .into_iter()
                .map(|stat| BaseStat {
                    name: stat.stat.name,
                    value: stat.base_stat,
                })
                .collect(),
            artwork_url,
        }
    }
}

/// Client for the creature-data API. No key is needed.
#[derive(Clone)]
pub struct CreatureClient {
    http: reqwest::Client,
    base_url: String,
}

impl CreatureClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn by_id(&self, id: u32) -> Result<Creature, ClientError> {
        let request = self.http.get(format!("{}/pokemon/{id}", self.base_url));
        let raw: RawCreature = get_json(request).await?;
        Ok(raw.into())
    }
}
