//! Species enumeration.
//!
//! The label table is fixed at build time and never mutated. Index 0 is
//! always "Unknown"; every stored identification references one of these
//! indices.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of species labels, including "Unknown".
pub const SPECIES_COUNT: usize = 74;

/// Species labels, ordered by index.
pub const LABELS: [&str; SPECIES_COUNT] = [
    "Unknown",
    "Black-shouldered kite",
    "Brown goshawk",
    "Collared sparrowhawk",
    "Spotted harrier",
    "Wedge-tailed eagle",
    "Whistling kite",
    "Australian wood duck",
    "Grey teal",
    "Pacific black duck",
    "Bush stone-curlew",
    "Black-fronted dotterel",
    "Oriental plover",
    "Great egret",
    "Nankeen night heron",
    "White-faced heron",
    "White-necked heron",
    "Black-necked stork",
    "Royal spoonbill",
    "Straw-necked ibis",
    "Common bronzewing",
    "Crested pigeon",
    "Diamond dove",
    "Spinifex pigeon",
    "Blue-winged kookaburra",
    "Sacred kingfisher",
    "Rainbow bee-eater",
    "Australasian nankeen kestrel",
    "Australian hobby",
    "Brown falcon",
    "Grey falcon",
    "Brown quail",
    "Slaty-backed thornbill",
    "Weebill",
    "Horsfield's bush lark",
    "Australian magpie",
    "Black-faced woodswallow",
    "Pied butcherbird",
    "Black-faced cuckooshrike",
    "White-winged triller",
    "Torresian crow",
    "Painted finch",
    "Zebra finch",
    "Tree martin",
    "Brown songlark",
    "Rufous songlark",
    "Spinifexbird",
    "Purple-backed fairywren",
    "Rufous grasswren",
    "Brown honeyeater",
    "Crimson chat",
    "Grey-headed honeyeater",
    "Singing honeyeater",
    "White-plumed honeyeater",
    "Yellow-throated miner",
    "Magpie-lark",
    "Australasian pipit",
    "Rufous whistler",
    "Red-browed pardalote",
    "Grey-crowned babbler",
    "Western bowerbird",
    "Willie wagtail",
    "Australasian darter",
    "Australian pelican",
    "Little black cormorant",
    "Little pied cormorant",
    "Pied cormorant",
    "Hoary-headed grebe",
    "Cockatiel",
    "Galah",
    "Little corella",
    "Australian ringneck",
    "Budgerigar",
    "Little buttonquail",
];

/// Index into [`LABELS`].
///
/// Persisted as a decimal string (`"12"`) to stay compatible with blobs
/// written by earlier tooling. Numbers are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SpeciesType(u8);

impl SpeciesType {
    /// The "Unknown" species, used as the default selection.
    pub const UNKNOWN: Self = Self(0);

    /// Build a species from its index, rejecting anything outside the table.
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        if index < SPECIES_COUNT {
            u8::try_from(index).ok().map(Self)
        } else {
            None
        }
    }

    /// Parse a decimal index such as `"12"`.
    #[must_use]
    pub fn parse_index(raw: &str) -> Option<Self> {
        raw.trim().parse::<usize>().ok().and_then(Self::new)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        LABELS[self.0 as usize]
    }

    /// Iterate every species in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SPECIES_COUNT).filter_map(Self::new)
    }
}

impl fmt::Display for SpeciesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SpeciesType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for SpeciesType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSpecies {
            Text(String),
            Number(u64),
        }

        let parsed = match RawSpecies::deserialize(deserializer)? {
            RawSpecies::Text(s) => Self::parse_index(&s),
            RawSpecies::Number(n) => usize::try_from(n).ok().and_then(Self::new),
        };
        parsed.ok_or_else(|| {
            serde::de::Error::custom(format!(
                "species type out of range (expected 0..{SPECIES_COUNT})"
            ))
        })
    }
}
