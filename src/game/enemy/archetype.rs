// Enemy archetype table
//
// Each archetype is a fixed combination of body suit, head, tints, scale and
// business-unit textures. Indices 0-13 wear suit A, 14-22 suit B and 23-31
// suit C.

use std::fmt;

use super::SpawnError;

pub const ARCHETYPE_COUNT: usize = 32;

/// Body type; each has its own model and clip files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    A,
    B,
    C,
}

impl Suit {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0..=13 => Some(Self::A),
            14..=22 => Some(Self::B),
            23..=31 => Some(Self::C),
            _ => None,
        }
    }

    /// Model name without extension
    pub fn model(self) -> &'static str {
        match self {
            Self::A => "tt_a_ene_cga_zero",
            Self::B => "tt_a_ene_cgb_zero",
            Self::C => "tt_a_ene_cgc_zero",
        }
    }

    /// Prefix shared by this suit's clip files, e.g. `tt_a_ene_cga_walk`
    pub fn clip_prefix(self) -> &'static str {
        match self {
            Self::A => "tt_a_ene_cga",
            Self::B => "tt_a_ene_cgb",
            Self::C => "tt_a_ene_cgc",
        }
    }

    /// Head collection the archetype's head mesh is taken from
    pub fn head_collection(self) -> &'static str {
        match self {
            Self::A => "suitA-heads",
            Self::B => "suitB-heads",
            Self::C => "suitC-heads",
        }
    }
}

/// Department whose uniform the enemy wears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessUnit {
    Sell,
    Cash,
    Law,
    Boss,
}

/// Uniform texture set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformTextures {
    pub blazer: &'static str,
    pub sleeve: &'static str,
    pub leg: &'static str,
}

impl BusinessUnit {
    pub fn textures(self) -> UniformTextures {
        match self {
            Self::Sell => UniformTextures {
                blazer: "s_blazer.jpg",
                sleeve: "s_sleeve.jpg",
                leg: "s_leg.jpg",
            },
            Self::Cash => UniformTextures {
                blazer: "m_blazer.jpg",
                sleeve: "m_sleeve.jpg",
                leg: "m_leg.jpg",
            },
            Self::Law => UniformTextures {
                blazer: "l_blazer.jpg",
                sleeve: "l_sleeve.jpg",
                leg: "l_leg.jpg",
            },
            Self::Boss => UniformTextures {
                blazer: "c_blazer.jpg",
                sleeve: "c_sleeve.jpg",
                leg: "c_leg.jpg",
            },
        }
    }
}

/// Immutable cosmetic and scale record for one kind of enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyArchetype {
    pub index: usize,
    pub name: &'static str,
    /// Head mesh inside the suit's head collection
    pub head: &'static str,
    /// Texture replacing the head mesh's own
    pub head_texture: Option<&'static str>,
    pub head_tint: Option<[u8; 3]>,
    pub hand_tint: Option<[u8; 3]>,
    pub scale: f32,
    pub unit: BusinessUnit,
    /// Wears the glasses accessory from the head collection
    pub has_accessory: bool,
}

impl EnemyArchetype {
    pub fn suit(&self) -> Suit {
        // Table entries are always in range
        Suit::from_index(self.index).unwrap_or(Suit::C)
    }

    pub fn textures(&self) -> UniformTextures {
        self.unit.textures()
    }
}

/// Dressing instructions: model, clips, head and uniform
impl fmt::Display for EnemyArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suit = self.suit();
        write!(
            f,
            "{} ({} x{}, {} clips): head {}/{}",
            self.name,
            suit.model(),
            self.scale,
            suit.clip_prefix(),
            suit.head_collection(),
            self.head
        )?;
        if let Some(texture) = self.head_texture {
            write!(f, " textured {texture}")?;
        }
        if let Some([r, g, b]) = self.head_tint {
            write!(f, " tinted #{r:02x}{g:02x}{b:02x}")?;
        }
        if self.has_accessory {
            f.write_str(" with glasses")?;
        }
        if let Some([r, g, b]) = self.hand_tint {
            write!(f, ", hands #{r:02x}{g:02x}{b:02x}")?;
        }
        let uniform = self.textures();
        write!(f, ", uniform {}/{}/{}", uniform.blazer, uniform.sleeve, uniform.leg)
    }
}

const LAVENDER: [u8; 3] = [223, 193, 231];
const MINT: [u8; 3] = [133, 244, 180];
const PINK: [u8; 3] = [248, 176, 216];
const SALMON: [u8; 3] = [253, 172, 173];

const fn entry(
    index: usize,
    name: &'static str,
    head: &'static str,
    hand_tint: [u8; 3],
    scale: f32,
    unit: BusinessUnit,
) -> EnemyArchetype {
    EnemyArchetype {
        index,
        name,
        head,
        head_texture: None,
        head_tint: None,
        hand_tint: Some(hand_tint),
        scale,
        unit,
        has_accessory: false,
    }
}

const fn retextured(mut archetype: EnemyArchetype, texture: &'static str) -> EnemyArchetype {
    archetype.head_texture = Some(texture);
    archetype
}

use BusinessUnit::{Boss, Cash, Law, Sell};

pub static ARCHETYPES: [EnemyArchetype; ARCHETYPE_COUNT] = [
    // Suit A
    entry(0, "Back Stabber", "backstabber", LAVENDER, 0.7, Law),
    entry(1, "The Big Cheese", "bigcheese", [180, 249, 164], 1.0, Boss),
    entry(2, "Big Wig", "bigwig", LAVENDER, 1.0, Law),
    entry(3, "Head Hunter", "headhunter", SALMON, 0.85, Boss),
    entry(4, "Legal Eagle", "legaleagle", [89, 54, 123], 0.9, Law),
    entry(5, "Number Cruncher", "numbercruncher", MINT, 0.8, Cash),
    retextured(
        entry(6, "Name Dropper", "numbercruncher", PINK, 0.7, Sell),
        "name-dropper.jpg",
    ),
    entry(7, "Penny Pincher", "pennypincher", [251, 140, 144], 0.6, Cash),
    entry(8, "Yesman", "yesman", SALMON, 0.7, Boss),
    retextured(
        entry(9, "Robber Baron", "yesman", MINT, 1.0, Cash),
        "robber-baron.jpg",
    ),
    entry(10, "Mr. Hollywood", "yesman", PINK, 1.0, Sell),
    entry(11, "Two-Face", "twoface", PINK, 0.8, Sell),
    retextured(entry(12, "The Mingler", "twoface", PINK, 0.85, Sell), "mingler.jpg"),
    retextured(
        entry(13, "Double Talker", "twoface", LAVENDER, 0.7, Law),
        "double-talker.jpg",
    ),
    // Suit B
    entry(14, "Ambulance Chaser", "ambulancechaser", LAVENDER, 0.8, Law),
    entry(15, "Bean Counter", "beancounter", MINT, 0.7, Cash),
    entry(16, "Downsizer", "beancounter", SALMON, 0.8, Boss),
    entry(17, "Loan Shark", "loanshark", MINT, 1.0, Cash),
    entry(18, "Mover & Shaker", "movershaker", PINK, 0.8, Sell),
    EnemyArchetype {
        index: 19,
        name: "Bloodsucker",
        head: "movershaker",
        head_texture: Some("blood-sucker.jpg"),
        head_tint: None,
        hand_tint: None,
        scale: 0.6,
        unit: Law,
        has_accessory: false,
    },
    entry(20, "Pencil Pusher", "pencilpusher", SALMON, 0.6, Boss),
    entry(21, "Telemarketer", "telemarketer", PINK, 0.6, Sell),
    retextured(
        entry(22, "Spin Doctor", "telemarketer", MINT, 0.9, Law),
        "spin-doctor.jpg",
    ),
    // Suit C
    entry(23, "Short Change", "coldcaller", MINT, 0.8, Cash),
    EnemyArchetype {
        index: 24,
        name: "Cold Caller",
        head: "coldcaller",
        head_texture: None,
        head_tint: Some([0, 0, 255]),
        hand_tint: Some([22, 123, 241]),
        scale: 0.8,
        unit: Sell,
        has_accessory: false,
    },
    EnemyArchetype {
        index: 25,
        name: "Flunky",
        head: "flunky",
        head_texture: None,
        head_tint: None,
        hand_tint: Some(SALMON),
        scale: 0.8,
        unit: Boss,
        has_accessory: true,
    },
    retextured(
        entry(26, "Corporate Raider", "flunky", [253, 152, 153], 1.2, Boss),
        "corporate-raider.jpg",
    ),
    entry(27, "Glad Hander", "gladhander", PINK, 1.0, Sell),
    entry(28, "Micromanager", "micromanager", SALMON, 0.5, Boss),
    entry(29, "Money Bags", "moneybags", MINT, 1.1, Cash),
    entry(30, "Tightwad", "tightwad", MINT, 0.9, Cash),
    retextured(
        entry(31, "Bottom Feeder", "tightwad", LAVENDER, 0.8, Law),
        "bottom-feeder.jpg",
    ),
];

/// Look up an archetype by index
pub fn archetype(index: usize) -> Result<&'static EnemyArchetype, SpawnError> {
    ARCHETYPES
        .get(index)
        .ok_or(SpawnError::Configuration { index })
}
