//! Syllable-based name generation

use ahash::AHashSet;

use crate::core::rng::Prng;
use crate::history::polity::PolityType;

/// Consonant and vowel pools for one naming style
pub struct Syllables {
    pub consonants: &'static [&'static str],
    pub vowels: &'static [&'static str],
}

pub const MARTIAL: Syllables = Syllables {
    consonants: &["kr", "dr", "gr", "th", "br"],
    vowels: &["a", "o", "u"],
};

pub const TRADE: Syllables = Syllables {
    consonants: &["l", "m", "n", "s", "v"],
    vowels: &["a", "e", "i", "o"],
};

pub const SEAFARING: Syllables = Syllables {
    consonants: &["s", "h", "r", "t"],
    vowels: &["a", "e", "o", "u"],
};

pub const AGRARIAN: Syllables = Syllables {
    consonants: &["b", "d", "g", "k", "p"],
    vowels: &["a", "e", "i"],
};

/// Names handed out so far; repeats get a numeric suffix
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: AHashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `name`, or `name 2`, `name 3`, ... if already taken
    pub fn claim(&mut self, name: String) -> String {
        if self.used.insert(name.clone()) {
            return name;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{} {}", name, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Fresh, unique base name of 2 to 4 syllables
    pub fn polity_base(&mut self, prng: &mut Prng, style: &Syllables) -> String {
        let name = base_name(prng, style, 2, 4);
        self.claim(name)
    }
}

/// Capitalized run of consonant-vowel pairs
///
/// Draws the syllable count, then one consonant and one vowel per syllable.
pub fn base_name(prng: &mut Prng, style: &Syllables, min_syllables: i64, max_syllables: i64) -> String {
    let count = prng.next_int(min_syllables, max_syllables);
    let mut name = String::new();
    for _ in 0..count {
        name.push_str(style.consonants[prng.next_index(style.consonants.len())]);
        name.push_str(style.vowels[prng.next_index(style.vowels.len())]);
    }
    capitalize(&name)
}

pub fn format_polity_name(base: &str, polity_type: PolityType) -> String {
    match polity_type {
        PolityType::Republic => format!("Republic of {}", base),
        PolityType::Empire => format!("{} Empire", base),
        PolityType::Federation => format!("{} Federation", base),
        PolityType::CityState => format!("{} City-State", base),
        PolityType::Tribal => format!("{} Confederacy", base),
        PolityType::Kingdom => format!("Kingdom of {}", base),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
