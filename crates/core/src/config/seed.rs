use derive_more::Display;
use fnv::FnvHasher;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    convert::{Infallible, TryInto},
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

/// Seed for the cave PRNG. Every random draw made during generation (grid
/// seeding, then the height field's noise seed) comes from one stream
/// derived from this value.
///
/// A seed can be given either as an integer or as arbitrary text. Text that
/// parses as a `u64` becomes [Seed::Int]; anything else is kept verbatim and
/// hashed when the generator needs a number, so `"mossy-grotto"` is a
/// perfectly good seed.
///
/// Seeds always serialize as strings. TOML and JSON can't faithfully carry
/// every `u64`, and a stringified integer parses back into the same
/// [Seed::Int] anyway.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Seed {
    /// Used as-is
    Int(u64),
    /// Hashed (FNV-1a) into a `u64` before use
    Text(String),
}

impl Seed {
    /// The numeric value fed to the PRNG
    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Int(seed) => *seed,
            Self::Text(text) => {
                let mut hasher = FnvHasher::default();
                text.hash(&mut hasher);
                hasher.finish()
            }
        }
    }

    /// A fresh seed from the thread RNG. Two calls will (almost certainly)
    /// give different caves.
    pub fn random() -> Self {
        Self::Int(rand::random())
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::random()
    }
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Self::Int(seed)
    }
}

impl From<&str> for Seed {
    fn from(text: &str) -> Self {
        text.parse::<u64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Text(text.to_owned()))
    }
}

impl FromStr for Seed {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        // Both ints and strings are accepted, so no type hint
        deserializer.deserialize_any(SeedVisitor)
    }
}

/// Generates one integer visit method. Anything that can't fit in a `u64`
/// (negatives, giant u128s) is rejected.
macro_rules! visit_int {
    ($fname:ident, $type:ty) => {
        fn $fname<E>(self, value: $type) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let seed: u64 = value.try_into().map_err(|_| {
                E::custom(format!("seed out of range: {}", value))
            })?;
            Ok(Seed::Int(seed))
        }
    };
}

struct SeedVisitor;

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = Seed;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer or a string")
    }

    visit_int!(visit_u8, u8);
    visit_int!(visit_u16, u16);
    visit_int!(visit_u32, u32);
    visit_int!(visit_u64, u64);
    visit_int!(visit_u128, u128);
    visit_int!(visit_i8, i8);
    visit_int!(visit_i16, i16);
    visit_int!(visit_i32, i32);
    visit_int!(visit_i64, i64);
    visit_int!(visit_i128, i128);

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value.into())
    }
}
