//! Narrative modifiers
//!
//! Modifier text comes from an untrusted generator. It is matched by
//! substring at the boundary and turned into a closed variant; nothing past
//! `Modifier::parse` looks at the text again.

use serde::{Deserialize, Serialize};

/// A parsed modifier instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    LowGravity,
    DisappearingPlatforms,
    SpawningDrones,
    Normal,
    /// Garbled or unrecognised text; behaves like `Normal`
    Unknown,
}

impl Modifier {
    /// Tolerant parse: case-insensitive "contains" matching so trailing or
    /// leading words from the generator are ignored. Never fails.
    pub fn parse(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("low gravity") {
            Modifier::LowGravity
        } else if text.contains("disappearing platforms") {
            Modifier::DisappearingPlatforms
        } else if text.contains("spawning drones") {
            Modifier::SpawningDrones
        } else if text.contains("normal") {
            Modifier::Normal
        } else {
            Modifier::Unknown
        }
    }

    /// Wire text for this modifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::LowGravity => "low gravity",
            Modifier::DisappearingPlatforms => "disappearing platforms",
            Modifier::SpawningDrones => "spawning drones",
            Modifier::Normal | Modifier::Unknown => "normal",
        }
    }

    /// The rule this modifier switches on, if any
    pub fn active(&self) -> ActiveModifier {
        match self {
            Modifier::LowGravity => ActiveModifier::LowGravity,
            Modifier::DisappearingPlatforms => ActiveModifier::DisappearingPlatforms,
            Modifier::SpawningDrones => ActiveModifier::SpawningDrones,
            Modifier::Normal | Modifier::Unknown => ActiveModifier::None,
        }
    }
}

/// Every modifier the generator is allowed to name
pub const ALL_MODIFIERS: [Modifier; 4] = [
    Modifier::LowGravity,
    Modifier::DisappearingPlatforms,
    Modifier::SpawningDrones,
    Modifier::Normal,
];

/// The global rule currently in force (at most one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveModifier {
    #[default]
    None,
    LowGravity,
    DisappearingPlatforms,
    SpawningDrones,
}

impl ActiveModifier {
    /// HUD banner text
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            ActiveModifier::None => None,
            ActiveModifier::LowGravity => Some("LOW GRAVITY ACTIVE"),
            ActiveModifier::DisappearingPlatforms => Some("PLATFORM INSTABILITY DETECTED"),
            ActiveModifier::SpawningDrones => Some("SECURITY DRONES DEPLOYED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_names() {
        for m in ALL_MODIFIERS {
            assert_eq!(Modifier::parse(m.as_str()), m);
        }
    }

    #[test]
    fn test_contains_matching() {
        assert_eq!(
            Modifier::parse("Engage LOW GRAVITY now!"),
            Modifier::LowGravity
        );
        assert_eq!(
            Modifier::parse("modifier: spawning drones (x3)"),
            Modifier::SpawningDrones
        );
    }

    #[test]
    fn test_garbage_is_unknown_and_inactive() {
        let m = Modifier::parse("\u{1F916} zzz");
        assert_eq!(m, Modifier::Unknown);
        assert_eq!(m.active(), ActiveModifier::None);
        assert_eq!(Modifier::parse(""), Modifier::Unknown);
    }
}
