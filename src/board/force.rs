//! Force groups.
//!
//! A [`Force`] is a named group of tokens with a strength count. The name is
//! the owning faction's name, with a trailing `*` for special forces
//! (`"Fremen"` vs `"Fremen*"` for Fedaykin). Territories, reserves, and the
//! tanks all store forces in this shape, which makes conservation checks a
//! matter of summing strengths under the same name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker appended to a faction name to label its special forces.
pub const SPECIAL_SUFFIX: char = '*';

/// A named group of force tokens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Force {
    /// Owning faction's name, suffixed with `*` for special forces.
    pub name: String,
    /// Number of tokens in the group.
    pub strength: u32,
}

impl Force {
    /// Create a force group.
    pub fn new(name: impl Into<String>, strength: u32) -> Self {
        Force {
            name: name.into(),
            strength,
        }
    }

    /// The owning faction's name, with any special marker stripped.
    #[must_use]
    pub fn faction(&self) -> &str {
        self.name.trim_end_matches(SPECIAL_SUFFIX)
    }

    /// Whether this is a special-force group.
    #[must_use]
    pub fn is_special(&self) -> bool {
        self.name.ends_with(SPECIAL_SUFFIX)
    }
}

impl fmt::Display for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.name, self.strength)
    }
}

/// Build the force name for a faction.
#[must_use]
pub fn force_name(faction: &str, special: bool) -> String {
    if special {
        format!("{faction}{SPECIAL_SUFFIX}")
    } else {
        faction.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_name_marks_specials() {
        assert_eq!(force_name("Emperor", false), "Emperor");
        assert_eq!(force_name("Emperor", true), "Emperor*");
    }

    #[test]
    fn test_faction_strips_marker() {
        let sardaukar = Force::new("Emperor*", 5);
        assert_eq!(sardaukar.faction(), "Emperor");
        assert!(sardaukar.is_special());

        let regulars = Force::new("Emperor", 10);
        assert_eq!(regulars.faction(), "Emperor");
        assert!(!regulars.is_special());
    }
}
