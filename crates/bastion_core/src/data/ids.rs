//! String identifiers for catalog entries and heroes.
//!
//! Data files reference each other by short string ids ("R1", "RCP3").
//! Each id kind gets its own newtype so a recipe id can never be passed
//! where a region id is expected.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a region in the catalog.
    RegionId
);

string_id!(
    /// Identifier of a point of interest in the catalog.
    PoiId
);

string_id!(
    /// Identifier of a recipe in the catalog.
    RecipeId
);

string_id!(
    /// Identifier of a hero in the player's roster.
    HeroId
);

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = RecipeId::new("RCP2");
        assert_eq!(ron::to_string(&id).unwrap(), "\"RCP2\"");
        assert_eq!(id.to_string(), "RCP2");
    }

    #[test]
    fn test_set_lookup_by_str() {
        let set: BTreeSet<PoiId> = [PoiId::new("P1")].into_iter().collect();
        assert!(set.contains("P1"));
        assert!(!set.contains("P2"));
    }
}
