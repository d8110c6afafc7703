use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

// The league backend emits ids as JSON numbers on most endpoints and as
// numeric strings on a few; both are accepted, numbers are always written.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[serde_as]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")] pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// A fixture (`id_partido`).
    MatchId
);
id_type!(
    /// A team (`id_equipo`).
    TeamId
);
id_type!(
    /// A player (`id_jugador`).
    PlayerId
);
id_type!(
    /// A player's registration on a team roster (`id_plantilla`).
    RosterEntryId
);
id_type!(SubstitutionId);
