use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, BoolFromInt, NoneAsEmptyString, PickFirst};

use super::ids::{PlayerId, RosterEntryId, TeamId};
use super::match_info::Match;

// A player's eligibility record for one match
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(rename = "id_plantilla")]
    pub roster_id: RosterEntryId,

    #[serde(rename = "id_jugador")]
    pub player_id: PlayerId,

    #[serde(rename = "nombre", default)]
    pub name: String,

    #[serde(rename = "numero_camiseta", default)]
    pub shirt_number: Option<u16>,

    #[serde_as(as = "PickFirst<(_, BoolFromInt)>")]
    #[serde(rename = "es_capitan", default)]
    pub is_captain: bool,

    #[serde_as(as = "PickFirst<(_, BoolFromInt)>")]
    #[serde(rename = "es_refuerzo", default)]
    pub is_reinforcement: bool,

    // "", null and missing all mean unknown
    #[serde_as(as = "PickFirst<(_, NoneAsEmptyString)>")]
    #[serde(rename = "fecha_nacimiento", default)]
    pub birth_date: Option<NaiveDate>,

    #[serde(rename = "presente", default)]
    pub present: Option<bool>,

    #[serde_as(as = "PickFirst<(_, BoolFromInt)>")]
    #[serde(rename = "valido_para_jugar", default = "default_valid")]
    pub valid_to_play: bool,
}

fn default_valid() -> bool {
    true
}

impl RosterEntry {
    /// Age in whole years on `today`; `None` when the birth date is unknown
    /// or lies in the future.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|birth| today.years_since(birth))
    }
}

// Derived from the category configuration, read-only here
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRestriction {
    #[serde_as(as = "PickFirst<(_, BoolFromInt)>")]
    #[serde(rename = "tiene_restriccion_edad", default)]
    pub has_age_restriction: bool,

    #[serde(rename = "edad_minima", default)]
    pub min_age: Option<u32>,

    #[serde(rename = "edad_maxima", default)]
    pub max_age: Option<u32>,

    #[serde(rename = "max_refuerzos", default)]
    pub max_reinforcements: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(rename = "id_equipo")]
    pub team_id: TeamId,

    #[serde(rename = "nombre", default)]
    pub name: String,

    #[serde(rename = "jugadores", default)]
    pub players: Vec<RosterEntry>,
}

// `GET /asistencia-partido?action=list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceListing {
    #[serde(rename = "partido")]
    pub fixture: Match,

    #[serde(rename = "restricciones", default)]
    pub restriction: AttendanceRestriction,

    #[serde(rename = "local", default)]
    pub home: Option<TeamRoster>,

    #[serde(rename = "visitante", default)]
    pub away: Option<TeamRoster>,
}

// Counts echoed by `POST /asistencia-partido?action=registrar`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    #[serde(rename = "registrados", default)]
    pub registered: u32,

    #[serde(rename = "presentes", default)]
    pub present: u32,
}

/// A soft rule violation raised when marking a player present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestrictionWarning {
    BelowMinAge {
        player: PlayerId,
        age: u32,
        min_age: u32,
    },
    AboveMaxAge {
        player: PlayerId,
        age: u32,
        max_age: u32,
    },
    /// A reinforcement older than the one-year allowance over the category ceiling.
    ReinforcementAboveAllowance {
        player: PlayerId,
        age: u32,
        allowed: u32,
    },
    ReinforcementQuotaReached {
        team: TeamId,
        present: u32,
        max: u32,
    },
}

impl fmt::Display for RestrictionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestrictionWarning::BelowMinAge { player, age, min_age } => write!(
                f,
                "player {} is {} years old, below the minimum age of {}",
                player, age, min_age
            ),
            RestrictionWarning::AboveMaxAge { player, age, max_age } => write!(
                f,
                "player {} is {} years old, above the maximum age of {}",
                player, age, max_age
            ),
            RestrictionWarning::ReinforcementAboveAllowance { player, age, allowed } => write!(
                f,
                "reinforcement {} is {} years old, above the allowed {}",
                player, age, allowed
            ),
            RestrictionWarning::ReinforcementQuotaReached { team, present, max } => write!(
                f,
                "team {} already has {} of {} reinforcements present",
                team, present, max
            ),
        }
    }
}
