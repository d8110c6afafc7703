use serde::{Deserialize, Serialize};

use super::ids::{MatchId, TeamId};

// Fixture as returned inside the attendance listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "id_partido")]
    pub id: MatchId,

    #[serde(rename = "id_equipo_local", default)]
    pub home_team: Option<TeamId>,

    #[serde(rename = "id_equipo_visitante", default)]
    pub away_team: Option<TeamId>,

    #[serde(rename = "jornada", default)]
    pub round: Option<u32>,

    #[serde(rename = "estado", default)]
    pub status: MatchStatus,
}

impl Match {
    /// Both team references, or `None` while the fixture still has teams to be defined.
    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        match (self.home_team, self.away_team) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }

    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if self.home_team == Some(team) {
            Some(Side::Home)
        } else if self.away_team == Some(team) {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn team_on(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    #[serde(alias = "pendiente")]
    Programado,
    Finalizado,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "local")]
    Home,
    #[serde(rename = "visitante")]
    Away,
}
