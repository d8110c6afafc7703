use serde::{Deserialize, Serialize};

use super::ids::{MatchId, PlayerId, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "gol")]
    Goal,
    #[serde(rename = "asistencia")]
    Assist,
    #[serde(rename = "amarilla")]
    YellowCard,
    #[serde(rename = "roja")]
    RedCard,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Goal,
        EventType::Assist,
        EventType::YellowCard,
        EventType::RedCard,
    ];

    /// Highest per-player count accepted for one match.
    pub fn ceiling(self) -> u8 {
        match self {
            EventType::Goal | EventType::Assist => 20,
            EventType::YellowCard => 2,
            EventType::RedCard => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(rename = "tipo")]
    pub kind: EventType,

    // Minutes are not tracked per event; always sent as null
    #[serde(rename = "minuto", default)]
    pub minute: Option<u8>,

    #[serde(rename = "id_jugador")]
    pub player_id: PlayerId,

    #[serde(rename = "id_equipo")]
    pub team_id: TeamId,
}

// `GET /partidos?action=resultado`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    #[serde(rename = "id_partido")]
    pub match_id: MatchId,

    #[serde(rename = "goles_local")]
    pub home_score: u8,

    #[serde(rename = "goles_visitante")]
    pub away_score: u8,

    #[serde(rename = "penales_local", default)]
    pub home_penalties: Option<u8>,

    #[serde(rename = "penales_visitante", default)]
    pub away_penalties: Option<u8>,

    #[serde(rename = "walkover", default)]
    pub walkover: bool,

    #[serde(rename = "id_equipo_ganador_wo", default)]
    pub walkover_winner: Option<TeamId>,

    #[serde(rename = "id_jugador_mvp", default)]
    pub mvp: Option<PlayerId>,

    #[serde(rename = "eventos", default)]
    pub events: Vec<MatchEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_ceilings() {
        assert_eq!(EventType::YellowCard.ceiling(), 2);
        assert_eq!(EventType::RedCard.ceiling(), 1);
        assert!(EventType::Goal.ceiling() > 2);
    }

    #[test]
    fn stored_result_without_optional_fields() {
        let r: StoredResult = serde_json::from_value(serde_json::json!({
            "id_partido": 3,
            "goles_local": 2,
            "goles_visitante": 1,
            "eventos": [
                {"tipo": "gol", "minuto": null, "id_jugador": 7, "id_equipo": 1},
                {"tipo": "amarilla", "id_jugador": "9", "id_equipo": "2"}
            ]
        }))
        .unwrap();
        assert!(!r.walkover);
        assert!(r.mvp.is_none());
        assert_eq!(r.events.len(), 2);
        assert_eq!(r.events[1].kind, EventType::YellowCard);
        assert_eq!(r.events[1].player_id, PlayerId(9));
    }
}
