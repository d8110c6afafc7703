use serde::{Deserialize, Serialize};

use super::ids::{MatchId, PlayerId, SubstitutionId, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionReason {
    Tactico,
    Lesion,
    Cansancio,
}

// One exchange; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    #[serde(rename = "id_cambio")]
    pub id: SubstitutionId,

    #[serde(rename = "id_partido")]
    pub match_id: MatchId,

    #[serde(rename = "id_equipo")]
    pub team_id: TeamId,

    #[serde(rename = "id_jugador_sale")]
    pub outgoing: PlayerId,

    #[serde(rename = "id_jugador_entra")]
    pub incoming: PlayerId,

    #[serde(rename = "minuto", default)]
    pub minute: Option<u8>,

    #[serde(rename = "motivo", default)]
    pub reason: Option<SubstitutionReason>,

    #[serde(rename = "nombre_sale", default, skip_serializing_if = "Option::is_none")]
    pub outgoing_name: Option<String>,

    #[serde(rename = "nombre_entra", default, skip_serializing_if = "Option::is_none")]
    pub incoming_name: Option<String>,
}

// `GET /cambios-partido?action=list` groups records per team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSubstitutions {
    #[serde(rename = "id_equipo")]
    pub team_id: TeamId,

    #[serde(rename = "nombre_equipo", default)]
    pub team_name: String,

    #[serde(rename = "cambios", default)]
    pub substitutions: Vec<SubstitutionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailablePlayer {
    #[serde(rename = "id_jugador")]
    pub player_id: PlayerId,

    #[serde(rename = "nombre", default)]
    pub name: String,

    #[serde(rename = "numero_camiseta", default)]
    pub shirt_number: Option<u16>,

    // Capability flags computed server-side
    #[serde(rename = "puede_salir", default)]
    pub can_leave: bool,

    #[serde(rename = "puede_entrar", default)]
    pub can_enter: bool,
}

// `GET /cambios-partido?action=disponibles`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailablePlayers {
    #[serde(rename = "en_cancha", default)]
    pub on_field: Vec<AvailablePlayer>,

    #[serde(rename = "banca", default)]
    pub bench: Vec<AvailablePlayer>,
}

/// On-field and bench pools for one team, derived from [`AvailablePlayers`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionPools {
    pub on_field: Vec<AvailablePlayer>,
    pub bench: Vec<AvailablePlayer>,
}

impl SubstitutionPools {
    /// Keeps on-field players that may leave and bench players that may
    /// enter. A player listed in both is kept on the field only.
    pub fn from_available(available: AvailablePlayers) -> Self {
        let on_field: Vec<AvailablePlayer> = available
            .on_field
            .into_iter()
            .filter(|p| p.can_leave)
            .collect();
        let bench = available
            .bench
            .into_iter()
            .filter(|p| p.can_enter)
            .filter(|p| !on_field.iter().any(|f| f.player_id == p.player_id))
            .collect();
        SubstitutionPools { on_field, bench }
    }

    pub fn is_on_field(&self, player: PlayerId) -> bool {
        self.on_field.iter().any(|p| p.player_id == player)
    }

    pub fn is_on_bench(&self, player: PlayerId) -> bool {
        self.bench.iter().any(|p| p.player_id == player)
    }
}
