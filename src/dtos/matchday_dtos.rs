use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::ids::{MatchId, PlayerId, RosterEntryId, TeamId};
use crate::models::match_info::MatchStatus;
use crate::models::result::MatchEvent;
use crate::models::substitution::SubstitutionReason;

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// Attendance

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceMark {
    #[serde(rename = "id_plantilla")]
    pub roster_id: RosterEntryId,

    #[serde(rename = "id_equipo")]
    pub team_id: TeamId,

    #[serde(rename = "presente")]
    pub present: bool,

    #[serde(rename = "valido_para_jugar", skip_serializing_if = "Option::is_none")]
    pub valid_to_play: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterAttendanceRequest {
    #[serde(rename = "id_partido")]
    pub match_id: MatchId,

    #[validate(length(min = 1, message = "Attendance list cannot be empty"))]
    #[serde(rename = "asistencias")]
    pub marks: Vec<AttendanceMark>,
}

// Substitutions

#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_distinct_players"))]
pub struct RegisterSubstitutionRequest {
    #[serde(rename = "id_partido")]
    pub match_id: MatchId,

    #[serde(rename = "id_equipo")]
    pub team_id: TeamId,

    #[serde(rename = "id_jugador_sale")]
    pub outgoing: PlayerId,

    #[serde(rename = "id_jugador_entra")]
    pub incoming: PlayerId,

    #[validate(range(max = 120, message = "Minute must be between 0 and 120"))]
    #[serde(rename = "minuto", skip_serializing_if = "Option::is_none")]
    pub minute: Option<u8>,

    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    pub reason: Option<SubstitutionReason>,
}

fn validate_distinct_players(req: &RegisterSubstitutionRequest) -> Result<(), ValidationError> {
    if req.outgoing == req.incoming {
        return Err(failure(
            "same_player",
            "Outgoing and incoming player must be different",
        ));
    }
    Ok(())
}

// Result

#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_result_shape"))]
pub struct FinalizeResultRequest {
    #[serde(rename = "id_partido")]
    pub match_id: MatchId,

    #[serde(rename = "goles_local")]
    pub home_score: u8,

    #[serde(rename = "goles_visitante")]
    pub away_score: u8,

    #[serde(rename = "estado")]
    pub status: MatchStatus,

    #[serde(rename = "penales_local", skip_serializing_if = "Option::is_none")]
    pub home_penalties: Option<u8>,

    #[serde(rename = "penales_visitante", skip_serializing_if = "Option::is_none")]
    pub away_penalties: Option<u8>,

    #[serde(rename = "walkover")]
    pub walkover: bool,

    #[serde(rename = "id_equipo_ganador_wo", skip_serializing_if = "Option::is_none")]
    pub walkover_winner: Option<TeamId>,

    #[serde(rename = "id_jugador_mvp", skip_serializing_if = "Option::is_none")]
    pub mvp: Option<PlayerId>,

    #[serde(rename = "eventos")]
    pub events: Vec<MatchEvent>,
}

fn validate_result_shape(req: &FinalizeResultRequest) -> Result<(), ValidationError> {
    if req.walkover && req.walkover_winner.is_none() {
        return Err(failure(
            "walkover_winner",
            "Choose the team awarded the walkover",
        ));
    }
    if req.home_penalties.is_some() != req.away_penalties.is_some() {
        return Err(failure(
            "penalties",
            "Penalty scores are required for both teams",
        ));
    }
    Ok(())
}
