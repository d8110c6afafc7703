#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use liga_matchday::dtos::matchday_dtos::{
    FinalizeResultRequest, RegisterAttendanceRequest, RegisterSubstitutionRequest,
};
use liga_matchday::models::ids::{MatchId, SubstitutionId, TeamId};
use liga_matchday::models::result::StoredResult;
use liga_matchday::models::roster::{AttendanceListing, AttendanceSummary};
use liga_matchday::models::substitution::{
    AvailablePlayers, SubstitutionRecord, TeamSubstitutions,
};
use liga_matchday::{AppConfig, AppError, LeagueApi, Result};

pub const MATCH: i64 = 42;
pub const LOCAL: i64 = 1;
pub const VISITING: i64 = 2;

pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig::new(base_url, Some("test-token".into()), 5, tracing::Level::INFO).unwrap()
}

/// One roster entry as the backend sends it.
pub fn roster_player(player: i64, birth: &str, reinforcement: bool) -> Value {
    json!({
        "id_plantilla": player + 1000,
        "id_jugador": player,
        "nombre": format!("Jugador {}", player),
        "numero_camiseta": player,
        "es_capitan": false,
        "es_refuerzo": reinforcement,
        "fecha_nacimiento": birth,
        "presente": null,
        "valido_para_jugar": true
    })
}

/// Attendance listing for `MATCH` with five players per team
/// (ids 11..=15 local, 21..=25 visiting).
pub fn five_a_side_listing() -> Value {
    let local: Vec<Value> = (11..=15).map(|p| roster_player(p, "2012-04-01", false)).collect();
    let visiting: Vec<Value> = (21..=25).map(|p| roster_player(p, "2012-04-01", false)).collect();
    json!({
        "partido": {
            "id_partido": MATCH,
            "id_equipo_local": LOCAL,
            "id_equipo_visitante": VISITING,
            "jornada": 4,
            "estado": "programado"
        },
        "restricciones": {
            "tiene_restriccion_edad": false,
            "edad_minima": null,
            "edad_maxima": null,
            "max_refuerzos": null
        },
        "local": {"id_equipo": LOCAL, "nombre": "Halcones", "jugadores": local},
        "visitante": {"id_equipo": VISITING, "nombre": "Pumas", "jugadores": visiting}
    })
}

pub fn ok(data: Value) -> Value {
    json!({"success": true, "data": data})
}

pub fn failed(error: &str) -> Value {
    json!({"success": false, "error": error})
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<&'static str>,
    listing: Option<AttendanceListing>,
    available: AvailablePlayers,
    stored: Option<StoredResult>,
    fail_mutations: bool,
    attendance_requests: Vec<RegisterAttendanceRequest>,
    finalize_requests: Vec<FinalizeResultRequest>,
}

/// In-memory [`LeagueApi`] that records every call it receives.
#[derive(Debug, Default, Clone)]
pub struct FakeLeagueApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLeagueApi {
    pub fn with_listing(listing: Value) -> Self {
        let fake = FakeLeagueApi::default();
        fake.state.lock().unwrap().listing = Some(serde_json::from_value(listing).unwrap());
        fake
    }

    pub fn set_available(&self, available: Value) {
        self.state.lock().unwrap().available = serde_json::from_value(available).unwrap();
    }

    pub fn set_stored(&self, stored: Value) {
        self.state.lock().unwrap().stored = Some(serde_json::from_value(stored).unwrap());
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutations = fail;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn attendance_requests(&self) -> Vec<RegisterAttendanceRequest> {
        self.state.lock().unwrap().attendance_requests.clone()
    }

    pub fn finalize_requests(&self) -> Vec<FinalizeResultRequest> {
        self.state.lock().unwrap().finalize_requests.clone()
    }

    fn record(&self, call: &'static str) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }

    fn mutation_outcome(state: &FakeState) -> Result<()> {
        if state.fail_mutations {
            Err(AppError::remote("Servidor no disponible"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LeagueApi for FakeLeagueApi {
    async fn list_attendance(&self, _match_id: MatchId) -> Result<AttendanceListing> {
        let state = self.record("list_attendance");
        state
            .listing
            .clone()
            .ok_or_else(|| AppError::not_found("no listing"))
    }

    async fn register_attendance(
        &self,
        req: &RegisterAttendanceRequest,
    ) -> Result<AttendanceSummary> {
        let mut state = self.record("register_attendance");
        Self::mutation_outcome(&state)?;
        state.attendance_requests.push(req.clone());
        Ok(AttendanceSummary {
            registered: req.marks.len() as u32,
            present: req.marks.iter().filter(|m| m.present).count() as u32,
        })
    }

    async fn list_substitutions(&self, _match_id: MatchId) -> Result<Vec<TeamSubstitutions>> {
        self.record("list_substitutions");
        Ok(Vec::new())
    }

    async fn available_players(
        &self,
        _match_id: MatchId,
        _team_id: TeamId,
    ) -> Result<AvailablePlayers> {
        let state = self.record("available_players");
        Ok(state.available.clone())
    }

    async fn register_substitution(
        &self,
        req: &RegisterSubstitutionRequest,
    ) -> Result<SubstitutionRecord> {
        let state = self.record("register_substitution");
        Self::mutation_outcome(&state)?;
        Ok(SubstitutionRecord {
            id: SubstitutionId(1),
            match_id: req.match_id,
            team_id: req.team_id,
            outgoing: req.outgoing,
            incoming: req.incoming,
            minute: req.minute,
            reason: req.reason,
            outgoing_name: None,
            incoming_name: None,
        })
    }

    async fn delete_substitution(&self, _id: SubstitutionId) -> Result<()> {
        let state = self.record("delete_substitution");
        Self::mutation_outcome(&state)
    }

    async fn get_result(&self, _match_id: MatchId) -> Result<Option<StoredResult>> {
        let state = self.record("get_result");
        Ok(state.stored.clone())
    }

    async fn finalize_result(&self, req: &FinalizeResultRequest) -> Result<()> {
        let mut state = self.record("finalize_result");
        Self::mutation_outcome(&state)?;
        state.finalize_requests.push(req.clone());
        Ok(())
    }

    async fn delete_result(&self, _match_id: MatchId) -> Result<()> {
        let mut state = self.record("delete_result");
        Self::mutation_outcome(&state)?;
        state.stored = None;
        Ok(())
    }
}
