// services/league_api.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use crate::config::AppConfig;
use crate::dtos::matchday_dtos::{
    FinalizeResultRequest, RegisterAttendanceRequest, RegisterSubstitutionRequest,
};
use crate::errors::{AppError, Result};
use crate::models::api::ApiResponse;
use crate::models::ids::{MatchId, SubstitutionId, TeamId};
use crate::models::result::StoredResult;
use crate::models::roster::{AttendanceListing, AttendanceSummary};
use crate::models::substitution::{AvailablePlayers, SubstitutionRecord, TeamSubstitutions};

const ATTENDANCE_PATH: &str = "/asistencia-partido";
const SUBSTITUTIONS_PATH: &str = "/cambios-partido";
const MATCHES_PATH: &str = "/partidos";

/// Remote operations of the league backend used by the match-day workflow.
///
/// Every workflow component receives one shared implementation; tests swap
/// in an in-memory fake.
#[async_trait]
pub trait LeagueApi: Send + Sync {
    async fn list_attendance(&self, match_id: MatchId) -> Result<AttendanceListing>;

    async fn register_attendance(
        &self,
        req: &RegisterAttendanceRequest,
    ) -> Result<AttendanceSummary>;

    async fn list_substitutions(&self, match_id: MatchId) -> Result<Vec<TeamSubstitutions>>;

    async fn available_players(
        &self,
        match_id: MatchId,
        team_id: TeamId,
    ) -> Result<AvailablePlayers>;

    async fn register_substitution(
        &self,
        req: &RegisterSubstitutionRequest,
    ) -> Result<SubstitutionRecord>;

    async fn delete_substitution(&self, id: SubstitutionId) -> Result<()>;

    /// `Ok(None)` when the match has no recorded result yet.
    async fn get_result(&self, match_id: MatchId) -> Result<Option<StoredResult>>;

    async fn finalize_result(&self, req: &FinalizeResultRequest) -> Result<()>;

    async fn delete_result(&self, match_id: MatchId) -> Result<()>;
}

/// reqwest-backed [`LeagueApi`].
#[derive(Debug, Clone)]
pub struct HttpLeagueApi {
    client: Client,
    config: AppConfig,
}

impl HttpLeagueApi {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.api_token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::configuration("LEAGUE_API_TOKEN contains invalid characters"))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::HttpClientError {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(HttpLeagueApi { client, config })
    }

    /// Send a request and unwrap the `{success, data, error}` envelope.
    ///
    /// `success: false` is a failure regardless of the HTTP status.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.send().await.map_err(|e| {
            error!(endpoint, error = %e, "League API request failed");
            AppError::HttpClientError {
                endpoint: endpoint.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(endpoint, error = %e, "Failed to read League API response body");
            AppError::HttpClientError {
                endpoint: endpoint.to_string(),
                source: e,
            }
        })?;
        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "League API responded");

        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) if !envelope.success => {
                let reason = envelope.failure_reason();
                warn!(endpoint, status = status.as_u16(), reason = %reason, "League API reported failure");
                Err(AppError::remote(reason))
            }
            Ok(_) if !status.is_success() => Err(AppError::ExternalApi {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }),
            Ok(envelope) => Ok(envelope.data),
            Err(_) if !status.is_success() => {
                error!(endpoint, status = status.as_u16(), "League API returned an error status");
                Err(AppError::ExternalApi {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => {
                error!(endpoint, error = %e, "Failed to decode League API response");
                Err(AppError::Deserialization {
                    endpoint: endpoint.to_string(),
                    source: e,
                })
            }
        }
    }

    fn require<T>(endpoint: &str, data: Option<T>) -> Result<T> {
        data.ok_or_else(|| AppError::remote(format!("{} returned no data", endpoint)))
    }
}

#[async_trait]
impl LeagueApi for HttpLeagueApi {
    #[instrument(level = "info", skip(self))]
    async fn list_attendance(&self, match_id: MatchId) -> Result<AttendanceListing> {
        let endpoint = "GET /asistencia-partido?action=list";
        let request = self
            .client
            .get(self.config.endpoint_url(ATTENDANCE_PATH))
            .query(&[("action", "list".to_string()), ("id_partido", match_id.to_string())]);

        let data = self.execute(endpoint, request).await?;
        Self::require(endpoint, data)
    }

    #[instrument(level = "info", skip(self, req), fields(match_id = %req.match_id, marks = req.marks.len()))]
    async fn register_attendance(
        &self,
        req: &RegisterAttendanceRequest,
    ) -> Result<AttendanceSummary> {
        let endpoint = "POST /asistencia-partido?action=registrar";
        let request = self
            .client
            .post(self.config.endpoint_url(ATTENDANCE_PATH))
            .query(&[("action", "registrar")])
            .json(req);

        let data: Option<AttendanceSummary> = self.execute(endpoint, request).await?;
        Ok(data.unwrap_or_default())
    }

    #[instrument(level = "info", skip(self))]
    async fn list_substitutions(&self, match_id: MatchId) -> Result<Vec<TeamSubstitutions>> {
        let endpoint = "GET /cambios-partido?action=list";
        let request = self
            .client
            .get(self.config.endpoint_url(SUBSTITUTIONS_PATH))
            .query(&[("action", "list".to_string()), ("id_partido", match_id.to_string())]);

        let data: Option<Vec<TeamSubstitutions>> = self.execute(endpoint, request).await?;
        Ok(data.unwrap_or_default())
    }

    #[instrument(level = "info", skip(self))]
    async fn available_players(
        &self,
        match_id: MatchId,
        team_id: TeamId,
    ) -> Result<AvailablePlayers> {
        let endpoint = "GET /cambios-partido?action=disponibles";
        let request = self
            .client
            .get(self.config.endpoint_url(SUBSTITUTIONS_PATH))
            .query(&[
                ("action", "disponibles".to_string()),
                ("id_partido", match_id.to_string()),
                ("id_equipo", team_id.to_string()),
            ]);

        let data = self.execute(endpoint, request).await?;
        Self::require(endpoint, data)
    }

    #[instrument(level = "info", skip(self, req), fields(match_id = %req.match_id, team_id = %req.team_id))]
    async fn register_substitution(
        &self,
        req: &RegisterSubstitutionRequest,
    ) -> Result<SubstitutionRecord> {
        let endpoint = "POST /cambios-partido?action=registrar";
        let request = self
            .client
            .post(self.config.endpoint_url(SUBSTITUTIONS_PATH))
            .query(&[("action", "registrar")])
            .json(req);

        let data = self.execute(endpoint, request).await?;
        Self::require(endpoint, data)
    }

    #[instrument(level = "info", skip(self))]
    async fn delete_substitution(&self, id: SubstitutionId) -> Result<()> {
        let endpoint = "DELETE /cambios-partido";
        let request = self
            .client
            .delete(self.config.endpoint_url(SUBSTITUTIONS_PATH))
            .query(&[("id_cambio", id.to_string())]);

        self.execute::<serde_json::Value>(endpoint, request).await?;
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn get_result(&self, match_id: MatchId) -> Result<Option<StoredResult>> {
        let endpoint = "GET /partidos?action=resultado";
        let request = self
            .client
            .get(self.config.endpoint_url(MATCHES_PATH))
            .query(&[("action", "resultado".to_string()), ("id_partido", match_id.to_string())]);

        self.execute(endpoint, request).await
    }

    #[instrument(level = "info", skip(self, req), fields(match_id = %req.match_id, events = req.events.len()))]
    async fn finalize_result(&self, req: &FinalizeResultRequest) -> Result<()> {
        let endpoint = "POST /partidos?action=finalizar";
        let request = self
            .client
            .post(self.config.endpoint_url(MATCHES_PATH))
            .query(&[("action", "finalizar")])
            .json(req);

        self.execute::<serde_json::Value>(endpoint, request).await?;
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn delete_result(&self, match_id: MatchId) -> Result<()> {
        let endpoint = "DELETE /partidos?action=resultado";
        let request = self
            .client
            .delete(self.config.endpoint_url(MATCHES_PATH))
            .query(&[("action", "resultado".to_string()), ("id_partido", match_id.to_string())]);

        self.execute::<serde_json::Value>(endpoint, request).await?;
        Ok(())
    }
}
