use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::handlers::attendance::AttendanceValidator;
use crate::handlers::result::ResultRecorder;
use crate::handlers::substitutions::SubstitutionRegister;
use crate::models::ids::MatchId;
use crate::services::league_api::{HttpLeagueApi, LeagueApi};

/// Application root: owns the configuration and the one shared league
/// client, and hands that client to every workflow component.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<dyn LeagueApi>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = HttpLeagueApi::new(config.clone())?;
        Ok(AppState {
            config,
            api: Arc::new(api),
        })
    }

    pub fn with_api(config: AppConfig, api: Arc<dyn LeagueApi>) -> Self {
        AppState { config, api }
    }

    pub fn attendance(&self) -> AttendanceValidator {
        AttendanceValidator::new(Arc::clone(&self.api))
    }

    pub fn substitutions(&self) -> SubstitutionRegister {
        SubstitutionRegister::new(Arc::clone(&self.api))
    }

    pub async fn result_recorder(&self, match_id: MatchId) -> Result<ResultRecorder> {
        ResultRecorder::load(Arc::clone(&self.api), match_id).await
    }
}
