use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dtos::matchday_dtos::RegisterSubstitutionRequest;
use crate::errors::{AppError, Result};
use crate::models::ids::{MatchId, SubstitutionId, TeamId};
use crate::models::substitution::{SubstitutionPools, SubstitutionRecord, TeamSubstitutions};
use crate::services::league_api::LeagueApi;

/// Stage two of the match-day flow.
///
/// Pools are always re-queried from the server after a mutation; eligibility
/// depends on server-side state this side does not mirror.
pub struct SubstitutionRegister {
    api: Arc<dyn LeagueApi>,
    pools: HashMap<(MatchId, TeamId), SubstitutionPools>,
    history: HashMap<MatchId, Vec<TeamSubstitutions>>,
}

impl SubstitutionRegister {
    pub fn new(api: Arc<dyn LeagueApi>) -> Self {
        SubstitutionRegister {
            api,
            pools: HashMap::new(),
            history: HashMap::new(),
        }
    }

    /// Substitutions of a match grouped by team.
    #[instrument(level = "info", skip(self))]
    pub async fn list(&mut self, match_id: MatchId) -> Result<&[TeamSubstitutions]> {
        let groups = self.api.list_substitutions(match_id).await.map_err(|e| {
            error!(error = %e, "Failed to list substitutions");
            e
        })?;
        self.history.insert(match_id, groups);
        Ok(&self.history[&match_id])
    }

    /// Last fetched substitution list for a match.
    pub fn substitutions(&self, match_id: MatchId) -> Option<&[TeamSubstitutions]> {
        self.history.get(&match_id).map(|v| v.as_slice())
    }

    /// Query the on-field and bench pools for one team.
    #[instrument(level = "info", skip(self))]
    pub async fn load_available(
        &mut self,
        match_id: MatchId,
        team_id: TeamId,
    ) -> Result<&SubstitutionPools> {
        let available = self
            .api
            .available_players(match_id, team_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load available players");
                e
            })?;
        let pools = SubstitutionPools::from_available(available);
        info!(
            on_field = pools.on_field.len(),
            bench = pools.bench.len(),
            "Substitution pools loaded"
        );
        self.pools.insert((match_id, team_id), pools);
        Ok(&self.pools[&(match_id, team_id)])
    }

    /// Last fetched pools for a team, `None` when they must be reloaded.
    pub fn pools(&self, match_id: MatchId, team_id: TeamId) -> Option<&SubstitutionPools> {
        self.pools.get(&(match_id, team_id))
    }

    /// Record one exchange.
    ///
    /// Same-player exchanges and out-of-range minutes are rejected before
    /// any request. The outgoing player must be in the on-field pool and
    /// the incoming one on the bench; pools are fetched first if needed.
    #[instrument(
        level = "info",
        skip(self, req),
        fields(match_id = %req.match_id, team_id = %req.team_id, outgoing = %req.outgoing, incoming = %req.incoming)
    )]
    pub async fn record_substitution(
        &mut self,
        req: RegisterSubstitutionRequest,
    ) -> Result<SubstitutionRecord> {
        req.validate()?;

        let key = (req.match_id, req.team_id);
        if !self.pools.contains_key(&key) {
            self.load_available(req.match_id, req.team_id).await?;
        }
        let pools = self
            .pools
            .get(&key)
            .ok_or_else(|| AppError::remote("Available players could not be loaded"))?;

        if !pools.is_on_field(req.outgoing) {
            return Err(AppError::invalid_data(format!(
                "Player {} is not on the field",
                req.outgoing
            )));
        }
        if !pools.is_on_bench(req.incoming) {
            return Err(AppError::invalid_data(format!(
                "Player {} cannot enter the match",
                req.incoming
            )));
        }

        let record = self.api.register_substitution(&req).await.map_err(|e| {
            error!(error = %e, "Substitution was not recorded");
            e
        })?;
        info!(id = %record.id, "Substitution recorded");

        self.refresh(req.match_id, req.team_id).await;
        Ok(record)
    }

    /// Delete a recorded exchange. Pool membership reflects the deletion on
    /// the next reload.
    #[instrument(level = "info", skip(self))]
    pub async fn delete_substitution(&mut self, id: SubstitutionId) -> Result<()> {
        self.api.delete_substitution(id).await.map_err(|e| {
            error!(error = %e, "Substitution was not deleted");
            e
        })?;

        let owner = self.history.iter().find_map(|(match_id, groups)| {
            groups
                .iter()
                .find(|g| g.substitutions.iter().any(|s| s.id == id))
                .map(|g| (*match_id, g.team_id))
        });

        match owner {
            Some((match_id, team_id)) => {
                self.pools.remove(&(match_id, team_id));
                self.history.remove(&match_id);
            }
            None => {
                self.pools.clear();
                self.history.clear();
            }
        }
        info!("Substitution deleted");
        Ok(())
    }

    // The mutation already succeeded; a failed reload only drops the cache.
    async fn refresh(&mut self, match_id: MatchId, team_id: TeamId) {
        if let Err(e) = self.load_available(match_id, team_id).await {
            warn!(error = %e, "Pools not refreshed, will reload on next use");
            self.pools.remove(&(match_id, team_id));
        }
        if let Err(e) = self.list(match_id).await {
            warn!(error = %e, "Substitution list not refreshed");
            self.history.remove(&match_id);
        }
    }
}
