use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::dtos::matchday_dtos::{AttendanceMark, RegisterAttendanceRequest};
use crate::errors::{AppError, Result};
use crate::models::ids::{MatchId, PlayerId, TeamId};
use crate::models::match_info::Match;
use crate::models::roster::{
    AttendanceListing, AttendanceRestriction, AttendanceSummary, RestrictionWarning, RosterEntry,
    TeamRoster,
};
use crate::services::league_api::LeagueApi;
use validator::Validate;

/// Result of a successful presence toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    Added,
    /// Added after the caller acknowledged one or more restriction warnings.
    AddedWithOverride,
    Removed,
}

/// Per-team counts for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamAttendance {
    pub roster_size: usize,
    pub present: usize,
    pub reinforcements_present: usize,
}

type Slot = (TeamId, PlayerId);

/// Session-local presence set for one match plus the rules that guard it.
#[derive(Debug, Clone)]
pub struct AttendanceSheet {
    fixture: Match,
    restriction: AttendanceRestriction,
    home: TeamRoster,
    away: TeamRoster,
    today: NaiveDate,
    present: HashSet<Slot>,
    overridden: HashSet<Slot>,
    persisted: HashSet<Slot>,
}

impl AttendanceSheet {
    /// Seed a sheet from a roster listing; ages are computed against `today`.
    pub fn from_listing(listing: AttendanceListing, today: NaiveDate) -> Result<Self> {
        let match_id = listing.fixture.id;
        let (home, away) = match (listing.fixture.teams(), listing.home, listing.away) {
            (Some(_), Some(home), Some(away)) => (home, away),
            _ => {
                return Err(AppError::not_found(format!(
                    "Match {} has teams to be defined",
                    match_id
                )))
            }
        };

        let mut present = HashSet::new();
        for roster in [&home, &away] {
            for entry in &roster.players {
                if entry.present == Some(true) {
                    present.insert((roster.team_id, entry.player_id));
                }
            }
        }

        let mut sheet = AttendanceSheet {
            fixture: listing.fixture,
            restriction: listing.restriction,
            home,
            away,
            today,
            persisted: present.clone(),
            present,
            overridden: HashSet::new(),
        };

        // A saved player that breaks a rule yet is valid to play was admitted
        // over a warning; keep the override so the next commit resends it.
        let overridden: Vec<Slot> = [&sheet.home, &sheet.away]
            .into_iter()
            .flat_map(|roster| {
                roster
                    .players
                    .iter()
                    .map(move |entry| (roster.team_id, entry))
            })
            .filter(|(team, entry)| {
                sheet.is_present(*team, entry.player_id)
                    && entry.valid_to_play
                    && !sheet.check_restrictions(*team, entry).is_empty()
            })
            .map(|(team, entry)| (team, entry.player_id))
            .collect();
        sheet.overridden.extend(overridden);

        Ok(sheet)
    }

    pub fn fixture(&self) -> &Match {
        &self.fixture
    }

    pub fn restriction(&self) -> &AttendanceRestriction {
        &self.restriction
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.today
    }

    pub fn roster(&self, team: TeamId) -> Result<&TeamRoster> {
        if self.home.team_id == team {
            Ok(&self.home)
        } else if self.away.team_id == team {
            Ok(&self.away)
        } else {
            Err(AppError::invalid_data(format!(
                "Team {} does not play match {}",
                team, self.fixture.id
            )))
        }
    }

    fn entry(&self, team: TeamId, player: PlayerId) -> Result<&RosterEntry> {
        self.roster(team)?
            .players
            .iter()
            .find(|e| e.player_id == player)
            .ok_or_else(|| {
                AppError::invalid_data(format!("Player {} is not on team {}'s roster", player, team))
            })
    }

    pub fn is_present(&self, team: TeamId, player: PlayerId) -> bool {
        self.present.contains(&(team, player))
    }

    pub fn present_players(&self, team: TeamId) -> Vec<&RosterEntry> {
        self.roster(team)
            .map(|r| {
                r.players
                    .iter()
                    .filter(|e| self.is_present(team, e.player_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn reinforcements_present(&self, team: TeamId) -> usize {
        self.present_players(team)
            .iter()
            .filter(|e| e.is_reinforcement)
            .count()
    }

    pub fn team_attendance(&self, team: TeamId) -> Result<TeamAttendance> {
        let roster = self.roster(team)?;
        Ok(TeamAttendance {
            roster_size: roster.players.len(),
            present: self.present_players(team).len(),
            reinforcements_present: self.reinforcements_present(team),
        })
    }

    /// Rules violated by `entry` being present on `team`, counting the
    /// quota without the entry itself.
    pub fn check_restrictions(&self, team: TeamId, entry: &RosterEntry) -> Vec<RestrictionWarning> {
        let mut warnings = Vec::new();
        let rules = &self.restriction;

        if rules.has_age_restriction {
            match entry.age_on(self.today) {
                Some(age) => {
                    if let Some(min_age) = rules.min_age {
                        if age < min_age {
                            warnings.push(RestrictionWarning::BelowMinAge {
                                player: entry.player_id,
                                age,
                                min_age,
                            });
                        }
                    }
                    if let Some(max_age) = rules.max_age {
                        // Reinforcements may be at most one year over the ceiling
                        if entry.is_reinforcement {
                            let allowed = max_age + 1;
                            if age > allowed {
                                warnings.push(RestrictionWarning::ReinforcementAboveAllowance {
                                    player: entry.player_id,
                                    age,
                                    allowed,
                                });
                            }
                        } else if age > max_age {
                            warnings.push(RestrictionWarning::AboveMaxAge {
                                player: entry.player_id,
                                age,
                                max_age,
                            });
                        }
                    }
                }
                None => {
                    debug!(player = %entry.player_id, "Birth date unknown, age rules not applied");
                }
            }
        }

        if entry.is_reinforcement {
            if let Some(max) = rules.max_reinforcements {
                let present = self
                    .present_players(team)
                    .iter()
                    .filter(|e| e.is_reinforcement && e.player_id != entry.player_id)
                    .count() as u32;
                if present >= max {
                    warnings.push(RestrictionWarning::ReinforcementQuotaReached {
                        team,
                        present,
                        max,
                    });
                }
            }
        }

        warnings
    }

    /// Flip one player's presence.
    ///
    /// Removal never validates. Adding a player that breaks an age or quota
    /// rule fails with [`AppError::RestrictionWarning`] unless
    /// `acknowledged` is set, in which case the player is added and their
    /// validity to play is overridden.
    pub fn toggle_presence(
        &mut self,
        team: TeamId,
        player: PlayerId,
        acknowledged: bool,
    ) -> Result<PresenceChange> {
        let slot = (team, player);
        let entry = self.entry(team, player)?;

        if self.present.contains(&slot) {
            self.present.remove(&slot);
            self.overridden.remove(&slot);
            return Ok(PresenceChange::Removed);
        }

        let warnings = self.check_restrictions(team, entry);
        if warnings.is_empty() {
            self.present.insert(slot);
            return Ok(PresenceChange::Added);
        }
        if !acknowledged {
            return Err(AppError::RestrictionWarning(warnings));
        }

        warn!(
            team = %team,
            player = %player,
            warnings = warnings.len(),
            "Player marked present over restriction warnings"
        );
        self.present.insert(slot);
        self.overridden.insert(slot);
        Ok(PresenceChange::AddedWithOverride)
    }

    /// Mark every roster entry of `team` present, without validation.
    pub fn select_all(&mut self, team: TeamId) -> Result<()> {
        let players: Vec<PlayerId> = self.roster(team)?.players.iter().map(|e| e.player_id).collect();
        for player in players {
            self.present.insert((team, player));
        }
        Ok(())
    }

    pub fn clear_all(&mut self, team: TeamId) -> Result<()> {
        self.roster(team)?;
        self.present.retain(|(t, _)| *t != team);
        self.overridden.retain(|(t, _)| *t != team);
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.present != self.persisted
    }

    /// Build the registration payload covering every roster entry of both
    /// teams. Fails when either side has nobody present.
    pub fn build_request(&self) -> Result<RegisterAttendanceRequest> {
        for roster in [&self.home, &self.away] {
            if self.present_players(roster.team_id).is_empty() {
                let name = if roster.name.is_empty() {
                    roster.team_id.to_string()
                } else {
                    roster.name.clone()
                };
                return Err(AppError::invalid_data(format!(
                    "Mark at least one present player for {}",
                    name
                )));
            }
        }

        let marks = [&self.home, &self.away]
            .into_iter()
            .flat_map(|roster| {
                roster.players.iter().map(move |entry| {
                    let slot = (roster.team_id, entry.player_id);
                    AttendanceMark {
                        roster_id: entry.roster_id,
                        team_id: roster.team_id,
                        present: self.present.contains(&slot),
                        valid_to_play: self.overridden.contains(&slot).then_some(true),
                    }
                })
            })
            .collect();

        Ok(RegisterAttendanceRequest {
            match_id: self.fixture.id,
            marks,
        })
    }

    fn mark_committed(&mut self) {
        self.persisted = self.present.clone();
    }
}

/// Stage one of the match-day flow: builds and commits the presence set.
pub struct AttendanceValidator {
    api: Arc<dyn LeagueApi>,
    sheet: Option<AttendanceSheet>,
}

impl AttendanceValidator {
    pub fn new(api: Arc<dyn LeagueApi>) -> Self {
        AttendanceValidator { api, sheet: None }
    }

    /// Fetch both rosters and the category restriction, using today's date for ages.
    pub async fn load_roster(&mut self, match_id: MatchId) -> Result<&AttendanceSheet> {
        self.load_roster_on(match_id, Utc::now().date_naive()).await
    }

    #[instrument(level = "info", skip(self))]
    pub async fn load_roster_on(
        &mut self,
        match_id: MatchId,
        today: NaiveDate,
    ) -> Result<&AttendanceSheet> {
        let listing = self.api.list_attendance(match_id).await.map_err(|e| {
            error!(error = %e, "Failed to load attendance roster");
            e
        })?;
        let sheet = AttendanceSheet::from_listing(listing, today)?;
        info!(
            home = sheet.home.players.len(),
            away = sheet.away.players.len(),
            already_present = sheet.present.len(),
            "Attendance roster loaded"
        );
        Ok(self.sheet.insert(sheet))
    }

    pub fn sheet(&self) -> Result<&AttendanceSheet> {
        self.sheet
            .as_ref()
            .ok_or_else(|| AppError::invalid_data("Load the roster before editing attendance"))
    }

    fn sheet_mut(&mut self) -> Result<&mut AttendanceSheet> {
        self.sheet
            .as_mut()
            .ok_or_else(|| AppError::invalid_data("Load the roster before editing attendance"))
    }

    pub fn toggle_presence(
        &mut self,
        team: TeamId,
        player: PlayerId,
        acknowledged: bool,
    ) -> Result<PresenceChange> {
        self.sheet_mut()?.toggle_presence(team, player, acknowledged)
    }

    pub fn select_all(&mut self, team: TeamId) -> Result<()> {
        self.sheet_mut()?.select_all(team)
    }

    pub fn clear_all(&mut self, team: TeamId) -> Result<()> {
        self.sheet_mut()?.clear_all(team)
    }

    /// Submit the full presence list in one request.
    ///
    /// Nothing is sent when validation fails; on a remote failure the
    /// local presence set is left exactly as it was.
    #[instrument(level = "info", skip(self))]
    pub async fn commit(&mut self) -> Result<AttendanceSummary> {
        let request = self.sheet()?.build_request()?;
        request.validate()?;

        match self.api.register_attendance(&request).await {
            Ok(summary) => {
                info!(
                    registered = summary.registered,
                    present = summary.present,
                    "Attendance committed"
                );
                self.sheet_mut()?.mark_committed();
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Attendance commit failed, presence set kept for retry");
                Err(e)
            }
        }
    }
}
