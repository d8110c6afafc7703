use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dtos::matchday_dtos::FinalizeResultRequest;
use crate::errors::{AppError, Result};
use crate::models::ids::{MatchId, PlayerId, TeamId};
use crate::models::match_info::{Match, MatchStatus, Side};
use crate::models::result::{EventType, MatchEvent, StoredResult};
use crate::models::roster::{AttendanceListing, TeamRoster};
use crate::services::league_api::LeagueApi;

/// Goals awarded to the winner of a walkover.
pub const WALKOVER_GOALS: u8 = 3;

/// Per-player event counts for one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTally {
    pub goals: u8,
    pub assists: u8,
    pub yellow_cards: u8,
    pub red_cards: u8,
    // Red set by escalation rather than recorded directly
    red_from_yellows: bool,
}

impl PlayerTally {
    pub fn count(&self, kind: EventType) -> u8 {
        match kind {
            EventType::Goal => self.goals,
            EventType::Assist => self.assists,
            EventType::YellowCard => self.yellow_cards,
            EventType::RedCard => self.red_cards,
        }
    }

    fn set(&mut self, kind: EventType, value: u8) {
        match kind {
            EventType::Goal => self.goals = value,
            EventType::Assist => self.assists = value,
            EventType::YellowCard => {
                self.yellow_cards = value;
                if self.red_from_yellows && value < EventType::YellowCard.ceiling() {
                    self.red_cards = 0;
                    self.red_from_yellows = false;
                }
            }
            EventType::RedCard => {
                if value != self.red_cards {
                    self.red_from_yellows = false;
                }
                self.red_cards = value;
            }
        }
        self.escalate_cards();
    }

    // A second yellow is a red; applied after every mutation
    fn escalate_cards(&mut self) {
        if self.yellow_cards >= EventType::YellowCard.ceiling()
            && self.red_cards < EventType::RedCard.ceiling()
        {
            self.red_cards = EventType::RedCard.ceiling();
            self.red_from_yellows = true;
        }
    }

    /// True when the red card only exists because of two yellows.
    pub fn red_from_yellows(&self) -> bool {
        self.red_from_yellows
    }

    pub fn is_empty(&self) -> bool {
        EventType::ALL.into_iter().all(|kind| self.count(kind) == 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Draft,
    Finalized,
}

/// Editable match outcome. Every mutation keeps the ledger consistent:
/// two yellows always carry a red, and at most one MVP exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDraft {
    fixture: Match,
    home_team: TeamId,
    away_team: TeamId,
    manual_score: (u8, u8),
    walkover: bool,
    walkover_winner: Option<Side>,
    penalties: Option<(u8, u8)>,
    tallies: Vec<(TeamId, PlayerId, PlayerTally)>,
    mvp: Option<PlayerId>,
}

impl ResultDraft {
    pub fn new(fixture: Match) -> Result<Self> {
        let (home_team, away_team) = fixture.teams().ok_or_else(|| {
            AppError::not_found(format!("Match {} has teams to be defined", fixture.id))
        })?;
        Ok(ResultDraft {
            fixture,
            home_team,
            away_team,
            manual_score: (0, 0),
            walkover: false,
            walkover_winner: None,
            penalties: None,
            tallies: Vec::new(),
            mvp: None,
        })
    }

    /// Rebuild a draft from a previously finalized result.
    pub fn from_stored(fixture: Match, stored: &StoredResult) -> Result<Self> {
        let mut draft = ResultDraft::new(fixture)?;
        if stored.walkover {
            draft.walkover = true;
            draft.walkover_winner = stored.walkover_winner.and_then(|t| draft.fixture.side_of(t));
        } else {
            draft.manual_score = (stored.home_score, stored.away_score);
        }
        draft.penalties = stored.home_penalties.zip(stored.away_penalties);
        // Reds last, so one that two yellows already imply stays derived
        let mut events: Vec<&MatchEvent> = stored.events.iter().collect();
        events.sort_by_key(|e| e.kind == EventType::RedCard);
        for event in events {
            if draft.side_of(event.team_id).is_err() {
                warn!(team = %event.team_id, "Stored event for a team outside the match ignored");
                continue;
            }
            let tally = draft.tally_mut(event.team_id, event.player_id);
            if event.kind == EventType::RedCard && tally.red_from_yellows {
                continue;
            }
            let next = tally.count(event.kind).saturating_add(1).min(event.kind.ceiling());
            tally.set(event.kind, next);
        }
        draft.mvp = stored.mvp;
        Ok(draft)
    }

    pub fn match_id(&self) -> MatchId {
        self.fixture.id
    }

    pub fn team_on(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }

    fn side_of(&self, team: TeamId) -> Result<Side> {
        self.fixture.side_of(team).ok_or_else(|| {
            AppError::invalid_data(format!("Team {} does not play match {}", team, self.fixture.id))
        })
    }

    pub fn is_walkover(&self) -> bool {
        self.walkover
    }

    pub fn walkover_winner(&self) -> Option<Side> {
        self.walkover_winner
    }

    /// Manually entered score, kept untouched while a walkover is active.
    pub fn manual_score(&self) -> (u8, u8) {
        self.manual_score
    }

    /// Score as shown and submitted: 3–0 for the walkover winner when one
    /// is declared, otherwise the manual score.
    pub fn displayed_score(&self) -> (u8, u8) {
        if !self.walkover {
            return self.manual_score;
        }
        match self.walkover_winner {
            Some(Side::Home) => (WALKOVER_GOALS, 0),
            Some(Side::Away) => (0, WALKOVER_GOALS),
            None => (0, 0),
        }
    }

    pub fn set_score(&mut self, side: Side, value: u8) -> Result<()> {
        if self.walkover {
            return Err(AppError::invalid_data(
                "Score cannot be edited while a walkover is active",
            ));
        }
        match side {
            Side::Home => self.manual_score.0 = value,
            Side::Away => self.manual_score.1 = value,
        }
        Ok(())
    }

    /// Turning the walkover off clears the chosen winner.
    pub fn set_walkover(&mut self, active: bool, winner: Option<Side>) {
        self.walkover = active;
        self.walkover_winner = if active { winner } else { None };
    }

    pub fn penalties(&self) -> Option<(u8, u8)> {
        self.penalties
    }

    pub fn set_penalties(&mut self, penalties: Option<(u8, u8)>) {
        self.penalties = penalties;
    }

    fn tally_mut(&mut self, team: TeamId, player: PlayerId) -> &mut PlayerTally {
        let idx = match self
            .tallies
            .iter()
            .position(|(t, p, _)| *t == team && *p == player)
        {
            Some(idx) => idx,
            None => {
                self.tallies.push((team, player, PlayerTally::default()));
                self.tallies.len() - 1
            }
        };
        &mut self.tallies[idx].2
    }

    pub fn tally(&self, team: TeamId, player: PlayerId) -> PlayerTally {
        self.tallies
            .iter()
            .find(|(t, p, _)| *t == team && *p == player)
            .map(|(_, _, tally)| *tally)
            .unwrap_or_default()
    }

    /// Set how many times `kind` happened for a player. Counts above the
    /// event's ceiling are rejected.
    pub fn record_player_event(
        &mut self,
        team: TeamId,
        player: PlayerId,
        kind: EventType,
        count: u8,
    ) -> Result<PlayerTally> {
        self.side_of(team)?;
        if count > kind.ceiling() {
            return Err(AppError::invalid_data(format!(
                "At most {} {:?} per player",
                kind.ceiling(),
                kind
            )));
        }
        let tally = self.tally_mut(team, player);
        tally.set(kind, count);
        Ok(*tally)
    }

    pub fn mvp(&self) -> Option<PlayerId> {
        self.mvp
    }

    /// Make `player` the single MVP, or clear the flag if they already hold it.
    pub fn toggle_mvp(&mut self, player: PlayerId) -> Option<PlayerId> {
        self.mvp = if self.mvp == Some(player) {
            None
        } else {
            Some(player)
        };
        self.mvp
    }

    /// One event per unit counted, in ledger order; goals, assists, yellow
    /// then red cards for each player.
    pub fn events(&self) -> Vec<MatchEvent> {
        self.tallies
            .iter()
            .flat_map(|(team, player, tally)| {
                EventType::ALL.into_iter().flat_map(move |kind| {
                    (0..tally.count(kind)).map(move |_| MatchEvent {
                        kind,
                        minute: None,
                        player_id: *player,
                        team_id: *team,
                    })
                })
            })
            .collect()
    }

    /// Validate the draft and build the finalize payload.
    pub fn to_request(&self) -> Result<FinalizeResultRequest> {
        if self.walkover && self.walkover_winner.is_none() {
            return Err(AppError::invalid_data(
                "Choose the team awarded the walkover",
            ));
        }

        let penalties = if self.walkover { None } else { self.penalties };
        if let Some((home_pen, away_pen)) = penalties {
            if self.manual_score.0 != self.manual_score.1 {
                return Err(AppError::invalid_data(
                    "Penalties are only recorded for a tied score",
                ));
            }
            if home_pen == away_pen {
                return Err(AppError::invalid_data("A penalty shootout cannot end tied"));
            }
        }

        let (home_score, away_score) = self.displayed_score();
        let request = FinalizeResultRequest {
            match_id: self.fixture.id,
            home_score,
            away_score,
            status: MatchStatus::Finalizado,
            home_penalties: penalties.map(|p| p.0),
            away_penalties: penalties.map(|p| p.1),
            walkover: self.walkover,
            walkover_winner: self.walkover_winner.map(|side| self.team_on(side)),
            mvp: self.mvp,
            events: self.events(),
        };
        request.validate()?;
        Ok(request)
    }
}

/// Stage three of the match-day flow: assembles and submits the outcome.
pub struct ResultRecorder {
    api: Arc<dyn LeagueApi>,
    home: TeamRoster,
    away: TeamRoster,
    draft: ResultDraft,
    status: ResultStatus,
    unsaved: bool,
}

impl ResultRecorder {
    /// Load rosters and any existing result. A stored result opens the
    /// recorder in `Finalized`; further edits are submitted as an update.
    #[instrument(level = "info", skip(api))]
    pub async fn load(api: Arc<dyn LeagueApi>, match_id: MatchId) -> Result<Self> {
        let AttendanceListing {
            fixture, home, away, ..
        } = api.list_attendance(match_id).await.map_err(|e| {
            error!(error = %e, "Failed to load match rosters");
            e
        })?;
        let (home, away) = home.zip(away).ok_or_else(|| {
            AppError::not_found(format!("Match {} has teams to be defined", match_id))
        })?;

        let stored = api.get_result(match_id).await.map_err(|e| {
            error!(error = %e, "Failed to load stored result");
            e
        })?;
        let (draft, status) = match stored {
            Some(stored) => {
                info!(events = stored.events.len(), "Existing result loaded for edit");
                (ResultDraft::from_stored(fixture, &stored)?, ResultStatus::Finalized)
            }
            None => (ResultDraft::new(fixture)?, ResultStatus::Draft),
        };

        Ok(ResultRecorder {
            api,
            home,
            away,
            draft,
            status,
            unsaved: false,
        })
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    pub fn draft(&self) -> &ResultDraft {
        &self.draft
    }

    /// Edits made since the result was loaded, finalized or deleted. A
    /// `Finalized` recorder with unsaved changes holds an unsubmitted update.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn roster(&self, side: Side) -> &TeamRoster {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn ensure_on_roster(&self, team: TeamId, player: PlayerId) -> Result<()> {
        let on_roster = [&self.home, &self.away]
            .into_iter()
            .filter(|r| r.team_id == team)
            .any(|r| r.players.iter().any(|e| e.player_id == player));
        if on_roster {
            Ok(())
        } else {
            Err(AppError::invalid_data(format!(
                "Player {} is not on team {}'s roster",
                player, team
            )))
        }
    }

    fn team_of(&self, player: PlayerId) -> Option<TeamId> {
        [&self.home, &self.away]
            .into_iter()
            .find(|r| r.players.iter().any(|e| e.player_id == player))
            .map(|r| r.team_id)
    }

    pub fn set_score(&mut self, side: Side, value: u8) -> Result<()> {
        self.draft.set_score(side, value)?;
        self.unsaved = true;
        Ok(())
    }

    pub fn set_walkover(&mut self, active: bool, winner: Option<Side>) {
        self.draft.set_walkover(active, winner);
        self.unsaved = true;
    }

    pub fn set_penalties(&mut self, penalties: Option<(u8, u8)>) {
        self.draft.set_penalties(penalties);
        self.unsaved = true;
    }

    pub fn record_player_event(
        &mut self,
        team: TeamId,
        player: PlayerId,
        kind: EventType,
        count: u8,
    ) -> Result<PlayerTally> {
        self.ensure_on_roster(team, player)?;
        let tally = self.draft.record_player_event(team, player, kind, count)?;
        self.unsaved = true;
        Ok(tally)
    }

    pub fn toggle_mvp(&mut self, player: PlayerId) -> Result<Option<PlayerId>> {
        if self.team_of(player).is_none() {
            return Err(AppError::invalid_data(format!(
                "Player {} does not play this match",
                player
            )));
        }
        let mvp = self.draft.toggle_mvp(player);
        self.unsaved = true;
        Ok(mvp)
    }

    /// Submit score, penalties, walkover and the event ledger in one request.
    /// The draft is kept unchanged when the request fails.
    #[instrument(level = "info", skip(self), fields(match_id = %self.draft.match_id()))]
    pub async fn finalize(&mut self) -> Result<()> {
        let request = self.draft.to_request()?;

        match self.api.finalize_result(&request).await {
            Ok(()) => {
                info!(
                    home = request.home_score,
                    away = request.away_score,
                    events = request.events.len(),
                    "Result finalized"
                );
                self.status = ResultStatus::Finalized;
                self.unsaved = false;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Result not finalized, draft kept for retry");
                Err(e)
            }
        }
    }

    /// Remove the stored result and return to an empty draft.
    #[instrument(level = "info", skip(self), fields(match_id = %self.draft.match_id()))]
    pub async fn delete_result(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(AppError::ConfirmationRequired(
                "Deleting the result cannot be undone".to_string(),
            ));
        }
        let match_id = self.draft.match_id();
        self.api.delete_result(match_id).await.map_err(|e| {
            error!(error = %e, "Result not deleted");
            e
        })?;

        self.draft = ResultDraft::new(self.draft.fixture.clone())?;
        self.status = ResultStatus::Draft;
        self.unsaved = false;
        info!("Result deleted");
        Ok(())
    }
}
