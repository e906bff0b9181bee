use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aggregates::{
    self, CityCounts, MarginDistribution, ResultDistribution, SeasonCounts, TeamList,
    TossDecisionOutcome,
};
use crate::error::QueryResult;
use crate::innings::{
    self, BoundaryInnings, FallOfWicketsInnings, MatchInnings, PhaseInnings, TopPerformersInnings,
};
use crate::partnerships::{self, PartnershipInnings, TaggedPartnership};
use crate::performance::{
    self, BatsmanVsBowler, DismissalAnalysis, HomeAwayRecord, PhasePerformance,
    PlayerPerformance, PlayerVsTeam, TeamPhaseStats,
};
use crate::tables::Tables;

/// Read-only query façade over the loaded tables. Cheap to clone; every call recomputes
/// from the base rows.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    tables: Arc<Tables>,
}

impl QueryEngine {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn list_teams(&self) -> TeamList {
        aggregates::list_teams(self.tables.matches())
    }

    pub fn matches_per_season(&self) -> SeasonCounts {
        aggregates::matches_per_season(self.tables.matches())
    }

    pub fn matches_per_city(&self) -> CityCounts {
        aggregates::matches_per_city(self.tables.matches())
    }

    pub fn avg_target_per_season(&self) -> BTreeMap<String, f64> {
        aggregates::avg_target_per_season(self.tables.matches())
    }

    pub fn match_result_distribution(&self) -> ResultDistribution {
        aggregates::match_result_distribution(self.tables.matches())
    }

    pub fn result_margin_distribution(&self) -> MarginDistribution {
        aggregates::result_margin_distribution(self.tables.matches())
    }

    pub fn toss_decision_outcomes(&self) -> Vec<TossDecisionOutcome> {
        aggregates::toss_decision_outcomes(self.tables.matches())
    }

    pub fn player_performance(&self, player: &str) -> QueryResult<PlayerPerformance> {
        performance::player_performance(self.tables.deliveries(), player)
    }

    pub fn player_vs_team(&self, player: &str, team: &str) -> QueryResult<PlayerVsTeam> {
        performance::player_vs_team(self.tables.deliveries(), player, team)
    }

    pub fn batsman_vs_bowler(&self, batsman: &str, bowler: &str) -> QueryResult<BatsmanVsBowler> {
        performance::batsman_vs_bowler(self.tables.deliveries(), batsman, bowler)
    }

    pub fn player_dismissal_analysis(&self, player: &str) -> QueryResult<DismissalAnalysis> {
        performance::player_dismissal_analysis(self.tables.deliveries(), player)
    }

    pub fn player_performance_by_phase(
        &self,
        player: &str,
        phase: &str,
    ) -> QueryResult<PhasePerformance> {
        performance::player_performance_by_phase(self.tables.deliveries(), player, phase)
    }

    pub fn team_phase_stats(
        &self,
        team: &str,
        phase: &str,
        role: &str,
    ) -> QueryResult<TeamPhaseStats> {
        performance::team_phase_stats(self.tables.deliveries(), team, phase, role)
    }

    pub fn team_home_vs_away(&self, team: &str, home_venue: &str) -> HomeAwayRecord {
        performance::team_home_vs_away(self.tables.matches(), team, home_venue)
    }

    pub fn innings_phases(&self, match_id: i64) -> QueryResult<MatchInnings<PhaseInnings>> {
        innings::innings_phases(self.tables.deliveries(), match_id)
    }

    pub fn innings_top_performers(
        &self,
        match_id: i64,
    ) -> QueryResult<MatchInnings<TopPerformersInnings>> {
        innings::innings_top_performers(self.tables.deliveries(), match_id)
    }

    pub fn innings_boundaries(&self, match_id: i64) -> QueryResult<MatchInnings<BoundaryInnings>> {
        innings::innings_boundaries(self.tables.deliveries(), match_id)
    }

    pub fn innings_fall_of_wickets(
        &self,
        match_id: i64,
    ) -> QueryResult<MatchInnings<FallOfWicketsInnings>> {
        innings::innings_fall_of_wickets(self.tables.deliveries(), match_id)
    }

    pub fn innings_partnerships(
        &self,
        match_id: i64,
    ) -> QueryResult<MatchInnings<PartnershipInnings>> {
        partnerships::innings_partnerships(self.tables.deliveries(), match_id)
    }

    pub fn all_partnerships(&self) -> Vec<TaggedPartnership> {
        partnerships::all_partnerships(self.tables.deliveries())
    }
}
