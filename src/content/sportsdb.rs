//! Decoding of sports-database team/league listings into facts
//!
//! Only the payload shape is handled here; fetching is the host's job.

use serde::Deserialize;

use super::{ContentError, Fact, FactCategory};

/// Teams kept per listing
const MAX_TEAMS: usize = 40;
/// Basketball leagues kept from the league listing
const MAX_LEAGUES: usize = 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Option<Vec<Team>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id_team: Option<String>,
    pub str_team: Option<String>,
    pub str_league: Option<String>,
    pub str_stadium: Option<String>,
    pub str_country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaguesResponse {
    #[serde(default)]
    pub leagues: Option<Vec<League>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id_league: Option<String>,
    pub str_league: Option<String>,
    pub str_sport: Option<String>,
    pub str_country: Option<String>,
}

/// The three listings the game draws from, bundled in one document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SportsDbBundle {
    #[serde(default)]
    pub soccer: TeamsResponse,
    #[serde(default)]
    pub leagues: LeaguesResponse,
    #[serde(default)]
    pub baseball: TeamsResponse,
}

impl SportsDbBundle {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Soccer teams, then basketball leagues, then baseball teams
    pub fn into_facts(self) -> Vec<Fact> {
        let mut facts = teams_to_facts(
            self.soccer.teams.unwrap_or_default(),
            FactCategory::Soccer,
            "⚽",
            "#22c55e",
        );
        facts.extend(leagues_to_facts(self.leagues.leagues.unwrap_or_default()));
        facts.extend(teams_to_facts(
            self.baseball.teams.unwrap_or_default(),
            FactCategory::Baseball,
            "⚾",
            "#60a5fa",
        ));
        facts
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

pub fn teams_to_facts(
    teams: Vec<Team>,
    category: FactCategory,
    emoji: &str,
    color: &str,
) -> Vec<Fact> {
    teams
        .iter()
        .filter_map(|t| {
            let id = non_empty(&t.id_team)?;
            let name = non_empty(&t.str_team)?;
            let details: Vec<&str> = [&t.str_league, &t.str_country, &t.str_stadium]
                .into_iter()
                .filter_map(non_empty)
                .collect();
            Some(Fact {
                id: format!("{}-team-{}", category.as_str(), id),
                category,
                emoji: emoji.to_string(),
                color: color.to_string(),
                title: name.to_string(),
                subtitle: (!details.is_empty()).then(|| details.join(" • ")),
            })
        })
        .take(MAX_TEAMS)
        .collect()
}

pub fn leagues_to_facts(leagues: Vec<League>) -> Vec<Fact> {
    leagues
        .iter()
        .filter(|l| l.str_sport.as_deref() == Some("Basketball"))
        .filter_map(|l| {
            let id = non_empty(&l.id_league)?;
            let name = non_empty(&l.str_league)?;
            Some(Fact {
                id: format!("basketball-league-{}", id),
                category: FactCategory::Basketball,
                emoji: "🏀".to_string(),
                color: "#f97316".to_string(),
                title: name.to_string(),
                subtitle: non_empty(&l.str_country).map(|c| format!("Country: {}", c)),
            })
        })
        .take(MAX_LEAGUES)
        .collect()
}
