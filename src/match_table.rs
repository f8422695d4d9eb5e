use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str =
    "date,h_a,team_h,team_a,goals_for,goals_against,xG_for,xG_against,xGA,result";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    H,
    A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    W,
    D,
    L,
}

impl Outcome {
    // Always derived from the resolved goals; source-provided results are ignored.
    pub fn from_goals(goals_for: u32, goals_against: u32) -> Self {
        if goals_for > goals_against {
            Outcome::W
        } else if goals_for < goals_against {
            Outcome::L
        } else {
            Outcome::D
        }
    }
}

// Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub date: Option<NaiveDate>,
    pub h_a: Side,
    pub team_h: String,
    pub team_a: String,
    pub goals_for: u32,
    pub goals_against: u32,
    #[serde(rename = "xG_for")]
    pub xg_for: f64,
    #[serde(rename = "xG_against")]
    pub xg_against: f64,
    #[serde(rename = "xGA")]
    pub xga: f64,
    pub result: Outcome,
}
