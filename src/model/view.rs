use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Named view restricting which tasks are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    /// Tasks that are not done
    Active,
    /// Tasks that are completed or fully progressed
    Done,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Done => "done",
        }
    }

    pub fn parse_mode(s: &str) -> Option<FilterMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(FilterMode::All),
            "active" => Some(FilterMode::Active),
            "done" => Some(FilterMode::Done),
            _ => None,
        }
    }

    /// Whether a task belongs in this view
    pub fn admits(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.is_done(),
            FilterMode::Done => task.is_done(),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterMode::parse_mode(s)
            .ok_or_else(|| format!("invalid filter '{}' (expected all, active or done)", s))
    }
}
