use colored::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPhase {
    #[default]
    Idle,
    Connected,
    ModelsLoaded,
    Diffed,
    BackedUp,
    TablesCreated,
    Verified,
    Failed,
    Cancelled,
}

impl SyncPhase {
    /// Transitions allowed by the import procedure. `Failed` is reachable from anywhere.
    pub fn can_advance_to(&self, next: SyncPhase) -> bool {
        use SyncPhase::*;

        matches!(
            (self, next),
            (_, Failed)
                | (Idle, Connected)
                | (Connected, ModelsLoaded)
                | (ModelsLoaded, Diffed)
                | (Diffed, BackedUp)
                | (Diffed, TablesCreated)
                | (Diffed, Cancelled)
                | (BackedUp, TablesCreated)
                | (TablesCreated, Verified)
                | (Diffed | Verified | Cancelled | Failed, Idle)
        )
    }

    pub fn to_colored_string(&self) -> String {
        let label = self.to_string();
        match self {
            SyncPhase::Idle => label.bright_black().to_string(),
            SyncPhase::Failed => label.red().bold().to_string(),
            SyncPhase::Cancelled => label.yellow().bold().to_string(),
            SyncPhase::Verified => label.green().bold().to_string(),
            _ => label.blue().bold().to_string(),
        }
    }
}
