use serde::{Deserialize, Serialize};

/// Local fetch status for a Resource's binary blob (§3 "Resource Local
/// State"). Uploading requires `Done`; downloading resets to `Idle` so a
/// later fetcher picks the blob back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchStatus {
    Idle,
    Started,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLocalState {
    pub resource_id: String,
    pub fetch_status: FetchStatus,
    pub fetch_error: Option<String>,
}

impl ResourceLocalState {
    pub fn idle(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            fetch_status: FetchStatus::Idle,
            fetch_error: None,
        }
    }

    pub fn is_ready_to_upload(&self) -> bool {
        self.fetch_status == FetchStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_done_is_ready_to_upload() {
        let mut state = ResourceLocalState::idle("r1");
        assert!(!state.is_ready_to_upload());
        state.fetch_status = FetchStatus::Done;
        assert!(state.is_ready_to_upload());
    }
}
