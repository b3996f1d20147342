use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status shared by signatures (envelopes) and signers.
///
/// Progression order is `draft < sent < delivered < completed`, with
/// `declined` as a terminal side-branch outside the progression. The
/// declaration order is not the progression order — use
/// [`Status::progress_rank`] for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Sent,
    Delivered,
    Completed,
    Declined,
}

impl Status {
    /// Rank along the progression, or `None` for the declined branch.
    pub fn progress_rank(self) -> Option<u8> {
        match self {
            Status::Draft => Some(0),
            Status::Sent => Some(1),
            Status::Delivered => Some(2),
            Status::Completed => Some(3),
            Status::Declined => None,
        }
    }

    /// Map a provider recipient-status string to the internal vocabulary.
    ///
    /// Both "Signed" and "Completed" mean a recipient has finished.
    /// Returns `None` for anything outside the known vocabulary; callers
    /// record the unrecognized value instead of failing the whole payload.
    pub fn from_provider(raw: &str) -> Option<Status> {
        match raw {
            "Sent" => Some(Status::Sent),
            "Delivered" => Some(Status::Delivered),
            "Signed" | "Completed" => Some(Status::Completed),
            "Declined" => Some(Status::Declined),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Draft => "draft",
            Status::Sent => "sent",
            Status::Delivered => "delivered",
            Status::Completed => "completed",
            Status::Declined => "declined",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_order() {
        let ranks: Vec<Option<u8>> = [
            Status::Draft,
            Status::Sent,
            Status::Delivered,
            Status::Completed,
        ]
        .iter()
        .map(|s| s.progress_rank())
        .collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(Status::Declined.progress_rank(), None);
    }

    #[test]
    fn provider_vocabulary() {
        assert_eq!(Status::from_provider("Sent"), Some(Status::Sent));
        assert_eq!(Status::from_provider("Delivered"), Some(Status::Delivered));
        assert_eq!(Status::from_provider("Signed"), Some(Status::Completed));
        assert_eq!(Status::from_provider("Completed"), Some(Status::Completed));
        assert_eq!(Status::from_provider("Declined"), Some(Status::Declined));
        assert_eq!(Status::from_provider("AutoResponded"), None);
        // Vocabulary is case-sensitive: the provider sends CamelCase.
        assert_eq!(Status::from_provider("sent"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Status::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
        let parsed: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Status::Delivered);
    }
}
