use serde::Serialize;

/// Why a request was admitted without consulting the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// No counter store endpoint is configured.
    NotConfigured,
    /// The store is configured but failed after bounded retries.
    StoreError,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum Admission {
    Admitted,
    Denied,
    /// Fail-open admission: accounting was skipped.
    DegradedAdmit(DegradedReason),
}

/// Admission decision plus quota metadata for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub outcome: Admission,
    /// Requests left in the current window, in `0..=max_requests`.
    pub remaining: u64,
    /// Seconds until the current window closes.
    pub reset_in: u64,
}

impl Decision {
    /// Whether the caller should let the request through.
    pub fn admitted(&self) -> bool {
        !matches!(self.outcome, Admission::Denied)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, Admission::DegradedAdmit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_counts_as_admitted() {
        let decision = Decision {
            outcome: Admission::DegradedAdmit(DegradedReason::StoreError),
            remaining: 20,
            reset_in: 10,
        };

        assert!(decision.admitted());
        assert!(decision.is_degraded());
    }

    #[test]
    fn test_denied() {
        let decision = Decision {
            outcome: Admission::Denied,
            remaining: 0,
            reset_in: 3,
        };

        assert!(!decision.admitted());
        assert!(!decision.is_degraded());
    }
}
