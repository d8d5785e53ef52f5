//! Filter decision status.

use serde::{Deserialize, Serialize};

/// Outcome of a single filter check.
///
/// The declaration order doubles as composition precedence: when two
/// verdicts are combined, `Rejected` beats `Allowed`, which beats `Undecided`.
///
/// # Example
///
/// ```rust
/// use serial_filter::Status;
///
/// assert_eq!(Status::Allowed.combine(Status::Rejected), Status::Rejected);
/// assert_eq!(Status::Undecided.combine(Status::Allowed), Status::Allowed);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// No position taken; downstream treats it as permitted.
    #[default]
    Undecided,
    Allowed,
    Rejected,
}

impl Status {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Status::Allowed)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Status::Rejected)
    }

    pub fn is_undecided(&self) -> bool {
        matches!(self, Status::Undecided)
    }

    /// Combine two verdicts: reject wins, then allow, else undecided.
    pub fn combine(self, other: Status) -> Status {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Undecided => "UNDECIDED",
            Status::Allowed => "ALLOWED",
            Status::Rejected => "REJECTED",
        }
    }

    pub fn all() -> &'static [Status] {
        &[Status::Undecided, Status::Allowed, Status::Rejected]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(Status::Rejected > Status::Allowed);
        assert!(Status::Allowed > Status::Undecided);
        assert_eq!(Status::default(), Status::Undecided);
    }

    #[test]
    fn test_combine_grid() {
        for &a in Status::all() {
            for &b in Status::all() {
                let expected = if a.is_rejected() || b.is_rejected() {
                    Status::Rejected
                } else if a.is_allowed() || b.is_allowed() {
                    Status::Allowed
                } else {
                    Status::Undecided
                };
                assert_eq!(a.combine(b), expected, "{a} + {b}");
            }
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Status::Rejected).unwrap(),
            "\"REJECTED\""
        );
        let parsed: Status = serde_json::from_str("\"ALLOWED\"").unwrap();
        assert_eq!(parsed, Status::Allowed);
        assert_eq!(Status::Undecided.to_string(), "UNDECIDED");
    }
}
