// ********* Persisted data structures ***********

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// Keys of the four collections inside the storage namespace.
pub const CANDIDATES_KEY: &str = "candidates";
pub const STUDENTS_KEY: &str = "students";
pub const VOTES_KEY: &str = "votes";
pub const NEEDS_KEY: &str = "needs";

/// Scalar key holding the administrative password, defaulted on first run.
pub const ADMIN_PASS_KEY: &str = "admin_pass";
pub const DEFAULT_ADMIN_PASS: &str = "admin123";

/// A candidate standing in the election.
///
/// The `votes` counter is a cache maintained by the voting engine; the
/// ledger is authoritative and the tally recounts from it.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub usn: String,
    pub branch: String,
    pub batch: String,
    #[serde(default)]
    pub votes: u64,
}

/// A registered student voter. The USN is the primary key, compared
/// case-insensitively.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub usn: String,
    pub branch: String,
    #[serde(default)]
    pub voted: bool,
}

/// One entry of the append-only vote ledger. At most one entry per USN.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub usn: String,
    pub candidate: String,
}

/// A free-text message a student submits for administrative attention,
/// independent of their vote.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Need {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub forwarded: bool,
    #[serde(default)]
    pub branch: String,
}

// ******** Output data structures *********

/// Tally line for one candidate: ledger count and share of the total
/// ledger (0.00 when the ledger is empty).
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TallyEntry {
    pub name: String,
    pub votes: u64,
    pub percent: f64,
}

// ********* Errors **********

/// Errors surfaced to the invoking action. None are fatal: the store
/// stays valid and subsequent operations may proceed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ElectionError {
    DuplicateCandidateUsn { usn: String },
    DuplicateStudentUsn { usn: String },
    VoterNotRegistered { usn: String },
    DuplicateVote { usn: String },
    MissingRequiredField { field: &'static str },
}

impl Error for ElectionError {}

impl Display for ElectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElectionError::DuplicateCandidateUsn { usn } => {
                write!(f, "A candidate with USN {} is already registered.", usn)
            }
            ElectionError::DuplicateStudentUsn { usn } => {
                write!(f, "Student USN {} is already registered.", usn)
            }
            ElectionError::VoterNotRegistered { usn } => {
                write!(f, "Student {} must be registered first.", usn)
            }
            ElectionError::DuplicateVote { usn } => {
                write!(
                    f,
                    "Student {} has already voted. Duplicate votes are not allowed.",
                    usn
                )
            }
            ElectionError::MissingRequiredField { field } => {
                write!(f, "Please provide the {} field.", field)
            }
        }
    }
}
