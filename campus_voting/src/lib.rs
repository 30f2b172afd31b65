//! Core of a single-station student election: registration, a one-vote
//! ledger, tallying and need messages, over an injected key-value store.

pub mod manual;
mod ordering;
mod records;
mod store;

use log::{debug, info, warn};

use std::collections::BTreeMap;

pub use crate::ordering::{sort_for_display, UsnKeyed};
pub use crate::records::*;
pub use crate::store::{MemoryBackend, RecordStore, StorageBackend};

/// The voting engine and the registration operations around it.
///
/// This is the only component that mutates vote-related records. All
/// mutating operations take `&mut self`; the backing store has no
/// coordination of its own (last writer wins), so embedding code must
/// serialize operations through exclusive ownership or an outer mutex.
pub struct Election<S: StorageBackend> {
    store: RecordStore<S>,
}

impl<S: StorageBackend> Election<S> {
    /// Opens the election held in `backend`, defaulting the admin
    /// password on first run.
    pub fn open(backend: S) -> Election<S> {
        let mut store = RecordStore::new(backend);
        if store.admin_password().is_none() {
            store.set_admin_password(DEFAULT_ADMIN_PASS);
        }
        Election { store }
    }

    pub fn backend(&self) -> &S {
        self.store.backend()
    }

    // ********* Registration **********

    pub fn register_candidate(
        &mut self,
        name: &str,
        usn: &str,
        branch: &str,
        batch: &str,
    ) -> Result<(), ElectionError> {
        let name = required(name, "name")?;
        let usn = required(usn, "usn")?;

        let mut candidates = self.store.candidates();
        if candidates.iter().any(|c| c.usn.eq_ignore_ascii_case(usn)) {
            return Err(ElectionError::DuplicateCandidateUsn {
                usn: usn.to_string(),
            });
        }
        candidates.push(Candidate {
            name: name.to_string(),
            usn: usn.to_string(),
            branch: branch.trim().to_string(),
            batch: batch.trim().to_string(),
            votes: 0,
        });
        sort_for_display(&mut candidates);
        self.store.save_candidates(&candidates);
        info!("registered candidate {} ({})", name, usn);
        Ok(())
    }

    pub fn register_student(
        &mut self,
        name: &str,
        usn: &str,
        branch: &str,
    ) -> Result<(), ElectionError> {
        let name = required(name, "name")?;
        let usn = required(usn, "usn")?;

        let mut students = self.store.students();
        if students.iter().any(|s| s.usn.eq_ignore_ascii_case(usn)) {
            return Err(ElectionError::DuplicateStudentUsn {
                usn: usn.to_string(),
            });
        }
        students.push(Student {
            name: name.to_string(),
            usn: usn.to_string(),
            branch: branch.trim().to_string(),
            voted: false,
        });
        sort_for_display(&mut students);
        self.store.save_students(&students);
        info!("registered student {} ({})", name, usn);
        Ok(())
    }

    /// Student self-service sign-up. A new USN registers the student; an
    /// existing USN updates name and branch and never touches the voted
    /// flag. The student's need entry is upserted either way.
    pub fn sign_up(
        &mut self,
        name: &str,
        usn: &str,
        branch: &str,
        need_message: &str,
    ) -> Result<(), ElectionError> {
        let name = required(name, "name")?;
        let usn = required(usn, "usn")?;
        let branch = branch.trim();

        let mut students = self.store.students();
        match students.iter_mut().find(|s| s.usn.eq_ignore_ascii_case(usn)) {
            Some(student) => {
                student.name = name.to_string();
                student.branch = branch.to_string();
            }
            None => {
                students.push(Student {
                    name: name.to_string(),
                    usn: usn.to_string(),
                    branch: branch.to_string(),
                    voted: false,
                });
                sort_for_display(&mut students);
            }
        }
        self.store.save_students(&students);
        self.record_need(usn, need_message.trim(), branch);
        info!("sign-up recorded for {} ({})", name, usn);
        Ok(())
    }

    // ********* Voting **********

    /// Casts the single vote of `voter_usn` for `candidate_name`.
    ///
    /// The voted flag is persisted before the ledger append and the
    /// counter increment: an interruption between the writes may lose a
    /// ledger entry, but it can never let the voter vote again. A vote
    /// naming an unknown candidate still lands in the ledger; the
    /// counter is an advisory cache and the tally recounts regardless.
    pub fn cast_vote(
        &mut self,
        voter_usn: &str,
        candidate_name: &str,
    ) -> Result<(), ElectionError> {
        let mut students = self.store.students();
        let student = students
            .iter_mut()
            .find(|s| s.usn.eq_ignore_ascii_case(voter_usn))
            .ok_or(ElectionError::VoterNotRegistered {
                usn: voter_usn.to_string(),
            })?;
        if student.voted {
            return Err(ElectionError::DuplicateVote {
                usn: voter_usn.to_string(),
            });
        }
        let voter_branch = student.branch.clone();
        student.voted = true;
        self.store.save_students(&students);

        let mut votes = self.store.votes();
        votes.push(VoteRecord {
            usn: voter_usn.to_string(),
            candidate: candidate_name.to_string(),
        });
        self.store.save_votes(&votes);

        let mut candidates = self.store.candidates();
        match candidates.iter_mut().find(|c| c.name == candidate_name) {
            Some(candidate) => {
                candidate.votes += 1;
                self.store.save_candidates(&candidates);
            }
            None => {
                warn!("vote recorded for unknown candidate {:?}", candidate_name);
            }
        }

        // The need entry follows the voter's registered branch.
        let mut needs = self.store.needs();
        let entry = needs.entry(voter_usn.to_string()).or_insert(Need {
            message: String::new(),
            forwarded: false,
            branch: String::new(),
        });
        entry.branch = voter_branch;
        self.store.save_needs(&needs);

        info!("vote recorded by {} for {:?}", voter_usn, candidate_name);
        Ok(())
    }

    /// Recounts the ledger for every known candidate. The stored
    /// per-candidate counter is never consulted, so the tally self-heals
    /// from any counter drift.
    pub fn tally(&self) -> Vec<TallyEntry> {
        let candidates = self.candidates();
        let votes = self.store.votes();
        let total = votes.len();
        debug!("tally over {} ledger entries", total);
        candidates
            .iter()
            .map(|c| {
                let count = votes.iter().filter(|v| v.candidate == c.name).count();
                let percent = if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                };
                TallyEntry {
                    name: c.name.clone(),
                    votes: count as u64,
                    percent,
                }
            })
            .collect()
    }

    // ********* Needs ledger **********

    /// Upserts the need entry for `usn`. An existing `forwarded` flag is
    /// preserved; a new entry starts out not forwarded.
    pub fn record_need(&mut self, usn: &str, message: &str, branch: &str) {
        let mut needs = self.store.needs();
        let forwarded = needs.get(usn).map(|n| n.forwarded).unwrap_or(false);
        needs.insert(
            usn.to_string(),
            Need {
                message: message.to_string(),
                forwarded,
                branch: branch.to_string(),
            },
        );
        self.store.save_needs(&needs);
    }

    /// Administrative toggle. Never alters the message or the branch.
    pub fn set_forwarded(&mut self, usn: &str, forwarded: bool) {
        let mut needs = self.store.needs();
        let entry = needs.entry(usn.to_string()).or_insert(Need {
            message: String::new(),
            forwarded: false,
            branch: String::new(),
        });
        entry.forwarded = forwarded;
        self.store.save_needs(&needs);
    }

    // ********* Administration **********

    pub fn verify_admin(&self, password: &str) -> bool {
        self.store
            .admin_password()
            .map_or(false, |stored| stored == password)
    }

    /// Clears candidates, students, votes and needs. The admin password
    /// survives a reset.
    pub fn reset(&mut self) {
        self.store.clear_collections();
        info!("election data cleared");
    }

    // ********* Read accessors for the presentation layer **********

    pub fn candidates(&self) -> Vec<Candidate> {
        let mut candidates = self.store.candidates();
        sort_for_display(&mut candidates);
        candidates
    }

    pub fn candidates_for_branch(&self, branch: &str) -> Vec<Candidate> {
        self.candidates()
            .into_iter()
            .filter(|c| c.branch == branch)
            .collect()
    }

    pub fn students(&self) -> Vec<Student> {
        let mut students = self.store.students();
        sort_for_display(&mut students);
        students
    }

    pub fn student(&self, usn: &str) -> Option<Student> {
        self.store
            .students()
            .into_iter()
            .find(|s| s.usn.eq_ignore_ascii_case(usn))
    }

    pub fn votes(&self) -> Vec<VoteRecord> {
        self.store.votes()
    }

    pub fn needs(&self) -> BTreeMap<String, Need> {
        self.store.needs()
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ElectionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ElectionError::MissingRequiredField { field })
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election() -> Election<MemoryBackend> {
        let _ = env_logger::builder().is_test(true).try_init();
        Election::open(MemoryBackend::new())
    }

    fn seeded() -> Election<MemoryBackend> {
        let mut e = election();
        e.register_candidate("Alice", "1CS05", "CSE", "2023").unwrap();
        e.register_candidate("Bob", "1CS09", "CSE", "2023").unwrap();
        e.register_student("Amy", "1CS02", "CSE").unwrap();
        e.register_student("Ben", "1CS03", "CSE").unwrap();
        e.register_student("Cid", "1CS04", "CSE").unwrap();
        e.register_student("Dev", "1EC01", "ECE").unwrap();
        e
    }

    #[test]
    fn candidate_usn_is_unique_case_insensitively() {
        let mut e = election();
        e.register_candidate("Alice", "1cs05", "CSE", "2023").unwrap();
        let err = e
            .register_candidate("Alia", "1CS05", "CSE", "2023")
            .unwrap_err();
        assert_eq!(
            err,
            ElectionError::DuplicateCandidateUsn {
                usn: "1CS05".to_string()
            }
        );
        assert_eq!(e.candidates().len(), 1);
    }

    #[test]
    fn student_usn_is_unique_case_insensitively() {
        let mut e = election();
        e.register_student("Amy", "1cs02", "CSE").unwrap();
        let err = e.register_student("Amos", "1CS02", "CSE").unwrap_err();
        assert_eq!(
            err,
            ElectionError::DuplicateStudentUsn {
                usn: "1CS02".to_string()
            }
        );
    }

    #[test]
    fn registration_requires_name_and_usn() {
        let mut e = election();
        assert_eq!(
            e.register_candidate("  ", "1CS05", "CSE", ""),
            Err(ElectionError::MissingRequiredField { field: "name" })
        );
        assert_eq!(
            e.register_student("Amy", "", "CSE"),
            Err(ElectionError::MissingRequiredField { field: "usn" })
        );
        assert_eq!(
            e.sign_up("Amy", "   ", "CSE", "hello"),
            Err(ElectionError::MissingRequiredField { field: "usn" })
        );
    }

    #[test]
    fn listings_sort_by_usn_value_then_name() {
        let mut e = election();
        e.register_candidate("Bob", "1CS10", "CSE", "2023").unwrap();
        e.register_candidate("Amy", "1CS2", "CSE", "2023").unwrap();
        let names: Vec<String> = e.candidates().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Amy".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn cast_vote_updates_all_three_records() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Alice").unwrap();

        assert!(e.student("1CS02").unwrap().voted);
        assert_eq!(
            e.votes(),
            vec![VoteRecord {
                usn: "1CS02".to_string(),
                candidate: "Alice".to_string()
            }]
        );
        let alice = e
            .candidates()
            .into_iter()
            .find(|c| c.name == "Alice")
            .unwrap();
        assert_eq!(alice.votes, 1);
        // The need entry tracks the voter's branch.
        assert_eq!(e.needs().get("1CS02").unwrap().branch, "CSE");
    }

    #[test]
    fn voter_must_be_registered() {
        let mut e = seeded();
        assert_eq!(
            e.cast_vote("9XX99", "Alice"),
            Err(ElectionError::VoterNotRegistered {
                usn: "9XX99".to_string()
            })
        );
        assert!(e.votes().is_empty());
    }

    #[test]
    fn second_vote_is_rejected_and_changes_nothing() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Alice").unwrap();
        let err = e.cast_vote("1cs02", "Bob").unwrap_err();
        assert_eq!(
            err,
            ElectionError::DuplicateVote {
                usn: "1cs02".to_string()
            }
        );
        assert_eq!(e.votes().len(), 1);
        let alice = e
            .candidates()
            .into_iter()
            .find(|c| c.name == "Alice")
            .unwrap();
        assert_eq!(alice.votes, 1);
    }

    #[test]
    fn tally_totals_match_the_ledger() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Alice").unwrap();
        e.cast_vote("1CS03", "Alice").unwrap();
        e.cast_vote("1CS04", "Alice").unwrap();
        e.cast_vote("1EC01", "Bob").unwrap();

        let tally = e.tally();
        let total: u64 = tally.iter().map(|t| t.votes).sum();
        assert_eq!(total, e.votes().len() as u64);
        assert_eq!(
            tally,
            vec![
                TallyEntry {
                    name: "Alice".to_string(),
                    votes: 3,
                    percent: 75.0
                },
                TallyEntry {
                    name: "Bob".to_string(),
                    votes: 1,
                    percent: 25.0
                },
            ]
        );
    }

    #[test]
    fn tally_is_zero_on_an_empty_ledger() {
        let e = seeded();
        for entry in e.tally() {
            assert_eq!(entry.votes, 0);
            assert_eq!(entry.percent, 0.0);
        }
    }

    #[test]
    fn tally_recounts_from_the_ledger_not_the_counter() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Alice").unwrap();

        // Drift the cached counter behind the engine's back.
        let mut store = RecordStore::new(e.backend().clone());
        let mut candidates = store.candidates();
        candidates.iter_mut().find(|c| c.name == "Alice").unwrap().votes = 41;
        store.save_candidates(&candidates);
        let mut e = Election::open(store.backend().clone());

        let alice = e
            .tally()
            .into_iter()
            .find(|t| t.name == "Alice")
            .unwrap();
        assert_eq!(alice.votes, 1);
        e.cast_vote("1CS03", "Bob").unwrap();
        assert_eq!(e.tally().iter().map(|t| t.votes).sum::<u64>(), 2);
    }

    #[test]
    fn vote_for_unknown_candidate_still_reaches_the_ledger() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Nobody").unwrap();
        assert_eq!(e.votes().len(), 1);
        assert!(e.student("1CS02").unwrap().voted);
        // Not a known candidate: the tally has no line for it.
        assert!(e.tally().iter().all(|t| t.votes == 0));
    }

    #[test]
    fn sign_up_upserts_without_touching_the_voted_flag() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Alice").unwrap();
        e.sign_up("Amy Adams", "1cs02", "ISE", "new room please").unwrap();

        let amy = e.student("1CS02").unwrap();
        assert_eq!(amy.name, "Amy Adams");
        assert_eq!(amy.branch, "ISE");
        assert!(amy.voted);
        assert_eq!(e.students().len(), 4);

        e.sign_up("Eve", "1CS07", "CSE", "").unwrap();
        assert_eq!(e.students().len(), 5);
        assert!(!e.student("1CS07").unwrap().voted);
    }

    #[test]
    fn forwarded_flag_survives_a_message_update() {
        let mut e = election();
        e.record_need("1CS01", "hello", "CSE");
        e.set_forwarded("1CS01", true);
        e.record_need("1CS01", "update", "CSE");

        let need = e.needs().get("1CS01").unwrap().clone();
        assert!(need.forwarded);
        assert_eq!(need.message, "update");
    }

    #[test]
    fn set_forwarded_alone_creates_a_stub_entry() {
        let mut e = election();
        e.set_forwarded("1CS01", true);
        let need = e.needs().get("1CS01").unwrap().clone();
        assert!(need.forwarded);
        assert_eq!(need.message, "");
    }

    #[test]
    fn candidates_can_be_filtered_by_branch() {
        let mut e = seeded();
        e.register_candidate("Eli", "1EC05", "ECE", "2023").unwrap();
        let cse: Vec<String> = e
            .candidates_for_branch("CSE")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(cse, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn reset_clears_every_collection() {
        let mut e = seeded();
        e.cast_vote("1CS02", "Alice").unwrap();
        e.record_need("1CS03", "hello", "CSE");
        e.reset();

        assert!(e.candidates().is_empty());
        assert!(e.students().is_empty());
        assert!(e.votes().is_empty());
        assert!(e.needs().is_empty());
        assert!(e.tally().is_empty());
        // The password gate still works after a reset.
        assert!(e.verify_admin(DEFAULT_ADMIN_PASS));
    }

    #[test]
    fn password_defaults_on_first_run_only() {
        let e = election();
        assert!(e.verify_admin("admin123"));
        assert!(!e.verify_admin("letmein"));

        let mut store = RecordStore::new(MemoryBackend::new());
        store.set_admin_password("s3cret");
        let e = Election::open(store.backend().clone());
        assert!(e.verify_admin("s3cret"));
        assert!(!e.verify_admin("admin123"));
    }
}
