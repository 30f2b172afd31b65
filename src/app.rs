use log::{debug, info, warn};

use campus_voting::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::args::{Args, Command};

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error reading the data file {path}"))]
    ReadingData {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the data file {path}"))]
    WritingData {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error encoding the data file"))]
    EncodingData { source: serde_json::Error },
    #[snafu(display("Incorrect password."))]
    IncorrectPassword {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;

/// Runs one command against the data file: load the namespace, apply
/// the operation, write the namespace back in a single replacement
/// write. One invocation is one user action.
pub fn run_command(args: &Args) -> AppResult<()> {
    let backend = load_namespace(&args.data)?;
    let mut election = Election::open(backend);

    match &args.command {
        Command::RegisterCandidate {
            name,
            usn,
            branch,
            batch,
            password,
        } => {
            check_password(&election, password)?;
            domain(election.register_candidate(name, usn, branch, batch))?;
            println!("Candidate registered.");
        }
        Command::RegisterStudent {
            name,
            usn,
            branch,
            password,
        } => {
            check_password(&election, password)?;
            domain(election.register_student(name, usn, branch))?;
            println!("Student registered.");
        }
        Command::Signup {
            name,
            usn,
            branch,
            need,
        } => {
            domain(election.sign_up(name, usn, branch, need))?;
            println!(
                "Hello {} -- select one candidate from your branch ({}) to vote for. \
                 You can vote only once.",
                name.trim(),
                branch
            );
            render_ballot(&election.candidates_for_branch(branch.trim()));
        }
        Command::Ballot { usn } => {
            let student = match election.student(usn) {
                Some(s) => s,
                None => whatever!("Student not registered."),
            };
            println!(
                "Hello {} -- select one candidate from your branch ({}).",
                student.name, student.branch
            );
            render_ballot(&election.candidates_for_branch(&student.branch));
        }
        Command::Vote { usn, candidate } => {
            domain(election.cast_vote(usn, candidate))?;
            println!("Vote recorded. Thank you!");
            println!("You voted for: {}", candidate);
            if let Some(need) = election.needs().get(usn.as_str()) {
                if !need.message.is_empty() {
                    println!("Your message / need: {}", need.message);
                }
            }
        }
        Command::Candidates { password } => {
            check_password(&election, password)?;
            render_candidates(&election.candidates());
        }
        Command::Voters { password } => {
            check_password(&election, password)?;
            render_voters(&election.votes(), &election.students());
        }
        Command::Results { json, password } => {
            check_password(&election, password)?;
            let tally = election.tally();
            if *json {
                let summary = serde_json::json!({ "results": tally });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context(EncodingDataSnafu {})?
                );
            } else {
                render_results(&tally);
            }
        }
        Command::Needs { password } => {
            check_password(&election, password)?;
            render_needs(&election.needs(), &election.students());
        }
        Command::Forward {
            usn,
            undo,
            password,
        } => {
            check_password(&election, password)?;
            election.set_forwarded(usn, !undo);
            println!(
                "Need from {} marked as {}.",
                usn,
                if *undo { "not forwarded" } else { "forwarded" }
            );
        }
        Command::Reset { yes, password } => {
            check_password(&election, password)?;
            if !*yes {
                whatever!(
                    "Reset clears candidates, votes, students and messages. \
                     Pass --yes to confirm."
                );
            }
            election.reset();
            println!("Election data cleared.");
        }
    }

    save_namespace(&args.data, election.backend())
}

fn check_password<S: StorageBackend>(election: &Election<S>, password: &str) -> AppResult<()> {
    ensure!(election.verify_admin(password), IncorrectPasswordSnafu);
    Ok(())
}

fn domain<T>(res: Result<T, ElectionError>) -> AppResult<T> {
    match res {
        Result::Ok(x) => Ok(x),
        Result::Err(e) => whatever!("{}", e),
    }
}

// ********* The data file **********
//
// The namespace is one JSON object; each entry holds the JSON document
// stored under that key.

fn load_namespace(path: &str) -> AppResult<MemoryBackend> {
    let mut backend = MemoryBackend::new();
    if !Path::new(path).exists() {
        debug!("data file {} not found, starting empty", path);
        return Ok(backend);
    }
    let contents = fs::read_to_string(path).context(ReadingDataSnafu { path })?;
    match serde_json::from_str::<JSMap<String, JSValue>>(&contents) {
        Result::Ok(map) => {
            for (key, value) in map {
                backend.write(&key, value.to_string());
            }
        }
        Result::Err(e) => {
            warn!("data file {} is not valid JSON, starting empty: {}", path, e);
        }
    }
    Ok(backend)
}

fn save_namespace(path: &str, backend: &MemoryBackend) -> AppResult<()> {
    let mut map = JSMap::new();
    for (key, value) in backend.entries() {
        let js = match serde_json::from_str::<JSValue>(value) {
            Result::Ok(v) => v,
            Result::Err(_) => JSValue::String(value.clone()),
        };
        map.insert(key.clone(), js);
    }
    let pretty =
        serde_json::to_string_pretty(&JSValue::Object(map)).context(EncodingDataSnafu {})?;
    fs::write(path, pretty).context(WritingDataSnafu { path })?;
    info!("data file {} written", path);
    Ok(())
}

// ********* Renderers **********

fn render_ballot(candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("No candidates registered for your branch.");
        return;
    }
    for c in candidates {
        println!("  {} (USN: {})", c.name, c.usn);
    }
}

fn render_candidates(candidates: &[Candidate]) {
    println!("{:<12} {:<24} {:<8} {:<8}", "USN", "NAME", "BRANCH", "BATCH");
    for c in candidates {
        println!("{:<12} {:<24} {:<8} {:<8}", c.usn, c.name, c.branch, c.batch);
    }
}

fn render_voters(votes: &[VoteRecord], students: &[Student]) {
    println!("{:<24} {:<12} {:<8} {:<24}", "NAME", "USN", "BRANCH", "CANDIDATE");
    for v in votes {
        let student = students.iter().find(|s| s.usn.eq_ignore_ascii_case(&v.usn));
        let name = student.map(|s| s.name.as_str()).unwrap_or("(unknown)");
        let branch = student.map(|s| s.branch.as_str()).unwrap_or("");
        println!("{:<24} {:<12} {:<8} {:<24}", name, v.usn, branch, v.candidate);
    }
}

fn render_needs(needs: &BTreeMap<String, Need>, students: &[Student]) {
    println!(
        "{:<24} {:<12} {:<8} {:<9} MESSAGE",
        "NAME", "USN", "BRANCH", "FORWARDED"
    );
    for (usn, need) in needs {
        let student = students.iter().find(|s| s.usn.eq_ignore_ascii_case(usn));
        let name = student.map(|s| s.name.as_str()).unwrap_or("(unknown)");
        let branch = student.map(|s| s.branch.as_str()).unwrap_or(&need.branch);
        println!(
            "{:<24} {:<12} {:<8} {:<9} {}",
            name,
            usn,
            branch,
            if need.forwarded { "yes" } else { "no" },
            need.message
        );
    }
}

fn render_results(tally: &[TallyEntry]) {
    for entry in tally {
        println!(
            "{} -- {} votes ({:.2}%)",
            entry.name, entry.votes, entry.percent
        );
    }
}
