use clap::{Parser, Subcommand};

/// Single-station election desk: registration, one-vote ballots,
/// tallying and need messages for a student council election.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file holding the election data. It is created on first
    /// use and rewritten after every command.
    #[clap(short, long, value_parser, default_value = "election.json")]
    pub data: String,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// (admin) Register a candidate.
    RegisterCandidate {
        #[clap(long, value_parser)]
        name: String,
        #[clap(long, value_parser)]
        usn: String,
        #[clap(long, value_parser)]
        branch: String,
        #[clap(long, value_parser, default_value = "")]
        batch: String,
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// (admin) Register a student voter.
    RegisterStudent {
        #[clap(long, value_parser)]
        name: String,
        #[clap(long, value_parser)]
        usn: String,
        #[clap(long, value_parser)]
        branch: String,
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// Student self-service sign-up, with an optional need message. Signing up
    /// again updates the recorded name and branch.
    Signup {
        #[clap(long, value_parser)]
        name: String,
        #[clap(long, value_parser)]
        usn: String,
        #[clap(long, value_parser)]
        branch: String,
        /// A message for the administration, kept independently of the vote.
        #[clap(long, value_parser, default_value = "")]
        need: String,
    },
    /// Show the candidates a signed-up student may vote for (their branch).
    Ballot {
        #[clap(long, value_parser)]
        usn: String,
    },
    /// Cast a vote. Each student can vote only once.
    Vote {
        #[clap(long, value_parser)]
        usn: String,
        #[clap(long, value_parser)]
        candidate: String,
    },
    /// (admin) List the registered candidates.
    Candidates {
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// (admin) List the voters that have cast a ballot.
    Voters {
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// (admin) Tally the ledger and show the results.
    Results {
        /// Print the tally as a JSON summary instead of text.
        #[clap(long, takes_value = false)]
        json: bool,
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// (admin) List the need messages submitted by students.
    Needs {
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// (admin) Mark a need message as forwarded, or clear the mark with --undo.
    Forward {
        #[clap(long, value_parser)]
        usn: String,
        #[clap(long, takes_value = false)]
        undo: bool,
        #[clap(short, long, value_parser)]
        password: String,
    },
    /// (admin) Clear candidates, students, votes and needs. The admin password
    /// is kept.
    Reset {
        /// Required confirmation.
        #[clap(long, takes_value = false)]
        yes: bool,
        #[clap(short, long, value_parser)]
        password: String,
    },
}
