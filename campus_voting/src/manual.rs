/*!

This is the long-form manual for `campus_voting` and `campusvote`.

## Overview

The crate models a single-station election: one machine, one storage
namespace, one person at the keyboard at a time. Candidates and student
voters are registered, each student casts at most one vote, the results
are tallied from an append-only ledger, and students may leave a
free-text "need" message for administrative follow-up.

There is no server and no cross-session coordination. Two writers
racing on the same namespace are not detected; the last writer wins.

## Storage layout

All state lives under five keys of a key-value namespace. Every value
is a JSON document:

| key          | contents                                                |
|--------------|---------------------------------------------------------|
| `candidates` | array of `{name, usn, branch, batch, votes}`            |
| `students`   | array of `{name, usn, branch, voted}`                   |
| `votes`      | array of `{usn, candidate}`, append-only                |
| `needs`      | object mapping usn to `{message, forwarded, branch}`    |
| `admin_pass` | plaintext administrative password, defaulted on first run |

A value that fails to parse is treated as an empty collection. The
`votes` array is the authority on the outcome: the per-candidate
`votes` counter is a display cache and the tally recounts the ledger on
every call.

## Using the library

```
use campus_voting::{Election, MemoryBackend};

let mut election = Election::open(MemoryBackend::new());
election.register_candidate("Alice", "1CS05", "CSE", "2023")?;
election.register_student("Amy", "1CS02", "CSE")?;
election.cast_vote("1CS02", "Alice")?;

for entry in election.tally() {
    println!("{}: {} votes ({:.2}%)", entry.name, entry.votes, entry.percent);
}
# Ok::<(), campus_voting::ElectionError>(())
```

Any type implementing `StorageBackend` can hold the namespace. The
bundled `MemoryBackend` keeps it in memory; the `campusvote` binary
loads a JSON file into one, applies a single command and writes the
file back.

## Voting rules

* A vote requires a prior registration (`VoterNotRegistered`).
* A second vote from the same USN is rejected (`DuplicateVote`) and
  changes nothing.
* A successful vote updates three records: the student's `voted` flag,
  the ledger, and the candidate's counter. The flag is persisted first,
  so an interruption can lose a ballot but never allow a second one.
* USNs compare case-insensitively everywhere; listings order by the
  number formed from the digits of the USN, then by name.

## Resetting

`Election::reset` clears the four collections in one call. The admin
password is kept.

*/
