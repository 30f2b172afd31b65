use crate::records::{Candidate, Student};

/// Records carrying the (USN, name) pair used for display ordering.
pub trait UsnKeyed {
    fn usn(&self) -> &str;
    fn name(&self) -> &str;
}

impl UsnKeyed for Candidate {
    fn usn(&self) -> &str {
        &self.usn
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl UsnKeyed for Student {
    fn usn(&self) -> &str {
        &self.usn
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Sorts records by (numeric USN value ascending, case-insensitive name
/// ascending). Applied to every candidate and student listing; the vote
/// ledger and the needs map keep their own order.
pub fn sort_for_display<T: UsnKeyed>(records: &mut [T]) {
    records.sort_by(|a, b| {
        usn_value(a.usn())
            .cmp(&usn_value(b.usn()))
            .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
    });
}

// The digit runs of the USN concatenated and read as a single integer:
// "1CS2" -> 12, "1CS10" -> 110. No digits -> 0. Saturates on overflow.
fn usn_value(usn: &str) -> u128 {
    let digits: String = usn.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u128::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, usn: &str) -> Student {
        Student {
            name: name.to_string(),
            usn: usn.to_string(),
            branch: "CSE".to_string(),
            voted: false,
        }
    }

    #[test]
    fn numeric_not_lexical() {
        let mut records = vec![student("Bob", "1CS10"), student("Amy", "1CS2")];
        sort_for_display(&mut records);
        let names: Vec<&str> = records.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Bob"]);
    }

    #[test]
    fn no_digits_sorts_first() {
        let mut records = vec![student("Zoe", "1CS03"), student("Ada", "USNX")];
        sort_for_display(&mut records);
        assert_eq!(records[0].name, "Ada");
    }

    #[test]
    fn ties_break_on_name_case_insensitively() {
        let mut records = vec![
            student("carol", "2EC01"),
            student("Bert", "2EC01"),
            student("alice", "2EC01"),
        ];
        sort_for_display(&mut records);
        let names: Vec<&str> = records.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "Bert", "carol"]);
    }

    #[test]
    fn oversized_usn_saturates() {
        let mut records = vec![
            student("Far", "999999999999999999999999999999999999999"),
            student("Near", "1CS01"),
        ];
        sort_for_display(&mut records);
        assert_eq!(records[0].name, "Near");
    }
}
