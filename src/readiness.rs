use serde::{Deserialize, Serialize};

use crate::input::InputSource;
use crate::utils::text::meets_min_length;
use crate::workflow::Session;

/// Which triggers a surface should enable. Advisory only: the reducer checks
/// again when the trigger fires.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub can_detect: bool,
    pub can_optimize: bool,
}

pub fn can_detect(input: &InputSource) -> bool {
    match input {
        InputSource::Text { value } => meets_min_length(value),
        InputSource::File { file } => file.is_some(),
    }
}

pub fn can_optimize(optimize_input: &str) -> bool {
    meets_min_length(optimize_input)
}

pub fn evaluate(session: &Session) -> Readiness {
    Readiness {
        can_detect: can_detect(&session.input),
        can_optimize: can_optimize(&session.optimize_input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{set_file_input, set_text_input, FileDescriptor, FileTicket, SourceKind};

    #[test]
    fn text_gate_flips_at_fifty_chars() {
        for len in 0..50 {
            assert!(!can_detect(&set_text_input("a".repeat(len))), "len {len}");
        }
        for len in [50, 51, 1000] {
            assert!(can_detect(&set_text_input("a".repeat(len))), "len {len}");
        }
    }

    #[test]
    fn file_gate_needs_an_attachment_only() {
        assert!(!can_detect(&InputSource::empty(SourceKind::File)));

        let attached =
            set_file_input(FileDescriptor::guessed("thesis.pdf", 10), FileTicket(1)).unwrap();
        assert!(can_detect(&InputSource::File {
            file: Some(attached)
        }));
    }

    #[test]
    fn optimize_gate_is_independent_of_detection_input() {
        let mut session = Session::default();
        session.optimize_input = "b".repeat(50);
        let readiness = evaluate(&session);
        assert!(!readiness.can_detect);
        assert!(readiness.can_optimize);
    }
}
