use serde::{Deserialize, Serialize};

use crate::detection::DetectionResult;
use crate::input::{
    set_file_input, Extraction, FileDescriptor, FileHandle, FileTicket, InputSource, SourceKind,
    ValidationError,
};
use crate::notifications::NotificationLevel;
use crate::optimize::{OptimizationError, OptimizationResult};
use crate::utils::text::meets_min_length;

pub const MSG_DETECTION_FAILED: &str = "An error occurred during detection, please try again later";
pub const MSG_EXTRACTION_UNSUPPORTED: &str =
    "Text extraction for this file type is under development, please use text input instead";
pub const MSG_FILE_STILL_READING: &str = "The file is still being read, please try again in a moment";
pub const MSG_NO_FILE: &str = "Please choose a file first";
pub const MSG_NEED_TEXT_FOR_OPTIMIZE: &str =
    "Please run a detection first or enter enough text to optimize";
pub const MSG_OPTIMIZED: &str = "Text optimization complete!";
pub const MSG_NOTHING_TO_COPY: &str = "Nothing to copy";
pub const MSG_COPIED: &str = "Copied to clipboard";
pub const MSG_COPY_FAILED: &str = "Copy failed, please select and copy the text manually";
pub const MSG_NOTHING_TO_DOWNLOAD: &str = "Nothing to download";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowState {
    #[default]
    Input,
    Detecting,
    Results,
    OptimizeInput,
    Optimizing,
    Optimized,
}

impl WorkflowState {
    pub const ALL: [WorkflowState; 6] = [
        WorkflowState::Input,
        WorkflowState::Detecting,
        WorkflowState::Results,
        WorkflowState::OptimizeInput,
        WorkflowState::Optimizing,
        WorkflowState::Optimized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Input => "input",
            WorkflowState::Detecting => "detecting",
            WorkflowState::Results => "results",
            WorkflowState::OptimizeInput => "optimizeInput",
            WorkflowState::Optimizing => "optimizing",
            WorkflowState::Optimized => "optimized",
        }
    }

    /// Waiting on an async completion.
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowState::Detecting | WorkflowState::Optimizing)
    }
}

/// Identity of one detection or optimization request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// The whole session record. Each transition yields a new value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub state: WorkflowState,
    pub input: InputSource,
    pub pending_detection: Option<RequestId>,
    pub detection: Option<DetectionResult>,
    pub optimize_input: String,
    pub pending_optimization: Option<RequestId>,
    pub optimization: Option<OptimizationResult>,
    /// Source of request ids and file tickets; survives resets so a late
    /// completion can never match a new request.
    #[serde(skip)]
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn reset(self) -> Self {
        Self {
            next_id: self.next_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SwitchTab(SourceKind),
    EditText(String),
    AttachFile {
        descriptor: FileDescriptor,
        handle: FileHandle,
    },
    RemoveFile,
    FileRead {
        ticket: FileTicket,
        outcome: Result<String, String>,
    },
    SubmitDetection,
    DetectionCompleted {
        request: RequestId,
        outcome: Result<DetectionResult, String>,
    },
    RequestOptimize,
    EditOptimizeText(String),
    SubmitOptimization,
    OptimizationCompleted {
        request: RequestId,
        outcome: Result<OptimizationResult, OptimizationError>,
    },
    BackToResults,
    CopyOptimized,
    /// The surface's answer to a `CopyToClipboard` effect.
    ClipboardResult(Result<(), String>),
    ExportOptimized,
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SwitchTab(_) => "switch-tab",
            Event::EditText(_) => "edit-text",
            Event::AttachFile { .. } => "attach-file",
            Event::RemoveFile => "remove-file",
            Event::FileRead { .. } => "file-read",
            Event::SubmitDetection => "submit-detection",
            Event::DetectionCompleted { .. } => "detection-completed",
            Event::RequestOptimize => "request-optimize",
            Event::EditOptimizeText(_) => "edit-optimize-text",
            Event::SubmitOptimization => "submit-optimization",
            Event::OptimizationCompleted { .. } => "optimization-completed",
            Event::BackToResults => "back-to-results",
            Event::CopyOptimized => "copy-optimized",
            Event::ClipboardResult(_) => "clipboard-result",
            Event::ExportOptimized => "export-optimized",
            Event::Reset => "reset",
        }
    }
}

/// Side effects the controller runs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReadFile {
        ticket: FileTicket,
        handle: FileHandle,
    },
    StartDetection {
        request: RequestId,
        text: String,
    },
    StartOptimization {
        request: RequestId,
        text: String,
    },
    Notify {
        level: NotificationLevel,
        message: String,
    },
    CopyToClipboard {
        text: String,
    },
    ExportText {
        text: String,
    },
}

impl Effect {
    fn notify(level: NotificationLevel, message: impl Into<String>) -> Self {
        Effect::Notify {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
    /// The event was illegal in this state or referred to a stale request.
    pub ignored: bool,
}

impl Transition {
    fn to(session: Session) -> Self {
        Self {
            session,
            effects: Vec::new(),
            ignored: false,
        }
    }

    fn with(session: Session, effect: Effect) -> Self {
        Self {
            session,
            effects: vec![effect],
            ignored: false,
        }
    }

    fn notifying(session: Session, level: NotificationLevel, message: impl Into<String>) -> Self {
        Self::with(session, Effect::notify(level, message))
    }

    fn ignore(session: Session) -> Self {
        Self {
            session,
            effects: Vec::new(),
            ignored: true,
        }
    }
}

/// What a detection submit would run on, or why it cannot run.
enum DetectionInput {
    Ready(String),
    Refused(NotificationLevel, String),
}

fn resolve_detection_input(input: &InputSource) -> DetectionInput {
    let text = match input {
        InputSource::Text { value } => value.as_str(),
        InputSource::File { file: None } => {
            return DetectionInput::Refused(NotificationLevel::Warning, MSG_NO_FILE.into())
        }
        InputSource::File { file: Some(file) } => match &file.extraction {
            Extraction::Ready(text) => text.as_str(),
            Extraction::Pending => {
                return DetectionInput::Refused(
                    NotificationLevel::Info,
                    MSG_FILE_STILL_READING.into(),
                )
            }
            Extraction::Failed(_) | Extraction::Unsupported => {
                return DetectionInput::Refused(
                    NotificationLevel::Info,
                    MSG_EXTRACTION_UNSUPPORTED.into(),
                )
            }
        },
    };

    if meets_min_length(text) {
        DetectionInput::Ready(text.to_string())
    } else {
        DetectionInput::Refused(
            NotificationLevel::Error,
            ValidationError::TextTooShort.to_string(),
        )
    }
}

/// Pure transition function: `(session, event) -> (session', effects)`.
pub fn reduce(session: Session, event: Event) -> Transition {
    use WorkflowState as S;

    if let Event::Reset = event {
        return Transition::to(session.reset());
    }

    match (session.state, event) {
        (S::Input, Event::SwitchTab(kind)) => {
            if session.input.kind() == kind {
                return Transition::to(session);
            }
            Transition::to(Session {
                input: InputSource::empty(kind),
                ..session
            })
        }

        (S::Input, Event::EditText(value)) => match session.input {
            InputSource::Text { .. } => Transition::to(Session {
                input: InputSource::Text { value },
                ..session
            }),
            InputSource::File { .. } => Transition::ignore(session),
        },

        (S::Input, Event::AttachFile { descriptor, handle }) => {
            if session.input.kind() != SourceKind::File {
                return Transition::ignore(session);
            }
            let mut next = session;
            let ticket = FileTicket(next.issue_id());
            match set_file_input(descriptor, ticket) {
                Ok(attached) => {
                    let needs_read = attached.extraction == Extraction::Pending;
                    next.input = InputSource::File {
                        file: Some(attached),
                    };
                    if needs_read {
                        Transition::with(next, Effect::ReadFile { ticket, handle })
                    } else {
                        Transition::to(next)
                    }
                }
                Err(err) => Transition::notifying(next, NotificationLevel::Error, err.to_string()),
            }
        }

        (S::Input, Event::RemoveFile) => match session.input {
            InputSource::File { .. } => Transition::to(Session {
                input: InputSource::File { file: None },
                ..session
            }),
            InputSource::Text { .. } => Transition::ignore(session),
        },

        (_, Event::FileRead { ticket, outcome }) => {
            let mut next = session;
            let landed = match &mut next.input {
                InputSource::File { file: Some(file) }
                    if file.ticket == ticket && file.extraction == Extraction::Pending =>
                {
                    file.extraction = match outcome {
                        Ok(text) => Extraction::Ready(text),
                        Err(reason) => Extraction::Failed(reason),
                    };
                    true
                }
                _ => false,
            };
            if landed {
                Transition::to(next)
            } else {
                Transition::ignore(next)
            }
        }

        (S::Input, Event::SubmitDetection) => {
            if session.pending_detection.is_some() {
                return Transition::ignore(session);
            }
            match resolve_detection_input(&session.input) {
                DetectionInput::Refused(level, message) => {
                    Transition::notifying(session, level, message)
                }
                DetectionInput::Ready(text) => {
                    let mut next = session;
                    let request = RequestId(next.issue_id());
                    next.state = S::Detecting;
                    next.pending_detection = Some(request);
                    next.detection = None;
                    Transition::with(next, Effect::StartDetection { request, text })
                }
            }
        }

        (S::Detecting, Event::DetectionCompleted { request, outcome }) => {
            if session.pending_detection != Some(request) {
                return Transition::ignore(session);
            }
            let mut next = session;
            next.pending_detection = None;
            match outcome {
                Ok(result) => {
                    next.state = S::Results;
                    next.detection = Some(result);
                    Transition::to(next)
                }
                Err(_) => {
                    next.state = S::Input;
                    next.detection = None;
                    Transition::notifying(next, NotificationLevel::Error, MSG_DETECTION_FAILED)
                }
            }
        }

        (S::Results, Event::RequestOptimize) => {
            let text = session
                .input
                .canonical_text()
                .filter(|text| meets_min_length(text))
                .map(str::to_string);
            match text {
                Some(text) => Transition::to(Session {
                    state: S::OptimizeInput,
                    optimize_input: text,
                    ..session
                }),
                None => Transition::notifying(
                    session,
                    NotificationLevel::Warning,
                    MSG_NEED_TEXT_FOR_OPTIMIZE,
                ),
            }
        }

        (S::OptimizeInput, Event::EditOptimizeText(value)) => Transition::to(Session {
            optimize_input: value,
            ..session
        }),

        (S::OptimizeInput, Event::SubmitOptimization) => {
            if session.pending_optimization.is_some() {
                return Transition::ignore(session);
            }
            let text = session.optimize_input.trim();
            if !meets_min_length(text) {
                return Transition::notifying(
                    session,
                    NotificationLevel::Error,
                    ValidationError::TextTooShort.to_string(),
                );
            }
            let text = text.to_string();
            let mut next = session;
            let request = RequestId(next.issue_id());
            next.state = S::Optimizing;
            next.pending_optimization = Some(request);
            next.optimization = None;
            Transition::with(next, Effect::StartOptimization { request, text })
        }

        (S::Optimizing, Event::OptimizationCompleted { request, outcome }) => {
            if session.pending_optimization != Some(request) {
                return Transition::ignore(session);
            }
            let mut next = session;
            next.pending_optimization = None;
            match outcome {
                Ok(result) => {
                    next.state = S::Optimized;
                    next.optimization = Some(result);
                    Transition::notifying(next, NotificationLevel::Success, MSG_OPTIMIZED)
                }
                Err(err) => {
                    next.state = S::OptimizeInput;
                    Transition::notifying(next, NotificationLevel::Error, err.user_message())
                }
            }
        }

        (S::OptimizeInput | S::Optimized, Event::BackToResults) => Transition::to(Session {
            state: S::Results,
            ..session
        }),

        (S::Optimized, Event::CopyOptimized) => match optimized_text(&session) {
            Some(text) => Transition::with(session, Effect::CopyToClipboard { text }),
            None => Transition::notifying(session, NotificationLevel::Warning, MSG_NOTHING_TO_COPY),
        },

        (_, Event::ClipboardResult(outcome)) => match outcome {
            Ok(()) => Transition::notifying(session, NotificationLevel::Success, MSG_COPIED),
            Err(_) => Transition::notifying(session, NotificationLevel::Error, MSG_COPY_FAILED),
        },

        (S::Optimized, Event::ExportOptimized) => match optimized_text(&session) {
            Some(text) => Transition::with(session, Effect::ExportText { text }),
            None => Transition::notifying(
                session,
                NotificationLevel::Warning,
                MSG_NOTHING_TO_DOWNLOAD,
            ),
        },

        (_, _) => Transition::ignore(session),
    }
}

fn optimized_text(session: &Session) -> Option<String> {
    session
        .optimization
        .as_ref()
        .map(|result| result.optimized_text.clone())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file::MIME_TEXT_PLAIN;
    use chrono::Utc;
    use std::path::PathBuf;

    fn long_text() -> String {
        "This paragraph is long enough to pass the fifty character gate easily.".to_string()
    }

    fn detection_result() -> DetectionResult {
        DetectionResult {
            ai_probability: 57,
            human_score: 35,
            machine_score: 43,
            humanized_score: 13,
            polished_score: 9,
            text_length: 70,
            word_count: 12,
            timestamp: Utc::now(),
        }
    }

    fn step(session: Session, event: Event) -> Transition {
        reduce(session, event)
    }

    fn only_notification(transition: &Transition) -> (NotificationLevel, String) {
        match transition.effects.as_slice() {
            [Effect::Notify { level, message }] => (*level, message.clone()),
            other => panic!("expected a single notification, got {other:?}"),
        }
    }

    fn in_results() -> Session {
        let s = step(Session::new(), Event::EditText(long_text())).session;
        let t = step(s, Event::SubmitDetection);
        let Effect::StartDetection { request, .. } = t.effects[0].clone() else {
            panic!("expected detection start");
        };
        step(
            t.session,
            Event::DetectionCompleted {
                request,
                outcome: Ok(detection_result()),
            },
        )
        .session
    }

    fn in_optimizing() -> (Session, RequestId) {
        let s = step(in_results(), Event::RequestOptimize).session;
        let t = step(s, Event::SubmitOptimization);
        let Effect::StartOptimization { request, .. } = t.effects[0].clone() else {
            panic!("expected optimization start");
        };
        (t.session, request)
    }

    fn in_optimized() -> Session {
        let (s, request) = in_optimizing();
        step(
            s,
            Event::OptimizationCompleted {
                request,
                outcome: Ok(OptimizationResult {
                    optimized_text: "Rewritten text.".into(),
                    improvements: vec!["Shorter sentences".into()],
                }),
            },
        )
        .session
    }

    fn session_in(state: WorkflowState) -> Session {
        match state {
            WorkflowState::Input => Session::new(),
            WorkflowState::Detecting => {
                let s = step(Session::new(), Event::EditText(long_text())).session;
                step(s, Event::SubmitDetection).session
            }
            WorkflowState::Results => in_results(),
            WorkflowState::OptimizeInput => step(in_results(), Event::RequestOptimize).session,
            WorkflowState::Optimizing => in_optimizing().0,
            WorkflowState::Optimized => in_optimized(),
        }
    }

    fn attach_plain(session: Session, name: &str) -> (Session, FileTicket) {
        let descriptor = FileDescriptor::new(name, 100, MIME_TEXT_PLAIN);
        let t = step(
            session,
            Event::AttachFile {
                descriptor,
                handle: FileHandle::Path(PathBuf::from(name)),
            },
        );
        let Effect::ReadFile { ticket, .. } = t.effects[0].clone() else {
            panic!("expected a file read");
        };
        (t.session, ticket)
    }

    #[test]
    fn helper_states_are_what_they_claim() {
        for state in WorkflowState::ALL {
            assert_eq!(session_in(state).state, state);
        }
    }

    #[test]
    fn short_text_submit_is_refused_in_place() {
        let s = step(Session::new(), Event::EditText("too short".into())).session;
        let t = step(s.clone(), Event::SubmitDetection);
        assert_eq!(t.session, s);
        let (level, message) = only_notification(&t);
        assert_eq!(level, NotificationLevel::Error);
        assert_eq!(message, ValidationError::TextTooShort.to_string());
    }

    #[test]
    fn valid_submit_starts_detection() {
        let s = step(Session::new(), Event::EditText(long_text())).session;
        let t = step(s, Event::SubmitDetection);
        assert_eq!(t.session.state, WorkflowState::Detecting);
        assert!(t.session.pending_detection.is_some());
        assert!(matches!(
            &t.effects[..],
            [Effect::StartDetection { text, .. }] if *text == long_text()
        ));
    }

    #[test]
    fn detection_failure_reverts_to_input() {
        let s = session_in(WorkflowState::Detecting);
        let request = s.pending_detection.unwrap();
        let t = step(
            s,
            Event::DetectionCompleted {
                request,
                outcome: Err("engine down".into()),
            },
        );
        assert_eq!(t.session.state, WorkflowState::Input);
        assert!(t.session.detection.is_none());
        assert!(t.session.pending_detection.is_none());
        assert_eq!(
            only_notification(&t),
            (NotificationLevel::Error, MSG_DETECTION_FAILED.to_string())
        );
        // the typed text is still there for a retry
        assert_eq!(t.session.input.canonical_text(), Some(long_text().as_str()));
    }

    #[test]
    fn request_optimize_from_input_is_ignored() {
        let s = Session::new();
        let t = step(s.clone(), Event::RequestOptimize);
        assert!(t.ignored);
        assert_eq!(t.session, s);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn submit_detection_from_results_is_ignored() {
        let s = in_results();
        let t = step(s.clone(), Event::SubmitDetection);
        assert!(t.ignored);
        assert_eq!(t.session, s);
    }

    #[test]
    fn reset_from_every_state_lands_in_input() {
        for state in WorkflowState::ALL {
            let t = step(session_in(state), Event::Reset);
            assert_eq!(t.session.state, WorkflowState::Input, "from {state:?}");
            assert_eq!(t.session.input, InputSource::default());
            assert!(t.session.detection.is_none());
            assert!(t.session.optimization.is_none());
            assert!(t.session.optimize_input.is_empty());
            assert!(!t.ignored);
        }
    }

    #[test]
    fn late_detection_after_reset_is_discarded() {
        let s = session_in(WorkflowState::Detecting);
        let request = s.pending_detection.unwrap();
        let s = step(s, Event::Reset).session;
        let t = step(
            s.clone(),
            Event::DetectionCompleted {
                request,
                outcome: Ok(detection_result()),
            },
        );
        assert!(t.ignored);
        assert_eq!(t.session, s);
    }

    #[test]
    fn switching_tabs_discards_the_other_source() {
        let s = step(Session::new(), Event::EditText(long_text())).session;
        let s = step(s, Event::SwitchTab(SourceKind::File)).session;
        assert_eq!(s.input, InputSource::File { file: None });

        let (s, _) = attach_plain(s, "essay.txt");
        let s = step(s, Event::SwitchTab(SourceKind::Text)).session;
        assert_eq!(s.input, InputSource::default());
    }

    #[test]
    fn rejected_file_keeps_previous_attachment() {
        let s = step(Session::new(), Event::SwitchTab(SourceKind::File)).session;
        let (s, _) = attach_plain(s, "essay.txt");
        let t = step(
            s.clone(),
            Event::AttachFile {
                descriptor: FileDescriptor::new("virus.exe", 10, "application/octet-stream"),
                handle: FileHandle::Path(PathBuf::from("virus.exe")),
            },
        );
        assert_eq!(t.session.input, s.input);
        assert_eq!(
            only_notification(&t),
            (
                NotificationLevel::Error,
                ValidationError::UnsupportedFormat.to_string()
            )
        );
    }

    #[test]
    fn stale_file_read_never_lands() {
        let s = step(Session::new(), Event::SwitchTab(SourceKind::File)).session;
        let (s, ticket_a) = attach_plain(s, "a.txt");
        let (s, ticket_b) = attach_plain(s, "b.txt");
        assert_ne!(ticket_a, ticket_b);

        let t = step(
            s,
            Event::FileRead {
                ticket: ticket_a,
                outcome: Ok("content of A".into()),
            },
        );
        assert!(t.ignored);
        let file = t.session.input.attached_file().unwrap();
        assert_eq!(file.descriptor.name, "b.txt");
        assert_eq!(file.extraction, Extraction::Pending);

        let s = step(
            t.session,
            Event::FileRead {
                ticket: ticket_b,
                outcome: Ok("content of B".into()),
            },
        )
        .session;
        assert_eq!(s.input.canonical_text(), Some("content of B"));
    }

    #[test]
    fn file_submit_outcomes() {
        let s = step(Session::new(), Event::SwitchTab(SourceKind::File)).session;
        let t = step(s.clone(), Event::SubmitDetection);
        assert_eq!(only_notification(&t).1, MSG_NO_FILE);

        let (s, ticket) = attach_plain(s, "a.txt");
        let t = step(s.clone(), Event::SubmitDetection);
        assert_eq!(
            only_notification(&t),
            (NotificationLevel::Info, MSG_FILE_STILL_READING.to_string())
        );

        let failed = step(
            s.clone(),
            Event::FileRead {
                ticket,
                outcome: Err("io".into()),
            },
        )
        .session;
        let t = step(failed, Event::SubmitDetection);
        assert_eq!(
            only_notification(&t),
            (NotificationLevel::Info, MSG_EXTRACTION_UNSUPPORTED.to_string())
        );

        let ready = step(
            s,
            Event::FileRead {
                ticket,
                outcome: Ok(long_text()),
            },
        )
        .session;
        let t = step(ready, Event::SubmitDetection);
        assert_eq!(t.session.state, WorkflowState::Detecting);
    }

    #[test]
    fn pdf_upload_reports_extraction_unsupported_and_keeps_file() {
        let s = step(Session::new(), Event::SwitchTab(SourceKind::File)).session;
        let t = step(
            s,
            Event::AttachFile {
                descriptor: FileDescriptor::guessed("paper.pdf", 2_000),
                handle: FileHandle::Path(PathBuf::from("paper.pdf")),
            },
        );
        assert!(t.effects.is_empty(), "no read for non-plain files");
        let t = step(t.session, Event::SubmitDetection);
        assert_eq!(t.session.state, WorkflowState::Input);
        assert!(t.session.input.attached_file().is_some());
        assert_eq!(only_notification(&t).0, NotificationLevel::Info);
    }

    #[test]
    fn request_optimize_prefills_from_detected_text() {
        let s = step(in_results(), Event::RequestOptimize).session;
        assert_eq!(s.state, WorkflowState::OptimizeInput);
        assert_eq!(s.optimize_input, long_text());
    }

    #[test]
    fn short_optimize_text_is_refused_before_any_request() {
        let s = session_in(WorkflowState::OptimizeInput);
        let s = step(s, Event::EditOptimizeText("short".into())).session;
        let t = step(s.clone(), Event::SubmitOptimization);
        assert_eq!(t.session, s);
        assert!(!t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::StartOptimization { .. })));
        assert_eq!(only_notification(&t).1, ValidationError::TextTooShort.to_string());
    }

    #[test]
    fn optimize_text_is_trimmed_before_checking() {
        let s = session_in(WorkflowState::OptimizeInput);
        let padded = format!("   {}   ", "x".repeat(48));
        let s = step(s, Event::EditOptimizeText(padded)).session;
        let t = step(s, Event::SubmitOptimization);
        assert_eq!(t.session.state, WorkflowState::OptimizeInput);
    }

    #[test]
    fn rejected_optimization_returns_to_optimize_input() {
        let (s, request) = in_optimizing();
        let t = step(
            s,
            Event::OptimizationCompleted {
                request,
                outcome: Err(OptimizationError::Rejected("rate limited".into())),
            },
        );
        assert_eq!(t.session.state, WorkflowState::OptimizeInput);
        assert!(t.session.pending_optimization.is_none());
        assert_eq!(
            only_notification(&t),
            (NotificationLevel::Error, "rate limited".to_string())
        );
    }

    #[test]
    fn back_to_results_keeps_optimization() {
        let s = in_optimized();
        let s = step(s, Event::BackToResults).session;
        assert_eq!(s.state, WorkflowState::Results);
        assert!(s.optimization.is_some());
        assert!(s.detection.is_some());
    }

    #[test]
    fn copy_and_export_need_text() {
        let s = in_optimized();
        let t = step(s.clone(), Event::ExportOptimized);
        assert!(matches!(&t.effects[..], [Effect::ExportText { text }] if text == "Rewritten text."));

        let mut empty = s;
        empty.optimization = Some(OptimizationResult {
            optimized_text: String::new(),
            improvements: vec![],
        });
        let t = step(empty, Event::CopyOptimized);
        assert_eq!(only_notification(&t).1, MSG_NOTHING_TO_COPY);
    }

    #[test]
    fn input_edits_are_ignored_outside_input() {
        let s = in_results();
        let t = step(s.clone(), Event::EditText("changed".into()));
        assert!(t.ignored);
        assert_eq!(t.session, s);
    }

    #[test]
    fn back_to_results_from_optimize_input_keeps_draft() {
        let s = step(in_results(), Event::RequestOptimize).session;
        let s = step(s, Event::EditOptimizeText("a draft still being edited".into())).session;
        let t = step(s, Event::BackToResults);
        assert!(!t.ignored);
        assert!(t.effects.is_empty());
        assert_eq!(t.session.state, WorkflowState::Results);
        assert_eq!(t.session.optimize_input, "a draft still being edited");
        assert!(t.session.detection.is_some());
    }

    #[test]
    fn second_detection_submit_while_detecting_is_ignored() {
        let s = session_in(WorkflowState::Detecting);
        let pending = s.pending_detection;
        let t = step(s.clone(), Event::SubmitDetection);
        assert!(t.ignored);
        assert!(t.effects.is_empty());
        assert_eq!(t.session, s);
        assert_eq!(t.session.pending_detection, pending);
    }

    #[test]
    fn second_optimization_submit_while_optimizing_is_ignored() {
        let (s, request) = in_optimizing();
        let t = step(s.clone(), Event::SubmitOptimization);
        assert!(t.ignored);
        assert!(t.effects.is_empty());
        assert_eq!(t.session.pending_optimization, Some(request));
    }

    #[test]
    fn pending_request_guards_refuse_a_second_start() {
        let mut s = step(Session::new(), Event::EditText(long_text())).session;
        s.pending_detection = Some(RequestId(99));
        let t = step(s, Event::SubmitDetection);
        assert!(t.ignored);
        assert!(t.effects.is_empty());

        let mut s = step(in_results(), Event::RequestOptimize).session;
        s.pending_optimization = Some(RequestId(99));
        let t = step(s, Event::SubmitOptimization);
        assert!(t.ignored);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn copy_emits_effect_and_waits_for_the_surface() {
        let s = in_optimized();
        let t = step(s, Event::CopyOptimized);
        assert!(matches!(
            &t.effects[..],
            [Effect::CopyToClipboard { text }] if text == "Rewritten text."
        ));

        let ok = step(t.session.clone(), Event::ClipboardResult(Ok(())));
        assert_eq!(
            only_notification(&ok),
            (NotificationLevel::Success, MSG_COPIED.to_string())
        );

        let failed = step(t.session, Event::ClipboardResult(Err("denied".into())));
        assert_eq!(
            only_notification(&failed),
            (NotificationLevel::Error, MSG_COPY_FAILED.to_string())
        );
        assert_eq!(failed.session.state, WorkflowState::Optimized);
    }
}
