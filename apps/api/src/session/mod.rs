//! Session model: one record per user, tagged by the active mode.
//!
//! The mode-specific buffers live inside `Flow`, so a session can only ever
//! hold the buffers of the mode it is in. Entering a mode replaces the whole
//! `Flow` value, which is what keeps stale fields from leaking across modes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod store;

pub use store::{SessionGuard, SessionStore};

/// Stable identifier of the person on the other end of the transport.
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    None,
    CoverLetter,
    Resume,
    Interview,
    Parser,
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoverLetterPhase {
    #[default]
    AwaitResume,
    AwaitProfession,
    AwaitCompany,
    AwaitDescription,
    Generate,
    Terminal,
}

impl CoverLetterPhase {
    pub fn label(self) -> &'static str {
        match self {
            CoverLetterPhase::AwaitResume => "await_resume",
            CoverLetterPhase::AwaitProfession => "await_profession",
            CoverLetterPhase::AwaitCompany => "await_company",
            CoverLetterPhase::AwaitDescription => "await_description",
            CoverLetterPhase::Generate => "generate",
            CoverLetterPhase::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoverLetterState {
    pub phase: CoverLetterPhase,
    pub resume_text: String,
    pub profession: String,
    pub company: String,
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

/// One of the three adaptive sub-steps of a project sub-dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Project description.
    X,
    /// Tools used.
    Y,
    /// Outcome and impact.
    Z,
}

impl Stage {
    /// The fixed question that opens this stage.
    pub fn opening_question(self) -> &'static str {
        match self {
            Stage::X => {
                "Tell me about one of your projects. Describe it and explain what you did in it."
            }
            Stage::Y => "What tools did you use to build this project?",
            Stage::Z => "What did this project lead to? Can its success be measured somehow?",
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::X => Some(Stage::Y),
            Stage::Y => Some(Stage::Z),
            Stage::Z => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumePhase {
    #[default]
    AwaitName,
    AwaitSummary,
    ProjectLoop(Stage),
    /// Yes/no selection: describe another project?
    AwaitAnotherProject,
    AwaitAchievements,
    AwaitSkills,
    Compile,
    Terminal,
}

impl ResumePhase {
    pub fn label(self) -> &'static str {
        match self {
            ResumePhase::AwaitName => "await_name",
            ResumePhase::AwaitSummary => "await_summary",
            ResumePhase::ProjectLoop(Stage::X) => "project_loop_x",
            ResumePhase::ProjectLoop(Stage::Y) => "project_loop_y",
            ResumePhase::ProjectLoop(Stage::Z) => "project_loop_z",
            ResumePhase::AwaitAnotherProject => "await_another_project",
            ResumePhase::AwaitAchievements => "await_achievements",
            ResumePhase::AwaitSkills => "await_skills",
            ResumePhase::Compile => "compile",
            ResumePhase::Terminal => "terminal",
        }
    }
}

/// A numbered question with the user's answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    pub number: u32,
    pub question: String,
    pub answer: String,
}

/// A question that has been sent and is awaiting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub number: u32,
    pub text: String,
}

/// Renders pairs as the plain-text dialogue fed into prompts.
pub fn render_pairs(pairs: &[QaPair]) -> String {
    pairs
        .iter()
        .map(|p| format!("Question #{}: {}\nAnswer: {}\n\n", p.number, p.question, p.answer))
        .collect()
}

/// Sealed record of one completed project sub-dialogue.
///
/// Built only by `ProjectDraft::seal`; exposes no mutating API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTranscript {
    pairs: Vec<QaPair>,
}

impl ProjectTranscript {
    pub fn pairs(&self) -> &[QaPair] {
        &self.pairs
    }

    pub fn render(&self) -> String {
        render_pairs(&self.pairs)
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: Vec<QaPair>) -> Self {
        Self { pairs }
    }
}

/// The project currently being described.
///
/// `transcript` spans all stages; `stage_buffer` holds only the pairs of the
/// current stage and is what grading and follow-up generation see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub transcript: Vec<QaPair>,
    pub stage_buffer: Vec<QaPair>,
    pub pending: PendingQuestion,
    pub follow_ups_in_stage: u32,
}

impl ProjectDraft {
    /// A fresh draft whose pending question is stage X's opening question (#1).
    pub fn start() -> Self {
        Self {
            transcript: Vec::new(),
            stage_buffer: Vec::new(),
            pending: PendingQuestion {
                number: 1,
                text: Stage::X.opening_question().to_string(),
            },
            follow_ups_in_stage: 0,
        }
    }

    /// Pairs the pending question with `answer` without recording it.
    pub fn answer_pending(&self, answer: String) -> QaPair {
        QaPair {
            number: self.pending.number,
            question: self.pending.text.clone(),
            answer,
        }
    }

    /// The current stage buffer rendered as if `pair` were already recorded.
    pub fn stage_text_with(&self, pair: &QaPair) -> String {
        let mut text = render_pairs(&self.stage_buffer);
        text.push_str(&render_pairs(std::slice::from_ref(pair)));
        text
    }

    /// Appends an answered pair to both the transcript and the stage buffer.
    pub fn record(&mut self, pair: QaPair) {
        self.stage_buffer.push(pair.clone());
        self.transcript.push(pair);
    }

    pub fn ask_follow_up(&mut self, number: u32, question: String) {
        self.follow_ups_in_stage += 1;
        self.pending = PendingQuestion {
            number,
            text: question,
        };
    }

    pub fn enter_stage(&mut self, stage: Stage, number: u32) {
        self.stage_buffer.clear();
        self.follow_ups_in_stage = 0;
        self.pending = PendingQuestion {
            number,
            text: stage.opening_question().to_string(),
        };
    }

    /// Seals the transcript and resets the draft for the next project.
    pub fn seal(&mut self) -> ProjectTranscript {
        let finished = std::mem::replace(self, ProjectDraft::start());
        ProjectTranscript {
            pairs: finished.transcript,
        }
    }
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self::start()
    }
}

#[derive(Debug, Clone)]
pub struct ResumeState {
    pub phase: ResumePhase,
    pub name: String,
    pub summary: String,
    pub achievements: String,
    pub skills: String,
    /// Number of the most recently asked project question; restarts at 1 per project.
    pub question_index: u32,
    pub draft: ProjectDraft,
    pub projects: Vec<ProjectTranscript>,
}

impl Default for ResumeState {
    fn default() -> Self {
        Self {
            phase: ResumePhase::default(),
            name: String::new(),
            summary: String::new(),
            achievements: String::new(),
            skills: String::new(),
            question_index: 1,
            draft: ProjectDraft::start(),
            projects: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interview
// ────────────────────────────────────────────────────────────────────────────

/// Number of questions generated for a mock interview.
pub const INTERVIEW_QUESTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterviewPhase {
    #[default]
    AwaitResume,
    AwaitVacancy,
    GenerateQuestions,
    /// Awaiting the answer to question `n` (1-based).
    Answer(usize),
    Analyze,
    Terminal,
}

impl InterviewPhase {
    pub fn label(self) -> &'static str {
        match self {
            InterviewPhase::AwaitResume => "await_resume",
            InterviewPhase::AwaitVacancy => "await_vacancy",
            InterviewPhase::GenerateQuestions => "generate_questions",
            InterviewPhase::Answer(1) => "answer_1",
            InterviewPhase::Answer(2) => "answer_2",
            InterviewPhase::Answer(_) => "answer_3",
            InterviewPhase::Analyze => "analyze",
            InterviewPhase::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterviewState {
    pub phase: InterviewPhase,
    pub resume_text: String,
    pub vacancy_text: String,
    /// The numbered question list exactly as generated.
    pub questions: String,
    pub answers: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Vacancy search
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VacancySearchPhase {
    #[default]
    AwaitQuery,
    Search,
    Terminal,
}

impl VacancySearchPhase {
    pub fn label(self) -> &'static str {
        match self {
            VacancySearchPhase::AwaitQuery => "await_query",
            VacancySearchPhase::Search => "search",
            VacancySearchPhase::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VacancySearchState {
    pub phase: VacancySearchPhase,
    pub query: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// Mode-tagged buffers of the active flow.
#[derive(Debug, Clone, Default)]
pub enum Flow {
    #[default]
    Idle,
    CoverLetter(CoverLetterState),
    Resume(ResumeState),
    Interview(InterviewState),
    Vacancies(VacancySearchState),
}

impl Flow {
    /// The initial phase and empty buffers of `mode`.
    pub fn initial(mode: Mode) -> Self {
        match mode {
            Mode::None => Flow::Idle,
            Mode::CoverLetter => Flow::CoverLetter(CoverLetterState::default()),
            Mode::Resume => Flow::Resume(ResumeState::default()),
            Mode::Interview => Flow::Interview(InterviewState::default()),
            Mode::Parser => Flow::Vacancies(VacancySearchState::default()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Flow::Idle => Mode::None,
            Flow::CoverLetter(_) => Mode::CoverLetter,
            Flow::Resume(_) => Mode::Resume,
            Flow::Interview(_) => Mode::Interview,
            Flow::Vacancies(_) => Mode::Parser,
        }
    }

    pub fn phase_label(&self) -> &'static str {
        match self {
            Flow::Idle => "main_menu",
            Flow::CoverLetter(s) => s.phase.label(),
            Flow::Resume(s) => s.phase.label(),
            Flow::Interview(s) => s.phase.label(),
            Flow::Vacancies(s) => s.phase.label(),
        }
    }

    /// Whether the flow has finished and the user may pick another mode.
    pub fn is_terminal(&self) -> bool {
        match self {
            Flow::Idle => true,
            Flow::CoverLetter(s) => s.phase == CoverLetterPhase::Terminal,
            Flow::Resume(s) => s.phase == ResumePhase::Terminal,
            Flow::Interview(s) => s.phase == InterviewPhase::Terminal,
            Flow::Vacancies(s) => s.phase == VacancySearchPhase::Terminal,
        }
    }

    pub fn question_index(&self) -> u32 {
        match self {
            Flow::Resume(s) => s.question_index,
            Flow::Interview(s) => s.answers.len() as u32,
            _ => 0,
        }
    }

    pub fn project_count(&self) -> usize {
        match self {
            Flow::Resume(s) => s.projects.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    /// Regenerated on every reset; correlates log records of one flow attempt.
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub flow: Flow,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            flow: Flow::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.flow.mode()
    }

    /// Replaces every buffer with `mode`'s initial state.
    pub fn reset(&mut self, mode: Mode) {
        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.flow = Flow::initial(mode);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user_id: self.user_id,
            session_id: self.session_id,
            mode: self.mode(),
            phase: self.flow.phase_label().to_string(),
            question_index: self.flow.question_index(),
            projects: self.flow.project_count(),
            started_at: self.started_at,
        }
    }
}

/// Read-only view of a session for the inspection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user_id: UserId,
    pub session_id: Uuid,
    pub mode: Mode,
    pub phase: String,
    pub question_index: u32,
    pub projects: usize,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_resume_starts_clean() {
        let mut session = Session::new(1);
        session.reset(Mode::Resume);

        let Flow::Resume(state) = &session.flow else {
            panic!("expected resume flow");
        };
        assert_eq!(state.phase, ResumePhase::AwaitName);
        assert!(state.name.is_empty());
        assert!(state.summary.is_empty());
        assert!(state.projects.is_empty());
        assert!(state.draft.transcript.is_empty());
        assert!(state.draft.stage_buffer.is_empty());
        assert_eq!(state.question_index, 1);
        assert_eq!(state.draft.pending.number, 1);
    }

    #[test]
    fn test_reset_drops_buffers_of_previous_mode() {
        let mut session = Session::new(1);
        session.reset(Mode::CoverLetter);
        if let Flow::CoverLetter(state) = &mut session.flow {
            state.resume_text = "ten years of Rust".into();
            state.company = "Acme".into();
        }

        session.reset(Mode::Interview);
        let Flow::Interview(state) = &session.flow else {
            panic!("expected interview flow");
        };
        assert_eq!(state.phase, InterviewPhase::AwaitResume);
        assert!(state.resume_text.is_empty());
        assert!(state.answers.is_empty());
        assert_eq!(session.flow.question_index(), 0);
    }

    #[test]
    fn test_reset_same_mode_clears_progress() {
        let mut session = Session::new(1);
        session.reset(Mode::Resume);
        if let Flow::Resume(state) = &mut session.flow {
            state.name = "A. Ivanov".into();
            state.question_index = 4;
            state.phase = ResumePhase::AwaitSkills;
        }
        let before = session.session_id;

        session.reset(Mode::Resume);
        let Flow::Resume(state) = &session.flow else {
            panic!("expected resume flow");
        };
        assert!(state.name.is_empty());
        assert_eq!(state.question_index, 1);
        assert_eq!(state.phase, ResumePhase::AwaitName);
        assert_ne!(session.session_id, before);
    }

    #[test]
    fn test_draft_stage_text_includes_unrecorded_pair() {
        let mut draft = ProjectDraft::start();
        let first = draft.answer_pending("A search engine".into());
        draft.record(first);
        draft.ask_follow_up(2, "How big was the index?".into());

        let second = draft.answer_pending("Two million pages".into());
        let text = draft.stage_text_with(&second);
        assert!(text.contains("Question #1: Tell me about one of your projects"));
        assert!(text.contains("Answer: A search engine"));
        assert!(text.contains("Question #2: How big was the index?\nAnswer: Two million pages"));
        assert_eq!(draft.stage_buffer.len(), 1);
    }

    #[test]
    fn test_enter_stage_clears_stage_buffer_only() {
        let mut draft = ProjectDraft::start();
        let pair = draft.answer_pending("A compiler".into());
        draft.record(pair);
        draft.ask_follow_up(2, "Which language?".into());

        draft.enter_stage(Stage::Y, 3);
        assert!(draft.stage_buffer.is_empty());
        assert_eq!(draft.transcript.len(), 1);
        assert_eq!(draft.follow_ups_in_stage, 0);
        assert_eq!(draft.pending.number, 3);
        assert_eq!(draft.pending.text, Stage::Y.opening_question());
    }

    #[test]
    fn test_seal_returns_transcript_and_restarts_draft() {
        let mut draft = ProjectDraft::start();
        let pair = draft.answer_pending("A compiler".into());
        draft.record(pair);

        let sealed = draft.seal();
        assert_eq!(sealed.pairs().len(), 1);
        assert_eq!(sealed.pairs()[0].answer, "A compiler");
        assert_eq!(draft, ProjectDraft::start());
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::X.next(), Some(Stage::Y));
        assert_eq!(Stage::Y.next(), Some(Stage::Z));
        assert_eq!(Stage::Z.next(), None);
    }

    #[test]
    fn test_snapshot_reports_mode_and_phase() {
        let mut session = Session::new(9);
        assert_eq!(session.snapshot().mode, Mode::None);
        assert_eq!(session.snapshot().phase, "main_menu");

        session.reset(Mode::Parser);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.mode, Mode::Parser);
        assert_eq!(snapshot.phase, "await_query");
        assert_eq!(snapshot.user_id, 9);
    }
}
