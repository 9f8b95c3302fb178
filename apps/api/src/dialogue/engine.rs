//! Dialogue Engine: routes each inbound message to the active flow.
//!
//! The user's session lock is held for the whole message, across every
//! collaborator call the flow awaits. Sentinels (main menu, `/start`, restart,
//! mode labels) are checked before any flow sees the message.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use crate::dialogue::menu::{self, Command};
use crate::dialogue::models::{InboundContent, InboundMessage, Replies, Selection};
use crate::dialogue::{cover_letter, interview, resume, vacancy_search};
use crate::documents::{DocumentAssembler, DocumentExtractor};
use crate::job_search::JobSearch;
use crate::llm_client::CompletionClient;
use crate::session::{Flow, Mode, ResumePhase, SessionGuard, SessionStore, UserId};

#[derive(Debug, Clone, Copy)]
pub struct DialogueSettings {
    /// Follow-up questions allowed per project stage before it advances unconditionally.
    pub max_follow_ups: u32,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self { max_follow_ups: 3 }
    }
}

pub struct DialogueEngine {
    sessions: SessionStore,
    pub(super) llm: Arc<dyn CompletionClient>,
    pub(super) extractor: Arc<dyn DocumentExtractor>,
    pub(super) assembler: Arc<dyn DocumentAssembler>,
    pub(super) job_search: Arc<dyn JobSearch>,
    pub(super) settings: DialogueSettings,
}

impl DialogueEngine {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        extractor: Arc<dyn DocumentExtractor>,
        assembler: Arc<dyn DocumentAssembler>,
        job_search: Arc<dyn JobSearch>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            llm,
            extractor,
            assembler,
            job_search,
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle_message(&self, message: InboundMessage) -> Replies {
        let user_id = message.user_id;
        let span = info_span!("message", user_id, kind = message.content.kind());
        async move {
            let mut session = self.sessions.acquire(user_id).await;
            let mut replies = Replies::new();
            self.dispatch(&mut session, message.content, &mut replies).await;
            info!(
                "User {user_id} now in {:?}/{} ({} replies)",
                session.mode(),
                session.flow.phase_label(),
                replies.len()
            );
            replies
        }
        .instrument(span)
        .await
    }

    /// Handles a click on a selection option.
    pub async fn handle_selection(&self, selection: Selection) -> Replies {
        let user_id = selection.user_id;
        let span = info_span!("selection", user_id);
        async move {
            let mut session = self.sessions.acquire(user_id).await;
            let mut replies = Replies::new();
            match &mut session.flow {
                Flow::Resume(state) if state.phase == ResumePhase::AwaitAnotherProject => {
                    resume::handle_choice(user_id, state, &selection.label, &mut replies);
                }
                _ => {
                    info!("Stale selection {:?} from user {user_id}", selection.label);
                    replies.say(menu::CHOICE_EXPIRED);
                }
            }
            replies
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, session: &mut SessionGuard, content: InboundContent, replies: &mut Replies) {
        let user_id = session.user_id();

        if let Some(command) = content.text().and_then(Command::parse) {
            match command {
                Command::MainMenu => {
                    info!("User {user_id} returned to the main menu");
                    self.sessions.clear(session);
                    show_main_menu(replies);
                    return;
                }
                Command::Restart => {
                    match session.mode() {
                        Mode::None => show_main_menu(replies),
                        mode => {
                            info!("User {user_id} restarted {mode:?}");
                            replies.say("Let's start over!");
                            self.enter(session, mode, replies);
                        }
                    }
                    return;
                }
                Command::Enter(mode) if session.flow.is_terminal() => {
                    info!("User {user_id} entered {mode:?}");
                    self.enter(session, mode, replies);
                    return;
                }
                // Mid-flow, a mode label is just an answer.
                Command::Enter(_) => {}
            }
        }

        match &mut session.flow {
            Flow::Idle => show_main_menu(replies),
            Flow::CoverLetter(state) => cover_letter::handle(self, user_id, state, content, replies).await,
            Flow::Resume(state) => resume::handle(self, user_id, state, content, replies).await,
            Flow::Interview(state) => interview::handle(self, user_id, state, content, replies).await,
            Flow::Vacancies(state) => vacancy_search::handle(self, user_id, state, content, replies).await,
        }
    }

    fn enter(&self, session: &mut SessionGuard, mode: Mode, replies: &mut Replies) {
        self.sessions.reset(session, mode);
        match mode {
            Mode::None => show_main_menu(replies),
            Mode::CoverLetter => cover_letter::start(replies),
            Mode::Resume => resume::start(replies),
            Mode::Interview => interview::start(replies),
            Mode::Parser => vacancy_search::start(replies),
        }
    }
}


pub(super) fn show_main_menu(replies: &mut Replies) {
    replies.say_with_keyboard(menu::WELCOME, menu::main_menu_keyboard());
}

/// Offered once a flow has finished, and on stray input afterwards.
pub(super) fn show_finished(replies: &mut Replies, text: &str) {
    replies.say_with_keyboard(text, menu::restart_menu());
}

/// Visible error after a load-bearing collaborator failed. The caller has
/// already moved its flow to the terminal phase.
pub(super) fn report_failure(user_id: UserId, what: &str, err: &dyn std::fmt::Display, replies: &mut Replies) {
    error!("User {user_id}: {what} failed: {err}");
    replies.say_with_keyboard(menu::FLOW_FAILED, menu::main_menu_keyboard());
}

/// Free-text answer: typed text, or the placeholder for a voice note.
pub(super) fn free_text(content: InboundContent) -> Option<String> {
    match content {
        InboundContent::Text(text) => Some(text),
        InboundContent::Voice => Some(menu::VOICE_PLACEHOLDER.to_string()),
        InboundContent::Document(_) => None,
    }
}

/// Typed text only.
pub(super) fn typed_text(content: InboundContent) -> Option<String> {
    match content {
        InboundContent::Text(text) => Some(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::dialogue::menu;
    use crate::dialogue::models::Reply;
    use crate::dialogue::testing::{Harness, ScriptedLlm, USER};
    use crate::session::Mode;

    #[tokio::test]
    async fn test_start_shows_main_menu_without_entering_a_mode() {
        let h = Harness::new(ScriptedLlm::new());
        let replies = h.text("/start").await;
        assert_eq!(
            replies.replies,
            vec![Reply::Text {
                text: menu::WELCOME.to_string(),
                keyboard: menu::main_menu_keyboard(),
            }]
        );
        assert!(h.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_idle_text_reshows_main_menu() {
        let h = Harness::new(ScriptedLlm::new());
        let replies = h.text("hello").await;
        assert_eq!(replies.last_text(), Some(menu::WELCOME));
        assert_eq!(h.snapshot().await.unwrap().mode, Mode::None);
    }

    #[tokio::test]
    async fn test_main_menu_clears_session_from_any_phase() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::RESUME).await;
        h.text("A. Ivanov").await;
        h.text("Backend engineer").await;
        assert_eq!(h.phase().await, "project_loop_x");

        let replies = h.text(menu::MAIN_MENU).await;
        assert_eq!(replies.last_text(), Some(menu::WELCOME));
        assert!(h.snapshot().await.is_none());
        assert_eq!(h.engine.sessions().len(), 0);
    }

    #[tokio::test]
    async fn test_main_menu_exits_every_reachable_phase() {
        let flows: [(&str, &[(&str, &str)]); 4] = [
            (
                menu::RESUME,
                &[
                    ("", "await_name"),
                    ("A. Ivanov", "await_summary"),
                    ("Backend engineer", "project_loop_x"),
                    ("A billing service", "project_loop_y"),
                    ("Rust and Postgres", "project_loop_z"),
                    ("Cut costs by 20%", "await_another_project"),
                    (menu::NO, "await_achievements"),
                    ("Conference talk", "await_skills"),
                    ("Rust, SQL", "terminal"),
                ],
            ),
            (
                menu::COVER_LETTER,
                &[
                    ("", "await_resume"),
                    ("My resume", "await_profession"),
                    ("Engineer", "await_company"),
                    ("Acme", "await_description"),
                    ("Curious", "terminal"),
                ],
            ),
            (
                menu::INTERVIEW,
                &[
                    ("", "await_resume"),
                    ("My resume", "await_vacancy"),
                    ("Rust engineer", "answer_1"),
                    ("Speed", "answer_2"),
                    ("A race condition", "answer_3"),
                    ("Your mission", "terminal"),
                ],
            ),
            (
                menu::VACANCY_SEARCH,
                &[("", "await_query"), ("rust developer", "terminal")],
            ),
        ];

        for (entry, steps) in flows {
            for depth in 0..steps.len() {
                let h = Harness::new(ScriptedLlm::new());
                h.text(entry).await;
                for (input, _) in &steps[1..=depth] {
                    h.text(input).await;
                }
                assert_eq!(h.phase().await, steps[depth].1, "walking {entry} to step {depth}");

                let replies = h.text(menu::MAIN_MENU).await;
                assert_eq!(replies.last_text(), Some(menu::WELCOME), "leaving {}", steps[depth].1);
                assert!(h.snapshot().await.is_none(), "leaving {}", steps[depth].1);
            }
        }
    }

    #[tokio::test]
    async fn test_main_menu_wins_over_phase_input_rules() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::COVER_LETTER).await;
        h.text("my resume").await;
        // AwaitProfession only accepts text; the sentinel still exits.
        let replies = h.text(menu::MAIN_MENU).await;
        assert_eq!(replies.last_text(), Some(menu::WELCOME));
        assert!(h.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_restart_reenters_current_mode_with_clean_buffers() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::RESUME).await;
        h.text("A. Ivanov").await;
        let before = h.snapshot().await.unwrap().session_id;

        let replies = h.text(menu::RESTART).await;
        let snapshot = h.snapshot().await.unwrap();
        assert_eq!(snapshot.mode, Mode::Resume);
        assert_eq!(snapshot.phase, "await_name");
        assert_ne!(snapshot.session_id, before);
        assert_eq!(replies.replies[0].text(), Some("Let's start over!"));
    }

    #[tokio::test]
    async fn test_restart_while_idle_shows_main_menu() {
        let h = Harness::new(ScriptedLlm::new());
        let replies = h.text(menu::RESTART).await;
        assert_eq!(replies.last_text(), Some(menu::WELCOME));
    }

    #[tokio::test]
    async fn test_mode_label_mid_flow_is_an_answer() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::COVER_LETTER).await;
        h.text(menu::INTERVIEW).await;
        let snapshot = h.snapshot().await.unwrap();
        assert_eq!(snapshot.mode, Mode::CoverLetter);
        assert_eq!(snapshot.phase, "await_profession");
    }

    #[tokio::test]
    async fn test_mode_label_after_terminal_switches_mode() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::VACANCY_SEARCH).await;
        h.text("rust developer").await;
        assert_eq!(h.phase().await, "terminal");

        h.text(menu::INTERVIEW).await;
        let snapshot = h.snapshot().await.unwrap();
        assert_eq!(snapshot.mode, Mode::Interview);
        assert_eq!(snapshot.phase, "await_resume");
    }

    #[tokio::test]
    async fn test_stale_selection_is_rejected_without_state_change() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::RESUME).await;
        let replies = h.select(menu::YES).await;
        assert_eq!(replies.last_text(), Some(menu::CHOICE_EXPIRED));
        assert_eq!(h.phase().await, "await_name");
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let h = Harness::new(ScriptedLlm::new());
        h.text(menu::RESUME).await;
        let other = h
            .engine
            .handle_message(crate::dialogue::models::InboundMessage {
                user_id: USER + 1,
                content: crate::dialogue::models::InboundContent::Text(menu::COVER_LETTER.into()),
            })
            .await;
        assert!(!other.is_empty());
        assert_eq!(h.snapshot().await.unwrap().mode, Mode::Resume);
        let other = h.engine.sessions().snapshot(USER + 1).await.unwrap();
        assert_eq!(other.mode, Mode::CoverLetter);
    }
}
