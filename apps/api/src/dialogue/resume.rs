//! Resume building with the adaptive per-project loop.
//!
//! Each project runs stages X (description), Y (tools) and Z (outcome). Every
//! answer is graded against its stage; a score above the neutral point earns a
//! generated follow-up in the same stage, otherwise the stage's fixed question
//! for the next stage is asked. Follow-ups per stage are capped by
//! `DialogueSettings::max_follow_ups`.

use tracing::{info, warn};

use crate::dialogue::compile::compile_projects;
use crate::dialogue::engine::{free_text, report_failure, show_finished, typed_text, DialogueEngine};
use crate::dialogue::grading::grade_answer;
use crate::dialogue::menu::{self, parse_yes_no};
use crate::dialogue::models::{InboundContent, Replies};
use crate::dialogue::prompts::follow_up_prompt;
use crate::documents::{ContactFields, ResumeDocument};
use crate::llm_client::CompletionOptions;
use crate::session::{ProjectDraft, ResumePhase, ResumeState, Stage, UserId};

pub(super) const ANOTHER_PROJECT: &str =
    "Great! Thanks for your answers. Would you like to tell me about another one of your projects?";
const ASK_TEXT_OR_VOICE: &str = "Please send either text or a voice message.";
const ASK_ACHIEVEMENTS: &str = "Tell me about some of your achievements.";
const FOLLOW_UP_UNAVAILABLE: &str =
    "I could not come up with a follow-up question right now. Let's try this one again:";

pub(super) fn start(replies: &mut Replies) {
    replies.say_with_keyboard(
        "Hi! I will help you build a resume. Let's get acquainted first. Please write your full name.",
        menu::main_menu_button(),
    );
}

pub(super) async fn handle(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut ResumeState,
    content: InboundContent,
    replies: &mut Replies,
) {
    match state.phase {
        ResumePhase::AwaitName => match typed_text(content) {
            Some(name) => {
                state.name = name;
                state.phase = ResumePhase::AwaitSummary;
                replies.say("Tell me about yourself in two or three sentences.");
            }
            None => {
                replies.say("Please send your full name as text.");
            }
        },
        ResumePhase::AwaitSummary => match free_text(content) {
            Some(summary) => {
                state.summary = summary;
                begin_project(state, replies);
            }
            None => {
                replies.say(ASK_TEXT_OR_VOICE);
            }
        },
        ResumePhase::ProjectLoop(stage) => match free_text(content) {
            Some(answer) => answer_stage(engine, user_id, state, stage, answer, replies).await,
            None => {
                replies.say(ASK_TEXT_OR_VOICE);
            }
        },
        ResumePhase::AwaitAnotherProject => match typed_text(content) {
            Some(text) => handle_choice(user_id, state, &text, replies),
            None => {
                replies.choose(ANOTHER_PROJECT, menu::yes_no());
            }
        },
        ResumePhase::AwaitAchievements => match free_text(content) {
            Some(achievements) => {
                state.achievements = achievements;
                state.phase = ResumePhase::AwaitSkills;
                replies.say("What skills do you have?");
            }
            None => {
                replies.say(ASK_TEXT_OR_VOICE);
            }
        },
        ResumePhase::AwaitSkills => match free_text(content) {
            Some(skills) => {
                state.skills = skills;
                state.phase = ResumePhase::Compile;
                finish(engine, user_id, state, replies).await;
            }
            None => {
                replies.say(ASK_TEXT_OR_VOICE);
            }
        },
        ResumePhase::Compile | ResumePhase::Terminal => {
            show_finished(replies, menu::CHOOSE_ACTION);
        }
    }
}

/// Yes/no on "another project?", from a selection click or typed text.
pub(super) fn handle_choice(user_id: UserId, state: &mut ResumeState, answer: &str, replies: &mut Replies) {
    match parse_yes_no(answer) {
        Some(true) => {
            info!("User {user_id} is adding project #{}", state.projects.len() + 1);
            begin_project(state, replies);
        }
        Some(false) => {
            info!("User {user_id} finished with {} projects", state.projects.len());
            state.phase = ResumePhase::AwaitAchievements;
            replies.say(ASK_ACHIEVEMENTS);
        }
        None => {
            replies.choose(ANOTHER_PROJECT, menu::yes_no());
        }
    }
}

fn begin_project(state: &mut ResumeState, replies: &mut Replies) {
    state.question_index = 1;
    state.draft = ProjectDraft::start();
    state.phase = ResumePhase::ProjectLoop(Stage::X);
    replies.say(Stage::X.opening_question());
}

async fn answer_stage(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut ResumeState,
    stage: Stage,
    answer: String,
    replies: &mut Replies,
) {
    let pair = state.draft.answer_pending(answer);

    if state.draft.follow_ups_in_stage >= engine.settings.max_follow_ups {
        info!(
            "User {user_id}: stage {stage:?} reached {} follow-ups, advancing",
            state.draft.follow_ups_in_stage
        );
        state.draft.record(pair);
        advance(user_id, state, stage, replies);
        return;
    }

    let stage_dialogue = state.draft.stage_text_with(&pair);
    let score = grade_answer(engine.llm.as_ref(), &stage_dialogue).await;
    info!(
        "User {user_id}: stage {stage:?} question #{} scored {}",
        pair.number,
        score.value()
    );

    if !score.wants_follow_up() {
        state.draft.record(pair);
        advance(user_id, state, stage, replies);
        return;
    }

    match engine
        .llm
        .complete(&follow_up_prompt(&stage_dialogue), CompletionOptions::GENERATION)
        .await
    {
        Ok(question) => {
            state.draft.record(pair);
            state.question_index += 1;
            state.draft.ask_follow_up(state.question_index, question.clone());
            info!("User {user_id}: follow-up #{} in stage {stage:?}", state.question_index);
            replies.say(question);
        }
        Err(e) => {
            // The answer is not committed; the same question is asked again.
            warn!("User {user_id}: follow-up generation failed: {e}");
            replies.say(FOLLOW_UP_UNAVAILABLE);
            replies.say(state.draft.pending.text.clone());
        }
    }
}

fn advance(user_id: UserId, state: &mut ResumeState, stage: Stage, replies: &mut Replies) {
    match stage.next() {
        Some(next) => {
            state.question_index += 1;
            state.draft.enter_stage(next, state.question_index);
            state.phase = ResumePhase::ProjectLoop(next);
            replies.say(next.opening_question());
        }
        None => {
            let transcript = state.draft.seal();
            info!(
                "User {user_id}: project #{} sealed with {} answers",
                state.projects.len() + 1,
                transcript.pairs().len()
            );
            state.projects.push(transcript);
            state.phase = ResumePhase::AwaitAnotherProject;
            replies.choose(ANOTHER_PROJECT, menu::yes_no());
        }
    }
}

async fn finish(engine: &DialogueEngine, user_id: UserId, state: &mut ResumeState, replies: &mut Replies) {
    replies.say("Building your resume...");

    let paragraphs = match compile_projects(engine.llm.as_ref(), &state.projects).await {
        Ok(paragraphs) => paragraphs,
        Err(e) => {
            state.phase = ResumePhase::Terminal;
            report_failure(user_id, "project compilation", &e, replies);
            return;
        }
    };

    let document = ResumeDocument {
        name: state.name.clone(),
        contacts: ContactFields::default(),
        education: None,
        projects: paragraphs,
        skills: state.skills.clone(),
        achievements: state.achievements.clone(),
        extra: Some(state.summary.clone()).filter(|s| !s.trim().is_empty()),
    };

    let result = engine.assembler.assemble(document).await;
    state.phase = ResumePhase::Terminal;
    match result {
        Ok(bytes) => {
            replies.attach(resume_file_name(&state.name), bytes);
            show_finished(replies, "Your resume is ready! Choose an action:");
        }
        Err(e) => report_failure(user_id, "resume assembly", &e, replies),
    }
}

/// `<name>_Resume.docx`, with path separators and control characters replaced.
fn resume_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "Resume.docx".to_string()
    } else {
        format!("{cleaned}_Resume.docx")
    }
}
