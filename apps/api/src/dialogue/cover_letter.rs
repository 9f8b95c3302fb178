//! Cover letter: resume, profession, company, self-description, then one
//! generation call.

use tracing::info;

use crate::dialogue::engine::{report_failure, show_finished, typed_text, DialogueEngine};
use crate::dialogue::menu;
use crate::dialogue::models::{InboundContent, Replies};
use crate::dialogue::prompts::cover_letter_prompt;
use crate::llm_client::CompletionOptions;
use crate::session::{CoverLetterPhase, CoverLetterState, UserId};

const ASK_RESUME: &str = "Please send your resume as a text message or as a PDF file.";

pub(super) fn start(replies: &mut Replies) {
    replies.say_with_keyboard(
        format!("Hi! I will help you write a cover letter.\n{ASK_RESUME}"),
        menu::main_menu_button(),
    );
}

pub(super) async fn handle(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut CoverLetterState,
    content: InboundContent,
    replies: &mut Replies,
) {
    match state.phase {
        CoverLetterPhase::AwaitResume => {
            let resume_text = match content {
                InboundContent::Text(text) => text,
                InboundContent::Document(document) if document.is_pdf() => {
                    match engine.extractor.extract(&document).await {
                        Ok(text) => text,
                        Err(e) => {
                            state.phase = CoverLetterPhase::Terminal;
                            report_failure(user_id, "resume extraction", &e, replies);
                            return;
                        }
                    }
                }
                _ => {
                    replies.say(ASK_RESUME);
                    return;
                }
            };
            state.resume_text = resume_text;
            state.phase = CoverLetterPhase::AwaitProfession;
            replies.say("Enter the profession you are applying for:");
        }
        CoverLetterPhase::AwaitProfession => match typed_text(content) {
            Some(profession) => {
                state.profession = profession;
                state.phase = CoverLetterPhase::AwaitCompany;
                replies.say("Enter the name of the company you want to join:");
            }
            None => {
                replies.say("Please enter the profession as text.");
            }
        },
        CoverLetterPhase::AwaitCompany => match typed_text(content) {
            Some(company) => {
                state.company = company;
                state.phase = CoverLetterPhase::AwaitDescription;
                replies.say("Tell me about yourself in 2-3 sentences:");
            }
            None => {
                replies.say("Please enter the company name as text.");
            }
        },
        CoverLetterPhase::AwaitDescription => match typed_text(content) {
            Some(description) => {
                state.description = description;
                state.phase = CoverLetterPhase::Generate;
                generate(engine, user_id, state, replies).await;
            }
            None => {
                replies.say("Please enter the description as text.");
            }
        },
        CoverLetterPhase::Generate | CoverLetterPhase::Terminal => {
            show_finished(replies, menu::CHOOSE_ACTION);
        }
    }
}

async fn generate(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut CoverLetterState,
    replies: &mut Replies,
) {
    let prompt = cover_letter_prompt(
        &state.resume_text,
        &state.profession,
        &state.company,
        &state.description,
    );
    let result = engine.llm.complete(&prompt, CompletionOptions::GENERATION).await;
    state.phase = CoverLetterPhase::Terminal;

    match result {
        Ok(letter) => {
            info!("User {user_id}: cover letter generated ({} chars)", letter.len());
            replies.say(format!("Here is your cover letter:\n\n{letter}"));
            show_finished(replies, menu::CHOOSE_ACTION);
        }
        Err(e) => report_failure(user_id, "cover letter generation", &e, replies),
    }
}
