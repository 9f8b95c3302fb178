//! Mock interview: three generated questions, three answers, one analysis.

use tracing::info;

use crate::dialogue::engine::{free_text, report_failure, show_finished, typed_text, DialogueEngine};
use crate::dialogue::menu;
use crate::dialogue::models::{InboundContent, Replies};
use crate::dialogue::prompts::{interview_analysis_prompt, interview_questions_prompt};
use crate::llm_client::CompletionOptions;
use crate::session::{InterviewPhase, InterviewState, UserId, INTERVIEW_QUESTION_COUNT};

const ASK_RESUME: &str = "Please send your resume as a PDF document or as a text message.";

pub(super) fn start(replies: &mut Replies) {
    replies.say_with_keyboard(
        format!(
            "Hi! Let's run a mock interview to prepare you for the real one and add some confidence.\n\n{ASK_RESUME}"
        ),
        menu::main_menu_button(),
    );
}

pub(super) async fn handle(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut InterviewState,
    content: InboundContent,
    replies: &mut Replies,
) {
    match state.phase {
        InterviewPhase::AwaitResume => {
            let resume_text = match content {
                InboundContent::Text(text) => text,
                InboundContent::Document(document) if document.is_pdf() => {
                    match engine.extractor.extract(&document).await {
                        Ok(text) => text,
                        Err(e) => {
                            state.phase = InterviewPhase::Terminal;
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
            state.phase = InterviewPhase::AwaitVacancy;
            replies.say("Please send the vacancy description as text.");
        }
        InterviewPhase::AwaitVacancy => match typed_text(content) {
            Some(vacancy) => {
                state.vacancy_text = vacancy;
                state.phase = InterviewPhase::GenerateQuestions;
                replies.say(
                    "Thanks! I will now prepare questions based on your resume and the vacancy description.",
                );
                generate_questions(engine, user_id, state, replies).await;
            }
            None => {
                replies.say("Please send the vacancy description as a text message.");
            }
        },
        InterviewPhase::Answer(number) => match free_text(content) {
            Some(answer) => {
                state.answers.push(answer);
                info!("User {user_id} answered interview question {number}");
                if number < INTERVIEW_QUESTION_COUNT {
                    state.phase = InterviewPhase::Answer(number + 1);
                    replies.say(format!("Thanks! Now answer question {}.", number + 1));
                } else {
                    state.phase = InterviewPhase::Analyze;
                    analyze(engine, user_id, state, replies).await;
                }
            }
            None => {
                replies.say("Please send your answer as a text or voice message.");
            }
        },
        InterviewPhase::GenerateQuestions | InterviewPhase::Analyze | InterviewPhase::Terminal => {
            show_finished(replies, menu::CHOOSE_ACTION);
        }
    }
}

async fn generate_questions(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut InterviewState,
    replies: &mut Replies,
) {
    let prompt = interview_questions_prompt(&state.resume_text, &state.vacancy_text);
    match engine.llm.complete(&prompt, CompletionOptions::GENERATION).await {
        Ok(questions) => {
            info!("User {user_id}: interview questions generated");
            replies.say(format!("Here are my questions:\n\n{questions}"));
            replies.say("Please answer the first question.");
            state.questions = questions;
            state.phase = InterviewPhase::Answer(1);
        }
        Err(e) => {
            state.phase = InterviewPhase::Terminal;
            report_failure(user_id, "interview question generation", &e, replies);
        }
    }
}

async fn analyze(engine: &DialogueEngine, user_id: UserId, state: &mut InterviewState, replies: &mut Replies) {
    let prompt = interview_analysis_prompt(&state.questions, &state.answers);
    let result = engine.llm.complete(&prompt, CompletionOptions::GENERATION).await;
    state.phase = InterviewPhase::Terminal;

    match result {
        Ok(analysis) => {
            replies.say(format!(
                "Thank you for taking the interview! Here is my analysis and recommendations:\n\n{analysis}"
            ));
            show_finished(replies, "The interview is over! Choose an action:");
        }
        Err(e) => report_failure(user_id, "interview analysis", &e, replies),
    }
}
