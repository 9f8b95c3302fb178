// All LLM prompt templates used by the dialogue flows.
// Templates carry `{placeholder}` markers filled by the builder functions below.
// User text is always substituted last, and prompts with more than one user
// field are built with `format!`, so input containing a marker stays literal.
// Reuses personas and rules from llm_client::prompts.

use crate::llm_client::prompts::{INTERVIEWER_PERSONA, NO_INVENTION_INSTRUCTION, RESUME_WRITER_PERSONA};

// ────────────────────────────────────────────────────────────────────────────
// Project sub-dialogue
// ────────────────────────────────────────────────────────────────────────────

pub const GRADING_INSTRUCTION: &str =
    "Rate with a single number from 1 to 10 how completely I answered the original question.";

pub const FOLLOW_UP_INSTRUCTION: &str =
    "Come up with one additional question that would better reveal my answer to the original question. \
    Reply with the question only.";

const GRADING_TEMPLATE: &str = "{persona} While building my resume we had the following dialogue:\n\n\
{dialogue}\n\
{instruction}";

const FOLLOW_UP_TEMPLATE: &str = "{persona} We had the following dialogue:\n\n\
{dialogue}\n\
{instruction}";

pub fn grading_prompt(stage_dialogue: &str) -> String {
    GRADING_TEMPLATE
        .replace("{persona}", RESUME_WRITER_PERSONA)
        .replace("{instruction}", GRADING_INSTRUCTION)
        .replace("{dialogue}", stage_dialogue)
}

pub fn follow_up_prompt(stage_dialogue: &str) -> String {
    FOLLOW_UP_TEMPLATE
        .replace("{persona}", INTERVIEWER_PERSONA)
        .replace("{instruction}", FOLLOW_UP_INSTRUCTION)
        .replace("{dialogue}", stage_dialogue)
}

// ────────────────────────────────────────────────────────────────────────────
// Project compilation
// ────────────────────────────────────────────────────────────────────────────

pub const PROJECT_EXTRACT_INSTRUCTION: &str =
    "Using my answers, identify which project I worked on and describe it.";

pub const PROJECT_REWRITE_INSTRUCTION: &str =
    "Write, in the first person, the part of your resume that describes your projects. \
    Be concise and use a formal writing style.";

const PROJECT_EXTRACT_TEMPLATE: &str = "{persona} This is what I told you about my project:\n\
\"{transcript}\"\n\
{instruction} {no_invention}\n\
Output format: three bullet points separated by line breaks.";

const PROJECT_REWRITE_TEMPLATE: &str = "You are a resume writer with more than 10 years of experience. \
Imagine you are writing your own resume, specifically the part about your projects. Here is your project:\n\
{summary}\n\
Output format: {instruction}";

pub fn project_extract_prompt(transcript: &str) -> String {
    PROJECT_EXTRACT_TEMPLATE
        .replace("{persona}", RESUME_WRITER_PERSONA)
        .replace("{instruction}", PROJECT_EXTRACT_INSTRUCTION)
        .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
        .replace("{transcript}", transcript)
}

pub fn project_rewrite_prompt(summary: &str) -> String {
    PROJECT_REWRITE_TEMPLATE
        .replace("{instruction}", PROJECT_REWRITE_INSTRUCTION)
        .replace("{summary}", summary)
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

pub const COVER_LETTER_INSTRUCTION: &str =
    "The letter should be professional but not overly formal. Include the applicant's self-description.";

pub fn cover_letter_prompt(resume: &str, profession: &str, company: &str, description: &str) -> String {
    format!(
        "Write a cover letter for an applicant for the position of {profession} at {company}.\n\n\
         Applicant's resume:\n\
         {resume}\n\n\
         Applicant's self-description:\n\
         {description}\n\n\
         {COVER_LETTER_INSTRUCTION}"
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Interview
// ────────────────────────────────────────────────────────────────────────────

pub const QUESTIONS_INSTRUCTION: &str =
    "Based on the resume and the vacancy description below, write 3 clear and specific interview questions.";

pub const ANALYSIS_INSTRUCTION: &str =
    "Analyze the candidate's answers to the interview questions below and give recommendations for improvement.";

pub fn interview_questions_prompt(resume: &str, vacancy: &str) -> String {
    format!(
        "{INTERVIEWER_PERSONA} {QUESTIONS_INSTRUCTION}\n\
         Number the questions from 1 to 3, one question per line.\n\
         The questions must assess how well the candidate fits the requirements of the vacancy.\n\n\
         Resume:\n\
         {resume}\n\n\
         Vacancy:\n\
         {vacancy}\n\n\
         Output format:\n\
         1. First question\n\
         2. Second question\n\
         3. Third question"
    )
}

pub fn interview_analysis_prompt(questions: &str, answers: &[String]) -> String {
    let answers: String = answers
        .iter()
        .enumerate()
        .map(|(i, a)| format!("Answer to question {}: {a}\n", i + 1))
        .collect();
    format!(
        "{ANALYSIS_INSTRUCTION}\n\n\
         Questions:\n\
         {questions}\n\n\
         Answers:\n\
         {}\n\n\
         Write a short analysis and recommendations for improving the answers.",
        answers.trim_end()
    )
}
