// Shared prompt fragments.
// Each flow that needs LLM calls keeps its own templates in dialogue/prompts.rs.
// This file contains the personas and rules reused across those templates.

/// Persona for grading, project extraction and cover letters.
pub const RESUME_WRITER_PERSONA: &str =
    "You are an experienced resume writer. I am a candidate applying for a position at a company.";

/// Persona for follow-up questions and mock interviews.
pub const INTERVIEWER_PERSONA: &str =
    "You are an experienced interviewer hiring for a company. I am a candidate for a position there.";

/// Appended wherever the model transforms what the user said.
pub const NO_INVENTION_INSTRUCTION: &str =
    "Base your answer only on what I said. Do not invent any new information.";
