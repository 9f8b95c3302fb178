//! Project Compilation: turns sealed project transcripts into resume prose.
//!
//! Each project goes through two ordered completions (bullet extraction, then
//! first-person rewrite). Projects run concurrently; output order matches input.

use futures::future::try_join_all;
use tracing::info;

use crate::dialogue::prompts::{project_extract_prompt, project_rewrite_prompt};
use crate::llm_client::{CompletionClient, CompletionOptions, LlmError};
use crate::session::ProjectTranscript;

pub async fn compile_projects(
    llm: &dyn CompletionClient,
    projects: &[ProjectTranscript],
) -> Result<Vec<String>, LlmError> {
    let paragraphs =
        try_join_all(projects.iter().enumerate().map(|(i, p)| compile_project(llm, i, p))).await?;
    info!("Compiled {} project paragraphs", paragraphs.len());
    Ok(paragraphs)
}

async fn compile_project(
    llm: &dyn CompletionClient,
    index: usize,
    project: &ProjectTranscript,
) -> Result<String, LlmError> {
    let summary = llm
        .complete(&project_extract_prompt(&project.render()), CompletionOptions::GENERATION)
        .await?;
    let paragraph = llm
        .complete(&project_rewrite_prompt(&summary), CompletionOptions::GENERATION)
        .await?;
    info!("Project {} compiled ({} chars)", index + 1, paragraph.len());
    Ok(paragraph.trim().to_string())
}
