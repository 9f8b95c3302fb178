use std::io::Cursor;

use async_trait::async_trait;
use docx_rs::{AlignmentType, Docx, Paragraph, Run, RunFonts};
use tracing::info;

use crate::documents::{DocumentAssembler, DocumentError, ResumeDocument};

const FONT: &str = "Times New Roman";
/// Sizes are in half-points.
const BODY_SIZE: usize = 24;
const TITLE_SIZE: usize = 28;
const BULLET: &str = "\u{2022} ";

/// Lays out a resume as a DOCX file.
pub struct DocxAssembler;

#[async_trait]
impl DocumentAssembler for DocxAssembler {
    async fn assemble(&self, document: ResumeDocument) -> Result<Vec<u8>, DocumentError> {
        let bytes = tokio::task::spawn_blocking(move || render(&document)).await??;
        info!("Assembled resume document ({} bytes)", bytes.len());
        Ok(bytes)
    }
}

fn render(document: &ResumeDocument) -> Result<Vec<u8>, DocumentError> {
    let mut buffer = Cursor::new(Vec::new());
    layout(document)
        .build()
        .pack(&mut buffer)
        .map_err(|e| DocumentError::Assembly(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn layout(document: &ResumeDocument) -> Docx {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new()
            .add_run(text_run(&document.name).bold().size(TITLE_SIZE))
            .align(AlignmentType::Center),
    );

    if let Some(line) = document.contacts.line() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(text_run(&line))
                .align(AlignmentType::Center),
        );
    }

    let education = document.education.as_deref().map(bullet_lines).unwrap_or_default();
    let extra = document.extra.as_deref().map(bullet_lines).unwrap_or_default();
    let projects: Vec<String> = document
        .projects
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    for (heading, items) in [
        ("EDUCATION", education),
        ("PROJECTS", projects),
        ("SKILLS", bullet_lines(&document.skills)),
        ("ACHIEVEMENTS", bullet_lines(&document.achievements)),
        ("ADDITIONAL INFORMATION", extra),
    ] {
        docx = section(docx, heading, &items);
    }

    docx
}

/// Adds a bold heading followed by one bullet paragraph per item. Empty sections are skipped.
fn section(docx: Docx, heading: &str, items: &[String]) -> Docx {
    if items.is_empty() {
        return docx;
    }
    let mut docx = docx.add_paragraph(Paragraph::new().add_run(text_run(heading).bold()));
    for item in items {
        docx = docx.add_paragraph(Paragraph::new().add_run(text_run(&format!("{BULLET}{item}"))));
    }
    docx
}

fn text_run(text: &str) -> Run {
    Run::new()
        .add_text(text)
        .fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT))
        .size(BODY_SIZE)
}

/// Splits free text into trimmed, non-empty lines.
fn bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '\u{2022}']).trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
