//! Scripted collaborators for dialogue tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::dialogue::engine::{DialogueEngine, DialogueSettings};
use crate::dialogue::models::{InboundContent, InboundMessage, Replies, Selection};
use crate::dialogue::prompts::{
    ANALYSIS_INSTRUCTION, COVER_LETTER_INSTRUCTION, FOLLOW_UP_INSTRUCTION, GRADING_INSTRUCTION,
    PROJECT_EXTRACT_INSTRUCTION, PROJECT_REWRITE_INSTRUCTION, QUESTIONS_INSTRUCTION,
};
use crate::documents::{
    DocumentAssembler, DocumentError, DocumentExtractor, ResumeDocument, UploadedDocument,
};
use crate::job_search::{JobSearch, SearchError, Vacancy};
use crate::llm_client::{CompletionClient, CompletionOptions, LlmError};
use crate::session::{SessionSnapshot, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Grading,
    FollowUp,
    ProjectExtract,
    ProjectRewrite,
    CoverLetter,
    InterviewQuestions,
    InterviewAnalysis,
    Other,
}

impl PromptKind {
    pub fn classify(prompt: &str) -> Self {
        [
            (GRADING_INSTRUCTION, PromptKind::Grading),
            (FOLLOW_UP_INSTRUCTION, PromptKind::FollowUp),
            (PROJECT_EXTRACT_INSTRUCTION, PromptKind::ProjectExtract),
            (PROJECT_REWRITE_INSTRUCTION, PromptKind::ProjectRewrite),
            (COVER_LETTER_INSTRUCTION, PromptKind::CoverLetter),
            (QUESTIONS_INSTRUCTION, PromptKind::InterviewQuestions),
            (ANALYSIS_INSTRUCTION, PromptKind::InterviewAnalysis),
        ]
        .into_iter()
        .find(|(marker, _)| prompt.contains(marker))
        .map(|(_, kind)| kind)
        .unwrap_or(PromptKind::Other)
    }
}

/// Text between `start` and the next `end` after it.
fn between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    text.split_once(start)
        .and_then(|(_, rest)| rest.split_once(end))
        .map(|(inner, _)| inner)
        .unwrap_or("")
}

/// Completion client answering by prompt kind.
///
/// Grading pops from a queue (empty queue grades "3"), follow-ups are
/// numbered, extraction echoes the first answer as `SUMMARY[..]` and the
/// rewrite wraps it as `PARAGRAPH[..]`.
#[derive(Default)]
pub struct ScriptedLlm {
    grades: Mutex<VecDeque<String>>,
    always_grade: Option<String>,
    failing: HashSet<PromptKind>,
    calls: Mutex<Vec<(PromptKind, String)>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grades(self, grades: &[&str]) -> Self {
        *self.grades.lock().unwrap() = grades.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn always_grade(mut self, grade: &str) -> Self {
        self.always_grade = Some(grade.to_string());
        self
    }

    pub fn failing(mut self, kind: PromptKind) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn calls(&self) -> Vec<(PromptKind, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: PromptKind) -> usize {
        self.calls.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn prompts(&self, kind: PromptKind) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLlm {
    async fn complete(&self, prompt: &str, _options: CompletionOptions) -> Result<String, LlmError> {
        let kind = PromptKind::classify(prompt);
        let follow_ups_so_far = self.count(PromptKind::FollowUp);
        self.calls.lock().unwrap().push((kind, prompt.to_string()));

        if self.failing.contains(&kind) {
            return Err(LlmError::Api {
                status: 500,
                message: format!("scripted failure for {kind:?}"),
            });
        }

        let text = match kind {
            PromptKind::Grading => self
                .always_grade
                .clone()
                .or_else(|| self.grades.lock().unwrap().pop_front())
                .unwrap_or_else(|| "3".to_string()),
            PromptKind::FollowUp => format!("Follow-up question {}?", follow_ups_so_far + 1),
            PromptKind::ProjectExtract => {
                format!("SUMMARY[{}]", between(prompt, "Answer: ", "\n"))
            }
            PromptKind::ProjectRewrite => {
                format!("  PARAGRAPH[SUMMARY[{}]]\n", between(prompt, "SUMMARY[", "]"))
            }
            PromptKind::CoverLetter => "Dear hiring team, I would love to join.".to_string(),
            PromptKind::InterviewQuestions => {
                "1. Why Rust?\n2. Describe a hard bug.\n3. Why this company?".to_string()
            }
            PromptKind::InterviewAnalysis => "Clear answers; add more numbers.".to_string(),
            PromptKind::Other => "ok".to_string(),
        };
        Ok(text)
    }
}

/// Extractor that returns fixed text for PDFs, or fails when told to.
pub struct FakeExtractor {
    pub fail: bool,
}

#[async_trait]
impl DocumentExtractor for FakeExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, DocumentError> {
        if !document.is_pdf() {
            return Err(DocumentError::Unsupported(document.file_name.clone()));
        }
        if self.fail {
            return Err(DocumentError::Extraction("scripted failure".into()));
        }
        Ok(format!("Text of {}", document.file_name))
    }
}

/// Assembler that records every request and returns placeholder bytes.
#[derive(Default)]
pub struct RecordingAssembler {
    fail: bool,
    requests: Mutex<Vec<ResumeDocument>>,
}

impl RecordingAssembler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ResumeDocument> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentAssembler for RecordingAssembler {
    async fn assemble(&self, document: ResumeDocument) -> Result<Vec<u8>, DocumentError> {
        self.requests.lock().unwrap().push(document);
        if self.fail {
            return Err(DocumentError::Assembly("scripted failure".into()));
        }
        Ok(b"PK-fake".to_vec())
    }
}

/// Job search returning a fixed result.
pub struct StaticJobSearch {
    vacancies: Vec<Vacancy>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl StaticJobSearch {
    pub fn new(vacancies: Vec<Vacancy>) -> Self {
        Self {
            vacancies,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSearch for StaticJobSearch {
    async fn search(&self, query: &str) -> Result<Vec<Vacancy>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(SearchError::Status(503));
        }
        Ok(self.vacancies.clone())
    }
}

pub const USER: UserId = 42;

/// An engine wired to scripted collaborators, driven as user 42.
pub struct Harness {
    pub engine: DialogueEngine,
    pub llm: Arc<ScriptedLlm>,
    pub assembler: Arc<RecordingAssembler>,
    pub jobs: Arc<StaticJobSearch>,
}

impl Harness {
    pub fn new(llm: ScriptedLlm) -> Self {
        Self::build(llm, false, RecordingAssembler::default(), StaticJobSearch::new(Vec::new()), 3)
    }

    pub fn build(
        llm: ScriptedLlm,
        extractor_fails: bool,
        assembler: RecordingAssembler,
        jobs: StaticJobSearch,
        max_follow_ups: u32,
    ) -> Self {
        let llm = Arc::new(llm);
        let assembler = Arc::new(assembler);
        let jobs = Arc::new(jobs);
        let engine = DialogueEngine::new(
            llm.clone(),
            Arc::new(FakeExtractor {
                fail: extractor_fails,
            }),
            assembler.clone(),
            jobs.clone(),
            DialogueSettings { max_follow_ups },
        );
        Self {
            engine,
            llm,
            assembler,
            jobs,
        }
    }

    pub async fn send(&self, content: InboundContent) -> Replies {
        self.engine
            .handle_message(InboundMessage {
                user_id: USER,
                content,
            })
            .await
    }

    pub async fn text(&self, text: &str) -> Replies {
        self.send(InboundContent::Text(text.to_string())).await
    }

    pub async fn voice(&self) -> Replies {
        self.send(InboundContent::Voice).await
    }

    pub async fn document(&self, file_name: &str) -> Replies {
        self.send(InboundContent::Document(UploadedDocument {
            file_name: file_name.to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }))
        .await
    }

    pub async fn select(&self, label: &str) -> Replies {
        self.engine
            .handle_selection(Selection {
                user_id: USER,
                label: label.to_string(),
            })
            .await
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        self.engine.sessions().snapshot(USER).await
    }

    pub async fn phase(&self) -> String {
        self.snapshot()
            .await
            .map(|s| s.phase)
            .unwrap_or_else(|| "absent".to_string())
    }
}
