//! Vacancy search: one query, one page of results.

use tracing::{error, info};

use crate::dialogue::engine::{show_finished, typed_text, DialogueEngine};
use crate::dialogue::menu;
use crate::dialogue::models::{InboundContent, Replies};
use crate::job_search::format_vacancy;
use crate::session::{UserId, VacancySearchPhase, VacancySearchState};

pub(super) fn start(replies: &mut Replies) {
    replies.say_with_keyboard(
        "Hi! I will help you find suitable vacancies.\n\
        Enter keywords for the search (for example: 'python developer' or 'data scientist'):",
        menu::main_menu_button(),
    );
}

pub(super) async fn handle(
    engine: &DialogueEngine,
    user_id: UserId,
    state: &mut VacancySearchState,
    content: InboundContent,
    replies: &mut Replies,
) {
    match state.phase {
        VacancySearchPhase::AwaitQuery => match typed_text(content) {
            Some(query) => {
                state.query = query;
                state.phase = VacancySearchPhase::Search;
                search(engine, user_id, state, replies).await;
            }
            None => {
                replies.say("Please enter the search keywords as text.");
            }
        },
        VacancySearchPhase::Search | VacancySearchPhase::Terminal => {
            show_finished(replies, menu::CHOOSE_ACTION);
        }
    }
}

async fn search(engine: &DialogueEngine, user_id: UserId, state: &mut VacancySearchState, replies: &mut Replies) {
    info!("User {user_id} searching vacancies for {:?}", state.query);
    match engine.job_search.search(&state.query).await {
        Ok(vacancies) if vacancies.is_empty() => {
            replies.say("Unfortunately, nothing was found for your query.");
        }
        Ok(vacancies) => {
            replies.say(format!("Found {} vacancies:", vacancies.len()));
            for vacancy in &vacancies {
                replies.say(format_vacancy(vacancy));
            }
        }
        Err(e) => {
            error!("User {user_id}: vacancy search failed: {e}");
            replies.say("An error occurred while searching for vacancies. Please try again later.");
        }
    }
    state.phase = VacancySearchPhase::Terminal;
    show_finished(replies, "Search complete! Choose an action:");
}

#[cfg(test)]
mod tests {
    use crate::dialogue::menu;
    use crate::dialogue::testing::{Harness, RecordingAssembler, ScriptedLlm, StaticJobSearch};
    use crate::job_search::Vacancy;

    fn vacancy(id: &str, name: &str) -> Vacancy {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "salary": {"from": 100000, "to": null, "currency": "RUR"},
            "employer": {"name": "Acme"},
            "area": {"name": "Moscow"},
            "schedule": {"name": "Remote"},
            "snippet": {"requirement": "Rust"}
        }))
        .unwrap()
    }

    fn harness(jobs: StaticJobSearch) -> Harness {
        Harness::build(ScriptedLlm::new(), false, RecordingAssembler::default(), jobs, 3)
    }

    #[tokio::test]
    async fn test_results_are_one_message_each() {
        let h = harness(StaticJobSearch::new(vec![
            vacancy("1", "Rust developer"),
            vacancy("2", "Backend engineer"),
        ]));
        h.text(menu::VACANCY_SEARCH).await;
        let replies = h.text("rust developer").await;

        assert_eq!(h.jobs.queries(), vec!["rust developer".to_string()]);
        assert_eq!(replies.len(), 4);
        assert_eq!(replies.replies[0].text(), Some("Found 2 vacancies:"));
        assert!(replies.replies[1].text().unwrap().starts_with("🔹 Rust developer"));
        assert!(replies.replies[2].text().unwrap().ends_with("https://hh.ru/vacancy/2"));
        assert_eq!(replies.last_text(), Some("Search complete! Choose an action:"));
        assert_eq!(h.phase().await, "terminal");
    }

    #[tokio::test]
    async fn test_empty_result() {
        let h = harness(StaticJobSearch::new(Vec::new()));
        h.text(menu::VACANCY_SEARCH).await;
        let replies = h.text("cobol").await;
        assert_eq!(
            replies.replies[0].text(),
            Some("Unfortunately, nothing was found for your query.")
        );
    }

    #[tokio::test]
    async fn test_search_failure_still_terminates() {
        let h = harness(StaticJobSearch::failing());
        h.text(menu::VACANCY_SEARCH).await;
        let replies = h.text("rust").await;
        assert!(replies.replies[0]
            .text()
            .unwrap()
            .starts_with("An error occurred while searching"));
        assert_eq!(h.phase().await, "terminal");

        let replies = h.text(menu::RESTART).await;
        assert_eq!(replies.len(), 2);
        assert_eq!(h.phase().await, "await_query");
    }
}
