//! Button labels, keyboards and the fixed texts shown around them.

use crate::session::Mode;

pub const MAIN_MENU: &str = "🏠 Main menu";
pub const RESTART: &str = "🔄 Restart";
pub const START_COMMAND: &str = "/start";

pub const COVER_LETTER: &str = "📝 Cover letter";
pub const RESUME: &str = "📄 Resume";
pub const INTERVIEW: &str = "🤖 AI interviewer";
pub const VACANCY_SEARCH: &str = "🔍 Vacancy search";

pub const YES: &str = "Yes";
pub const NO: &str = "No";

/// Recorded in place of a voice answer.
pub const VOICE_PLACEHOLDER: &str = "Voice message received";

pub const WELCOME: &str = "👋 Hi! I am the YourOffer assistant.\n\n\
I can help you with:\n\
📝 Writing a cover letter\n\
📄 Building a resume\n\
🤖 Preparing for an interview\n\
🔍 Finding vacancies\n\n\
Choose a mode:";

pub const CHOOSE_ACTION: &str = "Choose an action:";
pub const CHOICE_EXPIRED: &str = "This choice is no longer active.";
pub const FLOW_FAILED: &str =
    "Something went wrong :( Please try again later. Returning you to the main menu.";

/// Anything that short-circuits the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MainMenu,
    Restart,
    Enter(Mode),
}

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        match text.trim() {
            MAIN_MENU | START_COMMAND => Some(Command::MainMenu),
            RESTART => Some(Command::Restart),
            COVER_LETTER => Some(Command::Enter(Mode::CoverLetter)),
            RESUME => Some(Command::Enter(Mode::Resume)),
            INTERVIEW => Some(Command::Enter(Mode::Interview)),
            VACANCY_SEARCH => Some(Command::Enter(Mode::Parser)),
            _ => None,
        }
    }
}

/// Yes/no answer to the "another project?" choice, by label or typed text.
pub fn parse_yes_no(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case(YES) {
        Some(true)
    } else if text.eq_ignore_ascii_case(NO) {
        Some(false)
    } else {
        None
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn main_menu_keyboard() -> Vec<String> {
    labels(&[COVER_LETTER, RESUME, INTERVIEW, VACANCY_SEARCH])
}

/// Shown while a flow is running.
pub fn main_menu_button() -> Vec<String> {
    labels(&[MAIN_MENU])
}

/// Shown once a flow has finished.
pub fn restart_menu() -> Vec<String> {
    labels(&[RESTART, MAIN_MENU])
}

pub fn yes_no() -> Vec<String> {
    labels(&[YES, NO])
}
