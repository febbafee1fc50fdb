//! Prompt construction for notice analysis and follow-up chat.
//!
//! Pure functions: identical inputs always yield byte-identical prompt
//! strings. No randomness, timestamps, or shared state.

use crate::conversation::Message;

/// System instruction for the initial analysis prompt.
const INITIAL_SYSTEM: &str =
    "You are a concise legal assistant. Use ONLY the notice text below. If unsure, say so.";

/// System instruction for follow-up chat.
const FOLLOW_UP_SYSTEM: &str =
    "You are a concise legal assistant. Use ONLY the notice text (if provided) as context. If unsure, say so.";

/// A built prompt, split into system instruction and user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Convert to role-tagged messages for the completion provider.
    pub fn into_messages(self) -> Vec<Message> {
        vec![Message::system(self.system), Message::user(self.user)]
    }
}

/// Build the prompt for the initial analysis of an extracted notice.
///
/// Requests exactly three labeled bullet sections, in order:
/// "Do:", "Don't:", "Next Steps:".
pub fn initial_prompt(notice_text: &str) -> Prompt {
    Prompt {
        system: INITIAL_SYSTEM.to_string(),
        user: format!(
            "NOTICE TEXT:\n{}\n\n\
             Return your answer in three clear sections with brief bullet points:\
             \n\nDo:\n- ...\
             \n\nDon't:\n- ...\
             \n\nNext Steps:\n- ...",
            notice_text
        ),
    }
}

/// Build the prompt for a follow-up question.
///
/// The notice text block is included only when provided; when absent it is
/// omitted entirely rather than replaced with a placeholder.
pub fn follow_up_prompt(notice_text: Option<&str>, user_question: &str) -> Prompt {
    let notice_block = match notice_text {
        Some(text) => format!("NOTICE TEXT:\n{}\n\n", text),
        None => String::new(),
    };
    Prompt {
        system: FOLLOW_UP_SYSTEM.to_string(),
        user: format!(
            "{}User asks: {}\n\
             Answer with short bullet points prioritizing Do / Don't / Next Steps.",
            notice_block, user_question
        ),
    }
}
