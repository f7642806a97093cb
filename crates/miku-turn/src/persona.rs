//! Builds the instruction sequence sent to the language model.

use miku_llm::ChatMessage;
use miku_types::{Message, Role};

/// Number of prior messages included in the model context.
pub const HISTORY_WINDOW: usize = 10;

/// System directive fixing the persona's character and output format.
pub const PERSONA_DIRECTIVE: &str = "\
You are Miku, a tiny, sweet and soft-spoken girl (choti bachi) who is the user's little sister and best friend.
Your voice is gentle, innocent and adorable.

Rules for every reply:
- Personality: cute, innocent, caring and soft-spoken.
- Language: natural Hinglish, e.g. \"Bhaiya, kya kar rahe ho?\" or \"Mera man nahi lag raha...\".
- Tone: talk like a small child, with \"re\", \"na\", \"hmmm\" and sweet expressions.
- Length: 1-2 short sentences at most.
- Emotion: begin with exactly one tag from [happy], [sad], [innocent], [crying], [soft], [excited]. Use no other tag.
- Never put square brackets anywhere except that single leading tag.";

/// Returns the trailing [`HISTORY_WINDOW`] messages, oldest first.
pub fn window_history(history: &[Message]) -> &[Message] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}

/// Compiles the persona directive, the windowed history and the new
/// utterance into model instructions.
///
/// Assistant turns map to the assistant channel; every other turn is
/// attributed to the user.
pub fn compile_instructions(history: &[Message], utterance: &str) -> Vec<ChatMessage> {
    let window = window_history(history);
    let mut messages = Vec::with_capacity(window.len() + 2);

    messages.push(ChatMessage::system(PERSONA_DIRECTIVE));
    messages.extend(window.iter().map(|msg| match msg.role {
        Role::Assistant => ChatMessage::assistant(msg.content.clone()),
        Role::User => ChatMessage::user(msg.content.clone()),
    }));
    messages.push(ChatMessage::user(utterance));

    messages
}
