use crate::chat::data::InboundMessage;
use std::collections::HashSet;

pub const COMMAND_PREFIX: char = '!';

lazy_static::lazy_static! {
    static ref GREETINGS: HashSet<&'static str> = HashSet::from([
        "hey", "hi", "hello", "sup", "yo", "howdy", "greetings", "hola", "bonjour",
        "hallo", "ciao", "namaste", "salaam", "konnichiwa", "ni hao", "shalom",
        "jambo", "merhaba", "xin chao", "sawubona", "privet", "kamusta", "sveiki",
        "ahoj", "hujambo", "kumusta", "salut", "kia ora", "konnichi wa", "konnichiha",
    ]);
}

/// What a message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandMatch {
    NoMatch,
    Greeting { username: String },
    ClipRequest { channel: String },
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// The whole lower-cased message is one of these phrases, and is not a
    /// command.
    Phrase(HashSet<String>),
    /// The trimmed, lower-cased message is exactly this command, prefix
    /// included.
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    Greet,
    Clip,
}

#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub trigger: String,
    pub matcher: Matcher,
    pub action: CommandAction,
}

/// The commands the bot answers to, checked in registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandEntry {
    /// Matches `!<name>`, with no arguments.
    pub fn command(name: &str, action: CommandAction) -> Self {
        let name = name.trim().trim_start_matches(COMMAND_PREFIX).to_lowercase();
        Self {
            trigger: name.clone(),
            matcher: Matcher::Command(format!("{COMMAND_PREFIX}{name}")),
            action,
        }
    }

    pub fn phrases<I, S>(trigger: &str, phrases: I, action: CommandAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            trigger: String::from(trigger),
            matcher: Matcher::Phrase(
                phrases
                    .into_iter()
                    .map(|phrase| phrase.as_ref().to_lowercase())
                    .collect(),
            ),
            action,
        }
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Greets chatters who say hello, and makes a clip on `!clip`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(CommandEntry::phrases(
            "greeting",
            GREETINGS.iter(),
            CommandAction::Greet,
        ));
        registry.register(CommandEntry::command("clip", CommandAction::Clip));
        registry
    }

    pub fn register(&mut self, entry: CommandEntry) {
        self.entries.push(entry);
    }

    /// Decides what `msg` asks for. Never more than one command matches.
    ///
    /// Messages from the bot itself never match. Neither does a message that
    /// starts with the command prefix but is not exactly a registered command.
    #[must_use]
    pub fn match_message(&self, msg: &InboundMessage) -> CommandMatch {
        if msg.is_self {
            return CommandMatch::NoMatch;
        }

        let command_text = msg.text.trim().to_lowercase();
        if command_text.starts_with(COMMAND_PREFIX) && !self.is_command(&command_text) {
            return CommandMatch::NoMatch;
        }
        let full_text = msg.text.to_lowercase();

        let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.matcher.matches(&full_text, &command_text))
        else {
            return CommandMatch::NoMatch;
        };
        log::debug!("Message matched {:?}", entry.trigger);

        match entry.action {
            CommandAction::Greet => match msg.sender_name() {
                Some(name) => CommandMatch::Greeting {
                    username: String::from(name),
                },
                None => {
                    log::debug!("Not greeting a message without a sender name");
                    CommandMatch::NoMatch
                }
            },
            CommandAction::Clip => CommandMatch::ClipRequest {
                channel: msg.channel.clone(),
            },
        }
    }

    fn is_command(&self, command_text: &str) -> bool {
        self.entries.iter().any(|entry| match &entry.matcher {
            Matcher::Command(command) => command == command_text,
            Matcher::Phrase(_) => false,
        })
    }
}

impl Matcher {
    fn matches(&self, full_text: &str, command_text: &str) -> bool {
        match self {
            Matcher::Phrase(phrases) => {
                !full_text.starts_with(COMMAND_PREFIX) && phrases.contains(full_text)
            }
            Matcher::Command(command) => command == command_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_viewer(text: &str) -> InboundMessage {
        InboundMessage {
            channel: String::from("#eye_motif"),
            sender_tags: [
                (String::from("display-name"), String::from("Viewer")),
                (String::from("username"), String::from("viewer")),
            ]
            .into_iter()
            .collect(),
            text: String::from(text),
            is_self: false,
        }
    }

    fn from_bot(text: &str) -> InboundMessage {
        InboundMessage {
            is_self: true,
            ..from_viewer(text)
        }
    }

    fn greeting() -> CommandMatch {
        CommandMatch::Greeting {
            username: String::from("Viewer"),
        }
    }

    fn clip() -> CommandMatch {
        CommandMatch::ClipRequest {
            channel: String::from("#eye_motif"),
        }
    }

    #[test]
    fn greets_every_greeting_in_any_case() {
        let registry = CommandRegistry::builtin();
        for token in GREETINGS.iter() {
            for text in [token.to_string(), token.to_uppercase(), capitalize(token)] {
                assert_eq!(registry.match_message(&from_viewer(&text)), greeting(), "{text:?}");
            }
        }
    }

    #[test]
    fn greetings_need_an_exact_match() {
        let registry = CommandRegistry::builtin();
        for text in ["hi there", "oh hello", "hiya", "", " hi", "hi ", "!hi", "!hello"] {
            assert_eq!(
                registry.match_message(&from_viewer(text)),
                CommandMatch::NoMatch,
                "{text:?}"
            );
        }
    }

    #[test]
    fn clip_is_trimmed_and_case_insensitive() {
        let registry = CommandRegistry::builtin();
        for text in ["!clip", "!CLIP", "!Clip", "!CLIP ", "  !clip\t"] {
            assert_eq!(registry.match_message(&from_viewer(text)), clip(), "{text:?}");
        }
    }

    #[test]
    fn clip_takes_no_arguments() {
        let registry = CommandRegistry::builtin();
        for text in ["!clip now", "!clips", "!cl ip", "clip", "!unknown"] {
            assert_eq!(
                registry.match_message(&from_viewer(text)),
                CommandMatch::NoMatch,
                "{text:?}"
            );
        }
    }

    #[test]
    fn self_messages_never_match() {
        let registry = CommandRegistry::builtin();
        for text in ["hi", "HELLO", "!clip", "!CLIP "] {
            assert_eq!(
                registry.match_message(&from_bot(text)),
                CommandMatch::NoMatch,
                "{text:?}"
            );
        }
    }

    #[test]
    fn greets_by_login_without_display_name() {
        let mut msg = from_viewer("hey");
        msg.sender_tags.remove("display-name");

        assert_eq!(
            CommandRegistry::builtin().match_message(&msg),
            CommandMatch::Greeting {
                username: String::from("viewer")
            }
        );
    }

    #[test]
    fn skips_greeting_without_any_name() {
        let mut msg = from_viewer("hey");
        msg.sender_tags.clear();

        assert_eq!(
            CommandRegistry::builtin().match_message(&msg),
            CommandMatch::NoMatch
        );
    }

    #[test]
    fn registered_commands_extend_the_registry() {
        let mut registry = CommandRegistry::builtin();
        registry.register(CommandEntry::command("!Highlight", CommandAction::Clip));

        assert_eq!(registry.match_message(&from_viewer("!highlight")), clip());
        assert_eq!(registry.match_message(&from_viewer("!HIGHLIGHT")), clip());
        assert_eq!(registry.match_message(&from_viewer("!clip")), clip());
    }

    #[test]
    fn empty_registry_matches_nothing() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.match_message(&from_viewer("hi")), CommandMatch::NoMatch);
        assert_eq!(registry.match_message(&from_viewer("!clip")), CommandMatch::NoMatch);
    }

    fn capitalize(text: &str) -> String {
        let mut chars = text.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    }
}
