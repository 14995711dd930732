use std::collections::HashMap;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::config::CommandPattern;

/// What a chat command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Help,
    Current,
    Queue,
    Next,
    Unknown,
}

impl Intent {
    /// Any name the dispatcher does not handle maps to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "help" => Intent::Help,
            "current" => Intent::Current,
            "queue" => Intent::Queue,
            "next" => Intent::Next,
            _ => Intent::Unknown,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Help => "help",
            Intent::Current => "current",
            Intent::Queue => "queue",
            Intent::Next => "next",
            Intent::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// An utterance after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// The text exactly as the user sent it
    pub raw: String,
    pub intent: Intent,
    pub entities: HashMap<String, String>,
}

impl ResolvedCommand {
    pub fn new(raw: impl Into<String>, intent: Intent) -> Self {
        Self {
            raw: raw.into(),
            intent,
            entities: HashMap::new(),
        }
    }

    pub fn with_entity(mut self, slot: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(slot.into(), value.into());
        self
    }

    pub fn entity(&self, slot: &str) -> Option<&str> {
        self.entities.get(slot).map(String::as_str)
    }
}

/// Turns raw chat text into a `ResolvedCommand`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(&self, text: &str) -> ResolvedCommand;
}

struct PatternRule {
    intent: Intent,
    pattern: Regex,
}

/// Resolver built from an ordered list of regular expressions.
///
/// The first matching rule wins. Named capture groups become entities, so
/// `queue\s+(?P<Song>.*)` fills the `Song` slot.
pub struct PatternResolver {
    rules: Vec<PatternRule>,
}

impl PatternResolver {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, intent: Intent, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&format!(r"^\s*(?:{})\s*$", pattern))
            .case_insensitive(true)
            .build()?;
        self.rules.push(PatternRule { intent, pattern });
        Ok(self)
    }

    /// Configured patterns first, then the built-in ones.
    pub fn with_patterns(patterns: &[CommandPattern]) -> Result<Self, regex::Error> {
        let mut resolver = PatternResolver::new();
        for pattern in patterns {
            let intent = Intent::from_name(&pattern.intent);
            if intent == Intent::Unknown {
                tracing::warn!(
                    "Command pattern {:?} maps to unknown intent {:?}",
                    pattern.pattern,
                    pattern.intent
                );
            }
            resolver = resolver.with_rule(intent, &pattern.pattern)?;
        }
        resolver.with_builtin_rules()
    }

    /// The commands listed by `help`.
    fn with_builtin_rules(self) -> Result<Self, regex::Error> {
        self.with_rule(Intent::Help, r"help|\?")?
            .with_rule(Intent::Current, r"current|now playing|what'?s playing\??")?
            .with_rule(Intent::Next, r"next|skip")?
            .with_rule(Intent::Queue, r"queue(?:\s+(?P<Song>.*?))?")
    }

    pub fn resolve_text(&self, text: &str) -> ResolvedCommand {
        for rule in &self.rules {
            let Some(captures) = rule.pattern.captures(text) else {
                continue;
            };

            let mut command = ResolvedCommand::new(text, rule.intent);
            for name in rule.pattern.capture_names().flatten() {
                let value = captures.name(name).map(|m| m.as_str()).unwrap_or_default();
                command = command.with_entity(name, value);
            }
            return command;
        }

        ResolvedCommand::new(text, Intent::Unknown)
    }
}

impl Default for PatternResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IntentResolver for PatternResolver {
    async fn resolve(&self, text: &str) -> ResolvedCommand {
        self.resolve_text(text)
    }
}
