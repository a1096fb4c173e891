// src/navigation.rs
use serde::{Deserialize, Serialize};

use crate::error::NavigationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationCommand {
    Advance,
    Retreat,
}

impl NavigationCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationCommand::Advance => "advance",
            NavigationCommand::Retreat => "retreat",
        }
    }
}

/// A paginated viewer driven by gestures and by direct clicks alike.
///
/// Both operations move exactly one page and wrap around at either end.
pub trait NavigationSink {
    fn page_count(&self) -> usize;
    fn current_index(&self) -> usize;
    fn advance(&mut self);
    fn retreat(&mut self);

    fn apply(&mut self, command: NavigationCommand) {
        match command {
            NavigationCommand::Advance => self.advance(),
            NavigationCommand::Retreat => self.retreat(),
        }
    }
}

/// Titled sections of the résumé viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDeck {
    titles: Vec<String>,
    current: usize,
}

impl SectionDeck {
    pub fn new(titles: Vec<String>) -> Result<Self, NavigationError> {
        if titles.is_empty() {
            return Err(NavigationError::EmptyDeck);
        }
        Ok(Self { titles, current: 0 })
    }

    /// Direct selection of a section, as from a tab click.
    pub fn jump_to(&mut self, index: usize) -> Result<(), NavigationError> {
        if index >= self.titles.len() {
            return Err(NavigationError::IndexOutOfRange {
                index,
                count: self.titles.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    pub fn current_section(&self) -> &str {
        &self.titles[self.current]
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }
}

impl NavigationSink for SectionDeck {
    fn page_count(&self) -> usize {
        self.titles.len()
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn advance(&mut self) {
        self.current = (self.current + 1) % self.titles.len();
    }

    fn retreat(&mut self) {
        let count = self.titles.len();
        self.current = (self.current + count - 1) % count;
    }
}
