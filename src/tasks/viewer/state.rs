use std::time::{Duration, Instant};

use crate::config::SectionKind;
use crate::events::ViewerCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hero,
    Gallery,
}

impl From<SectionKind> for Section {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Hero => Section::Hero,
            SectionKind::Gallery => Section::Gallery,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SectionChange {
    pub from: Section,
    pub to: Section,
}

/// Which section the window shows.
pub struct SectionSM {
    section: Section,
    entered_at: Instant,
}

impl SectionSM {
    pub fn new(start: Section, now: Instant) -> Self {
        Self {
            section: start,
            entered_at: now,
        }
    }

    pub fn current(&self) -> Section {
        self.section
    }

    pub fn time_in_section(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.entered_at)
    }

    pub fn on_command(&mut self, cmd: &ViewerCommand, now: Instant) -> Option<SectionChange> {
        match *cmd {
            ViewerCommand::ToggleSection => match self.section {
                Section::Hero => self.goto(Section::Gallery, now),
                Section::Gallery => self.goto(Section::Hero, now),
            },
            ViewerCommand::SelectSlide(_) | ViewerCommand::AdvanceSlide => None,
        }
    }

    fn goto(&mut self, to: Section, now: Instant) -> Option<SectionChange> {
        if self.section == to {
            return None;
        }
        let ch = SectionChange {
            from: self.section,
            to,
        };
        self.section = to;
        self.entered_at = now;
        Some(ch)
    }
}
