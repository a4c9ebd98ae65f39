//! Cascading catalog selection (Year → Specialty → Semester → Module).
//!
//! The selection is an explicit state machine: choosing a value at one
//! level clears every level below it and invalidates the option lists that
//! depend on it. Each dependent list carries an epoch; a fetch started under
//! an older epoch is recognised as stale through its [`SelectionTicket`] and
//! its response can be dropped instead of overwriting newer state.

use crate::types::DocId;

/// Option lists driven by the selection, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListLevel {
    Years,
    Specialties,
    Semesters,
    Modules,
    Resources,
}

impl ListLevel {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

/// Levels that hold a selected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionLevel {
    Year,
    Specialty,
    Semester,
    Module,
}

impl SelectionLevel {
    fn index(self) -> usize {
        self as usize
    }

    /// The list whose content depends on this level's value.
    pub fn child_list(self) -> ListLevel {
        match self {
            Self::Year => ListLevel::Specialties,
            Self::Specialty => ListLevel::Semesters,
            Self::Semester => ListLevel::Modules,
            Self::Module => ListLevel::Resources,
        }
    }
}

/// Proof of which selection state a fetch was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    level: ListLevel,
    epoch: u64,
}

impl SelectionTicket {
    pub fn level(&self) -> ListLevel {
        self.level
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSelection {
    values: [Option<String>; 4],
    epochs: [u64; ListLevel::COUNT],
}

impl CatalogSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: SelectionLevel) -> Option<&str> {
        self.values[level.index()].as_deref()
    }

    pub fn year_id(&self) -> Option<&str> {
        self.get(SelectionLevel::Year)
    }

    pub fn specialty_id(&self) -> Option<&str> {
        self.get(SelectionLevel::Specialty)
    }

    pub fn semester_key(&self) -> Option<&str> {
        self.get(SelectionLevel::Semester)
    }

    pub fn module_id(&self) -> Option<&str> {
        self.get(SelectionLevel::Module)
    }

    /// Set the value at `level`, clearing every level below it.
    ///
    /// Blank values count as no selection. Returns `false` (and changes
    /// nothing) when the value is already selected.
    pub fn select(&mut self, level: SelectionLevel, value: Option<DocId>) -> bool {
        let value = value.filter(|v| !v.trim().is_empty());
        let idx = level.index();
        if self.values[idx] == value {
            return false;
        }
        self.values[idx] = value;
        for slot in self.values.iter_mut().skip(idx + 1) {
            *slot = None;
        }
        for epoch in self.epochs.iter_mut().skip(level.child_list().index()) {
            *epoch += 1;
        }
        true
    }

    pub fn select_year(&mut self, id: Option<DocId>) -> bool {
        self.select(SelectionLevel::Year, id)
    }

    pub fn select_specialty(&mut self, id: Option<DocId>) -> bool {
        self.select(SelectionLevel::Specialty, id)
    }

    pub fn select_semester(&mut self, key: Option<String>) -> bool {
        self.select(SelectionLevel::Semester, key)
    }

    pub fn select_module(&mut self, id: Option<DocId>) -> bool {
        self.select(SelectionLevel::Module, id)
    }

    /// Ticket to attach to a fetch of `level`'s list.
    pub fn ticket(&self, level: ListLevel) -> SelectionTicket {
        SelectionTicket {
            level,
            epoch: self.epochs[level.index()],
        }
    }

    /// Whether a response fetched under `ticket` still matches the selection.
    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        self.epochs[ticket.level.index()] == ticket.epoch
    }

    /// Whether every ancestor needed to fetch `level`'s list is selected.
    pub fn can_load(&self, level: ListLevel) -> bool {
        let required = match level {
            ListLevel::Years => 0,
            ListLevel::Specialties => 1,
            ListLevel::Semesters => 2,
            ListLevel::Modules => 3,
            ListLevel::Resources => 4,
        };
        self.values.iter().take(required).all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.values = Default::default();
        for epoch in self.epochs.iter_mut().skip(ListLevel::Specialties.index()) {
            *epoch += 1;
        }
    }
}
