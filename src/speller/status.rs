use crate::speller::document::{ChangeKind, TextChange};
use crate::LogicalDirection;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTag {
    Clean,
    Dirty,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Clean,
    Dirty,
    /// Suggestions stay `None` until someone asks for them.
    Error { suggestions: Option<Vec<String>> },
}

impl RunState {
    pub fn tag(&self) -> RunTag {
        match self {
            RunState::Clean => RunTag::Clean,
            RunState::Dirty => RunTag::Dirty,
            RunState::Error { .. } => RunTag::Error,
        }
    }

    fn error() -> Self {
        RunState::Error { suggestions: None }
    }
}

#[derive(Debug, Clone)]
struct StatusRun {
    start: usize,
    state: RunState,
}

/// Run-length partition of the document into Clean, Dirty and Error spans.
///
/// The runs always cover `[0, len)` and neighbouring runs never share a tag.
#[derive(Debug, Clone)]
pub struct StatusTable {
    runs: Vec<StatusRun>,
    length: usize,
}

impl StatusTable {
    /// A fresh table, everything dirty.
    pub fn new(length: usize) -> Self {
        Self {
            runs: vec![StatusRun {
                start: 0,
                state: RunState::Dirty,
            }],
            length,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Runs as `(range, state)`, skipping the placeholder run of an empty table.
    pub fn iter(&self) -> impl Iterator<Item = (Range<usize>, &RunState)> + '_ {
        (0..self.runs.len())
            .map(move |i| (self.runs[i].start..self.run_end(i), &self.runs[i].state))
            .filter(|(range, _)| !range.is_empty())
    }

    fn run_end(&self, index: usize) -> usize {
        self.runs.get(index + 1).map_or(self.length, |r| r.start)
    }

    fn index_of(&self, position: usize) -> usize {
        self.runs
            .partition_point(|r| r.start <= position)
            .saturating_sub(1)
    }

    /// Make sure a run starts at `position` and return its index.
    fn split_at(&mut self, position: usize) -> usize {
        if position >= self.length {
            return self.runs.len();
        }
        let index = self.index_of(position);
        if self.runs[index].start == position {
            return index;
        }
        let state = self.runs[index].state.clone();
        self.runs.insert(index + 1, StatusRun { start: position, state });
        index + 1
    }

    fn coalesce(&mut self, index: usize) {
        if index + 1 < self.runs.len() && self.runs[index].state.tag() == self.runs[index + 1].state.tag() {
            self.runs.remove(index + 1);
            if self.runs[index].state.tag() == RunTag::Error {
                self.runs[index].state = RunState::error();
            }
        }
        if index > 0 && index < self.runs.len() && self.runs[index - 1].state.tag() == self.runs[index].state.tag() {
            self.runs.remove(index);
            if self.runs[index - 1].state.tag() == RunTag::Error {
                self.runs[index - 1].state = RunState::error();
            }
        }
    }

    fn coalesce_all(&mut self) {
        let mut index = self.runs.len();
        while index > 1 {
            index -= 1;
            self.coalesce(index);
            index = index.min(self.runs.len());
        }
    }

    fn mark(&mut self, range: Range<usize>, state: RunState) {
        let start = range.start.min(self.length);
        let end = range.end.min(self.length);
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        self.runs.splice(first..last, [StatusRun { start, state }]);
        self.coalesce(first);
    }

    pub fn mark_dirty(&mut self, range: Range<usize>) {
        self.mark(range, RunState::Dirty);
    }

    pub fn mark_clean(&mut self, range: Range<usize>) {
        self.mark(range, RunState::Clean);
    }

    /// Flag an error. The range must already be clean.
    pub fn mark_error(&mut self, range: Range<usize>) {
        if range.start >= range.end.min(self.length) {
            return;
        }
        debug_assert!(
            self.is_all_clean(range.clone()),
            "errors are only marked over clean ranges: {:?}",
            range
        );
        self.mark(range, RunState::error());
    }

    fn is_all_clean(&self, range: Range<usize>) -> bool {
        self.iter()
            .filter(|(r, _)| r.start < range.end && r.end > range.start)
            .all(|(_, state)| state.tag() == RunTag::Clean)
    }

    /// Track a document mutation.
    pub fn on_text_change(&mut self, change: &TextChange) {
        match change.kind {
            ChangeKind::Insert => self.insert(change.offset, change.length),
            ChangeKind::Remove => self.remove(change.offset, change.length),
            ChangeKind::Property => self.mark_dirty(change.offset..change.offset + change.length),
        }
    }

    fn insert(&mut self, offset: usize, length: usize) {
        if length == 0 {
            return;
        }
        let offset = offset.min(self.length);
        let index = if self.length == 0 { 0 } else { self.split_at(offset) };
        for run in &mut self.runs[index..] {
            run.start += length;
        }
        self.runs.insert(
            index,
            StatusRun {
                start: offset,
                state: RunState::Dirty,
            },
        );
        self.length += length;
        self.coalesce(index);
    }

    fn remove(&mut self, offset: usize, length: usize) {
        let start = offset.min(self.length);
        let end = (offset + length).min(self.length);
        if start < end {
            let first = self.split_at(start);
            let last = self.split_at(end);
            self.runs.drain(first..last);
            for run in &mut self.runs[first..] {
                run.start -= end - start;
            }
            self.length -= end - start;
            if self.runs.is_empty() {
                self.runs.push(StatusRun {
                    start: 0,
                    state: RunState::Dirty,
                });
            } else {
                self.coalesce(first.min(self.runs.len() - 1));
            }
        }
        // The characters on both sides of the seam now form a new word.
        self.mark_dirty(start.saturating_sub(1)..start + 1);
    }

    /// State of the run next to `position` and the far edge of that run.
    pub fn get_run(&self, position: usize, direction: LogicalDirection) -> Option<(&RunState, usize)> {
        match direction {
            LogicalDirection::Forward => {
                if position >= self.length {
                    return None;
                }
                let index = self.index_of(position);
                Some((&self.runs[index].state, self.run_end(index)))
            }
            LogicalDirection::Backward => {
                if position == 0 || position > self.length {
                    return None;
                }
                let index = self.index_of(position - 1);
                Some((&self.runs[index].state, self.runs[index].start))
            }
        }
    }

    /// The Error run next to `position`, if any.
    pub fn get_error(&self, position: usize, direction: LogicalDirection) -> Option<Range<usize>> {
        let (state, edge) = self.get_run(position, direction)?;
        if state.tag() != RunTag::Error {
            return None;
        }
        let anchor = match direction {
            LogicalDirection::Forward => position,
            LogicalDirection::Backward => edge,
        };
        let index = self.index_of(anchor);
        Some(self.runs[index].start..self.run_end(index))
    }

    /// Nearest position past `position` where an Error run starts or ends.
    pub fn next_error_transition(&self, position: usize, direction: LogicalDirection) -> Option<usize> {
        let mut edges = self
            .iter()
            .filter(|(_, state)| state.tag() == RunTag::Error)
            .flat_map(|(range, _)| [range.start, range.end]);
        match direction {
            LogicalDirection::Forward => edges.find(|&edge| edge > position),
            LogicalDirection::Backward => edges.filter(|&edge| edge < position).last(),
        }
    }

    /// Start of the next Error run at or after `position` (or ending before it, backward).
    pub fn next_error_start(&self, position: usize, direction: LogicalDirection) -> Option<usize> {
        let mut errors = self.iter().filter(|(_, state)| state.tag() == RunTag::Error);
        match direction {
            LogicalDirection::Forward => errors.find(|(range, _)| range.start >= position).map(|(r, _)| r.start),
            LogicalDirection::Backward => errors
                .filter(|(range, _)| range.end <= position)
                .last()
                .map(|(r, _)| r.start),
        }
    }

    pub fn get_first_dirty_range(&self, search_start: usize) -> Option<Range<usize>> {
        if search_start >= self.length {
            return None;
        }
        let first = self.index_of(search_start);
        (first..self.runs.len())
            .find(|&i| self.runs[i].state.tag() == RunTag::Dirty)
            .map(|i| self.runs[i].start.max(search_start)..self.run_end(i))
            .filter(|range| !range.is_empty())
    }

    pub fn suggestions(&self, position: usize) -> Option<&[String]> {
        if position >= self.length {
            return None;
        }
        match &self.runs[self.index_of(position)].state {
            RunState::Error {
                suggestions: Some(list),
            } => Some(list),
            _ => None,
        }
    }

    pub fn set_suggestions(&mut self, position: usize, list: Vec<String>) {
        if position >= self.length {
            return;
        }
        let index = self.index_of(position);
        if let RunState::Error { suggestions } = &mut self.runs[index].state {
            *suggestions = Some(list);
        }
    }

    /// Clear every Error run whose text equals `word`, ignoring case.
    pub fn ignore_all<F>(&mut self, word: &str, text_of: F) -> usize
    where
        F: Fn(Range<usize>) -> String,
    {
        let word = word.to_lowercase();
        let mut cleared = 0;
        for index in 0..self.runs.len() {
            if self.runs[index].state.tag() != RunTag::Error {
                continue;
            }
            let range = self.runs[index].start..self.run_end(index);
            if text_of(range).to_lowercase() == word {
                self.runs[index].state = RunState::Clean;
                cleared += 1;
            }
        }
        if cleared > 0 {
            self.coalesce_all();
        }
        cleared
    }
}
