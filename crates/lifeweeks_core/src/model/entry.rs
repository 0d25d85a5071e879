//! Week entry and todo records.
//!
//! # Responsibility
//! - Define user-authored content attached to one week.
//! - Keep todo completion timestamps consistent with the completion flag.
//!
//! # Invariants
//! - `Todo::completed_at` is `Some` exactly when `completed` is true.
//! - `WeekEntry::end_date` is six days after `start_date`, a Monday.

use crate::model::week::WeekSpan;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 1-based ordinal of a week since the birth-aligned anchor week.
pub type WeekNumber = u32;

/// Stable identifier of a todo inside its week entry.
pub type TodoId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Creates an open todo with a generated ID.
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    /// Flips completion; stamps `completed_at` on completion and clears it on reopen.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub id: Uuid,
    pub week_number: WeekNumber,
    /// Monday of the week.
    pub start_date: NaiveDate,
    /// Sunday of the week.
    pub end_date: NaiveDate,
    pub journal: String,
    /// Display order is insertion order.
    pub todos: Vec<Todo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeekEntry {
    /// Creates an empty entry for the given week span.
    pub fn new(week_number: WeekNumber, span: WeekSpan, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            week_number,
            start_date: span.start,
            end_date: span.end,
            journal: String::new(),
            todos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn span(&self) -> WeekSpan {
        WeekSpan {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn todo_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id == id)
    }

    /// Removes one todo, returning it when present.
    pub fn remove_todo(&mut self, id: TodoId) -> Option<Todo> {
        let index = self.todos.iter().position(|todo| todo.id == id)?;
        Some(self.todos.remove(index))
    }

    pub fn completed_todo_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
