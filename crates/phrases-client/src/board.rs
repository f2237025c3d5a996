//! Day-by-day task board. Purely in memory.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use phrases_core::store::is_blank;
use serde::{Deserialize, Serialize};

pub const TODAY: &str = "Hoy";
pub const TAGS: [&str; 4] = ["Urgente", "Escuela", "Personal", "Trabajo"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("task content must not be blank")]
    Blank,
    #[error("unknown task: {0}")]
    UnknownTask(String),
}

/// Where a dragged task lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Take the position of this task, in its column.
    Task(String),
    /// Append to the end of this day.
    Column(NaiveDate),
}

#[derive(Clone, Debug, Default)]
pub struct TaskBoard {
    columns: BTreeMap<NaiveDate, Vec<Task>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, date: NaiveDate) -> &[Task] {
        self.columns.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty days in calendar order.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &[Task])> + '_ {
        self.columns
            .iter()
            .filter(|(_, tasks)| !tasks.is_empty())
            .map(|(date, tasks)| (*date, tasks.as_slice()))
    }

    fn locate(&self, id: &str) -> Option<(NaiveDate, usize)> {
        self.columns.iter().find_map(|(date, tasks)| {
            tasks
                .iter()
                .position(|t| t.id == id)
                .map(|idx| (*date, idx))
        })
    }

    fn slot_mut(&mut self, id: &str) -> Result<&mut Task, BoardError> {
        let (date, idx) = self
            .locate(id)
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;
        self.columns
            .get_mut(&date)
            .and_then(|tasks| tasks.get_mut(idx))
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))
    }

    pub fn add_task(&mut self, date: NaiveDate, content: &str) -> Result<&Task, BoardError> {
        if is_blank(content) {
            return Err(BoardError::Blank);
        }
        let tasks = self.columns.entry(date).or_default();
        let idx = tasks.len();
        tasks.push(Task {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
        });
        Ok(&tasks[idx])
    }

    pub fn edit_task(&mut self, id: &str, content: &str) -> Result<(), BoardError> {
        if is_blank(content) {
            return Err(BoardError::Blank);
        }
        self.slot_mut(id)?.content = content.to_string();
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, BoardError> {
        let (date, idx) = self
            .locate(id)
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;
        self.columns
            .get_mut(&date)
            .map(|tasks| tasks.remove(idx))
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))
    }

    pub fn move_task(&mut self, active_id: &str, target: Target) -> Result<(), BoardError> {
        let (from_date, from_idx) = self
            .locate(active_id)
            .ok_or_else(|| BoardError::UnknownTask(active_id.to_string()))?;
        let (to_date, to_idx) = match target {
            Target::Task(over_id) if over_id == active_id => return Ok(()),
            Target::Task(over_id) => self
                .locate(&over_id)
                .map(|(date, idx)| (date, Some(idx)))
                .ok_or(BoardError::UnknownTask(over_id))?,
            Target::Column(date) => (date, None),
        };

        let task = match self.columns.get_mut(&from_date) {
            Some(tasks) => tasks.remove(from_idx),
            None => return Err(BoardError::UnknownTask(active_id.to_string())),
        };
        let dest = self.columns.entry(to_date).or_default();
        match to_idx {
            Some(idx) => dest.insert(idx.min(dest.len()), task),
            None => dest.push(task),
        }
        Ok(())
    }
}

fn weekday_es(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

pub fn day_heading(date: NaiveDate, today: NaiveDate) -> &'static str {
    if date == today {
        TODAY
    } else {
        weekday_es(date.weekday())
    }
}

/// Stable decorative tag picked from the content length in characters.
pub fn task_tag(content: &str) -> &'static str {
    TAGS[content.chars().count() % TAGS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    fn contents(board: &TaskBoard, date: NaiveDate) -> Vec<&str> {
        board
            .column(date)
            .iter()
            .map(|t| t.content.as_str())
            .collect()
    }

    fn board_with(tasks: &[(u32, &str)]) -> (TaskBoard, Vec<String>) {
        let mut board = TaskBoard::new();
        let ids = tasks
            .iter()
            .map(|(d, c)| board.add_task(day(*d), c).expect("add").id.clone())
            .collect();
        (board, ids)
    }

    #[test]
    fn add_edit_delete() {
        let (mut board, ids) = board_with(&[(4, "uno"), (4, "dos")]);
        assert_eq!(contents(&board, day(4)), ["uno", "dos"]);
        assert_eq!(board.add_task(day(4), " ").unwrap_err(), BoardError::Blank);

        board.edit_task(&ids[0], "uno bis").expect("edit");
        assert_eq!(board.edit_task(&ids[0], ""), Err(BoardError::Blank));
        assert_eq!(contents(&board, day(4)), ["uno bis", "dos"]);

        let removed = board.delete_task(&ids[1]).expect("delete");
        assert_eq!(removed.content, "dos");
        assert!(matches!(
            board.delete_task(&ids[1]),
            Err(BoardError::UnknownTask(_))
        ));
    }

    #[test]
    fn move_within_column_is_array_move() {
        let (mut board, ids) = board_with(&[(4, "a"), (4, "b"), (4, "c")]);
        board
            .move_task(&ids[0], Target::Task(ids[2].clone()))
            .expect("move down");
        assert_eq!(contents(&board, day(4)), ["b", "c", "a"]);
        board
            .move_task(&ids[0], Target::Task(ids[1].clone()))
            .expect("move up");
        assert_eq!(contents(&board, day(4)), ["a", "b", "c"]);
    }

    #[test]
    fn move_across_columns() {
        let (mut board, ids) = board_with(&[(4, "a"), (5, "x"), (5, "y")]);
        board
            .move_task(&ids[0], Target::Task(ids[2].clone()))
            .expect("onto task");
        assert_eq!(contents(&board, day(4)), Vec::<&str>::new());
        assert_eq!(contents(&board, day(5)), ["x", "a", "y"]);

        board
            .move_task(&ids[1], Target::Column(day(6)))
            .expect("onto empty day");
        assert_eq!(contents(&board, day(6)), ["x"]);
        assert_eq!(board.days().count(), 2);
    }

    #[test]
    fn move_onto_self_is_noop() {
        let (mut board, ids) = board_with(&[(4, "a"), (4, "b")]);
        board
            .move_task(&ids[1], Target::Task(ids[1].clone()))
            .expect("noop");
        assert_eq!(contents(&board, day(4)), ["a", "b"]);
        assert!(board.move_task("nope", Target::Column(day(4))).is_err());
    }

    #[test]
    fn headings_and_tags() {
        // 2024-03-04 is a Monday.
        assert_eq!(day_heading(day(4), day(4)), "Hoy");
        assert_eq!(day_heading(day(4), day(1)), "lunes");
        assert_eq!(day_heading(day(6), day(1)), "miércoles");
        assert_eq!(task_tag("abcd"), "Urgente");
        assert_eq!(task_tag("a"), "Escuela");
        assert_eq!(task_tag("ab"), "Personal");
        assert_eq!(task_tag("año"), "Trabajo");
    }
}
