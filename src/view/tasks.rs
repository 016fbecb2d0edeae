//! Task list tabs and task detail derivations

use std::cmp::Reverse;
use std::fmt;

use serde::Serialize;

use crate::client::models::{ChecklistItem, StatusSummary, Task, TaskList, TaskStatus};

/// Status tab over the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StatusTab {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusTab {
    pub const ALL: [StatusTab; 4] = [
        StatusTab::All,
        StatusTab::Pending,
        StatusTab::InProgress,
        StatusTab::Completed,
    ];

    /// Server-side filter for this tab
    pub fn filter(self) -> Option<TaskStatus> {
        match self {
            StatusTab::All => None,
            StatusTab::Pending => Some(TaskStatus::Pending),
            StatusTab::InProgress => Some(TaskStatus::InProgress),
            StatusTab::Completed => Some(TaskStatus::Completed),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTab::All => "All",
            StatusTab::Pending => "Pending",
            StatusTab::InProgress => "In Progress",
            StatusTab::Completed => "Completed",
        }
    }

    pub fn count(self, summary: &StatusSummary) -> u64 {
        summary.count(self.filter())
    }
}

impl From<Option<TaskStatus>> for StatusTab {
    fn from(status: Option<TaskStatus>) -> Self {
        match status {
            None => StatusTab::All,
            Some(TaskStatus::Pending) => StatusTab::Pending,
            Some(TaskStatus::InProgress) => StatusTab::InProgress,
            Some(TaskStatus::Completed) => StatusTab::Completed,
        }
    }
}

impl fmt::Display for StatusTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabCount {
    pub tab: StatusTab,
    pub count: u64,
}

/// What the task list screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskListView {
    pub tabs: Vec<TabCount>,
    pub active: StatusTab,
    pub active_count: u64,
    pub rows: Vec<Task>,
    pub is_empty: bool,
}

/// Build the list screen: tab counts from the summary, rows narrowed to the
/// active tab and the search text, newest first.
pub fn task_list_view(list: &TaskList, active: StatusTab, search: &str) -> TaskListView {
    let needle = search.trim().to_lowercase();
    let mut rows: Vec<Task> = list
        .items
        .iter()
        .filter(|t| active.filter().is_none_or(|s| t.status == s))
        .filter(|t| matches_search(t, &needle))
        .cloned()
        .collect();
    // Undated tasks sort last
    rows.sort_by_key(|t| Reverse(t.created_at));

    let tabs = StatusTab::ALL
        .iter()
        .map(|&tab| TabCount {
            tab,
            count: tab.count(&list.status_summary),
        })
        .collect();

    TaskListView {
        tabs,
        active,
        active_count: active.count(&list.status_summary),
        is_empty: rows.is_empty(),
        rows,
    }
}

fn matches_search(task: &Task, needle: &str) -> bool {
    needle.is_empty()
        || task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
}

/// Checklist completion as a whole percentage; 0 when there is no checklist
pub fn progress_percent(task: &Task) -> u32 {
    let total = task.todo_checklist.len();
    if total == 0 {
        return 0;
    }
    let done = task.completed_count().min(total);
    (done * 100 / total) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistRow {
    pub index: usize,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetailView {
    pub task: Task,
    pub progress_percent: u32,
    pub completed: usize,
    pub total: usize,
    pub checklist: Vec<ChecklistRow>,
}

pub fn task_detail_view(task: &Task) -> TaskDetailView {
    let checklist = task
        .todo_checklist
        .iter()
        .enumerate()
        .map(|(index, ChecklistItem { text, completed })| ChecklistRow {
            index,
            text: text.clone(),
            completed: *completed,
        })
        .collect();
    TaskDetailView {
        task: task.clone(),
        progress_percent: progress_percent(task),
        completed: task.completed_count(),
        total: task.todo_checklist.len(),
        checklist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::fixtures::{task, task_with_checklist};
    use chrono::{TimeZone, Utc};

    fn dated(id: &str, status: TaskStatus, day: u32) -> Task {
        let mut t = task(id, status);
        t.created_at = Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).single();
        t
    }

    #[test]
    fn test_pending_tab_count_from_summary() {
        let list: TaskList = serde_json::from_value(serde_json::json!({
            "tasks": [
                {"_id": "T1", "title": "Write report", "status": "Pending"},
                {"_id": "T2", "title": "Review", "status": "Pending"}
            ],
            "statusSummary": {"all": 5, "pendingTask": 2}
        }))
        .unwrap();

        let view = task_list_view(&list, StatusTab::Pending, "");

        assert_eq!(view.active_count, 2);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(
            view.tabs,
            vec![
                TabCount { tab: StatusTab::All, count: 5 },
                TabCount { tab: StatusTab::Pending, count: 2 },
                TabCount { tab: StatusTab::InProgress, count: 0 },
                TabCount { tab: StatusTab::Completed, count: 0 },
            ]
        );
    }

    #[test]
    fn test_rows_sorted_newest_first() {
        let list = TaskList {
            items: vec![
                dated("old", TaskStatus::Pending, 1),
                task("undated", TaskStatus::Pending),
                dated("new", TaskStatus::Pending, 20),
            ],
            status_summary: StatusSummary::default(),
        };
        let ids: Vec<String> = task_list_view(&list, StatusTab::All, "")
            .rows
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_search_matches_title_and_description() {
        let mut described = task("T2", TaskStatus::Completed);
        described.description = "Quarterly BUDGET figures".to_string();
        let list = TaskList {
            items: vec![task("T1", TaskStatus::Pending), described],
            status_summary: StatusSummary::default(),
        };

        let view = task_list_view(&list, StatusTab::All, "budget");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, "T2");

        let view = task_list_view(&list, StatusTab::All, "task t1");
        assert_eq!(view.rows[0].id, "T1");

        let view = task_list_view(&list, StatusTab::All, "missing");
        assert!(view.is_empty);
    }

    #[test]
    fn test_tab_narrows_rows() {
        let list = TaskList {
            items: vec![
                task("T1", TaskStatus::Pending),
                task("T2", TaskStatus::Completed),
            ],
            status_summary: StatusSummary::default(),
        };
        let view = task_list_view(&list, StatusTab::Completed, "");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, "T2");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(&task("T0", TaskStatus::Pending)), 0);
        assert_eq!(progress_percent(&task_with_checklist("T1", &[true, false, false, false])), 25);
        assert_eq!(progress_percent(&task_with_checklist("T2", &[true, true, true])), 100);
    }

    #[test]
    fn test_detail_view_rows() {
        let view = task_detail_view(&task_with_checklist("T1", &[true, false]));
        assert_eq!(view.total, 2);
        assert_eq!(view.completed, 1);
        assert_eq!(view.progress_percent, 50);
        assert_eq!(view.checklist[1].index, 1);
        assert!(!view.checklist[1].completed);
    }

    #[test]
    fn test_tab_from_filter() {
        assert_eq!(StatusTab::from(None), StatusTab::All);
        assert_eq!(StatusTab::from(Some(TaskStatus::InProgress)), StatusTab::InProgress);
        assert_eq!(StatusTab::InProgress.to_string(), "In Progress");
    }
}
