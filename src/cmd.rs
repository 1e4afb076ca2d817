//! Command implementations for the CLI interface.
//!
//! Handlers validate input the way an entry form would (required title,
//! known category, parseable due date), call into the repositories, and
//! report the outcome as a one-line notification. Lookup and persistence
//! errors print to stderr and exit non-zero.

use std::io;

use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::category::CategoryRepository;
use crate::cli::Cli;
use crate::error::Error;
use crate::fields::{DueFilter, Priority, SortKey};
use crate::repo::TaskRepository;
use crate::task::{NewTask, SubtaskPatch, Task, TaskPatch};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Category name; must match an existing category.
        #[arg(long)]
        category: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", or a weekday.
        #[arg(long)]
        due: String,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Subtask title. May be repeated.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Only completed tasks.
        #[arg(long, conflicts_with = "active")]
        completed: bool,
        /// Only tasks still open.
        #[arg(long)]
        active: bool,
        /// Filter by category name.
        #[arg(long)]
        category: Option<String>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Due filter: today | overdue. Only matches open tasks.
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Due)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task, subtasks included.
    View {
        /// Task id to view.
        id: u64,
    },

    /// Update fields on a task.
    Update {
        /// Task id to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Clear the description.
        #[arg(long, conflicts_with = "desc")]
        clear_desc: bool,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// New due date; same formats as `add --due`.
        #[arg(long)]
        due: Option<String>,
        /// Manual sort position.
        #[arg(long)]
        order: Option<u32>,
    },

    /// Toggle a task between open and completed.
    Toggle {
        /// Task id to toggle.
        id: u64,
    },

    /// Delete a task and its subtasks.
    Delete {
        /// Task id to delete.
        id: u64,
    },

    /// Rewrite manual sort positions to match the given id sequence.
    Reorder {
        /// Task ids in the desired order.
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Manage a task's subtask checklist.
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },

    /// Manage the category list.
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Append a subtask to a task's checklist.
    Add {
        /// Parent task id.
        task_id: u64,
        /// Subtask title.
        title: String,
    },
    /// Edit a subtask's title or completion state.
    Edit {
        task_id: u64,
        subtask_id: u64,
        #[arg(long)]
        title: Option<String>,
        /// Set completion explicitly instead of toggling.
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Toggle a subtask between open and completed.
    Toggle { task_id: u64, subtask_id: u64 },
    /// Remove a subtask.
    Rm { task_id: u64, subtask_id: u64 },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories.
    List,
    /// Add a new category.
    Add {
        /// Category name.
        name: String,
    },
}

/// Print the error and exit non-zero.
fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}

/// Add a new task.
pub fn cmd_add(
    tasks: &mut TaskRepository,
    categories: &CategoryRepository,
    title: String,
    category: String,
    due: String,
    priority: Priority,
    desc: Option<String>,
    subtasks: Vec<String>,
) {
    if title.trim().is_empty() {
        fail("Title is required");
    }
    let known = categories.all();
    if !known.iter().any(|c| c.name == category) {
        let names: Vec<&str> = known.iter().map(|c| c.name.as_str()).collect();
        fail(format!("Unknown category '{}'. Available: {}", category, names.join(", ")));
    }
    let Some(due_date) = parse_due_input(&due) else {
        fail(format!("Could not parse due date '{due}'"));
    };
    let subtasks: Vec<String> = subtasks
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    match tasks.create(NewTask {
        title: title.trim().to_string(),
        description: desc,
        category,
        priority,
        due_date,
        subtasks,
    }) {
        Ok(task) => println!("Added task {}", task.id),
        Err(e) => fail(e),
    }
}

/// List tasks with optional filtering and sorting.
pub fn cmd_list(
    tasks: &TaskRepository,
    completed: bool,
    active: bool,
    category: Option<String>,
    priority: Option<Priority>,
    due: Option<DueFilter>,
    sort: SortKey,
    limit: Option<usize>,
) {
    // Pick the narrowest repository query as the base selection, then
    // intersect any remaining filters over it.
    let mut filtered = if let Some(filter) = due {
        match filter {
            DueFilter::Today => tasks.due_today(),
            DueFilter::Overdue => tasks.overdue(),
        }
    } else if completed {
        tasks.completed()
    } else if active {
        tasks.active()
    } else if let Some(name) = category.as_deref() {
        tasks.in_category(name)
    } else if let Some(p) = priority {
        tasks.with_priority(p)
    } else {
        tasks.all()
    };

    if completed {
        filtered.retain(|t| t.completed);
    }
    if active {
        filtered.retain(|t| !t.completed);
    }
    if let Some(name) = category.as_deref() {
        filtered.retain(|t| t.category == name);
    }
    if let Some(p) = priority {
        filtered.retain(|t| t.priority == p);
    }

    match sort {
        SortKey::Due => filtered.sort_by_key(|t| (t.due_date, t.id)),
        SortKey::Priority => filtered.sort_by_key(|t| (priority_rank(t.priority), t.id)),
        SortKey::Id => filtered.sort_by_key(|t| t.id),
        SortKey::Order => filtered.sort_by_key(|t| (t.order.unwrap_or(u32::MAX), t.id)),
    }

    if let Some(n) = limit {
        filtered.truncate(n);
    }
    print_table(&filtered);
}

/// View detailed information about a single task.
pub fn cmd_view(tasks: &TaskRepository, id: u64) {
    let Some(task) = tasks.get(id) else {
        fail(Error::TaskNotFound(id));
    };
    let today = Local::now().date_naive();
    println!("ID:            {}", task.id);
    println!("Title:         {}", task.title);
    println!("Category:      {}", task.category);
    println!("Priority:      {}", format_priority(task.priority));
    println!("Due:           {} ({})", task.due_date, format_due_relative(task.due_date, today));
    println!("Status:        {}", if task.completed { "done" } else { "open" });
    println!("Created UTC:   {}", format_utc(task.created_at_utc));
    println!(
        "Completed UTC: {}",
        task.completed_at_utc.map(format_utc).unwrap_or_else(|| "-".into())
    );
    println!("Order:         {}", task.order.map(|o| o.to_string()).unwrap_or_else(|| "-".into()));
    println!("Description:\n{}", task.description.clone().unwrap_or_else(|| "-".into()));
    if !task.subtasks.is_empty() {
        println!("Subtasks:");
        print_checklist(&task);
    }
}

/// Update an existing task's fields.
pub fn cmd_update(
    tasks: &mut TaskRepository,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    clear_desc: bool,
    category: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    order: Option<u32>,
) {
    let due_date = match due {
        Some(raw) => match parse_due_input(&raw) {
            Some(d) => Some(d),
            None => fail(format!("Could not parse due date '{raw}'")),
        },
        None => None,
    };
    let patch = TaskPatch {
        title,
        description: desc,
        clear_description: clear_desc,
        category,
        priority,
        due_date,
        order,
    };
    match tasks.update(id, patch) {
        Ok(task) => println!("Updated task {}", task.id),
        Err(e) => fail(e),
    }
}

/// Toggle a task's completion state.
pub fn cmd_toggle(tasks: &mut TaskRepository, id: u64) {
    match tasks.toggle_complete(id) {
        Ok(task) if task.completed => println!("Task {} completed", task.id),
        Ok(task) => println!("Task {} reopened", task.id),
        Err(e) => fail(e),
    }
}

/// Delete a task.
pub fn cmd_delete(tasks: &mut TaskRepository, id: u64) {
    match tasks.delete(id) {
        Ok(()) => println!("Deleted task {id}"),
        Err(e) => fail(e),
    }
}

/// Rewrite manual sort positions from the given id sequence.
pub fn cmd_reorder(tasks: &mut TaskRepository, ids: Vec<u64>) {
    match tasks.reorder(&ids) {
        Ok(()) => println!("Reordered {} tasks", ids.len()),
        Err(e) => fail(e),
    }
}

/// Dispatch a subtask checklist action.
pub fn cmd_subtask(tasks: &mut TaskRepository, action: SubtaskAction) {
    let result = match action {
        SubtaskAction::Add { task_id, title } => {
            if title.trim().is_empty() {
                fail("Subtask title is required");
            }
            tasks.create_subtask(task_id, title.trim())
        }
        SubtaskAction::Edit { task_id, subtask_id, title, completed } => {
            tasks.update_subtask(task_id, subtask_id, SubtaskPatch { title, completed })
        }
        SubtaskAction::Toggle { task_id, subtask_id } => tasks.toggle_subtask(task_id, subtask_id),
        SubtaskAction::Rm { task_id, subtask_id } => tasks.delete_subtask(task_id, subtask_id),
    };
    match result {
        Ok(task) => {
            print_checklist(&task);
            if task.completed && !task.subtasks.is_empty() && task.subtasks.iter().all(|s| s.completed)
            {
                println!("All subtasks done; task {} is completed", task.id);
            }
        }
        Err(e) => fail(e),
    }
}

/// Dispatch a category action.
pub fn cmd_category(categories: &mut CategoryRepository, action: CategoryAction) {
    match action {
        CategoryAction::List => {
            for c in categories.all() {
                println!("{:<5} {}", c.id, c.name);
            }
        }
        CategoryAction::Add { name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                fail("Category name is required");
            }
            if categories.all().iter().any(|c| c.name == name) {
                fail(format!("Category '{name}' already exists"));
            }
            match categories.create(name) {
                Ok(c) => println!("Added category {} ({})", c.name, c.id),
                Err(e) => fail(e),
            }
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Parse human-readable due date input.
///
/// Supports "today", "tomorrow", weekday names ("friday", "next monday"),
/// "in 3d" / "in 2w", and plain "YYYY-MM-DD".
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    let weekdays = [
        ("monday", 0),
        ("tuesday", 1),
        ("wednesday", 2),
        ("thursday", 3),
        ("friday", 4),
        ("saturday", 5),
        ("sunday", 6),
    ];
    for (day_name, target_day) in weekdays {
        let current_day = today.weekday().num_days_from_monday() as i32;
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name {
            return Some(today + Duration::days(days_ahead as i64));
        }
        if s == format!("next {day_name}") {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add as i64));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let delta = due - today;
    if delta.num_days() == 0 {
        "today".into()
    } else if delta.num_days() == 1 {
        "tomorrow".into()
    } else if delta.num_days() > 1 {
        format!("in {}d", delta.num_days())
    } else {
        format!("{}d late", -delta.num_days())
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

fn priority_rank(p: Priority) -> u8 {
    match p {
        Priority::High => 0,
        Priority::Medium => 1,
        Priority::Low => 2,
    }
}

fn format_utc(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(t) => t.to_rfc3339(),
        None => ts.to_string(),
    }
}

fn print_checklist(task: &Task) {
    for s in &task.subtasks {
        println!("  [{}] {} (#{})", if s.completed { "x" } else { " " }, s.title, s.id);
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!(
        "{:<5} {:<4} {:<7} {:<10} {:<12} {:<6} {}",
        "ID", "Done", "Pri", "Due", "Category", "Subs", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let done = if t.completed { "x" } else { "-" };
        let subs = if t.subtasks.is_empty() {
            "-".to_string()
        } else {
            format!("{}/{}", t.subtasks.iter().filter(|s| s.completed).count(), t.subtasks.len())
        };
        println!(
            "{:<5} {:<4} {:<7} {:<10} {:<12} {:<6} {}",
            t.id,
            done,
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            truncate(&t.category, 12),
            subs,
            t.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    #[test]
    fn parses_iso_and_relative_due_dates() {
        let today = Local::now().date_naive();
        assert_eq!(parse_due_input("today"), Some(today));
        assert_eq!(parse_due_input("tomorrow"), Some(today + Duration::days(1)));
        assert_eq!(parse_due_input("in 3d"), Some(today + Duration::days(3)));
        assert_eq!(parse_due_input("in 2w"), Some(today + Duration::weeks(2)));
        assert_eq!(parse_due_input("2024-05-01"), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(parse_due_input("not a date"), None);
    }

    #[test]
    fn weekday_input_lands_on_that_weekday() {
        let friday = parse_due_input("friday").unwrap();
        assert_eq!(friday.weekday(), Weekday::Fri);
        let next_friday = parse_due_input("next friday").unwrap();
        assert_eq!(next_friday.weekday(), Weekday::Fri);
        assert!(next_friday > friday);
    }

    #[test]
    fn formats_due_dates_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(format_due_relative(today, today), "today");
        assert_eq!(format_due_relative(today + Duration::days(1), today), "tomorrow");
        assert_eq!(format_due_relative(today + Duration::days(4), today), "in 4d");
        assert_eq!(format_due_relative(today - Duration::days(2), today), "2d late");
    }

    #[test]
    fn truncate_keeps_short_strings_intact() {
        assert_eq!(truncate("short", 12), "short");
        assert_eq!(truncate("a rather long category", 8), "a rathe…");
    }
}
