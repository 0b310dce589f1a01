use crate::model::task::{Priority, Task};
use crate::model::view::FilterMode;

/// Message shown when the filtered view is empty
pub const EMPTY_STATE: &str = "No tasks yet — add one above.";

/// The visible subset of `tasks` for a filter mode and search query.
///
/// High-priority tasks come first, then oldest-created first within each tier.
/// The source collection is never reordered.
pub fn visible_tasks<'a>(tasks: &'a [Task], mode: FilterMode, query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();

    let mut shown: Vec<&Task> = tasks
        .iter()
        .filter(|t| mode.admits(t))
        .filter(|t| matches_query(t, &needle))
        .collect();

    shown.sort_by_key(|t| (t.priority != Priority::High, t.created));
    shown
}

/// Case-insensitive substring match on title or description.
/// `needle` must already be trimmed and lowercased; empty matches everything.
fn matches_query(task: &Task, needle: &str) -> bool {
    needle.is_empty()
        || task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskDraft;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn task(id: &str, priority: Priority, hour: u32) -> Task {
        Task::from_draft(id.into(), TaskDraft::new(id).priority(priority), at(hour))
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn high_priority_wins_over_creation_order() {
        let a = task("A", Priority::High, 2);
        let b = task("B", Priority::Low, 1);
        let tasks = vec![a, b];
        assert_eq!(ids(&visible_tasks(&tasks, FilterMode::All, "")), vec!["A", "B"]);
    }

    #[test]
    fn oldest_first_within_tier() {
        // Stored newest-first, as the store prepends
        let tasks = vec![
            task("low-new", Priority::Low, 5),
            task("high-new", Priority::High, 4),
            task("med-mid", Priority::Medium, 3),
            task("high-old", Priority::High, 2),
            task("low-old", Priority::Low, 1),
        ];
        assert_eq!(
            ids(&visible_tasks(&tasks, FilterMode::All, "")),
            vec!["high-old", "high-new", "low-old", "med-mid", "low-new"]
        );
        // Source order untouched
        assert_eq!(tasks[0].id, "low-new");
    }

    #[test]
    fn mode_filters() {
        let open = task("open", Priority::Medium, 1);
        let mut flagged = task("flagged", Priority::Medium, 2);
        flagged.completed = true;
        let mut full = task("full", Priority::Medium, 3);
        full.progress = 100;
        let tasks = vec![open, flagged, full];

        assert_eq!(ids(&visible_tasks(&tasks, FilterMode::Active, "")), vec!["open"]);
        assert_eq!(
            ids(&visible_tasks(&tasks, FilterMode::Done, "")),
            vec!["flagged", "full"]
        );
        assert_eq!(visible_tasks(&tasks, FilterMode::All, "").len(), 3);
    }

    #[test]
    fn search_is_case_insensitive() {
        let milk = Task::from_draft("1".into(), TaskDraft::new("Buy milk"), at(1));
        let bread = Task::from_draft(
            "2".into(),
            TaskDraft::new("Bakery").description("Fresh BREAD"),
            at(2),
        );
        let tasks = vec![milk, bread];

        assert_eq!(ids(&visible_tasks(&tasks, FilterMode::All, "MILK")), vec!["1"]);
        assert_eq!(ids(&visible_tasks(&tasks, FilterMode::All, "  bread ")), vec!["2"]);
        assert_eq!(visible_tasks(&tasks, FilterMode::All, "   ").len(), 2);
        assert!(visible_tasks(&tasks, FilterMode::All, "cheese").is_empty());
    }

    #[test]
    fn search_combines_with_mode() {
        let mut done_milk = Task::from_draft("1".into(), TaskDraft::new("Buy milk"), at(1));
        done_milk.toggle_complete();
        let open_milk = Task::from_draft("2".into(), TaskDraft::new("Milk the cow"), at(2));
        let tasks = vec![done_milk, open_milk];
        assert_eq!(ids(&visible_tasks(&tasks, FilterMode::Active, "milk")), vec!["2"]);
    }
}
