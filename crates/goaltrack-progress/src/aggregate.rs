//! Goal progress aggregation
//!
//! Derives each goal's completion from the todos linked to it. The result is
//! a pure function of its inputs, cheap enough to recompute on every change.

use goaltrack_model::{Goal, GoalId, Todo};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Derived progress of one goal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Todos linked to the goal
    pub total: usize,
    /// Linked todos that are done
    pub done: usize,
    /// `round(100 * done / total)`, 0 when there are no linked todos
    pub percent: u8,
}

impl GoalProgress {
    /// Build progress from counts, deriving the percentage
    #[inline]
    #[must_use]
    pub fn from_counts(total: usize, done: usize) -> Self {
        Self {
            total,
            done,
            percent: percent(done, total),
        }
    }

    /// Whether every linked todo is done (false for an empty goal)
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

/// Progress per goal id, in goal input order
pub type ProgressMap = IndexMap<GoalId, GoalProgress>;

/// Completion percentage with round-half-up
///
/// Integer arithmetic only, so 1/2 is exactly 50 and 1/8 (12.5) is 13.
/// `done` is clamped to `total`.
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total) as u128;
    let total = total as u128;
    let rounded = (200 * done + total) / (2 * total);
    // done <= total keeps this within 0..=100
    u8::try_from(rounded).unwrap_or(100)
}

/// Aggregate progress for every goal
///
/// Every goal appears in the output, even without linked todos. Todos that
/// reference an unknown goal, or none, are ignored.
#[must_use]
pub fn aggregate(goals: &[Goal], todos: &[Todo]) -> ProgressMap {
    let mut counts: IndexMap<GoalId, (usize, usize)> = goals
        .iter()
        .map(|goal| (goal.id.clone(), (0, 0)))
        .collect();

    for todo in todos {
        let Some(goal_id) = todo.linked_goal() else {
            continue;
        };
        if let Some((total, done)) = counts.get_mut(goal_id) {
            *total += 1;
            if todo.is_done {
                *done += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(id, (total, done))| (id, GoalProgress::from_counts(total, done)))
        .collect()
}

/// Progress of a single goal over a todo list
#[must_use]
pub fn progress_for(goal_id: &GoalId, todos: &[Todo]) -> GoalProgress {
    let (total, done) = todos
        .iter()
        .filter(|t| t.linked_goal() == Some(goal_id))
        .fold((0, 0), |(total, done), t| (total + 1, done + usize::from(t.is_done)));
    GoalProgress::from_counts(total, done)
}

/// Summary across all goals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    /// Number of goals
    pub goals: usize,
    /// Goals whose linked todos are all done
    pub completed_goals: usize,
    /// Linked todos over all goals
    pub todos: GoalProgress,
}

/// Summarize a progress map
#[must_use]
pub fn overall(progress: &ProgressMap) -> OverallProgress {
    let (total, done) = progress
        .values()
        .fold((0, 0), |(t, d), p| (t + p.total, d + p.done));

    OverallProgress {
        goals: progress.len(),
        completed_goals: progress.values().filter(|p| p.is_complete()).count(),
        todos: GoalProgress::from_counts(total, done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use goaltrack_model::TodoId;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn goal(id: &str) -> Goal {
        Goal::new(GoalId::new(id), id, Utc::now())
    }

    fn todo(id: &str, goal: Option<&str>, done: bool) -> Todo {
        let mut t = Todo::new(TodoId::new(id), id, goal.map(GoalId::new), Utc::now());
        t.is_done = done;
        t
    }

    #[test]
    fn half_done_goal_is_fifty_percent() {
        let goals = vec![goal("g1")];
        let todos = vec![todo("t1", Some("g1"), true), todo("t2", Some("g1"), false)];

        let progress = aggregate(&goals, &todos);

        assert_eq!(progress.len(), 1);
        assert_eq!(
            progress[&GoalId::new("g1")],
            GoalProgress {
                total: 2,
                done: 1,
                percent: 50
            }
        );
    }

    #[test]
    fn ghost_goal_reference_is_ignored() {
        let goals = vec![goal("g1")];
        let todos = vec![todo("t1", Some("ghost"), true), todo("t2", None, true)];

        let progress = aggregate(&goals, &todos);

        assert_eq!(progress.len(), 1);
        assert!(!progress.contains_key(&GoalId::new("ghost")));
        assert_eq!(progress[&GoalId::new("g1")], GoalProgress::default());
    }

    #[test]
    fn empty_goal_is_zero_percent() {
        let progress = aggregate(&[goal("g1")], &[]);
        assert_eq!(progress[&GoalId::new("g1")].percent, 0);
    }

    #[test]
    fn output_keeps_goal_order() {
        let goals = vec![goal("b"), goal("a"), goal("c")];
        let keys: Vec<_> = aggregate(&goals, &[]).into_keys().map(|k| k.0).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 200), 1); // 0.5
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn single_goal_matches_aggregate() {
        let goals = vec![goal("g1"), goal("g2")];
        let todos = vec![
            todo("t1", Some("g1"), true),
            todo("t2", Some("g2"), false),
            todo("t3", Some("g1"), false),
            todo("t4", Some("g1"), true),
        ];
        let id = GoalId::new("g1");
        assert_eq!(progress_for(&id, &todos), aggregate(&goals, &todos)[&id]);
    }

    #[test]
    fn overall_counts_complete_goals() {
        let goals = vec![goal("g1"), goal("g2"), goal("g3")];
        let todos = vec![
            todo("t1", Some("g1"), true),
            todo("t2", Some("g2"), true),
            todo("t3", Some("g2"), false),
        ];
        let summary = overall(&aggregate(&goals, &todos));

        assert_eq!(summary.goals, 3);
        assert_eq!(summary.completed_goals, 1);
        assert_eq!(summary.todos, GoalProgress::from_counts(3, 2));
    }

    fn arb_inputs() -> impl Strategy<Value = (Vec<Goal>, Vec<Todo>)> {
        let goal_ids = proptest::collection::hash_set("[a-e]", 0..5);
        let todo_specs = proptest::collection::vec(
            (proptest::option::of("[a-g]"), any::<bool>()),
            0..60,
        );
        (goal_ids, todo_specs).prop_map(|(ids, specs)| {
            let goals = ids.iter().map(|id| goal(id)).collect();
            let todos = specs
                .iter()
                .enumerate()
                .map(|(i, (g, done))| todo(&format!("t{i}"), g.as_deref(), *done))
                .collect();
            (goals, todos)
        })
    }

    proptest! {
        #[test]
        fn counts_match_linked_todos((goals, todos) in arb_inputs()) {
            let progress = aggregate(&goals, &todos);
            prop_assert_eq!(progress.len(), goals.len());

            for g in &goals {
                let linked: Vec<_> = todos.iter().filter(|t| t.goal_id.as_ref() == Some(&g.id)).collect();
                let p = progress[&g.id];
                prop_assert_eq!(p.total, linked.len());
                prop_assert_eq!(p.done, linked.iter().filter(|t| t.is_done).count());
                prop_assert!(p.percent <= 100);
                if p.total == 0 {
                    prop_assert_eq!(p.percent, 0);
                }
            }
        }

        #[test]
        fn aggregate_is_idempotent((goals, todos) in arb_inputs()) {
            prop_assert_eq!(aggregate(&goals, &todos), aggregate(&goals, &todos));
        }

        #[test]
        fn percent_within_bounds(done in 0usize..10_000, total in 0usize..10_000) {
            let p = percent(done, total);
            prop_assert!(p <= 100);
            if total == 0 {
                prop_assert_eq!(p, 0);
            }
        }
    }
}
