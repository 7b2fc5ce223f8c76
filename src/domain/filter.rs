use super::enums::StatusFilter;
use super::task::Task;

/// Lowercased, non-empty terms of a comma-separated tag filter
pub fn tag_terms(tag_filter: &str) -> Vec<String> {
    tag_filter
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

/// Whether any tag contains any term (case-insensitive). No terms matches everything.
pub fn matches_tags(task: &Task, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    task.tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        terms.iter().any(|term| tag.contains(term.as_str()))
    })
}

/// Tasks passing both the status and the tag predicate, in their original order
pub fn visible<'a>(tasks: &'a [Task], status: StatusFilter, tag_filter: &str) -> Vec<&'a Task> {
    let terms = tag_terms(tag_filter);
    tasks
        .iter()
        .filter(|task| status.matches(task.status) && matches_tags(task, &terms))
        .collect()
}
