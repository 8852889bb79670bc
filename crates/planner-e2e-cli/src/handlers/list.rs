//! List command handler

use crate::commands::SelectArgs;
use planner_e2e::scenarios::{catalogue, select};
use planner_e2e::Scenario;

/// Execute the list command
pub fn execute_list(args: &SelectArgs) {
    let all = catalogue();
    let picked = select(&all, &args.tags, args.filter.as_deref());
    print!("{}", render_catalogue(&picked));
    println!("{} of {} scenarios", picked.len(), all.len());
}

/// One line per scenario: id, name and tags in aligned columns
#[must_use]
pub fn render_catalogue(scenarios: &[&Scenario]) -> String {
    let id_width = scenarios.iter().map(|s| s.meta.id.len()).max().unwrap_or(0);
    let name_width = scenarios.iter().map(|s| s.meta.name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for s in scenarios {
        let tags: Vec<&str> = s.meta.tags.iter().map(|t| t.as_str()).collect();
        out.push_str(&format!(
            "{:<id_width$}  {:<name_width$}  [{}]\n",
            s.meta.id,
            s.meta.name,
            tags.join(", ")
        ));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use planner_e2e::Tag;

    #[test]
    fn test_render_aligns_columns() {
        let all = catalogue();
        let picked = select(&all, &[Tag::Smoke], None);
        let text = render_catalogue(&picked);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), picked.len());
        assert!(lines[0].starts_with("TC-AUTH-VIEW-001"));
        assert!(lines.iter().all(|l| l.contains("smoke")));

        let tag_columns: Vec<usize> = lines.iter().map(|l| l.find('[').unwrap()).collect();
        assert!(tag_columns.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_catalogue(&[]), "");
    }
}
