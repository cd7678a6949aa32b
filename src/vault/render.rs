use chrono::NaiveDate;

use crate::github::Issue;

pub const NO_DESCRIPTION: &str = "No description.";
pub const NO_TITLE: &str = "No title";

/// Render the issues note for `date`.
///
/// Issues appear in the order given. Callers are expected to have removed
/// pull requests already.
pub fn render_document(issues: &[Issue], date: NaiveDate) -> String {
    let mut md = String::new();
    md.push_str(&format!(
        "# GitHub Issues (last updated {})\n\n",
        date.format("%Y-%m-%d")
    ));

    for issue in issues {
        let number = issue
            .number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        let title = issue.title.as_deref().unwrap_or(NO_TITLE);
        let url = issue.html_url.as_deref().unwrap_or_default();

        md.push_str(&format!("## #{} - {}\n", number, title));
        md.push_str(&format!("> {}\n", summary(issue.body.as_deref())));
        md.push_str(&format!("[View on GitHub]({})\n\n", url));
    }

    md
}

/// First line of the trimmed body, or the placeholder if there is none.
fn summary(body: Option<&str>) -> &str {
    body.map(str::trim)
        .and_then(|b| b.split('\n').next())
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .unwrap_or(NO_DESCRIPTION)
}
