use itertools::Itertools;

use crate::modules::tasks::model::TaskRecord;
use crate::modules::utils::time::format_timestamp;

/// A composed message: subject, plain-text body, optional HTML body
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// The link a recipient follows to verify their address
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!("{}/verify/{}", base_url.trim_end_matches('/'), token)
}

/// Verification message sent right after registration (and on re-send)
pub fn verification_email(link: &str) -> EmailContent {
    let text = format!("Please verify your email by clicking: {}", link);
    let html = format!(
        "<h2>Email Verification</h2>\n\
        <p>Click the link below to verify your email:</p>\n\
        <a href=\"{}\">Verify Email</a>",
        link
    );

    EmailContent {
        subject: "Verify Your Email Address".to_string(),
        text,
        html: Some(html),
    }
}

/// One aggregate reminder listing every overdue task for an account,
/// earliest due time first
pub fn reminder_email(overdue: &[TaskRecord]) -> EmailContent {
    let lines = overdue
        .iter()
        .sorted_by_key(|task| task.due_at.unwrap_or(u64::MAX))
        .map(|task| {
            let due = task
                .due_at
                .map(format_timestamp)
                .unwrap_or_else(|| "no due time".to_string());
            format!("- {} (due on {})", task.description, due)
        })
        .join("\n");

    let text = format!(
        "You have pending tasks:\n\n{}\n\nPlease complete them as soon as possible.",
        lines
    );

    EmailContent {
        subject: "Task Reminder".to_string(),
        text,
        html: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link_assembly() {
        assert_eq!(
            verification_link("http://localhost:5000", "abc.def.ghi"),
            "http://localhost:5000/verify/abc.def.ghi"
        );
        // A trailing slash on the base URL does not double up
        assert_eq!(
            verification_link("https://todo.example.com/", "tok"),
            "https://todo.example.com/verify/tok"
        );
    }

    #[test]
    fn test_verification_email_content() {
        let link = "http://localhost:5000/verify/tok123";
        let content = verification_email(link);

        assert_eq!(content.subject, "Verify Your Email Address");
        assert!(content.text.contains(link));
        assert!(content.text.contains("verify your email"));

        // HTML part carries the same link as a clickable anchor
        let html = content.html.unwrap();
        assert!(html.contains(&format!("href=\"{}\"", link)));
        assert!(html.contains("Email Verification"));
    }

    fn overdue_task(description: &str, due_at: u64) -> TaskRecord {
        TaskRecord {
            owner: "a@x.com".to_string(),
            description: description.to_string(),
            due_at: Some(due_at),
            completed: false,
        }
    }

    #[test]
    fn test_reminder_email_lists_tasks() {
        let tasks = vec![
            overdue_task("file taxes", 1_609_545_600),
            overdue_task("water the plants", 1_609_459_200),
        ];
        let content = reminder_email(&tasks);

        assert_eq!(content.subject, "Task Reminder");
        assert!(content.text.contains("You have pending tasks:"));
        assert!(content.text.contains("- file taxes (due on 2021-01-02 00:00:00)"));
        assert!(content.text.contains("- water the plants (due on 2021-01-01 00:00:00)"));
        assert!(content.text.contains("as soon as possible"));
        assert!(content.html.is_none());

        // Earliest due time is listed first
        let plants = content.text.find("water the plants").unwrap();
        let taxes = content.text.find("file taxes").unwrap();
        assert!(plants < taxes);
    }

    #[test]
    fn test_reminder_email_single_task() {
        let content = reminder_email(&[overdue_task("one thing", 1_609_459_200)]);
        let lines: Vec<&str> = content.text.lines().collect();
        assert_eq!(lines[0], "You have pending tasks:");
        assert_eq!(lines[2], "- one thing (due on 2021-01-01 00:00:00)");
    }
}
