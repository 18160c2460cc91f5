//! Terminal views - mail list, mail viewer and label sidebar

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use log::debug;
use mail::{Account, Label, NormalizedMail, display_labels, label_sort_order, unread_count};

/// Width used when rendering HTML bodies as text
const BODY_WIDTH: usize = 80;

/// Characters of body text shown under each list row
const PREVIEW_CHARS: usize = 2 * BODY_WIDTH - 8;

/// Print the mail list in the given order
///
/// In text mode the list is headed by `account`, when known.
pub fn print_mail_list(
    mails: &[NormalizedMail],
    account: Option<&Account>,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(mails)?);
        return Ok(());
    }

    if let Some(account) = account {
        println!("[{}] {} <{}>", account.initials(), account.label, account.email);
    }
    println!("{} unread messages", unread_count(mails));
    if mails.is_empty() {
        println!("No mail.");
        return Ok(());
    }

    let now = Utc::now();
    for mail in mails {
        println!("{}", list_line(mail, now));
        let preview = preview(&mail.body);
        if !preview.is_empty() {
            println!("    {}", preview);
        }
    }
    Ok(())
}

/// Print one mail with its body rendered as text
pub fn print_mail(mail: &NormalizedMail, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(mail)?);
        return Ok(());
    }

    println!("From:    {} <{}>", mail.from.display_name(), mail.from.email);
    println!("Subject: {}", mail.subject);
    println!(
        "Date:    {}",
        mail.date.with_timezone(&Local).format("%a, %d %b %Y %H:%M")
    );
    let badges = display_labels(mail);
    if !badges.is_empty() {
        println!("Labels:  {}", badges.join(", "));
    }
    println!();
    println!("{}", render_body(&mail.body)?);
    Ok(())
}

/// Print labels in sidebar order with unread counts
pub fn print_labels(mut labels: Vec<Label>, json: bool) -> Result<()> {
    labels.sort_by_key(|l| (!l.is_system(), label_sort_order(l.id.as_str())));

    if json {
        println!("{}", serde_json::to_string_pretty(&labels)?);
        return Ok(());
    }

    for label in &labels {
        if label.unread_count > 0 {
            println!("{:<20} {:>4}", label.name, label.unread_count);
        } else {
            println!("{}", label.name);
        }
    }
    Ok(())
}

/// One row of the mail list: unread marker, sender, subject, date, badges
fn list_line(mail: &NormalizedMail, now: DateTime<Utc>) -> String {
    let marker = if mail.read { ' ' } else { '*' };
    let mut line = format!(
        "{} {:<24} {:<48} {:>6}",
        marker,
        truncate(mail.from.display_name(), 24),
        truncate(&mail.subject, 48),
        format_date(mail.date, now)
    );

    let badges = display_labels(mail);
    if !badges.is_empty() {
        line.push_str("  [");
        line.push_str(&badges.join("] ["));
        line.push(']');
    }
    line
}

/// Time today, weekday this week, date otherwise
fn format_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = date.with_timezone(&Local);
    let now = now.with_timezone(&Local);

    if local.date_naive() == now.date_naive() {
        local.format("%H:%M").to_string()
    } else if (now - local).num_days() < 7 {
        local.format("%a").to_string()
    } else {
        local.format("%b %d").to_string()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Body text without markup, on one line, cut to the preview length
fn preview(body: &str) -> String {
    let text = match render_body(body) {
        Ok(text) => text,
        Err(e) => {
            debug!("No preview: {:#}", e);
            return String::new();
        }
    };
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flat, PREVIEW_CHARS)
}

fn render_body(body: &str) -> Result<String> {
    if body.is_empty() {
        return Ok(String::new());
    }
    html2text::from_read(body.as_bytes(), BODY_WIDTH).context("Failed to render mail body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mail::Sender;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer subject", 8), "a longe…");
    }

    #[test]
    fn test_list_line_marks_unread_and_badges() {
        let now = Utc::now();
        let mail = NormalizedMail::builder("m1")
            .subject("Hello")
            .from(Sender::new("Jane Doe", "jane@x.com"))
            .date(Some(now))
            .labels(vec!["INBOX".into(), "UNREAD".into(), "work".into()])
            .build();

        let line = list_line(&mail, now);
        assert!(line.starts_with("* Jane Doe"));
        assert!(line.contains("Hello"));
        assert!(line.ends_with("[work]"));
        assert!(!line.contains("UNREAD"));
    }

    #[test]
    fn test_format_date_older_than_a_week() {
        let now = Utc::now();
        let old = now - Duration::days(30);
        assert_eq!(format_date(old, now), old.with_timezone(&Local).format("%b %d").to_string());
    }

    #[test]
    fn test_preview_strips_markup_and_flattens() {
        let text = preview("<h1>Weekly</h1>\n<p>Numbers are <b>up</b>.</p>");
        assert!(text.contains("Weekly"));
        assert!(text.contains("Numbers are"));
        assert!(!text.contains('<'));
        assert!(!text.contains('\n'));

        let long = format!("<p>{}</p>", "word ".repeat(100));
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_render_body_strips_markup() {
        let text = render_body("<p>Hello <b>there</b></p>").unwrap();
        assert!(text.contains("Hello"));
        assert!(!text.contains("<p>"));
        assert_eq!(render_body("").unwrap(), "");
    }
}
