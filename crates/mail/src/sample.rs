//! Static sample mailbox
//!
//! Shown when no Google session is available, and handy for exercising the
//! list and sidebar views without network access. Dates are relative to the
//! `now` the caller passes in.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Account, Label, NormalizedMail, Sender};

pub fn sample_accounts() -> Vec<Account> {
    vec![
        Account::new("Alicia Koch", "alicia@example.com"),
        Account::new("William Smith", "will@example.com"),
    ]
}

/// Sidebar labels, system labels first
pub fn sample_labels() -> Vec<Label> {
    vec![
        Label::system("inbox", "Inbox"),
        Label::system("sent", "Sent"),
        Label::system("drafts", "Drafts"),
        Label::system("starred", "Starred"),
        Label::system("spam", "Spam"),
        Label::system("trash", "Trash"),
        Label::system("archive", "Archive"),
        Label::custom("social", "Social"),
        Label::custom("work", "Work"),
        Label::custom("updates", "Updates"),
    ]
}

struct SampleMail {
    id: &'static str,
    read: bool,
    subject: &'static str,
    body: &'static str,
    name: &'static str,
    email: &'static str,
    age_minutes: i64,
    labels: &'static [&'static str],
}

const MINUTE: i64 = 1;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

const SAMPLE_MAILS: &[SampleMail] = &[
    SampleMail {
        id: "m1",
        read: false,
        subject: "Project Phoenix Update",
        body: "<p>Hi Team,</p><p>Just a quick update on Project Phoenix. We've hit a major milestone and are on track for our Q3 launch. Please review the attached document for detailed progress.</p><p>Best,</p><p>Olivia</p>",
        name: "Olivia Davis",
        email: "olivia.davis@example.com",
        age_minutes: 2 * MINUTE,
        labels: &["inbox", "work"],
    },
    SampleMail {
        id: "m2",
        read: false,
        subject: "Your weekend summary",
        body: "<p>Hey William,</p><p>Here is your weekly summary from SocialApp. You have 5 new notifications and 2 new friend requests.</p><p>Cheers,<br>The SocialApp Team</p>",
        name: "SocialApp",
        email: "noreply@socialapp.com",
        age_minutes: 15 * MINUTE,
        labels: &["inbox", "social"],
    },
    SampleMail {
        id: "m3",
        read: true,
        subject: "Re: Design Mockups",
        body: "<p>Hi Liam,</p><p>Thanks for sending these over. The V2 mockups look fantastic. I have a few minor feedback points I've added as comments in Figma.</p><p>Great work!</p><p>Sarah</p>",
        name: "Sarah Miller",
        email: "sarah.miller@example.com",
        age_minutes: HOUR,
        labels: &["inbox", "work"],
    },
    SampleMail {
        id: "m4",
        read: true,
        subject: "Lunch on Friday?",
        body: "<p>Hey,</p><p>Are you free for lunch this Friday? Was thinking that new Italian place downtown.</p><p>Let me know!</p><p>Alex</p>",
        name: "Alex Johnson",
        email: "alex.j@example.com",
        age_minutes: 5 * HOUR,
        labels: &["inbox"],
    },
    SampleMail {
        id: "m5",
        read: false,
        subject: "Your order #4562 has shipped!",
        body: "<p>Great news! Your recent order from TechStore is on its way. You can track your package using the link below.</p><p>Tracking Number: 1Z9999W99999999999</p>",
        name: "TechStore",
        email: "shipping@techstore.com",
        age_minutes: DAY,
        labels: &["inbox", "updates"],
    },
    SampleMail {
        id: "m6",
        read: true,
        subject: "Weekly Newsletter",
        body: "<p>This week in tech: AI advancements, new gadgets, and more. Dive into our curated articles.</p>",
        name: "Tech Weekly",
        email: "newsletter@techweekly.com",
        age_minutes: 2 * DAY,
        labels: &["inbox", "updates"],
    },
    SampleMail {
        id: "m7",
        read: true,
        subject: "Important: Your account security",
        body: "<p>We've detected a new sign-in to your account from a new device. If this was you, you can ignore this email.</p>",
        name: "Security Team",
        email: "security@example.com",
        age_minutes: 2 * DAY,
        labels: &["inbox", "spam"],
    },
    SampleMail {
        id: "m8",
        read: true,
        subject: "Vacation Photos",
        body: "<p>Here are the photos from our trip! Let me know which ones you like.</p>",
        name: "Emily White",
        email: "emily.w@example.com",
        age_minutes: 3 * DAY,
        labels: &["inbox"],
    },
    SampleMail {
        id: "m9",
        read: true,
        subject: "Draft: Q3 Report",
        body: "<p>Here's the draft for the Q3 report. Please add your sections by EOD tomorrow.</p>",
        name: "David Green",
        email: "david.green@example.com",
        age_minutes: 4 * DAY,
        labels: &["sent", "work"],
    },
    SampleMail {
        id: "m10",
        read: false,
        subject: "Your next favorite read is waiting",
        body: "<p>Based on your recent activity, we think you'll love these books. Check out our personalized recommendations.</p>",
        name: "BookHub",
        email: "recommendations@bookhub.com",
        age_minutes: 5 * DAY,
        labels: &["inbox", "updates", "starred"],
    },
];

/// The sample mails, newest first
pub fn sample_mails(now: DateTime<Utc>) -> Vec<NormalizedMail> {
    SAMPLE_MAILS
        .iter()
        .map(|s| {
            NormalizedMail::builder(s.id)
                .subject(s.subject)
                .body(s.body)
                .from(Sender::new(s.name, s.email))
                .date(Some(now - Duration::minutes(s.age_minutes)))
                .labels(s.labels.iter().map(|l| l.to_string()).collect())
                .read(s.read)
                .build()
        })
        .collect()
}
