use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotificationKind {
    Appointment,
    Medical,
    Payment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Appointment => "appointment",
            NotificationKind::Medical => "medical",
            NotificationKind::Payment => "payment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub priority: Priority,
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn with_demo_data() -> Self {
        let now = Utc::now();
        Self {
            notifications: vec![
                Notification {
                    id: 1,
                    kind: NotificationKind::Appointment,
                    title: "Upcoming Appointment Reminder".to_string(),
                    message: "Your appointment with Dr. Sarah Wilson is tomorrow at 10:00 AM"
                        .to_string(),
                    timestamp: now - Duration::hours(1),
                    is_read: false,
                    priority: Priority::High,
                },
                Notification {
                    id: 2,
                    kind: NotificationKind::Medical,
                    title: "Lab Results Available".to_string(),
                    message: "Your recent blood work results are now available for viewing"
                        .to_string(),
                    timestamp: now - Duration::hours(26),
                    is_read: true,
                    priority: Priority::Medium,
                },
                Notification {
                    id: 3,
                    kind: NotificationKind::Payment,
                    title: "Payment Confirmation".to_string(),
                    message: "Payment of XAF 50,000 for consultation has been processed"
                        .to_string(),
                    timestamp: now - Duration::hours(50),
                    is_read: true,
                    priority: Priority::Low,
                },
                Notification {
                    id: 4,
                    kind: NotificationKind::Medical,
                    title: "Prescription Reminder".to_string(),
                    message: "Remember to take your evening medication at 8:00 PM".to_string(),
                    timestamp: now - Duration::minutes(30),
                    is_read: false,
                    priority: Priority::High,
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    pub fn filter(&self, kind: Option<NotificationKind>) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|notification| kind.map_or(true, |kind| notification.kind == kind))
            .collect()
    }

    pub fn mark_read(&mut self, id: i64) -> bool {
        let mut updated = false;
        for notification in &mut self.notifications {
            if notification.id == id && !notification.is_read {
                notification.is_read = true;
                updated = true;
            }
        }
        updated
    }

    pub fn mark_all_read(&mut self) -> usize {
        let mut marked = 0;
        for notification in &mut self.notifications {
            if !notification.is_read {
                notification.is_read = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn clear(&mut self) -> usize {
        let cleared = self.notifications.len();
        self.notifications.clear();
        cleared
    }
}

pub fn format_relative(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> String {
    let elapsed_days = (now - timestamp).num_days().abs();

    if elapsed_days == 0 {
        timestamp.format("%-I:%M %p").to_string()
    } else if elapsed_days == 1 {
        "Yesterday".to_string()
    } else if elapsed_days < 7 {
        timestamp.format("%A").to_string()
    } else {
        timestamp.format("%b %-d").to_string()
    }
}
