//! Hand-labelled examples merged into every training run.
//!
//! Two tasks per scale value, so a fit never starts from an empty set.

use crate::record::{TaskRecord, TrainingRecord};

struct SeedTask {
    title: &'static str,
    description: &'static str,
    points: u32,
    priority: &'static str,
    task_type: &'static str,
    attachments: u32,
}

const SEED_TASKS: &[SeedTask] = &[
    SeedTask {
        title: "Fix typo in button text",
        description: "Update spelling error on submit button",
        points: 1,
        priority: "low",
        task_type: "bug",
        attachments: 0,
    },
    SeedTask {
        title: "Change button color",
        description: "Update primary button color to blue",
        points: 1,
        priority: "low",
        task_type: "fix",
        attachments: 0,
    },
    SeedTask {
        title: "Add email validation",
        description: "Add client-side email format validation",
        points: 2,
        priority: "medium",
        task_type: "feature",
        attachments: 0,
    },
    SeedTask {
        title: "Show error message",
        description: "Display error alert when login fails",
        points: 2,
        priority: "medium",
        task_type: "feature",
        attachments: 1,
    },
    SeedTask {
        title: "Build modal component",
        description: "Create reusable modal dialog component with animations",
        points: 3,
        priority: "medium",
        task_type: "feature",
        attachments: 2,
    },
    SeedTask {
        title: "Implement pagination",
        description: "Add pagination controls for data tables",
        points: 3,
        priority: "medium",
        task_type: "feature",
        attachments: 1,
    },
    SeedTask {
        title: "File upload system",
        description: "Build file upload with progress bar and validation",
        points: 5,
        priority: "high",
        task_type: "feature",
        attachments: 3,
    },
    SeedTask {
        title: "User authentication",
        description: "Implement login system with session management",
        points: 5,
        priority: "high",
        task_type: "feature",
        attachments: 2,
    },
    SeedTask {
        title: "OAuth2 integration",
        description: "Add Google OAuth2 authentication with refresh tokens",
        points: 8,
        priority: "high",
        task_type: "integration",
        attachments: 4,
    },
    SeedTask {
        title: "Analytics dashboard",
        description: "Create real-time analytics dashboard with charts",
        points: 8,
        priority: "medium",
        task_type: "feature",
        attachments: 5,
    },
    SeedTask {
        title: "Payment gateway integration",
        description: "Integrate Stripe payment system with webhook handling",
        points: 13,
        priority: "high",
        task_type: "integration",
        attachments: 6,
    },
    SeedTask {
        title: "Microservices architecture",
        description: "Refactor monolith to microservices with API gateway",
        points: 13,
        priority: "high",
        task_type: "epic",
        attachments: 8,
    },
    SeedTask {
        title: "Database migration",
        description: "Migrate from MySQL to PostgreSQL with zero downtime",
        points: 21,
        priority: "high",
        task_type: "migration",
        attachments: 10,
    },
    SeedTask {
        title: "Machine learning pipeline",
        description: "Build ML pipeline for recommendation system",
        points: 21,
        priority: "medium",
        task_type: "epic",
        attachments: 12,
    },
];

/// The built-in training examples.
pub fn default_training_records() -> Vec<TrainingRecord> {
    SEED_TASKS
        .iter()
        .map(|seed| {
            TrainingRecord::new(
                TaskRecord::new(seed.title, seed.description)
                    .with_priority(seed.priority)
                    .with_task_type(seed.task_type)
                    .with_attachments(seed.attachments),
                seed.points as f64,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::FIBONACCI_SCALE;

    #[test]
    fn covers_every_scale_value() {
        let records = default_training_records();
        assert!(records.len() >= 14);

        for value in FIBONACCI_SCALE {
            assert!(records.iter().any(|r| r.story_points == value as f64));
        }
    }
}
