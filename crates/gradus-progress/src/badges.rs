use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

const PROGRESS_BADGES: [(u8, Badge); 4] = [
    (
        25,
        Badge {
            id: "progress-25",
            title: "First quarter",
            description: "Reached 25% overall progress",
        },
    ),
    (
        50,
        Badge {
            id: "progress-50",
            title: "Halfway there",
            description: "Reached 50% overall progress",
        },
    ),
    (
        75,
        Badge {
            id: "progress-75",
            title: "Home stretch",
            description: "Reached 75% overall progress",
        },
    ),
    (
        100,
        Badge {
            id: "progress-100",
            title: "Full draft",
            description: "Reached 100% overall progress",
        },
    ),
];

const ACTIVITY_STREAK_BADGE: Badge = Badge {
    id: "activity-streak",
    title: "Steady cadence",
    description: "Recorded five or more activities",
};

const ACTIVITY_STREAK_THRESHOLD: u64 = 5;

pub fn unlocked_badges(overall_percentage: u8, total_activities: u64) -> Vec<Badge> {
    let mut badges: Vec<Badge> = PROGRESS_BADGES
        .iter()
        .filter(|(threshold, _)| overall_percentage >= *threshold)
        .map(|(_, badge)| *badge)
        .collect();

    if total_activities >= ACTIVITY_STREAK_THRESHOLD {
        badges.push(ACTIVITY_STREAK_BADGE);
    }

    badges
}
