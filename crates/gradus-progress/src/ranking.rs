use serde::Serialize;

use gradus_core::{Thesis, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub student_id: String,
    pub student_name: String,
    pub avatar: Option<String>,
    pub program: String,
    pub cohort: String,
    pub thesis_title: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, Default)]
pub struct RankingFilter {
    pub program: Option<String>,
    pub cohort: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingStatistics {
    pub average: u32,
    pub median: f64,
    pub progress_rate: u32,
    pub participants: u64,
}

// `rows` carries only ranking-eligible theses; visibility filtering happens
// at the store. Ordered by percentage descending, student name breaking ties.
pub fn build_entries(rows: &[(Thesis, User)], filter: &RankingFilter) -> Vec<RankingEntry> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut entries: Vec<RankingEntry> = rows
        .iter()
        .filter(|(_, student)| {
            filter
                .program
                .as_deref()
                .is_none_or(|program| student.program == program)
        })
        .filter(|(_, student)| {
            filter
                .cohort
                .as_deref()
                .is_none_or(|cohort| student.cohort == cohort)
        })
        .filter(|(_, student)| {
            search
                .as_deref()
                .is_none_or(|needle| student.name.to_lowercase().contains(needle))
        })
        .map(|(thesis, student)| RankingEntry {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            avatar: student.avatar.clone(),
            program: student.program.clone(),
            cohort: student.cohort.clone(),
            thesis_title: thesis.title.clone(),
            percentage: thesis.overall_percentage,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.percentage
            .cmp(&a.percentage)
            .then_with(|| a.student_name.cmp(&b.student_name))
    });

    entries
}

pub fn statistics(entries: &[RankingEntry]) -> RankingStatistics {
    if entries.is_empty() {
        return RankingStatistics {
            average: 0,
            median: 0.0,
            progress_rate: 0,
            participants: 0,
        };
    }

    let mut values: Vec<u8> = entries.iter().map(|entry| entry.percentage).collect();
    values.sort_unstable();

    let total: u32 = values.iter().map(|v| u32::from(*v)).sum();
    let len = values.len();
    let average = (f64::from(total) / len as f64).round() as u32;

    let median = if len % 2 == 0 {
        f64::from(u32::from(values[len / 2 - 1]) + u32::from(values[len / 2])) / 2.0
    } else {
        f64::from(values[len / 2])
    };

    let above_half = values.iter().filter(|v| **v > 50).count();
    let progress_rate = (above_half as f64 * 100.0 / len as f64).round() as u32;

    RankingStatistics {
        average,
        median,
        progress_rate,
        participants: len as u64,
    }
}

// Distinct, sorted program and cohort values for the ranking filter controls.
pub fn distinct_programs_and_cohorts(students: &[User]) -> (Vec<String>, Vec<String>) {
    let mut programs: Vec<String> = students
        .iter()
        .map(|student| student.program.clone())
        .filter(|program| !program.is_empty())
        .collect();
    programs.sort();
    programs.dedup();

    let mut cohorts: Vec<String> = students
        .iter()
        .map(|student| student.cohort.clone())
        .filter(|cohort| !cohort.is_empty())
        .collect();
    cohorts.sort();
    cohorts.dedup();

    (programs, cohorts)
}
