//! Offline/demo fallback data, kept in one table instead of scattered
//! through the pages. Shown whenever the gateway is unreachable;
//! mutation actions stay disabled until a retry succeeds.

use crate::api::activities::Activity;
use crate::api::ai::Insights;
use crate::api::habits::{Habit, HabitStats};
use crate::api::stats::{
    ActivityChart, ActivitySummary, ChartPoint, DashboardStats, ExpenseDay, ExpenseReport,
    HabitProgress, HabitProgressDetail,
};
use chrono::{DateTime, TimeZone, Utc};

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 6, 0, 0).unwrap()
}

pub fn dashboard_stats() -> DashboardStats {
    DashboardStats {
        total_activities: 12,
        total_hours: 45.5,
        total_expenses: 125_000,
        active_habits: 3,
        completed_habits: 1,
        avg_daily_hours: 1.5,
        streak_days: 7,
        this_week_hours: 9.5,
        last_week_hours: 8.0,
        hours_growth_percent: 18.8,
    }
}

pub fn activities() -> Vec<Activity> {
    vec![
        Activity {
            id: 1,
            user_id: 0,
            title: "Belajar React.js".to_string(),
            start_time: day(2025, 7, 16),
            duration_mins: 120,
            cost: None,
            photo_url: String::new(),
            note: "Demo data - gateway offline".to_string(),
            created_at: day(2025, 7, 16),
            updated_at: day(2025, 7, 16),
        },
        Activity {
            id: 2,
            user_id: 0,
            title: "Workout Session".to_string(),
            start_time: day(2025, 7, 15),
            duration_mins: 60,
            cost: Some(15_000),
            photo_url: String::new(),
            note: String::new(),
            created_at: day(2025, 7, 15),
            updated_at: day(2025, 7, 15),
        },
        Activity {
            id: 3,
            user_id: 0,
            title: "Reading Time".to_string(),
            start_time: day(2025, 7, 15),
            duration_mins: 45,
            cost: None,
            photo_url: String::new(),
            note: String::new(),
            created_at: day(2025, 7, 15),
            updated_at: day(2025, 7, 15),
        },
    ]
}

pub fn habits() -> Vec<Habit> {
    vec![
        Habit {
            id: 1,
            user_id: 0,
            title: "Morning Exercise".to_string(),
            start_date: day(2025, 7, 1),
            end_date: day(2025, 7, 31),
            reminder_time: "06:00".to_string(),
            created_at: day(2025, 7, 1),
            updated_at: day(2025, 7, 1),
        },
        Habit {
            id: 2,
            user_id: 0,
            title: "Daily Reading".to_string(),
            start_date: day(2025, 7, 1),
            end_date: day(2025, 8, 15),
            reminder_time: String::new(),
            created_at: day(2025, 7, 1),
            updated_at: day(2025, 7, 1),
        },
        Habit {
            id: 3,
            user_id: 0,
            title: "Meditation".to_string(),
            start_date: day(2025, 7, 10),
            end_date: day(2025, 8, 10),
            reminder_time: "21:00".to_string(),
            created_at: day(2025, 7, 10),
            updated_at: day(2025, 7, 10),
        },
    ]
}

pub fn habit_stats() -> HabitStats {
    HabitStats {
        total_days: 30,
        completed_days: 12,
        skipped_days: 2,
        failed_days: 1,
        success_rate: 80.0,
        current_streak: 7,
        longest_streak: 9,
    }
}

pub fn insights() -> Insights {
    Insights {
        user_id: 0,
        total_activities: 12,
        total_hours: 45.5,
        total_expenses: 125_000,
        active_habits: 3,
        avg_daily_hours: 1.5,
        most_productive_time: "Morning".to_string(),
        top_activity_type: "Learning".to_string(),
        spending_pattern: "Steady".to_string(),
        ai_insights: "Demo mode - start the gateway to generate personalized insights."
            .to_string(),
        last_updated: None,
    }
}

pub fn activity_chart() -> ActivityChart {
    let points = [
        ("2025-07-10", 1.0, 1, 0),
        ("2025-07-11", 2.5, 2, 15_000),
        ("2025-07-12", 0.0, 0, 0),
        ("2025-07-13", 1.5, 1, 0),
        ("2025-07-14", 2.0, 2, 20_000),
        ("2025-07-15", 1.75, 2, 15_000),
        ("2025-07-16", 2.0, 1, 0),
    ];
    ActivityChart {
        labels: points.iter().map(|(d, ..)| d.to_string()).collect(),
        data: points
            .iter()
            .map(|(date, hours, activities, expenses)| ChartPoint {
                date: date.to_string(),
                hours: *hours,
                activities: *activities,
                expenses: *expenses,
            })
            .collect(),
    }
}

pub fn activity_summary() -> ActivitySummary {
    ActivitySummary {
        period: "Last 7 days".to_string(),
        total_activities: 9,
        total_hours: 10.75,
        total_expenses: 50_000,
        avg_duration_mins: 71.7,
        most_productive_day: "2025-07-11".to_string(),
        top_categories: Vec::new(),
    }
}

pub fn habit_progress() -> HabitProgress {
    HabitProgress {
        total_habits: 3,
        active_habits: 3,
        completed_habits: 0,
        overall_success_rate: 73.3,
        habit_details: vec![
            HabitProgressDetail {
                habit_id: 1,
                title: "Morning Exercise".to_string(),
                start_date: "2025-07-01".to_string(),
                end_date: "2025-07-31".to_string(),
                total_days: 31,
                completed_days: 16,
                success_rate: 80.0,
                current_streak: 7,
                status: "active".to_string(),
            },
            HabitProgressDetail {
                habit_id: 2,
                title: "Daily Reading".to_string(),
                start_date: "2025-07-01".to_string(),
                end_date: "2025-08-15".to_string(),
                total_days: 46,
                completed_days: 14,
                success_rate: 87.5,
                current_streak: 12,
                status: "active".to_string(),
            },
            HabitProgressDetail {
                habit_id: 3,
                title: "Meditation".to_string(),
                start_date: "2025-07-10".to_string(),
                end_date: "2025-08-10".to_string(),
                total_days: 32,
                completed_days: 5,
                success_rate: 62.5,
                current_streak: 3,
                status: "active".to_string(),
            },
        ],
    }
}

pub fn expense_report() -> ExpenseReport {
    ExpenseReport {
        period: "Last 30 days".to_string(),
        total_expenses: 125_000,
        average_daily: 4_166.7,
        highest_day: ExpenseDay {
            date: "2025-07-14".to_string(),
            amount: 20_000,
            count: 2,
        },
        expenses_by_category: Vec::new(),
        daily_breakdown: vec![
            ExpenseDay {
                date: "2025-07-11".to_string(),
                amount: 15_000,
                count: 1,
            },
            ExpenseDay {
                date: "2025-07-14".to_string(),
                amount: 20_000,
                count: 2,
            },
            ExpenseDay {
                date: "2025-07-15".to_string(),
                amount: 15_000,
                count: 1,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_tables_are_populated() {
        assert!(!activities().is_empty());
        assert!(!habits().is_empty());
        assert_eq!(dashboard_stats().total_activities, 12);
        assert!(habit_progress().habit_details.len() >= 3);
    }

    #[test]
    fn demo_habits_have_ordered_dates() {
        for habit in habits() {
            assert!(habit.end_date > habit.start_date, "{}", habit.title);
        }
    }
}
