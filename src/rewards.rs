//! Reward tiers and achievements derived from the stat sheet and task log.

use crate::models::{Category, StatSheet, Task};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Levels between reward tiers of one stat.
pub const LEVELS_PER_TIER: u32 = 5;
pub const TIERS_PER_STAT: u32 = 4;
pub const STREAK_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardTier {
    pub category: Category,
    pub tier: u32,
    pub required_level: u32,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

impl Achievement {
    const fn new(id: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            id,
            name,
            description,
            unlocked: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RewardsResponse {
    pub tiers: Vec<RewardTier>,
    pub achievements: Vec<Achievement>,
}

pub fn all_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new("first_steps", "First Steps", "Complete your first task"),
        Achievement::new(
            "daily_streak",
            "Daily Streak",
            "Complete tasks on 7 consecutive days",
        ),
        Achievement::new(
            "balanced_development",
            "Balanced Development",
            "Reach level 5 in every stat",
        ),
        Achievement::new("master_achiever", "Master Achiever", "Reach level 20 in any stat"),
    ]
}

pub fn reward_tiers(stats: &StatSheet) -> Vec<RewardTier> {
    stats
        .iter()
        .flat_map(|(category, stat)| {
            (1..=TIERS_PER_STAT).map(move |tier| {
                let required_level = tier * LEVELS_PER_TIER;
                RewardTier {
                    category,
                    tier,
                    required_level,
                    unlocked: stat.level >= required_level,
                }
            })
        })
        .collect()
}

pub fn check_achievements(stats: &StatSheet, tasks: &[Task]) -> Vec<Achievement> {
    let mut achievements = all_achievements();
    for achievement in &mut achievements {
        achievement.unlocked = match achievement.id {
            "first_steps" => tasks.iter().any(|task| task.completed),
            "daily_streak" => longest_streak(tasks) >= STREAK_DAYS,
            "balanced_development" => stats.iter().all(|(_, stat)| stat.level >= 5),
            "master_achiever" => stats.iter().any(|(_, stat)| stat.level >= 20),
            _ => false,
        };
    }
    achievements
}

pub fn rewards(stats: &StatSheet, tasks: &[Task]) -> RewardsResponse {
    RewardsResponse {
        tiers: reward_tiers(stats),
        achievements: check_achievements(stats, tasks),
    }
}

/// Longest run of consecutive days with at least one completed task, keyed
/// by creation day like the daily aggregate.
pub fn longest_streak(tasks: &[Task]) -> usize {
    let days: BTreeSet<NaiveDate> = tasks
        .iter()
        .filter(|task| task.completed)
        .map(|task| task.created_at.date_naive())
        .collect();

    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}
