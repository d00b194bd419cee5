use crate::models::{Category, ChartSeries, DailyRow, DailyXpRecord, ProgressPage, Task};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Builds one record per day in `[start, end]`, summing completed task xp by
/// the day the task was created.
pub fn aggregate(tasks: &[Task], start: NaiveDate, end: NaiveDate) -> Vec<DailyXpRecord> {
    if end < start {
        return Vec::new();
    }

    let mut records: Vec<DailyXpRecord> = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(DailyXpRecord::empty)
        .collect();

    for task in tasks.iter().filter(|task| task.completed) {
        let day = task.created_at.date_naive();
        if day < start || day > end {
            continue;
        }
        let index = (day - start).num_days() as usize;
        let bucket = records[index].bucket_mut(task.category);
        *bucket = bucket.saturating_add(task.xp);
    }

    records
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamps a requested page index into `[0, total_pages - 1]`.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let last = total_pages.saturating_sub(1) as i64;
    requested.clamp(0, last) as usize
}

pub fn paginate(records: &[DailyXpRecord], requested: i64, page_size: usize) -> ProgressPage {
    let page_size = page_size.max(1);
    let total_pages = total_pages(records.len(), page_size);
    let page = clamp_page(requested, total_pages);

    let start = (page * page_size).min(records.len());
    let end = (start + page_size).min(records.len());
    let rows = records[start..end]
        .iter()
        .enumerate()
        .map(|(offset, record)| DailyRow {
            day: start + offset + 1,
            date: record.date.to_string(),
            strength: record.strength,
            intelligence: record.intelligence,
            charisma: record.charisma,
            wisdom: record.wisdom,
            total: record.total(),
        })
        .collect();

    ProgressPage {
        page,
        total_pages,
        total_days: records.len(),
        first_day: if start < end { start + 1 } else { 0 },
        last_day: end,
        has_prev: page > 0,
        has_next: page + 1 < total_pages,
        rows,
    }
}

/// Samples every `step`-th day so the chart stays readable over long windows.
pub fn chart_series(records: &[DailyXpRecord], step: usize) -> ChartSeries {
    let step = step.max(1);
    let sampled: Vec<&DailyXpRecord> = records.iter().step_by(step).collect();

    let labels = sampled.iter().map(|record| record.date.to_string()).collect();
    let series = Category::ALL
        .into_iter()
        .map(|category| {
            let points = sampled.iter().map(|record| record.get(category)).collect();
            (category, points)
        })
        .collect::<BTreeMap<_, _>>();

    ChartSeries { labels, series }
}

pub fn window_len(start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        0
    } else {
        ((end - start) + Duration::days(1)).num_days() as usize
    }
}
