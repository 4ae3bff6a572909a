//! Pure aggregation over raw event rows. The service loads rows, these
//! functions turn them into report figures.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use common::{AssetCategory, EventType};

use crate::models::analytics::{CategoryStat, MonthlyStat, TopAsset};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const EARNINGS_PER_DOWNLOAD: f64 = 1.5;
const EARNINGS_PER_VIEW: f64 = 0.01;

/// Event counts by type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TypeCounts {
    pub views: i64,
    pub downloads: i64,
    pub likes: i64,
    pub shares: i64,
    pub follows: i64,
}

impl TypeCounts {
    pub fn add(&mut self, event_type: EventType) {
        match event_type {
            EventType::View => self.views += 1,
            EventType::Download => self.downloads += 1,
            EventType::Like => self.likes += 1,
            EventType::Share => self.shares += 1,
            EventType::Follow => self.follows += 1,
        }
    }

    pub fn earnings(&self) -> f64 {
        earnings(self.views, self.downloads)
    }
}

pub fn earnings(views: i64, downloads: i64) -> f64 {
    round2(downloads as f64 * EARNINGS_PER_DOWNLOAD + views as f64 * EARNINGS_PER_VIEW)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `(current - previous) / previous * 100`, rounded. Zero when there is no
/// previous activity.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round2((current - previous) / previous * 100.0)
}

/// Split rows already bounded to `[previous start, end)` into the current
/// window (`at >= start`) and the one before it.
pub fn split_windows(
    events: impl IntoIterator<Item = (EventType, DateTime<Utc>)>,
    start: DateTime<Utc>,
) -> (TypeCounts, TypeCounts) {
    let mut current = TypeCounts::default();
    let mut previous = TypeCounts::default();
    for (event_type, at) in events {
        if at >= start {
            current.add(event_type);
        } else {
            previous.add(event_type);
        }
    }
    (current, previous)
}

/// Twelve calendar-month buckets. Events outside `year` are ignored.
pub fn bucket_monthly(
    year: i32,
    events: impl IntoIterator<Item = (EventType, DateTime<Utc>)>,
) -> Vec<MonthlyStat> {
    let mut buckets = [TypeCounts::default(); 12];
    for (event_type, at) in events {
        if at.year() == year {
            buckets[at.month0() as usize].add(event_type);
        }
    }

    MONTH_NAMES
        .iter()
        .zip(buckets)
        .map(|(&month, counts)| MonthlyStat {
            month,
            views: counts.views,
            downloads: counts.downloads,
            earnings: counts.earnings(),
        })
        .collect()
}

pub fn tally_by_asset(
    events: impl IntoIterator<Item = (i32, EventType)>,
) -> HashMap<i32, TypeCounts> {
    let mut tally: HashMap<i32, TypeCounts> = HashMap::new();
    for (asset_id, event_type) in events {
        tally.entry(asset_id).or_default().add(event_type);
    }
    tally
}

/// Join tallies with asset titles, dropping assets that no longer exist,
/// and order by downloads then views (both descending).
pub fn rank_top_assets(
    tally: HashMap<i32, TypeCounts>,
    titles: &HashMap<i32, String>,
    limit: usize,
) -> Vec<TopAsset> {
    let mut ranked: Vec<TopAsset> = tally
        .into_iter()
        .filter_map(|(id, counts)| {
            titles.get(&id).map(|title| TopAsset {
                id,
                title: title.clone(),
                views: counts.views,
                downloads: counts.downloads,
                likes: counts.likes,
                earnings: counts.earnings(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.downloads
            .cmp(&a.downloads)
            .then(b.views.cmp(&a.views))
            .then(a.id.cmp(&b.id))
    });
    ranked.truncate(limit);
    ranked
}

/// Per-category distinct assets, views and downloads. `categories` maps
/// asset ids to their current category; unknown ids are skipped.
pub fn category_breakdown(
    events: impl IntoIterator<Item = (i32, EventType)>,
    categories: &HashMap<i32, AssetCategory>,
) -> Vec<CategoryStat> {
    let mut per_category: HashMap<AssetCategory, (Vec<i32>, TypeCounts)> = HashMap::new();
    for (asset_id, event_type) in events {
        let Some(category) = categories.get(&asset_id) else {
            continue;
        };
        let (assets, counts) = per_category.entry(*category).or_default();
        if !assets.contains(&asset_id) {
            assets.push(asset_id);
        }
        counts.add(event_type);
    }

    let mut stats: Vec<CategoryStat> = per_category
        .into_iter()
        .map(|(category, (assets, counts))| CategoryStat {
            category,
            assets: assets.len() as u64,
            views: counts.views,
            downloads: counts.downloads,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    stats
}
