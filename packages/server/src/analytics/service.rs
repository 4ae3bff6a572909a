use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use common::{AssetCategory, EventType, TimeRange};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entity::{analytics_event, asset, user};
use crate::extractors::client_info::ClientInfo;
use crate::models::analytics::{
    ActivityItem, CategoryStat, MonthlyStat, OverviewChanges, OverviewResponse, OverviewTotals,
    TopAsset,
};
use crate::utils::time_ago::time_ago;

use super::rollup;

/// Everything needed to append one event, apart from the asset lookup.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub asset_id: i32,
    pub event_type: EventType,
    pub user_id: Option<i32>,
    pub session_id: Option<String>,
    pub metadata: serde_json::Value,
    pub client: ClientInfo,
}

pub struct AnalyticsService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AnalyticsService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Append an event, copying the asset's creator onto it.
    ///
    /// Returns `None` when the asset does not exist. Asset counters are not
    /// touched.
    pub async fn track(
        &self,
        event: NewEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<analytics_event::Model>, DbErr> {
        let creator_id: Option<i32> = asset::Entity::find_by_id(event.asset_id)
            .select_only()
            .column(asset::Column::CreatorId)
            .into_tuple()
            .one(self.conn)
            .await?;
        let Some(creator_id) = creator_id else {
            return Ok(None);
        };

        let model = analytics_event::ActiveModel {
            asset_id: Set(event.asset_id),
            creator_id: Set(creator_id),
            user_id: Set(event.user_id),
            event_type: Set(event.event_type),
            ip_address: Set(event.client.ip_address),
            user_agent: Set(event.client.user_agent),
            referrer: Set(event.client.referrer),
            session_id: Set(event.session_id),
            metadata: Set(event.metadata),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        tracing::debug!(
            event_id = model.id,
            asset_id = model.asset_id,
            event_type = %model.event_type,
            "Tracked analytics event"
        );
        Ok(Some(model))
    }

    pub async fn overview(
        &self,
        creator_id: i32,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<OverviewResponse, DbErr> {
        let total_assets = asset::Entity::find()
            .filter(asset::Column::CreatorId.eq(creator_id))
            .count(self.conn)
            .await?;

        let (start, end) = range.current(now);
        let (prev_start, _) = range.previous(now);

        let rows: Vec<(EventType, DateTime<Utc>)> = analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::EventType)
            .column(analytics_event::Column::CreatedAt)
            .filter(analytics_event::Column::CreatorId.eq(creator_id))
            .filter(analytics_event::Column::CreatedAt.gte(prev_start))
            .filter(analytics_event::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(self.conn)
            .await?;

        let (current, previous) = rollup::split_windows(rows, start);

        let change = |cur: i64, prev: i64| rollup::percent_change(cur as f64, prev as f64);

        Ok(OverviewResponse {
            time_range: range.as_str().to_string(),
            overview: OverviewTotals {
                total_assets,
                total_views: current.views,
                total_downloads: current.downloads,
                total_likes: current.likes,
                total_shares: current.shares,
                total_earnings: current.earnings(),
                followers: None,
            },
            changes: OverviewChanges {
                views: change(current.views, previous.views),
                downloads: change(current.downloads, previous.downloads),
                likes: change(current.likes, previous.likes),
                shares: change(current.shares, previous.shares),
                earnings: rollup::percent_change(current.earnings(), previous.earnings()),
                followers: None,
            },
        })
    }

    /// Twelve month buckets for one UTC calendar year.
    pub async fn monthly(&self, creator_id: i32, year: i32) -> Result<Vec<MonthlyStat>, DbErr> {
        let Some((start, end)) = year_bounds(year) else {
            return Ok(rollup::bucket_monthly(year, Vec::new()));
        };

        let rows: Vec<(EventType, DateTime<Utc>)> = analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::EventType)
            .column(analytics_event::Column::CreatedAt)
            .filter(analytics_event::Column::CreatorId.eq(creator_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(self.conn)
            .await?;

        Ok(rollup::bucket_monthly(year, rows))
    }

    pub async fn top_assets(
        &self,
        creator_id: i32,
        range: TimeRange,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<TopAsset>, DbErr> {
        let rows = self.events_in_window(creator_id, range, now).await?;
        let tally = rollup::tally_by_asset(rows);

        let ids: Vec<i32> = tally.keys().copied().collect();
        let titles: HashMap<i32, String> = if ids.is_empty() {
            HashMap::new()
        } else {
            asset::Entity::find()
                .select_only()
                .column(asset::Column::Id)
                .column(asset::Column::Title)
                .filter(asset::Column::Id.is_in(ids))
                .into_tuple::<(i32, String)>()
                .all(self.conn)
                .await?
                .into_iter()
                .collect()
        };

        Ok(rollup::rank_top_assets(tally, &titles, limit))
    }

    pub async fn category_breakdown(
        &self,
        creator_id: i32,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryStat>, DbErr> {
        let rows = self.events_in_window(creator_id, range, now).await?;

        let mut ids: Vec<i32> = rows.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();

        let categories: HashMap<i32, AssetCategory> = if ids.is_empty() {
            HashMap::new()
        } else {
            asset::Entity::find()
                .select_only()
                .column(asset::Column::Id)
                .column(asset::Column::Category)
                .filter(asset::Column::Id.is_in(ids))
                .into_tuple::<(i32, AssetCategory)>()
                .all(self.conn)
                .await?
                .into_iter()
                .collect()
        };

        Ok(rollup::category_breakdown(rows, &categories))
    }

    /// Latest events for the creator regardless of time range.
    pub async fn recent_activity(
        &self,
        creator_id: i32,
        limit: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityItem>, DbErr> {
        let events = analytics_event::Entity::find()
            .filter(analytics_event::Column::CreatorId.eq(creator_id))
            .order_by_desc(analytics_event::Column::CreatedAt)
            .order_by_desc(analytics_event::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await?;

        let mut asset_ids: Vec<i32> = events.iter().map(|e| e.asset_id).collect();
        asset_ids.sort_unstable();
        asset_ids.dedup();
        let mut user_ids: Vec<i32> = events.iter().filter_map(|e| e.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let titles: HashMap<i32, String> = if asset_ids.is_empty() {
            HashMap::new()
        } else {
            asset::Entity::find()
                .select_only()
                .column(asset::Column::Id)
                .column(asset::Column::Title)
                .filter(asset::Column::Id.is_in(asset_ids))
                .into_tuple::<(i32, String)>()
                .all(self.conn)
                .await?
                .into_iter()
                .collect()
        };

        let actors: HashMap<i32, String> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(self.conn)
                .await?
                .into_iter()
                .map(|u| (u.id, u.display_name().to_string()))
                .collect()
        };

        Ok(events
            .into_iter()
            .map(|event| ActivityItem {
                id: event.id,
                event_type: event.event_type,
                asset: titles
                    .get(&event.asset_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Asset".to_string()),
                user: event
                    .user_id
                    .and_then(|id| actors.get(&id).cloned())
                    .unwrap_or_else(|| "Anonymous".to_string()),
                time: time_ago(event.created_at, now),
                timestamp: event.created_at,
            })
            .collect())
    }

    async fn events_in_window(
        &self,
        creator_id: i32,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<(i32, EventType)>, DbErr> {
        let (start, end) = range.current(now);
        analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::AssetId)
            .column(analytics_event::Column::EventType)
            .filter(analytics_event::Column::CreatorId.eq(creator_id))
            .filter(analytics_event::Column::CreatedAt.gte(start))
            .filter(analytics_event::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(self.conn)
            .await
    }
}

/// `[Jan 1 year, Jan 1 year+1)` in UTC, or `None` outside chrono's range.
fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc
        .with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0)
        .single()?;
    Some((start, end))
}
