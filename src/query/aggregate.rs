use crate::query::events::EventRow;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Channel label applied to events with an empty or missing channel.
pub const UNKNOWN_CHANNEL: &str = "unknown";

/// Per-channel page-view count.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChannelCount {
    pub channel: String,
    pub count: u64,
}

/// Per-channel distinct-session count.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionStat {
    pub channel: String,
    pub sessions: u64,
}

/// Per-channel section-view total and per-session average.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAverage {
    pub channel: String,
    pub avg_per_session: f64,
    pub total_sections: u64,
}

/// One CTA type inside a channel's breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaItem {
    pub cta_type: String,
    pub avg_per_session: f64,
    pub total: u64,
}

/// Per-channel CTA breakdown with the session count the averages divide by.
#[derive(Debug, Clone, Serialize)]
pub struct CtaTypeAverage {
    pub channel: String,
    pub items: Vec<CtaItem>,
    pub sessions: u64,
}

/// The full aggregation response. Computed fresh on every request, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub range: String,
    pub start_date: String,
    pub end_date: String,
    pub total: u64,
    pub rows: Vec<ChannelCount>,
    pub session_stats: Vec<SessionStat>,
    pub section_averages: Vec<SectionAverage>,
    pub cta_type_averages: Vec<CtaTypeAverage>,
}

/// Per-channel accumulator for one pass over the three event streams.
#[derive(Debug, Default)]
struct ChannelAccum {
    page_views: u64,
    section_views: u64,
    cta_clicks: BTreeMap<String, u64>,
    sessions: BTreeSet<String>,
}

fn normalize_channel(channel: Option<&str>) -> String {
    match channel.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNKNOWN_CHANNEL.to_string(),
    }
}

fn normalize_label(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => UNKNOWN_CHANNEL.to_string(),
    }
}

/// Average guarded against empty session sets: a channel with zero distinct
/// sessions reports 0, never a division error.
#[allow(clippy::cast_precision_loss)]
fn per_session(total: u64, sessions: u64) -> f64 {
    if sessions == 0 {
        0.0
    } else {
        total as f64 / sessions as f64
    }
}

/// Join the three event streams by channel and session into the dashboard
/// summary.
///
/// Pure function of its inputs: the same rows always produce byte-identical
/// output. Channels are unioned across all three streams, so a channel seen
/// only as a CTA click still appears in every output list. Sessions without
/// an id contribute to raw totals but not to distinct-session counts.
pub fn aggregate(
    range: &str,
    start_date: &str,
    end_date: &str,
    page_views: &[EventRow],
    section_views: &[EventRow],
    cta_clicks: &[EventRow],
) -> AggregationReport {
    let mut channels: BTreeMap<String, ChannelAccum> = BTreeMap::new();

    let mut accum_for = |channels: &mut BTreeMap<String, ChannelAccum>, row: &EventRow| {
        let key = normalize_channel(row.channel.as_deref());
        let entry = channels.entry(key).or_default();
        if let Some(session) = row.session_id.as_deref().map(str::trim) {
            if !session.is_empty() {
                entry.sessions.insert(session.to_string());
            }
        }
    };

    for row in page_views {
        accum_for(&mut channels, row);
        let key = normalize_channel(row.channel.as_deref());
        channels.entry(key).or_default().page_views += 1;
    }
    for row in section_views {
        accum_for(&mut channels, row);
        let key = normalize_channel(row.channel.as_deref());
        channels.entry(key).or_default().section_views += 1;
    }
    for row in cta_clicks {
        accum_for(&mut channels, row);
        let key = normalize_channel(row.channel.as_deref());
        let cta = normalize_label(row.cta_type.as_deref());
        *channels.entry(key).or_default().cta_clicks.entry(cta).or_default() += 1;
    }

    let mut rows = Vec::with_capacity(channels.len());
    let mut session_stats = Vec::with_capacity(channels.len());
    let mut section_averages = Vec::with_capacity(channels.len());
    let mut cta_type_averages = Vec::with_capacity(channels.len());

    for (channel, accum) in &channels {
        let sessions = accum.sessions.len() as u64;

        rows.push(ChannelCount {
            channel: channel.clone(),
            count: accum.page_views,
        });
        session_stats.push(SessionStat {
            channel: channel.clone(),
            sessions,
        });
        section_averages.push(SectionAverage {
            channel: channel.clone(),
            avg_per_session: per_session(accum.section_views, sessions),
            total_sections: accum.section_views,
        });

        let mut items: Vec<CtaItem> = accum
            .cta_clicks
            .iter()
            .map(|(cta_type, &total)| CtaItem {
                cta_type: cta_type.clone(),
                avg_per_session: per_session(total, sessions),
                total,
            })
            .collect();
        items.sort_by(|a, b| {
            b.avg_per_session
                .total_cmp(&a.avg_per_session)
                .then_with(|| a.cta_type.cmp(&b.cta_type))
        });
        cta_type_averages.push(CtaTypeAverage {
            channel: channel.clone(),
            items,
            sessions,
        });
    }

    // Descending by metric, channel name as tie-break for stable output
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.channel.cmp(&b.channel)));
    session_stats
        .sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.channel.cmp(&b.channel)));
    section_averages.sort_by(|a, b| {
        b.avg_per_session
            .total_cmp(&a.avg_per_session)
            .then_with(|| a.channel.cmp(&b.channel))
    });
    cta_type_averages
        .sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.channel.cmp(&b.channel)));

    let total = rows.iter().map(|r| r.count).sum();

    AggregationReport {
        range: range.to_string(),
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        total,
        rows,
        session_stats,
        section_averages,
        cta_type_averages,
    }
}
