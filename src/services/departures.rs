//! Turns the raw departure board into one row per line and direction
use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use itertools::Itertools;
use tracing::error;

use crate::model::{departure::Departure, vasttrafik_api_model::VasttrafikDeparture};

/// Normalizes, sorts and merges departures so that each `(name, direction)` pair appears once.
/// Departures whose time can't be parsed are logged and left out.
pub fn normalize_departures(raw: Vec<VasttrafikDeparture>, now: DateTime<Tz>) -> Vec<Departure> {
    let mut departures = raw
        .into_iter()
        .map(|d| to_departure(d, now))
        .filter_map(|d| match d {
            Err(e) => {
                error!("Error turning VasttrafikDeparture to Departure {e:#}");
                None
            }
            Ok(d) => Some(d),
        })
        .collect_vec();

    // stable, so merging keeps upstream order within a group
    departures.sort_by(|a, b| (&a.name, &a.direction).cmp(&(&b.name, &b.direction)));

    merge_departures(departures)
}

fn to_departure(raw: VasttrafikDeparture, now: DateTime<Tz>) -> anyhow::Result<Departure> {
    let is_live = raw.rt_time.is_some();

    let (date, clock) = if is_live {
        (raw.rt_date.or(raw.date), raw.rt_time)
    } else {
        (raw.date, raw.time)
    };
    let date = date.unwrap_or_default();
    let clock = clock.unwrap_or_default();

    let departs_at = parse_departure_time(&date, &clock, now.timezone())?;
    let (direction, via) = split_via(raw.direction.as_deref().unwrap_or_default());

    Ok(Departure {
        name: raw.name.unwrap_or_default(),
        sname: raw.sname.unwrap_or_default(),
        kind: raw.kind.unwrap_or_default(),
        direction,
        via,
        track: raw.track.unwrap_or_default(),
        accessibility: raw.accessibility.unwrap_or_default(),
        bg_color: raw.bg_color.unwrap_or_default(),
        fg_color: raw.fg_color.unwrap_or_default(),
        journeyid: raw.journeyid.unwrap_or_default(),
        is_live,
        clock_left: clock,
        clock_next: None,
        time_left: minutes_left(departs_at, now),
        time_next: None,
    })
}

fn parse_departure_time(date: &str, time: &str, tz: Tz) -> anyhow::Result<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .with_context(|| format!("Couldn't parse departure time {date:?} {time:?}"))?;

    naive
        .and_local_timezone(tz)
        .earliest()
        .ok_or_else(|| anyhow!("{naive} doesn't exist in {tz}"))
}

/// Whole minutes until departure, 0 once it has left
pub fn minutes_left(departs_at: DateTime<Tz>, now: DateTime<Tz>) -> i64 {
    if departs_at <= now {
        return 0;
    }

    (departs_at - now).num_minutes()
}

/// Splits "Centralen via Nils Ericsonsplatsen" into ("Centralen", "via Nils Ericsonsplatsen")
pub fn split_via(direction: &str) -> (String, String) {
    match direction.split_once("via") {
        Some((direction, via)) if !via.trim().is_empty() => {
            (direction.trim().to_string(), format!("via {}", via.trim()))
        }
        Some((direction, _)) => (direction.trim().to_string(), String::new()),
        None => (direction.trim().to_string(), String::new()),
    }
}

/// Expects departures sorted by `(name, direction)`
fn merge_departures(sorted: Vec<Departure>) -> Vec<Departure> {
    let chunks = sorted
        .into_iter()
        .chunk_by(|d| (d.name.clone(), d.direction.clone()));

    let merged = chunks
        .into_iter()
        .filter_map(|(_, group)| merge_group(group.collect_vec()))
        .collect_vec();

    merged
}

fn merge_group(group: Vec<Departure>) -> Option<Departure> {
    let has_next = group.len() > 1;

    let clock_left = group.iter().map(|d| &d.clock_left).min()?.clone();
    let clock_next = group
        .iter()
        .map(|d| &d.clock_left)
        .max()
        .filter(|_| has_next)
        .cloned();
    let time_left = group.iter().map(|d| d.time_left).min()?;
    let time_next = group.iter().map(|d| d.time_left).max().filter(|_| has_next);

    let first = group.into_iter().next()?;

    Some(Departure {
        clock_left,
        clock_next,
        time_left,
        time_next,
        ..first
    })
}
