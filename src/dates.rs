// Compact YYYYMMDD visit codes, visit counting and the global timeline domain
use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use crate::dataset::{Place, PlaceId};
use crate::error::{Error, Result};

/// Every date in the dataset belongs to this year; absent codes fall back to its first day.
pub const REFERENCE_YEAR: i16 = 1786;

pub const MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

/// More dates than this are summarised as a range instead of a list.
const LIST_LIMIT: usize = 10;

/// A visit date encoded as the integer YYYYMMDD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateCode(pub u32);

impl DateCode {
    pub const REFERENCE: DateCode = DateCode(REFERENCE_YEAR as u32 * 10000 + 101);

    pub fn year(self) -> u32 {
        self.0 / 10000
    }

    pub fn month(self) -> u32 {
        (self.0 % 10000) / 100
    }

    pub fn day(self) -> u32 {
        self.0 % 100
    }

    pub fn to_date(self) -> Result<Date> {
        let year = self.year();
        if year > 9999 {
            return Err(Error::InvalidDate(self));
        }
        Date::new(year as i16, self.month() as i8, self.day() as i8)
            .map_err(|_| Error::InvalidDate(self))
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Int(i64),
    Text(String),
    Absent,
}

// Codes come either as numbers or as numeric strings; null and "" mean "absent".
impl<'de> Deserialize<'de> for DateCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = match RawCode::deserialize(deserializer)? {
            RawCode::Int(v) => u32::try_from(v).unwrap_or(0),
            RawCode::Text(s) if s.trim().is_empty() => DateCode::REFERENCE.0,
            RawCode::Text(s) => s.trim().parse::<u32>().unwrap_or_else(|_| {
                log::warn!("unparseable visit date {:?}", s);
                0
            }),
            RawCode::Absent => DateCode::REFERENCE.0,
        };
        Ok(DateCode(code))
    }
}

impl Serialize for DateCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

pub fn reference_date() -> Date {
    jiff::civil::date(REFERENCE_YEAR, 1, 1)
}

/// Decodes a YYYYMMDD code. An absent code maps to the first day of the reference year.
pub fn decode_date(code: Option<DateCode>) -> Result<Date> {
    match code {
        Some(code) => code.to_date(),
        None => Ok(reference_date()),
    }
}

/// Decodes the valid codes of one place, sorted and deduplicated.
pub fn decode_all(codes: &[DateCode]) -> Vec<Date> {
    let mut dates: Vec<Date> = codes.iter().filter_map(|c| decode_date(Some(*c)).ok()).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Counts runs of day-adjacent dates. A gap of more than one day starts a new visit.
pub fn count_visits(codes: &[DateCode]) -> usize {
    let dates = decode_all(codes);
    let mut iter = dates.iter();
    let Some(mut prev) = iter.next() else {
        return 0;
    };

    let mut visits = 1;
    for date in iter {
        let adjacent = prev.tomorrow().map(|next| *date <= next).unwrap_or(false);
        if !adjacent {
            visits += 1;
        }
        prev = date;
    }
    visits
}

/// Union of every decoded visit date in the dataset, strictly ascending.
pub fn build_global_timeline(places: &[Place]) -> Vec<Date> {
    let all: BTreeSet<Date> = places
        .iter()
        .flat_map(|p| decode_all(&p.visit_dates))
        .collect();
    all.into_iter().collect()
}

/// Decoded dates per place plus the global timeline domain.
#[derive(Debug, Default)]
pub struct DateIndex {
    by_place: FxHashMap<PlaceId, Vec<Date>>,
    timeline: Vec<Date>,
}

impl DateIndex {
    pub fn build(places: &[Place]) -> Self {
        let mut by_place = FxHashMap::default();
        for place in places {
            for code in &place.visit_dates {
                if let Err(e) = decode_date(Some(*code)) {
                    log::warn!("place '{}': {}, ignored", place.id, e);
                }
            }
            by_place.insert(place.id.clone(), decode_all(&place.visit_dates));
        }
        Self { by_place, timeline: build_global_timeline(places) }
    }

    /// Sorted distinct dates of a place; empty for undated places.
    pub fn dates_of(&self, id: &PlaceId) -> &[Date] {
        self.by_place.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn timeline(&self) -> &[Date] {
        &self.timeline
    }
}

// --- Display helpers (fixed French locale) ---

pub fn month_name(month: u32) -> Option<&'static str> {
    month.checked_sub(1).and_then(|m| MONTHS.get(m as usize)).copied()
}

/// "2 janvier 1786"
pub fn format_timeline_date(date: Date) -> String {
    let month = month_name(date.month() as u32).unwrap_or_default();
    format!("{} {} {}", date.day(), month, date.year())
}

/// "02/01"
pub fn format_date_short(code: DateCode) -> String {
    format!("{:02}/{:02}", code.day(), code.month())
}

/// Lists up to ten dates, otherwise gives the first and last one.
pub fn dates_summary(codes: &[DateCode]) -> String {
    match codes {
        [] => "Non daté".to_string(),
        [first, .., last] if codes.len() > LIST_LIMIT => {
            format!("entre le {} et le {}", format_date_short(*first), format_date_short(*last))
        }
        _ => codes.iter().map(|c| format_date_short(*c)).collect::<Vec<_>>().join(", "),
    }
}

fn plural(n: usize) -> &'static str {
    if n > 1 { "s" } else { "" }
}

/// "2 visites (3 jours)" as shown under search results.
pub fn visit_summary(codes: &[DateCode]) -> String {
    let visits = count_visits(codes);
    if visits == 0 {
        return "Non daté".to_string();
    }
    let days = codes.len();
    let head = format!("{} visite{} ({} jour{}", visits, plural(visits), days, plural(days));
    if days > LIST_LIMIT {
        format!("{}, {})", head, dates_summary(codes))
    } else {
        format!("{})", head)
    }
}

/// Every human rendering of a code the search box matches against, lowercased.
pub fn searchable_renderings(code: DateCode) -> String {
    let raw = code.to_string();
    let (year, month, day) = (&raw[0..4], &raw[4..6], &raw[6..8]);
    let month_name = month_name(code.month()).unwrap_or_default();
    [
        format!("{}/{}", day, month),
        format!("{}/{}/{}", day, month, year),
        format!("{}.{}", day, month),
        format!("{}.{}.{}", day, month, year),
        format!("{} {}", day, month_name),
        month_name.to_string(),
        raw.clone(),
    ]
    .join(" ")
    .to_lowercase()
}
