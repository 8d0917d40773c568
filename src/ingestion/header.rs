//! Header canonicalization and dynamic column detection.
//!
//! Two ways to map source headers onto canonical fields:
//!
//! - [`canonicalize_header`]: normalize the header into a snake_case token, then look it up in a
//!   fixed alias table. Unknown tokens pass through unchanged and become extra columns.
//! - [`detect_columns`]: for files whose headers are not alias-table entries, match each core field
//!   against the raw header list, first by exact (case-insensitive) name and then by substring.

use crate::types::Field;

/// Known header spellings (after [`normalize_header`]) and the canonical identifier they map to.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("country", "country"),
    ("nation", "country"),
    ("year", "year"),
    ("temperature_anomaly", "temperature_anomaly"),
    ("temperature_anamoly", "temperature_anomaly"),
    ("temp_anomaly", "temperature_anomaly"),
    ("temperature_change", "temperature_anomaly"),
    ("co2_emissions", "co2_emissions"),
    ("co₂_emissions", "co2_emissions"),
    ("co2", "co2_emissions"),
    ("co2_emission", "co2_emissions"),
    ("co2_emissions_mt", "co2_emissions"),
    ("gdp", "gdp"),
    ("gdp_usd", "gdp"),
    ("gdp_current_us$", "gdp"),
    ("extreme_weather_events", "extreme_weather_events"),
    ("extreme_events", "extreme_weather_events"),
    ("extreme_weather", "extreme_weather_events"),
    ("population", "population"),
    ("urbanisation", "urbanization"),
];

/// Fold a raw header into a snake_case token.
///
/// `%` becomes the literal `pct`; `/ - . ( ) ,` become spaces; the result is lower-cased and
/// whitespace runs are joined with `_`. `"CO2 Emissions (Mt)"` becomes `co2_emissions_mt`.
pub fn normalize_header(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len() + 4);
    for ch in raw.trim().chars() {
        match ch {
            '%' => folded.push_str("pct"),
            '/' | '-' | '.' | '(' | ')' | ',' => folded.push(' '),
            other => folded.push(other),
        }
    }
    folded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Map a raw header to its canonical identifier.
///
/// Alias-table hits return the alias target; anything else returns the normalized token.
pub fn canonicalize_header(raw: &str) -> String {
    let token = normalize_header(raw);
    match HEADER_ALIASES.iter().find(|(alias, _)| *alias == token) {
        Some((_, canonical)) => (*canonical).to_string(),
        None => token,
    }
}

/// Core field a raw header canonicalizes to, if any.
pub fn resolve_field(raw: &str) -> Option<Field> {
    Field::from_name(&canonicalize_header(raw))
}

struct DetectionRule {
    field: Field,
    exact: &'static [&'static str],
    /// Each entry is a set of substrings that must all appear in the lower-cased header.
    contains: &'static [&'static [&'static str]],
}

const DETECTION_RULES: [DetectionRule; 7] = [
    DetectionRule {
        field: Field::Country,
        exact: &["country", "nation", "country name"],
        contains: &[&["country"], &["nation"]],
    },
    DetectionRule {
        field: Field::Year,
        exact: &["year"],
        contains: &[&["year"]],
    },
    DetectionRule {
        field: Field::TemperatureAnomaly,
        exact: &["temperature_anomaly", "temperature anomaly", "temp_anomaly"],
        contains: &[&["temperature", "anomaly"], &["temp", "anomaly"], &["temperature", "change"]],
    },
    DetectionRule {
        field: Field::Co2Emissions,
        exact: &["co2_emissions", "co2 emissions", "co2"],
        contains: &[&["co2"], &["co₂"], &["carbon", "emission"]],
    },
    DetectionRule {
        field: Field::Gdp,
        exact: &["gdp"],
        contains: &[&["gdp"]],
    },
    DetectionRule {
        field: Field::ExtremeWeatherEvents,
        exact: &["extreme_weather_events", "extreme weather events", "extreme_events"],
        contains: &[&["extreme"]],
    },
    DetectionRule {
        field: Field::Population,
        exact: &["population"],
        contains: &[&["population"]],
    },
];

/// Locate each core field in a raw header list.
///
/// Returns one `(field, column position)` pair per detected field, in [`Field::ALL`] order.
/// Exact matches are resolved for every field before any substring matching, and a header
/// claimed by one field is never offered to another. Within a pass the first matching header
/// wins. Fields with no match are simply absent from the result.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> Vec<(Field, usize)> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();
    let mut claimed = vec![false; headers.len()];
    let mut found: Vec<Option<usize>> = vec![None; DETECTION_RULES.len()];

    for (slot, rule) in found.iter_mut().zip(DETECTION_RULES.iter()) {
        *slot = lowered
            .iter()
            .enumerate()
            .find(|(i, h)| !claimed[*i] && rule.exact.contains(&h.as_str()))
            .map(|(i, _)| i);
        if let Some(i) = *slot {
            claimed[i] = true;
        }
    }

    for (slot, rule) in found.iter_mut().zip(DETECTION_RULES.iter()) {
        if slot.is_some() {
            continue;
        }
        *slot = rule.contains.iter().find_map(|needles| {
            lowered
                .iter()
                .enumerate()
                .find(|(i, h)| !claimed[*i] && needles.iter().all(|n| h.contains(n)))
                .map(|(i, _)| i)
        });
        if let Some(i) = *slot {
            claimed[i] = true;
        }
    }

    DETECTION_RULES
        .iter()
        .zip(found)
        .filter_map(|(rule, slot)| slot.map(|i| (rule.field, i)))
        .collect()
}
