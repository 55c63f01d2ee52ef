//! Test configuration read from widget query parameters.
//!
//! Every key falls back to its default on a missing or malformed value; a
//! malformed value is logged as a warning and never aborts construction.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ConfigProvider;
use crate::error::SettingsError;
use crate::trail::SymbolType;

pub const DEFAULT_TRAIL_LENGTH: usize = 10;
pub const DEFAULT_NUMBER_RADIUS: u32 = 30;
pub const DEFAULT_TEXT_SIZE: u32 = 18;

/// A custom target position, in percent of the surface on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupSettings {
    pub hide_buttons: bool,
    pub hide_results: bool,
    pub hide_all: bool,
}

/// Immutable snapshot used to generate and place one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSettings {
    pub trail_length: usize,
    pub number_radius: u32,
    pub text_size: u32,
    pub symbol_type: SymbolType,
    pub reverse_order: bool,
    pub show_timer: bool,
    pub lines_under_dots: bool,
    pub allow_wrong_selections: bool,
    pub show_wrong_selections: bool,
    pub popup: PopupSettings,
    pub custom_positions: Option<Vec<PercentPosition>>,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            trail_length: DEFAULT_TRAIL_LENGTH,
            number_radius: DEFAULT_NUMBER_RADIUS,
            text_size: DEFAULT_TEXT_SIZE,
            symbol_type: SymbolType::Numbers,
            reverse_order: false,
            show_timer: true,
            lines_under_dots: true,
            allow_wrong_selections: false,
            show_wrong_selections: true,
            popup: PopupSettings::default(),
            custom_positions: None,
        }
    }
}

/// Presentation flags the surrounding UI may change while a run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStyle {
    pub lines_under_dots: bool,
    pub show_wrong_selections: bool,
    pub show_timer: bool,
}

impl From<&TrailSettings> for LiveStyle {
    fn from(s: &TrailSettings) -> Self {
        Self {
            lines_under_dots: s.lines_under_dots,
            show_wrong_selections: s.show_wrong_selections,
            show_timer: s.show_timer,
        }
    }
}

impl TrailSettings {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        let defaults = Self::default();

        let symbol_type = match provider.get("symbolType") {
            None => defaults.symbol_type,
            Some(raw) => SymbolType::parse(&raw).unwrap_or_else(|err| {
                warn!(%err, "falling back to default symbol type");
                defaults.symbol_type
            }),
        };

        let mut trail_length =
            positive_int(provider, "trailLength", DEFAULT_TRAIL_LENGTH as u32) as usize;
        if let Some(max) = symbol_type.max_trail_length() {
            if trail_length > max {
                warn!(trail_length, max, %symbol_type, "trail length exceeds available symbols, clamping");
                trail_length = max;
            }
        }

        let custom_positions = provider.get("customPositions").and_then(|raw| {
            parse_custom_positions(&raw)
                .map_err(|err| warn!(%err, "ignoring custom positions"))
                .ok()
        });

        Self {
            trail_length,
            number_radius: positive_int(provider, "numberRadius", DEFAULT_NUMBER_RADIUS),
            text_size: positive_int(provider, "textSize", DEFAULT_TEXT_SIZE),
            symbol_type,
            reverse_order: flag_on(provider, "reverseOrder"),
            show_timer: !flag_off(provider, "showTimer"),
            lines_under_dots: !flag_off(provider, "linesUnderDots"),
            allow_wrong_selections: flag_on(provider, "allowWrongSelections"),
            show_wrong_selections: !flag_off(provider, "showWrongSelections"),
            popup: PopupSettings {
                hide_buttons: flag_on(provider, "hidePopupButtons"),
                hide_results: flag_on(provider, "hidePopupResults"),
                hide_all: flag_on(provider, "hidePopupAll"),
            },
            custom_positions,
        }
    }

    pub fn radius(&self) -> f64 {
        self.number_radius as f64
    }

    /// Custom positions that cover the whole trail, if any.
    pub fn covering_positions(&self) -> Option<&[PercentPosition]> {
        self.custom_positions
            .as_deref()
            .filter(|p| p.len() >= self.trail_length)
    }
}

/// Opt-in flag: only the literal `true` enables it.
fn flag_on(provider: &dyn ConfigProvider, key: &str) -> bool {
    provider.get(key).as_deref() == Some("true")
}

/// Opt-out flag: only the literal `false` disables it.
fn flag_off(provider: &dyn ConfigProvider, key: &str) -> bool {
    provider.get(key).as_deref() == Some("false")
}

fn positive_int(provider: &dyn ConfigProvider, key: &'static str, default: u32) -> u32 {
    let Some(raw) = provider.get(key) else {
        return default;
    };
    match parse_leading_int(key, &raw) {
        Ok(v) if v > 0 => v,
        Ok(_) => {
            warn!(key, value = %raw, default, "value must be positive, using default");
            default
        }
        Err(err) => {
            warn!(%err, default, "using default");
            default
        }
    }
}

/// Integer prefix parse: leading whitespace and trailing garbage are ignored,
/// so `"12px"` reads as 12.
fn parse_leading_int(key: &'static str, raw: &str) -> Result<u32, SettingsError> {
    let trimmed = raw.trim_start();
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().map_err(|_| SettingsError::InvalidNumber {
        key,
        value: raw.to_string(),
    })
}

/// Validate a `customPositions` value as a whole.
///
/// The value arrives query-decoded but may still carry one layer of percent
/// encoding, which is removed before parsing. Any invalid entry rejects the
/// entire list.
pub fn parse_custom_positions(raw: &str) -> Result<Vec<PercentPosition>, SettingsError> {
    let decoded = decode_component(raw);
    let positions: Vec<PercentPosition> = serde_json::from_str(&decoded)?;

    if positions.is_empty() {
        return Err(SettingsError::EmptyPositions);
    }

    let in_range = |v: f64| (0.0..=100.0).contains(&v);
    if let Some((index, p)) = positions
        .iter()
        .enumerate()
        .find(|(_, p)| !in_range(p.x) || !in_range(p.y))
    {
        return Err(SettingsError::OutOfRange {
            index,
            x: p.x,
            y: p.y,
        });
    }

    Ok(positions)
}

fn decode_component(raw: &str) -> String {
    if !raw.contains('%') {
        return raw.to_string();
    }
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| if v.is_empty() { k.into_owned() } else { format!("{k}={v}") })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryParams;

    fn from_query(q: &str) -> TrailSettings {
        TrailSettings::from_provider(&QueryParams::parse(q))
    }

    #[test]
    fn empty_query_gives_defaults() {
        assert_eq!(from_query(""), TrailSettings::default());
    }

    #[test]
    fn reads_every_key() {
        let s = from_query(
            "trailLength=8&numberRadius=20&textSize=14&symbolType=letters-numbers\
             &reverseOrder=true&showTimer=false&linesUnderDots=false\
             &allowWrongSelections=true&showWrongSelections=false\
             &hidePopupButtons=true&hidePopupResults=true&hidePopupAll=true",
        );
        assert_eq!(s.trail_length, 8);
        assert_eq!(s.number_radius, 20);
        assert_eq!(s.text_size, 14);
        assert_eq!(s.symbol_type, SymbolType::LettersNumbers);
        assert!(s.reverse_order);
        assert!(!s.show_timer);
        assert!(!s.lines_under_dots);
        assert!(s.allow_wrong_selections);
        assert!(!s.show_wrong_selections);
        assert_eq!(
            s.popup,
            PopupSettings {
                hide_buttons: true,
                hide_results: true,
                hide_all: true
            }
        );
    }

    #[test]
    fn flags_only_react_to_literal_values() {
        let s = from_query("reverseOrder=yes&showTimer=0");
        assert!(!s.reverse_order);
        assert!(s.show_timer);
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let s = from_query("trailLength=abc&numberRadius=0&textSize=-3");
        assert_eq!(s.trail_length, DEFAULT_TRAIL_LENGTH);
        assert_eq!(s.number_radius, DEFAULT_NUMBER_RADIUS);
        assert_eq!(s.text_size, DEFAULT_TEXT_SIZE);
    }

    #[test]
    fn numbers_parse_leading_digits() {
        let s = from_query("trailLength=12abc&numberRadius=%2025");
        assert_eq!(s.trail_length, 12);
        assert_eq!(s.number_radius, 25);
    }

    #[test]
    fn unknown_symbol_type_falls_back() {
        assert_eq!(from_query("symbolType=runes").symbol_type, SymbolType::Numbers);
    }

    #[test]
    fn letter_trails_are_clamped_to_alphabet() {
        assert_eq!(from_query("symbolType=letters&trailLength=40").trail_length, 26);
        assert_eq!(from_query("symbolType=numbers-letters&trailLength=60").trail_length, 52);
        assert_eq!(from_query("symbolType=numbers&trailLength=60").trail_length, 60);
    }

    #[test]
    fn custom_positions_plain_json() {
        let positions = parse_custom_positions(r#"[{"x":10,"y":20},{"x":0,"y":100}]"#).unwrap();
        assert_eq!(
            positions,
            vec![
                PercentPosition { x: 10.0, y: 20.0 },
                PercentPosition { x: 0.0, y: 100.0 }
            ]
        );
    }

    #[test]
    fn custom_positions_double_encoded_in_query() {
        // JSON percent-encoded once by the generator, then again by the query serializer
        let s = from_query(
            "customPositions=%255B%257B%2522x%2522%253A10%252C%2522y%2522%253A20.5%257D%255D",
        );
        assert_eq!(
            s.custom_positions,
            Some(vec![PercentPosition { x: 10.0, y: 20.5 }])
        );
    }

    #[test]
    fn custom_positions_rejected_as_a_whole() {
        assert!(matches!(
            parse_custom_positions(r#"[{"x":10,"y":20},{"x":101,"y":5}]"#),
            Err(SettingsError::OutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            parse_custom_positions(r#"{"x":10,"y":20}"#),
            Err(SettingsError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_custom_positions(r#"[{"x":"10","y":20}]"#),
            Err(SettingsError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_custom_positions("[]"),
            Err(SettingsError::EmptyPositions)
        ));
        assert!(parse_custom_positions("not json").is_err());
    }

    #[test]
    fn malformed_custom_positions_are_absent() {
        assert_eq!(from_query("customPositions=%5B1%2C2%5D").custom_positions, None);
    }

    #[test]
    fn covering_positions_requires_full_trail() {
        let mut s = TrailSettings {
            trail_length: 3,
            custom_positions: Some(vec![PercentPosition { x: 1.0, y: 1.0 }; 2]),
            ..TrailSettings::default()
        };
        assert!(s.covering_positions().is_none());

        s.custom_positions = Some(vec![PercentPosition { x: 1.0, y: 1.0 }; 4]);
        assert_eq!(s.covering_positions().map(<[_]>::len), Some(4));
    }

    #[test]
    fn live_style_mirrors_settings() {
        let s = from_query("linesUnderDots=false&showTimer=false");
        let live = LiveStyle::from(&s);
        assert!(!live.lines_under_dots);
        assert!(live.show_wrong_selections);
        assert!(!live.show_timer);
    }
}
