//! Builds widget URLs from form values, emitting only what differs from the
//! widget defaults.

use rand::Rng;
use url::form_urlencoded;

use crate::settings::{PercentPosition, DEFAULT_NUMBER_RADIUS, DEFAULT_TRAIL_LENGTH};
use crate::trail::SymbolType;
use crate::util::round_to_hundredths;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9527/tmt";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorForm {
    pub trail_length: u32,
    pub number_radius: u32,
    pub symbol_type: SymbolType,
    pub reverse_order: bool,
    pub show_timer: bool,
    pub lines_under_dots: bool,
    pub allow_wrong_selections: bool,
    pub show_wrong_selections: bool,
    pub hide_popup_buttons: bool,
    pub hide_popup_results: bool,
    pub hide_popup_all: bool,
    /// Raw JSON text as typed into the form.
    pub custom_positions: Option<String>,
}

impl Default for GeneratorForm {
    fn default() -> Self {
        Self {
            trail_length: DEFAULT_TRAIL_LENGTH as u32,
            number_radius: DEFAULT_NUMBER_RADIUS,
            symbol_type: SymbolType::Numbers,
            reverse_order: false,
            show_timer: true,
            lines_under_dots: true,
            allow_wrong_selections: false,
            show_wrong_selections: true,
            hide_popup_buttons: false,
            hide_popup_results: false,
            hide_popup_all: false,
            custom_positions: None,
        }
    }
}

impl GeneratorForm {
    pub fn to_query(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());

        if self.trail_length != DEFAULT_TRAIL_LENGTH as u32 {
            params.append_pair("trailLength", &self.trail_length.to_string());
        }
        if self.number_radius != DEFAULT_NUMBER_RADIUS {
            params.append_pair("numberRadius", &self.number_radius.to_string());
        }
        if self.symbol_type != SymbolType::Numbers {
            params.append_pair("symbolType", &self.symbol_type.to_string());
        }
        if self.reverse_order {
            params.append_pair("reverseOrder", "true");
        }
        if !self.show_timer {
            params.append_pair("showTimer", "false");
        }
        if !self.lines_under_dots {
            params.append_pair("linesUnderDots", "false");
        }
        if self.allow_wrong_selections {
            params.append_pair("allowWrongSelections", "true");
        }
        if !self.show_wrong_selections {
            params.append_pair("showWrongSelections", "false");
        }
        if self.hide_popup_buttons {
            params.append_pair("hidePopupButtons", "true");
        }
        if self.hide_popup_results {
            params.append_pair("hidePopupResults", "true");
        }
        if self.hide_popup_all {
            params.append_pair("hidePopupAll", "true");
        }

        if let Some(raw) = self.custom_positions.as_deref().map(str::trim) {
            if !raw.is_empty() {
                match serde_json::from_str::<serde_json::Value>(raw) {
                    Ok(_) => {
                        let encoded: String = form_urlencoded::byte_serialize(raw.as_bytes()).collect();
                        params.append_pair("customPositions", &encoded);
                    }
                    Err(err) => tracing::warn!(%err, "invalid JSON for custom positions, omitting"),
                }
            }
        }

        params.finish()
    }

    pub fn to_url(&self, base_url: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            base_url.to_string()
        } else {
            format!("{base_url}?{query}")
        }
    }
}

/// `count` positions uniformly inside the 5%..95% band, rounded to hundredths.
pub fn random_custom_positions<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<PercentPosition> {
    (0..count)
        .map(|_| PercentPosition {
            x: round_to_hundredths(rng.gen::<f64>() * 90.0 + 5.0),
            y: round_to_hundredths(rng.gen::<f64>() * 90.0 + 5.0),
        })
        .collect()
}
