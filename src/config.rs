use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only source of configuration values keyed by query parameter name.
pub trait ConfigProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// Query parameters of a widget URL.
///
/// Accepts a bare query (`a=1&b=2`), a query with a leading `?`, or a full URL.
/// Repeated keys keep the first value, like `URLSearchParams::get`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, q)) => q,
            None => input,
        };
        let query = query.split('#').next().unwrap_or_default();

        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ConfigProvider for QueryParams {
    fn get(&self, key: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

/// A saved set of parameter overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    pub params: BTreeMap<String, String>,
}

impl Preset {
    pub fn from_query(query: &QueryParams) -> Self {
        let mut params = BTreeMap::new();
        for (k, v) in query.iter() {
            params.entry(k.to_string()).or_insert_with(|| v.to_string());
        }
        Self { params }
    }
}

impl ConfigProvider for Preset {
    fn get(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }
}

/// Looks keys up in `primary` first, then in `fallback`.
pub struct Layered<'a> {
    primary: &'a dyn ConfigProvider,
    fallback: &'a dyn ConfigProvider,
}

impl<'a> Layered<'a> {
    pub fn new(primary: &'a dyn ConfigProvider, fallback: &'a dyn ConfigProvider) -> Self {
        Self { primary, fallback }
    }
}

impl ConfigProvider for Layered<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.primary.get(key).or_else(|| self.fallback.get(key))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Preset;
    fn save(&self, preset: &Preset) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "trails") {
            pd.config_dir().join("preset.json")
        } else {
            PathBuf::from("trails_preset.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Preset {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Preset>(&bytes) {
                Ok(preset) => preset,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable preset");
                    Preset::default()
                }
            },
            Err(_) => Preset::default(),
        }
    }

    fn save(&self, preset: &Preset) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(preset)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_bare_query() {
        let q = QueryParams::parse("trailLength=12&symbolType=letters");
        assert_eq!(q.get("trailLength").as_deref(), Some("12"));
        assert_eq!(q.get("symbolType").as_deref(), Some("letters"));
        assert_eq!(q.get("missing"), None);
    }

    #[test]
    fn parses_full_url_and_ignores_fragment() {
        let q = QueryParams::parse("http://localhost:9527/tmt?reverseOrder=true#top");
        assert_eq!(q.get("reverseOrder").as_deref(), Some("true"));
    }

    #[test]
    fn first_value_wins_for_repeated_keys() {
        let q = QueryParams::parse("?trailLength=5&trailLength=7");
        assert_eq!(q.get("trailLength").as_deref(), Some("5"));
    }

    #[test]
    fn decodes_percent_escapes() {
        let q = QueryParams::parse("bgColor=%23ff0000");
        assert_eq!(q.get("bgColor").as_deref(), Some("#ff0000"));
    }

    #[test]
    fn layered_prefers_primary() {
        let query = QueryParams::parse("trailLength=8");
        let mut preset = Preset::default();
        preset.params.insert("trailLength".into(), "20".into());
        preset.params.insert("symbolType".into(), "letters".into());

        let layered = Layered::new(&query, &preset);
        assert_eq!(layered.get("trailLength").as_deref(), Some("8"));
        assert_eq!(layered.get("symbolType").as_deref(), Some("letters"));
        assert_eq!(layered.get("reverseOrder"), None);
    }

    #[test]
    fn preset_roundtrip_through_store() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("preset.json"));
        let preset = Preset::from_query(&QueryParams::parse("trailLength=14&allowWrongSelections=true"));

        store.save(&preset).unwrap();
        assert_eq!(store.load(), preset);
    }

    #[test]
    fn missing_or_corrupt_preset_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preset.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Preset::default());

        fs::write(&path, b"{not json").unwrap();
        assert_eq!(store.load(), Preset::default());
    }
}
