use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use seat_tally::TallyRules;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::ResultExt;

use crate::tally::io_sheets::DEFAULT_BASE_URL;
use crate::tally::*;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// csv (default) or xlsx
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("csv")
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSheet {
    #[serde(rename = "sheetId")]
    pub sheet_id: String,
    #[serde(rename = "districtGid")]
    pub district_gid: Option<String>,
    #[serde(rename = "partyListGid")]
    pub party_list_gid: Option<String>,
    /// Where the export links point to. Only useful for mirrors and tests.
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
}

impl GoogleSheet {
    pub fn district_gid(&self) -> &str {
        self.district_gid.as_deref().unwrap_or("0")
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "majorityThreshold")]
    pub majority_threshold: Option<u32>,
    #[serde(rename = "includePartyList")]
    pub include_party_list: Option<bool>,
    pub palette: Option<Vec<String>>,
    #[serde(rename = "partyColors")]
    pub party_colors: Option<BTreeMap<String, String>>,
}

impl RulesConfig {
    pub fn to_rules(&self) -> TallyRules {
        let default = TallyRules::default();
        TallyRules {
            palette: self.palette.clone().unwrap_or(default.palette),
            party_colors: self
                .party_colors
                .clone()
                .map(|m| m.into_iter().collect())
                .unwrap_or_default(),
            majority_threshold: self
                .majority_threshold
                .unwrap_or(default.majority_threshold),
            include_party_list: self
                .include_party_list
                .unwrap_or(default.include_party_list),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "districtSource")]
    pub district_source: Option<FileSource>,
    #[serde(rename = "partyListSource")]
    pub party_list_source: Option<FileSource>,
    #[serde(rename = "googleSheet")]
    pub google_sheet: Option<GoogleSheet>,
    #[serde(rename = "fallbackResults")]
    pub fallback_results: Option<String>,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl TallyConfig {
    /// Makes the relative paths of the configuration relative to `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        let join = |p: &str| -> String {
            if Path::new(p).is_absolute() {
                p.to_string()
            } else {
                root.join(p).display().to_string()
            }
        };
        if let Some(s) = self.district_source.as_mut() {
            s.file_path = join(&s.file_path);
        }
        if let Some(s) = self.party_list_source.as_mut() {
            s.file_path = join(&s.file_path);
        }
        if let Some(p) = self.fallback_results.as_mut() {
            *p = join(p);
        }
        if let Some(p) = self.output_settings.output_path.as_mut() {
            *p = join(p);
        }
    }

    pub fn contest_name(&self) -> &str {
        self.output_settings
            .contest_name
            .as_deref()
            .unwrap_or("Election results")
    }
}

pub fn read_config(path: &str) -> BTallyResult<TallyConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let mut config: TallyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let root = Path::new(path)
        .parent()
        .context(MissingParentDirSnafu { path })?;
    config.resolve_paths(root);
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> BTallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
