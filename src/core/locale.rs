//! Locale projection for campus-route
//!
//! Holds the current interface language and turns string keys into
//! display text. Missing translations degrade gracefully: requested
//! language, then English, then the raw key.

use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use crate::core::error::Error;
use crate::core::layers::RouteKind;
use crate::core::store::{PreferenceStore, LANGUAGE_KEY};

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    fn table(self) -> &'static Table {
        match self {
            Language::En => &EN,
            Language::Zh => &ZH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            other => Err(Error::InvalidInput(format!(
                "unsupported language '{other}' (expected 'en' or 'zh')"
            ))),
        }
    }
}

struct Table {
    ui: &'static [(&'static str, &'static str)],
    values: &'static [(&'static str, &'static str)],
}

fn lookup(entries: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

static EN: Table = Table {
    ui: &[
        ("title", "Accessible Routing on University of Glasgow’s Gilmorehill Campus"),
        ("subtitle", "Wenqi Zhou · Student ID: 2983273z"),
        ("allAccess", "All Access Route"),
        ("stepFree", "Step-Free Route"),
        ("detailed", "Detailed Map"),
        ("highContrast", "High Contrast Map"),
        ("satellite", "Satellite Imagery"),
        ("startPH", "Start location"),
        ("endPH", "End location"),
        ("plan", "Plan Route"),
        ("legendAll", "All-Access Route"),
        ("legendStep", "Step-Free Route"),
        ("elev", "Elevator"),
        ("ramp", "Ramp"),
        ("at", "Accessible toilet"),
        ("distance", "Distance"),
        ("duration", "Duration"),
        ("noticeMissingWaypoint", "Please select both start and end locations."),
        ("noticeFetchFailed", "Failed to fetch or render the route."),
        ("noticeNoRoute", "No route found."),
        ("noticeStyleFailed", "The map style failed to load. Retry?"),
    ],
    values: &[
        ("Yes", "Yes"),
        ("No", "No"),
        ("N/A", "N/A"),
        ("Partial/Assisted", "Partial/Assisted"),
    ],
};

static ZH: Table = Table {
    ui: &[
        ("title", "格拉斯哥大学吉尔摩山校区无障碍路径规划"),
        ("subtitle", "周文琦 · 学号：2983273z"),
        ("allAccess", "通行优先路径"),
        ("stepFree", "无台阶路径"),
        ("detailed", "细节底图"),
        ("highContrast", "高对比度底图"),
        ("satellite", "卫星影像"),
        ("startPH", "起点位置"),
        ("endPH", "终点位置"),
        ("plan", "开始规划"),
        ("legendAll", "通行优先路径"),
        ("legendStep", "无台阶路径"),
        ("elev", "电梯"),
        ("ramp", "坡道"),
        ("at", "无障碍厕所"),
        ("distance", "距离"),
        ("duration", "时长"),
        ("noticeMissingWaypoint", "请选择起点和终点。"),
        ("noticeFetchFailed", "获取或绘制路线失败。"),
        ("noticeNoRoute", "未找到路线。"),
        ("noticeStyleFailed", "底图样式加载失败，是否重试？"),
    ],
    values: &[
        ("Yes", "有"),
        ("No", "无"),
        ("N/A", "无"),
        ("Partial/Assisted", "部分/需协助"),
    ],
};

type Subscriber = Box<dyn FnMut(Language)>;

/// Current language plus everyone who re-renders when it changes
pub struct Locale {
    language: Language,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locale")
            .field("language", &self.language)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl Locale {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            subscribers: Vec::new(),
        }
    }

    /// Restore the language saved by a previous session, English otherwise
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let language = store
            .get(LANGUAGE_KEY)
            .and_then(|code| code.parse().ok())
            .unwrap_or_default();
        Self::new(language)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Register a callback run synchronously after every language change
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(Language) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Switch language, persist the choice and notify subscribers
    ///
    /// A failed write is logged and otherwise ignored; the in-memory
    /// language still changes.
    pub fn set_language(&mut self, language: Language, store: &mut dyn PreferenceStore) {
        info!("Switching interface language to {language}");
        self.language = language;
        if let Err(e) = store.set(LANGUAGE_KEY, language.code()) {
            warn!("Could not persist language choice: {e}");
        }
        for subscriber in &mut self.subscribers {
            subscriber(language);
        }
    }

    /// UI string for `key`
    pub fn localize<'a>(&self, key: &'a str) -> &'a str {
        lookup(self.language.table().ui, key)
            .or_else(|| lookup(EN.ui, key))
            .unwrap_or(key)
    }

    /// Localized accessibility value ("Yes", "No", ...)
    pub fn localize_value<'a>(&self, value: &'a str) -> &'a str {
        lookup(self.language.table().values, value)
            .or_else(|| lookup(EN.values, value))
            .unwrap_or(value)
    }

    /// Legend rows, one per route kind
    pub fn legend(&self) -> Vec<LegendEntry> {
        RouteKind::ALL
            .iter()
            .map(|kind| {
                let config = kind.layer_config();
                LegendEntry {
                    kind: *kind,
                    label: self.localize(kind.legend_key()).to_string(),
                    color: config.color,
                    dashed: config.dash.is_some(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub kind: RouteKind,
    pub label: String,
    pub color: &'static str,
    pub dashed: bool,
}

/// Every localized string currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct UiText {
    pub title: String,
    pub subtitle: String,
    pub all_access_option: String,
    pub step_free_option: String,
    pub detailed_option: String,
    pub high_contrast_option: String,
    pub satellite_option: String,
    pub start_placeholder: String,
    pub end_placeholder: String,
    pub plan_button: String,
    pub legend: Vec<LegendEntry>,
}

impl UiText {
    pub fn project(locale: &Locale) -> Self {
        let t = |key| locale.localize(key).to_string();
        Self {
            title: t("title"),
            subtitle: t("subtitle"),
            all_access_option: format!("🚶 {}", locale.localize("allAccess")),
            step_free_option: format!("♿ {}", locale.localize("stepFree")),
            detailed_option: format!("🗺️ {}", locale.localize("detailed")),
            high_contrast_option: format!("👁️ {}", locale.localize("highContrast")),
            satellite_option: format!("🛰️ {}", locale.localize("satellite")),
            start_placeholder: t("startPH"),
            end_placeholder: t("endPH"),
            plan_button: t("plan"),
            legend: locale.legend(),
        }
    }
}
