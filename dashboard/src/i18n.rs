use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::storage::{LocalStore, LOCALE_KEY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Locale::En => Locale::Zh,
            Locale::Zh => Locale::En,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" => Ok(Locale::En),
            "zh" => Ok(Locale::Zh),
            other => Err(format!("unknown locale '{}'", other)),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("app.title", "GEO Insights"),
    ("nav.dashboard", "Dashboard"),
    ("nav.brands", "Brands"),
    ("nav.evaluations", "Evaluations"),
    ("nav.history", "History"),
    ("nav.prompts", "Prompt Research"),
    ("nav.learn", "GEO Learning"),
    ("nav.report", "Report"),
    ("status.connected", "CONNECTED"),
    ("status.offline", "OFFLINE"),
    ("status.signed_out", "signed out"),
    ("panel.brands", "Brand Scores"),
    ("panel.score", "GEO Score"),
    ("panel.dimensions", "Dimensions"),
    ("panel.trend", "Score Trend"),
    ("panel.models", "Model Comparison"),
    ("panel.sov", "Share of Voice"),
    ("panel.runs", "Evaluation Runs"),
    ("panel.results", "Results"),
    ("panel.prompts", "Prompts"),
    ("panel.catalog", "AI Models"),
    ("panel.categories", "Industry Categories"),
    ("panel.articles", "Articles"),
    ("panel.report", "Diagnosis Report"),
    ("panel.insights", "Insights"),
    ("panel.recommendations", "Recommendations"),
    ("panel.history", "Diagnosis History"),
    ("panel.notifications", "Notifications"),
    ("panel.filters", "Filters"),
    ("panel.compare", "Brand Comparison"),
    ("panel.funnel", "Mention Funnel"),
    ("panel.response", "Response"),
    ("funnel.queries", "Queries"),
    ("funnel.mentioned", "Brand Mentioned"),
    ("funnel.top3", "Top 3 Position"),
    ("funnel.cited", "Cited with Link"),
    ("funnel.recommended", "Recommended"),
    ("results.total", "Results"),
    ("results.mentioned", "Mentioned"),
    ("results.cited", "Cited"),
    ("results.brands", "Brands"),
    ("results.prompts", "Prompts"),
    ("filter.brand", "Brand"),
    ("filter.prompt", "Prompt"),
    ("state.loading", "Loading\u{2026}"),
    ("state.empty", "Nothing to show"),
    ("state.no_score", "Not evaluated yet"),
    ("filter.range", "Range"),
    ("filter.models", "Models"),
    ("filter.dims", "Dims"),
    ("filter.pinned", "Pinned"),
    ("filter.sort", "Sort"),
    ("filter.search", "Search"),
    ("filter.all", "all"),
    ("score.composite", "Composite"),
    ("score.visibility", "Visibility"),
    ("score.citation", "Citation"),
    ("score.representation", "Representation"),
    ("score.intent", "Intent"),
    ("score.grade", "Grade"),
    ("score.mentions", "Mentions"),
    ("notify.run_completed", "Evaluation completed"),
    ("notify.run_failed", "Evaluation failed"),
    ("notify.export", "Export saved"),
    ("notify.export_failed", "Export failed"),
    ("notify.none", "No notifications"),
    ("notify.signin_failed", "Sign-in failed"),
    ("notify.run_started", "Evaluation started"),
    ("notify.run_start_failed", "Could not start evaluation"),
    ("help.views", "Views"),
    ("help.move", "Move"),
    ("help.open", "Open"),
    ("help.back", "Back"),
    ("help.refresh", "Refresh"),
    ("help.search", "Search"),
    ("help.notifications", "Alerts"),
    ("help.filters", "Filters"),
    ("help.export", "Export"),
    ("help.locale", "Language"),
    ("help.brand", "Brand"),
    ("help.new_run", "New run"),
    ("help.quit", "Quit"),
];

const ZH: &[(&str, &str)] = &[
    ("app.title", "GEO 洞察"),
    ("nav.dashboard", "仪表盘"),
    ("nav.brands", "品牌管理"),
    ("nav.evaluations", "评估记录"),
    ("nav.history", "诊断历史"),
    ("nav.prompts", "Prompt 研究"),
    ("nav.learn", "GEO 学习中心"),
    ("nav.report", "报告"),
    ("status.connected", "已连接"),
    ("status.offline", "离线"),
    ("status.signed_out", "未登录"),
    ("panel.brands", "品牌评分"),
    ("panel.score", "GEO 评分"),
    ("panel.dimensions", "维度"),
    ("panel.trend", "评分趋势"),
    ("panel.models", "模型对比"),
    ("panel.sov", "声量占比"),
    ("panel.runs", "评估任务"),
    ("panel.results", "评估结果"),
    ("panel.prompts", "Prompt 列表"),
    ("panel.catalog", "AI 模型"),
    ("panel.categories", "行业分类"),
    ("panel.articles", "文章"),
    ("panel.report", "诊断报告"),
    ("panel.insights", "洞察"),
    ("panel.recommendations", "优化建议"),
    ("panel.history", "诊断历史"),
    ("panel.notifications", "通知"),
    ("panel.filters", "筛选"),
    ("panel.compare", "品牌对比"),
    ("panel.funnel", "提及漏斗"),
    ("panel.response", "模型回答"),
    ("funnel.queries", "查询"),
    ("funnel.mentioned", "品牌被提及"),
    ("funnel.top3", "排名前三"),
    ("funnel.cited", "附带引用"),
    ("funnel.recommended", "被推荐"),
    ("results.total", "结果"),
    ("results.mentioned", "提及"),
    ("results.cited", "引用"),
    ("results.brands", "品牌"),
    ("results.prompts", "Prompt"),
    ("filter.brand", "品牌"),
    ("filter.prompt", "Prompt"),
    ("state.loading", "加载中\u{2026}"),
    ("state.empty", "暂无数据"),
    ("state.no_score", "尚未评估"),
    ("filter.range", "时间"),
    ("filter.models", "模型"),
    ("filter.dims", "维度"),
    ("filter.pinned", "已选品牌"),
    ("filter.sort", "排序"),
    ("filter.search", "搜索"),
    ("filter.all", "全部"),
    ("score.composite", "综合"),
    ("score.visibility", "可见度"),
    ("score.citation", "引用"),
    ("score.representation", "表述"),
    ("score.intent", "意图"),
    ("score.grade", "等级"),
    ("score.mentions", "提及次数"),
    ("notify.run_completed", "评估完成"),
    ("notify.run_failed", "评估失败"),
    ("notify.none", "暂无通知"),
    ("notify.signin_failed", "登录失败"),
    ("notify.run_started", "评估已开始"),
    ("notify.run_start_failed", "无法开始评估"),
    ("help.views", "视图"),
    ("help.move", "移动"),
    ("help.open", "打开"),
    ("help.back", "返回"),
    ("help.refresh", "刷新"),
    ("help.search", "搜索"),
    ("help.notifications", "通知"),
    ("help.filters", "筛选"),
    ("help.export", "导出"),
    ("help.locale", "语言"),
    ("help.brand", "品牌"),
    ("help.new_run", "新建评估"),
    ("help.quit", "退出"),
];

fn table(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => EN,
        Locale::Zh => ZH,
    }
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    table(locale).iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// UI language, remembered across runs.
#[derive(Clone, Debug)]
pub struct Translator {
    locale: Locale,
    store: Option<LocalStore>,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale, store: None }
    }

    /// Use the saved locale if there is one, else `fallback`.
    pub fn load(store: Option<LocalStore>, fallback: Locale) -> Self {
        let locale = store
            .as_ref()
            .and_then(|s| s.get(LOCALE_KEY))
            .and_then(|raw| match raw.parse() {
                Ok(locale) => Some(locale),
                Err(e) => {
                    warn!(key = LOCALE_KEY, error = %e, "ignoring saved locale");
                    None
                }
            })
            .unwrap_or(fallback);
        Self { locale, store }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        if let Some(store) = &self.store {
            if let Err(e) = store.set(LOCALE_KEY, locale.code()) {
                warn!(key = LOCALE_KEY, error = %e, "failed to save locale");
            }
        }
    }

    pub fn toggle(&mut self) {
        self.set_locale(self.locale.toggled());
    }

    /// Current locale, then English, then the key itself.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        lookup(self.locale, key)
            .or_else(|| lookup(Locale::En, key))
            .unwrap_or(key)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Locale::En)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_key() {
        let t = Translator::new(Locale::Zh);
        assert_eq!(t.t("nav.brands"), "品牌管理");
        assert_eq!(t.t("notify.export"), "Export saved");
        assert_eq!(t.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn every_chinese_key_exists_in_english() {
        for (key, _) in ZH {
            assert!(lookup(Locale::En, key).is_some(), "{} missing from en", key);
        }
    }

    #[test]
    fn locale_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let mut t = Translator::load(Some(store.clone()), Locale::En);
        t.toggle();
        assert_eq!(t.locale(), Locale::Zh);

        let reloaded = Translator::load(Some(store), Locale::En);
        assert_eq!(reloaded.locale(), Locale::Zh);
    }

    #[test]
    fn garbage_saved_locale_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set(LOCALE_KEY, "fr").unwrap();
        assert_eq!(Translator::load(Some(store), Locale::Zh).locale(), Locale::Zh);
    }
}
