use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use crate::{
    config::TranslateConfig,
    models::language::LanguageCode,
    utils::text::{make_filename_safe, tidy_underscores, unescape_html},
};

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Translates Korean lecture titles into filename-safe titles for every
/// supported language.
#[derive(Clone)]
pub struct TitleTranslator {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl TitleTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("lecture-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build translation HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            endpoint: config.endpoint.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Title for each language, Korean included. Languages whose API call
    /// fails get the keyword translation instead.
    pub async fn translate_title(&self, korean_title: &str) -> BTreeMap<LanguageCode, String> {
        let mut translations = BTreeMap::new();

        for language in LanguageCode::TRANSLATION_TARGETS {
            let translated = match &self.api_key {
                Some(api_key) => self.translate_with_retry(api_key, korean_title, language).await,
                None => None,
            };

            let title = match translated {
                Some(text) => make_filename_safe(&text),
                None => keyword_translation(korean_title, language),
            };
            translations.insert(language, title);
        }

        translations.insert(LanguageCode::Ko, make_filename_safe(korean_title));
        translations
    }

    async fn translate_with_retry(&self, api_key: &str, text: &str, target: LanguageCode) -> Option<String> {
        for attempt in 1..=self.max_retries {
            match self.translate_text(api_key, text, target).await {
                Ok(translated) => return Some(translated),
                Err(e) => {
                    tracing::warn!("Translation to {} failed (attempt {}/{}): {:#}", target, attempt, self.max_retries, e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }
        None
    }

    async fn translate_text(&self, api_key: &str, text: &str, target: LanguageCode) -> Result<String> {
        let params = [
            ("key", api_key),
            ("q", text),
            ("source", LanguageCode::Ko.code()),
            ("target", target.code()),
            ("format", "text"),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: TranslateResponse = response.json().await?;
        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| unescape_html(&t.translated_text))
            .context("translation response contained no translations")
    }
}

fn keyword_table(language: LanguageCode) -> &'static [(&'static str, &'static str)] {
    match language {
        LanguageCode::En => &[
            ("안전", "Safety"), ("교육", "Training"), ("기초", "Basic"), ("용접", "Welding"),
            ("크레인", "Crane"), ("조작", "Operation"), ("장비", "Equipment"), ("사용법", "Usage"),
            ("점검", "Inspection"), ("유지보수", "Maintenance"), ("응급처치", "First_Aid"),
            ("산업", "Industrial"), ("건설", "Construction"), ("기계", "Machine"),
            ("공구", "Tool"), ("실습", "Practice"), ("법규", "Regulation"), ("규정", "Standard"),
            ("작업", "Work"), ("현장", "Site"), ("관리", "Management"), ("위험", "Risk"),
        ],
        LanguageCode::Zh => &[
            ("안전", "安全"), ("교육", "培训"), ("기초", "基础"), ("용접", "焊接"),
            ("크레인", "起重机"), ("조작", "操作"), ("장비", "设备"), ("사용법", "使用方法"),
            ("점검", "检查"), ("유지보수", "维护"), ("응급처치", "急救"),
            ("산업", "工业"), ("건설", "建设"), ("기계", "机器"), ("공구", "工具"),
        ],
        LanguageCode::Vi => &[
            ("안전", "An_Toan"), ("교육", "Dao_Tao"), ("기초", "Co_Ban"), ("용접", "Han"),
            ("크레인", "Cau_Truc"), ("조작", "Van_Hanh"), ("장비", "Thiet_Bi"),
            ("산업", "Cong_Nghiep"), ("건설", "Xay_Dung"), ("기계", "May_Moc"),
        ],
        LanguageCode::Th => &[
            ("안전", "ปลอดภัย"), ("교육", "การศึกษา"), ("기초", "พื้นฐาน"), ("용접", "เชื่อม"),
            ("크레인", "เครน"), ("조작", "ดำเนินงาน"), ("장비", "อุปกรณ์"),
        ],
        LanguageCode::Ja => &[
            ("안전", "安全"), ("교육", "教育"), ("기초", "基礎"), ("용접", "溶接"),
            ("크레인", "クレーン"), ("조작", "操作"), ("장비", "設備"), ("공구", "工具"),
        ],
        LanguageCode::Ko => &[],
    }
}

/// Offline translation by keyword substitution. Words without an entry stay
/// in Korean.
pub fn keyword_translation(korean_title: &str, language: LanguageCode) -> String {
    static RESERVED: OnceLock<Regex> = OnceLock::new();
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let mut result = korean_title.to_string();
    for &(korean, translated) in keyword_table(language) {
        result = result.replace(korean, translated);
    }

    // Scripts without word separators only lose filesystem-reserved characters
    let cleaned = match language {
        LanguageCode::Zh | LanguageCode::Th | LanguageCode::Ja => RESERVED
            .get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static pattern compiles"))
            .replace_all(&result, "_")
            .into_owned(),
        _ => NON_WORD
            .get_or_init(|| Regex::new(r"[^\w\s-]").expect("static pattern compiles"))
            .replace_all(&result, "_")
            .into_owned(),
    };
    let spaced = WHITESPACE
        .get_or_init(|| Regex::new(r"\s+").expect("static pattern compiles"))
        .replace_all(&cleaned, "_");

    let safe = tidy_underscores(&spaced);
    if safe.is_empty() {
        "Unknown".to_string()
    } else {
        safe
    }
}
