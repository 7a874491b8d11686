//! Tablas de textos de la interfaz (inglés / ruso).

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "EN", alias = "en")]
    En,
    #[serde(rename = "RU", alias = "ru")]
    Ru,
}

impl Language {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "EN" => Ok(Self::En),
            "RU" => Ok(Self::Ru),
            other => Err(anyhow!("Idioma no soportado: {other}")),
        }
    }

    /// Nombre del idioma tal y como se le indica al modelo.
    pub fn locale_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Russian",
        }
    }

    pub fn strings(&self) -> &'static UiStrings {
        match self {
            Self::En => &EN,
            Self::Ru => &RU,
        }
    }
}

/// Textos fijos de la página.
#[derive(Debug, Serialize)]
pub struct UiStrings {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub upload_hdr: &'static str,
    pub choose_img: &'static str,
    pub drop_here: &'static str,
    pub enter_title: &'static str,
    pub about_you: &'static str,
    pub goal: &'static str,
    pub goal_ph: &'static str,
    pub age: &'static str,
    pub school: &'static str,
    pub year: &'static str,
    pub analyze_btn: &'static str,
    pub analysis_done: &'static str,
    pub detected: &'static str,
    pub fit_hdr: &'static str,
    pub rating: &'static str,
    pub missing_input: &'static str,
    pub footer: &'static str,
}

pub static EN: UiStrings = UiStrings {
    title: "Shelf Scanner: AI Powered Book & Goal Advisor",
    subtitle: "Analyze a book or bookshelf image — and see if it helps you reach your goals.",
    upload_hdr: "Upload a photo of your bookshelf or enter a book title manually:",
    choose_img: "Choose an image…",
    drop_here: "Drag and drop file here",
    enter_title: "Or enter the book title and author (e.g., 'Deep Learning with Python — François Chollet')",
    about_you: "Tell me about yourself",
    goal: "What is your main goal right now?",
    goal_ph: "e.g., I want to become an AI engineer and find an internship",
    age: "How old are you?",
    school: "What university are you studying at?",
    year: "What year are you in?",
    analyze_btn: "Analyze My Book Fit",
    analysis_done: "Analysis complete!",
    detected: "Detected Book(s):",
    fit_hdr: "Goal Alignment & Book Recommendations:",
    rating: "Rating:",
    missing_input: "Please upload a cover or enter a book title.",
    footer: "Made with 💜 by Aibiike Shainazarova · © 2025 Bibuuk AI",
};

pub static RU: UiStrings = UiStrings {
    title: "Shelf Scanner: AI-советник по книгам и целям",
    subtitle: "Загрузите фото книги/полки — и узнайте, помогает ли она вашим целям.",
    upload_hdr: "Загрузите фото книги / полки или введите название вручную:",
    choose_img: "Выберите изображение…",
    drop_here: "Перетащите файл сюда",
    enter_title: "Или введите название и автора (например, «Глубокое обучение — И. Гудфеллоу»)",
    about_you: "Расскажите о себе",
    goal: "Какая ваша главная цель сейчас?",
    goal_ph: "например: хочу стать AI-инженером и найти стажировку",
    age: "Сколько вам лет?",
    school: "В каком университете вы учитесь?",
    year: "На каком вы курсе?",
    analyze_btn: "Проанализировать книгу",
    analysis_done: "Анализ завершён!",
    detected: "Обнаруженная книга(и):",
    fit_hdr: "Соответствие цели и рекомендации:",
    rating: "Оценка:",
    missing_input: "Пожалуйста, загрузите обложку или введите название книги.",
    footer: "Сделано с 💜 Aibiike Shainazarova · © 2025 Bibuuk AI",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_codes() {
        assert_eq!(Language::from_str("ru").unwrap(), Language::Ru);
        assert_eq!(Language::from_str(" EN ").unwrap(), Language::En);
        assert!(Language::from_str("es").is_err());
    }

    #[test]
    fn tables_are_localized() {
        assert_eq!(Language::En.strings().analyze_btn, "Analyze My Book Fit");
        assert_eq!(Language::Ru.strings().analyze_btn, "Проанализировать книгу");
        assert_eq!(Language::Ru.locale_name(), "Russian");
    }

    #[test]
    fn language_deserializes_from_code() {
        let lang: Language = serde_json::from_str("\"RU\"").unwrap();
        assert_eq!(lang, Language::Ru);
    }
}
