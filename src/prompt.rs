//! Plantilla del prompt de asesoramiento.

use crate::i18n::Language;
use crate::models::UserProfile;

/// Construye el único prompt que se envía al modelo de texto: título del
/// libro, perfil del usuario y formato de salida fijo.
pub fn build_advisory_prompt(title: &str, profile: &UserProfile, lang: Language) -> String {
    let locale = lang.locale_name();
    let title = match title.trim() {
        "" => "(unknown)",
        t => t,
    };

    format!(
        r#"
You are Bibuuk AI — a professional, warm book mentor.
User language: {locale}.
Book: "{title}"

User profile:
- Goal: {goal}
- Age: {age}
- University: {school}
- Year: {year}

Write a structured answer in {locale} with headings exactly like:

# Goal Alignment & Book Recommendations:
Rating: <Good fit / Partial fit / Not the best fit>.

<2–3 short paragraphs explaining WHY the book does or doesn’t fit the goal, with practical reasoning for this user's profile. Keep it supportive and specific.>

Recommended Books:
1. **<Title>** — <1-sentence reason, practical and relevant>.
2. **<Title>** — <reason>.
3. **<Title>** — <reason>.
4. **<Title>** — <reason> (optional if you have a strong one).

Tone: mentor, confident, clear. No emojis. Use clean Markdown. Keep it concise but helpful (250–400 words).
"#,
        goal = profile.goal.trim(),
        age = profile.age,
        school = profile.school.trim(),
        year = profile.year.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudyYear;

    fn profile() -> UserProfile {
        UserProfile {
            goal: "become an AI engineer".into(),
            age: 21,
            school: "National Louis University".into(),
            year: StudyYear::Junior,
        }
    }

    #[test]
    fn embeds_title_and_profile() {
        let prompt = build_advisory_prompt("Deep Learning with Python", &profile(), Language::En);
        assert!(prompt.contains("Book: \"Deep Learning with Python\""));
        assert!(prompt.contains("- Goal: become an AI engineer"));
        assert!(prompt.contains("- Age: 21"));
        assert!(prompt.contains("- University: National Louis University"));
        assert!(prompt.contains("- Year: Junior"));
        assert!(prompt.contains("User language: English."));
    }

    #[test]
    fn keeps_the_output_template() {
        let prompt = build_advisory_prompt("Dune", &profile(), Language::Ru);
        assert!(prompt.contains("Write a structured answer in Russian"));
        assert!(prompt.contains("# Goal Alignment & Book Recommendations:"));
        assert!(prompt.contains("Rating: <Good fit / Partial fit / Not the best fit>."));
        assert!(prompt.contains("Recommended Books:\n1. **<Title>**"));
        assert!(prompt.contains("4. **<Title>**"));
    }

    #[test]
    fn blank_title_is_unknown() {
        let prompt = build_advisory_prompt("  ", &UserProfile::default(), Language::En);
        assert!(prompt.contains("Book: \"(unknown)\""));
        assert!(prompt.contains("- Goal: \n"));
    }
}
