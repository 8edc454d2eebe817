use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Text stored once per site locale, persisted as a `{ "no": ..., "en": ... }` JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LocalizedText {
    pub no: String,
    pub en: String,
}

impl LocalizedText {
    /// Return the text for `locale`, falling back to Norwegian for unknown locales.
    #[must_use]
    pub fn get(&self, locale: &str) -> &str {
        match locale {
            "en" => &self.en,
            _ => &self.no,
        }
    }

    /// Validate that both translations are present and at most `max` characters long.
    ///
    /// # Errors
    ///
    /// Returns a descriptive message naming `field` when a translation is missing or too long.
    pub fn validate(&self, field: &str, max: usize) -> Result<(), String> {
        for (locale, text) in [("no", &self.no), ("en", &self.en)] {
            let len = text.trim().chars().count();
            if len == 0 {
                return Err(format!("{field}.{locale} is required."));
            }
            if len > max {
                return Err(format!("{field}.{locale} must be at most {max} characters."));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> LocalizedText {
        LocalizedText {
            no: "Keramikk".to_string(),
            en: "Ceramics".to_string(),
        }
    }

    #[test]
    fn get_falls_back_to_norwegian() {
        let t = text();
        assert_eq!(t.get("en"), "Ceramics");
        assert_eq!(t.get("no"), "Keramikk");
        assert_eq!(t.get("de"), "Keramikk");
    }

    #[test]
    fn validate_rejects_blank_translation() {
        let mut t = text();
        t.en = "   ".to_string();
        assert_eq!(t.validate("title", 200), Err("title.en is required.".to_string()));
    }

    #[test]
    fn validate_rejects_long_translation() {
        let mut t = text();
        t.no = "x".repeat(11);
        assert!(t.validate("title", 10).is_err());
        assert!(text().validate("title", 10).is_ok());
    }
}
