// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

const FALLBACK_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("validation_error", "One or more fields are invalid."),
    ("invalid_token", "Authentication token is invalid or missing."),
    ("not_found", "The requested resource was not found."),
    ("forbidden", "You do not own this facility."),
    ("not_member", "You are not an approved member of this facility."),
    ("membership_not_active", "Your membership at this facility is not active."),
    ("duplicate_request", "A membership request for this facility already exists."),
    ("already_member", "You are already an active member of this facility."),
    ("already_decided", "This membership request has already been decided."),
    ("no_matching_slot", "The start time must match one of the facility's slots."),
    ("invalid_duration", "The duration must be a whole multiple of the slot length."),
    ("pricing_not_configured", "No price has been set for this pitch."),
    ("booking_conflict", "This time overlaps an existing reservation. Please pick another slot."),
    ("invalid_state", "The operation is not allowed in the current state."),
    ("internal_error", "An unexpected error occurred."),
];

const TR: &[(&str, &str)] = &[
    ("validation_error", "Bir veya daha fazla alan geçersiz."),
    ("invalid_token", "Kimlik doğrulama anahtarı geçersiz veya eksik."),
    ("not_found", "İstenen kayıt bulunamadı."),
    ("forbidden", "Bu tesis size ait değil."),
    ("not_member", "Bu tesisin onaylı üyesi değilsiniz."),
    ("membership_not_active", "Bu tesisteki üyeliğiniz aktif değil."),
    ("duplicate_request", "Bu tesis için zaten bir üyelik isteğiniz var."),
    ("already_member", "Bu tesiste zaten aktif üyesiniz."),
    ("already_decided", "Bu üyelik isteği zaten sonuçlandırıldı."),
    ("no_matching_slot", "Başlangıç saati tesisin slotlarından biriyle eşleşmelidir."),
    ("invalid_duration", "Süre, slot uzunluğunun tam katı olmalıdır."),
    ("pricing_not_configured", "Bu saha için fiyat tanımlanmamış."),
    ("booking_conflict", "Bu saat başka bir rezervasyonla çakışıyor. Lütfen başka bir slot seçin."),
    ("invalid_state", "Bu işlem mevcut durumda yapılamaz."),
    ("internal_error", "Beklenmeyen bir hata oluştu."),
];

/// Error-code -> message tables, keyed by primary language subtag.
#[derive(Clone, Debug)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("en", EN.iter().copied().collect());
        messages.insert("tr", TR.iter().copied().collect());
        Self {
            messages: Arc::new(messages),
        }
    }

    pub fn message(&self, lang: &str, code: &str) -> String {
        self.lookup(lang, code)
            .or_else(|| self.lookup(FALLBACK_LANG, code))
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string())
    }

    fn lookup(&self, lang: &str, code: &str) -> Option<&'static str> {
        self.messages.get(lang).and_then(|table| table.get(code)).copied()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turkish_is_served_when_requested() {
        let store = I18nStore::new();
        assert_eq!(store.message("tr", "forbidden"), "Bu tesis size ait değil.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(store.message("de", "not_member"), store.message("en", "not_member"));
    }

    #[test]
    fn unknown_code_echoes_the_code() {
        assert_eq!(I18nStore::new().message("en", "nope"), "nope");
    }

    #[test]
    fn both_tables_cover_the_same_codes() {
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        let tr: Vec<_> = TR.iter().map(|(k, _)| *k).collect();
        assert_eq!(en, tr);
    }
}
