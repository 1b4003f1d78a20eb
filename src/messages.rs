//! Recommended user message catalogue.
//!
//! Identifiers and default texts follow the BankID Relying Party
//! Guidelines (v2 message set, RFA1-RFA22). Embedding applications can
//! overlay their own wording per language with [`MessageCatalog::register_custom_message`].

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use thiserror::Error;

use crate::status::HintCode;

/// Stable token naming one recommended user-facing instructional message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Rfa1,
    Rfa2,
    Rfa3,
    Rfa4,
    Rfa5,
    Rfa6,
    Rfa8,
    Rfa9,
    Rfa12,
    Rfa13,
    /// Personal number was provided up front, end user is on a personal computer.
    Rfa14A,
    /// Personal number was provided up front, end user is on a mobile device.
    Rfa14B,
    /// No personal number was provided, end user is on a personal computer.
    Rfa15A,
    /// No personal number was provided, end user is on a mobile device.
    Rfa15B,
    Rfa16,
    Rfa17,
    Rfa18,
    Rfa19,
    Rfa20,
    /// Fallback while an order is pending with an unrecognized hint code.
    Rfa21,
    /// Fallback when an order has failed with an unrecognized hint code.
    Rfa22,
}

impl MessageId {
    /// Every identifier in the catalogue, in guideline order.
    pub const ALL: [MessageId; 21] = [
        MessageId::Rfa1,
        MessageId::Rfa2,
        MessageId::Rfa3,
        MessageId::Rfa4,
        MessageId::Rfa5,
        MessageId::Rfa6,
        MessageId::Rfa8,
        MessageId::Rfa9,
        MessageId::Rfa12,
        MessageId::Rfa13,
        MessageId::Rfa14A,
        MessageId::Rfa14B,
        MessageId::Rfa15A,
        MessageId::Rfa15B,
        MessageId::Rfa16,
        MessageId::Rfa17,
        MessageId::Rfa18,
        MessageId::Rfa19,
        MessageId::Rfa20,
        MessageId::Rfa21,
        MessageId::Rfa22,
    ];
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            MessageId::Rfa1 => "RFA1",
            MessageId::Rfa2 => "RFA2",
            MessageId::Rfa3 => "RFA3",
            MessageId::Rfa4 => "RFA4",
            MessageId::Rfa5 => "RFA5",
            MessageId::Rfa6 => "RFA6",
            MessageId::Rfa8 => "RFA8",
            MessageId::Rfa9 => "RFA9",
            MessageId::Rfa12 => "RFA12",
            MessageId::Rfa13 => "RFA13",
            MessageId::Rfa14A => "RFA14(A)",
            MessageId::Rfa14B => "RFA14(B)",
            MessageId::Rfa15A => "RFA15(A)",
            MessageId::Rfa15B => "RFA15(B)",
            MessageId::Rfa16 => "RFA16",
            MessageId::Rfa17 => "RFA17",
            MessageId::Rfa18 => "RFA18",
            MessageId::Rfa19 => "RFA19",
            MessageId::Rfa20 => "RFA20",
            MessageId::Rfa21 => "RFA21",
            MessageId::Rfa22 => "RFA22",
        };
        write!(f, "{token}")
    }
}

/// Errors raised by catalogue lookups and seeding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("message identifier {0} is not registered")]
    InvalidIdentifier(MessageId),

    #[error("invalid language code {0:?}, use ISO 639-1 two-letter codes")]
    InvalidLanguageCode(String),

    #[error("message identifier {0} is already registered")]
    DuplicateIdentifier(MessageId),

    #[error("message identifier {0} has no English default text")]
    MissingDefault(MessageId),
}

/// Localized instructional texts, resolved by identifier and language.
///
/// The Default tier is seeded once at construction and never mutated.
/// Custom overrides always win over defaults for the same identifier and
/// language pair.
pub struct MessageCatalog {
    identifiers: HashMap<MessageId, Vec<HintCode>>,
    defaults: HashMap<(MessageId, String), String>,
    custom: RwLock<HashMap<(MessageId, String), String>>,
}

impl MessageCatalog {
    /// Builds the catalogue with Swedish and English defaults for the
    /// full v2 identifier set.
    pub fn new() -> Result<Self, CatalogError> {
        let mut catalog = Self {
            identifiers: HashMap::new(),
            defaults: HashMap::new(),
            custom: RwLock::new(HashMap::new()),
        };
        catalog.seed()?;
        Ok(catalog)
    }

    /// Looks up the text to display for `id` in the requested language.
    ///
    /// Lookup is strict: an unregistered identifier or a malformed
    /// language code is caller misuse and fails instead of substituting.
    /// A language with no entry in either tier falls back to the English
    /// defaults.
    pub fn get_user_message(
        &self,
        id: MessageId,
        language_code: &str,
    ) -> Result<String, CatalogError> {
        if !self.identifiers.contains_key(&id) {
            return Err(CatalogError::InvalidIdentifier(id));
        }
        let lang = normalize_language_code(language_code)?;

        let custom = self.custom.read().unwrap_or_else(|e| e.into_inner());
        if let Some(text) = custom.get(&(id, lang.clone())) {
            return Ok(text.clone());
        }
        if let Some(text) = self.defaults.get(&(id, lang)) {
            return Ok(text.clone());
        }
        if let Some(text) = custom.get(&(id, FALLBACK_LANGUAGE.to_string())) {
            return Ok(text.clone());
        }
        self.defaults
            .get(&(id, FALLBACK_LANGUAGE.to_string()))
            .cloned()
            .ok_or(CatalogError::MissingDefault(id))
    }

    /// Registers an application-supplied override for `(id, language_code)`.
    ///
    /// Tolerant counterpart to the strict lookup path: returns `false`
    /// for an unknown identifier or malformed language code instead of
    /// erroring. A later registration for the same pair replaces the
    /// earlier one.
    pub fn register_custom_message(
        &self,
        id: MessageId,
        language_code: &str,
        text: impl Into<String>,
    ) -> bool {
        if !self.identifiers.contains_key(&id) {
            return false;
        }
        let Ok(lang) = normalize_language_code(language_code) else {
            return false;
        };
        let mut custom = self.custom.write().unwrap_or_else(|e| e.into_inner());
        custom.insert((id, lang), text.into());
        true
    }

    /// Hint codes the guidelines associate with `id`, for diagnostics.
    pub fn mapped_hint_codes(&self, id: MessageId) -> Result<&[HintCode], CatalogError> {
        self.identifiers
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(CatalogError::InvalidIdentifier(id))
    }

    fn register_identifier(
        &mut self,
        id: MessageId,
        hint_codes: &[HintCode],
        default_texts: &[(&str, &str)],
    ) -> Result<(), CatalogError> {
        if self.identifiers.contains_key(&id) {
            return Err(CatalogError::DuplicateIdentifier(id));
        }
        self.identifiers.insert(id, hint_codes.to_vec());
        for (language_code, text) in default_texts {
            let lang = normalize_language_code(language_code)?;
            self.defaults.insert((id, lang), (*text).to_string());
        }
        Ok(())
    }

    fn seed(&mut self) -> Result<(), CatalogError> {
        self.register_identifier(
            MessageId::Rfa1,
            &[HintCode::OutstandingTransaction, HintCode::NoClient],
            &[
                ("sv", "Starta BankID-appen"),
                ("en", "Start your BankID app."),
            ],
        )?;
        // The BankID app is not installed on the mobile device.
        self.register_identifier(
            MessageId::Rfa2,
            &[],
            &[
                (
                    "sv",
                    "Du har inte BankID-appen installerad. Kontakta din internetbank.",
                ),
                (
                    "en",
                    "The BankID app is not installed. Please contact your internet bank.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa3,
            &[HintCode::Cancelled],
            &[
                ("sv", "Åtgärden avbruten. Försök igen."),
                ("en", "Action cancelled. Please try again."),
            ],
        )?;
        // Shown for the alreadyInProgress request fault.
        self.register_identifier(
            MessageId::Rfa4,
            &[],
            &[
                (
                    "sv",
                    "En identifiering eller underskrift för det här personnumret är redan påbörjad. Försök igen.",
                ),
                (
                    "en",
                    "An identification or signing for this personal number is already started. Please try again.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa5,
            &[],
            &[
                ("sv", "Internt tekniskt fel. Försök igen."),
                ("en", "Internal error. Please try again."),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa6,
            &[HintCode::UserCancel],
            &[("sv", "Åtgärden avbruten."), ("en", "Action cancelled.")],
        )?;
        self.register_identifier(
            MessageId::Rfa8,
            &[HintCode::ExpiredTransaction],
            &[
                (
                    "sv",
                    "BankID-appen svarar inte. Kontrollera att den är startad och att du har internetanslutning. Om du inte har något giltigt BankID kan du hämta ett hos din Bank. Försök sedan igen.",
                ),
                (
                    "en",
                    "The BankID app is not responding. Please check that the program is started and that you have internet access. If you don’t have a valid BankID you can get one from your bank. Try again.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa9,
            &[HintCode::UserSign],
            &[
                (
                    "sv",
                    "Skriv in din säkerhetskod i BankID-appen och välj Legitimera eller Skriv under.",
                ),
                (
                    "en",
                    "Enter your security code in the BankID app and select Identify or Sign.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa12,
            &[],
            &[
                (
                    "sv",
                    "Internt tekniskt fel. Uppdatera BankID-appen och försök igen.",
                ),
                (
                    "en",
                    "Internal error. Update your BankID app and try again.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa13,
            &[HintCode::OutstandingTransaction],
            &[
                ("sv", "Försöker starta BankID-appen."),
                ("en", "Trying to start your BankID app."),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa14A,
            &[HintCode::Started],
            &[
                (
                    "sv",
                    "Söker efter BankID, det kan ta en liten stund… Om det har gått några sekunder och inget BankID har hittats har du sannolikt inget BankID som går att använda för den aktuella inloggningen/underskriften i den här datorn. Om du har ett BankID-kort, sätt in det i kortläsaren. Om du inte har något BankID kan du hämta ett hos din internetbank. Om du har ett BankID på en annan enhet kan du starta din BankID-app där.",
                ),
                (
                    "en",
                    "Searching for BankID:s, it may take a little while… If a few seconds have passed and still no BankID has been found, you probably don’t have a BankID which can be used for this login/signature on this computer. If you have a BankID card, please insert it into your card reader. If you don’t have a BankID you can order one from your internet bank. If you have a BankID on another device you can start the BankID app on that device.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa14B,
            &[HintCode::Started],
            &[
                (
                    "sv",
                    "Söker efter BankID, det kan ta en liten stund… Om det har gått några sekunder och inget BankID har hittats har du sannolikt inget BankID som går att använda för den aktuella inloggningen/underskriften i den här enheten. Om du inte har något BankID kan du hämta ett hos din internetbank. Om du har ett BankID på en annan enhet kan du starta din BankID-app där.",
                ),
                (
                    "en",
                    "Searching for BankID:s, it may take a little while… If a few seconds have passed and still no BankID has been found, you probably don’t have a BankID which can be used for this login/signature on this device. If you don’t have a BankID you can order one from your internet bank. If you have a BankID on another device you can start the BankID app on that device.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa15A,
            &[HintCode::Started],
            &[
                (
                    "sv",
                    "Söker efter BankID, det kan ta en liten stund… Om det har gått några sekunder och inget BankID har hittats har du sannolikt inget BankID som går att använda för den aktuella inloggningen/underskriften i den här datorn. Om du har ett BankID-kort, sätt in det i kortläsaren. Om du inte har något BankID kan du hämta ett hos din internetbank.",
                ),
                (
                    "en",
                    "Searching for BankID:s, it may take a little while… If a few seconds have passed and still no BankID has been found, you probably don’t have a BankID which can be used for this login/signature on this computer. If you have a BankID card, please insert it into your card reader. If you don’t have a BankID you can order one from your internet bank.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa15B,
            &[HintCode::Started],
            &[
                (
                    "sv",
                    "Söker efter BankID, det kan ta en liten stund… Om det har gått några sekunder och inget BankID har hittats har du sannolikt inget BankID som går att använda för den aktuella inloggningen/underskriften i den här enheten. Om du inte har något BankID kan du hämta ett hos din internetbank.",
                ),
                (
                    "en",
                    "Searching for BankID:s, it may take a little while… If a few seconds have passed and still no BankID has been found, you probably don’t have a BankID which can be used for this login/signature on this device. If you don’t have a BankID you can order one from your internet bank.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa16,
            &[HintCode::CertificateErr],
            &[
                (
                    "sv",
                    "Det BankID du försöker använda är för gammalt eller spärrat. Använd ett annat BankID eller hämta ett nytt hos din internetbank.",
                ),
                (
                    "en",
                    "The BankID you are trying to use is revoked or too old. Please use another BankID or order a new one from your internet bank.",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa17,
            &[HintCode::StartFailed],
            &[
                (
                    "sv",
                    "BankID-appen verkar inte finnas i din dator eller telefon. Installera den och hämta ett BankID hos din internetbank. Installera appen från install.bankid.com.",
                ),
                (
                    "en",
                    "The BankID app couldn’t be found on your computer or mobile device. Please install it and order a BankID from your internet bank. Install the app from install.bankid.com.",
                ),
            ],
        )?;
        // Label for the link or button used to start the BankID app.
        self.register_identifier(
            MessageId::Rfa18,
            &[],
            &[("sv", "Starta BankID-appen"), ("en", "Start the BankID app")],
        )?;
        self.register_identifier(
            MessageId::Rfa19,
            &[],
            &[
                (
                    "sv",
                    "Vill du logga in eller skriva under med BankID på den här datorn eller med ett Mobilt BankID?",
                ),
                (
                    "en",
                    "Would you like to login or sign with a BankID on this computer or with a Mobile BankID?",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa20,
            &[],
            &[
                (
                    "sv",
                    "Vill du logga in eller skriva under med ett BankID på den här enheten eller med ett BankID på en annan enhet?",
                ),
                (
                    "en",
                    "Would you like to login or sign with a BankID on this device or with a BankID on another device?",
                ),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa21,
            &[],
            &[
                ("sv", "Identifiering eller underskrift pågår."),
                ("en", "Identification or signing in progress."),
            ],
        )?;
        self.register_identifier(
            MessageId::Rfa22,
            &[],
            &[
                ("sv", "Okänt fel. Försök igen."),
                ("en", "Unknown error. Please try again."),
            ],
        )?;
        Ok(())
    }
}

const FALLBACK_LANGUAGE: &str = "en";

/// Validates the ISO 639-1 two-letter shape and lowercases for lookup.
fn normalize_language_code(code: &str) -> Result<String, CatalogError> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(code.to_ascii_lowercase())
    } else {
        Err(CatalogError::InvalidLanguageCode(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_identifier_has_nonempty_english_default() {
        let catalog = MessageCatalog::new().expect("seeding failed");
        for id in MessageId::ALL {
            let text = catalog
                .get_user_message(id, "en")
                .unwrap_or_else(|e| panic!("{id}: {e}"));
            assert!(!text.is_empty(), "{id} has empty English text");
        }
    }

    #[test]
    fn swedish_defaults_are_seeded() {
        let catalog = MessageCatalog::new().unwrap();
        assert_eq!(
            catalog.get_user_message(MessageId::Rfa6, "sv").unwrap(),
            "Åtgärden avbruten."
        );
    }

    #[test]
    fn malformed_language_codes_are_rejected() {
        let catalog = MessageCatalog::new().unwrap();
        for bad in ["eng", "1a", "", "e", "s v"] {
            assert_eq!(
                catalog.get_user_message(MessageId::Rfa1, bad),
                Err(CatalogError::InvalidLanguageCode(bad.to_string())),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let catalog = MessageCatalog::new().unwrap();
        assert_eq!(
            catalog.get_user_message(MessageId::Rfa1, "de").unwrap(),
            "Start your BankID app."
        );
    }

    #[test]
    fn custom_message_overrides_default_case_insensitively() {
        let catalog = MessageCatalog::new().unwrap();
        assert!(catalog.register_custom_message(MessageId::Rfa1, "sv", "Öppna appen"));
        assert_eq!(
            catalog.get_user_message(MessageId::Rfa1, "SV").unwrap(),
            "Öppna appen"
        );
        // Other languages are unaffected.
        assert_eq!(
            catalog.get_user_message(MessageId::Rfa1, "en").unwrap(),
            "Start your BankID app."
        );
    }

    #[test]
    fn custom_registration_is_last_write_wins() {
        let catalog = MessageCatalog::new().unwrap();
        assert!(catalog.register_custom_message(MessageId::Rfa5, "en", "first"));
        assert!(catalog.register_custom_message(MessageId::Rfa5, "en", "second"));
        assert_eq!(
            catalog.get_user_message(MessageId::Rfa5, "en").unwrap(),
            "second"
        );
    }

    #[test]
    fn custom_registration_tolerates_bad_language_code() {
        let catalog = MessageCatalog::new().unwrap();
        assert!(!catalog.register_custom_message(MessageId::Rfa5, "english", "x"));
        assert_eq!(
            catalog.get_user_message(MessageId::Rfa5, "en").unwrap(),
            "Internal error. Please try again."
        );
    }

    #[test]
    fn duplicate_identifier_registration_fails() {
        let mut catalog = MessageCatalog::new().unwrap();
        let err = catalog
            .register_identifier(MessageId::Rfa1, &[], &[("en", "again")])
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateIdentifier(MessageId::Rfa1));
    }

    #[test]
    fn identifier_hint_mappings_are_exposed() {
        let catalog = MessageCatalog::new().unwrap();
        assert_eq!(
            catalog.mapped_hint_codes(MessageId::Rfa6).unwrap(),
            &[HintCode::UserCancel]
        );
        // RFA18 is a button label, not tied to any hint code.
        assert!(catalog.mapped_hint_codes(MessageId::Rfa18).unwrap().is_empty());
    }

    #[test]
    fn construction_is_deterministic() {
        let a = MessageCatalog::new().unwrap();
        let b = MessageCatalog::new().unwrap();
        for id in MessageId::ALL {
            for lang in ["en", "sv", "fi"] {
                assert_eq!(
                    a.get_user_message(id, lang).unwrap(),
                    b.get_user_message(id, lang).unwrap()
                );
            }
        }
    }
}
