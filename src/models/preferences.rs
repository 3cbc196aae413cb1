use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub currency: String,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: "BRL".into(),
            theme: Theme::Dark,
            whatsapp_number: None,
        }
    }
}

/// Partial preferences update; `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct PreferencesPatch {
    pub currency: Option<String>,
    pub theme: Option<Theme>,
    pub whatsapp_number: Option<String>,
}

impl Preferences {
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(number) = patch.whatsapp_number {
            self.whatsapp_number = Some(number);
        }
    }
}
