use serde::{Deserialize, Serialize};

/// Сохранённая настройка пользователя (значение: непрозрачная строка, обычно JSON)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserPreference {
    pub preference: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PreferenceOption {
    pub option: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SavePreferencesRequest {
    pub preference: Vec<PreferenceOption>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PreferenceResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<UserPreference>,
}

impl PreferenceResponse {
    pub fn ok(data: Option<UserPreference>) -> Self {
        Self {
            success: true,
            message: String::new(),
            data,
        }
    }
}
