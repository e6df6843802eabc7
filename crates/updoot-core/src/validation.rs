//! Field-level validation for the sign-up, sign-in and password reset forms.
//!
//! Validation never fails as a whole: each form returns a map from field
//! name to message so every problem can be shown next to its input.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ko,
}

impl Language {
    fn pick(&self, en: &'static str, ko: &'static str) -> &'static str {
        match self {
            Language::En => en,
            Language::Ko => ko,
        }
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const VERIFICATION_CODE_LEN: usize = 6;

lazy_static::lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^\S+@\S+$").unwrap();
    static ref PHONE: Regex = Regex::new(r"^\+[0-9]{7,15}$").unwrap();
    static ref CODE: Regex = Regex::new(r"^[0-9]{6}$").unwrap();

    // Sign-up strength meter.
    static ref DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref LOWERCASE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref SPECIAL: Regex = Regex::new(r"[$&+,:;=?@#|'<>.^*()%!-]").unwrap();

    // Sign-in and reset rule: only these characters, with a letter, a digit and a symbol.
    static ref ACCOUNT_CHARS: Regex = Regex::new(r"^[A-Za-z0-9@$!%*#?&]{8,}$").unwrap();
    static ref LETTER: Regex = Regex::new(r"[A-Za-z]").unwrap();
    static ref ACCOUNT_SYMBOL: Regex = Regex::new(r"[@$!%*#?&]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordRequirement {
    MinLength,
    Digit,
    Lowercase,
    Uppercase,
    Special,
}

impl PasswordRequirement {
    pub const ALL: [PasswordRequirement; 5] = [
        PasswordRequirement::MinLength,
        PasswordRequirement::Digit,
        PasswordRequirement::Lowercase,
        PasswordRequirement::Uppercase,
        PasswordRequirement::Special,
    ];

    pub fn is_met(&self, password: &str) -> bool {
        match self {
            PasswordRequirement::MinLength => password.chars().count() >= MIN_PASSWORD_LEN,
            PasswordRequirement::Digit => DIGIT.is_match(password),
            PasswordRequirement::Lowercase => LOWERCASE.is_match(password),
            PasswordRequirement::Uppercase => UPPERCASE.is_match(password),
            PasswordRequirement::Special => SPECIAL.is_match(password),
        }
    }

    pub fn label(&self, lang: Language) -> &'static str {
        match self {
            PasswordRequirement::MinLength => lang.pick("8 characters minimum", "8 최소 문자"),
            PasswordRequirement::Digit => lang.pick("1 number", "1 숫자"),
            PasswordRequirement::Lowercase => lang.pick("1 lowercase letter", "1 소문자"),
            PasswordRequirement::Uppercase => lang.pick("1 uppercase letter", "1 대문자"),
            PasswordRequirement::Special => lang.pick("1 special character", "1 특수 문자"),
        }
    }
}

/// Which requirements a password meets, in display order.
pub fn password_strength(password: &str) -> Vec<(PasswordRequirement, bool)> {
    PasswordRequirement::ALL
        .iter()
        .map(|r| (*r, r.is_met(password)))
        .collect()
}

pub fn is_strong_password(password: &str) -> bool {
    PasswordRequirement::ALL.iter().all(|r| r.is_met(password))
}

pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpDetails {
    pub username: String,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpPassword {
    pub password: String,
    pub confirm_password: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// International format as the auth provider expects it, e.g. `+85212345678`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone.trim())
}

pub fn is_valid_code(code: &str) -> bool {
    CODE.is_match(code)
}

/// Message for a password typed at sign-in or reset, `None` when it passes.
pub fn account_password_error(password: &str, lang: Language) -> Option<&'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some(lang.pick("Must be at least 8 characters", "8자 이상이어야 합니다"));
    }
    let valid = ACCOUNT_CHARS.is_match(password)
        && LETTER.is_match(password)
        && DIGIT.is_match(password)
        && ACCOUNT_SYMBOL.is_match(password);
    if valid {
        None
    } else {
        Some(lang.pick(
            "Must contain uppercase, lowercase, number and special case characters",
            "대문자, 소문자, 숫자 및 특수 문자를 포함해야 합니다",
        ))
    }
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, lang: Language) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, lang.pick("This field is required", "필수 항목입니다").to_string());
        false
    } else {
        true
    }
}

pub fn validate_login(form: &LoginCredentials, lang: Language) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if required(&mut errors, "email", &form.email, lang) && !is_valid_email(&form.email) {
        errors.insert("email", lang.pick("Invalid email address", "잘못된 이메일 주소").to_string());
    }
    if let Some(message) = account_password_error(&form.password, lang) {
        errors.insert("password", message.to_string());
    }
    errors
}

pub fn validate_sign_up_details(form: &SignUpDetails, lang: Language) -> FieldErrors {
    let mut errors = FieldErrors::new();
    required(&mut errors, "username", &form.username, lang);
    if required(&mut errors, "phone_number", &form.phone_number, lang) && !is_valid_phone(&form.phone_number) {
        errors.insert(
            "phone_number",
            lang.pick("Use international format, e.g. +852...", "국제 형식을 사용하세요 (+852...)").to_string(),
        );
    }
    if required(&mut errors, "email", &form.email, lang) && !is_valid_email(&form.email) {
        errors.insert("email", lang.pick("Invalid email address", "잘못된 이메일 주소").to_string());
    }
    errors
}

pub fn validate_sign_up_password(form: &SignUpPassword, lang: Language) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if required(&mut errors, "password", &form.password, lang) && !is_strong_password(&form.password) {
        let missing: Vec<&str> = password_strength(&form.password)
            .into_iter()
            .filter(|(_, met)| !met)
            .map(|(r, _)| r.label(lang))
            .collect();
        errors.insert("password", missing.join(", "));
    }
    if form.confirm_password != form.password {
        errors.insert(
            "confirm_password",
            lang.pick("Passwords do not match", "비밀번호가 일치하지 않습니다").to_string(),
        );
    }
    errors
}

pub fn validate_reset(email: &str, code: &str, new_password: &str, lang: Language) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !is_valid_email(email) {
        errors.insert("email", lang.pick("Invalid email address", "잘못된 이메일 주소").to_string());
    }
    if !is_valid_code(code) {
        errors.insert("code", lang.pick("Enter the 6-digit code", "6자리 코드를 입력하세요").to_string());
    }
    if let Some(message) = account_password_error(new_password, lang) {
        errors.insert("password", message.to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_requirements() {
        let report = password_strength("abc");
        assert_eq!(report[0], (PasswordRequirement::MinLength, false));
        assert_eq!(report[2], (PasswordRequirement::Lowercase, true));
        assert!(is_strong_password("Ajd18sjbny?"));
        assert!(!is_strong_password("Ajd18sjbny"));
    }

    #[test]
    fn test_sign_up_password_field_errors() {
        let errors = validate_sign_up_password(
            &SignUpPassword {
                password: "short".into(),
                confirm_password: "other".into(),
            },
            Language::En,
        );
        assert!(errors["password"].contains("8 characters minimum"));
        assert!(errors.contains_key("confirm_password"));
    }

    #[test]
    fn test_sign_up_details() {
        let ok = SignUpDetails {
            username: "John".into(),
            phone_number: "+85291234567".into(),
            email: "johndoe@gmail.com".into(),
        };
        assert!(validate_sign_up_details(&ok, Language::En).is_empty());

        let errors = validate_sign_up_details(&SignUpDetails::default(), Language::Ko);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["username"], "필수 항목입니다");
    }

    #[test]
    fn test_email_and_code_checks() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.co"));
        assert!(!is_valid_email("@b.co"));
        assert!(is_valid_phone("+85291234567"));
        assert!(!is_valid_phone("85291234567"));
        assert!(is_valid_code("123456"));
        assert!(!is_valid_code("12345a"));
    }

    #[test]
    fn test_login_password_messages() {
        let short = LoginCredentials {
            email: "a@x.co".into(),
            password: "x".into(),
        };
        let errors = validate_login(&short, Language::En);
        assert_eq!(errors["password"], "Must be at least 8 characters");
        assert!(!errors.contains_key("email"));

        let no_symbol = LoginCredentials {
            email: "a@x.co".into(),
            password: "abcdefg1".into(),
        };
        assert_eq!(
            validate_login(&no_symbol, Language::En)["password"],
            "Must contain uppercase, lowercase, number and special case characters"
        );

        // `^` is not in the sign-in symbol set.
        assert!(account_password_error("abcdef1^", Language::En).is_some());

        let ok = LoginCredentials {
            email: "a@x.co".into(),
            password: "Secret#123".into(),
        };
        assert!(validate_login(&ok, Language::En).is_empty());
    }

    #[test]
    fn test_reset_form() {
        let errors = validate_reset("not an email", "12345", "weak", Language::En);
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["code", "email", "password"]);
        assert_eq!(errors["code"], "Enter the 6-digit code");

        assert!(validate_reset("a@x.co", "123456", "Secret#123", Language::En).is_empty());

        let errors = validate_reset("a@x.co", "12a456", "Secret#123", Language::Ko);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("code"));
    }
}
