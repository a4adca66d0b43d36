//! Plural form selection for numerus messages.

use crate::config::LocaleTag;

/// Index of the numerus form to use for count `n` in `language`
pub fn plural_index(language: Option<&str>, n: u64) -> usize {
    let Some(tag) = language.and_then(LocaleTag::parse) else {
        return germanic(n);
    };

    match tag.language.as_str() {
        "zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "tr" => 0,
        "pt" if tag.territory.as_deref() == Some("BR") => usize::from(n > 1),
        "fr" => usize::from(n > 1),
        "ru" | "uk" | "be" | "sr" | "hr" | "bs" => {
            let (n10, n100) = (n % 10, n % 100);
            if n10 == 1 && n100 != 11 {
                0
            } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                1
            } else {
                2
            }
        }
        "pl" => {
            let (n10, n100) = (n % 10, n % 100);
            if n == 1 {
                0
            } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                1
            } else {
                2
            }
        }
        "cs" | "sk" => match n {
            1 => 0,
            2..=4 => 1,
            _ => 2,
        },
        _ => germanic(n),
    }
}

/// Number of numerus forms `language` distinguishes
pub fn form_count(language: Option<&str>) -> usize {
    let Some(tag) = language.and_then(LocaleTag::parse) else {
        return 2;
    };

    match tag.language.as_str() {
        "zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "tr" => 1,
        "ru" | "uk" | "be" | "sr" | "hr" | "bs" | "pl" | "cs" | "sk" => 3,
        _ => 2,
    }
}

fn germanic(n: u64) -> usize {
    usize::from(n != 1)
}

/// Replace every `%n` with the count
pub fn substitute_count(text: &str, n: u64) -> String {
    text.replace("%n", &n.to_string())
}
