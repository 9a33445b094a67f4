//! Kebab-case normalisation of migration names
//!
//! Human names (`"Add Index"`), version names (`"v2.2.0"`) and file slugs
//! (`"add-index"`, `"v-2-2-0"`) all normalise to the same slug, which is
//! how a requested name is matched to a file.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
}

fn class_of(c: char) -> Option<CharClass> {
    if c.is_ascii_digit() {
        Some(CharClass::Digit)
    } else if c.is_uppercase() {
        Some(CharClass::Upper)
    } else if c.is_alphanumeric() {
        Some(CharClass::Lower)
    } else {
        None
    }
}

/// Split `input` into words
///
/// Boundaries are any non-alphanumeric character, a lower-to-upper
/// transition (`addIndex`), the last capital of an acronym run
/// (`XMLParser` → `XML`, `Parser`) and any letter/digit transition
/// (`v2` → `v`, `2`).
pub fn words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let Some(class) = class_of(c) else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        };

        if let Some(prev) = current.chars().last().and_then(class_of) {
            let next = chars.get(i + 1).copied().and_then(class_of);
            let boundary = match (prev, class) {
                (CharClass::Lower, CharClass::Upper) => true,
                (CharClass::Digit, CharClass::Lower | CharClass::Upper) => true,
                (CharClass::Lower | CharClass::Upper, CharClass::Digit) => true,
                (CharClass::Upper, CharClass::Upper) => next == Some(CharClass::Lower),
                _ => false,
            };
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Lower-case kebab form of `input`
pub fn kebab_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// `PascalCase` form of `input`, used for scaffolded struct names
pub fn pascal_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_human_names() {
        assert_eq!(kebab_case("add index"), "add-index");
        assert_eq!(kebab_case("Add Index"), "add-index");
        assert_eq!(kebab_case("  add__index  "), "add-index");
        assert_eq!(kebab_case("addIndex"), "add-index");
        assert_eq!(kebab_case("XMLParser"), "xml-parser");
    }

    #[test]
    fn test_kebab_case_versions() {
        assert_eq!(kebab_case("v2.2.0"), "v-2-2-0");
        assert_eq!(kebab_case("v-2-2-0"), "v-2-2-0");
        assert_eq!(kebab_case("v10.0.12"), "v-10-0-12");
    }

    #[test]
    fn test_kebab_case_is_idempotent() {
        for name in ["add-index", "v-2-0-1", "remove-old-users"] {
            assert_eq!(kebab_case(name), name);
        }
    }

    #[test]
    fn test_kebab_case_empty() {
        assert_eq!(kebab_case(""), "");
        assert_eq!(kebab_case("--- ..."), "");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("add index"), "AddIndex");
        assert_eq!(pascal_case("v2.2.0"), "V220");
    }
}
