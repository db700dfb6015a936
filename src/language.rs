//! Supported languages, their pinned runtime versions and canned example snippets.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Javascript,
    Python,
    Java,
    C,
}

/// Pinned Piston runtime per language. Order here is menu order.
pub const LANGUAGE_VERSIONS: &[(Language, &str)] = &[
    (Language::Javascript, "18.15.0"),
    (Language::Python, "3.10.0"),
    (Language::Java, "15.0.2"),
    (Language::C, "10.2.0"),
];

/// Example program loaded into the editor when a language is selected.
pub const CODE_SNIPPETS: &[(Language, &str)] = &[
    (
        Language::Javascript,
        "const name = 'CodeLab';
const year = 2024;
console.log(`Name: ${name}, Year: ${year}`);
console.log('Hello from the CodeLab playground!');",
    ),
    (
        Language::Python,
        "name = 'CodeLab'
year = 2024
print(f'Name: {name}, Year: {year}')
print('Hello from the CodeLab playground!')",
    ),
    (
        Language::Java,
        "public class Main {
  public static void main(String[] args) {
    String name = \"CodeLab\";
    int year = 2024;
    System.out.println(\"Name: \" + name + \", Year: \" + year);
    System.out.println(\"Hello from the CodeLab playground!\");
  }
}",
    ),
    (
        Language::C,
        "#include <stdio.h>

int main() {
    char name[] = \"CodeLab\";
    int year = 2024;
    printf(\"Name: %s, Year: %d \", name, year);
    printf(\"Hello from the CodeLab playground!\");
    return 0;
}",
    ),
];

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Javascript,
        Language::Python,
        Language::Java,
        Language::C,
    ];

    /// Identifier sent to the execution service and used in download names.
    pub fn id(self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
        }
    }

    pub fn version(self) -> &'static str {
        lookup(LANGUAGE_VERSIONS, self)
    }

    pub fn snippet(self) -> &'static str {
        lookup(CODE_SNIPPETS, self)
    }

    /// Position in the language menu.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(0)
    }
}

fn lookup(table: &[(Language, &'static str)], lang: Language) -> &'static str {
    table
        .iter()
        .find(|(l, _)| *l == lang)
        .map(|(_, v)| *v)
        .unwrap_or_default()
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "javascript" | "js" | "node" => Ok(Language::Javascript),
            "python" | "py" | "python3" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "c" => Ok(Language::C),
            other => Err(anyhow!(
                "unsupported language '{}' (expected one of: javascript, python, java, c)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_version_and_snippet() {
        for lang in Language::ALL {
            assert!(!lang.version().is_empty(), "{} has no version", lang);
            assert!(!lang.snippet().is_empty(), "{} has no snippet", lang);
        }
    }

    #[test]
    fn test_pinned_versions() {
        assert_eq!(Language::Javascript.version(), "18.15.0");
        assert_eq!(Language::Python.version(), "3.10.0");
        assert_eq!(Language::Java.version(), "15.0.2");
        assert_eq!(Language::C.version(), "10.2.0");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(" JavaScript ".parse::<Language>().unwrap(), Language::Javascript);
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_snippets_share_greeting() {
        for (lang, snippet) in CODE_SNIPPETS {
            assert!(snippet.contains("CodeLab"), "{} snippet", lang);
            assert!(snippet.contains("Hello from the CodeLab playground!"), "{} snippet", lang);
        }
        assert!(Language::C.snippet().starts_with("#include <stdio.h>"));
        assert!(Language::Java.snippet().starts_with("public class Main {"));
    }

    #[test]
    fn test_menu_index_follows_table_order() {
        for (i, (lang, _)) in LANGUAGE_VERSIONS.iter().enumerate() {
            assert_eq!(lang.index(), i);
        }
    }
}
