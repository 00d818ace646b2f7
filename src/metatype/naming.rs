//! Property Naming
//!
//! Maps declared member identifiers to configuration property keys and
//! display labels:
//! - `__` → `_`
//! - `_` → `.`
//! - `$_$` → `-` (metatype 1.4)
//! - `$$` → `$`
//! - `$` → removed

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::version::MetatypeVersion;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(__)|(_)|(\$_\$)|(\$\$)|(\$)").expect("valid identifier pattern"))
}

/// A mangled property key and the metatype version it requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKey {
    pub key: String,
    /// Set when the key uses a construct newer than the base format
    pub requires: Option<MetatypeVersion>,
}

/// Rewrite a member identifier into a property key
pub fn identifier_to_property(name: &str) -> PropertyKey {
    let mut requires = None;
    let key = identifier_pattern().replace_all(name, |caps: &Captures| {
        if caps.get(1).is_some() {
            "_"
        } else if caps.get(2).is_some() {
            "."
        } else if caps.get(3).is_some() {
            requires = Some(MetatypeVersion::V1_4);
            "-"
        } else if caps.get(4).is_some() {
            "$"
        } else {
            ""
        }
    });
    PropertyKey {
        key: key.into_owned(),
        requires,
    }
}

/// Key of a single-element annotation: `MyAnnotation` → `my.annotation`.
///
/// Uppercase letters are lower-cased; one that follows a lowercase letter
/// is preceded by a dot.
pub fn single_element_key(simple_name: &str) -> String {
    let mut out = String::with_capacity(simple_name.len() + 4);
    let mut last_lower = false;
    for c in simple_name.chars() {
        if c.is_uppercase() {
            if last_lower {
                out.push('.');
            }
            out.extend(c.to_lowercase());
            last_lower = false;
        } else {
            out.push(c);
            last_lower = c.is_lowercase();
        }
    }
    out
}

/// Human readable label of an identifier: `maxRetryCount` → `Max retry count`.
///
/// `_ $ - .` separate words, a lone capital starts a new lowercase word and
/// runs of capitals (acronyms) are kept as they are.
pub fn un_camel(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let mut out = String::with_capacity(id.len() + 8);
    let needs_space = |out: &String| out.chars().last().map(|c| !c.is_whitespace()).unwrap_or(false);

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if matches!(c, '_' | '$' | '-' | '.') {
            if needs_space(&out) {
                out.push(' ');
            }
            i += 1;
            continue;
        }

        let mut n = i;
        while n < chars.len() && chars[n].is_uppercase() {
            n += 1;
        }
        if n == i {
            out.push(c);
            i += 1;
            continue;
        }

        let single = n - i == 1;
        if needs_space(&out) {
            out.push(' ');
        }
        for &upper in &chars[i..n] {
            if single {
                out.extend(upper.to_lowercase());
            } else {
                out.push(upper);
            }
        }
        i = n;
    }

    let mut label = out.chars();
    match label.next() {
        Some(first) => first.to_uppercase().chain(label).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangling_table() {
        let cases = [
            ("a__b", "a_b", None),
            ("a_b", "a.b", None),
            ("a$_$b", "a-b", Some(MetatypeVersion::V1_4)),
            ("a$$b", "a$b", None),
            ("a$b", "ab", None),
            ("plain", "plain", None),
            ("a___b", "a_.b", None),
        ];
        for (input, key, requires) in cases {
            let mangled = identifier_to_property(input);
            assert_eq!(mangled.key, key, "mangling {}", input);
            assert_eq!(mangled.requires, requires, "version for {}", input);
        }
    }

    #[test]
    fn test_unspecial_identifiers_unchanged() {
        for id in ["port", "maxRetryCount", "value", "x1"] {
            assert_eq!(identifier_to_property(id).key, id);
        }
    }

    #[test]
    fn test_single_element_key() {
        assert_eq!(single_element_key("MyAnnotation"), "my.annotation");
        assert_eq!(single_element_key("Config"), "config");
        assert_eq!(single_element_key("PingOSGi"), "ping.osgi");
        assert_eq!(single_element_key("HTTPPort"), "httpport");
    }

    #[test]
    fn test_un_camel() {
        assert_eq!(un_camel("maxRetryCount"), "Max retry count");
        assert_eq!(un_camel("serverURL"), "Server URL");
        assert_eq!(un_camel("my_prop"), "My prop");
        assert_eq!(un_camel("com.acme.Config"), "Com acme config");
        assert_eq!(un_camel(""), "");
    }
}
