//! Custom Elements
//!
//! Custom element registry and the "is this tag defined" capability.

use std::collections::HashMap;

/// Answers whether creating an element by tag name yields a defined element
pub trait ElementDefinitions {
    fn is_defined(&self, tag: &str) -> bool;
}

/// Custom elements registry
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, CustomElementDefinition>,
}

/// Custom element definition
#[derive(Debug, Clone)]
pub struct CustomElementDefinition {
    pub name: String,
    /// Resource the definition was evaluated from, if known
    pub source: Option<String>,
    pub observed_attributes: Vec<String>,
    /// Properties the element's class exposes without a setter
    pub readonly_properties: Vec<String>,
}

/// Custom element options
#[derive(Debug, Clone, Default)]
pub struct CustomElementOptions {
    pub source: Option<String>,
    pub observed_attributes: Vec<String>,
    pub readonly_properties: Vec<String>,
}

/// Custom element errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomElementError {
    #[error("'{0}' is not a valid custom element name")]
    InvalidName(String),
    #[error("'{0}' has already been defined")]
    AlreadyDefined(String),
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element
    pub fn define(
        &mut self,
        name: &str,
        options: CustomElementOptions,
    ) -> Result<(), CustomElementError> {
        if !Self::is_valid_name(name) {
            return Err(CustomElementError::InvalidName(name.to_string()));
        }

        if self.definitions.contains_key(name) {
            return Err(CustomElementError::AlreadyDefined(name.to_string()));
        }

        tracing::debug!(element = name, source = ?options.source, "custom element defined");

        let definition = CustomElementDefinition {
            name: name.to_string(),
            source: options.source,
            observed_attributes: options.observed_attributes,
            readonly_properties: options.readonly_properties,
        };

        self.definitions.insert(name.to_string(), definition);
        Ok(())
    }

    /// Get element definition
    pub fn get(&self, name: &str) -> Option<&CustomElementDefinition> {
        self.definitions.get(name)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate custom element name
    pub fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }

        if name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
            return false;
        }

        let reserved = ["annotation-xml", "color-profile", "font-face",
                       "font-face-src", "font-face-uri", "font-face-format",
                       "font-face-name", "missing-glyph"];
        !reserved.contains(&name)
    }
}

impl ElementDefinitions for CustomElementRegistry {
    fn is_defined(&self, tag: &str) -> bool {
        CustomElementRegistry::is_defined(self, tag)
    }
}

/// HTML elements that exist without any script
const KNOWN_HTML_TAGS: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "blockquote",
    "body", "br", "button", "canvas", "caption", "code", "dd", "details",
    "dialog", "div", "dl", "dt", "em", "fieldset", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hr", "html", "i", "iframe", "img", "input", "label", "legend", "li",
    "link", "main", "meta", "nav", "ol", "option", "p", "picture", "pre",
    "script", "section", "select", "slot", "small", "source", "span",
    "strong", "style", "sub", "summary", "sup", "table", "tbody", "td",
    "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr",
    "u", "ul", "video",
];

/// Whether `tag` is a built-in HTML element
pub fn is_known_html_tag(tag: &str) -> bool {
    KNOWN_HTML_TAGS.iter().any(|known| known.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(CustomElementRegistry::is_valid_name("my-element"));
        assert!(CustomElementRegistry::is_valid_name("app-header"));
        assert!(!CustomElementRegistry::is_valid_name("myelement")); // no hyphen
        assert!(!CustomElementRegistry::is_valid_name("My-Element")); // uppercase
        assert!(!CustomElementRegistry::is_valid_name("font-face"));
    }

    #[test]
    fn test_define() {
        let mut registry = CustomElementRegistry::new();
        registry.define("mfe2-root", CustomElementOptions::default()).unwrap();

        assert!(registry.is_defined("mfe2-root"));
        assert!(!registry.is_defined("mfe1-root"));
        assert_eq!(
            registry.define("mfe2-root", CustomElementOptions::default()),
            Err(CustomElementError::AlreadyDefined("mfe2-root".into()))
        );
    }

    #[test]
    fn test_define_invalid_name() {
        let mut registry = CustomElementRegistry::new();
        assert!(matches!(
            registry.define("header", CustomElementOptions::default()),
            Err(CustomElementError::InvalidName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_known_tags() {
        assert!(is_known_html_tag("div"));
        assert!(is_known_html_tag("DIV"));
        assert!(!is_known_html_tag("foo-bar"));
    }
}
