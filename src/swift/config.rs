//! Resolved configuration values of a demangling session.

use crate::swift::display::DisplayOptions;
use crate::swift::error::ConfigError;

/// Maximum node height and grammar nesting used when nothing else is configured.
pub const DEFAULT_MAX_DEPTH: usize = 768;

/// Largest accepted [`Config::max_depth`]. Printing recurses once per tree level, so deeper trees are rejected while
/// parsing instead.
pub const MAX_SUPPORTED_DEPTH: usize = 1024;

/// Configuration of a [`Demangler`](crate::swift::Demangler).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    /// Maximum height of a demangled tree, also bounding the recursion of the grammar. Values above
    /// [`MAX_SUPPORTED_DEPTH`] are lowered to it.
    pub max_depth: usize,
    /// Options used when a [`Node`](crate::swift::Node) is formatted with `{}`.
    pub display: DisplayOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            display: DisplayOptions::full(),
        }
    }
}

impl Config {
    /// Builds a configuration from already resolved key/value pairs, applied in order on top of the defaults.
    ///
    /// Recognized keys are `max-depth` (a positive integer up to [`MAX_SUPPORTED_DEPTH`]), `display` (`full` or
    /// `simplified`) and the kebab-case name of every [`DisplayOptions`] field (`true` or `false`).
    ///
    /// ```rust
    /// use swift_ast_demangle::swift::Config;
    ///
    /// let config = Config::from_pairs([("display", "simplified"), ("display-module-names", "true")]).unwrap();
    ///
    /// assert!(config.display.synthesize_sugar_on_types);
    /// assert!(config.display.display_module_names);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on the first unknown key or invalid value.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in pairs {
            config.set(key.as_ref(), value.as_ref())?;
        }

        Ok(config)
    }

    /// Sets a single configuration value. See [`Config::from_pairs`] for the recognized keys.
    ///
    /// # Errors
    ///
    /// Fails if the key is unknown or the value cannot be interpreted for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid_value = || ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        };

        match key {
            "max-depth" => {
                self.max_depth = value
                    .parse::<usize>()
                    .ok()
                    .filter(|max_depth| (1..=MAX_SUPPORTED_DEPTH).contains(max_depth))
                    .ok_or_else(invalid_value)?;
            }
            "display" => {
                self.display = match value {
                    "full" => DisplayOptions::full(),
                    "simplified" => DisplayOptions::simplified(),
                    _ => return Err(invalid_value()),
                };
            }
            _ => {
                let flag = display_flag(&mut self.display, key).ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?;

                *flag = value.parse::<bool>().map_err(|_| invalid_value())?;
            }
        }

        tracing::debug!(key, value, "configuration value set");

        Ok(())
    }
}

fn display_flag<'a>(options: &'a mut DisplayOptions, key: &str) -> Option<&'a mut bool> {
    Some(match key {
        "synthesize-sugar-on-types" => &mut options.synthesize_sugar_on_types,
        "qualify-entities" => &mut options.qualify_entities,
        "display-extension-contexts" => &mut options.display_extension_contexts,
        "display-unmangled-suffix" => &mut options.display_unmangled_suffix,
        "display-module-names" => &mut options.display_module_names,
        "display-generic-specializations" => &mut options.display_generic_specializations,
        "display-where-clauses" => &mut options.display_where_clauses,
        "display-entity-types" => &mut options.display_entity_types,
        "display-argument-types" => &mut options.display_argument_types,
        "display-private-discriminators" => &mut options.display_private_discriminators,
        "display-local-name-contexts" => &mut options.display_local_name_contexts,
        "display-stdlib-module" => &mut options.display_stdlib_module,
        "display-objc-module" => &mut options.display_objc_module,
        "shorten-partial-apply" => &mut options.shorten_partial_apply,
        "shorten-thunk" => &mut options.shorten_thunk,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_MAX_DEPTH, MAX_SUPPORTED_DEPTH};
    use crate::swift::display::DisplayOptions;
    use crate::swift::error::ConfigError;

    #[test]
    fn test_default() {
        let config = Config::default();

        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.display, DisplayOptions::full());
        assert_eq!(Config::from_pairs(Vec::<(&str, &str)>::new()), Ok(config));
    }

    #[test]
    fn test_from_pairs() {
        let config = Config::from_pairs([
            ("max-depth", "32"),
            ("display", "simplified"),
            ("display-module-names", "true"),
        ])
        .unwrap();

        assert_eq!(config.max_depth, 32);

        let config = Config::from_pairs([("max-depth", MAX_SUPPORTED_DEPTH.to_string())]).unwrap();

        assert_eq!(config.max_depth, MAX_SUPPORTED_DEPTH);
        assert_eq!(
            config.display,
            DisplayOptions {
                display_module_names: true,
                ..DisplayOptions::simplified()
            }
        );

        // Later pairs win.
        let config = Config::from_pairs([("shorten-thunk", "true"), ("display", "full")]).unwrap();

        assert_eq!(config.display, DisplayOptions::full());
    }

    #[test]
    fn test_every_display_key_is_known() {
        for key in [
            "synthesize-sugar-on-types",
            "qualify-entities",
            "display-extension-contexts",
            "display-unmangled-suffix",
            "display-module-names",
            "display-generic-specializations",
            "display-where-clauses",
            "display-entity-types",
            "display-argument-types",
            "display-private-discriminators",
            "display-local-name-contexts",
            "display-stdlib-module",
            "display-objc-module",
            "shorten-partial-apply",
            "shorten-thunk",
        ] {
            let enabled = Config::from_pairs([(key, "true")]).unwrap();
            let disabled = Config::from_pairs([(key, "false")]).unwrap();

            assert_ne!(enabled.display, disabled.display, "{key}");
        }
    }

    #[test]
    fn test_errors() {
        #[track_caller]
        fn check(key: &str, value: &str, expected: &ConfigError) {
            assert_eq!(Config::from_pairs([(key, value)]).as_ref(), Err(expected));
        }

        let invalid_value = |key: &str, value: &str| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        };

        check("max-depth", "0", &invalid_value("max-depth", "0"));
        check("max-depth", "-1", &invalid_value("max-depth", "-1"));
        check("max-depth", "200000", &invalid_value("max-depth", "200000"));
        check("display", "short", &invalid_value("display", "short"));
        check("shorten-thunk", "yes", &invalid_value("shorten-thunk", "yes"));
        check("verbose", "true", &ConfigError::UnknownKey("verbose".to_owned()));
    }
}
