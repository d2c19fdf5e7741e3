//! Settings for configuration accessor generation.

/// Name of the generated top-level type when none is given.
pub const DEFAULT_CLASS_NAME: &str = "Config";

/// Path generated code uses to reach the runtime crate when none is given.
pub const DEFAULT_RUNTIME_PATH: &str = "::config_schema_runtime";

/// Settings that control code generation behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSettings {
    /// Name of the type generated for the root object schema.
    pub class_name: String,

    /// Path through which generated code refers to the runtime crate.
    ///
    /// Must resolve from any module, so use an absolute path such as
    /// `::config_schema_runtime` or `crate::runtime`.
    pub runtime_path: String,

    /// When true, also emit a `make_<class>` factory that validates documents
    /// against an embedded copy of the schema before wrapping them.
    pub embed_schema: bool,

    /// When true, keywords the generator does not recognize are reported as
    /// schema issues instead of being ignored with a warning.
    ///
    /// **Default: false.** Unsupported constructs such as `oneOf` or `$ref`
    /// fail generation regardless of this setting.
    pub deny_unknown_keywords: bool,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            embed_schema: false,
            deny_unknown_keywords: false,
        }
    }
}

impl GenerateSettings {
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    #[must_use]
    pub fn with_runtime_path(mut self, runtime_path: impl Into<String>) -> Self {
        self.runtime_path = runtime_path.into();
        self
    }

    #[must_use]
    pub fn with_embed_schema(mut self, embed_schema: bool) -> Self {
        self.embed_schema = embed_schema;
        self
    }

    #[must_use]
    pub fn with_deny_unknown_keywords(mut self, deny_unknown_keywords: bool) -> Self {
        self.deny_unknown_keywords = deny_unknown_keywords;
        self
    }
}
