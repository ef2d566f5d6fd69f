//! User-entered path values that resolve through substitutions.

use super::path::FileSystemPath;
use super::platform::{self, Platform};
use crate::subst::{self, SubstitutionContext, Substitutions};

/// A raw path string plus the substitutions applied when it is read.
///
/// The resolved value is always in the platform's native form, so
/// `/test.server/x` reads back as `\\test.server\x` on Windows.
#[derive(Debug, Clone)]
pub struct PathValue {
    raw: String,
    substitutions: Substitutions,
    platform: &'static dyn Platform,
}

impl PathValue {
    /// Uses [`Substitutions::PATH_DEFAULT`], leaving `#` placeholders alone.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into(), substitutions: Substitutions::PATH_DEFAULT, platform: platform::host() }
    }

    pub fn with_substitutions(mut self, substitutions: Substitutions) -> Self {
        self.substitutions = substitutions;
        self
    }

    pub fn with_platform(mut self, platform: &'static dyn Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    pub fn substitutions(&self) -> Substitutions {
        self.substitutions
    }

    /// `true` when reading the value depends on the context.
    pub fn is_context_sensitive(&self) -> bool {
        !self.substitutions.is_none() && subst::has_substitutions(&self.raw)
    }

    pub fn value(&self, context: &SubstitutionContext) -> String {
        let substituted = if self.is_context_sensitive() {
            context.substitute(&self.raw, self.substitutions)
        } else {
            self.raw.clone()
        };
        FileSystemPath::new(&substituted).with_platform(self.platform).native_string()
    }

    /// Hash identifying the resolved value. Values that do not depend on the
    /// context hash identically in every context.
    pub fn hash(&self, context: &SubstitutionContext) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.raw.as_bytes());
        hasher.update(&[0, self.substitutions.bits()]);
        if self.is_context_sensitive() {
            hasher.update(self.value(context).as_bytes());
        }
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_ignore_the_context() {
        let value = PathValue::new("/plain/path.exr");
        let mut context = SubstitutionContext::new();
        let before = value.hash(&context);
        context.set_frame(12);
        context.set("ANY", "thing");
        assert_eq!(value.hash(&context), before);
        assert!(!value.is_context_sensitive());
    }

    #[test]
    fn values_render_natively() {
        let value = PathValue::new("/test.server/path/test.exr").with_platform(platform::windows());
        assert_eq!(value.value(&SubstitutionContext::new()), "\\\\test.server\\path\\test.exr");
    }
}
