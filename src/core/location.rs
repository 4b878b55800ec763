//! Call-site location captured for each log event
//!
//! A [`LocationInfo`] holds the source file, line and the raw signature of
//! the enclosing function. Class and method names are parsed from the
//! signature on demand.

use std::borrow::Cow;

/// Placeholder used when a location component is unknown
pub const NA: &str = "??";
const NA_METHOD: &str = "??::??";

static UNAVAILABLE: LocationInfo = LocationInfo {
    file: Cow::Borrowed(NA),
    signature: Cow::Borrowed(NA_METHOD),
    line: -1,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    file: Cow<'static, str>,
    signature: Cow<'static, str>,
    line: i32,
}

impl LocationInfo {
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        signature: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self {
            file: file.into(),
            signature: signature.into(),
            line: i32::try_from(line).unwrap_or(i32::MAX),
        }
    }

    /// Location used when the caller supplies no call site
    pub fn unavailable() -> &'static LocationInfo {
        &UNAVAILABLE
    }

    pub fn is_available(&self) -> bool {
        self.line >= 0
    }

    pub fn file_name(&self) -> &str {
        &self.file
    }

    /// Line number, `-1` when unavailable
    pub fn line_number(&self) -> i32 {
        self.line
    }

    pub fn raw_signature(&self) -> &str {
        &self.signature
    }

    /// Qualifier before the last `::` of the signature, without any return type.
    ///
    /// Returns `??` when the signature has no `::`.
    pub fn class_name(&self) -> &str {
        match self.split_signature() {
            Some((qualified, _)) => match qualified.rfind(' ') {
                Some(space) => &qualified[space + 1..],
                None => qualified,
            },
            None => NA,
        }
    }

    /// Function name after the last `::`, without the argument list.
    pub fn method_name(&self) -> &str {
        match self.split_signature() {
            Some((_, method)) => method,
            None => {
                let head = self.signature_head();
                match head.rfind(' ') {
                    Some(space) => &head[space + 1..],
                    None => head,
                }
            }
        }
    }

    fn signature_head(&self) -> &str {
        let sig = self.signature.as_ref();
        match sig.find('(') {
            Some(paren) => &sig[..paren],
            None => sig,
        }
    }

    fn split_signature(&self) -> Option<(&str, &str)> {
        let head = self.signature_head();
        let sep = head.rfind("::")?;
        Some((&head[..sep], &head[sep + 2..]))
    }
}

impl Default for LocationInfo {
    fn default() -> Self {
        UNAVAILABLE.clone()
    }
}

/// Turn the type name of a marker fn nested in a function into that function's path.
///
/// Used by [`location!`](crate::location); strips the marker segment and any
/// closure segments.
#[doc(hidden)]
pub fn function_path(marker_type_name: &'static str) -> &'static str {
    let mut path = marker_type_name
        .strip_suffix("::__here")
        .unwrap_or(marker_type_name);
    while let Some(stripped) = path.strip_suffix("::{{closure}}") {
        path = stripped;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_location() {
        let loc = LocationInfo::unavailable();
        assert_eq!(loc.file_name(), "??");
        assert_eq!(loc.line_number(), -1);
        assert_eq!(loc.class_name(), "??");
        assert_eq!(loc.method_name(), "??");
        assert!(!loc.is_available());
    }

    #[test]
    fn test_parse_qualified_signature() {
        let loc = LocationInfo::new("server.cpp", "void net::Server::accept(int, char*)", 42);
        assert_eq!(loc.class_name(), "net::Server");
        assert_eq!(loc.method_name(), "accept");
        assert_eq!(loc.line_number(), 42);
    }

    #[test]
    fn test_parse_signature_with_template_return_type() {
        let loc = LocationInfo::new("a.cpp", "std::map<int, int> Cache::load(const Key&)", 1);
        assert_eq!(loc.class_name(), "Cache");
        assert_eq!(loc.method_name(), "load");
    }

    #[test]
    fn test_parse_free_function() {
        let loc = LocationInfo::new("main.cpp", "int main(int, char**)", 7);
        assert_eq!(loc.class_name(), "??");
        assert_eq!(loc.method_name(), "main");
    }

    #[test]
    fn test_parse_rust_path() {
        let loc = LocationInfo::new("src/lib.rs", "my_app::worker::Pool::spawn", 3);
        assert_eq!(loc.class_name(), "my_app::worker::Pool");
        assert_eq!(loc.method_name(), "spawn");
    }

    #[test]
    fn test_function_path_strips_marker_and_closures() {
        assert_eq!(function_path("app::run::__here"), "app::run");
        assert_eq!(
            function_path("app::run::{{closure}}::{{closure}}::__here"),
            "app::run"
        );
    }

    #[test]
    fn test_location_macro() {
        let loc = crate::location!();
        assert!(loc.file_name().ends_with("location.rs"));
        assert!(loc.line_number() > 0);
        assert_eq!(loc.method_name(), "test_location_macro");
    }
}
