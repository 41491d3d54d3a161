macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub const HEALTH: &str = v1_path!("/health");

    pub mod sync {
        pub const RECONCILE: &str = v1_path!("/sync/reconcile");
    }

    pub mod admin {
        pub const RECONCILE: &str = v1_path!("/admin/reconcile");
        pub const BACKFILL: &str = v1_path!("/admin/backfill");
        pub const AUDIT: &str = v1_path!("/admin/audit");
    }

    pub mod cleanings {
        pub const CANCEL: &str = v1_path!("/cleanings/{id}/cancel");
        pub const MOVE: &str = v1_path!("/cleanings/{id}/move");
        pub const OPERATORS: &str = v1_path!("/cleanings/{id}/operators");
        pub const OPERATOR: &str = v1_path!("/cleanings/{id}/operators/{operator_id}");
        pub const SUGGESTIONS: &str = v1_path!("/cleanings/{id}/suggestions");
    }
}

pub mod utils {
    /// Fill a `{param}` placeholder in a route template.
    pub fn replace_param(template: &str, param: &str, value: impl AsRef<str>) -> String {
        template.replace(param, value.as_ref())
    }

    /// Route template relative to the `/api/v1` nest.
    pub fn relative(path: &'static str) -> &'static str {
        path.strip_prefix(super::v1::ROOT).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_drop_the_version_prefix() {
        assert_eq!(utils::relative(v1::admin::AUDIT), "/admin/audit");
        assert_eq!(utils::relative(v1::HEALTH), "/health");
        assert_eq!(utils::relative("/elsewhere"), "/elsewhere");
        assert_eq!(
            utils::replace_param(v1::cleanings::CANCEL, "{id}", "abc"),
            "/api/v1/cleanings/abc/cancel"
        );
    }
}
