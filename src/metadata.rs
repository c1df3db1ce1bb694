//! Description of a single API request.

/// A GET request relative to the client's base URL.
///
/// Paths are resolved with URL join semantics, so `users/2` against
/// `https://reqres.in/api/` becomes `https://reqres.in/api/users/2`.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    /// Path relative to the base URL.
    pub path: String,

    /// Query parameters, appended in insertion order.
    pub query_params: Vec<(String, String)>,
}

impl RequestMetadata {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query_params: Vec::new(),
        }
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((key.into(), value.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_keep_order() {
        let meta = RequestMetadata::new("users")
            .with_query_param("page", 2)
            .with_query_param("per_page", 6);

        assert_eq!(meta.path, "users");
        assert_eq!(
            meta.query_params,
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "6".to_string())
            ]
        );
    }
}
