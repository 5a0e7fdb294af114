/// Submitted form fields in arrival order.
///
/// Built from `axum::Form<Vec<(String, String)>>` so repeated keys such as
/// `course-requirements[]` keep every value instead of the last one.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted under `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value under `name`, or an empty string when the field is absent.
    pub fn value_or_empty(&self, name: &str) -> String {
        self.value(name).unwrap_or_default().to_string()
    }

    /// Every value submitted under `name`, in order.
    pub fn values(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

impl From<Vec<(String, String)>> for FormValues {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}
