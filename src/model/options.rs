/// Query options for listing objects in a bucket.
///
/// Several values can be merged with [`ListOptions::merge`]; for each field
/// the last non-empty value wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only objects whose names start with this prefix are returned.
    pub prefix: Option<String>,
    /// Groups results in a directory-like fashion: names containing the
    /// delimiter after the prefix are collapsed and left out of the listing.
    pub delimiter: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn prefix_str(&self) -> Option<&str> {
        non_empty(&self.prefix)
    }

    pub fn delimiter_str(&self) -> Option<&str> {
        non_empty(&self.delimiter)
    }

    pub fn merge<'a>(opts: impl IntoIterator<Item = &'a ListOptions>) -> ListOptions {
        let mut result = ListOptions::default();
        for opt in opts {
            if let Some(prefix) = opt.prefix_str() {
                result.prefix = Some(prefix.to_string());
            }
            if let Some(delimiter) = opt.delimiter_str() {
                result.delimiter = Some(delimiter.to_string());
            }
        }
        result
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
