/// A single header line: a name and its raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_raw_value(&self) -> &str {
        &self.value
    }
}

/// Represents an ordered list of headers.
/// Note that there may be multiple headers with the same name.
/// Name matching is always case-insensitive.
/// Derefs to the underlying `Vec<Header>` for mutation,
/// but provides some accessors for retrieving headers by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    headers: Vec<Header>,
}

impl std::ops::Deref for HeaderMap {
    type Target = Vec<Header>;
    fn deref(&self) -> &Vec<Header> {
        &self.headers
    }
}

impl std::ops::DerefMut for HeaderMap {
    fn deref_mut(&mut self) -> &mut Vec<Header> {
        &mut self.headers
    }
}

impl HeaderMap {
    pub fn new(headers: Vec<Header>) -> Self {
        Self { headers }
    }

    pub fn get_first(&self, name: &str) -> Option<&Header> {
        self.iter_named(name).next()
    }

    pub fn iter_named<'map, 'name>(
        &'map self,
        name: &'name str,
    ) -> impl Iterator<Item = &'map Header> + 'name
    where
        'map: 'name,
    {
        self.headers
            .iter()
            .filter(move |header| header.get_name().eq_ignore_ascii_case(name))
    }

    /// Append a header, preserving any existing values for the same name.
    pub fn add<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.headers.push(Header::new(name, value));
    }

    /// Replace all values for `name` with a single value.
    pub fn set<V: Into<String>>(&mut self, name: &str, value: V) {
        self.remove_all_named(name);
        self.headers.push(Header::new(name, value));
    }

    pub fn remove_all_named(&mut self, name: &str) {
        self.headers
            .retain(|hdr| !hdr.get_name().eq_ignore_ascii_case(name));
    }

    /// The distinct header names in lexical sort order, which is the
    /// order in which headers are serialized. The sort folds case so
    /// that case variants of the same name are merged; the stable sort
    /// means the first-added spelling is the one that survives.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.headers.iter().map(|hdr| hdr.get_name()).collect();
        names.sort_by(|a, b| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()));
        names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        names
    }
}
