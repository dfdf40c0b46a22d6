//! Active tab of the settings page
//!
//! The page shows one section form at a time. The choice lives on the
//! client: the page script writes it to local storage and to a cookie when
//! a tab is clicked, and the server reads the cookie (or a `tab` query
//! parameter) when rendering.

/// Local storage key written by the page script
pub const ACTIVE_TAB_STORAGE_KEY: &str = "activetab";

/// Cookie mirroring the local storage entry for server-side rendering
pub const ACTIVE_TAB_COOKIE: &str = "settings_page_activetab";

/// Client-persisted pointer to the last selected tab
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabState {
    active: Option<String>,
}

impl TabState {
    /// Accepts ids with or without the leading `#` the tab links carry
    pub fn new(active: Option<String>) -> Self {
        let active = active
            .map(|id| id.trim().trim_start_matches('#').to_string())
            .filter(|id| !id.is_empty());
        Self { active }
    }

    /// Read the active tab from a `Cookie` request header.
    ///
    /// The page script stores the value with `encodeURIComponent`; a value
    /// that does not decode to UTF-8 is taken as is.
    pub fn from_cookie_header(header: &str) -> Self {
        let value = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == ACTIVE_TAB_COOKIE)
            .map(|(_, value)| {
                urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string())
            });
        Self::new(value)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Record a tab click
    pub fn select(&mut self, section_id: impl Into<String>) {
        *self = Self::new(Some(section_id.into()));
    }

    /// Tab shown first: the stored one when it names a section, else the first section
    pub fn initial<'a, I>(&self, section_ids: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ids = section_ids.into_iter().peekable();
        let first = ids.peek().copied();
        match self.active.as_deref() {
            Some(active) => ids.find(|id| *id == active).or(first),
            None => first,
        }
    }
}
