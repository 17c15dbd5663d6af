use std::sync::Arc;

use parking_lot::RwLock;

/// The single container views are mounted into.
///
/// Holds markup text; fragment markup is trusted same-origin content and is
/// stored verbatim.
#[derive(Clone, Default)]
pub struct Mount {
    markup: Arc<RwLock<String>>,
}

impl Mount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, markup: impl Into<String>) {
        *self.markup.write() = markup.into();
    }

    pub fn append(&self, markup: &str) {
        self.markup.write().push_str(markup);
    }

    pub fn markup(&self) -> String {
        self.markup.read().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.markup.read().contains(needle)
    }

    /// Replace the body of `<section id="{id}">`. Returns false when the
    /// section is not mounted. Sections must not nest.
    pub fn replace_section(&self, id: &str, inner: &str) -> bool {
        let open = format!(r#"<section id="{id}">"#);
        let mut markup = self.markup.write();
        let Some(start) = markup.find(&open).map(|at| at + open.len()) else {
            return false;
        };
        let Some(len) = markup[start..].find("</section>") else {
            return false;
        };
        markup.replace_range(start..start + len, inner);
        true
    }
}

/// Wrap `inner` in a section that [`Mount::replace_section`] can address.
pub fn section(id: &str, inner: &str) -> String {
    format!(r#"<section id="{id}">{inner}</section>"#)
}
