//! Resolution of human-readable tag names into remote identifiers.

use crate::{error::Result, Error, TagApi, TagSet};
use tracing::debug;

/// Turns tag names into remote tag identifiers. Never creates tags.
pub struct TagResolver<'a, T: ?Sized> {
    api: &'a T,
}

impl<'a, T: TagApi + ?Sized> TagResolver<'a, T> {
    pub fn new(api: &'a T) -> Self {
        Self { api }
    }

    /// Resolve every name, slug match first, exact name match second.
    ///
    /// Aborts with [`Error::TagNotFound`] on the first name that matches
    /// neither; there is no partial resolution.
    pub async fn resolve(&self, names: &[String]) -> Result<TagSet> {
        let mut resolved = TagSet::new();
        for name in names {
            let tag = match self.api.find_tag_by_slug(name).await? {
                Some(tag) => Some(tag),
                None => self.api.find_tag_by_name(name).await?,
            };
            let tag = tag.ok_or_else(|| Error::TagNotFound(name.clone()))?;
            debug!(tag = %name, id = tag.id, "resolved tag");
            resolved.insert(tag.id);
        }
        Ok(resolved)
    }
}
