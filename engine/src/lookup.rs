//! Matching an input item to the remote record it refers to.
//!
//! # Search-field selection
//!
//! 1. An identifier pin (`input.id`) wins over everything else.
//! 2. An explicit `lookup` naming at least one managed field is used as is.
//! 3. Otherwise every stage except `merged` falls back to the managed fields
//!    present on the input itself.
//! 4. `merged` without an explicit lookup performs no search: it never
//!    silently adopts a pre-existing record.
//!
//! Among the selected fields, `slug` is searched first (unique remotely),
//! then `name` (which may match several records). Criteria naming only
//! `description` or `tags` are not searchable and resolve to no record.

use crate::{
    error::Result, slugify, Error, ExistingRecord, FieldSet, ManagedField, ManufacturerApi,
    ManufacturerInput, RecordId, Stage,
};
use tracing::debug;

/// The search the resolver will run for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// No search at all
    Skip,
    Id(RecordId),
    Slug(String),
    Name(String),
    /// Fields were selected but none of them is searchable
    Unsearchable(FieldSet),
}

impl Criteria {
    /// Select the search for `input` under `stage`. Pure.
    pub fn select(input: &ManufacturerInput, stage: Stage) -> Self {
        if let Some(id) = input.id {
            return Criteria::Id(id);
        }

        let (fields, slug, name) = match input.explicit_lookup() {
            Some(lookup) => (lookup.fields(), lookup.slug.as_deref(), lookup.name.as_deref()),
            None if stage != Stage::Merged => (
                input.supplied_fields(),
                input.slug.as_deref(),
                Some(input.name.as_str()),
            ),
            None => return Criteria::Skip,
        };

        if let Some(slug) = slug.map(slugify).filter(|s| !s.is_empty()) {
            Criteria::Slug(slug)
        } else if let Some(name) = name {
            Criteria::Name(name.to_string())
        } else {
            Criteria::Unsearchable(fields)
        }
    }
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Criteria::Skip => f.write_str("none"),
            Criteria::Id(id) => write!(f, "id={id}"),
            Criteria::Slug(slug) => write!(f, "slug={slug}"),
            Criteria::Name(name) => write!(f, "name={name}"),
            Criteria::Unsearchable(fields) => {
                let names: Vec<_> = fields.iter().map(ManagedField::as_str).collect();
                write!(f, "unsearchable fields [{}]", names.join(", "))
            }
        }
    }
}

/// Finds the existing record bound to an input item.
pub struct LookupResolver<'a, M: ?Sized> {
    api: &'a M,
}

impl<'a, M: ManufacturerApi + ?Sized> LookupResolver<'a, M> {
    pub fn new(api: &'a M) -> Self {
        Self { api }
    }

    /// Resolve `input` to at most one existing record.
    ///
    /// Fails with [`Error::AmbiguousMatch`] rather than picking among several
    /// records sharing a name.
    pub async fn resolve(
        &self,
        input: &ManufacturerInput,
        stage: Stage,
    ) -> Result<Option<ExistingRecord>> {
        let criteria = Criteria::select(input, stage);
        debug!(name = %input.name, %stage, %criteria, "resolving existing record");
        self.fetch(&criteria).await
    }

    /// Run an already-selected search.
    pub async fn fetch(&self, criteria: &Criteria) -> Result<Option<ExistingRecord>> {
        match criteria {
            Criteria::Skip | Criteria::Unsearchable(_) => Ok(None),
            Criteria::Id(id) => Ok(self.api.get_by_id(*id).await?),
            Criteria::Slug(slug) => Ok(self.api.get_by_slug(slug).await?),
            Criteria::Name(name) => {
                let mut matches = self.api.filter_by_name(name).await?;
                match matches.len() {
                    0 | 1 => Ok(matches.pop()),
                    count => Err(Error::AmbiguousMatch {
                        field: ManagedField::Name.to_string(),
                        value: name.clone(),
                        count,
                    }),
                }
            }
        }
    }
}
