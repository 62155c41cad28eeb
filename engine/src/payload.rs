//! Canonical desired-state payloads.
//!
//! A [`Payload`] is what the engine compares against the remote record and,
//! when needed, writes. It is rebuilt for every invocation and never cached.
//!
//! # Stage rules
//!
//! | field         | `merged`                 | `override`                  | `absent` / `gathered` |
//! |---------------|--------------------------|-----------------------------|-----------------------|
//! | `name`        | always                   | always                      | always                |
//! | `slug`        | only if given            | given, else derived         | only if given         |
//! | `description` | only if given            | always (`""` if not given)  | never                 |
//! | `tags`        | only if given            | always (empty if not given) | never                 |
//!
//! A given slug is normalized with [`slugify`]. A slug that normalizes to the
//! empty string counts as not given.

use crate::{
    error::Result, slugify, Changes, FieldSet, ManagedField, ManufacturerInput, RecordId, Stage,
    TagApi, TagResolver, TagSet,
};
use serde::Serialize;

/// Canonical desired state of one manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resolved tag identifiers, never names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagSet>,
    /// Lookup pin; never written to the remote record
    #[serde(skip)]
    pub id: Option<RecordId>,
    /// Fields the raw input supplied
    #[serde(skip)]
    supplied: FieldSet,
}

impl Payload {
    /// Assemble a payload from input and already-resolved tags.
    ///
    /// `resolved_tags` is only consulted when the stage rules include tags;
    /// `None` there means the input listed no tags.
    pub fn assemble(
        input: &ManufacturerInput,
        stage: Stage,
        resolved_tags: Option<TagSet>,
    ) -> Self {
        let explicit_slug = input.slug.as_deref().map(slugify).filter(|s| !s.is_empty());
        let slug = match explicit_slug {
            Some(slug) => Some(slug),
            None if stage == Stage::Override => derive_slug(&input.name),
            None => None,
        };

        let description = stage
            .includes_optional(input.description.is_some())
            .then(|| input.description.clone().unwrap_or_default());

        let tags = stage
            .includes_optional(input.tags.is_some())
            .then(|| resolved_tags.unwrap_or_default());

        Self {
            name: input.name.clone(),
            slug,
            description,
            tags,
            id: input.id,
            supplied: input.supplied_fields(),
        }
    }

    /// Managed fields present in this payload.
    pub fn fields(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        fields.insert(ManagedField::Name);
        if self.slug.is_some() {
            fields.insert(ManagedField::Slug);
        }
        if self.description.is_some() {
            fields.insert(ManagedField::Description);
        }
        if self.tags.is_some() {
            fields.insert(ManagedField::Tags);
        }
        fields
    }

    /// Whether the raw input supplied this field explicitly.
    pub fn supplies(&self, field: ManagedField) -> bool {
        self.supplied.contains(&field)
    }

    /// Derive the slug from the name if none is set yet.
    ///
    /// Used on the create path, where the remote system needs a slug. Leaves
    /// the payload untouched when the name has no usable slug.
    pub fn ensure_slug(&mut self) {
        if self.slug.is_none() {
            self.slug = derive_slug(&self.name);
        }
    }

    /// The whole payload as a change set, for force-writes.
    pub fn to_changes(&self) -> Changes {
        Changes {
            name: Some(self.name.clone()),
            slug: self.slug.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
        }
    }
}

fn derive_slug(name: &str) -> Option<String> {
    Some(slugify(name)).filter(|s| !s.is_empty())
}

/// Builds payloads, resolving tag names on the way.
///
/// Talks to the tag collaborator only; never to the record lookup.
pub struct PayloadBuilder<'a, T: ?Sized> {
    tags: TagResolver<'a, T>,
}

impl<'a, T: TagApi + ?Sized> PayloadBuilder<'a, T> {
    pub fn new(tags: &'a T) -> Self {
        Self {
            tags: TagResolver::new(tags),
        }
    }

    /// Build the payload for `input` under `stage`.
    ///
    /// Tags are only resolved when the stage rules include them, so an
    /// unknown tag name fails `merged`/`override` but never `absent` or
    /// `gathered`.
    pub async fn build(&self, input: &ManufacturerInput, stage: Stage) -> Result<Payload> {
        let resolved = if stage.includes_optional(input.tags.is_some()) {
            let names = input.tags.as_deref().unwrap_or_default();
            Some(self.tags.resolve(names).await?)
        } else {
            None
        };
        Ok(Payload::assemble(input, stage, resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, MemoryInventory, TagRef};
    use serde_json::json;

    fn ids(values: &[u64]) -> TagSet {
        values.iter().copied().collect()
    }

    #[test]
    fn merged_without_optionals() {
        let input = ManufacturerInput::new("Cisco");
        let payload = Payload::assemble(&input, Stage::Merged, None);

        assert_eq!(payload.name, "Cisco");
        assert_eq!(payload.slug, None);
        assert_eq!(payload.description, None);
        assert_eq!(payload.tags, None);
        assert_eq!(payload.fields().len(), 1);
    }

    #[test]
    fn merged_keeps_supplied_optionals() {
        let input = ManufacturerInput::new("Cisco")
            .with_description("Cisco Systems")
            .with_tags(["networking"]);
        let payload = Payload::assemble(&input, Stage::Merged, Some(ids(&[7])));

        assert_eq!(payload.description.as_deref(), Some("Cisco Systems"));
        assert_eq!(payload.tags, Some(ids(&[7])));
        assert!(payload.supplies(ManagedField::Description));
        assert!(payload.supplies(ManagedField::Tags));
    }

    #[test]
    fn explicit_slug_is_normalized() {
        let input = ManufacturerInput::new("Cisco").with_slug("Cisco Systems");
        let payload = Payload::assemble(&input, Stage::Merged, None);
        assert_eq!(payload.slug.as_deref(), Some("cisco-systems"));
    }

    #[test]
    fn override_fills_every_field() {
        let input = ManufacturerInput::new("Café Networks");
        let payload = Payload::assemble(&input, Stage::Override, None);

        assert_eq!(payload.slug.as_deref(), Some("cafe-networks"));
        assert_eq!(payload.description.as_deref(), Some(""));
        assert_eq!(payload.tags, Some(TagSet::new()));
        assert!(!payload.supplies(ManagedField::Description));
    }

    #[test]
    fn unusable_slug_is_omitted() {
        let input = ManufacturerInput::new("!!!").with_slug("???");
        let payload = Payload::assemble(&input, Stage::Override, None);
        assert_eq!(payload.slug, None);
    }

    #[test]
    fn non_writing_stages_carry_identity_only() {
        let input = ManufacturerInput::new("Cisco")
            .with_slug("cisco")
            .with_description("x")
            .with_tags(["networking"]);
        for stage in [Stage::Absent, Stage::Gathered] {
            let payload = Payload::assemble(&input, stage, None);
            assert_eq!(payload.slug.as_deref(), Some("cisco"));
            assert_eq!(payload.description, None);
            assert_eq!(payload.tags, None);
        }
    }

    #[test]
    fn ensure_slug_derives_from_name() {
        let input = ManufacturerInput::new("Palo Alto Networks");
        let mut payload = Payload::assemble(&input, Stage::Merged, None);
        payload.ensure_slug();
        assert_eq!(payload.slug.as_deref(), Some("palo-alto-networks"));
    }

    #[test]
    fn id_pin_is_never_serialized() {
        let input = ManufacturerInput::new("Juniper").with_id(42).with_tags(["networking"]);
        let payload = Payload::assemble(&input, Stage::Merged, Some(ids(&[7])));

        assert_eq!(payload.id, Some(42));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"name": "Juniper", "tags": [7]})
        );
    }

    #[test]
    fn to_changes_is_full_payload() {
        let input = ManufacturerInput::new("Arista");
        let payload = Payload::assemble(&input, Stage::Override, None);
        let changes = payload.to_changes();

        assert_eq!(changes.fields().len(), 4);
        assert_eq!(changes.slug.as_deref(), Some("arista"));
    }

    #[tokio::test]
    async fn builder_resolves_tags() {
        let inventory = MemoryInventory::new().with_tag(TagRef::new(7, "Networking", "networking"));
        let input = ManufacturerInput::new("Juniper").with_tags(["networking"]);

        let payload = PayloadBuilder::new(&inventory)
            .build(&input, Stage::Merged)
            .await
            .unwrap();
        assert_eq!(payload.tags, Some(ids(&[7])));
    }

    #[tokio::test]
    async fn builder_skips_tags_when_stage_excludes_them() {
        let inventory = MemoryInventory::new();
        let input = ManufacturerInput::new("Juniper").with_tags(["unknown"]);

        let payload = PayloadBuilder::new(&inventory)
            .build(&input, Stage::Absent)
            .await
            .unwrap();
        assert_eq!(payload.tags, None);
    }

    #[tokio::test]
    async fn builder_propagates_missing_tag() {
        let inventory = MemoryInventory::new();
        let input = ManufacturerInput::new("Juniper").with_tags(["unknown"]);

        let err = PayloadBuilder::new(&inventory)
            .build(&input, Stage::Override)
            .await
            .unwrap_err();
        assert_eq!(err, Error::TagNotFound("unknown".into()));
    }
}
