//! Planned actions.
//!
//! Planning is the last pure step: once the payload is built and the
//! existing record is known, [`Action::plan`] decides what to do without any
//! I/O. The reconciler then performs the action, or only describes it in
//! check mode, so both paths share one decision.

use crate::{
    diff, error::Result, Changes, Criteria, Delta, Error, ExistingRecord, Lookup,
    ManufacturerInput, Payload, Stage,
};

/// What the engine will do for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a new record from the payload
    Create(Payload),
    /// Write only the differing fields
    Update {
        target: ExistingRecord,
        changes: Changes,
    },
    /// Write the whole payload, even when nothing differs
    Override {
        target: ExistingRecord,
        payload: Payload,
    },
    Delete(ExistingRecord),
    /// Existing record already matches
    Unchanged(ExistingRecord),
    /// Nothing to delete
    AlreadyAbsent,
    /// Read-only report of the matching record
    Report(ExistingRecord),
}

impl Action {
    /// Decide the action for one item.
    ///
    /// | stage      | no record                   | record, empty delta | record, non-empty delta |
    /// |------------|-----------------------------|---------------------|-------------------------|
    /// | `merged`   | create                      | unchanged           | update delta            |
    /// | `override` | create                      | override            | override                |
    /// | `absent`   | already absent              | delete              | delete                  |
    /// | `gathered` | [`Error::LookupTargetMissing`] | report           | report                  |
    ///
    /// On the create path, an identifier pin or an explicit `slug`/`name`
    /// lookup that matched nothing fails with [`Error::LookupTargetMissing`]
    /// instead of creating a duplicate. A create whose name yields no usable
    /// slug fails with [`Error::MissingSlug`].
    pub fn plan(
        input: &ManufacturerInput,
        stage: Stage,
        payload: Payload,
        existing: Option<ExistingRecord>,
    ) -> Result<Self> {
        match (stage, existing) {
            (Stage::Merged | Stage::Override, None) => Self::plan_create(input, stage, payload),
            (Stage::Merged, Some(target)) => match diff(Some(&target), &payload, stage) {
                Delta::Update(changes) if !changes.is_empty() => {
                    Ok(Action::Update { target, changes })
                }
                _ => Ok(Action::Unchanged(target)),
            },
            (Stage::Override, Some(target)) => Ok(Action::Override { target, payload }),
            (Stage::Absent, None) => Ok(Action::AlreadyAbsent),
            (Stage::Absent, Some(target)) => Ok(Action::Delete(target)),
            (Stage::Gathered, None) => Err(Error::LookupTargetMissing(
                Criteria::select(input, stage).to_string(),
            )),
            (Stage::Gathered, Some(target)) => Ok(Action::Report(target)),
        }
    }

    fn plan_create(input: &ManufacturerInput, stage: Stage, mut payload: Payload) -> Result<Self> {
        let asserted = input.id.is_some()
            || input
                .explicit_lookup()
                .is_some_and(Lookup::targets_identity);
        if asserted {
            return Err(Error::LookupTargetMissing(
                Criteria::select(input, stage).to_string(),
            ));
        }

        payload.ensure_slug();
        if payload.slug.is_none() {
            return Err(Error::MissingSlug(payload.name));
        }
        Ok(Action::Create(payload))
    }

    /// Short name of the action, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Create(_) => "create",
            Action::Update { .. } => "update",
            Action::Override { .. } => "override",
            Action::Delete(_) => "delete",
            Action::Unchanged(_) => "unchanged",
            Action::AlreadyAbsent => "already_absent",
            Action::Report(_) => "report",
        }
    }

    /// Whether performing the action calls a mutating remote endpoint.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Action::Create(_) | Action::Update { .. } | Action::Override { .. } | Action::Delete(_)
        )
    }

    /// The field values written by an update or override.
    pub fn changes(&self) -> Option<Changes> {
        match self {
            Action::Update { changes, .. } => Some(changes.clone()),
            Action::Override { payload, .. } => Some(payload.to_changes()),
            _ => None,
        }
    }
}
