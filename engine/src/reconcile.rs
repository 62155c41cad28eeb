//! Reconciliation of declared manufacturers against the remote inventory.
//!
//! # Algorithm
//!
//! For every item:
//!
//! 1. Build the payload and resolve the existing record concurrently
//! 2. Plan an [`Action`] from stage, payload and record (pure)
//! 3. Perform the action, or describe it when simulating
//! 4. Report the result as an [`Outcome`]
//!
//! Errors never escape an item: each one becomes a failed [`Outcome`]. A
//! simulated run issues the same reads as a real run and classifies the
//! item identically, but performs no write.

use crate::{
    error::Result, Action, Changes, Error, ExistingRecord, LookupResolver, ManufacturerApi,
    ManufacturerInput, PayloadBuilder, Stage, TagApi,
};
use futures::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Options for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    /// Check mode: plan everything, write nothing
    pub simulate: bool,
    /// Maximum number of items reconciled at once (at least 1)
    pub concurrency: usize,
    /// Stop starting new items after the first failure
    pub fail_fast: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            simulate: false,
            concurrency: 1,
            fail_fast: false,
        }
    }
}

/// Result of reconciling one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub changed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub msg: String,
    /// The resulting record, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<ExistingRecord>,
    /// Field values written, or that would be written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<Changes>,
    /// Error kind, see [`Error::kind`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw error detail from the remote system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Outcome {
    fn new(changed: bool, msg: String) -> Self {
        Self {
            changed,
            failed: false,
            msg,
            manufacturer: None,
            updates: None,
            error: None,
            details: None,
        }
    }

    pub fn changed(msg: impl Into<String>) -> Self {
        Self::new(true, msg.into())
    }

    pub fn unchanged(msg: impl Into<String>) -> Self {
        Self::new(false, msg.into())
    }

    pub fn failure(msg: impl Into<String>, error: &Error) -> Self {
        Self {
            failed: true,
            error: Some(error.kind().to_string()),
            details: error.detail().cloned(),
            ..Self::new(false, msg.into())
        }
    }

    pub fn with_manufacturer(mut self, record: ExistingRecord) -> Self {
        self.manufacturer = Some(record);
        self
    }

    pub fn with_updates(mut self, updates: Changes) -> Self {
        self.updates = Some(updates);
        self
    }
}

/// Aggregate result of a batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// At least one item changed (or would change)
    pub changed: bool,
    /// At least one item failed
    pub failed: bool,
    pub results: Vec<Outcome>,
}

impl BatchResult {
    pub fn from_outcomes(results: Vec<Outcome>) -> Self {
        Self {
            changed: results.iter().any(|o| o.changed),
            failed: results.iter().any(|o| o.failed),
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.results.iter().filter(|o| o.failed)
    }
}

/// Drives items through the pipeline against a pair of collaborators.
pub struct Reconciler<'a, M: ?Sized, T: ?Sized> {
    records: &'a M,
    tags: &'a T,
}

impl<'a, M, T> Reconciler<'a, M, T>
where
    M: ManufacturerApi + ?Sized,
    T: TagApi + ?Sized,
{
    pub fn new(records: &'a M, tags: &'a T) -> Self {
        Self { records, tags }
    }

    /// Decide what to do for one item. Reads only.
    pub async fn plan(&self, input: &ManufacturerInput, stage: Stage) -> Result<Action> {
        let builder = PayloadBuilder::new(self.tags);
        let resolver = LookupResolver::new(self.records);
        let (payload, existing) = futures::try_join!(
            builder.build(input, stage),
            resolver.resolve(input, stage)
        )?;
        Action::plan(input, stage, payload, existing)
    }

    /// Reconcile one item.
    pub async fn reconcile(
        &self,
        input: &ManufacturerInput,
        stage: Stage,
        simulate: bool,
    ) -> Outcome {
        match self.plan(input, stage).await {
            Ok(action) => {
                if simulate && action.is_write() {
                    info!(
                        name = %input.name,
                        %stage,
                        action = action.name(),
                        "check mode, write skipped"
                    );
                } else {
                    debug!(name = %input.name, %stage, action = action.name(), "planned");
                }
                self.execute(action, simulate).await
            }
            Err(err) => {
                warn!(
                    name = %input.name,
                    %stage,
                    kind = err.kind(),
                    error = %err,
                    "reconciliation failed"
                );
                Outcome::failure(err.to_string(), &err)
            }
        }
    }

    /// Perform a planned action. With `simulate`, only describe it.
    pub async fn execute(&self, action: Action, simulate: bool) -> Outcome {
        match action {
            Action::Create(payload) => {
                if simulate {
                    return Outcome::changed(format!(
                        "Manufacturer '{}' would be created.",
                        payload.name
                    ));
                }
                match self.records.create(&payload).await {
                    Ok(created) => {
                        info!(id = created.id, name = %created.name, "created manufacturer");
                        Outcome::changed(format!(
                            "Manufacturer '{}' has been created.",
                            created.name
                        ))
                        .with_manufacturer(created)
                    }
                    Err(err) => write_failed("create", &payload.name, err.into()),
                }
            }
            Action::Update { target, changes } => {
                self.write_changes(target, changes, simulate, "updated").await
            }
            Action::Override { target, payload } => {
                self.write_changes(target, payload.to_changes(), simulate, "overridden")
                    .await
            }
            Action::Delete(target) => {
                if simulate {
                    return Outcome::changed(format!(
                        "Manufacturer '{}' would be deleted.",
                        target.name
                    ));
                }
                match self.records.delete(target.id).await {
                    Ok(()) => {
                        info!(id = target.id, name = %target.name, "deleted manufacturer");
                        Outcome::changed(format!(
                            "Manufacturer '{}' has been deleted.",
                            target.name
                        ))
                    }
                    Err(err) => write_failed("delete", &target.name, err.into()),
                }
            }
            Action::Unchanged(target) => {
                Outcome::unchanged(format!("No changes required for '{}'.", target.name))
                    .with_manufacturer(target)
            }
            Action::AlreadyAbsent => Outcome::unchanged("Manufacturer already absent."),
            Action::Report(target) => {
                Outcome::unchanged(format!("Manufacturer '{}' has been gathered.", target.name))
                    .with_manufacturer(target)
            }
        }
    }

    async fn write_changes(
        &self,
        target: ExistingRecord,
        changes: Changes,
        simulate: bool,
        verb: &str,
    ) -> Outcome {
        let name = changes.name.clone().unwrap_or_else(|| target.name.clone());
        if simulate {
            return Outcome::changed(format!("Manufacturer '{name}' would be {verb}."))
                .with_updates(changes);
        }

        match self.records.update(target.id, &changes).await {
            Ok(acknowledged) => {
                info!(id = target.id, %name, fields = ?changes.fields(), "{verb} manufacturer");
                let mut outcome =
                    Outcome::changed(format!("Manufacturer '{name}' has been {verb}."));
                if acknowledged {
                    let mut record = target;
                    record.apply(&changes);
                    outcome = outcome.with_manufacturer(record);
                }
                outcome.with_updates(changes)
            }
            Err(err) => write_failed("update", &name, err.into()),
        }
    }

    /// Reconcile a batch of items, reporting outcomes in input order.
    ///
    /// Up to `options.concurrency` items are in flight at once. With
    /// `fail_fast`, the first failed outcome stops new items from starting;
    /// items already in flight still complete and are reported.
    pub async fn run_batch(
        &self,
        items: &[ManufacturerInput],
        stage: Stage,
        options: &BatchOptions,
    ) -> BatchResult {
        let limit = options.concurrency.max(1);
        let mut pending = items.iter();
        let mut in_flight = FuturesOrdered::new();
        let mut results = Vec::with_capacity(items.len());
        let mut halted = false;

        loop {
            while !halted && in_flight.len() < limit {
                match pending.next() {
                    Some(item) => {
                        in_flight.push_back(self.reconcile(item, stage, options.simulate))
                    }
                    None => break,
                }
            }

            let Some(outcome) = in_flight.next().await else {
                break;
            };
            if outcome.failed && options.fail_fast && !halted {
                warn!(
                    completed = results.len() + 1,
                    total = items.len(),
                    "halting batch after failure"
                );
                halted = true;
            }
            results.push(outcome);
        }

        let batch = BatchResult::from_outcomes(results);
        info!(
            %stage,
            items = batch.results.len(),
            changed = batch.changed,
            failed = batch.failed,
            simulate = options.simulate,
            "batch complete"
        );
        batch
    }
}

fn write_failed(verb: &str, name: &str, err: Error) -> Outcome {
    warn!(%name, error = %err, "failed to {verb} manufacturer");
    Outcome::failure(
        format!("Failed to {verb} manufacturer '{name}': {err}"),
        &err,
    )
}
