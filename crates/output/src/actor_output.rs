//! Per-run storage, merging and writing of one scored quantity.

mod policy;
mod which;

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use tally_core::{ItemError, Writer, insert_suffix_before_extension};

use crate::{
    ContainerData, ContainerError, DataItemContainer, ItemKey, Layout, OutputError, SlotValue,
};

pub use policy::OutputPolicy;
pub use which::Which;

/// Collects the containers of one quantity across runs.
///
/// Each run stores exactly one container. When the run ends, the container is
/// folded into the merged container (with `auto_merge`) and released (unless
/// `keep_data_per_run`). Every run is folded at most once, so calling
/// [`ActorOutput::end_of_run`] again, or [`ActorOutput::end_of_simulation`]
/// afterwards, never counts a run twice.
#[derive(Debug, Clone)]
pub struct ActorOutput {
    name: String,
    policy: OutputPolicy,
    template: DataItemContainer,
    data_per_run: BTreeMap<usize, Option<DataItemContainer>>,
    merged_runs: BTreeSet<usize>,
    merged_data: Option<DataItemContainer>,
    output_path: Option<PathBuf>,
}

impl ActorOutput {
    /// Creates an output with the default [`OutputPolicy`].
    #[must_use]
    pub fn new(name: impl Into<String>, layout: &'static Layout) -> Self {
        Self {
            name: name.into(),
            policy: OutputPolicy::default(),
            template: DataItemContainer::new(layout),
            data_per_run: BTreeMap::new(),
            merged_runs: BTreeSet::new(),
            merged_data: None,
            output_path: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn layout(&self) -> &'static Layout {
        self.template.layout()
    }

    #[must_use]
    pub fn policy(&self) -> &OutputPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut OutputPolicy {
        &mut self.policy
    }

    /// Stores the data scored in one run.
    ///
    /// # Errors
    ///
    /// [`OutputError::DuplicateRun`] if the run already has a container, even
    /// one released after merging, or any error from
    /// [`DataItemContainer::set_data`].
    pub fn store_data<I>(&mut self, run_index: usize, values: I) -> Result<(), OutputError>
    where
        I: IntoIterator,
        I::Item: Into<SlotValue>,
    {
        self.ensure_new_run(run_index)?;

        let mut container = self.template.clone();
        container.set_data(values)?;
        self.data_per_run.insert(run_index, Some(container));
        Ok(())
    }

    /// Stores a container built elsewhere for one run.
    ///
    /// The container takes over the item write settings of this output.
    ///
    /// # Errors
    ///
    /// - [`OutputError::DuplicateRun`] as for [`ActorOutput::store_data`].
    /// - [`ContainerError::LayoutMismatch`].
    /// - [`ItemError::EmptyData`] if any slot of the container is empty.
    pub fn store_container(
        &mut self,
        run_index: usize,
        mut container: DataItemContainer,
    ) -> Result<(), OutputError> {
        self.ensure_new_run(run_index)?;
        self.template.ensure_same_layout(&container)?;
        container.ensure_populated()?;

        container.set_write_config(self.template.write_config().clone());
        self.data_per_run.insert(run_index, Some(container));
        Ok(())
    }

    fn ensure_new_run(&self, run_index: usize) -> Result<(), OutputError> {
        if self.data_per_run.contains_key(&run_index) {
            Err(OutputError::DuplicateRun(run_index))
        } else {
            Ok(())
        }
    }

    /// Folds and releases the container of a finished run.
    ///
    /// Does nothing if the policy keeps data per run, or if the run has no
    /// container left.
    ///
    /// # Errors
    ///
    /// Any error raised while merging; the run container is kept in that case.
    pub fn end_of_run(&mut self, run_index: usize) -> Result<(), OutputError> {
        if self.policy.keep_data_per_run {
            return Ok(());
        }
        let Some(Some(container)) = self.data_per_run.get(&run_index) else {
            return Ok(());
        };

        if self.policy.auto_merge && !self.merged_runs.contains(&run_index) {
            fold(&mut self.merged_data, container)?;
            self.merged_runs.insert(run_index);
            tracing::debug!(output = %self.name, run = run_index, "Merged run");
        }

        self.data_per_run.insert(run_index, None);
        tracing::debug!(output = %self.name, run = run_index, "Released run data");
        Ok(())
    }

    /// Folds every run not merged yet, then releases run data unless the
    /// policy keeps it.
    ///
    /// Runs are folded in ascending run index order.
    ///
    /// # Errors
    ///
    /// Any error raised while merging. Runs folded before the error stay
    /// merged and no run data is released.
    pub fn end_of_simulation(&mut self) -> Result<(), OutputError> {
        if self.policy.auto_merge {
            for (&run_index, container) in &self.data_per_run {
                let Some(container) = container else {
                    continue;
                };
                if self.merged_runs.contains(&run_index) {
                    continue;
                }
                fold(&mut self.merged_data, container)?;
                self.merged_runs.insert(run_index);
                tracing::debug!(output = %self.name, run = run_index, "Merged run");
            }
        }

        if !self.policy.keep_data_per_run {
            for entry in self.data_per_run.values_mut() {
                *entry = None;
            }
            tracing::debug!(output = %self.name, "Released all run data");
        }
        Ok(())
    }

    /// Folds an external container, e.g. one merged by another worker, into
    /// the merged container.
    ///
    /// # Errors
    ///
    /// [`ContainerError::LayoutMismatch`], or any error raised while merging.
    pub fn merge_into_merged_data(&mut self, container: &DataItemContainer) -> Result<(), OutputError> {
        self.template.ensure_same_layout(container)?;
        fold(&mut self.merged_data, container)?;
        if let Some(merged) = self.merged_data.as_mut() {
            merged.set_write_config(self.template.write_config().clone());
        }
        tracing::debug!(output = %self.name, "Merged external data");
        Ok(())
    }

    /// Returns the merged container or the container of one run.
    ///
    /// # Errors
    ///
    /// - [`OutputError::NoMergedData`] if nothing was merged yet.
    /// - [`OutputError::NoDataForRun`] if the run is unknown or released.
    /// - [`OutputError::InvalidWhich`] for [`Which::All`] and
    ///   [`Which::AllRuns`].
    pub fn get_data_container(&self, which: Which) -> Result<&DataItemContainer, OutputError> {
        match which {
            Which::Merged => self.merged_data.as_ref().ok_or(OutputError::NoMergedData),
            Which::Run(run_index) => self
                .data_per_run
                .get(&run_index)
                .and_then(Option::as_ref)
                .ok_or(OutputError::NoDataForRun(run_index)),
            other => Err(OutputError::InvalidWhich(other.to_string())),
        }
    }

    /// Mutable counterpart of [`ActorOutput::get_data_container`].
    ///
    /// # Errors
    ///
    /// Same as [`ActorOutput::get_data_container`].
    pub fn get_data_container_mut(
        &mut self,
        which: Which,
    ) -> Result<&mut DataItemContainer, OutputError> {
        match which {
            Which::Merged => self.merged_data.as_mut().ok_or(OutputError::NoMergedData),
            Which::Run(run_index) => self
                .data_per_run
                .get_mut(&run_index)
                .and_then(Option::as_mut)
                .ok_or(OutputError::NoDataForRun(run_index)),
            other => Err(OutputError::InvalidWhich(other.to_string())),
        }
    }

    /// Returns payloads of one container, see [`DataItemContainer::get_data`].
    ///
    /// # Errors
    ///
    /// Any error from [`ActorOutput::get_data_container`] or
    /// [`DataItemContainer::get_data`].
    pub fn get_data(&self, which: Which, item: Option<ItemKey>) -> Result<ContainerData, OutputError> {
        Ok(self.get_data_container(which)?.get_data(item)?)
    }

    /// Returns the payloads of every selected container.
    ///
    /// # Errors
    ///
    /// See [`ActorOutput::collect_data_with_identifiers`].
    pub fn collect_data(&self, which: Which) -> Result<Vec<ContainerData>, OutputError> {
        Ok(self
            .collect_data_with_identifiers(which)?
            .into_iter()
            .map(|(_, data)| data)
            .collect())
    }

    /// Returns the payloads of every selected container, tagged with the run
    /// or [`Which::Merged`] they come from.
    ///
    /// [`Which::AllRuns`] selects every populated run in ascending order, and
    /// [`Which::All`] adds the merged container when there is one.
    ///
    /// # Errors
    ///
    /// For a single run or the merged container, the errors of
    /// [`ActorOutput::get_data_container`].
    pub fn collect_data_with_identifiers(
        &self,
        which: Which,
    ) -> Result<Vec<(Which, ContainerData)>, OutputError> {
        self.select(which)?
            .into_iter()
            .map(|(id, container)| {
                container
                    .get_data(None)
                    .map(|data| (id, data))
                    .map_err(OutputError::from)
            })
            .collect()
    }

    fn select(&self, which: Which) -> Result<Vec<(Which, &DataItemContainer)>, OutputError> {
        Ok(match which {
            Which::Merged | Which::Run(_) => vec![(which, self.get_data_container(which)?)],
            Which::AllRuns => self.populated_runs().collect(),
            Which::All => self
                .populated_runs()
                .chain(self.merged_data.iter().map(|merged| (Which::Merged, merged)))
                .collect(),
        })
    }

    fn populated_runs(&self) -> impl Iterator<Item = (Which, &DataItemContainer)> {
        self.data_per_run.iter().filter_map(|(&run_index, container)| {
            container
                .as_ref()
                .filter(|container| container.is_populated())
                .map(|container| (Which::Run(run_index), container))
        })
    }

    /// Sets the base path that output files are derived from.
    pub fn set_output_path(&mut self, path: impl Into<PathBuf>) {
        self.output_path = Some(path.into());
    }

    /// Returns the base path of one container's files.
    ///
    /// The merged container uses the base path as-is. Run `i` inserts
    /// `run{i:04}` before the extension, so run 3 of `dose.mhd` goes to
    /// `dose_run0003.mhd`.
    ///
    /// # Errors
    ///
    /// [`OutputError::NoOutputPath`] if no path is set, or
    /// [`OutputError::InvalidWhich`] for [`Which::All`] and
    /// [`Which::AllRuns`].
    pub fn get_output_path(&self, which: Which) -> Result<PathBuf, OutputError> {
        let base = self.output_path.as_deref().ok_or(OutputError::NoOutputPath)?;
        match which {
            Which::Merged => Ok(base.to_path_buf()),
            Which::Run(run_index) => Ok(run_path(base, run_index)),
            other => Err(OutputError::InvalidWhich(other.to_string())),
        }
    }

    /// Returns the file one item of one container is written to.
    ///
    /// # Errors
    ///
    /// Any error from [`ActorOutput::get_output_path`], or
    /// [`ContainerError::UnknownSlot`].
    pub fn get_output_path_to_item(
        &self,
        which: Which,
        item: impl Into<ItemKey>,
    ) -> Result<PathBuf, OutputError> {
        let base = self.get_output_path(which)?;
        Ok(self.template.get_output_path_to_item(&base, item)?)
    }

    /// Writes every selected container to its output path.
    ///
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// [`OutputError::NoOutputPath`], the selection errors of
    /// [`ActorOutput::get_data_container`], or any container write error.
    pub fn write_data(&self, which: Which, writer: &dyn Writer) -> Result<Vec<PathBuf>, OutputError> {
        let mut written = Vec::new();
        for (id, container) in self.select(which)? {
            let path = self.get_output_path(id)?;
            written.extend(container.write(&path, None, writer)?);
        }
        Ok(written)
    }

    /// Writes like [`ActorOutput::write_data`] if the policy asks for it.
    ///
    /// # Errors
    ///
    /// Same as [`ActorOutput::write_data`].
    pub fn write_data_if_requested(
        &self,
        which: Which,
        writer: &dyn Writer,
    ) -> Result<Vec<PathBuf>, OutputError> {
        if self.policy.write_to_disk {
            self.write_data(which, writer)
        } else {
            Ok(Vec::new())
        }
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_write_to_disk(&self, item: impl Into<ItemKey>) -> Result<bool, OutputError> {
        Ok(self.template.get_write_to_disk(item)?)
    }

    /// Sets the write flag of an item on every container, present and future.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`]; nothing changes in that case.
    pub fn set_write_to_disk(&mut self, item: impl Into<ItemKey>, value: bool) -> Result<(), OutputError> {
        let item = item.into();
        self.update_containers(|container| container.set_write_to_disk(item.clone(), value))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_active(&self, item: impl Into<ItemKey>) -> Result<bool, OutputError> {
        Ok(self.template.get_active(item)?)
    }

    /// Activates or deactivates an item on every container, present and
    /// future.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`]; nothing changes in that case.
    pub fn set_active(&mut self, item: impl Into<ItemKey>, value: bool) -> Result<(), OutputError> {
        let item = item.into();
        self.update_containers(|container| container.set_active(item.clone(), value))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_item_suffix(&self, item: impl Into<ItemKey>) -> Result<Option<&str>, OutputError> {
        Ok(self.template.get_item_suffix(item)?)
    }

    /// Sets the file suffix of an item on every container, present and
    /// future.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`]; nothing changes in that case.
    pub fn set_item_suffix(
        &mut self,
        item: impl Into<ItemKey>,
        suffix: Option<String>,
    ) -> Result<(), OutputError> {
        let item = item.into();
        self.update_containers(|container| container.set_item_suffix(item.clone(), suffix.clone()))
    }

    // The template goes first: every container shares its layout, so a key it
    // rejects is rejected before anything is modified.
    fn update_containers(
        &mut self,
        mut update: impl FnMut(&mut DataItemContainer) -> Result<(), ContainerError>,
    ) -> Result<(), OutputError> {
        update(&mut self.template)?;
        let runs = self.data_per_run.values_mut().flatten();
        for container in runs.chain(self.merged_data.as_mut()) {
            update(container)?;
        }
        Ok(())
    }

    /// Drops all data unless the policy keeps it in memory.
    pub fn close(&mut self) {
        if self.policy.keep_data_in_memory {
            return;
        }
        self.data_per_run.clear();
        self.merged_runs.clear();
        self.merged_data = None;
        tracing::debug!(output = %self.name, "Dropped all data");
    }
}

/// Merges containers of one layout into a single container.
///
/// # Errors
///
/// [`ItemError::EmptyData`] if `containers` is empty or holds an empty
/// container, or any error raised while merging.
pub fn merge_data<'a, I>(containers: I) -> Result<DataItemContainer, ContainerError>
where
    I: IntoIterator<Item = &'a DataItemContainer>,
{
    let mut merged = None;
    for container in containers {
        fold(&mut merged, container)?;
    }
    merged.ok_or_else(|| ItemError::EmptyData.into())
}

fn fold(
    merged: &mut Option<DataItemContainer>,
    container: &DataItemContainer,
) -> Result<(), ContainerError> {
    if let Some(merged) = merged.as_mut() {
        return merged.inplace_merge_with(container);
    }
    container.ensure_populated()?;
    *merged = Some(container.clone());
    Ok(())
}

fn run_path(base: &Path, run_index: usize) -> PathBuf {
    insert_suffix_before_extension(base, &format!("run{run_index:04}"))
}
