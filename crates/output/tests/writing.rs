use std::{fs, path::Path};

use ndarray::array;
use tally_core::{Image, ItemKind, PixelType, TextWriter, WriteError};
use tally_output::{
    ActorOutput, ContainerError, DataItemContainer, OutputError, OutputPolicy, Which,
    layout::{ARITHMETIC_WITH_SQUARED, DOUBLE_ARRAY, QUOTIENT_IMAGE},
};

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn only_flagged_slots_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut output = ActorOutput::new("counts", &DOUBLE_ARRAY);
    output.set_output_path(dir.path().join("counts.txt"));
    output.set_write_to_disk("second", false).unwrap();

    output
        .store_data(0, [array![1.0, 2.0], array![3.0, 4.0]])
        .unwrap();
    output.end_of_run(0).unwrap();

    let written = output.write_data(Which::Merged, &TextWriter::new()).unwrap();

    assert_eq!(written, [dir.path().join("counts_first.txt")]);
    assert_eq!(file_names(dir.path()), ["counts_first.txt"]);
    let text = fs::read_to_string(&written[0]).unwrap();
    assert_eq!(text, "# shape: [2]\n1\n2\n");
}

#[test]
fn worker_merges_keep_the_write_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut output = ActorOutput::new("counts", &DOUBLE_ARRAY);
    output.set_output_path(dir.path().join("counts.txt"));
    output.set_write_to_disk("second", false).unwrap();

    let worker = DataItemContainer::from_data(&DOUBLE_ARRAY, [array![1.0], array![2.0]]).unwrap();
    output.merge_into_merged_data(&worker).unwrap();

    let written = output.write_data(Which::Merged, &TextWriter::new()).unwrap();
    assert_eq!(written, [dir.path().join("counts_first.txt")]);
    assert_eq!(file_names(dir.path()), ["counts_first.txt"]);
}

#[test]
fn runs_are_written_next_to_merged_data() {
    let dir = tempfile::tempdir().unwrap();
    let policy = OutputPolicy {
        keep_data_per_run: true,
        ..OutputPolicy::default()
    };
    let mut output = ActorOutput::new("edep", &ARITHMETIC_WITH_SQUARED).with_policy(policy);
    output.set_output_path(dir.path().join("edep.txt"));
    output.set_write_to_disk("variance", true).unwrap();

    for run in 0..2 {
        output.store_data(run, [2.0, 5.0]).unwrap();
        output
            .get_data_container_mut(Which::Run(run))
            .unwrap()
            .set_number_of_samples(4);
    }
    output.end_of_simulation().unwrap();

    output.write_data(Which::All, &TextWriter::new()).unwrap();

    assert_eq!(
        file_names(dir.path()),
        [
            "edep.txt",
            "edep_run0000.txt",
            "edep_run0000_variance.txt",
            "edep_run0001.txt",
            "edep_run0001_variance.txt",
            "edep_variance.txt",
        ]
    );
    let merged = fs::read_to_string(dir.path().join("edep.txt")).unwrap();
    assert_eq!(merged, "# shape: []\n# number_of_samples: 8\n4\n");
}

#[test]
fn unsupported_items_are_skipped_in_bulk_writes() {
    let dir = tempfile::tempdir().unwrap();
    let image = Image::create_empty_image([2, 2, 2], [1.0; 3], [0.0; 3], PixelType::Float32, 1.0);
    let mut output = ActorOutput::new("let", &QUOTIENT_IMAGE);
    output.set_output_path(dir.path().join("let.mhd"));
    output.store_data(0, [image.clone(), image]).unwrap();
    output.end_of_run(0).unwrap();

    let written = output.write_data(Which::Merged, &TextWriter::new()).unwrap();
    assert!(written.is_empty());

    let merged = output.get_data_container(Which::Merged).unwrap();
    let err = merged
        .write(
            &dir.path().join("let.mhd"),
            Some("quotient".into()),
            &TextWriter::new(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::Write(WriteError::NotImplemented {
            kind: ItemKind::Image
        })
    ));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn writes_follow_the_policy() {
    let dir = tempfile::tempdir().unwrap();
    let policy = OutputPolicy {
        write_to_disk: false,
        ..OutputPolicy::default()
    };
    let mut output = ActorOutput::new("counts", &DOUBLE_ARRAY).with_policy(policy);
    output.set_output_path(dir.path().join("counts.txt"));
    output.store_data(0, [array![1.0], array![2.0]]).unwrap();
    output.end_of_run(0).unwrap();

    let written = output
        .write_data_if_requested(Which::Merged, &TextWriter::new())
        .unwrap();
    assert!(written.is_empty());
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn writing_needs_a_path_and_data() {
    let mut output = ActorOutput::new("counts", &DOUBLE_ARRAY);
    output.store_data(0, [array![1.0], array![2.0]]).unwrap();
    output.end_of_run(0).unwrap();

    assert!(matches!(
        output.write_data(Which::Merged, &TextWriter::new()),
        Err(OutputError::NoOutputPath)
    ));

    let fresh = ActorOutput::new("counts", &DOUBLE_ARRAY);
    assert!(matches!(
        fresh.write_data(Which::Merged, &TextWriter::new()),
        Err(OutputError::NoMergedData)
    ));
}
