//! End-to-end batch conversion behavior.

mod common;

use common::{mock_text, write_file, BrokenFactory, MockFactory};
use tempfile::tempdir;
use textra::processor::{CoreAllocation, ProcessingCoordinator, ProcessorConfig};
use textra::scanner::collect_image_files;

#[test]
fn duplicate_screenshot_produces_exactly_one_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_file(&input, "screenshot.png", b"the same screenshot bytes");
    write_file(&input, "dupescreenshot.png", b"the same screenshot bytes");
    let out = dir.path().join("out");

    let mut coordinator = ProcessingCoordinator::with_defaults();
    let factory = MockFactory::new();

    let queued = coordinator.add_files(collect_image_files(&input).unwrap());
    assert_eq!(queued, 2);

    let stats = coordinator.convert_batch(Some(&out), &factory).unwrap();
    assert_eq!(stats.queued, 2);
    assert_eq!(stats.written, 1);
    assert_eq!(stats.already_written, 1);
    assert!(stats.all_succeeded());

    // First writer wins: only one of the two names exists on disk.
    let screenshot = out.join("screenshot.txt");
    let dupe = out.join("dupescreenshot.txt");
    assert_ne!(screenshot.exists(), dupe.exists());
    assert_eq!(coordinator.cache().len(), 1);

    let written = if screenshot.exists() { screenshot } else { dupe };
    assert_eq!(
        std::fs::read_to_string(written).unwrap(),
        mock_text(b"the same screenshot bytes")
    );
}

#[test]
fn distinct_images_each_get_their_own_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_file(&input, "one.png", b"first image");
    write_file(&input, "two.jpg", b"second image");
    let out = dir.path().join("out");

    let mut coordinator = ProcessingCoordinator::with_defaults();
    let factory = MockFactory::new();
    coordinator.add_files(collect_image_files(&input).unwrap());

    let stats = coordinator.convert_batch(Some(&out), &factory).unwrap();
    assert_eq!(stats.written, 2);
    assert_eq!(stats.failed, 0);

    assert_eq!(
        std::fs::read_to_string(out.join("one.txt")).unwrap(),
        mock_text(b"first image")
    );
    assert_eq!(
        std::fs::read_to_string(out.join("two.txt")).unwrap(),
        mock_text(b"second image")
    );
}

#[test]
fn second_batch_is_idempotent() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_file(&input, "scan.png", b"pixels");
    let out = dir.path().join("out");

    let mut coordinator = ProcessingCoordinator::with_defaults();
    let factory = MockFactory::new();
    coordinator.add_files(collect_image_files(&input).unwrap());
    coordinator.convert_batch(Some(&out), &factory).unwrap();

    let entry = coordinator.cache().entries().pop().unwrap();
    let first_info = entry.read_write_info();
    assert!(first_info.written);

    // Re-queue the same path: the seen-set rejects it, the drain is a no-op.
    let requeued = coordinator.add_files(collect_image_files(&input).unwrap());
    assert_eq!(requeued, 0);
    let stats = coordinator.convert_batch(Some(&out), &factory).unwrap();
    assert_eq!(stats.queued, 0);

    // Converting the file directly again is also a no-op: the recorded
    // write-state does not change.
    let mut engine = factory.engine();
    coordinator
        .convert_file_to_text_output(&input.join("scan.png"), Some(&out), &mut engine)
        .unwrap();
    let second_info = entry.read_write_info();
    assert_eq!(second_info.output_path, first_info.output_path);
    assert_eq!(second_info.write_timestamp, first_info.write_timestamp);
    assert_eq!(factory.total_extract_calls(), 1);
}

#[test]
fn one_bad_file_never_aborts_the_batch() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_file(&input, "good.png", b"fine pixels");
    write_file(&input, "corrupt.png", b"FAIL broken header");
    let out = dir.path().join("out");

    let mut coordinator = ProcessingCoordinator::with_defaults();
    let factory = MockFactory::new();
    coordinator.add_files(collect_image_files(&input).unwrap());

    let stats = coordinator.convert_batch(Some(&out), &factory).unwrap();
    assert_eq!(stats.written, 1);
    assert_eq!(stats.failed, 1);
    assert!(!stats.all_succeeded());
    assert!(out.join("good.txt").exists());
    assert!(!out.join("corrupt.txt").exists());
}

#[test]
fn output_lands_alongside_the_input_without_an_output_dir() {
    let dir = tempdir().unwrap();
    let img = write_file(dir.path(), "note.png", b"note pixels");

    let mut coordinator = ProcessingCoordinator::with_defaults();
    let factory = MockFactory::new();
    coordinator.add_files([img]);

    let stats = coordinator.convert_batch(None, &factory).unwrap();
    assert_eq!(stats.written, 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("note.txt")).unwrap(),
        mock_text(b"note pixels")
    );
}

#[test]
fn single_threaded_batch_converts_every_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    for i in 0..6 {
        write_file(&input, &format!("img-{i}.png"), format!("pixels {i}").as_bytes());
    }
    let out = dir.path().join("out");

    let config = ProcessorConfig::default().with_cores(CoreAllocation::Single);
    let mut coordinator = ProcessingCoordinator::new(config);
    let factory = MockFactory::new();
    coordinator.add_files(collect_image_files(&input).unwrap());

    let stats = coordinator.convert_batch(Some(&out), &factory).unwrap();
    assert_eq!(stats.written, 6);
    assert_eq!(stats.failed, 0);
    assert_eq!(factory.total_extract_calls(), 6);
    for i in 0..6 {
        assert!(out.join(format!("img-{i}.txt")).exists());
    }

    use std::sync::atomic::Ordering;
    assert!(factory.engines_created.load(Ordering::SeqCst) >= 1);
}

#[test]
fn broken_engine_factory_fails_files_but_not_the_batch() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_file(&input, "a.png", b"pixels a");
    write_file(&input, "b.png", b"pixels b");
    let out = dir.path().join("out");

    let mut coordinator = ProcessingCoordinator::with_defaults();
    coordinator.add_files(collect_image_files(&input).unwrap());

    let stats = coordinator.convert_batch(Some(&out), &BrokenFactory).unwrap();
    assert_eq!(stats.written, 0);
    assert_eq!(stats.failed, 2);
    assert!(coordinator.cache().is_empty());
}
