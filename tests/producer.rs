mod common;

use std::{fs, sync::Arc, time::Duration};

use common::{FakeBackend, ScriptedStore};
use cuetrack::{
    audio::controller::{PlaybackController, PlayerStatus},
    event::{
        channel::{self, CommandReceiver},
        events::{Command, CommandKind, TrackId},
    },
    library::Storage,
    producer::CommandProducer,
    stream::transfer::RemoteStore,
};
use tokio::time::timeout;

fn producer(
    remote: ScriptedStore,
) -> (
    tempfile::TempDir,
    CommandProducer<ScriptedStore>,
    CommandReceiver,
) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path()).unwrap();
    let (tx, rx) = channel::channel(channel::DEFAULT_CAPACITY);
    let producer = CommandProducer::new(RemoteStore::new(remote, storage), tx);

    (dir, producer, rx)
}

fn ids(names: &[&str]) -> Vec<TrackId> {
    names.iter().map(|n| TrackId::from(*n)).collect()
}

#[tokio::test]
async fn add_queues_only_the_downloaded_tracks() -> anyhow::Result<()> {
    let (_dir, mut producer, rx) =
        producer(ScriptedStore::default().with_file("a.wav", &[b"RIFFa"]));

    let queued = producer
        .submit(Command::new(CommandKind::Add, ids(&["a.wav", "nope.wav"])))
        .await?;

    assert!(queued);
    assert_eq!(
        rx.dequeue().await,
        Some(Command::new(CommandKind::Add, ids(&["a.wav"])))
    );
    assert!(rx.is_empty());

    Ok(())
}

#[tokio::test]
async fn play_of_unavailable_track_queues_nothing() -> anyhow::Result<()> {
    let (_dir, mut producer, rx) = producer(ScriptedStore::default());

    let queued = producer
        .submit(Command::new(CommandKind::Play, ids(&["x.wav"])))
        .await?;

    assert!(!queued);
    assert!(rx.is_empty());
    assert!(!producer.storage().contains(&"x.wav".into()));

    let mut controller = PlaybackController::new(
        rx,
        Arc::new(FakeBackend::default()),
        producer.storage().clone(),
    );
    producer.submit(Command::bare(CommandKind::Info)).await?;
    assert!(controller.step().await);
    assert_eq!(controller.status(), PlayerStatus::Idle);
    assert!(controller.playlist().main().is_empty());

    Ok(())
}

#[tokio::test]
async fn bare_commands_are_queued_without_transfers() -> anyhow::Result<()> {
    let (_dir, mut producer, rx) = producer(ScriptedStore::default());

    producer.submit(Command::bare(CommandKind::Play)).await?;
    producer.submit(Command::bare(CommandKind::Next)).await?;

    assert_eq!(rx.dequeue().await.map(|c| c.kind()), Some(CommandKind::Play));
    assert_eq!(rx.dequeue().await.map(|c| c.kind()), Some(CommandKind::Next));

    Ok(())
}

#[tokio::test]
async fn delete_removes_files_then_queues_removal() -> anyhow::Result<()> {
    let (_dir, mut producer, rx) = producer(ScriptedStore::default());
    common::wav(producer.storage(), "a.wav");

    producer.delete(ids(&["a.wav", "never-there.wav"])).await?;

    assert!(!producer.storage().contains(&"a.wav".into()));
    assert_eq!(
        rx.dequeue().await,
        Some(Command::new(
            CommandKind::Remove,
            ids(&["a.wav", "never-there.wav"])
        ))
    );

    Ok(())
}

#[tokio::test]
async fn library_is_loaded_in_name_order() -> anyhow::Result<()> {
    let (_dir, mut producer, rx) = producer(ScriptedStore::default());
    common::wav(producer.storage(), "b.wav");
    common::wav(producer.storage(), "a.wav");

    assert_eq!(producer.load_library().await?, 2);
    assert_eq!(
        rx.dequeue().await,
        Some(Command::new(CommandKind::Add, ids(&["a.wav", "b.wav"])))
    );

    Ok(())
}

#[tokio::test]
async fn empty_library_queues_nothing() -> anyhow::Result<()> {
    let (_dir, mut producer, rx) = producer(ScriptedStore::default());

    assert_eq!(producer.load_library().await?, 0);
    assert!(rx.is_empty());

    Ok(())
}

#[tokio::test]
async fn downloaded_track_plays_back_byte_identical() -> anyhow::Result<()> {
    let chunks: [&[u8]; 4] = [b"RIFF", b"\x00\x01\x02", b"\xff\xfe", b"tail"];
    let (_dir, mut producer, rx) =
        producer(ScriptedStore::default().with_file("song.wav", &chunks));
    let backend = Arc::new(FakeBackend::default());
    let mut controller =
        PlaybackController::new(rx, backend.clone(), producer.storage().clone());

    producer
        .submit(Command::new(CommandKind::Play, ids(&["song.wav"])))
        .await?;
    assert!(controller.step().await);
    timeout(Duration::from_secs(5), controller.step()).await?;

    assert_eq!(controller.current_track(), Some(&TrackId::from("song.wav")));
    assert_eq!(backend.played_bytes(0), chunks.concat());
    assert_eq!(
        fs::read(producer.storage().path(&"song.wav".into()))?,
        chunks.concat()
    );

    Ok(())
}
