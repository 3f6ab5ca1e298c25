//! End-to-end pipeline tests: train → reply, and train → save → load →
//! reply across both brain file formats.

use std::time::Duration;

use babbler_codec::BrainFileFormat;
use babbler_core::BrainId;
use babbler_reply::{ConstantSurprise, ReplyOptions};
use babbler_store::BrainStore;

const CORPUS: &[&str] = &[
    "the cat sat on the mat",
    "the dog sat on the log",
    "a cat and a dog met on the mat",
];

fn fast() -> ReplyOptions {
    ReplyOptions {
        timeout: Duration::from_millis(30),
    }
}

fn trained_store() -> (BrainStore, BrainId) {
    let store = BrainStore::open_in_memory().unwrap();
    let brain = store.brain("e2e").unwrap();
    store.set_order(brain, 2).unwrap();
    store
        .with_transaction::<_, babbler_store::StoreError>(|store| {
            for line in CORPUS {
                babbler_reply::learn_text(store, brain, line)?;
            }
            Ok(())
        })
        .unwrap();
    (store, brain)
}

fn ask(store: &BrainStore, brain: BrainId, text: &str) -> Option<String> {
    babbler_reply::reply_text(store, brain, text, &ConstantSurprise::default(), &fast()).unwrap()
}

#[test]
fn trained_brain_answers_on_topic() {
    let (store, brain) = trained_store();
    let reply = ask(&store, brain, "tell me about the cat").expect("reply expected");
    let upper = reply.to_ascii_uppercase();
    // The seed is one of the input's learned keywords.
    assert!(
        upper.contains("CAT") || upper.contains("THE"),
        "reply {reply:?} should mention a keyword"
    );
}

#[test]
fn untrained_brain_stays_silent() {
    let store = BrainStore::open_in_memory().unwrap();
    let brain = store.brain("silent").unwrap();
    assert_eq!(ask(&store, brain, "anything"), None);
}

#[test]
fn saved_and_reloaded_brain_is_behaviorally_equivalent() {
    for format in [BrainFileFormat::Legacy, BrainFileFormat::Compact] {
        let (store, brain) = trained_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e2e.brn");
        babbler_codec::save_brain(&store, brain, format, &path).unwrap();

        let restored = BrainStore::open_in_memory().unwrap();
        let target = restored.brain("restored").unwrap();
        let detected = babbler_codec::load_brain(&restored, target, &path).unwrap();
        assert_eq!(detected, format);
        assert_eq!(restored.order(target).unwrap(), 2);

        let reply = ask(&restored, target, "what about the dog")
            .expect("restored brain should reply like the original");
        let upper = reply.to_ascii_uppercase();
        assert!(upper.contains("DOG") || upper.contains("THE"));
    }
}

#[test]
fn resaving_a_loaded_brain_round_trips_again() {
    let (store, brain) = trained_store();
    let dir = tempfile::tempdir().unwrap();

    let first = dir.path().join("first.brn");
    babbler_codec::save_brain(&store, brain, BrainFileFormat::Compact, &first).unwrap();

    let middle = BrainStore::open_in_memory().unwrap();
    let mid_brain = middle.brain("middle").unwrap();
    let _ = babbler_codec::load_brain(&middle, mid_brain, &first).unwrap();

    let second = dir.path().join("second.brn");
    babbler_codec::save_brain(&middle, mid_brain, BrainFileFormat::Compact, &second).unwrap();

    let last = BrainStore::open_in_memory().unwrap();
    let last_brain = last.brain("last").unwrap();
    let _ = babbler_codec::load_brain(&last, last_brain, &second).unwrap();

    let reply = ask(&last, last_brain, "the cat").expect("twice-moved brain still replies");
    let upper = reply.to_ascii_uppercase();
    assert!(upper.contains("CAT") || upper.contains("THE"));
}

#[test]
fn learning_is_transactional() {
    let store = BrainStore::open_in_memory().unwrap();
    let brain = store.brain("txn").unwrap();
    store.set_order(brain, 2).unwrap();

    let result: Result<(), babbler_store::StoreError> = store.with_transaction(|store| {
        babbler_reply::learn_text(store, brain, "the cat sat on the mat")?;
        Err(babbler_store::StoreError::InvalidArgument("abort".into()))
    });
    assert!(result.is_err());

    // The rollback wiped the learned sentence.
    let cat = store.lookup("CAT").unwrap();
    assert_eq!(cat, None);
    assert_eq!(ask(&store, brain, "the cat"), None);
}
