use proptest::prelude::*;
use proxysync_types::{ConfigHash, Content, DeclarativeTarget, Service};

fn content_with(names: &[String]) -> Content {
    Content {
        services: names
            .iter()
            .map(|n| Service {
                name: n.clone(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

#[test]
fn hash_is_hex_sha256() {
    let hash = ConfigHash::of(&Content::default()).unwrap();
    // sha256("{}")
    assert_eq!(
        hash.as_str(),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
}

#[test]
fn target_keeps_upstream_hash() {
    let target = DeclarativeTarget::with_hash(Content::default(), "abc123");
    assert_eq!(target.hash().as_str(), "abc123");
    assert_eq!(target.hash().to_string(), "abc123");
}

#[test]
fn different_content_different_hash() {
    let a = DeclarativeTarget::new(content_with(&["a".into()])).unwrap();
    let b = DeclarativeTarget::new(content_with(&["b".into()])).unwrap();
    assert_ne!(a.hash(), b.hash());
}

#[test]
fn config_hash_serde_is_transparent() {
    let hash = ConfigHash::new("abc123");
    assert_eq!(serde_json::to_string(&hash).unwrap(), "\"abc123\"");
}

proptest! {
    #[test]
    fn hash_is_deterministic(names in proptest::collection::vec("[a-z]{1,8}", 0..6)) {
        let first = DeclarativeTarget::new(content_with(&names)).unwrap();
        let second = DeclarativeTarget::new(content_with(&names)).unwrap();
        prop_assert_eq!(first.hash(), second.hash());
        prop_assert_eq!(first.content(), second.content());
    }
}
