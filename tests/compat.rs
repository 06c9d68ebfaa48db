//! Cross-implementation compatibility checks.
//!
//! The pinned hashes here were produced by independent bcrypt
//! implementations in other ecosystems. They are the ground truth for the
//! wire format: if any of these stops verifying, the codec or the digest
//! engine has silently diverged from deployed bcrypt.

use hardtack::{hash_password_with_salt, verify_password, Salt, Variant};

const TEST_COST: u32 = 4;

#[test]
fn verifies_hash_from_deno_bcrypt() {
    assert!(verify_password(
        "test",
        "$2a$10$27xCvRE5eHcyjeyO6iZujeWUDl0HCTFbwF9tw6hd1sKMjV3TlRw2O",
    ));
}

#[test]
fn verifies_second_deno_vector() {
    assert!(verify_password(
        "password123",
        "$2a$10$i7yVylH68UTYSoa./.BWxO0NTXjvPRMzT6F0CgKItqKUqwQwj3y0W",
    ));
}

#[test]
fn verifies_hash_from_php_password_hash() {
    assert!(verify_password(
        "test",
        "$2y$10$YCW2KSGtFxODsDj5SzCvpussZrfsQb7S3Qtyb7meIumNtyr9ptWoK",
    ));
}

#[test]
fn verifies_hash_from_node_bcryptjs() {
    assert!(verify_password(
        "test",
        "$2a$10$nnXyDPxy/eA9oHV.bhAqKeD9xZ55wAxwKwNSoBcM9z8GeBMB1GmI2",
    ));
}

#[test]
fn wrong_password_fails_against_foreign_hash() {
    assert!(!verify_password(
        "Test",
        "$2a$10$27xCvRE5eHcyjeyO6iZujeWUDl0HCTFbwF9tw6hd1sKMjV3TlRw2O",
    ));
}

#[test]
fn modern_variant_tags_are_interchangeable() {
    // 2a, 2b and 2y differ only in historical metadata; a digest computed
    // under one tag must verify when the stored tag is rewritten to another.
    let salt = Salt::generate_with_cost(TEST_COST).unwrap();
    let encoded = hash_password_with_salt("shared-password", &salt).unwrap();
    assert!(encoded.starts_with("$2b$"));

    for tag in ["$2a$", "$2y$"] {
        let rewritten = encoded.replacen("$2b$", tag, 1);
        assert!(
            verify_password("shared-password", &rewritten),
            "tag {tag} failed"
        );
    }
}

#[test]
fn legacy_2x_tag_verifies_ascii_passwords() {
    // For pure-ASCII passwords the sign-extension bug never fires, so a 2x
    // rewrite of a modern hash still verifies. High-bit passwords would
    // diverge, which is the point of the tag.
    let salt = Salt::generate_with_cost(TEST_COST).unwrap();
    let encoded = hash_password_with_salt("ascii-password", &salt).unwrap();
    let rewritten = encoded.replacen("$2b$", "$2x$", 1);
    assert!(verify_password("ascii-password", &rewritten));
    let parsed: Salt = rewritten.parse().unwrap();
    assert_eq!(parsed.variant(), Variant::TwoX);
}

#[cfg(feature = "async")]
mod non_blocking {
    use super::TEST_COST;
    use hardtack::{task, Salt};

    #[tokio::test]
    async fn blocking_and_async_agree_byte_for_byte() {
        let salt = Salt::generate_with_cost(TEST_COST).unwrap();
        let blocking = hardtack::hash_password_with_salt("equivalence", &salt).unwrap();
        let non_blocking = task::hash_password_with_salt("equivalence".into(), salt)
            .await
            .unwrap();
        assert_eq!(blocking, non_blocking);
    }

    #[tokio::test]
    async fn foreign_vector_verifies_through_the_async_surface() {
        assert!(
            task::verify_password(
                "test".into(),
                "$2a$10$27xCvRE5eHcyjeyO6iZujeWUDl0HCTFbwF9tw6hd1sKMjV3TlRw2O".into(),
            )
            .await
        );
    }
}
